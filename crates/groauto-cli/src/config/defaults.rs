use groauto::core::mdp::templates::DEFAULT_TRAJECTORY_INTERVAL;
use groauto::core::params::{DEFAULT_LENGTH_NS, DEFAULT_TEMPERATURE_K};
use groauto::engine::config::{
    BoxType, DEFAULT_BOX_DISTANCE_NM, DEFAULT_FORCE_FIELD_SELECTION, DEFAULT_GMX_BINARY,
    DEFAULT_NEGATIVE_ION, DEFAULT_POSITIVE_ION, DEFAULT_SOLVENT_GROUP, DEFAULT_SOLVENT_STRUCTURE,
    DEFAULT_WATER_MODEL,
};
use std::path::PathBuf;

pub struct DefaultsConfig {
    pub temperature: f64,
    pub length: f64,
    pub workdir: PathBuf,
    pub gmx: String,
    pub stream_output: bool,
    pub force_field_selection: String,
    pub water_model: String,
    pub ignore_hydrogens: bool,
    pub box_distance: f64,
    pub box_type: BoxType,
    pub solvent_structure: String,
    pub solvent_group: String,
    pub positive_ion: String,
    pub negative_ion: String,
    pub trajectory_interval: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE_K,
            length: DEFAULT_LENGTH_NS,
            workdir: PathBuf::from("."),
            gmx: DEFAULT_GMX_BINARY.to_string(),
            stream_output: false,
            force_field_selection: DEFAULT_FORCE_FIELD_SELECTION.to_string(),
            water_model: DEFAULT_WATER_MODEL.to_string(),
            ignore_hydrogens: true,
            box_distance: DEFAULT_BOX_DISTANCE_NM,
            box_type: BoxType::default(),
            solvent_structure: DEFAULT_SOLVENT_STRUCTURE.to_string(),
            solvent_group: DEFAULT_SOLVENT_GROUP.to_string(),
            positive_ion: DEFAULT_POSITIVE_ION.to_string(),
            negative_ion: DEFAULT_NEGATIVE_ION.to_string(),
            trajectory_interval: DEFAULT_TRAJECTORY_INTERVAL,
        }
    }
}
