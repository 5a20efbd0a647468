use crate::core::mdp::templates::{DEFAULT_TRAJECTORY_INTERVAL, TemplateOptions};
use crate::core::params::SimulationParameters;
use crate::engine::process::OutputMode;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_GMX_BINARY: &str = "gmx_mpi";
/// Position of CHARMM27 in the pdb2gmx force-field menu of the GROMACS releases this was built against.
pub const DEFAULT_FORCE_FIELD_SELECTION: &str = "8";
/// Index of the SOL group offered by genion for a freshly solvated protein.
pub const DEFAULT_SOLVENT_GROUP: &str = "13";
pub const DEFAULT_WATER_MODEL: &str = "tips3p";
pub const DEFAULT_BOX_DISTANCE_NM: f64 = 1.0;
pub const DEFAULT_SOLVENT_STRUCTURE: &str = "spc216.gro";
pub const DEFAULT_POSITIVE_ION: &str = "NA";
pub const DEFAULT_NEGATIVE_ION: &str = "CL";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxType {
    #[default]
    Cubic,
    Dodecahedron,
    Octahedron,
    Triclinic,
}

impl BoxType {
    pub fn as_str(self) -> &'static str {
        match self {
            BoxType::Cubic => "cubic",
            BoxType::Dodecahedron => "dodecahedron",
            BoxType::Octahedron => "octahedron",
            BoxType::Triclinic => "triclinic",
        }
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cubic" => Ok(BoxType::Cubic),
            "dodecahedron" => Ok(BoxType::Dodecahedron),
            "octahedron" => Ok(BoxType::Octahedron),
            "triclinic" => Ok(BoxType::Triclinic),
            other => Err(ConfigError::InvalidValue {
                name: "box_type",
                reason: format!(
                    "'{}' is not one of cubic, dodecahedron, octahedron, triclinic",
                    other
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub gmx_binary: String,
    pub output_mode: OutputMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyConfig {
    pub force_field_selection: String,
    pub water_model: String,
    pub ignore_hydrogens: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolvationConfig {
    pub box_distance_nm: f64,
    pub box_type: BoxType,
    pub solvent_structure: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IonConfig {
    pub solvent_group: String,
    pub positive_ion: String,
    pub negative_ion: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub working_dir: PathBuf,
    /// Base name of the input structure; the pipeline reads `<working_dir>/<name>.pdb`.
    pub structure_name: String,
    pub parameters: SimulationParameters,
    pub tools: ToolConfig,
    pub topology: TopologyConfig,
    pub solvation: SolvationConfig,
    pub ions: IonConfig,
    pub templates: TemplateOptions,
}

impl PipelineConfig {
    pub fn structure_file(&self) -> String {
        format!("{}.pdb", self.structure_name)
    }

    pub fn structure_path(&self) -> PathBuf {
        self.working_dir.join(self.structure_file())
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    working_dir: Option<PathBuf>,
    structure_name: Option<String>,
    parameters: Option<SimulationParameters>,
    gmx_binary: Option<String>,
    output_mode: Option<OutputMode>,
    force_field_selection: Option<String>,
    water_model: Option<String>,
    ignore_hydrogens: Option<bool>,
    box_distance_nm: Option<f64>,
    box_type: Option<BoxType>,
    solvent_structure: Option<String>,
    solvent_group: Option<String>,
    positive_ion: Option<String>,
    negative_ion: Option<String>,
    trajectory_interval: Option<u64>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }
    pub fn structure_name(mut self, name: impl Into<String>) -> Self {
        self.structure_name = Some(name.into());
        self
    }
    pub fn parameters(mut self, parameters: SimulationParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }
    pub fn gmx_binary(mut self, binary: impl Into<String>) -> Self {
        self.gmx_binary = Some(binary.into());
        self
    }
    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = Some(mode);
        self
    }
    pub fn force_field_selection(mut self, selection: impl Into<String>) -> Self {
        self.force_field_selection = Some(selection.into());
        self
    }
    pub fn water_model(mut self, model: impl Into<String>) -> Self {
        self.water_model = Some(model.into());
        self
    }
    pub fn ignore_hydrogens(mut self, ignore: bool) -> Self {
        self.ignore_hydrogens = Some(ignore);
        self
    }
    pub fn box_distance_nm(mut self, distance: f64) -> Self {
        self.box_distance_nm = Some(distance);
        self
    }
    pub fn box_type(mut self, box_type: BoxType) -> Self {
        self.box_type = Some(box_type);
        self
    }
    pub fn solvent_structure(mut self, structure: impl Into<String>) -> Self {
        self.solvent_structure = Some(structure.into());
        self
    }
    pub fn solvent_group(mut self, group: impl Into<String>) -> Self {
        self.solvent_group = Some(group.into());
        self
    }
    pub fn positive_ion(mut self, ion: impl Into<String>) -> Self {
        self.positive_ion = Some(ion.into());
        self
    }
    pub fn negative_ion(mut self, ion: impl Into<String>) -> Self {
        self.negative_ion = Some(ion.into());
        self
    }
    pub fn trajectory_interval(mut self, steps: u64) -> Self {
        self.trajectory_interval = Some(steps);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let working_dir = self
            .working_dir
            .ok_or(ConfigError::MissingParameter("working_dir"))?;
        let structure_name = self
            .structure_name
            .ok_or(ConfigError::MissingParameter("structure_name"))?;
        let parameters = self
            .parameters
            .ok_or(ConfigError::MissingParameter("parameters"))?;

        let structure_name = non_empty("structure_name", structure_name)?;

        let tools = ToolConfig {
            gmx_binary: non_empty(
                "gmx_binary",
                self.gmx_binary
                    .unwrap_or_else(|| DEFAULT_GMX_BINARY.to_string()),
            )?,
            output_mode: self.output_mode.unwrap_or_default(),
        };

        let topology = TopologyConfig {
            force_field_selection: non_empty(
                "force_field_selection",
                self.force_field_selection
                    .unwrap_or_else(|| DEFAULT_FORCE_FIELD_SELECTION.to_string()),
            )?,
            water_model: non_empty(
                "water_model",
                self.water_model
                    .unwrap_or_else(|| DEFAULT_WATER_MODEL.to_string()),
            )?,
            ignore_hydrogens: self.ignore_hydrogens.unwrap_or(true),
        };

        let box_distance_nm = self.box_distance_nm.unwrap_or(DEFAULT_BOX_DISTANCE_NM);
        if !(box_distance_nm.is_finite() && box_distance_nm > 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "box_distance_nm",
                reason: format!("must be a positive distance, got {}", box_distance_nm),
            });
        }
        let solvation = SolvationConfig {
            box_distance_nm,
            box_type: self.box_type.unwrap_or_default(),
            solvent_structure: non_empty(
                "solvent_structure",
                self.solvent_structure
                    .unwrap_or_else(|| DEFAULT_SOLVENT_STRUCTURE.to_string()),
            )?,
        };

        let ions = IonConfig {
            solvent_group: non_empty(
                "solvent_group",
                self.solvent_group
                    .unwrap_or_else(|| DEFAULT_SOLVENT_GROUP.to_string()),
            )?,
            positive_ion: non_empty(
                "positive_ion",
                self.positive_ion
                    .unwrap_or_else(|| DEFAULT_POSITIVE_ION.to_string()),
            )?,
            negative_ion: non_empty(
                "negative_ion",
                self.negative_ion
                    .unwrap_or_else(|| DEFAULT_NEGATIVE_ION.to_string()),
            )?,
        };

        let trajectory_interval = self
            .trajectory_interval
            .unwrap_or(DEFAULT_TRAJECTORY_INTERVAL);
        if trajectory_interval == 0 {
            return Err(ConfigError::InvalidValue {
                name: "trajectory_interval",
                reason: "must be at least one step".to_string(),
            });
        }

        Ok(PipelineConfig {
            working_dir,
            structure_name,
            parameters,
            tools,
            topology,
            solvation,
            ions,
            templates: TemplateOptions {
                trajectory_interval,
            },
        })
    }
}

fn non_empty(name: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ConfigError::InvalidValue {
            name,
            reason: "must not be empty".to_string(),
        })
    } else {
        Ok(trimmed.to_string())
    }
}
