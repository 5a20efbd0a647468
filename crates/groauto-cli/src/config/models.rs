use groauto::core::mdp::templates::TemplateOptions;
use groauto::core::params::SimulationParameters;
use groauto::engine::config::PipelineConfig;
use std::path::PathBuf;

pub struct AppConfig {
    /// The file the settings were read from, if any.
    pub config_file: Option<PathBuf>,
    pub pipeline: PipelineConfig,
}

pub struct MdpConfig {
    pub config_file: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub parameters: SimulationParameters,
    pub templates: TemplateOptions,
}
