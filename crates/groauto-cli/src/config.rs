mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_mdp_config, build_run_config};
pub use defaults::DefaultsConfig;
pub use file::{FileConfig, user_config_path};
pub use models::AppConfig;
