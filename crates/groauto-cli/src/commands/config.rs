use crate::cli::{ConfigArgs, ConfigCommands};
use crate::config::{DefaultsConfig, FileConfig, user_config_path};
use crate::error::{CliError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const FILE_HEADER: &str = "\
# groauto configuration
# Values given on the command line or with --set take precedence over this file.
# Add `structure = \"<name>\"` to [simulation] to skip the structure prompt.

";

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => handle_path(),
        ConfigCommands::Init { force, output } => handle_init(force, output),
    }
}

fn handle_path() -> Result<()> {
    let path = user_config_path()?;
    println!("{}", path.display());
    if !path.is_file() {
        info!("No configuration file exists there yet; 'groauto config init' creates one.");
    }
    Ok(())
}

fn handle_init(force: bool, output: Option<PathBuf>) -> Result<()> {
    let path = match output {
        Some(path) => path,
        None => user_config_path()?,
    };
    write_defaults(&path, force)?;
    println!("✓ Wrote default configuration to {}", path.display());
    Ok(())
}

fn write_defaults(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::Argument(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let rendered = FileConfig::from(&DefaultsConfig::default()).to_toml_string()?;
    fs::write(path, format!("{}{}", FILE_HEADER, rendered))?;
    info!("Default configuration written to {:?}", path);
    Ok(())
}
