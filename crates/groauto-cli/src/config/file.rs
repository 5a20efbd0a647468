use super::defaults::DefaultsConfig;
use crate::error::{CliError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSimulationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileEngineConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_output: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileTopologyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_field_selection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_hydrogens: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSolvationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solvent_structure: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileIonsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solvent_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_ion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_ion: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileProductionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory_interval: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<FileSimulationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<FileEngineConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology: Option<FileTopologyConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solvation: Option<FileSolvationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ions: Option<FileIonsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production: Option<FileProductionConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `explicit` when given, otherwise the user configuration file if one exists.
    /// Returns the configuration together with the path it came from.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        match user_config_path() {
            Ok(path) if path.is_file() => Ok((Self::from_file(&path)?, Some(path))),
            Ok(path) => {
                debug!("No user configuration at {:?}; using defaults.", path);
                Ok((Self::default(), None))
            }
            Err(e) => {
                debug!("{}", e);
                Ok((Self::default(), None))
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Other(e.into()))
    }
}

impl From<&DefaultsConfig> for FileConfig {
    /// Every setting spelled out, except the structure which has no default.
    fn from(d: &DefaultsConfig) -> Self {
        Self {
            simulation: Some(FileSimulationConfig {
                temperature: Some(d.temperature),
                length: Some(d.length),
                structure: None,
                workdir: Some(d.workdir.clone()),
            }),
            engine: Some(FileEngineConfig {
                gmx: Some(d.gmx.clone()),
                stream_output: Some(d.stream_output),
            }),
            topology: Some(FileTopologyConfig {
                force_field_selection: Some(d.force_field_selection.clone()),
                water_model: Some(d.water_model.clone()),
                ignore_hydrogens: Some(d.ignore_hydrogens),
            }),
            solvation: Some(FileSolvationConfig {
                box_distance: Some(d.box_distance),
                box_type: Some(d.box_type.to_string()),
                solvent_structure: Some(d.solvent_structure.clone()),
            }),
            ions: Some(FileIonsConfig {
                solvent_group: Some(d.solvent_group.clone()),
                positive_ion: Some(d.positive_ion.clone()),
                negative_ion: Some(d.negative_ion.clone()),
            }),
            production: Some(FileProductionConfig {
                trajectory_interval: Some(d.trajectory_interval),
            }),
        }
    }
}

pub fn user_config_path() -> Result<PathBuf> {
    ProjectDirs::from("", "", "groauto")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .ok_or_else(|| {
            CliError::Config("Could not determine the user configuration directory.".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_kebab_case_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("groauto.toml");
        fs::write(
            &path,
            r#"
            [simulation]
            temperature = 310.0
            length = 10

            [engine]
            gmx = "gmx"
            stream-output = true

            [topology]
            force-field-selection = "1"

            [ions]
            solvent-group = "SOL"
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        let simulation = config.simulation.unwrap();
        assert_eq!(simulation.temperature, Some(310.0));
        assert_eq!(simulation.length, Some(10.0));
        assert_eq!(config.engine.unwrap().stream_output, Some(true));
        assert_eq!(
            config.topology.unwrap().force_field_selection.as_deref(),
            Some("1")
        );
        assert_eq!(config.ions.unwrap().solvent_group.as_deref(), Some("SOL"));
        assert!(config.solvation.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected_with_the_file_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[simulation]\ntemprature = 300.0\n").unwrap();

        let err = FileConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = FileConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn explicit_file_is_reported_as_the_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "").unwrap();

        let (config, source) = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(source, Some(path));
    }

    #[test]
    fn defaults_render_to_a_file_that_reads_back() {
        let rendered = FileConfig::from(&DefaultsConfig::default())
            .to_toml_string()
            .unwrap();
        assert!(rendered.contains("[solvation]"));
        assert!(rendered.contains("box-type = \"cubic\""));
        assert!(rendered.contains("solvent-group = \"13\""));
        assert!(!rendered.contains("\nstructure ="));

        let parsed: FileConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, FileConfig::from(&DefaultsConfig::default()));
    }

    #[test]
    fn user_config_lives_in_a_groauto_directory() {
        if let Ok(path) = user_config_path() {
            assert!(path.ends_with("config.toml"));
            assert!(path.to_string_lossy().contains("groauto"));
        }
    }
}
