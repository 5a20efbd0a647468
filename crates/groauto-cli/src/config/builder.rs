use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileSimulationConfig};
use super::models::{AppConfig, MdpConfig};
use crate::cli::{MdpArgs, RunArgs, SimulationArgs};
use crate::error::{CliError, Result};
use crate::prompt::{self, Prompt};
use groauto::core::mdp::templates::TemplateOptions;
use groauto::core::params::SimulationParameters;
use groauto::engine::config::{BoxType, PipelineConfigBuilder};
use groauto::engine::process::OutputMode;
use std::str::FromStr;
use tracing::debug;

pub fn build_run_config(args: &RunArgs, mut prompt: Option<&mut dyn Prompt>) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let (file_config, config_file) = FileConfig::load(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let sim_file = file_config.simulation.take().unwrap_or_default();
    let parameters = resolve_parameters(&args.simulation, &sim_file, &defaults, &mut prompt)?;

    let structure_name = match args.structure.clone().or(sim_file.structure) {
        Some(name) => prompt::normalize_structure_name(&name),
        None => match prompt.as_deref_mut() {
            Some(p) => prompt::ask_structure(p)?,
            None => {
                return Err(CliError::Argument(
                    "No input structure given. Pass --structure or set simulation.structure."
                        .to_string(),
                ));
            }
        },
    };
    let working_dir = args
        .workdir
        .clone()
        .or(sim_file.workdir)
        .unwrap_or(defaults.workdir);

    let engine_file = file_config.engine.take().unwrap_or_default();
    let gmx = args.gmx.clone().or(engine_file.gmx).unwrap_or(defaults.gmx);
    let stream_output = args.stream_output
        || engine_file
            .stream_output
            .unwrap_or(defaults.stream_output);
    let output_mode = if stream_output {
        OutputMode::Inherit
    } else {
        OutputMode::Capture
    };

    let topology_file = file_config.topology.take().unwrap_or_default();
    let force_field_selection = args
        .force_field_selection
        .clone()
        .or(topology_file.force_field_selection)
        .unwrap_or(defaults.force_field_selection);
    let water_model = args
        .water_model
        .clone()
        .or(topology_file.water_model)
        .unwrap_or(defaults.water_model);
    let ignore_hydrogens = topology_file
        .ignore_hydrogens
        .unwrap_or(defaults.ignore_hydrogens);

    let solvation_file = file_config.solvation.take().unwrap_or_default();
    let box_type = match solvation_file.box_type {
        Some(name) => BoxType::from_str(&name).map_err(|e| CliError::Config(e.to_string()))?,
        None => defaults.box_type,
    };

    let ions_file = file_config.ions.take().unwrap_or_default();
    let solvent_group = args
        .solvent_group
        .clone()
        .or(ions_file.solvent_group)
        .unwrap_or(defaults.solvent_group);

    let production_file = file_config.production.take().unwrap_or_default();

    let pipeline = PipelineConfigBuilder::new()
        .working_dir(working_dir)
        .structure_name(structure_name)
        .parameters(parameters)
        .gmx_binary(gmx)
        .output_mode(output_mode)
        .force_field_selection(force_field_selection)
        .water_model(water_model)
        .ignore_hydrogens(ignore_hydrogens)
        .box_distance_nm(solvation_file.box_distance.unwrap_or(defaults.box_distance))
        .box_type(box_type)
        .solvent_structure(
            solvation_file
                .solvent_structure
                .unwrap_or(defaults.solvent_structure),
        )
        .solvent_group(solvent_group)
        .positive_ion(ions_file.positive_ion.unwrap_or(defaults.positive_ion))
        .negative_ion(ions_file.negative_ion.unwrap_or(defaults.negative_ion))
        .trajectory_interval(
            production_file
                .trajectory_interval
                .unwrap_or(defaults.trajectory_interval),
        )
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    debug!("Resolved pipeline configuration: {:?}", pipeline);
    Ok(AppConfig {
        config_file,
        pipeline,
    })
}

pub fn build_mdp_config(args: &MdpArgs, mut prompt: Option<&mut dyn Prompt>) -> Result<MdpConfig> {
    let defaults = DefaultsConfig::default();

    let (file_config, config_file) = FileConfig::load(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let sim_file = file_config.simulation.take().unwrap_or_default();
    let parameters = resolve_parameters(&args.simulation, &sim_file, &defaults, &mut prompt)?;

    let trajectory_interval = file_config
        .production
        .and_then(|p| p.trajectory_interval)
        .unwrap_or(defaults.trajectory_interval);
    if trajectory_interval == 0 {
        return Err(CliError::Config(
            "production.trajectory-interval must be at least one step".to_string(),
        ));
    }

    Ok(MdpConfig {
        config_file,
        output_dir: args
            .workdir
            .clone()
            .or(sim_file.workdir)
            .unwrap_or(defaults.workdir),
        parameters,
        templates: TemplateOptions {
            trajectory_interval,
        },
    })
}

fn resolve_parameters(
    cli: &SimulationArgs,
    file: &FileSimulationConfig,
    defaults: &DefaultsConfig,
    prompt: &mut Option<&mut dyn Prompt>,
) -> Result<SimulationParameters> {
    let temperature = match cli.temperature.or(file.temperature) {
        Some(t) => t,
        None => match prompt.as_deref_mut() {
            Some(p) => prompt::ask_temperature(p, defaults.temperature)?,
            None => defaults.temperature,
        },
    };
    let length = match cli.length.or(file.length) {
        Some(l) => l,
        None => match prompt.as_deref_mut() {
            Some(p) => prompt::ask_length(p, defaults.length)?,
            None => defaults.length,
        },
    };
    SimulationParameters::new(temperature, length).map_err(|e| CliError::Argument(e.to_string()))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();
        let value_str = value_str.trim();

        match key {
            "simulation.temperature" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .temperature = Some(parse_value(key, value_str, "float")?);
            }
            "simulation.length" => {
                config.simulation.get_or_insert_with(Default::default).length =
                    Some(parse_value(key, value_str, "float")?);
            }
            "simulation.structure" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .structure = Some(value_str.to_string());
            }
            "simulation.workdir" => {
                config.simulation.get_or_insert_with(Default::default).workdir =
                    Some(value_str.into());
            }
            "engine.gmx" => {
                config.engine.get_or_insert_with(Default::default).gmx =
                    Some(value_str.to_string());
            }
            "engine.stream-output" => {
                config
                    .engine
                    .get_or_insert_with(Default::default)
                    .stream_output = Some(parse_value(key, value_str, "boolean")?);
            }
            "topology.force-field-selection" => {
                config
                    .topology
                    .get_or_insert_with(Default::default)
                    .force_field_selection = Some(value_str.to_string());
            }
            "topology.water-model" => {
                config
                    .topology
                    .get_or_insert_with(Default::default)
                    .water_model = Some(value_str.to_string());
            }
            "topology.ignore-hydrogens" => {
                config
                    .topology
                    .get_or_insert_with(Default::default)
                    .ignore_hydrogens = Some(parse_value(key, value_str, "boolean")?);
            }
            "solvation.box-distance" => {
                config
                    .solvation
                    .get_or_insert_with(Default::default)
                    .box_distance = Some(parse_value(key, value_str, "float")?);
            }
            "solvation.box-type" => {
                config.solvation.get_or_insert_with(Default::default).box_type =
                    Some(value_str.to_string());
            }
            "solvation.solvent-structure" => {
                config
                    .solvation
                    .get_or_insert_with(Default::default)
                    .solvent_structure = Some(value_str.to_string());
            }
            "ions.solvent-group" => {
                config.ions.get_or_insert_with(Default::default).solvent_group =
                    Some(value_str.to_string());
            }
            "ions.positive-ion" => {
                config.ions.get_or_insert_with(Default::default).positive_ion =
                    Some(value_str.to_string());
            }
            "ions.negative-ion" => {
                config.ions.get_or_insert_with(Default::default).negative_ion =
                    Some(value_str.to_string());
            }
            "production.trajectory-interval" => {
                config
                    .production
                    .get_or_insert_with(Default::default)
                    .trajectory_interval = Some(parse_value(key, value_str, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}
