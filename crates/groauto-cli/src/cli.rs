use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "groauto contributors",
    version,
    about = "groauto - Prepare a solvated, neutralized and equilibrated protein system with GROMACS and launch its production run.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the parameter files and run the full GROMACS preparation pipeline.
    Run(RunArgs),
    /// Only write the five stage parameter files (ions, minim, nvt, npt, md).
    Mdp(MdpArgs),
    /// Inspect or create the user configuration file.
    Config(ConfigArgs),
}

/// Temperature and length of the simulation; prompted for when absent.
#[derive(Args, Debug, Clone, Default)]
pub struct SimulationArgs {
    /// Reference temperature in Kelvin [default: 298]
    #[arg(short, long, value_name = "KELVIN", value_parser = parse_positive)]
    pub temperature: Option<f64>,

    /// Production run length in nanoseconds [default: 50]
    #[arg(short, long, value_name = "NS", value_parser = parse_positive)]
    pub length: Option<f64>,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub simulation: SimulationArgs,

    /// Base name of the input structure; `<NAME>.pdb` is read from the working directory.
    #[arg(short, long, value_name = "NAME")]
    pub structure: Option<String>,

    /// Directory holding the structure; all files are written here [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    /// Defaults to the user configuration file when it exists.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Engine Overrides ---
    /// GROMACS executable used for every step [default: gmx_mpi]
    #[arg(long, value_name = "BINARY")]
    pub gmx: Option<String>,

    /// Answer given to the pdb2gmx force-field menu [default: 8]
    #[arg(long, value_name = "SELECTION")]
    pub force_field_selection: Option<String>,

    /// Group genion replaces with ions [default: 13]
    #[arg(long, value_name = "GROUP")]
    pub solvent_group: Option<String>,

    /// Water model passed to pdb2gmx [default: tips3p]
    #[arg(long, value_name = "MODEL")]
    pub water_model: Option<String>,

    /// Let GROMACS write straight to the terminal instead of capturing its output.
    #[arg(long)]
    pub stream_output: bool,

    /// Print the steps that would run without writing or running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Never ask for missing values; fall back to defaults instead.
    #[arg(long)]
    pub no_prompt: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S solvation.box-distance=1.2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `mdp` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct MdpArgs {
    #[command(flatten)]
    pub simulation: SimulationArgs,

    /// Directory the parameter files are written to [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Never ask for missing values; fall back to defaults instead.
    #[arg(long)]
    pub no_prompt: bool,

    /// Set a specific configuration value, overriding the config file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the location of the user configuration file.
    Path,
    /// Write a configuration file filled with the default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
        /// Write to this path instead of the user configuration file.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

pub fn parse_positive(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("'{}' must be a positive number", s))
    }
}
