use crate::cli::RunArgs;
use crate::config::{self, AppConfig};
use crate::error::Result;
use crate::prompt::{ConsolePrompter, Prompt};
use crate::utils::progress::CliProgressHandler;
use groauto::core::mdp::templates::StageFile;
use groauto::engine::process::{OutputMode, SystemExecutor};
use groauto::engine::progress::ProgressReporter;
use groauto::workflows::prepare::{self, Stage, StepRecord};
use std::time::Duration;
use tracing::{info, warn};

pub fn run(args: RunArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = {
        let mut console = ConsolePrompter::stdio();
        let prompt = if args.no_prompt {
            None
        } else {
            Some(&mut console as &mut dyn Prompt)
        };
        config::build_run_config(&args, prompt)?
    };
    if let Some(path) = &app.config_file {
        info!("Settings read from {:?}", path);
    }

    if args.dry_run {
        print_plan(&app);
        return Ok(());
    }

    let config = &app.pipeline;
    let executor = SystemExecutor::new(config.tools.output_mode);

    // Streamed GROMACS output and a redrawn bar would overwrite each other.
    let progress_handler = CliProgressHandler::new();
    let reporter = match config.tools.output_mode {
        OutputMode::Capture => ProgressReporter::with_callback(progress_handler.get_callback()),
        OutputMode::Inherit => ProgressReporter::new(),
    };

    println!(
        "Preparing {} in {} ...",
        config.structure_file(),
        config.working_dir.display()
    );
    info!("Invoking the preparation workflow...");
    let summary = prepare::run(config, &executor, &reporter)?;

    println!(
        "✓ Wrote {} parameter files and ran {} GROMACS steps in {:.1}s.",
        summary.parameter_files.len(),
        summary.steps.len(),
        summary.elapsed.as_secs_f64()
    );
    for (stage, elapsed) in stage_timings(&summary.steps) {
        println!("    {:<20} {:>8.1}s", stage.name(), elapsed.as_secs_f64());
    }
    println!(
        "✓ Production output: {}",
        config
            .working_dir
            .join(format!("{}.*", summary.production_name))
            .display()
    );
    Ok(())
}

/// Total time per stage, in pipeline order.
fn stage_timings(steps: &[StepRecord]) -> Vec<(Stage, Duration)> {
    let mut timings: Vec<(Stage, Duration)> = Vec::new();
    for record in steps {
        match timings.last_mut() {
            Some((stage, total)) if *stage == record.stage => *total += record.elapsed,
            _ => timings.push((record.stage, record.elapsed)),
        }
    }
    timings
}

fn print_plan(app: &AppConfig) {
    let config = &app.pipeline;

    println!("Dry run: nothing will be written or executed.");
    println!("Parameter files in {}:", config.working_dir.display());
    for stage in StageFile::ALL {
        println!("  {}", stage.file_name());
    }

    let structure = config.structure_path();
    if !structure.is_file() {
        warn!("Input structure {:?} does not exist.", structure);
    }

    let steps = prepare::plan(config);
    println!("Steps:");
    for (i, step) in steps.iter().enumerate() {
        println!(
            "  [{:>2}/{}] {:<20} {}",
            i + 1,
            steps.len(),
            step.stage.name(),
            step.command
        );
    }
}
