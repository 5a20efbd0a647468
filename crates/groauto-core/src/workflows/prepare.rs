use crate::core::mdp::templates::{self, StageFile};
use crate::engine::config::PipelineConfig;
use crate::engine::error::EngineError;
use crate::engine::process::{CommandExecutor, CommandSpec};
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

const STDERR_TAIL_LINES: usize = 20;

const PROCESSED_STRUCTURE: &str = "protein_processed.gro";
const TOPOLOGY: &str = "topol.top";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Topology,
    Solvation,
    Ions,
    Minimization,
    NvtEquilibration,
    NptEquilibration,
    Production,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Topology => "Topology",
            Stage::Solvation => "Box & solvation",
            Stage::Ions => "Ions",
            Stage::Minimization => "Energy minimization",
            Stage::NvtEquilibration => "NVT equilibration",
            Stage::NptEquilibration => "NPT equilibration",
            Stage::Production => "Production",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStep {
    pub stage: Stage,
    pub name: &'static str,
    pub command: CommandSpec,
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub stage: Stage,
    pub name: &'static str,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub parameter_files: Vec<PathBuf>,
    pub steps: Vec<StepRecord>,
    /// deffnm of the production run, e.g. `md_50ns`.
    pub production_name: String,
    pub elapsed: Duration,
}

/// The tool invocations of a preparation run, in execution order.
///
/// Nothing is executed; this is what `run` will do after writing the parameter files.
pub fn plan(config: &PipelineConfig) -> Vec<PipelineStep> {
    let gmx = |subcommand: &str| {
        CommandSpec::new(config.tools.gmx_binary.as_str())
            .arg(subcommand)
            .current_dir(config.working_dir.clone())
    };
    let mdp = |stage: StageFile| stage.file_name();
    let structure = config.structure_file();
    let production = config.parameters.production_name();
    let production_tpr = format!("{}.tpr", production);
    let box_distance = format_distance(config.solvation.box_distance_nm);

    let mut pdb2gmx = gmx("pdb2gmx").args([
        "-f",
        structure.as_str(),
        "-o",
        PROCESSED_STRUCTURE,
        "-water",
        config.topology.water_model.as_str(),
    ]);
    if config.topology.ignore_hydrogens {
        pdb2gmx = pdb2gmx.arg("-ignh");
    }

    vec![
        step(
            Stage::Topology,
            "pdb2gmx",
            pdb2gmx.stdin(config.topology.force_field_selection.as_str()),
        ),
        step(
            Stage::Solvation,
            "editconf",
            gmx("editconf").args([
                "-f",
                PROCESSED_STRUCTURE,
                "-o",
                "box.gro",
                "-c",
                "-d",
                box_distance.as_str(),
                "-bt",
                config.solvation.box_type.as_str(),
            ]),
        ),
        step(
            Stage::Solvation,
            "solvate",
            gmx("solvate").args([
                "-cp",
                "box.gro",
                "-cs",
                config.solvation.solvent_structure.as_str(),
                "-o",
                "solvated.gro",
                "-p",
                TOPOLOGY,
            ]),
        ),
        step(
            Stage::Ions,
            "ions-grompp",
            gmx("grompp").args([
                "-f",
                mdp(StageFile::Ions),
                "-c",
                "solvated.gro",
                "-p",
                TOPOLOGY,
                "-o",
                "ions.tpr",
            ]),
        ),
        step(
            Stage::Ions,
            "genion",
            gmx("genion")
                .args([
                    "-s",
                    "ions.tpr",
                    "-o",
                    "ions.gro",
                    "-p",
                    TOPOLOGY,
                    "-pname",
                    config.ions.positive_ion.as_str(),
                    "-nname",
                    config.ions.negative_ion.as_str(),
                    "-neutral",
                ])
                .stdin(config.ions.solvent_group.as_str()),
        ),
        step(
            Stage::Minimization,
            "em-grompp",
            gmx("grompp").args([
                "-f",
                mdp(StageFile::Minimization),
                "-c",
                "ions.gro",
                "-p",
                TOPOLOGY,
                "-o",
                "em.tpr",
            ]),
        ),
        step(
            Stage::Minimization,
            "em-mdrun",
            gmx("mdrun").args(["-v", "-deffnm", "em"]),
        ),
        step(
            Stage::NvtEquilibration,
            "nvt-grompp",
            gmx("grompp").args([
                "-f",
                mdp(StageFile::Nvt),
                "-c",
                "em.gro",
                "-r",
                "em.gro",
                "-p",
                TOPOLOGY,
                "-o",
                "nvt.tpr",
            ]),
        ),
        step(
            Stage::NvtEquilibration,
            "nvt-mdrun",
            gmx("mdrun").args(["-v", "-deffnm", "nvt"]),
        ),
        step(
            Stage::NptEquilibration,
            "npt-grompp",
            gmx("grompp").args([
                "-f",
                mdp(StageFile::Npt),
                "-c",
                "nvt.gro",
                "-r",
                "nvt.gro",
                "-t",
                "nvt.cpt",
                "-p",
                TOPOLOGY,
                "-o",
                "npt.tpr",
            ]),
        ),
        step(
            Stage::NptEquilibration,
            "npt-mdrun",
            gmx("mdrun").args(["-v", "-deffnm", "npt"]),
        ),
        step(
            Stage::Production,
            "md-grompp",
            gmx("grompp").args([
                "-f",
                mdp(StageFile::Production),
                "-c",
                "npt.gro",
                "-t",
                "npt.cpt",
                "-p",
                TOPOLOGY,
                "-o",
                production_tpr.as_str(),
            ]),
        ),
        step(
            Stage::Production,
            "md-mdrun",
            gmx("mdrun").args(["-v", "-deffnm", production.as_str()]),
        ),
    ]
}

/// Writes the five parameter files into the working directory, then runs every step of
/// [`plan`] in order. The first step that cannot be launched or exits non-zero ends the run.
///
/// Files produced by GROMACS before a failure are left in place.
#[instrument(skip_all, name = "prepare_workflow", fields(structure = %config.structure_name))]
pub fn run(
    config: &PipelineConfig,
    executor: &dyn CommandExecutor,
    reporter: &ProgressReporter,
) -> Result<PipelineSummary, EngineError> {
    let started = Instant::now();

    let structure = config.structure_path();
    if !structure.is_file() {
        return Err(EngineError::MissingStructure(structure));
    }

    // === Phase 0: Parameter files ===
    reporter.report(Progress::PhaseStart {
        name: "Writing parameter files",
    });
    let parameter_files =
        templates::write_all(&config.working_dir, &config.parameters, &config.templates)?;
    info!(
        "Wrote {} parameter files to {:?} (T = {} K, {} ns, nsteps = {}).",
        parameter_files.len(),
        &config.working_dir,
        config.parameters.temperature(),
        config.parameters.length_ns(),
        config.parameters.total_steps()
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Tool pipeline ===
    let steps = plan(config);
    reporter.report(Progress::PipelineStart {
        total_steps: steps.len() as u64,
    });

    let mut records = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        records.push(run_step(i + 1, step, executor, reporter)?);
    }
    reporter.report(Progress::PipelineFinish);

    let summary = PipelineSummary {
        parameter_files,
        steps: records,
        production_name: config.parameters.production_name(),
        elapsed: started.elapsed(),
    };
    info!(
        "Preparation complete: {} steps in {:.1}s, production output '{}'.",
        summary.steps.len(),
        summary.elapsed.as_secs_f64(),
        summary.production_name
    );
    Ok(summary)
}

fn run_step(
    index: usize,
    step: &PipelineStep,
    executor: &dyn CommandExecutor,
    reporter: &ProgressReporter,
) -> Result<StepRecord, EngineError> {
    reporter.report(Progress::StepStart {
        index,
        stage: step.stage.name(),
        name: step.name,
    });
    info!("Step {} ({}): {}", index, step.stage.name(), step.name);
    debug!("Command: {}", step.command);

    let started = Instant::now();
    let output = executor.execute(&step.command).map_err(|source| {
        reporter.report(Progress::StepFailed {
            index,
            name: step.name,
        });
        EngineError::Launch {
            step: step.name,
            program: step.command.program.clone(),
            source,
        }
    })?;
    let elapsed = started.elapsed();

    if !output.stdout.is_empty() {
        debug!("{} stdout:\n{}", step.name, output.stdout);
    }
    if !output.stderr.is_empty() {
        debug!("{} stderr:\n{}", step.name, output.stderr);
    }

    if !output.success() {
        debug!("Step '{}' failed with {}.", step.name, output.status_text());
        reporter.report(Progress::StepFailed {
            index,
            name: step.name,
        });
        return Err(EngineError::CommandFailed {
            step: step.name,
            command: step.command.to_string(),
            status: output.status_text(),
            stderr_tail: output.stderr_tail(STDERR_TAIL_LINES),
        });
    }

    debug!("Step '{}' finished in {:.2}s.", step.name, elapsed.as_secs_f64());
    reporter.report(Progress::StepFinish {
        index,
        name: step.name,
        elapsed,
    });
    Ok(StepRecord {
        stage: step.stage,
        name: step.name,
        elapsed,
    })
}

fn step(stage: Stage, name: &'static str, command: CommandSpec) -> PipelineStep {
    PipelineStep {
        stage,
        name,
        command,
    }
}

// editconf accepts any float, but "1.0" reads better than "1" in logs and dry runs.
fn format_distance(nm: f64) -> String {
    if nm.fract() == 0.0 {
        format!("{:.1}", nm)
    } else {
        nm.to_string()
    }
}
