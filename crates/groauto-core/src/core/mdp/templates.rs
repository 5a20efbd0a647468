//! The five stage templates written before the tool pipeline starts.
//!
//! Apart from the coupling temperature, the production step count and the compressed
//! trajectory interval, every value here is fixed boilerplate. All dynamics stages use a
//! 1 fs timestep, which is what ties `nsteps` to the requested length in nanoseconds.

use super::MdpFile;
use crate::core::params::SimulationParameters;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Compressed-trajectory output interval of the production stage (every 5 ps at 1 fs).
pub const DEFAULT_TRAJECTORY_INTERVAL: u64 = 5000;

const TIMESTEP_PS: &str = "0.001";
const EQUILIBRATION_STEPS: u64 = 50_000;
const MINIMIZATION_STEPS: u64 = 50_000;
const COUPLING_GROUPS: &str = "Protein Non-Protein";

#[derive(Debug, Error)]
#[error("Failed to write parameter file '{}': {source}", .path.display())]
pub struct TemplateWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageFile {
    Ions,
    Minimization,
    Nvt,
    Npt,
    Production,
}

impl StageFile {
    pub const ALL: [StageFile; 5] = [
        StageFile::Ions,
        StageFile::Minimization,
        StageFile::Nvt,
        StageFile::Npt,
        StageFile::Production,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            StageFile::Ions => "ions.mdp",
            StageFile::Minimization => "minim.mdp",
            StageFile::Nvt => "nvt.mdp",
            StageFile::Npt => "npt.mdp",
            StageFile::Production => "md.mdp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateOptions {
    pub trajectory_interval: u64,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            trajectory_interval: DEFAULT_TRAJECTORY_INTERVAL,
        }
    }
}

pub fn render(
    stage: StageFile,
    params: &SimulationParameters,
    options: &TemplateOptions,
) -> MdpFile {
    match stage {
        StageFile::Ions => ions(),
        StageFile::Minimization => minimization(),
        StageFile::Nvt => nvt(params),
        StageFile::Npt => npt(params),
        StageFile::Production => production(params, options),
    }
}

/// Writes all five files into `dir`, overwriting any previous versions, and returns their
/// paths in pipeline order.
pub fn write_all(
    dir: &Path,
    params: &SimulationParameters,
    options: &TemplateOptions,
) -> Result<Vec<PathBuf>, TemplateWriteError> {
    StageFile::ALL
        .iter()
        .map(|&stage| {
            let path = dir.join(stage.file_name());
            debug!("Writing {:?}", &path);
            render(stage, params, options)
                .write_to_path(&path)
                .map_err(|source| TemplateWriteError {
                    path: path.clone(),
                    source,
                })?;
            Ok(path)
        })
        .collect()
}

fn ions() -> MdpFile {
    MdpFile::new().with("integrator", "steep")
}

fn minimization() -> MdpFile {
    MdpFile::new()
        .with("integrator", "steep")
        .with("emtol", "1000.0")
        .with("emstep", "0.01")
        .with("nsteps", MINIMIZATION_STEPS)
        .with("nstlist", 1)
        .with("cutoff-scheme", "Verlet")
        .with("ns_type", "grid")
        .with("coulombtype", "PME")
        .with("rcoulomb", "1.0")
        .with("rvdw", "1.0")
        .with("pbc", "xyz")
}

// Position-restrained, temperature-coupled, no pressure coupling.
fn nvt(params: &SimulationParameters) -> MdpFile {
    MdpFile::new()
        .with("define", "-DPOSRES")
        .with("integrator", "md")
        .with("dt", TIMESTEP_PS)
        .with("nsteps", EQUILIBRATION_STEPS)
        .with("nstxout", 500)
        .with("tcoupl", "v-rescale")
        .with("tc-grps", COUPLING_GROUPS)
        .with("tau_t", "0.1     0.1")
        .with("ref_t", reference_temperature(params))
        .with("pcoupl", "no")
        .with("pbc", "xyz")
}

fn npt(params: &SimulationParameters) -> MdpFile {
    MdpFile::new()
        .with("define", "-DPOSRES")
        .with("integrator", "md")
        .with("dt", TIMESTEP_PS)
        .with("nsteps", EQUILIBRATION_STEPS)
        .with("nstxout", 500)
        .with("tcoupl", "v-rescale")
        .with("tc-grps", COUPLING_GROUPS)
        .with("tau_t", "0.1     0.1")
        .with("ref_t", reference_temperature(params))
        .with("pcoupl", "c-rescale")
        .with("pcoupltype", "isotropic")
        .with("tau_p", "2.0")
        .with("compressibility", "4.5e-5")
        .with("ref_p", "1.0")
        .with("refcoord_scaling", "com")
        .with("coulombtype", "PME")
        .with("rcoulomb", "1.0")
        .with("fourierspacing", "0.12")
        .with("pme_order", 4)
        .with("constraints", "h-bonds")
}

fn production(params: &SimulationParameters, options: &TemplateOptions) -> MdpFile {
    MdpFile::new()
        .with("integrator", "md")
        .with("dt", TIMESTEP_PS)
        .with("nsteps", params.total_steps())
        .with("nstxout-compressed", options.trajectory_interval)
        .with("tcoupl", "v-rescale")
        .with("tc-grps", COUPLING_GROUPS)
        .with("tau_t", "0.1     0.1")
        .with("ref_t", reference_temperature(params))
        .with("pcoupl", "c-rescale")
        .with("pcoupltype", "isotropic")
        .with("tau_p", "2.0")
        .with("ref_p", "1.0")
        .with("compressibility", "4.5e-5")
        .with("coulombtype", "PME")
        .with("rcoulomb", "1.0")
        .with("fourierspacing", "0.12")
        .with("pme_order", 4)
        .with("vdw-type", "Cut-off")
        .with("rvdw", "1.0")
        .with("compressed-x-grps", "Protein")
}

// One value per coupling group.
fn reference_temperature(params: &SimulationParameters) -> String {
    let t = params.temperature();
    format!("{t}     {t}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ref_t_values(file: &MdpFile) -> Vec<f64> {
        file.get("ref_t")
            .expect("ref_t present")
            .split_whitespace()
            .map(|v| v.parse().unwrap())
            .collect()
    }

    #[test]
    fn production_with_defaults_runs_fifty_million_steps_at_298() {
        let file = render(
            StageFile::Production,
            &SimulationParameters::default(),
            &TemplateOptions::default(),
        );
        assert_eq!(file.get("nsteps"), Some("50000000"));
        assert_eq!(file.get("nstxout-compressed"), Some("5000"));
        assert_eq!(ref_t_values(&file), vec![298.0, 298.0]);
    }

    #[test]
    fn temperature_appears_for_both_coupling_groups_in_every_coupled_stage() {
        let params = SimulationParameters::new(310.5, 10.0).unwrap();
        for stage in [StageFile::Nvt, StageFile::Npt, StageFile::Production] {
            let file = render(stage, &params, &TemplateOptions::default());
            assert_eq!(file.get("tc-grps"), Some("Protein Non-Protein"));
            assert_eq!(ref_t_values(&file), vec![310.5, 310.5], "{stage:?}");
        }
        for stage in [StageFile::Ions, StageFile::Minimization] {
            assert!(render(stage, &params, &TemplateOptions::default()).get("ref_t").is_none());
        }
    }

    #[test]
    fn ref_t_is_rendered_from_the_numeric_temperature() {
        let whole = SimulationParameters::new(300.0, 1.0).unwrap();
        let fractional = SimulationParameters::new(298.15, 1.0).unwrap();
        let options = TemplateOptions::default();

        assert_eq!(render(StageFile::Nvt, &whole, &options).get("ref_t"), Some("300     300"));
        assert_eq!(
            render(StageFile::Production, &fractional, &options).get("ref_t"),
            Some("298.15     298.15")
        );
    }

    #[test]
    fn only_production_depends_on_length() {
        let short = SimulationParameters::new(298.0, 1.0).unwrap();
        let long = SimulationParameters::new(298.0, 200.0).unwrap();
        let options = TemplateOptions::default();
        for stage in [StageFile::Ions, StageFile::Minimization, StageFile::Nvt, StageFile::Npt] {
            assert_eq!(render(stage, &short, &options), render(stage, &long, &options));
        }
        assert_eq!(
            render(StageFile::Production, &long, &options).get("nsteps"),
            Some("200000000")
        );
    }

    #[test]
    fn equilibration_stages_restrain_positions() {
        let params = SimulationParameters::default();
        let nvt = render(StageFile::Nvt, &params, &TemplateOptions::default());
        let npt = render(StageFile::Npt, &params, &TemplateOptions::default());
        assert_eq!(nvt.get("define"), Some("-DPOSRES"));
        assert_eq!(nvt.get("pcoupl"), Some("no"));
        assert_eq!(npt.get("define"), Some("-DPOSRES"));
        assert_eq!(npt.get("pcoupl"), Some("c-rescale"));
    }

    #[test]
    fn trajectory_interval_is_configurable() {
        let file = render(
            StageFile::Production,
            &SimulationParameters::default(),
            &TemplateOptions {
                trajectory_interval: 10_000,
            },
        );
        assert_eq!(file.get("nstxout-compressed"), Some("10000"));
    }

    #[test]
    fn write_all_creates_five_files_in_pipeline_order() {
        let dir = TempDir::new().unwrap();
        let paths = write_all(
            dir.path(),
            &SimulationParameters::default(),
            &TemplateOptions::default(),
        )
        .unwrap();

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["ions.mdp", "minim.mdp", "nvt.mdp", "npt.mdp", "md.mdp"]);
        assert!(paths.iter().all(|p| p.is_file()));

        let ions = std::fs::read_to_string(dir.path().join("ions.mdp")).unwrap();
        assert_eq!(MdpFile::parse(&ions).get("integrator"), Some("steep"));
    }

    #[test]
    fn rewriting_with_new_parameters_leaves_no_stale_values() {
        let dir = TempDir::new().unwrap();
        let options = TemplateOptions::default();
        write_all(dir.path(), &SimulationParameters::new(350.0, 100.0).unwrap(), &options).unwrap();
        write_all(dir.path(), &SimulationParameters::new(300.0, 2.0).unwrap(), &options).unwrap();

        let md = std::fs::read_to_string(dir.path().join("md.mdp")).unwrap();
        let npt = std::fs::read_to_string(dir.path().join("npt.mdp")).unwrap();
        assert!(!md.contains("350") && !md.contains("100000000"));
        assert!(!npt.contains("350"));
        assert_eq!(MdpFile::parse(&md).get("nsteps"), Some("2000000"));
        assert_eq!(
            MdpFile::parse(&md),
            render(StageFile::Production, &SimulationParameters::new(300.0, 2.0).unwrap(), &options)
        );
    }

    #[test]
    fn write_all_reports_the_failing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = write_all(
            &missing,
            &SimulationParameters::default(),
            &TemplateOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.path, missing.join("ions.mdp"));
    }
}
