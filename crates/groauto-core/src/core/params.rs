use thiserror::Error;

pub const DEFAULT_TEMPERATURE_K: f64 = 298.0;
pub const DEFAULT_LENGTH_NS: f64 = 50.0;

/// Integration steps per nanosecond at the 1 fs timestep used by every dynamics template.
pub const STEPS_PER_NS: f64 = 1_000_000.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    #[error("{name} must be a finite, positive number (got {value})")]
    NotPositive { name: &'static str, value: f64 },

    #[error("Simulation length of {0} ns does not fit in a step count")]
    TooManySteps(f64),
}

/// The two user-facing knobs of a preparation run, and the values derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    temperature_k: f64,
    length_ns: f64,
}

impl SimulationParameters {
    pub fn new(temperature_k: f64, length_ns: f64) -> Result<Self, ParameterError> {
        check_positive("temperature", temperature_k)?;
        check_positive("simulation length", length_ns)?;
        if length_ns * STEPS_PER_NS >= u64::MAX as f64 {
            return Err(ParameterError::TooManySteps(length_ns));
        }
        Ok(Self {
            temperature_k,
            length_ns,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature_k
    }

    pub fn length_ns(&self) -> f64 {
        self.length_ns
    }

    /// Production-stage `nsteps`: `length × 1 000 000`.
    ///
    /// The product is rounded rather than truncated so that lengths such as `2.3` ns, which
    /// are not exact in binary floating point, still give `2300000` steps.
    pub fn total_steps(&self) -> u64 {
        (self.length_ns * STEPS_PER_NS).round() as u64
    }

    /// The deffnm shared by every production-stage artifact, e.g. `md_50ns`.
    pub fn production_name(&self) -> String {
        format!("md_{}ns", self.length_ns)
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            temperature_k: DEFAULT_TEMPERATURE_K,
            length_ns: DEFAULT_LENGTH_NS,
        }
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::NotPositive { name, value })
    }
}
