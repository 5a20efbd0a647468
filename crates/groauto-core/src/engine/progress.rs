use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// The tool pipeline is about to run `total_steps` commands.
    PipelineStart { total_steps: u64 },
    StepStart {
        index: usize,
        stage: &'static str,
        name: &'static str,
    },
    StepFinish {
        index: usize,
        name: &'static str,
        elapsed: Duration,
    },
    StepFailed {
        index: usize,
        name: &'static str,
    },
    PipelineFinish,
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
