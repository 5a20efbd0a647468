use super::config::ConfigError;
use crate::core::mdp::templates::TemplateWriteError;
use crate::core::params::ParameterError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid simulation parameters: {0}")]
    Parameters(#[from] ParameterError),

    #[error("Invalid pipeline configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    TemplateWrite(#[from] TemplateWriteError),

    #[error("Input structure not found: {}", .0.display())]
    MissingStructure(PathBuf),

    #[error("Failed to launch '{program}' for step '{step}': {source}")]
    Launch {
        step: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Step '{step}' failed with {status}: {command}{}", stderr_suffix(.stderr_tail))]
    CommandFailed {
        step: &'static str,
        command: String,
        status: String,
        stderr_tail: String,
    },
}

fn stderr_suffix(tail: &str) -> String {
    if tail.is_empty() {
        String::new()
    } else {
        format!("\n{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failure_message_names_step_status_and_stderr() {
        let err = EngineError::CommandFailed {
            step: "solvate",
            command: "gmx solvate -cp box.gro".to_string(),
            status: "exit code 1".to_string(),
            stderr_tail: "Fatal error:\nFile box.gro not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Step 'solvate' failed with exit code 1: gmx solvate -cp box.gro\nFatal error:\nFile box.gro not found"
        );
    }

    #[test]
    fn command_failure_without_stderr_is_one_line() {
        let err = EngineError::CommandFailed {
            step: "em-mdrun",
            command: "gmx mdrun -v -deffnm em".to_string(),
            status: "termination by signal".to_string(),
            stderr_tail: String::new(),
        };
        assert!(!err.to_string().contains('\n'));
    }
}
