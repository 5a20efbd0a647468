//! # Engine Module
//!
//! The execution layer of groauto: everything needed to turn a validated configuration into
//! external GROMACS processes, one at a time.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - `PipelineConfig` and its builder, holding the working
//!   directory, the input structure, the simulation parameters and the tool knobs that the
//!   GROMACS menus make fragile (force-field and solvent-group selections).
//! - **Process Execution** ([`process`]) - `CommandSpec` / `CommandOutput` and the
//!   `CommandExecutor` trait, with `SystemExecutor` as the real implementation.
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front-ends.
//! - **Error Handling** ([`error`]) - `EngineError`, the single error type of the pipeline.
//!
//! Execution is strictly sequential: a command is started only after the previous one has
//! exited successfully.

pub mod config;
pub mod error;
pub mod process;
pub mod progress;
