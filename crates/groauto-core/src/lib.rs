//! # groauto Core Library
//!
//! Automated preparation of solvated protein systems for GROMACS: the library writes the
//! stage parameter files and drives the GROMACS command-line tools through a fixed,
//! fail-fast pipeline from an input PDB structure to a production trajectory.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data: the simulation parameters and the
//!   `.mdp` parameter-file model with its stage templates.
//!
//! - **[`engine`]: The Execution Layer.** Pipeline configuration, the external process
//!   abstraction (`CommandExecutor`), progress reporting and the error taxonomy.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into the complete
//!   preparation procedure (parameter files, topology, solvation, ions, minimization,
//!   equilibration, production).

pub mod core;
pub mod engine;
pub mod workflows;
