//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! - **Simulation Parameters** ([`params`]) - Temperature and length of the requested run,
//!   plus the values derived from them (step count, production file name).
//! - **Parameter Files** ([`mdp`]) - The `key = value` model of GROMACS `.mdp` files and the
//!   five stage templates written before the pipeline starts.

pub mod mdp;
pub mod params;
