//! # Workflows Module
//!
//! High-level entry points that run complete procedures on top of `core` and `engine`.
//!
//! - **System Preparation** ([`prepare`]) - Writes the stage parameter files and runs the
//!   GROMACS tools from an input PDB structure through topology generation, solvation, ion
//!   neutralization, energy minimization, NVT and NPT equilibration to the production run.
//!   Each tool's output files feed the next tool by name, and the first failing tool stops
//!   the whole procedure.

pub mod prepare;
