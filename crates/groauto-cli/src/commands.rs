pub mod config;
pub mod mdp;
pub mod run;
