//! Interactive questions for values given neither on the command line nor in a config file.
//!
//! Questions are written to stderr so stdout stays clean for command output. End of input
//! counts as a blank answer.

use crate::error::{CliError, Result};
use std::io::{self, BufRead, StdinLock, Stderr, Write};

pub trait Prompt {
    /// Asks `question` and returns the trimmed answer, or `None` for a blank line or end of input.
    fn ask(&mut self, question: &str) -> Result<Option<String>>;
}

pub struct ConsolePrompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl ConsolePrompter<StdinLock<'static>, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for ConsolePrompter<R, W> {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            // Keep the next message off the prompt line.
            writeln!(self.output)?;
        }
        let answer = line.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }
}

pub fn ask_temperature(prompt: &mut dyn Prompt, default: f64) -> Result<f64> {
    let answer = prompt.ask(&format!(
        "Enter the temperature in Kelvin (default is {} K): ",
        default
    ))?;
    parse_answer(answer, default, "temperature")
}

pub fn ask_length(prompt: &mut dyn Prompt, default: f64) -> Result<f64> {
    let answer = prompt.ask(&format!(
        "Enter the simulation length in ns (default is {} ns): ",
        default
    ))?;
    parse_answer(answer, default, "simulation length")
}

pub fn ask_structure(prompt: &mut dyn Prompt) -> Result<String> {
    let answer = prompt.ask("Enter the name of the PDB file (without .pdb extension): ")?;
    answer
        .map(|name| normalize_structure_name(&name))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| CliError::Argument("A structure name is required.".to_string()))
}

/// Drops a trailing `.pdb`, so `abc` and `abc.pdb` name the same input.
pub fn normalize_structure_name(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix(".pdb").unwrap_or(name).to_string()
}

fn parse_answer(answer: Option<String>, default: f64, what: &str) -> Result<f64> {
    match answer {
        None => Ok(default),
        Some(text) => crate::cli::parse_positive(&text)
            .map_err(|reason| CliError::Argument(format!("Invalid {}: {}", what, reason))),
    }
}
