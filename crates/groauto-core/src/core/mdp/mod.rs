//! GROMACS `.mdp` parameter files.
//!
//! An [`MdpFile`] is an ordered list of `key = value` entries. Order is preserved on output so
//! generated files read like hand-written ones and diff cleanly between runs.

pub mod templates;

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Column at which the `=` of every entry is aligned.
const KEY_WIDTH: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdpEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdpFile {
    entries: Vec<MdpEntry>,
}

impl MdpFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key`, replacing the value in place if the key is already present.
    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(MdpEntry {
                key: key.to_string(),
                value,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    pub fn entries(&self) -> &[MdpEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses `key = value` lines. Blank lines and `;` comments are skipped, as are lines
    /// without an `=`.
    #[cfg(test)]
    pub(crate) fn parse(text: &str) -> Self {
        let mut file = Self::new();
        for line in text.lines() {
            let line = line.split(';').next().unwrap_or("").trim();
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    file.set(key, value.trim());
                }
            }
        }
        file
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        write!(writer, "{}", self)
    }

    /// Creates (or truncates) `path` and writes the file to it.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()
    }
}

impl fmt::Display for MdpFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{:<width$}= {}", entry.key, entry.value, width = KEY_WIDTH)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_replaces_existing_key_without_reordering() {
        let mut file = MdpFile::new().with("integrator", "md").with("nsteps", 10);
        file.set("integrator", "steep");

        assert_eq!(file.len(), 2);
        assert_eq!(file.entries()[0].key, "integrator");
        assert_eq!(file.get("integrator"), Some("steep"));
        assert_eq!(file.get("nsteps"), Some("10"));
    }

    #[test]
    fn display_aligns_values() {
        let file = MdpFile::new().with("dt", 0.001).with("tc-grps", "Protein Non-Protein");
        let text = file.to_string();
        assert_eq!(
            text,
            "dt                      = 0.001\ntc-grps                 = Protein Non-Protein\n"
        );
    }

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let text = "; header\n\nintegrator = md ; inline\nref_t = 300     300\nnot a pair\n";
        let file = MdpFile::parse(text);
        assert_eq!(file.len(), 2);
        assert_eq!(file.get("integrator"), Some("md"));
        assert_eq!(file.get("ref_t"), Some("300     300"));
    }

    #[test]
    fn parse_reads_back_rendered_output() {
        let original = MdpFile::new()
            .with("integrator", "md")
            .with("nstxout-compressed", 5000)
            .with("compressibility", "4.5e-5");
        assert_eq!(MdpFile::parse(&original.to_string()), original);
    }

    #[test]
    fn write_to_path_truncates_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.mdp");
        std::fs::write(&path, "stale = value\n".repeat(50)).unwrap();

        MdpFile::new().with("integrator", "steep").write_to_path(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert_eq!(MdpFile::parse(&content).len(), 1);
    }
}
