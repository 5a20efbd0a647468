//! External process execution.
//!
//! Every GROMACS invocation goes through [`CommandExecutor`]. Programs are launched directly
//! with an argument vector, never through a shell, and the optional stdin payload answers the
//! tool's interactive selection prompt.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// Lines of each captured stream kept in memory; earlier lines are discarded as they arrive.
const CAPTURED_LINES: usize = 200;
/// Longer lines are cut to this many bytes.
const MAX_LINE_BYTES: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Collect the tail of stdout/stderr into the [`CommandOutput`]; stdin is closed unless a
    /// payload is given.
    #[default]
    Capture,
    /// Let the child write straight to the terminal and read from it.
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
    pub working_dir: PathBuf,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            working_dir: PathBuf::from("."),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// A single line fed to the process; the trailing newline is added on write.
    pub fn stdin(mut self, payload: impl Into<String>) -> Self {
        self.stdin = Some(payload.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        if let Some(payload) = &self.stdin {
            write!(f, " <<< {}", quote(payload))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    if !s.is_empty() && !s.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn status_text(&self) -> String {
        self.code.map_or_else(
            || "termination by signal".to_string(),
            |code| format!("exit code {}", code),
        )
    }

    /// The last `lines` non-empty lines of stderr.
    ///
    /// Carriage returns end a line too, so `mdrun -v` progress updates count one line each.
    /// Each kept line is cut to a bounded length.
    pub fn stderr_tail(&self, lines: usize) -> String {
        let kept: Vec<&str> = self
            .stderr
            .split(['\n', '\r'])
            .filter(|l| !l.trim().is_empty())
            .collect();
        kept[kept.len().saturating_sub(lines)..]
            .iter()
            .map(|l| truncate_line(l))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub trait CommandExecutor {
    /// Runs `command` to completion.
    ///
    /// A non-zero exit is reported through [`CommandOutput::code`], not as an error; `Err` means
    /// the process could not be started or its pipes failed.
    fn execute(&self, command: &CommandSpec) -> io::Result<CommandOutput>;
}

/// Runs commands as real child processes of this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor {
    output_mode: OutputMode,
}

impl SystemExecutor {
    pub fn new(output_mode: OutputMode) -> Self {
        Self { output_mode }
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }
}

impl CommandExecutor for SystemExecutor {
    fn execute(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).current_dir(&spec.working_dir);

        let (stdin, stdout, stderr) = match (self.output_mode, spec.stdin.is_some()) {
            (_, true) => (Stdio::piped(), self.output_stdio(), self.output_stdio()),
            (OutputMode::Capture, false) => (Stdio::null(), Stdio::piped(), Stdio::piped()),
            (OutputMode::Inherit, false) => (Stdio::inherit(), Stdio::inherit(), Stdio::inherit()),
        };
        command.stdin(stdin).stdout(stdout).stderr(stderr);

        debug!("Spawning: {}", spec);
        let mut child = command.spawn()?;

        // The tool may print more than a pipe buffer before reading its selection, so the
        // payload is written from its own thread while the output pipes are drained.
        let writer = match (spec.stdin.as_ref(), child.stdin.take()) {
            (Some(payload), Some(mut pipe)) => {
                let line = format!("{}\n", payload);
                Some(thread::spawn(move || match pipe.write_all(line.as_bytes()) {
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    other => other,
                }))
            }
            _ => None,
        };

        let stdout_reader = child.stdout.take().map(spawn_tail_reader);
        let stderr_reader = child.stderr.take().map(spawn_tail_reader);
        let status = child.wait()?;

        if let Some(handle) = writer {
            handle
                .join()
                .map_err(|_| io::Error::other("stdin writer thread panicked"))??;
        }

        let result = CommandOutput {
            code: status.code(),
            stdout: join_tail_reader(stdout_reader)?,
            stderr: join_tail_reader(stderr_reader)?,
        };
        trace!(
            "Process finished with {} ({} bytes stdout, {} bytes stderr)",
            result.status_text(),
            result.stdout.len(),
            result.stderr.len()
        );
        Ok(result)
    }
}

impl SystemExecutor {
    fn output_stdio(&self) -> Stdio {
        match self.output_mode {
            OutputMode::Capture => Stdio::piped(),
            OutputMode::Inherit => Stdio::inherit(),
        }
    }
}

fn truncate_line(line: &str) -> &str {
    if line.len() <= MAX_LINE_BYTES {
        return line;
    }
    let mut end = MAX_LINE_BYTES;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Keeps the last lines of a byte stream, splitting on `\n` and `\r`.
#[derive(Debug)]
struct TailBuffer {
    lines: VecDeque<Vec<u8>>,
    current: Vec<u8>,
    capacity: usize,
}

impl TailBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            current: Vec::new(),
            capacity,
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        for &b in bytes {
            match b {
                b'\n' | b'\r' => self.end_line(),
                _ if self.current.len() < MAX_LINE_BYTES => self.current.push(b),
                _ => {}
            }
        }
    }

    fn end_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(std::mem::take(&mut self.current));
    }

    fn finish(mut self) -> String {
        self.end_line();
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(&String::from_utf8_lossy(line));
            text.push('\n');
        }
        text
    }
}

fn read_tail(mut reader: impl Read) -> io::Result<String> {
    let mut tail = TailBuffer::new(CAPTURED_LINES);
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => tail.push(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(tail.finish())
}

fn spawn_tail_reader<R: Read + Send + 'static>(pipe: R) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || read_tail(pipe))
}

fn join_tail_reader(handle: Option<JoinHandle<io::Result<String>>>) -> io::Result<String> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| io::Error::other("output reader thread panicked"))?,
        None => Ok(String::new()),
    }
}
