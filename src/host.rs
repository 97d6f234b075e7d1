//! The interpreter's window on the outside world.
//!
//! Everything that blocks or touches the operating system goes through
//! [`Host`]: terminal output, interactive input, sleeping, sub-processes and
//! plain text files. [`SystemHost`] is backed by std with rustyline for line
//! editing; [`MemoryHost`] keeps everything in memory for tests and
//! embedding.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io::Write;
use std::time::Duration;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// One attempt to read an interactive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    /// A line, without its terminator.
    Line(String),
    /// The read was interrupted before a line arrived.
    Interrupted,
    /// Input is exhausted.
    Eof,
}

/// Captured result of a finished sub-process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output followed by standard error.
    pub text: String,
    /// Human-readable exit status.
    pub status: String,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait Host {
    /// Print `text` followed by a newline.
    fn print(&mut self, text: &str);

    /// Write `text` exactly as given.
    fn write(&mut self, text: &str);

    fn read_line(&mut self, prompt: &str) -> ReadLine;

    fn sleep(&mut self, ms: u64);

    /// Run `argv[0]` with the remaining words as arguments and wait for it.
    fn run_process(&mut self, argv: &[String]) -> Result<ProcessOutput, HostError>;

    fn read_file(&mut self, path: &str) -> Result<String, HostError>;

    /// Append `data` to `path`, creating it if needed.
    fn append_file(&mut self, path: &str, data: &str) -> Result<(), HostError>;

    /// Truncate `path` to zero length, creating it if needed.
    fn clear_file(&mut self, path: &str) -> Result<(), HostError>;
}

/// A host backed by the real terminal, file system and process table.
///
/// Interactive reads go through a rustyline editor, created on first use,
/// so Ctrl-C and Ctrl-D arrive as [`ReadLine::Interrupted`] and
/// [`ReadLine::Eof`] instead of ending the process.
#[derive(Default)]
pub struct SystemHost {
    editor: Option<DefaultEditor>,
}

impl SystemHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn editor(&mut self) -> Option<&mut DefaultEditor> {
        if self.editor.is_none() {
            match DefaultEditor::new() {
                Ok(editor) => self.editor = Some(editor),
                Err(e) => {
                    log::warn!("line editor unavailable: {e}");
                    return None;
                }
            }
        }
        self.editor.as_mut()
    }
}

impl std::fmt::Debug for SystemHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemHost")
            .field("editor", &self.editor.is_some())
            .finish()
    }
}

/// Map one rustyline read onto a [`ReadLine`].
fn from_readline(read: rustyline::Result<String>) -> ReadLine {
    match read {
        Ok(line) => ReadLine::Line(line),
        Err(ReadlineError::Interrupted) => ReadLine::Interrupted,
        Err(ReadlineError::Eof) => ReadLine::Eof,
        Err(e) => {
            log::warn!("interactive read failed: {e}");
            ReadLine::Eof
        }
    }
}

impl Host for SystemHost {
    fn print(&mut self, text: &str) {
        println!("{text}");
    }

    fn write(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn read_line(&mut self, prompt: &str) -> ReadLine {
        let Some(editor) = self.editor() else {
            return ReadLine::Eof;
        };
        let read = from_readline(editor.readline(prompt));
        if let ReadLine::Line(line) = &read
            && !line.trim().is_empty()
            && let Err(e) = editor.add_history_entry(line.as_str())
        {
            log::warn!("failed to add history entry: {e}");
        }
        read
    }

    fn sleep(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }

    fn run_process(&mut self, argv: &[String]) -> Result<ProcessOutput, HostError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(HostError::NotFound(String::new()));
        };
        let output = std::process::Command::new(program)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => HostError::NotFound(program.clone()),
                _ => HostError::Io(e),
            })?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ProcessOutput {
            text,
            status: output.status.to_string(),
        })
    }

    fn read_file(&mut self, path: &str) -> Result<String, HostError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn append_file(&mut self, path: &str, data: &str) -> Result<(), HostError> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    fn clear_file(&mut self, path: &str) -> Result<(), HostError> {
        std::fs::File::create(path)?;
        Ok(())
    }
}

/// A scripted, fully in-memory host.
///
/// Output accumulates in a transcript, input comes from a queue (empty queue
/// means end of input), files live in a map, and only registered programs
/// can be run.
#[derive(Debug, Default)]
pub struct MemoryHost {
    output: String,
    input: VecDeque<ReadLine>,
    files: BTreeMap<String, String>,
    programs: HashMap<String, String>,
    runs: Vec<Vec<String>>,
    sleeps: Vec<u64>,
    prompts: Vec<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue interactive lines.
    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input
            .extend(lines.into_iter().map(|l| ReadLine::Line(l.into())));
        self
    }

    /// Queue an interrupt as the next interactive read.
    pub fn with_interrupt(mut self) -> Self {
        self.input.push_back(ReadLine::Interrupted);
        self
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    /// Register a program that prints `text` when run.
    pub fn with_program(mut self, name: &str, text: &str) -> Self {
        self.programs.insert(name.to_string(), text.to_string());
        self
    }

    /// Everything printed so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The transcript split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.output.lines().map(String::from).collect()
    }

    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Every command line passed to [`Host::run_process`], in order.
    pub fn runs(&self) -> &[Vec<String>] {
        &self.runs
    }

    pub fn sleeps(&self) -> &[u64] {
        &self.sleeps
    }

    /// Every prompt shown for an interactive read, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Host for MemoryHost {
    fn print(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn read_line(&mut self, prompt: &str) -> ReadLine {
        self.prompts.push(prompt.to_string());
        self.input.pop_front().unwrap_or(ReadLine::Eof)
    }

    fn sleep(&mut self, ms: u64) {
        self.sleeps.push(ms);
    }

    fn run_process(&mut self, argv: &[String]) -> Result<ProcessOutput, HostError> {
        self.runs.push(argv.to_vec());
        let program = argv.first().cloned().unwrap_or_default();
        match self.programs.get(&program) {
            Some(text) => Ok(ProcessOutput {
                text: text.clone(),
                status: "exit status: 0".to_string(),
            }),
            None => Err(HostError::NotFound(program)),
        }
    }

    fn read_file(&mut self, path: &str) -> Result<String, HostError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::NotFound(path.to_string()))
    }

    fn append_file(&mut self, path: &str, data: &str) -> Result<(), HostError> {
        self.files.entry(path.to_string()).or_default().push_str(data);
        Ok(())
    }

    fn clear_file(&mut self, path: &str) -> Result<(), HostError> {
        self.files.insert(path.to_string(), String::new());
        Ok(())
    }
}
