//! sift: a small command-language interpreter.
//!
//! A program is a sequence of one-line commands separated by newlines or
//! unquoted semicolons. Commands see `$name` interpolation, can jump to and
//! call labels, push and pop a shared stack, evaluate screened arithmetic
//! expressions, run external programs through module keywords, and start
//! nested interpreter layers from scripts.
//!
//! # Architecture
//!
//! - **[`parse`]**: Delimiter matching, interpolation, command splitting and classification.
//! - **[`engine`]**: The per-layer dispatch loop, control flow and the expression gateway.
//! - **[`expr`]**: The closed expression evaluator and its deny-list screen.
//! - **[`host`]**: Terminal, file and process access: std-backed and in-memory hosts.
//! - **[`config`]**: Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]**: Command logging to `~/.local/share/sift/sift.log`.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Layer execution: dispatch loop, shared context, control flow.
pub mod engine;
/// The interpreter's error taxonomy.
pub mod error;
/// Expression lexer, parser and evaluator.
pub mod expr;
/// The host interface and its implementations.
pub mod host;
/// File-based command logging.
pub mod logging;
/// Text processing ahead of execution.
pub mod parse;

pub use engine::{Interpreter, LayerExit};
pub use error::SiftError;
pub use host::{Host, MemoryHost, SystemHost};

/// Run `text` with the default configuration on an in-memory host and
/// return the printed lines.
///
/// This is the main entry point for tests and simple usage. No interactive
/// input is available, so the run ends once `text` is exhausted.
pub fn run_script(text: &str) -> Vec<String> {
    let config = config::Config::default_config();
    let mut interp = Interpreter::new(&config, MemoryHost::new());
    interp.run(text);
    interp.host().lines()
}
