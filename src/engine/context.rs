//! State shared by every layer of one interpreter.

use std::collections::{BTreeMap, HashMap};

use crate::config::{Config, EvaluatorConfig, Settings};
use crate::parse::{Lookup, tokenize};

/// The general-purpose registers saved and restored by `call`/`return`.
pub const REGISTERS: [&str; 8] = ["R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7"];

/// Values pushed by one `call`: the return cursor then every register.
pub const FRAME_LEN: usize = REGISTERS.len() + 1;

pub const RET: &str = "ret";
pub const SUBPROC: &str = "subproc";
pub const RESULT: &str = "result";
pub const RESPONSE: &str = "response";
pub const FILE_READ: &str = "file_read";

/// The process-wide variable table.
///
/// Registers exist from the start with the value `"0"` and are never
/// removed. Undefined names read as the empty string.
#[derive(Debug, Clone)]
pub struct Variables {
    map: HashMap<String, String>,
}

impl Default for Variables {
    fn default() -> Self {
        let map = REGISTERS
            .iter()
            .map(|r| (r.to_string(), "0".to_string()))
            .collect();
        Self { map }
    }
}

impl Variables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// The value of `name`, or `""` when undefined.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.map.insert(name.to_string(), value.into());
    }

    /// Remove `name`. Registers are reset to `"0"` instead.
    pub fn unset(&mut self, name: &str) {
        if REGISTERS.contains(&name) {
            self.set(name, "0");
        } else {
            self.map.remove(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn registers(&self) -> [String; 8] {
        REGISTERS.map(|r| self.value(r).to_string())
    }
}

impl Lookup for Variables {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

/// One entry on the shared stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackValue {
    /// A return position pushed by `call`.
    Cursor(usize),
    Text(String),
}

impl StackValue {
    /// The entry as text; a cursor reads as its number.
    pub fn into_text(self) -> String {
        match self {
            StackValue::Cursor(c) => c.to_string(),
            StackValue::Text(s) => s,
        }
    }
}

/// A `call` frame as it comes off the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub cursor: usize,
    pub registers: [String; 8],
}

/// The LIFO shared by user `push`/`pop` and `call`/`return`.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    items: Vec<StackValue>,
}

impl Stack {
    pub fn push(&mut self, value: StackValue) {
        self.items.push(value);
    }

    pub fn pop(&mut self) -> Option<StackValue> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[StackValue] {
        &self.items
    }

    /// Push the return cursor followed by `R0`..`R7`.
    pub fn push_frame(&mut self, cursor: usize, registers: [String; 8]) {
        self.items.push(StackValue::Cursor(cursor));
        self.items
            .extend(registers.into_iter().map(StackValue::Text));
    }

    /// Pop a frame pushed by [`push_frame`](Self::push_frame).
    ///
    /// The top [`FRAME_LEN`] entries must be eight texts over one cursor.
    /// Anything else leaves the stack untouched and returns `None`.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        let base = self.items.len().checked_sub(FRAME_LEN)?;
        let StackValue::Cursor(cursor) = self.items[base] else {
            return None;
        };
        if !self.items[base + 1..]
            .iter()
            .all(|v| matches!(v, StackValue::Text(_)))
        {
            return None;
        }
        let mut registers: [String; 8] = Default::default();
        for (slot, value) in registers.iter_mut().zip(self.items.drain(base + 1..)) {
            *slot = value.into_text();
        }
        self.items.truncate(base);
        Some(Frame { cursor, registers })
    }
}

/// Module keywords and the programs they run.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    programs: BTreeMap<String, String>,
    shell: String,
}

impl ModuleRegistry {
    pub fn from_config(config: &Config) -> Self {
        Self {
            programs: config.modules.programs.clone(),
            shell: config.settings.shell_keyword().to_string(),
        }
    }

    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.programs.get(keyword).map(String::as_str)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.programs.contains_key(keyword)
    }

    pub fn set(&mut self, keyword: &str, program: &str) {
        self.programs.insert(keyword.to_string(), program.to_string());
    }

    pub fn remove(&mut self, keyword: &str) {
        self.programs.remove(keyword);
    }

    /// The argv for running `keyword` with `args`.
    ///
    /// The shell keyword runs its arguments directly (through `cmd /C` on
    /// Windows); any other keyword prepends its program.
    pub fn command_line(&self, keyword: &str, args: &str) -> Vec<String> {
        let mut argv = tokenize(args);
        if keyword == self.shell {
            if cfg!(windows) {
                argv.splice(0..0, ["cmd".to_string(), "/C".to_string()]);
            }
        } else if let Some(program) = self.get(keyword) {
            argv.insert(0, program.to_string());
        }
        argv
    }
}

/// Everything the layers of one interpreter share.
#[derive(Debug, Clone)]
pub struct Context {
    pub vars: Variables,
    pub stack: Stack,
    pub modules: ModuleRegistry,
    pub settings: Settings,
    pub evaluator: EvaluatorConfig,
}

impl Context {
    pub fn new(config: &Config) -> Self {
        Self {
            vars: Variables::default(),
            stack: Stack::default(),
            modules: ModuleRegistry::from_config(config),
            settings: config.settings.clone(),
            evaluator: config.evaluator.clone(),
        }
    }

    /// Whether `value` is the deletion sentinel.
    pub fn is_sentinel(&self, value: &str) -> bool {
        value == self.settings.deletion_sentinel
    }

    /// Whether an `if` condition's stored result counts as false.
    pub fn is_falsy(&self, result: &str) -> bool {
        self.evaluator.falsy.iter().any(|f| f == result)
    }
}
