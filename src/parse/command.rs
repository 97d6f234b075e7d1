//! Recognition of a single command line.
//!
//! Forms are tried in a fixed priority order and the first match wins. A
//! line that matches nothing is a last-chance script file name.

use super::tokenize::{first_word, keyword_arg, keyword_rest, paren_form, split_assignment};

/// A recognised command, borrowing its arguments from the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `# ...`
    Comment,
    /// `quit` or `exit`
    Quit,
    /// `nop`
    Nop,
    /// A line whose first word is a registered module keyword.
    Module { keyword: &'a str, args: &'a str },
    /// `sleep <ms>`
    Sleep(&'a str),
    /// `echo [text]`
    Echo(&'a str),
    /// `file <name> <op> [data]`
    File {
        name: &'a str,
        op: &'a str,
        data: &'a str,
    },
    /// `prompt <text>`
    Prompt(&'a str),
    /// `var NAME=VALUE`
    Var { name: &'a str, value: &'a str },
    /// `delim D=TEXT`, a debugging aid for the delimiter matcher.
    Delim { delim: &'a str, text: &'a str },
    /// `module NAME=PROGRAM`
    ModuleSet { name: &'a str, program: &'a str },
    /// `push [value]`
    Push(&'a str),
    /// `pop [name]`
    Pop(&'a str),
    /// `jump LABEL`
    Jump(&'a str),
    /// `call LABEL`
    Call(&'a str),
    /// `return [value]`
    Return(&'a str),
    /// `eval( EXPR )`; `open` is the byte index of the `(`.
    Eval { open: usize },
    /// `if( EXPR ) COMMAND`; `open` is the byte index of the `(`.
    If { open: usize },
    /// `layer COMMAND...`
    Layer(&'a str),
    /// `script FILE`, or any unrecognised line's first word.
    Script(&'a str),
}

impl<'a> Command<'a> {
    /// Classify a trimmed, interpolated, non-empty command line.
    ///
    /// `is_module` reports whether a word is a registered module keyword.
    pub fn classify(line: &'a str, is_module: impl Fn(&str) -> bool) -> Self {
        if line.starts_with('#') {
            return Command::Comment;
        }
        if keyword_rest(line, "quit").is_some() || keyword_rest(line, "exit").is_some() {
            return Command::Quit;
        }
        if keyword_rest(line, "nop").is_some() {
            return Command::Nop;
        }

        let word = first_word(line);
        if is_module(word) {
            return Command::Module {
                keyword: word,
                args: keyword_rest(line, word).unwrap_or(""),
            };
        }

        if let Some(ms) = keyword_arg(line, "sleep") {
            return Command::Sleep(ms);
        }
        if let Some(text) = keyword_rest(line, "echo") {
            return Command::Echo(text);
        }
        if let Some(rest) = keyword_arg(line, "file") {
            let name = first_word(rest);
            let after = rest[name.len()..].trim_start();
            let op = first_word(after);
            if !op.is_empty() {
                return Command::File {
                    name,
                    op,
                    data: after[op.len()..].trim(),
                };
            }
        }
        if let Some(text) = keyword_arg(line, "prompt") {
            return Command::Prompt(text);
        }
        if let Some(rest) = keyword_arg(line, "var") {
            let (name, value) = split_assignment(rest);
            return Command::Var { name, value };
        }
        if let Some(rest) = keyword_arg(line, "delim") {
            let (delim, text) = split_assignment(rest);
            return Command::Delim { delim, text };
        }
        if let Some(rest) = keyword_arg(line, "module") {
            let (name, program) = split_assignment(rest);
            return Command::ModuleSet { name, program };
        }
        if let Some(value) = keyword_rest(line, "push") {
            return Command::Push(value);
        }
        if let Some(name) = keyword_rest(line, "pop") {
            return Command::Pop(first_word(name));
        }
        if let Some(label) = keyword_arg(line, "jump") {
            return Command::Jump(first_word(label));
        }
        if let Some(label) = keyword_arg(line, "call") {
            return Command::Call(first_word(label));
        }
        if let Some(value) = keyword_rest(line, "return") {
            return Command::Return(value);
        }
        if let Some(open) = paren_form(line, "eval") {
            return Command::Eval { open };
        }
        if let Some(open) = paren_form(line, "if") {
            return Command::If { open };
        }
        if let Some(text) = keyword_rest(line, "layer") {
            return Command::Layer(text);
        }
        if let Some(rest) = keyword_arg(line, "script") {
            return Command::Script(first_word(rest));
        }
        Command::Script(word)
    }
}
