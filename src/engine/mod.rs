//! The per-layer dispatch loop.
//!
//! A layer walks its [`Program`] one command at a time. Each command is
//! trimmed, interpolated, classified and executed; a handler may hand back a
//! replacement command to run in the same step (`if`). Layers nest through
//! ordinary recursion and all of them share one [`Context`].

pub mod context;
mod flow;
mod gateway;

pub use context::{Context, Frame, ModuleRegistry, Stack, StackValue, Variables};

use crate::config::Config;
use crate::error::{Result, SiftError};
use crate::host::{Host, ReadLine};
use crate::parse::delim::{closer_for, marker_line};
use crate::parse::tokenize::paren_form;
use crate::parse::{Command, Program, find_match, find_open, interpolate};

use context::{FILE_READ, RESPONSE, RESULT, RET, SUBPROC};

/// How a layer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerExit {
    /// `quit` or `exit`.
    Quit,
    /// The program ran out (or, at the top level, input did).
    Exhausted,
    /// `return` found no intact call frame.
    Aborted,
}

/// What the loop does after a command.
enum Step {
    Next,
    Redispatch(String),
    Exit(LayerExit),
}

/// One running layer: its depth, program and cursor.
struct Layer {
    depth: usize,
    program: Program,
    cursor: usize,
}

/// The interactive prompt for a layer: `>:SIFT0> `, `>::SIFT1> `, ...
pub fn prompt(depth: usize) -> String {
    format!(">:{}SIFT{depth}> ", ":".repeat(depth))
}

/// Runs layers against a shared context and host.
pub struct Engine<'a> {
    ctx: &'a mut Context,
    host: &'a mut dyn Host,
}

impl<'a> Engine<'a> {
    pub fn new(ctx: &'a mut Context, host: &'a mut dyn Host) -> Self {
        Self { ctx, host }
    }

    /// Run `program` as a layer at `depth` until it quits or runs out.
    ///
    /// Only the top layer falls back to interactive input once its program
    /// is exhausted.
    pub fn run_layer(&mut self, depth: usize, program: Program) -> LayerExit {
        log::debug!("enter layer {depth} ({} commands)", program.lines().len());
        let mut layer = Layer {
            depth,
            program,
            cursor: 0,
        };

        let exit = 'commands: loop {
            let Some(raw) = self.next_command(&mut layer) else {
                break LayerExit::Exhausted;
            };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let line = interpolate(raw, &self.ctx.vars);
            let mut line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            loop {
                log::info!("layer {} @{}: {line}", layer.depth, layer.cursor);
                match self.dispatch(&mut layer, &line) {
                    Step::Next => break,
                    Step::Redispatch(next) => line = next,
                    Step::Exit(exit) => break 'commands exit,
                }
            }
        };

        log::debug!("exit layer {depth}: {exit:?}");
        exit
    }

    /// Run `text` as a fresh layer one level below `depth`.
    ///
    /// `quit` is appended, so the child never reads interactive input.
    pub fn spawn_layer(&mut self, depth: usize, text: &str) -> Result<LayerExit> {
        let child = depth + 1;
        if child > self.ctx.settings.max_layer_depth {
            return Err(SiftError::LayerDepthExceeded(child));
        }
        Ok(self.run_layer(child, Program::with_quit(text)))
    }

    fn next_command(&mut self, layer: &mut Layer) -> Option<String> {
        if let Some(line) = layer.program.get(layer.cursor) {
            layer.cursor += 1;
            return Some(line.to_string());
        }
        if layer.depth > 0 {
            return None;
        }
        match self.host.read_line(&prompt(layer.depth)) {
            ReadLine::Line(line) => Some(line),
            ReadLine::Interrupted | ReadLine::Eof => None,
        }
    }

    fn dispatch(&mut self, layer: &mut Layer, line: &str) -> Step {
        let modules = &self.ctx.modules;
        let command = Command::classify(line, |word| modules.contains(word));
        match self.execute(layer, line, command) {
            Ok(step) => step,
            Err(err) => {
                self.report(&err);
                match err {
                    SiftError::StackUnderflow => Step::Exit(LayerExit::Aborted),
                    _ => Step::Next,
                }
            }
        }
    }

    fn execute(&mut self, layer: &mut Layer, line: &str, command: Command<'_>) -> Result<Step> {
        let depth = layer.depth;
        match command {
            Command::Comment | Command::Nop => Ok(Step::Next),
            Command::Quit => Ok(Step::Exit(LayerExit::Quit)),
            Command::Module { keyword, args } => self.module(keyword, args),
            Command::Sleep(ms) => self.sleep(ms),
            Command::Echo(text) => {
                if !text.is_empty() {
                    self.host.print(text);
                }
                Ok(Step::Next)
            }
            Command::File { name, op, data } => self.file(name, op, data),
            Command::Prompt(text) => self.prompt(text),
            Command::Var { name, value } => self.assign(depth, name, value),
            Command::Delim { delim, text } => self.delim(delim, text),
            Command::ModuleSet { name, program } => {
                if self.ctx.is_sentinel(program) {
                    self.ctx.modules.remove(name);
                } else {
                    self.ctx.modules.set(name, program);
                }
                Ok(Step::Next)
            }
            Command::Push(value) => {
                self.ctx.stack.push(StackValue::Text(value.to_string()));
                Ok(Step::Next)
            }
            Command::Pop(name) => {
                let value = self
                    .ctx
                    .stack
                    .pop()
                    .map(StackValue::into_text)
                    .unwrap_or_default();
                if !name.is_empty() {
                    self.ctx.vars.set(name, value);
                }
                Ok(Step::Next)
            }
            Command::Jump(label) => self.jump(layer, label),
            Command::Call(label) => self.call(layer, label),
            Command::Return(value) => self.ret(layer, value),
            Command::Eval { open } => self.eval(depth, line, open),
            Command::If { open } => self.cond(depth, line, open),
            Command::Layer(text) => {
                self.spawn_layer(depth, text)?;
                Ok(Step::Next)
            }
            Command::Script(file) => self.script(depth, file),
        }
    }

    /// Print a failed command's message and log it.
    fn report(&mut self, err: &SiftError) {
        match err {
            SiftError::EvaluationFailed(e) => log::warn!("{err} {}", e.detail()),
            _ => log::warn!("{err}"),
        }
        self.host.print(&err.to_string());
    }

    // ── Handlers ──

    fn module(&mut self, keyword: &str, args: &str) -> Result<Step> {
        let argv = self.ctx.modules.command_line(keyword, args);
        match self.host.run_process(&argv) {
            Ok(output) => {
                self.ctx.vars.set(RET, output.status);
                self.host.write(&output.text);
                self.ctx.vars.set(SUBPROC, output.text);
                Ok(Step::Next)
            }
            Err(e) => {
                log::warn!("module {keyword}: {e}");
                self.ctx.vars.set(RET, "CmdNotFound");
                self.ctx.vars.set(SUBPROC, "");
                Err(SiftError::ProcessNotFound(
                    argv.first().cloned().unwrap_or_default(),
                ))
            }
        }
    }

    fn sleep(&mut self, arg: &str) -> Result<Step> {
        let ms: u64 = arg.parse().map_err(|_| SiftError::BadArgument {
            command: "sleep",
            arg: arg.to_string(),
        })?;
        self.host.sleep(ms);
        Ok(Step::Next)
    }

    fn file(&mut self, name: &str, op: &str, data: &str) -> Result<Step> {
        let outcome = match op {
            "clear" => self.host.clear_file(name),
            "write" if data.is_empty() => return Ok(Step::Next),
            "write" => self.host.append_file(name, &format!("{data}\n")),
            "read" => match self.host.read_file(name) {
                Ok(text) => {
                    self.ctx.vars.set(FILE_READ, text);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            _ => return Ok(Step::Next),
        };
        outcome.map_err(|e| {
            log::warn!("file {op} {name}: {e}");
            SiftError::FileNotFound(name.to_string())
        })?;
        Ok(Step::Next)
    }

    fn prompt(&mut self, text: &str) -> Result<Step> {
        let response = match self.host.read_line(&format!("{text}: ")) {
            ReadLine::Line(line) => line,
            ReadLine::Interrupted | ReadLine::Eof => {
                self.host.print("\nIgnoring Non-Response");
                String::new()
            }
        };
        self.ctx.vars.set(RESPONSE, response);
        Ok(Step::Next)
    }

    fn assign(&mut self, depth: usize, name: &str, value: &str) -> Result<Step> {
        if self.ctx.is_sentinel(value) {
            self.ctx.vars.unset(name);
        } else if paren_form(value, "eval").is_some() {
            self.spawn_layer(depth, value)?;
            let result = self.ctx.vars.get(RESULT).unwrap_or("0").to_string();
            self.ctx.vars.set(name, result);
        } else {
            self.ctx.vars.set(name, value);
        }
        Ok(Step::Next)
    }

    fn delim(&mut self, delim: &str, text: &str) -> Result<Step> {
        let mut chars = delim.chars();
        let (Some(d), None) = (chars.next(), chars.next()) else {
            return Err(SiftError::BadArgument {
                command: "delim",
                arg: delim.to_string(),
            });
        };
        // Only paired delimiters can be located.
        let begin = closer_for(d).and_then(|_| find_open(text, d, 0));
        let end = begin.and_then(|b| find_match(text, d, b));
        let index = |i: Option<usize>| i.map_or(-1, |i| i as i64);
        self.host.print(&format!(
            "Begin @{:3}  End @{:3}",
            index(begin),
            index(end)
        ));
        self.host.print(text);
        if let (Some(b), Some(e)) = (begin, end) {
            self.host.print(&marker_line(&[b, e]));
        }
        Ok(Step::Next)
    }

    fn script(&mut self, depth: usize, file: &str) -> Result<Step> {
        let path = shellexpand::tilde(file);
        let text = self
            .host
            .read_file(&path)
            .map_err(|_| SiftError::ScriptNotFound(file.to_string()))?;
        self.spawn_layer(depth, &text)?;
        Ok(Step::Next)
    }
}

/// An interpreter owning its context and host.
pub struct Interpreter<H: Host> {
    context: Context,
    host: H,
}

impl<H: Host> Interpreter<H> {
    pub fn new(config: &Config, host: H) -> Self {
        Self {
            context: Context::new(config),
            host,
        }
    }

    /// Run `text` as the top layer. Once it is exhausted the host is asked
    /// for interactive lines until `quit`, `exit` or end of input.
    pub fn run(&mut self, text: &str) -> LayerExit {
        Engine::new(&mut self.context, &mut self.host).run_layer(0, Program::parse(text))
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    fn run(text: &str) -> Interpreter<MemoryHost> {
        run_with(MemoryHost::new(), text)
    }

    fn run_with(host: MemoryHost, text: &str) -> Interpreter<MemoryHost> {
        let mut interp = Interpreter::new(&Config::default_config(), host);
        interp.run(text);
        interp
    }

    fn var<'a>(interp: &'a Interpreter<MemoryHost>, name: &str) -> &'a str {
        interp.context().vars.value(name)
    }

    #[test]
    fn prompts_by_depth() {
        assert_eq!(prompt(0), ">:SIFT0> ");
        assert_eq!(prompt(2), ">:::SIFT2> ");
    }

    #[test]
    fn echo_and_quit() {
        let interp = run("echo one ; quit ; echo two");
        assert_eq!(interp.host().lines(), vec!["one"]);
    }

    #[test]
    fn top_layer_reads_interactive_input() {
        let host = MemoryHost::new().with_input(["echo typed", "quit", "echo never"]);
        let interp = run_with(host, "echo first");
        assert_eq!(interp.host().lines(), vec!["first", "typed"]);
        assert_eq!(interp.host().prompts(), &[">:SIFT0> ", ">:SIFT0> "]);
    }

    #[test]
    fn interrupt_at_top_prompt_ends_session() {
        let host = MemoryHost::new().with_interrupt().with_input(["echo late"]);
        let mut interp = Interpreter::new(&Config::default_config(), host);
        assert_eq!(interp.run(""), LayerExit::Exhausted);
        assert!(interp.host().lines().is_empty());
    }

    #[test]
    fn interpolation_before_dispatch() {
        let interp = run("var who=world ; echo hello $who");
        assert_eq!(interp.host().lines(), vec!["hello world"]);
    }

    #[test]
    fn sentinel_deletes_variable() {
        let interp = run("var a=1 ; var a=XXX");
        assert!(!interp.context().vars.contains("a"));
    }

    #[test]
    fn var_from_eval() {
        let interp = run("var x=eval( 6 * 7 )");
        assert_eq!(var(&interp, "x"), "42");
        assert_eq!(var(&interp, "result"), "42");
        // Nested evaluations do not print.
        assert!(interp.host().lines().is_empty());
    }

    #[test]
    fn sleep_argument() {
        let interp = run("sleep 250 ; sleep soon");
        assert_eq!(interp.host().sleeps(), &[250]);
        assert_eq!(interp.host().lines(), vec!["Bad Argument to sleep: \"soon\""]);
    }

    #[test]
    fn prompt_stores_response() {
        let host = MemoryHost::new().with_input(["Ada"]);
        let interp = run_with(host, "prompt Name ; echo hi $response ; quit");
        assert_eq!(interp.host().prompts()[0], "Name: ");
        assert_eq!(interp.host().lines(), vec!["hi Ada"]);
    }

    #[test]
    fn prompt_interrupt_is_not_an_error() {
        let host = MemoryHost::new().with_interrupt();
        let interp = run_with(host, "var response=old ; prompt Name ; quit");
        assert_eq!(var(&interp, "response"), "");
        assert_eq!(interp.host().lines(), vec!["", "Ignoring Non-Response"]);
    }

    #[test]
    fn file_operations() {
        let interp = run(
            "file out.txt clear ; file out.txt write one ; file out.txt write ; \
             file out.txt write two  ; file out.txt read ; file out.txt frobnicate",
        );
        assert_eq!(interp.host().file("out.txt"), Some("one\ntwo\n"));
        assert_eq!(var(&interp, "file_read"), "one\ntwo\n");
    }

    #[test]
    fn file_read_missing() {
        let interp = run("file nope.txt read");
        assert_eq!(
            interp.host().lines(),
            vec!["Error: Text File \"nope.txt\" not found"]
        );
        assert!(!interp.context().vars.contains("file_read"));
    }

    #[test]
    fn module_runs_program() {
        let host = MemoryHost::new().with_program("python3", "hello\n");
        let interp = run_with(host, "py greet.py --loud");
        assert_eq!(
            interp.host().runs(),
            &[vec!["python3".to_string(), "greet.py".into(), "--loud".into()]]
        );
        assert_eq!(interp.host().output(), "hello\n");
        assert_eq!(var(&interp, "subproc"), "hello\n");
        assert_eq!(var(&interp, "ret"), "exit status: 0");
    }

    #[test]
    fn module_not_found() {
        let interp = run("hunt --all");
        assert_eq!(
            interp.host().lines(),
            vec!["Error: Failed to Run Sub-Process \"hunt\" -- command not found"]
        );
        assert_eq!(var(&interp, "ret"), "CmdNotFound");
        assert_eq!(var(&interp, "subproc"), "");
    }

    #[test]
    fn module_registry_updates() {
        let host = MemoryHost::new().with_program("ruby", "rb\n");
        let interp = run_with(host, "module rb=ruby ; rb x.rb ; module rb=XXX ; rb x.rb");
        assert_eq!(interp.host().runs().len(), 1);
        assert!(!interp.context().modules.contains("rb"));
        assert_eq!(interp.host().lines().last().unwrap(), "Error: Script File \"rb\" not found");
    }

    #[test]
    fn delim_debug_output() {
        let interp = run("delim (=a(b)c");
        assert_eq!(
            interp.host().lines(),
            vec!["Begin @  1  End @  3", "a(b)c", " ^ ^"]
        );
    }

    #[test]
    fn delim_not_found() {
        let interp = run("delim [=abc");
        assert_eq!(interp.host().lines(), vec!["Begin @ -1  End @ -1", "abc"]);
    }

    #[test]
    fn delim_outside_pair_table() {
        let interp = run("delim |=a|b");
        assert_eq!(interp.host().lines(), vec!["Begin @ -1  End @ -1", "a|b"]);
    }

    #[test]
    fn script_file_runs_nested() {
        let host = MemoryHost::new().with_file("hello.sift", "echo from script\nvar done=1");
        let interp = run_with(host, "hello.sift ; echo back");
        assert_eq!(interp.host().lines(), vec!["from script", "back"]);
        assert_eq!(var(&interp, "done"), "1");
    }

    #[test]
    fn script_keyword() {
        let host = MemoryHost::new().with_file("a.sift", "echo a");
        let interp = run_with(host, "script a.sift extra");
        assert_eq!(interp.host().lines(), vec!["a"]);
    }

    #[test]
    fn recursive_script_hits_depth_limit() {
        let host = MemoryHost::new().with_file("loop.sift", "loop.sift");
        let interp = run_with(host, "loop.sift ; echo survived");
        let lines = interp.host().lines();
        assert_eq!(lines.first().unwrap(), "Layer Depth Exceeded: 65 layers deep");
        assert_eq!(lines.last().unwrap(), "survived");
    }

    #[test]
    fn layer_shares_variables() {
        let interp = run("layer var inner=yes ; echo $inner");
        assert_eq!(interp.host().lines(), vec!["yes"]);
    }
}
