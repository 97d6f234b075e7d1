//! `jump`, `call` and `return`.
//!
//! Labels are found by substring search over the current layer's program.
//! `call` saves the return cursor and the registers on the shared stack and
//! `return` restores them, so a subroutine may use `R0`..`R7` freely.

use super::context::{REGISTERS, RET};
use super::{Engine, Layer, Step};
use crate::error::{Result, SiftError};

impl Engine<'_> {
    pub(super) fn jump(&mut self, layer: &mut Layer, label: &str) -> Result<Step> {
        layer.cursor = layer
            .program
            .find_label(label)
            .ok_or_else(|| SiftError::UnresolvedLabel(label.to_string()))?;
        Ok(Step::Next)
    }

    pub(super) fn call(&mut self, layer: &mut Layer, label: &str) -> Result<Step> {
        self.ctx.vars.set(RET, "");
        let target = layer
            .program
            .find_label(label)
            .ok_or_else(|| SiftError::UnresolvedLabel(label.to_string()))?;
        let registers = self.ctx.vars.registers();
        self.ctx.stack.push_frame(layer.cursor, registers);
        layer.cursor = target;
        Ok(Step::Next)
    }

    /// Unwind one call frame. Does nothing at the top layer; a missing or
    /// damaged frame ends the layer.
    pub(super) fn ret(&mut self, layer: &mut Layer, value: &str) -> Result<Step> {
        if layer.depth == 0 {
            return Ok(Step::Next);
        }
        if !value.is_empty() {
            self.ctx.vars.set(RET, value);
        }
        let frame = self.ctx.stack.pop_frame().ok_or(SiftError::StackUnderflow)?;
        for (name, value) in REGISTERS.iter().zip(frame.registers) {
            self.ctx.vars.set(name, value);
        }
        layer.cursor = frame.cursor;
        Ok(Step::Next)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::engine::{Interpreter, LayerExit, StackValue};
    use crate::host::MemoryHost;

    fn run_script(script: &str) -> Interpreter<MemoryHost> {
        let host = MemoryHost::new().with_file("s.sift", script);
        let mut interp = Interpreter::new(&Config::default_config(), host);
        interp.run("s.sift");
        interp
    }

    #[test]
    fn jump_skips_ahead() {
        let interp = run_script("jump end\necho skipped\n# LABEL end\necho done");
        assert_eq!(interp.host().lines(), vec!["done"]);
    }

    #[test]
    fn jump_missing_reports_and_continues() {
        let mut interp = Interpreter::new(&Config::default_config(), MemoryHost::new());
        interp.run("push keep ; var R1=a ; jump missing ; echo after");
        assert_eq!(
            interp.host().lines(),
            vec!["FAILED to Find Label: \"missing\"", "after"]
        );
        assert_eq!(interp.context().vars.value("R1"), "a");
        assert_eq!(
            interp.context().stack.items(),
            &[StackValue::Text("keep".into())]
        );
    }

    #[test]
    fn call_and_return_restore_registers() {
        let interp = run_script(
            "var R0=outer\n\
             call sub\n\
             echo R0=$R0 ret=$ret\n\
             quit\n\
             # LABEL sub\n\
             var R0=inner\n\
             echo in sub R0=$R0\n\
             return 7",
        );
        assert_eq!(
            interp.host().lines(),
            vec!["in sub R0=inner", "R0=outer ret=7"]
        );
        assert!(interp.context().stack.is_empty());
    }

    #[test]
    fn call_missing_clears_ret() {
        let interp = run_script("var ret=old\ncall nowhere\necho [$ret]");
        assert_eq!(
            interp.host().lines(),
            vec!["FAILED to Find Label: \"nowhere\"", "[]"]
        );
    }

    #[test]
    fn return_at_top_is_noop() {
        let mut interp = Interpreter::new(&Config::default_config(), MemoryHost::new());
        interp.run("return 5 ; echo still here");
        assert_eq!(interp.host().lines(), vec!["still here"]);
        assert_eq!(interp.context().vars.value("ret"), "");
    }

    #[test]
    fn return_without_frame_aborts_layer() {
        let interp = run_script("return\necho unreachable");
        assert_eq!(interp.host().lines(), vec!["Stack Underflow: no call frame to return to"]);
    }

    #[test]
    fn stray_push_corrupts_frame() {
        let interp = run_script(
            "call sub\necho unreachable\nquit\n# LABEL sub\npush stray\nreturn",
        );
        assert_eq!(interp.host().lines(), vec!["Stack Underflow: no call frame to return to"]);
        // The damaged frame is left in place.
        assert_eq!(interp.context().stack.len(), 10);
    }

    #[test]
    fn aborted_layer_does_not_stop_parent() {
        let host = MemoryHost::new().with_file("bad.sift", "return");
        let mut interp = Interpreter::new(&Config::default_config(), host);
        assert_eq!(interp.run("bad.sift ; echo parent ; quit"), LayerExit::Quit);
        assert_eq!(
            interp.host().lines(),
            vec!["Stack Underflow: no call frame to return to", "parent"]
        );
    }
}
