//! `eval( EXPR )` and `if( EXPR ) COMMAND`.

use super::context::RESULT;
use super::{Engine, Step};
use crate::error::{Result, SiftError};
use crate::expr::{evaluate, screen};
use crate::parse::find_match;

impl Engine<'_> {
    /// The trimmed expression between the `(` at `open` and its match, and
    /// the byte index of the closing `)`.
    fn expression<'l>(line: &'l str, open: usize) -> Result<(&'l str, usize)> {
        let close = find_match(line, '(', open)
            .ok_or_else(|| SiftError::MalformedExpression(line[open + 1..].trim().to_string()))?;
        Ok((line[open + 1..close].trim(), close))
    }

    /// Screen and evaluate; store the outcome in `result`. At the top layer
    /// the outcome is also printed.
    pub(super) fn eval(&mut self, depth: usize, line: &str, open: usize) -> Result<Step> {
        let (expr, _) = Self::expression(line, open)?;
        if let Err(found) = screen(expr, &self.ctx.evaluator.deny_chars) {
            return Err(SiftError::EvaluationRejected {
                found,
                expr: expr.to_string(),
            });
        }

        let result = match evaluate(expr, &self.ctx.vars) {
            Ok(value) => value.to_string(),
            Err(e) => {
                self.report(&e.into());
                self.ctx.evaluator.null_result.clone()
            }
        };
        if depth == 0 {
            self.host.print(&format!("Result is: {result}"));
        }
        self.ctx.vars.set(RESULT, result);
        Ok(Step::Next)
    }

    /// Evaluate the condition in a child layer, then hand the rest of the
    /// line back for dispatch unless the result is falsy.
    pub(super) fn cond(&mut self, depth: usize, line: &str, open: usize) -> Result<Step> {
        let (expr, close) = Self::expression(line, open)?;
        let command = line[close + 1..].trim_start();
        self.spawn_layer(depth, &format!("eval( {expr} )"))?;

        let result = self.ctx.vars.get(RESULT).unwrap_or("False");
        if self.ctx.is_falsy(result) || command.is_empty() {
            return Ok(Step::Next);
        }
        Ok(Step::Redispatch(command.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::engine::Interpreter;
    use crate::host::MemoryHost;

    fn run(text: &str) -> Interpreter<MemoryHost> {
        let mut interp = Interpreter::new(&Config::default_config(), MemoryHost::new());
        interp.run(text);
        interp
    }

    #[test]
    fn eval_prints_at_top() {
        let interp = run("eval( 1 + 2 ) ; eval(7 / 2)");
        assert_eq!(interp.host().lines(), vec!["Result is: 3", "Result is: 3.5"]);
        assert_eq!(interp.context().vars.value("result"), "3.5");
    }

    #[test]
    fn eval_uses_variables() {
        let interp = run("var n=4 ; eval( n * n )");
        assert_eq!(interp.host().lines(), vec!["Result is: 16"]);
    }

    #[test]
    fn eval_failure_sets_null() {
        let interp = run("eval( 1 / 0 ) ; eval( 1 + ) ; eval( bad )");
        assert_eq!(
            interp.host().lines(),
            vec![
                "Bad Value!",
                "Result is: NULL",
                "Bad Syntax!",
                "Result is: NULL",
                "Bad Name!",
                "Result is: NULL",
            ]
        );
        assert_eq!(interp.context().vars.value("result"), "NULL");
    }

    #[test]
    fn deny_listed_expression_leaves_result() {
        let interp = run("eval( 2 ) ; eval( open('x') )");
        assert_eq!(
            interp.host().lines(),
            vec![
                "Result is: 2",
                "Expression Contains \"p\": open('x')",
                "Will not Evaluate",
            ]
        );
        assert_eq!(interp.context().vars.value("result"), "2");
    }

    #[test]
    fn quoted_text_passes_screen() {
        let interp = run("eval( len('sys') )");
        assert_eq!(interp.host().lines(), vec!["Result is: 3"]);
    }

    #[test]
    fn malformed_expression() {
        let interp = run("eval( (1 + 2 )");
        assert_eq!(interp.host().lines(), vec!["Malformed Expression: (1 + 2 )"]);
    }

    #[test]
    fn if_runs_on_truthy() {
        let interp = run("if( 1 ) echo yes ; if(2 > 1) echo also");
        assert_eq!(interp.host().lines(), vec!["yes", "also"]);
    }

    #[test]
    fn if_suppressed_on_falsy() {
        let interp = run("if( 0 ) echo a ; if( 0.0 ) echo b ; if( 1 < 0 ) echo c ; echo end");
        assert_eq!(interp.host().lines(), vec!["end"]);
    }

    #[test]
    fn if_does_not_print_result() {
        let interp = run("if( 3 ) echo ok");
        assert_eq!(interp.host().lines(), vec!["ok"]);
        assert_eq!(interp.context().vars.value("result"), "3");
    }

    #[test]
    fn if_null_result_is_truthy() {
        // A failed evaluation stores NULL, which is not in the falsy set.
        let interp = run("if( 1 / 0 ) echo ran");
        assert_eq!(interp.host().lines(), vec!["Bad Value!", "ran"]);
    }

    #[test]
    fn if_with_empty_command() {
        let interp = run("if( 1 ) ; echo next");
        assert_eq!(interp.host().lines(), vec!["next"]);
    }

    #[test]
    fn if_chains() {
        let interp = run("var n=2 ; if( n ) if( n - 1 ) echo both");
        assert_eq!(interp.host().lines(), vec!["both"]);
    }

    #[test]
    fn if_redispatches_control_flow() {
        let host = MemoryHost::new().with_file(
            "s.sift",
            "if( 1 ) jump end\necho skipped\n# LABEL end\necho landed",
        );
        let mut interp = Interpreter::new(&Config::default_config(), host);
        interp.run("s.sift");
        assert_eq!(interp.host().lines(), vec!["landed"]);
    }
}
