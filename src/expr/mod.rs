//! The closed expression evaluator behind `eval(...)` and `if(...)`.
//!
//! Expressions are Python-flavoured arithmetic, comparison and boolean logic
//! over literals and variables, plus a handful of conversion functions.
//! Nothing else is reachable: there is no attribute access, no indexing and
//! no way to name anything outside the variable table.

pub mod filter;
pub mod parser;
pub mod value;

pub use filter::screen;
pub use parser::{BinOp, CmpOp, Expr, UnaryOp, parse};
pub use value::Value;

use std::cmp::Ordering;

use thiserror::Error;

use crate::parse::Lookup;

/// Why an expression could not be evaluated. Display is the terse
/// user-facing message; the payload carries the detail for the log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Bad Syntax!")]
    Syntax(String),
    #[error("Bad Value!")]
    Value(String),
    #[error("Bad Name!")]
    Name(String),
}

impl EvalError {
    pub fn detail(&self) -> &str {
        match self {
            EvalError::Syntax(d) | EvalError::Value(d) | EvalError::Name(d) => d,
        }
    }
}

/// Parse and evaluate `src` against the variable table.
pub fn evaluate(src: &str, vars: &dyn Lookup) -> Result<Value, EvalError> {
    let expr = parse(src)?;
    eval_expr(&expr, vars)
}

/// Evaluate a parsed expression.
pub fn eval_expr(expr: &Expr, vars: &dyn Lookup) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),

        Expr::Var(name) => vars
            .lookup(name)
            .map(Value::from_text)
            .ok_or_else(|| EvalError::Name(format!("name '{name}' is not defined"))),

        Expr::Unary(op, inner) => {
            let v = eval_expr(inner, vars)?;
            match op {
                UnaryOp::Neg => v.neg(),
                UnaryOp::Pos => v.pos(),
                UnaryOp::Not => Ok(Value::Bool(!v.truthy())),
            }
        }

        Expr::Binary(op, lhs, rhs) => {
            let l = eval_expr(lhs, vars)?;
            let r = eval_expr(rhs, vars)?;
            match op {
                BinOp::Add => l.add(r),
                BinOp::Sub => l.sub(r),
                BinOp::Mul => l.mul(r),
                BinOp::Div => l.div(r),
                BinOp::FloorDiv => l.floor_div(r),
                BinOp::Rem => l.rem(r),
                BinOp::Pow => l.pow(r),
            }
        }

        Expr::Compare(first, rest) => {
            let mut lhs = eval_expr(first, vars)?;
            for (op, next) in rest {
                let rhs = eval_expr(next, vars)?;
                if !compare(*op, &lhs, &rhs)? {
                    return Ok(Value::Bool(false));
                }
                lhs = rhs;
            }
            Ok(Value::Bool(true))
        }

        // Python semantics: the deciding operand is the result.
        Expr::And(lhs, rhs) => {
            let l = eval_expr(lhs, vars)?;
            if l.truthy() { eval_expr(rhs, vars) } else { Ok(l) }
        }
        Expr::Or(lhs, rhs) => {
            let l = eval_expr(lhs, vars)?;
            if l.truthy() { Ok(l) } else { eval_expr(rhs, vars) }
        }

        Expr::Call(name, args) => {
            let args = args
                .iter()
                .map(|a| eval_expr(a, vars))
                .collect::<Result<Vec<_>, _>>()?;
            call(name, &args)
        }
    }
}

fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
    Ok(match op {
        CmpOp::Eq => lhs.equals(rhs),
        CmpOp::Ne => !lhs.equals(rhs),
        CmpOp::Lt => lhs.ordering(rhs)? == Some(Ordering::Less),
        CmpOp::Le => matches!(lhs.ordering(rhs)?, Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Gt => lhs.ordering(rhs)? == Some(Ordering::Greater),
        CmpOp::Ge => matches!(
            lhs.ordering(rhs)?,
            Some(Ordering::Greater | Ordering::Equal)
        ),
    })
}

fn call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match (name, args) {
        ("int", []) => Ok(Value::Int(0)),
        ("float", []) => Ok(Value::Float(0.0)),
        ("bool", []) => Ok(Value::Bool(false)),
        ("abs", [v]) => v.abs(),
        ("int", [v]) => v.to_int(),
        ("float", [v]) => v.to_float(),
        ("len", [v]) => v.len(),
        ("bool", [v]) => Ok(Value::Bool(v.truthy())),
        ("abs" | "int" | "float" | "len" | "bool", _) => Err(EvalError::Value(format!(
            "{name}() takes at most one argument ({} given)",
            args.len()
        ))),
        _ => Err(EvalError::Name(format!("name '{name}' is not defined"))),
    }
}
