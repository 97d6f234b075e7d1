//! Runtime values of the expression evaluator.
//!
//! Variables are always stored as text; a value only takes on a type while
//! an expression is being evaluated. Display follows Python's `str()` so a
//! stored `result` reads the same way a Python user would expect.

use std::cmp::Ordering;
use std::fmt;

use super::EvalError;

/// Longest string the `*` operator may build.
const MAX_REPEAT_LEN: usize = 1 << 24;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_float(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(x) => x,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Python's `repr(float)`: shortest round-trip digits, always with a point or
/// exponent, scientific outside `1e-4 <= |x| < 1e16`.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let mag = x.abs();
    if mag != 0.0 && !(1e-4..1e16).contains(&mag) {
        let sci = format!("{x:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(d) => ('-', d),
            None => ('+', exp),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    if x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

/// Whether `text` looks like a decimal float literal rather than a word
/// such as `inf` or `NaN`.
fn is_numeric_text(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-' | b'e' | b'E'))
}

impl Value {
    /// Give a stored variable a type: integer, then float, then boolean,
    /// else plain text.
    pub fn from_text(text: &str) -> Self {
        let t = text.trim();
        if let Ok(n) = t.parse::<i64>() {
            return Value::Int(n);
        }
        if is_numeric_text(t)
            && let Ok(x) = t.parse::<f64>()
        {
            return Value::Float(x);
        }
        match t {
            "True" => Value::Bool(true),
            "False" => Value::Bool(false),
            _ => Value::Str(text.to_string()),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    fn num(&self) -> Option<Num> {
        match self {
            Value::Bool(b) => Some(Num::Int(i64::from(*b))),
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Float(x) => Some(Num::Float(*x)),
            Value::Str(_) => None,
        }
    }

    fn nums(&self, rhs: &Value, op: &str) -> Result<(Num, Num), EvalError> {
        match (self.num(), rhs.num()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(mismatch(op, self, rhs)),
        }
    }

    pub fn add(self, rhs: Value) -> Result<Value, EvalError> {
        if let (Value::Str(a), Value::Str(b)) = (&self, &rhs) {
            return Ok(Value::Str(format!("{a}{b}")));
        }
        arith(&self, &rhs, "+", i64::checked_add, |a, b| a + b)
    }

    pub fn sub(self, rhs: Value) -> Result<Value, EvalError> {
        arith(&self, &rhs, "-", i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(self, rhs: Value) -> Result<Value, EvalError> {
        match (&self, &rhs) {
            (Value::Str(s), n @ (Value::Int(_) | Value::Bool(_)))
            | (n @ (Value::Int(_) | Value::Bool(_)), Value::Str(s)) => repeat(s, n),
            _ => arith(&self, &rhs, "*", i64::checked_mul, |a, b| a * b),
        }
    }

    /// True division; always produces a float.
    pub fn div(self, rhs: Value) -> Result<Value, EvalError> {
        let (a, b) = self.nums(&rhs, "/")?;
        let divisor = b.as_float();
        if divisor == 0.0 {
            return Err(EvalError::Value("division by zero".into()));
        }
        Ok(Value::Float(a.as_float() / divisor))
    }

    /// Division rounded toward negative infinity.
    pub fn floor_div(self, rhs: Value) -> Result<Value, EvalError> {
        match self.nums(&rhs, "//")? {
            (Num::Int(a), Num::Int(b)) => {
                if b == 0 {
                    return Err(EvalError::Value("integer division by zero".into()));
                }
                let q = a.checked_div(b).ok_or_else(overflow)?;
                let adjust = a % b != 0 && (a < 0) != (b < 0);
                Ok(Value::Int(if adjust { q - 1 } else { q }))
            }
            (a, b) => {
                let (a, b) = (a.as_float(), b.as_float());
                if b == 0.0 {
                    return Err(EvalError::Value("float floor division by zero".into()));
                }
                Ok(Value::Float((a / b).floor()))
            }
        }
    }

    /// Remainder with the sign of the divisor.
    pub fn rem(self, rhs: Value) -> Result<Value, EvalError> {
        match self.nums(&rhs, "%")? {
            (Num::Int(a), Num::Int(b)) => {
                if b == 0 {
                    return Err(EvalError::Value("integer modulo by zero".into()));
                }
                let r = a.checked_rem(b).ok_or_else(overflow)?;
                let adjust = r != 0 && (r < 0) != (b < 0);
                Ok(Value::Int(if adjust { r + b } else { r }))
            }
            (a, b) => {
                let (a, b) = (a.as_float(), b.as_float());
                if b == 0.0 {
                    return Err(EvalError::Value("float modulo by zero".into()));
                }
                let r = a % b;
                let adjust = r != 0.0 && (r < 0.0) != (b < 0.0);
                Ok(Value::Float(if adjust { r + b } else { r }))
            }
        }
    }

    pub fn pow(self, rhs: Value) -> Result<Value, EvalError> {
        match self.nums(&rhs, "**")? {
            (Num::Int(base), Num::Int(exp)) if exp >= 0 => {
                let exp = u32::try_from(exp).map_err(|_| overflow())?;
                base.checked_pow(exp).map(Value::Int).ok_or_else(overflow)
            }
            (base, exp) => {
                let (base, exp) = (base.as_float(), exp.as_float());
                if base == 0.0 && exp < 0.0 {
                    return Err(EvalError::Value(
                        "0.0 cannot be raised to a negative power".into(),
                    ));
                }
                let out = base.powf(exp);
                if out.is_nan() && !base.is_nan() && !exp.is_nan() {
                    return Err(EvalError::Value("complex result".into()));
                }
                Ok(Value::Float(out))
            }
        }
    }

    pub fn neg(self) -> Result<Value, EvalError> {
        match self.num() {
            Some(Num::Int(n)) => n.checked_neg().map(Value::Int).ok_or_else(overflow),
            Some(Num::Float(x)) => Ok(Value::Float(-x)),
            None => Err(EvalError::Value(format!(
                "bad operand type for unary -: '{}'",
                self.type_name()
            ))),
        }
    }

    pub fn pos(self) -> Result<Value, EvalError> {
        match self.num() {
            Some(Num::Int(n)) => Ok(Value::Int(n)),
            Some(Num::Float(x)) => Ok(Value::Float(x)),
            None => Err(EvalError::Value(format!(
                "bad operand type for unary +: '{}'",
                self.type_name()
            ))),
        }
    }

    /// `==`: numbers compare by value across types, text by content, and a
    /// number never equals text.
    pub fn equals(&self, rhs: &Value) -> bool {
        match (self.num(), rhs.num()) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
            (Some(a), Some(b)) => a.as_float() == b.as_float(),
            (None, None) => self.to_string() == rhs.to_string(),
            _ => false,
        }
    }

    /// Ordering for `< <= > >=`. `None` when either side is NaN.
    pub fn ordering(&self, rhs: &Value) -> Result<Option<Ordering>, EvalError> {
        match (self, rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            _ => match self.nums(rhs, "<")? {
                (Num::Int(a), Num::Int(b)) => Ok(Some(a.cmp(&b))),
                (a, b) => Ok(a.as_float().partial_cmp(&b.as_float())),
            },
        }
    }

    pub fn to_int(&self) -> Result<Value, EvalError> {
        match self {
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Int(n) => Ok(Value::Int(*n)),
            Value::Float(x) => {
                if !x.is_finite() || x.abs() >= 9.2e18 {
                    return Err(EvalError::Value(format!("cannot convert {x} to integer")));
                }
                Ok(Value::Int(x.trunc() as i64))
            }
            Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| {
                EvalError::Value(format!("invalid literal for int(): '{s}'"))
            }),
        }
    }

    pub fn to_float(&self) -> Result<Value, EvalError> {
        match self {
            Value::Str(s) => s.trim().parse().map(Value::Float).map_err(|_| {
                EvalError::Value(format!("could not convert string to float: '{s}'"))
            }),
            other => Ok(Value::Float(other.num().map_or(0.0, Num::as_float))),
        }
    }

    pub fn abs(&self) -> Result<Value, EvalError> {
        match self.num() {
            Some(Num::Int(n)) => n.checked_abs().map(Value::Int).ok_or_else(overflow),
            Some(Num::Float(x)) => Ok(Value::Float(x.abs())),
            None => Err(EvalError::Value(format!(
                "bad operand type for abs(): '{}'",
                self.type_name()
            ))),
        }
    }

    pub fn len(&self) -> Result<Value, EvalError> {
        match self {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            other => Err(EvalError::Value(format!(
                "object of type '{}' has no len()",
                other.type_name()
            ))),
        }
    }
}

fn overflow() -> EvalError {
    EvalError::Value("integer overflow".into())
}

fn mismatch(op: &str, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::Value(format!(
        "unsupported operand types for {op}: '{}' and '{}'",
        lhs.type_name(),
        rhs.type_name()
    ))
}

fn arith(
    lhs: &Value,
    rhs: &Value,
    op: &str,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match lhs.nums(rhs, op)? {
        (Num::Int(a), Num::Int(b)) => int_op(a, b).map(Value::Int).ok_or_else(overflow),
        (a, b) => Ok(Value::Float(float_op(a.as_float(), b.as_float()))),
    }
}

fn repeat(text: &str, times: &Value) -> Result<Value, EvalError> {
    let n = match times.num() {
        Some(Num::Int(n)) => usize::try_from(n).unwrap_or(0),
        _ => 0,
    };
    if text.len().saturating_mul(n) > MAX_REPEAT_LEN {
        return Err(EvalError::Value("repeated string is too long".into()));
    }
    Ok(Value::Str(text.repeat(n)))
}
