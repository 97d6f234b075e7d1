use thiserror::Error;

use crate::expr::EvalError;

/// Everything a command can report. Display is the user-facing message.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("FAILED to Find Label: \"{0}\"")]
    UnresolvedLabel(String),

    #[error("Malformed Expression: {0}")]
    MalformedExpression(String),

    #[error("Expression Contains \"{found}\": {expr}\nWill not Evaluate")]
    EvaluationRejected { found: char, expr: String },

    #[error(transparent)]
    EvaluationFailed(#[from] EvalError),

    #[error("Stack Underflow: no call frame to return to")]
    StackUnderflow,

    #[error("Error: Text File \"{0}\" not found")]
    FileNotFound(String),

    #[error("Error: Script File \"{0}\" not found")]
    ScriptNotFound(String),

    #[error("Error: Failed to Run Sub-Process \"{0}\" -- command not found")]
    ProcessNotFound(String),

    #[error("Bad Argument to {command}: \"{arg}\"")]
    BadArgument { command: &'static str, arg: String },

    #[error("Layer Depth Exceeded: {0} layers deep")]
    LayerDepthExceeded(usize),
}

pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            SiftError::UnresolvedLabel("x".into()).to_string(),
            "FAILED to Find Label: \"x\""
        );
        assert_eq!(
            SiftError::EvaluationRejected {
                found: 'g',
                expr: "g + 1".into()
            }
            .to_string(),
            "Expression Contains \"g\": g + 1\nWill not Evaluate"
        );
        assert_eq!(
            SiftError::ProcessNotFound("hunt".into()).to_string(),
            "Error: Failed to Run Sub-Process \"hunt\" -- command not found"
        );
    }

    #[test]
    fn eval_errors_pass_through() {
        let err: SiftError = EvalError::Name("x".into()).into();
        assert_eq!(err.to_string(), "Bad Name!");
    }
}
