//! Error types for expression evaluation.

use thiserror::Error;

/// Result type for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Runtime faults while evaluating an expression tree.
///
/// These never reach the host: the resolver treats a faulting condition as
/// not triggered and hands the error to the observer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A state reference survived substitution.
    #[error("unresolved reference: {0}")]
    Unresolved(String),

    /// A binary operator got operands it cannot combine.
    #[error("cannot apply `{op}` to {left} and {right}")]
    TypeMismatch {
        /// Operator symbol.
        op: &'static str,
        /// Type of the left operand.
        left: &'static str,
        /// Type of the right operand.
        right: &'static str,
    },

    /// A prefix operator got an operand it cannot handle.
    #[error("cannot apply `{op}` to {operand}")]
    UnaryMismatch {
        /// Operator symbol.
        op: &'static str,
        /// Type of the operand.
        operand: &'static str,
    },

    /// `/` or `%` with a zero right-hand side.
    #[error("division by zero")]
    DivisionByZero,
}
