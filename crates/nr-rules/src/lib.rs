//! Condition language and evaluation engine for Nightrule.
//!
//! Conditions are compiled once, when an [`Engine`] is built: the source is
//! screened by the [`guard`], lexed, and parsed into a typed [`ast::Expr`].
//! Each evaluation substitutes the snapshot into that tree, evaluates it, and
//! resolves the triggered conditions into a single [`Outcome`].

/// Expression syntax tree.
pub mod ast;
pub mod cache;
/// Engine configuration.
pub mod config;
/// Spanned diagnostics and ariadne rendering.
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod eval;
pub mod guard;
/// Tokenizer for condition expressions.
pub mod lexer;
pub mod observer;
/// Evaluation results.
pub mod outcome;
/// Parser from tokens to the expression tree.
pub mod parser;
pub mod presets;
pub mod registry;
pub mod resolver;
pub mod substitute;
pub mod validate;

pub use config::EngineConfig;
pub use diagnostics::{Diagnostic, Severity, render_diagnostics};
pub use engine::{Engine, EngineBuilder, EngineStats};
pub use error::{EvalError, EvalResult};
pub use observer::{EvalObserver, NullObserver, TracingObserver};
pub use outcome::{EvaluationResult, Outcome};
pub use presets::standard_conditions;
pub use validate::{Validation, check_expression, validate_expression};

use ast::{Expr, Spanned};

/// Compile one expression into a tree the engine can evaluate.
///
/// Unsafe patterns are rejected before lexing; a rejected expression never
/// reaches the parser.
pub fn compile_expression(source: &str) -> Result<Spanned<Expr>, Vec<Diagnostic>> {
    let violations = guard::inspect(source);
    if !violations.is_empty() {
        return Err(violations.into_iter().map(Diagnostic::from).collect());
    }

    let (tokens, lex_errors) = lexer::lex(source);
    if !lex_errors.is_empty() {
        return Err(lex_errors.into_iter().map(Diagnostic::from).collect());
    }

    parser::parse(&tokens).map_err(|errors| errors.into_iter().map(Diagnostic::from).collect())
}
