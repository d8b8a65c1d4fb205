//! Hooks for watching the engine work.
//!
//! The evaluation path never branches on a debug setting; it reports to
//! whatever observer the engine was built with.

use nr_core::Condition;

use crate::ast::{Expr, Spanned};
use crate::cache::Fingerprint;
use crate::diagnostics::Diagnostic;
use crate::error::EvalError;
use crate::outcome::EvaluationResult;

/// Receives engine events. Every method defaults to doing nothing.
pub trait EvalObserver: Send + Sync {
    /// A condition failed to compile and will never trigger.
    /// Called once, when the engine is built.
    fn rejected(&self, _condition: &Condition, _diagnostics: &[Diagnostic]) {}

    /// A condition faulted during evaluation and was treated as false.
    fn fault(&self, _condition: &Condition, _literal: &Spanned<Expr>, _error: &EvalError) {}

    /// A call was answered from the cache.
    fn cache_hit(&self, _fingerprint: Fingerprint) {}

    /// A full evaluation pass finished.
    fn evaluated(&self, _fingerprint: Fingerprint, _result: &EvaluationResult) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl EvalObserver for NullObserver {}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl EvalObserver for TracingObserver {
    fn rejected(&self, condition: &Condition, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            tracing::warn!(
                condition = %condition.id,
                expression = %condition.expression,
                "condition rejected: {}",
                diag.message
            );
        }
    }

    fn fault(&self, condition: &Condition, literal: &Spanned<Expr>, error: &EvalError) {
        tracing::warn!(
            condition = %condition.id,
            literal = %literal.node,
            "condition evaluation failed: {error}"
        );
    }

    fn cache_hit(&self, fingerprint: Fingerprint) {
        tracing::trace!(%fingerprint, "evaluation cache hit");
    }

    fn evaluated(&self, fingerprint: Fingerprint, result: &EvaluationResult) {
        tracing::debug!(
            %fingerprint,
            triggered = ?result.triggered_ids(),
            outcome = ?result.outcome,
            priority = ?result.priority,
            "conditions evaluated"
        );
    }
}
