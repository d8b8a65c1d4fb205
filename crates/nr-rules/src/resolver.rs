//! Turns the set of triggered conditions into one authoritative outcome.

use chrono::Utc;
use nr_core::GameStateSnapshot;

use crate::eval::evaluate_bool;
use crate::observer::EvalObserver;
use crate::outcome::{EvaluationResult, Outcome};
use crate::registry::{CompiledCondition, ConditionRegistry};
use crate::substitute::substitute;

/// Decide whether one compiled condition holds for `state`.
///
/// Rejected conditions never fire. Evaluation faults are reported to the
/// observer and count as false.
pub fn fires(
    entry: &CompiledCondition,
    state: &GameStateSnapshot,
    observer: &dyn EvalObserver,
) -> bool {
    let Some(program) = entry.program() else {
        return false;
    };
    let literal = substitute(program, state);
    match evaluate_bool(&literal) {
        Ok(fired) => fired,
        Err(err) => {
            observer.fault(entry.condition(), &literal, &err);
            false
        }
    }
}

/// Evaluate every condition in the registry and pick the outcome.
///
/// The outcome comes from the highest-priority triggered condition. When
/// several triggered conditions share that priority, the first one in
/// registry order decides.
pub fn resolve(
    registry: &ConditionRegistry,
    state: &GameStateSnapshot,
    observer: &dyn EvalObserver,
) -> EvaluationResult {
    let mut result = EvaluationResult::empty();

    for entry in registry.iter() {
        if !fires(entry, state, observer) {
            continue;
        }
        let condition = entry.condition();
        result.triggered.push(condition.clone());

        if result.priority.is_none_or(|best| condition.priority > best) {
            result.priority = Some(condition.priority);
            result.outcome = entry.outcome();
            result.decisive = Some(condition.clone());
        }
    }

    debug_assert!(result.decisive.is_some() == (result.outcome != Outcome::None));
    result.timestamp = Utc::now();
    result
}
