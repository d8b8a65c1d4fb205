//! The immutable, priority-ordered set of compiled conditions.

use std::cmp::Reverse;
use std::sync::Arc;

use nr_core::{Condition, ConditionKind, DeathReason};

use crate::ast::{Expr, Spanned, VarRef};
use crate::compile_expression;
use crate::diagnostics::Diagnostic;
use crate::outcome::Outcome;

/// A condition together with its compiled expression.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    condition: Arc<Condition>,
    program: Result<Spanned<Expr>, Vec<Diagnostic>>,
    outcome: Outcome,
}

impl CompiledCondition {
    fn compile(condition: Condition) -> Self {
        let program = compile_expression(&condition.expression);
        let outcome = match condition.kind {
            ConditionKind::Win { level } => Outcome::Win(level),
            ConditionKind::Death { reason: Some(reason) } => Outcome::Death(reason),
            ConditionKind::Death { reason: None } => Outcome::Death(
                program
                    .as_ref()
                    .map_or(DeathReason::SpecialEvent, |expr| infer_death_reason(&expr.node)),
            ),
        };
        Self {
            condition: Arc::new(condition),
            program,
            outcome,
        }
    }

    /// The source record.
    pub fn condition(&self) -> &Arc<Condition> {
        &self.condition
    }

    /// The compiled tree, or `None` if the condition was rejected.
    pub fn program(&self) -> Option<&Spanned<Expr>> {
        self.program.as_ref().ok()
    }

    /// Why the condition was rejected, if it was.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match &self.program {
            Ok(_) => &[],
            Err(diags) => diags,
        }
    }

    /// True when the expression failed to compile.
    pub fn is_rejected(&self) -> bool {
        self.program.is_err()
    }

    /// What this condition decides when it is the authoritative trigger.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

/// Pick a death reason from what the expression looks at.
///
/// Health wins over sanity, sanity over hunger, hunger over rule flags.
fn infer_death_reason(expr: &Expr) -> DeathReason {
    let refs = expr.references();
    let touches = |attr: &str| {
        refs.iter()
            .any(|r| matches!(r, VarRef::Attribute(name) if name == attr))
    };

    if touches("health") {
        DeathReason::HealthZero
    } else if touches("sanity") {
        DeathReason::SanityZero
    } else if touches("hunger") {
        DeathReason::HungerZero
    } else if refs
        .iter()
        .any(|r| matches!(r, VarRef::Flag(name) if name.contains("rule")))
    {
        DeathReason::RuleViolation
    } else {
        DeathReason::SpecialEvent
    }
}

/// Conditions sorted by descending priority; ties keep their input order.
#[derive(Debug, Clone, Default)]
pub struct ConditionRegistry {
    entries: Vec<CompiledCondition>,
}

impl ConditionRegistry {
    /// Sort and compile `conditions`. Rejected conditions stay in the
    /// registry so they can be reported, but never trigger.
    pub fn new(mut conditions: Vec<Condition>) -> Self {
        conditions.sort_by_key(|c| Reverse(c.priority));
        Self {
            entries: conditions.into_iter().map(CompiledCondition::compile).collect(),
        }
    }

    /// Iterate in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledCondition> {
        self.entries.iter()
    }

    /// Find a condition by id.
    pub fn get(&self, id: &str) -> Option<&CompiledCondition> {
        self.entries.iter().find(|e| e.condition.id == id)
    }

    /// Conditions whose expressions failed to compile.
    pub fn rejected(&self) -> impl Iterator<Item = &CompiledCondition> {
        self.entries.iter().filter(|e| e.is_rejected())
    }

    /// Number of conditions, rejected ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nr_core::WinLevel;

    #[test]
    fn sorted_by_priority_descending() {
        let registry = ConditionRegistry::new(vec![
            Condition::win("low", WinLevel::C, "day >= 5").with_priority(70),
            Condition::death("high", "health <= 0").with_priority(1000),
            Condition::win("mid", WinLevel::A, "day >= 7").with_priority(90),
        ]);
        let ids: Vec<_> = registry.iter().map(|e| e.condition().id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let registry = ConditionRegistry::new(vec![
            Condition::death("health", "health <= 0").with_priority(1000),
            Condition::win("b", WinLevel::B, "day >= 7").with_priority(80),
            Condition::death("sanity", "sanity <= 0").with_priority(1000),
            Condition::death("hunger", "hunger <= 0").with_priority(1000),
        ]);
        let ids: Vec<_> = registry.iter().map(|e| e.condition().id.as_str()).collect();
        assert_eq!(ids, vec!["health", "sanity", "hunger", "b"]);
    }

    #[test]
    fn rejected_conditions_are_kept() {
        let registry = ConditionRegistry::new(vec![
            Condition::win("ok", WinLevel::B, "day >= 7"),
            Condition::win("bad", WinLevel::S, "eval('1')"),
        ]);
        assert_eq!(registry.len(), 2);
        let rejected: Vec<_> = registry.rejected().map(|e| e.condition().id.as_str()).collect();
        assert_eq!(rejected, vec!["bad"]);
        let bad = registry.get("bad").unwrap();
        assert!(bad.program().is_none());
        assert!(!bad.diagnostics().is_empty());
        assert!(registry.get("ok").unwrap().diagnostics().is_empty());
    }

    #[test]
    fn outcome_uses_level_or_reason() {
        let registry = ConditionRegistry::new(vec![
            Condition::win("w", WinLevel::A, "day >= 7"),
            Condition::death("pinned", "health <= 0").with_reason(DeathReason::RuleViolation),
        ]);
        assert_eq!(registry.get("w").unwrap().outcome(), Outcome::Win(WinLevel::A));
        assert_eq!(
            registry.get("pinned").unwrap().outcome(),
            Outcome::Death(DeathReason::RuleViolation)
        );
    }

    #[test]
    fn death_reason_inference() {
        let reason = |expr: &str| {
            let registry = ConditionRegistry::new(vec![Condition::death("d", expr)]);
            registry.get("d").unwrap().outcome()
        };
        assert_eq!(
            reason("attributes.health <= 0"),
            Outcome::Death(DeathReason::HealthZero)
        );
        assert_eq!(
            reason("hunger <= 0 || sanity <= 0"),
            Outcome::Death(DeathReason::SanityZero)
        );
        assert_eq!(reason("hunger <= 0"), Outcome::Death(DeathReason::HungerZero));
        assert_eq!(
            reason("flags.rule3_broken && day > 1"),
            Outcome::Death(DeathReason::RuleViolation)
        );
        assert_eq!(
            reason("location == 'basement' && time > 22"),
            Outcome::Death(DeathReason::SpecialEvent)
        );
        assert_eq!(reason("}{"), Outcome::Death(DeathReason::SpecialEvent));
    }
}
