use std::sync::Arc;

use chrono::{DateTime, Utc};
use nr_core::{Condition, DeathReason, WinLevel};
use serde::Serialize;

/// The single authoritative result of an evaluation pass.
///
/// Being a tagged variant, a result can never report a win and a death at
/// the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing decisive happened.
    #[default]
    None,
    /// The player won at this grade.
    Win(WinLevel),
    /// The player died for this reason.
    Death(DeathReason),
}

impl Outcome {
    /// The win level, if this is a win.
    pub fn win_level(self) -> Option<WinLevel> {
        match self {
            Outcome::Win(level) => Some(level),
            _ => None,
        }
    }

    /// The death reason, if this is a death.
    pub fn death_reason(self) -> Option<DeathReason> {
        match self {
            Outcome::Death(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Everything one call to [`crate::Engine::evaluate`] found out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// Every condition that evaluated true, in registry order.
    pub triggered: Vec<Arc<Condition>>,
    /// Win, death, or neither.
    pub outcome: Outcome,
    /// The condition that decided `outcome`, if any.
    pub decisive: Option<Arc<Condition>>,
    /// Priority of the deciding condition.
    pub priority: Option<i64>,
    /// When the pass was computed. A cached result keeps its first timestamp.
    pub timestamp: DateTime<Utc>,
}

impl EvaluationResult {
    /// A result with nothing triggered.
    pub fn empty() -> Self {
        Self {
            triggered: Vec::new(),
            outcome: Outcome::None,
            decisive: None,
            priority: None,
            timestamp: Utc::now(),
        }
    }

    /// The win level, if a win condition decided the outcome.
    pub fn win_level(&self) -> Option<WinLevel> {
        self.outcome.win_level()
    }

    /// The death reason, if a death condition decided the outcome.
    pub fn death_reason(&self) -> Option<DeathReason> {
        self.outcome.death_reason()
    }

    /// Player-facing message of the deciding condition.
    pub fn message(&self) -> Option<&str> {
        self.decisive.as_deref().map(|c| c.message.as_str())
    }

    /// Ids of all triggered conditions, in registry order.
    pub fn triggered_ids(&self) -> Vec<&str> {
        self.triggered.iter().map(|c| c.id.as_str()).collect()
    }
}
