use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NrError, NrResult};

/// Grade awarded when a win condition decides the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinLevel {
    /// Flawless clear.
    S,
    /// Strong clear.
    A,
    /// Ordinary clear.
    B,
    /// Barely made it.
    C,
}

impl fmt::Display for WinLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S => write!(f, "S"),
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
        }
    }
}

/// Categorical cause assigned when a death condition decides the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathReason {
    /// Health dropped to zero.
    HealthZero,
    /// Sanity dropped to zero.
    SanityZero,
    /// Starved.
    HungerZero,
    /// Broke one of the rules.
    RuleViolation,
    /// Anything else the story decides is fatal.
    SpecialEvent,
}

impl fmt::Display for DeathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HealthZero => write!(f, "health_zero"),
            Self::SanityZero => write!(f, "sanity_zero"),
            Self::HungerZero => write!(f, "hunger_zero"),
            Self::RuleViolation => write!(f, "rule_violation"),
            Self::SpecialEvent => write!(f, "special_event"),
        }
    }
}

/// Whether a condition ends the game in victory or death.
///
/// A win always carries its level; a death may name its reason up front or
/// leave it to be inferred from the expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionKind {
    /// The player survives with the given grade.
    Win {
        /// Grade awarded.
        level: WinLevel,
    },
    /// The player dies.
    Death {
        /// Explicit cause, if the author supplied one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<DeathReason>,
    },
}

/// An author-defined predicate over game state.
///
/// Conditions are created once when the engine is built and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Unique identifier within a condition set.
    pub id: String,
    /// Win or death, plus the level or reason.
    #[serde(flatten)]
    pub kind: ConditionKind,
    /// Source text of the predicate, e.g. `sanity > 60 && day >= 7`.
    pub expression: String,
    /// Higher is more authoritative.
    #[serde(default)]
    pub priority: i64,
    /// Author-facing summary.
    #[serde(default)]
    pub description: String,
    /// Player-facing text shown on the win or death screen.
    #[serde(default)]
    pub message: String,
}

impl Condition {
    /// Create a win condition with priority 0.
    pub fn win(id: impl Into<String>, level: WinLevel, expression: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ConditionKind::Win { level },
            expression: expression.into(),
            priority: 0,
            description: String::new(),
            message: String::new(),
        }
    }

    /// Create a death condition with priority 0 and an inferred reason.
    pub fn death(id: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ConditionKind::Death { reason: None },
            expression: expression.into(),
            priority: 0,
            description: String::new(),
            message: String::new(),
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Set the author-facing description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the player-facing message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Pin the death reason. Has no effect on win conditions.
    pub fn with_reason(mut self, reason: DeathReason) -> Self {
        if let ConditionKind::Death { reason: r } = &mut self.kind {
            *r = Some(reason);
        }
        self
    }

    /// True for win conditions.
    pub fn is_win(&self) -> bool {
        matches!(self.kind, ConditionKind::Win { .. })
    }

    /// True for death conditions.
    pub fn is_death(&self) -> bool {
        matches!(self.kind, ConditionKind::Death { .. })
    }

    /// The win level, if this is a win condition.
    pub fn level(&self) -> Option<WinLevel> {
        match self.kind {
            ConditionKind::Win { level } => Some(level),
            ConditionKind::Death { .. } => None,
        }
    }
}

/// Deserialize a JSON array of conditions and check that ids are unique
/// and non-empty.
pub fn load_conditions(json: &str) -> NrResult<Vec<Condition>> {
    let conditions: Vec<Condition> = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    for condition in &conditions {
        if condition.id.trim().is_empty() {
            return Err(NrError::InvalidCondition {
                id: condition.id.clone(),
                reason: "id must not be empty".to_string(),
            });
        }
        if !seen.insert(condition.id.as_str()) {
            return Err(NrError::DuplicateId(condition.id.clone()));
        }
    }

    Ok(conditions)
}
