use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NrResult;

/// Attribute names that conditions may reference without the `attributes.` prefix.
///
/// `health` and `attributes.health` always name the same mapping entry.
pub const ATTRIBUTE_SCHEMA: [&str; 8] = [
    "health",
    "hunger",
    "sanity",
    "intelligence",
    "strength",
    "speed",
    "luck",
    "profession",
];

/// Value of a single player attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Numeric stat such as health or luck.
    Number(f64),
    /// Textual attribute such as profession.
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A read-only view of everything a condition can reference.
///
/// Owned by the host game loop; the engine only borrows it for one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStateSnapshot {
    /// Player attributes keyed by name.
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Carried item ids. Order is irrelevant, duplicates count.
    pub inventory: Vec<String>,
    /// Story flags.
    pub flags: BTreeMap<String, bool>,
    /// Days survived so far.
    pub day: u32,
    /// In-game clock.
    pub time: f64,
    /// Current location id.
    pub location: String,
}

impl GameStateSnapshot {
    /// Create an empty snapshot on day 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> NrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add one item to the inventory.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.inventory.push(item.into());
        self
    }

    /// Set a flag.
    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    /// Set the day counter.
    pub fn with_day(mut self, day: u32) -> Self {
        self.day = day;
        self
    }

    /// Set the in-game clock.
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Set the current location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Check whether the inventory holds at least one of `item`.
    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|i| i == item)
    }

    /// Flag value, `false` when unset.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}
