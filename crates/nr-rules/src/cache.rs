//! Time-limited memo of evaluation results keyed by snapshot contents.

use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{Duration, Instant};

use nr_core::{AttributeValue, GameStateSnapshot};

use crate::outcome::EvaluationResult;

/// Structural hash of the snapshot fields a condition can reference.
///
/// Inventory order does not affect the fingerprint; duplicate items do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint a snapshot.
    pub fn of(state: &GameStateSnapshot) -> Self {
        let mut h = DefaultHasher::new();

        state.attributes.len().hash(&mut h);
        for (name, value) in &state.attributes {
            name.hash(&mut h);
            match value {
                AttributeValue::Number(n) => {
                    0u8.hash(&mut h);
                    n.to_bits().hash(&mut h);
                }
                AttributeValue::Text(s) => {
                    1u8.hash(&mut h);
                    s.hash(&mut h);
                }
            }
        }

        let mut items: Vec<&str> = state.inventory.iter().map(String::as_str).collect();
        items.sort_unstable();
        items.hash(&mut h);

        state.flags.hash(&mut h);
        state.day.hash(&mut h);
        state.time.to_bits().hash(&mut h);
        state.location.hash(&mut h);

        Self(h.finish())
    }
}

/// Cache lookup key: the fingerprint plus the snapshot it was taken from.
///
/// Entries are bucketed by fingerprint but only match when the normalized
/// snapshots are equal, so two states whose hashes collide never share a
/// result.
#[derive(Debug, Clone)]
pub struct CacheKey {
    fingerprint: Fingerprint,
    state: GameStateSnapshot,
}

impl CacheKey {
    /// Key for `state`. Inventory is stored sorted.
    pub fn of(state: &GameStateSnapshot) -> Self {
        let mut state = state.clone();
        state.inventory.sort_unstable();
        Self {
            fingerprint: Fingerprint::of(&state),
            state,
        }
    }

    /// The structural hash of the keyed snapshot.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    state: GameStateSnapshot,
    result: EvaluationResult,
    computed_at: Instant,
}

/// Fingerprint → result map whose entries expire after a fixed TTL.
#[derive(Debug, Clone)]
pub struct ResultCache {
    ttl: Duration,
    max_entries: usize,
    entries: HashMap<Fingerprint, CacheEntry>,
}

impl ResultCache {
    /// Create a cache. `max_entries == 0` means unbounded.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: HashMap::new(),
        }
    }

    /// Look up a result younger than the TTL.
    pub fn get(&self, key: &CacheKey) -> Option<&EvaluationResult> {
        self.get_at(key, Instant::now())
    }

    /// Look up a result as of `now`.
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<&EvaluationResult> {
        self.entries
            .get(&key.fingerprint)
            .filter(|entry| entry.state == key.state)
            .filter(|entry| now.saturating_duration_since(entry.computed_at) < self.ttl)
            .map(|entry| &entry.result)
    }

    /// Store or overwrite a result.
    pub fn put(&mut self, key: CacheKey, result: EvaluationResult) {
        self.put_at(key, result, Instant::now());
    }

    /// Store or overwrite a result computed at `now`.
    ///
    /// When the cache is bounded and full, expired entries are dropped first,
    /// then the oldest live entry. A colliding entry for a different
    /// snapshot is replaced.
    pub fn put_at(&mut self, key: CacheKey, result: EvaluationResult, now: Instant) {
        let CacheKey { fingerprint, state } = key;
        if self.max_entries > 0
            && self.entries.len() >= self.max_entries
            && !self.entries.contains_key(&fingerprint)
        {
            let ttl = self.ttl;
            self.entries
                .retain(|_, e| now.saturating_duration_since(e.computed_at) < ttl);

            if self.entries.len() >= self.max_entries
                && let Some(oldest) = self
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| e.computed_at)
                    .map(|(fp, _)| *fp)
            {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            fingerprint,
            CacheEntry {
                state,
                result,
                computed_at: now,
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use nr_core::WinLevel;

    const TTL: Duration = Duration::from_millis(1000);

    fn result(outcome: Outcome) -> EvaluationResult {
        EvaluationResult {
            outcome,
            ..EvaluationResult::empty()
        }
    }

    fn base() -> GameStateSnapshot {
        GameStateSnapshot::new()
            .with_attribute("health", 85)
            .with_item("golden_key")
            .with_item("food")
            .with_flag("rule1_broken", false)
            .with_day(1)
            .with_time(100.0)
            .with_location("dormitory")
    }

    #[test]
    fn fingerprint_ignores_inventory_order() {
        let a = base();
        let mut b = base();
        b.inventory.reverse();
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn fingerprint_tracks_every_field() {
        let fp = Fingerprint::of(&base());
        assert_ne!(fp, Fingerprint::of(&base().with_attribute("health", 84)));
        assert_ne!(fp, Fingerprint::of(&base().with_item("food")));
        assert_ne!(fp, Fingerprint::of(&base().with_flag("rule1_broken", true)));
        assert_ne!(fp, Fingerprint::of(&base().with_day(2)));
        assert_ne!(fp, Fingerprint::of(&base().with_time(101.0)));
        assert_ne!(fp, Fingerprint::of(&base().with_location("roof")));
    }

    #[test]
    fn number_and_text_attributes_differ() {
        let num = GameStateSnapshot::new().with_attribute("profession", 1);
        let text = GameStateSnapshot::new().with_attribute("profession", "1");
        assert_ne!(Fingerprint::of(&num), Fingerprint::of(&text));
    }

    #[test]
    fn entries_expire_after_ttl() {
        let mut cache = ResultCache::new(TTL, 0);
        let key = CacheKey::of(&base());
        let t0 = Instant::now();
        cache.put_at(key.clone(), result(Outcome::Win(WinLevel::B)), t0);

        assert!(cache.get_at(&key, t0 + Duration::from_millis(999)).is_some());
        assert!(cache.get_at(&key, t0 + TTL).is_none());
        // Expired entries still occupy space until overwritten or cleared.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_overwrites() {
        let mut cache = ResultCache::new(TTL, 0);
        let key = CacheKey::of(&base());
        let t0 = Instant::now();
        cache.put_at(key.clone(), result(Outcome::Win(WinLevel::B)), t0);
        cache.put_at(key.clone(), result(Outcome::Win(WinLevel::S)), t0);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get_at(&key, t0).map(|r| r.outcome),
            Some(Outcome::Win(WinLevel::S))
        );
    }

    #[test]
    fn clear_drops_everything() {
        let mut cache = ResultCache::new(TTL, 0);
        cache.put(CacheKey::of(&base()), EvaluationResult::empty());
        cache.put(CacheKey::of(&base().with_day(9)), EvaluationResult::empty());
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn bounded_cache_evicts_oldest() {
        let mut cache = ResultCache::new(TTL, 2);
        let t0 = Instant::now();
        let a = CacheKey::of(&base().with_day(1));
        let b = CacheKey::of(&base().with_day(2));
        let c = CacheKey::of(&base().with_day(3));

        cache.put_at(a.clone(), EvaluationResult::empty(), t0);
        cache.put_at(b.clone(), EvaluationResult::empty(), t0 + Duration::from_millis(10));
        cache.put_at(c.clone(), EvaluationResult::empty(), t0 + Duration::from_millis(20));

        let now = t0 + Duration::from_millis(30);
        assert_eq!(cache.len(), 2);
        assert!(cache.get_at(&a, now).is_none());
        assert!(cache.get_at(&b, now).is_some());
        assert!(cache.get_at(&c, now).is_some());
    }

    #[test]
    fn bounded_cache_prefers_dropping_expired() {
        let mut cache = ResultCache::new(Duration::from_millis(100), 2);
        let t0 = Instant::now();
        let a = CacheKey::of(&base().with_day(1));
        let b = CacheKey::of(&base().with_day(2));
        let c = CacheKey::of(&base().with_day(3));

        cache.put_at(a.clone(), EvaluationResult::empty(), t0);
        cache.put_at(b.clone(), EvaluationResult::empty(), t0 + Duration::from_millis(150));
        cache.put_at(c.clone(), EvaluationResult::empty(), t0 + Duration::from_millis(160));

        let now = t0 + Duration::from_millis(170);
        assert!(cache.get_at(&b, now).is_some());
        assert!(cache.get_at(&c, now).is_some());
    }

    #[test]
    fn colliding_fingerprints_do_not_share_results() {
        let mut cache = ResultCache::new(TTL, 0);
        let t0 = Instant::now();
        let alive = CacheKey::of(&base());
        let other = CacheKey {
            fingerprint: alive.fingerprint(),
            state: base().with_attribute("health", 0),
        };

        cache.put_at(alive.clone(), result(Outcome::Win(WinLevel::B)), t0);
        assert!(cache.get_at(&other, t0).is_none());
        assert!(cache.get_at(&alive, t0).is_some());

        cache.put_at(other.clone(), EvaluationResult::empty(), t0);
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at(&alive, t0).is_none());
        assert_eq!(cache.get_at(&other, t0).map(|r| r.outcome), Some(Outcome::None));
    }

    #[test]
    fn key_ignores_inventory_order() {
        let mut cache = ResultCache::new(TTL, 0);
        let t0 = Instant::now();
        let mut reordered = base();
        reordered.inventory.reverse();

        cache.put_at(CacheKey::of(&base()), EvaluationResult::empty(), t0);
        assert!(cache.get_at(&CacheKey::of(&reordered), t0).is_some());
    }
}
