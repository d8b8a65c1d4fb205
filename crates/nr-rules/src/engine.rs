//! The condition engine: registry, cache, and observer behind one handle.

use std::sync::{Arc, Mutex, PoisonError};

use nr_core::{Condition, DeathReason, GameStateSnapshot, WinLevel};
use serde::Serialize;

use crate::cache::{CacheKey, ResultCache};
use crate::config::EngineConfig;
use crate::observer::{EvalObserver, NullObserver, TracingObserver};
use crate::outcome::EvaluationResult;
use crate::registry::ConditionRegistry;
use crate::resolver::{fires, resolve};

/// Size information about a running engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Fingerprints currently held in the result cache.
    pub cache_size: usize,
    /// Conditions in the registry, rejected ones included.
    pub condition_count: usize,
}

/// Evaluates a fixed set of conditions against game state snapshots.
///
/// The condition set is immutable after construction. The engine is `Sync`;
/// concurrent callers share the result cache.
pub struct Engine {
    registry: ConditionRegistry,
    cache: Mutex<ResultCache>,
    observer: Arc<dyn EvalObserver>,
    config: EngineConfig,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine with the default configuration.
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self::builder(conditions).build()
    }

    /// Start configuring an engine.
    pub fn builder(conditions: Vec<Condition>) -> EngineBuilder {
        EngineBuilder {
            conditions,
            config: EngineConfig::default(),
            observer: None,
        }
    }

    /// Evaluate every condition against `state`.
    ///
    /// A structurally identical snapshot seen within the cache TTL returns
    /// the earlier result, timestamp included.
    pub fn evaluate(&self, state: &GameStateSnapshot) -> EvaluationResult {
        let key = CacheKey::of(state);
        let fingerprint = key.fingerprint();

        if let Some(hit) = self.lock_cache().get(&key).cloned() {
            self.observer.cache_hit(fingerprint);
            return hit;
        }

        let result = resolve(&self.registry, state, self.observer.as_ref());
        self.observer.evaluated(fingerprint, &result);

        if !self.config.cache_ttl().is_zero() {
            self.lock_cache().put(key, result.clone());
        }
        result
    }

    /// Forget every cached result.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    /// Level of the highest-priority win condition that holds in `state`.
    ///
    /// Death conditions are ignored and the cache is bypassed.
    pub fn check_win(&self, state: &GameStateSnapshot) -> Option<WinLevel> {
        self.registry
            .iter()
            .filter(|entry| entry.condition().is_win())
            .find(|entry| fires(entry, state, self.observer.as_ref()))
            .and_then(|entry| entry.outcome().win_level())
    }

    /// Reason of the highest-priority death condition that holds in `state`.
    ///
    /// Win conditions are ignored and the cache is bypassed.
    pub fn check_death(&self, state: &GameStateSnapshot) -> Option<DeathReason> {
        self.registry
            .iter()
            .filter(|entry| entry.condition().is_death())
            .find(|entry| fires(entry, state, self.observer.as_ref()))
            .and_then(|entry| entry.outcome().death_reason())
    }

    /// Cache and registry sizes.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cache_size: self.lock_cache().len(),
            condition_count: self.registry.len(),
        }
    }

    /// The compiled conditions.
    pub fn registry(&self) -> &ConditionRegistry {
        &self.registry
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, ResultCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Configures and builds an [`Engine`].
pub struct EngineBuilder {
    conditions: Vec<Condition>,
    config: EngineConfig,
    observer: Option<Arc<dyn EvalObserver>>,
}

impl EngineBuilder {
    /// Replace the configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Report engine events to `observer`.
    ///
    /// Without one, the engine uses [`TracingObserver`] when
    /// [`EngineConfig::debug`] is set and [`NullObserver`] otherwise.
    pub fn observer(mut self, observer: Arc<dyn EvalObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Compile the conditions and build the engine.
    pub fn build(self) -> Engine {
        let observer = self.observer.unwrap_or_else(|| {
            if self.config.debug {
                Arc::new(TracingObserver)
            } else {
                Arc::new(NullObserver)
            }
        });

        let registry = ConditionRegistry::new(self.conditions);
        for entry in registry.rejected() {
            observer.rejected(entry.condition(), entry.diagnostics());
        }

        Engine {
            cache: Mutex::new(ResultCache::new(
                self.config.cache_ttl(),
                self.config.max_cache_entries,
            )),
            registry,
            observer,
            config: self.config,
        }
    }
}
