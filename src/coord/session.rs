use std::collections::BTreeMap;

use crate::{
    config::ChoreoConfig,
    coord::signal::{SignalBus, Topic},
    foundation::core::{Breakpoints, Viewport},
    geometry::{
        cache::PositionCache,
        snapshot::{GeometrySnapshot, ResizeTolerance},
    },
};

/// Sections owning a position cache.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CacheSlot {
    /// Letter-dot anchors.
    Dot,
    /// Portfolio header.
    Reveal,
    /// Pinned card stack.
    Stack,
    /// Section offsets for navigation.
    Nav,
}

/// State that lives for one page session and survives component remounts.
///
/// Dropping the session is the equivalent of a page reload.
#[derive(Clone, Debug)]
pub struct Session {
    breakpoints: Breakpoints,
    tolerance: ResizeTolerance,
    caches: BTreeMap<CacheSlot, PositionCache>,
    signals: SignalBus,
    dot_ever_completed: bool,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::init(&ChoreoConfig::default())
    }
}

impl Session {
    /// Fresh session using the breakpoints and tolerances of `config`.
    pub fn init(config: &ChoreoConfig) -> Self {
        Self {
            breakpoints: config.breakpoints,
            tolerance: config.resize_tolerance,
            caches: BTreeMap::new(),
            signals: SignalBus::new(),
            dot_ever_completed: false,
            generation: 0,
        }
    }

    /// Drop every cache, signal and flag.
    pub fn reset(&mut self) {
        self.caches.clear();
        self.signals = SignalBus::new();
        self.dot_ever_completed = false;
        self.generation += 1;
        tracing::debug!(generation = self.generation, "session reset");
    }

    /// Number of resets so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Breakpoints used for device classification.
    pub fn breakpoints(&self) -> Breakpoints {
        self.breakpoints
    }

    /// Position cache of `slot`, created empty on first use.
    pub fn cache(&mut self, slot: CacheSlot) -> &mut PositionCache {
        let (breakpoints, tolerance) = (self.breakpoints, self.tolerance);
        self.caches
            .entry(slot)
            .or_insert_with(|| PositionCache::new(breakpoints, tolerance))
    }

    /// Cached snapshot of `slot` still valid for `viewport`; stale entries are dropped.
    pub fn cached_geometry(&mut self, slot: CacheSlot, viewport: &Viewport) -> Option<GeometrySnapshot> {
        self.cache(slot).get_valid(viewport).cloned()
    }

    /// Store a freshly sampled snapshot for `slot`.
    pub fn store_geometry(&mut self, slot: CacheSlot, snapshot: GeometrySnapshot) {
        self.cache(slot).set(snapshot);
    }

    /// Drop every cached snapshot, keeping signals.
    pub fn invalidate_geometry(&mut self) {
        for cache in self.caches.values_mut() {
            cache.invalidate();
        }
    }

    /// Signal bus.
    pub fn signals(&self) -> &SignalBus {
        &self.signals
    }

    /// Mutable signal bus.
    pub fn signals_mut(&mut self) -> &mut SignalBus {
        &mut self.signals
    }

    /// Shorthand for [`SignalBus::is_set`].
    pub fn is_set(&self, topic: Topic) -> bool {
        self.signals.is_set(topic)
    }

    /// Record that the dot reached its resting state at least once.
    pub fn mark_dot_completed(&mut self) {
        self.dot_ever_completed = true;
    }

    /// `true` once the dot rested in this session; later activations restore instantly.
    pub fn dot_ever_completed(&self) -> bool {
        self.dot_ever_completed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/coord/session.rs"]
mod tests;
