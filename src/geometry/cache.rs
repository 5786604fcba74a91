use crate::{
    foundation::core::{Breakpoints, Viewport},
    geometry::snapshot::{GeometrySnapshot, ResizeTolerance},
};

/// Memo of the last measured geometry for one section.
///
/// Lives in the page [`Session`](crate::Session), so it survives component remounts but not a
/// reload. A hit lets the owner restore final-state visuals without replaying the intro.
#[derive(Clone, Debug, Default)]
pub struct PositionCache {
    slot: Option<GeometrySnapshot>,
    breakpoints: Breakpoints,
    tolerance: ResizeTolerance,
}

impl PositionCache {
    /// Empty cache with explicit staleness rules.
    pub fn new(breakpoints: Breakpoints, tolerance: ResizeTolerance) -> Self {
        Self {
            slot: None,
            breakpoints,
            tolerance,
        }
    }

    /// Cached snapshot regardless of staleness.
    pub fn get(&self) -> Option<&GeometrySnapshot> {
        self.slot.as_ref()
    }

    /// Store a fresh snapshot, replacing any previous one.
    pub fn set(&mut self, snapshot: GeometrySnapshot) {
        tracing::trace!(anchors = snapshot.anchors.len(), "position cache set");
        self.slot = Some(snapshot);
    }

    /// Drop the cached snapshot.
    pub fn invalidate(&mut self) {
        if self.slot.take().is_some() {
            tracing::debug!("position cache invalidated");
        }
    }

    /// Snapshot usable for `viewport`; a stale entry is dropped and `None` returned.
    pub fn get_valid(&mut self, viewport: &Viewport) -> Option<&GeometrySnapshot> {
        let fresh = self
            .slot
            .as_ref()
            .is_some_and(|s| s.is_valid_for(viewport, &self.breakpoints, &self.tolerance));
        if !fresh {
            self.invalidate();
            return None;
        }
        self.slot.as_ref()
    }

    /// Return `true` when a snapshot is stored.
    pub fn is_populated(&self) -> bool {
        self.slot.is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/cache.rs"]
mod tests;
