use std::collections::BTreeSet;

use crate::{
    foundation::core::{Breakpoints, DeviceClass, Millis, Viewport},
    viewport::debounce::Debouncer,
};

/// Handle of an attached resize listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Settings of a [`ViewportAdapter`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdapterSettings {
    /// Debounce window.
    pub debounce_ms: u64,
    /// Height-only changes on mobile below this are browser chrome or the virtual keyboard.
    pub mobile_height_threshold_px: f64,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            mobile_height_threshold_px: 150.0,
        }
    }
}

/// A debounced, accepted viewport change.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ResizeEvent {
    /// Viewport before the change.
    pub previous: Viewport,
    /// Viewport after the change.
    pub viewport: Viewport,
    /// Device class after the change.
    pub device: DeviceClass,
    /// `true` when the device class changed; timelines must be rebuilt.
    pub class_changed: bool,
}

/// Turns raw host resize notifications into debounced [`ResizeEvent`]s.
#[derive(Clone, Debug)]
pub struct ViewportAdapter {
    breakpoints: Breakpoints,
    settings: AdapterSettings,
    current: Viewport,
    debouncer: Debouncer<Viewport>,
    listeners: BTreeSet<ListenerId>,
    next_listener: u64,
}

impl ViewportAdapter {
    /// Adapter starting at `viewport` with no listeners.
    pub fn new(viewport: Viewport, breakpoints: Breakpoints, settings: AdapterSettings) -> Self {
        Self {
            breakpoints,
            settings,
            current: viewport,
            debouncer: Debouncer::new(settings.debounce_ms),
            listeners: BTreeSet::new(),
            next_listener: 0,
        }
    }

    /// Last accepted viewport.
    pub fn current(&self) -> Viewport {
        self.current
    }

    /// Device class of the last accepted viewport.
    pub fn device(&self) -> DeviceClass {
        self.breakpoints.classify(self.current.width)
    }

    /// Register a listener.
    pub fn attach(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id);
        id
    }

    /// Remove a listener. Returns `false` when it was not attached.
    pub fn detach(&mut self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(&id);
        if self.listeners.is_empty() {
            self.debouncer.cancel();
        }
        removed
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Record a raw resize notification.
    pub fn on_resize(&mut self, now: Millis, viewport: Viewport) {
        if self.listeners.is_empty() || !viewport.is_usable() {
            return;
        }
        if self.is_keyboard_jitter(&viewport) {
            tracing::trace!(
                from = self.latest().height,
                to = viewport.height,
                "ignoring mobile height change"
            );
            return;
        }
        self.debouncer.push(now, viewport);
    }

    /// Release the pending resize once its window elapsed and it differs from the current one.
    pub fn poll(&mut self, now: Millis) -> Option<ResizeEvent> {
        let next = self.debouncer.poll(now)?;
        if next == self.current {
            return None;
        }
        let previous = std::mem::replace(&mut self.current, next);
        let device = self.breakpoints.classify(next.width);
        let event = ResizeEvent {
            previous,
            viewport: next,
            device,
            class_changed: self.breakpoints.classify(previous.width) != device,
        };
        tracing::debug!(
            width = next.width,
            height = next.height,
            class_changed = event.class_changed,
            "viewport resized"
        );
        Some(event)
    }

    /// `true` while a resize waits for its debounce window.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Most recent viewport seen: the pending one, else the accepted one.
    fn latest(&self) -> Viewport {
        self.debouncer.pending().copied().unwrap_or(self.current)
    }

    fn is_keyboard_jitter(&self, next: &Viewport) -> bool {
        let base = self.latest();
        self.breakpoints.classify(base.width) == DeviceClass::Mobile
            && next.width == base.width
            && (next.height - base.height).abs() < self.settings.mobile_height_threshold_px
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/adapter.rs"]
mod tests;
