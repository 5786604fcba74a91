use crate::foundation::core::Millis;

/// Trailing-edge debounce: a value is released once no newer value arrived for `window_ms`.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    window_ms: u64,
    pending: Option<(Millis, T)>,
}

impl<T> Debouncer<T> {
    /// Debouncer with the given quiet window.
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    /// Quiet window in milliseconds.
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Replace the pending value and restart the window.
    pub fn push(&mut self, now: Millis, value: T) {
        self.pending = Some((now, value));
    }

    /// Release the pending value if the window elapsed.
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        match &self.pending {
            Some((at, _)) if now.since(*at) >= self.window_ms => {
                self.pending.take().map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// `true` while a value waits for its window.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Value waiting for its window, if any.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, v)| v)
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/debounce.rs"]
mod tests;
