use crate::foundation::core::Progress;

/// Binding between a scroll range and animation progress.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollTrigger {
    /// Scroll offset where progress is 0.
    pub start_px: f64,
    /// Scroll offset where progress is 1.
    pub end_px: f64,
}

impl ScrollTrigger {
    /// Trigger spanning `[start_px, end_px]`.
    pub fn new(start_px: f64, end_px: f64) -> Self {
        Self { start_px, end_px }
    }

    /// Trigger pinned at `start_px` for `length_px` of scrolling.
    pub fn pinned(start_px: f64, length_px: f64) -> Self {
        Self::new(start_px, start_px + length_px.max(0.0))
    }

    /// Clamped progress for a scroll offset.
    pub fn progress(&self, scroll_y: f64) -> Progress {
        let len = self.end_px - self.start_px;
        if len <= 0.0 {
            return if scroll_y >= self.start_px {
                Progress::END
            } else {
                Progress::START
            };
        }
        Progress::clamped((scroll_y - self.start_px) / len)
    }

    fn zone(&self, scroll_y: f64) -> Zone {
        if scroll_y < self.start_px {
            Zone::Before
        } else if scroll_y > self.end_px {
            Zone::After
        } else {
            Zone::Active
        }
    }
}

/// What happens when the user scrolls back above the trigger start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Scrubbing backwards exactly undoes the forward pass.
    #[default]
    Reversible,
    /// Leaving back past the start resets the section to its initial state.
    ResetOnLeaveBack,
}

/// Direction of the last scroll movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum ScrollDirection {
    /// No movement observed yet.
    #[default]
    Idle,
    /// Scroll offset increased.
    Forward,
    /// Scroll offset decreased.
    Backward,
}

/// Edge crossings, named after the usual scroll-trigger callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum TriggerEdge {
    /// Crossed the start going forward.
    Enter,
    /// Crossed the end going forward.
    Leave,
    /// Crossed the end going backward.
    EnterBack,
    /// Crossed the start going backward.
    LeaveBack,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Before,
    Active,
    After,
}

/// One observation of a [`ScrollTracker`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TriggerUpdate {
    /// Clamped progress at the new offset.
    pub progress: Progress,
    /// Direction of this movement.
    pub direction: ScrollDirection,
    /// Edge crossed by this movement, if any. When a fast scroll jumps over the whole range,
    /// the outer edge is reported.
    pub edge: Option<TriggerEdge>,
    /// Set when the owner must restore its initial state.
    pub reset: bool,
}

/// Stateful scroll observer for one trigger.
#[derive(Clone, Debug)]
pub struct ScrollTracker {
    trigger: ScrollTrigger,
    policy: TriggerPolicy,
    last_y: Option<f64>,
    zone: Zone,
}

impl ScrollTracker {
    /// Tracker starting before the trigger.
    pub fn new(trigger: ScrollTrigger, policy: TriggerPolicy) -> Self {
        Self {
            trigger,
            policy,
            last_y: None,
            zone: Zone::Before,
        }
    }

    /// Current trigger.
    pub fn trigger(&self) -> ScrollTrigger {
        self.trigger
    }

    /// Observe a new scroll offset.
    pub fn update(&mut self, scroll_y: f64) -> TriggerUpdate {
        let direction = match self.last_y {
            Some(prev) if scroll_y > prev => ScrollDirection::Forward,
            Some(prev) if scroll_y < prev => ScrollDirection::Backward,
            _ => ScrollDirection::Idle,
        };
        self.last_y = Some(scroll_y);

        let zone = self.trigger.zone(scroll_y);
        let edge = match (self.zone, zone) {
            (Zone::Before, Zone::Active) => Some(TriggerEdge::Enter),
            (Zone::Before, Zone::After) | (Zone::Active, Zone::After) => Some(TriggerEdge::Leave),
            (Zone::After, Zone::Active) => Some(TriggerEdge::EnterBack),
            (Zone::After, Zone::Before) | (Zone::Active, Zone::Before) => {
                Some(TriggerEdge::LeaveBack)
            }
            _ => None,
        };
        self.zone = zone;

        TriggerUpdate {
            progress: self.trigger.progress(scroll_y),
            direction,
            edge,
            reset: self.policy == TriggerPolicy::ResetOnLeaveBack
                && edge == Some(TriggerEdge::LeaveBack),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/progress/trigger.rs"]
mod tests;
