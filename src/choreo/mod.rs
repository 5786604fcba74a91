//! Per-section choreographies.
//!
//! Every section describes its motion as a [`TimelineDef`](crate::timeline::def::TimelineDef)
//! generated from its parameters and plays it through the shared timeline builder; the
//! modules differ only in what drives progress (clock or scroll) and which signals they own.

use std::collections::BTreeMap;

use crate::{
    animation::{ease::Ease, ops::local_progress, visual::VisualState},
    driver::{AnimationDriver, TargetId, apply_state},
    foundation::core::{DeviceClass, Millis, Size},
    coord::session::{CacheSlot, Session},
    geometry::{
        sampler::{AnchorRequest, AnchorSource, BoxPoint, GeometrySampler, LayoutProbe},
        snapshot::{AnchorId, GeometrySnapshot},
    },
    progress::trigger::{ScrollTracker, ScrollTrigger, TriggerUpdate},
    timeline::{
        builder::{MotionMode, Timeline, TimelineFrame},
        def::{KeyDef, StateDef},
    },
};

/// Letter-dot flight.
pub mod dot;
/// Hero name reveal.
pub mod hero;
/// Section navigation.
pub mod nav;
/// Portfolio header reveal.
pub mod reveal;
/// Pinned card stack.
pub mod stack;

/// How a section came up when activated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Keyframes will be interpolated from now on.
    Playing,
    /// The final state was applied immediately.
    Restored,
    /// Waiting for a signal, a settle delay or geometry.
    Waiting,
    /// Geometry is missing; the section stays idle.
    Unavailable,
}

/// Scroll range of a section, derived from the top edge of its element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionTrigger {
    /// Section element.
    pub element: AnchorId,
    /// Progress starts when the element top reaches this fraction of the visible height.
    pub start_vh: f64,
    /// Scroll distance from progress 0 to 1.
    pub length_px: f64,
}

impl SectionTrigger {
    /// Request measuring the element's top-left corner.
    pub fn request(&self) -> AnchorRequest {
        AnchorRequest {
            id: self.element.clone(),
            source: AnchorSource::Element {
                element: self.element.clone(),
                point: BoxPoint::TopLeft,
            },
        }
    }

    /// Trigger for `geometry`, using the scroll offset it was captured at.
    pub fn resolve(&self, geometry: &GeometrySnapshot) -> Option<ScrollTrigger> {
        let top = geometry.document_anchor(&self.element)?.y;
        let start = top - geometry.viewport.effective_height() * self.start_vh;
        Some(ScrollTrigger::pinned(start, self.length_px))
    }
}

/// Cached geometry of a scroll section, sampled at `scroll_y` and stored on a miss.
pub(crate) fn section_geometry<P: LayoutProbe + ?Sized>(
    now: Millis,
    scroll_y: f64,
    slot: CacheSlot,
    trigger: &SectionTrigger,
    sampler: &GeometrySampler,
    session: &mut Session,
    probe: &mut P,
) -> Option<GeometrySnapshot> {
    let viewport = probe.viewport();
    if let Some(cached) = session
        .cached_geometry(slot, &viewport)
        .filter(|g| g.anchor(&trigger.element).is_some())
    {
        return Some(cached);
    }
    let sampled = sampler
        .sample(probe, &[trigger.request()], Size::ZERO, now)
        .at_scroll(scroll_y);
    sampled.anchor(&trigger.element)?;
    session.store_geometry(slot, sampled.clone());
    Some(sampled)
}

/// Motion mode for a section that skips to its final state on phones.
pub(crate) fn motion_for(device: DeviceClass, reduced_motion: bool) -> MotionMode {
    if reduced_motion || device == DeviceClass::Mobile {
        MotionMode::SkipToFinal
    } else {
        MotionMode::Full
    }
}

pub(crate) fn apply_states<D: AnimationDriver + ?Sized>(
    driver: &mut D,
    states: &BTreeMap<TargetId, VisualState>,
) {
    for (target, state) in states {
        apply_state(driver, target, state);
    }
}

pub(crate) fn key(at: f64, state: StateDef, ease: Ease) -> KeyDef {
    KeyDef { at, state, ease }
}

/// Clock-driven playback of a built timeline.
#[derive(Clone, Debug)]
pub(crate) struct Playback {
    timeline: Timeline,
    started: Millis,
    duration_ms: u64,
}

impl Playback {
    pub(crate) fn new(timeline: Timeline, started: Millis, duration_ms: u64) -> Self {
        Self {
            timeline,
            started,
            duration_ms,
        }
    }

    pub(crate) fn started(&self) -> Millis {
        self.started
    }

    pub(crate) fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub(crate) fn is_finished(&self, now: Millis) -> bool {
        now.since(self.started) >= self.duration_ms
    }

    pub(crate) fn frame(&self, now: Millis) -> TimelineFrame {
        let p = local_progress(now.since(self.started), 0, self.duration_ms);
        self.timeline.evaluate(p)
    }
}

/// Scroll-driven playback of a built timeline.
#[derive(Clone, Debug)]
pub(crate) struct ScrollPlayer {
    timeline: Timeline,
    tracker: ScrollTracker,
    interpolated_frames: u64,
}

impl ScrollPlayer {
    pub(crate) fn new(timeline: Timeline, trigger: ScrollTrigger) -> Self {
        let tracker = ScrollTracker::new(trigger, timeline.policy());
        Self {
            timeline,
            tracker,
            interpolated_frames: 0,
        }
    }

    pub(crate) fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub(crate) fn interpolated_frames(&self) -> u64 {
        self.interpolated_frames
    }

    pub(crate) fn trigger(&self) -> ScrollTrigger {
        self.tracker.trigger()
    }

    /// Observe `scroll_y` and write the resulting frame. A reset writes the initial states.
    pub(crate) fn update<D: AnimationDriver + ?Sized>(
        &mut self,
        scroll_y: f64,
        driver: &mut D,
    ) -> (TriggerUpdate, Option<TimelineFrame>) {
        let update = self.tracker.update(scroll_y);
        if update.reset {
            apply_states(driver, &self.timeline.initial());
            return (update, None);
        }
        let frame = self.timeline.evaluate(update.progress.get());
        apply_states(driver, &frame.states);
        let p = update.progress.get();
        if self.timeline.motion() == MotionMode::Full && p > 0.0 && p < 1.0 {
            self.interpolated_frames += 1;
        }
        (update, Some(frame))
    }
}
