//! scrollwork is a headless, scroll-synchronized animation choreographer.
//!
//! It measures anchor geometry through a host [`LayoutProbe`], maps scroll offsets and clock
//! time onto phase tables, evaluates keyframed [`VisualState`]s and writes them through an
//! [`AnimationDriver`]. Sections coordinate only through completion signals kept in a page
//! [`Session`].
//!
//! - Load a [`ChoreoConfig`]
//! - Create a [`Stage`] and forward mount, scroll, tick, resize and unmount events to it
//! - Or use the building blocks directly: [`TimelineDef`] -> [`TimelineBuilder`] -> [`Timeline`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
/// Per-section choreographies.
pub mod choreo;
pub(crate) mod config;
pub(crate) mod coord;
pub(crate) mod driver;
pub(crate) mod geometry;
pub(crate) mod progress;
pub(crate) mod stage;
pub(crate) mod timeline;
pub(crate) mod viewport;

pub use crate::foundation::core::{
    Breakpoints, DeviceClass, Millis, Point, Progress, Rect, Rgba8, Size, Vec2, Viewport,
};
pub use crate::foundation::error::{ChoreoError, ChoreoResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::keyframes::{Keyframe, Keyframes};
pub use crate::animation::ops::{local_progress, stagger, stagger_total};
pub use crate::animation::visual::{Lerp, VisualState};
pub use crate::choreo::Activation;
pub use crate::config::ChoreoConfig;
pub use crate::coord::readiness::{ReadyFuture, Readiness, RetryDecision, RetryPolicy, RetryState};
pub use crate::coord::session::{CacheSlot, Session};
pub use crate::coord::signal::{CompletionSignal, SignalBus, Subscription, Topic};
pub use crate::driver::{
    AnimationDriver, Property, PropertyValue, RecordingDriver, TargetId, apply_state,
    kill_and_hide,
};
pub use crate::geometry::cache::PositionCache;
pub use crate::geometry::sampler::{
    AnchorRequest, AnchorSource, BoxPoint, FontSpec, GeometrySampler, LayoutProbe, MeasureNodeId,
    measure_text_width,
};
pub use crate::geometry::snapshot::{AnchorId, GeometrySnapshot, ResizeTolerance};
pub use crate::geometry::static_layout::StaticLayout;
pub use crate::progress::mapper::{PhaseHit, PhaseSpan, PhaseTable, ProgressMapper};
pub use crate::progress::trigger::{
    ScrollDirection, ScrollTracker, ScrollTrigger, TriggerEdge, TriggerPolicy, TriggerUpdate,
};
pub use crate::stage::{MountReport, SectionOutcome, Stage};
pub use crate::timeline::builder::{MotionMode, Timeline, TimelineBuilder, TimelineFrame};
pub use crate::timeline::def::{
    KeyDef, LaneDef, PhaseDef, PhaseKeysDef, PointDef, PropMask, Responsive, StateDef, TimelineDef,
};
pub use crate::viewport::adapter::{AdapterSettings, ListenerId, ResizeEvent, ViewportAdapter};
pub use crate::viewport::debounce::Debouncer;
