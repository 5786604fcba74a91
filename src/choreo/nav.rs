use std::fmt;

use crate::{
    animation::visual::VisualState,
    coord::{
        session::{CacheSlot, Session},
        signal::Topic,
    },
    driver::{AnimationDriver, TargetId, apply_state},
    foundation::core::{Millis, Size},
    foundation::error::ChoreoError,
    geometry::{
        sampler::{AnchorRequest, AnchorSource, BoxPoint, GeometrySampler, LayoutProbe},
        snapshot::AnchorId,
    },
};

/// Page sections reachable from the navigation bar.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    /// Landing section with the name.
    Hero,
    /// Work history.
    Experience,
    /// Portfolio.
    Work,
    /// Certificates.
    Certificates,
    /// Contact form.
    Contact,
}

impl SectionId {
    /// Every section in page order.
    pub const ALL: [SectionId; 5] = [
        SectionId::Hero,
        SectionId::Experience,
        SectionId::Work,
        SectionId::Certificates,
        SectionId::Contact,
    ];

    /// Identifier used for the section element and in navigation links.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Experience => "experience",
            Self::Work => "work",
            Self::Certificates => "certificates",
            Self::Contact => "contact",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SectionId {
    type Err = ChoreoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('#');
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ChoreoError::validation(format!("unknown section '{s}'")))
    }
}

/// Navigation settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Height of the fixed bar; scroll targets land below it.
    pub header_offset_px: f64,
    /// Driver target of the bar.
    pub bar_target: TargetId,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            header_offset_px: 72.0,
            bar_target: TargetId::new("nav-bar"),
        }
    }
}

/// Position between two adjacent sections.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SectionTransition {
    /// Section being left.
    pub from: SectionId,
    /// Section being approached.
    pub to: SectionId,
    /// `0` at the top of `from`, `1` at the top of `to`.
    pub blend: f64,
}

type NavigateCallback = Box<dyn FnMut(SectionId, f64)>;

/// Section offsets, scroll targets and the navigation bar.
pub struct Navigator {
    config: NavConfig,
    offsets: Vec<(SectionId, f64)>,
    callbacks: Vec<NavigateCallback>,
    bar_visible: Option<bool>,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("offsets", &self.offsets)
            .field("callbacks", &self.callbacks.len())
            .field("bar_visible", &self.bar_visible)
            .finish()
    }
}

impl Navigator {
    /// Navigator without measured sections.
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            offsets: Vec::new(),
            callbacks: Vec::new(),
            bar_visible: None,
        }
    }

    /// Measure every section's top edge in document coordinates. Returns how many were found.
    pub fn measure<P: LayoutProbe + ?Sized>(
        &mut self,
        now: Millis,
        scroll_y: f64,
        session: &mut Session,
        sampler: &GeometrySampler,
        probe: &mut P,
    ) -> usize {
        let requests: Vec<AnchorRequest> = SectionId::ALL
            .iter()
            .map(|id| AnchorRequest {
                id: AnchorId::new(id.as_str()),
                source: AnchorSource::Element {
                    element: AnchorId::new(id.as_str()),
                    point: BoxPoint::TopLeft,
                },
            })
            .collect();
        let viewport = probe.viewport();
        let geometry = match session.cached_geometry(CacheSlot::Nav, &viewport) {
            Some(g) => g,
            None => {
                let g = sampler
                    .sample(probe, &requests, Size::ZERO, now)
                    .at_scroll(scroll_y);
                session.store_geometry(CacheSlot::Nav, g.clone());
                g
            }
        };
        self.set_offsets(SectionId::ALL.iter().filter_map(|id| {
            geometry
                .document_anchor(&AnchorId::new(id.as_str()))
                .map(|p| (*id, p.y))
        }));
        self.offsets.len()
    }

    /// Replace the document offsets of the sections.
    pub fn set_offsets(&mut self, offsets: impl IntoIterator<Item = (SectionId, f64)>) {
        self.offsets = offsets.into_iter().collect();
        self.offsets.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    /// Document offset of a section.
    pub fn offset(&self, id: SectionId) -> Option<f64> {
        self.offsets.iter().find(|(s, _)| *s == id).map(|(_, y)| *y)
    }

    /// Register a callback run on every navigation with the section and its scroll target.
    pub fn on_navigate(&mut self, callback: impl FnMut(SectionId, f64) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Scroll target of `id`, notifying every callback. `None` when the section is not mounted.
    pub fn navigate(&mut self, id: SectionId) -> Option<f64> {
        let target = (self.offset(id)? - self.config.header_offset_px).max(0.0);
        tracing::debug!(section = %id, target, "navigate");
        for cb in &mut self.callbacks {
            cb(id, target);
        }
        Some(target)
    }

    /// Section under the bottom edge of the navigation bar.
    pub fn active_section(&self, scroll_y: f64) -> Option<SectionId> {
        let y = scroll_y + self.config.header_offset_px;
        let idx = self.offsets.partition_point(|(_, top)| *top <= y);
        self.offsets.get(idx.saturating_sub(1)).map(|(id, _)| *id)
    }

    /// Blend between the active section and the next one.
    pub fn transition(&self, scroll_y: f64) -> Option<SectionTransition> {
        let y = scroll_y + self.config.header_offset_px;
        let idx = self
            .offsets
            .partition_point(|(_, top)| *top <= y)
            .saturating_sub(1);
        let (from, from_top) = *self.offsets.get(idx)?;
        let Some(&(to, to_top)) = self.offsets.get(idx + 1) else {
            return Some(SectionTransition {
                from,
                to: from,
                blend: 0.0,
            });
        };
        let span = (to_top - from_top).max(f64::EPSILON);
        Some(SectionTransition {
            from,
            to,
            blend: ((y - from_top) / span).clamp(0.0, 1.0),
        })
    }

    /// Show the bar once `NameReady` is set and hide it otherwise. Writes only on change.
    pub fn update_bar<D: AnimationDriver + ?Sized>(&mut self, session: &Session, driver: &mut D) -> bool {
        let visible = session.is_set(Topic::NameReady);
        if self.bar_visible != Some(visible) {
            let state = if visible {
                VisualState::default()
            } else {
                VisualState::hidden()
            };
            apply_state(driver, &self.config.bar_target, &state);
            self.bar_visible = Some(visible);
        }
        visible
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/nav.rs"]
mod tests;
