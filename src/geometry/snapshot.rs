use std::collections::BTreeMap;

use crate::foundation::core::{Breakpoints, DeviceClass, Millis, Point, Size, Viewport};

/// Identifier of a measurable anchor (an element or a glyph inside one).
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct AnchorId(pub String);

impl AnchorId {
    /// Build from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnchorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-device-class tolerance for viewport changes before geometry is considered stale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResizeTolerance {
    /// Allowed delta on phones, where browser chrome resizes the viewport constantly.
    pub mobile_px: f64,
    /// Allowed delta on tablets and desktops.
    pub desktop_px: f64,
}

impl Default for ResizeTolerance {
    fn default() -> Self {
        Self {
            mobile_px: 100.0,
            desktop_px: 50.0,
        }
    }
}

impl ResizeTolerance {
    /// Tolerance for one device class.
    pub fn for_class(&self, class: DeviceClass) -> f64 {
        match class {
            DeviceClass::Mobile => self.mobile_px,
            DeviceClass::Tablet | DeviceClass::Desktop => self.desktop_px,
        }
    }

    /// Return `true` when `next` is close enough to `prev` to keep geometry measured at `prev`.
    pub fn within(&self, breakpoints: &Breakpoints, prev: &Viewport, next: &Viewport) -> bool {
        let class = breakpoints.classify(prev.width);
        if class != breakpoints.classify(next.width) {
            return false;
        }
        let tol = self.for_class(class);
        (prev.width - next.width).abs() <= tol && (prev.height - next.height).abs() <= tol
    }
}

/// Measured anchor positions, valid only for the viewport they were captured in.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeometrySnapshot {
    /// Anchor centers in viewport coordinates.
    pub anchors: BTreeMap<AnchorId, Point>,
    /// Size of the animated element.
    pub element_size: Size,
    /// Viewport at capture time.
    pub viewport: Viewport,
    /// Capture time.
    pub computed_at: Millis,
    /// Scroll offset at capture time; adding it turns anchors into document coordinates.
    #[serde(default)]
    pub scroll_y: f64,
}

impl GeometrySnapshot {
    /// Empty snapshot for `viewport`.
    pub fn new(viewport: Viewport, element_size: Size, computed_at: Millis) -> Self {
        Self {
            anchors: BTreeMap::new(),
            element_size,
            viewport,
            computed_at,
            scroll_y: 0.0,
        }
    }

    /// Record the scroll offset the anchors were measured at.
    pub fn at_scroll(mut self, scroll_y: f64) -> Self {
        self.scroll_y = scroll_y;
        self
    }

    /// Builder-style anchor insertion.
    pub fn with_anchor(mut self, id: impl Into<String>, at: Point) -> Self {
        self.anchors.insert(AnchorId::new(id), at);
        self
    }

    /// Position of one anchor.
    pub fn anchor(&self, id: &AnchorId) -> Option<Point> {
        self.anchors.get(id).copied()
    }

    /// Position of one anchor in document coordinates, independent of the current scroll.
    pub fn document_anchor(&self, id: &AnchorId) -> Option<Point> {
        self.anchor(id).map(|p| Point::new(p.x, p.y + self.scroll_y))
    }

    /// Position of one anchor by raw name.
    pub fn anchor_named(&self, id: &str) -> Option<Point> {
        self.anchors.get(&AnchorId::new(id)).copied()
    }

    /// Return `true` when every id is present.
    pub fn has_all<'a>(&self, ids: impl IntoIterator<Item = &'a AnchorId>) -> bool {
        ids.into_iter().all(|id| self.anchors.contains_key(id))
    }

    /// Return `true` when this snapshot can be used for `viewport`.
    pub fn is_valid_for(
        &self,
        viewport: &Viewport,
        breakpoints: &Breakpoints,
        tolerance: &ResizeTolerance,
    ) -> bool {
        tolerance.within(breakpoints, &self.viewport, viewport)
    }
}
