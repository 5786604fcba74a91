use crate::{
    foundation::core::{Breakpoints, DeviceClass, Millis, Point, Rect, Size, Viewport},
    geometry::snapshot::{AnchorId, GeometrySnapshot},
};

/// Font used to measure unrendered text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    /// CSS font family.
    pub family: String,
    /// Font size in CSS pixels.
    pub size_px: f64,
    /// CSS font weight.
    #[serde(default = "default_weight")]
    pub weight: u16,
}

fn default_weight() -> u16 {
    400
}

/// Handle of an off-screen measurement node created by a [`LayoutProbe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeasureNodeId(pub u64);

/// Read access to the host layout, plus scratch nodes for text measurement.
///
/// Every method may come back empty: elements mount late and unmount early, and callers treat
/// that as a normal transient state.
pub trait LayoutProbe {
    /// Current viewport, including the visual viewport height when known.
    fn viewport(&self) -> Viewport;

    /// Border box of a mounted element in viewport coordinates.
    fn bounding_box(&self, element: &AnchorId) -> Option<Rect>;

    /// Insert an invisible node rendering `text` with `font`.
    fn create_measure_node(&mut self, text: &str, font: &FontSpec) -> Option<MeasureNodeId>;

    /// Box of a measurement node.
    fn measure_node_box(&self, node: MeasureNodeId) -> Option<Rect>;

    /// Remove a measurement node. Must be a no-op for unknown nodes.
    fn remove_measure_node(&mut self, node: MeasureNodeId);
}

/// Removes its measurement node when dropped, whatever the measurement returned.
struct MeasureGuard<'a, P: LayoutProbe + ?Sized> {
    probe: &'a mut P,
    node: MeasureNodeId,
}

impl<P: LayoutProbe + ?Sized> MeasureGuard<'_, P> {
    fn width(&self) -> Option<f64> {
        self.probe.measure_node_box(self.node).map(|r| r.width())
    }
}

impl<P: LayoutProbe + ?Sized> Drop for MeasureGuard<'_, P> {
    fn drop(&mut self) {
        self.probe.remove_measure_node(self.node);
    }
}

/// Width of `text` rendered off-screen with `font`.
pub fn measure_text_width<P: LayoutProbe + ?Sized>(
    probe: &mut P,
    text: &str,
    font: &FontSpec,
) -> Option<f64> {
    if text.is_empty() {
        return Some(0.0);
    }
    let node = probe.create_measure_node(text, font)?;
    let guard = MeasureGuard { probe, node };
    guard.width()
}

/// Point of an element box used as the anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxPoint {
    /// Box center.
    #[default]
    Center,
    /// Middle of the top edge.
    TopCenter,
    /// Middle of the bottom edge.
    BottomCenter,
    /// Top-left corner.
    TopLeft,
}

impl BoxPoint {
    fn resolve(self, r: Rect) -> Point {
        match self {
            Self::Center => r.center(),
            Self::TopCenter => Point::new(r.center().x, r.y0),
            Self::BottomCenter => Point::new(r.center().x, r.y1),
            Self::TopLeft => Point::new(r.x0, r.y0),
        }
    }
}

/// Where an anchor comes from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnchorSource {
    /// A point of a mounted element's box.
    Element {
        /// Element to measure.
        element: AnchorId,
        /// Which point of the box.
        #[serde(default)]
        point: BoxPoint,
    },
    /// Center of one glyph inside a text element, found by measuring the text before it.
    Glyph {
        /// Text element containing the glyph.
        element: AnchorId,
        /// Text preceding the glyph on its line.
        prefix: String,
        /// The glyph itself.
        glyph: String,
        /// Font the element renders with.
        font: FontSpec,
        /// Vertical position inside the element box, 0 = top, 1 = bottom.
        #[serde(default = "half")]
        y_ratio: f64,
    },
    /// A fixed fraction of the visible viewport.
    Viewport {
        /// Horizontal fraction of the width.
        x: f64,
        /// Vertical fraction of the visible height.
        y: f64,
    },
}

fn half() -> f64 {
    0.5
}

/// One anchor to measure.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnchorRequest {
    /// Name under which the result is stored.
    pub id: AnchorId,
    /// How to measure it.
    pub source: AnchorSource,
}

impl AnchorRequest {
    /// Center of a mounted element.
    pub fn element(id: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            id: AnchorId::new(id),
            source: AnchorSource::Element {
                element: AnchorId::new(element),
                point: BoxPoint::Center,
            },
        }
    }
}

/// Turns anchor requests into a [`GeometrySnapshot`].
#[derive(Clone, Debug)]
pub struct GeometrySampler {
    breakpoints: Breakpoints,
    mobile_glyph_scale: f64,
}

impl GeometrySampler {
    /// Sampler scaling glyph offsets by `mobile_glyph_scale` on phones.
    pub fn new(breakpoints: Breakpoints, mobile_glyph_scale: f64) -> Self {
        Self {
            breakpoints,
            mobile_glyph_scale,
        }
    }

    /// Measure every request; missing elements are left out of the snapshot.
    #[tracing::instrument(skip_all, fields(requests = requests.len()))]
    pub fn sample<P: LayoutProbe + ?Sized>(
        &self,
        probe: &mut P,
        requests: &[AnchorRequest],
        element_size: Size,
        now: Millis,
    ) -> GeometrySnapshot {
        let viewport = probe.viewport();
        let class = self.breakpoints.classify(viewport.width);
        let mut snapshot = GeometrySnapshot::new(viewport, element_size, now);

        for req in requests {
            match self.resolve(probe, &req.source, &viewport, class) {
                Some(at) => {
                    snapshot.anchors.insert(req.id.clone(), at);
                }
                None => tracing::debug!(anchor = %req.id, "anchor not available"),
            }
        }
        snapshot
    }

    fn resolve<P: LayoutProbe + ?Sized>(
        &self,
        probe: &mut P,
        source: &AnchorSource,
        viewport: &Viewport,
        class: DeviceClass,
    ) -> Option<Point> {
        match source {
            AnchorSource::Element { element, point } => {
                probe.bounding_box(element).map(|r| point.resolve(r))
            }
            AnchorSource::Glyph {
                element,
                prefix,
                glyph,
                font,
                y_ratio,
            } => {
                let host = probe.bounding_box(element)?;
                let prefix_w = measure_text_width(probe, prefix, font)?;
                let glyph_w = measure_text_width(probe, glyph, font)?;
                let scale = match class {
                    DeviceClass::Mobile => self.mobile_glyph_scale,
                    DeviceClass::Tablet | DeviceClass::Desktop => 1.0,
                };
                Some(Point::new(
                    host.x0 + (prefix_w + glyph_w / 2.0) * scale,
                    host.y0 + host.height() * y_ratio.clamp(0.0, 1.0),
                ))
            }
            AnchorSource::Viewport { x, y } => Some(Point::new(
                viewport.width * x,
                viewport.effective_height() * y,
            )),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/sampler.rs"]
mod tests;
