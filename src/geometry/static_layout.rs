use std::collections::BTreeMap;

use crate::{
    foundation::core::{Rect, Vec2, Viewport},
    geometry::{
        sampler::{FontSpec, LayoutProbe, MeasureNodeId},
        snapshot::AnchorId,
    },
};

/// Headless [`LayoutProbe`] backed by fixed element boxes in document coordinates.
///
/// Bounding boxes are reported relative to the viewport, so they move up as the page scrolls.
/// Text is measured with a fixed advance of `advance_em * font.size_px` per character, which
/// is enough for demos, the CLI and tests.
#[derive(Clone, Debug)]
pub struct StaticLayout {
    viewport: Viewport,
    scroll_y: f64,
    boxes: BTreeMap<AnchorId, Rect>,
    advance_em: f64,
    next_node: u64,
    live_nodes: BTreeMap<u64, Rect>,
    fail_measurements: bool,
}

impl StaticLayout {
    /// Empty layout for `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            scroll_y: 0.0,
            boxes: BTreeMap::new(),
            advance_em: 0.6,
            next_node: 0,
            live_nodes: BTreeMap::new(),
            fail_measurements: false,
        }
    }

    /// Builder-style element insertion.
    pub fn with_box(mut self, element: impl Into<String>, rect: Rect) -> Self {
        self.insert(element, rect);
        self
    }

    /// Mount or move an element.
    pub fn insert(&mut self, element: impl Into<String>, rect: Rect) {
        self.boxes.insert(AnchorId::new(element), rect);
    }

    /// Unmount an element.
    pub fn remove(&mut self, element: &str) {
        self.boxes.remove(&AnchorId::new(element));
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Scroll the page to `scroll_y`.
    pub fn set_scroll(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    /// Make measurement nodes report no box, as a detached subtree would.
    pub fn set_fail_measurements(&mut self, fail: bool) {
        self.fail_measurements = fail;
    }

    /// Measurement nodes that were created and not removed yet.
    pub fn live_measure_nodes(&self) -> usize {
        self.live_nodes.len()
    }
}

impl LayoutProbe for StaticLayout {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn bounding_box(&self, element: &AnchorId) -> Option<Rect> {
        self.boxes
            .get(element)
            .map(|r| *r - Vec2::new(0.0, self.scroll_y))
    }

    fn create_measure_node(&mut self, text: &str, font: &FontSpec) -> Option<MeasureNodeId> {
        let width = text.chars().count() as f64 * font.size_px * self.advance_em;
        let id = self.next_node;
        self.next_node += 1;
        self.live_nodes
            .insert(id, Rect::new(-10_000.0, 0.0, -10_000.0 + width, font.size_px));
        Some(MeasureNodeId(id))
    }

    fn measure_node_box(&self, node: MeasureNodeId) -> Option<Rect> {
        if self.fail_measurements {
            return None;
        }
        self.live_nodes.get(&node.0).copied()
    }

    fn remove_measure_node(&mut self, node: MeasureNodeId) {
        self.live_nodes.remove(&node.0);
    }
}
