use super::*;
use crate::geometry::static_layout::StaticLayout;

fn font() -> FontSpec {
    FontSpec {
        family: "Inter".to_string(),
        size_px: 100.0,
        weight: 700,
    }
}

fn glyph_request() -> AnchorRequest {
    AnchorRequest {
        id: AnchorId::new("dot-origin"),
        source: AnchorSource::Glyph {
            element: AnchorId::new("hero-name"),
            prefix: "Mar".to_string(),
            glyph: "i".to_string(),
            font: font(),
            y_ratio: 0.0,
        },
    }
}

#[test]
fn element_anchors_use_box_points() {
    let mut probe = StaticLayout::new(Viewport::new(1440.0, 900.0))
        .with_box("card", Rect::new(100.0, 200.0, 300.0, 400.0));
    let sampler = GeometrySampler::new(Breakpoints::default(), 0.8);
    let snap = sampler.sample(
        &mut probe,
        &[AnchorRequest::element("card-center", "card")],
        Size::new(10.0, 10.0),
        Millis(5),
    );
    assert_eq!(snap.anchor_named("card-center"), Some(Point::new(200.0, 300.0)));
    assert_eq!(snap.computed_at, Millis(5));
}

#[test]
fn glyph_anchor_measures_prefix_and_glyph() {
    let mut probe = StaticLayout::new(Viewport::new(1440.0, 900.0))
        .with_box("hero-name", Rect::new(400.0, 100.0, 1000.0, 220.0));
    let sampler = GeometrySampler::new(Breakpoints::default(), 0.8);
    let snap = sampler.sample(&mut probe, &[glyph_request()], Size::new(64.0, 64.0), Millis(0));
    // prefix 3 chars * 60px = 180, glyph 60px -> center at +210
    assert_eq!(snap.anchor_named("dot-origin"), Some(Point::new(610.0, 100.0)));
    assert_eq!(probe.live_measure_nodes(), 0);
}

#[test]
fn mobile_scales_glyph_offsets() {
    let mut probe = StaticLayout::new(Viewport::new(390.0, 844.0))
        .with_box("hero-name", Rect::new(20.0, 100.0, 370.0, 160.0));
    let sampler = GeometrySampler::new(Breakpoints::default(), 0.5);
    let snap = sampler.sample(&mut probe, &[glyph_request()], Size::new(24.0, 24.0), Millis(0));
    assert_eq!(snap.anchor_named("dot-origin"), Some(Point::new(125.0, 100.0)));
}

#[test]
fn missing_elements_are_skipped() {
    let mut probe = StaticLayout::new(Viewport::new(1440.0, 900.0));
    let sampler = GeometrySampler::new(Breakpoints::default(), 1.0);
    let snap = sampler.sample(
        &mut probe,
        &[glyph_request(), AnchorRequest::element("a", "nope")],
        Size::new(1.0, 1.0),
        Millis(0),
    );
    assert!(snap.anchors.is_empty());
}

#[test]
fn failed_measurement_leaves_no_residue() {
    let mut probe = StaticLayout::new(Viewport::new(1440.0, 900.0))
        .with_box("hero-name", Rect::new(400.0, 100.0, 1000.0, 220.0));
    probe.set_fail_measurements(true);
    let sampler = GeometrySampler::new(Breakpoints::default(), 1.0);
    let snap = sampler.sample(&mut probe, &[glyph_request()], Size::new(1.0, 1.0), Millis(0));
    assert!(snap.anchor_named("dot-origin").is_none());
    assert_eq!(probe.live_measure_nodes(), 0);
}

#[test]
fn viewport_anchors_use_visual_height() {
    let mut probe = StaticLayout::new(Viewport::new(400.0, 800.0).with_visual_height(700.0));
    let sampler = GeometrySampler::new(Breakpoints::default(), 1.0);
    let snap = sampler.sample(
        &mut probe,
        &[AnchorRequest {
            id: AnchorId::new("bottom"),
            source: AnchorSource::Viewport { x: 0.5, y: 1.0 },
        }],
        Size::new(1.0, 1.0),
        Millis(0),
    );
    assert_eq!(snap.anchor_named("bottom"), Some(Point::new(200.0, 700.0)));
}

#[test]
fn anchor_source_json_is_tagged() {
    let req: AnchorRequest = serde_json::from_str(
        r#"{"id":"card","source":{"kind":"element","element":"card-1","point":"top_center"}}"#,
    )
    .unwrap();
    assert_eq!(
        req.source,
        AnchorSource::Element {
            element: AnchorId::new("card-1"),
            point: BoxPoint::TopCenter
        }
    );
}
