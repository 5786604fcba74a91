use super::*;
use crate::foundation::core::{Millis, Point, Rgba8, Size, Vec2};

const DEF: &str = r##"{
  "name": "title",
  "phases": [
    { "name": "enter", "weight": 2.0 },
    { "name": "hold", "weight": 1.0 },
    { "name": "exit", "weight": 1.0, "ease": "InQuad" }
  ],
  "lanes": [
    {
      "target": "title",
      "initial": { "opacity": 0.0, "translate": [0.0, 40.0] },
      "variants": {
        "desktop": [
          { "phase": "enter", "keys": [ { "at": 1.0, "state": { "opacity": 1.0, "translate": [0.0, 0.0] } } ] },
          { "phase": "exit", "keys": [ { "at": 1.0, "state": { "opacity": 0.0 } } ] }
        ],
        "mobile": [
          { "phase": "enter", "keys": [ { "at": 1.0, "state": { "opacity": 1.0, "translate": [0.0, 10.0] } } ] }
        ]
      }
    },
    {
      "target": "title",
      "initial": { "color": "#000000" },
      "variants": {
        "desktop": [
          { "phase": "hold", "keys": [ { "at": 1.0, "state": { "color": "#ffffff" } } ] }
        ]
      }
    },
    {
      "target": "dot",
      "initial": { "translate": { "anchor": "dot-origin" } },
      "variants": {
        "desktop": [
          { "phase": "enter", "keys": [ { "at": 1.0, "state": { "translate": { "anchor": "dot-target", "offset": [0.0, -8.0] } } } ] }
        ]
      }
    }
  ]
}"##;

fn def() -> TimelineDef {
    TimelineDef::from_json_str(DEF).unwrap()
}

fn geometry() -> GeometrySnapshot {
    GeometrySnapshot::new(Viewport::new(1440.0, 900.0), Size::new(64.0, 64.0), Millis(0))
        .with_anchor("dot-origin", Point::new(700.0, 120.0))
        .with_anchor("dot-target", Point::new(900.0, 300.0))
}

#[test]
fn evaluates_phases_and_merges_lanes() {
    let def = def();
    let g = geometry();
    let tl = TimelineBuilder::new(&def).geometry(&g).build().unwrap();
    assert_eq!(tl.lane_count(), 3);

    let start = tl.evaluate(0.0);
    let title = start.states[&TargetId::new("title")];
    assert_eq!(start.phase, "enter");
    assert_eq!(title.opacity, 0.0);
    assert_eq!(title.translate, Vec2::new(0.0, 40.0));
    assert_eq!(title.color, Some(Rgba8::rgb(0, 0, 0)));

    // halfway through "enter" ([0, 0.5))
    let mid = tl.evaluate(0.25);
    let title = mid.states[&TargetId::new("title")];
    assert!((title.opacity - 0.5).abs() < 1e-12);
    assert!((title.translate.y - 20.0).abs() < 1e-12);
    let dot = mid.states[&TargetId::new("dot")];
    assert_eq!(dot.translate, Vec2::new(800.0, 206.0));

    // "hold" only animates the color lane; the motion lane holds
    let hold = tl.evaluate(0.625);
    let title = hold.states[&TargetId::new("title")];
    assert_eq!(hold.phase, "hold");
    assert_eq!(title.opacity, 1.0);
    assert_eq!(title.color, Some(Rgba8::rgb(128, 128, 128)));

    let end = tl.terminal();
    assert_eq!(end[&TargetId::new("title")].opacity, 0.0);
    assert_eq!(end[&TargetId::new("title")].color, Some(Rgba8::rgb(255, 255, 255)));
    assert_eq!(end[&TargetId::new("dot")].translate, Vec2::new(900.0, 292.0));
}

#[test]
fn device_variant_is_selected_at_build_time() {
    let def = def();
    let g = geometry();
    let tl = TimelineBuilder::new(&def)
        .device(DeviceClass::Mobile)
        .geometry(&g)
        .build()
        .unwrap();
    let end = tl.terminal();
    // mobile has no exit phase keys, so the title stays visible
    assert_eq!(end[&TargetId::new("title")].opacity, 1.0);
    assert_eq!(end[&TargetId::new("title")].translate, Vec2::new(0.0, 10.0));
}

#[test]
fn missing_anchor_skips_only_that_lane() {
    let def = def();
    let g = GeometrySnapshot::new(Viewport::new(1440.0, 900.0), Size::new(64.0, 64.0), Millis(0))
        .with_anchor("dot-origin", Point::new(700.0, 120.0));
    let tl = TimelineBuilder::new(&def).geometry(&g).build().unwrap();
    assert_eq!(tl.skipped(), &[TargetId::new("dot")]);
    assert_eq!(tl.lane_count(), 2);
    assert!(tl.evaluate(0.3).states.contains_key(&TargetId::new("title")));

    let no_geometry = TimelineBuilder::new(&def).build().unwrap();
    assert_eq!(no_geometry.skipped().len(), 1);
}

#[test]
fn skip_to_final_jumps_to_terminal() {
    let def = def();
    let g = geometry();
    let full = TimelineBuilder::new(&def).geometry(&g).build().unwrap();
    let skip = TimelineBuilder::new(&def)
        .geometry(&g)
        .motion(MotionMode::SkipToFinal)
        .build()
        .unwrap();
    for p in [0.0, 0.2, 0.7, 1.0] {
        assert_eq!(skip.evaluate(p).states, full.terminal());
    }
    assert_eq!(skip.initial(), skip.terminal());
}

#[test]
fn skip_to_final_rests_at_the_rest_phase() {
    let mut def = def();
    def.rest_phase = Some("hold".to_string());
    let g = geometry();
    let full = TimelineBuilder::new(&def).geometry(&g).build().unwrap();
    let skip = TimelineBuilder::new(&def)
        .geometry(&g)
        .motion(MotionMode::SkipToFinal)
        .build()
        .unwrap();

    let title = skip.terminal()[&TargetId::new("title")];
    assert_eq!(title.opacity, 1.0);
    assert_eq!(title.color, Some(Rgba8::rgb(255, 255, 255)));
    assert_eq!(skip.initial(), skip.terminal());
    // full motion still exits
    assert_eq!(full.terminal()[&TargetId::new("title")].opacity, 0.0);
}

#[test]
fn unknown_rest_phase_is_rejected() {
    let mut def = def();
    def.rest_phase = Some("linger".to_string());
    let err = def.validate().unwrap_err();
    assert!(err.to_string().contains("rest phase"));
}

#[test]
fn reverse_scrub_returns_to_initial() {
    let def = def();
    let g = geometry();
    let tl = TimelineBuilder::new(&def).geometry(&g).build().unwrap();
    let initial = tl.initial();
    for p in [0.1, 0.4, 0.8, 1.0, 0.6, 0.3] {
        let _ = tl.evaluate(p);
    }
    assert_eq!(tl.evaluate(0.0).states, initial);
}

#[test]
fn unknown_phase_is_rejected() {
    let bad = DEF.replace("\"phase\": \"hold\"", "\"phase\": \"nope\"");
    let err = TimelineDef::from_json_str(&bad).unwrap_err();
    assert!(err.to_string().contains("unknown phase"));
}

#[test]
fn out_of_order_phases_are_rejected() {
    let mut def = def();
    def.lanes[0].variants.desktop.reverse();
    assert!(def.validate().is_err());
}

#[test]
fn invalid_color_is_rejected() {
    let bad = DEF.replace("#ffffff", "white");
    assert!(TimelineDef::from_json_str(&bad).is_err());
}

#[test]
fn phase_index_lookup() {
    let def = def();
    let tl = TimelineBuilder::new(&def).build().unwrap();
    assert_eq!(tl.phase_index("exit").unwrap(), 2);
    assert!(tl.phase_index("nope").is_err());
}

#[test]
fn viewport_relative_positions_use_visible_height() {
    let def = TimelineDef::from_json_str(
        r#"{
          "name": "card",
          "phases": [ { "name": "enter", "weight": 1.0 } ],
          "lanes": [ {
            "target": "card",
            "initial": { "translate": { "vw": 0.0, "vh": 1.0 } },
            "variants": { "desktop": [ { "phase": "enter", "keys": [ { "at": 1.0, "state": { "translate": [0.0, 0.0] } } ] } ] }
          } ]
        }"#,
    )
    .unwrap();
    let without = TimelineBuilder::new(&def).build().unwrap();
    assert_eq!(without.lane_count(), 0);

    let tl = TimelineBuilder::new(&def)
        .viewport(Viewport::new(390.0, 844.0).with_visual_height(700.0))
        .build()
        .unwrap();
    assert_eq!(tl.initial()[&TargetId::new("card")].translate, Vec2::new(0.0, 700.0));
}
