//! Layout Integration Tests
//!
//! Exercises the layout engines together the way a generation request uses
//! them:
//! - Placeholder below the selection, clear of existing content
//! - Result shapes linked back to their sources
//! - Arrow creation is all-or-nothing
//! - Snapshots survive a JSON round trip

use genai_canvas_core::{
    connect, contextual_actions, place_new_shape, remove_placeholder, show_placeholder, Asset,
    CanvasError, ConnectOptions, ContextAction, Document, SelectionSummary, Shape, ShapeId,
    ShapeKind, SharedDocument, VIDEO_HEIGHT, VIDEO_WIDTH,
};
use proptest::prelude::*;

/// Count arrow shapes in the document.
fn arrow_count(doc: &Document) -> usize {
    doc.shapes()
        .filter(|s| matches!(s.kind, ShapeKind::Arrow(_)))
        .count()
}

/// Add a text shape and select it.
fn selected_text(doc: &mut Document, content: &str, x: f64, y: f64) -> ShapeId {
    let id = doc
        .create_shape(Shape::text(content).with_position(x, y))
        .expect("text");
    doc.select(&[id]).expect("select");
    id
}

#[test]
fn test_generation_layout_round() {
    let mut doc = Document::default();
    let text = selected_text(&mut doc, "a cat", 0.0, 0.0);
    assert_eq!(
        contextual_actions(SelectionSummary::of(&doc)),
        vec![
            ContextAction::GenerateImage { from_image: false },
            ContextAction::GenerateVideo
        ]
    );

    let placeholder = show_placeholder(&mut doc, "Generating image...").expect("placeholder");
    let slot = doc.page_bounds(placeholder.group).expect("slot");
    remove_placeholder(&mut doc, &placeholder);

    let mut results = Vec::new();
    for i in 0..3_u32 {
        let offset = f64::from(i) * 30.0;
        let asset = doc
            .create_asset(Asset::image(
                format!("sample_{i}.jpg"),
                "data:image/jpeg;base64,AQID",
                "image/jpeg",
            ))
            .expect("asset");
        let id = doc
            .create_shape(
                Shape::image(asset)
                    .with_position(slot.x + offset, slot.y + offset)
                    .with_size(slot.w, slot.h),
            )
            .expect("image");
        connect(&mut doc, text, id, ConnectOptions::default())
            .expect("connect")
            .expect("arrow");
        results.push(id);
    }

    assert_eq!(arrow_count(&doc), 3);
    assert_eq!(doc.bindings_to(text).len(), 3);
    assert_eq!(doc.asset_count(), 3);
    for id in placeholder.ids() {
        assert!(!doc.contains_shape(id));
    }

    let last = results[2];
    let bounds = doc.page_bounds(last).expect("bounds");
    assert!((bounds.w - VIDEO_WIDTH).abs() < f64::EPSILON);
    assert!((bounds.h - VIDEO_HEIGHT).abs() < f64::EPSILON);
}

#[test]
fn test_placement_scenario_from_two_siblings() {
    let mut doc = Document::default();
    doc.create_shape(Shape::geo(100.0, 40.0).with_position(0.0, 0.0))
        .expect("first");
    doc.create_shape(Shape::geo(100.0, 40.0).with_position(150.0, 0.0))
        .expect("second");
    let new = doc
        .create_shape(Shape::geo(80.0, 40.0).with_position(20.0, 0.0))
        .expect("new");

    place_new_shape(&mut doc, new);

    let shape = doc.get_shape(new).expect("shape");
    assert!((shape.x - 300.0).abs() < f64::EPSILON);
    assert!(shape.y.abs() < f64::EPSILON);
}

#[test]
fn test_snapshot_survives_json() {
    let shared = SharedDocument::default();
    let (text, arrow) = shared
        .update(|doc| {
            let text = selected_text(doc, "a cat", 0.0, 0.0);
            let other = doc.create_shape(Shape::text("a dog").with_position(0.0, 200.0))?;
            let arrow = connect(doc, text, other, ConnectOptions::default())?;
            Ok::<_, CanvasError>((text, arrow))
        })
        .expect("build");
    let arrow = arrow.expect("arrow");

    let json = shared.to_json().expect("json");
    let restored = Document::from_json(&json).expect("restore");

    assert_eq!(restored.shape_count(), 3);
    assert_eq!(restored.selected_ids(), &[text]);
    assert_eq!(restored.bindings_from_arrow(arrow).len(), 2);
}

proptest! {
    #[test]
    fn prop_connect_is_all_or_nothing(
        start_exists in any::<bool>(),
        end_exists in any::<bool>(),
        x in -500i32..500,
        y in -500i32..500,
    ) {
        let mut doc = Document::default();
        let a = doc.create_shape(Shape::geo(50.0, 50.0)).expect("a");
        let b = doc
            .create_shape(Shape::geo(50.0, 50.0).with_position(f64::from(x), f64::from(y)))
            .expect("b");
        let start = if start_exists { a } else { ShapeId::new() };
        let end = if end_exists { b } else { ShapeId::new() };

        let arrow = connect(&mut doc, start, end, ConnectOptions::default()).expect("connect");

        let bindings = doc.bindings().count();
        match arrow {
            Some(id) => {
                prop_assert!(start_exists && end_exists);
                prop_assert_eq!(arrow_count(&doc), 1);
                prop_assert_eq!(bindings, 2);
                prop_assert_eq!(doc.bindings_from_arrow(id).len(), 2);
            }
            None => {
                prop_assert!(!(start_exists && end_exists));
                prop_assert_eq!(arrow_count(&doc), 0);
                prop_assert_eq!(bindings, 0);
            }
        }
    }
}
