//! Highlighter behaviour end to end: selection -> anchor -> rects -> hit test.

use std::time::{Duration, Instant};

use canvas_highlighter_config::{ContainerPosition, HighlighterConfig};
use canvas_highlighter_engine::{
    Display, Document, DocumentBuilder, Highlighter, Layer, Path, Point, Primitive, RangeAnchor,
    RangeId, Rect, RecordingSurface, RenderSurface,
};
use pretty_assertions::assert_eq;

type TestHighlighter = Highlighter<Document, RecordingSurface<()>>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two paragraphs inside an `article` container, placed at (100, 50) in the
/// viewport. Characters are 10x20.
fn document() -> Document {
    let mut builder = DocumentBuilder::new(300.0);
    builder.element("article", Display::Block, |article| {
        article.element("p", Display::Block, |p| {
            p.text("Hello World");
        });
        article.element("p", Display::Block, |p| {
            p.element("a", Display::Inline, |a| {
                a.text("Hello");
            });
            p.text(" ");
            p.element("b", Display::Inline, |b| {
                b.text("World");
            });
        });
    });
    let mut doc = builder.build();
    doc.set_origin(Point::new(100.0, 50.0));
    doc
}

fn highlighter() -> TestHighlighter {
    init_logging();
    let doc = document();
    let root = doc.find_element("article").unwrap();
    Highlighter::new(doc, root, RecordingSurface::new(), HighlighterConfig::default())
}

fn anchor(
    highlighter: &TestHighlighter,
    start: (&str, usize),
    end: (&str, usize),
) -> RangeAnchor {
    let doc = highlighter.tree();
    let selection = doc.selection(
        doc.find_text(start.0).unwrap(),
        start.1,
        doc.find_text(end.0).unwrap(),
        end.1,
    );
    highlighter.selection_range(&selection).unwrap()
}

fn ids(ranges: &[RangeAnchor]) -> Vec<RangeId> {
    ranges.iter().map(|range| range.id.clone()).collect()
}

#[test]
fn test_hello_world_scenario() {
    let mut highlighter = highlighter();
    let anchor = anchor(&highlighter, ("Hello World", 2), ("Hello World", 6));

    assert_eq!(anchor.text, "llo ");
    assert_eq!(anchor.start.path, Path(vec![0, 0]));
    assert_eq!(anchor.start.offset, 2);
    assert_eq!(anchor.end.offset, 6);
    assert_eq!(anchor.start.text, "llo ");
    assert_eq!(anchor.end.text, "llo ");
    assert_eq!(anchor.config.rect.fill, "rgba(255, 170, 0, 0.2)");

    let id = anchor.id.clone();
    assert!(highlighter.add_range(anchor));
    assert_eq!(
        highlighter.range_positions(&id),
        Some(vec![Rect::new(20.0, 0.0, 40.0, 20.0)])
    );
    assert_eq!(highlighter.range_id_at_point(140.0, 60.0), Some(id));
    assert_eq!(highlighter.range_id_at_point(170.0, 60.0), None);
}

#[test]
fn test_collapsed_selection_is_rejected() {
    let highlighter = highlighter();
    let doc = highlighter.tree();
    let leaf = doc.find_text("Hello World").unwrap();

    assert_eq!(highlighter.selection_range(&doc.selection(leaf, 4, leaf, 4)), None);
    assert_eq!(highlighter.selection_position(&doc.selection(leaf, 4, leaf, 4)), None);
}

#[test]
fn test_selection_position_is_in_viewport_coordinates() {
    let highlighter = highlighter();
    let doc = highlighter.tree();
    let selection = doc.selection(
        doc.find_text("Hello").unwrap(),
        0,
        doc.find_text("World").unwrap(),
        2,
    );

    let position = highlighter.selection_position(&selection).unwrap();

    assert_eq!(position.start, Rect::new(100.0, 70.0, 10.0, 20.0));
    assert_eq!(position.end, Rect::new(170.0, 70.0, 10.0, 20.0));
}

#[test]
fn test_whitespace_between_elements_adds_no_rect() {
    let mut highlighter = highlighter();
    let anchor = anchor(&highlighter, ("Hello", 0), ("World", 5));
    let id = anchor.id.clone();

    assert!(highlighter.add_range(anchor));

    assert_eq!(
        highlighter.range_positions(&id),
        Some(vec![Rect::new(0.0, 20.0, 50.0, 20.0), Rect::new(50.0, 20.0, 50.0, 20.0)])
    );
    let group = highlighter.surface().group(&id).unwrap();
    assert_eq!(group.layer(Layer::Rect).count(), 2);
    assert!(group.layer(Layer::Rect).all(|primitive| match primitive {
        Primitive::Rect { rect, .. } => !rect.is_degenerate(),
        _ => false,
    }));
}

#[test]
fn test_overlapping_highlights_tie_break_by_insertion_order() {
    let mut highlighter = highlighter();
    let first = anchor(&highlighter, ("Hello World", 0), ("Hello World", 8));
    let second = anchor(&highlighter, ("Hello World", 4), ("Hello World", 11));
    let (first_id, second_id) = (first.id.clone(), second.id.clone());
    assert_ne!(first_id, second_id);
    assert!(highlighter.add_range(first));
    assert!(highlighter.add_range(second));

    // x = 55 local lies in both.
    assert_eq!(highlighter.range_id_at_point(155.0, 60.0), Some(first_id.clone()));
    assert_eq!(
        highlighter.range_ids_at_point(155.0, 60.0),
        vec![first_id.clone(), second_id.clone()]
    );
    assert_eq!(highlighter.range_ids_at_point(200.0, 60.0), vec![second_id]);
}

#[test]
fn test_add_range_rejects_unresolvable_anchor_without_side_effects() {
    let mut highlighter = highlighter();
    let mut anchor = anchor(&highlighter, ("Hello World", 0), ("Hello World", 5));
    anchor.start.path = Path(vec![9]);
    anchor.end.path = Path(vec![9]);

    assert!(!highlighter.add_range(anchor));
    assert!(highlighter.get_all_ranges().is_empty());
    assert_eq!(highlighter.surface().group_ids().count(), 0);
}

#[test]
fn test_backwards_or_empty_selections_are_never_drawn() {
    let mut highlighter = highlighter();
    let doc = highlighter.tree();
    let hello_world = doc.find_text("Hello World").unwrap();
    let hello = doc.find_text("Hello").unwrap();
    let world = doc.find_text("World").unwrap();

    assert_eq!(highlighter.selection_range(&doc.selection(world, 3, hello, 2)), None);
    assert_eq!(highlighter.selection_range(&doc.selection(hello_world, 11, hello, 0)), None);

    let mut reversed = anchor(&highlighter, ("Hello", 2), ("World", 3));
    std::mem::swap(&mut reversed.start, &mut reversed.end);
    assert!(!highlighter.add_range(reversed));
    assert!(highlighter.get_all_ranges().is_empty());
    assert_eq!(highlighter.range_id_at_point(150.0, 80.0), None);
}

#[test]
fn test_add_range_rejects_duplicate_id() {
    let mut highlighter = highlighter();
    let anchor = anchor(&highlighter, ("Hello World", 0), ("Hello World", 5));

    assert!(highlighter.add_range(anchor.clone()));
    assert!(!highlighter.add_range(anchor));
    assert_eq!(highlighter.get_all_ranges().len(), 1);
}

#[test]
fn test_get_and_delete_range() {
    let mut highlighter = highlighter();
    let anchor = anchor(&highlighter, ("Hello World", 0), ("Hello World", 5));
    let id = anchor.id.clone();
    assert!(highlighter.add_range(anchor.clone()));

    assert_eq!(highlighter.get_range(&id), Some(&anchor));
    assert!(highlighter.delete_range(&id));
    assert!(!highlighter.delete_range(&id));
    assert_eq!(highlighter.get_range(&id), None);
    assert_eq!(highlighter.range_positions(&id), None);
    assert!(!highlighter.surface().has_group(&id));
}

#[test]
fn test_update_range_redraws_with_new_config() {
    let mut highlighter = highlighter();
    let mut anchor = anchor(&highlighter, ("Hello World", 0), ("Hello World", 5));
    let id = anchor.id.clone();
    assert!(highlighter.add_range(anchor.clone()));

    anchor.config.rect.visible = false;
    anchor.end.offset = 3;
    assert!(highlighter.update_range(anchor));

    assert_eq!(
        highlighter.range_positions(&id),
        Some(vec![Rect::new(0.0, 0.0, 30.0, 20.0)])
    );
    let group = highlighter.surface().group(&id).unwrap();
    assert!(!group.visibility.rect);
    assert!(group.visibility.line);
}

#[test]
fn test_failed_update_leaves_highlight_absent() {
    let mut highlighter = highlighter();
    let mut anchor = anchor(&highlighter, ("Hello World", 0), ("Hello World", 5));
    let id = anchor.id.clone();
    assert!(highlighter.add_range(anchor.clone()));

    anchor.start.path = Path(vec![4, 4]);
    assert!(!highlighter.update_range(anchor));

    assert_eq!(highlighter.get_range(&id), None);
    assert_eq!(highlighter.range_id_at_point(110.0, 60.0), None);
}

#[test]
fn test_clear_is_idempotent() {
    let mut highlighter = highlighter();
    let anchor = anchor(&highlighter, ("Hello World", 0), ("Hello World", 5));
    assert!(highlighter.add_range(anchor));
    assert!(highlighter.range_id_at_point(110.0, 60.0).is_some());

    highlighter.clear();
    highlighter.clear();

    assert!(highlighter.get_all_ranges().is_empty());
    assert_eq!(highlighter.range_id_at_point(110.0, 60.0), None);
    assert!(highlighter.range_ids_at_point(110.0, 60.0).is_empty());
}

#[test]
fn test_render_ranges_replaces_everything() {
    let mut highlighter = highlighter();
    let a = anchor(&highlighter, ("Hello World", 0), ("Hello World", 5));
    let b = anchor(&highlighter, ("Hello", 0), ("World", 5));
    let c = anchor(&highlighter, ("World", 1), ("World", 4));
    assert!(highlighter.add_range(b.clone()));
    assert!(highlighter.add_range(c.clone()));

    let drawn = highlighter.render_ranges(vec![a.clone(), b.clone()]);

    assert_eq!(drawn, 2);
    assert_eq!(ids(&highlighter.get_all_ranges()), ids(&[a, b]));
    assert_eq!(highlighter.range_positions(&c.id), None);
    assert_eq!(highlighter.surface().group_ids().count(), 2);
}

#[test]
fn test_surface_is_mounted_with_config() {
    init_logging();
    let doc = document();
    let root = doc.find_element("article").unwrap();
    let config = HighlighterConfig {
        position: ContainerPosition::Absolute,
        pixel_ratio: Some(2.0),
        ..Default::default()
    };

    let highlighter: TestHighlighter =
        Highlighter::new(doc, root, RecordingSurface::new(), config);

    let surface = highlighter.surface();
    assert_eq!(surface.position, Some(ContainerPosition::Absolute));
    assert_eq!(surface.pixel_ratio, Some(2.0));
    assert_eq!(surface.size, (300.0, 40.0));
}

#[test]
fn test_scroll_keeps_local_rects_and_moves_hits() {
    let mut highlighter = highlighter();
    let anchor = anchor(&highlighter, ("Hello World", 0), ("Hello World", 5));
    let id = anchor.id.clone();
    assert!(highlighter.add_range(anchor));

    highlighter.tree_mut().scroll_to(0.0, 30.0);

    // Hit testing reads the live container box, before any refresh.
    assert_eq!(highlighter.range_id_at_point(110.0, 30.0), Some(id.clone()));
    assert_eq!(highlighter.range_id_at_point(110.0, 60.0), None);

    highlighter.refresh_geometry();
    assert_eq!(
        highlighter.range_positions(&id),
        Some(vec![Rect::new(0.0, 0.0, 50.0, 20.0)])
    );
}

#[test]
fn test_debounced_resize_reflows_once() {
    let mut highlighter = highlighter();
    let anchor = anchor(&highlighter, ("Hello World", 0), ("Hello World", 11));
    let id = anchor.id.clone();
    assert!(highlighter.add_range(anchor));
    assert_eq!(highlighter.range_positions(&id).unwrap().len(), 1);

    let start = Instant::now();
    highlighter.tree_mut().set_width(60.0);
    highlighter.notify_resize(start);
    highlighter.notify_scroll(start + Duration::from_millis(100));
    highlighter.notify_resize(start + Duration::from_millis(100));

    assert!(!highlighter.poll(start + Duration::from_millis(350)));
    assert_eq!(highlighter.range_positions(&id).unwrap().len(), 1);
    assert_eq!(
        highlighter.next_deadline(),
        Some(start + Duration::from_millis(400))
    );

    assert!(highlighter.poll(start + Duration::from_millis(400)));
    assert_eq!(
        highlighter.range_positions(&id),
        Some(vec![
            Rect::new(0.0, 0.0, 60.0, 20.0),
            Rect::new(0.0, 20.0, 50.0, 20.0),
        ])
    );
    assert_eq!(highlighter.surface().size, (60.0, 80.0));
    assert!(!highlighter.poll(start + Duration::from_secs(10)));
    assert_eq!(highlighter.next_deadline(), None);
}

#[test]
fn test_separate_bursts_refresh_separately() {
    let mut highlighter = highlighter();
    let start = Instant::now();
    highlighter.notify_scroll(start);
    highlighter.notify_resize(start + Duration::from_millis(200));

    assert!(highlighter.poll(start + Duration::from_millis(300)));
    assert!(!highlighter.poll(start + Duration::from_millis(450)));
    assert!(highlighter.poll(start + Duration::from_millis(500)));
}

#[test]
fn test_refresh_drops_ranges_that_stop_resolving() {
    let mut highlighter = highlighter();
    let keep = anchor(&highlighter, ("Hello World", 0), ("Hello World", 5));
    let lose = anchor(&highlighter, ("World", 0), ("World", 5));
    assert!(highlighter.add_range(keep.clone()));
    assert!(highlighter.add_range(lose.clone()));

    let bold = highlighter.tree().find_element("b").unwrap();
    highlighter.tree_mut().remove_subtree(bold);
    highlighter.refresh_geometry();

    assert_eq!(ids(&highlighter.get_all_ranges()), vec![keep.id]);
    assert_eq!(highlighter.range_positions(&lose.id), None);
}

#[test]
fn test_anchor_survives_serialization_and_reload() {
    let mut highlighter = highlighter();
    let anchor = anchor(&highlighter, ("Hello", 2), ("World", 2));
    let stored = serde_json::to_string(&anchor).unwrap();

    let mut restored_highlighter = self::highlighter();
    let restored: RangeAnchor = serde_json::from_str(&stored).unwrap();
    assert!(restored_highlighter.add_range(restored));
    assert!(highlighter.add_range(anchor.clone()));

    assert_eq!(
        restored_highlighter.range_positions(&anchor.id),
        highlighter.range_positions(&anchor.id)
    );
}

#[test]
fn test_custom_shapes_are_drawn_per_rect() {
    init_logging();
    let doc = document();
    let root = doc.find_element("article").unwrap();
    let mut highlighter: Highlighter<Document, RecordingSurface<(usize, f32)>> =
        Highlighter::new(doc, root, RecordingSurface::new(), HighlighterConfig::default())
            .with_shape_constructor(Box::new(
                |_rect: &Rect, _id: &RangeId, raw: &[Rect], index: usize| (index, raw[index].x),
            ));
    let doc = highlighter.tree();
    let selection = doc.selection(
        doc.find_text("Hello").unwrap(),
        1,
        doc.find_text("World").unwrap(),
        3,
    );
    let anchor = highlighter.selection_range(&selection).unwrap();
    let id = anchor.id.clone();

    assert!(highlighter.add_range(anchor));

    let group = highlighter.surface().group(&id).unwrap();
    let shapes: Vec<_> = group.layer(Layer::Custom).collect();
    assert_eq!(
        shapes,
        vec![&Primitive::Custom((0, 110.0)), &Primitive::Custom((1, 150.0))]
    );
}
