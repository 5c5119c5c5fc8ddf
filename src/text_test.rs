#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::collections::HashMap;

use uuid::Uuid;

use super::*;

const MEASURER: FixedAdvanceMeasurer = FixedAdvanceMeasurer { ratio: 0.5 };
const FONT: Font = Font { size: 20.0, family: 1 };
const SLOGAN: &str = "Online whiteboard collaboration made easy";

fn layout() -> TextLayout<'static> {
    TextLayout::new(&MEASURER)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn text_of(scene: &Scene, id: ElementId) -> TextData {
    scene.get(&id).and_then(Element::text_data).cloned().unwrap()
}

/// Scene with a free text (bottom) and a 90x75 rectangle above it.
fn slogan_scene() -> (Scene, ElementId, ElementId) {
    let text = Element::text(0.0, 0.0, SLOGAN);
    let rect = Element::rectangle(0.0, 0.0, 90.0, 75.0);
    let (text_id, rect_id) = (text.id, rect.id);
    (Scene::from_elements(vec![text, rect]), text_id, rect_id)
}

// =============================================================================
// Measurement
// =============================================================================

#[test]
fn fixed_advance_is_half_the_font_size() {
    assert_eq!(MEASURER.line_width("abcd", FONT), 40.0);
    assert_eq!(MEASURER.line_width("", FONT), 0.0);
}

#[test]
fn measure_counts_empty_lines() {
    let m = measure_text(&MEASURER, "ab\n\ncde", FONT, 1.25);
    assert_eq!(m.width, 30.0);
    assert_eq!(m.height, 75.0);
}

#[test]
fn normalize_text_unifies_line_endings() {
    assert_eq!(normalize_text("a\r\nb\rc\td"), "a\nb\nc        d");
}

#[test]
fn min_container_height_fits_one_line() {
    assert_eq!(min_container_height(&TextData::default(), 5.0), 35.0);
}

// =============================================================================
// Wrapping
// =============================================================================

#[test]
fn wrap_breaks_long_words_by_characters() {
    assert_eq!(wrap_text(&MEASURER, SLOGAN, FONT, 80.0), "Online\nwhiteboa\nrd\ncollabor\nation\nmade\neasy");
}

#[test]
fn wrap_keeps_lines_that_fit() {
    assert_eq!(wrap_text(&MEASURER, "short\nlines", FONT, 200.0), "short\nlines");
}

#[test]
fn wrap_breaks_after_hyphens() {
    assert_eq!(wrap_text(&MEASURER, "foo-bar", FONT, 40.0), "foo-\nbar");
}

#[test]
fn wrap_trims_trailing_whitespace() {
    assert_eq!(wrap_text(&MEASURER, "aaa bbb", FONT, 40.0), "aaa\nbbb");
}

#[test]
fn wrap_splits_one_long_word() {
    assert_eq!(wrap_text(&MEASURER, "abcdefghij", FONT, 30.0), "abc\ndef\nghi\nj");
}

#[test]
fn wrap_with_invalid_width_returns_input() {
    assert_eq!(wrap_text(&MEASURER, SLOGAN, FONT, -1.0), SLOGAN);
    assert_eq!(wrap_text(&MEASURER, SLOGAN, FONT, f64::NAN), SLOGAN);
    assert_eq!(wrap_text(&MEASURER, SLOGAN, FONT, f64::INFINITY), SLOGAN);
}

// =============================================================================
// Container geometry
// =============================================================================

#[test]
fn max_width_by_container_kind() {
    assert_eq!(bound_text_max_width(&Element::rectangle(0.0, 0.0, 90.0, 10.0), None, 5.0), 80.0);
    assert_eq!(bound_text_max_width(&Element::ellipse(0.0, 0.0, 100.0, 10.0), None, 5.0), 61.0);
    assert_eq!(bound_text_max_width(&Element::diamond(0.0, 0.0, 100.0, 10.0), None, 5.0), 40.0);
    let arrow = Element::arrow(0.0, 0.0, vec![Point::origin(), Point::new(100.0, 0.0)]);
    assert_eq!(bound_text_max_width(&arrow, None, 5.0), 220.0);
}

#[test]
fn max_height_by_container_kind() {
    assert_eq!(bound_text_max_height(&Element::rectangle(0.0, 0.0, 10.0, 75.0), 0.0, 5.0), 65.0);
    assert_eq!(bound_text_max_height(&Element::diamond(0.0, 0.0, 10.0, 100.0), 0.0, 5.0), 40.0);
    let flat = Element::arrow(0.0, 0.0, vec![Point::origin(), Point::new(100.0, 50.0)]);
    assert_eq!(bound_text_max_height(&flat, 25.0, 5.0), 25.0);
    let tall = Element::arrow(0.0, 0.0, vec![Point::origin(), Point::new(100.0, 100.0)]);
    assert_eq!(bound_text_max_height(&tall, 25.0, 5.0), 100.0);
}

#[test]
fn container_dimension_adds_padding() {
    assert_eq!(container_dimension_for_bound_text(175.0, ElementKind::Rectangle, 5.0), 185.0);
    assert_eq!(container_dimension_for_bound_text(174.2, ElementKind::Rectangle, 5.0), 185.0);
    assert_eq!(container_dimension_for_bound_text(10.0, ElementKind::Diamond, 5.0), 40.0);
    assert_eq!(container_dimension_for_bound_text(20.0, ElementKind::Ellipse, 5.0), 42.0);
    assert_eq!(container_dimension_for_bound_text(20.0, ElementKind::Arrow, 5.0), 100.0);
}

#[test]
fn container_coords_inset_by_shape() {
    assert_eq!(container_coords(&Element::rectangle(10.0, 20.0, 50.0, 50.0), 5.0), Point::new(15.0, 25.0));
    assert_eq!(container_coords(&Element::diamond(0.0, 0.0, 100.0, 100.0), 5.0), Point::new(30.0, 30.0));
    let p = container_coords(&Element::ellipse(0.0, 0.0, 100.0, 100.0), 5.0);
    assert!(approx(p.x, 5.0 + 50.0 * (1.0 - SQRT_2 / 2.0)));
    assert!(approx(p.y, p.x));
}

#[test]
fn label_position_follows_alignment() {
    let rect = Element::rectangle(0.0, 0.0, 100.0, 100.0);
    let mut text = Element::text(0.0, 0.0, "x");
    text.width = 40.0;
    text.height = 25.0;
    let data = text.text_data_mut().unwrap();
    data.text_align = TextAlign::Center;
    data.vertical_align = VerticalAlign::Middle;
    assert_eq!(compute_bound_text_position(&rect, &text, 5.0), Point::new(30.0, 37.5));

    let data = text.text_data_mut().unwrap();
    data.text_align = TextAlign::Right;
    data.vertical_align = VerticalAlign::Bottom;
    assert_eq!(compute_bound_text_position(&rect, &text, 5.0), Point::new(55.0, 70.0));

    let data = text.text_data_mut().unwrap();
    data.text_align = TextAlign::Left;
    data.vertical_align = VerticalAlign::Top;
    assert_eq!(compute_bound_text_position(&rect, &text, 5.0), Point::new(5.0, 5.0));
}

#[test]
fn arrow_label_sits_on_the_middle_segment() {
    let arrow = Element::arrow(0.0, 0.0, vec![Point::origin(), Point::new(100.0, 0.0)]);
    let mut text = Element::text(0.0, 0.0, "x");
    text.width = 20.0;
    text.height = 10.0;
    assert_eq!(get_bound_text_element_position(&arrow, &text), Some(Point::new(40.0, -5.0)));
}

#[test]
fn arrow_label_sits_on_the_middle_point() {
    let arrow =
        Element::arrow(0.0, 0.0, vec![Point::origin(), Point::new(50.0, 50.0), Point::new(100.0, 0.0)]);
    let mut text = Element::text(0.0, 0.0, "x");
    text.width = 20.0;
    text.height = 10.0;
    assert_eq!(get_bound_text_element_position(&arrow, &text), Some(Point::new(40.0, 45.0)));
}

// =============================================================================
// Bind / unbind
// =============================================================================

#[test]
fn bind_wraps_grows_and_unbind_restores() {
    let (mut scene, text_id, rect_id) = slogan_scene();
    let mut cache = ContainerCache::new();

    assert!(bind_text_to_container(&mut scene, &mut cache, layout(), text_id, rect_id).unwrap());

    let data = text_of(&scene, text_id);
    assert_eq!(data.text, "Online\nwhiteboa\nrd\ncollabor\nation\nmade\neasy");
    assert_eq!(data.container_id, Some(rect_id));
    assert_eq!(data.text_align, TextAlign::Center);
    assert_eq!(data.vertical_align, VerticalAlign::Middle);
    let rect = scene.get(&rect_id).unwrap();
    assert_eq!(rect.height, 185.0);
    assert_eq!(rect.bound_text_id(), Some(text_id));
    assert_eq!(cache.get(&rect_id), Some(75.0));
    let text = scene.get(&text_id).unwrap();
    assert_eq!((text.x, text.y, text.width, text.height), (5.0, 5.0, 80.0, 175.0));
    assert_eq!(scene.index_of(&text_id), Some(1));
    assert_eq!(scene.index_of(&rect_id), Some(0));

    assert_eq!(unbind_text(&mut scene, &mut cache, layout(), rect_id), Some(text_id));
    let rect = scene.get(&rect_id).unwrap();
    assert_eq!(rect.height, 75.0);
    assert!(rect.bound_elements.is_empty());
    assert_eq!(cache.get(&rect_id), None);
    let data = text_of(&scene, text_id);
    assert_eq!(data.container_id, None);
    assert_eq!(data.text, SLOGAN);
    assert_eq!(scene.get(&text_id).unwrap().width, 410.0);
}

#[test]
fn bind_rejects_non_containers_and_non_text() {
    let (mut scene, text_id, rect_id) = slogan_scene();
    let frame = Element::frame(0.0, 0.0, 100.0, 100.0);
    let frame_id = frame.id;
    scene.insert(frame);
    let mut cache = ContainerCache::new();

    let err = bind_text_to_container(&mut scene, &mut cache, layout(), text_id, frame_id).unwrap_err();
    assert!(matches!(err, SceneError::NotTextContainer(id) if id == frame_id));
    let err = bind_text_to_container(&mut scene, &mut cache, layout(), rect_id, rect_id).unwrap_err();
    assert!(matches!(err, SceneError::NotText(id) if id == rect_id));
    let missing = Uuid::new_v4();
    let err = bind_text_to_container(&mut scene, &mut cache, layout(), missing, rect_id).unwrap_err();
    assert!(matches!(err, SceneError::NotFound(id) if id == missing));
}

#[test]
fn bind_into_labelled_container_is_refused() {
    let (mut scene, text_id, rect_id) = slogan_scene();
    let other = Element::text(0.0, 0.0, "second");
    let other_id = other.id;
    scene.insert(other);
    let mut cache = ContainerCache::new();
    assert!(bind_text_to_container(&mut scene, &mut cache, layout(), text_id, rect_id).unwrap());
    assert!(!bind_text_to_container(&mut scene, &mut cache, layout(), other_id, rect_id).unwrap());
    assert_eq!(text_of(&scene, other_id).container_id, None);
}

#[test]
fn unbind_without_label_is_none() {
    let (mut scene, _, rect_id) = slogan_scene();
    let mut cache = ContainerCache::new();
    assert_eq!(unbind_text(&mut scene, &mut cache, layout(), rect_id), None);
}

// =============================================================================
// Resize
// =============================================================================

#[test]
fn widening_the_container_rewraps_and_resets_cache() {
    let (mut scene, text_id, rect_id) = slogan_scene();
    let mut cache = ContainerCache::new();
    bind_text_to_container(&mut scene, &mut cache, layout(), text_id, rect_id).unwrap();

    scene.mutate(&rect_id, &ElementUpdate { width: Some(200.0), ..ElementUpdate::default() });
    handle_bind_text_resize(&mut scene, &mut cache, layout(), rect_id, Some(ResizeHandle::E));

    assert_eq!(cache.get(&rect_id), None);
    assert_eq!(text_of(&scene, text_id).text, "Online whiteboard\ncollaboration made\neasy");
    let text = scene.get(&text_id).unwrap();
    assert_eq!((text.width, text.height), (180.0, 75.0));
    assert_eq!((text.x, text.y), (10.0, 55.0));
    assert_eq!(scene.get(&rect_id).unwrap().height, 185.0);
}

#[test]
fn vertical_handles_keep_the_wrapping() {
    let (mut scene, text_id, rect_id) = slogan_scene();
    let mut cache = ContainerCache::new();
    bind_text_to_container(&mut scene, &mut cache, layout(), text_id, rect_id).unwrap();
    let before = text_of(&scene, text_id).text;

    scene.mutate(&rect_id, &ElementUpdate { width: Some(300.0), height: Some(300.0), ..ElementUpdate::default() });
    handle_bind_text_resize(&mut scene, &mut cache, layout(), rect_id, Some(ResizeHandle::S));
    assert_eq!(text_of(&scene, text_id).text, before);
}

#[test]
fn shrinking_from_the_top_grows_upward() {
    let (mut scene, text_id, rect_id) = slogan_scene();
    let mut cache = ContainerCache::new();
    bind_text_to_container(&mut scene, &mut cache, layout(), text_id, rect_id).unwrap();

    scene.mutate(&rect_id, &ElementUpdate { y: Some(100.0), height: Some(85.0), ..ElementUpdate::default() });
    handle_bind_text_resize(&mut scene, &mut cache, layout(), rect_id, Some(ResizeHandle::Nw));
    let rect = scene.get(&rect_id).unwrap();
    assert_eq!(rect.height, 185.0);
    assert_eq!(rect.y, 0.0);
}

#[test]
fn resizing_back_restores_the_original_text() {
    let (mut scene, text_id, rect_id) = slogan_scene();
    let mut cache = ContainerCache::new();
    bind_text_to_container(&mut scene, &mut cache, layout(), text_id, rect_id).unwrap();

    scene.mutate(&rect_id, &ElementUpdate { width: Some(500.0), ..ElementUpdate::default() });
    handle_bind_text_resize(&mut scene, &mut cache, layout(), rect_id, None);
    let data = text_of(&scene, text_id);
    assert_eq!(data.text, data.original_text);
    assert_eq!(data.text, SLOGAN);
}

// =============================================================================
// Editing
// =============================================================================

fn labelled_box() -> (Scene, ContainerCache, ElementId, ElementId) {
    let text = Element::text(0.0, 0.0, "hi");
    let rect = Element::rectangle(0.0, 0.0, 100.0, 50.0);
    let (text_id, rect_id) = (text.id, rect.id);
    let mut scene = Scene::from_elements(vec![rect, text]);
    let mut cache = ContainerCache::new();
    bind_text_to_container(&mut scene, &mut cache, layout(), text_id, rect_id).unwrap();
    (scene, cache, text_id, rect_id)
}

#[test]
fn editing_grows_then_shrinks_back_to_the_original_height() {
    let (mut scene, mut cache, text_id, rect_id) = labelled_box();
    assert_eq!(scene.get(&rect_id).unwrap().height, 50.0);

    set_text(&mut scene, &mut cache, layout(), text_id, "a\nb\nc\nd").unwrap();
    assert_eq!(scene.get(&rect_id).unwrap().height, 110.0);
    assert_eq!(cache.get(&rect_id), Some(50.0));

    set_text(&mut scene, &mut cache, layout(), text_id, "a").unwrap();
    assert_eq!(scene.get(&rect_id).unwrap().height, 50.0);
    let data = text_of(&scene, text_id);
    assert_eq!(data.original_text, "a");
}

#[test]
fn clearing_a_label_removes_it_and_restores_the_container() {
    let (mut scene, mut cache, text_id, rect_id) = labelled_box();
    set_text(&mut scene, &mut cache, layout(), text_id, "a\nb\nc\nd").unwrap();

    set_text(&mut scene, &mut cache, layout(), text_id, "").unwrap();
    assert!(scene.get(&text_id).unwrap().is_deleted);
    let rect = scene.get(&rect_id).unwrap();
    assert_eq!(rect.height, 50.0);
    assert!(rect.bound_elements.is_empty());
    assert_eq!(cache.get(&rect_id), None);
}

#[test]
fn editing_free_text_resizes_it() {
    let text = Element::text(0.0, 0.0, "");
    let id = text.id;
    let mut scene = Scene::from_elements(vec![text]);
    let mut cache = ContainerCache::new();
    set_text(&mut scene, &mut cache, layout(), id, "abc\r\nde").unwrap();
    let el = scene.get(&id).unwrap();
    assert_eq!((el.width, el.height), (30.0, 50.0));
    assert_eq!(text_of(&scene, id).text, "abc\nde");
}

#[test]
fn editing_a_shape_is_an_error() {
    let rect = Element::rectangle(0.0, 0.0, 10.0, 10.0);
    let id = rect.id;
    let mut scene = Scene::from_elements(vec![rect]);
    let mut cache = ContainerCache::new();
    assert!(matches!(set_text(&mut scene, &mut cache, layout(), id, "x"), Err(SceneError::NotText(_))));
}

// =============================================================================
// Follow-up
// =============================================================================

#[test]
fn reposition_follows_a_moved_container() {
    let (mut scene, _, text_id, rect_id) = labelled_box();
    let before = scene.get(&text_id).unwrap().x;
    scene.mutate(&rect_id, &ElementUpdate::position(50.0, 0.0));
    assert!(reposition_bound_text(&mut scene, rect_id, 5.0));
    assert_eq!(scene.get(&text_id).unwrap().x, before + 50.0);
    assert!(!reposition_bound_text(&mut scene, rect_id, 5.0));
}

#[test]
fn lookups_resolve_both_directions() {
    let (scene, _, text_id, rect_id) = labelled_box();
    let rect = scene.get(&rect_id).unwrap();
    let text = scene.get(&text_id).unwrap();
    assert_eq!(get_bound_text_element(&scene, rect).map(|t| t.id), Some(text_id));
    assert_eq!(get_container_element(&scene, text).map(|c| c.id), Some(rect_id));
}

#[test]
fn unconfirmed_container_is_ignored() {
    let rect = Element::rectangle(0.0, 0.0, 60.0, 40.0);
    let text = Element::text(200.0, 200.0, "x").with_container(rect.id);
    let (rect_id, text_id) = (rect.id, text.id);
    let mut scene = Scene::from_elements(vec![rect, text]);
    let mut cache = ContainerCache::new();

    assert!(get_container_element(&scene, scene.get(&text_id).unwrap()).is_none());
    set_text(&mut scene, &mut cache, layout(), text_id, "a much longer line of text").unwrap();

    let rect = scene.get(&rect_id).unwrap();
    assert_eq!((rect.width, rect.height), (60.0, 40.0));
    let text = scene.get(&text_id).unwrap();
    assert_eq!((text.x, text.y), (200.0, 200.0));
    assert_eq!(cache.get(&rect_id), None);
}

#[test]
fn duplicated_pairs_are_relinked() {
    let (mut scene, _, text_id, rect_id) = labelled_box();
    let mut rect2 = scene.get(&rect_id).unwrap().clone();
    let mut text2 = scene.get(&text_id).unwrap().clone();
    rect2.id = Uuid::new_v4();
    text2.id = Uuid::new_v4();
    let (rect2_id, text2_id) = (rect2.id, text2.id);
    scene.insert(rect2);
    scene.insert(text2);
    let map = HashMap::from([(rect_id, rect2_id), (text_id, text2_id)]);

    bind_text_to_shape_after_duplication(&mut scene, &[rect_id, text_id], &map);

    assert_eq!(scene.get(&rect2_id).unwrap().bound_text_id(), Some(text2_id));
    assert_eq!(text_of(&scene, text2_id).container_id, Some(rect2_id));
    assert_eq!(scene.get(&rect_id).unwrap().bound_text_id(), Some(text_id));
    assert_eq!(text_of(&scene, text_id).container_id, Some(rect_id));
}
