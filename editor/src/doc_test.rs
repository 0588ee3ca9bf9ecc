#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Helpers
// =============================================================

fn store(w: f64, h: f64) -> DocStore {
    DocStore::new(Bounds::new(w, h), MaskRules::default(), StrengthRules::default(), HISTORY_MAX)
}

fn add(doc: &mut DocStore, x: f64, y: f64, w: f64, h: f64) -> MaskId {
    doc.create_mask(Rect::new(x, y, w, h), MaskKind::Solid, STRENGTH_RECOMMENDED).map(|m| m.id).unwrap()
}

fn add_kind(doc: &mut DocStore, kind: MaskKind, strength: u32) -> MaskId {
    doc.create_mask(Rect::new(10.0, 10.0, 50.0, 50.0), kind, strength).map(|m| m.id).unwrap()
}

fn rect_of(doc: &DocStore, id: &MaskId) -> Rect {
    doc.get(id).map(Mask::rect).unwrap()
}

// =============================================================
// Rect
// =============================================================

#[test]
fn from_points_normalizes_any_corner_order() {
    let r = Rect::from_points(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
    assert_eq!(r, Rect::new(10.0, 20.0, 40.0, 60.0));
}

#[test]
fn normalized_flips_negative_size() {
    assert_eq!(Rect::new(50.0, 50.0, -20.0, -10.0).normalized(), Rect::new(30.0, 40.0, 20.0, 10.0));
}

#[test]
fn contains_is_edge_inclusive() {
    let r = Rect::new(10.0, 10.0, 20.0, 20.0);
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(r.contains(Point::new(30.0, 30.0)));
    assert!(!r.contains(Point::new(30.1, 15.0)));
}

#[test]
fn clamp_to_intersects_with_bounds() {
    let b = Bounds::new(100.0, 100.0);
    assert_eq!(Rect::new(-10.0, -10.0, 50.0, 50.0).clamp_to(b), Rect::new(0.0, 0.0, 40.0, 40.0));
    assert_eq!(Rect::new(80.0, 90.0, 50.0, 50.0).clamp_to(b), Rect::new(80.0, 90.0, 20.0, 10.0));
    assert_eq!(Rect::new(200.0, 200.0, 5.0, 5.0).clamp_to(b).w, 0.0);
}

#[test]
fn translate_within_preserves_size() {
    let b = Bounds::new(100.0, 100.0);
    assert_eq!(Rect::new(90.0, -5.0, 20.0, 20.0).translate_within(b), Rect::new(80.0, 0.0, 20.0, 20.0));
}

#[test]
fn translate_within_shrinks_only_when_larger_than_bounds() {
    let b = Bounds::new(100.0, 100.0);
    assert_eq!(Rect::new(-10.0, 0.0, 150.0, 20.0).translate_within(b), Rect::new(0.0, 0.0, 100.0, 20.0));
}

// =============================================================
// StrengthRules
// =============================================================

#[test]
fn normalize_raises_to_type_floor() {
    let s = StrengthRules::default();
    assert_eq!(s.normalize(MaskKind::Blur, 2), STRENGTH_MIN_BLUR);
    assert_eq!(s.normalize(MaskKind::Pixelate, 2), STRENGTH_MIN_PIXELATE);
    assert_eq!(s.normalize(MaskKind::Blur, 0), STRENGTH_MIN_BLUR);
    assert_eq!(s.normalize(MaskKind::Solid, 2), 2);
}

#[test]
fn normalize_caps_at_max() {
    let s = StrengthRules::default();
    assert_eq!(s.normalize(MaskKind::Blur, 100), STRENGTH_MAX);
    assert_eq!(s.normalize(MaskKind::Pixelate, 33), STRENGTH_MAX);
}

#[test]
fn weak_only_applies_to_filters() {
    let s = StrengthRules::default();
    assert!(s.is_weak(MaskKind::Blur, 10));
    assert!(s.is_weak(MaskKind::Pixelate, 15));
    assert!(!s.is_weak(MaskKind::Pixelate, 16));
    assert!(!s.is_weak(MaskKind::Solid, 1));
}

// =============================================================
// Create
// =============================================================

#[test]
fn create_appends_activates_and_pushes_history() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 10.0, 20.0, 100.0, 50.0);
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.active_id(), Some(id));
    assert_eq!(doc.history_len(), 1);
    assert_eq!(rect_of(&doc, &id), Rect::new(10.0, 20.0, 100.0, 50.0));
}

#[test]
fn create_below_min_size_is_rejected_without_history() {
    let mut doc = store(1000.0, 1000.0);
    assert!(doc.create_mask(Rect::new(10.0, 10.0, 11.0, 200.0), MaskKind::Solid, 16).is_none());
    assert!(doc.create_mask(Rect::new(10.0, 10.0, 200.0, 5.0), MaskKind::Solid, 16).is_none());
    assert!(doc.is_empty());
    assert!(!doc.can_undo());
}

#[test]
fn create_clamps_to_image_then_checks_size() {
    let mut doc = store(100.0, 100.0);
    let id = add(&mut doc, -10.0, -10.0, 50.0, 50.0);
    assert_eq!(rect_of(&doc, &id), Rect::new(0.0, 0.0, 40.0, 40.0));
    assert!(doc.create_mask(Rect::new(95.0, 0.0, 50.0, 50.0), MaskKind::Solid, 16).is_none());
}

#[test]
fn create_normalizes_strength() {
    let mut doc = store(100.0, 100.0);
    let id = add_kind(&mut doc, MaskKind::Blur, 1);
    assert_eq!(doc.get(&id).map(|m| m.strength), Some(STRENGTH_MIN_BLUR));
}

#[test]
fn every_created_mask_is_inside_and_large_enough() {
    let mut doc = store(200.0, 150.0);
    let drags = [(-50.0, -50.0, 100.0, 100.0), (190.0, 140.0, 40.0, 40.0), (20.0, 20.0, 300.0, 300.0), (5.0, 5.0, 8.0, 8.0)];
    for (x, y, w, h) in drags {
        doc.create_mask(Rect::new(x, y, w, h), MaskKind::Solid, 16);
    }
    for m in doc.masks() {
        assert!(m.w >= MIN_MASK_SIZE_PX && m.h >= MIN_MASK_SIZE_PX);
        assert!(m.x >= 0.0 && m.y >= 0.0 && m.x + m.w <= 200.0 && m.y + m.h <= 150.0);
    }
}

// =============================================================
// Move and snapping
// =============================================================

#[test]
fn move_translates_when_nothing_is_near() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 50.0, 50.0);
    assert!(doc.move_mask(&id, 200.0, 200.0));
    assert_eq!(rect_of(&doc, &id), Rect::new(300.0, 300.0, 50.0, 50.0));
    assert_eq!(doc.history_len(), 2);
}

#[test]
fn move_snaps_to_image_edge() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 50.0, 50.0);
    doc.move_mask(&id, -95.0, 0.0);
    assert_eq!(rect_of(&doc, &id).x, 0.0);
}

#[test]
fn move_snaps_right_edge_to_image_edge() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 50.0, 50.0);
    doc.move_mask(&id, 845.0, 0.0);
    assert_eq!(rect_of(&doc, &id).x, 950.0);
}

#[test]
fn move_snaps_to_other_mask_edge() {
    let mut doc = store(1000.0, 1000.0);
    add(&mut doc, 300.0, 100.0, 50.0, 50.0);
    let id = add(&mut doc, 100.0, 400.0, 40.0, 40.0);
    doc.move_mask(&id, 255.0, 0.0);
    assert_eq!(rect_of(&doc, &id), Rect::new(350.0, 400.0, 40.0, 40.0));
}

#[test]
fn move_past_edge_keeps_size() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 900.0, 900.0, 50.0, 50.0);
    doc.move_mask(&id, 200.0, 200.0);
    assert_eq!(rect_of(&doc, &id), Rect::new(950.0, 950.0, 50.0, 50.0));
}

#[test]
fn move_without_change_pushes_nothing() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 50.0, 50.0);
    assert!(!doc.move_mask(&id, 0.0, 0.0));
    assert_eq!(doc.history_len(), 1);
}

#[test]
fn move_unknown_id_is_false() {
    let mut doc = store(100.0, 100.0);
    assert!(!doc.move_mask(&Uuid::new_v4(), 5.0, 5.0));
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_corner_moves_two_edges() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 100.0, 100.0);
    assert!(doc.resize_mask(&id, ResizeAnchor::Se, Point::new(300.0, 250.0)));
    assert_eq!(rect_of(&doc, &id), Rect::new(100.0, 100.0, 200.0, 150.0));
}

#[test]
fn resize_edge_moves_one_edge() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 100.0, 100.0);
    doc.resize_mask(&id, ResizeAnchor::N, Point::new(500.0, 60.0));
    assert_eq!(rect_of(&doc, &id), Rect::new(100.0, 60.0, 100.0, 140.0));
}

#[test]
fn resize_enforces_min_size_from_fixed_edge() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 100.0, 100.0);
    doc.resize_mask(&id, ResizeAnchor::Se, Point::new(105.0, 105.0));
    assert_eq!(rect_of(&doc, &id), Rect::new(100.0, 100.0, MIN_MASK_SIZE_PX, MIN_MASK_SIZE_PX));
}

#[test]
fn resize_min_size_grows_away_from_fixed_edge() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 100.0, 100.0);
    doc.resize_mask(&id, ResizeAnchor::W, Point::new(195.0, 150.0));
    assert_eq!(rect_of(&doc, &id), Rect::new(200.0 - MIN_MASK_SIZE_PX, 100.0, MIN_MASK_SIZE_PX, 100.0));
}

#[test]
fn resize_past_opposite_edge_flips() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 100.0, 100.0);
    doc.resize_mask(&id, ResizeAnchor::W, Point::new(250.0, 150.0));
    assert_eq!(rect_of(&doc, &id), Rect::new(200.0, 100.0, 50.0, 100.0));
}

#[test]
fn resize_snaps_dragged_edge() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 100.0, 100.0);
    doc.resize_mask(&id, ResizeAnchor::E, Point::new(995.0, 150.0));
    assert_eq!(rect_of(&doc, &id), Rect::new(100.0, 100.0, 900.0, 100.0));
}

#[test]
fn resize_clamps_to_image() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 100.0, 100.0);
    doc.resize_mask(&id, ResizeAnchor::Nw, Point::new(-300.0, -300.0));
    assert_eq!(rect_of(&doc, &id), Rect::new(0.0, 0.0, 200.0, 200.0));
}

// =============================================================
// Gesture drags
// =============================================================

#[test]
fn drag_move_checkpoints_once_per_gesture() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 50.0, 50.0);
    let origin = rect_of(&doc, &id);
    assert!(doc.drag_move(&id, origin, 100.0, 0.0, true));
    assert!(doc.drag_move(&id, origin, 200.0, 0.0, false));
    assert_eq!(rect_of(&doc, &id).x, 300.0);
    assert_eq!(doc.history_len(), 2);
    assert!(doc.undo());
    assert_eq!(rect_of(&doc, &id), origin);
}

#[test]
fn drag_without_change_pushes_nothing() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 100.0, 100.0, 50.0, 50.0);
    let origin = rect_of(&doc, &id);
    assert!(!doc.drag_move(&id, origin, 0.0, 0.0, true));
    assert_eq!(doc.history_len(), 1);
}

// =============================================================
// Nudge
// =============================================================

#[test]
fn nudge_translates_without_snapping() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 3.0, 100.0, 50.0, 50.0);
    assert!(doc.nudge(&id, -1.0, 0.0, true));
    assert_eq!(rect_of(&doc, &id).x, 2.0);
}

#[test]
fn nudge_against_edge_is_noop() {
    let mut doc = store(1000.0, 1000.0);
    let id = add(&mut doc, 0.0, 100.0, 50.0, 50.0);
    assert!(!doc.nudge(&id, -10.0, 0.0, true));
    assert_eq!(doc.history_len(), 1);
}

// =============================================================
// Delete / duplicate / reorder
// =============================================================

#[test]
fn delete_activates_topmost_remaining() {
    let mut doc = store(1000.0, 1000.0);
    let a = add(&mut doc, 0.0, 0.0, 50.0, 50.0);
    let b = add(&mut doc, 100.0, 0.0, 50.0, 50.0);
    let c = add(&mut doc, 200.0, 0.0, 50.0, 50.0);
    doc.select(Some(a));
    let removed = doc.delete_mask(&b);
    assert_eq!(removed.map(|m| m.id), Some(b));
    assert_eq!(doc.active_id(), Some(c));
    doc.delete_mask(&c);
    doc.delete_mask(&a);
    assert_eq!(doc.active_id(), None);
}

#[test]
fn undo_delete_restores_list_position() {
    let mut doc = store(1000.0, 1000.0);
    let a = add(&mut doc, 0.0, 0.0, 50.0, 50.0);
    let b = add(&mut doc, 100.0, 0.0, 50.0, 50.0);
    let c = add(&mut doc, 200.0, 0.0, 50.0, 50.0);
    doc.delete_mask(&b);
    assert_eq!(doc.masks().iter().map(|m| m.id).collect::<Vec<_>>(), vec![a, c]);

    assert!(doc.undo());
    assert_eq!(doc.masks().iter().map(|m| m.id).collect::<Vec<_>>(), vec![a, b, c]);
    assert_eq!(rect_of(&doc, &b), Rect::new(100.0, 0.0, 50.0, 50.0));
}

#[test]
fn duplicate_offsets_and_goes_on_top() {
    let mut doc = store(1000.0, 1000.0);
    let a = add(&mut doc, 100.0, 100.0, 50.0, 50.0);
    add(&mut doc, 500.0, 500.0, 50.0, 50.0);
    let copy = doc.duplicate_mask(&a).unwrap();
    assert_ne!(copy.id, a);
    assert_eq!(copy.rect(), Rect::new(110.0, 110.0, 50.0, 50.0));
    assert_eq!(doc.masks().last().map(|m| m.id), Some(copy.id));
    assert_eq!(doc.active_id(), Some(copy.id));
}

#[test]
fn duplicate_at_edge_stays_inside() {
    let mut doc = store(1000.0, 1000.0);
    let a = add(&mut doc, 980.0, 980.0, 20.0, 20.0);
    let copy = doc.duplicate_mask(&a).unwrap();
    assert_eq!(copy.rect(), Rect::new(980.0, 980.0, 20.0, 20.0));
}

#[test]
fn bring_to_front_reorders_without_changing_selection() {
    let mut doc = store(1000.0, 1000.0);
    let a = add(&mut doc, 0.0, 0.0, 50.0, 50.0);
    let b = add(&mut doc, 100.0, 0.0, 50.0, 50.0);
    assert!(doc.bring_to_front(&a));
    assert_eq!(doc.masks().iter().map(|m| m.id).collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(doc.active_id(), Some(b));
}

#[test]
fn bring_to_front_when_on_top_pushes_nothing() {
    let mut doc = store(1000.0, 1000.0);
    add(&mut doc, 0.0, 0.0, 50.0, 50.0);
    let b = add(&mut doc, 100.0, 0.0, 50.0, 50.0);
    let depth = doc.history_len();
    assert!(!doc.bring_to_front(&b));
    assert_eq!(doc.history_len(), depth);
}

#[test]
fn select_does_not_reorder() {
    let mut doc = store(1000.0, 1000.0);
    let a = add(&mut doc, 0.0, 0.0, 50.0, 50.0);
    let b = add(&mut doc, 100.0, 0.0, 50.0, 50.0);
    assert!(doc.select(Some(a)));
    assert_eq!(doc.masks()[1].id, b);
    assert!(!doc.select(Some(Uuid::new_v4())));
    assert_eq!(doc.active_id(), Some(a));
}

#[test]
fn select_adopts_mask_settings_as_tool_defaults() {
    let mut doc = store(1000.0, 1000.0);
    let p = add_kind(&mut doc, MaskKind::Pixelate, 20);
    add_kind(&mut doc, MaskKind::Solid, 16);
    doc.select(Some(p));
    assert_eq!(doc.current_kind(), MaskKind::Pixelate);
    assert_eq!(doc.current_strength(), 20);
}

// =============================================================
// Type / strength
// =============================================================

#[test]
fn set_kind_renormalizes_strength() {
    let mut doc = store(100.0, 100.0);
    let id = add_kind(&mut doc, MaskKind::Solid, 3);
    assert!(doc.set_kind(&id, MaskKind::Pixelate));
    let m = doc.get(&id).unwrap();
    assert_eq!(m.kind, MaskKind::Pixelate);
    assert_eq!(m.strength, STRENGTH_MIN_PIXELATE);
}

#[test]
fn set_kind_same_pushes_nothing() {
    let mut doc = store(100.0, 100.0);
    let id = add_kind(&mut doc, MaskKind::Blur, 16);
    assert!(!doc.set_kind(&id, MaskKind::Blur));
    assert_eq!(doc.history_len(), 1);
}

#[test]
fn set_strength_never_stores_below_floor() {
    let mut doc = store(100.0, 100.0);
    let id = add_kind(&mut doc, MaskKind::Pixelate, 16);
    assert!(doc.set_strength(&id, 1));
    assert_eq!(doc.get(&id).map(|m| m.strength), Some(STRENGTH_MIN_PIXELATE));
    assert!(!doc.set_strength(&id, 2));
}

// =============================================================
// Clear / boost
// =============================================================

#[test]
fn clear_masks_is_one_undo_step() {
    let mut doc = store(1000.0, 1000.0);
    add(&mut doc, 0.0, 0.0, 50.0, 50.0);
    add(&mut doc, 100.0, 0.0, 50.0, 50.0);
    assert!(doc.clear_masks());
    assert!(doc.is_empty());
    assert_eq!(doc.active_id(), None);
    assert!(doc.undo());
    assert_eq!(doc.len(), 2);
}

#[test]
fn clear_empty_pushes_nothing() {
    let mut doc = store(100.0, 100.0);
    assert!(!doc.clear_masks());
    assert!(!doc.can_undo());
}

#[test]
fn boost_weak_raises_filters_only() {
    let mut doc = store(1000.0, 1000.0);
    let blur = add_kind(&mut doc, MaskKind::Blur, 6);
    let pix = add_kind(&mut doc, MaskKind::Pixelate, 10);
    let solid = add_kind(&mut doc, MaskKind::Solid, 3);
    let strong = add_kind(&mut doc, MaskKind::Blur, 20);
    assert_eq!(doc.weak_masks(), vec![blur, pix]);

    assert_eq!(doc.boost_weak(), 2);
    assert!(doc.weak_masks().is_empty());
    assert_eq!(doc.get(&blur).map(|m| m.strength), Some(STRENGTH_RECOMMENDED));
    assert_eq!(doc.get(&pix).map(|m| m.strength), Some(STRENGTH_RECOMMENDED));
    assert_eq!(doc.get(&solid).map(|m| m.strength), Some(3));
    assert_eq!(doc.get(&strong).map(|m| m.strength), Some(20));

    assert!(doc.undo());
    assert_eq!(doc.weak_masks(), vec![blur, pix]);
}

#[test]
fn boost_with_nothing_weak_pushes_nothing() {
    let mut doc = store(1000.0, 1000.0);
    add_kind(&mut doc, MaskKind::Blur, 16);
    let depth = doc.history_len();
    assert_eq!(doc.boost_weak(), 0);
    assert_eq!(doc.history_len(), depth);
}

// =============================================================
// Undo
// =============================================================

#[test]
fn n_undos_restore_initial_snapshot() {
    let mut doc = store(1000.0, 1000.0);
    let initial = doc.snapshot();
    let a = add(&mut doc, 10.0, 10.0, 100.0, 100.0);
    doc.move_mask(&a, 300.0, 300.0);
    doc.set_kind(&a, MaskKind::Blur);
    doc.set_strength(&a, 30);
    doc.duplicate_mask(&a);
    doc.bring_to_front(&a);
    doc.delete_mask(&a);
    for _ in 0..7 {
        assert!(doc.undo());
    }
    assert_eq!(doc.snapshot(), initial);
    assert!(!doc.undo());
}

#[test]
fn history_depth_is_capped() {
    let mut doc = DocStore::new(Bounds::new(1000.0, 1000.0), MaskRules::default(), StrengthRules::default(), 3);
    for i in 0..5 {
        add(&mut doc, f64::from(i) * 100.0, 0.0, 50.0, 50.0);
    }
    assert_eq!(doc.history_len(), 3);
    while doc.undo() {}
    assert_eq!(doc.len(), 2);
}

#[test]
fn reset_drops_masks_and_history() {
    let mut doc = store(100.0, 100.0);
    add_kind(&mut doc, MaskKind::Blur, 20);
    doc.reset(Bounds::new(50.0, 40.0));
    assert!(doc.is_empty());
    assert!(!doc.can_undo());
    assert_eq!(doc.bounds(), Bounds::new(50.0, 40.0));
    assert_eq!(doc.current_kind(), MaskKind::Solid);
    assert_eq!(doc.current_strength(), STRENGTH_RECOMMENDED);
}

// =============================================================
// Serde
// =============================================================

#[test]
fn mask_serializes_kind_as_type() {
    let mut doc = store(100.0, 100.0);
    let id = add_kind(&mut doc, MaskKind::Pixelate, 16);
    let json = serde_json::to_value(doc.get(&id).unwrap()).unwrap();
    assert_eq!(json["type"], "pixelate");
    assert_eq!(json["w"], 50.0);
}
