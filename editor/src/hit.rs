//! Hit-testing of mask bodies and resize handles.
//!
//! Works in image space. Handle hit boxes are sized in CSS pixels and
//! converted through the viewport scale, so they stay the same size on screen
//! at every zoom level.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, Viewport};
use crate::consts::{HANDLE_DRAW_MOUSE_PX, HANDLE_DRAW_TOUCH_PX, HANDLE_HIT_MOUSE_PX, HANDLE_HIT_TOUCH_PX};
use crate::doc::{DocStore, Mask, MaskId, Rect};
use crate::input::PointerKind;

/// Which part of a mask was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// Handles in hit-test and drawing order, clockwise from the top-left corner.
    pub const ALL: [Self; 8] = [Self::Nw, Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W];

    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Image-space position of this handle on `r`.
    #[must_use]
    pub fn point_on(self, r: Rect) -> Point {
        let cx = r.x + r.w / 2.0;
        let cy = r.y + r.h / 2.0;
        match self {
            Self::Nw => Point::new(r.x, r.y),
            Self::N => Point::new(cx, r.y),
            Self::Ne => Point::new(r.right(), r.y),
            Self::E => Point::new(r.right(), cy),
            Self::Se => Point::new(r.right(), r.bottom()),
            Self::S => Point::new(cx, r.bottom()),
            Self::Sw => Point::new(r.x, r.bottom()),
            Self::W => Point::new(r.x, cy),
        }
    }

    /// CSS cursor name shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub mask_id: MaskId,
    pub part: HitPart,
}

/// Handle hit-box edge in CSS pixels for the given pointer kind.
#[must_use]
pub fn handle_hit_px(kind: PointerKind) -> f64 {
    match kind {
        PointerKind::Touch => HANDLE_HIT_TOUCH_PX,
        PointerKind::Mouse | PointerKind::Pen => HANDLE_HIT_MOUSE_PX,
    }
}

/// Drawn handle edge in CSS pixels.
#[must_use]
pub fn handle_draw_px(kind: PointerKind) -> f64 {
    match kind {
        PointerKind::Touch => HANDLE_DRAW_TOUCH_PX,
        PointerKind::Mouse | PointerKind::Pen => HANDLE_DRAW_MOUSE_PX,
    }
}

/// The handle of `rect` whose square hit box of edge `box_px` (image pixels)
/// contains `pt`, if any.
#[must_use]
pub fn handle_at(rect: Rect, pt: Point, box_px: f64) -> Option<ResizeAnchor> {
    let half = box_px / 2.0;
    ResizeAnchor::ALL.into_iter().find(|anchor| {
        let h = anchor.point_on(rect);
        (pt.x - h.x).abs() <= half && (pt.y - h.y).abs() <= half
    })
}

/// Test which mask (if any) is under `image_pt`.
///
/// The active mask's handles win, then its body, so a mask lying under
/// another one stays grabbable once selected. Other masks are tested
/// topmost-first; a body hit there still reports a handle when the point is
/// also on one.
#[must_use]
pub fn hit_test(image_pt: Point, doc: &DocStore, viewport: &Viewport, pointer: PointerKind) -> Option<Hit> {
    let box_px = viewport.screen_dist_to_image(handle_hit_px(pointer));

    if let Some(active) = doc.active() {
        if let Some(hit) = hit_mask(active, image_pt, box_px, true) {
            return Some(hit);
        }
    }

    doc.masks().iter().rev().find_map(|m| hit_mask(m, image_pt, box_px, false))
}

fn hit_mask(mask: &Mask, pt: Point, box_px: f64, handles_outside: bool) -> Option<Hit> {
    let rect = mask.rect();
    let inside = rect.contains(pt);
    if !inside && !handles_outside {
        return None;
    }
    if let Some(anchor) = handle_at(rect, pt, box_px) {
        return Some(Hit { mask_id: mask.id, part: HitPart::ResizeHandle(anchor) });
    }
    inside.then_some(Hit { mask_id: mask.id, part: HitPart::Body })
}
