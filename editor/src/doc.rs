//! Mask model: redaction regions, their rules, and the in-memory store.
//!
//! This module defines the data that describes what gets redacted (`Mask`,
//! `MaskKind`, `Rect`), the rules that keep masks valid (`MaskRules`,
//! `StrengthRules`), and the store that owns the live mask list together with
//! its undo history (`DocStore`).
//!
//! All geometry is in image-pixel space. Every mutation that changes the
//! model pushes a [`Snapshot`] first, so one `undo()` reverts one operation.
//! Order in the list is paint order: later masks are drawn on top.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{
    DUPLICATE_OFFSET_PX, HISTORY_MAX, MIN_MASK_SIZE_PX, SNAP_TOLERANCE_PX, STRENGTH_MAX, STRENGTH_MIN_BLUR,
    STRENGTH_MIN_PIXELATE, STRENGTH_RECOMMENDED,
};
use crate::hit::ResizeAnchor;
use crate::history::History;

/// Unique identifier for a mask. Stable across reorder; duplicates get a new one.
pub type MaskId = Uuid;

/// Image dimensions used as the clamping bounds for masks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle spanned by two opposite corners, in any order.
    #[must_use]
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::from_edges(a.x, a.y, b.x, b.y)
    }

    fn from_edges(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x: x1.min(x2), y: y1.min(y2), w: (x2 - x1).abs(), h: (y2 - y1).abs() }
    }

    /// Same rectangle with non-negative width and height.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::from_edges(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Edge-inclusive containment.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Intersection with `[0, width] × [0, height]`.
    #[must_use]
    pub fn clamp_to(&self, bounds: Bounds) -> Self {
        let x1 = self.x.clamp(0.0, bounds.width);
        let y1 = self.y.clamp(0.0, bounds.height);
        let x2 = self.right().clamp(0.0, bounds.width);
        let y2 = self.bottom().clamp(0.0, bounds.height);
        Self { x: x1, y: y1, w: (x2 - x1).max(0.0), h: (y2 - y1).max(0.0) }
    }

    /// Slide the rectangle back inside `bounds`, keeping its size unless it is
    /// larger than the bounds themselves.
    #[must_use]
    pub fn translate_within(&self, bounds: Bounds) -> Self {
        let w = self.w.min(bounds.width).max(0.0);
        let h = self.h.min(bounds.height).max(0.0);
        Self { x: self.x.clamp(0.0, bounds.width - w), y: self.y.clamp(0.0, bounds.height - h), w, h }
    }

    /// Rectangle scaled about the origin.
    #[must_use]
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self { x: self.x * sx, y: self.y * sy, w: self.w * sx, h: self.h * sy }
    }
}

/// Redaction treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskKind {
    /// Opaque black fill.
    #[default]
    Solid,
    /// Gaussian blur limited to the mask rectangle.
    Blur,
    /// Block-averaged pixelation.
    Pixelate,
}

impl MaskKind {
    /// Whether `strength` has any effect for this kind.
    #[must_use]
    pub fn uses_strength(self) -> bool {
        matches!(self, Self::Blur | Self::Pixelate)
    }
}

/// A redaction region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    pub id: MaskId,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(rename = "type")]
    pub kind: MaskKind,
    pub strength: u32,
}

impl Mask {
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    fn set_rect(&mut self, r: Rect) {
        self.x = r.x;
        self.y = r.y;
        self.w = r.w;
        self.h = r.h;
    }
}

/// Geometry rules applied to every mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskRules {
    /// Minimum width and height in image pixels.
    pub min_size: f64,
    /// Edges within this distance of a boundary snap onto it.
    pub snap_tolerance: f64,
    /// Offset applied to duplicates.
    pub duplicate_offset: f64,
}

impl Default for MaskRules {
    fn default() -> Self {
        Self { min_size: MIN_MASK_SIZE_PX, snap_tolerance: SNAP_TOLERANCE_PX, duplicate_offset: DUPLICATE_OFFSET_PX }
    }
}

/// Strength range and the per-kind floors that rule out weak redaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthRules {
    pub max: u32,
    pub recommended: u32,
    pub min_blur: u32,
    pub min_pixelate: u32,
}

impl Default for StrengthRules {
    fn default() -> Self {
        Self {
            max: STRENGTH_MAX,
            recommended: STRENGTH_RECOMMENDED,
            min_blur: STRENGTH_MIN_BLUR,
            min_pixelate: STRENGTH_MIN_PIXELATE,
        }
    }
}

impl StrengthRules {
    /// Lowest strength stored for `kind`.
    #[must_use]
    pub fn floor(&self, kind: MaskKind) -> u32 {
        match kind {
            MaskKind::Solid => 1,
            MaskKind::Blur => self.min_blur,
            MaskKind::Pixelate => self.min_pixelate,
        }
    }

    /// Clamp `value` into `[floor(kind), max]`.
    #[must_use]
    pub fn normalize(&self, kind: MaskKind, value: u32) -> u32 {
        value.clamp(1, self.max).max(self.floor(kind)).min(self.max)
    }

    /// Blur / pixelate below the recommended strength.
    #[must_use]
    pub fn is_weak(&self, kind: MaskKind, strength: u32) -> bool {
        kind.uses_strength() && strength < self.recommended
    }
}

/// Everything one undo step restores.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub masks: Vec<Mask>,
    pub active_id: Option<MaskId>,
    pub current_kind: MaskKind,
    pub current_strength: u32,
}

/// Ordered mask list plus the tool defaults and undo history.
pub struct DocStore {
    masks: Vec<Mask>,
    active_id: Option<MaskId>,
    current_kind: MaskKind,
    current_strength: u32,
    bounds: Bounds,
    rules: MaskRules,
    strength: StrengthRules,
    history: History<Snapshot>,
}

impl DocStore {
    /// Create an empty store for an image of the given size.
    #[must_use]
    pub fn new(bounds: Bounds, rules: MaskRules, strength: StrengthRules, history_max: usize) -> Self {
        Self {
            masks: Vec::new(),
            active_id: None,
            current_kind: MaskKind::Solid,
            current_strength: strength.recommended,
            bounds,
            rules,
            strength,
            history: History::new(history_max),
        }
    }

    /// Drop all masks and history and adopt new image bounds.
    pub fn reset(&mut self, bounds: Bounds) {
        self.masks.clear();
        self.active_id = None;
        self.current_kind = MaskKind::Solid;
        self.current_strength = self.strength.recommended;
        self.bounds = bounds;
        self.history.clear();
    }

    // --- Queries ---

    #[must_use]
    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    #[must_use]
    pub fn get(&self, id: &MaskId) -> Option<&Mask> {
        self.masks.iter().find(|m| m.id == *id)
    }

    #[must_use]
    pub fn index_of(&self, id: &MaskId) -> Option<usize> {
        self.masks.iter().position(|m| m.id == *id)
    }

    #[must_use]
    pub fn active_id(&self) -> Option<MaskId> {
        self.active_id
    }

    #[must_use]
    pub fn active(&self) -> Option<&Mask> {
        self.active_id.as_ref().and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn current_kind(&self) -> MaskKind {
        self.current_kind
    }

    #[must_use]
    pub fn current_strength(&self) -> u32 {
        self.current_strength
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub fn rules(&self) -> MaskRules {
        self.rules
    }

    #[must_use]
    pub fn strength_rules(&self) -> StrengthRules {
        self.strength
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Ids of blur / pixelate masks below the recommended strength, in paint order.
    #[must_use]
    pub fn weak_masks(&self) -> Vec<MaskId> {
        self.masks
            .iter()
            .filter(|m| self.strength.is_weak(m.kind, m.strength))
            .map(|m| m.id)
            .collect()
    }

    // --- History ---

    /// Deep copy of the undoable state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            masks: self.masks.clone(),
            active_id: self.active_id,
            current_kind: self.current_kind,
            current_strength: self.current_strength,
        }
    }

    /// Push a snapshot of the current state.
    pub fn checkpoint(&mut self) {
        let snap = self.snapshot();
        self.history.push(snap);
    }

    /// Restore the most recent snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snap) = self.history.pop() else {
            return false;
        };
        self.masks = snap.masks;
        self.active_id = snap.active_id;
        self.current_kind = snap.current_kind;
        self.current_strength = snap.current_strength;
        tracing::debug!(masks = self.masks.len(), remaining = self.history.len(), "undo");
        true
    }

    // --- Selection and tool defaults (not undoable) ---

    /// Make `id` the active mask, or clear the selection with `None`.
    ///
    /// Selecting a mask adopts its type and strength as the tool defaults.
    /// Returns false if `id` is unknown.
    pub fn select(&mut self, id: Option<MaskId>) -> bool {
        match id {
            None => {
                self.active_id = None;
                true
            }
            Some(id) => {
                let Some(mask) = self.get(&id) else {
                    return false;
                };
                let (kind, strength) = (mask.kind, mask.strength);
                self.active_id = Some(id);
                self.current_kind = kind;
                self.current_strength = self.strength.normalize(kind, strength);
                true
            }
        }
    }

    /// Set the type used for new masks.
    pub fn set_current_kind(&mut self, kind: MaskKind) {
        self.current_kind = kind;
        self.current_strength = self.strength.normalize(kind, self.current_strength);
    }

    /// Set the strength used for new masks.
    pub fn set_current_strength(&mut self, value: u32) {
        self.current_strength = self.strength.normalize(self.current_kind, value);
    }

    // --- Mutations ---

    /// Add a mask covering `rect` (clamped to the image).
    ///
    /// Returns `None` without touching history when the clamped rectangle is
    /// below the minimum size on either axis.
    pub fn create_mask(&mut self, rect: Rect, kind: MaskKind, strength: u32) -> Option<Mask> {
        let r = rect.normalized().clamp_to(self.bounds);
        if r.w < self.rules.min_size || r.h < self.rules.min_size {
            tracing::debug!(w = r.w, h = r.h, min = self.rules.min_size, "mask below minimum size; ignored");
            return None;
        }
        self.checkpoint();
        let mask = Mask {
            id: Uuid::new_v4(),
            x: r.x,
            y: r.y,
            w: r.w,
            h: r.h,
            kind,
            strength: self.strength.normalize(kind, strength),
        };
        self.masks.push(mask.clone());
        self.active_id = Some(mask.id);
        self.current_kind = kind;
        self.current_strength = mask.strength;
        Some(mask)
    }

    /// Translate a mask by `(dx, dy)` with snapping. Returns false if nothing changed.
    pub fn move_mask(&mut self, id: &MaskId, dx: f64, dy: f64) -> bool {
        let Some(origin) = self.get(id).map(Mask::rect) else {
            return false;
        };
        let next = self.moved(id, origin, dx, dy);
        if next == origin {
            return false;
        }
        self.checkpoint();
        self.apply_rect(id, next)
    }

    /// Drag the `anchor` handle of a mask to `to` with snapping. Returns false if nothing changed.
    pub fn resize_mask(&mut self, id: &MaskId, anchor: ResizeAnchor, to: Point) -> bool {
        let Some(origin) = self.get(id).map(Mask::rect) else {
            return false;
        };
        let next = self.resized(id, origin, anchor, to);
        if next == origin {
            return false;
        }
        self.checkpoint();
        self.apply_rect(id, next)
    }

    /// Gesture form of [`Self::move_mask`]: the delta is relative to `origin`,
    /// the rectangle the mask had when the drag began.
    ///
    /// Pushes a snapshot only when `checkpoint` is set and the rectangle
    /// actually changes, so a gesture records at most one entry. Returns
    /// whether the mask changed.
    pub(crate) fn drag_move(&mut self, id: &MaskId, origin: Rect, dx: f64, dy: f64, checkpoint: bool) -> bool {
        let next = self.moved(id, origin, dx, dy);
        self.apply_drag(id, next, checkpoint)
    }

    /// Gesture form of [`Self::resize_mask`]. Same history rule as [`Self::drag_move`].
    pub(crate) fn drag_resize(
        &mut self,
        id: &MaskId,
        origin: Rect,
        anchor: ResizeAnchor,
        to: Point,
        checkpoint: bool,
    ) -> bool {
        let next = self.resized(id, origin, anchor, to);
        self.apply_drag(id, next, checkpoint)
    }

    fn apply_drag(&mut self, id: &MaskId, next: Rect, checkpoint: bool) -> bool {
        match self.get(id) {
            Some(m) if m.rect() != next => {}
            _ => return false,
        }
        if checkpoint {
            self.checkpoint();
        }
        self.apply_rect(id, next)
    }

    /// Arrow-key nudge. Clamps inside the image without snapping.
    ///
    /// `checkpoint` is false when this nudge continues a coalesced burst.
    pub fn nudge(&mut self, id: &MaskId, dx: f64, dy: f64, checkpoint: bool) -> bool {
        let Some(origin) = self.get(id).map(Mask::rect) else {
            return false;
        };
        let next = Rect { x: origin.x + dx, y: origin.y + dy, ..origin }.translate_within(self.bounds);
        self.apply_drag(id, next, checkpoint)
    }

    /// Remove a mask. The next active mask is the topmost remaining one.
    pub fn delete_mask(&mut self, id: &MaskId) -> Option<Mask> {
        let idx = self.index_of(id)?;
        self.checkpoint();
        let removed = self.masks.remove(idx);
        self.active_id = self.masks.last().map(|m| m.id);
        Some(removed)
    }

    /// Copy a mask, offset it, and append it on top as the active mask.
    pub fn duplicate_mask(&mut self, id: &MaskId) -> Option<Mask> {
        let source = self.get(id)?.clone();
        self.checkpoint();
        let offset = self.rules.duplicate_offset;
        let r = Rect { x: source.x + offset, y: source.y + offset, ..source.rect() }.translate_within(self.bounds);
        let copy = Mask {
            id: Uuid::new_v4(),
            x: r.x,
            y: r.y,
            w: r.w,
            h: r.h,
            kind: source.kind,
            strength: self.strength.normalize(source.kind, source.strength),
        };
        self.masks.push(copy.clone());
        self.active_id = Some(copy.id);
        Some(copy)
    }

    /// Change a mask's type, re-normalizing its strength for the new type.
    pub fn set_kind(&mut self, id: &MaskId, kind: MaskKind) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let strength = self.strength.normalize(kind, self.masks[idx].strength);
        if self.masks[idx].kind == kind && self.masks[idx].strength == strength {
            return false;
        }
        self.checkpoint();
        let mask = &mut self.masks[idx];
        mask.kind = kind;
        mask.strength = strength;
        self.current_kind = kind;
        self.current_strength = strength;
        true
    }

    /// Change a mask's strength. Values below the type floor are raised to it.
    pub fn set_strength(&mut self, id: &MaskId, value: u32) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let strength = self.strength.normalize(self.masks[idx].kind, value);
        if self.masks[idx].strength == strength {
            return false;
        }
        self.checkpoint();
        self.masks[idx].strength = strength;
        self.current_strength = strength;
        true
    }

    /// Move a mask to the top of the paint order.
    pub fn bring_to_front(&mut self, id: &MaskId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx + 1 == self.masks.len() {
            return false;
        }
        self.checkpoint();
        let mask = self.masks.remove(idx);
        self.masks.push(mask);
        true
    }

    /// Remove every mask.
    pub fn clear_masks(&mut self) -> bool {
        if self.masks.is_empty() {
            return false;
        }
        self.checkpoint();
        self.masks.clear();
        self.active_id = None;
        true
    }

    /// Raise every weak blur / pixelate mask to the recommended strength.
    ///
    /// Returns how many masks changed; zero means no history entry was pushed.
    pub fn boost_weak(&mut self) -> usize {
        let weak = self.weak_masks();
        if weak.is_empty() {
            return 0;
        }
        self.checkpoint();
        let recommended = self.strength.recommended;
        for mask in &mut self.masks {
            if weak.contains(&mask.id) {
                mask.strength = recommended;
            }
        }
        if self.current_kind.uses_strength() {
            self.current_strength = self.current_strength.max(recommended);
        }
        weak.len()
    }

    // --- Geometry ---

    fn others(&self, id: &MaskId) -> Vec<Rect> {
        self.masks.iter().filter(|m| m.id != *id).map(Mask::rect).collect()
    }

    fn moved(&self, id: &MaskId, origin: Rect, dx: f64, dy: f64) -> Rect {
        let shifted = Rect { x: origin.x + dx, y: origin.y + dy, ..origin };
        snap_move(shifted, &self.others(id), self.bounds, self.rules.snap_tolerance)
    }

    fn resized(&self, id: &MaskId, origin: Rect, anchor: ResizeAnchor, to: Point) -> Rect {
        snap_resize(origin, anchor, to, &self.others(id), self.bounds, self.rules)
    }

    fn apply_rect(&mut self, id: &MaskId, r: Rect) -> bool {
        let Some(mask) = self.masks.iter_mut().find(|m| m.id == *id) else {
            return false;
        };
        mask.set_rect(r);
        true
    }
}

// =============================================================
// Snapping
// =============================================================

/// Smallest correction that puts one of `edges` exactly on one of `targets`,
/// considering only corrections within `tol`.
fn snap_offset(edges: &[f64], targets: &[f64], tol: f64) -> f64 {
    let mut best: Option<f64> = None;
    for &edge in edges {
        for &target in targets {
            let delta = target - edge;
            if delta.abs() <= tol && best.is_none_or(|b| delta.abs() < b.abs()) {
                best = Some(delta);
            }
        }
    }
    best.unwrap_or(0.0)
}

/// Snap a single moving edge onto the nearest target within `tol`.
fn snap_edge(edge: f64, targets: &[f64], tol: f64) -> f64 {
    edge + snap_offset(&[edge], targets, tol)
}

fn x_targets(others: &[Rect], bounds: Bounds) -> Vec<f64> {
    let mut t = vec![0.0, bounds.width];
    t.extend(others.iter().flat_map(|o| [o.x, o.right()]));
    t
}

fn y_targets(others: &[Rect], bounds: Bounds) -> Vec<f64> {
    let mut t = vec![0.0, bounds.height];
    t.extend(others.iter().flat_map(|o| [o.y, o.bottom()]));
    t
}

/// Snap a translated rectangle: either vertical edge may pull the whole
/// rectangle onto an image edge or another mask's edge, likewise
/// horizontally. Size is preserved and the result stays inside the image.
#[must_use]
pub fn snap_move(rect: Rect, others: &[Rect], bounds: Bounds, tol: f64) -> Rect {
    let dx = snap_offset(&[rect.x, rect.right()], &x_targets(others, bounds), tol);
    let dy = snap_offset(&[rect.y, rect.bottom()], &y_targets(others, bounds), tol);
    Rect { x: rect.x + dx, y: rect.y + dy, ..rect }.translate_within(bounds)
}

/// Resize `origin` by dragging `anchor` to `to`.
///
/// Only the dragged edges snap. The opposite edges stay fixed, the result is
/// at least `min_size` on both axes and lies inside the image. Dragging past
/// the fixed edge flips the rectangle.
#[must_use]
pub fn snap_resize(origin: Rect, anchor: ResizeAnchor, to: Point, others: &[Rect], bounds: Bounds, rules: MaskRules) -> Rect {
    let tol = rules.snap_tolerance;
    let xt = x_targets(others, bounds);
    let yt = y_targets(others, bounds);

    let (mut x1, mut y1, mut x2, mut y2) = (origin.x, origin.y, origin.right(), origin.bottom());
    if anchor.moves_left() {
        x1 = snap_edge(to.x, &xt, tol).clamp(0.0, bounds.width);
    }
    if anchor.moves_right() {
        x2 = snap_edge(to.x, &xt, tol).clamp(0.0, bounds.width);
    }
    if anchor.moves_top() {
        y1 = snap_edge(to.y, &yt, tol).clamp(0.0, bounds.height);
    }
    if anchor.moves_bottom() {
        y2 = snap_edge(to.y, &yt, tol).clamp(0.0, bounds.height);
    }

    let (x, w) = enforce_min(x1, x2, anchor.moves_left(), rules.min_size);
    let (y, h) = enforce_min(y1, y2, anchor.moves_top(), rules.min_size);
    Rect { x, y, w, h }.translate_within(bounds)
}

/// Span between two edges grown to `min` around the edge that is not being dragged.
fn enforce_min(a: f64, b: f64, dragging_a: bool, min: f64) -> (f64, f64) {
    let lo = a.min(b);
    let span = (b - a).abs();
    if span >= min {
        return (lo, span);
    }
    let (fixed, moving) = if dragging_a { (b, a) } else { (a, b) };
    if moving < fixed { (fixed - min, min) } else { (fixed, min) }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new(Bounds::new(0.0, 0.0), MaskRules::default(), StrengthRules::default(), HISTORY_MAX)
    }
}
