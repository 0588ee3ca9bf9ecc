//! Interaction engine: pointer, wheel and keyboard handling over the mask model.
//!
//! `EngineCore` owns the mask store, the viewport and the gesture state. Every
//! input handler mutates that state and returns the [`Action`]s the host must
//! carry out (redraw, cursor change, long-press timer, confirmation prompt).
//! Nothing here touches a real canvas, so the whole state machine runs in
//! plain unit tests.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::camera::{PinchAnchor, Point, Viewport};
use crate::config::EditorConfig;
use crate::consts::{NUDGE_COALESCE_MS, NUDGE_STEP_FAST_PX, NUDGE_STEP_PX, WHEEL_ZOOM_RATE, ZOOM_STEP_PERCENT};
use crate::doc::{Bounds, DocStore, Mask, MaskId, MaskKind, Rect};
use crate::hit::{HitPart, hit_test};
use crate::input::{
    Button, InputState, KeyEvent, Mode, PointerEvent, PointerId, PointerKind, TouchRules, UiState, WheelDelta,
};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Redraw the editor canvas.
    RenderNeeded,
    /// Change the canvas cursor (CSS cursor name).
    SetCursor(String),
    /// Start a timer; call `on_long_press_elapsed(pointer)` when it fires.
    ScheduleLongPress { pointer: PointerId, delay_ms: u32 },
    /// The pending long-press timer for `pointer` is obsolete.
    CancelLongPress { pointer: PointerId },
    MaskCreated(Mask),
    MaskUpdated { id: MaskId },
    MaskDeleted { id: MaskId },
    SelectionChanged(Option<MaskId>),
    /// Ask the user before deleting; on approval call `delete_mask(id)`.
    ConfirmDeleteRequested { id: MaskId },
    ModeChanged(Mode),
    ViewportChanged(Viewport),
    HistoryChanged { can_undo: bool },
    /// Undo was requested with an empty history.
    NothingToUndo,
}

/// Core engine state: all logic that doesn't depend on a canvas element.
pub struct EngineCore {
    pub doc: DocStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    touch: TouchRules,
    /// Active pointers in press order. The first two drive a pinch.
    pointers: Vec<(PointerId, Point)>,
    has_image: bool,
    last_nudge_ms: Option<f64>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            doc: DocStore::new(Bounds::new(0.0, 0.0), config.masks, config.strength, config.history_max),
            viewport: Viewport::default(),
            ui: UiState::default(),
            input: InputState::Idle,
            viewport_width: 0.0,
            viewport_height: 0.0,
            touch: config.touch,
            pointers: Vec::new(),
            has_image: false,
            last_nudge_ms: None,
        }
    }

    // --- Image lifecycle ---

    /// Start editing an image of `width × height` edit pixels: empty mask
    /// list, empty history, viewport fitted.
    pub fn load_image(&mut self, width: u32, height: u32) -> Vec<Action> {
        self.doc.reset(Bounds::new(f64::from(width), f64::from(height)));
        self.input = InputState::Idle;
        self.pointers.clear();
        self.last_nudge_ms = None;
        self.has_image = true;
        self.fit()
    }

    /// Forget the image and every mask.
    pub fn unload(&mut self) {
        self.doc.reset(Bounds::new(0.0, 0.0));
        self.input = InputState::Idle;
        self.pointers.clear();
        self.last_nudge_ms = None;
        self.ui.space_pan_prev = None;
        self.has_image = false;
        self.viewport = Viewport::default();
    }

    // --- Queries ---

    #[must_use]
    pub fn has_image(&self) -> bool {
        self.has_image
    }

    /// The currently active mask, if any.
    #[must_use]
    pub fn selection(&self) -> Option<MaskId> {
        self.doc.active_id()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.ui.mode
    }

    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, ev: PointerEvent) -> Vec<Action> {
        if !self.has_image {
            return Vec::new();
        }
        self.ui.pointer_kind = ev.kind;
        self.track_pointer(ev.id, ev.screen);

        if self.pointers.len() >= 2 {
            let mut actions = self.abort_gesture();
            self.start_pinch();
            actions.push(Action::RenderNeeded);
            return actions;
        }

        if ev.button != Button::Primary {
            return Vec::new();
        }

        let image_pt = self.viewport.screen_to_image(ev.screen);
        match self.ui.mode {
            Mode::Pan => {
                self.input = InputState::Panning {
                    pointer: ev.id,
                    start_screen: ev.screen,
                    start_pan_x: self.viewport.pan_x,
                    start_pan_y: self.viewport.pan_y,
                };
                vec![Action::SetCursor("grabbing".into())]
            }
            Mode::Add if ev.kind == PointerKind::Touch => {
                if let Some(hit) = hit_test(image_pt, &self.doc, &self.viewport, ev.kind) {
                    return self.select(Some(hit.mask_id));
                }
                self.input = InputState::LongPressPending { pointer: ev.id, start_screen: ev.screen };
                vec![Action::ScheduleLongPress { pointer: ev.id, delay_ms: self.touch.long_press_ms }]
            }
            Mode::Add => {
                self.input = InputState::Creating { pointer: ev.id, anchor: image_pt, current: image_pt };
                vec![Action::RenderNeeded]
            }
            Mode::Edit => self.begin_edit_drag(ev, image_pt),
        }
    }

    fn begin_edit_drag(&mut self, ev: PointerEvent, image_pt: Point) -> Vec<Action> {
        let Some(hit) = hit_test(image_pt, &self.doc, &self.viewport, ev.kind) else {
            return self.select(None);
        };
        let mut actions = self.select(Some(hit.mask_id));
        let Some(origin) = self.doc.get(&hit.mask_id).map(Mask::rect) else {
            return actions;
        };
        match hit.part {
            HitPart::ResizeHandle(anchor) => {
                self.input =
                    InputState::Resizing { pointer: ev.id, id: hit.mask_id, anchor, origin, changed: false };
                actions.push(Action::SetCursor(anchor.cursor().into()));
            }
            HitPart::Body => {
                self.input =
                    InputState::Moving { pointer: ev.id, id: hit.mask_id, start: image_pt, origin, changed: false };
                actions.push(Action::SetCursor("move".into()));
            }
        }
        actions
    }

    pub fn on_pointer_move(&mut self, ev: PointerEvent) -> Vec<Action> {
        if !self.has_image {
            return Vec::new();
        }
        let tracked = self.update_pointer(ev.id, ev.screen);

        if let InputState::Pinching { anchor } = self.input {
            return match (self.pointers.first(), self.pointers.get(1)) {
                (Some(&(_, a)), Some(&(_, b))) => {
                    self.viewport = anchor.apply(a, b);
                    vec![Action::ViewportChanged(self.viewport), Action::RenderNeeded]
                }
                _ => Vec::new(),
            };
        }

        if self.input.pointer() != Some(ev.id) {
            return if tracked { Vec::new() } else { self.hover(ev) };
        }

        let image_pt = self.viewport.screen_to_image(ev.screen);
        match &mut self.input {
            InputState::LongPressPending { pointer, start_screen } => {
                if start_screen.distance(ev.screen) > self.touch.move_tolerance_px {
                    let pointer = *pointer;
                    self.input = InputState::Idle;
                    return vec![Action::CancelLongPress { pointer }];
                }
                Vec::new()
            }
            InputState::Creating { current, .. } => {
                *current = image_pt;
                vec![Action::RenderNeeded]
            }
            InputState::Moving { id, start, origin, changed, .. } => {
                let (dx, dy) = (image_pt.x - start.x, image_pt.y - start.y);
                if self.doc.drag_move(id, *origin, dx, dy, !*changed) {
                    *changed = true;
                    return vec![Action::MaskUpdated { id: *id }, Action::RenderNeeded];
                }
                Vec::new()
            }
            InputState::Resizing { id, anchor, origin, changed, .. } => {
                if self.doc.drag_resize(id, *origin, *anchor, image_pt, !*changed) {
                    *changed = true;
                    return vec![Action::MaskUpdated { id: *id }, Action::RenderNeeded];
                }
                Vec::new()
            }
            InputState::Panning { start_screen, start_pan_x, start_pan_y, .. } => {
                self.viewport.pan_x = *start_pan_x + (ev.screen.x - start_screen.x);
                self.viewport.pan_y = *start_pan_y + (ev.screen.y - start_screen.y);
                vec![Action::ViewportChanged(self.viewport), Action::RenderNeeded]
            }
            InputState::Idle | InputState::Pinching { .. } => Vec::new(),
        }
    }

    /// Cursor feedback for a hovering mouse or pen with no button down.
    fn hover(&self, ev: PointerEvent) -> Vec<Action> {
        let cursor = match self.ui.mode {
            Mode::Pan => "grab",
            Mode::Add => "crosshair",
            Mode::Edit => {
                let image_pt = self.viewport.screen_to_image(ev.screen);
                match hit_test(image_pt, &self.doc, &self.viewport, ev.kind).map(|h| h.part) {
                    Some(HitPart::ResizeHandle(anchor)) => anchor.cursor(),
                    Some(HitPart::Body) => "move",
                    None => "default",
                }
            }
        };
        vec![Action::SetCursor(cursor.into())]
    }

    pub fn on_pointer_up(&mut self, ev: PointerEvent) -> Vec<Action> {
        self.untrack_pointer(ev.id);
        if matches!(self.input, InputState::Pinching { .. }) {
            if self.pointers.len() < 2 {
                self.input = InputState::Idle;
            }
            return Vec::new();
        }
        if self.input.pointer() != Some(ev.id) {
            return Vec::new();
        }

        match std::mem::take(&mut self.input) {
            InputState::LongPressPending { pointer, .. } => vec![Action::CancelLongPress { pointer }],
            InputState::Creating { anchor, .. } => {
                let end = self.viewport.screen_to_image(ev.screen);
                self.finish_create(anchor, end)
            }
            InputState::Moving { changed, .. } | InputState::Resizing { changed, .. } => {
                let mut actions = vec![Action::SetCursor(self.idle_cursor().into())];
                if changed {
                    actions.push(Action::HistoryChanged { can_undo: self.doc.can_undo() });
                }
                actions
            }
            InputState::Panning { .. } => vec![Action::SetCursor("grab".into())],
            InputState::Idle | InputState::Pinching { .. } => Vec::new(),
        }
    }

    /// The host lost the pointer (touch cancelled, window blurred).
    ///
    /// Nothing the pointer was doing is committed.
    pub fn on_pointer_cancel(&mut self, ev: PointerEvent) -> Vec<Action> {
        self.untrack_pointer(ev.id);
        if matches!(self.input, InputState::Pinching { .. }) {
            if self.pointers.len() < 2 {
                self.input = InputState::Idle;
            }
            return Vec::new();
        }
        if self.input.pointer() != Some(ev.id) {
            return Vec::new();
        }
        let mut actions = self.abort_gesture();
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The long-press timer for `pointer` fired.
    ///
    /// Starts a create-drag at the finger's current position, provided the
    /// press is still pending and no second finger has landed.
    pub fn on_long_press_elapsed(&mut self, pointer: PointerId) -> Vec<Action> {
        let InputState::LongPressPending { pointer: pending, .. } = self.input else {
            return Vec::new();
        };
        if pending != pointer || self.pointers.len() != 1 {
            return Vec::new();
        }
        let Some(&(_, screen)) = self.pointers.iter().find(|(id, _)| *id == pointer) else {
            return Vec::new();
        };
        let at = self.viewport.screen_to_image(screen);
        self.input = InputState::Creating { pointer, anchor: at, current: at };
        vec![Action::RenderNeeded]
    }

    fn finish_create(&mut self, anchor: Point, end: Point) -> Vec<Action> {
        let kind = self.doc.current_kind();
        let strength = self.doc.current_strength();
        let rect = Rect::from_points(anchor, end);
        match self.doc.create_mask(rect, kind, strength) {
            Some(mask) => {
                tracing::debug!(id = %mask.id, x = mask.x, y = mask.y, w = mask.w, h = mask.h, "mask created");
                let id = mask.id;
                vec![
                    Action::MaskCreated(mask),
                    Action::SelectionChanged(Some(id)),
                    Action::HistoryChanged { can_undo: true },
                    Action::RenderNeeded,
                ]
            }
            None => vec![Action::RenderNeeded],
        }
    }

    /// Drop the current single-pointer gesture without committing it.
    ///
    /// A move or resize that already changed the mask is rolled back through
    /// its own history entry.
    fn abort_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::LongPressPending { pointer, .. } => vec![Action::CancelLongPress { pointer }],
            InputState::Moving { id, changed: true, .. } | InputState::Resizing { id, changed: true, .. } => {
                self.doc.undo();
                tracing::debug!(%id, "drag aborted; geometry restored");
                vec![Action::MaskUpdated { id }, Action::HistoryChanged { can_undo: self.doc.can_undo() }]
            }
            InputState::Pinching { anchor } => {
                self.input = InputState::Pinching { anchor };
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn start_pinch(&mut self) {
        if let (Some(&(_, a)), Some(&(_, b))) = (self.pointers.first(), self.pointers.get(1)) {
            self.input = InputState::Pinching { anchor: PinchAnchor::new(a, b, self.viewport) };
        }
    }

    fn track_pointer(&mut self, id: PointerId, screen: Point) {
        if !self.update_pointer(id, screen) {
            self.pointers.push((id, screen));
        }
    }

    fn update_pointer(&mut self, id: PointerId, screen: Point) -> bool {
        match self.pointers.iter_mut().find(|(p, _)| *p == id) {
            Some(entry) => {
                entry.1 = screen;
                true
            }
            None => false,
        }
    }

    fn untrack_pointer(&mut self, id: PointerId) {
        self.pointers.retain(|(p, _)| *p != id);
    }

    fn idle_cursor(&self) -> &'static str {
        match self.ui.mode {
            Mode::Add => "crosshair",
            Mode::Edit => "default",
            Mode::Pan => "grab",
        }
    }

    // --- Wheel ---

    /// Zoom around the cursor: `scale * exp(-dy * rate)`.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta) -> Vec<Action> {
        if !self.has_image || delta.dy == 0.0 {
            return Vec::new();
        }
        let next = self.viewport.scale * (-delta.dy * WHEEL_ZOOM_RATE).exp();
        self.viewport.zoom_at(screen, next);
        vec![Action::ViewportChanged(self.viewport), Action::RenderNeeded]
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, ev: &KeyEvent) -> Vec<Action> {
        if ev.typing {
            return Vec::new();
        }
        if ev.is_space() {
            return self.begin_space_pan();
        }
        if ev.is_undo() {
            return self.undo();
        }
        if !self.has_image {
            return Vec::new();
        }
        let Some(active) = self.doc.active_id() else {
            return Vec::new();
        };
        if ev.is_delete() {
            return vec![Action::ConfirmDeleteRequested { id: active }];
        }
        if let Some((ux, uy)) = ev.arrow() {
            if self.ui.mode == Mode::Edit {
                return self.nudge(active, ux, uy, ev);
            }
            return Vec::new();
        }
        if ev.is_char('f') && !ev.modifiers.command() {
            return self.bring_to_front(active);
        }
        Vec::new()
    }

    pub fn on_key_up(&mut self, ev: &KeyEvent) -> Vec<Action> {
        if ev.typing || !ev.is_space() {
            return Vec::new();
        }
        self.end_space_pan()
    }

    fn nudge(&mut self, id: MaskId, ux: f64, uy: f64, ev: &KeyEvent) -> Vec<Action> {
        let step = if ev.modifiers.shift { NUDGE_STEP_FAST_PX } else { NUDGE_STEP_PX };
        let fresh = self.last_nudge_ms.is_none_or(|last| ev.time_ms - last > NUDGE_COALESCE_MS);
        self.last_nudge_ms = Some(ev.time_ms);
        if self.doc.nudge(&id, ux * step, uy * step, fresh) {
            return vec![
                Action::MaskUpdated { id },
                Action::HistoryChanged { can_undo: self.doc.can_undo() },
                Action::RenderNeeded,
            ];
        }
        Vec::new()
    }

    fn begin_space_pan(&mut self) -> Vec<Action> {
        if !self.has_image || self.ui.space_pan_prev.is_some() {
            return Vec::new();
        }
        self.ui.space_pan_prev = Some(self.ui.mode);
        self.set_mode(Mode::Pan)
    }

    fn end_space_pan(&mut self) -> Vec<Action> {
        match self.ui.space_pan_prev.take() {
            Some(prev) => self.set_mode(prev),
            None => Vec::new(),
        }
    }

    // --- Commands ---

    /// Switch editing mode.
    ///
    /// A move or resize in progress ends where it is; other gestures are dropped.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        let mut actions = match self.input {
            InputState::Moving { .. } | InputState::Resizing { .. } => {
                self.input = InputState::Idle;
                Vec::new()
            }
            _ => self.abort_gesture(),
        };
        if matches!(self.input, InputState::Pinching { .. }) {
            self.input = InputState::Idle;
        }
        self.ui.mode = mode;
        actions.push(Action::ModeChanged(mode));
        actions.push(Action::SetCursor(self.idle_cursor().into()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Make `id` active (or clear the selection).
    pub fn select(&mut self, id: Option<MaskId>) -> Vec<Action> {
        if self.doc.active_id() == id {
            return Vec::new();
        }
        if self.doc.select(id) {
            return vec![Action::SelectionChanged(id), Action::RenderNeeded];
        }
        Vec::new()
    }

    /// Pick the mask type: applied to the active mask, and used for new masks.
    pub fn set_kind(&mut self, kind: MaskKind) -> Vec<Action> {
        match self.doc.active_id() {
            Some(id) if self.doc.set_kind(&id, kind) => self.mutated(id),
            Some(_) => Vec::new(),
            None => {
                self.doc.set_current_kind(kind);
                Vec::new()
            }
        }
    }

    /// Pick the strength: applied to the active mask, and used for new masks.
    pub fn set_strength(&mut self, value: u32) -> Vec<Action> {
        match self.doc.active_id() {
            Some(id) if self.doc.set_strength(&id, value) => self.mutated(id),
            Some(_) => Vec::new(),
            None => {
                self.doc.set_current_strength(value);
                Vec::new()
            }
        }
    }

    /// Delete a mask. Call after the user confirmed [`Action::ConfirmDeleteRequested`].
    pub fn delete_mask(&mut self, id: &MaskId) -> Vec<Action> {
        let Some(removed) = self.doc.delete_mask(id) else {
            return Vec::new();
        };
        vec![
            Action::MaskDeleted { id: removed.id },
            Action::SelectionChanged(self.doc.active_id()),
            Action::HistoryChanged { can_undo: true },
            Action::RenderNeeded,
        ]
    }

    pub fn duplicate_active(&mut self) -> Vec<Action> {
        let Some(id) = self.doc.active_id() else {
            return Vec::new();
        };
        let Some(copy) = self.doc.duplicate_mask(&id) else {
            return Vec::new();
        };
        let copy_id = copy.id;
        vec![
            Action::MaskCreated(copy),
            Action::SelectionChanged(Some(copy_id)),
            Action::HistoryChanged { can_undo: true },
            Action::RenderNeeded,
        ]
    }

    pub fn bring_active_to_front(&mut self) -> Vec<Action> {
        match self.doc.active_id() {
            Some(id) => self.bring_to_front(id),
            None => Vec::new(),
        }
    }

    fn bring_to_front(&mut self, id: MaskId) -> Vec<Action> {
        if self.doc.bring_to_front(&id) { self.mutated(id) } else { Vec::new() }
    }

    /// Remove every mask. Call after the user confirmed.
    pub fn clear_masks(&mut self) -> Vec<Action> {
        if !self.doc.clear_masks() {
            return Vec::new();
        }
        vec![
            Action::SelectionChanged(None),
            Action::HistoryChanged { can_undo: true },
            Action::RenderNeeded,
        ]
    }

    /// Raise weak masks to the recommended strength. Returns the actions and the count.
    pub fn boost_weak(&mut self) -> (Vec<Action>, usize) {
        let count = self.doc.boost_weak();
        if count == 0 {
            return (Vec::new(), 0);
        }
        (vec![Action::HistoryChanged { can_undo: true }, Action::RenderNeeded], count)
    }

    /// Revert the last mutation.
    ///
    /// During a move or resize that already changed the mask, the drag itself
    /// is the last mutation and rolling it back is the whole undo.
    pub fn undo(&mut self) -> Vec<Action> {
        let drag_changed = matches!(
            self.input,
            InputState::Moving { changed: true, .. } | InputState::Resizing { changed: true, .. }
        );
        let mut actions = self.abort_gesture();
        if !drag_changed && !self.doc.undo() {
            actions.push(Action::NothingToUndo);
            return actions;
        }
        actions.push(Action::SelectionChanged(self.doc.active_id()));
        actions.push(Action::HistoryChanged { can_undo: self.doc.can_undo() });
        actions.push(Action::RenderNeeded);
        actions
    }

    fn mutated(&self, id: MaskId) -> Vec<Action> {
        vec![
            Action::MaskUpdated { id },
            Action::HistoryChanged { can_undo: self.doc.can_undo() },
            Action::RenderNeeded,
        ]
    }

    // --- Viewport ---

    fn image_size(&self) -> (f64, f64) {
        let b = self.doc.bounds();
        (b.width, b.height)
    }

    /// Update the canvas size in CSS pixels. The image is re-centered at the current scale.
    pub fn resize_viewport(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.viewport_width = width;
        self.viewport_height = height;
        if !self.has_image {
            return Vec::new();
        }
        let (iw, ih) = self.image_size();
        self.viewport.recenter(width, height, iw, ih);
        vec![Action::ViewportChanged(self.viewport), Action::RenderNeeded]
    }

    pub fn fit(&mut self) -> Vec<Action> {
        let (iw, ih) = self.image_size();
        self.viewport = Viewport::fit(self.viewport_width, self.viewport_height, iw, ih);
        vec![Action::ViewportChanged(self.viewport), Action::RenderNeeded]
    }

    pub fn zoom_actual(&mut self) -> Vec<Action> {
        let (iw, ih) = self.image_size();
        self.viewport = Viewport::actual_size(self.viewport_width, self.viewport_height, iw, ih);
        vec![Action::ViewportChanged(self.viewport), Action::RenderNeeded]
    }

    /// Zoom to `percent` around the canvas center.
    pub fn zoom_percent(&mut self, percent: f64) -> Vec<Action> {
        if !self.has_image {
            return Vec::new();
        }
        self.viewport.zoom_to_percent(percent, self.viewport_width, self.viewport_height);
        vec![Action::ViewportChanged(self.viewport), Action::RenderNeeded]
    }

    /// Zoom in (`steps > 0`) or out by [`ZOOM_STEP_PERCENT`] per step.
    pub fn zoom_step(&mut self, steps: i32) -> Vec<Action> {
        let percent = self.viewport.zoom_percent() + f64::from(steps) * ZOOM_STEP_PERCENT;
        self.zoom_percent(percent)
    }
}
