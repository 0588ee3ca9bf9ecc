//! Editor: the top-level state machine tying loader, engine, preview and export together.
//!
//! ```text
//! NoImage → ImageLoaded → Editing{Add|Edit|Pan} ⇄ PreviewGated → Exported
//!    ↑__________________________ reset() ___________________________|
//! ```
//!
//! The UI is an injected [`Host`]: it answers confirmation prompts and
//! receives every [`Action`] the engine emits.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use time::OffsetDateTime;

use crate::camera::Point;
use crate::config::EditorConfig;
use crate::doc::{Mask, MaskKind, Rect};
use crate::engine::{Action, EngineCore};
use crate::error::{ExportError, LoadError};
use crate::export::{ExportedFile, Preview, export_scale_for};
use crate::i18n::{Lang, LangStore, Message};
use crate::input::{KeyEvent, Mode, PointerEvent, PointerId, WheelDelta};
use crate::loader::{self, DownscaleProposal, ImageBuffer};
use crate::render::{self, Scene};

/// A question the user must approve before a destructive command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    DeleteMask,
    ClearMasks,
    ResetAll,
}

impl Prompt {
    #[must_use]
    pub fn message(self) -> Message {
        match self {
            Self::DeleteMask => Message::ConfirmDelete,
            Self::ClearMasks => Message::ConfirmClearMasks,
            Self::ResetAll => Message::ConfirmResetAll,
        }
    }
}

/// UI callbacks.
pub trait Host {
    /// Ask whether to edit a large image at reduced size.
    fn confirm_downscale(&mut self, proposal: &DownscaleProposal) -> bool;
    /// Ask before a destructive command.
    fn confirm(&mut self, prompt: Prompt) -> bool;
    /// Carry out an engine action (redraw, cursor, timer, notification).
    fn handle(&mut self, action: Action);
}

/// Where the editor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoImage,
    ImageLoaded,
    Editing(Mode),
    PreviewGated,
    Exported,
}

/// One editing session over one image at a time.
pub struct Editor<H: Host> {
    host: H,
    config: EditorConfig,
    engine: EngineCore,
    image: Option<ImageBuffer>,
    preview: Option<Preview>,
    exported: bool,
    editing: bool,
    lang: Lang,
}

impl<H: Host> Editor<H> {
    /// Create an editor with no image.
    ///
    /// The display language is the config override, else the stored
    /// preference, else English.
    pub fn new(host: H, config: EditorConfig, store: &dyn LangStore) -> Self {
        let lang = config.lang.or_else(|| store.get_lang()).unwrap_or_default();
        Self {
            host,
            engine: EngineCore::new(&config),
            config,
            image: None,
            preview: None,
            exported: false,
            editing: false,
            lang,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn phase(&self) -> Phase {
        match (&self.image, &self.preview) {
            (None, _) => Phase::NoImage,
            (Some(_), Some(_)) if self.exported => Phase::Exported,
            (Some(_), Some(_)) => Phase::PreviewGated,
            (Some(_), None) if self.editing => Phase::Editing(self.engine.mode()),
            (Some(_), None) => Phase::ImageLoaded,
        }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageBuffer> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    #[must_use]
    pub fn masks(&self) -> &[Mask] {
        self.engine.doc.masks()
    }

    #[must_use]
    pub fn lang(&self) -> Lang {
        self.lang
    }

    /// Switch language and persist the choice.
    pub fn set_lang(&mut self, lang: Lang, store: &mut dyn LangStore) {
        self.lang = lang;
        store.set_lang(lang);
    }

    /// Render `message` in the current language.
    #[must_use]
    pub fn text(&self, message: &Message) -> String {
        message.text(self.lang)
    }

    /// Warning for the strength control, when the current tool strength is weak.
    #[must_use]
    pub fn strength_warning(&self) -> Option<Message> {
        let doc = &self.engine.doc;
        let rules = doc.strength_rules();
        rules
            .is_weak(doc.current_kind(), doc.current_strength())
            .then_some(Message::WeakStrength { recommended: rules.recommended })
    }

    /// Geometry for the editor canvas.
    #[must_use]
    pub fn scene(&self) -> Scene {
        render::scene(&self.engine.doc, &self.engine.viewport, &self.engine.input, self.engine.ui.pointer_kind)
    }

    // --- Image lifecycle ---

    /// Load a new image, replacing the current one.
    ///
    /// On failure the current image and its masks are kept.
    ///
    /// # Errors
    ///
    /// Any [`LoadError`] from the loader.
    pub fn open(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let limits = self.config.limits;
        let host = &mut self.host;
        let buffer = loader::load(bytes, &limits, |proposal| host.confirm_downscale(proposal))?;

        let (w, h) = (buffer.edit_width(), buffer.edit_height());
        self.image = Some(buffer);
        self.preview = None;
        self.exported = false;
        self.editing = false;
        let actions = self.engine.load_image(w, h);
        self.process(actions);
        Ok(())
    }

    /// Drop the image, masks and history. Asks first when an image is loaded.
    ///
    /// Returns false if the user declined.
    pub fn reset(&mut self) -> bool {
        if self.image.is_some() && !self.host.confirm(Prompt::ResetAll) {
            return false;
        }
        self.image = None;
        self.preview = None;
        self.exported = false;
        self.editing = false;
        self.engine.unload();
        tracing::info!("editor reset");
        self.host.handle(Action::SelectionChanged(None));
        self.host.handle(Action::HistoryChanged { can_undo: false });
        self.host.handle(Action::RenderNeeded);
        true
    }

    // --- Input forwarding ---

    fn accepts_input(&self) -> bool {
        self.image.is_some() && self.preview.is_none()
    }

    pub fn pointer_down(&mut self, ev: PointerEvent) {
        if self.accepts_input() {
            self.editing = true;
            let actions = self.engine.on_pointer_down(ev);
            self.process(actions);
        }
    }

    pub fn pointer_move(&mut self, ev: PointerEvent) {
        if self.accepts_input() {
            let actions = self.engine.on_pointer_move(ev);
            self.process(actions);
        }
    }

    pub fn pointer_up(&mut self, ev: PointerEvent) {
        if self.accepts_input() {
            let actions = self.engine.on_pointer_up(ev);
            self.process(actions);
        }
    }

    pub fn pointer_cancel(&mut self, ev: PointerEvent) {
        if self.accepts_input() {
            let actions = self.engine.on_pointer_cancel(ev);
            self.process(actions);
        }
    }

    pub fn long_press_elapsed(&mut self, pointer: PointerId) {
        if self.accepts_input() {
            let actions = self.engine.on_long_press_elapsed(pointer);
            self.process(actions);
        }
    }

    pub fn wheel(&mut self, screen: Point, delta: WheelDelta) {
        if self.accepts_input() {
            let actions = self.engine.on_wheel(screen, delta);
            self.process(actions);
        }
    }

    pub fn key_down(&mut self, ev: &KeyEvent) {
        if self.preview.is_some() {
            if ev.is_escape() {
                self.close_preview();
            }
            return;
        }
        self.editing |= self.image.is_some();
        let actions = self.engine.on_key_down(ev);
        self.process(actions);
    }

    pub fn key_up(&mut self, ev: &KeyEvent) {
        if self.preview.is_none() {
            let actions = self.engine.on_key_up(ev);
            self.process(actions);
        }
    }

    /// Forward actions to the host, resolving confirmations on the way.
    fn process(&mut self, actions: Vec<Action>) {
        for action in actions {
            if let Action::ConfirmDeleteRequested { id } = action {
                if self.host.confirm(Prompt::DeleteMask) {
                    let follow = self.engine.delete_mask(&id);
                    self.process(follow);
                }
                continue;
            }
            self.host.handle(action);
        }
    }

    // --- Commands ---
    //
    // Mask and mode commands are ignored while the preview is open.

    fn command(&mut self, actions: Vec<Action>) {
        if self.image.is_some() {
            self.editing = true;
        }
        self.process(actions);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.preview.is_some() {
            return;
        }
        let actions = self.engine.set_mode(mode);
        self.command(actions);
    }

    pub fn set_kind(&mut self, kind: MaskKind) {
        if self.preview.is_some() {
            return;
        }
        let actions = self.engine.set_kind(kind);
        self.command(actions);
    }

    pub fn set_strength(&mut self, value: u32) {
        if self.preview.is_some() {
            return;
        }
        let actions = self.engine.set_strength(value);
        self.command(actions);
    }

    /// Add a mask programmatically, with the given type and strength.
    pub fn add_mask(&mut self, rect: Rect, kind: MaskKind, strength: u32) -> Option<Mask> {
        if !self.accepts_input() {
            return None;
        }
        let mask = self.engine.doc.create_mask(rect, kind, strength)?;
        self.command(vec![
            Action::MaskCreated(mask.clone()),
            Action::SelectionChanged(Some(mask.id)),
            Action::HistoryChanged { can_undo: true },
            Action::RenderNeeded,
        ]);
        Some(mask)
    }

    /// Delete the active mask after confirmation.
    pub fn delete_active(&mut self) {
        if self.preview.is_some() {
            return;
        }
        if let Some(id) = self.engine.selection() {
            self.process(vec![Action::ConfirmDeleteRequested { id }]);
        }
    }

    pub fn duplicate_active(&mut self) {
        if self.preview.is_some() {
            return;
        }
        let actions = self.engine.duplicate_active();
        self.command(actions);
    }

    pub fn bring_active_to_front(&mut self) {
        if self.preview.is_some() {
            return;
        }
        let actions = self.engine.bring_active_to_front();
        self.command(actions);
    }

    /// Remove every mask after confirmation.
    pub fn clear_masks(&mut self) {
        if self.preview.is_some() || self.engine.doc.is_empty() || !self.host.confirm(Prompt::ClearMasks) {
            return;
        }
        let actions = self.engine.clear_masks();
        self.command(actions);
    }

    pub fn undo(&mut self) {
        if self.preview.is_some() {
            return;
        }
        let actions = self.engine.undo();
        self.command(actions);
    }

    pub fn fit(&mut self) {
        if self.image.is_some() {
            let actions = self.engine.fit();
            self.process(actions);
        }
    }

    pub fn zoom_actual(&mut self) {
        if self.image.is_some() {
            let actions = self.engine.zoom_actual();
            self.process(actions);
        }
    }

    pub fn zoom_percent(&mut self, percent: f64) {
        let actions = self.engine.zoom_percent(percent);
        self.process(actions);
    }

    pub fn zoom_step(&mut self, steps: i32) {
        let actions = self.engine.zoom_step(steps);
        self.process(actions);
    }

    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        let actions = self.engine.resize_viewport(width, height);
        self.process(actions);
    }

    // --- Preview and export ---

    fn build_preview(&self) -> Result<Preview, ExportError> {
        let image = self.image.as_ref().ok_or(ExportError::NoImage)?;
        let doc = &self.engine.doc;
        let rules = doc.strength_rules();
        let scale = export_scale_for(image, &self.config.limits);
        let composed = render::compose(image.pixels(), doc.masks(), scale, &rules, self.config.limits.blur_pad_px);
        Ok(Preview::new(composed, scale, doc.weak_masks(), rules.recommended))
    }

    /// Compose at export scale and show the gated preview, unverified.
    ///
    /// # Errors
    ///
    /// [`ExportError::NoImage`] when nothing is loaded.
    pub fn open_preview(&mut self) -> Result<&Preview, ExportError> {
        let preview = self.build_preview()?;
        tracing::info!(
            width = preview.width(),
            height = preview.height(),
            scaled = preview.is_scaled(),
            weak = preview.weak_masks().len(),
            "preview opened"
        );
        self.exported = false;
        Ok(self.preview.insert(preview))
    }

    /// Tick or untick the verification box. Ignored without a preview.
    pub fn set_verified(&mut self, verified: bool) {
        if let Some(preview) = self.preview.as_mut() {
            preview.set_verified(verified);
        }
    }

    pub fn set_preview_zoom(&mut self, percent: f64) {
        if let Some(preview) = self.preview.as_mut() {
            preview.set_zoom_percent(percent);
        }
    }

    /// Raise weak masks to the recommended strength.
    ///
    /// An open preview is rebuilt and its verification cleared. Returns how
    /// many masks changed.
    pub fn boost_weak_masks(&mut self) -> usize {
        let (actions, count) = self.engine.boost_weak();
        self.process(actions);
        if count > 0 && self.preview.is_some() {
            match self.build_preview() {
                Ok(preview) => {
                    self.preview = Some(preview);
                    self.exported = false;
                }
                Err(e) => tracing::warn!(error = %e, "preview rebuild failed"),
            }
        }
        count
    }

    /// Leave the preview and return to editing.
    pub fn close_preview(&mut self) {
        if self.preview.take().is_some() {
            self.exported = false;
            self.editing = true;
            self.host.handle(Action::RenderNeeded);
        }
    }

    /// Write out the verified preview.
    ///
    /// # Errors
    ///
    /// [`ExportError::NoImage`], [`ExportError::NoPreview`],
    /// [`ExportError::NotVerified`] or an encoding failure.
    pub fn export(&mut self, at: OffsetDateTime) -> Result<ExportedFile, ExportError> {
        if self.image.is_none() {
            return Err(ExportError::NoImage);
        }
        let preview = self.preview.as_ref().ok_or(ExportError::NoPreview)?;
        let file = preview.export(at)?;
        self.exported = true;
        Ok(file)
    }
}
