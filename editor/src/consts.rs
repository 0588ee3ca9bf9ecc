//! Shared numeric constants for the editor crate.
//!
//! These are defaults. Anything a host may want to tune lives in
//! [`crate::config::EditorConfig`], which starts from these values.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed viewport scale (25%).
pub const MIN_ZOOM: f64 = 0.25;

/// Largest allowed viewport scale (400%).
pub const MAX_ZOOM: f64 = 4.0;

/// Percent step for the zoom in / zoom out buttons.
pub const ZOOM_STEP_PERCENT: f64 = 10.0;

/// Wheel zoom rate: `scale * exp(-dy * WHEEL_ZOOM_RATE)`.
pub const WHEEL_ZOOM_RATE: f64 = 0.0015;

/// Lower bound on the starting finger distance of a pinch, in CSS pixels.
pub const PINCH_MIN_START_DIST_PX: f64 = 10.0;

// ── Masks ───────────────────────────────────────────────────────

/// Minimum mask width and height in image pixels.
pub const MIN_MASK_SIZE_PX: f64 = 12.0;

/// Edge snapping tolerance in image pixels.
pub const SNAP_TOLERANCE_PX: f64 = 8.0;

/// Offset applied to a duplicated mask, in image pixels.
pub const DUPLICATE_OFFSET_PX: f64 = 10.0;

/// Arrow-key nudge distance in image pixels.
pub const NUDGE_STEP_PX: f64 = 1.0;

/// Arrow-key nudge distance with Shift held.
pub const NUDGE_STEP_FAST_PX: f64 = 10.0;

/// Nudges closer together than this share one history entry.
pub const NUDGE_COALESCE_MS: f64 = 700.0;

/// Number of undo snapshots retained.
pub const HISTORY_MAX: usize = 20;

// ── Strength ────────────────────────────────────────────────────

/// Strength slider maximum.
pub const STRENGTH_MAX: u32 = 32;

/// Strength below this is flagged as weak for blur / pixelate.
pub const STRENGTH_RECOMMENDED: u32 = 16;

/// Blur strength floor.
pub const STRENGTH_MIN_BLUR: u32 = 6;

/// Pixelate strength floor.
pub const STRENGTH_MIN_PIXELATE: u32 = 8;

// ── Hit-testing ─────────────────────────────────────────────────

/// Handle hit box edge in CSS pixels for mouse and pen.
pub const HANDLE_HIT_MOUSE_PX: f64 = 14.0;

/// Handle hit box edge in CSS pixels for touch.
pub const HANDLE_HIT_TOUCH_PX: f64 = 24.0;

/// Drawn handle edge in CSS pixels for mouse and pen.
pub const HANDLE_DRAW_MOUSE_PX: f64 = 10.0;

/// Drawn handle edge in CSS pixels for touch.
pub const HANDLE_DRAW_TOUCH_PX: f64 = 18.0;

// ── Touch ───────────────────────────────────────────────────────

/// Hold time before a touch press in add mode starts creating a mask.
pub const LONG_PRESS_MS: u32 = 280;

/// Movement in CSS pixels that cancels a pending long press.
pub const LONG_PRESS_MOVE_TOLERANCE_PX: f64 = 10.0;

// ── Image limits ────────────────────────────────────────────────

/// Soft ceiling on either side; larger images get a downscale proposal.
pub const MAX_EDIT_DIM: u32 = 9000;

/// Soft ceiling in megapixels.
pub const MAX_EDIT_MEGAPIXELS: f64 = 24.0;

/// Hard ceiling in megapixels; larger images are refused.
pub const HARD_MAX_MEGAPIXELS: f64 = 60.0;

/// Hard ceiling on either side, as a multiple of [`MAX_EDIT_DIM`].
pub const HARD_DIM_FACTOR: f64 = 1.6;

/// Smallest downscale factor ever proposed.
pub const MIN_DOWNSCALE: f64 = 0.15;

/// Extra padding around a blur region, on top of the blur radius.
pub const BLUR_PAD_PX: u32 = 24;

// ── Preview ─────────────────────────────────────────────────────

/// Preview zoom lower bound in percent.
pub const PREVIEW_ZOOM_MIN_PERCENT: f64 = 100.0;

/// Preview zoom upper bound in percent.
pub const PREVIEW_ZOOM_MAX_PERCENT: f64 = 400.0;

/// Preview zoom button step in percent.
pub const PREVIEW_ZOOM_STEP_PERCENT: f64 = 20.0;
