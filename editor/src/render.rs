//! Rendering: the export compositor and the editor overlay scene.
//!
//! [`compose`] burns masks into pixels. It receives read-only views of the
//! image and mask list and produces a new raster; it does not mutate any
//! editor state. Masks are applied in list order, each one sampling the result
//! of the masks before it, so a blur over a solid fill blurs the fill.
//!
//! [`scene`] produces the screen-space geometry the host draws on the editor
//! canvas: the image rectangle, tinted mask outlines, the active mask's handles
//! and the draft rectangle of a create-drag.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::camera::{Point, Viewport};
use crate::doc::{Bounds, DocStore, Mask, MaskId, MaskKind, Rect, StrengthRules};
use crate::hit::{ResizeAnchor, handle_draw_px};
use crate::input::{InputState, PointerKind};
use crate::loader::resample;

/// Opaque fill for solid masks.
const SOLID_FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Pixelate block edge range in pixels.
const PIXEL_BLOCK_MIN: u32 = 4;
const PIXEL_BLOCK_MAX: u32 = 40;
/// Block edge grows by this much across the full strength range.
const PIXEL_BLOCK_SPAN: f64 = 28.0;

/// Integer pixel rectangle inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    /// Round an edit-space rectangle into a raster of `out_w × out_h` that is
    /// `sx`/`sy` times the edit size. Returns `None` when nothing is left.
    #[must_use]
    pub fn from_scaled(r: Rect, sx: f64, sy: f64, out_w: u32, out_h: u32) -> Option<Self> {
        let round = |v: f64| if v <= 0.0 { 0 } else { v.round() as u32 };
        let x = round(r.x * sx).min(out_w);
        let y = round(r.y * sy).min(out_h);
        let w = round(r.w * sx).min(out_w - x);
        let h = round(r.h * sy).min(out_h - y);
        (w > 0 && h > 0).then_some(Self { x, y, w, h })
    }
}

/// Pixelate block edge for a strength value: `round(s / max * 28 + 4)`, kept in 4..=40.
#[must_use]
pub fn pixel_block(strength: u32, max_strength: u32) -> u32 {
    let block = (f64::from(strength) / f64::from(max_strength.max(1)) * PIXEL_BLOCK_SPAN + 4.0).round() as u32;
    block.clamp(PIXEL_BLOCK_MIN, PIXEL_BLOCK_MAX)
}

/// Strength scaled to the output raster, never below the kind's floor.
fn scaled_strength(kind: MaskKind, strength: u32, scale: f64, rules: &StrengthRules) -> u32 {
    let s = rules.normalize(kind, strength);
    let scaled = (f64::from(s) * scale).round() as u32;
    scaled.max(rules.floor(kind))
}

/// Burn `masks` into a copy of `image` at `export_scale`.
///
/// The result is `round(w * scale) × round(h * scale)`; scale 1.0 keeps the
/// edit size. Masks are given in edit-image pixels.
#[must_use]
pub fn compose(
    image: &RgbaImage,
    masks: &[Mask],
    export_scale: f64,
    rules: &StrengthRules,
    blur_pad_px: u32,
) -> RgbaImage {
    let (iw, ih) = image.dimensions();
    let mut out = if export_scale < 0.999 {
        resample(image, export_scale)
    } else {
        image.clone()
    };
    let (ow, oh) = out.dimensions();
    if masks.is_empty() || iw == 0 || ih == 0 {
        return out;
    }

    let sx = f64::from(ow) / f64::from(iw);
    let sy = f64::from(oh) / f64::from(ih);
    let bounds = Bounds::new(f64::from(iw), f64::from(ih));

    for mask in masks {
        let clamped = mask.rect().clamp_to(bounds);
        let Some(r) = PixelRect::from_scaled(clamped, sx, sy, ow, oh) else {
            continue;
        };
        match mask.kind {
            MaskKind::Solid => fill_solid(&mut out, r),
            MaskKind::Blur => {
                let radius = scaled_strength(MaskKind::Blur, mask.strength, sx.max(sy), rules);
                blur_region(&mut out, r, radius, blur_pad_px);
            }
            MaskKind::Pixelate => {
                let s = scaled_strength(MaskKind::Pixelate, mask.strength, sx.max(sy), rules);
                pixelate_region(&mut out, r, pixel_block(s, rules.max));
            }
        }
    }
    tracing::debug!(width = ow, height = oh, masks = masks.len(), "composed");
    out
}

/// Opaque black over `r`.
pub fn fill_solid(out: &mut RgbaImage, r: PixelRect) {
    for y in r.y..r.y + r.h {
        for x in r.x..r.x + r.w {
            out.put_pixel(x, y, SOLID_FILL);
        }
    }
}

/// Gaussian blur limited to `r`.
///
/// Only a padded window around the rectangle is blurred, so pixels just
/// outside the mask feed the kernel and the mask edge shows no seam. The
/// padding is `pad_px + radius`. Only the pixels inside `r` are written back.
pub fn blur_region(out: &mut RgbaImage, r: PixelRect, radius: u32, pad_px: u32) {
    let (ow, oh) = out.dimensions();
    let pad = pad_px.saturating_add(radius);
    let wx = r.x.saturating_sub(pad);
    let wy = r.y.saturating_sub(pad);
    let ex = (r.x + r.w).saturating_add(pad).min(ow);
    let ey = (r.y + r.h).saturating_add(pad).min(oh);

    let window = imageops::crop_imm(&*out, wx, wy, ex - wx, ey - wy).to_image();
    let blurred = imageops::blur(&window, radius as f32);
    let piece = imageops::crop_imm(&blurred, r.x - wx, r.y - wy, r.w, r.h).to_image();
    imageops::replace(out, &piece, i64::from(r.x), i64::from(r.y));
}

/// Average `r` down to a coarse grid of `block`-sized cells, then scale it
/// back up without smoothing.
pub fn pixelate_region(out: &mut RgbaImage, r: PixelRect, block: u32) {
    let block = block.max(1);
    let gw = (r.w / block).max(1);
    let gh = (r.h / block).max(1);

    let region = imageops::crop_imm(&*out, r.x, r.y, r.w, r.h).to_image();
    let coarse = imageops::resize(&region, gw, gh, FilterType::Triangle);
    let blocky = imageops::resize(&coarse, r.w, r.h, FilterType::Nearest);
    imageops::replace(out, &blocky, i64::from(r.x), i64::from(r.y));
}

// =============================================================
// Editor scene
// =============================================================

/// One mask as drawn on the editor canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskShape {
    pub id: MaskId,
    /// Screen-space rectangle.
    pub rect: Rect,
    pub kind: MaskKind,
    pub active: bool,
    /// Blur / pixelate below the recommended strength.
    pub weak: bool,
    /// Translucent tint (RGBA, straight alpha).
    pub fill: [u8; 4],
    /// Outline width in CSS pixels.
    pub stroke_px: f64,
}

/// A resize handle square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleShape {
    pub anchor: ResizeAnchor,
    /// Screen-space square.
    pub rect: Rect,
}

/// Everything the host draws on the editor canvas, in screen space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// Where the image lands on screen.
    pub image: Option<Rect>,
    /// In paint order.
    pub masks: Vec<MaskShape>,
    /// Handles of the active mask.
    pub handles: Vec<HandleShape>,
    /// Rectangle of an in-progress create-drag.
    pub draft: Option<Rect>,
}

fn tint(kind: MaskKind) -> [u8; 4] {
    match kind {
        MaskKind::Solid => [0, 0, 0, 140],
        MaskKind::Blur => [59, 130, 246, 46],
        MaskKind::Pixelate => [245, 158, 11, 46],
    }
}

fn to_screen(viewport: &Viewport, r: Rect) -> Rect {
    let origin = viewport.image_to_screen(Point::new(r.x, r.y));
    Rect::new(origin.x, origin.y, r.w * viewport.scale, r.h * viewport.scale)
}

/// Build the editor scene.
#[must_use]
pub fn scene(doc: &DocStore, viewport: &Viewport, input: &InputState, pointer: PointerKind) -> Scene {
    let bounds = doc.bounds();
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return Scene::default();
    }
    let rules = doc.strength_rules();
    let active = doc.active_id();

    let masks = doc
        .masks()
        .iter()
        .map(|m| {
            let is_active = active == Some(m.id);
            MaskShape {
                id: m.id,
                rect: to_screen(viewport, m.rect()),
                kind: m.kind,
                active: is_active,
                weak: rules.is_weak(m.kind, m.strength),
                fill: tint(m.kind),
                stroke_px: if is_active { 2.0 } else { 1.0 },
            }
        })
        .collect();

    let size = handle_draw_px(pointer);
    let handles = match doc.active() {
        Some(m) => ResizeAnchor::ALL
            .into_iter()
            .map(|anchor| {
                let c = viewport.image_to_screen(anchor.point_on(m.rect()));
                HandleShape { anchor, rect: Rect::new(c.x - size / 2.0, c.y - size / 2.0, size, size) }
            })
            .collect(),
        None => Vec::new(),
    };

    Scene {
        image: Some(to_screen(viewport, Rect::new(0.0, 0.0, bounds.width, bounds.height))),
        masks,
        handles,
        draft: input.draft_rect().map(|r| to_screen(viewport, r.clamp_to(bounds))),
    }
}
