//! Gated export: preview, verification checkbox, PNG encoding, file naming.
//!
//! A [`Preview`] holds the fully composited result at export scale. Nothing
//! can be written until the user has looked at it and ticked the
//! verification box; [`Preview::export`] refuses otherwise.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use time::OffsetDateTime;

use crate::consts::{PREVIEW_ZOOM_MAX_PERCENT, PREVIEW_ZOOM_MIN_PERCENT, PREVIEW_ZOOM_STEP_PERCENT};
use crate::doc::{MaskId, Rect};
use crate::error::ExportError;
use crate::i18n::Message;
use crate::loader::{ImageBuffer, Limits, megapixels};

/// Scales at or above this count as full size.
const FULL_SCALE: f64 = 0.999;

/// Export scale relative to the edit image.
///
/// When the original was beyond the soft ceiling and the user kept it at
/// full size, export is reduced to what the soft ceiling allows. Otherwise 1.
#[must_use]
pub fn export_scale_for(image: &ImageBuffer, limits: &Limits) -> f64 {
    if image.oversized_original(limits) {
        let s = limits.suggest_edit_scale(image.edit_width(), image.edit_height());
        if s < FULL_SCALE {
            return s;
        }
    }
    1.0
}

/// The composited result awaiting verification.
#[derive(Debug, Clone)]
pub struct Preview {
    image: RgbaImage,
    export_scale: f64,
    verified: bool,
    zoom_percent: f64,
    weak: Vec<MaskId>,
    recommended: u32,
}

impl Preview {
    /// A fresh preview: unverified, 100% zoom.
    #[must_use]
    pub fn new(image: RgbaImage, export_scale: f64, weak: Vec<MaskId>, recommended: u32) -> Self {
        Self { image, export_scale, verified: false, zoom_percent: PREVIEW_ZOOM_MIN_PERCENT, weak, recommended }
    }

    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub fn export_scale(&self) -> f64 {
        self.export_scale
    }

    /// Export is below edit resolution.
    #[must_use]
    pub fn is_scaled(&self) -> bool {
        self.export_scale < FULL_SCALE
    }

    #[must_use]
    pub fn verified(&self) -> bool {
        self.verified
    }

    /// Tick or untick "I verified this is unreadable".
    pub fn set_verified(&mut self, verified: bool) {
        self.verified = verified;
    }

    #[must_use]
    pub fn zoom_percent(&self) -> f64 {
        self.zoom_percent
    }

    /// Set preview zoom, clamped to 100–400%.
    pub fn set_zoom_percent(&mut self, percent: f64) {
        self.zoom_percent = if percent.is_finite() {
            percent.clamp(PREVIEW_ZOOM_MIN_PERCENT, PREVIEW_ZOOM_MAX_PERCENT)
        } else {
            PREVIEW_ZOOM_MIN_PERCENT
        };
    }

    /// Zoom in (`steps > 0`) or out by 20% per step.
    pub fn zoom_step(&mut self, steps: i32) {
        self.set_zoom_percent(self.zoom_percent + f64::from(steps) * PREVIEW_ZOOM_STEP_PERCENT);
    }

    /// Source rectangle to draw: a centered crop of `1 / zoom` of the image.
    #[must_use]
    pub fn view_rect(&self) -> Rect {
        let z = self.zoom_percent / 100.0;
        let (w, h) = (f64::from(self.width()), f64::from(self.height()));
        let (vw, vh) = (w / z, h / z);
        Rect::new(((w - vw) / 2.0).max(0.0), ((h - vh) / 2.0).max(0.0), vw, vh)
    }

    /// Weak blur / pixelate masks found when the preview was built.
    #[must_use]
    pub fn weak_masks(&self) -> &[MaskId] {
        &self.weak
    }

    /// Warning to show above the preview, if any mask is weak.
    #[must_use]
    pub fn weak_warning(&self) -> Option<Message> {
        (!self.weak.is_empty())
            .then_some(Message::WeakMasksInPreview { count: self.weak.len(), recommended: self.recommended })
    }

    /// Disclosure for a reduced-resolution export.
    #[must_use]
    pub fn scaled_notice(&self) -> Option<Message> {
        self.is_scaled().then(|| Message::ScaledExport {
            width: self.width(),
            height: self.height(),
            megapixels: megapixels(self.width(), self.height()),
        })
    }

    /// Encode the verified preview as a PNG file named after `at`.
    ///
    /// # Errors
    ///
    /// [`ExportError::NotVerified`] until the box is ticked;
    /// [`ExportError::Encoding`] if the encoder fails.
    pub fn export(&self, at: OffsetDateTime) -> Result<ExportedFile, ExportError> {
        if !self.verified {
            return Err(ExportError::NotVerified);
        }
        let bytes = encode_png(&self.image)?;
        let file = ExportedFile {
            name: file_name(at, self.is_scaled()),
            bytes,
            width: self.width(),
            height: self.height(),
            scaled: self.is_scaled(),
        };
        tracing::info!(name = %file.name, width = file.width, height = file.height, size = file.bytes.len(), "exported");
        Ok(file)
    }
}

/// A finished PNG ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub scaled: bool,
}

/// Encode RGBA pixels as PNG.
///
/// # Errors
///
/// [`ExportError::Encoding`] when the encoder fails; no partial bytes are returned.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        .map_err(|e| {
            tracing::warn!(error = %e, width = img.width(), height = img.height(), "png encoding failed");
            ExportError::Encoding(e.to_string())
        })?;
    Ok(buf)
}

/// `redacted-YYYYMMDD-HHMMSS.png`, with `-scaled` before the extension for a
/// reduced-resolution export.
#[must_use]
pub fn file_name(at: OffsetDateTime, scaled: bool) -> String {
    format!(
        "redacted-{:04}{:02}{:02}-{:02}{:02}{:02}{}.png",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second(),
        if scaled { "-scaled" } else { "" }
    )
}
