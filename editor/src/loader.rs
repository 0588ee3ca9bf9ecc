//! Image loader: content sniffing, size guards, downscale proposal, decode.
//!
//! The pipeline fails as early as possible. Format is decided from magic bytes
//! (never from a file name), dimensions are read from the header before any
//! pixel is decoded, and images beyond the hard ceiling are refused outright.
//! Images beyond the soft ceiling get a [`DownscaleProposal`] that the caller
//! accepts or declines; the original bytes are never modified.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageReader, RgbaImage};

use crate::consts::{
    BLUR_PAD_PX, HARD_DIM_FACTOR, HARD_MAX_MEGAPIXELS, MAX_EDIT_DIM, MAX_EDIT_MEGAPIXELS, MIN_DOWNSCALE,
};
use crate::doc::Rect;
use crate::error::{LoadError, TooLarge};
use crate::i18n::Message;

/// Scales at or above this count as "no downscale".
const FULL_SCALE: f64 = 0.999;

/// Size ceilings and related tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Soft ceiling on either side in pixels.
    pub max_edit_dim: u32,
    /// Soft ceiling in megapixels.
    pub max_edit_megapixels: f64,
    /// Hard ceiling in megapixels.
    pub hard_max_megapixels: f64,
    /// Hard side ceiling is `max_edit_dim * hard_dim_factor`.
    pub hard_dim_factor: f64,
    /// Lower bound for any proposed scale.
    pub min_downscale: f64,
    /// Extra blur region padding in pixels.
    pub blur_pad_px: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_edit_dim: MAX_EDIT_DIM,
            max_edit_megapixels: MAX_EDIT_MEGAPIXELS,
            hard_max_megapixels: HARD_MAX_MEGAPIXELS,
            hard_dim_factor: HARD_DIM_FACTOR,
            min_downscale: MIN_DOWNSCALE,
            blur_pad_px: BLUR_PAD_PX,
        }
    }
}

impl Limits {
    /// Why `width × height` is refused, if it is.
    #[must_use]
    pub fn hard_reject(&self, width: u32, height: u32) -> Option<TooLarge> {
        let hard_dim = f64::from(self.max_edit_dim) * self.hard_dim_factor;
        if f64::from(width) > hard_dim || f64::from(height) > hard_dim {
            return Some(TooLarge::Dimension { limit: hard_dim.round() as u32 });
        }
        if megapixels(width, height) > self.hard_max_megapixels {
            return Some(TooLarge::Megapixels { limit: self.hard_max_megapixels });
        }
        None
    }

    /// Whether `width × height` is beyond the soft ceiling.
    #[must_use]
    pub fn exceeds_soft(&self, width: u32, height: u32) -> bool {
        width > self.max_edit_dim || height > self.max_edit_dim || megapixels(width, height) > self.max_edit_megapixels
    }

    /// Largest scale in `[min_downscale, 1]` that brings the image under the soft ceiling.
    #[must_use]
    pub fn suggest_edit_scale(&self, width: u32, height: u32) -> f64 {
        if width == 0 || height == 0 {
            return 1.0;
        }
        let mut s: f64 = 1.0;
        let max_dim = f64::from(self.max_edit_dim);
        if width > self.max_edit_dim || height > self.max_edit_dim {
            s = s.min((max_dim / f64::from(width)).min(max_dim / f64::from(height)));
        }
        let mp = megapixels(width, height);
        if mp > self.max_edit_megapixels {
            s = s.min((self.max_edit_megapixels / mp).sqrt());
        }
        s.clamp(self.min_downscale, 1.0)
    }
}

/// Pixel count in millions.
#[must_use]
pub fn megapixels(width: u32, height: u32) -> f64 {
    f64::from(width) * f64::from(height) / 1_000_000.0
}

/// `round(side * scale)`, at least one pixel.
#[must_use]
pub fn scaled_dim(side: u32, scale: f64) -> u32 {
    ((f64::from(side) * scale).round() as u32).max(1)
}

/// Accepted input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    fn codec(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Decide the format from magic bytes.
///
/// # Errors
///
/// [`LoadError::UnsupportedFormat`] for anything but PNG, JPEG and WebP.
pub fn sniff(bytes: &[u8]) -> Result<ImageFormat, LoadError> {
    let mime = infer::get(bytes).map_or("application/octet-stream", |kind| kind.mime_type());
    match mime {
        "image/png" => Ok(ImageFormat::Png),
        "image/jpeg" => Ok(ImageFormat::Jpeg),
        "image/webp" => Ok(ImageFormat::WebP),
        other => Err(LoadError::UnsupportedFormat { mime: other.to_owned() }),
    }
}

/// Read dimensions from the header without decoding pixels.
///
/// # Errors
///
/// [`LoadError::DecodeFailure`] when the header is unreadable.
pub fn probe(bytes: &[u8], format: ImageFormat) -> Result<(u32, u32), LoadError> {
    ImageReader::with_format(Cursor::new(bytes), format.codec())
        .into_dimensions()
        .map_err(|e| LoadError::DecodeFailure(e.to_string()))
}

/// Offer to edit a large image at reduced size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownscaleProposal {
    pub from_width: u32,
    pub from_height: u32,
    pub to_width: u32,
    pub to_height: u32,
    pub scale: f64,
}

impl DownscaleProposal {
    #[must_use]
    pub fn new(width: u32, height: u32, scale: f64) -> Self {
        Self {
            from_width: width,
            from_height: height,
            to_width: scaled_dim(width, scale),
            to_height: scaled_dim(height, scale),
            scale,
        }
    }

    /// The confirmation text to show the user.
    #[must_use]
    pub fn message(&self) -> Message {
        Message::DownscalePrompt {
            from_w: self.from_width,
            from_h: self.from_height,
            from_mp: megapixels(self.from_width, self.from_height),
            to_w: self.to_width,
            to_h: self.to_height,
            to_mp: megapixels(self.to_width, self.to_height),
        }
    }
}

/// What the size guards say about an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Editable at full size.
    Fits,
    /// Editable, but a downscale is proposed.
    Downscale(DownscaleProposal),
    /// Refused.
    TooLarge(TooLarge),
}

/// Header-level facts about an input, without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub verdict: Verdict,
}

impl ImageInfo {
    #[must_use]
    pub fn megapixels(&self) -> f64 {
        megapixels(self.width, self.height)
    }
}

/// Sniff and probe `bytes` and run the size guards.
///
/// # Errors
///
/// Unsupported format or unreadable header. Oversized images are reported in
/// the verdict, not as an error.
pub fn inspect(bytes: &[u8], limits: &Limits) -> Result<ImageInfo, LoadError> {
    let format = sniff(bytes)?;
    let (width, height) = probe(bytes, format)?;
    let verdict = if let Some(reason) = limits.hard_reject(width, height) {
        Verdict::TooLarge(reason)
    } else {
        let scale = limits.suggest_edit_scale(width, height);
        if scale < FULL_SCALE { Verdict::Downscale(DownscaleProposal::new(width, height, scale)) } else { Verdict::Fits }
    };
    Ok(ImageInfo { format, width, height, verdict })
}

/// The decoded image being edited.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pixels: RgbaImage,
    pub format: ImageFormat,
    pub original_width: u32,
    pub original_height: u32,
    /// The pixels were resampled at load time.
    pub downscale_applied: bool,
    /// `edit / original`; 1.0 when no downscale was applied.
    pub edit_scale: f64,
}

impl ImageBuffer {
    /// Wrap already-decoded pixels at full size.
    #[must_use]
    pub fn from_rgba(pixels: RgbaImage, format: ImageFormat) -> Self {
        let (w, h) = pixels.dimensions();
        Self { pixels, format, original_width: w, original_height: h, downscale_applied: false, edit_scale: 1.0 }
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    #[must_use]
    pub fn edit_width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn edit_height(&self) -> u32 {
        self.pixels.height()
    }

    /// The original was beyond the soft ceiling and was kept at full size.
    #[must_use]
    pub fn oversized_original(&self, limits: &Limits) -> bool {
        !self.downscale_applied && limits.exceeds_soft(self.original_width, self.original_height)
    }

    /// Map a rectangle from original-image pixels to edit pixels.
    #[must_use]
    pub fn original_to_edit(&self, r: Rect) -> Rect {
        let sx = f64::from(self.edit_width()) / f64::from(self.original_width.max(1));
        let sy = f64::from(self.edit_height()) / f64::from(self.original_height.max(1));
        r.scaled(sx, sy)
    }
}

/// Resample to `round(w * scale) × round(h * scale)` with a smoothing filter.
#[must_use]
pub fn resample(pixels: &RgbaImage, scale: f64) -> RgbaImage {
    let (w, h) = pixels.dimensions();
    imageops::resize(pixels, scaled_dim(w, scale), scaled_dim(h, scale), FilterType::Triangle)
}

/// Load an image for editing.
///
/// `confirm_downscale` is called only when the image is beyond the soft
/// ceiling; returning true resamples the pixels for editing.
///
/// # Errors
///
/// Unsupported format, hard-ceiling refusal, or decode failure.
pub fn load<F>(bytes: &[u8], limits: &Limits, confirm_downscale: F) -> Result<ImageBuffer, LoadError>
where
    F: FnOnce(&DownscaleProposal) -> bool,
{
    let info = inspect(bytes, limits)?;
    if let Verdict::TooLarge(reason) = info.verdict {
        tracing::warn!(width = info.width, height = info.height, %reason, "image refused");
        return Err(LoadError::ImageTooLarge { width: info.width, height: info.height, reason });
    }

    let accepted = match &info.verdict {
        Verdict::Downscale(proposal) => confirm_downscale(proposal).then_some(proposal.scale),
        Verdict::Fits | Verdict::TooLarge(_) => None,
    };

    let decoded = image::load_from_memory_with_format(bytes, info.format.codec())
        .map_err(|e| LoadError::DecodeFailure(e.to_string()))?
        .to_rgba8();

    let mut buffer = ImageBuffer::from_rgba(decoded, info.format);
    if let Some(scale) = accepted {
        buffer.pixels = resample(&buffer.pixels, scale);
        buffer.downscale_applied = true;
        buffer.edit_scale = scale;
    }

    tracing::info!(
        format = info.format.mime(),
        original_width = buffer.original_width,
        original_height = buffer.original_height,
        edit_width = buffer.edit_width(),
        edit_height = buffer.edit_height(),
        downscaled = buffer.downscale_applied,
        "image loaded"
    );
    Ok(buffer)
}
