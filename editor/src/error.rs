//! Error types for image loading and export.
//!
//! Every variant maps to a localized [`Message`] with a remedy hint so the
//! host can show a short user-facing text instead of the raw error.

use std::fmt;

use crate::i18n::{Lang, Message};

/// Why an image was refused outright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TooLarge {
    /// One side exceeds the hard dimension ceiling.
    Dimension { limit: u32 },
    /// The pixel count exceeds the hard megapixel ceiling.
    Megapixels { limit: f64 },
}

impl fmt::Display for TooLarge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension { limit } => write!(f, "a side exceeds {limit}px"),
            Self::Megapixels { limit } => write!(f, "exceeds {limit}MP"),
        }
    }
}

/// Error returned by [`crate::loader::load`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// The sniffed content type is not PNG, JPEG or WebP.
    #[error("unsupported image format: {mime}")]
    UnsupportedFormat { mime: String },
    /// The image is beyond the hard ceiling; editing is not attempted.
    #[error("image too large: {width}x{height} ({reason})")]
    ImageTooLarge { width: u32, height: u32, reason: TooLarge },
    /// The bytes could not be decoded.
    #[error("failed to decode image: {0}")]
    DecodeFailure(String),
}

impl LoadError {
    /// The localized message for this error.
    #[must_use]
    pub fn message(&self) -> Message {
        match self {
            Self::UnsupportedFormat { .. } => Message::UnsupportedFormat,
            Self::ImageTooLarge { reason: TooLarge::Dimension { .. }, .. } => Message::TooLargeDimension,
            Self::ImageTooLarge { reason: TooLarge::Megapixels { limit }, .. } => {
                Message::TooLargeMegapixels { limit: *limit }
            }
            Self::DecodeFailure(_) => Message::DecodeFailure,
        }
    }

    /// Short user-facing text with a remedy.
    #[must_use]
    pub fn user_message(&self, lang: Lang) -> String {
        self.message().text(lang)
    }
}

/// Error returned by the export path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// Nothing is loaded.
    #[error("no image loaded")]
    NoImage,
    /// Export was requested without an open preview.
    #[error("preview is not open")]
    NoPreview,
    /// The preview was not confirmed as unreadable.
    #[error("preview not verified")]
    NotVerified,
    /// PNG encoding failed, typically under memory pressure.
    #[error("failed to encode PNG: {0}")]
    Encoding(String),
}

impl ExportError {
    /// The localized message for this error.
    #[must_use]
    pub fn message(&self) -> Message {
        match self {
            Self::NoImage => Message::NoImage,
            Self::NoPreview => Message::PreviewRequired,
            Self::NotVerified => Message::NotVerified,
            Self::Encoding(_) => Message::ExportEncodingFailure,
        }
    }

    /// Short user-facing text with a remedy.
    #[must_use]
    pub fn user_message(&self, lang: Lang) -> String {
        self.message().text(lang)
    }
}
