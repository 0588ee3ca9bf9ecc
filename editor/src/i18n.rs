//! Japanese / English user-facing texts.
//!
//! The language preference itself is persisted by the host; the core only sees
//! it through the [`LangStore`] get/set pair.

#[cfg(test)]
#[path = "i18n_test.rs"]
mod i18n_test;

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    Ja,
    #[default]
    En,
}

impl Lang {
    /// Pick a language from a locale tag such as `"ja-JP"` or `"en-US"`.
    ///
    /// Anything that does not start with `ja` maps to English.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().to_ascii_lowercase().starts_with("ja") { Self::Ja } else { Self::En }
    }

    /// Two-letter code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Ja => "ja",
            Self::En => "en",
        }
    }
}

/// Host-side persistence of the language preference.
pub trait LangStore {
    fn get_lang(&self) -> Option<Lang>;
    fn set_lang(&mut self, lang: Lang);
}

/// In-memory [`LangStore`], for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLangStore {
    lang: Option<Lang>,
}

impl MemoryLangStore {
    #[must_use]
    pub fn new(lang: Option<Lang>) -> Self {
        Self { lang }
    }
}

impl LangStore for MemoryLangStore {
    fn get_lang(&self) -> Option<Lang> {
        self.lang
    }

    fn set_lang(&mut self, lang: Lang) {
        self.lang = Some(lang);
    }
}

/// Every user-facing text the core produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    UnsupportedFormat,
    TooLargeDimension,
    TooLargeMegapixels { limit: f64 },
    DecodeFailure,
    ExportEncodingFailure,
    NoImage,
    PreviewRequired,
    NotVerified,
    VerifyCheckbox,
    WeakStrength { recommended: u32 },
    WeakMasksInPreview { count: usize, recommended: u32 },
    DownscalePrompt { from_w: u32, from_h: u32, from_mp: f64, to_w: u32, to_h: u32, to_mp: f64 },
    ScaledExport { width: u32, height: u32, megapixels: f64 },
    ConfirmDelete,
    ConfirmClearMasks,
    ConfirmResetAll,
    NothingToUndo,
}

impl Message {
    /// Render the message in `lang`.
    #[must_use]
    pub fn text(&self, lang: Lang) -> String {
        match lang {
            Lang::Ja => self.ja(),
            Lang::En => self.en(),
        }
    }

    fn ja(&self) -> String {
        match self {
            Self::UnsupportedFormat => "PNG / JPG / WebP のみ対応です。別の形式で保存し直してください。".into(),
            Self::TooLargeDimension => {
                "画像が大きすぎます（片辺が上限を超えています）。別の画像を選ぶか、先に縮小してください。".into()
            }
            Self::TooLargeMegapixels { limit } => {
                format!("画像が大きすぎます（{limit}MP を超えています）。別の画像を選ぶか、先に縮小してください。")
            }
            Self::DecodeFailure => "画像の読み込みに失敗しました。別の形式で試してください。".into(),
            Self::ExportEncodingFailure => "PNG生成に失敗しました。画像が大きすぎる可能性があります。小さめの画像で試すか、読み込み時に縮小を選んでください。".into(),
            Self::NoImage => "画像が読み込まれていません。".into(),
            Self::PreviewRequired => {
                "事故防止のため、保存はプレビュー（確認チェック）経由にしています。".into()
            }
            Self::NotVerified => "チェックを入れてから保存できます。".into(),
            Self::VerifyCheckbox => {
                "保存前に、隠したい情報が“確実に見えない”ことをズームして確認しました。".into()
            }
            Self::WeakStrength { recommended } => {
                format!("注意：強度が弱いと“ぼかしたつもり事故”が起きやすいです。推奨は {recommended} 以上。")
            }
            Self::WeakMasksInPreview { count, recommended } => format!(
                "注意：ぼかし/モザイクの強度が弱い領域が {count} 件あります（推奨 {recommended}+）。ズームで確認するか、自動で引き上げてください。"
            ),
            Self::DownscalePrompt { from_w, from_h, from_mp, to_w, to_h, to_mp } => format!(
                "この画像は大きめです（{from_w}×{from_h} / 約{from_mp:.1}MP）。編集用に縮小しますか？ → {to_w}×{to_h}（約{to_mp:.1}MP）。元画像は変更しません。"
            ),
            Self::ScaledExport { width, height, megapixels } => format!(
                "安定動作のため、今回の書き出しは縮小PNGになります：{width}×{height}（約{megapixels:.1}MP）。元の解像度が必要な場合は、より小さい画像で試してください。"
            ),
            Self::ConfirmDelete => "この領域を削除しますか？".into(),
            Self::ConfirmClearMasks => "マスク領域をすべて削除しますか？".into(),
            Self::ConfirmResetAll => "画像も含めて全リセットしますか？".into(),
            Self::NothingToUndo => "戻せる操作がありません".into(),
        }
    }

    fn en(&self) -> String {
        match self {
            Self::UnsupportedFormat => "Only PNG/JPG/WebP are supported. Re-save the image in one of these formats.".into(),
            Self::TooLargeDimension => {
                "Image is too large (dimension exceeds hard limit). Pick another image or downscale it first.".into()
            }
            Self::TooLargeMegapixels { limit } => {
                format!("Image is too large (exceeds {limit}MP). Pick another image or downscale it first.")
            }
            Self::DecodeFailure => "Failed to load image. Try another format.".into(),
            Self::ExportEncodingFailure => "Failed to generate PNG. The image may be too large. Try a smaller image or choose downscale at load.".into(),
            Self::NoImage => "No image loaded.".into(),
            Self::PreviewRequired => {
                "For safety, saving is only available via Preview (with confirmation checkbox).".into()
            }
            Self::NotVerified => "Check the box before saving.".into(),
            Self::VerifyCheckbox => {
                "Before saving, I zoomed in and confirmed the sensitive info is truly unreadable.".into()
            }
            Self::WeakStrength { recommended } => {
                format!("Warning: Low strength can cause accidental exposure. Recommended: {recommended}+.")
            }
            Self::WeakMasksInPreview { count, recommended } => format!(
                "Warning: {count} blur/pixelate mask(s) are weak (recommended {recommended}+). Zoom to verify, or auto-boost to reduce risk."
            ),
            Self::DownscalePrompt { from_w, from_h, from_mp, to_w, to_h, to_mp } => format!(
                "Large image detected ({from_w}×{from_h} / ~{from_mp:.1}MP). Downscale for safer editing? → {to_w}×{to_h} (~{to_mp:.1}MP). The original file is not modified."
            ),
            Self::ScaledExport { width, height, megapixels } => format!(
                "For stability, this export will be a downscaled PNG: {width}×{height} (~{megapixels:.1}MP). If you need full-res export, use a smaller image or choose downscale at load."
            ),
            Self::ConfirmDelete => "Delete this mask?".into(),
            Self::ConfirmClearMasks => "Remove all masks?".into(),
            Self::ConfirmResetAll => "Reset everything including the image?".into(),
            Self::NothingToUndo => "Nothing to undo".into(),
        }
    }
}
