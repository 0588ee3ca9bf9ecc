//! Editor configuration assembled from defaults and environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{
    BLUR_PAD_PX, HARD_DIM_FACTOR, HARD_MAX_MEGAPIXELS, HISTORY_MAX, LONG_PRESS_MS, MAX_EDIT_DIM, MAX_EDIT_MEGAPIXELS,
    MIN_MASK_SIZE_PX, SNAP_TOLERANCE_PX,
};
use crate::doc::{MaskRules, StrengthRules};
use crate::i18n::Lang;
use crate::input::TouchRules;
use crate::loader::Limits;

/// Every tunable the editor core reads.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub limits: Limits,
    pub masks: MaskRules,
    pub strength: StrengthRules,
    pub touch: TouchRules,
    pub history_max: usize,
    /// Language override. `None` defers to the host's language store.
    pub lang: Option<Lang>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            masks: MaskRules::default(),
            strength: StrengthRules::default(),
            touch: TouchRules::default(),
            history_max: HISTORY_MAX,
            lang: None,
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `REDACT_MAX_DIM`: soft ceiling on either side (default 9000)
    /// - `REDACT_MAX_EDIT_MP`: soft ceiling in megapixels (default 24)
    /// - `REDACT_HARD_MAX_MP`: hard ceiling in megapixels (default 60)
    /// - `REDACT_BLUR_PAD_PX`: blur region padding (default 24)
    /// - `REDACT_SNAP_PX`: snapping tolerance (default 8)
    /// - `REDACT_MIN_MASK_PX`: minimum mask size (default 12)
    /// - `REDACT_LONG_PRESS_MS`: touch long-press delay (default 280)
    /// - `REDACT_HISTORY_MAX`: undo depth (default 20)
    /// - `REDACT_LANG`: `ja` or `en`
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let limits = Limits {
            max_edit_dim: env_parse("REDACT_MAX_DIM", MAX_EDIT_DIM),
            max_edit_megapixels: env_parse("REDACT_MAX_EDIT_MP", MAX_EDIT_MEGAPIXELS),
            hard_max_megapixels: env_parse("REDACT_HARD_MAX_MP", HARD_MAX_MEGAPIXELS),
            hard_dim_factor: HARD_DIM_FACTOR,
            blur_pad_px: env_parse("REDACT_BLUR_PAD_PX", BLUR_PAD_PX),
            ..defaults.limits
        };
        let masks = MaskRules {
            min_size: env_parse("REDACT_MIN_MASK_PX", MIN_MASK_SIZE_PX).max(1.0),
            snap_tolerance: env_parse("REDACT_SNAP_PX", SNAP_TOLERANCE_PX).max(0.0),
            ..defaults.masks
        };
        let touch = TouchRules { long_press_ms: env_parse("REDACT_LONG_PRESS_MS", LONG_PRESS_MS), ..defaults.touch };
        let history_max = env_parse("REDACT_HISTORY_MAX", HISTORY_MAX).max(1);
        let lang = match std::env::var("REDACT_LANG") {
            Ok(tag) if !tag.trim().is_empty() => Some(Lang::from_tag(&tag)),
            _ => None,
        };

        Self { limits, masks, strength: defaults.strength, touch, history_max, lang }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
