use super::*;

// =============================================================
// Lang
// =============================================================

#[test]
fn from_tag_japanese_variants() {
    assert_eq!(Lang::from_tag("ja"), Lang::Ja);
    assert_eq!(Lang::from_tag("ja-JP"), Lang::Ja);
    assert_eq!(Lang::from_tag("JA_jp"), Lang::Ja);
}

#[test]
fn from_tag_everything_else_is_english() {
    assert_eq!(Lang::from_tag("en-US"), Lang::En);
    assert_eq!(Lang::from_tag("fr"), Lang::En);
    assert_eq!(Lang::from_tag(""), Lang::En);
}

#[test]
fn default_is_english() {
    assert_eq!(Lang::default(), Lang::En);
    assert_eq!(Lang::En.code(), "en");
    assert_eq!(Lang::Ja.code(), "ja");
}

// =============================================================
// LangStore
// =============================================================

#[test]
fn memory_store_round_trip() {
    let mut store = MemoryLangStore::default();
    assert_eq!(store.get_lang(), None);
    store.set_lang(Lang::Ja);
    assert_eq!(store.get_lang(), Some(Lang::Ja));
}

// =============================================================
// Message
// =============================================================

#[test]
fn messages_differ_by_language() {
    let m = Message::ConfirmDelete;
    assert_eq!(m.text(Lang::En), "Delete this mask?");
    assert_ne!(m.text(Lang::Ja), m.text(Lang::En));
}

#[test]
fn messages_interpolate_values() {
    let m = Message::WeakMasksInPreview { count: 3, recommended: 16 };
    let en = m.text(Lang::En);
    assert!(en.contains('3'));
    assert!(en.contains("16+"));
    assert!(m.text(Lang::Ja).contains("16"));
}

#[test]
fn downscale_prompt_formats_megapixels() {
    let m = Message::DownscalePrompt { from_w: 8000, from_h: 6000, from_mp: 48.0, to_w: 5657, to_h: 4243, to_mp: 24.0 };
    let en = m.text(Lang::En);
    assert!(en.contains("8000×6000"));
    assert!(en.contains("~48.0MP"));
    assert!(en.contains("5657×4243"));
}

#[test]
fn error_messages_carry_a_remedy() {
    assert!(Message::UnsupportedFormat.text(Lang::En).contains("Re-save"));
    assert!(Message::TooLargeMegapixels { limit: 60.0 }.text(Lang::En).contains("60MP"));
    assert!(Message::ExportEncodingFailure.text(Lang::En).contains("smaller image"));
}
