//! Local source-language detection.
//! Only used to name the source language in chat prompts when the caller
//! asked for auto-detection; the cloud backend detects on its own.

use crate::languages::{self, Language};

/// Detects the dominant language of `text` using whatlang.
/// Returns an entry from the supported set, or None if detection is
/// unreliable or lands outside it.
pub fn detect_language(text: &str) -> Option<&'static Language> {
    let info = whatlang::detect(text)?;
    if !info.is_reliable() {
        return None;
    }
    lang_to_code(info.lang()).and_then(languages::find)
}

fn lang_to_code(lang: whatlang::Lang) -> Option<&'static str> {
    use whatlang::Lang::*;
    let code = match lang {
        Deu => "de",
        Lav => "lv",
        Ita => "it",
        Pol => "pl",
        Eng => "en",
        Spa => "es",
        Fra => "fr",
        Lit => "lt",
        _ => return None,
    };
    Some(code)
}
