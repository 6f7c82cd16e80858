//! Fixed language reference data and flag lookup.

use serde::Serialize;

/// A supported language: lowercase ISO 639-1 code plus display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

/// Supported languages, in the order the language picker shows them.
pub const LANGUAGES: &[Language] = &[
    Language { code: "de", name: "German" },
    Language { code: "lv", name: "Latvian" },
    Language { code: "it", name: "Italian" },
    Language { code: "pl", name: "Polish" },
    Language { code: "en", name: "English" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
    Language { code: "lt", name: "Lithuanian" },
];

/// Shown for any code outside the known set.
pub const PLACEHOLDER_FLAG: &str = "🏳️";

pub fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Display name for `code`, or the code itself when unknown.
pub fn display_name(code: &str) -> &str {
    find(code).map(|l| l.name).unwrap_or(code)
}

/// Map a language code to its flag glyph. Total: unknown codes get the placeholder.
pub fn flag_emoji(code: &str) -> &'static str {
    match code {
        "de" => "🇩🇪",
        "lv" => "🇱🇻",
        "it" => "🇮🇹",
        "pl" => "🇵🇱",
        "en" => "🇬🇧",
        "es" => "🇪🇸",
        "fr" => "🇫🇷",
        "lt" => "🇱🇹",
        _ => PLACEHOLDER_FLAG,
    }
}

/// Language entry as served by `GET /languages`.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

pub fn catalog() -> Vec<LanguageInfo> {
    LANGUAGES
        .iter()
        .map(|l| LanguageInfo {
            code: l.code,
            name: l.name,
            flag: flag_emoji(l.code),
        })
        .collect()
}
