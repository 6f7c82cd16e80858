//! Product details flow: three related fields travel through one translation
//! call as a single percent-escaped, newline-joined payload and are split back
//! apart per target language.
//!
//! Payload layout: `name \n internalTitle \n id`, percent-escaped as a whole.
//! Decoding requires exactly three segments; anything else is a malformed
//! response rather than a partially filled product.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TranslateError, TranslateResult};
use crate::translate::{ByLanguage, TranslationService};

pub const FIELD_SEPARATOR: char = '\n';
pub const FIELD_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub name: String,
    pub internal_title: String,
    pub id: String,
}

/// Body of `POST /translateProduct`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub internal_title: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_langs: Vec<String>,
}

pub type ProductTranslations = ByLanguage<ProductDetails>;

/// Join the three fields and percent-escape the result so it survives as one
/// opaque `text` value.
pub fn encode(name: &str, internal_title: &str, id: &str) -> String {
    let joined = format!("{name}{FIELD_SEPARATOR}{internal_title}{FIELD_SEPARATOR}{id}");
    urlencoding::encode(&joined).into_owned()
}

/// Reverse [`encode`] on translated text and normalize the id segment.
pub fn decode(translated: &str) -> TranslateResult<ProductDetails> {
    let decoded = urlencoding::decode(translated).map_err(|e| {
        TranslateError::MalformedResponse(format!("payload is not valid UTF-8 after unescaping: {e}"))
    })?;

    let parts: Vec<&str> = decoded.split(FIELD_SEPARATOR).collect();
    let [name, internal_title, id] = parts.as_slice() else {
        return Err(TranslateError::MalformedResponse(format!(
            "expected {FIELD_COUNT} product fields, got {}",
            parts.len()
        )));
    };

    Ok(ProductDetails {
        name: name.to_string(),
        internal_title: internal_title.to_string(),
        id: normalize_id(id),
    })
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn disallowed_id_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9-]").unwrap())
}

/// Turn arbitrary text into a URL slug: lowercase, fold the Baltic letters
/// ė ę į č ą ū to ASCII, join words with a hyphen, then drop everything
/// outside `[a-z0-9-]`.
///
/// Whitespace runs become a hyphen instead of being dropped, so
/// `"Vairuotojo Kėdė"` yields `vairuotojo-kede`, not `vairuotojokede`.
pub fn normalize_id(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'ė' | 'ę' => 'e',
            'į' => 'i',
            'č' => 'c',
            'ą' => 'a',
            'ū' => 'u',
            other => other,
        })
        .collect();
    let hyphenated = whitespace_runs().replace_all(&folded, "-");
    disallowed_id_chars().replace_all(&hyphenated, "").into_owned()
}

fn validate_fields(req: &ProductRequest) -> TranslateResult<()> {
    for (label, value) in [
        ("name", &req.name),
        ("internalTitle", &req.internal_title),
        ("id", &req.id),
    ] {
        if value.trim().is_empty() {
            return Err(TranslateError::validation(format!(
                "Product {label} is required."
            )));
        }
        if value.contains(FIELD_SEPARATOR) {
            return Err(TranslateError::validation(format!(
                "Product {label} must be a single line."
            )));
        }
    }
    Ok(())
}

/// Translate a product into every target language through `service` and
/// decode each result. Any malformed translation fails the whole request.
pub async fn translate_product(
    service: &TranslationService,
    req: &ProductRequest,
) -> TranslateResult<ProductTranslations> {
    validate_fields(req)?;

    let payload = encode(&req.name, &req.internal_title, &req.id);
    let translations = service
        .translate(&payload, req.source_lang.as_deref(), &req.target_langs)
        .await?;

    let mut products = ProductTranslations::default();
    for (lang, text) in translations {
        let details = decode(&text).map_err(|e| {
            TranslateError::MalformedResponse(format!("{lang}: {e}"))
        })?;
        debug!(target_lang = %lang, id = %details.id, "decoded product translation");
        products.insert(lang, details);
    }
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsRegistry;
    use crate::translate::Translator;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Identity;

    #[async_trait]
    impl Translator for Identity {
        fn name(&self) -> &'static str {
            "identity"
        }

        async fn translate(&self, text: &str, _: Option<&str>, _: &str) -> TranslateResult<String> {
            Ok(text.to_string())
        }
    }

    /// Loses the escaping and one line break, as a careless model might.
    struct LineDropper;

    #[async_trait]
    impl Translator for LineDropper {
        fn name(&self) -> &'static str {
            "line-dropper"
        }

        async fn translate(&self, text: &str, _: Option<&str>, _: &str) -> TranslateResult<String> {
            let plain = urlencoding::decode(text).unwrap().into_owned();
            Ok(plain.replacen('\n', " ", 1))
        }
    }

    fn service(backend: Arc<dyn Translator>) -> TranslationService {
        TranslationService::new(backend, Arc::new(MetricsRegistry::new()))
    }

    fn request(name: &str, internal_title: &str, id: &str, targets: &[&str]) -> ProductRequest {
        ProductRequest {
            name: name.into(),
            internal_title: internal_title.into(),
            id: id.into(),
            source_lang: Some("lt".into()),
            target_langs: targets.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn normalize_id_folds_lowercases_and_strips() {
        assert_eq!(normalize_id("Vairuotojo Kėdė"), "vairuotojo-kede");
        assert_eq!(normalize_id("Vairuotojo-Kėdė"), "vairuotojo-kede");
        assert_eq!(normalize_id("  car \t monkey "), "car-monkey");
        assert_eq!(normalize_id("ĄČĘĖĮŪ"), "aceeiu");
        assert_eq!(normalize_id("car_monkey/2024!"), "carmonkey2024");
        assert_eq!(normalize_id("šūvis"), "uvis");
        assert_eq!(normalize_id(""), "");
    }

    #[test]
    fn normalize_id_is_idempotent_and_url_safe() {
        let slug = Regex::new(r"^[a-z0-9-]*$").unwrap();
        for input in [
            "Vairuotojo Kėdė",
            "Ąžuolas & Co.",
            "  MiXeD--Case 42 ",
            "日本語",
            "ñandú-ÇA",
            "İstanbul",
        ] {
            let once = normalize_id(input);
            assert!(slug.is_match(&once), "{input:?} -> {once:?}");
            assert_eq!(normalize_id(&once), once, "{input:?}");
        }
    }

    #[test]
    fn encoded_payload_is_a_single_opaque_line() {
        let payload = encode("Widget", "WID-01", "Vairuotojo Kėdė");
        assert!(!payload.contains('\n'));
        assert!(!payload.contains(' '));
        assert!(payload.contains("%0A"));
    }

    #[test]
    fn decode_reverses_encode_with_normalized_id() {
        let details = decode(&encode("Widget", "WID-01", "Vairuotojo Kėdė")).unwrap();
        assert_eq!(
            details,
            ProductDetails {
                name: "Widget".into(),
                internal_title: "WID-01".into(),
                id: "vairuotojo-kede".into(),
            }
        );
    }

    #[test]
    fn decode_rejects_wrong_segment_counts() {
        for text in ["only%20one", "two%0Aparts", "a%0Ab%0Ac%0Ad", ""] {
            let err = decode(text).unwrap_err();
            assert!(matches!(err, TranslateError::MalformedResponse(_)), "{text:?}");
        }
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let err = decode("%FF%0Ab%0Ac").unwrap_err();
        assert!(matches!(err, TranslateError::MalformedResponse(_)));
    }

    #[test]
    fn empty_segments_are_kept() {
        let details = decode("%0A%0A").unwrap();
        assert_eq!(details.name, "");
        assert_eq!(details.internal_title, "");
        assert_eq!(details.id, "");
    }

    #[tokio::test]
    async fn identity_backend_round_trips_every_language() {
        let svc = service(Arc::new(Identity));
        let products = translate_product(
            &svc,
            &request("Widget", "WID-01", "Vairuotojo-Kėdė", &["de", "lv"]),
        )
        .await
        .unwrap();

        assert_eq!(products.len(), 2);
        for lang in ["de", "lv"] {
            let p = products.get(lang).unwrap();
            assert_eq!(p.name, "Widget");
            assert_eq!(p.internal_title, "WID-01");
            assert_eq!(p.id, "vairuotojo-kede");
        }
    }

    #[tokio::test]
    async fn lost_separator_is_reported_as_malformed() {
        let svc = service(Arc::new(LineDropper));
        let err = translate_product(&svc, &request("Widget", "WID-01", "w-1", &["de"]))
            .await
            .unwrap_err();
        match err {
            TranslateError::MalformedResponse(msg) => assert!(msg.starts_with("de:"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_or_multiline_fields_are_rejected() {
        let svc = service(Arc::new(Identity));
        for req in [
            request("", "WID-01", "w", &["de"]),
            request("Widget", "WID\n01", "w", &["de"]),
            request("Widget", "WID-01", " ", &["de"]),
            request("Widget", "WID-01", "w", &[]),
        ] {
            let err = translate_product(&svc, &req).await.unwrap_err();
            assert!(matches!(err, TranslateError::Validation(_)), "{req:?}");
        }
    }
}
