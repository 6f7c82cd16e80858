//! Translation pipeline: request types, the backend adapter trait, and the
//! per-target-language fan-out shared by both HTTP endpoints.

pub mod aws;
pub mod detect;
pub mod glossary;
pub mod openai;
pub mod sigv4;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{TranslateError, TranslateResult};
use crate::metrics::{Metric, MetricsRegistry};

/// Body of `POST /translate` and `POST /translateAi`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_langs: Vec<String>,
}

/// Per-language results, kept in request order. Serializes as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByLanguage<T>(Vec<(String, T)>);

/// Translated text keyed by target language.
pub type Translations = ByLanguage<String>;

impl<T> ByLanguage<T> {
    pub fn get(&self, lang: &str) -> Option<&T> {
        self.0
            .iter()
            .find(|(code, _)| code == lang)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Last write wins for a repeated code.
    pub fn insert(&mut self, lang: String, value: T) {
        match self.0.iter_mut().find(|(code, _)| *code == lang) {
            Some(slot) => slot.1 = value,
            None => self.0.push((lang, value)),
        }
    }
}

impl<T> Default for ByLanguage<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> IntoIterator for ByLanguage<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<T: Serialize> Serialize for ByLanguage<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (lang, value) in &self.0 {
            map.serialize_entry(lang, value)?;
        }
        map.end()
    }
}

/// Adapter for a translation-capable provider.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Translate `text` into `target_lang`. `source_lang` is `None` when the
    /// provider (or the adapter) should detect it.
    async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslateResult<String>;
}

/// `None`, empty, and `"auto"` all mean "detect the source language".
pub fn explicit_source(source_lang: Option<&str>) -> Option<&str> {
    source_lang
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("auto"))
}

/// Reject a request before any backend call is made.
pub fn validate(text: &str, target_langs: &[String]) -> TranslateResult<()> {
    if text.trim().is_empty() {
        return Err(TranslateError::validation("Text is required."));
    }
    if target_langs.is_empty() {
        return Err(TranslateError::validation(
            "At least one target language is required.",
        ));
    }
    let mut seen = HashSet::with_capacity(target_langs.len());
    for lang in target_langs {
        if lang.trim().is_empty() {
            return Err(TranslateError::validation(
                "Target language codes must not be empty.",
            ));
        }
        if !seen.insert(lang.as_str()) {
            return Err(TranslateError::validation(format!(
                "Duplicate target language: {lang}"
            )));
        }
    }
    Ok(())
}

/// Fans one source text out to every requested target language through a
/// single injected backend.
pub struct TranslationService {
    backend: Arc<dyn Translator>,
    metrics: Arc<MetricsRegistry>,
}

impl TranslationService {
    pub fn new(backend: Arc<dyn Translator>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { backend, metrics }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Translate `text` into each of `target_langs`, one backend call at a
    /// time, in order. The first failure aborts the whole fan-out.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_langs: &[String],
    ) -> TranslateResult<Translations> {
        validate(text, target_langs)?;

        let source = explicit_source(source_lang);
        self.metrics
            .timed(
                Metric::Fanout(self.backend.name()),
                self.fan_out(text, source, target_langs),
            )
            .await
    }

    async fn fan_out(
        &self,
        text: &str,
        source: Option<&str>,
        target_langs: &[String],
    ) -> TranslateResult<Translations> {
        let backend = self.backend.name();
        let mut translations = Translations::default();

        for target_lang in target_langs {
            let start = Instant::now();
            let result = self
                .metrics
                .timed(
                    Metric::BackendCall(backend),
                    self.backend.translate(text, source, target_lang),
                )
                .await;

            match result {
                Ok(translated) => {
                    debug!(
                        backend,
                        target_lang = %target_lang,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        chars = translated.chars().count(),
                        "translated"
                    );
                    translations.insert(target_lang.clone(), translated);
                }
                Err(e) => {
                    warn!(backend, target_lang = %target_lang, error = %e, "translation failed");
                    return Err(e);
                }
            }
        }

        Ok(translations)
    }
}
