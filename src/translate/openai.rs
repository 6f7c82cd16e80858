//! Chat-completion translation client (OpenAI-compatible `/v1/chat/completions`).
//! Non-streaming, single attempt per target language.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::detect::detect_language;
use super::glossary::{self, Glossary, GlossaryEntry};
use super::Translator;
use crate::config::OpenAiConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::languages;

pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
    glossary: Arc<Glossary>,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig, glossary: Arc<Glossary>) -> TranslateResult<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self {
            http,
            config,
            glossary,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Translator for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai-chat"
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslateResult<String> {
        // Product payloads arrive percent-escaped; match words on the plain form.
        let plain = urlencoding::decode(text).unwrap_or(Cow::Borrowed(text));
        let source = describe_source(&plain, source_lang);
        let glossary = if source.is_lithuanian {
            self.glossary.match_entries(&plain)
        } else {
            Vec::new()
        };
        let user_prompt = build_user_prompt(
            text,
            &source.name,
            languages::display_name(target_lang),
            &glossary,
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt}
            ]
        });

        let resp = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&raw)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| raw.chars().take(200).collect());
            return Err(TranslateError::backend(format!(
                "chat completion returned {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = resp.json().await?;
        let translated = extract_content(parsed)?;
        debug!(
            target_lang,
            glossary_entries = glossary.len(),
            chars = translated.chars().count(),
            "chat completion response"
        );
        Ok(translated)
    }
}

// --- Prompt construction ---

const SYSTEM_PROMPT: &str = "You are a translation assistant. Return only the translated text, \
with no quotation marks and no explanations. Maintain all special characters such as hyphens (-), \
underscores (_) and slashes (/). Keep all line breaks and whitespace exactly as they were. \
Do not remove or alter these symbols.";

struct SourceDescription<'a> {
    name: Cow<'a, str>,
    is_lithuanian: bool,
}

/// Name the source language for the prompt. Falls back to local detection
/// when the caller asked for auto-detect.
fn describe_source<'a>(text: &str, source_lang: Option<&'a str>) -> SourceDescription<'a> {
    match source_lang {
        Some(code) => SourceDescription {
            name: Cow::Borrowed(languages::display_name(code)),
            is_lithuanian: code.eq_ignore_ascii_case("lt"),
        },
        None => match detect_language(text) {
            Some(lang) => SourceDescription {
                name: Cow::Borrowed(lang.name),
                is_lithuanian: lang.code == "lt",
            },
            None => SourceDescription {
                name: Cow::Borrowed("the source language"),
                is_lithuanian: false,
            },
        },
    }
}

fn build_user_prompt(
    text: &str,
    source_name: &str,
    target_name: &str,
    glossary: &[GlossaryEntry],
) -> String {
    let mut prompt = format!(
        "Translate the following text from {source_name} to {target_name}. \
         Pay attention to context, especially for words that imply small items in {source_name}.\n\
         Only return the translated text without explanations or additional context. \
         Keep any HTML elements as they are and do not change numbers.\n"
    );
    let glossary_section = glossary::render_for_prompt(glossary);
    if !glossary_section.is_empty() {
        prompt.push_str(&glossary_section);
    }
    prompt.push_str(&format!("Text: \"{text}\""));
    prompt
}

fn extract_content(resp: ChatResponse) -> TranslateResult<String> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| TranslateError::backend("chat completion returned no choices"))?;
    Ok(choice
        .message
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default())
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
