//! Amazon Translate client (`TranslateText`, JSON 1.1 protocol, SigV4).
//! One attempt per call; any transport, auth, or decoding problem becomes a
//! backend error.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sigv4::{self, SigningParams};
use super::Translator;
use crate::config::AwsConfig;
use crate::error::{TranslateError, TranslateResult};

const SERVICE: &str = "translate";
const TARGET: &str = "AWSShineFrontendService_20170701.TranslateText";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

pub struct AwsTranslateClient {
    http: reqwest::Client,
    config: AwsConfig,
    endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TranslateTextInput<'a> {
    text: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranslateTextOutput {
    #[serde(default)]
    translated_text: Option<String>,
}

#[derive(Deserialize)]
struct AwsErrorBody {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

impl AwsTranslateClient {
    pub fn new(config: AwsConfig) -> TranslateResult<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        let endpoint = config.endpoint().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    fn host(&self) -> TranslateResult<String> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| TranslateError::backend(format!("invalid endpoint {}: {e}", self.endpoint)))?;
        let host = url
            .host_str()
            .ok_or_else(|| TranslateError::backend(format!("endpoint has no host: {}", self.endpoint)))?;
        Ok(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }
}

#[async_trait]
impl Translator for AwsTranslateClient {
    fn name(&self) -> &'static str {
        "aws-translate"
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> TranslateResult<String> {
        let body = serde_json::to_vec(&TranslateTextInput {
            text,
            source_language_code: source_lang.unwrap_or("auto"),
            target_language_code: target_lang,
        })?;

        let host = self.host()?;
        let params = SigningParams {
            access_key: &self.config.access_key,
            secret_key: &self.config.secret_key,
            region: &self.config.region,
            service: SERVICE,
            time: Utc::now(),
        };
        let amz_date = params.amz_date();
        let authorization = sigv4::authorization(
            &params,
            "POST",
            "/",
            &[
                ("content-type", CONTENT_TYPE),
                ("host", &host),
                ("x-amz-date", &amz_date),
                ("x-amz-target", TARGET),
            ],
            &body,
        )
        .map_err(|e| TranslateError::backend(format!("failed to sign request: {e}")))?;

        let resp = self
            .http
            .post(format!("{}/", self.endpoint))
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Date", &amz_date)
            .header("X-Amz-Target", TARGET)
            .header("Authorization", authorization)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<AwsErrorBody>(&raw)
                .ok()
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.kind.unwrap_or_else(|| "UnknownError".into()),
                        e.message.unwrap_or_default()
                    )
                })
                .unwrap_or_else(|| raw.chars().take(200).collect());
            return Err(TranslateError::backend(format!(
                "Amazon Translate returned {status}: {detail}"
            )));
        }

        let output: TranslateTextOutput = resp.json().await?;
        let translated = output.translated_text.unwrap_or_default();
        debug!(target_lang, chars = translated.chars().count(), "Amazon Translate response");
        Ok(translated)
    }
}
