//! Process-wide configuration, read once from the environment at startup.
//! Credentials are not validated here: a missing key surfaces as a backend
//! failure on the first call that needs it.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: Ipv4Addr,
    pub port: u16,
    pub aws: AwsConfig,
    pub openai: OpenAiConfig,
    pub glossary_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Overrides the regional endpoint derived from `region`.
    pub endpoint: Option<String>,
}

impl AwsConfig {
    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://translate.{}.amazonaws.com", self.region))
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com".into(),
            model: "gpt-4o-mini".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    /// Build from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host: Ipv4Addr = var("HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse()
            .context("HOST must be a valid IPv4 address")?;

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        let aws = AwsConfig {
            region: var("AMAZON_REGION").unwrap_or_default(),
            access_key: var("AWS_ACCESS_KEY").unwrap_or_default(),
            secret_key: var("AWS_SECRET_KEY").unwrap_or_default(),
            endpoint: var("AWS_TRANSLATE_ENDPOINT"),
        };

        let defaults = OpenAiConfig::default();
        let openai = OpenAiConfig {
            api_key: var("OPEN_AI_SECRET").unwrap_or_default(),
            base_url: var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: var("OPENAI_MODEL").unwrap_or(defaults.model),
        };

        let log_format = match var("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            host,
            port,
            aws,
            openai,
            glossary_path: var("GLOSSARY_PATH").map(PathBuf::from),
            log_format,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}
