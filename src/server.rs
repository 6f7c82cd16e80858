//! HTTP surface: JSON endpoints over the two translation services.
//!
//! `POST /translate`        cloud backend
//! `POST /translateAi`      chat-completion backend
//! `POST /translateProduct` product details through the chat-completion backend
//! `GET  /languages`        supported languages with flags
//! `GET  /metrics`          latency histograms
//! `GET  /health`           liveness
//!
//! Every route is also served under `/api` for frontends that expect that prefix.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::Config;
use crate::error::TranslateError;
use crate::languages::{self, LanguageInfo};
use crate::metrics::{LatencySummary, Metric, MetricsRegistry, RequestIds};
use crate::product::{self, ProductRequest, ProductTranslations};
use crate::translate::aws::AwsTranslateClient;
use crate::translate::glossary::Glossary;
use crate::translate::openai::OpenAiClient;
use crate::translate::{TranslateRequest, TranslationService, Translations, Translator};

/// Generic message returned for every backend-side failure.
const TRANSLATION_FAILED: &str = "Translation failed.";

/// Shared, immutable per-process state.
pub struct AppState {
    pub cloud: TranslationService,
    pub chat: TranslationService,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(
        cloud: Arc<dyn Translator>,
        chat: Arc<dyn Translator>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            cloud: TranslationService::new(cloud, Arc::clone(&metrics)),
            chat: TranslationService::new(chat, Arc::clone(&metrics)),
            metrics,
        }
    }

    /// Build both provider clients from configuration. Missing credentials
    /// are not an error here; calls fail later at the provider.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let glossary = match &config.glossary_path {
            Some(path) => Glossary::load_from_file(path).unwrap_or_else(|e| {
                warn!(error = %e, path = %path.display(), "glossary load failed, using built-in entries");
                Glossary::builtin()
            }),
            None => Glossary::builtin(),
        };
        info!(version = glossary.version(), "glossary ready");

        if config.aws.access_key.is_empty() || config.aws.region.is_empty() {
            warn!("Amazon Translate credentials or region not set; /translate will fail");
        }
        if config.openai.api_key.is_empty() {
            warn!("chat-completion API key not set; /translateAi will fail");
        }

        let cloud = AwsTranslateClient::new(config.aws.clone())?;
        let chat = OpenAiClient::new(config.openai.clone(), Arc::new(glossary))?;
        Ok(Self::new(
            Arc::new(cloud),
            Arc::new(chat),
            Arc::new(MetricsRegistry::new()),
        ))
    }
}

// --- Responses ---

#[derive(Serialize)]
struct TranslationsBody {
    translations: Translations,
}

#[derive(Serialize)]
struct ProductsBody {
    products: ProductTranslations,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// A failed request. `expose_details` controls whether the backend's own
/// message is echoed to the client.
pub struct ApiError {
    err: TranslateError,
    expose_details: bool,
}

impl ApiError {
    fn generic(err: TranslateError) -> Self {
        Self {
            err,
            expose_details: false,
        }
    }

    fn detailed(err: TranslateError) -> Self {
        Self {
            err,
            expose_details: true,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.err {
            TranslateError::Validation(msg) => {
                debug!(reason = %msg, "request rejected");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: msg,
                        details: None,
                    },
                )
            }
            TranslateError::Backend(msg) => {
                error!(error = %msg, "translation backend failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: TRANSLATION_FAILED.into(),
                        details: self.expose_details.then_some(msg),
                    },
                )
            }
            TranslateError::MalformedResponse(msg) => {
                error!(error = %msg, "translated payload could not be decoded");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        error: TRANSLATION_FAILED.into(),
                        details: self.expose_details.then_some(msg),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

fn body_or_validation<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, TranslateError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            TranslateError::validation(format!("Invalid request body: {}", rejection.body_text()))
        })
}

fn request_span(route: &'static str, backend: &'static str) -> tracing::Span {
    let ids = RequestIds::new();
    info_span!(
        "request",
        route,
        backend,
        trace_id = %ids.trace_id,
        request_id = %ids.request_id
    )
}

// --- Handlers ---

async fn health() -> &'static str {
    "OK"
}

async fn list_languages() -> Json<Vec<LanguageInfo>> {
    Json(languages::catalog())
}

async fn metrics_summary(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, LatencySummary>> {
    Json(state.metrics.snapshot())
}

async fn translate_cloud(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslationsBody>, ApiError> {
    let span = request_span("/translate", state.cloud.backend_name());
    async move {
        let req = body_or_validation(payload).map_err(ApiError::generic)?;
        info!(targets = req.target_langs.len(), source = ?req.source_lang, "translate request");
        let translations = state
            .cloud
            .translate(&req.text, req.source_lang.as_deref(), &req.target_langs)
            .await
            .map_err(ApiError::generic)?;
        Ok(Json(TranslationsBody { translations }))
    }
    .instrument(span)
    .await
}

async fn translate_ai(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslationsBody>, ApiError> {
    let span = request_span("/translateAi", state.chat.backend_name());
    async move {
        let req = body_or_validation(payload).map_err(ApiError::detailed)?;
        info!(targets = req.target_langs.len(), source = ?req.source_lang, "translate request");
        let translations = state
            .chat
            .translate(&req.text, req.source_lang.as_deref(), &req.target_langs)
            .await
            .map_err(ApiError::detailed)?;
        Ok(Json(TranslationsBody { translations }))
    }
    .instrument(span)
    .await
}

async fn translate_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ProductsBody>, ApiError> {
    let span = request_span("/translateProduct", state.chat.backend_name());
    async move {
        let req = body_or_validation(payload).map_err(ApiError::detailed)?;
        info!(targets = req.target_langs.len(), source = ?req.source_lang, "product request");
        let products = state
            .metrics
            .timed(Metric::Product, product::translate_product(&state.chat, &req))
            .await
            .map_err(ApiError::detailed)?;
        Ok(Json(ProductsBody { products }))
    }
    .instrument(span)
    .await
}

/// Build the router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let api: Router<Arc<AppState>> = Router::new()
        .route("/health", get(health))
        .route("/languages", get(list_languages))
        .route("/metrics", get(metrics_summary))
        .route("/translate", post(translate_cloud))
        .route("/translateAi", post(translate_ai))
        .route("/translateProduct", post(translate_product));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
