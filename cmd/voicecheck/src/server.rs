//! HTTP API for voice detection.
//!
//! API endpoints:
//! - POST /detect              - Classify a base64 audio clip
//! - POST /api/voice-detection - Alias of /detect
//! - GET  /health              - Liveness probe
//!
//! Request validation happens strictly before detection: a request that
//! fails authentication or validation never reaches the detector.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};
use voicecheck_detect::{Detect, Explanation, Label};

use crate::config::ServerConfig;

/// Paths served by the detection handler.
pub const DETECT_ROUTES: [&str; 2] = ["/detect", "/api/voice-detection"];

const API_KEY_HEADER: &str = "x-api-key";
const UNAUTHORIZED_MESSAGE: &str = "Invalid API key or unauthorized request";

/// Field names searched for the audio payload, in priority order.
const PAYLOAD_FIELDS: [&str; 9] = [
    "audioBase64",
    "audio_base64",
    "audioBase64Format",
    "Audio Base64 Format",
    "audio_data",
    "audioData",
    "data",
    "audio",
    "base64",
];

/// Fields that are never treated as an audio payload.
const METADATA_FIELDS: [&str; 3] = ["language", "audioFormat", "audio_format"];

/// Any other string field longer than this is assumed to be the payload.
const PAYLOAD_MIN_LEN: usize = 100;

/// Shared request-handling state.
pub struct AppState {
    detector: Arc<dyn Detect>,
    api_keys: HashSet<String>,
    languages: Vec<String>,
    audio_format: String,
}

impl AppState {
    pub fn new(detector: Arc<dyn Detect>, cfg: &ServerConfig) -> Self {
        Self {
            detector,
            api_keys: cfg.api_keys.iter().cloned().collect(),
            languages: cfg.languages.clone(),
            audio_format: cfg.audio_format.clone(),
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        presented_key(headers).is_some_and(|key| self.api_keys.contains(key))
    }

    /// Returns the caller's language value if it is accepted.
    fn check_language(&self, request: &Map<String, Value>) -> Result<String, ApiError> {
        let value = match request.get("language") {
            None | Some(Value::Null) => return Err(ApiError::bad_request("Missing language")),
            Some(Value::String(s)) => s.trim(),
            Some(other) => {
                return Err(ApiError::bad_request(format!(
                    "Unsupported language: {other}"
                )));
            }
        };
        if self
            .languages
            .iter()
            .any(|lang| lang.eq_ignore_ascii_case(value))
        {
            Ok(value.to_string())
        } else {
            Err(ApiError::bad_request(format!(
                "Unsupported language: {value}"
            )))
        }
    }

    fn check_format(&self, request: &Map<String, Value>) -> Result<(), ApiError> {
        let value = request
            .get("audioFormat")
            .or_else(|| request.get("audio_format"));
        match value {
            None | Some(Value::Null) => Err(ApiError::bad_request("Missing audioFormat")),
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case(&self.audio_format) => Ok(()),
            Some(Value::String(s)) => Err(ApiError::bad_request(format!(
                "Unsupported audio format: {}",
                s.trim()
            ))),
            Some(other) => Err(ApiError::bad_request(format!(
                "Unsupported audio format: {other}"
            ))),
        }
    }
}

/// Reads the API key from `x-api-key`, falling back to `Authorization`
/// with an optional `Bearer ` prefix.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(API_KEY_HEADER) {
        return value.to_str().ok().map(str::trim);
    }
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    Some(value.strip_prefix("Bearer ").unwrap_or(value).trim())
}

/// Locates the audio payload in a request body.
fn find_payload(request: &Map<String, Value>) -> Option<&str> {
    for field in PAYLOAD_FIELDS {
        if let Some(Value::String(s)) = request.get(field) {
            if !s.trim().is_empty() {
                return Some(s);
            }
        }
    }
    request
        .iter()
        .filter(|(key, _)| !METADATA_FIELDS.contains(&key.as_str()))
        .find_map(|(_, value)| match value {
            Value::String(s) if s.len() > PAYLOAD_MIN_LEN => Some(s.as_str()),
            _ => None,
        })
}

/// Successful detection response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectResponse {
    status: &'static str,
    language: String,
    classification: Label,
    confidence_score: f64,
    explanation: Explanation,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

/// Request-level failures, rendered as `{"status":"error","message":...}`.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE.to_string()),
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            Self::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        let body = ErrorBody {
            status: "error",
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the service router.
pub fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let mut app: Router<Arc<AppState>> = Router::new().route("/health", get(health));
    for path in DETECT_ROUTES {
        app = app.route(path, post(detect_voice));
    }
    app.layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves until interrupted.
pub async fn serve(addr: &str, state: Arc<AppState>, max_body_bytes: usize) -> Result<()> {
    let app = router(state, max_body_bytes);
    let addr = parse_addr(addr)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    for path in DETECT_ROUTES {
        info!("  POST {path}");
    }
    info!("  GET  /health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Parse address string to SocketAddr.
fn parse_addr(addr: &str) -> Result<SocketAddr> {
    let addr = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };
    Ok(addr.parse()?)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn detect_voice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DetectResponse>, ApiError> {
    if !state.authorized(&headers) {
        info!("rejected request: missing or unknown API key");
        return Err(ApiError::Unauthorized);
    }

    let request = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        _ => return Err(ApiError::bad_request("Invalid JSON body")),
    };

    let language = state.check_language(&request)?;
    state.check_format(&request)?;
    let audio = find_payload(&request)
        .ok_or_else(|| ApiError::bad_request("No audio data found"))?
        .to_string();
    debug!(language = %language, payload_len = audio.len(), "running detection");

    let detector = state.detector.clone();
    let verdict = tokio::task::spawn_blocking(move || detector.detect(&audio))
        .await
        .map_err(|e| {
            error!("detection task failed: {}", e);
            ApiError::Internal("Internal error while analyzing audio".to_string())
        })?;

    info!(
        language = %language,
        classification = %verdict.label,
        confidence = verdict.confidence,
        "detection complete"
    );

    Ok(Json(DetectResponse {
        status: "success",
        language,
        classification: verdict.label,
        confidence_score: verdict.confidence,
        explanation: verdict.explanation,
    }))
}
