//! HTTP front end.
//!
//! Routes:
//!
//! - `POST /api/generate-w4` fills the W-4 and returns it as an attachment
//! - `OPTIONS /api/generate-w4` answers preflight requests
//! - `GET /api/health` reports liveness
//!
//! Any other method on the generate route is answered with 405.

use crate::auth::{PresenceVerifier, TokenVerifier};
use crate::config::{ServiceConfig, DEFAULT_DOWNLOAD_FILENAME};
use crate::error::{Error, Result};
use crate::generate::fill_form;
use crate::model::GenerateRequest;
use crate::populate::FormPopulator;
use crate::source::{DocumentSource, HttpDocumentSource};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Path of the generate endpoint.
pub const GENERATE_PATH: &str = "/api/generate-w4";

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/api/health";

/// Shared, immutable request-handling state.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn DocumentSource>,
    verifier: Arc<dyn TokenVerifier>,
    populator: Arc<FormPopulator>,
    download_filename: Arc<str>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("download_filename", &self.download_filename)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State serving documents from `source` with presence-only token checks
    /// and the built-in form profile.
    pub fn new(source: impl DocumentSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            verifier: Arc::new(PresenceVerifier),
            populator: Arc::new(FormPopulator::default()),
            download_filename: Arc::from(DEFAULT_DOWNLOAD_FILENAME),
        }
    }

    /// Build state from service configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let source = HttpDocumentSource::from_config(config)?;
        let populator = FormPopulator::new(config.load_profile()?);
        Ok(Self::new(source)
            .with_populator(populator)
            .with_download_filename(config.download_filename.as_str()))
    }

    /// Replace the token verifier.
    pub fn with_verifier(mut self, verifier: impl TokenVerifier + 'static) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    /// Replace the populator.
    pub fn with_populator(mut self, populator: FormPopulator) -> Self {
        self.populator = Arc::new(populator);
        self
    }

    /// Set the attachment file name.
    pub fn with_download_filename(mut self, name: &str) -> Self {
        self.download_filename = Arc::from(name);
        self
    }
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// Body was not a JSON request
    BadRequest(String),
    /// Method other than POST or OPTIONS
    MethodNotAllowed,
    /// Failure while serving the request
    Service(Error),
    /// Worker thread failed
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Service(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Service(Error::AuthorizationMissing) => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "Payment required",
                    "message": "Please complete payment to generate your W-4",
                }),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, json!({ "error": "Method not allowed" }))
            },
            ApiError::Service(e) => {
                log::error!("W-4 generation error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
            },
            ApiError::Internal(msg) => {
                log::error!("W-4 generation error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            GENERATE_PATH,
            post(generate).options(preflight).fallback(method_not_allowed),
        )
        .route(HEALTH_PATH, get(health))
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until the process exits.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("Listening on {} (source {})", listener.local_addr()?, config.source_url);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn generate(State(state): State<AppState>, body: Bytes) -> std::result::Result<Response, ApiError> {
    let request: GenerateRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

    state.verifier.verify(request.auth_token.as_deref()).await?;

    let source = state.source.fetch().await?;
    log::debug!("Fetched source form ({} bytes)", source.len());

    let populator = Arc::clone(&state.populator);
    let filled = tokio::task::spawn_blocking(move || {
        fill_form(&source, &request.user_data, &request.calc_results, &populator)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let disposition = format!("attachment; filename=\"{}\"", state.download_filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        filled.bytes,
    )
        .into_response())
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
