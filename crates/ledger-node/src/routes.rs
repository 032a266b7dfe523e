//! # HTTP Request Layer
//!
//! Maps HTTP calls onto `LedgerApi` and ledger errors onto status codes.
//!
//! | Route | Operation |
//! |-------|-----------|
//! | `GET /api/block/:height` | `get_block` |
//! | `POST /api/block` | `append` |
//! | `GET /api/block/:height/validate` | `validate_block` |
//! | `GET /api/chain/validate` | `validate_chain` |
//! | `GET /health` | `height` |
//!
//! Request shape (height format, payload fields and size) is checked here
//! before the ledger is called.

use std::sync::Arc;

use axum::extract::rejection::StringRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ledger_core::{Block, IntegrityCheck, IntegrityViolation, LedgerApi, LedgerError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single ledger instance of this process.
    pub ledger: Arc<dyn LedgerApi>,
}

impl AppState {
    /// Wrap a ledger for the router.
    pub fn new(ledger: Arc<dyn LedgerApi>) -> Self {
        Self { ledger }
    }
}

/// Errors returned to HTTP clients as `{"message": ...}`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// No block at the requested height.
    #[error("Block not exist")]
    NotFound,

    /// Ledger or store failure. Details are logged, not returned.
    #[error("Inner server error")]
    Internal,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound { height } => {
                debug!(height, "block not found");
                ApiError::NotFound
            }
            other => {
                error!(error = %other, "ledger operation failed");
                ApiError::Internal
            }
        }
    }
}

/// Body of `POST /api/block`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppendRequest {
    /// Payload of the new block.
    pub body: String,
}

/// Response of `GET /api/block/:height/validate`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockValidity {
    /// Checked height.
    pub height: u64,
    /// Whether the stored hash matches the block content.
    pub valid: bool,
}

/// One entry of the chain validation report.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViolationReport {
    /// Offending height.
    pub height: u64,
    /// Failed check.
    pub check: IntegrityCheck,
    /// Human-readable description.
    pub message: String,
}

impl From<IntegrityViolation> for ViolationReport {
    fn from(violation: IntegrityViolation) -> Self {
        Self {
            height: violation.height,
            check: violation.check,
            message: violation.to_string(),
        }
    }
}

/// Response of `GET /api/chain/validate`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainValidity {
    /// True when no violation was found.
    pub valid: bool,
    /// Every violation, in height order.
    pub errors: Vec<ViolationReport>,
}

/// Build the router with a request body limit of `max_body_bytes`.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/block", post(append_block))
        .route("/api/block/:height", get(get_block))
        .route("/api/block/:height/validate", get(validate_block))
        .route("/api/chain/validate", get(validate_chain))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Parse a path segment as a block height (decimal digits only).
fn parse_height(raw: &str) -> Result<u64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request(format!(
            "Block height must be a non-negative integer, got {:?}",
            raw
        )));
    }
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Block height {} is out of range", raw)))
}

fn parse_append_request(body: Result<String, StringRejection>) -> Result<AppendRequest, ApiError> {
    let body = body.map_err(|rejection| {
        debug!(error = %rejection, "request body rejected");
        ApiError::bad_request(rejection.body_text())
    })?;

    let request: AppendRequest = serde_json::from_str(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request payload: {}", e)))?;

    if request.body.is_empty() {
        return Err(ApiError::bad_request("\"body\" is not allowed to be empty"));
    }
    Ok(request)
}

async fn get_block(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Block>, ApiError> {
    let height = parse_height(&raw)?;
    Ok(Json(state.ledger.get_block(height).await?))
}

async fn append_block(
    State(state): State<AppState>,
    body: Result<String, StringRejection>,
) -> Result<Json<Block>, ApiError> {
    let request = parse_append_request(body)?;
    let block = state.ledger.append(request.body).await?;
    debug!(height = block.height, "block appended");
    Ok(Json(block))
}

async fn validate_block(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<BlockValidity>, ApiError> {
    let height = parse_height(&raw)?;
    let valid = state.ledger.validate_block(height).await?;
    Ok(Json(BlockValidity { height, valid }))
}

async fn validate_chain(State(state): State<AppState>) -> Result<Json<ChainValidity>, ApiError> {
    let violations = state.ledger.validate_chain().await?;
    Ok(Json(ChainValidity {
        valid: violations.is_empty(),
        errors: violations.into_iter().map(ViolationReport::from).collect(),
    }))
}

async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let height = state.ledger.height().await?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "height": height,
    })))
}
