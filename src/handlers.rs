use crate::errors::AppError;
use crate::models::{Submission, SubmitResponse};
use crate::pipeline::LeadPipeline;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Path the assessment form posts to.
pub const SUBMIT_PATH: &str = "/api/submit";
/// Largest accepted submission body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const SUCCESS_MESSAGE: &str = "Assessment submitted successfully";
const TEST_MODE_SUFFIX: &str = " (TEST MODE)";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lead enrichment pipeline with its long-lived clients.
    pub pipeline: LeadPipeline,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "assessment-lead-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/submit
///
/// Accepts an assessment form submission and runs it through the lead pipeline.
///
/// A body that fails to decode gets the same 500 shape as any other failure.
///
/// # Returns
///
/// * `Result<Json<SubmitResponse>, AppError>` - 200 with the stored lead id and crime data,
///   or the generic 500 body.
pub async fn submit_assessment(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, AppError> {
    let submission: Submission = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidSubmission(e.to_string()))?;
    let is_test = submission.is_test;

    let outcome = state.pipeline.process(&submission).await?;

    let mut message = SUCCESS_MESSAGE.to_string();
    if is_test {
        message.push_str(TEST_MODE_SUFFIX);
    }

    Ok(Json(SubmitResponse {
        success: true,
        lead_id: outcome.contact.id,
        crime_data: outcome.crime_data,
        message,
        is_test,
    }))
}

/// Any method other than POST on the submission path.
pub async fn method_not_allowed() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

/// Submission routes with state attached.
///
/// Rate limiting and CORS are layered on by the binary.
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            SUBMIT_PATH,
            post(submit_assessment).fallback(method_not_allowed),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
