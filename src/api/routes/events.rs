use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::api::AppState;
use crate::errors::WardenError;
use crate::event::EventEnvelope;

/// Push-delivery endpoint for event envelopes. Decode failures are the
/// sender's fault (400); anything else is reported as a server error so the
/// delivery gets retried.
pub async fn receive_event(
    State(state): State<AppState>,
    Json(envelope): Json<EventEnvelope>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.processor.process_event(&envelope).await {
        Ok(processed) => Ok(Json(json!({ "processed": processed }))),
        Err(WardenError::Decode(msg)) => {
            error!(error = %msg, "Rejected undecodable event");
            Err((StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))))
        }
        Err(e) => {
            error!(error = %e, "Error processing event");
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))
        }
    }
}
