use axum::{Json, body::Bytes, extract::State, http::StatusCode};

use crate::error::ApiError;
use crate::schemas::{RegisterResponseSchema, RegisterSchema};
use crate::state::AppState;
use crate::utils::handler::HandlerResult;

// Handler for waitlist registration. The body is read as JSON whatever its
// content type, so plain-text form posts work without a CORS preflight.
pub async fn register_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> HandlerResult<RegisterResponseSchema> {
    let payload: RegisterSchema = serde_json::from_slice(&body).map_err(|err| {
        tracing::debug!(error = %err, "unreadable registration body");
        ApiError::MalformedPayload
    })?;

    let registrant = state.registration.register(payload).await?;

    Ok((StatusCode::CREATED, Json(RegisterResponseSchema::created(registrant))))
}
