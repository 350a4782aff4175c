//! The `/check` endpoint: the gate itself.

use axum::{Json, extract::State};
use tracing::error;

use horizon_core::gate::{AccessDecision, CheckRequest, CheckResponse};

use crate::{errors::AppError, state::AppState};

/// Evaluate the presented credentials and answer with the validator's
/// message. An empty uuid means no check is performed and the request
/// is implicitly allowed.
pub async fn check_handler(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, AppError> {
    let verdict = state.validator.check(&request).await;

    match verdict.decision {
        AccessDecision::Allowed => Ok(Json(CheckResponse {
            message: verdict.message,
        })),
        AccessDecision::Denied => Err(AppError::forbidden(verdict.message)),
        AccessDecision::Failed(reason) => {
            error!(%reason, "validator failure during /check");
            Err(AppError::internal("access validation unavailable"))
        }
    }
}
