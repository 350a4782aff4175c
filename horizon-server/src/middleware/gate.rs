//! The access gate as request-scoped middleware.
//!
//! `gate_middleware` computes one [`AccessDecision`] per request and
//! stores it in that request's extensions; `require_access` consumes it
//! before the handler runs. No decision ever outlives its request or is
//! visible to another one.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

use horizon_core::gate::{AccessDecision, CheckRequest};

use crate::{errors::AppError, state::AppState};

/// Header gated requests use to present their session token.
pub const ACCESS_UUID_HEADER: &str = "x-access-uuid";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Evaluate the caller's credentials against the external validator and
/// record the outcome on the request.
///
/// Requests without a token pass through with no decision recorded;
/// whether that suffices is up to the consuming layer — protected
/// routes refuse such requests in [`require_access`].
pub async fn gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let uuid = request
        .headers()
        .get(ACCESS_UUID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if uuid.is_empty() {
        return Ok(next.run(request).await);
    }

    let check = CheckRequest {
        ip_address: client_address(&request),
        uuid,
    };
    let verdict = state.validator.check(&check).await;

    match verdict.decision {
        AccessDecision::Failed(reason) => {
            error!(%reason, "validator unavailable for gated request");
            Err(AppError::internal("access validation unavailable"))
        }
        decision => {
            debug!(?decision, "recorded per-request access decision");
            request.extensions_mut().insert(decision);
            Ok(next.run(request).await)
        }
    }
}

/// Refuse the request unless its own gate evaluation allowed it.
pub async fn require_access(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<AccessDecision>() {
        Some(AccessDecision::Allowed) => Ok(next.run(request).await),
        Some(AccessDecision::Failed(_)) => {
            Err(AppError::internal("access validation unavailable"))
        }
        Some(AccessDecision::Denied) | None => Err(AppError::unauthorized("access denied")),
    }
}

fn client_address(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}
