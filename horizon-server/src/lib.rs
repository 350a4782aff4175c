//! # Horizon Server
//!
//! Catalog/media-delivery backend. Serves taxonomy-scoped image
//! metadata and static files over HTTP, with access gated behind an
//! external validation service.
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - PostgreSQL (via sqlx) for the taxonomy and image store
//! - A per-request middleware gate delegating to the external validator
//! - tower-http for static files, CORS and request tracing

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use errors::{AppError, AppResult};
pub use state::AppState;
