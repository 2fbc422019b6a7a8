//! HTTP API application wiring (Axum router + session wiring).
//!
//! - `state.rs`: the shared session and how it is opened
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod state;

pub use state::{SharedSession, open_session};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(session: SharedSession) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(session)),
        )
}
