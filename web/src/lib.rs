//! Axum integration for guestdesk.
//!
//! Handlers stay thin: they extract the request, call a service or send an
//! action through a `Store`, and map the result to a response. This crate
//! holds the pieces every handler shares:
//!
//! - [`AppError`]: error type implementing `IntoResponse` with a
//!   `{code, message}` JSON body
//! - [`correlation_id_layer`] and [`CorrelationId`]: per-request ids carried
//!   in tracing spans and echoed back in the `X-Correlation-ID` header
//! - [`handlers::health`]: liveness and readiness endpoints
//!
//! # Example
//!
//! ```ignore
//! use guestdesk_web::{AppError, correlation_id_layer};
//!
//! async fn get_guest(Path(id): Path<Uuid>) -> Result<Json<Guest>, AppError> {
//!     let guest = repo.find(id).await?.ok_or_else(|| AppError::not_found("Guest", id))?;
//!     Ok(Json(guest))
//! }
//!
//! let app = Router::new()
//!     .route("/guests/:id", get(get_guest))
//!     .layer(correlation_id_layer());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
