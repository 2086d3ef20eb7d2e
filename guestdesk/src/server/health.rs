//! Operational endpoints: readiness probe for the store and Prometheus scrape.

use super::state::AppState;
use crate::repository::Ping;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use futures::future::BoxFuture;
use futures::FutureExt;
use guestdesk_web::handlers::ReadinessProbe;
use std::sync::Arc;

/// Readiness probe pinging the database.
pub struct DatabaseProbe {
    store: Arc<dyn Ping>,
}

impl DatabaseProbe {
    /// Creates a new `DatabaseProbe`.
    #[must_use]
    pub fn new(store: Arc<dyn Ping>) -> Self {
        Self { store }
    }
}

impl ReadinessProbe for DatabaseProbe {
    fn name(&self) -> &'static str {
        "database"
    }

    fn check(&self) -> BoxFuture<'_, Result<(), String>> {
        async move { self.store.ping().await.map_err(|e| e.to_string()) }.boxed()
    }
}

/// Prometheus exposition.
///
/// ```text
/// GET /metrics
/// ```
#[allow(clippy::unused_async)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "metrics recorder not installed".to_string(),
        ),
    }
}
