//! Health check endpoints.
//!
//! `/health` answers as long as the process serves requests. `/ready` runs
//! every registered [`ReadinessProbe`] and reports 503 if any of them fails.

use axum::{extract::State, http::StatusCode, Json};
use futures::future::{join_all, BoxFuture};
use serde::Serialize;
use std::sync::Arc;

/// Simple health check endpoint (for basic liveness).
///
/// Does NOT check dependencies.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// A dependency that must be reachable before the service takes traffic.
pub trait ReadinessProbe: Send + Sync {
    /// Name reported in the readiness response.
    fn name(&self) -> &'static str;

    /// Check the dependency, returning a short failure description.
    fn check(&self) -> BoxFuture<'_, Result<(), String>>;
}

/// The set of probes `/ready` runs.
#[derive(Clone, Default)]
pub struct Readiness {
    probes: Vec<Arc<dyn ReadinessProbe>>,
}

impl Readiness {
    /// Readiness with no probes (always ready).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        self.probes.push(probe);
        self
    }
}

impl std::fmt::Debug for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.probes.iter().map(|p| p.name()))
            .finish()
    }
}

/// Result of one probe.
#[derive(Debug, Serialize)]
pub struct ProbeStatus {
    /// Probe name
    pub name: &'static str,
    /// Whether the dependency answered
    pub ok: bool,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,
    /// Per-dependency results
    pub checks: Vec<ProbeStatus>,
}

/// Readiness check endpoint.
///
/// ```bash
/// curl http://localhost:8080/ready
/// # {"ready":true,"checks":[{"name":"database","ok":true}]}
/// ```
pub async fn readiness_check(
    State(readiness): State<Readiness>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let results = join_all(readiness.probes.iter().map(|probe| async move {
        let outcome = probe.check().await;
        if let Err(error) = &outcome {
            tracing::warn!(probe = probe.name(), error = %error, "Readiness probe failed");
        }
        ProbeStatus {
            name: probe.name(),
            ok: outcome.is_ok(),
            error: outcome.err(),
        }
    }))
    .await;

    let ready = results.iter().all(|check| check.ok);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready,
            checks: results,
        }),
    )
}
