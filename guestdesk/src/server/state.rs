//! Application state for the guestdesk HTTP server.
//!
//! Holds every service the handlers call. Cloning is cheap: services are
//! `Arc`-backed.

use super::health::DatabaseProbe;
use crate::auth::AuthService;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::invitation::InvitationRenderer;
use crate::registry::GuestRegistry;
use crate::repository::{
    AccountRepository, ExhibitorRepository, GuestRepository, Ping, SessionRepository,
};
use crate::scanner::{ScannerEnvironment, TerminalRegistry};
use axum::extract::FromRef;
use guestdesk_core::environment::Clock;
use guestdesk_web::handlers::Readiness;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sign-in and session validation
    pub auth: Arc<AuthService>,
    /// Exhibitor profiles
    pub exhibitors: Arc<dyn ExhibitorRepository>,
    /// Exhibitor guest lists
    pub registry: GuestRegistry,
    /// Organizer views
    pub dashboard: Dashboard,
    /// Invitation documents
    pub invitations: InvitationRenderer,
    /// Reception terminals
    pub terminals: Arc<TerminalRegistry>,
    /// Probes run by `/ready`
    pub readiness: Readiness,
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Prometheus recorder, when installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire every service over one store implementing all repository traits.
    #[must_use]
    pub fn new<R>(store: Arc<R>, config: &Config, clock: Arc<dyn Clock>) -> Self
    where
        R: GuestRepository
            + ExhibitorRepository
            + AccountRepository
            + SessionRepository
            + Ping
            + 'static,
    {
        let guests: Arc<dyn GuestRepository> = store.clone();
        let exhibitors: Arc<dyn ExhibitorRepository> = store.clone();

        let session_ttl = i64::try_from(config.auth.session_ttl)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(|| chrono::Duration::hours(12));
        let auth = Arc::new(AuthService::new(
            store.clone(),
            store.clone(),
            exhibitors.clone(),
            clock.clone(),
            session_ttl,
        ));

        let terminals = Arc::new(
            TerminalRegistry::new(
                ScannerEnvironment::new(guests.clone(), exhibitors.clone(), clock.clone()),
                config.reception.settle_timeout(),
            )
            .with_max_terminals(config.reception.max_terminals),
        );

        let readiness = Readiness::new().with_probe(Arc::new(DatabaseProbe::new(store)));

        Self {
            auth,
            registry: GuestRegistry::new(guests.clone()),
            dashboard: Dashboard::new(guests.clone(), exhibitors.clone()),
            invitations: InvitationRenderer::new(guests, exhibitors.clone(), config.event.clone()),
            exhibitors,
            terminals,
            readiness,
            clock,
            metrics: None,
        }
    }

    /// Serve `/metrics` from this Prometheus recorder.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Readiness {
    fn from_ref(state: &AppState) -> Self {
        state.readiness.clone()
    }
}
