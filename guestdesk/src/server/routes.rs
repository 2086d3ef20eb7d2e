//! Router configuration for guestdesk.

use super::health::metrics;
use super::state::AppState;
use crate::api::{dashboard, guests, invitations, profile, reception};
use crate::auth::handlers as auth;
use axum::{
    routing::{get, post, put},
    Router,
};
use guestdesk_web::correlation_id_layer;
use guestdesk_web::handlers::{health_check, readiness_check};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Public: health, readiness, metrics, sign-in and invitation pages.
/// Everything under `/api` checks the bearer token in its extractors.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Exhibitor console
        .route("/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/guests", get(guests::list_guests).post(guests::create_guest))
        .route("/guests/import", post(guests::import_guests))
        .route(
            "/guests/:id",
            put(guests::update_guest).delete(guests::delete_guest),
        )
        // Reception
        .route("/reception/exhibitors", get(reception::list_exhibitors))
        .route("/reception/:terminal", get(reception::view_terminal))
        .route("/reception/:terminal/scan", post(reception::scan))
        .route("/reception/:terminal/camera", post(reception::camera))
        .route(
            "/reception/:terminal/register",
            post(reception::begin_registration),
        )
        .route(
            "/reception/:terminal/additional",
            post(reception::submit_additional),
        )
        .route("/reception/:terminal/reset", post(reception::reset))
        // Organizer
        .route("/dashboard", get(dashboard::summary))
        .route("/dashboard/export", get(dashboard::export_all))
        .route(
            "/dashboard/exhibitors/:id/guests",
            get(dashboard::exhibitor_guests),
        )
        .route(
            "/dashboard/exhibitors/:id/export",
            get(dashboard::export_exhibitor),
        )
        .route("/accounts", post(auth::provision_account));

    let auth_routes = Router::new()
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/session", get(auth::current_session));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        // Invitations (guest id is the credential)
        .route("/invite/:id", get(invitations::invitation_page))
        .route("/invite/:id/document", get(invitations::invitation_document))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
