//! Organizer dashboard endpoints.
//!
//! - GET /api/dashboard - Attendance per exhibitor with totals
//! - GET /api/dashboard/exhibitors/:id/guests - One exhibitor's guests
//! - GET /api/dashboard/export - CSV of every guest
//! - GET /api/dashboard/exhibitors/:id/export - CSV of one exhibitor's guests

use super::attachment;
use crate::auth::OrganizerSession;
use crate::dashboard::{CsvDownload, DashboardSummary};
use crate::server::state::AppState;
use crate::types::{ExhibitorId, Guest};
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use guestdesk_core::environment::Clock;
use guestdesk_web::AppError;
use uuid::Uuid;

fn csv_response(download: CsvDownload) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&download.file_name)),
        ],
        download.bytes,
    )
}

/// Attendance per exhibitor, ordered by company name.
///
/// # Errors
///
/// 401/403 unless signed in as an organizer.
pub async fn summary(
    State(state): State<AppState>,
    _organizer: OrganizerSession,
) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(state.dashboard.summary().await?))
}

/// One exhibitor's guests, newest first.
///
/// # Errors
///
/// 404 for an unknown exhibitor.
pub async fn exhibitor_guests(
    State(state): State<AppState>,
    _organizer: OrganizerSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Guest>>, AppError> {
    let guests = state
        .dashboard
        .exhibitor_guests(ExhibitorId::from_uuid(id))
        .await?;
    Ok(Json(guests))
}

/// Every guest as CSV.
///
/// # Errors
///
/// 422 "no data" when there are no guests.
pub async fn export_all(
    State(state): State<AppState>,
    _organizer: OrganizerSession,
) -> Result<impl IntoResponse, AppError> {
    let today = state.clock.now().date_naive();
    Ok(csv_response(state.dashboard.export_all(today).await?))
}

/// One exhibitor's guests as CSV.
///
/// # Errors
///
/// 404 for an unknown exhibitor, 422 "no data" when it has no guests.
pub async fn export_exhibitor(
    State(state): State<AppState>,
    _organizer: OrganizerSession,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let download = state
        .dashboard
        .export_exhibitor(ExhibitorId::from_uuid(id))
        .await?;
    Ok(csv_response(download))
}
