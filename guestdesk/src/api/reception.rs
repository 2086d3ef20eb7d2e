//! Reception terminal endpoints.
//!
//! Every call answers with the terminal's display after the action settled.
//! Any signed-in account may operate a terminal.
//!
//! - GET /api/reception/exhibitors - Walk-in exhibitor picker
//! - GET /api/reception/:terminal - Current display
//! - POST /api/reception/:terminal/scan - Keyboard or typed token
//! - POST /api/reception/:terminal/camera - Camera decode batch
//! - POST /api/reception/:terminal/register - Open the walk-in form
//! - POST /api/reception/:terminal/additional - Submit the walk-in form
//! - POST /api/reception/:terminal/reset - Acknowledge the result

use crate::auth::SessionContext;
use crate::scanner::{CameraView, ExhibitorOption, TerminalView, TokenSource};
use crate::server::state::AppState;
use crate::types::ExhibitorId;
use axum::{
    extract::{Path, State},
    Json,
};
use guestdesk_web::{AppError, CorrelationId};
use serde::Deserialize;

/// Token submission.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Scanned or typed token
    pub token: String,
    /// Input channel, keyboard-wedge scanner unless stated
    #[serde(default = "default_source")]
    pub source: TokenSource,
}

const fn default_source() -> TokenSource {
    TokenSource::Keyboard
}

/// Camera decode batch.
#[derive(Debug, Deserialize)]
pub struct CameraRequest {
    /// Payloads detected in one frame
    #[serde(default)]
    pub payloads: Vec<String>,
}

/// Walk-in form.
#[derive(Debug, Deserialize)]
pub struct AdditionalGuestRequest {
    /// Inviting exhibitor; the companion's exhibitor when omitted
    #[serde(default)]
    pub exhibitor_id: Option<ExhibitorId>,
    /// Walk-in's name
    #[serde(default)]
    pub guest_name: String,
    /// Walk-in's company
    #[serde(default)]
    pub company_name: String,
}

/// Exhibitors for the walk-in picker, ordered by company name.
///
/// # Errors
///
/// 401 without a session.
pub async fn list_exhibitors(
    State(state): State<AppState>,
    _session: SessionContext,
) -> Result<Json<Vec<ExhibitorOption>>, AppError> {
    let exhibitors = state.exhibitors.list().await?;
    Ok(Json(
        exhibitors.into_iter().map(ExhibitorOption::from).collect(),
    ))
}

/// Current display of a terminal.
///
/// # Errors
///
/// 401 without a session, 422 for a bad terminal name.
pub async fn view_terminal(
    State(state): State<AppState>,
    _session: SessionContext,
    Path(terminal): Path<String>,
) -> Result<Json<TerminalView>, AppError> {
    Ok(Json(state.terminals.view(&terminal).await?))
}

/// Submit a token.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/reception/front/scan \
///   -H "Authorization: Bearer $TOKEN" \
///   -d '{"token": "0b6f5c55-3c1e-4a57-9d1f-2f7f3c0e9a11"}'
/// ```
///
/// # Errors
///
/// 401 without a session, 422 for a bad terminal name.
pub async fn scan(
    State(state): State<AppState>,
    session: SessionContext,
    correlation_id: CorrelationId,
    Path(terminal): Path<String>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<TerminalView>, AppError> {
    tracing::debug!(
        operator = %session.session.account_id,
        terminal = %terminal,
        %correlation_id,
        "Scan submitted"
    );
    let view = state
        .terminals
        .scan(&terminal, request.token, request.source)
        .await?;
    Ok(Json(view))
}

/// Offer a camera decode batch.
///
/// # Errors
///
/// 401 without a session, 422 for a bad terminal name.
pub async fn camera(
    State(state): State<AppState>,
    _session: SessionContext,
    Path(terminal): Path<String>,
    Json(request): Json<CameraRequest>,
) -> Result<Json<CameraView>, AppError> {
    Ok(Json(state.terminals.camera(&terminal, request.payloads).await?))
}

/// Open the walk-in form from `NOT_FOUND` or `ALREADY_CHECKED_IN`.
///
/// # Errors
///
/// 401 without a session, 422 for a bad terminal name.
pub async fn begin_registration(
    State(state): State<AppState>,
    _session: SessionContext,
    Path(terminal): Path<String>,
) -> Result<Json<TerminalView>, AppError> {
    Ok(Json(state.terminals.begin_registration(&terminal).await?))
}

/// Submit the walk-in form.
///
/// Validation problems are shown on the terminal, not returned as errors.
///
/// # Errors
///
/// 401 without a session, 422 for a bad terminal name.
pub async fn submit_additional(
    State(state): State<AppState>,
    _session: SessionContext,
    Path(terminal): Path<String>,
    Json(request): Json<AdditionalGuestRequest>,
) -> Result<Json<TerminalView>, AppError> {
    let view = state
        .terminals
        .submit_additional(
            &terminal,
            request.exhibitor_id,
            request.guest_name,
            request.company_name,
        )
        .await?;
    Ok(Json(view))
}

/// Acknowledge the displayed result.
///
/// # Errors
///
/// 401 without a session, 422 for a bad terminal name.
pub async fn reset(
    State(state): State<AppState>,
    _session: SessionContext,
    Path(terminal): Path<String>,
) -> Result<Json<TerminalView>, AppError> {
    Ok(Json(state.terminals.reset(&terminal).await?))
}
