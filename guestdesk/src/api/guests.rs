//! Exhibitor guest list endpoints.
//!
//! - GET /api/guests - List guests, newest first
//! - POST /api/guests - Register one guest
//! - POST /api/guests/import - Register every row of a CSV body
//! - PUT /api/guests/:id - Edit a guest
//! - DELETE /api/guests/:id?confirm=true - Delete a guest

use crate::auth::ExhibitorSession;
use crate::server::state::AppState;
use crate::types::{Guest, GuestDetails, GuestId};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use guestdesk_web::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response after a CSV import.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    /// Number of guests created
    pub imported: usize,
    /// The created guests
    pub guests: Vec<Guest>,
}

/// Query string for deletes.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Must be `true`; deleting cannot be undone
    #[serde(default)]
    pub confirm: bool,
}

/// List the caller's guests, newest first.
///
/// # Errors
///
/// 401/403 unless signed in as an exhibitor.
pub async fn list_guests(
    State(state): State<AppState>,
    session: ExhibitorSession,
) -> Result<Json<Vec<Guest>>, AppError> {
    Ok(Json(state.registry.list(session.exhibitor.id).await?))
}

/// Register one guest.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/guests \
///   -H "Authorization: Bearer $TOKEN" \
///   -d '{"guest_name": "Ada Lovelace", "company_name": "Analytical Engines"}'
/// ```
///
/// # Errors
///
/// 422 when the name is blank.
pub async fn create_guest(
    State(state): State<AppState>,
    session: ExhibitorSession,
    Json(details): Json<GuestDetails>,
) -> Result<(StatusCode, Json<Guest>), AppError> {
    let guest = state.registry.create(session.exhibitor.id, details).await?;
    Ok((StatusCode::CREATED, Json(guest)))
}

/// Register every row of a CSV body, all or nothing.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/guests/import \
///   -H "Authorization: Bearer $TOKEN" \
///   --data-binary @guests.csv
/// ```
///
/// # Errors
///
/// 422 when the file is rejected; nothing is inserted.
pub async fn import_guests(
    State(state): State<AppState>,
    session: ExhibitorSession,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportResponse>), AppError> {
    let guests = state
        .registry
        .import_csv(session.exhibitor.id, &body)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            imported: guests.len(),
            guests,
        }),
    ))
}

/// Replace a guest's name, company, department and email.
///
/// # Errors
///
/// 404 if the guest is not the caller's, 422 for a blank name.
pub async fn update_guest(
    State(state): State<AppState>,
    session: ExhibitorSession,
    Path(id): Path<Uuid>,
    Json(details): Json<GuestDetails>,
) -> Result<Json<Guest>, AppError> {
    let guest = state
        .registry
        .update(session.exhibitor.id, GuestId::from_uuid(id), details)
        .await?;
    Ok(Json(guest))
}

/// Delete a guest.
///
/// # Errors
///
/// 422 without `confirm=true`, 404 if the guest is not the caller's.
pub async fn delete_guest(
    State(state): State<AppState>,
    session: ExhibitorSession,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, AppError> {
    state
        .registry
        .delete(session.exhibitor.id, GuestId::from_uuid(id), query.confirm)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
