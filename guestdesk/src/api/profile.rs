//! Exhibitor profile settings.

use crate::auth::ExhibitorSession;
use crate::server::state::AppState;
use crate::types::{Exhibitor, ProfileUpdate};
use axum::{extract::State, Json};
use guestdesk_web::AppError;

/// The caller's profile.
///
/// # Errors
///
/// 401/403 unless signed in as an exhibitor.
#[allow(clippy::unused_async)]
pub async fn get_profile(session: ExhibitorSession) -> Result<Json<Exhibitor>, AppError> {
    Ok(Json(session.exhibitor))
}

/// Change company name and booth number.
///
/// ```bash
/// curl -X PUT http://localhost:8080/api/profile \
///   -H "Authorization: Bearer $TOKEN" \
///   -d '{"company_name": "Acme", "booth_number": "B-12"}'
/// ```
///
/// # Errors
///
/// 422 when the company name is blank.
pub async fn update_profile(
    State(state): State<AppState>,
    session: ExhibitorSession,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Exhibitor>, AppError> {
    let company_name = update.company_name.trim().to_string();
    if company_name.is_empty() {
        return Err(AppError::validation("Company name is required"));
    }

    let id = session.exhibitor.id;
    let exhibitor = state
        .exhibitors
        .update_profile(
            id,
            ProfileUpdate {
                company_name,
                booth_number: update.booth_number.trim().to_string(),
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("Exhibitor", id))?;

    tracing::info!(exhibitor_id = %id, "Profile updated");
    Ok(Json(exhibitor))
}
