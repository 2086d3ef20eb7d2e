//! Public invitation pages. Knowing the guest id is enough to open them.
//!
//! - GET /invite/:id - HTML page
//! - GET /invite/:id/document - A4 SVG download

use super::attachment;
use crate::server::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse},
};
use guestdesk_web::AppError;

/// The invitation as an HTML page.
///
/// # Errors
///
/// 404 for unknown or malformed ids.
pub async fn invitation_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let invitation = state.invitations.load(&id).await?;
    Ok(Html(state.invitations.page_html(&invitation)?))
}

/// The invitation on an A4 page, as a download.
///
/// # Errors
///
/// 404 for unknown or malformed ids.
pub async fn invitation_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invitation = state.invitations.load(&id).await?;
    let document = state.invitations.document(&invitation)?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&document.file_name)),
        ],
        document.svg,
    ))
}
