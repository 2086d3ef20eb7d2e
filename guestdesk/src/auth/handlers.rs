//! Authentication endpoints.

use super::middleware::{BearerToken, OrganizerSession};
use super::service::{AuthService, SessionContext};
use crate::types::{AccountId, Role};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use guestdesk_web::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sign-in request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    /// Login email
    pub email: String,
    /// Plain password
    pub password: String,
}

/// Sign-in response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// When the token stops working
    pub expires_at: DateTime<Utc>,
    /// Role of the signed-in account
    pub role: Role,
}

/// Sign in with email and password.
///
/// ```text
/// POST /auth/sign-in
/// {"email": "booth@example.com", "password": "..."}
/// ```
///
/// # Errors
///
/// 401 for bad credentials.
pub async fn sign_in(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let session = auth.sign_in(&request.email, &request.password).await?;
    Ok(Json(SignInResponse {
        token: session.id.to_string(),
        expires_at: session.expires_at,
        role: session.role,
    }))
}

/// Revoke the caller's session.
///
/// ```text
/// POST /auth/sign-out
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// 401 without a bearer token.
pub async fn sign_out(
    State(auth): State<Arc<AuthService>>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, AppError> {
    auth.sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current session and, for exhibitors, their profile.
///
/// # Errors
///
/// 401 for a missing, unknown or expired token.
#[allow(clippy::unused_async)]
pub async fn current_session(context: SessionContext) -> Result<Json<SessionContext>, AppError> {
    Ok(Json(context))
}

/// Account provisioning request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionAccountRequest {
    /// Login email
    pub email: String,
    /// Initial password
    pub password: String,
    /// Role, exhibitor unless stated
    #[serde(default = "default_role")]
    pub role: Role,
}

const fn default_role() -> Role {
    Role::Exhibitor
}

/// Provisioned account (never includes the hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    /// Account id (also the exhibitor id)
    pub id: AccountId,
    /// Login email
    pub email: String,
    /// Account role
    pub role: Role,
}

/// Create or reset an account. Organizer only.
///
/// ```text
/// POST /api/accounts
/// {"email": "booth@example.com", "password": "...", "role": "exhibitor"}
/// ```
///
/// # Errors
///
/// 403 for non-organizers, 422 for invalid input.
pub async fn provision_account(
    State(auth): State<Arc<AuthService>>,
    organizer: OrganizerSession,
    Json(request): Json<ProvisionAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let account = auth
        .provision_account(&request.email, &request.password, request.role)
        .await?;

    tracing::info!(
        organizer = %organizer.session.account_id,
        account_id = %account.id,
        "Organizer provisioned account"
    );

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            id: account.id,
            email: account.email,
            role: account.role,
        }),
    ))
}
