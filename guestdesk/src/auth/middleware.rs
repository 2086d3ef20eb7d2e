//! Authentication extractors.
//!
//! - [`BearerToken`]: `Authorization: Bearer <token>` parsed into a [`SessionId`]
//! - [`SessionContext`]: any signed-in principal
//! - [`ExhibitorSession`]: an exhibitor, with their profile
//! - [`OrganizerSession`]: an organizer
//!
//! ```rust,ignore
//! async fn list_guests(
//!     State(state): State<AppState>,
//!     exhibitor: ExhibitorSession,
//! ) -> Result<Json<Vec<Guest>>, AppError> {
//!     // exhibitor.exhibitor.id scopes the query
//! }
//! ```

use super::service::{AuthError, AuthService, SessionContext};
use crate::types::{Exhibitor, Role, Session, SessionId};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use guestdesk_web::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Session token extracted from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct BearerToken(pub SessionId);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
        })?;

        let uuid = Uuid::parse_str(token.trim())
            .map_err(|_| AppError::unauthorized("Invalid session token format"))?;

        Ok(Self(SessionId::from_uuid(uuid)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let auth = Arc::<AuthService>::from_ref(state);
        Ok(auth.authenticate(token).await?)
    }
}

/// A signed-in exhibitor.
#[derive(Debug, Clone)]
pub struct ExhibitorSession {
    /// The validated session
    pub session: Session,
    /// The exhibitor's profile
    pub exhibitor: Exhibitor,
}

#[async_trait]
impl<S> FromRequestParts<S> for ExhibitorSession
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = SessionContext::from_request_parts(parts, state).await?;
        match (context.session.role, context.exhibitor) {
            (Role::Exhibitor, Some(exhibitor)) => Ok(Self {
                session: context.session,
                exhibitor,
            }),
            _ => Err(AuthError::Forbidden(Role::Exhibitor.as_str()).into()),
        }
    }
}

/// A signed-in organizer.
#[derive(Debug, Clone)]
pub struct OrganizerSession {
    /// The validated session
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for OrganizerSession
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = SessionContext::from_request_parts(parts, state).await?;
        if context.session.role != Role::Organizer {
            return Err(AuthError::Forbidden(Role::Organizer.as_str()).into());
        }
        Ok(Self {
            session: context.session,
        })
    }
}
