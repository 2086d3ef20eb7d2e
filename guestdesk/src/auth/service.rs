//! Sign-in, session validation and account provisioning.

use super::password;
use crate::error::RepositoryError;
use crate::repository::{AccountRepository, ExhibitorRepository, SessionRepository};
use crate::types::{Account, AccountId, Exhibitor, Role, Session, SessionId};
use guestdesk_core::environment::Clock;
use guestdesk_web::AppError;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Shortest password accepted when provisioning an account.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Token missing, malformed or unknown
    #[error("Authentication required")]
    InvalidToken,

    /// Token known but past its expiry
    #[error("Session expired")]
    SessionExpired,

    /// Authenticated but not allowed
    #[error("This action requires the {0} role")]
    Forbidden(&'static str),

    /// Bad provisioning input
    #[error("{0}")]
    Validation(String),

    /// Hashing failed or the hashing task died
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// Storage failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::SessionExpired => {
                Self::unauthorized(err.to_string())
            },
            AuthError::Forbidden(_) => Self::forbidden(err.to_string()),
            AuthError::Validation(message) => Self::validation(message),
            AuthError::PasswordHash(_) => {
                Self::internal("Authentication is unavailable").with_source(err)
            },
            AuthError::Repository(source) => source.into(),
        }
    }
}

/// The principal behind a request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    /// The validated session
    pub session: Session,
    /// The exhibitor profile, for exhibitor accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhibitor: Option<Exhibitor>,
}

/// Authentication service over the account, session and exhibitor stores.
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    sessions: Arc<dyn SessionRepository>,
    exhibitors: Arc<dyn ExhibitorRepository>,
    clock: Arc<dyn Clock>,
    session_ttl: chrono::Duration,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    /// Creates a new `AuthService`.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        sessions: Arc<dyn SessionRepository>,
        exhibitors: Arc<dyn ExhibitorRepository>,
        clock: Arc<dyn Clock>,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            accounts,
            sessions,
            exhibitors,
            clock,
            session_ttl,
        }
    }

    /// Exchange email and password for a new session.
    ///
    /// Exhibitor accounts get their profile created on first sign-in.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] for an unknown email or wrong password;
    /// storage and hashing failures otherwise.
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        let Some(account) = self.accounts.find_by_email(&email).await? else {
            tracing::info!("Sign-in for unknown email");
            crate::metrics::record_sign_in(false);
            return Err(AuthError::InvalidCredentials);
        };

        let candidate = password.to_string();
        let hash = account.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || {
            password::verify_password(&candidate, &hash)
        })
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        if !verified {
            tracing::info!(account_id = %account.id, "Sign-in with wrong password");
            crate::metrics::record_sign_in(false);
            return Err(AuthError::InvalidCredentials);
        }

        if account.role == Role::Exhibitor {
            self.exhibitors
                .ensure(account.id.into(), &account.email)
                .await?;
        }

        let now = self.clock.now();
        let session = Session {
            id: SessionId::new(),
            account_id: account.id,
            email: account.email,
            role: account.role,
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        self.sessions.create(session.clone()).await?;

        crate::metrics::record_sign_in(true);
        tracing::info!(account_id = %session.account_id, role = session.role.as_str(), "Signed in");
        Ok(session)
    }

    /// Resolve a bearer token into a session context.
    ///
    /// Expired sessions are deleted on sight.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] for unknown tokens,
    /// [`AuthError::SessionExpired`] past the expiry.
    pub async fn authenticate(&self, token: SessionId) -> Result<SessionContext, AuthError> {
        let Some(session) = self.sessions.find(token).await? else {
            return Err(AuthError::InvalidToken);
        };

        if session.is_expired(self.clock.now()) {
            self.sessions.delete(token).await?;
            return Err(AuthError::SessionExpired);
        }

        let exhibitor = match session.role {
            Role::Exhibitor => Some(
                self.exhibitors
                    .ensure(session.account_id.into(), &session.email)
                    .await?,
            ),
            Role::Organizer => None,
        };

        Ok(SessionContext { session, exhibitor })
    }

    /// Revoke a session.
    ///
    /// # Errors
    ///
    /// Returns storage failures.
    pub async fn sign_out(&self, token: SessionId) -> Result<(), AuthError> {
        if self.sessions.delete(token).await? {
            tracing::info!(session_id = %token, "Signed out");
        }
        Ok(())
    }

    /// Create an account, or reset the password and role of an existing one.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`] for an empty email or a short password.
    #[tracing::instrument(skip(self, password))]
    pub async fn provision_account(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Account, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("A valid email is required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let plain = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
            .map_err(AuthError::PasswordHash)?;

        let account = self
            .accounts
            .upsert(Account {
                id: AccountId::new(),
                email,
                password_hash,
                role,
            })
            .await?;

        tracing::info!(account_id = %account.id, role = role.as_str(), "Account provisioned");
        Ok(account)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use crate::types::PLACEHOLDER_COMPANY_NAME;
    use guestdesk_testing::{test_clock, FixedClock};

    fn service() -> (AuthService, Arc<FixedClock>) {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = Arc::new(test_clock());
        let service = AuthService::new(
            repo.clone(),
            repo.clone(),
            repo,
            clock.clone(),
            chrono::Duration::hours(1),
        );
        (service, clock)
    }

    #[tokio::test]
    async fn test_sign_in_creates_exhibitor_profile() {
        let (auth, _) = service();
        auth.provision_account("Booth@Example.com ", "hunter22!", Role::Exhibitor)
            .await
            .unwrap();

        let session = auth.sign_in("booth@example.com", "hunter22!").await.unwrap();
        let context = auth.authenticate(session.id).await.unwrap();

        let exhibitor = context.exhibitor.unwrap();
        assert_eq!(exhibitor.company_name, PLACEHOLDER_COMPANY_NAME);
        assert_eq!(exhibitor.email, "booth@example.com");
        assert_eq!(exhibitor.id, session.account_id.into());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let (auth, _) = service();
        auth.provision_account("org@example.com", "organizer-pass", Role::Organizer)
            .await
            .unwrap();

        let wrong = auth.sign_in("org@example.com", "nope").await.unwrap_err();
        let unknown = auth.sign_in("who@example.com", "nope").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_removed() {
        let (auth, clock) = service();
        auth.provision_account("org@example.com", "organizer-pass", Role::Organizer)
            .await
            .unwrap();
        let session = auth.sign_in("org@example.com", "organizer-pass").await.unwrap();

        clock.advance(chrono::Duration::hours(2));

        assert!(matches!(
            auth.authenticate(session.id).await,
            Err(AuthError::SessionExpired)
        ));
        assert!(matches!(
            auth.authenticate(session.id).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_sign_out_revokes() {
        let (auth, _) = service();
        auth.provision_account("org@example.com", "organizer-pass", Role::Organizer)
            .await
            .unwrap();
        let session = auth.sign_in("org@example.com", "organizer-pass").await.unwrap();

        auth.sign_out(session.id).await.unwrap();
        assert!(auth.authenticate(session.id).await.is_err());
    }

    #[tokio::test]
    async fn test_provision_validates_input() {
        let (auth, _) = service();
        assert!(matches!(
            auth.provision_account("", "long enough", Role::Exhibitor).await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.provision_account("a@example.com", "short", Role::Exhibitor).await,
            Err(AuthError::Validation(_))
        ));
    }
}
