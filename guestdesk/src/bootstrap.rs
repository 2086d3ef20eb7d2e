//! Infrastructure setup for the server binary.
//!
//! Connects the `PostgreSQL` pool, applies migrations and provisions the
//! organizer account named in configuration.
//!
//! ```rust,ignore
//! let config = Config::from_env();
//! let store = connect(&config).await?;
//! let state = AppState::new(Arc::new(store), &config, Arc::new(SystemClock));
//! provision_organizer(&state.auth, &config).await?;
//! ```

use crate::auth::{AuthError, AuthService};
use crate::config::Config;
use crate::error::RepositoryError;
use crate::repository::PostgresRepository;
use crate::types::Role;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::{info, warn};

/// Open the connection pool and bring the schema up to date.
///
/// # Errors
///
/// Returns error if the database is unreachable or a migration fails.
pub async fn connect(config: &Config) -> Result<PostgresRepository, RepositoryError> {
    info!(
        max_connections = config.postgres.max_connections,
        "Connecting to database..."
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .min_connections(config.postgres.min_connections)
        .acquire_timeout(Duration::from_secs(config.postgres.connect_timeout))
        .connect(&config.postgres.url)
        .await?;

    let store = PostgresRepository::new(pool);

    info!("Running migrations...");
    store.migrate().await?;
    info!("Database ready");

    Ok(store)
}

/// Create or refresh the organizer account from `ORGANIZER_EMAIL` and
/// `ORGANIZER_PASSWORD`.
///
/// Returns `false` when either variable is unset.
///
/// # Errors
///
/// Returns error if the credentials are invalid or storage fails.
pub async fn provision_organizer(auth: &AuthService, config: &Config) -> Result<bool, AuthError> {
    let (Some(email), Some(password)) = (
        config.auth.organizer_email.as_deref(),
        config.auth.organizer_password.as_deref(),
    ) else {
        if config.auth.organizer_email.is_some() {
            warn!("ORGANIZER_EMAIL set without ORGANIZER_PASSWORD, skipping organizer account");
        }
        return Ok(false);
    };

    let account = auth.provision_account(email, password, Role::Organizer).await?;
    info!(account_id = %account.id, email = %account.email, "Organizer account ready");
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use guestdesk_testing::test_clock;
    use std::sync::Arc;

    fn auth() -> AuthService {
        let repo = Arc::new(InMemoryRepository::new());
        AuthService::new(
            repo.clone(),
            repo.clone(),
            repo,
            Arc::new(test_clock()),
            chrono::Duration::hours(1),
        )
    }

    #[tokio::test]
    async fn test_organizer_provisioned_from_config() {
        let auth = auth();
        let mut config = Config::from_env();
        config.auth.organizer_email = Some("organizer@example.com".to_string());
        config.auth.organizer_password = Some("organizer-pass".to_string());

        assert!(provision_organizer(&auth, &config).await.unwrap());

        let session = auth
            .sign_in("organizer@example.com", "organizer-pass")
            .await
            .unwrap();
        assert_eq!(session.role, Role::Organizer);
    }

    #[tokio::test]
    async fn test_missing_password_skips_provisioning() {
        let auth = auth();
        let mut config = Config::from_env();
        config.auth.organizer_email = Some("organizer@example.com".to_string());
        config.auth.organizer_password = None;

        assert!(!provision_organizer(&auth, &config).await.unwrap());
    }
}
