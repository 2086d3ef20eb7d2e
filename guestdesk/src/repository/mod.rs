//! Storage traits.
//!
//! Services and reducers only see these traits. [`postgres`] implements them
//! with `sqlx`; [`memory`] keeps everything in a mutex for tests and local
//! runs without a database.

use crate::error::RepositoryError;
use crate::types::{
    Account, Exhibitor, ExhibitorId, Guest, GuestDetails, GuestId, NewGuest, ProfileUpdate,
    Session, SessionId,
};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Result alias for repository calls.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Guest storage.
#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Look up a guest by id.
    async fn find(&self, id: GuestId) -> RepositoryResult<Option<Guest>>;

    /// Guests of one exhibitor, newest first.
    async fn list_for_exhibitor(&self, exhibitor_id: ExhibitorId) -> RepositoryResult<Vec<Guest>>;

    /// Every guest, newest first.
    async fn list_all(&self) -> RepositoryResult<Vec<Guest>>;

    /// Insert one guest.
    async fn insert(&self, guest: NewGuest) -> RepositoryResult<Guest>;

    /// Insert a batch of guests atomically.
    async fn insert_many(&self, guests: Vec<NewGuest>) -> RepositoryResult<Vec<Guest>>;

    /// Replace a guest's editable fields if it belongs to `exhibitor_id`.
    async fn update_details(
        &self,
        exhibitor_id: ExhibitorId,
        id: GuestId,
        details: GuestDetails,
    ) -> RepositoryResult<Option<Guest>>;

    /// Delete a guest if it belongs to `exhibitor_id`. Returns whether a row was removed.
    async fn delete(&self, exhibitor_id: ExhibitorId, id: GuestId) -> RepositoryResult<bool>;

    /// Move an `invited` guest to `checked_in`.
    ///
    /// Returns `false` when no row changed: the guest does not exist or has
    /// already attended.
    async fn mark_checked_in(&self, id: GuestId) -> RepositoryResult<bool>;
}

/// Exhibitor storage.
#[async_trait]
pub trait ExhibitorRepository: Send + Sync {
    /// Return the exhibitor, creating it with a placeholder company name if absent.
    async fn ensure(&self, id: ExhibitorId, email: &str) -> RepositoryResult<Exhibitor>;

    /// Look up an exhibitor.
    async fn find(&self, id: ExhibitorId) -> RepositoryResult<Option<Exhibitor>>;

    /// Every exhibitor, ordered by company name.
    async fn list(&self) -> RepositoryResult<Vec<Exhibitor>>;

    /// Change company name and booth number.
    async fn update_profile(
        &self,
        id: ExhibitorId,
        profile: ProfileUpdate,
    ) -> RepositoryResult<Option<Exhibitor>>;
}

/// Account storage.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Look up an account by lowercased email.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Account>>;

    /// Insert an account, or replace hash and role of the one with the same email.
    async fn upsert(&self, account: Account) -> RepositoryResult<Account>;
}

/// Session storage.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session.
    async fn create(&self, session: Session) -> RepositoryResult<()>;

    /// Look up a session.
    async fn find(&self, id: SessionId) -> RepositoryResult<Option<Session>>;

    /// Remove a session. Returns whether it existed.
    async fn delete(&self, id: SessionId) -> RepositoryResult<bool>;
}

/// Cheap connectivity check used by the readiness probe.
#[async_trait]
pub trait Ping: Send + Sync {
    /// Round-trip to the store.
    async fn ping(&self) -> RepositoryResult<()>;
}
