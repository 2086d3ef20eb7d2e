//! Exhibitor guest registry.
//!
//! Every operation is scoped to one exhibitor. A guest id that belongs to
//! someone else behaves exactly like one that does not exist.

pub mod import;

pub use import::{parse_guests, ImportError};

use crate::error::RepositoryError;
use crate::repository::GuestRepository;
use crate::types::{ExhibitorId, Guest, GuestDetails, GuestId, NewGuest};
use guestdesk_web::AppError;
use std::sync::Arc;
use thiserror::Error;

/// Registry failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The guest name was empty after trimming
    #[error("Guest name is required")]
    NameRequired,

    /// Delete was called without confirmation
    #[error("Deleting a guest cannot be undone; repeat with confirm=true")]
    ConfirmationRequired,

    /// No such guest for this exhibitor
    #[error("Guest with id {0} not found")]
    NotFound(GuestId),

    /// Rejected CSV batch
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Storage failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NameRequired | RegistryError::ConfirmationRequired => {
                Self::validation(err.to_string())
            },
            RegistryError::NotFound(id) => Self::not_found("Guest", id),
            RegistryError::Import(source) => source.into(),
            RegistryError::Repository(source) => source.into(),
        }
    }
}

/// Guest list operations for a signed-in exhibitor.
#[derive(Clone)]
pub struct GuestRegistry {
    guests: Arc<dyn GuestRepository>,
}

impl GuestRegistry {
    /// Creates a new `GuestRegistry`.
    #[must_use]
    pub fn new(guests: Arc<dyn GuestRepository>) -> Self {
        Self { guests }
    }

    /// All guests of the exhibitor, newest first.
    ///
    /// # Errors
    ///
    /// Returns storage failures.
    pub async fn list(&self, exhibitor_id: ExhibitorId) -> Result<Vec<Guest>, RegistryError> {
        Ok(self.guests.list_for_exhibitor(exhibitor_id).await?)
    }

    /// Register one guest as `invited`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NameRequired`] for a blank name.
    #[tracing::instrument(skip(self, details))]
    pub async fn create(
        &self,
        exhibitor_id: ExhibitorId,
        details: GuestDetails,
    ) -> Result<Guest, RegistryError> {
        let details = details.normalized().ok_or(RegistryError::NameRequired)?;
        let guest = self
            .guests
            .insert(NewGuest::invited(exhibitor_id, details))
            .await?;

        crate::metrics::record_guests_registered("form", 1);
        tracing::info!(guest_id = %guest.id, "Guest registered");
        Ok(guest)
    }

    /// Register every row of a CSV file as `invited`, all or nothing.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Import`] when the file is rejected; nothing is
    /// inserted in that case.
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn import_csv(
        &self,
        exhibitor_id: ExhibitorId,
        data: &[u8],
    ) -> Result<Vec<Guest>, RegistryError> {
        let rows = parse_guests(data)?;
        let batch = rows
            .into_iter()
            .map(|details| NewGuest::invited(exhibitor_id, details))
            .collect();

        let guests = self.guests.insert_many(batch).await?;

        crate::metrics::record_guests_registered("import", guests.len());
        tracing::info!(count = guests.len(), "Guests imported");
        Ok(guests)
    }

    /// Replace a guest's editable fields.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if the guest is not this exhibitor's,
    /// [`RegistryError::NameRequired`] for a blank name.
    #[tracing::instrument(skip(self, details))]
    pub async fn update(
        &self,
        exhibitor_id: ExhibitorId,
        id: GuestId,
        details: GuestDetails,
    ) -> Result<Guest, RegistryError> {
        let details = details.normalized().ok_or(RegistryError::NameRequired)?;
        self.guests
            .update_details(exhibitor_id, id, details)
            .await?
            .ok_or(RegistryError::NotFound(id))
    }

    /// Delete a guest. Irreversible, so the caller must confirm.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ConfirmationRequired`] unless `confirmed`,
    /// [`RegistryError::NotFound`] if the guest is not this exhibitor's.
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        exhibitor_id: ExhibitorId,
        id: GuestId,
        confirmed: bool,
    ) -> Result<(), RegistryError> {
        if !confirmed {
            return Err(RegistryError::ConfirmationRequired);
        }
        if !self.guests.delete(exhibitor_id, id).await? {
            return Err(RegistryError::NotFound(id));
        }

        tracing::info!(guest_id = %id, "Guest deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use crate::types::GuestStatus;
    use axum::http::StatusCode;

    fn registry() -> (GuestRegistry, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        (GuestRegistry::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_create_trims_and_defaults() {
        let (registry, _) = registry();
        let exhibitor = ExhibitorId::new();

        let guest = registry
            .create(exhibitor, GuestDetails::named("  Ada  "))
            .await
            .unwrap();

        assert_eq!(guest.guest_name, "Ada");
        assert_eq!(guest.company_name, "");
        assert_eq!(guest.status, GuestStatus::Invited);
        assert_eq!(guest.exhibitor_id, exhibitor);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let (registry, repo) = registry();
        let err = registry
            .create(ExhibitorId::new(), GuestDetails::named("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::NameRequired));
        assert_eq!(AppError::from(err).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_scoped() {
        let (registry, _) = registry();
        let mine = ExhibitorId::new();
        registry.create(mine, GuestDetails::named("first")).await.unwrap();
        registry.create(mine, GuestDetails::named("second")).await.unwrap();
        registry
            .create(ExhibitorId::new(), GuestDetails::named("other"))
            .await
            .unwrap();

        let names: Vec<_> = registry
            .list(mine)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.guest_name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_import_inserts_every_row() {
        let (registry, _) = registry();
        let exhibitor = ExhibitorId::new();

        let guests = registry
            .import_csv(exhibitor, b"name,company\nAda,Acme\nGrace,\nLinus,Globex\n")
            .await
            .unwrap();

        assert_eq!(guests.len(), 3);
        assert!(guests.iter().all(|g| g.status == GuestStatus::Invited));
        assert_eq!(registry.list(exhibitor).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_import_inserts_nothing() {
        let (registry, _) = registry();
        let exhibitor = ExhibitorId::new();

        let err = registry
            .import_csv(exhibitor, b"name\nAda\n\"\"\nGrace\n")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::Import(ImportError::EmptyName { line: 3 })));
        assert!(registry.list(exhibitor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_exhibitors_guest_is_not_found() {
        let (registry, _) = registry();
        let owner = ExhibitorId::new();
        let guest = registry.create(owner, GuestDetails::named("Ada")).await.unwrap();

        let intruder = ExhibitorId::new();
        assert!(matches!(
            registry.update(intruder, guest.id, GuestDetails::named("Eve")).await,
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.delete(intruder, guest.id, true).await,
            Err(RegistryError::NotFound(_))
        ));
        assert_eq!(registry.list(owner).await.unwrap()[0].guest_name, "Ada");
    }

    #[tokio::test]
    async fn test_update_keeps_status() {
        let (registry, repo) = registry();
        let owner = ExhibitorId::new();
        let guest = registry.create(owner, GuestDetails::named("Ada")).await.unwrap();
        assert!(repo.mark_checked_in(guest.id).await.unwrap());

        let updated = registry
            .update(
                owner,
                guest.id,
                GuestDetails {
                    guest_name: "Ada Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                    ..GuestDetails::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.guest_name, "Ada Lovelace");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(updated.status, GuestStatus::CheckedIn);
        assert_eq!(updated.id, guest.id);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (registry, _) = registry();
        let owner = ExhibitorId::new();
        let guest = registry.create(owner, GuestDetails::named("Ada")).await.unwrap();

        assert!(matches!(
            registry.delete(owner, guest.id, false).await,
            Err(RegistryError::ConfirmationRequired)
        ));
        assert_eq!(registry.list(owner).await.unwrap().len(), 1);

        registry.delete(owner, guest.id, true).await.unwrap();
        assert!(registry.list(owner).await.unwrap().is_empty());
    }
}
