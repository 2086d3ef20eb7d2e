//! `PostgreSQL` repository.

use super::{
    AccountRepository, ExhibitorRepository, GuestRepository, Ping, RepositoryResult,
    SessionRepository,
};
use crate::error::RepositoryError;
use crate::types::{
    Account, AccountId, Exhibitor, ExhibitorId, Guest, GuestDetails, GuestId, NewGuest,
    ProfileUpdate, Session, SessionId, PLACEHOLDER_COMPANY_NAME,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

type GuestRow = (Uuid, Uuid, String, String, String, String, String, DateTime<Utc>);
type ExhibitorRow = (Uuid, String, String, String);
type AccountRow = (Uuid, String, String, String);
type SessionRow = (Uuid, Uuid, String, String, DateTime<Utc>, DateTime<Utc>);

const GUEST_COLUMNS: &str =
    "id, exhibitor_id, guest_name, company_name, department, email, status, created_at";

fn guest_from_row(row: GuestRow) -> RepositoryResult<Guest> {
    let (id, exhibitor_id, guest_name, company_name, department, email, status, created_at) = row;
    Ok(Guest {
        id: GuestId::from_uuid(id),
        exhibitor_id: ExhibitorId::from_uuid(exhibitor_id),
        guest_name,
        company_name,
        department,
        email,
        status: status
            .parse()
            .map_err(|e| RepositoryError::Corrupt(format!("guest {id}: {e}")))?,
        created_at,
    })
}

fn guests_from_rows(rows: Vec<GuestRow>) -> RepositoryResult<Vec<Guest>> {
    rows.into_iter().map(guest_from_row).collect()
}

fn exhibitor_from_row((id, company_name, booth_number, email): ExhibitorRow) -> Exhibitor {
    Exhibitor {
        id: ExhibitorId::from_uuid(id),
        company_name,
        booth_number,
        email,
    }
}

fn account_from_row((id, email, password_hash, role): AccountRow) -> RepositoryResult<Account> {
    Ok(Account {
        id: AccountId::from_uuid(id),
        email,
        password_hash,
        role: role
            .parse()
            .map_err(|e| RepositoryError::Corrupt(format!("account {id}: {e}")))?,
    })
}

/// `PostgreSQL`-backed implementation of every repository trait.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new `PostgresRepository`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns error if a migration fails to apply.
    pub async fn migrate(&self) -> RepositoryResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl GuestRepository for PostgresRepository {
    #[tracing::instrument(skip(self), fields(guest_id = %id))]
    async fn find(&self, id: GuestId) -> RepositoryResult<Option<Guest>> {
        let row: Option<GuestRow> =
            sqlx::query_as(&format!("SELECT {GUEST_COLUMNS} FROM guests WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.map(guest_from_row).transpose()
    }

    #[tracing::instrument(skip(self), fields(exhibitor_id = %exhibitor_id))]
    async fn list_for_exhibitor(&self, exhibitor_id: ExhibitorId) -> RepositoryResult<Vec<Guest>> {
        let rows: Vec<GuestRow> = sqlx::query_as(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests
             WHERE exhibitor_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(exhibitor_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        guests_from_rows(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> RepositoryResult<Vec<Guest>> {
        let rows: Vec<GuestRow> = sqlx::query_as(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        guests_from_rows(rows)
    }

    #[tracing::instrument(skip(self, guest), fields(exhibitor_id = %guest.exhibitor_id))]
    async fn insert(&self, guest: NewGuest) -> RepositoryResult<Guest> {
        let row: GuestRow = sqlx::query_as(&format!(
            "INSERT INTO guests (id, exhibitor_id, guest_name, company_name, department, email, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {GUEST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(guest.exhibitor_id.as_uuid())
        .bind(&guest.details.guest_name)
        .bind(&guest.details.company_name)
        .bind(&guest.details.department)
        .bind(&guest.details.email)
        .bind(guest.status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        guest_from_row(row)
    }

    #[tracing::instrument(skip(self, guests), fields(count = guests.len()))]
    async fn insert_many(&self, guests: Vec<NewGuest>) -> RepositoryResult<Vec<Guest>> {
        let mut tx = self.pool.begin().await?;
        let created_at = Utc::now();
        let mut inserted = Vec::with_capacity(guests.len());

        for guest in guests {
            let row: GuestRow = sqlx::query_as(&format!(
                "INSERT INTO guests (id, exhibitor_id, guest_name, company_name, department, email, status, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING {GUEST_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(guest.exhibitor_id.as_uuid())
            .bind(&guest.details.guest_name)
            .bind(&guest.details.company_name)
            .bind(&guest.details.department)
            .bind(&guest.details.email)
            .bind(guest.status.as_str())
            .bind(created_at)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(guest_from_row(row)?);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    #[tracing::instrument(skip(self, details), fields(guest_id = %id))]
    async fn update_details(
        &self,
        exhibitor_id: ExhibitorId,
        id: GuestId,
        details: GuestDetails,
    ) -> RepositoryResult<Option<Guest>> {
        let row: Option<GuestRow> = sqlx::query_as(&format!(
            "UPDATE guests
             SET guest_name = $3, company_name = $4, department = $5, email = $6
             WHERE id = $1 AND exhibitor_id = $2
             RETURNING {GUEST_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(exhibitor_id.as_uuid())
        .bind(&details.guest_name)
        .bind(&details.company_name)
        .bind(&details.department)
        .bind(&details.email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(guest_from_row).transpose()
    }

    #[tracing::instrument(skip(self), fields(guest_id = %id))]
    async fn delete(&self, exhibitor_id: ExhibitorId, id: GuestId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1 AND exhibitor_id = $2")
            .bind(id.as_uuid())
            .bind(exhibitor_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self), fields(guest_id = %id))]
    async fn mark_checked_in(&self, id: GuestId) -> RepositoryResult<bool> {
        // Conditional on the current status so concurrent terminals cannot both succeed
        let result = sqlx::query(
            "UPDATE guests SET status = 'checked_in'
             WHERE id = $1 AND status = 'invited'",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl ExhibitorRepository for PostgresRepository {
    #[tracing::instrument(skip(self, email), fields(exhibitor_id = %id))]
    async fn ensure(&self, id: ExhibitorId, email: &str) -> RepositoryResult<Exhibitor> {
        let created = sqlx::query(
            "INSERT INTO exhibitors (id, company_name, booth_number, email)
             VALUES ($1, $2, '', $3)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id.as_uuid())
        .bind(PLACEHOLDER_COMPANY_NAME)
        .bind(email)
        .execute(&self.pool)
        .await?;

        if created.rows_affected() == 1 {
            tracing::info!(exhibitor_id = %id, "Created exhibitor profile on first sign-in");
        }

        let row: ExhibitorRow = sqlx::query_as(
            "SELECT id, company_name, booth_number, email FROM exhibitors WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exhibitor_from_row(row))
    }

    async fn find(&self, id: ExhibitorId) -> RepositoryResult<Option<Exhibitor>> {
        let row: Option<ExhibitorRow> = sqlx::query_as(
            "SELECT id, company_name, booth_number, email FROM exhibitors WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(exhibitor_from_row))
    }

    async fn list(&self) -> RepositoryResult<Vec<Exhibitor>> {
        let rows: Vec<ExhibitorRow> = sqlx::query_as(
            "SELECT id, company_name, booth_number, email FROM exhibitors
             ORDER BY company_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(exhibitor_from_row).collect())
    }

    #[tracing::instrument(skip(self, profile), fields(exhibitor_id = %id))]
    async fn update_profile(
        &self,
        id: ExhibitorId,
        profile: ProfileUpdate,
    ) -> RepositoryResult<Option<Exhibitor>> {
        let row: Option<ExhibitorRow> = sqlx::query_as(
            "UPDATE exhibitors SET company_name = $2, booth_number = $3
             WHERE id = $1
             RETURNING id, company_name, booth_number, email",
        )
        .bind(id.as_uuid())
        .bind(&profile.company_name)
        .bind(&profile.booth_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(exhibitor_from_row))
    }
}

#[async_trait]
impl AccountRepository for PostgresRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, email, password_hash, role FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(account_from_row).transpose()
    }

    #[tracing::instrument(skip(self, account), fields(email = %account.email))]
    async fn upsert(&self, account: Account) -> RepositoryResult<Account> {
        let row: AccountRow = sqlx::query_as(
            "INSERT INTO accounts (id, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email) DO UPDATE SET
                password_hash = EXCLUDED.password_hash,
                role = EXCLUDED.role
             RETURNING id, email, password_hash, role",
        )
        .bind(account.id.as_uuid())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        account_from_row(row)
    }
}

#[async_trait]
impl SessionRepository for PostgresRepository {
    async fn create(&self, session: Session) -> RepositoryResult<()> {
        sqlx::query(
            "INSERT INTO sessions (id, account_id, email, role, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(session.id.as_uuid())
        .bind(session.account_id.as_uuid())
        .bind(&session.email)
        .bind(session.role.as_str())
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, id: SessionId) -> RepositoryResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, account_id, email, role, created_at, expires_at
             FROM sessions WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, account_id, email, role, created_at, expires_at)| {
            Ok(Session {
                id: SessionId::from_uuid(id),
                account_id: AccountId::from_uuid(account_id),
                email,
                role: role
                    .parse()
                    .map_err(|e| RepositoryError::Corrupt(format!("session {id}: {e}")))?,
                created_at,
                expires_at,
            })
        })
        .transpose()
    }

    async fn delete(&self, id: SessionId) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl Ping for PostgresRepository {
    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
