//! In-memory repository.
//!
//! Backs unit and HTTP tests, and local runs without `PostgreSQL`. Behaves
//! like the `PostgreSQL` implementation, including the conditional check-in
//! and the exhibitor upsert, and can be switched into an outage to exercise
//! error paths.

use super::{
    AccountRepository, ExhibitorRepository, GuestRepository, Ping, RepositoryResult,
    SessionRepository,
};
use crate::error::RepositoryError;
use crate::types::{
    Account, Exhibitor, ExhibitorId, Guest, GuestDetails, GuestId, GuestStatus, NewGuest,
    ProfileUpdate, Session, SessionId, PLACEHOLDER_COMPANY_NAME,
};
use async_trait::async_trait;
use guestdesk_core::environment::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    // Insertion order, oldest first
    guests: Vec<Guest>,
    exhibitors: HashMap<ExhibitorId, Exhibitor>,
    accounts: HashMap<String, Account>,
    sessions: HashMap<SessionId, Session>,
}

/// Mutex-backed implementation of every repository trait.
pub struct InMemoryRepository {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
    writes_failing: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl InMemoryRepository {
    /// Empty repository stamping rows with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty repository stamping rows with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            unavailable: AtomicBool::new(false),
            writes_failing: AtomicBool::new(false),
            clock,
        }
    }

    /// Make every call fail with [`RepositoryError::Unavailable`] until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make guest writes fail while reads keep working.
    pub fn set_writes_failing(&self, failing: bool) {
        self.writes_failing.store(failing, Ordering::SeqCst);
    }

    /// Insert an exhibitor as-is.
    ///
    /// # Errors
    ///
    /// Returns error if the repository is unavailable.
    pub fn seed_exhibitor(&self, exhibitor: Exhibitor) -> RepositoryResult<()> {
        self.lock()?.exhibitors.insert(exhibitor.id, exhibitor);
        Ok(())
    }

    /// Insert a guest as-is, keeping its id and status.
    ///
    /// # Errors
    ///
    /// Returns error if the repository is unavailable.
    pub fn seed_guest(&self, guest: Guest) -> RepositoryResult<()> {
        self.lock()?.guests.push(guest);
        Ok(())
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, MemoryState>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store switched off".to_string(),
            ));
        }
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
    }

    fn lock_for_write(&self) -> RepositoryResult<MutexGuard<'_, MemoryState>> {
        if self.writes_failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store rejecting writes".to_string(),
            ));
        }
        self.lock()
    }

    fn build_guest(&self, guest: NewGuest) -> Guest {
        Guest {
            id: GuestId::new(),
            exhibitor_id: guest.exhibitor_id,
            guest_name: guest.details.guest_name,
            company_name: guest.details.company_name,
            department: guest.details.department,
            email: guest.details.email,
            status: guest.status,
            created_at: self.clock.now(),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("unavailable", &self.unavailable.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GuestRepository for InMemoryRepository {
    async fn find(&self, id: GuestId) -> RepositoryResult<Option<Guest>> {
        Ok(self.lock()?.guests.iter().find(|g| g.id == id).cloned())
    }

    async fn list_for_exhibitor(&self, exhibitor_id: ExhibitorId) -> RepositoryResult<Vec<Guest>> {
        Ok(self
            .lock()?
            .guests
            .iter()
            .rev()
            .filter(|g| g.exhibitor_id == exhibitor_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Guest>> {
        Ok(self.lock()?.guests.iter().rev().cloned().collect())
    }

    async fn insert(&self, guest: NewGuest) -> RepositoryResult<Guest> {
        let guest = self.build_guest(guest);
        self.lock_for_write()?.guests.push(guest.clone());
        Ok(guest)
    }

    async fn insert_many(&self, guests: Vec<NewGuest>) -> RepositoryResult<Vec<Guest>> {
        let guests: Vec<Guest> = guests.into_iter().map(|g| self.build_guest(g)).collect();
        self.lock_for_write()?.guests.extend(guests.iter().cloned());
        Ok(guests)
    }

    async fn update_details(
        &self,
        exhibitor_id: ExhibitorId,
        id: GuestId,
        details: GuestDetails,
    ) -> RepositoryResult<Option<Guest>> {
        let mut state = self.lock_for_write()?;
        let Some(guest) = state
            .guests
            .iter_mut()
            .find(|g| g.id == id && g.exhibitor_id == exhibitor_id)
        else {
            return Ok(None);
        };
        guest.guest_name = details.guest_name;
        guest.company_name = details.company_name;
        guest.department = details.department;
        guest.email = details.email;
        Ok(Some(guest.clone()))
    }

    async fn delete(&self, exhibitor_id: ExhibitorId, id: GuestId) -> RepositoryResult<bool> {
        let mut state = self.lock_for_write()?;
        let before = state.guests.len();
        state
            .guests
            .retain(|g| !(g.id == id && g.exhibitor_id == exhibitor_id));
        Ok(state.guests.len() < before)
    }

    async fn mark_checked_in(&self, id: GuestId) -> RepositoryResult<bool> {
        let mut state = self.lock_for_write()?;
        match state
            .guests
            .iter_mut()
            .find(|g| g.id == id && g.status == GuestStatus::Invited)
        {
            Some(guest) => {
                guest.status = GuestStatus::CheckedIn;
                Ok(true)
            },
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ExhibitorRepository for InMemoryRepository {
    async fn ensure(&self, id: ExhibitorId, email: &str) -> RepositoryResult<Exhibitor> {
        Ok(self
            .lock()?
            .exhibitors
            .entry(id)
            .or_insert_with(|| Exhibitor {
                id,
                company_name: PLACEHOLDER_COMPANY_NAME.to_string(),
                booth_number: String::new(),
                email: email.to_string(),
            })
            .clone())
    }

    async fn find(&self, id: ExhibitorId) -> RepositoryResult<Option<Exhibitor>> {
        Ok(self.lock()?.exhibitors.get(&id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Exhibitor>> {
        let mut exhibitors: Vec<Exhibitor> = self.lock()?.exhibitors.values().cloned().collect();
        exhibitors.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        Ok(exhibitors)
    }

    async fn update_profile(
        &self,
        id: ExhibitorId,
        profile: ProfileUpdate,
    ) -> RepositoryResult<Option<Exhibitor>> {
        let mut state = self.lock()?;
        Ok(state.exhibitors.get_mut(&id).map(|exhibitor| {
            exhibitor.company_name = profile.company_name;
            exhibitor.booth_number = profile.booth_number;
            exhibitor.clone()
        }))
    }
}

#[async_trait]
impl AccountRepository for InMemoryRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Account>> {
        Ok(self.lock()?.accounts.get(email).cloned())
    }

    async fn upsert(&self, account: Account) -> RepositoryResult<Account> {
        let mut state = self.lock()?;
        let stored = state
            .accounts
            .entry(account.email.clone())
            .and_modify(|existing| {
                existing.password_hash.clone_from(&account.password_hash);
                existing.role = account.role;
            })
            .or_insert(account);
        Ok(stored.clone())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn create(&self, session: Session) -> RepositoryResult<()> {
        self.lock()?.sessions.insert(session.id, session);
        Ok(())
    }

    async fn find(&self, id: SessionId) -> RepositoryResult<Option<Session>> {
        Ok(self.lock()?.sessions.get(&id).cloned())
    }

    async fn delete(&self, id: SessionId) -> RepositoryResult<bool> {
        Ok(self.lock()?.sessions.remove(&id).is_some())
    }
}

#[async_trait]
impl Ping for InMemoryRepository {
    async fn ping(&self) -> RepositoryResult<()> {
        self.lock().map(|_| ())
    }
}
