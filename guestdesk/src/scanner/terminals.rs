//! Reception terminals, one scanner store each.

use super::feed::{DecodeFeed, FeedOutcome};
use super::reducer::{
    ScannerAction, ScannerEnvironment, ScannerReducer, ScannerState, TokenSource,
};
use crate::types::ExhibitorId;
use guestdesk_runtime::{Store, StoreError};
use guestdesk_web::AppError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Store driving one terminal.
pub type ScannerStore = Store<ScannerState, ScannerAction, ScannerEnvironment, ScannerReducer>;

const MAX_TERMINAL_NAME_LEN: usize = 64;

/// Terminals a registry opens unless configured otherwise.
pub const DEFAULT_MAX_TERMINALS: usize = 32;

/// Terminal failures.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Terminal names are 1 to 64 characters of `[A-Za-z0-9_-]`
    #[error("Invalid terminal name")]
    InvalidName,

    /// Every terminal slot is taken
    #[error("No more than {0} reception terminals can be open")]
    LimitReached(usize),

    /// The terminal's store refused the action
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TerminalError> for AppError {
    fn from(err: TerminalError) -> Self {
        match err {
            TerminalError::InvalidName | TerminalError::LimitReached(_) => {
                Self::validation(err.to_string())
            },
            TerminalError::Store(source) => source.into(),
        }
    }
}

/// What a terminal shows.
#[derive(Debug, Clone, Serialize)]
pub struct TerminalView {
    /// Terminal name
    pub terminal: String,
    /// Scanner state
    #[serde(flatten)]
    pub state: ScannerState,
}

/// Camera batch result.
#[derive(Debug, Clone, Serialize)]
pub struct CameraView {
    /// What happened to the batch
    pub feed: FeedOutcome,
    /// Terminal display after the batch
    #[serde(flatten)]
    pub view: TerminalView,
}

#[derive(Clone)]
struct Terminal {
    store: ScannerStore,
    feed: DecodeFeed,
    worker: Arc<JoinHandle<()>>,
}

/// Lazily created reception terminals, keyed by name, up to a fixed count.
pub struct TerminalRegistry {
    environment: ScannerEnvironment,
    settle_timeout: Duration,
    max_terminals: usize,
    terminals: RwLock<HashMap<String, Terminal>>,
}

fn validate_name(name: &str) -> Result<(), TerminalError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_TERMINAL_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TerminalError::InvalidName)
    }
}

impl TerminalRegistry {
    /// Creates a new `TerminalRegistry`.
    ///
    /// Requests wait up to `settle_timeout` for a terminal's effects before
    /// answering with whatever the terminal shows at that point.
    #[must_use]
    pub fn new(environment: ScannerEnvironment, settle_timeout: Duration) -> Self {
        Self {
            environment,
            settle_timeout,
            max_terminals: DEFAULT_MAX_TERMINALS,
            terminals: RwLock::new(HashMap::new()),
        }
    }

    /// Limit how many terminals may be open at once.
    #[must_use]
    pub fn with_max_terminals(mut self, max_terminals: usize) -> Self {
        self.max_terminals = max_terminals;
        self
    }

    async fn terminal(&self, name: &str) -> Result<Terminal, TerminalError> {
        validate_name(name)?;

        if let Some(terminal) = self.terminals.read().await.get(name) {
            return Ok(terminal.clone());
        }

        let terminal = {
            let mut terminals = self.terminals.write().await;
            if let Some(terminal) = terminals.get(name) {
                return Ok(terminal.clone());
            }
            if terminals.len() >= self.max_terminals {
                tracing::warn!(terminal = name, max = self.max_terminals, "Terminal limit reached");
                return Err(TerminalError::LimitReached(self.max_terminals));
            }

            let store = ScannerStore::new(
                ScannerState::new(),
                ScannerReducer::new(),
                self.environment.clone(),
            );
            let (feed, worker) = DecodeFeed::spawn(store.clone());
            let terminal = Terminal {
                store,
                feed,
                worker: Arc::new(worker),
            };
            terminals.insert(name.to_string(), terminal.clone());
            terminal
        };

        tracing::info!(terminal = name, "Reception terminal opened");
        self.settle(&terminal.store, ScannerAction::LoadExhibitors)
            .await?;
        Ok(terminal)
    }

    async fn settle(&self, store: &ScannerStore, action: ScannerAction) -> Result<(), StoreError> {
        let mut handle = store.send(action).await?;
        if handle.wait_with_timeout(self.settle_timeout).await.is_err() {
            tracing::warn!(pending = handle.pending(), "Terminal did not settle in time");
        }
        Ok(())
    }

    async fn view_of(name: &str, store: &ScannerStore) -> TerminalView {
        TerminalView {
            terminal: name.to_string(),
            state: store.state(Clone::clone).await,
        }
    }

    /// Send an action and return the display once its effects settle.
    ///
    /// # Errors
    ///
    /// [`TerminalError::InvalidName`] for a bad terminal name,
    /// [`TerminalError::LimitReached`] when a new terminal would exceed the
    /// limit, or the store's
    /// error when it is shutting down.
    #[tracing::instrument(skip(self, action))]
    pub async fn dispatch(
        &self,
        name: &str,
        action: ScannerAction,
    ) -> Result<TerminalView, TerminalError> {
        let terminal = self.terminal(name).await?;
        self.settle(&terminal.store, action).await?;
        Ok(Self::view_of(name, &terminal.store).await)
    }

    /// Current display of a terminal.
    ///
    /// # Errors
    ///
    /// [`TerminalError::InvalidName`] for a bad terminal name,
    /// [`TerminalError::LimitReached`] when every slot is taken.
    pub async fn view(&self, name: &str) -> Result<TerminalView, TerminalError> {
        let terminal = self.terminal(name).await?;
        Ok(Self::view_of(name, &terminal.store).await)
    }

    /// Submit a token from a keyboard-wedge scanner or typed by hand.
    ///
    /// # Errors
    ///
    /// See [`TerminalRegistry::dispatch`].
    pub async fn scan(
        &self,
        name: &str,
        token: String,
        source: TokenSource,
    ) -> Result<TerminalView, TerminalError> {
        self.dispatch(name, ScannerAction::TokenSubmitted { token, source })
            .await
    }

    /// Offer a camera decode batch to a terminal.
    ///
    /// # Errors
    ///
    /// [`TerminalError::InvalidName`] for a bad terminal name,
    /// [`TerminalError::LimitReached`] when every slot is taken.
    pub async fn camera(
        &self,
        name: &str,
        payloads: Vec<String>,
    ) -> Result<CameraView, TerminalError> {
        let terminal = self.terminal(name).await?;
        let feed = terminal.feed.offer(payloads);
        Ok(CameraView {
            feed,
            view: Self::view_of(name, &terminal.store).await,
        })
    }

    /// Open the walk-in form.
    ///
    /// # Errors
    ///
    /// See [`TerminalRegistry::dispatch`].
    pub async fn begin_registration(&self, name: &str) -> Result<TerminalView, TerminalError> {
        self.dispatch(name, ScannerAction::BeginRegistration).await
    }

    /// Submit the walk-in form.
    ///
    /// # Errors
    ///
    /// See [`TerminalRegistry::dispatch`].
    pub async fn submit_additional(
        &self,
        name: &str,
        exhibitor_id: Option<ExhibitorId>,
        guest_name: String,
        company_name: String,
    ) -> Result<TerminalView, TerminalError> {
        self.dispatch(
            name,
            ScannerAction::SubmitAdditional {
                exhibitor_id,
                guest_name,
                company_name,
            },
        )
        .await
    }

    /// Acknowledge the displayed outcome.
    ///
    /// # Errors
    ///
    /// See [`TerminalRegistry::dispatch`].
    pub async fn reset(&self, name: &str) -> Result<TerminalView, TerminalError> {
        self.dispatch(name, ScannerAction::Reset).await
    }

    /// Stop every terminal, waiting up to `timeout` for in-flight writes.
    pub async fn shutdown(&self, timeout: Duration) {
        let terminals: Vec<(String, Terminal)> = self
            .terminals
            .write()
            .await
            .drain()
            .collect();

        for (name, terminal) in terminals {
            if let Err(error) = terminal.store.shutdown(timeout).await {
                tracing::warn!(terminal = %name, %error, "Terminal shutdown incomplete");
            }
            terminal.worker.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::repository::{GuestRepository, InMemoryRepository};
    use crate::scanner::reducer::ScanPhase;
    use crate::types::{Exhibitor, GuestDetails, GuestStatus, NewGuest};
    use guestdesk_testing::test_clock;
    use std::sync::Arc;

    fn registry() -> (TerminalRegistry, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let env = ScannerEnvironment::new(repo.clone(), repo.clone(), Arc::new(test_clock()));
        (TerminalRegistry::new(env, Duration::from_secs(2)), repo)
    }

    fn acme() -> Exhibitor {
        Exhibitor {
            id: ExhibitorId::new(),
            company_name: "Acme".to_string(),
            booth_number: "A1".to_string(),
            email: "acme@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_invalid_names_rejected() {
        let (terminals, _) = registry();
        let long = "x".repeat(65);
        for name in ["", "front desk", "../etc", long.as_str()] {
            assert!(matches!(
                terminals.view(name).await,
                Err(TerminalError::InvalidName)
            ));
        }
    }

    #[tokio::test]
    async fn test_picker_loaded_on_open() {
        let (terminals, repo) = registry();
        repo.seed_exhibitor(acme()).unwrap();

        let view = terminals.view("front").await.unwrap();
        assert_eq!(view.state.exhibitors.len(), 1);
        assert_eq!(view.state.exhibitors[0].company_name, "Acme");
    }

    #[tokio::test]
    async fn test_scan_twice_then_unknown() {
        let (terminals, repo) = registry();
        let exhibitor = acme();
        repo.seed_exhibitor(exhibitor.clone()).unwrap();
        let guest = repo
            .insert(NewGuest::invited(exhibitor.id, GuestDetails::named("g1")))
            .await
            .unwrap();

        let view = terminals
            .scan("front", guest.id.to_string(), TokenSource::Keyboard)
            .await
            .unwrap();
        assert!(matches!(view.state.phase, ScanPhase::Success { .. }));
        assert_eq!(
            GuestRepository::find(repo.as_ref(), guest.id).await.unwrap().unwrap().status,
            GuestStatus::CheckedIn
        );

        terminals.reset("front").await.unwrap();
        let view = terminals
            .scan("front", guest.id.to_string(), TokenSource::Keyboard)
            .await
            .unwrap();
        assert!(matches!(view.state.phase, ScanPhase::AlreadyCheckedIn { .. }));

        terminals.reset("front").await.unwrap();
        let view = terminals
            .scan("front", "does-not-exist".to_string(), TokenSource::Manual)
            .await
            .unwrap();
        assert_eq!(
            view.state.phase,
            ScanPhase::NotFound {
                token: "does-not-exist".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_terminals_are_independent() {
        let (terminals, _) = registry();
        terminals
            .scan("east", "nobody".to_string(), TokenSource::Manual)
            .await
            .unwrap();

        let west = terminals.view("west").await.unwrap();
        assert_eq!(west.state.phase, ScanPhase::Idle);
        let east = terminals.view("east").await.unwrap();
        assert!(matches!(east.state.phase, ScanPhase::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_walk_in_registered_as_additional() {
        let (terminals, repo) = registry();
        let exhibitor = acme();
        repo.seed_exhibitor(exhibitor.clone()).unwrap();

        terminals
            .scan("front", "unknown".to_string(), TokenSource::Manual)
            .await
            .unwrap();
        terminals.begin_registration("front").await.unwrap();
        let view = terminals
            .submit_additional(
                "front",
                Some(exhibitor.id),
                "Walk In".to_string(),
                "Globex".to_string(),
            )
            .await
            .unwrap();

        let ScanPhase::AdditionalSuccess { guest } = view.state.phase else {
            panic!("expected ADDITIONAL_SUCCESS, got {:?}", view.state.phase);
        };
        assert_eq!(guest.status, GuestStatus::Additional);
        assert_eq!(guest.exhibitor_id, exhibitor.id);
        assert_eq!(repo.list_for_exhibitor(exhibitor.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_walk_in_for_exhibitor_created_after_open() {
        let (terminals, repo) = registry();
        terminals.view("front").await.unwrap();

        let late = Exhibitor {
            company_name: "Late".to_string(),
            ..acme()
        };
        repo.seed_exhibitor(late.clone()).unwrap();

        terminals
            .scan("front", "unknown".to_string(), TokenSource::Manual)
            .await
            .unwrap();
        let form = terminals.begin_registration("front").await.unwrap();
        assert!(form.state.exhibitors.iter().any(|e| e.id == late.id));

        let view = terminals
            .submit_additional("front", Some(late.id), "Walk In".to_string(), String::new())
            .await
            .unwrap();
        let ScanPhase::AdditionalSuccess { guest } = view.state.phase else {
            panic!("expected ADDITIONAL_SUCCESS, got {:?}", view.state.phase);
        };
        assert_eq!(guest.exhibitor_id, late.id);
    }

    #[tokio::test]
    async fn test_picker_recovers_after_failed_load() {
        let (terminals, repo) = registry();
        repo.seed_exhibitor(acme()).unwrap();
        repo.set_unavailable(true);
        let opened = terminals.view("front").await.unwrap();
        assert!(opened.state.exhibitors.is_empty());

        repo.set_unavailable(false);
        terminals
            .scan("front", "unknown".to_string(), TokenSource::Manual)
            .await
            .unwrap();
        let form = terminals.begin_registration("front").await.unwrap();
        assert_eq!(form.state.exhibitors.len(), 1);
    }

    #[tokio::test]
    async fn test_walk_in_for_unknown_exhibitor_stays_on_form() {
        let (terminals, repo) = registry();
        terminals
            .scan("front", "unknown".to_string(), TokenSource::Manual)
            .await
            .unwrap();
        terminals.begin_registration("front").await.unwrap();

        let view = terminals
            .submit_additional(
                "front",
                Some(ExhibitorId::new()),
                "Walk In".to_string(),
                String::new(),
            )
            .await
            .unwrap();
        assert_eq!(
            view.state.phase,
            ScanPhase::Registering {
                companion_of: None,
                error: Some("Select the inviting exhibitor".to_string()),
                saving: false,
            }
        );
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_limit() {
        let (terminals, _) = registry();
        let terminals = terminals.with_max_terminals(2);
        terminals.view("north").await.unwrap();
        terminals.view("south").await.unwrap();

        assert!(matches!(
            terminals.view("east").await,
            Err(TerminalError::LimitReached(2))
        ));
        // Open terminals keep working at the limit.
        assert!(terminals.view("north").await.is_ok());

        let err = AppError::from(TerminalError::LimitReached(2));
        assert_eq!(err.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_lookup_outage_is_not_found() {
        let (terminals, repo) = registry();
        terminals.view("front").await.unwrap();
        repo.set_unavailable(true);

        let view = terminals
            .scan("front", uuid::Uuid::new_v4().to_string(), TokenSource::Camera)
            .await
            .unwrap();
        assert!(matches!(view.state.phase, ScanPhase::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_check_in_write_failure_is_shown() {
        let (terminals, repo) = registry();
        let exhibitor = acme();
        repo.seed_exhibitor(exhibitor.clone()).unwrap();
        let guest = repo
            .insert(NewGuest::invited(exhibitor.id, GuestDetails::named("g1")))
            .await
            .unwrap();
        repo.set_writes_failing(true);

        let view = terminals
            .scan("front", guest.id.to_string(), TokenSource::Keyboard)
            .await
            .unwrap();
        assert!(matches!(view.state.phase, ScanPhase::WriteFailed { .. }));

        let view = terminals.reset("front").await.unwrap();
        assert_eq!(view.state.phase, ScanPhase::Idle);
    }

    #[tokio::test]
    async fn test_shutdown_drains_terminals() {
        let (terminals, _) = registry();
        terminals.view("front").await.unwrap();
        terminals.shutdown(Duration::from_secs(1)).await;

        // A fresh store is opened on demand after shutdown drained the map.
        assert!(terminals.view("front").await.is_ok());
    }
}
