//! Check-in decision state machine for one reception terminal.
//!
//! ```text
//! IDLE ─token─▶ LOOKUP ─┬─ missing/error ────────▶ NOT_FOUND ──────────┐
//!                       ├─ checked_in/additional ▶ ALREADY_CHECKED_IN ─┤
//!                       └─ invited ▶ CHECKING_IN ┬▶ SUCCESS            │
//!                                                ├▶ ALREADY_CHECKED_IN │
//!                                                └▶ WRITE_FAILED       │
//! NOT_FOUND | ALREADY_CHECKED_IN ─register─▶ REGISTERING ─▶ ADDITIONAL_SUCCESS
//! any outcome ─reset─▶ IDLE
//! ```
//!
//! The terminal shows one outcome at a time: tokens are dropped unless the
//! terminal is idle, and outcomes stay until an explicit reset.

use crate::repository::{ExhibitorRepository, GuestRepository};
use crate::types::{Exhibitor, ExhibitorId, Guest, GuestDetails, GuestId, GuestStatus, NewGuest};
use chrono::{DateTime, Utc};
use guestdesk_core::environment::Clock;
use guestdesk_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

/// What the terminal shows about a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCard {
    /// Guest id
    pub id: GuestId,
    /// Inviting exhibitor
    pub exhibitor_id: ExhibitorId,
    /// Guest's name
    pub guest_name: String,
    /// Guest's company
    pub company_name: String,
    /// Status as displayed
    pub status: GuestStatus,
}

impl From<&Guest> for GuestCard {
    fn from(guest: &Guest) -> Self {
        Self {
            id: guest.id,
            exhibitor_id: guest.exhibitor_id,
            guest_name: guest.guest_name.clone(),
            company_name: guest.company_name.clone(),
            status: guest.status,
        }
    }
}

/// An entry in the walk-in exhibitor picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhibitorOption {
    /// Exhibitor id
    pub id: ExhibitorId,
    /// Company name
    pub company_name: String,
    /// Booth number
    pub booth_number: String,
}

impl From<Exhibitor> for ExhibitorOption {
    fn from(exhibitor: Exhibitor) -> Self {
        Self {
            id: exhibitor.id,
            company_name: exhibitor.company_name,
            booth_number: exhibitor.booth_number,
        }
    }
}

/// Terminal phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanPhase {
    /// Waiting for a token
    #[default]
    Idle,
    /// Looking the token up
    Lookup {
        /// Token being looked up
        token: String,
    },
    /// Guest found as `invited`; status write in flight
    CheckingIn {
        /// The guest being checked in
        guest: GuestCard,
    },
    /// Guest checked in by this scan
    Success {
        /// The guest
        guest: GuestCard,
    },
    /// Guest had already attended; nothing was changed
    AlreadyCheckedIn {
        /// The guest
        guest: GuestCard,
    },
    /// No guest for the token
    NotFound {
        /// The token that was scanned
        token: String,
    },
    /// Walk-in registration form
    Registering {
        /// Guest the walk-in accompanies, when started from `ALREADY_CHECKED_IN`
        companion_of: Option<GuestCard>,
        /// Validation message for the last submission
        error: Option<String>,
        /// Write in flight
        saving: bool,
    },
    /// Walk-in registered
    AdditionalSuccess {
        /// The new guest
        guest: GuestCard,
    },
    /// A write failed; shown once until reset
    WriteFailed {
        /// Operator-facing message
        message: String,
    },
}

impl ScanPhase {
    /// Whether a new token would be accepted.
    #[must_use]
    pub const fn is_accepting_input(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether an effect is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Lookup { .. } | Self::CheckingIn { .. } | Self::Registering { saving: true, .. }
        )
    }

    /// Outcome label for counters and logs, for phases that are outcomes.
    #[must_use]
    pub const fn outcome(&self) -> Option<&'static str> {
        match self {
            Self::Success { .. } => Some("success"),
            Self::AlreadyCheckedIn { .. } => Some("already_checked_in"),
            Self::NotFound { .. } => Some("not_found"),
            Self::AdditionalSuccess { .. } => Some("additional"),
            Self::WriteFailed { .. } => Some("write_failed"),
            Self::Idle | Self::Lookup { .. } | Self::CheckingIn { .. } | Self::Registering { .. } => {
                None
            },
        }
    }
}

/// State of one reception terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerState {
    /// Current phase
    #[serde(flatten)]
    pub phase: ScanPhase,
    /// Walk-in exhibitor picker, ordered by company name
    pub exhibitors: Vec<ExhibitorOption>,
    /// When the phase last changed
    pub changed_at: Option<DateTime<Utc>>,
}

impl ScannerState {
    /// Creates a new idle `ScannerState`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&mut self, phase: ScanPhase, now: DateTime<Utc>) {
        if let Some(outcome) = phase.outcome() {
            crate::metrics::record_scan_outcome(outcome);
            tracing::info!(outcome, "Scan outcome");
        }
        self.phase = phase;
        self.changed_at = Some(now);
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Where a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Camera decode feed
    Camera,
    /// Keyboard-wedge hardware scanner
    Keyboard,
    /// Typed by the operator
    Manual,
}

impl TokenSource {
    /// Label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Keyboard => "keyboard",
            Self::Manual => "manual",
        }
    }
}

/// Actions for a reception terminal.
#[derive(Debug, Clone)]
pub enum ScannerAction {
    // ========================================================================
    // Commands
    // ========================================================================
    /// Load the walk-in exhibitor picker.
    LoadExhibitors,

    /// A token was scanned or typed.
    TokenSubmitted {
        /// Raw token
        token: String,
        /// Input channel
        source: TokenSource,
    },

    /// Open the walk-in form from `NOT_FOUND` or `ALREADY_CHECKED_IN`.
    BeginRegistration,

    /// Submit the walk-in form.
    SubmitAdditional {
        /// Selected exhibitor; defaults to the companion's exhibitor
        exhibitor_id: Option<ExhibitorId>,
        /// Walk-in's name
        guest_name: String,
        /// Walk-in's company
        company_name: String,
    },

    /// Acknowledge the displayed outcome.
    Reset,

    // ========================================================================
    // Events
    // ========================================================================
    /// Picker loaded.
    ExhibitorsLoaded {
        /// Exhibitors, ordered by company name
        exhibitors: Vec<Exhibitor>,
    },

    /// Lookup found a guest.
    GuestFound {
        /// The guest as stored
        guest: Guest,
    },

    /// Lookup found nothing, or failed.
    GuestMissing {
        /// The token looked up
        token: String,
    },

    /// The conditional status write changed the row.
    CheckInApplied {
        /// The guest, now checked in
        guest: GuestCard,
    },

    /// The conditional status write changed nothing: another terminal won.
    CheckInRejected {
        /// The guest as found
        guest: GuestCard,
    },

    /// Walk-in refused before anything was written.
    AdditionalRejected {
        /// Validation message for the form
        error: String,
    },

    /// Walk-in inserted.
    AdditionalRegistered {
        /// The new guest
        guest: Guest,
    },

    /// A write failed.
    WriteFailed {
        /// Operator-facing message
        message: String,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Dependencies of the scanner reducer.
#[derive(Clone)]
pub struct ScannerEnvironment {
    /// Guest store
    pub guests: Arc<dyn GuestRepository>,
    /// Exhibitor store, for the picker
    pub exhibitors: Arc<dyn ExhibitorRepository>,
    /// Time source
    pub clock: Arc<dyn Clock>,
}

impl ScannerEnvironment {
    /// Creates a new `ScannerEnvironment`.
    #[must_use]
    pub fn new(
        guests: Arc<dyn GuestRepository>,
        exhibitors: Arc<dyn ExhibitorRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guests,
            exhibitors,
            clock,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

const UNKNOWN_EXHIBITOR: &str = "Select the inviting exhibitor";

/// Reducer for a reception terminal.
#[derive(Debug, Default, Clone)]
pub struct ScannerReducer;

impl ScannerReducer {
    /// Creates a new `ScannerReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn lookup(token: String, env: &ScannerEnvironment) -> Effect<ScannerAction> {
        let Some(id) = GuestId::parse(&token) else {
            return Effect::future(async move { Some(ScannerAction::GuestMissing { token }) });
        };

        let guests = Arc::clone(&env.guests);
        Effect::future(async move {
            match guests.find(id).await {
                Ok(Some(guest)) => Some(ScannerAction::GuestFound { guest }),
                Ok(None) => Some(ScannerAction::GuestMissing { token }),
                Err(error) => {
                    tracing::warn!(%error, "Guest lookup failed");
                    Some(ScannerAction::GuestMissing { token })
                },
            }
        })
    }

    fn check_in(guest: GuestCard, env: &ScannerEnvironment) -> Effect<ScannerAction> {
        let guests = Arc::clone(&env.guests);
        Effect::future(async move {
            match guests.mark_checked_in(guest.id).await {
                Ok(true) => Some(ScannerAction::CheckInApplied {
                    guest: GuestCard {
                        status: GuestStatus::CheckedIn,
                        ..guest
                    },
                }),
                Ok(false) => Some(ScannerAction::CheckInRejected { guest }),
                Err(error) => {
                    tracing::error!(%error, guest_id = %guest.id, "Check-in write failed");
                    Some(ScannerAction::WriteFailed {
                        message: "Check-in could not be saved. Please try again.".to_string(),
                    })
                },
            }
        })
    }

    fn register(guest: NewGuest, env: &ScannerEnvironment) -> Effect<ScannerAction> {
        let guests = Arc::clone(&env.guests);
        let exhibitors = Arc::clone(&env.exhibitors);
        Effect::future(async move {
            match exhibitors.find(guest.exhibitor_id).await {
                Ok(Some(_)) => {},
                Ok(None) => {
                    return Some(ScannerAction::AdditionalRejected {
                        error: UNKNOWN_EXHIBITOR.to_string(),
                    });
                },
                Err(error) => {
                    tracing::error!(%error, "Walk-in exhibitor lookup failed");
                    return Some(ScannerAction::WriteFailed {
                        message: "The guest could not be registered. Please try again."
                            .to_string(),
                    });
                },
            }

            match guests.insert(guest).await {
                Ok(guest) => Some(ScannerAction::AdditionalRegistered { guest }),
                Err(error) => {
                    tracing::error!(%error, "Walk-in registration failed");
                    Some(ScannerAction::WriteFailed {
                        message: "The guest could not be registered. Please try again."
                            .to_string(),
                    })
                },
            }
        })
    }

    fn load_exhibitors(env: &ScannerEnvironment) -> Effect<ScannerAction> {
        let exhibitors = Arc::clone(&env.exhibitors);
        Effect::future(async move {
            match exhibitors.list().await {
                Ok(exhibitors) => Some(ScannerAction::ExhibitorsLoaded { exhibitors }),
                Err(error) => {
                    tracing::warn!(%error, "Exhibitor picker could not be loaded");
                    None
                },
            }
        })
    }
}

impl Reducer for ScannerReducer {
    type State = ScannerState;
    type Action = ScannerAction;
    type Environment = ScannerEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per transition
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let now = env.clock.now();

        match action {
            ScannerAction::LoadExhibitors => smallvec![Self::load_exhibitors(env)],

            ScannerAction::ExhibitorsLoaded { exhibitors } => {
                state.exhibitors = exhibitors.into_iter().map(ExhibitorOption::from).collect();
                smallvec![Effect::None]
            },

            ScannerAction::TokenSubmitted { token, source } => {
                let token = token.trim().to_string();
                if token.is_empty() || !state.phase.is_accepting_input() {
                    tracing::debug!(source = source.as_str(), "Token ignored");
                    return smallvec![Effect::None];
                }

                tracing::info!(source = source.as_str(), "Token scanned");
                state.enter(
                    ScanPhase::Lookup {
                        token: token.clone(),
                    },
                    now,
                );
                smallvec![Self::lookup(token, env)]
            },

            ScannerAction::GuestFound { guest } => {
                let ScanPhase::Lookup { token } = &state.phase else {
                    return smallvec![Effect::None];
                };
                if GuestId::parse(token) != Some(guest.id) {
                    return smallvec![Effect::None];
                }

                let card = GuestCard::from(&guest);
                if guest.status.is_attended() {
                    state.enter(ScanPhase::AlreadyCheckedIn { guest: card }, now);
                    return smallvec![Effect::None];
                }

                state.enter(ScanPhase::CheckingIn { guest: card.clone() }, now);
                smallvec![Self::check_in(card, env)]
            },

            ScannerAction::GuestMissing { token } => {
                if matches!(&state.phase, ScanPhase::Lookup { token: current } if *current == token)
                {
                    state.enter(ScanPhase::NotFound { token }, now);
                }
                smallvec![Effect::None]
            },

            ScannerAction::CheckInApplied { guest } => {
                if matches!(&state.phase, ScanPhase::CheckingIn { guest: current } if current.id == guest.id)
                {
                    state.enter(ScanPhase::Success { guest }, now);
                }
                smallvec![Effect::None]
            },

            ScannerAction::CheckInRejected { guest } => {
                if matches!(&state.phase, ScanPhase::CheckingIn { guest: current } if current.id == guest.id)
                {
                    state.enter(ScanPhase::AlreadyCheckedIn { guest }, now);
                }
                smallvec![Effect::None]
            },

            ScannerAction::BeginRegistration => {
                let companion_of = match &state.phase {
                    ScanPhase::NotFound { .. } => None,
                    ScanPhase::AlreadyCheckedIn { guest } => Some(guest.clone()),
                    _ => return smallvec![Effect::None],
                };
                state.enter(
                    ScanPhase::Registering {
                        companion_of,
                        error: None,
                        saving: false,
                    },
                    now,
                );
                smallvec![Self::load_exhibitors(env)]
            },

            ScannerAction::SubmitAdditional {
                exhibitor_id,
                guest_name,
                company_name,
            } => {
                let ScanPhase::Registering {
                    companion_of,
                    error,
                    saving,
                } = &mut state.phase
                else {
                    return smallvec![Effect::None];
                };
                if *saving {
                    return smallvec![Effect::None];
                }

                let exhibitor_id =
                    exhibitor_id.or_else(|| companion_of.as_ref().map(|g| g.exhibitor_id));
                let details = GuestDetails {
                    guest_name,
                    company_name,
                    ..GuestDetails::default()
                }
                .normalized();

                let Some(details) = details else {
                    *error = Some("Guest name is required".to_string());
                    return smallvec![Effect::None];
                };
                let Some(exhibitor_id) = exhibitor_id else {
                    *error = Some(UNKNOWN_EXHIBITOR.to_string());
                    return smallvec![Effect::None];
                };

                *error = None;
                *saving = true;
                state.changed_at = Some(now);
                smallvec![Self::register(NewGuest::additional(exhibitor_id, details), env)]
            },

            ScannerAction::AdditionalRejected { error: message } => {
                if let ScanPhase::Registering { error, saving, .. } = &mut state.phase {
                    if *saving {
                        *error = Some(message);
                        *saving = false;
                        state.changed_at = Some(now);
                    }
                }
                smallvec![Effect::None]
            },

            ScannerAction::AdditionalRegistered { guest } => {
                crate::metrics::record_guests_registered("walk_in", 1);
                if matches!(state.phase, ScanPhase::Registering { saving: true, .. }) {
                    state.enter(
                        ScanPhase::AdditionalSuccess {
                            guest: GuestCard::from(&guest),
                        },
                        now,
                    );
                }
                smallvec![Effect::None]
            },

            ScannerAction::WriteFailed { message } => {
                if matches!(
                    state.phase,
                    ScanPhase::CheckingIn { .. } | ScanPhase::Registering { saving: true, .. }
                ) {
                    state.enter(ScanPhase::WriteFailed { message }, now);
                }
                smallvec![Effect::None]
            },

            ScannerAction::Reset => {
                if !state.phase.is_busy() {
                    state.phase = ScanPhase::Idle;
                    state.changed_at = Some(now);
                }
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use guestdesk_testing::{assertions, test_clock, ReducerTest};

    fn env() -> ScannerEnvironment {
        let repo = Arc::new(InMemoryRepository::new());
        ScannerEnvironment::new(repo.clone(), repo, Arc::new(test_clock()))
    }

    fn card(status: GuestStatus) -> GuestCard {
        GuestCard {
            id: GuestId::new(),
            exhibitor_id: ExhibitorId::new(),
            guest_name: "Ada".to_string(),
            company_name: "Acme".to_string(),
            status,
        }
    }

    fn guest(card: &GuestCard) -> Guest {
        Guest {
            id: card.id,
            exhibitor_id: card.exhibitor_id,
            guest_name: card.guest_name.clone(),
            company_name: card.company_name.clone(),
            department: String::new(),
            email: String::new(),
            status: card.status,
            created_at: test_clock().now(),
        }
    }

    fn state(phase: ScanPhase) -> ScannerState {
        ScannerState {
            phase,
            ..ScannerState::default()
        }
    }

    fn scan(token: &str) -> ScannerAction {
        ScannerAction::TokenSubmitted {
            token: token.to_string(),
            source: TokenSource::Manual,
        }
    }

    #[test]
    fn test_token_starts_lookup() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(ScannerState::new())
            .when_action(scan("  does-not-exist \n"))
            .then_state(|s| {
                assert_eq!(
                    s.phase,
                    ScanPhase::Lookup {
                        token: "does-not-exist".to_string()
                    }
                );
                assert!(s.phase.is_busy());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_empty_token_ignored() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(ScannerState::new())
            .when_action(scan("   "))
            .then_state(|s| assert_eq!(s.phase, ScanPhase::Idle))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_token_ignored_while_result_displayed() {
        let shown = card(GuestStatus::CheckedIn);
        let expected = ScanPhase::Success {
            guest: shown.clone(),
        };
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(ScanPhase::Success { guest: shown }))
            .when_action(scan(&GuestId::new().to_string()))
            .then_state(move |s| assert_eq!(s.phase, expected))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_invited_guest_moves_to_checking_in() {
        let invited = card(GuestStatus::Invited);
        let found = guest(&invited);
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(ScanPhase::Lookup {
                token: invited.id.to_string(),
            }))
            .when_action(ScannerAction::GuestFound { guest: found })
            .then_state(move |s| assert_eq!(s.phase, ScanPhase::CheckingIn { guest: invited }))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_attended_guest_is_already_checked_in_without_write() {
        for status in [GuestStatus::CheckedIn, GuestStatus::Additional] {
            let attended = card(status);
            let found = guest(&attended);
            ReducerTest::new(ScannerReducer::new())
                .with_env(env())
                .given_state(state(ScanPhase::Lookup {
                    token: attended.id.to_string(),
                }))
                .when_action(ScannerAction::GuestFound { guest: found })
                .then_state(move |s| {
                    assert_eq!(s.phase, ScanPhase::AlreadyCheckedIn { guest: attended });
                })
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn test_rejected_write_is_already_checked_in() {
        let invited = card(GuestStatus::Invited);
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(ScanPhase::CheckingIn {
                guest: invited.clone(),
            }))
            .when_action(ScannerAction::CheckInRejected {
                guest: invited.clone(),
            })
            .then_state(move |s| assert_eq!(s.phase, ScanPhase::AlreadyCheckedIn { guest: invited }))
            .run();
    }

    #[test]
    fn test_failed_write_shown_then_reset() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(ScanPhase::CheckingIn {
                guest: card(GuestStatus::Invited),
            }))
            .when_action(ScannerAction::WriteFailed {
                message: "nope".to_string(),
            })
            .then_state(|s| {
                assert_eq!(
                    s.phase,
                    ScanPhase::WriteFailed {
                        message: "nope".to_string()
                    }
                );
            })
            .run();
    }

    #[test]
    fn test_stale_lookup_result_ignored() {
        let other = card(GuestStatus::Invited);
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(ScannerState::new())
            .when_action(ScannerAction::GuestFound {
                guest: guest(&other),
            })
            .when_action(ScannerAction::GuestMissing {
                token: "x".to_string(),
            })
            .then_state(|s| assert_eq!(s.phase, ScanPhase::Idle))
            .run();
    }

    #[test]
    fn test_reset_ignored_while_busy() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(ScanPhase::Lookup {
                token: "t".to_string(),
            }))
            .when_action(ScannerAction::Reset)
            .then_state(|s| assert!(matches!(s.phase, ScanPhase::Lookup { .. })))
            .run();
    }

    #[test]
    fn test_registration_from_already_prefills_companion() {
        let seen = card(GuestStatus::CheckedIn);
        let expected = seen.clone();
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(ScanPhase::AlreadyCheckedIn { guest: seen }))
            .when_action(ScannerAction::BeginRegistration)
            .then_state(move |s| {
                assert_eq!(
                    s.phase,
                    ScanPhase::Registering {
                        companion_of: Some(expected),
                        error: None,
                        saving: false,
                    }
                );
            })
            .run();
    }

    #[test]
    fn test_registration_not_allowed_from_idle_or_success() {
        for phase in [
            ScanPhase::Idle,
            ScanPhase::Success {
                guest: card(GuestStatus::CheckedIn),
            },
        ] {
            let before = phase.clone();
            ReducerTest::new(ScannerReducer::new())
                .with_env(env())
                .given_state(state(phase))
                .when_action(ScannerAction::BeginRegistration)
                .then_state(move |s| assert_eq!(s.phase, before))
                .run();
        }
    }

    #[test]
    fn test_registration_reloads_picker() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(ScanPhase::NotFound {
                token: "unknown".to_string(),
            }))
            .when_action(ScannerAction::BeginRegistration)
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_walk_in_requires_name_and_exhibitor() {
        let registering = ScanPhase::Registering {
            companion_of: None,
            error: None,
            saving: false,
        };

        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(registering.clone()))
            .when_action(ScannerAction::SubmitAdditional {
                exhibitor_id: None,
                guest_name: "  ".to_string(),
                company_name: String::new(),
            })
            .then_state(|s| {
                assert!(matches!(
                    &s.phase,
                    ScanPhase::Registering { error: Some(e), saving: false, .. } if e == "Guest name is required"
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(registering))
            .when_action(ScannerAction::SubmitAdditional {
                exhibitor_id: None,
                guest_name: "Walk In".to_string(),
                company_name: String::new(),
            })
            .then_state(|s| {
                assert!(matches!(
                    &s.phase,
                    ScanPhase::Registering { error: Some(e), .. } if e == "Select the inviting exhibitor"
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_rejected_walk_in_reopens_form() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(state(ScanPhase::Registering {
                companion_of: None,
                error: None,
                saving: false,
            }))
            .when_action(ScannerAction::SubmitAdditional {
                exhibitor_id: Some(ExhibitorId::new()),
                guest_name: "Walk In".to_string(),
                company_name: String::new(),
            })
            .when_action(ScannerAction::AdditionalRejected {
                error: "Select the inviting exhibitor".to_string(),
            })
            .then_state(|s| {
                assert_eq!(
                    s.phase,
                    ScanPhase::Registering {
                        companion_of: None,
                        error: Some("Select the inviting exhibitor".to_string()),
                        saving: false,
                    }
                );
            })
            .run();
    }

    #[test]
    fn test_walk_in_defaults_to_companions_exhibitor() {
        let companion = card(GuestStatus::CheckedIn);
        let mut given = state(ScanPhase::Registering {
            companion_of: Some(companion.clone()),
            error: None,
            saving: false,
        });
        given.exhibitors = vec![ExhibitorOption {
            id: companion.exhibitor_id,
            company_name: "Acme".to_string(),
            booth_number: "A1".to_string(),
        }];

        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(given)
            .when_action(ScannerAction::SubmitAdditional {
                exhibitor_id: None,
                guest_name: "Plus One".to_string(),
                company_name: "Acme".to_string(),
            })
            .then_state(|s| {
                assert!(matches!(
                    s.phase,
                    ScanPhase::Registering {
                        saving: true,
                        error: None,
                        ..
                    }
                ));
                assert!(s.phase.is_busy());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_phase_serializes_with_tag() {
        let json = serde_json::to_value(ScannerState::new()).unwrap();
        assert_eq!(json["phase"], "IDLE");

        let json = serde_json::to_value(state(ScanPhase::NotFound {
            token: "does-not-exist".to_string(),
        }))
        .unwrap();
        assert_eq!(json["phase"], "NOT_FOUND");
        assert_eq!(json["token"], "does-not-exist");
    }
}
