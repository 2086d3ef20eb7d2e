//! Domain types for guestdesk.
//!
//! Exhibitors own guests; a guest's id is the token printed in their QR code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a guest, also the token encoded in their QR code
    GuestId
);

uuid_id!(
    /// Unique identifier for an exhibitor (equal to the owning account's id)
    ExhibitorId
);

uuid_id!(
    /// Unique identifier for a login account
    AccountId
);

uuid_id!(
    /// Session token handed out at sign-in
    SessionId
);

impl GuestId {
    /// Parse a scanned or typed token.
    ///
    /// Surrounding whitespace is ignored; anything that is not a UUID yields `None`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Uuid::parse_str(token.trim()).ok().map(Self)
    }
}

impl From<AccountId> for ExhibitorId {
    fn from(id: AccountId) -> Self {
        Self(id.0)
    }
}

// ============================================================================
// Guests
// ============================================================================

/// Attendance status of a guest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestStatus {
    /// Registered by an exhibitor, not yet arrived
    Invited,
    /// Scanned in at reception
    CheckedIn,
    /// Walk-in registered directly at reception
    Additional,
}

impl GuestStatus {
    /// Storage and export representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::CheckedIn => "checked_in",
            Self::Additional => "additional",
        }
    }

    /// Whether the guest counts as having attended.
    #[must_use]
    pub const fn is_attended(self) -> bool {
        match self {
            Self::Invited => false,
            Self::CheckedIn | Self::Additional => true,
        }
    }
}

impl fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown guest status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown guest status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for GuestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invited" => Ok(Self::Invited),
            "checked_in" => Ok(Self::CheckedIn),
            "additional" => Ok(Self::Additional),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A registered guest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    /// Guest id (QR token)
    pub id: GuestId,
    /// Exhibitor that invited the guest
    pub exhibitor_id: ExhibitorId,
    /// Guest's name
    pub guest_name: String,
    /// Guest's own company
    pub company_name: String,
    /// Guest's department
    pub department: String,
    /// Contact email
    pub email: String,
    /// Attendance status
    pub status: GuestStatus,
    /// When the guest was registered
    pub created_at: DateTime<Utc>,
}

/// Editable guest fields, used for both creation and update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuestDetails {
    /// Guest's name (required)
    pub guest_name: String,
    /// Guest's own company
    pub company_name: String,
    /// Guest's department
    pub department: String,
    /// Contact email
    pub email: String,
}

impl GuestDetails {
    /// Details with only a name.
    #[must_use]
    pub fn named(guest_name: impl Into<String>) -> Self {
        Self {
            guest_name: guest_name.into(),
            ..Self::default()
        }
    }

    /// Trim every field, returning `None` when the name ends up empty.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let guest_name = self.guest_name.trim().to_string();
        if guest_name.is_empty() {
            return None;
        }
        Some(Self {
            guest_name,
            company_name: self.company_name.trim().to_string(),
            department: self.department.trim().to_string(),
            email: self.email.trim().to_string(),
        })
    }
}

/// A guest about to be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewGuest {
    /// Owning exhibitor
    pub exhibitor_id: ExhibitorId,
    /// Guest fields
    pub details: GuestDetails,
    /// Initial status (`Invited` or `Additional`)
    pub status: GuestStatus,
}

impl NewGuest {
    /// A guest invited ahead of the event.
    #[must_use]
    pub const fn invited(exhibitor_id: ExhibitorId, details: GuestDetails) -> Self {
        Self {
            exhibitor_id,
            details,
            status: GuestStatus::Invited,
        }
    }

    /// A walk-in registered at reception.
    #[must_use]
    pub const fn additional(exhibitor_id: ExhibitorId, details: GuestDetails) -> Self {
        Self {
            exhibitor_id,
            details,
            status: GuestStatus::Additional,
        }
    }
}

// ============================================================================
// Exhibitors
// ============================================================================

/// Company name given to exhibitors created on first sign-in.
pub const PLACEHOLDER_COMPANY_NAME: &str = "Unregistered company";

/// An exhibiting company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exhibitor {
    /// Exhibitor id
    pub id: ExhibitorId,
    /// Company name shown on invitations
    pub company_name: String,
    /// Booth number shown on invitations
    pub booth_number: String,
    /// Contact email
    pub email: String,
}

/// Profile settings an exhibitor may change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Company name
    pub company_name: String,
    /// Booth number
    #[serde(default)]
    pub booth_number: String,
}

// ============================================================================
// Accounts and sessions
// ============================================================================

/// What an account may do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages its own guest list
    Exhibitor,
    /// Sees every exhibitor on the dashboard
    Organizer,
}

impl Role {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exhibitor => "exhibitor",
            Self::Organizer => "organizer",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exhibitor" => Ok(Self::Exhibitor),
            "organizer" => Ok(Self::Organizer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Error returned when parsing an unknown role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// A login account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Account id
    pub id: AccountId,
    /// Login email, lowercased
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Account role
    pub role: Role,
}

/// An authenticated session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token
    pub id: SessionId,
    /// Owning account
    pub account_id: AccountId,
    /// Account email at sign-in
    pub email: String,
    /// Account role at sign-in
    pub role: Role,
    /// Sign-in time
    pub created_at: DateTime<Utc>,
    /// Expiry time
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
