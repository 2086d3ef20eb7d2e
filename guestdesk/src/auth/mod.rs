//! Authentication for guestdesk.
//!
//! Email/password sign-in issues a UUID bearer token backed by a session row.
//! Extractors in [`middleware`] turn that token into a [`SessionContext`]
//! before any exhibitor or organizer handler runs.

pub mod handlers;
pub mod middleware;
pub mod password;
pub mod service;

pub use middleware::{BearerToken, ExhibitorSession, OrganizerSession};
pub use service::{AuthError, AuthService, SessionContext};
