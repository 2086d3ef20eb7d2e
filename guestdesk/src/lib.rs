//! Guestdesk: exhibitor guest invitations and reception check-in.
//!
//! Exhibitors sign in, maintain the list of guests they invite and hand
//! each guest a printable invitation carrying a QR code. At the venue,
//! reception terminals scan those codes and check guests in; organizers
//! watch attendance per exhibitor and export it as CSV.
//!
//! # Architecture
//!
//! ```text
//!   HTTP (axum)
//!      │
//!      ├── auth ─────────── sessions, roles
//!      ├── registry ─────── guest CRUD, CSV import
//!      ├── invitation ───── QR card, A4 document
//!      ├── dashboard ────── attendance stats, CSV export
//!      └── scanner ──────── one Store per reception terminal
//!              │                (ScannerReducer + effects)
//!              ▼
//!         repository ────── PostgreSQL / in-memory
//! ```
//!
//! Check-in is a reducer: scans become actions, database calls become
//! effects, and each terminal's [`guestdesk_runtime::Store`] serializes the
//! lifecycle so a terminal never processes two codes at once.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod invitation;
pub mod metrics;
pub mod registry;
pub mod repository;
pub mod scanner;
pub mod server;
pub mod types;

pub use config::Config;
pub use server::{build_router, AppState};
