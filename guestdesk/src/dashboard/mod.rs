//! Organizer dashboard: attendance per exhibitor and CSV export.

pub mod export;

pub use export::{all_guests_file_name, exhibitor_file_name, write_guests, ExportError};

use crate::error::RepositoryError;
use crate::repository::{ExhibitorRepository, GuestRepository};
use crate::types::{Exhibitor, ExhibitorId, Guest};
use chrono::NaiveDate;
use guestdesk_web::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Attendance rate as a whole percentage, rounding halves up.
///
/// Zero guests is a rate of `0`.
#[must_use]
pub const fn attendance_rate(attended: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (attended * 200 + total) / (2 * total)
}

/// One dashboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhibitorStats {
    /// The exhibitor
    pub exhibitor: Exhibitor,
    /// Registered guests
    pub guest_count: u64,
    /// Guests checked in or added at reception
    pub attended: u64,
    /// `attended / guest_count` as a whole percentage
    pub attendance_rate: u64,
}

/// Dashboard payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Guests across all exhibitors
    pub total_guests: u64,
    /// Attended guests across all exhibitors
    pub attended: u64,
    /// One row per exhibitor, in the order given
    pub exhibitors: Vec<ExhibitorStats>,
}

/// Aggregate guests per exhibitor.
///
/// Row order follows `exhibitors`. Guests of unknown exhibitors count toward
/// the totals only.
#[must_use]
pub fn summarize(exhibitors: Vec<Exhibitor>, guests: &[Guest]) -> DashboardSummary {
    let mut counts: HashMap<ExhibitorId, (u64, u64)> = HashMap::new();
    let mut total_guests = 0;
    let mut attended = 0;

    for guest in guests {
        let entry = counts.entry(guest.exhibitor_id).or_default();
        entry.0 += 1;
        total_guests += 1;
        if guest.status.is_attended() {
            entry.1 += 1;
            attended += 1;
        }
    }

    let exhibitors = exhibitors
        .into_iter()
        .map(|exhibitor| {
            let (guest_count, attended) = counts.get(&exhibitor.id).copied().unwrap_or_default();
            ExhibitorStats {
                exhibitor,
                guest_count,
                attended,
                attendance_rate: attendance_rate(attended, guest_count),
            }
        })
        .collect();

    DashboardSummary {
        total_guests,
        attended,
        exhibitors,
    }
}

/// Dashboard failures.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Unknown exhibitor
    #[error("Exhibitor with id {0} not found")]
    ExhibitorNotFound(ExhibitorId),

    /// Export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Storage failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::ExhibitorNotFound(id) => Self::not_found("Exhibitor", id),
            DashboardError::Export(source) => source.into(),
            DashboardError::Repository(source) => source.into(),
        }
    }
}

/// A CSV download.
#[derive(Debug, Clone)]
pub struct CsvDownload {
    /// Suggested file name
    pub file_name: String,
    /// UTF-8 CSV with byte order mark
    pub bytes: Vec<u8>,
}

/// Read-only organizer views over the guest and exhibitor stores.
#[derive(Clone)]
pub struct Dashboard {
    guests: Arc<dyn GuestRepository>,
    exhibitors: Arc<dyn ExhibitorRepository>,
}

impl Dashboard {
    /// Creates a new `Dashboard`.
    #[must_use]
    pub fn new(guests: Arc<dyn GuestRepository>, exhibitors: Arc<dyn ExhibitorRepository>) -> Self {
        Self { guests, exhibitors }
    }

    /// Per-exhibitor attendance, ordered by company name, with totals.
    ///
    /// # Errors
    ///
    /// Returns storage failures.
    pub async fn summary(&self) -> Result<DashboardSummary, DashboardError> {
        let exhibitors = self.exhibitors.list().await?;
        let guests = self.guests.list_all().await?;
        Ok(summarize(exhibitors, &guests))
    }

    /// One exhibitor's guests, newest first.
    ///
    /// # Errors
    ///
    /// [`DashboardError::ExhibitorNotFound`] for an unknown exhibitor.
    pub async fn exhibitor_guests(&self, id: ExhibitorId) -> Result<Vec<Guest>, DashboardError> {
        self.require_exhibitor(id).await?;
        Ok(self.guests.list_for_exhibitor(id).await?)
    }

    /// Every guest as CSV, named after `today`.
    ///
    /// # Errors
    ///
    /// [`ExportError::NoData`] when there are no guests.
    #[tracing::instrument(skip(self))]
    pub async fn export_all(&self, today: NaiveDate) -> Result<CsvDownload, DashboardError> {
        let guests = self.guests.list_all().await?;
        let bytes = write_guests(&guests)?;
        crate::metrics::record_export("all");
        tracing::info!(rows = guests.len(), "Exported all guests");
        Ok(CsvDownload {
            file_name: all_guests_file_name(today),
            bytes,
        })
    }

    /// One exhibitor's guests as CSV.
    ///
    /// # Errors
    ///
    /// [`DashboardError::ExhibitorNotFound`] for an unknown exhibitor,
    /// [`ExportError::NoData`] when it has no guests.
    #[tracing::instrument(skip(self))]
    pub async fn export_exhibitor(&self, id: ExhibitorId) -> Result<CsvDownload, DashboardError> {
        let exhibitor = self.require_exhibitor(id).await?;
        let guests = self.guests.list_for_exhibitor(id).await?;
        let bytes = write_guests(&guests)?;
        crate::metrics::record_export("exhibitor");
        tracing::info!(rows = guests.len(), "Exported exhibitor guests");
        Ok(CsvDownload {
            file_name: exhibitor_file_name(&exhibitor.company_name),
            bytes,
        })
    }

    async fn require_exhibitor(&self, id: ExhibitorId) -> Result<Exhibitor, DashboardError> {
        self.exhibitors
            .find(id)
            .await?
            .ok_or(DashboardError::ExhibitorNotFound(id))
    }
}
