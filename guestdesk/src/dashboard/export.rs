//! CSV export of guest lists.

use crate::types::Guest;
use chrono::NaiveDate;
use guestdesk_web::AppError;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Export column headers, in order.
pub const EXPORT_HEADERS: [&str; 8] = [
    "ID",
    "Guest_Company",
    "Department",
    "Guest_Name",
    "Email",
    "Status",
    "Exhibitor_ID",
    "Registered_At",
];

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export
    #[error("no data")]
    NoData,

    /// Writing a record failed
    #[error("could not write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the writer failed
    #[error("could not finish CSV: {0}")]
    Finish(String),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NoData => Self::validation(err.to_string()),
            ExportError::Csv(_) | ExportError::Finish(_) => {
                Self::internal("Export failed").with_source(err)
            },
        }
    }
}

/// Write guests as UTF-8 CSV with a byte order mark, one row per guest.
///
/// # Errors
///
/// [`ExportError::NoData`] for an empty slice.
pub fn write_guests(guests: &[Guest]) -> Result<Vec<u8>, ExportError> {
    if guests.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(EXPORT_HEADERS)?;

    for guest in guests {
        writer.write_record([
            guest.id.to_string().as_str(),
            guest.company_name.as_str(),
            guest.department.as_str(),
            guest.guest_name.as_str(),
            guest.email.as_str(),
            guest.status.as_str(),
            guest.exhibitor_id.to_string().as_str(),
            guest.created_at.to_rfc3339().as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Finish(e.error().to_string()))
}

/// Download name for the export of every guest.
#[must_use]
pub fn all_guests_file_name(date: NaiveDate) -> String {
    format!("All_Guests_{}.csv", date.format("%Y-%m-%d"))
}

/// Download name for one exhibitor's export.
///
/// Characters that cannot appear in a header-quoted file name are replaced.
#[must_use]
pub fn exhibitor_file_name(company_name: &str) -> String {
    let company: String = company_name
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' | '\r' | '\n' => '_',
            other => other,
        })
        .collect();
    format!("Guests_{company}.csv")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registry::parse_guests;
    use crate::types::{ExhibitorId, GuestDetails, GuestId, GuestStatus};
    use guestdesk_core::environment::Clock;
    use guestdesk_testing::test_clock;

    fn guest(name: &str, company: &str) -> Guest {
        Guest {
            id: GuestId::new(),
            exhibitor_id: ExhibitorId::new(),
            guest_name: name.to_string(),
            company_name: company.to_string(),
            department: "Sales".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            status: GuestStatus::CheckedIn,
            created_at: test_clock().now(),
        }
    }

    #[test]
    fn test_empty_export_is_no_data() {
        let err = write_guests(&[]).unwrap_err();
        assert!(matches!(err, ExportError::NoData));
        assert_eq!(AppError::from(err).message(), "no data");
    }

    #[test]
    fn test_bom_header_and_columns() {
        let ada = guest("Ada", "Acme, Inc.");
        let bytes = write_guests(std::slice::from_ref(&ada)).unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("ID,Guest_Company,Department,Guest_Name,Email,Status,Exhibitor_ID,Registered_At")
        );
        assert_eq!(
            lines.next().unwrap(),
            format!(
                "{},\"Acme, Inc.\",Sales,Ada,ada@example.com,checked_in,{},2025-01-01T00:00:00+00:00",
                ada.id, ada.exhibitor_id
            )
        );
    }

    #[test]
    fn test_export_reimports() {
        let guests = vec![guest("Ada", "Acme, Inc."), guest("Grace", "Navy \"Labs\"")];
        let bytes = write_guests(&guests).unwrap();

        let reimported = parse_guests(&bytes).unwrap();
        let expected: Vec<GuestDetails> = guests
            .iter()
            .map(|g| GuestDetails {
                guest_name: g.guest_name.clone(),
                company_name: g.company_name.clone(),
                department: g.department.clone(),
                email: g.email.clone(),
            })
            .collect();
        assert_eq!(reimported, expected);
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(all_guests_file_name(date), "All_Guests_2025-03-09.csv");
        assert_eq!(exhibitor_file_name("Acme"), "Guests_Acme.csv");
        assert_eq!(exhibitor_file_name("A/B \"C\""), "Guests_A_B _C_.csv");
    }
}
