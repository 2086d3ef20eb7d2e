//! CSV guest import.
//!
//! The header row decides which column is which. Accepted headers, case
//! insensitive:
//!
//! | field      | headers                     |
//! |------------|-----------------------------|
//! | name       | `name`, `Guest_Name`        |
//! | company    | `company`, `Guest_Company`  |
//! | department | `department`                |
//! | email      | `email`                     |
//!
//! The second spelling matches the dashboard export, so an export can be
//! imported again. Only the name column is required.

use crate::types::GuestDetails;
use guestdesk_web::AppError;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reasons a CSV batch is rejected. Nothing is inserted when any of these occur.
#[derive(Debug, Error)]
pub enum ImportError {
    /// No column could be read as the guest name
    #[error("The file needs a 'name' column")]
    MissingNameColumn,

    /// A data row has an empty name
    #[error("Line {line}: guest name is empty")]
    EmptyName {
        /// 1-based line number in the file
        line: u64,
    },

    /// Header present but no data rows
    #[error("The file contains no guests")]
    NoRows,

    /// The file is not valid CSV
    #[error("Could not read CSV: {0}")]
    Malformed(#[from] csv::Error),
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        Self::validation(err.to_string())
    }
}

#[derive(Debug, Default)]
struct Columns {
    name: Option<usize>,
    company: Option<usize>,
    department: Option<usize>,
    email: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut columns = Self::default();
        for (index, header) in headers.iter().enumerate() {
            let slot = match header.trim().to_ascii_lowercase().as_str() {
                "name" | "guest_name" => &mut columns.name,
                "company" | "guest_company" => &mut columns.company,
                "department" => &mut columns.department,
                "email" => &mut columns.email,
                _ => continue,
            };
            slot.get_or_insert(index);
        }
        columns
    }
}

fn field(record: &csv::StringRecord, column: Option<usize>) -> String {
    column
        .and_then(|index| record.get(index))
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Parse an uploaded CSV file into guest details.
///
/// A leading UTF-8 byte order mark is ignored. Missing optional columns
/// default to empty strings.
///
/// # Errors
///
/// See [`ImportError`]; the whole batch is rejected on the first problem.
pub fn parse_guests(data: &[u8]) -> Result<Vec<GuestDetails>, ImportError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let columns = Columns::from_headers(reader.headers()?);
    if columns.name.is_none() {
        return Err(ImportError::MissingNameColumn);
    }

    let mut guests = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);

        let guest_name = field(&record, columns.name);
        if guest_name.is_empty() {
            return Err(ImportError::EmptyName { line });
        }

        guests.push(GuestDetails {
            guest_name,
            company_name: field(&record, columns.company),
            department: field(&record, columns.department),
            email: field(&record, columns.email),
        });
    }

    if guests.is_empty() {
        return Err(ImportError::NoRows);
    }

    Ok(guests)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file_defaults_optional_fields() {
        let guests = parse_guests(b"name\nAda\nGrace\n").unwrap();
        assert_eq!(guests, vec![GuestDetails::named("Ada"), GuestDetails::named("Grace")]);
    }

    #[test]
    fn test_all_columns_any_order() {
        let csv = "email,department,company,name\n\
                   ada@example.com,R&D,Analytical Engines,Ada Lovelace\n";
        let guests = parse_guests(csv.as_bytes()).unwrap();
        assert_eq!(
            guests,
            vec![GuestDetails {
                guest_name: "Ada Lovelace".to_string(),
                company_name: "Analytical Engines".to_string(),
                department: "R&D".to_string(),
                email: "ada@example.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_name_column_rejects_batch() {
        let err = parse_guests(b"company\nAcme\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingNameColumn));
    }

    #[test]
    fn test_empty_name_names_the_line() {
        let err = parse_guests(b"name,company\nAda,Acme\n ,Globex\n").unwrap_err();
        assert!(matches!(err, ImportError::EmptyName { line: 3 }));
        assert_eq!(err.to_string(), "Line 3: guest name is empty");
    }

    #[test]
    fn test_header_only_is_rejected() {
        assert!(matches!(parse_guests(b"name\n"), Err(ImportError::NoRows)));
    }

    #[test]
    fn test_export_headers_and_bom_accepted() {
        let mut csv = UTF8_BOM.to_vec();
        csv.extend_from_slice(
            b"ID,Guest_Company,Department,Guest_Name,Email,Status,Exhibitor_ID,Registered_At\n\
              x,Acme,Sales,Linus,l@example.com,invited,y,2025-01-01T00:00:00+00:00\n",
        );
        let guests = parse_guests(&csv).unwrap();
        assert_eq!(guests[0].guest_name, "Linus");
        assert_eq!(guests[0].company_name, "Acme");
        assert_eq!(guests[0].department, "Sales");
        assert_eq!(guests[0].email, "l@example.com");
    }

    #[test]
    fn test_quoted_fields() {
        let guests = parse_guests(b"name,company\n\"Doe, Jane\",\"Acme \"\"West\"\"\"\n").unwrap();
        assert_eq!(guests[0].guest_name, "Doe, Jane");
        assert_eq!(guests[0].company_name, "Acme \"West\"");
    }
}
