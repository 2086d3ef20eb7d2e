//! HTTP API handlers, organized by audience:
//! - Guests and profile: the signed-in exhibitor
//! - Reception: any signed-in operator at a terminal
//! - Dashboard: organizers
//! - Invitations: public, addressed by guest id

pub mod dashboard;
pub mod guests;
pub mod invitations;
pub mod profile;
pub mod reception;

use std::fmt::Write as _;

/// `Content-Disposition` value for a download.
///
/// Carries an ASCII fallback name and the exact name percent-encoded as UTF-8.
pub(crate) fn attachment(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let mut encoded = String::with_capacity(file_name.len());
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
