//! Business metrics for guestdesk.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `guestdesk_checkins_total{outcome}` - Scan outcomes at reception
//! - `guestdesk_guests_registered_total{source}` - Guests created, by form, import or walk-in
//! - `guestdesk_sign_ins_total{result}` - Sign-in attempts
//! - `guestdesk_exports_total{scope}` - CSV exports served

use metrics::describe_counter;

/// Register metric descriptions. Call once at startup, after the recorder is installed.
pub fn register_business_metrics() {
    describe_counter!(
        "guestdesk_checkins_total",
        "Scan outcomes at reception (success, already_checked_in, not_found, additional, write_failed)"
    );
    describe_counter!(
        "guestdesk_guests_registered_total",
        "Guests created, by source (form, import, walk_in)"
    );
    describe_counter!(
        "guestdesk_sign_ins_total",
        "Sign-in attempts by result (ok, rejected)"
    );
    describe_counter!(
        "guestdesk_exports_total",
        "CSV exports served, by scope (all, exhibitor)"
    );

    tracing::info!("Business metrics registered");
}

/// Record a scan outcome.
pub fn record_scan_outcome(outcome: &'static str) {
    metrics::counter!("guestdesk_checkins_total", "outcome" => outcome).increment(1);
}

/// Record created guests.
///
/// # Arguments
///
/// * `source` - `form`, `import` or `walk_in`
/// * `count` - Number of guests created
pub fn record_guests_registered(source: &'static str, count: usize) {
    metrics::counter!("guestdesk_guests_registered_total", "source" => source)
        .increment(u64::try_from(count).unwrap_or(u64::MAX));
}

/// Record a sign-in attempt.
pub fn record_sign_in(ok: bool) {
    let result = if ok { "ok" } else { "rejected" };
    metrics::counter!("guestdesk_sign_ins_total", "result" => result).increment(1);
}

/// Record a CSV export.
pub fn record_export(scope: &'static str) {
    metrics::counter!("guestdesk_exports_total", "scope" => scope).increment(1);
}
