//! Output directory templating.
//!
//! The only supported token is `${date}`, which expands to the local date as
//! `YYYYMMDD`.  Expansion happens every time a target is dumped, so a
//! long-running scheduler writes each day's export into a fresh directory.

use chrono::{Local, NaiveDate};

/// Placeholder replaced by the current date.
pub const DATE_TOKEN: &str = "${date}";

/// Replace every `${date}` in `path` with today's local date.
pub fn apply_date_token(path: &str) -> String {
    apply_date_token_on(path, Local::now().date_naive())
}

/// Replace every `${date}` in `path` with `date` formatted as `YYYYMMDD`.
pub fn apply_date_token_on(path: &str, date: NaiveDate) -> String {
    if !path.contains(DATE_TOKEN) {
        return path.to_string();
    }
    path.replace(DATE_TOKEN, &date.format("%Y%m%d").to_string())
}
