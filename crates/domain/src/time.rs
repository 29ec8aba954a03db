//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp attached to published events.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
