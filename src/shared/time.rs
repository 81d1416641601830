//! Timestamps at the millisecond precision SQLite's date functions keep

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Current time truncated to whole milliseconds, used for every stored `created_at`
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Latest millisecond instant not after `at`
pub fn floor_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// Earliest millisecond instant not before `at`
pub fn ceil_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    let floor = at.trunc_subsecs(3);
    if floor < at {
        floor + Duration::milliseconds(1)
    } else {
        floor
    }
}
