use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Wall-clock time `after` from now, for log lines.
pub fn wall_clock_after(after: Duration) -> DateTime<Utc> {
    let secs = now_i64() + after.as_secs() as i64;
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}
