pub mod comment;
pub mod user;

use time::OffsetDateTime;

// Timestamps are persisted as microseconds since the Unix epoch so the
// store collates them numerically.

pub fn timestamp_micros(ts: OffsetDateTime) -> i64 {
    (ts.unix_timestamp_nanos() / 1_000) as i64
}

pub fn timestamp_from_micros(micros: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(micros as i128 * 1_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}
