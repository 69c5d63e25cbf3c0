//! Timestamps used for `createdAt`/`updatedAt`.
//!
//! Everything is kept at microsecond precision so values survive the SQLite
//! INTEGER column and RFC 3339 JSON unchanged.

use time::{Duration, OffsetDateTime};

const NANOS_PER_MICRO: i128 = 1_000;

pub fn now() -> OffsetDateTime {
    truncate(OffsetDateTime::now_utc())
}

/// Timestamp for a mutation of a record last touched at `previous`.
///
/// Always strictly later than `previous`, even when the wall clock has not
/// advanced (or went backwards).
pub fn touch(previous: OffsetDateTime) -> OffsetDateTime {
    let now = now();
    let floor = previous + Duration::microseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}

pub fn to_micros(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / NANOS_PER_MICRO) as i64
}

pub fn from_micros(micros: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * NANOS_PER_MICRO)
}

fn truncate(at: OffsetDateTime) -> OffsetDateTime {
    from_micros(to_micros(at)).unwrap_or(at)
}
