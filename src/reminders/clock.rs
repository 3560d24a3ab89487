use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tracing::warn;

use crate::schedules::repo_types::{format_date, format_minute};

/// Source of "now" for the reminder job, swappable in tests.
pub trait Clock: Send + Sync {
    /// Current host wall-clock time.
    fn now(&self) -> PrimitiveDateTime;
}

/// Host clock, shifted by the local UTC offset captured at startup.
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

/// Must run before the tokio runtime starts threads; `time` refuses to read
/// the local offset from a multi-threaded process on Unix.
pub fn host_offset() -> UtcOffset {
    match UtcOffset::current_local_offset() {
        Ok(offset) => offset,
        Err(e) => {
            warn!(error = %e, "could not determine local UTC offset; using UTC");
            UtcOffset::UTC
        }
    }
}

/// `(YYYY-MM-DD, HH:MM)` as stored on schedules.
pub fn date_and_minute(now: PrimitiveDateTime) -> (String, String) {
    (
        format_date(now.date()),
        format_minute(now.hour(), now.minute()),
    )
}

#[cfg(test)]
pub(crate) struct FixedClock(pub std::sync::Mutex<PrimitiveDateTime>);

#[cfg(test)]
impl FixedClock {
    pub fn at(now: PrimitiveDateTime) -> Self {
        Self(std::sync::Mutex::new(now))
    }

    pub fn set(&self, now: PrimitiveDateTime) {
        *self.0.lock().unwrap() = now;
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        *self.0.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_with_zero_padding() {
        let (date, minute) = date_and_minute(datetime!(2024-05-05 09:07:59));
        assert_eq!(date, "2024-05-05");
        assert_eq!(minute, "09:07");
    }

    #[test]
    fn system_clock_applies_offset() {
        let utc = SystemClock::new(UtcOffset::UTC).now();
        let plus_two = SystemClock::new(UtcOffset::from_hms(2, 0, 0).unwrap()).now();
        let diff = (plus_two - utc).whole_minutes();
        assert!((119..=120).contains(&diff), "diff was {diff}");
    }
}
