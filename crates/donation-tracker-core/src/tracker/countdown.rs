use serde::{Deserialize, Serialize};

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

/// Remaining time split into days, hours, minutes and seconds.
///
/// Days are unbounded; the smaller units never carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Countdown {
    /// Whole milliseconds this breakdown represents.
    pub fn total_ms(&self) -> u64 {
        (((self.days * 24 + self.hours as u64) * 60 + self.minutes as u64) * 60
            + self.seconds as u64)
            * 1000
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Break a time difference into a countdown.
///
/// Absent or negative differences yield `None`: once the date has passed
/// there is nothing to count down, rather than a clamped zero.
pub fn derive_countdown(time_difference_ms: Option<i64>) -> Option<Countdown> {
    let ms = u64::try_from(time_difference_ms?).ok()?;
    let total_seconds = ms / 1000;
    Some(Countdown {
        days: total_seconds / SECS_PER_DAY,
        hours: ((total_seconds % SECS_PER_DAY) / SECS_PER_HOUR) as u32,
        minutes: ((total_seconds % SECS_PER_HOUR) / SECS_PER_MINUTE) as u32,
        seconds: (total_seconds % SECS_PER_MINUTE) as u32,
    })
}
