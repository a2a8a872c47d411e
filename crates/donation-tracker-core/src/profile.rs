//! The persisted donation profile and the local-day date helpers it relies on.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Days that must pass after a donation before the next one is allowed.
pub const CYCLE_DAYS: u64 = 56;

/// Durable record of the user's donation history.
///
/// `last_donation_date` is always the UTC instant of a local midnight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationProfile {
    pub last_donation_date: Option<DateTime<Utc>>,
    pub user_name: Option<String>,
    pub donation_count: u32,
}

impl DonationProfile {
    pub fn is_empty(&self) -> bool {
        self.last_donation_date.is_none() && self.user_name.is_none() && self.donation_count == 0
    }
}

/// The instant at which `date` begins in `tz`.
///
/// Ambiguous midnights resolve to the earlier instant. When midnight falls in
/// a DST gap the day starts at 01:00 local, and a zone that skips that too
/// falls back to UTC midnight.
pub fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Truncate an instant to the start of its local day in `tz`.
pub fn normalize_to_midnight<Tz: TimeZone>(tz: &Tz, instant: DateTime<Utc>) -> DateTime<Utc> {
    local_midnight(tz, instant.with_timezone(tz).date_naive())
}

/// `last + CYCLE_DAYS` calendar days, at local midnight.
///
/// Adds days to the local calendar date rather than adding 56×24h, so a DST
/// change inside the cycle does not shift the result off midnight.
pub fn derive_next_date<Tz: TimeZone>(
    last_donation_date: Option<DateTime<Utc>>,
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    let last_day = last_donation_date?.with_timezone(tz).date_naive();
    let next_day = last_day.checked_add_days(Days::new(CYCLE_DAYS))?;
    Some(local_midnight(tz, next_day))
}

/// Render a date the way it is persisted: `2024-01-15T00:00:00.000Z`.
pub fn format_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw.trim()).map(|dt| dt.with_timezone(&Utc))
}
