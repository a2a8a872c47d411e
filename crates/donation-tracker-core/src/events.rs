use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracker::CycleSnapshot;

/// Every state change in the tracker produces an Event.
/// Renderers either poll snapshots or subscribe to these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ProfileInitialized {
        user_name: String,
        donation_count: u32,
        last_donation_date: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    DonationRecorded {
        donation_count: u32,
        last_donation_date: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    ProfileReset {
        at: DateTime<Utc>,
    },
    /// The waiting period ended on this tick.
    BecameEligible {
        next_donation_date: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    StateSnapshot(CycleSnapshot),
}
