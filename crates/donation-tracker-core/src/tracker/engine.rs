//! Donation cycle engine.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` periodically
//! (see [`SharedTracker`](super::SharedTracker) for a ticking wrapper).
//!
//! ## States
//!
//! ```text
//! Eligible --record_donation_today--> Waiting --tick (next date reached)--> Eligible
//! ```
//!
//! A profile with no recorded donation is Eligible.
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = CycleTracker::load(store, SystemClock);
//! tracker.record_donation_today();
//! // Once a second:
//! tracker.tick(); // Returns Some(Event::BecameEligible) when the wait ends
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::countdown::{derive_countdown, Countdown};
use super::reminder::Reminder;
use crate::error::StoreError;
use crate::events::Event;
use crate::profile::{derive_next_date, local_midnight, normalize_to_midnight, DonationProfile};
use crate::storage::{KvBackend, ProfileStore};

/// Values derived from the profile and the current instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleState {
    pub next_donation_date: Option<DateTime<Utc>>,
    /// `next_donation_date - now`; negative once the date has passed.
    pub time_difference_ms: Option<i64>,
    pub is_eligible: bool,
    pub countdown: Option<Countdown>,
}

impl CycleState {
    fn derive<Tz: TimeZone>(profile: &DonationProfile, now: &DateTime<Tz>) -> Self {
        let next_donation_date = derive_next_date(profile.last_donation_date, &now.timezone());
        let now_utc = now.with_timezone(&Utc);
        let time_difference_ms = next_donation_date.map(|next| (next - now_utc).num_milliseconds());
        Self {
            next_donation_date,
            time_difference_ms,
            // Nothing recorded means nothing to wait for.
            is_eligible: time_difference_ms.map_or(true, |ms| ms <= 0),
            countdown: derive_countdown(time_difference_ms),
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub user_name: Option<String>,
    pub donation_count: u32,
    pub last_donation_date: Option<DateTime<Utc>>,
    pub next_donation_date: Option<DateTime<Utc>>,
    pub time_remaining: Option<Countdown>,
    pub days_until_next: Option<u64>,
    pub is_eligible: bool,
    pub reminder: Option<Reminder>,
    pub at: DateTime<Utc>,
}

/// Tracks one user's donation cycle.
///
/// Owns the in-memory profile, mirrors every mutation to the store, and
/// re-derives [`CycleState`] whenever the profile or "now" changes.
pub struct CycleTracker<B, C: Clock> {
    store: ProfileStore<B>,
    clock: C,
    profile: DonationProfile,
    now: DateTime<C::Tz>,
    state: CycleState,
}

impl<B, C> std::fmt::Debug for CycleTracker<B, C>
where
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleTracker")
            .field("profile", &self.profile)
            .field("now", &self.now.with_timezone(&Utc))
            .field("state", &self.state)
            .finish()
    }
}

impl<B: KvBackend, C: Clock> CycleTracker<B, C> {
    /// Build a tracker from whatever the store currently holds.
    ///
    /// Unreadable or corrupt fields are logged and treated as absent, so this
    /// never fails.
    pub fn load(store: ProfileStore<B>, clock: C) -> Self {
        let now = clock.now();
        let tz = now.timezone();
        let profile = DonationProfile {
            last_donation_date: recover(store.load_date())
                .map(|date| normalize_to_midnight(&tz, date)),
            user_name: recover(store.load_name()),
            donation_count: recover(store.load_count()).unwrap_or(0),
        };
        let state = CycleState::derive(&profile, &now);
        tracing::debug!(?profile, "loaded donation profile");
        Self {
            store,
            clock,
            profile,
            now,
            state,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn profile(&self) -> &DonationProfile {
        &self.profile
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn store(&self) -> &ProfileStore<B> {
        &self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }

    pub fn last_donation_date(&self) -> Option<DateTime<Utc>> {
        self.profile.last_donation_date
    }

    pub fn next_donation_date(&self) -> Option<DateTime<Utc>> {
        self.state.next_donation_date
    }

    pub fn time_difference_ms(&self) -> Option<i64> {
        self.state.time_difference_ms
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.state.countdown
    }

    pub fn days_until_next(&self) -> Option<u64> {
        self.state.countdown.map(|c| c.days)
    }

    pub fn is_eligible(&self) -> bool {
        self.state.is_eligible
    }

    pub fn user_name(&self) -> Option<&str> {
        self.profile.user_name.as_deref()
    }

    pub fn donation_count(&self) -> u32 {
        self.profile.donation_count
    }

    pub fn reminder(&self) -> Option<Reminder> {
        Reminder::for_days_until(self.days_until_next().and_then(|d| i64::try_from(d).ok()))
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            user_name: self.profile.user_name.clone(),
            donation_count: self.profile.donation_count,
            last_donation_date: self.profile.last_donation_date,
            next_donation_date: self.state.next_donation_date,
            time_remaining: self.state.countdown,
            days_until_next: self.days_until_next(),
            is_eligible: self.state.is_eligible,
            reminder: self.reminder(),
            at: self.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call periodically. Returns `Some(Event::BecameEligible)` on the tick
    /// where the waiting period ends.
    pub fn tick(&mut self) -> Option<Event> {
        let was_eligible = self.state.is_eligible;
        self.now = self.clock.now();
        self.refresh();
        if !was_eligible && self.state.is_eligible {
            tracing::info!(next = ?self.state.next_donation_date, "donation window opened");
            return Some(Event::BecameEligible {
                next_donation_date: self.state.next_donation_date,
                at: self.now(),
            });
        }
        None
    }

    /// Replace the profile with the given name, count and last donation date.
    ///
    /// `date` is truncated to its local midnight. Store failures are logged
    /// and the in-memory profile is applied regardless.
    pub fn initialize_user(&mut self, name: &str, count: u32, date: DateTime<Utc>) -> Event {
        self.now = self.clock.now();
        let date = normalize_to_midnight(&self.now.timezone(), date);

        persist(self.store.save_name(name));
        persist(self.store.save_count(count));
        persist(self.store.save_date(date));

        self.profile = DonationProfile {
            last_donation_date: Some(date),
            user_name: Some(name.to_string()),
            donation_count: count,
        };
        self.refresh();
        tracing::info!(user = name, count, date = %date, "profile initialized");

        Event::ProfileInitialized {
            user_name: name.to_string(),
            donation_count: count,
            last_donation_date: date,
            at: self.now(),
        }
    }

    /// Record a donation made today: the last date moves to today's local
    /// midnight and the count goes up by one.
    ///
    /// Not idempotent: each call counts another donation.
    pub fn record_donation_today(&mut self) -> Event {
        self.now = self.clock.now();
        let today = local_midnight(&self.now.timezone(), self.now.date_naive());
        let count = self.profile.donation_count.saturating_add(1);

        if self.profile.last_donation_date == Some(today) {
            tracing::debug!(count, "another donation recorded on the same day");
        }

        persist(self.store.save_date(today));
        persist(self.store.save_count(count));

        self.profile.last_donation_date = Some(today);
        self.profile.donation_count = count;
        self.refresh();
        tracing::info!(count, date = %today, "donation recorded");

        Event::DonationRecorded {
            donation_count: count,
            last_donation_date: today,
            at: self.now(),
        }
    }

    /// Clear the store and return to the empty profile.
    pub fn reset_data(&mut self) -> Event {
        self.now = self.clock.now();
        persist(self.store.clear());
        self.profile = DonationProfile::default();
        self.refresh();
        tracing::info!("profile reset");
        Event::ProfileReset { at: self.now() }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn refresh(&mut self) {
        self.state = CycleState::derive(&self.profile, &self.now);
    }
}

/// Degrade a failed read to "absent".
fn recover<T>(result: Result<Option<T>, StoreError>) -> Option<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(key = e.key(), error = %e, "ignoring unreadable profile field");
        None
    })
}

/// Log a failed write and carry on; memory stays ahead of the store.
fn persist(result: Result<(), StoreError>) {
    if let Err(e) = result {
        tracing::error!(key = e.key(), error = %e, "failed to persist profile field");
    }
}
