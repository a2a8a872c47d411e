//! Integration tests for the tracker over real and failing storage.

use chrono::{DateTime, TimeZone, Utc};
use donation_tracker_core::storage::{KEY_DONATION_COUNT, KEY_LAST_DATE, KEY_USER_NAME};
use donation_tracker_core::{
    CycleTracker, Database, Event, FixedClock, KvBackend, MemoryKv, ProfileStore, StoreError,
};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

/// Reads succeed, every write and removal fails.
#[derive(Default)]
struct ReadOnlyKv {
    inner: MemoryKv,
}

impl KvBackend for ReadOnlyKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Write {
            key: key.to_string(),
            message: "read-only filesystem".into(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        Err(StoreError::Write {
            key: key.to_string(),
            message: "read-only filesystem".into(),
        })
    }
}

/// Every read fails.
struct UnreadableKv;

impl KvBackend for UnreadableKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Read {
            key: key.to_string(),
            message: "permission denied".into(),
        })
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn profile_survives_restart_on_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("profile.db");
    let clock = FixedClock::new(utc(2024, 1, 5, 10, 0, 0));

    {
        let store = ProfileStore::new(Database::open_at(&path).unwrap());
        let mut tracker = CycleTracker::load(store, clock.clone());
        tracker.initialize_user("Alex", 2, utc(2024, 1, 1, 0, 0, 0));
        tracker.record_donation_today();
    }

    let store = ProfileStore::new(Database::open_at(&path).unwrap());
    let tracker = CycleTracker::load(store, clock);
    assert_eq!(tracker.user_name(), Some("Alex"));
    assert_eq!(tracker.donation_count(), 3);
    assert_eq!(tracker.last_donation_date(), Some(utc(2024, 1, 5, 0, 0, 0)));
    assert_eq!(tracker.next_donation_date(), Some(utc(2024, 3, 1, 0, 0, 0)));
    assert!(!tracker.is_eligible());
}

#[test]
fn write_failures_keep_memory_state() {
    let clock = FixedClock::new(utc(2024, 1, 1, 0, 0, 0));
    let mut tracker = CycleTracker::load(ProfileStore::new(ReadOnlyKv::default()), clock);

    tracker.initialize_user("Alex", 2, utc(2024, 1, 1, 0, 0, 0));
    assert_eq!(tracker.user_name(), Some("Alex"));
    assert_eq!(tracker.donation_count(), 2);
    assert!(!tracker.is_eligible());

    // Nothing reached the backend.
    assert!(tracker.store().backend().inner.is_empty());

    let event = tracker.reset_data();
    assert!(matches!(event, Event::ProfileReset { .. }));
    assert!(tracker.profile().is_empty());
}

#[test]
fn unreadable_store_degrades_to_empty_profile() {
    let clock = FixedClock::new(utc(2024, 1, 1, 0, 0, 0));
    let tracker = CycleTracker::load(ProfileStore::new(UnreadableKv), clock);
    assert!(tracker.profile().is_empty());
    assert!(tracker.is_eligible());
    assert_eq!(tracker.countdown(), None);
}

#[test]
fn legacy_timestamp_with_time_of_day_is_normalized_on_load() {
    let kv = MemoryKv::new();
    kv.set(KEY_LAST_DATE, "2024-01-01T18:30:00.000Z").unwrap();
    kv.set(KEY_USER_NAME, "Alex").unwrap();
    kv.set(KEY_DONATION_COUNT, "4").unwrap();

    let tracker = CycleTracker::load(ProfileStore::new(kv), FixedClock::new(utc(2024, 1, 2, 0, 0, 0)));
    assert_eq!(tracker.last_donation_date(), Some(utc(2024, 1, 1, 0, 0, 0)));
    assert_eq!(tracker.donation_count(), 4);
}

#[test]
fn full_cycle_waiting_then_eligible_then_waiting_again() {
    let clock = FixedClock::new(utc(2024, 1, 1, 8, 0, 0));
    let mut tracker = CycleTracker::load(ProfileStore::new(MemoryKv::new()), clock.clone());
    assert!(tracker.is_eligible());

    tracker.record_donation_today();
    assert!(!tracker.is_eligible());
    assert_eq!(tracker.days_until_next(), Some(55));

    clock.set(utc(2024, 2, 26, 0, 0, 0));
    assert!(matches!(tracker.tick(), Some(Event::BecameEligible { .. })));

    clock.set(utc(2024, 2, 27, 9, 0, 0));
    tracker.tick();
    assert!(tracker.is_eligible());
    assert_eq!(tracker.days_until_next(), None);
    assert!(tracker.time_difference_ms().unwrap() < 0);

    tracker.record_donation_today();
    assert_eq!(tracker.donation_count(), 2);
    assert!(!tracker.is_eligible());
}
