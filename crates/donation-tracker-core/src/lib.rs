//! # Donation Tracker Core Library
//!
//! Core logic for tracking a blood-donation cycle: when the last donation
//! happened, when the next one is allowed, and a live countdown to it. The
//! CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Cycle Engine**: A wall-clock-based state machine that re-derives the
//!   countdown whenever the caller invokes `tick()` or mutates the profile
//! - **Profile Storage**: Independent key-value entries in SQLite, typed by
//!   [`ProfileStore`]
//! - **Configuration**: TOML preferences in the data directory
//!
//! ## Key Components
//!
//! - [`CycleTracker`]: Core cycle state machine
//! - [`SharedTracker`]: Mutex-guarded tracker with a ticking lifecycle
//! - [`ProfileStore`]: Profile persistence over a [`KvBackend`]
//! - [`Reminder`]: Approaching-date reminder policy

pub mod error;
pub mod events;
pub mod profile;
pub mod storage;
pub mod tracker;

pub use error::{ConfigError, CoreError, DatabaseError, StoreError};
pub use events::Event;
pub use profile::{DonationProfile, CYCLE_DAYS};
pub use storage::{Config, Database, KvBackend, MemoryKv, ProfileStore, SqliteProfileStore};
pub use tracker::{
    Clock, Countdown, CycleSnapshot, CycleState, CycleTracker, FixedClock, Reminder,
    SharedTracker, SystemClock, TickerHandle,
};
