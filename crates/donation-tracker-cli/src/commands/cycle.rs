use chrono::{Local, NaiveDate};
use donation_tracker_core::error::Result;
use donation_tracker_core::profile::local_midnight;
use donation_tracker_core::{Config, CoreError, CycleTracker, Database, ProfileStore, SystemClock};

pub type LocalTracker = CycleTracker<Database, SystemClock>;

pub fn open_tracker(config: &Config) -> Result<LocalTracker> {
    let db = config.open_database()?;
    Ok(CycleTracker::load(ProfileStore::new(db), SystemClock))
}

pub fn status(config: &Config) -> Result<()> {
    let tracker = open_tracker(config)?;
    println!("{}", serde_json::to_string_pretty(&tracker.snapshot())?);
    Ok(())
}

pub fn init(config: &Config, name: &str, count: u32, date: NaiveDate) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CoreError::Custom("name must not be empty".into()));
    }
    let mut tracker = open_tracker(config)?;
    let event = tracker.initialize_user(name, count, local_midnight(&Local, date));
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

pub fn record(config: &Config) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let event = tracker.record_donation_today();
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

pub fn reset(config: &Config) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let event = tracker.reset_data();
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}
