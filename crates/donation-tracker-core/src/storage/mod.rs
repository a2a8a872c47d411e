mod config;
pub mod database;
pub mod profile_store;

pub use config::{Config, DisplayConfig, LogConfig, StorageConfig};
pub use database::{Database, DEFAULT_DB_FILE};
pub use profile_store::{
    KvBackend, MemoryKv, MemoryProfileStore, ProfileStore, SqliteProfileStore,
    KEY_DONATION_COUNT, KEY_LAST_DATE, KEY_USER_NAME,
};

use std::path::PathBuf;

use crate::error::DatabaseError;

/// Returns the data directory, creating it if needed.
///
/// `DONATION_TRACKER_HOME` overrides the location outright. Otherwise the
/// directory is `~/.config/donation-tracker[-dev]/`, with
/// `DONATION_TRACKER_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, DatabaseError> {
    let dir = match std::env::var_os("DONATION_TRACKER_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("DONATION_TRACKER_ENV")
                .unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("donation-tracker-dev")
            } else {
                base_dir.join("donation-tracker")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| DatabaseError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
