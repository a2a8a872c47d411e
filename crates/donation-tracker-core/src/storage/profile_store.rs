//! Profile persistence over a string key-value backend.
//!
//! Each profile field is its own kv entry. Writes are independent: a caller
//! that saves several fields gets one result per field and no group atomicity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use super::Database;
use crate::error::StoreError;
use crate::profile::{format_timestamp, parse_timestamp};

pub const KEY_LAST_DATE: &str = "bloodDonation_lastDate";
pub const KEY_USER_NAME: &str = "bloodDonation_userName";
pub const KEY_DONATION_COUNT: &str = "bloodDonation_donationCount";

/// Minimal string get/set/remove surface a profile can be stored in.
pub trait KvBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl KvBackend for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.kv_get(key).map_err(|e| StoreError::Read {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.kv_set(key, value).map_err(|e| StoreError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.kv_remove(key).map_err(|e| StoreError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}

/// Process-local kv backend. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw persisted value, bypassing the profile codec.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvBackend for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Typed access to the three profile entries.
#[derive(Debug, Clone)]
pub struct ProfileStore<B> {
    backend: B,
}

pub type SqliteProfileStore = ProfileStore<Database>;
pub type MemoryProfileStore = ProfileStore<MemoryKv>;

impl<B: KvBackend> ProfileStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn load_date(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let Some(raw) = self.backend.get(KEY_LAST_DATE)? else {
            return Ok(None);
        };
        parse_timestamp(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: KEY_LAST_DATE.to_string(),
                value: raw,
                reason: e.to_string(),
            })
    }

    pub fn load_name(&self) -> Result<Option<String>, StoreError> {
        self.backend.get(KEY_USER_NAME)
    }

    pub fn load_count(&self) -> Result<Option<u32>, StoreError> {
        let Some(raw) = self.backend.get(KEY_DONATION_COUNT)? else {
            return Ok(None);
        };
        raw.trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: KEY_DONATION_COUNT.to_string(),
                value: raw,
                reason: e.to_string(),
            })
    }

    pub fn save_date(&self, date: DateTime<Utc>) -> Result<(), StoreError> {
        self.backend.set(KEY_LAST_DATE, &format_timestamp(date))
    }

    pub fn save_name(&self, name: &str) -> Result<(), StoreError> {
        self.backend.set(KEY_USER_NAME, name)
    }

    pub fn save_count(&self, count: u32) -> Result<(), StoreError> {
        self.backend.set(KEY_DONATION_COUNT, &count.to_string())
    }

    /// Remove all three entries.
    ///
    /// Every key is attempted even if an earlier removal fails; the first
    /// failure is returned.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut first_err = None;
        for key in [KEY_LAST_DATE, KEY_USER_NAME, KEY_DONATION_COUNT] {
            if let Err(e) = self.backend.remove(key) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
