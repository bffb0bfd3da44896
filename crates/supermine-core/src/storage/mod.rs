mod config;
pub mod database;
pub mod keys;
pub mod memory;

pub use config::{
    BoostConfig, BoostPackage, Config, ConversionConfig, CooldownConfig, HashrateConfig,
    MiningConfig, RewardsConfig,
};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{CoreError, StorageError};

/// One write inside an ordered batch.
#[derive(Debug, Clone, PartialEq)]
pub enum KvWrite {
    Set(&'static str, String),
    Remove(&'static str),
}

impl KvWrite {
    pub fn set(key: &'static str, value: impl ToString) -> Self {
        KvWrite::Set(key, value.to_string())
    }
}

/// String-valued persistent key-value store.
///
/// Methods take `&self`; implementations provide their own interior
/// mutability. Absent keys read as `Ok(None)`.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Apply `writes` in order. Stores that support transactions override
    /// this so the batch lands all-or-nothing.
    fn apply(&self, writes: &[KvWrite]) -> Result<(), StorageError> {
        for write in writes {
            match write {
                KvWrite::Set(key, value) => self.set(key, value)?,
                KvWrite::Remove(key) => self.remove(key)?,
            }
        }
        Ok(())
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn apply(&self, writes: &[KvWrite]) -> Result<(), StorageError> {
        (**self).apply(writes)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `SUPERMINE_DATA_DIR` wins when set. Otherwise `~/.config/supermine`, or
/// `~/.config/supermine-dev` when `SUPERMINE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("SUPERMINE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SUPERMINE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("supermine-dev")
            } else {
                base_dir.join("supermine")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
