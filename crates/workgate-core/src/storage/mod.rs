mod clock;
mod config;
pub mod database;
pub mod memory;

pub use clock::{ClockRecord, ClockSlot, PersistentClock};
pub use config::{Config, NotificationsConfig, TimerConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{ConfigError, StoreError};

/// Synchronous key-value storage backing the persistent clock.
///
/// Values are stored as text. Implementations are single-writer: every
/// write comes from the session's own callbacks, never concurrently.
pub trait ClockStore {
    /// Read a slot. `Ok(None)` means the slot was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a slot.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: ClockStore + ?Sized> ClockStore for &T {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }
}

/// Returns the workgate data directory.
///
/// `WORKGATE_HOME` wins when set. Otherwise `~/.config/workgate[-dev]/`,
/// with the `-dev` suffix selected by `WORKGATE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("WORKGATE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("WORKGATE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("workgate-dev")
            } else {
                base_dir.join("workgate")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
