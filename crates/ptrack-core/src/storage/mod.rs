pub mod config;
pub mod database;
mod gateway;
mod memory;

pub use config::Config;
pub use database::Database;
pub use gateway::{Collection, Gateway};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// String key-value backend the persistence gateway writes through.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/ptrack[-dev]/` based on PTRACK_ENV.
///
/// Set PTRACK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PTRACK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ptrack-dev")
    } else {
        base_dir.join("ptrack")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
