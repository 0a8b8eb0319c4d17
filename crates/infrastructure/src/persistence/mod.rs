//! Persistence adapters.
//!
//! - `FileStorage`: credential store that survives restarts
//! - `MemoryStorage`: session store that lives as long as the process
//! - `SettingsRepository`: client settings file

mod file_storage;
mod memory_storage;
mod settings_repository;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use settings_repository::{SettingsError, SettingsRepository};
