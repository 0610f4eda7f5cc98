//! Store configuration.
//!
//! # Invariants
//! - `storage_key` is never blank; blank input falls back to the default.

/// Slot key holding the persisted event snapshot.
pub const DEFAULT_STORAGE_KEY: &str = "events";

/// Configuration for snapshot persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    storage_key: String,
}

impl StoreConfig {
    /// Builds a config for `storage_key`, falling back to the default when blank.
    pub fn with_storage_key(storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let trimmed = storage_key.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        Self {
            storage_key: trimmed.to_string(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}
