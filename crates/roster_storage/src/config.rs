//! Store configuration.

use crate::model::PersonId;

/// Identities allowed to log in before the first full dataset arrives.
pub const DEFAULT_SEED_ALLOWED: [u64; 3] = [30477380, 30453355, 786110];

/// File name of the store document inside the data directory.
pub const STORE_FILE_NAME: &str = "roster.json";

/// File name of the lock guarding the data directory.
pub const LOCK_FILE_NAME: &str = "roster.lock";

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Allow-list written on first open if none was ever stored.
    pub seed_allowed: Vec<PersonId>,

    /// Whether to create the data directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to fsync the document on every write.
    pub sync_on_write: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_allowed: DEFAULT_SEED_ALLOWED.iter().copied().map(PersonId).collect(),
            create_if_missing: true,
            sync_on_write: true,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seed allow-list.
    #[must_use]
    pub fn seed_allowed<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PersonId>,
    {
        self.seed_allowed = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether to create the data directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to fsync on every write.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert!(config.create_if_missing);
        assert!(config.sync_on_write);
        assert_eq!(config.seed_allowed.len(), 3);
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new()
            .seed_allowed([30477380u64])
            .sync_on_write(false);

        assert_eq!(config.seed_allowed, vec![PersonId(30477380)]);
        assert!(!config.sync_on_write);
    }
}
