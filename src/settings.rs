//! Player selections
//!
//! Persisted separately from the leaderboard through a [`Store`].

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceError, Store, load_or_default};

/// Starting level and cosmetic choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Level the next run starts at (1-based)
    pub start_level: u32,
    /// Index into the host's avatar list
    pub avatar: u32,
    /// Index into the host's city backdrops
    pub city: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_level: 1,
            avatar: 0,
            city: 0,
        }
    }
}

impl Settings {
    /// Starting level, never below 1
    pub fn start_level(&self) -> u32 {
        self.start_level.max(1)
    }

    /// Load from a store; absent or unreadable settings become defaults
    pub fn load<S: Store<Settings> + ?Sized>(store: &S) -> Self {
        let settings: Settings = load_or_default(store);
        log::info!(
            "Settings: level {}, avatar {}, city {}",
            settings.start_level(),
            settings.avatar,
            settings.city
        );
        settings
    }

    pub fn save<S: Store<Settings> + ?Sized>(&self, store: &mut S) -> Result<(), PersistenceError> {
        store.save(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_level_zero_reads_as_one() {
        let settings = Settings {
            start_level: 0,
            ..Default::default()
        };
        assert_eq!(settings.start_level(), 1);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"city": 2}"#).unwrap();
        assert_eq!(settings.start_level, 1);
        assert_eq!(settings.city, 2);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
        let settings = Settings {
            start_level: 7,
            avatar: 1,
            city: 3,
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }
}
