// src/engine_lib/preferences.rs

use crate::config::EditorConfig;
use crate::engine_lib::storage::Storage;
use crate::error::StorageError;

/// Display preferences persisted next to the polygons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Preferences {
    pub dark_mode: bool,
}

impl Preferences {
    /// Anything other than a stored `"true"` means light mode.
    pub fn load(storage: &impl Storage, config: &EditorConfig) -> Self {
        let dark_mode = match storage.read_all(&config.dark_mode_key) {
            Ok(value) => value.as_deref().map(str::trim) == Some("true"),
            Err(e) => {
                log::warn!("could not read display preference: {e}");
                false
            }
        };
        Self { dark_mode }
    }

    pub fn save(&self, storage: &mut impl Storage, config: &EditorConfig) -> Result<(), StorageError> {
        storage.write_all(&config.dark_mode_key, if self.dark_mode { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_lib::storage::MemoryStorage;

    #[test]
    fn round_trips_through_storage() {
        let config = EditorConfig::default();
        let mut storage = MemoryStorage::new();
        assert_eq!(Preferences::load(&storage, &config), Preferences::default());

        Preferences { dark_mode: true }.save(&mut storage, &config).unwrap();
        assert_eq!(storage.get("dark-mode"), Some("true"));
        assert!(Preferences::load(&storage, &config).dark_mode);
    }

    #[test]
    fn garbage_means_light_mode() {
        let config = EditorConfig::default();
        let storage = MemoryStorage::new().with_entry("dark-mode", "yes please");
        assert!(!Preferences::load(&storage, &config).dark_mode);
    }
}
