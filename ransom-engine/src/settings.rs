//! Settings persistence boundary.
//!
//! The host owns the settings widget and the storage medium; the engine
//! defines the payload shape and the load/save contract around it. A
//! broken store never takes the mod down: load failures fall back to the
//! compiled-in defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

use crate::config::RansomConfig;

/// Trait for abstracting settings persistence.
/// Host-specific implementations should provide this.
pub trait SettingsStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load previously saved settings, `None` when nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self) -> Result<Option<RansomConfig>, Self::Error>;

    /// Persist the current settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, cfg: &RansomConfig) -> Result<(), Self::Error>;
}

/// Error raised by [`JsonFileStore`].
#[derive(Debug, Error)]
pub enum SettingsFileError {
    #[error("settings file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings store backed by a JSON file on disk.
///
/// Hosts without their own persistence layer point this at a writable
/// path. A missing file reads as nothing stored, so first boot works
/// without setup.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    type Error = SettingsFileError;

    fn load(&self) -> Result<Option<RansomConfig>, Self::Error> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let cfg = serde_json::from_str(&raw)?;
        Ok(Some(cfg))
    }

    fn save(&self, cfg: &RansomConfig) -> Result<(), Self::Error> {
        let raw = serde_json::to_string_pretty(cfg)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Load settings, substituting compiled-in defaults when the store fails
/// or holds values outside the documented bounds.
#[must_use]
pub fn load_or_default<S: SettingsStore>(store: &S) -> RansomConfig {
    match store.load() {
        Ok(Some(cfg)) => match cfg.validate() {
            Ok(()) => cfg,
            Err(err) => {
                warn!("stored ransom settings invalid, using defaults: {err}");
                RansomConfig::default()
            }
        },
        Ok(None) => RansomConfig::default(),
        Err(err) => {
            warn!("ransom settings unavailable, using defaults: {err}");
            RansomConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::convert::Infallible;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("store offline")]
    struct StoreOffline;

    struct FailingStore;

    impl SettingsStore for FailingStore {
        type Error = StoreOffline;

        fn load(&self) -> Result<Option<RansomConfig>, Self::Error> {
            Err(StoreOffline)
        }

        fn save(&self, _cfg: &RansomConfig) -> Result<(), Self::Error> {
            Err(StoreOffline)
        }
    }

    struct FixedStore(Option<RansomConfig>);

    impl SettingsStore for FixedStore {
        type Error = Infallible;

        fn load(&self) -> Result<Option<RansomConfig>, Self::Error> {
            Ok(self.0.clone())
        }

        fn save(&self, _cfg: &RansomConfig) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Option<RansomConfig>>,
    }

    impl SettingsStore for MemoryStore {
        type Error = Infallible;

        fn load(&self) -> Result<Option<RansomConfig>, Self::Error> {
            Ok(self.saved.borrow().clone())
        }

        fn save(&self, cfg: &RansomConfig) -> Result<(), Self::Error> {
            *self.saved.borrow_mut() = Some(cfg.clone());
            Ok(())
        }
    }

    #[test]
    fn load_failure_falls_back_to_defaults() {
        let cfg = load_or_default(&FailingStore);
        assert_eq!(cfg, RansomConfig::default());
    }

    #[test]
    fn empty_store_yields_defaults() {
        let cfg = load_or_default(&FixedStore(None));
        assert_eq!(cfg, RansomConfig::default());
    }

    #[test]
    fn invalid_stored_settings_fall_back_to_defaults() {
        let broken = RansomConfig {
            factor: -3.0,
            ..RansomConfig::default()
        };
        let cfg = load_or_default(&FixedStore(Some(broken)));
        assert_eq!(cfg, RansomConfig::default());
    }

    #[test]
    fn valid_stored_settings_survive_the_boundary() {
        let stored = RansomConfig {
            factor: 3.5,
            ..RansomConfig::default()
        };
        let cfg = load_or_default(&FixedStore(Some(stored.clone())));
        assert_eq!(cfg, stored);
    }

    #[test]
    fn settings_roundtrip_through_a_memory_store() {
        let store = MemoryStore::default();
        let cfg = RansomConfig {
            base_adjustment: 60.0,
            ..RansomConfig::default()
        };
        store.save(&cfg).unwrap();
        assert_eq!(load_or_default(&store), cfg);
    }

    #[test]
    fn json_file_store_roundtrip() {
        let path = std::env::temp_dir().join("ransom-settings-roundtrip.json");
        let _ = std::fs::remove_file(&path);
        let store = JsonFileStore::new(&path);
        assert!(store.load().unwrap().is_none());

        let cfg = RansomConfig {
            factor: 4.5,
            ..RansomConfig::default()
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), Some(cfg));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn corrupt_settings_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("ransom-settings-corrupt.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.load().is_err());
        assert_eq!(load_or_default(&store), RansomConfig::default());
        let _ = std::fs::remove_file(&path);
    }
}
