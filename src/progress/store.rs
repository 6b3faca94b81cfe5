//! Persistence for progress and settings
//!
//! [`JsonFileStore`] keeps two pretty-printed JSON files in a data directory.
//! [`MemoryStore`] keeps everything in memory for headless runs and tests.
//! Reads that fail for any reason fall back to defaults via
//! [`ProgressStore::progress_or_default`] and [`ProgressStore::settings_or_default`].

use serde::{de::DeserializeOwned, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::{Progress, Settings};

const PROGRESS_FILE: &str = "progress.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("nothing saved at {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed data in {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize {what}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub trait ProgressStore {
    fn load_progress(&self) -> Result<Progress, StoreError>;
    fn save_progress(&mut self, progress: &Progress) -> Result<(), StoreError>;
    fn load_settings(&self) -> Result<Settings, StoreError>;
    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError>;

    /// Saved progress, or a fresh one if nothing usable is stored
    fn progress_or_default(&self) -> Progress {
        match self.load_progress() {
            Ok(progress) => progress,
            Err(StoreError::NotFound(path)) => {
                debug!(path = %path.display(), "no saved progress, starting fresh");
                Progress::default()
            }
            Err(err) => {
                warn!(error = %err, "could not load progress, using defaults");
                Progress::default()
            }
        }
    }

    /// Saved settings, or defaults if nothing usable is stored
    fn settings_or_default(&self) -> Settings {
        match self.load_settings() {
            Ok(settings) => settings,
            Err(StoreError::NotFound(path)) => {
                debug!(path = %path.display(), "no saved settings, using defaults");
                Settings::default()
            }
            Err(err) => {
                warn!(error = %err, "could not load settings, using defaults");
                Settings::default()
            }
        }
    }
}

/// JSON files under a single data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T, StoreError> {
        let path = self.dir.join(file);
        let json = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(path.clone())
            } else {
                StoreError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&json).map_err(|source| StoreError::Malformed { path, source })
    }

    /// Write through a temporary file so a crash never leaves half a file behind
    fn write<T: Serialize>(&self, file: &str, what: &'static str, value: &T) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let json = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Serialize { what, source })?;

        let path = self.dir.join(file);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }
}

impl ProgressStore for JsonFileStore {
    fn load_progress(&self) -> Result<Progress, StoreError> {
        self.read(PROGRESS_FILE)
    }

    fn save_progress(&mut self, progress: &Progress) -> Result<(), StoreError> {
        self.write(PROGRESS_FILE, "progress", progress)
    }

    fn load_settings(&self) -> Result<Settings, StoreError> {
        self.read(SETTINGS_FILE)
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.write(SETTINGS_FILE, "settings", settings)
    }
}

/// In-memory store; counts saves so callers can check when persistence happened
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    progress: Option<Progress>,
    settings: Option<Settings>,
    pub progress_saves: usize,
    pub settings_saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved_progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self) -> Result<Progress, StoreError> {
        self.progress
            .clone()
            .ok_or_else(|| StoreError::NotFound(PathBuf::from(PROGRESS_FILE)))
    }

    fn save_progress(&mut self, progress: &Progress) -> Result<(), StoreError> {
        self.progress = Some(progress.clone());
        self.progress_saves += 1;
        Ok(())
    }

    fn load_settings(&self) -> Result<Settings, StoreError> {
        self.settings
            .ok_or_else(|| StoreError::NotFound(PathBuf::from(SETTINGS_FILE)))
    }

    fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.settings = Some(*settings);
        self.settings_saves += 1;
        Ok(())
    }
}
