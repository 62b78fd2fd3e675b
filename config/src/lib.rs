//! Shell configuration store.
//!
//! The document is a flat TOML table:
//!
//! ```toml
//! geometry = "100x32"     # WxH or WxH+X+Y, in terminal cells
//! theme = "Dark"          # "Dark" | "Light"
//! title = "mks-os 1.1"
//! ```
//!
//! Loading never fails observably: a missing document yields defaults with a warning,
//! a malformed one yields defaults with an error, and a recognised key holding an
//! unusable value falls back to that key's default. Saving rewrites the recognised keys
//! with `toml_edit` so comments and keys this version doesn't know about survive.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

use mks_types::{Geometry, ShellConfig, Theme};
use mks_utils::{AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, recover_bak_file};

/// Overrides the config document location.
pub const CONFIG_ENV_VAR: &str = "MKS_OS_CONFIG";

const CONFIG_DIR: &str = ".mks-os";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file not found at {}", path.display())]
    Missing { path: PathBuf },
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigLoadError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Missing { path } | Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigSaveError {
    #[error("failed to create config directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write config to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Raw on-disk shape. Values stay untyped so one bad key can't fail the whole document.
#[derive(Debug, Default, Deserialize)]
struct RawShellConfig {
    geometry: Option<toml::Value>,
    theme: Option<toml::Value>,
    title: Option<toml::Value>,
}

impl RawShellConfig {
    fn resolve(self, path: &Path) -> ShellConfig {
        let defaults = ShellConfig::default();

        let geometry = match self.geometry {
            None => defaults.geometry,
            Some(toml::Value::String(raw)) => match raw.parse::<Geometry>() {
                Ok(geometry) => geometry,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Ignoring geometry: {e}");
                    defaults.geometry
                }
            },
            Some(other) => {
                tracing::warn!(
                    path = %path.display(),
                    "Ignoring geometry: expected a string, got {}",
                    other.type_str()
                );
                defaults.geometry
            }
        };

        let theme = match self.theme {
            None => defaults.theme,
            Some(toml::Value::String(raw)) => match raw.parse::<Theme>() {
                Ok(theme) => theme,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Ignoring theme: {e}");
                    defaults.theme
                }
            },
            Some(other) => {
                tracing::warn!(
                    path = %path.display(),
                    "Ignoring theme: expected a string, got {}",
                    other.type_str()
                );
                defaults.theme
            }
        };

        let title = match self.title {
            None => defaults.title,
            Some(toml::Value::String(raw)) => raw,
            Some(other) => {
                tracing::warn!(
                    path = %path.display(),
                    "Ignoring title: expected a string, got {}",
                    other.type_str()
                );
                defaults.title
            }
        };

        ShellConfig {
            geometry,
            theme,
            title,
        }
    }
}

/// Loads and saves [`ShellConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$MKS_OS_CONFIG` if set, otherwise at [`default_config_path`].
    #[must_use]
    pub fn from_env() -> Self {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(raw) if !raw.is_empty() => Self::new(PathBuf::from(raw)),
            _ => Self::new(default_config_path()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, reporting why defaults were used.
    ///
    /// Per-key fallbacks do not make this an error; they are logged as warnings and the
    /// remaining keys are kept.
    pub fn load_report(&self) -> Result<ShellConfig, ConfigLoadError> {
        recover_bak_file(&self.path);

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigLoadError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(err) => {
                return Err(ConfigLoadError::Read {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };

        let raw: RawShellConfig =
            toml::from_str(&content).map_err(|source| ConfigLoadError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(raw.resolve(&self.path))
    }

    /// Load the document, falling back to defaults on any failure.
    #[must_use]
    pub fn load(&self) -> ShellConfig {
        match self.load_report() {
            Ok(config) => config,
            Err(err @ ConfigLoadError::Missing { .. }) => {
                tracing::warn!("{err}. Using default settings.");
                ShellConfig::default()
            }
            Err(err) => {
                tracing::error!("{err}. Using default settings.");
                ShellConfig::default()
            }
        }
    }

    /// Write every recognised key, keeping whatever else the document holds.
    pub fn save(&self, config: &ShellConfig) -> Result<(), ConfigSaveError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ConfigSaveError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Could not read existing config, rewriting it: {err}"
                );
                String::new()
            }
        };

        let mut doc = match existing.parse::<toml_edit::DocumentMut>() {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Existing config is not valid TOML, rewriting it: {err}"
                );
                toml_edit::DocumentMut::new()
            }
        };

        doc["geometry"] = toml_edit::value(config.geometry.to_string());
        doc["theme"] = toml_edit::value(config.theme.as_str());
        doc["title"] = toml_edit::value(config.title.as_str());

        let serialized = doc.to_string();
        mks_utils::atomic_write_with_options(
            &self.path,
            serialized.as_bytes(),
            AtomicWriteOptions {
                file_sync: FileSyncPolicy::SyncAll,
                parent_dir_sync: ParentDirSyncPolicy::SyncBestEffort,
            },
        )
        .map_err(|source| ConfigSaveError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// `~/.mks-os/config.toml`, or `./.mks-os/config.toml` when there is no home directory.
#[must_use]
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Directory holding the config document and the `logs/` directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR))
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR))
}
