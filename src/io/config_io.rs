//! Persistent settings: the zoomed root position and the hide-completed
//! filter, stored in a small TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error type for config load/save.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The two scalar settings the view model reads and writes. Abstracted
/// as a trait so tests can drive the view model with an in-memory store.
pub trait ConfigStore {
    /// Pre-order index (within the full tree) of the node currently
    /// zoomed as root; `None` means the true root.
    fn root_node_index(&self) -> Option<usize>;
    fn set_root_node_index(&mut self, index: Option<usize>);
    fn hide_complete_items(&self) -> bool;
    fn set_hide_complete_items(&mut self, hide: bool);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    state: StateSection,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root_index: Option<usize>,
    #[serde(default = "default_hide_complete")]
    hide_complete_items: bool,
}

impl Default for StateSection {
    fn default() -> Self {
        StateSection {
            root_index: None,
            hide_complete_items: default_hide_complete(),
        }
    }
}

fn default_hide_complete() -> bool {
    true
}

#[allow(deprecated)]
fn default_dir() -> PathBuf {
    std::env::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".twig")
}

/// File-backed [`ConfigStore`]. Settings are held in memory and written
/// back once, by [`ConfigManager::save`], at shutdown.
#[derive(Debug)]
pub struct ConfigManager {
    save_file: PathBuf,
    config_file: PathBuf,
    state: StateSection,
}

impl ConfigManager {
    /// Load settings from the config file, if it exists. Overrides
    /// replace the default paths under the user's `.twig` directory.
    pub fn load(
        save_file: Option<PathBuf>,
        config_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let dir = default_dir();
        let save_file = save_file.unwrap_or_else(|| dir.join("outline"));
        let config_file = config_file.unwrap_or_else(|| dir.join("config.toml"));

        let state = if config_file.exists() {
            let text = fs::read_to_string(&config_file).map_err(|e| ConfigError::Read {
                path: config_file.clone(),
                source: e,
            })?;
            toml::from_str::<ConfigFile>(&text)?.state
        } else {
            StateSection::default()
        };

        Ok(ConfigManager {
            save_file,
            config_file,
            state,
        })
    }

    pub fn save_file(&self) -> &Path {
        &self.save_file
    }

    /// Write the settings back to disk, creating the directory on demand.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_file.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: self.config_file.clone(),
                source: e,
            })?;
        }
        let text = toml::to_string(&ConfigFile {
            state: StateSection {
                root_index: self.state.root_index,
                hide_complete_items: self.state.hide_complete_items,
            },
        })?;
        fs::write(&self.config_file, text).map_err(|e| ConfigError::Write {
            path: self.config_file.clone(),
            source: e,
        })
    }
}

impl ConfigStore for ConfigManager {
    fn root_node_index(&self) -> Option<usize> {
        self.state.root_index
    }

    fn set_root_node_index(&mut self, index: Option<usize>) {
        self.state.root_index = index;
    }

    fn hide_complete_items(&self) -> bool {
        self.state.hide_complete_items
    }

    fn set_hide_complete_items(&mut self, hide: bool) {
        self.state.hide_complete_items = hide;
    }
}

/// In-memory [`ConfigStore`] for tests.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    pub root_node_index: Option<usize>,
    pub hide_complete_items: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            root_node_index: None,
            hide_complete_items: default_hide_complete(),
        }
    }
}

impl ConfigStore for MemoryConfig {
    fn root_node_index(&self) -> Option<usize> {
        self.root_node_index
    }

    fn set_root_node_index(&mut self, index: Option<usize>) {
        self.root_node_index = index;
    }

    fn hide_complete_items(&self) -> bool {
        self.hide_complete_items
    }

    fn set_hide_complete_items(&mut self, hide: bool) {
        self.hide_complete_items = hide;
    }
}
