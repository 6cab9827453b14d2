// src/config.rs

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub mod constants {
    /// Smallest vertex count of a committed ring.
    pub const MIN_RING_POINTS: usize = 3;

    pub const APP_QUALIFIER: &str = "org";
    pub const APP_ORGANIZATION: &str = "mapeditor";
    pub const APP_NAME: &str = "map-polygon-editor";
    pub const CONFIG_FILE_NAME: &str = "config.json";

    pub const DEFAULT_POLYGONS_KEY: &str = "map-polygons";
    pub const DEFAULT_DARK_MODE_KEY: &str = "dark-mode";
    pub const DEFAULT_NAME_TEMPLATE: &str = "Polygon {n}";
    pub const NAME_ORDINAL_PLACEHOLDER: &str = "{n}";

    pub const DEFAULT_HIT_TOLERANCE_PX: f64 = 6.0;

    pub const MIN_ZOOM: f64 = 0.05;
    pub const MAX_ZOOM: f64 = 40.0;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// `{n}` is replaced with the 1-based ordinal of the new polygon.
    pub default_name_template: String,
    pub polygons_key: String,
    pub dark_mode_key: String,
    pub hit_tolerance_px: f64,
    pub storage_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_name_template: constants::DEFAULT_NAME_TEMPLATE.to_owned(),
            polygons_key: constants::DEFAULT_POLYGONS_KEY.to_owned(),
            dark_mode_key: constants::DEFAULT_DARK_MODE_KEY.to_owned(),
            hit_tolerance_px: constants::DEFAULT_HIT_TOLERANCE_PX,
            storage_dir: None,
        }
    }
}

impl EditorConfig {
    pub fn default_name(&self, ordinal: usize) -> String {
        self.default_name_template
            .replace(constants::NAME_ORDINAL_PLACEHOLDER, &ordinal.to_string())
    }

    pub fn from_json(raw: &str, path: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&raw, &display)
    }

    /// Reads `config.json` from the platform config directory; any failure
    /// falls back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Some(path) = config_file_path() else {
            log::warn!("no config directory available, using default config");
            return Self::default();
        };
        if !path.exists() {
            log::debug!("no config file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::default()
    }

    /// Directory for persisted polygons: the override, else the platform data dir.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage_dir.clone().or_else(|| {
            project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from(
        constants::APP_QUALIFIER,
        constants::APP_ORGANIZATION,
        constants::APP_NAME,
    )
}

#[cfg(not(target_arch = "wasm32"))]
fn config_file_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(constants::CONFIG_FILE_NAME))
}
