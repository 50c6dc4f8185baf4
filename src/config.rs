//! Runtime configuration
//!
//! Settings are read from JSON. Every field has a default, so a config file
//! only needs the values it changes:
//!
//! ```json
//! { "title": "My Game", "width": 1024, "background": "#202040" }
//! ```
//!
//! # Discovery
//!
//! 1. an explicit path given by the host (must exist)
//! 2. `<project>/playfield.json`
//! 3. `<user config dir>/playfield/config.json`
//! 4. built-in defaults

use crate::assets::AssetResolver;
use crate::color::Color;
use crate::error::ConfigError;
use crate::text_input::OverlayStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-project config file.
pub const PROJECT_CONFIG: &str = "playfield.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Asset root; relative roots are taken from the project directory
    pub asset_root: PathBuf,
    /// Directories retried when an asset is missing from the root
    pub fallback_dirs: Vec<String>,
    pub background: Color,
    /// Fill of the stand-in image used when a figure's image fails to load
    pub placeholder: Color,
    pub figure_width: f32,
    pub figure_height: f32,
    pub default_prompt: String,
    /// Frames between caret blinks
    pub caret_interval: u32,
    pub overlay: OverlayStyle,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            title: "Playfield".to_string(),
            width: 800,
            height: 600,
            asset_root: PathBuf::from("."),
            fallback_dirs: vec!["images".to_string(), "sounds".to_string()],
            background: Color::rgb(0x0d, 0x11, 0x17),
            placeholder: Color::rgb(0xff, 0x6b, 0x6b),
            figure_width: 50.0,
            figure_height: 50.0,
            default_prompt: "Input:".to_string(),
            caret_interval: 30,
            overlay: OverlayStyle::default(),
        }
    }
}

impl RuntimeConfig {
    /// Loads a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Finds and loads the config for `project_dir`, and anchors a relative
    /// asset root at the project directory.
    pub fn discover(project_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let user_dir = dirs::config_dir().map(|dir| dir.join("playfield"));
        Self::discover_with(project_dir, explicit, user_dir.as_deref())
    }

    fn discover_with(
        project_dir: &Path,
        explicit: Option<&Path>,
        user_dir: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let candidates = [
            Some(project_dir.join(PROJECT_CONFIG)),
            user_dir.map(|dir| dir.join("config.json")),
        ];

        let mut config = match explicit {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::load(path)?
            }
            None => match candidates.into_iter().flatten().find(|path| path.is_file()) {
                Some(path) => {
                    log::info!("Loading config from {}", path.display());
                    Self::load(&path)?
                }
                None => {
                    log::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        if config.asset_root.is_relative() {
            config.asset_root = project_dir.join(&config.asset_root);
        }
        Ok(config)
    }

    pub fn resolver(&self) -> AssetResolver {
        AssetResolver::new(self.asset_root.clone(), self.fallback_dirs.clone())
    }
}
