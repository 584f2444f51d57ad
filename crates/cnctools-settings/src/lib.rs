//! # cnctools Settings
//!
//! Loads, validates and saves the TOML/JSON configuration that supplies
//! defaults for the command-line tools.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, Config, LaserSettings, LevelingSettings, ProbingSettings,
    SpoilboardSettings, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
