//! Configuration file handling
//!
//! Every section has defaults and every field is optional in the file, so a
//! config only needs to mention what differs. Files are TOML or JSON, picked by
//! extension.

use std::path::{Path, PathBuf};

use cnctools_core::CorrectionMode;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Directory under the platform config dir
pub const CONFIG_DIR_NAME: &str = "cnctools";

/// File name of the default config
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Height probing defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbingSettings {
    /// Probe positions along X
    pub rows: usize,
    /// Probe positions along Y
    pub cols: usize,
    /// Lowest Z the probe may travel to (mm)
    pub probe_depth: f64,
    /// Clearance between probe positions (mm)
    pub safe_height: f64,
    /// Probing feed rate (mm/min)
    pub probe_feed: u32,
}

impl Default for ProbingSettings {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 4,
            probe_depth: -5.0,
            safe_height: 5.0,
            probe_feed: 25,
        }
    }
}

/// Height map application
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingSettings {
    pub mode: CorrectionMode,
}

/// Spoilboard surfacing defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoilboardSettings {
    pub x_max: f64,
    pub y_max: f64,
    pub cut_depth: f64,
    pub stepover: f64,
    pub feed_rate: f64,
    pub spindle_speed: u32,
    pub corner: bool,
    pub climb: bool,
}

impl Default for SpoilboardSettings {
    fn default() -> Self {
        Self {
            x_max: 200.0,
            y_max: 150.0,
            cut_depth: 2.0,
            stepover: 8.0,
            feed_rate: 100.0,
            spindle_speed: 10000,
            corner: false,
            climb: false,
        }
    }
}

/// Laser test pattern defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserSettings {
    /// Power for the fill and triangle patterns
    pub power: f64,
    pub feed_rate: f64,
    pub beam_diameter: f64,
    /// Fraction of the beam shared by neighbouring fill passes
    pub overlap: f64,
    pub box_size: f64,
    pub focus_power: u32,
    pub focus_feed_rate: u32,
    pub focal_length: f64,
    pub focus_z_min: f64,
    pub focus_z_max: f64,
}

impl Default for LaserSettings {
    fn default() -> Self {
        Self {
            power: 1000.0,
            feed_rate: 500.0,
            beam_diameter: 0.2,
            overlap: 0.5,
            box_size: 5.0,
            focus_power: 75,
            focus_feed_rate: 100,
            focal_length: 40.0,
            focus_z_min: -5.0,
            focus_z_max: 5.0,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probing: ProbingSettings,
    pub leveling: LevelingSettings,
    pub spoilboard: SpoilboardSettings,
    pub laser: LaserSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(format!(
                "{} (config file must be .json or .toml)",
                path.display()
            ))
            .into()),
        }
    }
}

/// Default config location, `<config dir>/cnctools/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating the parent directory
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = ConfigFormat::from_path(path)?;

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Load an explicit config, else the default one when it exists, else defaults
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        match default_config_path() {
            Some(default) if default.is_file() => Self::load_from_file(&default),
            _ => {
                tracing::debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let p = &self.probing;
        if p.rows == 0 || p.cols == 0 {
            return Err(SettingsError::invalid(
                "probing.rows/cols",
                "grid needs at least one row and column",
            ));
        }
        if p.probe_feed == 0 {
            return Err(SettingsError::invalid("probing.probe_feed", "must be > 0"));
        }
        if !(p.safe_height.is_finite() && p.probe_depth.is_finite())
            || p.safe_height <= p.probe_depth
        {
            return Err(SettingsError::invalid(
                "probing.safe_height",
                "must be above probe_depth",
            ));
        }

        let s = &self.spoilboard;
        for (key, value) in [
            ("spoilboard.x_max", s.x_max),
            ("spoilboard.y_max", s.y_max),
            ("spoilboard.cut_depth", s.cut_depth),
            ("spoilboard.stepover", s.stepover),
            ("spoilboard.feed_rate", s.feed_rate),
            ("laser.power", self.laser.power),
            ("laser.feed_rate", self.laser.feed_rate),
            ("laser.beam_diameter", self.laser.beam_diameter),
            ("laser.box_size", self.laser.box_size),
        ] {
            require_positive(key, value)?;
        }

        let l = &self.laser;
        if !(0.0..1.0).contains(&l.overlap) {
            return Err(SettingsError::invalid("laser.overlap", "must be in [0, 1)"));
        }
        if l.focus_power == 0 || l.focus_feed_rate == 0 {
            return Err(SettingsError::invalid(
                "laser.focus_power/focus_feed_rate",
                "must be > 0",
            ));
        }
        if l.focus_z_max <= l.focus_z_min {
            return Err(SettingsError::invalid(
                "laser.focus_z_max",
                "must be above focus_z_min",
            ));
        }

        Ok(())
    }
}

fn require_positive(key: &str, value: f64) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, format!("must be > 0, got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[probing]\nrows = 8\n\n[leveling]\nmode = \"rewrite\"\n")
            .unwrap();
        assert_eq!(config.probing.rows, 8);
        assert_eq!(config.probing.cols, 4);
        assert_eq!(config.leveling.mode, CorrectionMode::Rewrite);
        assert_eq!(config.spoilboard, SpoilboardSettings::default());
    }

    #[test]
    fn test_validate_rejects_zero_grid() {
        let mut config = Config::default();
        config.probing.cols = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_overlap() {
        let mut config = Config::default();
        config.laser.overlap = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/config.TOML")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(ConfigFormat::from_path(Path::new("config.yaml")).is_err());
    }

    #[test]
    fn test_default_path_layout() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("cnctools/config.toml"));
        }
    }
}
