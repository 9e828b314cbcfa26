//! Configuration file support for Liftlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlog/config.toml`.

use crate::metrics::{OneRepMaxFormula, DEFAULT_BAR_WEIGHT_KG, DEFAULT_PLATES_KG};
use crate::session::CompletionPolicy;
use crate::types::{DistanceUnit, WeekStart, WeightUnit};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub units: UnitsConfig,

    #[serde(default)]
    pub week: WeekConfig,

    #[serde(default)]
    pub barbell: BarbellConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Display and conversion units
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct UnitsConfig {
    #[serde(default)]
    pub weight: WeightUnit,

    #[serde(default)]
    pub distance: DistanceUnit,
}

/// Calendar configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct WeekConfig {
    #[serde(default)]
    pub starts_on: WeekStart,
}

/// Barbell parameters for plate-loadout suggestions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarbellConfig {
    #[serde(default = "default_bar_weight")]
    pub bar_weight_kg: f64,

    #[serde(default = "default_plates")]
    pub plates_kg: Vec<f64>,
}

impl Default for BarbellConfig {
    fn default() -> Self {
        Self {
            bar_weight_kg: default_bar_weight(),
            plates_kg: default_plates(),
        }
    }
}

/// Session behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub completion: CompletionPolicy,

    #[serde(default = "default_formula")]
    pub one_rep_max_formula: OneRepMaxFormula,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            completion: CompletionPolicy::default(),
            one_rep_max_formula: default_formula(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("liftlog")
}

fn default_bar_weight() -> f64 {
    DEFAULT_BAR_WEIGHT_KG
}

fn default_plates() -> Vec<f64> {
    DEFAULT_PLATES_KG.to_vec()
}

fn default_formula() -> OneRepMaxFormula {
    OneRepMaxFormula::Epley
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("liftlog").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.barbell.bar_weight_kg, 20.0);
        assert_eq!(config.barbell.plates_kg.len(), 7);
        assert_eq!(config.units.weight, WeightUnit::Kg);
        assert_eq!(config.week.starts_on, WeekStart::Monday);
        assert_eq!(config.session.completion, CompletionPolicy::AllowPartial);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.barbell.bar_weight_kg, parsed.barbell.bar_weight_kg);
        assert_eq!(config.units.weight, parsed.units.weight);
        assert_eq!(config.session.completion, parsed.session.completion);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[week]
starts_on = "sunday"

[session]
completion = "require_all_done"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.week.starts_on, WeekStart::Sunday);
        assert_eq!(config.session.completion, CompletionPolicy::RequireAllDone);
        assert_eq!(config.barbell.bar_weight_kg, 20.0); // default
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.barbell.bar_weight_kg = 15.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.barbell.bar_weight_kg, 15.0);
    }
}
