use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpendError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ledger CSV used when `--file` is not given.
    pub source_path: String,
    pub default_top_n: usize,
    /// Minimum share (percent) for a category to appear in the expense distribution.
    pub pie_threshold: f64,
    /// How many categories (sorted) are selected when none are named.
    pub default_category_count: usize,
    pub export_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_path: "firefly_export.csv".to_string(),
            default_top_n: 5,
            pie_threshold: 0.5,
            default_category_count: 5,
            export_dir: ".".to_string(),
        }
    }
}

pub const KEYS: &[&str] = &[
    "source_path",
    "default_top_n",
    "pie_threshold",
    "default_category_count",
    "export_dir",
];

impl Settings {
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let bad = |what: &str| SpendError::Settings(format!("{key} expects {what}, got {value:?}"));
        match key {
            "source_path" => self.source_path = value.to_string(),
            "export_dir" => self.export_dir = value.to_string(),
            "default_top_n" => {
                self.default_top_n = value.parse().map_err(|_| bad("a whole number"))?
            }
            "default_category_count" => {
                self.default_category_count = value.parse().map_err(|_| bad("a whole number"))?
            }
            "pie_threshold" => {
                let t: f64 = value.parse().map_err(|_| bad("a number"))?;
                if !(0.0..=100.0).contains(&t) {
                    return Err(bad("a percentage between 0 and 100"));
                }
                self.pie_threshold = t;
            }
            _ => {
                return Err(SpendError::Settings(format!(
                    "unknown key {key:?} (expected one of: {})",
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("spendscope")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings_from(path: &Path) -> Settings {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SpendError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}
