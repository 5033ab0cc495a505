use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CostscanError, Result};

pub const THRESHOLD_RANGE: std::ops::RangeInclusive<u32> = 5..=50;

/// Per-run analysis parameters. Applied uniformly to filtering and alarms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub year_min: i32,
    pub year_max: i32,
    pub alarm_threshold_pct: u32,
    pub alarm_min_base: f64,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.year_min > self.year_max {
            return Err(CostscanError::InvalidConfig(format!(
                "year_min ({}) is after year_max ({})",
                self.year_min, self.year_max
            )));
        }
        if !THRESHOLD_RANGE.contains(&self.alarm_threshold_pct) {
            return Err(CostscanError::InvalidConfig(format!(
                "alarm threshold must be between {} and {} percent, got {}",
                THRESHOLD_RANGE.start(),
                THRESHOLD_RANGE.end(),
                self.alarm_threshold_pct
            )));
        }
        if !self.alarm_min_base.is_finite() || self.alarm_min_base < 0.0 {
            return Err(CostscanError::InvalidConfig(format!(
                "alarm minimum base must be a non-negative amount, got {}",
                self.alarm_min_base
            )));
        }
        Ok(())
    }

    pub fn period_label(&self) -> String {
        format!("{}\u{2013}{}", self.year_min, self.year_max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_year_min")]
    pub year_min: i32,
    #[serde(default = "default_year_max")]
    pub year_max: i32,
    #[serde(default = "default_threshold")]
    pub alarm_threshold_pct: u32,
    #[serde(default = "default_min_base")]
    pub alarm_min_base: f64,
    /// Word substituted for "&" in vendor names.
    #[serde(default = "default_ampersand_word")]
    pub ampersand_word: String,
    #[serde(default = "default_output_dir_string")]
    pub output_dir: String,
}

fn default_year_min() -> i32 {
    2023
}

fn default_year_max() -> i32 {
    2025
}

fn default_threshold() -> u32 {
    10
}

fn default_min_base() -> f64 {
    100.0
}

fn default_ampersand_word() -> String {
    "und".to_string()
}

fn default_output_dir_string() -> String {
    default_output_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            year_min: default_year_min(),
            year_max: default_year_max(),
            alarm_threshold_pct: default_threshold(),
            alarm_min_base: default_min_base(),
            ampersand_word: default_ampersand_word(),
            output_dir: default_output_dir_string(),
        }
    }
}

impl Settings {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            year_min: self.year_min,
            year_max: self.year_max,
            alarm_threshold_pct: self.alarm_threshold_pct,
            alarm_min_base: self.alarm_min_base,
        }
    }

    /// Update one field from its string form, as given on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let bad = |e: &dyn std::fmt::Display| {
            CostscanError::Settings(format!("invalid value for {key}: {value} ({e})"))
        };
        let mut next = self.clone();
        match key {
            "year_min" => next.year_min = value.parse().map_err(|e| bad(&e))?,
            "year_max" => next.year_max = value.parse().map_err(|e| bad(&e))?,
            "alarm_threshold_pct" => next.alarm_threshold_pct = value.parse().map_err(|e| bad(&e))?,
            "alarm_min_base" => next.alarm_min_base = value.parse().map_err(|e| bad(&e))?,
            "ampersand_word" => next.ampersand_word = value.trim().to_string(),
            "output_dir" => next.output_dir = shellexpand_path(value),
            _ => return Err(CostscanError::Settings(format!("unknown setting: {key}"))),
        }
        next.analysis_config().validate()?;
        *self = next;
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("costscan")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("costscan")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing or unreadable files fall back to the defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CostscanError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
