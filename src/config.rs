use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::Difficulty;
use crate::engine::chart_data::ChartMode;
use crate::engine::ranges::{RangeEntry, RangeTable};
use crate::error::QuizResult;

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_difficulty")]
    pub default_difficulty: Difficulty,
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
    #[serde(default = "default_correct_feedback_ms")]
    pub correct_feedback_ms: u64,
    #[serde(default = "default_incorrect_feedback_ms")]
    pub incorrect_feedback_ms: u64,
    #[serde(default)]
    pub chart_mode: ChartMode,
    /// Replaces the built-in operand table when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<Vec<RangeEntry>>,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_difficulty() -> Difficulty {
    Difficulty::Easy
}
fn default_save_debounce_ms() -> u64 {
    2000
}
fn default_correct_feedback_ms() -> u64 {
    750
}
fn default_incorrect_feedback_ms() -> u64 {
    2000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_difficulty: default_difficulty(),
            save_debounce_ms: default_save_debounce_ms(),
            correct_feedback_ms: default_correct_feedback_ms(),
            incorrect_feedback_ms: default_incorrect_feedback_ms(),
            chart_mode: ChartMode::default(),
            ranges: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathfc")
            .join("config.toml")
    }

    /// Clamp timing values into a usable range. Call after deserialization.
    pub fn normalize(&mut self) {
        self.save_debounce_ms = self.save_debounce_ms.min(MAX_DELAY_MS);
        self.correct_feedback_ms = self.correct_feedback_ms.min(MAX_DELAY_MS);
        self.incorrect_feedback_ms = self.incorrect_feedback_ms.min(MAX_DELAY_MS);
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn correct_feedback(&self) -> Duration {
        Duration::from_millis(self.correct_feedback_ms)
    }

    pub fn incorrect_feedback(&self) -> Duration {
        Duration::from_millis(self.incorrect_feedback_ms)
    }

    /// Operand table in effect: the override if configured, else the default.
    pub fn range_table(&self) -> QuizResult<RangeTable> {
        match &self.ranges {
            Some(rows) => RangeTable::from_entries(rows),
            None => Ok(RangeTable::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Operation;
    use crate::engine::ranges::OperandRange;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.save_debounce_ms, 2000);
        assert_eq!(config.correct_feedback_ms, 750);
        assert_eq!(config.incorrect_feedback_ms, 2000);
        assert_eq!(config.chart_mode, ChartMode::Counts);
    }

    #[test]
    fn test_config_partial_file() {
        let toml_str = r#"
theme = "catppuccin-mocha"
default_difficulty = 3
chart_mode = "percent"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "catppuccin-mocha");
        assert_eq!(config.default_difficulty, Difficulty::Hard);
        assert_eq!(config.chart_mode, ChartMode::Percent);
        assert_eq!(config.save_debounce_ms, 2000);
        assert!(config.ranges.is_none());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            ranges: Some(RangeTable::default().to_entries()),
            ..Config::default()
        };
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_range_override() {
        let toml_str = r#"
[[ranges]]
level = 1
operation = "+"
min = 5
max = 50
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let table = config.range_table().unwrap();
        assert_eq!(
            table.range(Difficulty::Easy, Operation::Add).unwrap(),
            OperandRange::new(5, 50)
        );
        assert!(table.operations(Difficulty::Medium).is_err());
    }

    #[test]
    fn test_bad_range_override_is_error() {
        let config = Config {
            ranges: Some(vec![RangeEntry {
                level: 1,
                operation: Operation::Add,
                min: 9,
                max: 2,
            }]),
            ..Config::default()
        };
        assert!(config.range_table().is_err());
    }

    #[test]
    fn test_normalize_clamps_delays() {
        let mut config = Config {
            save_debounce_ms: u64::MAX,
            theme: "  ".to_string(),
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.save_debounce_ms, MAX_DELAY_MS);
        assert_eq!(config.theme, "terminal-default");
    }
}
