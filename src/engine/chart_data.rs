use serde::{Deserialize, Serialize};

use crate::engine::difficulty::ALL_DIFFICULTIES;
use crate::engine::operation::ALL_OPERATIONS;
use crate::engine::stats::{StatsSnapshot, Tally};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartCategory {
    Levels,
    Operations,
}

impl ChartCategory {
    pub fn title(self) -> &'static str {
        match self {
            ChartCategory::Levels => "By Level",
            ChartCategory::Operations => "By Operation",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ChartCategory::Levels => ChartCategory::Operations,
            ChartCategory::Operations => ChartCategory::Levels,
        }
    }
}

/// What a bar's value means. Applied to every chart alike.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    /// Correct answers.
    #[default]
    Counts,
    /// Accuracy percentage.
    Percent,
}

impl ChartMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartMode::Counts => "counts",
            ChartMode::Percent => "percent",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ChartMode::Counts => ChartMode::Percent,
            ChartMode::Percent => ChartMode::Counts,
        }
    }

    pub fn is_percent(self) -> bool {
        self == ChartMode::Percent
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

pub type ChartSeries = Vec<SeriesPoint>;

pub fn to_series(stats: &StatsSnapshot, category: ChartCategory, mode: ChartMode) -> ChartSeries {
    let value = |tally: Option<&Tally>| {
        let tally = tally.copied().unwrap_or_default();
        match mode {
            ChartMode::Counts => tally.correct as f64,
            ChartMode::Percent => tally.accuracy() as f64,
        }
    };

    match category {
        ChartCategory::Levels => ALL_DIFFICULTIES
            .iter()
            .map(|d| SeriesPoint {
                label: format!("Level {}", d.level()),
                value: value(stats.levels.get(d)),
            })
            .collect(),
        ChartCategory::Operations => ALL_OPERATIONS
            .iter()
            .map(|op| SeriesPoint {
                label: op.chart_label().to_string(),
                value: value(stats.operations.get(op)),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::difficulty::Difficulty;
    use crate::engine::operation::Operation;
    use crate::engine::stats::PlayerStats;

    fn sample_stats() -> StatsSnapshot {
        let mut stats = PlayerStats::default();
        stats.record(true, Operation::Multiply, Difficulty::Hard).unwrap();
        stats.record(true, Operation::Multiply, Difficulty::Hard).unwrap();
        stats.record(false, Operation::Multiply, Difficulty::Hard).unwrap();
        stats.record(true, Operation::Add, Difficulty::Easy).unwrap();
        stats.snapshot()
    }

    #[test]
    fn test_operation_labels_are_remapped() {
        let series = to_series(&sample_stats(), ChartCategory::Operations, ChartMode::Counts);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["(+)", "(-)", "(×)", "(÷)"]);
        assert_eq!(series[2].value, 2.0);
    }

    #[test]
    fn test_levels_series_counts() {
        let series = to_series(&sample_stats(), ChartCategory::Levels, ChartMode::Counts);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0].label, "Level 1");
        assert_eq!(series[0].value, 1.0);
        assert_eq!(series[2].value, 2.0);
        assert_eq!(series[3].value, 0.0);
    }

    #[test]
    fn test_percent_mode() {
        let series = to_series(&sample_stats(), ChartCategory::Levels, ChartMode::Percent);
        assert_eq!(series[0].value, 100.0);
        assert_eq!(series[2].value, 67.0);
        assert_eq!(series[1].value, 0.0);
    }

    #[test]
    fn test_chart_mode_serde() {
        assert_eq!(serde_json::to_string(&ChartMode::Percent).unwrap(), "\"percent\"");
    }
}
