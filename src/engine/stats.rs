use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::difficulty::{ALL_DIFFICULTIES, Difficulty};
use crate::engine::operation::{ALL_OPERATIONS, Operation};
use crate::error::{QuizError, QuizResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub incorrect: u32,
}

impl Tally {
    pub fn attempts(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }

    /// Rounded percentage of correct answers, 0 with no attempts.
    pub fn accuracy(&self) -> u32 {
        percent(self.correct, self.attempts())
    }

    fn record(&mut self, is_correct: bool) -> QuizResult<()> {
        let slot = if is_correct {
            &mut self.correct
        } else {
            &mut self.incorrect
        };
        *slot = slot.checked_add(1).ok_or_else(overflow)?;
        Ok(())
    }
}

/// Answer statistics for one profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    #[serde(default)]
    pub streak: u32,
    #[serde(default, alias = "longest")]
    pub longest_streak: u32,
    #[serde(default)]
    pub levels: BTreeMap<Difficulty, Tally>,
    #[serde(default)]
    pub operations: BTreeMap<Operation, Tally>,
}

impl Default for PlayerStats {
    fn default() -> Self {
        let mut stats = Self {
            streak: 0,
            longest_streak: 0,
            levels: BTreeMap::new(),
            operations: BTreeMap::new(),
        };
        stats.backfill();
        stats
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_attempts: u32,
    pub total_correct: u32,
    pub total_incorrect: u32,
    /// Rounded percentage, 0 when there are no attempts.
    pub accuracy: u32,
    pub score: u32,
    pub streak: u32,
    pub longest_streak: u32,
    pub levels: BTreeMap<Difficulty, Tally>,
    pub operations: BTreeMap<Operation, Tally>,
}

impl PlayerStats {
    /// Insert zeroed tallies for any level or operation missing from loaded data.
    pub fn backfill(&mut self) {
        for d in ALL_DIFFICULTIES {
            self.levels.entry(d).or_default();
        }
        for op in ALL_OPERATIONS {
            self.operations.entry(op).or_default();
        }
        self.longest_streak = self.longest_streak.max(self.streak);
    }

    /// Record one answer. Either every counter is updated or none is.
    pub fn record(
        &mut self,
        is_correct: bool,
        operation: Operation,
        level: Difficulty,
    ) -> QuizResult<()> {
        let mut next = self.clone();
        next.levels.entry(level).or_default().record(is_correct)?;
        next.operations.entry(operation).or_default().record(is_correct)?;
        if is_correct {
            next.streak = next.streak.checked_add(1).ok_or_else(overflow)?;
            next.longest_streak = next.longest_streak.max(next.streak);
        } else {
            next.streak = 0;
        }
        *self = next;
        Ok(())
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let (correct, incorrect) = self
            .levels
            .values()
            .fold((0u32, 0u32), |(c, i), t| {
                (c.saturating_add(t.correct), i.saturating_add(t.incorrect))
            });
        let attempts = correct.saturating_add(incorrect);
        StatsSnapshot {
            total_attempts: attempts,
            total_correct: correct,
            total_incorrect: incorrect,
            accuracy: percent(correct, attempts),
            score: correct,
            streak: self.streak,
            longest_streak: self.longest_streak,
            levels: self.levels.clone(),
            operations: self.operations.clone(),
        }
    }
}

fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

fn overflow() -> QuizError {
    QuizError::InvalidState("stat counter overflow".into())
}
