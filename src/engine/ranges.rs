use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::difficulty::{ALL_DIFFICULTIES, Difficulty};
use crate::engine::operation::{ALL_OPERATIONS, Operation};
use crate::error::{QuizError, QuizResult};

/// Inclusive operand range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandRange {
    pub min: i64,
    pub max: i64,
}

impl OperandRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// One row of a range override in `config.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEntry {
    pub level: u8,
    pub operation: Operation,
    pub min: i64,
    pub max: i64,
}

/// Operations permitted at each difficulty and the operand range each draws from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeTable {
    entries: BTreeMap<Difficulty, BTreeMap<Operation, OperandRange>>,
}

const DEFAULT_RANGE: OperandRange = OperandRange::new(1, 10);
/// Largest operand a range may allow. Keeps every product well inside `i64`.
pub const MAX_OPERAND: i64 = 1_000_000;

impl Default for RangeTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        for difficulty in ALL_DIFFICULTIES {
            let unlocked = difficulty.level() as usize;
            let ops = ALL_OPERATIONS[..unlocked]
                .iter()
                .map(|&op| (op, DEFAULT_RANGE))
                .collect();
            entries.insert(difficulty, ops);
        }
        Self { entries }
    }
}

impl RangeTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries(rows: &[RangeEntry]) -> QuizResult<Self> {
        let mut table = Self::empty();
        for row in rows {
            let difficulty = Difficulty::try_from(row.level)?;
            table.insert(difficulty, row.operation, OperandRange::new(row.min, row.max))?;
        }
        Ok(table)
    }

    pub fn to_entries(&self) -> Vec<RangeEntry> {
        self.entries
            .iter()
            .flat_map(|(difficulty, ops)| {
                ops.iter().map(|(&operation, range)| RangeEntry {
                    level: difficulty.level(),
                    operation,
                    min: range.min,
                    max: range.max,
                })
            })
            .collect()
    }

    pub fn insert(
        &mut self,
        difficulty: Difficulty,
        operation: Operation,
        range: OperandRange,
    ) -> QuizResult<()> {
        if range.min < 1 || range.min > range.max || range.max > MAX_OPERAND {
            return Err(QuizError::Configuration(format!(
                "invalid range [{}, {}] for level {difficulty} {}",
                range.min,
                range.max,
                operation.token()
            )));
        }
        self.entries
            .entry(difficulty)
            .or_default()
            .insert(operation, range);
        Ok(())
    }

    /// Operations unlocked at `difficulty`, in `+ - * /` order.
    pub fn operations(&self, difficulty: Difficulty) -> QuizResult<Vec<Operation>> {
        let ops: Vec<Operation> = self
            .entries
            .get(&difficulty)
            .map(|ops| ops.keys().copied().collect())
            .unwrap_or_default();
        if ops.is_empty() {
            return Err(QuizError::Configuration(format!(
                "no operations configured for level {difficulty}"
            )));
        }
        Ok(ops)
    }

    pub fn range(&self, difficulty: Difficulty, operation: Operation) -> QuizResult<OperandRange> {
        self.entries
            .get(&difficulty)
            .and_then(|ops| ops.get(&operation))
            .copied()
            .ok_or_else(|| {
                QuizError::Configuration(format!(
                    "no range configured for level {difficulty} {}",
                    operation.token()
                ))
            })
    }

    pub fn levels(&self) -> impl Iterator<Item = Difficulty> + '_ {
        self.entries.keys().copied()
    }
}
