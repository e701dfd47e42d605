use serde::{Deserialize, Serialize};

use crate::engine::difficulty::Difficulty;
use crate::engine::operation::Operation;
use crate::engine::random::RandomSource;
use crate::engine::ranges::RangeTable;
use crate::error::QuizResult;

/// Divisor and quotient for division questions are always drawn from this range.
const DIVISION_FACTOR_MIN: i64 = 1;
const DIVISION_FACTOR_MAX: i64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub operand_a: i64,
    pub operand_b: i64,
    pub operation: Operation,
    pub display_text: String,
}

impl Question {
    pub fn new(operand_a: i64, operand_b: i64, operation: Operation) -> Self {
        let display_text = format!("{operand_a} {} {operand_b}", operation.glyph());
        Self {
            operand_a,
            operand_b,
            operation,
            display_text,
        }
    }
}

pub struct QuestionGenerator<'a> {
    table: &'a RangeTable,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(table: &'a RangeTable) -> Self {
        Self { table }
    }

    pub fn generate(
        &self,
        difficulty: Difficulty,
        rng: &mut dyn RandomSource,
    ) -> QuizResult<Question> {
        let ops = self.table.operations(difficulty)?;
        let operation = ops[rng.int_inclusive(0, ops.len() as i64 - 1) as usize];
        let range = self.table.range(difficulty, operation)?;

        let mut a = rng.int_inclusive(range.min, range.max);
        let mut b = rng.int_inclusive(range.min, range.max);

        match operation {
            // Swap rather than redraw: biased toward the larger first operand.
            Operation::Subtract if a < b => std::mem::swap(&mut a, &mut b),
            Operation::Divide => {
                b = rng.int_inclusive(DIVISION_FACTOR_MIN, DIVISION_FACTOR_MAX);
                a = b * rng.int_inclusive(DIVISION_FACTOR_MIN, DIVISION_FACTOR_MAX);
            }
            _ => {}
        }

        Ok(Question::new(a, b, operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::difficulty::ALL_DIFFICULTIES;
    use crate::engine::random::{RngSource, ScriptedSource};
    use crate::engine::ranges::OperandRange;
    use crate::error::QuizError;

    #[test]
    fn test_forced_operands_render_question() {
        let table = RangeTable::default();
        // op index 0, then operands 3 and 4
        let mut rng = ScriptedSource::new([0, 3, 4]);
        let q = QuestionGenerator::new(&table)
            .generate(Difficulty::Easy, &mut rng)
            .unwrap();
        assert_eq!(q.display_text, "3 + 4");
        assert_eq!(q.operation, Operation::Add);
    }

    #[test]
    fn test_subtraction_swaps_operands() {
        let table = RangeTable::default();
        let mut rng = ScriptedSource::new([1, 2, 9]);
        let q = QuestionGenerator::new(&table)
            .generate(Difficulty::Medium, &mut rng)
            .unwrap();
        assert_eq!((q.operand_a, q.operand_b), (9, 2));
        assert_eq!(q.display_text, "9 - 2");
    }

    #[test]
    fn test_division_uses_factor_draws() {
        let table = RangeTable::default();
        // op index 3 (divide), generic draws 5 and 5, then divisor 6, quotient 7
        let mut rng = ScriptedSource::new([3, 5, 5, 6, 7]);
        let q = QuestionGenerator::new(&table)
            .generate(Difficulty::Expert, &mut rng)
            .unwrap();
        assert_eq!((q.operand_a, q.operand_b), (42, 6));
        assert_eq!(q.display_text, "42 ÷ 6");
    }

    #[test]
    fn test_multiplication_display_glyph() {
        let table = RangeTable::default();
        let mut rng = ScriptedSource::new([2, 6, 7]);
        let q = QuestionGenerator::new(&table)
            .generate(Difficulty::Hard, &mut rng)
            .unwrap();
        assert_eq!(q.display_text, "6 × 7");
        assert_eq!(q.operation.token(), "*");
    }

    #[test]
    fn test_properties_hold_for_all_levels() {
        let table = RangeTable::default();
        let generator = QuestionGenerator::new(&table);
        let mut rng = RngSource::seeded(2024);
        for difficulty in ALL_DIFFICULTIES {
            let allowed = table.operations(difficulty).unwrap();
            for _ in 0..1000 {
                let q = generator.generate(difficulty, &mut rng).unwrap();
                assert!(allowed.contains(&q.operation));
                match q.operation {
                    Operation::Divide => {
                        assert!(q.operand_b >= 1 && q.operand_b <= 10);
                        assert_eq!(q.operand_a % q.operand_b, 0);
                        let quotient = q.operand_a / q.operand_b;
                        assert!((1..=10).contains(&quotient));
                    }
                    op => {
                        let range = table.range(difficulty, op).unwrap();
                        assert!(range.contains(q.operand_a), "{q:?}");
                        assert!(range.contains(q.operand_b), "{q:?}");
                        if op == Operation::Subtract {
                            assert!(q.operand_a - q.operand_b >= 0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_custom_range_is_respected() {
        let mut table = RangeTable::empty();
        table
            .insert(Difficulty::Hard, Operation::Multiply, OperandRange::new(11, 20))
            .unwrap();
        let generator = QuestionGenerator::new(&table);
        let mut rng = RngSource::seeded(9);
        for _ in 0..200 {
            let q = generator.generate(Difficulty::Hard, &mut rng).unwrap();
            assert!((11..=20).contains(&q.operand_a));
            assert!((11..=20).contains(&q.operand_b));
        }
    }

    #[test]
    fn test_unconfigured_difficulty_fails() {
        let table = RangeTable::empty();
        let mut rng = RngSource::seeded(1);
        let err = QuestionGenerator::new(&table)
            .generate(Difficulty::Easy, &mut rng)
            .unwrap_err();
        assert!(matches!(err, QuizError::Configuration(_)));
    }
}
