use crate::engine::question::Question;
use crate::engine::random::{RandomSource, shuffle};
use crate::error::{QuizError, QuizResult};

pub const CHOICE_COUNT: usize = 4;
const DISTRACTOR_SPREAD: i64 = 10;
const MAX_DISTRACTOR_ATTEMPTS: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceSet {
    pub values: [i64; CHOICE_COUNT],
    pub correct_index: usize,
}

impl ChoiceSet {
    pub fn correct_value(&self) -> i64 {
        self.values[self.correct_index]
    }

    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub correct_answer: i64,
    pub choices: ChoiceSet,
}

pub fn correct_answer(question: &Question) -> QuizResult<i64> {
    question
        .operation
        .apply(question.operand_a, question.operand_b)
        .ok_or_else(|| {
            QuizError::Generation(format!(
                "'{}' has no exact integer result",
                question.display_text
            ))
        })
}

pub fn evaluate(question: &Question, rng: &mut dyn RandomSource) -> QuizResult<Evaluation> {
    let correct = correct_answer(question)?;

    let mut values = Vec::with_capacity(CHOICE_COUNT);
    values.push(correct);
    let mut attempts = 0;
    while values.len() < CHOICE_COUNT {
        if attempts >= MAX_DISTRACTOR_ATTEMPTS {
            return Err(QuizError::Generation(format!(
                "found only {} unique choices for '{}' after {attempts} attempts",
                values.len(),
                question.display_text
            )));
        }
        attempts += 1;

        let offset = rng.int_inclusive(-DISTRACTOR_SPREAD, DISTRACTOR_SPREAD);
        if offset == 0 {
            continue;
        }
        let Some(candidate) = correct.checked_add(offset) else {
            continue;
        };
        if !values.contains(&candidate) {
            values.push(candidate);
        }
    }

    shuffle(&mut values, rng);
    let correct_index = values
        .iter()
        .position(|&v| v == correct)
        .ok_or_else(|| QuizError::Generation("correct answer lost during shuffle".into()))?;
    let values: [i64; CHOICE_COUNT] = values
        .try_into()
        .map_err(|_| QuizError::Generation("choice count mismatch".into()))?;

    Ok(Evaluation {
        correct_answer: correct,
        choices: ChoiceSet {
            values,
            correct_index,
        },
    })
}
