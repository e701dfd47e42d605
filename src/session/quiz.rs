use tracing::{debug, info};

use crate::engine::answer::{self, CHOICE_COUNT, Evaluation};
use crate::engine::difficulty::Difficulty;
use crate::engine::question::{Question, QuestionGenerator};
use crate::engine::random::RandomSource;
use crate::engine::ranges::RangeTable;
use crate::engine::stats::PlayerStats;
use crate::error::{QuizError, QuizResult};

/// The question currently on screen together with its choices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub difficulty: Difficulty,
    pub question: Question,
    pub evaluation: Evaluation,
}

impl Round {
    pub fn choices(&self) -> &[i64; CHOICE_COUNT] {
        &self.evaluation.choices.values
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active(Round),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Stats updated and a new round loaded.
    Correct { answer: i64 },
    /// Stats updated; the same round stays current.
    Incorrect { chosen: i64, answer: i64 },
}

impl AnswerOutcome {
    pub fn is_correct(self) -> bool {
        matches!(self, AnswerOutcome::Correct { .. })
    }
}

pub struct QuizSession {
    table: RangeTable,
    state: SessionState,
}

impl QuizSession {
    pub fn new(table: RangeTable) -> Self {
        Self {
            table,
            state: SessionState::Idle,
        }
    }

    pub fn table(&self) -> &RangeTable {
        &self.table
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    pub fn round(&self) -> Option<&Round> {
        match &self.state {
            SessionState::Active(round) => Some(round),
            SessionState::Idle => None,
        }
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.round().map(|r| r.difficulty)
    }

    /// Enter `Active` with a fresh question. Restarts if already active.
    pub fn start(
        &mut self,
        difficulty: Difficulty,
        rng: &mut dyn RandomSource,
    ) -> QuizResult<&Round> {
        let round = self.next_round(difficulty, rng)?;
        info!(level = difficulty.level(), "quiz started");
        self.state = SessionState::Active(round);
        self.round()
            .ok_or_else(|| QuizError::InvalidState("session not active after start".into()))
    }

    pub fn submit(
        &mut self,
        choice_index: usize,
        stats: &mut PlayerStats,
        rng: &mut dyn RandomSource,
    ) -> QuizResult<AnswerOutcome> {
        let round = self
            .round()
            .ok_or_else(|| QuizError::InvalidState("no active quiz".into()))?;
        if choice_index >= CHOICE_COUNT {
            return Err(QuizError::Validation(format!(
                "choice {choice_index} out of range 0..{CHOICE_COUNT}"
            )));
        }

        let difficulty = round.difficulty;
        let operation = round.question.operation;
        let answer = round.evaluation.correct_answer;
        let chosen = round.choices()[choice_index];
        let is_correct = round.evaluation.choices.is_correct(choice_index);

        stats.record(is_correct, operation, difficulty)?;
        debug!(
            question = %round.question.display_text,
            chosen,
            answer,
            is_correct,
            "answer submitted"
        );

        if !is_correct {
            return Ok(AnswerOutcome::Incorrect { chosen, answer });
        }

        let next = self.next_round(difficulty, rng)?;
        self.state = SessionState::Active(next);
        Ok(AnswerOutcome::Correct { answer })
    }

    pub fn stop(&mut self) {
        if self.is_active() {
            info!("quiz stopped");
        }
        self.state = SessionState::Idle;
    }

    fn next_round(&self, difficulty: Difficulty, rng: &mut dyn RandomSource) -> QuizResult<Round> {
        let question = QuestionGenerator::new(&self.table).generate(difficulty, rng)?;
        let evaluation = answer::evaluate(&question, rng)?;
        Ok(Round {
            difficulty,
            question,
            evaluation,
        })
    }
}
