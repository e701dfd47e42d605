use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    /// Missing or invalid range table entry.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Distractor search gave up before finding four unique choices.
    #[error("generation error: {0}")]
    Generation(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        QuizError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for QuizError {
    fn from(err: std::io::Error) -> Self {
        QuizError::Storage(err.to_string())
    }
}

pub type QuizResult<T> = Result<T, QuizError>;
