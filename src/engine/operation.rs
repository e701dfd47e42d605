use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

pub const ALL_OPERATIONS: [Operation; 4] = [
    Operation::Add,
    Operation::Subtract,
    Operation::Multiply,
    Operation::Divide,
];

impl Operation {
    /// Machine token, also used as the storage key.
    pub fn token(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }

    pub fn chart_label(self) -> &'static str {
        match self {
            Operation::Add => "(+)",
            Operation::Subtract => "(-)",
            Operation::Multiply => "(×)",
            Operation::Divide => "(÷)",
        }
    }

    /// Exact integer evaluation. `None` on overflow, division by zero or a
    /// non-integer quotient.
    pub fn apply(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Operation::Add => a.checked_add(b),
            Operation::Subtract => a.checked_sub(b),
            Operation::Multiply => a.checked_mul(b),
            Operation::Divide => {
                if b == 0 || a.checked_rem(b)? != 0 {
                    None
                } else {
                    a.checked_div(b)
                }
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

impl FromStr for Operation {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Operation::Add),
            "-" | "−" => Ok(Operation::Subtract),
            "*" | "×" | "x" => Ok(Operation::Multiply),
            "/" | "÷" => Ok(Operation::Divide),
            other => Err(QuizError::Configuration(format!(
                "unknown operation '{other}'"
            ))),
        }
    }
}
