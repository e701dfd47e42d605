use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::QuizError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
    Expert = 4,
}

pub const ALL_DIFFICULTIES: [Difficulty; 4] = [
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::Expert,
];

impl Difficulty {
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Difficulty::Easy),
            2 => Some(Difficulty::Medium),
            3 => Some(Difficulty::Hard),
            4 => Some(Difficulty::Expert),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }

    pub fn next(self) -> Self {
        Self::from_level(self.level() % 4 + 1).unwrap_or(Difficulty::Easy)
    }

    pub fn prev(self) -> Self {
        Self::from_level((self.level() + 2) % 4 + 1).unwrap_or(Difficulty::Expert)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        d.level()
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = QuizError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Difficulty::from_level(level)
            .ok_or_else(|| QuizError::Configuration(format!("unknown difficulty level {level}")))
    }
}

// Accepts both `2` and `"2"`: stored levels are JSON object keys, which
// reach us as strings when buffered through a flattened struct.
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelVisitor;

        impl Visitor<'_> for LevelVisitor {
            type Value = Difficulty;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a difficulty level from 1 to 4")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Difficulty, E> {
                u8::try_from(v)
                    .ok()
                    .and_then(Difficulty::from_level)
                    .ok_or_else(|| E::custom(format!("unknown difficulty level {v}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Difficulty, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("unknown difficulty level {v}")))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Difficulty, E> {
                v.trim()
                    .parse::<u64>()
                    .map_err(|_| E::custom(format!("unknown difficulty level '{v}'")))
                    .and_then(|v| self.visit_u64(v))
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}
