use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::stats::PlayerStats;
use crate::error::{QuizError, QuizResult};

pub const USERS_KEY: &str = "users";
pub const CURRENT_USER_KEY: &str = "currentUserId";

pub const AVATAR_COUNT: u32 = 4;
pub const MAX_NAME_LEN: usize = 24;
const DEFAULT_NAME: &str = "Guest";

/// A saved player. Missing fields in stored data fall back to the template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub avatar_id: u32,
    #[serde(flatten)]
    pub stats: PlayerStats,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_played_at: Option<DateTime<Utc>>,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: default_name(),
            avatar_id: 0,
            stats: PlayerStats::default(),
            created_at: None,
            last_played_at: None,
        }
    }
}

impl UserProfile {
    pub fn new(name: &str, avatar_id: u32) -> QuizResult<Self> {
        let mut profile = Self {
            created_at: Some(Utc::now()),
            ..Self::default()
        };
        profile.rename(name, avatar_id)?;
        Ok(profile)
    }

    /// Validate and apply an edit. Nothing changes on error.
    pub fn rename(&mut self, name: &str, avatar_id: u32) -> QuizResult<()> {
        let name = validate_name(name)?;
        if avatar_id >= AVATAR_COUNT {
            return Err(QuizError::Validation(format!(
                "avatar {avatar_id} does not exist"
            )));
        }
        self.name = name;
        self.avatar_id = avatar_id;
        Ok(())
    }

    /// Reset statistics to the template, keeping identity.
    pub fn reset_stats(&mut self) {
        self.stats = PlayerStats::default();
        self.last_played_at = None;
    }

    pub fn backfill(&mut self) {
        self.stats.backfill();
    }
}

pub fn validate_name(name: &str) -> QuizResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(QuizError::Validation("name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(QuizError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Avatar glyph shown next to a profile name.
pub fn avatar_glyph(avatar_id: u32) -> &'static str {
    match avatar_id {
        0 => "(o_o)",
        1 => "(^_^)",
        2 => "(-_-)",
        3 => "(*_*)",
        _ => "(?_?)",
    }
}
