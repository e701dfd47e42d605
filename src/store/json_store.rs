use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::error::QuizResult;

pub const APP_PREFIX: &str = "mathfc";

/// Key-value store: one pretty-printed JSON file per key, named
/// `<prefix>_<key>.json`, written atomically.
pub struct JsonStore {
    base_dir: PathBuf,
    prefix: String,
}

impl JsonStore {
    pub fn new() -> QuizResult<Self> {
        Self::with_base_dir(default_data_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> QuizResult<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            prefix: APP_PREFIX.to_string(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}_{key}.json", self.prefix))
    }

    /// Missing keys and unreadable or corrupt files come back as `None`;
    /// the latter are logged.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.file_path(key);
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!(key, path = %path.display(), %err, "failed to read stored value");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, path = %path.display(), %err, "stored value is corrupt, ignoring");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> QuizResult<()> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(value)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn has(&self, key: &str) -> bool {
        self.file_path(key).exists()
    }

    /// Move the file for `key` aside to `<file>.json.bak`, replacing any
    /// earlier backup. Returns the backup path.
    pub fn backup(&self, key: &str) -> QuizResult<PathBuf> {
        let path = self.file_path(key);
        let mut backup = path.clone().into_os_string();
        backup.push(".bak");
        let backup = PathBuf::from(backup);
        fs::rename(&path, &backup)?;
        Ok(backup)
    }

    pub fn remove(&self, key: &str) -> QuizResult<()> {
        let path = self.file_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_PREFIX)
}
