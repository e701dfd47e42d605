use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::engine::debounce::Debouncer;
use crate::error::{QuizError, QuizResult};
use crate::store::json_store::JsonStore;
use crate::store::schema::{CURRENT_USER_KEY, USERS_KEY, UserProfile};

/// Saved profiles plus the active one, with debounced write-through.
///
/// Answer updates go through [`ProfileStore::update_current`] and are written
/// once the debounce window passes without another update. Profile creation,
/// switching, edits and resets write immediately.
pub struct ProfileStore {
    store: Option<JsonStore>,
    users: Vec<UserProfile>,
    current: usize,
    writer: Debouncer,
    write_count: u32,
}

impl ProfileStore {
    /// Load saved profiles. With no usable data a Guest profile is created
    /// and written immediately.
    pub fn load(store: Option<JsonStore>, save_debounce: Duration) -> Self {
        let loaded: Option<Vec<UserProfile>> = store.as_ref().and_then(|s| s.get(USERS_KEY));
        if loaded.is_none() {
            // Unreadable data is moved aside, never overwritten.
            if let Some(s) = store.as_ref().filter(|s| s.has(USERS_KEY)) {
                match s.backup(USERS_KEY) {
                    Ok(path) => warn!(path = %path.display(), "unreadable profiles moved aside"),
                    Err(err) => warn!(%err, "failed to back up unreadable profiles"),
                }
            }
        }
        let mut users = loaded.unwrap_or_default();
        for user in &mut users {
            user.backfill();
        }
        let stored_current: Option<usize> = store.as_ref().and_then(|s| s.get(CURRENT_USER_KEY));

        let mut profiles = Self {
            store,
            users,
            current: 0,
            writer: Debouncer::new(save_debounce),
            write_count: 0,
        };

        if profiles.users.is_empty() {
            info!("no saved profiles, creating Guest");
            profiles.users.push(UserProfile {
                created_at: Some(Utc::now()),
                ..UserProfile::default()
            });
            profiles.persist_now();
            return profiles;
        }

        match stored_current {
            Some(idx) if idx < profiles.users.len() => profiles.current = idx,
            Some(idx) => {
                warn!(idx, users = profiles.users.len(), "stored current user out of range, using 0");
                profiles.persist_now();
            }
            None => profiles.persist_now(),
        }
        profiles
    }

    /// Profiles held only in memory.
    pub fn in_memory(save_debounce: Duration) -> Self {
        Self::load(None, save_debounce)
    }

    pub fn current(&self) -> &UserProfile {
        &self.users[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn users(&self) -> &[UserProfile] {
        &self.users
    }

    /// Indices in display order: current profile first, then the rest in
    /// stored order.
    pub fn display_order(&self) -> Vec<usize> {
        std::iter::once(self.current)
            .chain((0..self.users.len()).filter(|&i| i != self.current))
            .collect()
    }

    pub fn set_save_debounce(&mut self, window: Duration) {
        self.writer.set_window(window);
    }

    /// Mutate the current profile and arm the debounced write. The write is
    /// armed when `f` succeeds or when it changed the stats before failing.
    pub fn update_current<R>(
        &mut self,
        now: Instant,
        f: impl FnOnce(&mut UserProfile) -> QuizResult<R>,
    ) -> QuizResult<R> {
        let profile = &mut self.users[self.current];
        let before = profile.stats.clone();
        let result = f(profile);
        if result.is_ok() || profile.stats != before {
            profile.last_played_at = Some(Utc::now());
            self.writer.schedule(now);
        }
        result
    }

    /// Write if the debounce window has elapsed. A failed write is
    /// rescheduled for another window.
    pub fn tick(&mut self, now: Instant) {
        if !self.writer.take_due(now) {
            return;
        }
        debug!("debounced profile write");
        if let Err(err) = self.write() {
            warn!(%err, "failed to save profiles, retrying");
            self.writer.schedule(now);
        }
    }

    pub fn has_pending_write(&self) -> bool {
        self.writer.is_pending()
    }

    /// Write immediately, cancelling any pending debounced write.
    pub fn flush(&mut self) -> QuizResult<()> {
        self.writer.cancel();
        self.write()
    }

    pub fn add_user(&mut self, name: &str, avatar_id: u32) -> QuizResult<usize> {
        let profile = UserProfile::new(name, avatar_id)?;
        info!(name = %profile.name, "profile created");
        self.users.push(profile);
        self.current = self.users.len() - 1;
        self.flush()?;
        Ok(self.current)
    }

    pub fn switch_to(&mut self, index: usize) -> QuizResult<()> {
        if index >= self.users.len() {
            return Err(QuizError::Validation(format!("no profile at index {index}")));
        }
        self.current = index;
        info!(index, name = %self.users[index].name, "switched profile");
        self.flush()
    }

    pub fn edit_user(&mut self, index: usize, name: &str, avatar_id: u32) -> QuizResult<()> {
        let profile = self
            .users
            .get_mut(index)
            .ok_or_else(|| QuizError::Validation(format!("no profile at index {index}")))?;
        profile.rename(name, avatar_id)?;
        self.flush()
    }

    pub fn reset_current(&mut self) -> QuizResult<()> {
        self.users[self.current].reset_stats();
        info!(name = %self.current().name, "profile stats reset");
        self.flush()
    }

    pub fn write_count(&self) -> u32 {
        self.write_count
    }

    fn persist_now(&mut self) {
        if let Err(err) = self.flush() {
            warn!(%err, "failed to save profiles");
        }
    }

    fn write(&mut self) -> QuizResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        store.set(USERS_KEY, &self.users)?;
        store.set(CURRENT_USER_KEY, &self.current)?;
        self.write_count += 1;
        Ok(())
    }
}
