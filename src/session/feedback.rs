use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    /// Value of the correct answer, shown in the banner.
    pub answer: i64,
    pub until: Instant,
}

/// Banner shown after an answer. Choice input is rejected while it is up.
#[derive(Clone, Debug)]
pub struct FeedbackLock {
    correct_delay: Duration,
    incorrect_delay: Duration,
    current: Option<Feedback>,
}

impl FeedbackLock {
    pub fn new(correct_delay: Duration, incorrect_delay: Duration) -> Self {
        Self {
            correct_delay,
            incorrect_delay,
            current: None,
        }
    }

    pub fn set_delays(&mut self, correct_delay: Duration, incorrect_delay: Duration) {
        self.correct_delay = correct_delay;
        self.incorrect_delay = incorrect_delay;
    }

    pub fn engage(&mut self, kind: FeedbackKind, answer: i64, now: Instant) {
        let delay = match kind {
            FeedbackKind::Correct => self.correct_delay,
            FeedbackKind::Incorrect => self.incorrect_delay,
        };
        self.current = Some(Feedback {
            kind,
            answer,
            until: now + delay,
        });
    }

    pub fn is_locked(&self, now: Instant) -> bool {
        self.current.is_some_and(|f| now < f.until)
    }

    /// Current banner, if it has not expired.
    pub fn active(&self, now: Instant) -> Option<Feedback> {
        self.current.filter(|f| now < f.until)
    }

    /// Drop an expired banner. Returns true if one was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.current.is_some() && !self.is_locked(now) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::debounce::{Clock, ManualClock};

    fn lock() -> FeedbackLock {
        FeedbackLock::new(Duration::from_millis(750), Duration::from_millis(2000))
    }

    #[test]
    fn test_unlocked_by_default() {
        let clock = ManualClock::new();
        assert!(!lock().is_locked(clock.now()));
    }

    #[test]
    fn test_correct_lock_lasts_750ms() {
        let clock = ManualClock::new();
        let mut l = lock();
        l.engage(FeedbackKind::Correct, 7, clock.now());
        clock.advance(Duration::from_millis(749));
        assert!(l.is_locked(clock.now()));
        clock.advance(Duration::from_millis(1));
        assert!(!l.is_locked(clock.now()));
        assert!(l.expire(clock.now()));
        assert!(!l.expire(clock.now()));
    }

    #[test]
    fn test_incorrect_lock_lasts_two_seconds() {
        let clock = ManualClock::new();
        let mut l = lock();
        l.engage(FeedbackKind::Incorrect, 12, clock.now());
        clock.advance(Duration::from_millis(1500));
        let active = l.active(clock.now()).unwrap();
        assert_eq!(active.kind, FeedbackKind::Incorrect);
        assert_eq!(active.answer, 12);
        clock.advance(Duration::from_millis(500));
        assert!(l.active(clock.now()).is_none());
    }

    #[test]
    fn test_new_feedback_replaces_old() {
        let clock = ManualClock::new();
        let mut l = lock();
        l.engage(FeedbackKind::Incorrect, 1, clock.now());
        l.engage(FeedbackKind::Correct, 2, clock.now());
        clock.advance(Duration::from_millis(800));
        assert!(!l.is_locked(clock.now()));
    }
}
