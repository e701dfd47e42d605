use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::engine::Difficulty;
use crate::engine::answer::CHOICE_COUNT;
use crate::engine::chart_data::{self, ChartCategory, ChartSeries};
use crate::engine::random::{RandomSource, RngSource};
use crate::engine::ranges::RangeTable;
use crate::error::QuizError;
use crate::session::feedback::{Feedback, FeedbackKind, FeedbackLock};
use crate::session::quiz::{AnswerOutcome, QuizSession, Round};
use crate::store::json_store::JsonStore;
use crate::store::profiles::ProfileStore;
use crate::ui::components::bar_chart::{BarChartView, ChartOptions};
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::components::profile_list::{FormMode, ProfileForm};
use crate::ui::components::stats_dashboard::StatsDashboard;
use crate::ui::layout::{AppLayout, pack_hint_lines};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Quiz,
    Stats,
    Profiles,
    ProfileForm,
    Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

pub const SETTINGS_COUNT: usize = 6;
const CORRECT_DELAYS_MS: [u64; 4] = [500, 750, 1000, 1500];
const INCORRECT_DELAYS_MS: [u64; 4] = [1000, 2000, 3000, 4000];
const SAVE_DELAYS_MS: [u64; 4] = [500, 1000, 2000, 5000];

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu,
    pub theme: Theme,
    pub config: Config,
    pub session: QuizSession,
    pub profiles: ProfileStore,
    pub feedback: FeedbackLock,
    /// Choice picked in the last answer, shown while its feedback is up.
    pub last_choice: Option<usize>,
    /// Round just answered correctly, shown until its feedback expires.
    pub answered_round: Option<Round>,
    pub choice_selected: usize,
    pub stats_category: ChartCategory,
    pub chart: Option<BarChartView>,
    pub profile_selected: usize,
    pub profile_form: Option<ProfileForm>,
    pub confirm_reset: bool,
    pub settings_selected: usize,
    pub status: Option<StatusMessage>,
    pub viewport: Rect,
    pub should_quit: bool,
    rng: Box<dyn RandomSource>,
}

impl App {
    pub fn new(config: Config, store: Option<JsonStore>) -> Self {
        let profiles = ProfileStore::load(store, config.save_debounce());
        Self::with_parts(config, profiles, Box::new(RngSource::from_entropy()))
    }

    pub fn with_parts(config: Config, profiles: ProfileStore, rng: Box<dyn RandomSource>) -> Self {
        let theme = Theme::load(&config.theme).unwrap_or_else(|| {
            warn!(theme = %config.theme, "theme not found, using default");
            Theme::default()
        });

        let mut status = None;
        let table = config.range_table().unwrap_or_else(|err| {
            error!(%err, "invalid range override, using built-in table");
            status = Some(StatusMessage {
                text: format!("{err}; using built-in ranges"),
                kind: StatusKind::Error,
            });
            RangeTable::default()
        });

        let mut menu = Menu::new(&table);
        menu.select_difficulty(config.default_difficulty);

        let feedback = FeedbackLock::new(config.correct_feedback(), config.incorrect_feedback());

        Self {
            screen: AppScreen::Menu,
            menu,
            theme,
            config,
            session: QuizSession::new(table),
            profiles,
            feedback,
            last_choice: None,
            answered_round: None,
            choice_selected: 0,
            stats_category: ChartCategory::Levels,
            chart: None,
            profile_selected: 0,
            profile_form: None,
            confirm_reset: false,
            settings_selected: 0,
            status,
            viewport: Rect::new(0, 0, 80, 24),
            should_quit: false,
            rng,
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn report(&mut self, err: &QuizError) {
        match err {
            QuizError::Validation(_) => debug!(%err, "rejected input"),
            _ => warn!(%err, "operation failed"),
        }
        self.set_status(err.to_string(), StatusKind::Error);
    }

    pub fn run_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Start(difficulty) => self.start_quiz(difficulty),
            MenuAction::Stats => self.open_stats(),
            MenuAction::Profiles => self.open_profiles(),
            MenuAction::Settings => self.go_to_settings(),
            MenuAction::Quit => self.quit(),
        }
    }

    pub fn go_to_menu(&mut self) {
        if self.session.is_active() {
            self.session.stop();
        }
        if let Some(mut chart) = self.chart.take() {
            chart.dispose();
        }
        self.clear_feedback();
        self.profile_form = None;
        self.confirm_reset = false;
        self.screen = AppScreen::Menu;
    }

    // Quiz

    pub fn start_quiz(&mut self, difficulty: Difficulty) {
        match self.session.start(difficulty, self.rng.as_mut()) {
            Ok(_) => {
                self.clear_feedback();
                self.choice_selected = 0;
                self.menu.select_difficulty(difficulty);
                self.screen = AppScreen::Quiz;
            }
            Err(err) => {
                self.report(&err);
                self.screen = AppScreen::Menu;
            }
        }
    }

    /// Submit a choice. Returns `None` outside a quiz, while feedback is
    /// showing, or on error. An answer recorded before a later failure is
    /// still saved.
    pub fn submit_choice(&mut self, index: usize, now: Instant) -> Option<AnswerOutcome> {
        if self.screen != AppScreen::Quiz {
            return None;
        }
        if self.feedback.is_locked(now) {
            debug!(index, "choice rejected while feedback is showing");
            return None;
        }

        let answered = self.session.round().cloned();
        let session = &mut self.session;
        let rng = self.rng.as_mut();
        let result = self
            .profiles
            .update_current(now, |profile| session.submit(index, &mut profile.stats, rng));

        match result {
            Ok(outcome) => {
                let (kind, answer) = match outcome {
                    AnswerOutcome::Correct { answer } => (FeedbackKind::Correct, answer),
                    AnswerOutcome::Incorrect { answer, .. } => (FeedbackKind::Incorrect, answer),
                };
                self.feedback.engage(kind, answer, now);
                self.last_choice = Some(index);
                if outcome.is_correct() {
                    self.answered_round = answered;
                    self.choice_selected = 0;
                }
                Some(outcome)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    pub fn submit_selected(&mut self, now: Instant) -> Option<AnswerOutcome> {
        self.submit_choice(self.choice_selected, now)
    }

    /// Move the selection in the 2x2 answer grid.
    pub fn move_choice(&mut self, horizontal: bool) {
        let step = if horizontal { 1 } else { 2 };
        self.choice_selected = (self.choice_selected ^ step) % CHOICE_COUNT;
    }

    /// Round to draw: the one just answered while its correct banner is up,
    /// otherwise the live round.
    pub fn display_round(&self, now: Instant) -> Option<&Round> {
        match (self.feedback.active(now), &self.answered_round) {
            (Some(f), Some(round)) if f.kind == FeedbackKind::Correct => Some(round),
            _ => self.session.round(),
        }
    }

    pub fn active_feedback(&self, now: Instant) -> Option<Feedback> {
        self.feedback.active(now)
    }

    fn clear_feedback(&mut self) {
        self.feedback.clear();
        self.last_choice = None;
        self.answered_round = None;
    }

    // Timers

    /// Drive deferred work: the debounced profile write, feedback expiry
    /// and chart re-layout.
    pub fn tick(&mut self, now: Instant) {
        self.profiles.tick(now);
        if self.feedback.expire(now) {
            self.last_choice = None;
            self.answered_round = None;
        }
        if let Some(chart) = self.chart.as_mut() {
            chart.poll(now);
        }
    }

    pub fn on_resize(&mut self, width: u16, height: u16, now: Instant) {
        self.viewport = Rect::new(0, 0, width, height);
        let area = self.stats_chart_area();
        if let Some(chart) = self.chart.as_mut() {
            chart.observe_resize(area, now);
        }
    }

    // Layout

    pub fn footer_hints(&self) -> &'static [&'static str] {
        match self.screen {
            AppScreen::Menu => &["[1-4] Start", "[s] Stats", "[p] Profiles", "[c] Settings", "[q] Quit"],
            AppScreen::Quiz => &["[1-4] Answer", "[arrows] Select", "[Enter] Submit", "[Esc] Menu"],
            AppScreen::Stats => &["[1/2/Tab] Category", "[m] Counts/Percent", "[Esc] Back"],
            AppScreen::Profiles => &[
                "[Enter] Play as",
                "[a] Add",
                "[e] Edit",
                "[r] Reset stats",
                "[Esc] Back",
            ],
            AppScreen::ProfileForm => &["[Enter] Save", "[Tab/Shift-Tab] Avatar", "[Esc] Cancel"],
            AppScreen::Settings => &["[arrows] Change", "[Esc] Save & back"],
        }
    }

    pub fn layout(&self) -> AppLayout {
        let lines = pack_hint_lines(self.footer_hints(), self.viewport.width as usize).len();
        AppLayout::new(self.viewport, lines as u16)
    }

    pub fn stats_chart_area(&self) -> Rect {
        StatsDashboard::chart_area(self.layout().main)
    }

    // Stats

    fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            percent: self.config.chart_mode.is_percent(),
        }
    }

    pub fn current_series(&self) -> ChartSeries {
        let snapshot = self.profiles.current().stats.snapshot();
        chart_data::to_series(&snapshot, self.stats_category, self.config.chart_mode)
    }

    pub fn open_stats(&mut self) {
        self.screen = AppScreen::Stats;
        let view = BarChartView::new(self.current_series(), self.chart_options(), self.stats_chart_area());
        if let Some(mut old) = self.chart.replace(view) {
            old.dispose();
        }
    }

    pub fn set_stats_category(&mut self, category: ChartCategory) {
        self.stats_category = category;
        self.refresh_chart();
    }

    pub fn toggle_chart_mode(&mut self) {
        self.config.chart_mode = self.config.chart_mode.toggle();
        self.refresh_chart();
    }

    fn refresh_chart(&mut self) {
        let series = self.current_series();
        let options = self.chart_options();
        if let Some(chart) = self.chart.as_mut() {
            chart.update(series, options);
        }
    }

    // Profiles

    pub fn open_profiles(&mut self) {
        self.profile_selected = 0;
        self.confirm_reset = false;
        self.screen = AppScreen::Profiles;
    }

    pub fn profile_order(&self) -> Vec<usize> {
        self.profiles.display_order()
    }

    pub fn move_profile_selection(&mut self, down: bool) {
        let count = self.profiles.users().len();
        self.confirm_reset = false;
        self.profile_selected = if down {
            (self.profile_selected + 1).min(count.saturating_sub(1))
        } else {
            self.profile_selected.saturating_sub(1)
        };
    }

    fn selected_profile_index(&self) -> Option<usize> {
        self.profile_order().get(self.profile_selected).copied()
    }

    pub fn play_as_selected(&mut self) {
        let Some(index) = self.selected_profile_index() else {
            return;
        };
        match self.profiles.switch_to(index) {
            Ok(()) => {
                let name = self.profiles.current().name.clone();
                self.set_status(format!("Playing as {name}"), StatusKind::Info);
                self.profile_selected = 0;
            }
            Err(err) => self.report(&err),
        }
    }

    pub fn open_add_form(&mut self) {
        self.profile_form = Some(ProfileForm::add());
        self.screen = AppScreen::ProfileForm;
    }

    pub fn open_edit_form(&mut self) {
        let Some(index) = self.selected_profile_index() else {
            return;
        };
        if let Some(user) = self.profiles.users().get(index) {
            self.profile_form = Some(ProfileForm::edit(index, user));
            self.screen = AppScreen::ProfileForm;
        }
    }

    /// Save the open form. Invalid input keeps the form open with the error.
    pub fn submit_profile_form(&mut self) {
        let Some(form) = self.profile_form.as_mut() else {
            return;
        };
        let name = form.name.value().to_string();
        let result = match form.mode {
            FormMode::Add => self.profiles.add_user(&name, form.avatar_id).map(|_| ()),
            FormMode::Edit(index) => self.profiles.edit_user(index, &name, form.avatar_id),
        };
        match result {
            Ok(()) => {
                info!(name = %name.trim(), "profile saved");
                self.profile_form = None;
                self.profile_selected = 0;
                self.screen = AppScreen::Profiles;
            }
            Err(QuizError::Validation(msg)) => {
                debug!(%msg, "profile form rejected");
                form.error = Some(msg);
            }
            Err(err) => {
                self.report(&err);
                self.profile_form = None;
                self.screen = AppScreen::Profiles;
            }
        }
    }

    pub fn cancel_profile_form(&mut self) {
        self.profile_form = None;
        self.screen = AppScreen::Profiles;
    }

    /// First call arms the confirmation, the second resets the current profile.
    pub fn request_reset(&mut self) {
        if !self.confirm_reset {
            self.confirm_reset = true;
            return;
        }
        self.confirm_reset = false;
        match self.profiles.reset_current() {
            Ok(()) => self.set_status("Statistics reset", StatusKind::Info),
            Err(err) => self.report(&err),
        }
    }

    // Settings

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    pub fn settings_fields(&self) -> Vec<(&'static str, String)> {
        let c = &self.config;
        vec![
            ("Theme", c.theme.clone()),
            (
                "Default Level",
                format!("{} ({})", c.default_difficulty.level(), c.default_difficulty.name()),
            ),
            ("Chart Mode", c.chart_mode.as_str().to_string()),
            ("Correct Feedback", format!("{} ms", c.correct_feedback_ms)),
            ("Incorrect Feedback", format!("{} ms", c.incorrect_feedback_ms)),
            ("Save Delay", format!("{} ms", c.save_debounce_ms)),
        ]
    }

    pub fn settings_cycle(&mut self, forward: bool) {
        match self.settings_selected {
            0 => {
                let themes = Theme::available_themes();
                let next = cycle(&themes, &self.config.theme, forward);
                if let Some(theme) = Theme::load(&next) {
                    self.theme = theme;
                    self.config.theme = next;
                }
            }
            1 => {
                let d = self.config.default_difficulty;
                self.config.default_difficulty = if forward { d.next() } else { d.prev() };
                self.menu.select_difficulty(self.config.default_difficulty);
            }
            2 => self.config.chart_mode = self.config.chart_mode.toggle(),
            3 => {
                self.config.correct_feedback_ms =
                    cycle(&CORRECT_DELAYS_MS, &self.config.correct_feedback_ms, forward);
            }
            4 => {
                self.config.incorrect_feedback_ms =
                    cycle(&INCORRECT_DELAYS_MS, &self.config.incorrect_feedback_ms, forward);
            }
            5 => {
                self.config.save_debounce_ms =
                    cycle(&SAVE_DELAYS_MS, &self.config.save_debounce_ms, forward);
            }
            _ => {}
        }
        self.apply_timing();
    }

    fn apply_timing(&mut self) {
        self.feedback
            .set_delays(self.config.correct_feedback(), self.config.incorrect_feedback());
        self.profiles.set_save_debounce(self.config.save_debounce());
    }

    pub fn leave_settings(&mut self) {
        if let Err(err) = self.config.save() {
            warn!(%err, "failed to save config");
            self.set_status(format!("Could not save settings: {err}"), StatusKind::Error);
        }
        self.go_to_menu();
    }

    pub fn header_text(&self) -> String {
        let profile = self.profiles.current();
        let s = profile.stats.snapshot();
        format!(
            " {} | Score {} | Accuracy {}% | Streak {} (best {})",
            profile.name, s.score, s.accuracy, s.streak, s.longest_streak
        )
    }

    /// Flush pending profile changes and stop the loop.
    pub fn quit(&mut self) {
        if let Err(err) = self.profiles.flush() {
            error!(%err, "failed to save profiles on exit");
        }
        self.should_quit = true;
    }

    pub fn feedback_delay(&self, kind: FeedbackKind) -> Duration {
        match kind {
            FeedbackKind::Correct => self.config.correct_feedback(),
            FeedbackKind::Incorrect => self.config.incorrect_feedback(),
        }
    }
}

/// Next (or previous) entry after `current`, wrapping. Unknown values
/// start from the first entry.
fn cycle<T: Clone + PartialEq>(options: &[T], current: &T, forward: bool) -> T {
    let Some(first) = options.first() else {
        return current.clone();
    };
    let len = options.len();
    match options.iter().position(|o| o == current) {
        Some(i) if forward => options[(i + 1) % len].clone(),
        Some(i) => options[(i + len - 1) % len].clone(),
        None => first.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::debounce::{Clock, ManualClock};
    use crate::engine::random::ScriptedSource;
    use crate::engine::ranges::RangeEntry;
    use crate::engine::Operation;
    use tempfile::TempDir;

    fn make_app() -> App {
        App::with_parts(
            Config::default(),
            ProfileStore::in_memory(Duration::from_millis(2000)),
            Box::new(RngSource::seeded(42)),
        )
    }

    fn wrong_index(app: &App) -> usize {
        let correct = app.session.round().unwrap().evaluation.choices.correct_index;
        (correct + 1) % CHOICE_COUNT
    }

    fn right_index(app: &App) -> usize {
        app.session.round().unwrap().evaluation.choices.correct_index
    }

    fn attempts(app: &App) -> u32 {
        app.profiles.current().stats.snapshot().total_attempts
    }

    #[test]
    fn test_start_quiz_enters_quiz_screen() {
        let mut app = make_app();
        app.start_quiz(Difficulty::Hard);
        assert_eq!(app.screen, AppScreen::Quiz);
        assert_eq!(app.session.difficulty(), Some(Difficulty::Hard));
    }

    #[test]
    fn test_input_rejected_during_incorrect_feedback() {
        let clock = ManualClock::new();
        let mut app = make_app();
        app.start_quiz(Difficulty::Easy);

        let wrong = wrong_index(&app);
        let outcome = app.submit_choice(wrong, clock.now()).unwrap();
        assert!(!outcome.is_correct());

        clock.advance(Duration::from_millis(1999));
        assert!(app.submit_choice(right_index(&app), clock.now()).is_none());
        assert_eq!(attempts(&app), 1);

        clock.advance(Duration::from_millis(1));
        let outcome = app.submit_choice(right_index(&app), clock.now()).unwrap();
        assert!(outcome.is_correct());
        assert_eq!(attempts(&app), 2);
    }

    #[test]
    fn test_input_rejected_during_correct_feedback() {
        let clock = ManualClock::new();
        let mut app = make_app();
        app.start_quiz(Difficulty::Easy);

        app.submit_choice(right_index(&app), clock.now()).unwrap();
        clock.advance(Duration::from_millis(700));
        assert!(app.submit_choice(0, clock.now()).is_none());
        clock.advance(Duration::from_millis(50));
        assert!(app.submit_choice(0, clock.now()).is_some());
    }

    #[test]
    fn test_answered_round_shown_until_feedback_expires() {
        let clock = ManualClock::new();
        let mut app = make_app();
        app.start_quiz(Difficulty::Medium);
        let first = app.session.round().unwrap().clone();

        app.submit_choice(right_index(&app), clock.now()).unwrap();
        assert_eq!(app.display_round(clock.now()), Some(&first));
        assert_eq!(app.last_choice, Some(first.evaluation.choices.correct_index));

        clock.advance(Duration::from_millis(750));
        app.tick(clock.now());
        assert!(app.answered_round.is_none());
        assert!(app.last_choice.is_none());
        assert_eq!(app.display_round(clock.now()), app.session.round());
    }

    #[test]
    fn test_out_of_range_choice_reports_error() {
        let clock = ManualClock::new();
        let mut app = make_app();
        app.start_quiz(Difficulty::Easy);
        assert!(app.submit_choice(9, clock.now()).is_none());
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Error);
        assert_eq!(attempts(&app), 0);
    }

    #[test]
    fn test_answer_saved_when_next_question_fails() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let clock = ManualClock::new();
        // Valid first round, then a round whose distractors never resolve.
        let mut app = App::with_parts(
            Config::default(),
            ProfileStore::load(Some(store), Duration::from_millis(2000)),
            Box::new(ScriptedSource::new([0, 3, 4, 1, 2, 3, 3, 2, 1])),
        );
        app.start_quiz(Difficulty::Easy);
        let before = app.session.round().unwrap().clone();

        assert!(app.submit_choice(right_index(&app), clock.now()).is_none());
        assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Error);
        assert_eq!(app.session.round(), Some(&before));
        assert_eq!(attempts(&app), 1);
        assert!(app.profiles.has_pending_write());

        clock.advance(Duration::from_millis(2000));
        app.tick(clock.now());
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let reloaded = ProfileStore::load(Some(store), Duration::from_millis(2000));
        assert_eq!(reloaded.current().stats.snapshot().total_attempts, 1);
    }

    #[test]
    fn test_submit_outside_quiz_is_ignored() {
        let clock = ManualClock::new();
        let mut app = make_app();
        assert!(app.submit_choice(0, clock.now()).is_none());
    }

    #[test]
    fn test_move_choice_in_grid() {
        let mut app = make_app();
        app.move_choice(true);
        assert_eq!(app.choice_selected, 1);
        app.move_choice(false);
        assert_eq!(app.choice_selected, 3);
        app.move_choice(true);
        assert_eq!(app.choice_selected, 2);
        app.move_choice(false);
        assert_eq!(app.choice_selected, 0);
    }

    #[test]
    fn test_bad_range_override_stays_on_menu() {
        let config = Config {
            ranges: Some(vec![RangeEntry {
                level: 1,
                operation: Operation::Add,
                min: 1,
                max: 10,
            }]),
            ..Config::default()
        };
        let mut app = App::with_parts(
            config,
            ProfileStore::in_memory(Duration::from_millis(2000)),
            Box::new(RngSource::seeded(1)),
        );
        app.start_quiz(Difficulty::Medium);
        assert_eq!(app.screen, AppScreen::Menu);
        let status = app.status.unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("configuration error"));
    }

    #[test]
    fn test_stats_chart_lifecycle() {
        let clock = ManualClock::new();
        let mut app = make_app();
        app.open_stats();
        assert_eq!(app.screen, AppScreen::Stats);
        let chart = app.chart.as_ref().unwrap();
        assert_eq!(chart.series()[0].label, "Level 1");

        app.set_stats_category(ChartCategory::Operations);
        assert_eq!(app.chart.as_ref().unwrap().series()[2].label, "(×)");

        app.toggle_chart_mode();
        assert!(app.chart.as_ref().unwrap().options().percent);

        app.on_resize(120, 40, clock.now());
        assert!(app.chart.as_ref().unwrap().has_pending_resize());
        clock.advance(Duration::from_millis(16));
        app.tick(clock.now());
        assert_eq!(app.chart.as_ref().unwrap().layout().area, app.stats_chart_area());

        app.go_to_menu();
        assert!(app.chart.is_none());
    }

    #[test]
    fn test_profile_form_validation_keeps_form_open() {
        let mut app = make_app();
        app.open_profiles();
        app.open_add_form();
        app.submit_profile_form();
        assert_eq!(app.screen, AppScreen::ProfileForm);
        assert!(app.profile_form.as_ref().unwrap().error.is_some());
        assert_eq!(app.profiles.users().len(), 1);
    }

    #[test]
    fn test_add_profile_and_switch_back() {
        let mut app = make_app();
        app.open_profiles();
        app.open_add_form();
        {
            let form = app.profile_form.as_mut().unwrap();
            form.name = crate::ui::line_input::LineInput::new("Ada", 24);
            form.next_avatar();
        }
        app.submit_profile_form();
        assert_eq!(app.screen, AppScreen::Profiles);
        assert_eq!(app.profiles.current().name, "Ada");
        assert_eq!(app.profiles.current().avatar_id, 1);

        app.move_profile_selection(true);
        app.play_as_selected();
        assert_eq!(app.profiles.current().name, "Guest");
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let clock = ManualClock::new();
        let mut app = make_app();
        app.start_quiz(Difficulty::Easy);
        app.submit_choice(right_index(&app), clock.now());
        app.open_profiles();
        app.request_reset();
        assert_eq!(attempts(&app), 1);
        app.request_reset();
        assert_eq!(attempts(&app), 0);
    }

    #[test]
    fn test_settings_cycle_updates_timing() {
        let mut app = make_app();
        app.go_to_settings();
        app.settings_selected = 3;
        app.settings_cycle(true);
        assert_eq!(app.config.correct_feedback_ms, 1000);
        assert_eq!(app.feedback_delay(FeedbackKind::Correct), Duration::from_millis(1000));
        app.settings_selected = 1;
        app.settings_cycle(false);
        assert_eq!(app.config.default_difficulty, Difficulty::Expert);
    }

    #[test]
    fn test_quit_flushes_pending_write() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let clock = ManualClock::new();
        let mut app = App::with_parts(
            Config::default(),
            ProfileStore::load(Some(store), Duration::from_millis(2000)),
            Box::new(RngSource::seeded(3)),
        );
        app.start_quiz(Difficulty::Easy);
        app.submit_choice(right_index(&app), clock.now());
        assert!(app.profiles.has_pending_write());
        app.quit();
        assert!(app.should_quit);

        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let reloaded = ProfileStore::load(Some(store), Duration::from_millis(2000));
        assert_eq!(reloaded.current().stats.streak, 1);
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle(&[1, 2, 3], &3, true), 1);
        assert_eq!(cycle(&[1, 2, 3], &1, false), 3);
        assert_eq!(cycle(&[1, 2, 3], &9, true), 1);
    }
}
