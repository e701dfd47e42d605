use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mathfc::app::{App, AppScreen, SETTINGS_COUNT, StatusKind};
use mathfc::config::Config;
use mathfc::engine::Difficulty;
use mathfc::engine::debounce::{Clock, SystemClock};
use mathfc::engine::chart_data::ChartCategory;
use mathfc::event::{AppEvent, EventHandler};
use mathfc::store::json_store::{self, JsonStore};
use mathfc::ui;
use mathfc::ui::components::profile_list::ProfileList;
use mathfc::ui::components::quiz_area::QuizArea;
use mathfc::ui::components::stats_dashboard::StatsDashboard;
use mathfc::ui::layout::pack_hint_lines;
use mathfc::ui::line_input::InputResult;

#[derive(Parser)]
#[command(name = "mathfc", version, about = "Terminal arithmetic quiz with streak tracking")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4), help = "Start a quiz at this level (1-4)")]
    difficulty: Option<u8>,

    #[arg(long, help = "Directory for saved profiles and the log file")]
    data_dir: Option<PathBuf>,
}

fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("mathfc.log"))?;
    let filter = EnvFilter::try_from_env("MATHFC_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(json_store::default_data_dir);
    if let Err(err) = init_logging(&data_dir) {
        eprintln!("mathfc: logging disabled: {err}");
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        warn!(%err, "could not load config, using defaults");
        Config::default()
    });
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }

    let store = match JsonStore::with_base_dir(data_dir) {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(%err, "profile store unavailable, progress will not be saved");
            None
        }
    };

    let mut app = App::new(config, store);
    if let Some(level) = cli.difficulty.and_then(Difficulty::from_level) {
        app.start_quiz(level);
    }
    info!("mathfc started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.on_resize(size.width, size.height, SystemClock.now());

    let events = EventHandler::new(Duration::from_millis(50));

    let result = run_app(&mut terminal, &mut app, &events);
    if !app.should_quit {
        app.quit();
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(SystemClock.now()),
            AppEvent::Resize(w, h) => app.on_resize(w, h, SystemClock.now()),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    app.status = None;
    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Stats => handle_stats_key(app, key),
        AppScreen::Profiles => handle_profiles_key(app, key),
        AppScreen::ProfileForm => handle_form_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(action) = app.menu.selected_action() {
                app.run_menu_action(action);
            }
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                app.run_menu_action(action);
            }
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    let now = SystemClock.now();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char(ch @ '1'..='4') => {
            let index = ch as usize - '1' as usize;
            app.choice_selected = index;
            app.submit_choice(index, now);
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
            app.move_choice(true)
        }
        KeyCode::Up | KeyCode::Down | KeyCode::Char('k') | KeyCode::Char('j') => {
            app.move_choice(false)
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.submit_selected(now);
        }
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('1') => app.set_stats_category(ChartCategory::Levels),
        KeyCode::Char('2') => app.set_stats_category(ChartCategory::Operations),
        KeyCode::Tab | KeyCode::BackTab => {
            let next = app.stats_category.toggle();
            app.set_stats_category(next);
        }
        KeyCode::Char('m') => app.toggle_chart_mode(),
        _ => {}
    }
}

fn handle_profiles_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => app.move_profile_selection(false),
        KeyCode::Down | KeyCode::Char('j') => app.move_profile_selection(true),
        KeyCode::Enter => app.play_as_selected(),
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char('r') => app.request_reset(),
        _ => {}
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
    let Some(form) = app.profile_form.as_mut() else {
        app.screen = AppScreen::Profiles;
        return;
    };
    let result = match key.code {
        KeyCode::Tab => {
            form.next_avatar();
            return;
        }
        KeyCode::BackTab => {
            form.prev_avatar();
            return;
        }
        _ => form.name.handle(key),
    };
    match result {
        InputResult::Submit => app.submit_profile_form(),
        InputResult::Cancel => app.cancel_profile_form(),
        InputResult::Continue => {
            if let Some(form) = app.profile_form.as_mut() {
                form.error = None;
            }
        }
        InputResult::Ignored => {}
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.leave_settings(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < SETTINGS_COUNT {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle(false),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = app.layout();
    render_header(frame, app, layout.header);
    match app.screen {
        AppScreen::Menu => render_menu(frame, app, layout.main),
        AppScreen::Quiz => render_quiz(frame, app, layout.main),
        AppScreen::Stats => render_stats(frame, app, layout.main),
        AppScreen::Profiles => render_profiles(frame, app, layout.main),
        AppScreen::ProfileForm => {
            render_profiles(frame, app, layout.main);
            render_profile_form(frame, app, layout.main);
        }
        AppScreen::Settings => render_settings(frame, app, layout.main),
    }
    render_footer(frame, app, layout.footer);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let header_info = app.header_text();
    let mut spans = vec![
        Span::styled(
            " mathfc ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default().fg(colors.text_dim()).bg(colors.header_bg()),
        ),
    ];
    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => colors.success(),
            StatusKind::Error => colors.error(),
        };
        spans.push(Span::styled(
            format!("  {}", status.text),
            Style::default().fg(color).bg(colors.header_bg()),
        ));
    }
    let header = Paragraph::new(Line::from(spans))
        .block(Block::bordered().border_style(Style::default().fg(colors.border())))
        .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let lines: Vec<Line> = pack_hint_lines(app.footer_hints(), area.width as usize)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.text_dim()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let menu_area = ui::layout::centered_rect(50, 80, area);
    frame.render_widget(app.menu.widget(&app.theme), menu_area);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let now = SystemClock.now();
    if let Some(round) = app.display_round(now) {
        let quiz = QuizArea::new(round, app.choice_selected, &app.theme)
            .feedback(app.active_feedback(now), app.last_choice);
        frame.render_widget(quiz, area);
    }
}

fn render_stats(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let Some(chart) = app.chart.as_ref() else {
        return;
    };
    let profile = app.profiles.current();
    let snapshot = profile.stats.snapshot();
    let dashboard = StatsDashboard {
        player: &profile.name,
        snapshot: &snapshot,
        category: app.stats_category,
        mode: app.config.chart_mode,
        chart,
        theme: &app.theme,
    };
    frame.render_widget(dashboard, area);
}

fn render_profiles(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let order = app.profile_order();
    let list = ProfileList {
        users: app.profiles.users(),
        order: &order,
        current: app.profiles.current_index(),
        selected: app.profile_selected,
        theme: &app.theme,
    };
    frame.render_widget(list, area);

    if app.confirm_reset {
        let colors = &app.theme.colors;
        let dialog = ui::layout::centered_rect(50, 30, area);
        let block = Block::bordered()
            .title(" Reset statistics ")
            .border_style(Style::default().fg(colors.error()))
            .style(Style::default().bg(colors.bg()));
        let text = Paragraph::new(Line::from(Span::styled(
            format!(
                "  Reset all statistics for {}? Press [r] again to confirm.",
                app.profiles.current().name
            ),
            Style::default().fg(colors.fg()),
        )))
        .block(block);
        frame.render_widget(ratatui::widgets::Clear, dialog);
        frame.render_widget(text, dialog);
    }
}

fn render_profile_form(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    if let Some(form) = &app.profile_form {
        let dialog = ui::layout::centered_rect(60, 50, area);
        frame.render_widget(form.widget(&app.theme), dialog);
    }
}

fn render_settings(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let centered = ui::layout::centered_rect(60, 90, area);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let fields = app.settings_fields();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(fields.len() as u16 * 2),
            Constraint::Min(0),
        ])
        .split(inner);

    Paragraph::new(Line::from(Span::styled(
        "  Up/Down to choose, Left/Right to change, Esc to save",
        Style::default().fg(colors.text_dim()),
    )))
    .render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(fields.iter().map(|_| Constraint::Length(2)).collect::<Vec<_>>())
        .split(layout[1]);

    for (i, (label, value)) in fields.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };
        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.accent()
        } else {
            colors.text_dim()
        });

        Paragraph::new(Line::from(vec![
            Span::styled(format!("{indicator}{label:<20}"), label_style),
            Span::styled(format!("< {value} >"), value_style),
        ]))
        .render(field_layout[i], frame.buffer_mut());
    }
}
