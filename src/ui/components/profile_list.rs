use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::store::schema::{AVATAR_COUNT, MAX_NAME_LEN, UserProfile, avatar_glyph};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Saved profiles, current one first.
pub struct ProfileList<'a> {
    pub users: &'a [UserProfile],
    /// Indices into `users` in display order.
    pub order: &'a [usize],
    pub current: usize,
    /// Position within `order`.
    pub selected: usize,
    pub theme: &'a Theme,
}

impl Widget for ProfileList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Profiles ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::with_capacity(self.order.len());
        for (pos, &idx) in self.order.iter().enumerate() {
            let Some(user) = self.users.get(idx) else {
                continue;
            };
            let is_selected = pos == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let snapshot = user.stats.snapshot();
            let name_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let mut spans = vec![
                Span::styled(format!(" {indicator} {} ", avatar_glyph(user.avatar_id)), name_style),
                Span::styled(format!("{:<width$}", user.name, width = MAX_NAME_LEN), name_style),
                Span::styled(
                    format!(
                        "  {} answered, {}% correct, best streak {}",
                        snapshot.total_attempts, snapshot.accuracy, snapshot.longest_streak
                    ),
                    Style::default().fg(colors.text_dim()),
                ),
            ];
            if idx == self.current {
                spans.push(Span::styled(
                    "  (playing)",
                    Style::default().fg(colors.success()),
                ));
            }
            lines.push(Line::from(spans));
        }
        Paragraph::new(lines).render(inner, buf);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(usize),
}

/// Name and avatar form for adding or editing a profile.
pub struct ProfileForm {
    pub mode: FormMode,
    pub name: LineInput,
    pub avatar_id: u32,
    pub error: Option<String>,
}

impl ProfileForm {
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            name: LineInput::new("", MAX_NAME_LEN),
            avatar_id: 0,
            error: None,
        }
    }

    pub fn edit(index: usize, user: &UserProfile) -> Self {
        Self {
            mode: FormMode::Edit(index),
            name: LineInput::new(&user.name, MAX_NAME_LEN),
            avatar_id: user.avatar_id.min(AVATAR_COUNT - 1),
            error: None,
        }
    }

    pub fn next_avatar(&mut self) {
        self.avatar_id = (self.avatar_id + 1) % AVATAR_COUNT;
    }

    pub fn prev_avatar(&mut self) {
        self.avatar_id = (self.avatar_id + AVATAR_COUNT - 1) % AVATAR_COUNT;
    }

    pub fn widget<'a>(&'a self, theme: &'a Theme) -> ProfileFormWidget<'a> {
        ProfileFormWidget { form: self, theme }
    }
}

pub struct ProfileFormWidget<'a> {
    form: &'a ProfileForm,
    theme: &'a Theme,
}

impl Widget for ProfileFormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = match self.form.mode {
            FormMode::Add => " New Profile ",
            FormMode::Edit(_) => " Edit Profile ",
        };

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let label = Style::default().fg(colors.text_dim());
        let (before, cursor, after) = self.form.name.render_parts();
        let cursor_text = cursor.map(String::from).unwrap_or_else(|| " ".to_string());
        Paragraph::new(Line::from(vec![
            Span::styled("  Name:   ", label),
            Span::styled(before, Style::default().fg(colors.fg())),
            Span::styled(
                cursor_text,
                Style::default().fg(colors.bg()).bg(colors.accent()),
            ),
            Span::styled(after, Style::default().fg(colors.fg())),
        ]))
        .render(layout[0], buf);

        let avatars: Vec<Span> = (0..AVATAR_COUNT)
            .map(|id| {
                let style = if id == self.form.avatar_id {
                    Style::default()
                        .fg(colors.bg())
                        .bg(colors.accent())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Span::styled(format!(" {} ", avatar_glyph(id)), style)
            })
            .collect();
        let mut avatar_line = vec![Span::styled("  Avatar: ", label)];
        avatar_line.extend(avatars);
        Paragraph::new(Line::from(avatar_line)).render(layout[2], buf);

        if let Some(error) = &self.form.error {
            Paragraph::new(Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(colors.error()),
            )))
            .render(layout[4], buf);
        }
    }
}
