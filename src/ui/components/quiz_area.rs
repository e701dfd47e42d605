use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::answer::CHOICE_COUNT;
use crate::session::feedback::{Feedback, FeedbackKind};
use crate::session::quiz::Round;
use crate::ui::theme::Theme;

/// Question, the four answer buttons in a 2x2 grid and the feedback banner.
pub struct QuizArea<'a> {
    pub round: &'a Round,
    pub selected: usize,
    /// Choice picked in the last answer, while its feedback is showing.
    pub chosen: Option<usize>,
    pub feedback: Option<Feedback>,
    pub theme: &'a Theme,
}

impl<'a> QuizArea<'a> {
    pub fn new(round: &'a Round, selected: usize, theme: &'a Theme) -> Self {
        Self {
            round,
            selected,
            chosen: None,
            feedback: None,
            theme,
        }
    }

    pub fn feedback(mut self, feedback: Option<Feedback>, chosen: Option<usize>) -> Self {
        self.feedback = feedback;
        self.chosen = chosen;
        self
    }

    fn banner(&self) -> Option<(String, Style)> {
        let colors = &self.theme.colors;
        let feedback = self.feedback?;
        Some(match feedback.kind {
            FeedbackKind::Correct => (
                format!("Correct! {} = {}", self.round.question.display_text, feedback.answer),
                Style::default().fg(colors.success()).add_modifier(Modifier::BOLD),
            ),
            FeedbackKind::Incorrect => (
                format!("Not quite. The answer is {}.", feedback.answer),
                Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
            ),
        })
    }

    fn choice_style(&self, idx: usize) -> Style {
        let colors = &self.theme.colors;
        let base = Style::default().fg(colors.choice_fg()).bg(colors.choice_bg());
        match self.feedback.map(|f| f.kind) {
            Some(FeedbackKind::Correct) if self.chosen == Some(idx) => {
                base.fg(colors.bg()).bg(colors.success())
            }
            Some(FeedbackKind::Incorrect) if self.chosen == Some(idx) => {
                base.fg(colors.bg()).bg(colors.error())
            }
            Some(FeedbackKind::Incorrect) if self.round.evaluation.choices.is_correct(idx) => {
                base.fg(colors.bg()).bg(colors.success())
            }
            _ if idx == self.selected => base
                .fg(colors.bg())
                .bg(colors.accent())
                .add_modifier(Modifier::BOLD),
            _ => base,
        }
    }
}

impl Widget for QuizArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(
                " Level {} ({}) ",
                self.round.difficulty.level(),
                self.round.difficulty.name()
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(8),
                Constraint::Min(0),
            ])
            .split(inner);

        let question = Paragraph::new(Line::from(Span::styled(
            format!("{} = ?", self.round.question.display_text),
            Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        question.render(vertical_center(layout[1], 1), buf);

        if let Some((text, style)) = self.banner() {
            Paragraph::new(Line::from(Span::styled(text, style)))
                .alignment(Alignment::Center)
                .render(layout[2], buf);
        }

        let grid_width = layout[3].width.min(48);
        let grid = Rect::new(
            layout[3].x + (layout[3].width - grid_width) / 2,
            layout[3].y,
            grid_width,
            layout[3].height,
        );
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(4)])
            .split(grid);

        for (idx, value) in self.round.choices().iter().enumerate().take(CHOICE_COUNT) {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(rows[idx / 2]);
            let cell = cols[idx % 2];
            let style = self.choice_style(idx);
            let button = Paragraph::new(Line::from(vec![
                Span::styled(format!("[{}] ", idx + 1), style.add_modifier(Modifier::DIM)),
                Span::styled(value.to_string(), style),
            ]))
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::bordered().border_style(Style::default().fg(colors.border())));
            button.render(cell, buf);
        }
    }
}

fn vertical_center(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect::new(area.x, area.y + (area.height - height) / 2, area.width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Difficulty;
    use crate::engine::random::RngSource;
    use crate::engine::ranges::RangeTable;
    use crate::session::quiz::QuizSession;
    use std::time::Instant;

    fn screen_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.bottom())
            .map(|y| {
                (area.x..area.right())
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn round() -> Round {
        let mut session = QuizSession::new(RangeTable::default());
        let mut rng = RngSource::seeded(7);
        session.start(Difficulty::Medium, &mut rng).unwrap().clone()
    }

    #[test]
    fn test_renders_question_and_choices() {
        let theme = Theme::default();
        let round = round();
        let area = Rect::new(0, 0, 60, 18);
        let mut buf = Buffer::empty(area);
        QuizArea::new(&round, 0, &theme).render(area, &mut buf);

        let text = screen_text(&buf);
        assert!(text.contains(&format!("{} = ?", round.question.display_text)));
        for (i, v) in round.choices().iter().enumerate() {
            assert!(text.contains(&format!("[{}] {v}", i + 1)));
        }
        assert!(text.contains("Level 2 (Medium)"));
    }

    #[test]
    fn test_incorrect_banner_shows_answer() {
        let theme = Theme::default();
        let round = round();
        let feedback = Feedback {
            kind: FeedbackKind::Incorrect,
            answer: round.evaluation.correct_answer,
            until: Instant::now(),
        };
        let area = Rect::new(0, 0, 60, 18);
        let mut buf = Buffer::empty(area);
        QuizArea::new(&round, 0, &theme)
            .feedback(Some(feedback), Some(0))
            .render(area, &mut buf);
        let expected = format!("Not quite. The answer is {}.", round.evaluation.correct_answer);
        assert!(screen_text(&buf).contains(&expected));
    }
}
