use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::chart_data::{ChartCategory, ChartMode};
use crate::engine::stats::StatsSnapshot;
use crate::ui::components::bar_chart::{BarChartView, ChartLayout};
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::theme::Theme;

const SUMMARY_HEIGHT: u16 = 5;
const TABS_HEIGHT: u16 = 1;

pub struct StatsDashboard<'a> {
    pub player: &'a str,
    pub snapshot: &'a StatsSnapshot,
    pub category: ChartCategory,
    pub mode: ChartMode,
    pub chart: &'a BarChartView,
    pub theme: &'a Theme,
}

struct Sections {
    summary: Rect,
    tabs: Rect,
    chart_block: Rect,
}

fn outer_block(player: &str) -> Block<'static> {
    Block::bordered().title(format!(" Statistics: {player} "))
}

fn chart_block(title: String) -> Block<'static> {
    Block::bordered().title(title)
}

fn sections(area: Rect) -> Sections {
    let inner = outer_block("").inner(area);
    let chart_height = ChartLayout::required_height() + 2;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(SUMMARY_HEIGHT),
            Constraint::Length(TABS_HEIGHT),
            Constraint::Length(chart_height),
            Constraint::Min(0),
        ])
        .split(inner);
    Sections {
        summary: layout[0],
        tabs: layout[1],
        chart_block: layout[2],
    }
}

impl StatsDashboard<'_> {
    /// Area the bar chart is drawn into when the dashboard fills `area`.
    pub fn chart_area(area: Rect) -> Rect {
        chart_block(String::new()).inner(sections(area).chart_block)
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let s = self.snapshot;

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let label = Style::default().fg(colors.text_dim());
        let value = Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD);
        let row = |name: &'static str, n: u32| {
            Line::from(vec![
                Span::styled(format!("  {name:<11}"), label),
                Span::styled(n.to_string(), value),
            ])
        };
        let mut lines = vec![
            row("Answered", s.total_attempts),
            row("Correct", s.total_correct),
            row("Incorrect", s.total_incorrect),
            row("Score", s.score),
        ];
        if s.total_attempts == 0 {
            lines.push(Line::from(Span::styled(
                "  No answers yet. Start a quiz!",
                Style::default().fg(colors.warning()),
            )));
        }
        Paragraph::new(lines).render(columns[0], buf);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(0)])
            .split(columns[1]);
        ProgressBar::new("Accuracy", s.accuracy as f64 / 100.0, self.theme)
            .caption(format!("{}% ({}/{})", s.accuracy, s.total_correct, s.total_attempts))
            .render(right[0], buf);
        Paragraph::new(Line::from(vec![
            Span::styled(" Streak ", label),
            Span::styled(s.streak.to_string(), value.fg(colors.accent())),
            Span::styled("   Best ", label),
            Span::styled(s.longest_streak.to_string(), value.fg(colors.success())),
        ]))
        .render(right[1], buf);
    }

    fn render_tabs(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let tabs = [
            (ChartCategory::Levels, "[1] By Level"),
            (ChartCategory::Operations, "[2] By Operation"),
        ];
        let mut spans: Vec<Span> = tabs
            .iter()
            .flat_map(|&(category, text)| {
                let style = if category == self.category {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(colors.accent_dim())
                };
                [Span::styled(format!(" {text} "), style), Span::raw("  ")]
            })
            .collect();
        spans.push(Span::styled(
            format!("[m] Mode: {}", self.mode.as_str()),
            Style::default().fg(colors.text_dim()),
        ));
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

impl Widget for StatsDashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = outer_block(self.player)
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        block.render(area, buf);

        let sections = sections(area);
        self.render_summary(sections.summary, buf);
        self.render_tabs(sections.tabs, buf);

        let unit = if self.mode.is_percent() {
            "accuracy %"
        } else {
            "correct answers"
        };
        let chart_block = chart_block(format!(" {} ({unit}) ", self.category.title()))
            .border_style(Style::default().fg(colors.border()));
        let chart_area = chart_block.inner(sections.chart_block);
        chart_block.render(sections.chart_block, buf);
        self.chart.widget(self.theme).render(chart_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::chart_data::to_series;
    use crate::engine::stats::PlayerStats;
    use crate::engine::{Difficulty, Operation};
    use crate::ui::components::bar_chart::ChartOptions;

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

    #[test]
    fn test_chart_area_fits_reserved_rows() {
        let area = Rect::new(0, 0, 80, 24);
        let chart = StatsDashboard::chart_area(area);
        assert_eq!(chart.height, ChartLayout::required_height());
        assert_eq!(chart.width, 76);
    }

    #[test]
    fn test_renders_summary_and_operation_labels() {
        let mut stats = PlayerStats::default();
        stats.record(true, Operation::Multiply, Difficulty::Hard).unwrap();
        stats.record(false, Operation::Add, Difficulty::Hard).unwrap();
        let snapshot = stats.snapshot();

        let area = Rect::new(0, 0, 80, 24);
        let series = to_series(&snapshot, ChartCategory::Operations, ChartMode::Counts);
        let chart = BarChartView::new(series, ChartOptions::default(), StatsDashboard::chart_area(area));
        let theme = Theme::default();
        let mut buf = Buffer::empty(area);
        StatsDashboard {
            player: "Ada",
            snapshot: &snapshot,
            category: ChartCategory::Operations,
            mode: ChartMode::Counts,
            chart: &chart,
            theme: &theme,
        }
        .render(area, &mut buf);

        let text = screen_text(&buf);
        let tabs_row = sections(area).tabs.y;
        let row: String = (0..area.width)
            .map(|x| buf[(x, tabs_row)].symbol().to_string())
            .collect();
        let byte = row.find("[1] By Level").unwrap();
        let col = row[..byte].chars().count() as u16;
        assert_eq!(buf[(col, tabs_row)].fg, theme.colors.accent_dim());

        assert!(text.contains("Statistics: Ada"));
        assert!(text.contains("50% (1/2)"));
        assert!(text.contains("(×)"));
        assert!(text.contains("By Operation (correct answers)"));
    }
}
