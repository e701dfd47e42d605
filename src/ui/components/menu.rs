use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::Difficulty;
use crate::engine::difficulty::ALL_DIFFICULTIES;
use crate::engine::ranges::RangeTable;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Start(Difficulty),
    Stats,
    Profiles,
    Settings,
    Quit,
}

pub struct MenuItem {
    pub key: char,
    pub label: String,
    pub description: String,
    pub action: MenuAction,
}

pub struct Menu {
    pub items: Vec<MenuItem>,
    pub selected: usize,
}

impl Menu {
    pub fn new(table: &RangeTable) -> Self {
        let mut items: Vec<MenuItem> = ALL_DIFFICULTIES
            .iter()
            .map(|&d| {
                let description = match table.operations(d) {
                    Ok(ops) => {
                        let glyphs: Vec<&str> = ops.iter().map(|op| op.glyph()).collect();
                        format!("Operations: {}", glyphs.join(" "))
                    }
                    Err(_) => "Not configured".to_string(),
                };
                MenuItem {
                    key: char::from(b'0' + d.level()),
                    label: format!("Level {} ({})", d.level(), d.name()),
                    description,
                    action: MenuAction::Start(d),
                }
            })
            .collect();

        items.extend([
            MenuItem {
                key: 's',
                label: "Statistics".to_string(),
                description: "Accuracy, streaks and charts".to_string(),
                action: MenuAction::Stats,
            },
            MenuItem {
                key: 'p',
                label: "Profiles".to_string(),
                description: "Switch, add or edit players".to_string(),
                action: MenuAction::Profiles,
            },
            MenuItem {
                key: 'c',
                label: "Settings".to_string(),
                description: "Theme, default level, chart mode".to_string(),
                action: MenuAction::Settings,
            },
            MenuItem {
                key: 'q',
                label: "Quit".to_string(),
                description: String::new(),
                action: MenuAction::Quit,
            },
        ]);

        Self { items, selected: 0 }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        self.items.get(self.selected).map(|item| item.action)
    }

    pub fn action_for_key(&self, key: char) -> Option<MenuAction> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.action)
    }

    /// Move the cursor onto the entry for `difficulty`.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        if let Some(idx) = self
            .items
            .iter()
            .position(|item| item.action == MenuAction::Start(difficulty))
        {
            self.selected = idx;
        }
    }

    pub fn widget<'a>(&'a self, theme: &'a Theme) -> MenuWidget<'a> {
        MenuWidget { menu: self, theme }
    }
}

pub struct MenuWidget<'a> {
    menu: &'a Menu,
    theme: &'a Theme,
}

impl Widget for MenuWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "mathfc",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Arithmetic Flash Cards",
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.menu
                    .items
                    .iter()
                    .map(|item| Constraint::Length(if item.description.is_empty() { 1 } else { 2 }))
                    .collect::<Vec<_>>(),
            )
            .split(layout[1]);

        for (i, item) in self.menu.items.iter().enumerate() {
            let Some(&row) = menu_layout.get(i) else {
                break;
            };
            let is_selected = i == self.menu.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let mut lines = vec![Line::from(Span::styled(
                format!(" {indicator} [{}] {}", item.key, item.label),
                label_style,
            ))];
            if !item.description.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("       {}", item.description),
                    Style::default().fg(colors.text_dim()),
                )));
            }
            Paragraph::new(lines).render(row, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Operation;
    use crate::engine::ranges::OperandRange;

    #[test]
    fn test_menu_lists_levels_then_screens() {
        let menu = Menu::new(&RangeTable::default());
        assert_eq!(menu.items.len(), 8);
        assert_eq!(menu.items[0].label, "Level 1 (Easy)");
        assert_eq!(menu.items[0].description, "Operations: +");
        assert_eq!(menu.items[3].description, "Operations: + - × ÷");
    }

    #[test]
    fn test_action_for_key() {
        let menu = Menu::new(&RangeTable::default());
        assert_eq!(menu.action_for_key('3'), Some(MenuAction::Start(Difficulty::Hard)));
        assert_eq!(menu.action_for_key('s'), Some(MenuAction::Stats));
        assert_eq!(menu.action_for_key('x'), None);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut menu = Menu::new(&RangeTable::default());
        menu.prev();
        assert_eq!(menu.selected_action(), Some(MenuAction::Quit));
        menu.next();
        assert_eq!(menu.selected_action(), Some(MenuAction::Start(Difficulty::Easy)));
        menu.select_difficulty(Difficulty::Expert);
        assert_eq!(menu.selected, 3);
    }

    #[test]
    fn test_unconfigured_level_is_marked() {
        let mut table = RangeTable::empty();
        table
            .insert(Difficulty::Easy, Operation::Multiply, OperandRange::new(2, 12))
            .unwrap();
        let menu = Menu::new(&table);
        assert_eq!(menu.items[0].description, "Operations: ×");
        assert_eq!(menu.items[1].description, "Not configured");
    }
}
