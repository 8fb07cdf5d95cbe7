//! Checklist of series with substring filtering.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use super::text_input::TextInput;
use crate::config::Theme;

#[derive(Default)]
pub struct SeriesSelector {
    cursor: usize,
    pub filter: TextInput,
    pub filtering: bool,
    list_state: ListState,
}

impl SeriesSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Options containing the filter text, case-insensitively, in original order.
    pub fn visible<'a>(&self, options: &'a [String]) -> Vec<&'a str> {
        let needle = self.filter.value().trim().to_lowercase();
        options
            .iter()
            .map(String::as_str)
            .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn current<'a>(&self, options: &'a [String]) -> Option<&'a str> {
        self.visible(options).get(self.cursor).copied()
    }

    pub fn move_cursor(&mut self, delta: isize, options: &[String]) {
        let len = self.visible(options).len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    /// Keep the cursor inside the visible list after the filter or options change.
    pub fn clamp(&mut self, options: &[String]) {
        self.move_cursor(0, options);
    }

    pub fn start_filter(&mut self) {
        self.filtering = true;
        self.filter.set_focused(true);
    }

    pub fn finish_filter(&mut self, keep: bool) {
        self.filtering = false;
        self.filter.set_focused(false);
        if !keep {
            self.filter.clear();
        }
        self.cursor = 0;
    }

    pub fn render(
        &mut self,
        area: Rect,
        buf: &mut Buffer,
        options: &[String],
        is_selected: impl Fn(&str) -> bool,
        focused: bool,
        theme: &Theme,
    ) {
        let border = if focused {
            theme.get("panel_border_focused")
        } else {
            theme.get("panel_border")
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Series ");
        let inner = block.inner(area);
        block.render(area, buf);

        let show_filter = self.filtering || !self.filter.is_empty();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(if show_filter {
                vec![Constraint::Length(1), Constraint::Fill(1)]
            } else {
                vec![Constraint::Length(0), Constraint::Fill(1)]
            })
            .split(inner);

        if show_filter {
            let parts = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(2), Constraint::Fill(1)])
                .split(chunks[0]);
            Paragraph::new("/")
                .style(Style::default().fg(theme.get("secondary")))
                .render(parts[0], buf);
            (&self.filter).render(parts[1], buf);
        }

        let visible = self.visible(options);
        if options.is_empty() {
            Paragraph::new("No series")
                .style(Style::default().fg(theme.get("text_secondary")))
                .render(chunks[1], buf);
            return;
        }

        let checked = Style::default().fg(theme.get("selector_checked"));
        let items: Vec<ListItem> = visible
            .iter()
            .map(|name| {
                let mark = if is_selected(name) {
                    Span::styled("[x] ", checked)
                } else {
                    Span::raw("[ ] ")
                };
                ListItem::new(Line::from(vec![mark, Span::raw(name.to_string())]))
            })
            .collect();

        self.list_state
            .select(if focused && !visible.is_empty() {
                Some(self.cursor.min(visible.len() - 1))
            } else {
                None
            });
        let list = List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        StatefulWidget::render(list, chunks[1], buf, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn options() -> Vec<String> {
        ["LCOW", "Total cost", "Brine volume"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn cursor_is_clamped() {
        let opts = options();
        let mut s = SeriesSelector::new();
        s.move_cursor(10, &opts);
        assert_eq!(s.cursor(), 2);
        s.move_cursor(-10, &opts);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.current(&opts), Some("LCOW"));
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let opts = options();
        let mut s = SeriesSelector::new();
        s.start_filter();
        for c in "CO".chars() {
            s.filter
                .handle_key(&KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        assert_eq!(s.visible(&opts), vec!["LCOW", "Total cost"]);
        s.finish_filter(false);
        assert_eq!(s.visible(&opts).len(), 3);
    }
}
