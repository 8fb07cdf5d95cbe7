use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

use super::text_input::TextInput;
use crate::config::Theme;
use crate::presets::PresetStore;

/// Preset bar state: which entry is highlighted and the name prompt for saving.
#[derive(Default)]
pub struct PresetList {
    cursor: usize,
    pub name_input: TextInput,
    pub naming: bool,
    list_state: ListState,
}

impl PresetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    /// Name of the highlighted preset.
    pub fn current<'a>(&self, store: &'a PresetStore) -> Option<&'a str> {
        store.presets().get(self.cursor).map(|p| p.name.as_str())
    }

    pub fn start_naming(&mut self) {
        self.naming = true;
        self.name_input.clear();
        self.name_input.set_focused(true);
    }

    pub fn stop_naming(&mut self) {
        self.naming = false;
        self.name_input.set_focused(false);
        self.name_input.clear();
    }

    pub fn render(
        &mut self,
        area: Rect,
        buf: &mut Buffer,
        store: &PresetStore,
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
            .title(" Layouts ");
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(if self.naming { 1 } else { 0 }), Constraint::Fill(1)])
            .split(inner);

        if self.naming {
            let parts = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(6), Constraint::Fill(1)])
                .split(chunks[0]);
            Paragraph::new("Name:")
                .style(Style::default().fg(theme.get("secondary")))
                .render(parts[0], buf);
            (&self.name_input).render(parts[1], buf);
        }

        if store.is_empty() {
            Paragraph::new("No saved layouts (s to save)")
                .style(Style::default().fg(theme.get("text_secondary")))
                .render(chunks[1], buf);
            return;
        }

        let active = store.active_name();
        let dim = Style::default().fg(theme.get("text_secondary"));
        let items: Vec<ListItem> = store
            .presets()
            .iter()
            .map(|p| {
                let marker = if Some(p.name.as_str()) == active {
                    Span::styled("● ", Style::default().fg(theme.get("success")))
                } else {
                    Span::raw("  ")
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::raw(p.name.clone()),
                    Span::styled(format!("  {}", p.created_label()), dim),
                ]))
            })
            .collect();

        self.list_state.select(if focused {
            Some(self.cursor.min(store.len() - 1))
        } else {
            None
        });
        let list =
            List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        StatefulWidget::render(list, chunks[1], buf, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PanelPlacement;

    #[test]
    fn current_follows_cursor() {
        let mut store = PresetStore::new();
        store.save("one", &[PanelPlacement::new("a", 0, 0, 4, 4)]);
        store.save("two", &[]);
        let mut list = PresetList::new();
        assert_eq!(list.current(&store), Some("one"));
        list.move_cursor(5, store.len());
        assert_eq!(list.current(&store), Some("two"));
        list.move_cursor(-1, store.len());
        assert_eq!(list.cursor(), 0);
    }

    #[test]
    fn naming_resets_input() {
        let mut list = PresetList::new();
        list.name_input.set_value("old");
        list.start_naming();
        assert!(list.naming);
        assert!(list.name_input.is_empty());
        list.stop_naming();
        assert!(!list.naming);
    }
}
