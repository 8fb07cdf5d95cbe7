use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::config::Theme;

const SECTIONS: [(&str, &[(&str, &str)]); 4] = [
    (
        "General",
        &[("Tab", "next area"), ("?", "toggle help"), ("q", "quit")],
    ),
    (
        "Series",
        &[
            ("↑/↓", "move"),
            ("Space", "show or hide series"),
            ("/", "filter (Enter keeps, Esc clears)"),
        ],
    ),
    (
        "Grid",
        &[
            ("←↑↓→ / hjkl", "focus panel"),
            ("HJKL", "move panel"),
            ("+ / -", "taller / shorter"),
            ("> / <", "wider / narrower"),
            ("x", "remove panel"),
            ("e", "export panel to PNG"),
        ],
    ),
    (
        "Layouts",
        &[
            ("s", "save current layout"),
            ("↑/↓", "choose"),
            ("Enter", "apply"),
            ("d", "delete"),
        ],
    ),
];

/// Centered overlay listing every key binding.
pub struct Help<'a> {
    pub theme: &'a Theme,
}

impl Widget for Help<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key_style = Style::default().fg(self.theme.get("secondary")).bold();
        let mut lines = Vec::new();
        for (title, keys) in SECTIONS {
            lines.push(Line::from(Span::styled(
                title,
                Style::default().fg(self.theme.get("primary")).bold(),
            )));
            for (key, action) in keys {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<14}", key), key_style),
                    Span::raw(*action),
                ]));
            }
            lines.push(Line::default());
        }

        let height = (lines.len() as u16 + 2).min(area.height);
        let width = 52u16.min(area.width);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };
        Clear.render(popup, buf);
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.get("primary")))
                    .title(" Help "),
            )
            .wrap(Wrap { trim: false })
            .render(popup, buf);
    }
}
