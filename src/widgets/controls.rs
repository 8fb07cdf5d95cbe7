use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

/// Key hints for the focused area, plus an optional status on the right.
#[derive(Default)]
pub struct Controls {
    pub hints: Vec<(&'static str, &'static str)>,
    pub status: Option<String>,
    pub dimmed: bool,
    pub background: Option<Color>,
}

impl Controls {
    pub fn new(hints: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            hints,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = self.hints.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let bg = self.background.unwrap_or(Color::DarkGray);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in self.hints.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(bg))
                .render(layout[j + 1], buf);
        }

        let fill = layout[self.hints.len() * 2];
        Paragraph::new(self.status.clone().unwrap_or_default())
            .style(base_style.bg(bg))
            .right_aligned()
            .render(fill, buf);
    }
}
