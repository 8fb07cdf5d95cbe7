use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::config::Theme;

/// Event emitted by TextInput widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    Submit, // Enter pressed
    Cancel, // Esc pressed
}

/// Single-line text input wrapping tui-textarea
pub struct TextInput {
    textarea: TextArea<'static>,
    value: String,
    text_color: Option<Color>,
    background_color: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut widget = Self {
            textarea: TextArea::default(),
            value: String::new(),
            text_color: None,
            background_color: None,
            focused: false,
        };
        widget.apply_style();
        widget
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.text_color = Some(theme.get("text_primary"));
        self.apply_style();
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self.apply_style();
        self
    }

    fn apply_style(&mut self) {
        let mut style = Style::default();
        if let Some(fg) = self.text_color {
            style = style.fg(fg);
        }
        if let Some(bg) = self.background_color {
            style = style.bg(bg);
        }
        self.textarea.set_style(style);
        // no underline on the cursor line
        self.textarea.set_cursor_line_style(Style::default());
        self.apply_cursor_style();
    }

    fn apply_cursor_style(&mut self) {
        if self.focused {
            self.textarea
                .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        } else {
            // same as the text style hides the cursor
            let style = self.textarea.style();
            self.textarea.set_cursor_style(style);
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.apply_cursor_style();
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        let single_line = value.replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![single_line.clone()]);
        self.value = single_line;
        self.apply_style();
        self.textarea.move_cursor(CursorMove::End);
    }

    pub fn clear(&mut self) {
        self.textarea = TextArea::default();
        self.value.clear();
        self.apply_style();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TextInputEvent {
        match event.code {
            KeyCode::Enter => TextInputEvent::Submit,
            KeyCode::Esc => TextInputEvent::Cancel,
            _ => {
                let input = key_event_to_input(event);
                if matches!(input.key, Key::Char('\n') | Key::Char('\r') | Key::Null) {
                    return TextInputEvent::None;
                }
                self.textarea.input(input);
                self.value = self.textarea.lines().first().cloned().unwrap_or_default();
                TextInputEvent::None
            }
        }
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert crossterm KeyEvent to tui_textarea::Input
fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Delete => Key::Delete,
        KeyCode::Esc => Key::Esc,
        _ => Key::Null,
    };

    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);

        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let cell = &mut buf[(x, y)];
                let style = cell.style().remove_modifier(Modifier::UNDERLINED);
                cell.set_style(style);
            }
        }
    }
}
