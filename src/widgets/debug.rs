use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct DebugState {
    pub num_events: usize,
    pub num_frames: usize,
    pub num_key_events: usize,
    pub last_key_event_name: String,
    /// Last action taken (e.g. "move_panel") for debugging key handling.
    pub last_action: String,
    pub enabled: bool,
    /// Milliseconds spent reading and pivoting the dataset.
    pub load_ms: Option<u128>,
    /// `PivotReport::summary` of the last load.
    pub pivot_report: Option<String>,
}

impl DebugState {
    pub fn on_key(&mut self, event: &crossterm::event::KeyEvent) {
        self.num_key_events += 1;
        self.last_key_event_name = format!("{:?}", event.code);
    }
}

impl Widget for &DebugState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let load = self
            .load_ms
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "-".to_string());
        Paragraph::new(format!(
            "events={} keys={} last_key={} last_action={} frames={} load={} {}",
            self.num_events,
            self.num_key_events,
            self.last_key_event_name,
            self.last_action,
            self.num_frames,
            load,
            self.pivot_report.as_deref().unwrap_or("")
        ))
        .render(area, buf);
    }
}
