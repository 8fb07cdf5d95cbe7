//! Draws the panel arrangement: grid units mapped onto terminal cells.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Paragraph, Widget},
};

use crate::config::{ColorParser, Theme};
use crate::heatmap::{render_missing_panel, HeatmapPanel};
use crate::layout::PanelPlacement;
use crate::pivot::PivotData;

/// Screen area of a placement, clipped to `area`. `scroll` is in grid rows.
/// Columns are split proportionally so the rightmost panel reaches the right edge.
pub fn panel_rect(
    placement: &PanelPlacement,
    area: Rect,
    cols: u16,
    row_height: u16,
    scroll: u16,
) -> Option<Rect> {
    let cols = cols.max(1) as u32;
    let width = area.width as u32;
    let left = area.x as u32 + placement.x as u32 * width / cols;
    let right = area.x as u32 + (placement.right() as u32).min(cols) * width / cols;

    let row_height = row_height.max(1) as i64;
    let top = area.y as i64 + (placement.y as i64 - scroll as i64) * row_height;
    let bottom = top + placement.h as i64 * row_height;
    let top = top.max(area.y as i64);
    let bottom = bottom.min(area.bottom() as i64);

    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect {
        x: left as u16,
        y: top as u16,
        width: (right - left) as u16,
        height: (bottom - top) as u16,
    })
}

/// Smallest scroll that keeps `placement`'s top row on screen, starting from `scroll`.
pub fn scroll_to_show(placement: &PanelPlacement, scroll: u16, visible_rows: u16) -> u16 {
    let visible_rows = visible_rows.max(1);
    if placement.y < scroll {
        placement.y
    } else if placement.bottom() > scroll + visible_rows {
        placement
            .bottom()
            .saturating_sub(visible_rows)
            .min(placement.y)
    } else {
        scroll
    }
}

pub struct GridView<'a> {
    pub placements: &'a [PanelPlacement],
    pub data: &'a PivotData,
    pub cols: u16,
    pub row_height: u16,
    pub scroll: u16,
    /// Focused panel, highlighted when the grid has focus.
    pub focused: Option<&'a str>,
    pub theme: &'a Theme,
    pub palette: &'a ColorParser,
}

impl Widget for GridView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.placements.is_empty() {
            Paragraph::new("No series selected. Tab to the series list and press Space to add a heatmap.")
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .centered()
                .render(area, buf);
            return;
        }

        for placement in self.placements {
            let Some(rect) = panel_rect(placement, area, self.cols, self.row_height, self.scroll)
            else {
                continue;
            };
            match self.data.matrix(&placement.series) {
                Some(matrix) => HeatmapPanel {
                    series: &placement.series,
                    x_label: &self.data.x_column,
                    y_label: &self.data.y_column,
                    x_values: &self.data.x_values,
                    y_values: &self.data.y_values,
                    matrix,
                    focused: self.focused == Some(placement.series.as_str()),
                    theme: self.theme,
                    palette: self.palette,
                }
                .render(rect, buf),
                None => render_missing_panel(&placement.series, self.theme, rect, buf),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_split_proportionally() {
        let area = Rect::new(0, 0, 120, 40);
        let p = PanelPlacement::new("a", 4, 0, 4, 4);
        assert_eq!(panel_rect(&p, area, 12, 3, 0), Some(Rect::new(40, 0, 40, 12)));
        let last = PanelPlacement::new("b", 8, 0, 4, 4);
        let r = panel_rect(&last, Rect::new(0, 0, 100, 40), 12, 3, 0).unwrap();
        assert_eq!(r.right(), 100);
    }

    #[test]
    fn scrolled_panels_are_clipped_or_hidden() {
        let area = Rect::new(0, 1, 120, 12);
        let p = PanelPlacement::new("a", 0, 0, 4, 4);
        assert_eq!(panel_rect(&p, area, 12, 3, 2), Some(Rect::new(0, 1, 40, 6)));
        assert_eq!(panel_rect(&p, area, 12, 3, 4), None);
        let below = PanelPlacement::new("b", 0, 4, 4, 4);
        assert_eq!(panel_rect(&below, area, 12, 3, 0), None);
    }

    #[test]
    fn scroll_follows_focus() {
        let p = PanelPlacement::new("a", 0, 8, 4, 4);
        assert_eq!(scroll_to_show(&p, 0, 6), 6);
        assert_eq!(scroll_to_show(&p, 10, 6), 8);
        assert_eq!(scroll_to_show(&p, 7, 6), 7);
        let tall = PanelPlacement::new("t", 0, 2, 4, 20);
        assert_eq!(scroll_to_show(&tall, 0, 6), 2);
    }
}
