//! Viridis colour scale and the terminal heatmap panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::config::{ColorParser, Theme};
use crate::pivot::PivotMatrix;

/// Viridis sampled at nine evenly spaced stops.
pub const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

/// Viridis colour at `t` in `[0, 1]`, linearly interpolated between stops.
pub fn viridis(t: f64) -> (u8, u8, u8) {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(VIRIDIS.len() - 1);
    let frac = scaled - lo as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (VIRIDIS[lo], VIRIDIS[hi]);
    (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Linear mapping from the value range of a matrix onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    pub fn from_matrix(matrix: &PivotMatrix) -> Option<Self> {
        matrix
            .value_range()
            .map(|(min, max)| ColorScale { min, max })
    }

    /// A flat matrix maps every value to the middle of the scale.
    pub fn normalize(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            0.5
        } else {
            ((v - self.min) / span).clamp(0.0, 1.0)
        }
    }

    pub fn rgb(&self, v: f64) -> (u8, u8, u8) {
        viridis(self.normalize(v))
    }
}

/// Index of the matrix cell shown at screen offset `pos` when `n` cells are stretched
/// over `extent` screen cells.
pub fn cell_index(pos: u16, extent: u16, n: usize) -> usize {
    if extent == 0 || n == 0 {
        return 0;
    }
    ((pos as usize * n) / extent as usize).min(n - 1)
}

/// Compact label for an axis or colour-bar value.
pub fn format_value(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let abs = v.abs();
    if abs >= 100_000.0 || abs < 0.01 {
        format!("{:.1e}", v)
    } else if (v - v.round()).abs() < 1e-10 {
        format!("{:.0}", v)
    } else if abs >= 1.0 {
        format!("{:.1}", v)
    } else {
        format!("{:.2}", v)
    }
}

pub fn panel_title(series: &str) -> String {
    format!("Heatmap of {}", series)
}

const COLOR_BAR_WIDTH: u16 = 2;

/// One series drawn as a heatmap inside a bordered panel.
///
/// Row index 0 of the matrix is drawn at the bottom; columns follow `x_values` order.
pub struct HeatmapPanel<'a> {
    pub series: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub x_values: &'a [f64],
    pub y_values: &'a [f64],
    pub matrix: &'a PivotMatrix,
    pub focused: bool,
    pub theme: &'a Theme,
    pub palette: &'a ColorParser,
}

impl HeatmapPanel<'_> {
    fn block(&self) -> Block<'static> {
        let border = if self.focused {
            self.theme.get("panel_border_focused")
        } else {
            self.theme.get("panel_border")
        };
        Block::default()
            .borders(Borders::ALL)
            .border_type(if self.focused {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", panel_title(self.series)))
    }

    fn render_message(&self, area: Rect, buf: &mut Buffer, message: &str) {
        Paragraph::new(message)
            .style(Style::default().fg(self.theme.get("text_secondary")))
            .centered()
            .render(area, buf);
    }
}

impl Widget for HeatmapPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(scale) = ColorScale::from_matrix(self.matrix) else {
            self.render_message(inner, buf, "No values in range");
            return;
        };
        let (ny, nx) = (self.matrix.n_rows(), self.matrix.n_cols());

        let label_style = Style::default().fg(self.theme.get("text_secondary"));
        let y_label_width = self
            .y_values
            .iter()
            .map(|v| format_value(*v).chars().count() as u16)
            .max()
            .unwrap_or(1);
        let bar_label_width = format_value(scale.min)
            .chars()
            .count()
            .max(format_value(scale.max).chars().count()) as u16;
        let bar_width = COLOR_BAR_WIDTH + 1 + bar_label_width;

        // one row for the y title, two for x labels and title
        if inner.height < 4 || inner.width < y_label_width + 2 + bar_width {
            self.render_message(inner, buf, "Panel too small");
            return;
        }

        let plot = Rect {
            x: inner.x + y_label_width + 1,
            y: inner.y + 1,
            width: inner.width - y_label_width - 1 - bar_width - 1,
            height: inner.height - 3,
        };

        buf.set_stringn(
            inner.x,
            inner.y,
            self.y_label,
            inner.width as usize,
            label_style,
        );

        let missing = self.theme.get("missing_cell");
        let mut previous_yi = None;
        for r in 0..plot.height {
            let yi = ny.saturating_sub(1) - cell_index(r, plot.height, ny);
            if previous_yi != Some(yi) {
                if let Some(v) = self.y_values.get(yi) {
                    let text = format_value(*v);
                    let pad = y_label_width.saturating_sub(text.chars().count() as u16);
                    buf.set_string(inner.x + pad, plot.y + r, text, label_style);
                }
                previous_yi = Some(yi);
            }
            for c in 0..plot.width {
                let xi = cell_index(c, plot.width, nx);
                let bg = match self.matrix.get(yi, xi) {
                    Some(v) => {
                        let (red, green, blue) = scale.rgb(v);
                        self.palette.rgb(red, green, blue)
                    }
                    None => missing,
                };
                if let Some(cell) = buf.cell_mut((plot.x + c, plot.y + r)) {
                    cell.set_char(' ').set_bg(bg);
                }
            }
        }

        let x_labels_y = plot.y + plot.height;
        let mut next_free = plot.x;
        let mut previous_xi = None;
        for c in 0..plot.width {
            let xi = cell_index(c, plot.width, nx);
            if previous_xi == Some(xi) {
                continue;
            }
            previous_xi = Some(xi);
            let x = plot.x + c;
            if x < next_free {
                continue;
            }
            if let Some(v) = self.x_values.get(xi) {
                let text = format_value(*v);
                let len = text.chars().count() as u16;
                if x + len > plot.x + plot.width {
                    break;
                }
                buf.set_string(x, x_labels_y, text, label_style);
                next_free = x + len + 1;
            }
        }
        let title_width = (self.x_label.chars().count() as u16).min(plot.width);
        buf.set_stringn(
            plot.x + (plot.width - title_width) / 2,
            x_labels_y + 1,
            self.x_label,
            plot.width as usize,
            label_style,
        );

        let bar_x = plot.x + plot.width + 1;
        for r in 0..plot.height {
            let t = if plot.height <= 1 {
                1.0
            } else {
                1.0 - r as f64 / (plot.height - 1) as f64
            };
            let (red, green, blue) = viridis(t);
            let color = self.palette.rgb(red, green, blue);
            for dx in 0..COLOR_BAR_WIDTH {
                if let Some(cell) = buf.cell_mut((bar_x + dx, plot.y + r)) {
                    cell.set_char(' ').set_bg(color);
                }
            }
        }
        let bar_labels_x = bar_x + COLOR_BAR_WIDTH + 1;
        buf.set_string(bar_labels_x, plot.y, format_value(scale.max), label_style);
        if plot.height > 1 {
            buf.set_string(
                bar_labels_x,
                plot.y + plot.height - 1,
                format_value(scale.min),
                label_style,
            );
        }
    }
}

/// Placeholder for a selected series that has no matrix (e.g. after a reload dropped it).
pub fn render_missing_panel(series: &str, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("error")))
        .title(format!(" {} ", panel_title(series)));
    let inner = block.inner(area);
    block.render(area, buf);
    Paragraph::new("No such series")
        .style(Style::default().fg(Color::Reset))
        .centered()
        .render(inner, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> PivotMatrix {
        PivotMatrix::from_rows(vec![
            vec![Some(10.0), Some(20.0)],
            vec![Some(30.0), None],
        ])
    }

    #[test]
    fn viridis_endpoints_and_clamping() {
        assert_eq!(viridis(0.0), (68, 1, 84));
        assert_eq!(viridis(1.0), (253, 231, 37));
        assert_eq!(viridis(-3.0), viridis(0.0));
        assert_eq!(viridis(7.0), viridis(1.0));
        assert_eq!(viridis(f64::NAN), viridis(0.0));
        assert_eq!(viridis(0.5), (33, 144, 141));
    }

    #[test]
    fn flat_scale_maps_to_middle() {
        let scale = ColorScale { min: 3.0, max: 3.0 };
        assert_eq!(scale.normalize(3.0), 0.5);
    }

    #[test]
    fn scale_comes_from_present_values() {
        let scale = ColorScale::from_matrix(&matrix()).unwrap();
        assert_eq!((scale.min, scale.max), (10.0, 30.0));
        assert!(ColorScale::from_matrix(&PivotMatrix::empty(2, 2)).is_none());
    }

    #[test]
    fn cell_index_stretches_and_clamps() {
        let idx: Vec<usize> = (0..6).map(|p| cell_index(p, 6, 2)).collect();
        assert_eq!(idx, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(cell_index(1, 2, 5), 2);
        assert_eq!(cell_index(0, 0, 3), 0);
    }

    #[test]
    fn format_value_is_compact() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_value(250000.0), "2.5e5");
    }

    #[test]
    fn renders_title_and_cells_with_row_zero_at_bottom() {
        let theme = Theme::default();
        let palette = ColorParser::with_capabilities(true, true);
        let m = matrix();
        let area = Rect::new(0, 0, 30, 10);
        let mut buf = Buffer::empty(area);
        HeatmapPanel {
            series: "s1",
            x_label: "x",
            y_label: "y",
            x_values: &[0.0, 1.0],
            y_values: &[1.0, 2.0],
            matrix: &m,
            focused: false,
            theme: &theme,
            palette: &palette,
        }
        .render(area, &mut buf);

        let top: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(top.contains("Heatmap of s1"));

        // inner starts at (1,1); y labels are one wide, so the plot starts at x=3, y=2
        let (plot_x, plot_y, plot_h) = (3u16, 2u16, 5u16);
        let bottom_left = &buf[(plot_x, plot_y + plot_h - 1)];
        assert_eq!(bottom_left.bg, Color::Rgb(68, 1, 84));
        let top_left = &buf[(plot_x, plot_y)];
        assert_eq!(top_left.bg, Color::Rgb(253, 231, 37));
    }

    #[test]
    fn absent_cells_use_the_missing_cell_color() {
        let mut theme = Theme::default();
        theme
            .colors
            .insert("missing_cell".to_string(), Color::Indexed(52));
        let palette = ColorParser::with_capabilities(true, true);
        let m = matrix();
        let area = Rect::new(0, 0, 30, 10);
        let mut buf = Buffer::empty(area);
        HeatmapPanel {
            series: "s1",
            x_label: "x",
            y_label: "y",
            x_values: &[0.0, 1.0],
            y_values: &[1.0, 2.0],
            matrix: &m,
            focused: false,
            theme: &theme,
            palette: &palette,
        }
        .render(area, &mut buf);

        // plot is 20 wide starting at x=3; row 1 column 1 has no value
        let (plot_x, plot_y, plot_w) = (3u16, 2u16, 20u16);
        assert_eq!(buf[(plot_x + plot_w - 1, plot_y)].bg, Color::Indexed(52));
        assert_eq!(buf[(plot_x, plot_y)].bg, Color::Rgb(253, 231, 37));
    }

    #[test]
    fn empty_matrix_shows_message() {
        let theme = Theme::default();
        let palette = ColorParser::with_capabilities(true, true);
        let m = PivotMatrix::empty(2, 2);
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        HeatmapPanel {
            series: "s1",
            x_label: "x",
            y_label: "y",
            x_values: &[0.0, 1.0],
            y_values: &[1.0, 2.0],
            matrix: &m,
            focused: true,
            theme: &theme,
            palette: &palette,
        }
        .render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|p| buf[p].symbol().to_string())
            .collect();
        assert!(text.contains("No values in range"));
    }
}
