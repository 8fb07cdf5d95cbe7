//! Heatmap export to PNG (plotters bitmap).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::{Path, PathBuf};

use crate::heatmap::{format_value, panel_title, ColorScale};
use crate::pivot::PivotMatrix;

/// Everything needed to draw one panel outside the terminal.
pub struct HeatmapExport<'a> {
    pub series: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub x_values: &'a [f64],
    pub y_values: &'a [f64],
    pub matrix: &'a PivotMatrix,
}

/// File name for a series export: anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn export_file_name(series: &str) -> String {
    let stem: String = series
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "heatmap.png".to_string()
    } else {
        format!("{}.png", stem)
    }
}

pub fn export_path(dir: &Path, series: &str) -> PathBuf {
    dir.join(export_file_name(series))
}

/// One rectangle per present cell, in cell units: `(xi, yi, value)`.
pub fn present_cells(matrix: &PivotMatrix) -> Vec<(usize, usize, f64)> {
    matrix
        .rows()
        .iter()
        .enumerate()
        .flat_map(|(yi, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(xi, v)| v.map(|v| (xi, yi, v)))
        })
        .collect()
}

/// Write the heatmap to PNG using plotters bitmap backend.
pub fn write_heatmap_png(path: &Path, export: &HeatmapExport) -> Result<()> {
    use plotters::prelude::*;

    let cells = present_cells(export.matrix);
    let Some(scale) = ColorScale::from_matrix(export.matrix) else {
        return Err(eyre!("No data to export for {}", export.series));
    };

    let nx = export.matrix.n_cols();
    let ny = export.matrix.n_rows();

    let root = BitMapBackend::new(path, (720, 520)).into_drawing_area();
    root.fill(&WHITE)?;

    let (plot_area, bar_area) = root.split_horizontally(620);

    let x_values = export.x_values;
    let y_values = export.y_values;
    let mut chart = ChartBuilder::on(&plot_area)
        .caption(panel_title(export.series), ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..nx as f64, 0f64..ny as f64)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(export.x_label)
        .y_desc(export.y_label)
        .x_labels(nx.min(12))
        .y_labels(ny.min(12))
        .x_label_formatter(&|v| axis_label(x_values, *v))
        .y_label_formatter(&|v| axis_label(y_values, *v))
        .draw()?;

    chart.draw_series(cells.iter().map(|&(xi, yi, v)| {
        let (r, g, b) = scale.rgb(v);
        Rectangle::new(
            [(xi as f64, yi as f64), (xi as f64 + 1.0, yi as f64 + 1.0)],
            RGBColor(r, g, b).filled(),
        )
    }))?;

    let mut bar = ChartBuilder::on(&bar_area)
        .margin_top(60)
        .margin_bottom(60)
        .margin_right(10)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, scale.min..scale.max.max(scale.min + f64::EPSILON))?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v| format_value(*v))
        .draw()?;

    const BAR_STEPS: usize = 64;
    let span = scale.max - scale.min;
    bar.draw_series((0..BAR_STEPS).map(|i| {
        let t0 = i as f64 / BAR_STEPS as f64;
        let t1 = (i + 1) as f64 / BAR_STEPS as f64;
        let (r, g, b) = crate::heatmap::viridis(t0);
        Rectangle::new(
            [(0.0, scale.min + t0 * span), (1.0, scale.min + t1 * span)],
            RGBColor(r, g, b).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Axis value for the cell whose band contains `pos`, blank between bands.
fn axis_label(values: &[f64], pos: f64) -> String {
    if pos < 0.0 || pos.fract() != 0.0 {
        return String::new();
    }
    values
        .get(pos as usize)
        .map(|v| format_value(*v))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitised() {
        assert_eq!(export_file_name("Total cost"), "Total_cost.png");
        assert_eq!(export_file_name("a/b\\c"), "a_b_c.png");
        assert_eq!(export_file_name("LCOW-2.5"), "LCOW-2.5.png");
        assert_eq!(export_file_name(".."), "heatmap.png");
        assert_eq!(export_file_name("   "), "heatmap.png");
    }

    #[test]
    fn present_cells_skips_missing() {
        let m = PivotMatrix::from_rows(vec![vec![Some(1.0), None], vec![None, Some(4.0)]]);
        assert_eq!(present_cells(&m), vec![(0, 0, 1.0), (1, 1, 4.0)]);
    }

    #[test]
    fn axis_labels_only_on_band_starts() {
        let values = [0.5, 1.5];
        assert_eq!(axis_label(&values, 0.0), "0.50");
        assert_eq!(axis_label(&values, 1.0), "1.5");
        assert_eq!(axis_label(&values, 0.5), "");
        assert_eq!(axis_label(&values, 2.0), "");
    }

    #[test]
    fn empty_matrix_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.png");
        let m = PivotMatrix::empty(2, 2);
        let err = write_heatmap_png(
            &path,
            &HeatmapExport {
                series: "s",
                x_label: "x",
                y_label: "y",
                x_values: &[0.0, 1.0],
                y_values: &[1.0, 2.0],
                matrix: &m,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("No data to export"));
        assert!(!path.exists());
    }
}
