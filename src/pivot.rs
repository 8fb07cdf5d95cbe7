//! Pivot builder: turn flat CSV rows into one matrix per series, indexed by two numeric axes.
//!
//! The first record is the header. Two header columns are the x and y axes; every other
//! column is a series. Axis values are collected in first-seen order, y values are kept only
//! inside an inclusive range, and each kept row writes its series values into the
//! `[y_index][x_index]` cell of the series matrix (later rows overwrite earlier ones).

use thiserror::Error;

pub const DEFAULT_X_COLUMN: &str = "Desal 1 base cost";
pub const DEFAULT_Y_COLUMN: &str = "Disposal cost";
pub const DEFAULT_Y_MIN: f64 = 1.0;
pub const DEFAULT_Y_MAX: f64 = 5.0;

/// Errors raised while pivoting CSV text.
#[derive(Debug, Error)]
pub enum PivotError {
    /// The input has no header line.
    #[error("Dataset is empty: no header line")]
    Empty,

    /// A configured axis column is not present in the header.
    #[error("Axis column '{column}' not found in header (columns: {available})")]
    MissingColumn { column: String, available: String },

    /// Two header cells share a name, so series lookups by name would be ambiguous.
    #[error("Column '{column}' appears more than once in the header")]
    DuplicateColumn { column: String },

    /// The reader could not decode the input.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Which columns to pivot on and which y values to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotSpec {
    pub x_column: String,
    pub y_column: String,
    pub y_min: f64,
    pub y_max: f64,
    pub delimiter: u8,
}

impl Default for PivotSpec {
    fn default() -> Self {
        Self {
            x_column: DEFAULT_X_COLUMN.to_string(),
            y_column: DEFAULT_Y_COLUMN.to_string(),
            y_min: DEFAULT_Y_MIN,
            y_max: DEFAULT_Y_MAX,
            delimiter: b',',
        }
    }
}

impl PivotSpec {
    pub fn new(x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        Self {
            x_column: x_column.into(),
            y_column: y_column.into(),
            ..Self::default()
        }
    }

    pub fn with_y_range(mut self, y_min: f64, y_max: f64) -> Self {
        self.y_min = y_min;
        self.y_max = y_max;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Inclusive on both ends.
    pub fn y_in_range(&self, y: f64) -> bool {
        y >= self.y_min && y <= self.y_max
    }
}

/// Rows are y indices, columns are x indices. `None` marks a cell no row contributed to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotMatrix {
    rows: Vec<Vec<Option<f64>>>,
}

impl PivotMatrix {
    pub fn empty(n_rows: usize, n_cols: usize) -> Self {
        Self {
            rows: vec![vec![None; n_cols]; n_rows],
        }
    }

    pub fn from_rows(rows: Vec<Vec<Option<f64>>>) -> Self {
        Self { rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn get(&self, yi: usize, xi: usize) -> Option<f64> {
        self.rows.get(yi).and_then(|row| row.get(xi)).copied().flatten()
    }

    fn set(&mut self, yi: usize, xi: usize, value: Option<f64>) {
        if let Some(cell) = self.rows.get_mut(yi).and_then(|row| row.get_mut(xi)) {
            *cell = value;
        }
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// Smallest and largest present value, or `None` when every cell is empty.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn present_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotSeries {
    pub name: String,
    pub matrix: PivotMatrix,
}

/// Axis values and one matrix per series, in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotData {
    pub x_column: String,
    pub y_column: String,
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
    pub series: Vec<PivotSeries>,
}

impl PivotData {
    pub fn series_names(&self) -> Vec<String> {
        self.series.iter().map(|s| s.name.clone()).collect()
    }

    pub fn series(&self, name: &str) -> Option<&PivotSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn matrix(&self, name: &str) -> Option<&PivotMatrix> {
        self.series(name).map(|s| &s.matrix)
    }
}

/// Counts of rows and cells that did not make it into the matrices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotReport {
    /// Data records read (header excluded).
    pub rows_read: usize,
    /// Records whose cell count differs from the header.
    pub malformed_rows: usize,
    /// Records whose x or y cell is not a finite number.
    pub rejected_rows: usize,
    /// Records with y outside the configured range (their x is still kept).
    pub out_of_range_rows: usize,
    /// Empty or non-numeric series cells, left as `None`.
    pub invalid_cells: usize,
}

impl PivotReport {
    pub fn rows_used(&self) -> usize {
        self.rows_read - self.malformed_rows - self.rejected_rows - self.out_of_range_rows
    }

    pub fn summary(&self) -> String {
        format!(
            "rows={} used={} malformed={} rejected={} out_of_range={} invalid_cells={}",
            self.rows_read,
            self.rows_used(),
            self.malformed_rows,
            self.rejected_rows,
            self.out_of_range_rows,
            self.invalid_cells
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotOutput {
    pub data: PivotData,
    pub report: PivotReport,
}

/// Parse a cell as a finite number. Surrounding whitespace is ignored.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Index of `value` in `values` by numeric equality, appending it when unseen.
fn index_of_or_insert(values: &mut Vec<f64>, value: f64) -> usize {
    match values.iter().position(|v| *v == value) {
        Some(idx) => idx,
        None => {
            values.push(value);
            values.len() - 1
        }
    }
}

/// Build the pivot for `text` according to `spec`.
pub fn build_pivot(text: &str, spec: &PivotSpec) -> Result<PivotOutput, PivotError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(spec.delimiter)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Err(PivotError::Empty),
    };

    for (i, name) in headers.iter().enumerate() {
        if headers[..i].contains(name) {
            return Err(PivotError::DuplicateColumn {
                column: name.clone(),
            });
        }
    }

    let column_index = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PivotError::MissingColumn {
                column: name.to_string(),
                available: headers.join(", "),
            })
    };
    let x_idx = column_index(&spec.x_column)?;
    let y_idx = column_index(&spec.y_column)?;
    let series_cols: Vec<usize> = (0..headers.len())
        .filter(|&i| i != x_idx && i != y_idx)
        .collect();

    let mut report = PivotReport::default();
    let mut x_values: Vec<f64> = Vec::new();
    let mut y_values: Vec<f64> = Vec::new();
    // (x index, y index, one value per series column)
    let mut placed: Vec<(usize, usize, Vec<Option<f64>>)> = Vec::new();

    for record in records {
        let record = record?;
        report.rows_read += 1;

        if record.len() != headers.len() {
            report.malformed_rows += 1;
            continue;
        }

        let (Some(x), Some(y)) = (parse_number(&record[x_idx]), parse_number(&record[y_idx]))
        else {
            report.rejected_rows += 1;
            continue;
        };

        let xi = index_of_or_insert(&mut x_values, x);
        if !spec.y_in_range(y) {
            report.out_of_range_rows += 1;
            continue;
        }
        let yi = index_of_or_insert(&mut y_values, y);

        let values: Vec<Option<f64>> = series_cols
            .iter()
            .map(|&c| parse_number(&record[c]))
            .collect();
        report.invalid_cells += values.iter().filter(|v| v.is_none()).count();
        placed.push((xi, yi, values));
    }

    let series = series_cols
        .iter()
        .enumerate()
        .map(|(k, &col)| {
            let mut matrix = PivotMatrix::empty(y_values.len(), x_values.len());
            for (xi, yi, values) in &placed {
                matrix.set(*yi, *xi, values[k]);
            }
            PivotSeries {
                name: headers[col].clone(),
                matrix,
            }
        })
        .collect();

    Ok(PivotOutput {
        data: PivotData {
            x_column: spec.x_column.clone(),
            y_column: spec.y_column.clone(),
            x_values,
            y_values,
            series,
        },
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> PivotSpec {
        PivotSpec::new("x", "y")
    }

    #[test]
    fn parse_number_rejects_non_finite() {
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn index_assignment_uses_numeric_equality() {
        let mut values = Vec::new();
        assert_eq!(index_of_or_insert(&mut values, 1.0), 0);
        assert_eq!(index_of_or_insert(&mut values, 2.0), 1);
        assert_eq!(index_of_or_insert(&mut values, 1.0), 0);
        assert_eq!(index_of_or_insert(&mut values, -0.0), 2);
        assert_eq!(index_of_or_insert(&mut values, 0.0), 2);
        assert_eq!(values, vec![1.0, 2.0, -0.0]);
    }

    #[test]
    fn differently_formatted_axis_values_share_an_index() {
        let text = "x,y,s\n1,1,10\n1.0,1.00,20\n01,2,30\n";
        let out = build_pivot(text, &spec()).unwrap();
        assert_eq!(out.data.x_values, vec![1.0]);
        assert_eq!(out.data.y_values, vec![1.0, 2.0]);
        assert_eq!(
            out.data.matrix("s").unwrap().rows(),
            &[vec![Some(20.0)], vec![Some(30.0)]]
        );
    }

    #[test]
    fn axis_columns_need_not_lead() {
        let text = "s1,y,s2,x\n10,1,100,0\n20,1,200,1\n";
        let out = build_pivot(text, &spec()).unwrap();
        assert_eq!(out.data.series_names(), vec!["s1", "s2"]);
        assert_eq!(out.data.x_values, vec![0.0, 1.0]);
        assert_eq!(
            out.data.matrix("s2").unwrap().rows(),
            &[vec![Some(100.0), Some(200.0)]]
        );
    }

    #[test]
    fn non_numeric_axis_rejects_row() {
        let text = "x,y,s\n0,1,10\nabc,1,20\n1,,30\n";
        let out = build_pivot(text, &spec()).unwrap();
        assert_eq!(out.data.x_values, vec![0.0]);
        assert_eq!(out.report.rejected_rows, 2);
        assert_eq!(out.report.rows_used(), 1);
    }

    #[test]
    fn non_numeric_series_cell_is_empty_and_counted() {
        let text = "x,y,s1,s2\n0,1,oops,5\n";
        let out = build_pivot(text, &spec()).unwrap();
        assert_eq!(out.data.matrix("s1").unwrap().get(0, 0), None);
        assert_eq!(out.data.matrix("s2").unwrap().get(0, 0), Some(5.0));
        assert_eq!(out.report.invalid_cells, 1);
    }

    #[test]
    fn missing_axis_column_is_an_error() {
        let err = build_pivot("a,y,s\n0,1,2\n", &spec()).unwrap_err();
        match err {
            PivotError::MissingColumn { column, available } => {
                assert_eq!(column, "x");
                assert_eq!(available, "a, y, s");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repeated_header_name_is_an_error() {
        let err = build_pivot("x,y,s,t,s\n0,1,2,3,4\n", &spec()).unwrap_err();
        match err {
            PivotError::DuplicateColumn { column } => assert_eq!(column, "s"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(build_pivot("x,y,x\n0,1,2\n", &spec()).is_err());
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(build_pivot("", &spec()), Err(PivotError::Empty)));
    }

    #[test]
    fn header_only_gives_empty_matrices() {
        let out = build_pivot("x,y,s\n", &spec()).unwrap();
        assert!(out.data.x_values.is_empty());
        assert!(out.data.y_values.is_empty());
        let m = out.data.matrix("s").unwrap();
        assert_eq!(m.n_rows(), 0);
        assert_eq!(m.n_cols(), 0);
        assert_eq!(m.value_range(), None);
    }

    #[test]
    fn custom_delimiter_and_quoted_fields() {
        let text = "x;y;\"a;b\"\n0;1;\"7\"\n";
        let out = build_pivot(text, &spec().with_delimiter(b';')).unwrap();
        assert_eq!(out.data.series_names(), vec!["a;b"]);
        assert_eq!(out.data.matrix("a;b").unwrap().get(0, 0), Some(7.0));
    }

    #[test]
    fn custom_y_range_is_inclusive() {
        let text = "x,y,s\n0,0,1\n0,10,2\n0,11,3\n";
        let out = build_pivot(text, &spec().with_y_range(0.0, 10.0)).unwrap();
        assert_eq!(out.data.y_values, vec![0.0, 10.0]);
        assert_eq!(out.report.out_of_range_rows, 1);
    }

    #[test]
    fn crlf_line_endings() {
        let text = "x,y,s\r\n0,1,10\r\n1,1,20\r\n";
        let out = build_pivot(text, &spec()).unwrap();
        assert_eq!(
            out.data.matrix("s").unwrap().rows(),
            &[vec![Some(10.0), Some(20.0)]]
        );
    }

    #[test]
    fn value_range_skips_empty_cells() {
        let m = PivotMatrix::from_rows(vec![vec![Some(3.0), None], vec![Some(-1.0), Some(8.0)]]);
        assert_eq!(m.value_range(), Some((-1.0, 8.0)));
        assert_eq!(m.present_cells(), 3);
    }

    #[test]
    fn report_summary_mentions_counts() {
        let text = "x,y,s\n0,1,10\n0,9,20\n1,1\n";
        let out = build_pivot(text, &spec()).unwrap();
        assert_eq!(out.report.rows_read, 3);
        assert_eq!(out.report.malformed_rows, 1);
        assert_eq!(out.report.out_of_range_rows, 1);
        assert_eq!(
            out.report.summary(),
            "rows=3 used=1 malformed=1 rejected=0 out_of_range=1 invalid_cells=0"
        );
    }
}
