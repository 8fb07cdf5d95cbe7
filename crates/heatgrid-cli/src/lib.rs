//! Shared CLI definitions for heatgrid.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Compression format for data files
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz)
    Gzip,
    /// Zstandard compression (.zst)
    Zstd,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// XZ compression (.xz)
    Xz,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            match ext.to_lowercase().as_str() {
                "gz" => Some(Self::Gzip),
                "zst" | "zstd" => Some(Self::Zstd),
                "bz2" | "bz" => Some(Self::Bzip2),
                "xz" => Some(Self::Xz),
                _ => None,
            }
        } else {
            None
        }
    }

    /// Parse the name used in config files ("gzip", "zstd", "bzip2", "xz").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gzip" | "gz" => Some(Self::Gzip),
            "zstd" | "zst" => Some(Self::Zstd),
            "bzip2" | "bz2" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }
}

/// Command-line arguments for heatgrid
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "heatgrid",
    version,
    about = "Heatmap dashboards for parameter sweeps in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to the delimited data file to open (not required with --generate-config)
    #[arg(required_unless_present = "generate_config", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Field delimiter of the data file (default: ',')
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Specify the compression format explicitly (gzip, zstd, bzip2, xz)
    /// If not specified, compression is auto-detected from file extension.
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionFormat>,

    /// Header name of the column used for the x axis (default: "Desal 1 base cost")
    #[arg(long = "x-column", value_name = "NAME")]
    pub x_column: Option<String>,

    /// Header name of the column used for the y axis (default: "Disposal cost")
    #[arg(long = "y-column", value_name = "NAME")]
    pub y_column: Option<String>,

    /// Smallest y value kept in the heatmaps, inclusive (default: 1)
    #[arg(long = "y-min", value_name = "VALUE", allow_negative_numbers = true)]
    pub y_min: Option<f64>,

    /// Largest y value kept in the heatmaps, inclusive (default: 5)
    #[arg(long = "y-max", value_name = "VALUE", allow_negative_numbers = true)]
    pub y_max: Option<f64>,

    /// Series to show when the data is loaded. Use once per series.
    #[arg(long = "series", value_name = "NAME")]
    pub series: Vec<String>,

    /// Select this layout preset by name once the data is loaded
    #[arg(long = "preset", value_name = "NAME")]
    pub preset: Option<String>,

    /// Keep layout presets in this JSON file across sessions (default: session only)
    #[arg(long = "presets-file", value_name = "FILE")]
    pub presets_file: Option<PathBuf>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/heatgrid/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_detection() {
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sweep.csv.gz")),
            Some(CompressionFormat::Gzip)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sweep.csv.zst")),
            Some(CompressionFormat::Zstd)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sweep.csv.bz2")),
            Some(CompressionFormat::Bzip2)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sweep.csv.xz")),
            Some(CompressionFormat::Xz)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("sweep.csv")),
            None
        );
        assert_eq!(CompressionFormat::from_extension(Path::new("sweep")), None);
    }

    #[test]
    fn test_compression_from_name() {
        assert_eq!(
            CompressionFormat::from_name("GZIP"),
            Some(CompressionFormat::Gzip)
        );
        assert_eq!(
            CompressionFormat::from_name("bzip2"),
            Some(CompressionFormat::Bzip2)
        );
        assert_eq!(CompressionFormat::from_name("rar"), None);
    }

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "heatgrid",
            "sweep.csv",
            "--delimiter",
            ";",
            "--x-column",
            "a",
            "--y-column",
            "b",
            "--y-min",
            "-2",
            "--y-max",
            "2",
            "--series",
            "s1",
            "--series",
            "s2",
            "--preset",
            "main",
        ])
        .unwrap();
        assert_eq!(args.path, Some(PathBuf::from("sweep.csv")));
        assert_eq!(args.delimiter, Some(';'));
        assert_eq!(args.x_column.as_deref(), Some("a"));
        assert_eq!(args.y_column.as_deref(), Some("b"));
        assert_eq!(args.y_min, Some(-2.0));
        assert_eq!(args.y_max, Some(2.0));
        assert_eq!(args.series, vec!["s1".to_string(), "s2".to_string()]);
        assert_eq!(args.preset.as_deref(), Some("main"));
    }

    #[test]
    fn test_path_required_unless_generating_config() {
        assert!(Args::try_parse_from(["heatgrid"]).is_err());
        let args = Args::try_parse_from(["heatgrid", "--generate-config"]).unwrap();
        assert!(args.generate_config);
        assert!(args.path.is_none());
    }

    #[test]
    fn test_options_markdown_lists_flags() {
        let md = render_options_markdown();
        assert!(md.contains("--x-column"));
        assert!(md.contains("--presets-file"));
        assert!(!md.contains("--help"));
    }
}
