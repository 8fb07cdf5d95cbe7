use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use supports_color::Stream;

use crate::layout::GridSpec;
use crate::pivot::{DEFAULT_X_COLUMN, DEFAULT_Y_COLUMN, DEFAULT_Y_MAX, DEFAULT_Y_MIN};
use crate::CompressionFormat;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Load `config.toml` from this directory. A missing file yields the defaults.
    pub fn load_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub file_loading: FileLoadingConfig,
    pub pivot: PivotConfig,
    pub grid: GridConfig,
    pub presets: PresetsConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileLoadingConfig {
    pub delimiter: Option<char>,
    pub compression: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    pub x_column: String,
    pub y_column: String,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cols: u16,
    pub default_width: u16,
    pub default_height: u16,
    /// Terminal rows drawn per grid row.
    pub row_height: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PresetsConfig {
    pub persist: bool,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub error: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub panel_border: String,
    pub panel_border_focused: String,
    pub selector_checked: String,
    pub missing_cell: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            file_loading: FileLoadingConfig::default(),
            pivot: PivotConfig::default(),
            grid: GridConfig::default(),
            presets: PresetsConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            x_column: DEFAULT_X_COLUMN.to_string(),
            y_column: DEFAULT_Y_COLUMN.to_string(),
            y_min: DEFAULT_Y_MIN,
            y_max: DEFAULT_Y_MAX,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        let spec = GridSpec::default();
        Self {
            cols: spec.cols,
            default_width: spec.default_w,
            default_height: spec.default_h,
            row_height: 3,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            panel_border: "dark_gray".to_string(),
            panel_border_focused: "yellow".to_string(),
            selector_checked: "green".to_string(),
            missing_cell: "reset".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let mut config = AppConfig::default();

        if let Ok(manager) = ConfigManager::new(app_name) {
            config.merge(manager.load_config()?);
        }

        config.validate()?;

        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.file_loading.merge(other.file_loading);
        self.pivot.merge(other.pivot);
        self.grid.merge(other.grid);
        self.presets.merge(other.presets);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if let Some(name) = &self.file_loading.compression {
            if CompressionFormat::from_name(name).is_none() {
                return Err(eyre!(
                    "Invalid compression: {}. Must be one of gzip, zstd, bzip2, xz",
                    name
                ));
            }
        }

        if let Some(d) = self.file_loading.delimiter {
            if !d.is_ascii() {
                return Err(eyre!("delimiter must be a single ASCII character"));
            }
        }

        if self.pivot.x_column.is_empty() || self.pivot.y_column.is_empty() {
            return Err(eyre!("pivot x_column and y_column must not be empty"));
        }

        if !self.pivot.y_min.is_finite() || !self.pivot.y_max.is_finite() {
            return Err(eyre!("pivot y_min and y_max must be finite numbers"));
        }

        if self.pivot.y_min > self.pivot.y_max {
            return Err(eyre!(
                "pivot y_min ({}) must not be greater than y_max ({})",
                self.pivot.y_min,
                self.pivot.y_max
            ));
        }

        if self.grid.cols == 0 {
            return Err(eyre!("grid cols must be greater than 0"));
        }

        if self.grid.default_width == 0 || self.grid.default_height == 0 {
            return Err(eyre!("grid default_width and default_height must be greater than 0"));
        }

        if self.grid.row_height == 0 {
            return Err(eyre!("grid row_height must be greater than 0"));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            cols: self.grid.cols,
            default_w: self.grid.default_width,
            default_h: self.grid.default_height,
        }
    }
}

impl FileLoadingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.compression.is_some() {
            self.compression = other.compression;
        }
    }
}

impl PivotConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PivotConfig::default();
        if other.x_column != default.x_column {
            self.x_column = other.x_column;
        }
        if other.y_column != default.y_column {
            self.y_column = other.y_column;
        }
        if other.y_min != default.y_min {
            self.y_min = other.y_min;
        }
        if other.y_max != default.y_max {
            self.y_max = other.y_max;
        }
    }
}

impl GridConfig {
    pub fn merge(&mut self, other: Self) {
        let default = GridConfig::default();
        if other.cols != default.cols {
            self.cols = other.cols;
        }
        if other.default_width != default.default_width {
            self.default_width = other.default_width;
        }
        if other.default_height != default.default_height {
            self.default_height = other.default_height;
        }
        if other.row_height != default.row_height {
            self.row_height = other.row_height;
        }
    }
}

impl PresetsConfig {
    pub fn merge(&mut self, other: Self) {
        if other.persist {
            self.persist = true;
        }
        if other.file.is_some() {
            self.file = other.file;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    fn fields(&self) -> [(&'static str, &String); 11] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("success", &self.success),
            ("error", &self.error),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("panel_border", &self.panel_border),
            ("panel_border_focused", &self.panel_border_focused),
            ("selector_checked", &self.selector_checked),
            ("missing_cell", &self.missing_cell),
        ]
    }

    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.fields() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();

        macro_rules! merge_color {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            };
        }

        merge_color!(
            primary,
            secondary,
            success,
            error,
            controls_bg,
            text_primary,
            text_secondary,
            panel_border,
            panel_border_focused,
            selector_checked,
            missing_cell,
        );
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parser with fixed capabilities, independent of the environment.
    pub fn with_capabilities(true_color: bool, colors_256: bool) -> Self {
        Self {
            supports_true_color: true_color,
            supports_256: colors_256,
            no_color: false,
        }
    }

    /// Parse a color string (hex, indexed or named) and convert to the terminal's palette
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.rgb(r, g, b));
        }

        if trimmed.to_lowercase().starts_with("indexed(") && trimmed.ends_with(')') {
            let num_str = &trimmed[8..trimmed.len() - 1];
            let num = num_str.parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),

            "bright_black" | "bright black" => Ok(Color::Indexed(8)),
            "bright_red" | "bright red" => Ok(Color::Indexed(9)),
            "bright_green" | "bright green" => Ok(Color::Indexed(10)),
            "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
            "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
            "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
            "bright_white" | "bright white" => Ok(Color::Indexed(15)),

            "gray" | "grey" => Ok(Color::Indexed(8)),
            "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => Ok(Color::Indexed(8)),
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

            "reset" | "reversed" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), indexed(n) or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    /// Best terminal colour for an RGB triple given the detected capabilities.
    pub fn rgb(&self, r: u8, g: u8, b: u8) -> Color {
        if self.no_color {
            Color::Reset
        } else if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if !s.starts_with('#') || s.len() != 7 {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let component = |range: std::ops::Range<usize>, name: &str| {
        s.get(range)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(|| eyre!("Invalid {} component in hex color: {}", name, s))
    };

    Ok((
        component(1..3, "red")?,
        component(3..5, "green")?,
        component(5..7, "blue")?,
    ))
}

/// Convert RGB to nearest 256-color palette index (xterm palette)
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let r_bright = r > 128;
    let g_bright = g > 128;
    let b_bright = b > 128;

    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r_bright, g_bright, b_bright) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.fields() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }
}

impl Default for Theme {
    fn default() -> Self {
        let parser = ColorParser::new();
        let colors = ColorConfig::default()
            .fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), parser.parse(value).unwrap_or(Color::Reset)))
            .collect();
        Self { colors }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
