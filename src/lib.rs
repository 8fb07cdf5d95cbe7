use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Style, Stylize};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::time::Instant;

pub mod chart_export;
pub mod config;
pub mod dashboard;
pub mod error_display;
pub mod heatmap;
pub mod layout;
pub mod pivot;
pub mod presets;
pub mod source;
pub mod widgets;

pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use dashboard::Dashboard;
pub use heatgrid_cli::{Args, CompressionFormat};
pub use layout::{GridLayout, GridSpec, Nav, PanelPlacement};
pub use pivot::{build_pivot, PivotData, PivotError, PivotReport, PivotSpec};
pub use presets::{LayoutPreset, PresetFile, PresetStore};

use chart_export::{export_path, write_heatmap_png, HeatmapExport};
use error_display::user_message_from_report;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::grid::{scroll_to_show, GridView};
use widgets::help::Help;
use widgets::preset_list::PresetList;
use widgets::series_selector::SeriesSelector;
use widgets::text_input::TextInputEvent;

pub const APP_NAME: &str = "heatgrid";

const SIDEBAR_WIDTH: u16 = 34;
const PRESET_LIST_HEIGHT: u16 = 10;

/// How to read and pivot the dataset, resolved from the CLI and the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub compression: Option<CompressionFormat>,
    pub x_column: String,
    pub y_column: String,
    pub y_min: f64,
    pub y_max: f64,
    /// Series selected as soon as the data is loaded.
    pub series: Vec<String>,
    /// Preset applied as soon as the data is loaded.
    pub preset: Option<String>,
    pub presets_file: Option<PathBuf>,
    pub debug: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        let spec = PivotSpec::default();
        Self {
            delimiter: None,
            compression: None,
            x_column: spec.x_column,
            y_column: spec.y_column,
            y_min: spec.y_min,
            y_max: spec.y_max,
            series: Vec::new(),
            preset: None,
            presets_file: None,
            debug: false,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_columns(mut self, x_column: &str, y_column: &str) -> Self {
        self.x_column = x_column.to_string();
        self.y_column = y_column.to_string();
        self
    }

    pub fn with_y_range(mut self, y_min: f64, y_max: f64) -> Self {
        self.y_min = y_min;
        self.y_max = y_max;
        self
    }

    pub fn with_series(mut self, series: Vec<String>) -> Self {
        self.series = series;
        self
    }

    pub fn with_preset(mut self, name: &str) -> Self {
        self.preset = Some(name.to_string());
        self
    }

    pub fn with_presets_file(mut self, path: PathBuf) -> Self {
        self.presets_file = Some(path);
        self
    }

    /// Create OpenOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Result<Self> {
        let mut opts = OpenOptions::new();

        opts.delimiter = match args.delimiter.or(config.file_loading.delimiter) {
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => {
                return Err(eyre!(
                    "delimiter must be a single ASCII character, got '{}'",
                    c
                ))
            }
            None => None,
        };

        opts.compression = args.compression.or_else(|| {
            config
                .file_loading
                .compression
                .as_deref()
                .and_then(CompressionFormat::from_name)
        });

        opts.x_column = args
            .x_column
            .clone()
            .unwrap_or_else(|| config.pivot.x_column.clone());
        opts.y_column = args
            .y_column
            .clone()
            .unwrap_or_else(|| config.pivot.y_column.clone());
        opts.y_min = args.y_min.unwrap_or(config.pivot.y_min);
        opts.y_max = args.y_max.unwrap_or(config.pivot.y_max);

        opts.series = args.series.clone();
        opts.preset = args.preset.clone();

        // an explicit file implies persistence; otherwise only when enabled in the config
        opts.presets_file = args.presets_file.clone().or_else(|| {
            if !config.presets.persist {
                return None;
            }
            config.presets.file.clone().or_else(|| {
                ConfigManager::new(APP_NAME)
                    .ok()
                    .map(|m| m.config_path("presets.json"))
            })
        });

        opts.debug = args.debug || config.debug.enabled;

        opts.validate()?;
        Ok(opts)
    }

    /// Check the pivot settings before any file is read.
    pub fn validate(&self) -> Result<()> {
        if self.x_column.trim().is_empty() || self.y_column.trim().is_empty() {
            return Err(eyre!("x and y column names must not be empty"));
        }
        if !self.y_min.is_finite() || !self.y_max.is_finite() {
            return Err(eyre!(
                "y range must be finite, got {} to {}",
                self.y_min,
                self.y_max
            ));
        }
        if self.y_min > self.y_max {
            return Err(eyre!(
                "y_min ({}) must not be greater than y_max ({})",
                self.y_min,
                self.y_max
            ));
        }
        if self.delimiter.is_some_and(|d| !d.is_ascii()) {
            return Err(eyre!("delimiter must be a single ASCII character"));
        }
        Ok(())
    }

    pub fn pivot_spec(&self) -> PivotSpec {
        let spec = PivotSpec::new(self.x_column.clone(), self.y_column.clone())
            .with_y_range(self.y_min, self.y_max);
        match self.delimiter {
            Some(d) => spec.with_delimiter(d),
            None => spec,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf, OpenOptions),
    DoLoad(PathBuf, OpenOptions), // Internal event to actually perform loading after UI update
    Exit,
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading(PathBuf),
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Series,
    Grid,
    Presets,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Series => Focus::Grid,
            Focus::Grid => Focus::Presets,
            Focus::Presets => Focus::Series,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Series => Focus::Presets,
            Focus::Grid => Focus::Series,
            Focus::Presets => Focus::Grid,
        }
    }
}

pub struct App {
    path: Option<PathBuf>,
    load_state: LoadState,
    data: Option<PivotData>,
    report: Option<PivotReport>,
    dashboard: Dashboard,
    focus: Focus,
    focused_panel: Option<String>,
    selector: SeriesSelector,
    preset_list: PresetList,
    preset_file: Option<PresetFile>,
    status: Option<String>,
    show_help: bool,
    scroll: u16,
    row_height: u16,
    export_dir: PathBuf,
    debug: DebugState,
    theme: Theme,
    palette: ColorParser,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> App {
        Self::new_with_config(Theme::default(), AppConfig::default())
    }

    pub fn new_with_config(theme: Theme, app_config: AppConfig) -> App {
        let mut selector = SeriesSelector::new();
        selector.filter = std::mem::take(&mut selector.filter).with_theme(&theme);
        let mut preset_list = PresetList::new();
        preset_list.name_input = std::mem::take(&mut preset_list.name_input).with_theme(&theme);

        App {
            path: None,
            load_state: LoadState::NotLoaded,
            data: None,
            report: None,
            dashboard: Dashboard::new(app_config.grid_spec()),
            focus: Focus::Series,
            focused_panel: None,
            selector,
            preset_list,
            preset_file: None,
            status: None,
            show_help: false,
            scroll: 0,
            row_height: app_config.grid.row_height.max(1),
            export_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            debug: DebugState {
                enabled: app_config.debug.enabled,
                ..DebugState::default()
            },
            theme,
            palette: ColorParser::new(),
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn data(&self) -> Option<&PivotData> {
        self.data.as_ref()
    }

    pub fn report(&self) -> Option<&PivotReport> {
        self.report.as_ref()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn focused_panel(&self) -> Option<&str> {
        self.focused_panel.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// Directory PNG exports are written to (the working directory by default).
    pub fn set_export_dir(&mut self, dir: PathBuf) {
        self.export_dir = dir;
    }

    /// Placements currently on screen; empty unless a dataset is loaded.
    pub fn visible_panels(&self) -> &[PanelPlacement] {
        if self.load_state.is_loaded() {
            self.dashboard.arrangement()
        } else {
            &[]
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path, options) => {
                // show the loading state before the blocking read
                self.path = Some(path.clone());
                self.load_state = LoadState::Loading(path.clone());
                Some(AppEvent::DoLoad(path.clone(), options.clone()))
            }
            AppEvent::DoLoad(path, options) => {
                if let Err(e) = self.load(path, options) {
                    self.data = None;
                    self.report = None;
                    self.dashboard.set_options(Vec::new());
                    self.focused_panel = None;
                    self.load_state = LoadState::Failed(user_message_from_report(&e, Some(path.as_path())));
                }
                None
            }
            AppEvent::Resize(_cols, _rows) => None,
            AppEvent::Exit => None,
        }
    }

    fn load(&mut self, path: &Path, options: &OpenOptions) -> Result<()> {
        options.validate()?;
        let start = Instant::now();
        let text = source::read_dataset(path, options.compression)?;
        let output = build_pivot(&text, &options.pivot_spec())?;
        self.debug.load_ms = Some(start.elapsed().as_millis());
        self.debug.pivot_report = Some(output.report.summary());

        let mut warnings = Vec::new();

        if let Some(file) = &options.presets_file {
            let file = PresetFile::new(file.clone());
            match file.load() {
                Ok(presets) => self.dashboard.set_presets(presets),
                Err(e) => warnings.push(format!("Layouts not loaded: {}", e)),
            }
            self.preset_file = Some(file);
        }

        self.dashboard.set_options(output.data.series_names());
        if !options.series.is_empty() {
            self.dashboard.set_selection(&options.series);
            let missing: Vec<&str> = options
                .series
                .iter()
                .map(String::as_str)
                .filter(|s| !self.dashboard.is_selected(s))
                .collect();
            if !missing.is_empty() {
                warnings.push(format!("Unknown series: {}", missing.join(", ")));
            }
        }
        if let Some(name) = &options.preset {
            if !self.dashboard.select_preset(name) {
                warnings.push(format!("No layout named '{}'", name));
            }
        }

        self.status = Some(if warnings.is_empty() {
            let report = &output.report;
            let dropped = report.malformed_rows + report.rejected_rows;
            if dropped > 0 {
                format!(
                    "{} series, {} rows used ({} skipped)",
                    output.data.series.len(),
                    report.rows_used(),
                    dropped
                )
            } else {
                format!(
                    "{} series, {} rows used",
                    output.data.series.len(),
                    report.rows_used()
                )
            }
        } else {
            warnings.join("; ")
        });

        self.report = Some(output.report);
        self.data = Some(output.data);
        self.load_state = LoadState::Loaded;
        self.scroll = 0;
        self.selector.clamp(self.dashboard.options());
        self.ensure_focused_panel();
        Ok(())
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        if self.preset_list.naming {
            self.preset_name_key(event);
            return None;
        }
        if self.selector.filtering {
            self.filter_key(event);
            return None;
        }

        if self.show_help {
            if matches!(event.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            } else if event.code == KeyCode::Char('q') {
                return Some(AppEvent::Exit);
            }
            return None;
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('?') => {
                self.show_help = true;
                return None;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return None;
            }
            _ => {}
        }

        if !self.load_state.is_loaded() {
            return None;
        }

        match self.focus {
            Focus::Series => self.series_key(event),
            Focus::Grid => self.grid_key(event),
            Focus::Presets => self.presets_key(event),
        }
        None
    }

    fn series_key(&mut self, event: &KeyEvent) {
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selector.move_cursor(-1, self.dashboard.options())
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selector.move_cursor(1, self.dashboard.options())
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(name) = self.selector.current(self.dashboard.options()) {
                    let name = name.to_string();
                    let now_selected = self.dashboard.toggle(&name);
                    self.debug.last_action = "toggle_series".to_string();
                    if now_selected && self.focused_panel.is_none() {
                        self.focused_panel = Some(name);
                    }
                    self.ensure_focused_panel();
                }
            }
            KeyCode::Char('/') => self.selector.start_filter(),
            _ => {}
        }
    }

    fn filter_key(&mut self, event: &KeyEvent) {
        match self.selector.filter.handle_key(event) {
            TextInputEvent::Submit => self.selector.finish_filter(true),
            TextInputEvent::Cancel => self.selector.finish_filter(false),
            TextInputEvent::None => self.selector.clamp(self.dashboard.options()),
        }
    }

    fn grid_key(&mut self, event: &KeyEvent) {
        let Some(series) = self.focused_panel.clone() else {
            return;
        };
        let nav = match event.code {
            KeyCode::Left | KeyCode::Char('h') => Some(Nav::Left),
            KeyCode::Right | KeyCode::Char('l') => Some(Nav::Right),
            KeyCode::Up | KeyCode::Char('k') => Some(Nav::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Nav::Down),
            _ => None,
        };
        if let Some(nav) = nav {
            if let Some(next) = self.dashboard.neighbor(&series, nav) {
                self.focused_panel = Some(next.to_string());
            }
            return;
        }

        let changed = match event.code {
            KeyCode::Char('H') => self.dashboard.move_panel(&series, -1, 0),
            KeyCode::Char('L') => self.dashboard.move_panel(&series, 1, 0),
            KeyCode::Char('K') => self.dashboard.move_panel(&series, 0, -1),
            KeyCode::Char('J') => self.dashboard.move_panel(&series, 0, 1),
            KeyCode::Char('+') | KeyCode::Char('=') => self.dashboard.resize_panel(&series, 0, 1),
            KeyCode::Char('-') => self.dashboard.resize_panel(&series, 0, -1),
            KeyCode::Char('>') | KeyCode::Char('.') => self.dashboard.resize_panel(&series, 1, 0),
            KeyCode::Char('<') | KeyCode::Char(',') => self.dashboard.resize_panel(&series, -1, 0),
            KeyCode::Char('x') | KeyCode::Delete => {
                self.dashboard.deselect(&series);
                self.focused_panel = None;
                self.ensure_focused_panel();
                true
            }
            KeyCode::Char('e') => {
                self.export_panel(&series);
                false
            }
            _ => false,
        };
        if changed {
            self.debug.last_action = format!("arrange {}", series);
        }
    }

    fn export_panel(&mut self, series: &str) {
        let Some(data) = &self.data else {
            return;
        };
        let Some(matrix) = data.matrix(series) else {
            return;
        };
        let path = export_path(&self.export_dir, series);
        let export = HeatmapExport {
            series,
            x_label: &data.x_column,
            y_label: &data.y_column,
            x_values: &data.x_values,
            y_values: &data.y_values,
            matrix,
        };
        self.status = Some(match write_heatmap_png(&path, &export) {
            Ok(()) => format!("Exported {}", path.display()),
            Err(e) => format!("Export failed: {}", user_message_from_report(&e, None)),
        });
        self.debug.last_action = "export_png".to_string();
    }

    fn presets_key(&mut self, event: &KeyEvent) {
        let len = self.dashboard.presets().len();
        match event.code {
            KeyCode::Char('s') => self.preset_list.start_naming(),
            KeyCode::Up | KeyCode::Char('k') => self.preset_list.move_cursor(-1, len),
            KeyCode::Down | KeyCode::Char('j') => self.preset_list.move_cursor(1, len),
            KeyCode::Enter => {
                if let Some(name) = self.preset_list.current(self.dashboard.presets()) {
                    let name = name.to_string();
                    if self.dashboard.select_preset(&name) {
                        self.status = Some(format!("Applied layout '{}'", name));
                        self.debug.last_action = "select_preset".to_string();
                        self.ensure_focused_panel();
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(name) = self.preset_list.current(self.dashboard.presets()) {
                    let name = name.to_string();
                    let outcome = self.dashboard.delete_preset(&name);
                    self.status = Some(if outcome.was_active {
                        format!("Deleted layout '{}' and reset the arrangement", name)
                    } else {
                        format!("Deleted layout '{}'", name)
                    });
                    self.debug.last_action = "delete_preset".to_string();
                    self.preset_list
                        .move_cursor(0, self.dashboard.presets().len());
                    self.ensure_focused_panel();
                    self.persist_presets();
                }
            }
            _ => {}
        }
    }

    fn preset_name_key(&mut self, event: &KeyEvent) {
        match self.preset_list.name_input.handle_key(event) {
            TextInputEvent::Submit => {
                let name = self.preset_list.name_input.value().to_string();
                if self.dashboard.save_preset(&name) {
                    self.status = Some(format!("Saved layout '{}'", name));
                    self.debug.last_action = "save_preset".to_string();
                    self.preset_list.stop_naming();
                    self.persist_presets();
                } else {
                    self.status = Some("Layout name cannot be empty".to_string());
                }
            }
            TextInputEvent::Cancel => self.preset_list.stop_naming(),
            TextInputEvent::None => {}
        }
    }

    fn persist_presets(&mut self) {
        if let Some(file) = &self.preset_file {
            if let Err(e) = file.save(self.dashboard.presets().presets()) {
                self.status = Some(format!(
                    "Could not write {}: {}",
                    file.path().display(),
                    user_message_from_report(&e, None)
                ));
            }
        }
    }

    /// Keep the focused panel pointing at a panel that exists.
    fn ensure_focused_panel(&mut self) {
        let arrangement = self.dashboard.arrangement();
        let valid = self
            .focused_panel
            .as_deref()
            .is_some_and(|s| arrangement.iter().any(|p| p.series == s));
        if !valid {
            self.focused_panel = arrangement.first().map(|p| p.series.clone());
        }
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.preset_list.naming {
            return vec![("Enter", "Save"), ("Esc", "Cancel")];
        }
        if self.selector.filtering {
            return vec![("Enter", "Keep filter"), ("Esc", "Clear")];
        }
        let mut hints = match self.focus {
            Focus::Series => vec![("Tab", "Grid"), ("Space", "Toggle"), ("/", "Filter")],
            Focus::Grid => vec![
                ("Tab", "Layouts"),
                ("hjkl", "Focus"),
                ("HJKL", "Move"),
                ("+-<>", "Resize"),
                ("x", "Remove"),
                ("e", "Export"),
            ],
            Focus::Presets => vec![
                ("Tab", "Series"),
                ("s", "Save"),
                ("Enter", "Apply"),
                ("d", "Delete"),
            ],
        };
        hints.push(("?", "Help"));
        hints.push(("q", "Quit"));
        hints
    }

    fn render_main(&mut self, area: Rect, buf: &mut Buffer) {
        let title = match &self.path {
            Some(p) => format!(" {} ", p.display()),
            None => format!(" {} ", APP_NAME),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if self.focus == Focus::Grid {
                self.theme.get("panel_border_focused")
            } else {
                self.theme.get("panel_border")
            }))
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        match &self.load_state {
            LoadState::NotLoaded => {
                Paragraph::new("No dataset loaded")
                    .style(Style::default().fg(self.theme.get("text_secondary")))
                    .centered()
                    .render(inner, buf);
            }
            LoadState::Loading(path) => {
                let gauge_width = (inner.width / 3).max(20).min(inner.width);
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Fill(1), Constraint::Length(3), Constraint::Fill(1)])
                    .split(inner);
                let cols = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([
                        Constraint::Fill(1),
                        Constraint::Length(gauge_width),
                        Constraint::Fill(1),
                    ])
                    .split(rows[1]);
                Gauge::default()
                    .block(Block::default().borders(Borders::ALL).title("Loading"))
                    .gauge_style(Style::default().fg(self.theme.get("primary")))
                    .percent(50)
                    .label(
                        path.file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default(),
                    )
                    .render(cols[1], buf);
            }
            LoadState::Failed(message) => {
                let height = 7u16.min(inner.height);
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Fill(1),
                        Constraint::Length(height),
                        Constraint::Fill(1),
                    ])
                    .split(inner);
                Paragraph::new(message.as_str())
                    .wrap(Wrap { trim: true })
                    .style(Style::default().fg(self.theme.get("text_primary")))
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(self.theme.get("error")))
                            .title(" Could not load data ".bold()),
                    )
                    .render(rows[1], buf);
            }
            LoadState::Loaded => {
                let Some(data) = &self.data else {
                    return;
                };
                let visible_rows = inner.height / self.row_height;
                if let Some(placement) = self
                    .focused_panel
                    .as_deref()
                    .and_then(|s| self.dashboard.layout().get(s))
                {
                    self.scroll = scroll_to_show(placement, self.scroll, visible_rows);
                }
                GridView {
                    placements: self.dashboard.arrangement(),
                    data,
                    cols: self.dashboard.grid_spec().cols,
                    row_height: self.row_height,
                    scroll: self.scroll,
                    focused: if self.focus == Focus::Grid {
                        self.focused_panel.as_deref()
                    } else {
                        None
                    },
                    theme: &self.theme,
                    palette: &self.palette,
                }
                .render(inner, buf);
            }
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
            .split(layout[0]);
        let sidebar = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(PRESET_LIST_HEIGHT)])
            .split(columns[0]);

        let dashboard = &self.dashboard;
        self.selector.render(
            sidebar[0],
            buf,
            dashboard.options(),
            |s| dashboard.is_selected(s),
            self.focus == Focus::Series,
            &self.theme,
        );
        self.preset_list.render(
            sidebar[1],
            buf,
            dashboard.presets(),
            self.focus == Focus::Presets,
            &self.theme,
        );

        self.render_main(columns[1], buf);

        let mut controls = Controls::new(self.hints())
            .with_background(self.theme.get("controls_bg"))
            .with_dimmed(self.show_help);
        if let Some(status) = &self.status {
            controls = controls.with_status(format!("{} ", status));
        }
        (&controls).render(layout[1], buf);

        if self.debug.enabled {
            (&self.debug).render(layout[2], buf);
        }

        if self.show_help {
            Help { theme: &self.theme }.render(area, buf);
        }
    }
}

/// Run the terminal UI on `args.path` until the user quits.
pub fn run(args: &Args, config: AppConfig) -> Result<()> {
    color_eyre::install()?;

    let path = args
        .path
        .clone()
        .ok_or_else(|| eyre!("A data file path is required"))?;
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )
        .into());
    }

    let opts = OpenOptions::from_args_and_config(args, &config)?;
    let theme = Theme::from_config(&config.theme)?;
    let poll_interval = std::time::Duration::from_millis(config.performance.event_poll_interval_ms);

    let mut terminal = ratatui::try_init().map_err(|e| {
        eyre!(
            "heatgrid requires an interactive terminal (TTY). No terminal detected: {}",
            e
        )
    })?;
    let (tx, rx) = mpsc::channel::<AppEvent>();
    let mut app = App::new_with_config(theme, config);
    if opts.debug {
        app.enable_debug();
    }

    let result = event_loop(&mut terminal, &mut app, &tx, &rx, path, opts, poll_interval);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    tx: &Sender<AppEvent>,
    rx: &mpsc::Receiver<AppEvent>,
    path: PathBuf,
    opts: OpenOptions,
    poll_interval: std::time::Duration,
) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(&mut *app, frame.area()))?;
    tx.send(AppEvent::Open(path, opts))?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => {
                    if key.is_press() {
                        tx.send(AppEvent::Key(key))?
                    }
                }
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        // drain everything queued so Open renders "Loading" before DoLoad blocks
        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(next) = app.event(&event) {
                            tx.send(next)?;
                        }
                    }
                }
                true
            }
            Err(mpsc::RecvTimeoutError::Timeout) => false,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            terminal.draw(|frame| frame.render_widget(&mut *app, frame.area()))?;
        }
    }
    Ok(())
}
