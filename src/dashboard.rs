//! Series selection, the active panel arrangement and the preset store, kept consistent.
//!
//! Every selected series has exactly one panel. A series that gains a panel without a
//! placement in the active arrangement is given the default one for its position in the
//! selection; a series that leaves the selection loses its panel and its placement.

use crate::layout::{GridLayout, GridSpec, Nav, PanelPlacement};
use crate::presets::{DeleteOutcome, LayoutPreset, PresetStore};

#[derive(Debug, Clone)]
pub struct Dashboard {
    options: Vec<String>,
    selected: Vec<String>,
    layout: GridLayout,
    presets: PresetStore,
}

impl Dashboard {
    pub fn new(grid: GridSpec) -> Self {
        Self {
            options: Vec::new(),
            selected: Vec::new(),
            layout: GridLayout::new(grid),
            presets: PresetStore::new(),
        }
    }

    pub fn grid_spec(&self) -> GridSpec {
        self.layout.spec()
    }

    /// Series that can be selected, in dataset order.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Replace the selectable series (after a dataset load). Selected series that no longer
    /// exist are dropped.
    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
        let options = &self.options;
        self.selected.retain(|s| options.contains(s));
        self.reconcile();
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, series: &str) -> bool {
        self.selected.iter().any(|s| s == series)
    }

    /// Set the whole selection at once. Unknown and repeated names are ignored.
    pub fn set_selection<I, S>(&mut self, series: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: Vec<String> = Vec::new();
        for name in series {
            let name = name.as_ref();
            if self.options.iter().any(|o| o == name) && !selected.iter().any(|s| s == name) {
                selected.push(name.to_string());
            }
        }
        self.selected = selected;
        self.reconcile();
    }

    /// Add or remove one series. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, series: &str) -> bool {
        if self.is_selected(series) {
            self.deselect(series);
            false
        } else if self.options.iter().any(|o| o == series) {
            self.selected.push(series.to_string());
            self.reconcile();
            true
        } else {
            false
        }
    }

    pub fn deselect(&mut self, series: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s != series);
        let removed = self.selected.len() != before;
        if removed {
            self.reconcile();
        }
        removed
    }

    /// Placements of the panels on screen.
    pub fn arrangement(&self) -> &[PanelPlacement] {
        self.layout.placements()
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn move_panel(&mut self, series: &str, dx: i32, dy: i32) -> bool {
        self.layout.move_by(series, dx, dy)
    }

    pub fn resize_panel(&mut self, series: &str, dw: i32, dh: i32) -> bool {
        self.layout.resize_by(series, dw, dh)
    }

    pub fn neighbor(&self, series: &str, nav: Nav) -> Option<&str> {
        self.layout.neighbor(series, nav)
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    /// Replace the preset collection (e.g. from a preset file). No preset is active afterwards.
    pub fn set_presets(&mut self, presets: Vec<LayoutPreset>) {
        self.presets = PresetStore::from_presets(presets);
    }

    /// Save the current arrangement under `name`. Blank names are ignored.
    pub fn save_preset(&mut self, name: &str) -> bool {
        let arrangement = self.layout.to_placements();
        self.presets.save(name, &arrangement)
    }

    /// Apply a preset's arrangement. Unknown names leave everything unchanged.
    pub fn select_preset(&mut self, name: &str) -> bool {
        let spec = self.layout.spec();
        match self.presets.select(name) {
            Some(placements) => {
                self.layout = GridLayout::from_placements(spec, placements.to_vec());
                self.reconcile();
                true
            }
            None => false,
        }
    }

    /// Delete presets called `name`. When the active preset goes, its arrangement goes
    /// with it and the selected panels fall back to default placement.
    pub fn delete_preset(&mut self, name: &str) -> DeleteOutcome {
        let outcome = self.presets.delete(name);
        if outcome.was_active {
            self.layout.clear();
            self.reconcile();
        }
        outcome
    }

    fn reconcile(&mut self) {
        let selected = &self.selected;
        self.layout.retain(|s| selected.iter().any(|sel| sel == s));
        for (k, series) in self.selected.iter().enumerate() {
            if !self.layout.contains(series) {
                self.layout.place_default(series, k);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard() -> Dashboard {
        let mut d = Dashboard::new(GridSpec::default());
        d.set_options(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        d
    }

    #[test]
    fn nothing_selected_means_no_panels() {
        let d = dashboard();
        assert!(d.arrangement().is_empty());
    }

    #[test]
    fn selection_creates_default_panels() {
        let mut d = dashboard();
        d.set_selection(["a", "b", "c", "d"]);
        let pos: Vec<(&str, u16, u16)> = d
            .arrangement()
            .iter()
            .map(|p| (p.series.as_str(), p.x, p.y))
            .collect();
        assert_eq!(
            pos,
            vec![("a", 0, 0), ("b", 4, 0), ("c", 8, 0), ("d", 0, 4)]
        );
    }

    #[test]
    fn unknown_and_repeated_names_are_ignored() {
        let mut d = dashboard();
        d.set_selection(["a", "zzz", "a"]);
        assert_eq!(d.selected(), &["a".to_string()]);
        assert!(!d.toggle("zzz"));
    }

    #[test]
    fn readding_a_series_forgets_its_position() {
        let mut d = dashboard();
        d.set_selection(["a"]);
        d.move_panel("a", 5, 0);
        assert_eq!(d.layout().get("a").map(|p| p.x), Some(5));
        assert!(!d.toggle("a"));
        assert!(d.arrangement().is_empty());
        assert!(d.toggle("a"));
        assert_eq!(d.layout().get("a").map(|p| p.x), Some(0));
    }

    #[test]
    fn set_options_drops_vanished_selection() {
        let mut d = dashboard();
        d.set_selection(["a", "b"]);
        d.set_options(vec!["b".into()]);
        assert_eq!(d.selected(), &["b".to_string()]);
        assert_eq!(d.arrangement().len(), 1);
    }

    #[test]
    fn preset_for_unselected_series_only_places_selected() {
        let mut d = dashboard();
        d.set_selection(["a", "b"]);
        d.move_panel("b", 4, 0);
        assert!(d.save_preset("wide"));
        d.set_selection(["b", "c"]);
        assert!(d.select_preset("wide"));
        let b = d.layout().get("b").unwrap();
        assert_eq!(b.x, 8);
        assert!(d.layout().get("a").is_none());
        assert!(d.layout().get("c").is_some());
    }
}
