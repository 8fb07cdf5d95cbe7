//! Panel placements on a column grid with vertical compaction.
//!
//! Coordinates are grid units: `x` is a column in `0..cols`, `y` a row counted from the top.
//! After every change panels are packed upwards as far as they go without overlapping, the
//! way a dashboard grid with vertical compaction behaves when panels are dragged around.

use serde::{Deserialize, Serialize};

/// Where one series' panel sits on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPlacement {
    pub series: String,
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl PanelPlacement {
    pub fn new(series: impl Into<String>, x: u16, y: u16, w: u16, h: u16) -> Self {
        Self {
            series: series.into(),
            x,
            y,
            w,
            h,
        }
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    /// True when the two rectangles share at least one grid cell.
    pub fn overlaps(&self, other: &PanelPlacement) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    fn shares_columns(&self, other: &PanelPlacement) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// Doubled centre, to stay in integers.
    fn center2(&self) -> (i32, i32) {
        (
            2 * self.x as i32 + self.w as i32,
            2 * self.y as i32 + self.h as i32,
        )
    }
}

/// Grid dimensions and the size given to newly placed panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub cols: u16,
    pub default_w: u16,
    pub default_h: u16,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            cols: 12,
            default_w: 4,
            default_h: 4,
        }
    }
}

impl GridSpec {
    /// Column of the k-th panel placed by default: `(k * default_w) mod cols`,
    /// pulled left when the panel would not fit.
    pub fn default_column(&self, k: usize) -> u16 {
        let cols = self.cols.max(1) as usize;
        let w = self.default_w.clamp(1, self.cols.max(1));
        let x = (k * w as usize) % cols;
        (x as u16).min(self.cols.max(1) - w)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Left,
    Right,
    Up,
    Down,
}

/// Ordered list of placements plus the grid they live on.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    spec: GridSpec,
    items: Vec<PanelPlacement>,
}

impl GridLayout {
    pub fn new(spec: GridSpec) -> Self {
        Self {
            spec,
            items: Vec::new(),
        }
    }

    /// Adopt existing placements (e.g. from a preset), clamped to the grid and compacted.
    pub fn from_placements(spec: GridSpec, placements: Vec<PanelPlacement>) -> Self {
        let mut layout = Self {
            spec,
            items: Vec::with_capacity(placements.len()),
        };
        for p in placements {
            if layout.contains(&p.series) {
                continue;
            }
            layout.items.push(p);
        }
        for i in 0..layout.items.len() {
            layout.clamp_item(i);
        }
        layout.compact(None);
        layout
    }

    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    pub fn placements(&self) -> &[PanelPlacement] {
        &self.items
    }

    pub fn to_placements(&self) -> Vec<PanelPlacement> {
        self.items.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, series: &str) -> Option<&PanelPlacement> {
        self.items.iter().find(|p| p.series == series)
    }

    pub fn contains(&self, series: &str) -> bool {
        self.get(series).is_some()
    }

    fn index_of(&self, series: &str) -> Option<usize> {
        self.items.iter().position(|p| p.series == series)
    }

    /// Lowest occupied row boundary; 0 for an empty grid.
    pub fn bottom(&self) -> u16 {
        self.items.iter().map(|p| p.bottom()).max().unwrap_or(0)
    }

    /// Place `series` as the k-th default panel: default column, bottom of the grid,
    /// then compacted up to the first free slot in its columns.
    pub fn place_default(&mut self, series: &str, k: usize) {
        if self.contains(series) {
            return;
        }
        let w = self.spec.default_w.clamp(1, self.spec.cols.max(1));
        let h = self.spec.default_h.max(1);
        let x = self.spec.default_column(k);
        let y = self.bottom();
        self.items.push(PanelPlacement::new(series, x, y, w, h));
        self.compact(None);
    }

    pub fn remove(&mut self, series: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.series != series);
        let removed = self.items.len() != before;
        if removed {
            self.compact(None);
        }
        removed
    }

    /// Keep only placements whose series satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.items.retain(|p| keep(&p.series));
        self.compact(None);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Move a panel by whole grid units. Vertical moves swap with the nearest panel
    /// in that direction; horizontal moves are clamped to the grid.
    pub fn move_by(&mut self, series: &str, dx: i32, dy: i32) -> bool {
        let Some(idx) = self.index_of(series) else {
            return false;
        };
        let before = self.items.clone();

        if dx != 0 {
            let max_x = self.spec.cols.saturating_sub(self.items[idx].w) as i32;
            self.items[idx].x = (self.items[idx].x as i32 + dx).clamp(0, max_x) as u16;
        }

        if dy > 0 {
            let current = self.items[idx].clone();
            let below = self
                .items
                .iter()
                .filter(|p| p.series != series && p.shares_columns(&current) && p.y >= current.y)
                .min_by_key(|p| p.y)
                .map(|p| p.y);
            self.items[idx].y = match below {
                Some(y) => y.saturating_add(1),
                None => current.y.saturating_add(dy as u16),
            };
        } else if dy < 0 {
            let current = self.items[idx].clone();
            let above = self
                .items
                .iter()
                .filter(|p| p.series != series && p.shares_columns(&current) && p.y < current.y)
                .max_by_key(|p| p.y)
                .map(|p| p.y);
            self.items[idx].y = above.unwrap_or(0);
        }

        self.compact(Some(series));
        self.items != before
    }

    /// Grow or shrink a panel. Width is clamped to the columns right of it, height to at least 1.
    pub fn resize_by(&mut self, series: &str, dw: i32, dh: i32) -> bool {
        let Some(idx) = self.index_of(series) else {
            return false;
        };
        let before = self.items.clone();
        let item = &mut self.items[idx];
        let max_w = self.spec.cols.saturating_sub(item.x).max(1) as i32;
        item.w = (item.w as i32 + dw).clamp(1, max_w) as u16;
        item.h = (item.h as i32 + dh).clamp(1, u16::MAX as i32) as u16;
        self.compact(Some(series));
        self.items != before
    }

    fn clamp_item(&mut self, idx: usize) {
        let cols = self.spec.cols.max(1);
        let item = &mut self.items[idx];
        item.w = item.w.clamp(1, cols);
        item.h = item.h.max(1);
        item.x = item.x.min(cols - item.w);
    }

    /// Pack every panel upwards. Panels are processed top to bottom; `priority` wins ties
    /// on the same row so a moved panel keeps the spot it was moved to.
    pub fn compact(&mut self, priority: Option<&str>) {
        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by_key(|&i| {
            let p = &self.items[i];
            (p.y, Some(p.series.as_str()) != priority, p.x)
        });

        let mut placed: Vec<PanelPlacement> = Vec::with_capacity(self.items.len());
        for i in order {
            let mut item = self.items[i].clone();
            while item.y > 0 {
                let mut probe = item.clone();
                probe.y -= 1;
                if placed.iter().any(|p| p.overlaps(&probe)) {
                    break;
                }
                item.y = probe.y;
            }
            while let Some(bottom) = placed
                .iter()
                .filter(|p| p.overlaps(&item))
                .map(|p| p.bottom())
                .max()
            {
                item.y = bottom;
            }
            placed.push(item.clone());
            self.items[i] = item;
        }
    }

    /// Nearest panel from `series` in the given direction.
    pub fn neighbor(&self, series: &str, nav: Nav) -> Option<&str> {
        let current = self.get(series)?;
        let (cx, cy) = current.center2();
        self.items
            .iter()
            .filter(|p| p.series != series)
            .filter_map(|p| {
                let (px, py) = p.center2();
                let (primary, secondary) = match nav {
                    Nav::Left => (cx - px, (py - cy).abs()),
                    Nav::Right => (px - cx, (py - cy).abs()),
                    Nav::Up => (cy - py, (px - cx).abs()),
                    Nav::Down => (py - cy, (px - cx).abs()),
                };
                (primary > 0).then_some((primary + 2 * secondary, p.series.as_str()))
            })
            .min_by_key(|(score, _)| *score)
            .map(|(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_with(names: &[&str]) -> GridLayout {
        let mut layout = GridLayout::new(GridSpec::default());
        for (k, name) in names.iter().enumerate() {
            layout.place_default(name, k);
        }
        layout
    }

    fn assert_no_overlaps(layout: &GridLayout) {
        let items = layout.placements();
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn default_column_wraps_every_three_panels() {
        let spec = GridSpec::default();
        let cols: Vec<u16> = (0..5).map(|k| spec.default_column(k)).collect();
        assert_eq!(cols, vec![0, 4, 8, 0, 4]);
    }

    #[test]
    fn default_column_stays_inside_grid() {
        let spec = GridSpec {
            cols: 10,
            default_w: 4,
            default_h: 4,
        };
        assert_eq!(spec.default_column(2), 6);
    }

    #[test]
    fn default_placement_fills_rows() {
        let layout = layout_with(&["a", "b", "c", "d"]);
        let pos: Vec<(u16, u16)> = layout.placements().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(pos, vec![(0, 0), (4, 0), (8, 0), (0, 4)]);
        assert!(layout.placements().iter().all(|p| p.w == 4 && p.h == 4));
    }

    #[test]
    fn default_placement_uses_first_free_slot_in_columns() {
        let mut layout = layout_with(&["a", "b", "c"]);
        layout.resize_by("a", 0, 4);
        layout.place_default("d", 4);
        let d = layout.get("d").unwrap();
        assert_eq!((d.x, d.y), (4, 4));
    }

    #[test]
    fn remove_compacts_upwards() {
        let mut layout = layout_with(&["a", "b", "c", "d"]);
        assert!(layout.remove("a"));
        assert_eq!(layout.get("d").map(|p| p.y), Some(0));
        assert!(!layout.remove("missing"));
    }

    #[test]
    fn move_right_is_clamped() {
        let mut layout = layout_with(&["a"]);
        layout.move_by("a", 20, 0);
        assert_eq!(layout.get("a").map(|p| p.x), Some(8));
        layout.move_by("a", -20, 0);
        assert_eq!(layout.get("a").map(|p| p.x), Some(0));
    }

    #[test]
    fn move_down_swaps_with_panel_below() {
        let mut layout = layout_with(&["a", "b", "c", "d"]);
        assert!(layout.move_by("a", 0, 1));
        assert_eq!(layout.get("d").map(|p| p.y), Some(0));
        assert_eq!(layout.get("a").map(|p| p.y), Some(4));
        assert_no_overlaps(&layout);
    }

    #[test]
    fn move_up_swaps_with_panel_above() {
        let mut layout = layout_with(&["a", "b", "c", "d"]);
        assert!(layout.move_by("d", 0, -1));
        assert_eq!(layout.get("d").map(|p| p.y), Some(0));
        assert_eq!(layout.get("a").map(|p| p.y), Some(4));
        assert_no_overlaps(&layout);
    }

    #[test]
    fn move_down_without_panel_below_stays_compacted() {
        let mut layout = layout_with(&["a"]);
        assert!(!layout.move_by("a", 0, 3));
        assert_eq!(layout.get("a").map(|p| p.y), Some(0));
    }

    #[test]
    fn sideways_move_pushes_overlapped_panel_down() {
        let mut layout = layout_with(&["a", "b"]);
        layout.move_by("a", 2, 0);
        let a = layout.get("a").unwrap();
        assert_eq!((a.x, a.y), (2, 0));
        assert_eq!(layout.get("b").map(|p| p.y), Some(4));
        assert_no_overlaps(&layout);
    }

    #[test]
    fn resize_clamps_width_and_height() {
        let mut layout = layout_with(&["a", "b"]);
        layout.resize_by("b", 100, -100);
        let b = layout.get("b").unwrap();
        assert_eq!((b.w, b.h), (8, 1));
        layout.resize_by("a", -100, 0);
        assert_eq!(layout.get("a").map(|p| p.w), Some(1));
        assert_no_overlaps(&layout);
    }

    #[test]
    fn from_placements_clamps_and_compacts() {
        let layout = GridLayout::from_placements(
            GridSpec::default(),
            vec![
                PanelPlacement::new("a", 11, 7, 6, 0),
                PanelPlacement::new("a", 0, 0, 1, 1),
                PanelPlacement::new("b", 0, 30, 4, 4),
            ],
        );
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.get("a"), Some(&PanelPlacement::new("a", 6, 0, 6, 1)));
        assert_eq!(layout.get("b"), Some(&PanelPlacement::new("b", 0, 0, 4, 4)));
    }

    #[test]
    fn neighbor_navigation() {
        let layout = layout_with(&["a", "b", "c", "d"]);
        assert_eq!(layout.neighbor("a", Nav::Right), Some("b"));
        assert_eq!(layout.neighbor("b", Nav::Left), Some("a"));
        assert_eq!(layout.neighbor("a", Nav::Down), Some("d"));
        assert_eq!(layout.neighbor("d", Nav::Up), Some("a"));
        assert_eq!(layout.neighbor("a", Nav::Left), None);
        assert_eq!(layout.neighbor("missing", Nav::Left), None);
    }
}
