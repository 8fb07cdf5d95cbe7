use heatgrid::layout::{GridSpec, PanelPlacement};
use heatgrid::presets::{LayoutPreset, PresetFile, PresetStore};
use heatgrid::Dashboard;

fn grid(series: &[&str]) -> Vec<PanelPlacement> {
    series
        .iter()
        .enumerate()
        .map(|(i, s)| PanelPlacement::new(*s, (i as u16 * 4) % 12, 0, 4, 4))
        .collect()
}

#[test]
fn whitespace_names_leave_the_store_unchanged() {
    let mut store = PresetStore::new();
    store.save("keep", &grid(&["a"]));
    assert!(!store.save(" ", &grid(&["b"])));
    assert!(!store.save("\n\t", &grid(&["b"])));
    assert_eq!(store.names(), vec!["keep"]);
}

#[test]
fn saved_arrangement_is_a_snapshot() {
    let mut store = PresetStore::new();
    let mut arrangement = grid(&["a", "b"]);
    store.save("two", &arrangement);
    arrangement[0].w = 12;
    assert_eq!(store.get("two").unwrap().placements[0].w, 4);
}

#[test]
fn deleting_the_active_preset_deactivates_it() {
    let mut store = PresetStore::new();
    store.save("one", &grid(&["a"]));
    store.select("one");
    let outcome = store.delete("one");
    assert!(outcome.was_active);
    assert_eq!(outcome.removed, 1);
    assert_eq!(store.active_name(), None);
    assert!(store.is_empty());
}

#[test]
fn presets_survive_a_restart_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = PresetFile::new(dir.path().join("presets.json"));

    let mut first = Dashboard::new(GridSpec::default());
    first.set_options(vec!["LCOW".to_string(), "Total cost".to_string()]);
    first.set_selection(["LCOW", "Total cost"]);
    first.resize_panel("LCOW", 2, 0);
    first.save_preset("wide lcow");
    file.save(first.presets().presets()).unwrap();
    let saved = first.arrangement().to_vec();

    let mut second = Dashboard::new(GridSpec::default());
    second.set_options(vec!["LCOW".to_string(), "Total cost".to_string()]);
    second.set_presets(file.load().unwrap());
    second.set_selection(["LCOW", "Total cost"]);
    assert!(second.select_preset("wide lcow"));
    assert_eq!(second.arrangement(), saved.as_slice());
}

#[test]
fn file_keeps_duplicate_names_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let file = PresetFile::new(dir.path().join("presets.json"));
    let presets = vec![
        LayoutPreset::new("dup", grid(&["a"])),
        LayoutPreset::new("dup", grid(&["b"])),
    ];
    file.save(&presets).unwrap();

    let mut store = PresetStore::from_presets(file.load().unwrap());
    assert_eq!(store.len(), 2);
    assert_eq!(store.select("dup").unwrap()[0].series, "a");
}

#[test]
fn created_label_is_a_timestamp() {
    let preset = LayoutPreset::new("t", Vec::new());
    let label = preset.created_label();
    assert_eq!(label.len(), "2024-01-01 00:00".len());
    assert_eq!(&label[4..5], "-");
}
