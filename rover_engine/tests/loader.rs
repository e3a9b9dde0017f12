use std::fs;
use std::path::Path;

use rover_data::CellMarker;
use rover_engine::loader::{LEVELS_FILE, load_catalog_from, parse_catalog};
use rover_engine::world::MissionState;

#[test]
fn shipped_catalog_is_playable() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(LEVELS_FILE);
    let catalog = load_catalog_from(&path).unwrap();
    assert!(catalog.level_count() >= 3);
    assert_eq!(catalog.settings.bytes_per_char, 8);

    for (idx, def) in catalog.levels.iter().enumerate() {
        let number = u32::try_from(idx + 1).unwrap();
        let state = MissionState::from_level(number, def).unwrap();
        assert!(state.sample_site.is_some(), "level {number} has no sample");
        assert!(state.base.is_some(), "level {number} has no base");
        assert_eq!(state.grid.count(CellMarker::Rover), 1);
    }
}

#[test]
fn catalog_loads_from_any_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(
        &path,
        r#"
            [settings]
            energy_per_move = 3
            seed = 7

            [[levels]]
            name = "Scratch"
            memory = 400
            battery = 90
            executions = 2
            map = ["[R] [S] [B]"]
        "#,
    )
    .unwrap();

    let catalog = load_catalog_from(&path).unwrap();
    assert_eq!(catalog.settings.energy_per_move, 3);
    assert_eq!(catalog.settings.seed, Some(7));
    assert_eq!(catalog.settings.bytes_per_char, 8);
    assert_eq!(catalog.level(1).unwrap().name, "Scratch");
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = load_catalog_from(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn malformed_markers_are_reported() {
    let err = parse_catalog(
        r#"
            [[levels]]
            memory = 100
            battery = 50
            executions = 1
            map = ["[R] [Q]"]
        "#,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("[Q]"));
}
