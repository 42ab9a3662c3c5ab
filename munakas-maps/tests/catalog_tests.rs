use std::fs;
use std::path::Path;

use munakas_maps::{MapCatalog, MapsError};
use tempfile::tempdir;

fn write_map(dir: &Path, stem: &str, config: &str) {
    fs::write(dir.join(format!("{}.txt", stem)), config).unwrap();
    fs::write(dir.join(format!("{}.png", stem)), b"\x89PNG").unwrap();
}

#[test]
fn test_scan_parses_each_map() {
    let temp_dir = tempdir().unwrap();
    write_map(temp_dir.path(), "de_dust2", "\"pos_x\" \"-2476\"\n\"pos_y\" \"3239\"\n\"scale\" \"4.4\"\n");
    write_map(temp_dir.path(), "de_mirage", "\"pos_x\" \"-3230\"\n");

    let maps = MapCatalog::new(temp_dir.path()).scan().unwrap();

    assert_eq!(maps.len(), 2);
    assert_eq!(maps[0].id, "de_dust2");
    assert_eq!(maps[0].name, "Dust2");
    assert_eq!(maps[0].origin_x, -2476.0);
    assert_eq!(maps[0].scale, 4.4);
    assert_eq!(maps[1].id, "de_mirage");
    assert_eq!(maps[1].scale, 1.0);
}

#[test]
fn test_missing_image_skips_only_that_map() {
    let temp_dir = tempdir().unwrap();
    write_map(temp_dir.path(), "de_inferno", "\"scale\" \"4.9\"\n");
    fs::write(temp_dir.path().join("de_orphan.txt"), "\"scale\" \"2\"\n").unwrap();

    let maps = MapCatalog::new(temp_dir.path()).scan().unwrap();

    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].id, "de_inferno");
}

#[test]
fn test_case_variants_collapse_to_one_entry() {
    let temp_dir = tempdir().unwrap();
    write_map(temp_dir.path(), "DE_DUST2", "\"scale\" \"5\"\n");
    write_map(temp_dir.path(), "de_dust2", "\"scale\" \"4.4\"\n");

    let maps = MapCatalog::new(temp_dir.path()).scan().unwrap();

    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].id, "de_dust2");
    // Sorted file-name order puts the upper-case variant first
    assert_eq!(maps[0].scale, 5.0);
}

#[test]
fn test_unreadable_config_yields_defaults() {
    let temp_dir = tempdir().unwrap();
    // A directory with a .txt name cannot be read as a file
    fs::create_dir(temp_dir.path().join("de_vertigo.txt")).unwrap();
    fs::write(temp_dir.path().join("de_vertigo.png"), b"\x89PNG").unwrap();

    let maps = MapCatalog::new(temp_dir.path()).scan().unwrap();

    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].id, "de_vertigo");
    assert_eq!(maps[0].name, "Vertigo");
    assert_eq!(maps[0].scale, 1.0);
    assert_eq!(maps[0].origin_x, 0.0);
}

#[test]
fn test_layer_variants_and_other_files_ignored() {
    let temp_dir = tempdir().unwrap();
    write_map(temp_dir.path(), "de_nuke", "\"scale\" \"7\"\n");
    write_map(temp_dir.path(), "de_nuke_lower", "\"scale\" \"7\"\n");
    fs::write(temp_dir.path().join("readme.md"), "notes").unwrap();

    let maps = MapCatalog::new(temp_dir.path()).scan().unwrap();

    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].id, "de_nuke");
}

#[test]
fn test_custom_image_extension() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("de_ancient.txt"), "").unwrap();
    fs::write(temp_dir.path().join("de_ancient.webp"), b"RIFF").unwrap();

    let maps = MapCatalog::with_image_extension(temp_dir.path(), ".webp")
        .scan()
        .unwrap();

    assert_eq!(maps.len(), 1);
}

#[test]
fn test_missing_asset_dir_is_error() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope");

    let result = MapCatalog::new(&missing).scan();

    assert!(matches!(result, Err(MapsError::AssetDirMissing(_))));
}
