use std::fs;

use agemap::{
    config::{ConfigLoader, MapConfig},
    layers::{LayerConfigBuilder, UndatedMode, ZoomRange},
};
use tempfile::tempdir;

fn loader() -> ConfigLoader {
    ConfigLoader::new(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn loads_bundled_columbus_map() {
    let config = loader().load("maps/columbus.yaml").expect("config parses");
    assert_eq!(config.name, "columbus");
    assert_eq!(config.zoom, ZoomRange::new(11, 15));
    assert_eq!(config.unknown.color, "gray");
    assert_eq!(config.stops.len(), 3);
    assert_eq!(config.undated, UndatedMode::Merged);
    assert_eq!(config.boundary.as_ref().map(|b| b.width), Some(1.5));
}

#[test]
fn omitted_fields_take_defaults() {
    let config = loader()
        .load("maps/columbus_stacked.yaml")
        .expect("config parses");
    assert_eq!(config.dataset, "buildings");
    assert_eq!(config.source_layer, "buildings");
    assert_eq!(config.unknown.sentinel, 0);
    assert_eq!(config.stops, MapConfig::gray_revision().stops);
    assert!(config.boundary.is_none());
    assert_eq!(
        config.tile_url(&config.dataset),
        "http://localhost:8080/data/buildings/{z}/{x}/{y}.pbf"
    );

    let set = LayerConfigBuilder::new(&config).build().unwrap();
    assert_eq!(set.layer_ids(), vec!["buildings-undated", "buildings"]);
}

#[test]
fn unsorted_stops_are_rejected_on_load() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("bad.yaml"),
        r##"
name: bad
unknown:
  color: gray
stops:
  - year: 1925
    color: "#4daf4a"
  - year: 1800
    color: "#e41a1c"
"##,
    )
    .unwrap();

    let err = ConfigLoader::new(dir.path()).load("bad.yaml").unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Invalid map config"), "{message}");
    assert!(message.contains("strictly increasing"), "{message}");
}

#[test]
fn inverted_zoom_is_rejected() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("zoom.yaml"),
        "name: zoom\nzoom:\n  min: 16\n  max: 12\nunknown:\n  color: gray\n",
    )
    .unwrap();

    let err = ConfigLoader::new(dir.path()).load("zoom.yaml").unwrap_err();
    assert!(format!("{err:#}").contains("zoom range 16-12 is invalid"));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempdir().expect("tempdir");
    let err = ConfigLoader::new(dir.path()).load("nope.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read map config"));
}
