//! Output document tests against a tile folder on disk.
//!
//! Tests verify:
//! - A run over a folder writes the JSON document
//! - Files that are not tiles are ignored
//! - A failed run leaves no output file behind

use std::path::Path;

use tma_cores::{CoreExtractor, ExtractError, ExtractionParams, LocalTileSource};

use super::test_utils::{scratch_dir, Blob, SlideLayout};

fn write_tiles(layout: &SlideLayout, dir: &Path) {
    for (name, data) in layout.encoded_tiles() {
        std::fs::write(dir.join(name), data).unwrap();
    }
}

fn extractor(dir: &Path) -> CoreExtractor<LocalTileSource> {
    CoreExtractor::new(LocalTileSource::new(dir), ExtractionParams::default())
}

#[tokio::test]
async fn test_run_writes_document() {
    let tiles = scratch_dir("run-writes-tiles");
    let out = scratch_dir("run-writes-out").join("cores.json");

    let layout = SlideLayout::new(2, 2, 100, 1)
        .with_blob(Blob::new(20, 20, 60, 60))
        .with_blob(Blob::new(120, 22, 170, 64))
        .with_blob(Blob::new(40, 130, 90, 180));
    write_tiles(&layout, &tiles);

    let summary = extractor(&tiles).run(&out).await.unwrap();
    assert_eq!(summary.tiles, 4);
    assert_eq!(summary.cores, 3);
    assert_eq!(summary.groups, 2);

    let json = std::fs::read_to_string(&out).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let groups = value.as_array().unwrap();
    assert_eq!(groups.len(), 2);

    // First row: two cores, slice scaled by 2
    assert_eq!(groups[0]["cores"].as_array().unwrap().len(), 2);
    assert_eq!(groups[0]["coordinates"][0], serde_json::json!([40.0, 40.0]));
    assert_eq!(groups[0]["coordinates"][2], serde_json::json!([340.0, 128.0]));

    // Second row: one core whose perimeter is in mask pixels
    let core = &groups[1]["cores"][0];
    assert_eq!(core["length"], serde_json::json!(200.0));
    assert_eq!(core["coordinates"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_non_tile_files_are_ignored() {
    let tiles = scratch_dir("ignored-tiles");
    let out = scratch_dir("ignored-out").join("cores.json");

    let layout = SlideLayout::new(1, 2, 50, 0).with_blob(Blob::new(10, 10, 40, 40));
    write_tiles(&layout, &tiles);
    std::fs::write(tiles.join("thumbnail.png"), b"not a tile").unwrap();
    std::fs::write(tiles.join("slide_files-0_0_0.tif"), b"unsupported").unwrap();
    std::fs::create_dir_all(tiles.join("slide_files-0_5_5.png")).unwrap();

    let summary = extractor(&tiles).run(&out).await.unwrap();
    assert_eq!(summary.tiles, 2);
    assert_eq!(summary.slide_width, 100);
    assert_eq!(summary.cores, 1);
}

#[tokio::test]
async fn test_empty_folder_writes_nothing() {
    let tiles = scratch_dir("empty-tiles");
    let out = scratch_dir("empty-out").join("cores.json");

    let result = extractor(&tiles).run(&out).await;
    assert!(matches!(result, Err(ExtractError::EmptyInput { .. })));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_missing_folder_fails() {
    let tiles = scratch_dir("missing-tiles").join("does-not-exist");
    let out = scratch_dir("missing-out").join("cores.json");

    let result = extractor(&tiles).run(&out).await;
    assert!(matches!(result, Err(ExtractError::Io(_))));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_corrupt_tile_writes_nothing() {
    let tiles = scratch_dir("corrupt-tiles");
    let out = scratch_dir("corrupt-out").join("cores.json");

    let layout = SlideLayout::new(1, 2, 50, 0);
    write_tiles(&layout, &tiles);
    std::fs::write(tiles.join(layout.tile_name(0, 1)), b"garbage").unwrap();

    let result = extractor(&tiles).run(&out).await;
    assert!(matches!(result, Err(ExtractError::Tile(_))));
    assert!(!out.exists());
}
