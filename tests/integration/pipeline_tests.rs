//! End-to-end pipeline tests.
//!
//! Tests verify:
//! - Slide geometry and mask dimensions follow the tile grid
//! - A single blob yields one group whose slice equals the core box
//! - Tissue crossing tile borders is stitched into one core
//! - Output coordinates are scaled by the zoom level
//! - Cores touching the slide edges and corners are kept
//! - Structural problems abort the run

use image::{Rgb, RgbImage};

use tma_cores::{CoreExtractor, ExtractError, Extraction, ExtractionParams};

use super::test_utils::{encode_png, tile_name, Blob, MockTileSource, SlideLayout, BACKGROUND};

fn extractor(source: MockTileSource) -> CoreExtractor<MockTileSource> {
    CoreExtractor::new(source, ExtractionParams::default())
}

// =============================================================================
// Geometry and Mask
// =============================================================================

#[tokio::test]
async fn test_mask_dimensions_follow_grid() {
    let layout = SlideLayout::new(3, 2, 64, 1);
    let extractor = extractor(layout.source());

    let (grid, geometry) = extractor.resolve().await.unwrap();
    assert_eq!(grid.len(), 6);
    assert_eq!(geometry.width, 2 * 64);
    assert_eq!(geometry.height, 3 * 64);
    assert_eq!(geometry.zoom_level, 1);

    let mask = extractor.assemble_mask(&grid, geometry).await.unwrap();
    assert_eq!(mask.width(), 128);
    assert_eq!(mask.height(), 192);
    assert_eq!(mask.tissue_pixels(), 0);
}

#[tokio::test]
async fn test_mask_marks_blob_pixels() {
    let layout = SlideLayout::new(2, 2, 50, 0).with_blob(Blob::new(45, 45, 54, 54));
    let extractor = extractor(layout.source());

    let (grid, geometry) = extractor.resolve().await.unwrap();
    let mask = extractor.assemble_mask(&grid, geometry).await.unwrap();

    assert_eq!(mask.tissue_pixels(), 100);
    assert!(mask.is_tissue(45, 45));
    assert!(mask.is_tissue(54, 54));
    assert!(!mask.is_tissue(44, 45));
    assert!(!mask.is_tissue(55, 54));
}

#[tokio::test]
async fn test_sparse_grid_leaves_missing_tiles_empty() {
    // Only the bottom-right tile exists; the grid still spans from (0, 0)
    let layout = SlideLayout::new(2, 2, 40, 0).with_blob(Blob::new(50, 50, 70, 70));
    let (name, data) = layout
        .encoded_tiles()
        .into_iter()
        .find(|(name, _)| name == &layout.tile_name(1, 1))
        .unwrap();
    let extractor = extractor(MockTileSource::new().with_tile(name, data));

    let (grid, _) = extractor.resolve().await.unwrap();
    assert_eq!(grid.missing_tiles(), 3);

    let extraction = extractor.extract().await.unwrap();
    assert_eq!(extraction.geometry.width, 80);
    assert_eq!(extraction.geometry.height, 80);
    assert_eq!(extraction.summary.cores, 1);
}

// =============================================================================
// Detection Scenarios
// =============================================================================

#[tokio::test]
async fn test_single_blob_scenario() {
    let layout = SlideLayout::new(2, 2, 100, 0).with_blob(Blob::new(40, 40, 60, 60));
    let extraction = extractor(layout.source()).extract().await.unwrap();

    assert_eq!(extraction.groups.len(), 1);
    let group = &extraction.groups[0];
    assert_eq!(group.len(), 1);

    let bounds = group.cores()[0].bounds();
    assert_eq!((bounds.x_min, bounds.y_min), (40, 40));
    assert_eq!((bounds.x_max, bounds.y_max), (60, 60));
    assert_eq!(group.slice().bounds(), bounds);

    // Zoom 0 is the identity scale
    let record = &extraction.record.groups[0];
    assert_eq!(
        record.coordinates,
        vec![[40.0, 40.0], [60.0, 40.0], [60.0, 60.0], [40.0, 60.0]]
    );
    assert_eq!(record.cores.len(), 1);
    assert_eq!(record.cores[0].length, 80.0);
}

#[tokio::test]
async fn test_blob_across_tile_border_is_one_core() {
    let layout = SlideLayout::new(2, 2, 100, 0).with_blob(Blob::new(80, 70, 130, 140));
    let extraction = extractor(layout.source()).extract().await.unwrap();

    assert_eq!(extraction.summary.cores, 1);
    let bounds = extraction.groups[0].cores()[0].bounds();
    assert_eq!((bounds.x_min, bounds.y_min), (80, 70));
    assert_eq!((bounds.x_max, bounds.y_max), (130, 140));
}

#[tokio::test]
async fn test_empty_slide_produces_empty_record() {
    let layout = SlideLayout::new(2, 3, 32, 4);
    let extraction = extractor(layout.source()).extract().await.unwrap();

    assert!(extraction.groups.is_empty());
    assert!(extraction.record.groups.is_empty());
    assert_eq!(extraction.record.to_json().unwrap(), "[]");
    assert_eq!(extraction.summary.tiles, 6);
}

#[tokio::test]
async fn test_noise_pixels_are_not_cores() {
    let layout = SlideLayout::new(1, 1, 100, 0)
        .with_blob(Blob::new(10, 10, 10, 10))
        .with_blob(Blob::new(30, 30, 60, 60));
    let extraction = extractor(layout.source()).extract().await.unwrap();

    assert_eq!(extraction.summary.degenerate, 1);
    assert_eq!(extraction.summary.candidates, 1);
    assert_eq!(extraction.summary.cores, 1);
}

#[tokio::test]
async fn test_zoom_level_scales_output() {
    let layout = SlideLayout::new(1, 2, 100, 3).with_blob(Blob::new(10, 20, 50, 60));
    let extraction = extractor(layout.source()).extract().await.unwrap();

    let record = &extraction.record.groups[0];
    assert_eq!(record.coordinates[0], [80.0, 160.0]);
    assert_eq!(record.coordinates[2], [400.0, 480.0]);
    assert_eq!(record.cores[0].coordinates[0][0] % 8.0, 0.0);
    // Perimeter is reported in mask pixels
    assert_eq!(record.cores[0].length, 160.0);
}

#[tokio::test]
async fn test_custom_saturation_threshold() {
    let layout = SlideLayout::new(1, 1, 100, 0).with_blob(Blob::new(20, 20, 70, 70));
    let params = ExtractionParams {
        // Tissue saturation is 128; nothing is above 200
        saturation_threshold: 200,
        ..ExtractionParams::default()
    };
    let extraction = CoreExtractor::new(layout.source(), params)
        .extract()
        .await
        .unwrap();

    assert_eq!(extraction.summary.cores, 0);
}

#[tokio::test]
async fn test_single_worker_matches_parallel() {
    let layout = SlideLayout::new(3, 3, 40, 0)
        .with_blob(Blob::new(5, 5, 30, 30))
        .with_blob(Blob::new(50, 10, 90, 35))
        .with_blob(Blob::new(20, 70, 110, 100));

    let serial = CoreExtractor::new(
        layout.source(),
        ExtractionParams {
            concurrency: 1,
            ..ExtractionParams::default()
        },
    )
    .extract()
    .await
    .unwrap();
    let parallel = CoreExtractor::new(
        layout.source(),
        ExtractionParams {
            concurrency: 8,
            ..ExtractionParams::default()
        },
    )
    .extract()
    .await
    .unwrap();

    assert_eq!(serial.summary, parallel.summary);
    assert_eq!(serial.record, parallel.record);
}

// =============================================================================
// Slide Edges
// =============================================================================

fn core_boxes(extraction: &Extraction) -> Vec<(i64, i64, i64, i64)> {
    let mut boxes: Vec<_> = extraction
        .groups
        .iter()
        .flat_map(|g| g.cores())
        .map(|c| {
            let b = c.bounds();
            (b.x_min, b.y_min, b.x_max, b.y_max)
        })
        .collect();
    boxes.sort();
    boxes
}

#[tokio::test]
async fn test_core_on_left_edge() {
    let layout = SlideLayout::new(2, 2, 100, 0).with_blob(Blob::new(0, 40, 30, 80));
    let extraction = extractor(layout.source()).extract().await.unwrap();

    assert_eq!(extraction.summary.cores, 1);
    assert_eq!(core_boxes(&extraction), vec![(0, 40, 30, 80)]);
}

#[tokio::test]
async fn test_cores_on_every_edge() {
    let layout = SlideLayout::new(2, 2, 100, 0)
        .with_blob(Blob::new(0, 20, 30, 50))
        .with_blob(Blob::new(80, 0, 120, 30))
        .with_blob(Blob::new(170, 80, 199, 120))
        .with_blob(Blob::new(60, 170, 90, 199));
    let extraction = extractor(layout.source()).extract().await.unwrap();

    assert_eq!(extraction.summary.cores, 4);
    assert_eq!(extraction.summary.degenerate, 0);
    assert_eq!(
        core_boxes(&extraction),
        vec![
            (0, 20, 30, 50),
            (60, 170, 90, 199),
            (80, 0, 120, 30),
            (170, 80, 199, 120)
        ]
    );
}

#[tokio::test]
async fn test_cores_in_slide_corners() {
    let layout = SlideLayout::new(2, 2, 100, 0)
        .with_blob(Blob::new(0, 0, 25, 25))
        .with_blob(Blob::new(170, 170, 199, 199));
    let extraction = extractor(layout.source()).extract().await.unwrap();

    assert_eq!(core_boxes(&extraction), vec![(0, 0, 25, 25), (170, 170, 199, 199)]);
}

#[tokio::test]
async fn test_core_across_seam_on_left_edge() {
    // Row seam at y = 100 on the first column
    let layout = SlideLayout::new(2, 2, 100, 0).with_blob(Blob::new(0, 85, 20, 115));
    let extraction = extractor(layout.source()).extract().await.unwrap();

    assert_eq!(extraction.summary.cores, 1);
    assert_eq!(core_boxes(&extraction), vec![(0, 85, 20, 115)]);
}

#[tokio::test]
async fn test_strip_on_left_edge_is_degenerate() {
    let layout = SlideLayout::new(2, 2, 100, 0).with_blob(Blob::new(0, 120, 0, 160));
    let extraction = extractor(layout.source()).extract().await.unwrap();

    assert_eq!(extraction.summary.degenerate, 1);
    assert_eq!(extraction.summary.candidates, 0);
    assert_eq!(extraction.summary.cores, 0);
}

// =============================================================================
// Fatal Errors
// =============================================================================

#[tokio::test]
async fn test_empty_input() {
    let source = MockTileSource::new().with_tile("notes.txt", b"hello".to_vec());
    let result = extractor(source).extract().await;
    assert!(matches!(result, Err(ExtractError::EmptyInput { .. })));
}

#[tokio::test]
async fn test_zoom_level_mismatch() {
    let tile = encode_png(&RgbImage::from_pixel(10, 10, BACKGROUND));
    let source = MockTileSource::new()
        .with_tile(tile_name(2, 0, 0), tile.clone())
        .with_tile(tile_name(3, 0, 1), tile);

    let result = extractor(source).extract().await;
    assert!(matches!(result, Err(ExtractError::Consistency { .. })));
}

#[tokio::test]
async fn test_tile_size_mismatch() {
    let source = MockTileSource::new()
        .with_tile(
            tile_name(0, 0, 0),
            encode_png(&RgbImage::from_pixel(10, 10, BACKGROUND)),
        )
        .with_tile(
            tile_name(0, 0, 1),
            encode_png(&RgbImage::from_pixel(12, 10, Rgb([0, 0, 0]))),
        );

    let result = extractor(source).extract().await;
    assert!(matches!(result, Err(ExtractError::Consistency { .. })));
}

#[tokio::test]
async fn test_corrupt_tile() {
    let source = MockTileSource::new()
        .with_tile(
            tile_name(0, 0, 0),
            encode_png(&RgbImage::from_pixel(10, 10, BACKGROUND)),
        )
        .with_tile(tile_name(0, 0, 1), vec![0x89, 0x50, 0x4E, 0x47, 0x00]);

    let result = extractor(source).extract().await;
    assert!(matches!(result, Err(ExtractError::Tile(_))));
}

#[tokio::test]
async fn test_every_tile_is_read() {
    let layout = SlideLayout::new(2, 3, 16, 0);
    let source = layout.source();
    let extractor = extractor(source);

    extractor.extract().await.unwrap();
    // Reference tile is read once for its size, then every tile once
    assert_eq!(extractor.source().read_count(), 7);
}
