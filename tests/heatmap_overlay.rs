use scan_annotator::viewer::heatmap::{synthesize_regions, HeatmapFrameBuffer};

#[test]
fn confidence_bands_control_region_count() {
    assert!(synthesize_regions(0.0).is_empty());
    assert_eq!(synthesize_regions(0.5).len(), 1);
    assert_eq!(synthesize_regions(0.9).len(), 2);
}

#[test]
fn high_confidence_regions_match_fixed_reference_offsets() {
    let regions = synthesize_regions(0.85);
    assert_eq!(regions.len(), 2);
    for region in &regions {
        assert_eq!(region.intensity, 0.85);
        assert!((region.radius - 0.285).abs() < 1e-6);
    }
    assert_eq!(regions[0].center, (0.35, 0.40));
    assert_eq!(regions[1].center, (0.60, 0.60));
}

#[test]
fn synthesis_is_deterministic_across_calls() {
    for intensity in [0.0, 0.31, 0.5, 0.7, 0.71, 1.0] {
        assert_eq!(synthesize_regions(intensity), synthesize_regions(intensity));
    }
}

#[test]
fn full_pipeline_renders_opaque_boxes_over_gradient() {
    let regions = synthesize_regions(0.8);
    let mut layer = HeatmapFrameBuffer::default();
    layer.render(&regions, (300, 300));

    // Region 0 center in pixels.
    let center = layer.pixel(105, 120).unwrap();
    assert_eq!(center[0], 255);
    assert!(center[3] > 0);

    // Somewhere on the layer a pure box stroke pixel exists at the region
    // intensity alpha.
    let box_alpha = (0.8f32 * 255.0).round() as u8;
    assert!(layer
        .rgba_pixels()
        .chunks_exact(4)
        .any(|px| px == [255, 0, 0, box_alpha]));
}

#[test]
fn hidden_or_subthreshold_heatmap_is_fully_transparent() {
    let mut layer = HeatmapFrameBuffer::default();
    layer.render(&synthesize_regions(0.2), (120, 120));
    assert!(layer.rgba_pixels().chunks_exact(4).all(|px| px[3] == 0));
}

#[test]
fn recomputation_from_scratch_leaves_no_stale_pixels() {
    let mut layer = HeatmapFrameBuffer::default();
    layer.render(&synthesize_regions(0.9), (200, 200));
    let painted_before = layer
        .rgba_pixels()
        .chunks_exact(4)
        .filter(|px| px[3] != 0)
        .count();
    assert!(painted_before > 0);

    layer.render(&[], (200, 200));
    assert!(layer.rgba_pixels().chunks_exact(4).all(|px| px[3] == 0));
}
