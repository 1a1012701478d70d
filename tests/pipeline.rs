//! End-to-end pipeline tests: synthetic wire buffers in, contact frames and
//! stylus events out.

use sparsha_io::app::TouchPipeline;
use sparsha_io::contacts::{
    DetectorConfig, FinderConfig, StabilizerConfig, TrackerConfig, ValidatorConfig,
};
use sparsha_io::core::{EventSink, MockSink};
use sparsha_io::protocol::constants::*;

// ============================================================================
// Wire buffer builders
// ============================================================================

fn push_report(out: &mut Vec<u8>, ty: u16, payload: &[u8]) {
    out.extend_from_slice(&ty.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
}

fn push_frame(out: &mut Vec<u8>, index: u16, ty: u16, content: &[u8]) {
    out.extend_from_slice(&index.to_le_bytes());
    out.extend_from_slice(&ty.to_le_bytes());
    out.extend_from_slice(&(content.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(content);
}

fn wrap_buffer(frames: &[u8], frame_count: u32) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(&frame_count.to_le_bytes());
    payload.extend_from_slice(&[0u8; 4]);
    payload.extend_from_slice(frames);

    let mut buffer = Vec::new();
    buffer.extend_from_slice(&DATA_TYPE_PAYLOAD.to_le_bytes());
    buffer.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buffer.extend_from_slice(&0u32.to_le_bytes());
    buffer.extend_from_slice(&[0u8; 52]);
    buffer.extend_from_slice(&payload);
    buffer
}

/// Builds one heatmap buffer (dimension report followed by the data report)
/// from a cell grid where 1.0 means full contact.
fn heatmap_buffer(width: u8, height: u8, values: &[f32]) -> Vec<u8> {
    assert_eq!(values.len(), usize::from(width) * usize::from(height));

    let dim = [height, width, 0, u8::MAX, 0, u8::MAX, 0, u8::MAX];

    // The wire encodes a touch as a low value.
    let cells: Vec<u8> = values
        .iter()
        .map(|v| 255 - (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();

    let mut reports = Vec::new();
    push_report(&mut reports, REPORT_TYPE_HEATMAP_DIM, &dim);
    push_report(&mut reports, REPORT_TYPE_HEATMAP, &cells);

    let mut frames = Vec::new();
    push_frame(&mut frames, 0, FRAME_TYPE_HEATMAP, &reports);
    wrap_buffer(&frames, 1)
}

fn gaussian_cells(width: usize, height: usize, cx: f32, cy: f32, sigma: f32) -> Vec<f32> {
    let mut cells = vec![0.0; width * height];

    for y in 0..height {
        for x in 0..width {
            let dx = (x as f32 - cx) / sigma;
            let dy = (y as f32 - cy) / sigma;
            cells[y * width + x] = (-0.5 * (dx * dx + dy * dy)).exp();
        }
    }

    cells
}

fn stylus_v2_buffer(mode: u16, x: u16, y: u16, pressure: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.push(1);
    payload.extend_from_slice(&[0u8; 3]);
    payload.extend_from_slice(&0x1234u32.to_le_bytes());

    payload.extend_from_slice(&9u16.to_le_bytes());
    payload.extend_from_slice(&mode.to_le_bytes());
    payload.extend_from_slice(&x.to_le_bytes());
    payload.extend_from_slice(&y.to_le_bytes());
    payload.extend_from_slice(&pressure.to_le_bytes());
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&0u16.to_le_bytes());
    payload.extend_from_slice(&[0u8; 2]);

    let mut report = Vec::new();
    push_report(&mut report, REPORT_TYPE_STYLUS_V2, &payload);

    let mut frames = Vec::new();
    push_frame(&mut frames, 0, FRAME_TYPE_STYLUS, &report);
    wrap_buffer(&frames, 1)
}

fn test_config() -> FinderConfig {
    FinderConfig {
        detection: DetectorConfig {
            activation_threshold: 0.1,
            deactivation_threshold: 0.05,
            min_cluster_size: 3,
            normalize: true,
        },
        tracking: TrackerConfig { max_distance: 0.1 },
        stability: StabilizerConfig {
            temporal_window: 2,
            check_temporal_stability: true,
            size_threshold: None,
            position_threshold: None,
            orientation_threshold: None,
        },
        validation: ValidatorConfig::default(),
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_empty_heatmap_produces_empty_frame() {
    let mut pipeline = TouchPipeline::new(test_config(), MockSink::new());

    let buffer = heatmap_buffer(72, 48, &vec![0.0; 72 * 48]);
    pipeline.process(&buffer);
    pipeline.process(&buffer);

    let sink = pipeline.into_sink();
    assert_eq!(sink.frames.len(), 2);
    assert!(sink.frames[0].is_empty());
    assert!(sink.frames[1].is_empty());
}

#[test]
fn test_single_contact_becomes_stable() {
    let mut pipeline = TouchPipeline::new(test_config(), MockSink::new());

    let cells = gaussian_cells(72, 48, 20.0, 15.0, 2.0);
    let buffer = heatmap_buffer(72, 48, &cells);

    pipeline.process(&buffer);
    pipeline.process(&buffer);

    let sink = pipeline.into_sink();
    assert_eq!(sink.frames.len(), 2);

    let first = &sink.frames[0][0];
    assert_eq!(first.index, Some(0));
    assert!(!first.stable);

    let second = &sink.frames[1][0];
    assert_eq!(second.index, Some(0));
    assert!(second.stable);

    // Normalized position close to the seeded center
    assert!((second.mean.x - 20.0 / 72.0).abs() < 0.02);
    assert!((second.mean.y - 15.0 / 48.0).abs() < 0.02);
}

#[test]
fn test_unknown_frame_type_skipped_on_the_wire() {
    let mut pipeline = TouchPipeline::new(test_config(), MockSink::new());

    // An unknown frame with 42 advertised bytes, then a valid stylus frame.
    let mut stylus_payload = Vec::new();
    stylus_payload.push(1);
    stylus_payload.extend_from_slice(&[0u8; 3]);
    stylus_payload.extend_from_slice(&0u32.to_le_bytes());
    stylus_payload.extend_from_slice(&9u16.to_le_bytes());
    stylus_payload.extend_from_slice(&0b0011u16.to_le_bytes());
    stylus_payload.extend_from_slice(&4800u16.to_le_bytes());
    stylus_payload.extend_from_slice(&3600u16.to_le_bytes());
    stylus_payload.extend_from_slice(&512u16.to_le_bytes());
    stylus_payload.extend_from_slice(&[0u8; 6]);

    let mut stylus_report = Vec::new();
    push_report(&mut stylus_report, REPORT_TYPE_STYLUS_V2, &stylus_payload);

    let mut frames = Vec::new();
    push_frame(&mut frames, 0, 0xFFFF, &[0xAA; 42]);
    push_frame(&mut frames, 1, FRAME_TYPE_STYLUS, &stylus_report);
    let buffer = wrap_buffer(&frames, 2);

    pipeline.process(&buffer);

    let sink = pipeline.into_sink();
    assert_eq!(sink.stylus.len(), 1);
    assert_eq!(sink.stylus[0].x, 4800);
    assert_eq!(sink.stylus[0].y, 3600);
}

#[test]
fn test_stylus_v1_pressure_rescaled() {
    let mut pipeline = TouchPipeline::new(test_config(), MockSink::new());

    let mut payload = Vec::new();
    payload.push(1);
    payload.extend_from_slice(&[0u8; 3]);
    payload.extend_from_slice(&0u32.to_le_bytes());

    payload.extend_from_slice(&[0u8; 4]);
    payload.push(0b0011);
    payload.extend_from_slice(&100u16.to_le_bytes());
    payload.extend_from_slice(&200u16.to_le_bytes());
    payload.extend_from_slice(&250u16.to_le_bytes());
    payload.push(0);

    let mut report = Vec::new();
    push_report(&mut report, REPORT_TYPE_STYLUS_V1, &payload);
    let mut frames = Vec::new();
    push_frame(&mut frames, 0, FRAME_TYPE_STYLUS, &report);
    let buffer = wrap_buffer(&frames, 1);

    pipeline.process(&buffer);

    let sink = pipeline.into_sink();
    assert_eq!(sink.stylus.len(), 1);
    assert_eq!(sink.stylus[0].pressure, 1000);
}

#[test]
fn test_malformed_buffer_skips_one_frame_only() {
    let mut pipeline = TouchPipeline::new(test_config(), MockSink::new());

    let cells = gaussian_cells(72, 48, 20.0, 15.0, 2.0);
    let good = heatmap_buffer(72, 48, &cells);

    let mut bad = good.clone();
    bad.truncate(bad.len() / 2);

    pipeline.process(&bad);
    pipeline.process(&good);

    let sink = pipeline.into_sink();
    assert_eq!(sink.frames.len(), 1);
    assert_eq!(sink.frames[0].len(), 1);
}

#[test]
fn test_stylus_and_heatmap_in_one_buffer() {
    let mut pipeline = TouchPipeline::new(test_config(), MockSink::new());

    let cells = gaussian_cells(72, 48, 36.0, 24.0, 2.0);
    let dim = [48u8, 72, 0, 255, 0, 255, 0, 255];
    let wire_cells: Vec<u8> = cells
        .iter()
        .map(|v| 255 - (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();

    let mut heatmap_reports = Vec::new();
    push_report(&mut heatmap_reports, REPORT_TYPE_HEATMAP_DIM, &dim);
    push_report(&mut heatmap_reports, REPORT_TYPE_HEATMAP, &wire_cells);

    let mut stylus_payload = Vec::new();
    stylus_payload.push(1);
    stylus_payload.extend_from_slice(&[0u8; 3]);
    stylus_payload.extend_from_slice(&0u32.to_le_bytes());
    stylus_payload.extend_from_slice(&9u16.to_le_bytes());
    stylus_payload.extend_from_slice(&0b0001u16.to_le_bytes());
    stylus_payload.extend_from_slice(&1u16.to_le_bytes());
    stylus_payload.extend_from_slice(&2u16.to_le_bytes());
    stylus_payload.extend_from_slice(&0u16.to_le_bytes());
    stylus_payload.extend_from_slice(&[0u8; 6]);

    let mut stylus_report = Vec::new();
    push_report(&mut stylus_report, REPORT_TYPE_STYLUS_V2, &stylus_payload);

    let mut frames = Vec::new();
    push_frame(&mut frames, 0, FRAME_TYPE_STYLUS, &stylus_report);
    push_frame(&mut frames, 1, FRAME_TYPE_HEATMAP, &heatmap_reports);
    let buffer = wrap_buffer(&frames, 2);

    pipeline.process(&buffer);

    let sink = pipeline.into_sink();
    assert_eq!(sink.stylus.len(), 1);
    assert_eq!(sink.frames.len(), 1);
    assert_eq!(sink.frames[0].len(), 1);
}

#[test]
fn test_stylus_v2_round_trip_through_pipeline() {
    let mut pipeline = TouchPipeline::new(test_config(), MockSink::new());

    let buffer = stylus_v2_buffer(0b1011, 9599, 7199, 4095);
    pipeline.process(&buffer);

    let sink = pipeline.into_sink();
    assert_eq!(sink.stylus.len(), 1);

    let stylus = &sink.stylus[0];
    assert_eq!(stylus.x, 9599);
    assert_eq!(stylus.y, 7199);
    assert_eq!(stylus.pressure, 4095);
    assert_eq!(stylus.timestamp, 9);
    assert!(stylus.proximity);
    assert!(stylus.contact);
    assert!(!stylus.button);
    assert!(stylus.rubber);
}

#[test]
fn test_moving_contact_keeps_identity() {
    let mut config = test_config();
    // Cell-sized movements are small in normalized units
    config.tracking.max_distance = 0.1;

    let mut pipeline = TouchPipeline::new(config, MockSink::new());

    for step in 0..10 {
        let cx = 20.0 + step as f32 * 0.5;
        let cells = gaussian_cells(72, 48, cx, 15.0, 2.0);
        pipeline.process(&heatmap_buffer(72, 48, &cells));
    }

    let sink = pipeline.into_sink();
    assert_eq!(sink.frames.len(), 10);

    for frame in &sink.frames {
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].index, Some(0));
    }
}

#[test]
fn test_mock_sink_records_in_order() {
    // Sanity check of the test double itself
    let mut sink = MockSink::new();
    sink.emit_contacts(&[]).unwrap();
    assert_eq!(sink.frames.len(), 1);
}
