use super::*;
use test_case::test_case;

fn build_header(frame_number: u32, num_detected_obj: u32, num_tlvs: u32) -> Vec<u8> {
    let mut buf = MAGIC_WORD.to_vec();
    buf.extend_from_slice(&1u32.to_le_bytes()); // version
    buf.extend_from_slice(&0u32.to_le_bytes()); // total_packet_len (filled in by caller if needed)
    buf.extend_from_slice(&18u32.to_le_bytes()); // platform
    buf.extend_from_slice(&frame_number.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // time_cpu_cycles
    buf.extend_from_slice(&num_detected_obj.to_le_bytes());
    buf.extend_from_slice(&num_tlvs.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // subframe_number
    buf
}

fn tlv(tlv_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut buf = tlv_type.to_le_bytes().to_vec();
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

fn detected_point(range_idx: u16, doppler_idx: i16, peak_val: u16, x_q: i16, y_q: i16, z_q: i16) -> Vec<u8> {
    let mut buf = Vec::with_capacity(12);
    buf.extend_from_slice(&range_idx.to_le_bytes());
    buf.extend_from_slice(&doppler_idx.to_le_bytes());
    buf.extend_from_slice(&peak_val.to_le_bytes());
    buf.extend_from_slice(&x_q.to_le_bytes());
    buf.extend_from_slice(&y_q.to_le_bytes());
    buf.extend_from_slice(&z_q.to_le_bytes());
    buf
}

fn detected_points_payload(q_format: u16, points: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(points.len() as u16).to_le_bytes());
    buf.extend_from_slice(&q_format.to_le_bytes());
    for p in points {
        buf.extend_from_slice(p);
    }
    buf
}

/// Scenario #3 from the spec: one detected point with x=1.0, y=1.0, z=0.0.
fn frame_with_single_point() -> Vec<u8> {
    let payload = detected_points_payload(8, &[detected_point(100, -5, 200, 256, 256, 0)]);
    let mut buf = build_header(1, 1, 1);
    buf.extend(tlv(TLV_TYPE_DETECTED_POINTS, &payload));
    buf
}

#[test]
fn empty_buffer_yields_no_records() {
    assert_eq!(decode_buffer(0, &[]), Vec::new());
}

#[test]
fn garbage_buffer_yields_no_records() {
    let buf = [0xFFu8; 100];
    assert_eq!(decode_buffer(0, &buf), Vec::new());
}

#[test]
fn single_detected_point_matches_synthesized_values() {
    let buf = frame_with_single_point();
    let records = decode_buffer(7, &buf);
    assert_eq!(records.len(), 1);
    let Record::DetectedObject(obj) = records[0] else {
        panic!("expected a DetectedObject");
    };
    assert_eq!(obj.source_id, 7);
    assert_eq!(obj.frame_number, 1);
    assert!((obj.x - 1.0).abs() < 1e-6);
    assert!((obj.y - 1.0).abs() < 1e-6);
    assert!((obj.z - 0.0).abs() < 1e-6);
    assert!((obj.range_cm - 141.421_356).abs() < 1e-3);
    assert!((obj.bearing_deg - 45.0).abs() < 1e-6);
    assert!((obj.velocity_mps - (-0.5)).abs() < 1e-6);
}

#[test]
fn detected_point_plus_noise_profile() {
    let point_payload = detected_points_payload(8, &[detected_point(100, -5, 200, 256, 256, 0)]);
    let samples: Vec<u16> = (1..=10).map(|i| i * 10).collect();
    let noise_payload: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

    let mut buf = build_header(1, 1, 2);
    buf.extend(tlv(TLV_TYPE_DETECTED_POINTS, &point_payload));
    buf.extend(tlv(TLV_TYPE_NOISE_PROFILE, &noise_payload));

    let records = decode_buffer(0, &buf);
    assert_eq!(records.len(), 2);
    assert!(matches!(records[0], Record::DetectedObject(_)));
    let Record::NoiseProfile(noise) = records[1] else {
        panic!("expected a NoiseProfile");
    };
    assert_eq!(noise.sample_count, 10);
    assert!((noise.avg_level - 55.0).abs() < 1e-9);
}

#[test]
fn two_frames_concatenated_with_garbage_between() {
    let frame_a = frame_with_single_point();
    let frame_b = {
        let payload = detected_points_payload(8, &[detected_point(50, 10, 300, 512, 0, 0)]);
        let mut buf = build_header(2, 1, 1);
        buf.extend(tlv(TLV_TYPE_DETECTED_POINTS, &payload));
        buf
    };
    let garbage: Vec<u8> = (0u8..17).collect();

    let mut combined = frame_a.clone();
    combined.extend_from_slice(&garbage);
    combined.extend_from_slice(&frame_b);

    let records = decode_buffer(0, &combined);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].frame_number(), 1);
    assert_eq!(records[1].frame_number(), 2);
}

#[test]
fn truncated_tlv_length_yields_zero_records_for_that_frame() {
    let mut buf = build_header(1, 1, 1);
    // Declare a TLV length far past what actually follows.
    buf.extend(tlv(TLV_TYPE_DETECTED_POINTS, &[]));
    let tlv_header_len = buf.len();
    buf.truncate(tlv_header_len); // keep the (type, length) prefix only
    // Overwrite the length field (last 4 bytes of the prefix) with a huge value.
    let len_offset = buf.len() - 4;
    buf[len_offset..].copy_from_slice(&1_000_000u32.to_le_bytes());

    assert_eq!(decode_buffer(0, &buf), Vec::new());
}

#[test]
fn truncated_frame_does_not_affect_preceding_complete_frame() {
    let mut buf = frame_with_single_point();
    let preceding_len = buf.len();

    // Append a second, truncated frame: header claims one TLV, but no TLV
    // bytes follow at all.
    buf.extend(build_header(2, 1, 1));

    let records = decode_buffer(0, &buf);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].frame_number(), 1);
    assert!(buf.len() > preceding_len);
}

#[test]
fn garbage_prefix_does_not_change_output() {
    let base = decode_buffer(0, &frame_with_single_point());

    let mut with_prefix = vec![0xAAu8; 37];
    with_prefix.extend(frame_with_single_point());
    let prefixed = decode_buffer(0, &with_prefix);

    assert_eq!(base, prefixed);
}

#[test_case(0, 3, false; "below band is filtered")]
#[test_case(6, 0, true; "just above minimum passes")]
#[test_case(4990, 0, true; "just below maximum passes")]
fn range_band_pass_filter(x_cm_ish: i16, y_cm_ish: i16, should_emit: bool) {
    // x_q/y_q are in Q8, so a raw value of N approximates N/256 meters = N/2.56 cm.
    // Scale inputs so the resulting range_cm lands near the requested value.
    let x_q = (x_cm_ish as f64 * 2.56) as i16;
    let y_q = (y_cm_ish as f64 * 2.56) as i16;
    let payload = detected_points_payload(8, &[detected_point(0, 0, 0, x_q, y_q, 0)]);
    let mut buf = build_header(1, 1, 1);
    buf.extend(tlv(TLV_TYPE_DETECTED_POINTS, &payload));

    let records = decode_buffer(0, &buf);
    assert_eq!(!records.is_empty(), should_emit);
}

#[test]
fn scenario_seven_point_below_minimum_is_filtered() {
    // Q-format=8, (x_q=0, y_q=10, z_q=0) => range_cm ~= 3.90, below the 5cm floor.
    let payload = detected_points_payload(8, &[detected_point(0, 0, 0, 0, 10, 0)]);
    let mut buf = build_header(1, 1, 1);
    buf.extend(tlv(TLV_TYPE_DETECTED_POINTS, &payload));

    assert_eq!(decode_buffer(0, &buf), Vec::new());
}

#[test]
fn azimuth_heatmap_decodes_max_and_average() {
    let cells: Vec<u32> = vec![10, 20, 30, 40];
    let payload: Vec<u8> = cells.iter().flat_map(|c| c.to_le_bytes()).collect();
    let mut buf = build_header(3, 0, 1);
    buf.extend(tlv(TLV_TYPE_AZIMUTH_STATIC_HEATMAP, &payload));

    let records = decode_buffer(0, &buf);
    assert_eq!(records.len(), 1);
    let Record::AzimuthHeatmap(hm) = records[0] else {
        panic!("expected an AzimuthHeatmap");
    };
    assert_eq!(hm.cell_count, 4);
    assert_eq!(hm.max_intensity, 40);
    assert!((hm.avg_intensity - 25.0).abs() < 1e-9);
}

#[test]
fn unknown_tlv_type_is_skipped_without_affecting_following_tlvs() {
    let noise_samples: Vec<u16> = vec![1, 2, 3, 4];
    let noise_payload: Vec<u8> = noise_samples.iter().flat_map(|s| s.to_le_bytes()).collect();

    let mut buf = build_header(1, 0, 2);
    buf.extend(tlv(99, &[0xDE, 0xAD, 0xBE, 0xEF]));
    buf.extend(tlv(TLV_TYPE_NOISE_PROFILE, &noise_payload));

    let records = decode_buffer(0, &buf);
    assert_eq!(records.len(), 1);
    assert!(matches!(records[0], Record::NoiseProfile(_)));
}

#[test]
fn decoder_is_deterministic() {
    let buf = frame_with_single_point();
    assert_eq!(decode_buffer(3, &buf), decode_buffer(3, &buf));
}
