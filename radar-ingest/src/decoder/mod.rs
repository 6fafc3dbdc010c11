//! Pure frame-and-TLV decoder for the TI AWR1843BOOST output protocol.
//!
//! [`decode_buffer`] has no I/O and no shared state: given the same bytes it
//! always returns the same records. It is safe to call from any thread on
//! any slice, including buffers that begin mid-garbage or end mid-frame.

mod constants;
mod header;
mod records;

pub use constants::{DEFAULT_VELOCITY_SCALE, RANGE_CM_MAX, RANGE_CM_MIN};
pub use header::FrameHeader;
pub use records::{AzimuthHeatmap, DetectedObject, NoiseProfile, Record};

use constants::*;

/// Tunables for the decoder that the frame format itself doesn't encode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOptions {
    /// Multiplier applied to `doppler_idx` to approximate `velocity_mps`.
    pub velocity_scale: f64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            velocity_scale: DEFAULT_VELOCITY_SCALE,
        }
    }
}

/// Scan `buf` for frames emitted by `source_id`, decode each one, and return
/// every record in byte-arrival order. Malformed frames are skipped; they
/// never poison decoding of other frames in the same buffer and never panic.
pub fn decode_buffer(source_id: u16, buf: &[u8]) -> Vec<Record> {
    decode_buffer_with(source_id, buf, DecodeOptions::default())
}

/// Same as [`decode_buffer`] but with explicit [`DecodeOptions`].
pub fn decode_buffer_with(source_id: u16, buf: &[u8], opts: DecodeOptions) -> Vec<Record> {
    let mut records = Vec::new();
    let mut search_from = 0usize;

    while let Some(magic_pos) = find_magic(buf, search_from) {
        let frame_buf = &buf[magic_pos..];
        let Some(header) = FrameHeader::parse(frame_buf) else {
            // Fewer than HEADER_LEN bytes remain after this sentinel: nothing
            // more can be produced from this buffer.
            break;
        };

        match decode_tlvs(source_id, &header, frame_buf, opts) {
            Some(frame_records) => {
                records.extend(frame_records);
                // Resume the sentinel search just past this frame's header,
                // not past its full declared length: the TLV loop above
                // already consumed this frame's TLVs independently, and
                // continuing the byte-level scan from here is what lets a
                // frame with a malformed middle still expose a sentinel that
                // starts a later, valid frame.
                search_from = magic_pos + HEADER_LEN;
            }
            None => {
                // Structurally broken TLV stream: abandon the whole frame
                // and resume one byte past the sentinel that began it, in
                // case the "sentinel" itself was garbage that happened to
                // match the magic pattern.
                search_from = magic_pos + 1;
            }
        }
    }

    records
}

fn find_magic(buf: &[u8], from: usize) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }
    buf[from..]
        .windows(MAGIC_WORD.len())
        .position(|w| w == MAGIC_WORD)
        .map(|p| p + from)
}

/// Decode the TLV stream following `header` inside `frame_buf` (which starts
/// at the frame's magic sentinel). Returns `None` if the TLV stream is
/// structurally inconsistent (a declared length runs past the buffer), in
/// which case the whole frame is abandoned per the decoder's resync policy.
fn decode_tlvs(
    source_id: u16,
    header: &FrameHeader,
    frame_buf: &[u8],
    opts: DecodeOptions,
) -> Option<Vec<Record>> {
    let mut records = Vec::new();
    let mut pos = HEADER_LEN;

    for _ in 0..header.num_tlvs {
        if pos + TLV_PREFIX_LEN > frame_buf.len() {
            return None;
        }
        let tlv_type = u32::from_le_bytes(frame_buf[pos..pos + 4].try_into().unwrap());
        let tlv_length =
            u32::from_le_bytes(frame_buf[pos + 4..pos + 8].try_into().unwrap()) as usize;
        let payload_start = pos + TLV_PREFIX_LEN;
        let payload_end = payload_start + tlv_length;
        if payload_end > frame_buf.len() {
            return None;
        }
        let payload = &frame_buf[payload_start..payload_end];

        match tlv_type {
            TLV_TYPE_DETECTED_POINTS => {
                decode_detected_points(source_id, header, payload, opts, &mut records);
            }
            TLV_TYPE_NOISE_PROFILE => {
                if let Some(r) = decode_noise_profile(source_id, header, payload) {
                    records.push(Record::NoiseProfile(r));
                }
            }
            TLV_TYPE_AZIMUTH_STATIC_HEATMAP => {
                if let Some(r) = decode_azimuth_heatmap(source_id, header, payload) {
                    records.push(Record::AzimuthHeatmap(r));
                }
            }
            // Recognized but not surfaced; skip exactly their payload length.
            TLV_TYPE_RANGE_PROFILE | TLV_TYPE_RANGE_DOPPLER_HEATMAP | TLV_TYPE_STATS => {}
            // Unknown type: still skip exactly its declared payload length.
            _ => {}
        }

        pos = payload_end;
    }

    Some(records)
}

fn decode_detected_points(
    source_id: u16,
    header: &FrameHeader,
    payload: &[u8],
    opts: DecodeOptions,
    out: &mut Vec<Record>,
) {
    if payload.len() < DETECTED_POINTS_DESCRIPTOR_LEN {
        return;
    }
    let num_objects = u16::from_le_bytes(payload[0..2].try_into().unwrap()) as u32;
    let xyz_q_format = u16::from_le_bytes(payload[2..4].try_into().unwrap());
    let q_scale = if xyz_q_format > 0 {
        1.0 / (1u64 << xyz_q_format) as f64
    } else {
        1.0
    };

    let count = num_objects.min(header.num_detected_obj) as usize;
    let mut pos = DETECTED_POINTS_DESCRIPTOR_LEN;
    for _ in 0..count {
        if pos + DETECTED_POINT_LEN > payload.len() {
            break;
        }
        let rec = &payload[pos..pos + DETECTED_POINT_LEN];
        let range_idx = u16::from_le_bytes(rec[0..2].try_into().unwrap());
        let doppler_idx = i16::from_le_bytes(rec[2..4].try_into().unwrap());
        let peak_val = u16::from_le_bytes(rec[4..6].try_into().unwrap());
        let x_q = i16::from_le_bytes(rec[6..8].try_into().unwrap());
        let y_q = i16::from_le_bytes(rec[8..10].try_into().unwrap());
        let z_q = i16::from_le_bytes(rec[10..12].try_into().unwrap());

        let x = x_q as f64 * q_scale;
        let y = y_q as f64 * q_scale;
        let z = z_q as f64 * q_scale;

        let range_cm = (x * x + y * y).sqrt() * 100.0;
        if range_cm > RANGE_CM_MIN && range_cm < RANGE_CM_MAX {
            let bearing_deg = y.atan2(x).to_degrees();
            out.push(Record::DetectedObject(DetectedObject {
                source_id,
                frame_number: header.frame_number,
                range_idx,
                doppler_idx,
                peak_val,
                x,
                y,
                z,
                range_cm,
                bearing_deg,
                velocity_mps: doppler_idx as f64 * opts.velocity_scale,
            }));
        }

        pos += DETECTED_POINT_LEN;
    }
}

fn decode_noise_profile(source_id: u16, header: &FrameHeader, payload: &[u8]) -> Option<NoiseProfile> {
    if payload.len() < 4 {
        return None;
    }
    let sample_count = payload.len() / 2;
    let sum: u64 = payload
        .chunks_exact(2)
        .take(sample_count)
        .map(|c| u16::from_le_bytes(c.try_into().unwrap()) as u64)
        .sum();
    Some(NoiseProfile {
        source_id,
        frame_number: header.frame_number,
        avg_level: sum as f64 / sample_count as f64,
        sample_count,
    })
}

fn decode_azimuth_heatmap(
    source_id: u16,
    header: &FrameHeader,
    payload: &[u8],
) -> Option<AzimuthHeatmap> {
    let cell_count = payload.len() / 4;
    if cell_count == 0 {
        return None;
    }
    let cells: Vec<u32> = payload
        .chunks_exact(4)
        .take(cell_count)
        .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
        .collect();
    let max_intensity = *cells.iter().max().unwrap();
    let avg_intensity = cells.iter().map(|&c| c as f64).sum::<f64>() / cell_count as f64;
    Some(AzimuthHeatmap {
        source_id,
        frame_number: header.frame_number,
        max_intensity,
        avg_intensity,
        cell_count,
    })
}

#[cfg(test)]
mod tests;
