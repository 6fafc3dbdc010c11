//! Wire-format constants for the TI AWR1843BOOST output protocol.

/// 8-byte little-endian magic sentinel marking the start of a frame:
/// `{0x0102, 0x0304, 0x0506, 0x0708}` as emitted by the vendor firmware.
pub const MAGIC_WORD: [u8; 8] = [0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07];

/// Fixed size of the frame header, in bytes.
pub const HEADER_LEN: usize = 40;

/// Size of one TLV's `(type, length)` prefix, in bytes.
pub const TLV_PREFIX_LEN: usize = 8;

/// Size of the detected-points payload's leading descriptor, in bytes.
pub const DETECTED_POINTS_DESCRIPTOR_LEN: usize = 4;

/// Size of one detected-point record within the detected-points payload, in bytes.
pub const DETECTED_POINT_LEN: usize = 12;

pub const TLV_TYPE_DETECTED_POINTS: u32 = 1;
pub const TLV_TYPE_RANGE_PROFILE: u32 = 2;
pub const TLV_TYPE_NOISE_PROFILE: u32 = 3;
pub const TLV_TYPE_AZIMUTH_STATIC_HEATMAP: u32 = 4;
pub const TLV_TYPE_RANGE_DOPPLER_HEATMAP: u32 = 5;
pub const TLV_TYPE_STATS: u32 = 6;

/// Band-pass filter on derived range: a decoded point is only emitted when
/// `RANGE_CM_MIN < range_cm < RANGE_CM_MAX`.
pub const RANGE_CM_MIN: f64 = 5.0;
pub const RANGE_CM_MAX: f64 = 5000.0;

/// Doppler-to-velocity scale factor. The real factor is a function of chirp
/// configuration that isn't encoded in the frame; this is the vendor tool's
/// acknowledged first-order approximation, kept as a named constant rather
/// than an inline literal so a caller with chirp parameters can override it.
pub const DEFAULT_VELOCITY_SCALE: f64 = 0.1;
