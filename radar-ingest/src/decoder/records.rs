use serde::Serialize;

/// A single detected point target, converted from the vendor's fixed-point
/// representation into meters plus derived range/bearing/velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectedObject {
    pub source_id: u16,
    pub frame_number: u32,
    pub range_idx: u16,
    pub doppler_idx: i16,
    pub peak_val: u16,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub range_cm: f64,
    pub bearing_deg: f64,
    pub velocity_mps: f64,
}

/// A noise-floor summary for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoiseProfile {
    pub source_id: u16,
    pub frame_number: u32,
    pub avg_level: f64,
    pub sample_count: usize,
}

/// A static azimuth heatmap summary for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AzimuthHeatmap {
    pub source_id: u16,
    pub frame_number: u32,
    pub max_intensity: u32,
    pub avg_intensity: f64,
    pub cell_count: usize,
}

/// One decoded, semantically meaningful item yielded by the frame decoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Record {
    DetectedObject(DetectedObject),
    NoiseProfile(NoiseProfile),
    AzimuthHeatmap(AzimuthHeatmap),
}

impl Record {
    pub fn source_id(&self) -> u16 {
        match self {
            Record::DetectedObject(r) => r.source_id,
            Record::NoiseProfile(r) => r.source_id,
            Record::AzimuthHeatmap(r) => r.source_id,
        }
    }

    pub fn frame_number(&self) -> u32 {
        match self {
            Record::DetectedObject(r) => r.frame_number,
            Record::NoiseProfile(r) => r.frame_number,
            Record::AzimuthHeatmap(r) => r.frame_number,
        }
    }
}
