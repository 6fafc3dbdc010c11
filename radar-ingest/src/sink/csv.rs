//! Append-only CSV sink matching the layout documented in the external
//! interfaces section: one header row, then one row per record with
//! coordinate fields zeroed for non-point records.

use std::fs::File;
use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use super::RecordSink;
use crate::decoder::Record;
use crate::error::SinkError;

#[derive(Serialize)]
struct Row {
    timestamp: String,
    source_id: u16,
    frame_number: u32,
    bearing_deg: f64,
    range_cm: f64,
    velocity_or_intensity: f64,
    x: f64,
    y: f64,
    z: f64,
    peak_val: u16,
    range_idx: u16,
    doppler_idx: i16,
}

impl From<&Record> for Row {
    fn from(record: &Record) -> Self {
        let timestamp = chrono::Utc::now().to_rfc3339();
        match record {
            Record::DetectedObject(obj) => Row {
                timestamp,
                source_id: obj.source_id,
                frame_number: obj.frame_number,
                bearing_deg: obj.bearing_deg,
                range_cm: obj.range_cm,
                velocity_or_intensity: obj.velocity_mps,
                x: obj.x,
                y: obj.y,
                z: obj.z,
                peak_val: obj.peak_val,
                range_idx: obj.range_idx,
                doppler_idx: obj.doppler_idx,
            },
            Record::NoiseProfile(noise) => Row {
                timestamp,
                source_id: noise.source_id,
                frame_number: noise.frame_number,
                bearing_deg: 0.0,
                range_cm: 0.0,
                velocity_or_intensity: noise.avg_level,
                x: 0.0,
                y: 0.0,
                z: 0.0,
                peak_val: 0,
                range_idx: 0,
                doppler_idx: 0,
            },
            Record::AzimuthHeatmap(hm) => Row {
                timestamp,
                source_id: hm.source_id,
                frame_number: hm.frame_number,
                bearing_deg: 0.0,
                range_cm: 0.0,
                velocity_or_intensity: hm.max_intensity as f64,
                x: 0.0,
                y: 0.0,
                z: 0.0,
                peak_val: 0,
                range_idx: 0,
                doppler_idx: 0,
            },
        }
    }
}

pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|source| SinkError::CsvOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(CsvSink {
            writer: csv::Writer::from_writer(file),
        })
    }
}

#[async_trait]
impl RecordSink for CsvSink {
    async fn emit(&mut self, record: &Record) -> Result<(), SinkError> {
        let row = Row::from(record);
        self.writer
            .serialize(&row)
            .map_err(|e| SinkError::Write(std::io::Error::other(e)))
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(SinkError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DetectedObject;

    #[tokio::test]
    async fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        {
            let mut sink = CsvSink::create(&path).unwrap();
            let record = Record::DetectedObject(DetectedObject {
                source_id: 1,
                frame_number: 2,
                range_idx: 3,
                doppler_idx: -1,
                peak_val: 10,
                x: 1.0,
                y: 1.0,
                z: 0.0,
                range_cm: 141.42,
                bearing_deg: 45.0,
                velocity_mps: -0.1,
            });
            sink.emit(&record).await.unwrap();
            sink.flush().await.unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,source_id,frame_number,bearing_deg,range_cm,velocity_or_intensity,x,y,z,peak_val,range_idx,doppler_idx"
        );
        let row = lines.next().unwrap();
        assert!(row.contains(",1,2,45"), "unexpected row: {row}");
    }
}
