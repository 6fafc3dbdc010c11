//! Human-readable console sink: one colorized line per record.

use async_trait::async_trait;
use colored::Colorize;

use super::RecordSink;
use crate::decoder::Record;
use crate::error::SinkError;

#[derive(Default)]
pub struct ConsoleSink;

#[async_trait]
impl RecordSink for ConsoleSink {
    async fn emit(&mut self, record: &Record) -> Result<(), SinkError> {
        match record {
            Record::DetectedObject(obj) => println!(
                "{} src={} frame={} bearing={:.1}° range={:.1}cm vel={:.2}m/s",
                "point".green(),
                obj.source_id,
                obj.frame_number,
                obj.bearing_deg,
                obj.range_cm,
                obj.velocity_mps,
            ),
            Record::NoiseProfile(noise) => println!(
                "{} src={} frame={} avg_level={:.1} samples={}",
                "noise".yellow(),
                noise.source_id,
                noise.frame_number,
                noise.avg_level,
                noise.sample_count,
            ),
            Record::AzimuthHeatmap(hm) => println!(
                "{} src={} frame={} max={} avg={:.1} cells={}",
                "heatmap".blue(),
                hm.source_id,
                hm.frame_number,
                hm.max_intensity,
                hm.avg_intensity,
                hm.cell_count,
            ),
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
