//! Record sinks: consumers of decoded [`crate::decoder::Record`]s.

pub mod console;
pub mod csv;

pub use self::console::ConsoleSink;
pub use self::csv::CsvSink;

use async_trait::async_trait;

use crate::decoder::Record;
use crate::error::SinkError;

/// Every 100 emitted records the pipeline calls [`RecordSink::flush`]; it is
/// also called once on shutdown.
pub const FLUSH_INTERVAL: u64 = 100;

#[async_trait]
pub trait RecordSink: Send {
    async fn emit(&mut self, record: &Record) -> Result<(), SinkError>;
    async fn flush(&mut self) -> Result<(), SinkError>;
}

/// Fans a record out to every sink in the list, flushing each one every
/// [`FLUSH_INTERVAL`] records.
pub struct FanOutSink {
    sinks: Vec<Box<dyn RecordSink>>,
    emitted: u64,
}

impl FanOutSink {
    pub fn new(sinks: Vec<Box<dyn RecordSink>>) -> Self {
        FanOutSink { sinks, emitted: 0 }
    }
}

#[async_trait]
impl RecordSink for FanOutSink {
    async fn emit(&mut self, record: &Record) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.emit(record).await?;
        }
        self.emitted += 1;
        if self.emitted.is_multiple_of(FLUSH_INTERVAL) {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.flush().await?;
        }
        Ok(())
    }
}
