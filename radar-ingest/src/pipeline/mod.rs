//! Concurrent ingest pipeline: `ByteSource -> Source Driver -> Ring Stage ->
//! Processor -> Frame Decoder -> Record Sink`.

pub mod processor;
pub mod recorder;
pub mod ring;
pub mod source;

pub use processor::{Processor, ProcessorStats, DEFAULT_QUEUE_CAPACITY};
pub use recorder::Recorder;
pub use ring::{RawChunk, RingStage, DEFAULT_RING_CAPACITY};
pub use source::{ByteSource, ReplaySource, SerialSource};
