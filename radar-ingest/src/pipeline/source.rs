//! Source drivers: one worker per [`ByteSource`], pushing chunks into a
//! [`RingStage`]. Two variants share the same shape — serial (blocking read
//! with a short timeout) and replay (byte-rate-paced file read).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::ring::{RawChunk, RingStage};
use crate::error::SourceError;

pub const READ_CHUNK_SIZE: usize = 2048;
pub const SERIAL_BAUD_RATE: u32 = 921_600;
const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(50);
const INACTIVE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One logical origin of bytes: a live serial device, or a capture file.
#[async_trait]
pub trait ByteSource: Send {
    fn source_id(&self) -> u16;

    /// Run until `shutdown` is cancelled, pushing chunks into `ring`.
    /// A cleared `active` flag suspends reads without ending the worker.
    async fn run(
        &mut self,
        ring: Arc<RingStage>,
        active: Arc<AtomicBool>,
        shutdown: CancellationToken,
    ) -> Result<(), SourceError>;
}

/// Reads a live serial device at [`SERIAL_BAUD_RATE`] baud.
pub struct SerialSource {
    source_id: u16,
    port_name: String,
    port: SerialStream,
}

impl SerialSource {
    pub fn open(source_id: u16, port_name: &str) -> Result<Self, SourceError> {
        let port = tokio_serial::new(port_name, SERIAL_BAUD_RATE)
            .timeout(SERIAL_READ_TIMEOUT)
            .open_native_async()
            .map_err(|source| SourceError::SerialOpen {
                port: port_name.to_string(),
                source,
            })?;
        Ok(SerialSource {
            source_id,
            port_name: port_name.to_string(),
            port,
        })
    }
}

#[async_trait]
impl ByteSource for SerialSource {
    fn source_id(&self) -> u16 {
        self.source_id
    }

    async fn run(
        &mut self,
        ring: Arc<RingStage>,
        active: Arc<AtomicBool>,
        shutdown: CancellationToken,
    ) -> Result<(), SourceError> {
        debug!(source_id = self.source_id, port = %self.port_name, "serial source started");
        let mut buf = [0u8; READ_CHUNK_SIZE];

        loop {
            if !active.load(Ordering::Relaxed) {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(INACTIVE_POLL_INTERVAL) => continue,
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                read = tokio::time::timeout(SERIAL_READ_TIMEOUT, self.port.read(&mut buf)) => {
                    match read {
                        Ok(Ok(0)) => {}
                        Ok(Ok(n)) => {
                            trace!(source_id = self.source_id, bytes = n, "serial read");
                            ring.put(RawChunk {
                                source_id: self.source_id,
                                timestamp: Instant::now(),
                                bytes: buf[..n].to_vec(),
                            });
                        }
                        Ok(Err(source)) => {
                            return Err(SourceError::Read { source_id: self.source_id, source });
                        }
                        Err(_elapsed) => {}
                    }
                }
            }
        }

        debug!(source_id = self.source_id, "serial source stopped");
        Ok(())
    }
}

/// Replays a previously captured file at a configurable multiple of
/// real-time serial bandwidth, looping back to the start at end-of-file.
pub struct ReplaySource {
    source_id: u16,
    path: PathBuf,
    file: File,
    speed: f64,
}

impl ReplaySource {
    pub async fn open(source_id: u16, path: &Path, speed: f64) -> Result<Self, SourceError> {
        let file = File::open(path)
            .await
            .map_err(|source| SourceError::ReplayOpen {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(ReplaySource {
            source_id,
            path: path.to_path_buf(),
            file,
            speed,
        })
    }

    fn chunk_delay(&self, chunk_len: usize) -> Duration {
        replay_chunk_delay(self.speed, chunk_len)
    }
}

fn replay_chunk_delay(speed: f64, chunk_len: usize) -> Duration {
    let bytes_per_sec = (SERIAL_BAUD_RATE as f64 / 8.0) * speed;
    Duration::from_secs_f64(chunk_len as f64 / bytes_per_sec)
}

#[async_trait]
impl ByteSource for ReplaySource {
    fn source_id(&self) -> u16 {
        self.source_id
    }

    async fn run(
        &mut self,
        ring: Arc<RingStage>,
        active: Arc<AtomicBool>,
        shutdown: CancellationToken,
    ) -> Result<(), SourceError> {
        debug!(source_id = self.source_id, path = %self.path.display(), "replay source started");
        let mut buf = vec![0u8; READ_CHUNK_SIZE];

        loop {
            if shutdown.is_cancelled() {
                break;
            }
            if !active.load(Ordering::Relaxed) {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(INACTIVE_POLL_INTERVAL) => continue,
                }
            }

            let n = self
                .file
                .read(&mut buf)
                .await
                .map_err(|source| SourceError::Read {
                    source_id: self.source_id,
                    source,
                })?;

            if n == 0 {
                trace!(source_id = self.source_id, "replay reached end-of-file, rewinding");
                self.file
                    .seek(SeekFrom::Start(0))
                    .await
                    .map_err(|source| SourceError::Read {
                        source_id: self.source_id,
                        source,
                    })?;
                continue;
            }

            ring.put(RawChunk {
                source_id: self.source_id,
                timestamp: Instant::now(),
                bytes: buf[..n].to_vec(),
            });

            let delay = self.chunk_delay(n);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        debug!(source_id = self.source_id, "replay source stopped");
        Ok(())
    }
}
