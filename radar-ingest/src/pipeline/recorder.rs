//! Record mode (§4.5): capture a live serial source verbatim to a
//! timestamped file so it can be replayed later, byte-for-byte, through
//! [`super::source::ReplaySource`].
//!
//! This path bypasses the ring stage and processor entirely — a single
//! serial source feeds a single file writer with no fan-in, so there is no
//! overflow condition to account for. Backpressure is just file-I/O
//! latency.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::source::{READ_CHUNK_SIZE, SERIAL_BAUD_RATE};
use crate::error::RecorderError;

const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Builds the capture file name the original tool used:
/// `radar_<source_id>_<RFC3339-ish timestamp>.bin`.
pub fn capture_file_name(source_id: u16, timestamp: chrono::DateTime<chrono::Utc>) -> String {
    format!(
        "radar_{}_{}.bin",
        source_id,
        timestamp.format("%Y%m%dT%H%M%S")
    )
}

pub struct Recorder {
    source_id: u16,
    port: SerialStream,
    file: File,
    path: PathBuf,
}

impl Recorder {
    pub async fn open(
        source_id: u16,
        port_name: &str,
        out_dir: &Path,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> Result<Self, RecorderError> {
        let port = tokio_serial::new(port_name, SERIAL_BAUD_RATE)
            .timeout(SERIAL_READ_TIMEOUT)
            .open_native_async()
            .map_err(|source| RecorderError::SerialOpen {
                port: port_name.to_string(),
                source,
            })?;

        fs::create_dir_all(out_dir)
            .await
            .map_err(|source| RecorderError::CreateFile {
                path: out_dir.to_path_buf(),
                source,
            })?;
        let path = out_dir.join(capture_file_name(source_id, timestamp));
        let file = File::create(&path)
            .await
            .map_err(|source| RecorderError::CreateFile {
                path: path.clone(),
                source,
            })?;

        Ok(Recorder {
            source_id,
            port,
            file,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append every non-empty read to the capture file, flushing after
    /// each write, until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), RecorderError> {
        info!(source_id = self.source_id, path = %self.path.display(), "recording started");
        let mut buf = [0u8; READ_CHUNK_SIZE];

        loop {
            use tokio::io::AsyncReadExt;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                read = tokio::time::timeout(SERIAL_READ_TIMEOUT, self.port.read(&mut buf)) => {
                    match read {
                        Ok(Ok(0)) => {}
                        Ok(Ok(n)) => {
                            self.file
                                .write_all(&buf[..n])
                                .await
                                .map_err(RecorderError::Write)?;
                            self.file.flush().await.map_err(RecorderError::Write)?;
                            debug!(source_id = self.source_id, bytes = n, "appended to capture");
                        }
                        Ok(Err(source)) => {
                            return Err(RecorderError::Read(source));
                        }
                        Err(_elapsed) => {}
                    }
                }
            }
        }

        info!(source_id = self.source_id, "recording stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_file_name_matches_original_naming() {
        let ts = chrono::DateTime::parse_from_rfc3339("2026-07-31T12:30:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(capture_file_name(3, ts), "radar_3_20260731T123000.bin");
    }
}
