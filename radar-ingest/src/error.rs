//! Typed errors at the seams between the core and the outside world.
//!
//! Decode-local errors never reach here (§4.1/§7 of the design handles them
//! by skipping and continuing); these variants cover source, sink, and
//! configuration failures, which are the ones a caller needs to react to.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to open serial port {port}: {source}")]
    SerialOpen {
        port: String,
        #[source]
        source: tokio_serial::Error,
    },

    #[error("failed to open replay file {path}: {source}")]
    ReplayOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read from source {source_id} failed: {source}")]
    Read {
        source_id: u16,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to open CSV output at {path}: {source}")]
    CsvOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write to sink failed: {0}")]
    Write(#[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("failed to open serial port {port}: {source}")]
    SerialOpen {
        port: String,
        #[source]
        source: tokio_serial::Error,
    },

    #[error("failed to create capture file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write to capture file failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("read from serial port failed: {0}")]
    Read(#[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("neither --live nor --replay was given; at least one source is required")]
    NoSources,
}
