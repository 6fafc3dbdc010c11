//! CLI surface (clap) plus TOML config file and environment-variable
//! layering, in the precedence CLI > env > config file > built-in default.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::pipeline::{DEFAULT_QUEUE_CAPACITY, DEFAULT_RING_CAPACITY};

const DEFAULT_REPLAY_SPEED: f64 = 2.0;

#[derive(Parser)]
#[command(name = "radar-ingest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ingest pipeline for TI AWR1843BOOST mmWave radar serial streams")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Raise log verbosity; repeat for more (-vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a TOML config file layered beneath CLI flags and environment variables.
    #[arg(long = "config", global = true)]
    pub config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the live/replay processing pipeline.
    Run(RunArgs),
    /// Capture a live serial source verbatim to a file for later replay.
    Record(RecordArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Serial port(s) to read live radar data from.
    #[arg(long = "live")]
    pub live: Vec<String>,

    /// Capture file(s) to replay instead of a live device.
    #[arg(long = "replay")]
    pub replay: Vec<PathBuf>,

    /// Replay playback speed multiplier.
    #[arg(long = "speed")]
    pub speed: Option<f64>,

    /// Path to append decoded records to as CSV.
    #[arg(long = "csv")]
    pub csv: Option<PathBuf>,

    /// Disable the console sink.
    #[arg(long = "no-console")]
    pub no_console: bool,

    /// Per-source ring stage capacity, in chunks.
    #[arg(long = "ring-capacity")]
    pub ring_capacity: Option<usize>,

    /// Processor output queue capacity, in records.
    #[arg(long = "queue-capacity")]
    pub queue_capacity: Option<usize>,
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Serial port to capture from.
    #[arg(long = "port")]
    pub port: String,

    /// Directory to write the timestamped capture file into.
    #[arg(long = "out")]
    pub out: PathBuf,
}

/// The subset of [`RunArgs`] fields that may also come from a config file.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub speed: Option<f64>,
    pub csv: Option<PathBuf>,
    pub no_console: Option<bool>,
    pub ring_capacity: Option<usize>,
    pub queue_capacity: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings for the `run` subcommand after layering CLI,
/// environment variables, the config file, and built-in defaults.
#[derive(Debug)]
pub struct RunSettings {
    pub live: Vec<String>,
    pub replay: Vec<PathBuf>,
    pub speed: f64,
    pub csv: Option<PathBuf>,
    pub console: bool,
    pub ring_capacity: usize,
    pub queue_capacity: usize,
}

impl RunSettings {
    pub fn resolve(args: &RunArgs, file: &FileConfig) -> Result<Self, ConfigError> {
        if args.live.is_empty() && args.replay.is_empty() {
            return Err(ConfigError::NoSources);
        }

        let speed = args
            .speed
            .or_else(|| env_f64("RADAR_SPEED"))
            .or(file.speed)
            .unwrap_or(DEFAULT_REPLAY_SPEED);

        let csv = args
            .csv
            .clone()
            .or_else(|| std::env::var_os("RADAR_CSV").map(PathBuf::from))
            .or_else(|| file.csv.clone());

        let no_console = args.no_console
            || env_bool("RADAR_NO_CONSOLE")
            || file.no_console.unwrap_or(false);

        let ring_capacity = args
            .ring_capacity
            .or_else(|| env_usize("RADAR_RING_CAPACITY"))
            .or(file.ring_capacity)
            .unwrap_or(DEFAULT_RING_CAPACITY);

        let queue_capacity = args
            .queue_capacity
            .or_else(|| env_usize("RADAR_QUEUE_CAPACITY"))
            .or(file.queue_capacity)
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);

        Ok(RunSettings {
            live: args.live.clone(),
            replay: args.replay.clone(),
            speed,
            csv,
            console: !no_console,
            ring_capacity,
            queue_capacity,
        })
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_bool(key: &str) -> bool {
    matches!(std::env::var(key).as_deref(), Ok("1") | Ok("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_requires_at_least_one_source() {
        let args = RunArgs::default();
        let err = RunSettings::resolve(&args, &FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoSources));
    }

    #[test]
    fn cli_flag_overrides_file_config() {
        let args = RunArgs {
            live: vec!["/dev/ttyUSB0".to_string()],
            speed: Some(5.0),
            ..RunArgs::default()
        };
        let file = FileConfig {
            speed: Some(1.0),
            ..FileConfig::default()
        };
        let settings = RunSettings::resolve(&args, &file).unwrap();
        assert_eq!(settings.speed, 5.0);
    }

    #[test]
    fn file_config_fills_in_when_cli_silent() {
        let args = RunArgs {
            live: vec!["/dev/ttyUSB0".to_string()],
            ..RunArgs::default()
        };
        let file = FileConfig {
            ring_capacity: Some(42),
            ..FileConfig::default()
        };
        let settings = RunSettings::resolve(&args, &file).unwrap();
        assert_eq!(settings.ring_capacity, 42);
    }

    #[test]
    fn defaults_apply_when_nothing_else_is_set() {
        let args = RunArgs {
            live: vec!["/dev/ttyUSB0".to_string()],
            ..RunArgs::default()
        };
        let settings = RunSettings::resolve(&args, &FileConfig::default()).unwrap();
        assert_eq!(settings.speed, DEFAULT_REPLAY_SPEED);
        assert_eq!(settings.ring_capacity, DEFAULT_RING_CAPACITY);
        assert_eq!(settings.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(settings.console);
    }
}
