//! Binary entry point: parses the CLI, wires up sources/pipeline/sinks for
//! `run`, or drives the capture path for `record`.

use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use radar_ingest::config::{Cli, Command, FileConfig, RecordArgs, RunArgs, RunSettings};
use radar_ingest::decoder::DecodeOptions;
use radar_ingest::pipeline::{ByteSource, Processor, ReplaySource, RingStage, SerialSource};
use radar_ingest::sink::{ConsoleSink, CsvSink, FanOutSink, RecordSink};
use radar_ingest::{logging, pipeline};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    match runtime.block_on(dispatch(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let file_config = match &cli.config_file {
        Some(path) => FileConfig::load(path).context("loading config file")?,
        None => FileConfig::default(),
    };

    match cli.command {
        Command::Run(args) => run(args, file_config).await,
        Command::Record(args) => record(args).await,
    }
}

async fn run(args: RunArgs, file_config: FileConfig) -> Result<()> {
    let settings = RunSettings::resolve(&args, &file_config).context("resolving run settings")?;
    let shutdown = CancellationToken::new();
    spawn_shutdown_on_ctrl_c(shutdown.clone());

    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
    if settings.console {
        sinks.push(Box::new(ConsoleSink));
    }
    if let Some(csv_path) = &settings.csv {
        sinks.push(Box::new(CsvSink::create(csv_path).context("opening CSV sink")?));
    }
    let mut sink = FanOutSink::new(sinks);

    let mut stages = Vec::new();
    let mut source_handles = Vec::new();
    let mut next_source_id: u16 = 0;

    for port in &settings.live {
        let source_id = next_source_id;
        next_source_id += 1;
        let source = SerialSource::open(source_id, port).context("opening live serial source")?;
        let stage = Arc::new(RingStage::new(settings.ring_capacity));
        stages.push(stage.clone());
        source_handles.push(spawn_source(source, stage, shutdown.clone()));
    }

    for path in &settings.replay {
        let source_id = next_source_id;
        next_source_id += 1;
        let source = ReplaySource::open(source_id, path, settings.speed)
            .await
            .context("opening replay source")?;
        let stage = Arc::new(RingStage::new(settings.ring_capacity));
        stages.push(stage.clone());
        source_handles.push(spawn_source(source, stage, shutdown.clone()));
    }

    let processor = Processor::new(stages, DecodeOptions::default());
    let (record_tx, mut record_rx) = mpsc::channel(settings.queue_capacity);
    let processor_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { processor.run(record_tx, shutdown).await })
    };

    loop {
        tokio::select! {
            maybe_record = record_rx.recv() => {
                match maybe_record {
                    Some(record) => sink.emit(&record).await.context("emitting record")?,
                    None => break,
                }
            }
            _ = shutdown.cancelled() => break,
        }
    }

    for handle in source_handles {
        let _ = handle.await;
    }
    let _ = processor_handle.await;
    while let Ok(record) = record_rx.try_recv() {
        sink.emit(&record).await.context("emitting record during drain")?;
    }
    sink.flush().await.context("flushing sinks")?;

    Ok(())
}

fn spawn_source<S>(
    mut source: S,
    stage: Arc<RingStage>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()>
where
    S: ByteSource + Send + 'static,
{
    tokio::spawn(async move {
        let active = Arc::new(AtomicBool::new(true));
        if let Err(err) = source.run(stage, active, shutdown).await {
            tracing::error!(source_id = source.source_id(), error = %err, "source driver exited with error");
        }
    })
}

async fn record(args: RecordArgs) -> Result<()> {
    let shutdown = CancellationToken::new();
    spawn_shutdown_on_ctrl_c(shutdown.clone());

    let timestamp = chrono::Utc::now();
    let recorder = pipeline::Recorder::open(0, &args.port, &args.out, timestamp)
        .await
        .context("opening recorder")?;
    tracing::info!(path = %recorder.path().display(), "capture file created");
    recorder.run(shutdown).await.context("recording")?;
    Ok(())
}

fn spawn_shutdown_on_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown requested");
        shutdown.cancel();
    });
}
