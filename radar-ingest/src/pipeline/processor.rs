//! Processor & Emitter: drains every ring stage, decodes, and forwards
//! records to a bounded output queue that a separate sink loop consumes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::ring::RingStage;
use crate::decoder::{decode_buffer_with, DecodeOptions, Record};

/// Default bound on the processor's output queue, in records.
pub const DEFAULT_QUEUE_CAPACITY: usize = 5_000;

const IDLE_POLL_INTERVAL: Duration = Duration::from_micros(500);
const STATS_INTERVAL: Duration = Duration::from_secs(3);

/// Counters reported on the periodic stats tick and exposed to the sink
/// loop for drop accounting.
#[derive(Default)]
pub struct ProcessorStats {
    pub records_emitted: AtomicU64,
    pub records_dropped: AtomicU64,
}

/// Drains `stages`, decodes each chunk, and pushes records onto a bounded
/// queue. Exits once `shutdown` is cancelled.
pub struct Processor {
    stages: Vec<Arc<RingStage>>,
    decode_opts: DecodeOptions,
    stats: Arc<ProcessorStats>,
}

impl Processor {
    pub fn new(stages: Vec<Arc<RingStage>>, decode_opts: DecodeOptions) -> Self {
        Processor {
            stages,
            decode_opts,
            stats: Arc::new(ProcessorStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<ProcessorStats> {
        self.stats.clone()
    }

    /// Run the drain/decode/forward loop until cancelled. `queue_capacity`
    /// bounds the output `mpsc::Sender` returned alongside the receiver the
    /// caller hands to a sink loop.
    pub async fn run(
        &self,
        queue_tx: mpsc::Sender<Record>,
        shutdown: CancellationToken,
    ) {
        info!(sources = self.stages.len(), "processor started");
        let started = tokio::time::Instant::now();
        let mut last_stats = started;

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let mut produced_any = false;
            for stage in &self.stages {
                let chunks = stage.drain_all();
                for chunk in chunks {
                    produced_any = true;
                    let records = decode_buffer_with(chunk.source_id, &chunk.bytes, self.decode_opts);
                    for record in records {
                        match queue_tx.try_send(record) {
                            Ok(()) => {
                                self.stats.records_emitted.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(_full_or_closed) => {
                                self.stats.records_dropped.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                }
            }

            if last_stats.elapsed() >= STATS_INTERVAL {
                let elapsed = started.elapsed().as_secs_f64().max(1e-9);
                let emitted = self.stats.records_emitted.load(Ordering::Relaxed);
                let dropped_chunks: u64 = self.stages.iter().map(|s| s.dropped_chunks()).sum();
                let dropped_records = self.stats.records_dropped.load(Ordering::Relaxed);
                info!(
                    records_per_sec = emitted as f64 / elapsed,
                    dropped_chunks,
                    dropped_records,
                    "processor stats"
                );
                last_stats = tokio::time::Instant::now();
            }

            if !produced_any {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(IDLE_POLL_INTERVAL) => {}
                }
            }
        }

        info!("processor stopped");
    }
}
