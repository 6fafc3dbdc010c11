//! Per-source bounded queue of raw byte chunks with overwrite-oldest drop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

/// Default ring capacity, in chunks, absent an explicit `--ring-capacity`.
pub const DEFAULT_RING_CAPACITY: usize = 30_000;

/// A raw byte chunk read from one source, tagged with its arrival time.
#[derive(Debug, Clone)]
pub struct RawChunk {
    pub source_id: u16,
    pub timestamp: Instant,
    pub bytes: Vec<u8>,
}

/// Bounded single-producer/single-consumer ring of [`RawChunk`]s.
///
/// `put` never blocks: once full, the oldest chunk is overwritten and
/// `dropped_chunks` ticks up. `drain_all` atomically empties the buffer so
/// the consumer's wake-up cost stays independent of how deep the ring got
/// while nobody was draining it.
pub struct RingStage {
    capacity: usize,
    queue: Mutex<VecDeque<RawChunk>>,
    dropped_chunks: AtomicU64,
}

impl RingStage {
    pub fn new(capacity: usize) -> Self {
        RingStage {
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            dropped_chunks: AtomicU64::new(0),
        }
    }

    pub fn put(&self, chunk: RawChunk) {
        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            queue.pop_front();
            self.dropped_chunks.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(chunk);
    }

    /// Atomically remove and return every chunk currently queued.
    pub fn drain_all(&self) -> Vec<RawChunk> {
        let mut queue = self.queue.lock();
        queue.drain(..).collect()
    }

    pub fn dropped_chunks(&self) -> u64 {
        self.dropped_chunks.load(Ordering::Relaxed)
    }
}

impl Default for RingStage {
    fn default() -> Self {
        RingStage::new(DEFAULT_RING_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(b: u8) -> RawChunk {
        RawChunk {
            source_id: 1,
            timestamp: Instant::now(),
            bytes: vec![b],
        }
    }

    #[test]
    fn drain_all_preserves_arrival_order_and_empties() {
        let ring = RingStage::new(10);
        for i in 0..5u8 {
            ring.put(chunk(i));
        }
        let drained = ring.drain_all();
        assert_eq!(
            drained.iter().map(|c| c.bytes[0]).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
        assert!(ring.drain_all().is_empty());
    }

    #[test]
    fn overflow_drops_oldest_and_counts() {
        let ring = RingStage::new(3);
        for i in 0..5u8 {
            ring.put(chunk(i));
        }
        assert_eq!(ring.dropped_chunks(), 2);
        let drained = ring.drain_all();
        assert_eq!(
            drained.iter().map(|c| c.bytes[0]).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn dropped_chunks_is_monotonically_non_decreasing() {
        let ring = RingStage::new(2);
        let mut last = 0;
        for i in 0..20u8 {
            ring.put(chunk(i));
            let current = ring.dropped_chunks();
            assert!(current >= last);
            last = current;
        }
    }
}
