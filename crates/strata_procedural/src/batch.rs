//! # Parallel Batch Generation
//!
//! Generates many chunks on a fixed pool of scoped worker threads. Jobs go
//! out over one channel, results come back over another tagged with their
//! input position, and the output is reassembled in input order.
//!
//! Every chunk is a pure function of `(seed, config, coord)`, so the result
//! is identical to generating the same coordinates one by one.

use std::time::Instant;

use crossbeam_channel::unbounded;

use crate::chunk::{ChunkCoord, ChunkVolume};
use crate::generator::TerrainGenerator;
use crate::progress::ProgressSink;

/// Generates `coords` on `workers` threads, returning volumes in input order.
///
/// `workers == 0` is treated as one worker.
#[must_use]
pub fn generate_batch(
    generator: &dyn TerrainGenerator,
    coords: &[ChunkCoord],
    workers: usize,
    progress: &dyn ProgressSink,
) -> Vec<ChunkVolume> {
    if coords.is_empty() {
        return Vec::new();
    }
    let start = Instant::now();
    let workers = workers.clamp(1, coords.len());

    let (job_tx, job_rx) = unbounded::<(usize, ChunkCoord)>();
    let (result_tx, result_rx) = unbounded::<(usize, ChunkVolume)>();
    for job in coords.iter().copied().enumerate() {
        // Receiver is alive until the scope below ends.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, coord) in job_rx.iter() {
                    let volume = generator.generate_chunk_with_progress(coord, progress);
                    if result_tx.send((index, volume)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<ChunkVolume>> = Vec::with_capacity(coords.len());
    slots.resize_with(coords.len(), || None);
    for (index, volume) in result_rx.iter() {
        slots[index] = Some(volume);
    }

    let volumes: Vec<ChunkVolume> = slots.into_iter().flatten().collect();
    tracing::info!(
        "Generated {} chunks on {} workers in {:?}",
        volumes.len(),
        workers,
        start.elapsed()
    );
    volumes
}
