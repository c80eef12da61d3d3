use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::seq::SliceRandom;

use crate::network::network::Network;
use crate::network::sample::TrainingSample;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Trains `network` for `config.epochs` epochs of shuffled mini-batches and
/// returns the mean training error of the **last completed epoch**.
///
/// Every epoch reshuffles the sample order, chunks it into
/// `config.batch_size` mini-batches, and feeds each to
/// `Network::train_batch` (one accumulated gradient update per batch).
///
/// # Early termination
/// The loop breaks early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Panics
/// Panics if `samples` is empty, `batch_size == 0`, or a pooled network has
/// fewer batch slots than `batch_size`.
pub fn train_loop(network: &mut Network, samples: &[TrainingSample], config: &TrainConfig) -> f32 {
    assert!(!samples.is_empty(), "samples must not be empty");
    assert!(config.batch_size > 0, "batch_size must be at least 1");

    let mut last_error = 0.0;

    for epoch in 1..=config.epochs {
        if let Some(ref flag) = config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                break;
            }
        }

        let t_start = Instant::now();

        // Shuffle sample order each epoch.
        let mut indices: Vec<usize> = (0..samples.len()).collect();
        indices.shuffle(&mut rand::thread_rng());

        let mut total = 0.0;
        let mut batches = 0;
        for chunk in indices.chunks(config.batch_size) {
            let batch: Vec<TrainingSample> =
                chunk.iter().map(|&index| samples[index].clone()).collect();
            total += network.train_batch(&batch);
            batches += 1;
        }
        last_error = total / batches as f32;

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_error: last_error,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }
    }

    last_error
}
