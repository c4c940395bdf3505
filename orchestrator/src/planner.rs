use std::{num::NonZeroUsize, ops::Range};

use comms::Partition;

/// Splits `test_count` items among `num_workers` workers.
///
/// Properties:
/// - One partition per worker, worker 0 gets the earliest indices.
/// - Partitions are contiguous, disjoint and cover `[0..test_count)` in ascending order.
/// - Sizes differ by at most 1, the first `test_count % num_workers` get the extra item.
pub fn plan(test_count: usize, num_workers: NonZeroUsize) -> Vec<Partition> {
    let num_workers = num_workers.get();

    (0..num_workers)
        .map(|worker_id| {
            let range = shard_range(test_count, worker_id, num_workers);
            Partition::new(range.start, range.len())
        })
        .collect()
}

/// The index range `worker_id` owns when `total` items are split among `num_workers`.
fn shard_range(total: usize, worker_id: usize, num_workers: usize) -> Range<usize> {
    debug_assert!(worker_id < num_workers);

    let base = total / num_workers;
    let rem = total % num_workers;

    let start = worker_id * base + worker_id.min(rem);
    let extra = usize::from(worker_id < rem);
    let end = start + base + extra;

    start..end
}
