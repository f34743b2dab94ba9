//! Batch unwrapping, optionally on a rayon pool
//!
//! Each record is traversed on one thread from start to finish; only
//! independent records run concurrently. Results come back in input order.

use dewrap_codec::{unwrap_record_with_stats, UnwrapStats, WrapperStrategy};
use dewrap_format::{DewrapError, Mapping, Result, Value};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Build a worker pool for `threads > 1`, `None` for sequential processing
pub fn build_pool(threads: usize) -> Result<Option<ThreadPool>> {
    if threads <= 1 {
        return Ok(None);
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("dewrap-worker-{}", idx))
        .build()
        .map_err(|e| DewrapError::Internal(format!("Failed to create thread pool: {}", e)))?;
    debug!(threads, "built worker pool");
    Ok(Some(pool))
}

/// Unwrap every record of `batch`, preserving order
pub fn unwrap_batch<S>(
    batch: &[Value],
    strategy: &S,
    pool: Option<&ThreadPool>,
) -> Vec<Result<(Mapping, UnwrapStats)>>
where
    S: WrapperStrategy + Sync + ?Sized,
{
    let results = match pool {
        Some(pool) => pool.install(|| {
            batch
                .par_iter()
                .map(|record| unwrap_record_with_stats(record, strategy))
                .collect()
        }),
        None => batch
            .iter()
            .map(|record| unwrap_record_with_stats(record, strategy))
            .collect(),
    };
    debug!(records = batch.len(), parallel = pool.is_some(), "unwrapped batch");
    results
}
