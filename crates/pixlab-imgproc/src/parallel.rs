use std::ops::Range;

use rayon::prelude::*;
use thiserror::Error;

use pixlab_image::{Image, ImageError};

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row stride for AutoRows must be valid.
    #[error("row stride must be > 0 for AutoRows strategy")]
    InvalidRowStride(usize),

    /// Input and output sizes do not match.
    #[error("source and destination slices must have the same length")]
    SizeMismatch,
}

impl From<ParallelError> for ImageError {
    fn from(err: ParallelError) -> Self {
        ImageError::Parallel(err.to_string())
    }
}

/// A caller-owned, fixed-size pool of worker threads.
///
/// Every operation in this crate runs on the rayon pool that is current when it is
/// called. Wrapping calls in [`WorkerPool::install`] runs them on this pool instead of
/// the global one, which is how the number of workers is configured.
///
/// # Example
///
/// ```
/// use pixlab_image::{Image, ImageSize};
/// use pixlab_imgproc::{histogram, parallel::WorkerPool};
///
/// let pool = WorkerPool::new(2).unwrap();
/// let image = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 7).unwrap();
///
/// let hist = pool.install(|| histogram::compute_histogram(&image));
/// assert_eq!(hist[7], 16);
/// ```
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Build a pool with `num_threads` workers.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_threads` is zero or the pool cannot be spawned.
    pub fn new(num_threads: usize) -> Result<Self, ParallelError> {
        if num_threads == 0 {
            return Err(ParallelError::InvalidThreadCount(num_threads));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("pixlab-worker-{i}"))
            .build()
            .map_err(|e| ParallelError::BuildError(e.to_string()))?;

        log::debug!("built worker pool with {num_threads} threads");

        Ok(Self { pool })
    }

    /// Number of worker threads in the pool.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the pool; parallel iterators used by `op` execute on its workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

/// Split `len` items into `workers` contiguous ranges.
///
/// Every range has `len / workers` items except the last one, which also takes the
/// remainder. The worker count is clamped to `[1, len]`, so no range is empty unless
/// `len` is zero.
///
/// # Example
///
/// ```
/// use pixlab_imgproc::parallel::chunk_ranges;
///
/// assert_eq!(chunk_ranges(10, 3), vec![0..3, 3..6, 6..10]);
/// ```
pub fn chunk_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.clamp(1, len.max(1));
    let per_worker = len / workers;

    (0..workers)
        .map(|i| {
            let start = i * per_worker;
            let end = if i == workers - 1 {
                len
            } else {
                (i + 1) * per_worker
            };
            start..end
        })
        .collect()
}

/// Controls how parallel operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the current Rayon thread pool to process every element in parallel.
    ///
    /// This maximizes parallelism but may have overhead for small operations.
    #[default]
    ParallelElements,

    /// Use the current Rayon thread pool to process rows (chunks) in parallel.
    ///
    /// You must provide the row stride (width * channels).
    /// This is often more cache-friendly than [`ExecutionStrategy::ParallelElements`].
    AutoRows(usize),

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,
}

/// Apply a function to each pixel in the image in parallel.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Trait to execute operations on a slice with a given strategy.
pub trait ExecuteExt<T> {
    /// Execute an operation on the slice with the given strategy.
    ///
    /// # Arguments
    ///
    /// * `strategy` - The execution strategy.
    /// * `dst` - The destination slice.
    /// * `op` - The operation to perform on each (source, destination) element pair.
    ///
    /// # Returns
    ///
    /// A result indicating success or failure.
    fn execute_with<U, F>(
        &self,
        strategy: ExecutionStrategy,
        dst: &mut [U],
        op: F,
    ) -> Result<(), ParallelError>
    where
        U: Send,
        F: Fn((&T, &mut U)) + Sync + Send;
}

impl<T: Sync> ExecuteExt<T> for [T] {
    fn execute_with<U, F>(
        &self,
        strategy: ExecutionStrategy,
        dst: &mut [U],
        op: F,
    ) -> Result<(), ParallelError>
    where
        U: Send,
        F: Fn((&T, &mut U)) + Sync + Send,
    {
        if self.len() != dst.len() {
            return Err(ParallelError::SizeMismatch);
        }

        match strategy {
            ExecutionStrategy::Serial => {
                self.iter().zip(dst.iter_mut()).for_each(op);
            }
            ExecutionStrategy::ParallelElements => {
                self.par_iter().zip(dst.par_iter_mut()).for_each(op);
            }
            ExecutionStrategy::AutoRows(stride) => {
                if stride == 0 {
                    return Err(ParallelError::InvalidRowStride(stride));
                }
                self.par_chunks(stride)
                    .zip(dst.par_chunks_mut(stride))
                    .for_each(|(src_row, dst_row)| {
                        src_row.iter().zip(dst_row.iter_mut()).for_each(&op);
                    });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_serial() {
        let src = vec![1, 2, 3, 4];
        let mut dst = vec![0; 4];
        src.as_slice()
            .execute_with(ExecutionStrategy::Serial, &mut dst, |(s, d)| *d = *s * 2)
            .unwrap();
        assert_eq!(dst, vec![2, 4, 6, 8]);
    }

    #[test]
    fn test_execute_parallel_elements() {
        let src = vec![1u8, 2, 3, 4];
        let mut dst = vec![0u32; 4];
        src.as_slice()
            .execute_with(ExecutionStrategy::ParallelElements, &mut dst, |(s, d)| {
                *d = *s as u32 * 1000
            })
            .unwrap();
        assert_eq!(dst, vec![1000, 2000, 3000, 4000]);
    }

    #[test]
    fn test_execute_auto_rows() {
        let src = vec![1, 2, 3, 4];
        let mut dst = vec![0; 4];
        src.as_slice()
            .execute_with(ExecutionStrategy::AutoRows(2), &mut dst, |(s, d)| {
                *d = *s * 2
            })
            .unwrap();
        assert_eq!(dst, vec![2, 4, 6, 8]);
    }

    #[test]
    fn test_execute_auto_rows_invalid() {
        let src = vec![1];
        let mut dst = vec![0];
        let res =
            src.as_slice()
                .execute_with(ExecutionStrategy::AutoRows(0), &mut dst, |(_, _)| {});
        assert!(matches!(res, Err(ParallelError::InvalidRowStride(0))));
    }

    #[test]
    fn test_execute_size_mismatch() {
        let src = vec![1, 2];
        let mut dst = vec![0; 3];
        let res = src
            .as_slice()
            .execute_with(ExecutionStrategy::Serial, &mut dst, |(_, _)| {});
        assert_eq!(res, Err(ParallelError::SizeMismatch));
    }

    #[test]
    fn test_worker_pool() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.num_threads(), 3);
        assert_eq!(pool.install(rayon::current_num_threads), 3);
    }

    #[test]
    fn test_worker_pool_invalid() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(ParallelError::InvalidThreadCount(0))
        ));
    }

    #[test]
    fn test_chunk_ranges() {
        assert_eq!(chunk_ranges(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
        assert_eq!(chunk_ranges(9, 4), vec![0..2, 2..4, 4..6, 6..9]);
        assert_eq!(chunk_ranges(2, 3), vec![0..1, 1..2]);
        assert_eq!(chunk_ranges(5, 0), vec![0..5]);
        assert_eq!(chunk_ranges(0, 2), vec![0..0]);
    }

    #[test]
    fn test_chunk_ranges_huge_worker_count() {
        assert_eq!(chunk_ranges(3, usize::MAX), vec![0..1, 1..2, 2..3]);
        assert_eq!(chunk_ranges(0, usize::MAX), vec![0..0]);
    }
}
