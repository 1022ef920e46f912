//! Fallible buffer allocation.
//!
//! Per-step working buffers are reserved with `try_reserve_exact` so that an
//! out-of-memory condition aborts the step with an error instead of the process.

use crate::error::{Result, SmoothLifeError};

/// Allocate a `Vec` of `len` copies of `value`, reporting allocator failure.
pub fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| SmoothLifeError::AllocationFailure {
            requested: len,
            source,
        })?;
    buf.resize(len, value);
    Ok(buf)
}
