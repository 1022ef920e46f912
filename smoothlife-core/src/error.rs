//! Error types shared by every component of the engine.

use std::collections::TryReserveError;
use thiserror::Error;

/// Failures surfaced at initialization or at step entry.
///
/// None of these are retried internally: a configuration error cannot change
/// its outcome on a second attempt.
#[derive(Debug, Error)]
pub enum SmoothLifeError {
    /// A configuration or call argument is outside its legal domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A buffer length disagrees with the grid it is used against.
    #[error("{what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A working buffer for a step could not be reserved.
    #[error("failed to allocate {requested} elements")]
    AllocationFailure {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SmoothLifeError>;

impl SmoothLifeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SmoothLifeError::InvalidParameter(msg.into())
    }
}

/// Fails with `DimensionMismatch` unless `actual == expected`.
#[inline]
pub(crate) fn ensure_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SmoothLifeError::DimensionMismatch {
            what,
            expected,
            actual,
        })
    }
}
