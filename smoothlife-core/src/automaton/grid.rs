//! Double-buffered toroidal world state.
//!
//! `GridState` owns the current generation and a spare set of channel buffers.
//! A step borrows the spare set as its "next" generation, fills it from the
//! read-only current set, and hands it back through `commit`, at which point
//! the two sets trade places. No data is copied and "next" never aliases
//! "current".

use tracing::{debug, warn};

use crate::core::config::MAX_CHANNELS;
use crate::error::{ensure_len, Result, SmoothLifeError};
use crate::utils::buffer::try_filled;

/// Where the grid is in its step cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    Idle,
    Stepping,
    Committed,
}

/// Channel buffers of the generation being computed.
///
/// Owned exclusively by the stepper between `begin_step` and `commit`/`abort`.
pub struct NextGeneration {
    pub channels: Vec<Vec<f64>>,
}

pub struct GridState {
    width: usize,
    height: usize,
    current: Vec<Vec<f64>>,
    /// Previous generation's buffers, reused as the next "next"
    spare: Option<Vec<Vec<f64>>>,
    generation: u64,
    phase: StepPhase,
}

impl GridState {
    /// All-zero grid.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        check_shape(width, height, channels)?;
        let current = (0..channels)
            .map(|_| try_filled(width * height, 0.0))
            .collect::<Result<Vec<_>>>()?;
        Self::from_channels(width, height, current)
    }

    /// Grid from pre-filled channels, each of length `width * height`.
    pub fn from_channels(width: usize, height: usize, channels: Vec<Vec<f64>>) -> Result<Self> {
        check_shape(width, height, channels.len())?;
        for ch in &channels {
            ensure_len("world channel", width * height, ch.len())?;
        }
        Ok(GridState {
            width,
            height,
            current: channels,
            spare: None,
            generation: 0,
            phase: StepPhase::Idle,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    pub fn channel_count(&self) -> usize {
        self.current.len()
    }

    pub fn channel(&self, c: usize) -> &[f64] {
        &self.current[c]
    }

    pub fn channels(&self) -> &[Vec<f64>] {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Mean state per channel.
    pub fn channel_means(&self) -> Vec<f64> {
        let n = self.cells() as f64;
        self.current
            .iter()
            .map(|ch| ch.iter().sum::<f64>() / n)
            .collect()
    }

    /// Hand the spare buffers to the stepper and enter `Stepping`.
    ///
    /// Spare buffers are allocated on the first step; an allocation failure
    /// leaves the grid untouched.
    pub fn begin_step(&mut self) -> Result<NextGeneration> {
        if self.phase != StepPhase::Idle {
            return Err(SmoothLifeError::invalid(format!(
                "step already in progress (phase {:?})",
                self.phase
            )));
        }
        let channels = match self.spare.take() {
            Some(bufs) => bufs,
            None => (0..self.channel_count())
                .map(|_| try_filled(self.cells(), 0.0))
                .collect::<Result<Vec<_>>>()?,
        };
        self.phase = StepPhase::Stepping;
        Ok(NextGeneration { channels })
    }

    /// Make `next` the current generation; the old current becomes spare.
    pub fn commit(&mut self, next: NextGeneration) -> Result<()> {
        if self.phase != StepPhase::Stepping {
            return Err(SmoothLifeError::invalid("commit without a step in progress"));
        }
        if let Err(e) = self.check_next(&next) {
            self.abort(next);
            return Err(e);
        }

        let old = std::mem::replace(&mut self.current, next.channels);
        self.spare = Some(old);
        self.generation += 1;
        self.phase = StepPhase::Committed;
        debug!("[Grid] committed generation {}", self.generation);
        self.phase = StepPhase::Idle;
        Ok(())
    }

    fn check_next(&self, next: &NextGeneration) -> Result<()> {
        if next.channels.len() != self.channel_count() {
            return Err(SmoothLifeError::DimensionMismatch {
                what: "next generation channels",
                expected: self.channel_count(),
                actual: next.channels.len(),
            });
        }
        for ch in &next.channels {
            ensure_len("next generation channel", self.cells(), ch.len())?;
        }
        Ok(())
    }

    /// Abandon a step: current stays as it was, buffers return to the pool.
    pub fn abort(&mut self, next: NextGeneration) {
        warn!("[Grid] step aborted at generation {}", self.generation);
        if next.channels.len() == self.channel_count()
            && next.channels.iter().all(|c| c.len() == self.cells())
        {
            self.spare = Some(next.channels);
        }
        self.phase = StepPhase::Idle;
    }
}

fn check_shape(width: usize, height: usize, channels: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SmoothLifeError::invalid(format!(
            "grid dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if channels == 0 || channels > MAX_CHANNELS {
        return Err(SmoothLifeError::invalid(format!(
            "channels must be between 1 and {}, got {}",
            MAX_CHANNELS, channels
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_swaps_without_copy() {
        let mut grid = GridState::from_channels(2, 2, vec![vec![0.1; 4]]).unwrap();
        assert_eq!(grid.phase(), StepPhase::Idle);

        let mut next = grid.begin_step().unwrap();
        assert_eq!(grid.phase(), StepPhase::Stepping);
        next.channels[0].fill(0.7);
        let next_ptr = next.channels[0].as_ptr();
        grid.commit(next).unwrap();

        assert_eq!(grid.phase(), StepPhase::Idle);
        assert_eq!(grid.generation(), 1);
        assert_eq!(grid.channel(0), &[0.7; 4]);
        assert_eq!(grid.channel(0).as_ptr(), next_ptr);

        // the old current comes back as the following step's buffer
        let next = grid.begin_step().unwrap();
        assert_eq!(next.channels[0], vec![0.1; 4]);
        grid.abort(next);
    }

    #[test]
    fn abort_leaves_current_untouched() {
        let mut grid = GridState::from_channels(2, 2, vec![vec![0.3; 4]]).unwrap();
        let mut next = grid.begin_step().unwrap();
        next.channels[0].fill(0.9);
        grid.abort(next);

        assert_eq!(grid.phase(), StepPhase::Idle);
        assert_eq!(grid.generation(), 0);
        assert_eq!(grid.channel(0), &[0.3; 4]);
    }

    #[test]
    fn nested_step_and_stray_commit_are_rejected() {
        let mut grid = GridState::new(4, 4, 3).unwrap();
        let stray = NextGeneration {
            channels: vec![vec![0.0; 16]; 3],
        };
        assert!(grid.commit(stray).is_err());

        let next = grid.begin_step().unwrap();
        assert!(grid.begin_step().is_err());
        grid.abort(next);
    }

    #[test]
    fn commit_checks_dimensions() {
        let mut grid = GridState::new(4, 4, 1).unwrap();
        let _ = grid.begin_step().unwrap();
        let bad = NextGeneration {
            channels: vec![vec![0.0; 15]],
        };
        assert!(matches!(
            grid.commit(bad),
            Err(SmoothLifeError::DimensionMismatch { expected: 16, actual: 15, .. })
        ));

        // the failed commit ends the step; current and generation are untouched
        assert_eq!(grid.phase(), StepPhase::Idle);
        assert_eq!(grid.generation(), 0);
        assert_eq!(grid.channel(0).len(), 16);

        let next = grid.begin_step().unwrap();
        assert_eq!(next.channels[0].len(), 16);
        grid.commit(next).unwrap();
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn commit_with_wrong_channel_count_returns_to_idle() {
        let mut grid = GridState::new(4, 4, 2).unwrap();
        let _ = grid.begin_step().unwrap();
        let bad = NextGeneration {
            channels: vec![vec![0.0; 16]],
        };
        assert!(matches!(
            grid.commit(bad),
            Err(SmoothLifeError::DimensionMismatch { expected: 2, actual: 1, .. })
        ));
        assert_eq!(grid.phase(), StepPhase::Idle);
        assert!(grid.begin_step().is_ok());
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(GridState::new(0, 4, 1).is_err());
        assert!(GridState::new(4, 4, 0).is_err());
        assert!(GridState::new(4, 4, 4).is_err());
        assert!(GridState::from_channels(4, 4, vec![vec![0.0; 16], vec![0.0; 12]]).is_err());
    }
}
