//! Row-partitioned parallel update.
//!
//! The next-generation buffer is split into P contiguous row ranges. Each range
//! is a disjoint `&mut` slice handed to its own Rayon task; every input (the
//! current generation and both convolution results) is shared read-only. The
//! Rayon join at the end of `advance_channel` is the barrier: no range is
//! visible to the caller before all ranges are written.

use rayon::prelude::*;
use std::ops::Range;

use crate::automaton::rule::TransitionRule;
use crate::error::{ensure_len, Result, SmoothLifeError};

#[derive(Clone, Copy, Debug)]
pub struct ParallelStepper {
    partitions: usize,
}

impl ParallelStepper {
    pub fn new(partitions: usize) -> Result<Self> {
        if partitions == 0 {
            return Err(SmoothLifeError::invalid("partitions must be at least 1"));
        }
        Ok(ParallelStepper { partitions })
    }

    /// Two row ranges per Rayon worker thread.
    pub fn with_available_parallelism() -> Self {
        ParallelStepper {
            partitions: (rayon::current_num_threads() * 2).max(1),
        }
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Split `height` rows into at most P contiguous ranges.
    ///
    /// Every range holds `height / P` rows except the last, which also takes
    /// the remainder. P is capped at `height` so no range is empty.
    pub fn row_ranges(&self, height: usize) -> Vec<Range<usize>> {
        let parts = self.partitions.min(height).max(1);
        let rows_per = height / parts;
        (0..parts)
            .map(|i| {
                let start = i * rows_per;
                let end = if i == parts - 1 { height } else { start + rows_per };
                start..end
            })
            .collect()
    }

    /// Compute one channel of the next generation.
    ///
    /// `next[i] = clamp(current[i] + dt · delta(outer[i], inner[i]), 0, 1)`
    pub fn advance_channel(
        &self,
        rule: &TransitionRule,
        width: usize,
        current: &[f64],
        outer: &[f64],
        inner: &[f64],
        next: &mut [f64],
    ) -> Result<()> {
        let cells = current.len();
        if width == 0 || cells % width != 0 {
            return Err(SmoothLifeError::invalid(format!(
                "channel of {} cells is not a whole number of rows of width {}",
                cells, width
            )));
        }
        ensure_len("outer average", cells, outer.len())?;
        ensure_len("inner average", cells, inner.len())?;
        ensure_len("next generation channel", cells, next.len())?;

        let height = cells / width;
        let mut slices: Vec<(Range<usize>, &mut [f64])> = Vec::new();
        let mut rest = next;
        for rows in self.row_ranges(height) {
            let cells_in_range = rows.len() * width;
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(cells_in_range);
            slices.push((rows.start * width..rows.end * width, head));
            rest = tail;
        }

        slices.into_par_iter().for_each(|(span, out)| {
            let cur = &current[span.clone()];
            let n = &outer[span.clone()];
            let m = &inner[span];
            for (i, o) in out.iter_mut().enumerate() {
                *o = rule.integrate(cur[i], n[i], m[i]);
            }
        });
        Ok(())
    }
}
