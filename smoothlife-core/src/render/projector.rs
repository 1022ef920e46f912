//! State to 8-bit pixel projection.

use rayon::prelude::*;

use crate::automaton::rule::clamp;
use crate::error::{ensure_len, Result, SmoothLifeError};

#[inline]
pub fn to_byte(v: f64) -> u8 {
    (255.0 * clamp(v, 0.0, 1.0)).round() as u8
}

/// Interleaves channel arrays into one byte per channel per pixel.
pub struct PixelProjector;

impl PixelProjector {
    pub fn project(channels: &[Vec<f64>]) -> Result<Vec<u8>> {
        let cells = channels.first().map(|c| c.len()).unwrap_or(0);
        let mut out = vec![0u8; cells * channels.len()];
        Self::project_into(channels, &mut out)?;
        Ok(out)
    }

    pub fn project_into(channels: &[Vec<f64>], out: &mut [u8]) -> Result<()> {
        let count = channels.len();
        if count == 0 {
            return Err(SmoothLifeError::invalid("cannot project zero channels"));
        }
        let cells = channels[0].len();
        for ch in channels {
            ensure_len("projected channel", cells, ch.len())?;
        }
        ensure_len("pixel buffer", cells * count, out.len())?;

        out.par_chunks_mut(count).enumerate().for_each(|(i, px)| {
            for (c, b) in px.iter_mut().enumerate() {
                *b = to_byte(channels[c][i]);
            }
        });
        Ok(())
    }
}
