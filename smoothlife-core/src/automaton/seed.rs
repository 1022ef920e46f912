//! Initial world states.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_len, Result, SmoothLifeError};

/// How the first generation is filled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Seed {
    /// Each cell is alive with probability `fill_threshold`; a live cell gets an
    /// independent uniform value in [0, 1) per channel, dead cells are 0.
    Random {
        fill_threshold: f64,
        /// Fixed RNG seed for reproducible runs; entropy when absent
        #[serde(default)]
        rng_seed: Option<u64>,
    },
    /// Interleaved 8-bit samples (one byte per channel per pixel), typically a
    /// decoded image. Samples are normalized by 255.
    Pixels { data: Vec<u8> },
    /// Every cell of every channel set to `value`.
    Uniform { value: f64 },
}

impl Seed {
    pub fn random(fill_threshold: f64) -> Self {
        Seed::Random {
            fill_threshold,
            rng_seed: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Seed::Random { fill_threshold, .. } => {
                if !(0.0..=1.0).contains(fill_threshold) {
                    return Err(SmoothLifeError::invalid(format!(
                        "fill threshold must be within [0, 1], got {}",
                        fill_threshold
                    )));
                }
            }
            Seed::Uniform { value } => {
                if !(0.0..=1.0).contains(value) {
                    return Err(SmoothLifeError::invalid(format!(
                        "uniform value must be within [0, 1], got {}",
                        value
                    )));
                }
            }
            Seed::Pixels { .. } => {}
        }
        Ok(())
    }

    /// Build `channels` channel arrays of `width * height` cells.
    pub fn populate(&self, width: usize, height: usize, channels: usize) -> Result<Vec<Vec<f64>>> {
        self.validate()?;
        if channels == 0 {
            return Err(SmoothLifeError::invalid("seed needs at least one channel"));
        }
        let cells = width * height;

        match self {
            Seed::Random {
                fill_threshold,
                rng_seed,
            } => {
                let mut rng = match rng_seed {
                    Some(s) => StdRng::seed_from_u64(*s),
                    None => StdRng::from_entropy(),
                };
                let mut out = vec![vec![0.0f64; cells]; channels];
                for i in 0..cells {
                    if rng.gen::<f64>() < *fill_threshold {
                        for ch in out.iter_mut() {
                            ch[i] = rng.gen::<f64>();
                        }
                    }
                }
                Ok(out)
            }
            Seed::Pixels { data } => {
                ensure_len("seed pixel buffer", cells * channels, data.len())?;
                let mut out = vec![vec![0.0f64; cells]; channels];
                for (i, px) in data.chunks_exact(channels).enumerate() {
                    for (c, &b) in px.iter().enumerate() {
                        out[c][i] = b as f64 / 255.0;
                    }
                }
                Ok(out)
            }
            Seed::Uniform { value } => Ok(vec![vec![*value; cells]; channels]),
        }
    }
}
