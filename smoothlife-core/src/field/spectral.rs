//! 2D spectral transform over flattened row-major grids.
//!
//! The engine only ever consumes `forward` and `inverse`; plan lifetime is the
//! transform's business. `FftTransform` caches one rustfft plan per axis and
//! direction and runs each pass over rows in parallel with Rayon.

use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::error::{ensure_len, Result, SmoothLifeError};
use crate::utils::buffer::try_filled;

/// Forward/inverse transform capability for a fixed W·H field.
pub trait SpectralTransform: Send + Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn len(&self) -> usize {
        self.width() * self.height()
    }

    /// Real field of length W·H into its W·H complex spectrum.
    fn forward(&self, input: &[f64]) -> Result<Vec<Complex64>>;

    /// Spectrum of length W·H back to the spatial domain, normalized by 1/(W·H).
    fn inverse(&self, input: &[Complex64]) -> Result<Vec<Complex64>>;
}

/// Separable 2D FFT: one pass along rows, one along columns.
pub struct FftTransform {
    width: usize,
    height: usize,
    row_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl FftTransform {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SmoothLifeError::invalid(format!(
                "transform grid must be non-empty, got {}x{}",
                width, height
            )));
        }
        let mut planner = FftPlanner::<f64>::new();
        Ok(FftTransform {
            width,
            height,
            row_forward: planner.plan_fft_forward(width),
            row_inverse: planner.plan_fft_inverse(width),
            col_forward: planner.plan_fft_forward(height),
            col_inverse: planner.plan_fft_inverse(height),
        })
    }

    fn transform_2d(
        &self,
        data: &mut [Complex64],
        rows: &Arc<dyn Fft<f64>>,
        cols: &Arc<dyn Fft<f64>>,
    ) -> Result<()> {
        let (w, h) = (self.width, self.height);

        data.par_chunks_mut(w).for_each(|row| rows.process(row));

        // Columns are processed as rows of the transposed field
        let mut transposed = try_filled(w * h, Complex64::default())?;
        transpose(data, &mut transposed, w, h);
        transposed.par_chunks_mut(h).for_each(|col| cols.process(col));
        transpose(&transposed, data, h, w);
        Ok(())
    }
}

impl SpectralTransform for FftTransform {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn forward(&self, input: &[f64]) -> Result<Vec<Complex64>> {
        ensure_len("real field", self.len(), input.len())?;
        let mut spectrum = try_filled(self.len(), Complex64::default())?;
        spectrum
            .par_iter_mut()
            .zip(input.par_iter())
            .for_each(|(c, &re)| *c = Complex64::new(re, 0.0));

        self.transform_2d(&mut spectrum, &self.row_forward, &self.col_forward)?;
        Ok(spectrum)
    }

    fn inverse(&self, input: &[Complex64]) -> Result<Vec<Complex64>> {
        ensure_len("spectrum", self.len(), input.len())?;
        let mut field = try_filled(self.len(), Complex64::default())?;
        field.copy_from_slice(input);

        self.transform_2d(&mut field, &self.row_inverse, &self.col_inverse)?;

        // rustfft leaves the inverse unnormalized
        let scale = 1.0 / self.len() as f64;
        field.par_iter_mut().for_each(|c| *c *= scale);
        Ok(field)
    }
}

/// `dst` (cols × rows) = transpose of `src` (rows × cols, row-major).
fn transpose(src: &[Complex64], dst: &mut [Complex64], cols: usize, rows: usize) {
    dst.par_chunks_mut(rows).enumerate().for_each(|(x, out)| {
        for (y, v) in out.iter_mut().enumerate() {
            *v = src[y * cols + x];
        }
    });
}
