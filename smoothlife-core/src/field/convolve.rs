//! Toroidal convolution of a world channel against a kernel.
//!
//! Both convolvers compute `out[i] = Σ_o k[o] · world[i - o]` with indices
//! wrapping around the grid edges. The spectral form gets the wrap for free
//! from the circular DFT; the direct form wraps explicitly.

use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use std::sync::Arc;

use crate::error::{ensure_len, Result, SmoothLifeError};
use crate::field::kernel::WeightTable;
use crate::field::spectral::SpectralTransform;
use crate::utils::buffer::try_filled;

/// Frequency-domain convolution through a shared transform.
#[derive(Clone)]
pub struct SpectralConvolver {
    transform: Arc<dyn SpectralTransform>,
}

impl SpectralConvolver {
    pub fn new(transform: Arc<dyn SpectralTransform>) -> Self {
        SpectralConvolver { transform }
    }

    pub fn transform(&self) -> &dyn SpectralTransform {
        self.transform.as_ref()
    }

    /// Forward-transform a world channel once so it can be reused against
    /// several kernel spectra.
    pub fn spectrum(&self, world: &[f64]) -> Result<Vec<Complex64>> {
        self.transform.forward(world)
    }

    pub fn convolve(
        &self,
        world_spectrum: &[Complex64],
        kernel_spectrum: &[Complex64],
    ) -> Result<Vec<f64>> {
        let n = self.transform.len();
        ensure_len("world spectrum", n, world_spectrum.len())?;
        ensure_len("kernel spectrum", n, kernel_spectrum.len())?;

        let mut product = try_filled(n, Complex64::default())?;
        product
            .par_iter_mut()
            .zip(world_spectrum.par_iter().zip(kernel_spectrum.par_iter()))
            .for_each(|(p, (a, b))| *p = a * b);

        let spatial = self.transform.inverse(&product)?;
        let mut out = try_filled(n, 0.0f64)?;
        out.par_iter_mut()
            .zip(spatial.par_iter())
            .for_each(|(o, c)| *o = c.re);
        Ok(out)
    }
}

/// Windowed convolution over a compact weight table.
///
/// Cost is O(W·H·taps); competitive with the spectral path for small radii.
#[derive(Clone, Copy, Debug)]
pub struct DirectConvolver {
    width: usize,
    height: usize,
}

impl DirectConvolver {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SmoothLifeError::invalid(format!(
                "convolution grid must be non-empty, got {}x{}",
                width, height
            )));
        }
        Ok(DirectConvolver { width, height })
    }

    pub fn convolve(&self, world: &[f64], table: &WeightTable) -> Result<Vec<f64>> {
        let (w, h) = (self.width, self.height);
        ensure_len("world channel", w * h, world.len())?;

        let mut out = try_filled(w * h, 0.0f64)?;
        if table.is_empty() {
            return Ok(out);
        }

        let (wi, hi) = (w as i64, h as i64);
        out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for tap in &table.taps {
                    let sx = (x as i64 - tap.dx).rem_euclid(wi) as usize;
                    let sy = (y as i64 - tap.dy).rem_euclid(hi) as usize;
                    acc += tap.weight * world[sy * w + sx];
                }
                *cell = acc;
            }
        });
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::kernel::KernelBuilder;
    use crate::field::spectral::FftTransform;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn setup(w: usize, h: usize) -> (KernelBuilder, SpectralConvolver, DirectConvolver) {
        let fft: Arc<dyn SpectralTransform> = Arc::new(FftTransform::new(w, h).unwrap());
        (
            KernelBuilder::new(w, h).unwrap(),
            SpectralConvolver::new(fft),
            DirectConvolver::new(w, h).unwrap(),
        )
    }

    #[test]
    fn uniform_field_is_preserved() {
        let (w, h) = (16, 16);
        let (builder, spectral, direct) = setup(w, h);
        let world = vec![0.37; w * h];
        let world_spectrum = spectral.spectrum(&world).unwrap();

        for (radius, exclude) in [(1.0, false), (3.0, true), (5.5, false)] {
            let kernel = builder
                .build_kernel(radius, exclude, spectral.transform())
                .unwrap();
            let a = spectral.convolve(&world_spectrum, &kernel.spectrum).unwrap();
            let b = direct.convolve(&world, &kernel.table).unwrap();
            assert!(a.iter().all(|v| (v - 0.37).abs() < 1e-12));
            assert!(b.iter().all(|v| (v - 0.37).abs() < 1e-12));
        }
    }

    #[test]
    fn zero_kernel_yields_zero() {
        let (builder, spectral, direct) = setup(8, 8);
        let world = vec![0.9; 64];
        let kernel = builder.build_kernel(0.0, true, spectral.transform()).unwrap();
        let a = spectral
            .convolve(&spectral.spectrum(&world).unwrap(), &kernel.spectrum)
            .unwrap();
        let b = direct.convolve(&world, &kernel.table).unwrap();
        assert!(a.iter().all(|v| v.abs() < 1e-15));
        assert!(b.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn spectral_and_direct_agree_on_random_field() {
        let (w, h) = (32, 16);
        let (builder, spectral, direct) = setup(w, h);
        let mut rng = StdRng::seed_from_u64(7);
        let world: Vec<f64> = (0..w * h).map(|_| rng.gen()).collect();
        let world_spectrum = spectral.spectrum(&world).unwrap();

        for (radius, exclude) in [(2.0, true), (4.5, false), (6.0, true)] {
            let kernel = builder
                .build_kernel(radius, exclude, spectral.transform())
                .unwrap();
            let a = spectral.convolve(&world_spectrum, &kernel.spectrum).unwrap();
            let b = direct.convolve(&world, &kernel.table).unwrap();
            for (x, y) in a.iter().zip(b.iter()) {
                assert!((x - y).abs() < 1e-10, "spectral {} direct {}", x, y);
            }
        }
    }

    #[test]
    fn single_live_cell_spreads_around_itself() {
        // The result must be centered on the live cell, not shifted by (W/2, H/2)
        let (w, h) = (16, 16);
        let (builder, spectral, _) = setup(w, h);
        let mut world = vec![0.0; w * h];
        world[2 * w + 1] = 1.0;
        let kernel = builder.build_kernel(2.0, false, spectral.transform()).unwrap();
        let out = spectral
            .convolve(&spectral.spectrum(&world).unwrap(), &kernel.spectrum)
            .unwrap();

        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 2 * w + 1);
        // wraps across the left edge
        assert!(out[2 * w + (w - 1)] > 1e-6);
    }

    #[test]
    fn mismatched_spectra_are_rejected() {
        let (_, spectral, direct) = setup(4, 4);
        let good = vec![Complex64::default(); 16];
        let bad = vec![Complex64::default(); 8];
        assert!(matches!(
            spectral.convolve(&good, &bad),
            Err(SmoothLifeError::DimensionMismatch { expected: 16, actual: 8, .. })
        ));
        assert!(direct.convolve(&[0.0; 9], &WeightTable::default()).is_err());
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert!(DirectConvolver::new(0, 4).is_err());
        assert!(matches!(
            DirectConvolver::new(4, 0),
            Err(SmoothLifeError::InvalidParameter(_))
        ));
    }
}
