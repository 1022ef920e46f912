//! Kernel generation.
//!
//! A kernel is a Gaussian-weighted disc, truncated at its radius and
//! normalized so its weights sum to 1. It is laid out over the full grid with
//! its center at (W/2, H/2) and cached in two derived forms: the spectrum of the
//! origin-rolled field for spectral convolution, and the list of nonzero taps
//! for direct convolution.

use rustfft::num_complex::Complex64;

use crate::core::config::check_radius;
use crate::error::{Result, SmoothLifeError};
use crate::field::spectral::SpectralTransform;

/// One nonzero kernel weight at offset (dx, dy) from the kernel center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tap {
    pub dx: i64,
    pub dy: i64,
    pub weight: f64,
}

/// Compact weight table for windowed convolution.
#[derive(Clone, Debug, Default)]
pub struct WeightTable {
    pub taps: Vec<Tap>,
}

impl WeightTable {
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.taps.iter().map(|t| t.weight).sum()
    }
}

/// Normalized weight field over the grid extent, centered at (W/2, H/2).
#[derive(Clone, Debug)]
pub struct KernelField {
    pub width: usize,
    pub height: usize,
    pub radius: f64,
    pub exclude_center: bool,
    pub weights: Vec<f64>,
}

impl KernelField {
    #[inline]
    pub fn center(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.weights[y * self.width + x]
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// True for the degenerate all-zero kernel (radius 0).
    pub fn is_zero(&self) -> bool {
        self.weights.iter().all(|&w| w == 0.0)
    }

    /// Field rolled by (-W/2, -H/2) so the kernel center sits at index 0.
    ///
    /// Transforming this instead of the centered field keeps the circular
    /// convolution result aligned with the world: cell i receives the average
    /// around cell i rather than around i + (W/2, H/2).
    pub fn rolled_to_origin(&self) -> Vec<f64> {
        let (w, h) = (self.width, self.height);
        let (cx, cy) = self.center();
        let mut out = vec![0.0; w * h];
        for y in 0..h {
            let ty = (y + h - cy) % h;
            for x in 0..w {
                let tx = (x + w - cx) % w;
                out[ty * w + tx] = self.weights[y * w + x];
            }
        }
        out
    }

    pub fn weight_table(&self) -> WeightTable {
        let (cx, cy) = self.center();
        let taps = self
            .weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .map(|(i, &weight)| Tap {
                dx: (i % self.width) as i64 - cx as i64,
                dy: (i / self.width) as i64 - cy as i64,
                weight,
            })
            .collect();
        WeightTable { taps }
    }
}

/// A kernel ready for convolution: the field plus both cached derived forms.
#[derive(Clone, Debug)]
pub struct Kernel {
    pub field: KernelField,
    pub spectrum: Vec<Complex64>,
    pub table: WeightTable,
}

impl Kernel {
    pub fn radius(&self) -> f64 {
        self.field.radius
    }
}

/// Builds kernels for a fixed grid size.
#[derive(Clone, Copy, Debug)]
pub struct KernelBuilder {
    width: usize,
    height: usize,
}

impl KernelBuilder {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SmoothLifeError::invalid(format!(
                "kernel grid must be non-empty, got {}x{}",
                width, height
            )));
        }
        Ok(KernelBuilder { width, height })
    }

    pub fn build(&self, radius: f64, exclude_center: bool) -> Result<KernelField> {
        check_radius("kernel radius", radius)?;

        let (w, h) = (self.width, self.height);
        let (cx, cy) = (w / 2, h / 2);
        let mut weights = vec![0.0f64; w * h];

        // radius 0 stays all zero: exp(-0.5·(0/0)²) would be NaN at the center
        if radius > 0.0 {
            for y in 0..h {
                let dy = y as f64 - cy as f64;
                for x in 0..w {
                    let dx = x as f64 - cx as f64;
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist <= radius {
                        let r = dist / radius;
                        weights[y * w + x] = (-0.5 * r * r).exp();
                    }
                }
            }
        }

        if exclude_center {
            weights[cy * w + cx] = 0.0;
        }

        let sum: f64 = weights.iter().sum();
        if sum > 0.0 {
            let inv = 1.0 / sum;
            for v in &mut weights {
                *v *= inv;
            }
        }

        Ok(KernelField {
            width: w,
            height: h,
            radius,
            exclude_center,
            weights,
        })
    }

    /// Build the field and cache its spectrum and weight table.
    pub fn build_kernel(
        &self,
        radius: f64,
        exclude_center: bool,
        transform: &dyn SpectralTransform,
    ) -> Result<Kernel> {
        let field = self.build(radius, exclude_center)?;
        let spectrum = transform.forward(&field.rolled_to_origin())?;
        let table = field.weight_table();
        Ok(Kernel {
            field,
            spectrum,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::spectral::FftTransform;

    #[test]
    fn normalized_weights_sum_to_one() {
        let builder = KernelBuilder::new(32, 32).unwrap();
        for radius in [1.0, 3.0, 11.0 / 3.0, 7.5] {
            for exclude in [false, true] {
                let k = builder.build(radius, exclude).unwrap();
                assert!((k.sum() - 1.0).abs() < 1e-12, "r={} sum={}", radius, k.sum());
            }
        }
    }

    #[test]
    fn zero_radius_is_all_zero() {
        let builder = KernelBuilder::new(8, 8).unwrap();
        let k = builder.build(0.0, false).unwrap();
        assert!(k.is_zero());
        assert_eq!(k.sum(), 0.0);
        assert!(k.weight_table().is_empty());
    }

    #[test]
    fn center_only_kernel_excluded_is_all_zero() {
        // radius < 1 covers only the center cell
        let builder = KernelBuilder::new(8, 8).unwrap();
        let k = builder.build(0.5, true).unwrap();
        assert!(k.is_zero());
    }

    #[test]
    fn excluded_center_is_exactly_zero() {
        let builder = KernelBuilder::new(16, 16).unwrap();
        let k = builder.build(4.0, true).unwrap();
        assert_eq!(k.get(8, 8), 0.0);
        assert!(k.get(9, 8) > 0.0);
    }

    #[test]
    fn negative_radius_is_rejected() {
        let builder = KernelBuilder::new(8, 8).unwrap();
        assert!(matches!(
            builder.build(-0.1, false),
            Err(SmoothLifeError::InvalidParameter(_))
        ));
        assert!(builder.build(f64::NAN, false).is_err());
    }

    #[test]
    fn kernel_is_radially_symmetric() {
        let builder = KernelBuilder::new(16, 16).unwrap();
        let k = builder.build(5.0, false).unwrap();
        let (cx, cy) = k.center();
        for d in 1..6 {
            let v = k.get(cx + d, cy);
            assert!((v - k.get(cx - d, cy)).abs() < 1e-15);
            assert!((v - k.get(cx, cy + d)).abs() < 1e-15);
            assert!((v - k.get(cx, cy - d)).abs() < 1e-15);
        }
        assert_eq!(k.get(cx + 6, cy), 0.0);
    }

    #[test]
    fn radius_one_covers_the_von_neumann_cross() {
        let builder = KernelBuilder::new(4, 4).unwrap();
        let table = builder.build(1.0, false).unwrap().weight_table();
        assert_eq!(table.len(), 5);
        assert!((table.total_weight() - 1.0).abs() < 1e-12);
        let center = table.taps[2];
        assert_eq!((center.dx, center.dy), (0, 0));
        assert!(table.taps.iter().all(|t| t.weight <= center.weight));
    }

    #[test]
    fn rolled_field_moves_center_to_origin() {
        let builder = KernelBuilder::new(8, 6).unwrap();
        let k = builder.build(2.0, false).unwrap();
        let rolled = k.rolled_to_origin();
        assert_eq!(rolled[0], k.get(4, 3));
        // one cell left of center wraps to the last column
        assert_eq!(rolled[7], k.get(3, 3));
    }

    #[test]
    fn spectrum_dc_term_is_weight_sum() {
        let builder = KernelBuilder::new(16, 16).unwrap();
        let fft = FftTransform::new(16, 16).unwrap();
        let k = builder.build_kernel(3.0, true, &fft).unwrap();
        assert!((k.spectrum[0].re - 1.0).abs() < 1e-12);
        assert_eq!(k.spectrum.len(), 256);
    }
}
