//! Field Computation
//!
//! Kernels, the spectral transform capability, and the two convolution paths
//! used to compute per-cell neighborhood averages.

pub mod convolve;
pub mod kernel;
pub mod spectral;

pub use convolve::{DirectConvolver, SpectralConvolver};
pub use kernel::{Kernel, KernelBuilder, KernelField, Tap, WeightTable};
pub use spectral::{FftTransform, SpectralTransform};
