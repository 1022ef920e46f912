//! SmoothLife Engine
//!
//! Wires configuration, kernels, convolution, the transition rule, the grid and
//! the stepper into the two calls a host render loop needs: `initialize` and
//! `step`.

use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::automaton::grid::{GridState, NextGeneration};
use crate::automaton::rule::TransitionRule;
use crate::automaton::seed::Seed;
use crate::automaton::stepper::ParallelStepper;
use crate::core::config::{check_radius, ConvolutionMode, SmoothLifeConfig};
use crate::error::{ensure_len, Result};
use crate::field::{
    DirectConvolver, FftTransform, Kernel, KernelBuilder, SpectralConvolver, SpectralTransform,
};
use crate::render::{PixelProjector, SharedFrame};
use crate::utils::buffer::try_filled;

/// Outer and inner neighborhood averages of one channel.
struct Averages {
    outer: Vec<f64>,
    inner: Vec<f64>,
}

pub struct SmoothLife {
    config: SmoothLifeConfig,
    builder: KernelBuilder,
    spectral: SpectralConvolver,
    direct: DirectConvolver,
    outer: Kernel,
    inner: Kernel,
    rule: TransitionRule,
    stepper: ParallelStepper,
    grid: GridState,
    frame: SharedFrame,
    back: Vec<u8>,
}

impl SmoothLife {
    /// Build an engine from `config` with the rustfft-backed transform.
    pub fn new(config: SmoothLifeConfig, seed: &Seed) -> Result<Self> {
        config.validate()?;
        let transform: Arc<dyn SpectralTransform> =
            Arc::new(FftTransform::new(config.width, config.height)?);
        Self::with_transform(config, seed, transform)
    }

    /// Build an engine around a caller-supplied spectral transform.
    pub fn with_transform(
        config: SmoothLifeConfig,
        seed: &Seed,
        transform: Arc<dyn SpectralTransform>,
    ) -> Result<Self> {
        config.validate()?;
        ensure_len("spectral transform", config.cells(), transform.len())?;

        let started = Instant::now();
        let (w, h) = (config.width, config.height);
        let builder = KernelBuilder::new(w, h)?;
        let kc = config.kernel;
        let outer = builder.build_kernel(kc.outer_radius, kc.outer_exclude_center, transform.as_ref())?;
        let inner = builder.build_kernel(kc.inner_radius(), kc.inner_exclude_center, transform.as_ref())?;

        let rule = TransitionRule::new(config.rule)?;
        let stepper = match config.partitions {
            Some(p) => ParallelStepper::new(p)?,
            None => ParallelStepper::with_available_parallelism(),
        };
        let grid = GridState::from_channels(w, h, seed.populate(w, h, config.channels)?)?;

        let frame = SharedFrame::new();
        let mut back = PixelProjector::project(grid.channels())?;
        frame.publish(&mut back, grid.generation());
        // publish handed back the empty default front; size it for step 1
        let back = try_filled(back_len(&grid), 0u8)?;

        info!(
            "🌱 [SmoothLife] Initialized {}x{} grid, {} channel(s), outer r={} ({} taps), inner r={} ({} taps), {:?} convolution, {} partitions in {:?}",
            w,
            h,
            config.channels,
            outer.radius(),
            outer.table.len(),
            inner.radius(),
            inner.table.len(),
            config.convolution,
            stepper.partitions(),
            started.elapsed()
        );

        Ok(SmoothLife {
            builder,
            spectral: SpectralConvolver::new(transform),
            direct: DirectConvolver::new(w, h)?,
            outer,
            inner,
            rule,
            stepper,
            grid,
            frame,
            back,
            config,
        })
    }

    /// Random-fill engine with canonical rule constants, returning the first
    /// frame's pixels alongside it.
    pub fn initialize(
        width: usize,
        height: usize,
        kernel_radius: f64,
        fill_threshold: f64,
    ) -> Result<(Self, Vec<u8>)> {
        let mut config = SmoothLifeConfig::new(width, height);
        config.kernel.outer_radius = kernel_radius;
        let engine = Self::new(config, &Seed::random(fill_threshold))?;
        let pixels = PixelProjector::project(engine.grid.channels())?;
        Ok((engine, pixels))
    }

    pub fn config(&self) -> &SmoothLifeConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn generation(&self) -> u64 {
        self.grid.generation()
    }

    pub fn outer_kernel(&self) -> &Kernel {
        &self.outer
    }

    pub fn inner_kernel(&self) -> &Kernel {
        &self.inner
    }

    /// Handle renderers read committed frames from.
    pub fn frame(&self) -> SharedFrame {
        self.frame.clone()
    }

    /// Rebuild both kernels for a new outer radius. The inner radius follows
    /// the configured divisor unless it was set explicitly.
    pub fn set_outer_radius(&mut self, radius: f64) -> Result<()> {
        check_radius("outer_radius", radius)?;
        let mut kc = self.config.kernel;
        kc.outer_radius = radius;
        kc.validate()?;

        let transform = self.spectral.transform();
        let outer = self.builder.build_kernel(kc.outer_radius, kc.outer_exclude_center, transform)?;
        let inner = self.builder.build_kernel(kc.inner_radius(), kc.inner_exclude_center, transform)?;

        info!(
            "[SmoothLife] Kernels rebuilt: outer r={} inner r={}",
            outer.radius(),
            inner.radius()
        );
        self.outer = outer;
        self.inner = inner;
        self.config.kernel = kc;
        Ok(())
    }

    /// Advance one generation.
    ///
    /// Either every channel is computed and committed, or the grid is left as
    /// it was and the error is returned.
    pub fn step(&mut self) -> Result<()> {
        let started = Instant::now();
        // Size the back buffer up front; nothing after commit allocates
        let len = back_len(&self.grid);
        if self.back.len() != len {
            self.back = try_filled(len, 0u8)?;
        }
        let mut next = self.grid.begin_step()?;

        match self.compute(&mut next) {
            Ok(()) => self.grid.commit(next)?,
            Err(e) => {
                self.grid.abort(next);
                return Err(e);
            }
        }

        PixelProjector::project_into(self.grid.channels(), &mut self.back)?;
        self.frame.publish(&mut self.back, self.grid.generation());

        debug!(
            "[SmoothLife] generation {} in {:?}",
            self.grid.generation(),
            started.elapsed()
        );
        Ok(())
    }

    /// Advance one generation and write its pixels into `pixels`, which must
    /// hold W·H·channels bytes.
    pub fn step_pixels(&mut self, pixels: &mut [u8]) -> Result<()> {
        ensure_len(
            "pixel buffer",
            self.grid.cells() * self.grid.channel_count(),
            pixels.len(),
        )?;
        self.step()?;
        PixelProjector::project_into(self.grid.channels(), pixels)
    }

    pub fn run(&mut self, steps: usize) -> Result<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    fn compute(&self, next: &mut NextGeneration) -> Result<()> {
        let conv_started = Instant::now();

        // Channels are independent: convolve them concurrently
        let averages = self
            .grid
            .channels()
            .par_iter()
            .map(|channel| self.averages(channel))
            .collect::<Result<Vec<_>>>()?;
        let conv_elapsed = conv_started.elapsed();

        let update_started = Instant::now();
        let width = self.grid.width();
        for ((current, avg), out) in self
            .grid
            .channels()
            .iter()
            .zip(averages.iter())
            .zip(next.channels.iter_mut())
        {
            self.stepper
                .advance_channel(&self.rule, width, current, &avg.outer, &avg.inner, out)?;
        }

        debug!(
            "[SmoothLife] convolution {:?}, update {:?}",
            conv_elapsed,
            update_started.elapsed()
        );
        Ok(())
    }

    fn averages(&self, channel: &[f64]) -> Result<Averages> {
        match self.config.convolution {
            ConvolutionMode::Spectral => {
                let spectrum = self.spectral.spectrum(channel)?;
                Ok(Averages {
                    outer: self.spectral.convolve(&spectrum, &self.outer.spectrum)?,
                    inner: self.spectral.convolve(&spectrum, &self.inner.spectrum)?,
                })
            }
            ConvolutionMode::Direct => Ok(Averages {
                outer: self.direct.convolve(channel, &self.outer.table)?,
                inner: self.direct.convolve(channel, &self.inner.table)?,
            }),
        }
    }
}

/// Bytes in one projected frame of `grid`.
fn back_len(grid: &GridState) -> usize {
    grid.cells() * grid.channel_count()
}
