use serde::Serialize;
use std::time::Instant;
use tracing::info;

use crate::automaton::SmoothLife;
use crate::error::Result;

/// Per-step timing summary of a benchmark run
#[derive(Clone, Debug, Serialize)]
pub struct BenchmarkReport {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub steps: usize,
    pub total_ms: f64,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub steps_per_second: f64,
}

impl BenchmarkReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Benchmark - Times engine steps outside the step loop itself
pub struct StepBenchmark {
    warmup: usize,
}

impl StepBenchmark {
    pub fn new(warmup: usize) -> Self {
        StepBenchmark { warmup }
    }

    /// Run `warmup` untimed steps, then `steps` timed ones.
    pub fn run(&self, engine: &mut SmoothLife, steps: usize) -> Result<BenchmarkReport> {
        engine.run(self.warmup)?;

        let grid = engine.grid();
        let (width, height, channels) = (grid.width(), grid.height(), grid.channel_count());
        info!(
            "📊 Running SmoothLife benchmark: {}x{}x{} for {} steps...",
            width, height, channels, steps
        );

        let mut samples = Vec::with_capacity(steps);
        for _ in 0..steps {
            let t = Instant::now();
            engine.step()?;
            samples.push(t.elapsed().as_secs_f64() * 1000.0);
        }

        let total_ms: f64 = samples.iter().sum();
        let (mean_ms, min_ms, max_ms) = if samples.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                total_ms / samples.len() as f64,
                samples.iter().cloned().fold(f64::INFINITY, f64::min),
                samples.iter().cloned().fold(0.0, f64::max),
            )
        };
        let steps_per_second = if total_ms > 0.0 {
            steps as f64 * 1000.0 / total_ms
        } else {
            0.0
        };

        let report = BenchmarkReport {
            width,
            height,
            channels,
            steps,
            total_ms,
            mean_ms,
            min_ms,
            max_ms,
            steps_per_second,
        };
        info!(
            "📈 Benchmark Complete. mean {:.3} ms/step, min {:.3}, max {:.3} ({:.1} steps/s)",
            report.mean_ms, report.min_ms, report.max_ms, report.steps_per_second
        );
        Ok(report)
    }
}
