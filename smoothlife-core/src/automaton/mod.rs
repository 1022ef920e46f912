//! Automaton
//!
//! World state, the transition rule, and the parallel step that advances one
//! into the next.

pub mod engine;
pub mod grid;
pub mod rule;
pub mod seed;
pub mod stepper;

pub use engine::SmoothLife;
pub use grid::{GridState, NextGeneration, StepPhase};
pub use rule::{clamp, TransitionRule};
pub use seed::Seed;
pub use stepper::ParallelStepper;
