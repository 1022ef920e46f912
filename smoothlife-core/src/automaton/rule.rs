//! SmoothLife transition rule.
//!
//! Maps the (outer, inner) neighborhood averages of a cell to a state delta in
//! [-1, 1] through nested logistic functions. Birth and death intervals are
//! blended according to the inner average, so the same outer density can grow
//! an empty cell and kill a full one.

use crate::core::config::RuleParams;
use crate::error::Result;

/// Clamp `x` into `[min, max]`.
#[inline]
pub fn clamp(x: f64, min: f64, max: f64) -> f64 {
    if x > max {
        max
    } else if x < min {
        min
    } else {
        x
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TransitionRule {
    params: RuleParams,
    /// 4 / alpha, hoisted out of every sigmoid evaluation
    steepness: f64,
}

impl TransitionRule {
    pub fn new(params: RuleParams) -> Result<Self> {
        params.validate()?;
        Ok(TransitionRule {
            params,
            steepness: 4.0 / params.alpha,
        })
    }

    pub fn params(&self) -> &RuleParams {
        &self.params
    }

    #[inline]
    pub fn sigma1(&self, x: f64, a: f64) -> f64 {
        1.0 / (1.0 + (-(x - a) * self.steepness).exp())
    }

    #[inline]
    pub fn sigma2(&self, x: f64, a: f64, b: f64) -> f64 {
        self.sigma1(x, a) * (1.0 - self.sigma1(x, b))
    }

    /// Blend between `x` (empty regime) and `y` (full regime) by inner average `m`.
    #[inline]
    pub fn sigmam(&self, x: f64, y: f64, m: f64) -> f64 {
        let w = self.sigma1(m, 0.5);
        x * (1.0 - w) + y * w
    }

    /// Transition function s(n, m) in [0, 1].
    #[inline]
    pub fn s(&self, n: f64, m: f64) -> f64 {
        let p = &self.params;
        self.sigma2(n, self.sigmam(p.b1, p.d1, m), self.sigmam(p.b2, p.d2, m))
    }

    #[inline]
    pub fn next_delta(&self, outer: f64, inner: f64) -> f64 {
        2.0 * self.s(outer, inner) - 1.0
    }

    /// Explicit Euler step of one cell, kept in [0, 1].
    #[inline]
    pub fn integrate(&self, current: f64, outer: f64, inner: f64) -> f64 {
        clamp(current + self.params.dt * self.next_delta(outer, inner), 0.0, 1.0)
    }
}
