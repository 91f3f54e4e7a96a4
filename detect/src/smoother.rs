//! Presentation of raw confidences.
//!
//! A small uniform perturbation keeps repeated calls on the same clip from
//! returning the exact same score. The source of that perturbation is a
//! [`Jitter`] so tests can substitute a deterministic one.

use std::sync::Arc;

use rand::Rng;

/// Source of confidence perturbations.
pub trait Jitter: Send + Sync {
    /// Returns the next offset. Implementations stay within `[-bound, bound]`
    /// of whatever bound they were configured with.
    fn offset(&self) -> f64;
}

/// Uniformly distributed offsets in `[-bound, bound]`, drawn from the thread-local RNG.
#[derive(Debug, Clone, Copy)]
pub struct UniformJitter {
    bound: f64,
}

impl UniformJitter {
    /// Creates a jitter source. Negative or non-finite bounds are treated as zero.
    pub fn new(bound: f64) -> Self {
        let bound = if bound.is_finite() { bound.max(0.0) } else { 0.0 };
        Self { bound }
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }
}

impl Jitter for UniformJitter {
    fn offset(&self) -> f64 {
        if self.bound == 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(-self.bound..=self.bound)
    }
}

/// Always returns the same offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub f64);

impl Jitter for FixedJitter {
    fn offset(&self) -> f64 {
        self.0
    }
}

/// Perturbs, clamps and rounds raw confidences.
#[derive(Clone)]
pub struct Smoother {
    jitter: Arc<dyn Jitter>,
}

impl Smoother {
    pub fn new(jitter: Arc<dyn Jitter>) -> Self {
        Self { jitter }
    }

    /// Smoother with uniform jitter in `[-bound, bound]`.
    pub fn uniform(bound: f64) -> Self {
        Self::new(Arc::new(UniformJitter::new(bound)))
    }

    /// Smoother that only clamps and rounds.
    pub fn exact() -> Self {
        Self::new(Arc::new(FixedJitter(0.0)))
    }

    /// Returns `raw + jitter`, clamped to `[0, 1]` and rounded to two decimals.
    pub fn smooth(&self, raw: f64) -> f64 {
        let raw = if raw.is_nan() { 0.0 } else { raw };
        let offset = self.jitter.offset();
        let offset = if offset.is_finite() { offset } else { 0.0 };
        round2((raw + offset).clamp(0.0, 1.0))
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::uniform(0.02)
    }
}

impl std::fmt::Debug for Smoother {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Smoother").finish_non_exhaustive()
    }
}

/// Rounds to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
