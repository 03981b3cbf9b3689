//! Sources of per-tick balance changes.

use rand::SeedableRng;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;

use crate::errors::{CoreError, Result};

/// Produces the change applied to the balance on each generator tick.
pub trait DeltaSource: Send {
    /// Draw the next delta.
    fn next_delta(&mut self) -> f64;
}

/// Any `FnMut() -> f64` closure is a delta source. Tests use this to force
/// specific deltas.
impl<F> DeltaSource for F
where
    F: FnMut() -> f64 + Send,
{
    fn next_delta(&mut self) -> f64 {
        self()
    }
}

/// Uniform deltas drawn from `[-max_delta, +max_delta]`.
#[derive(Debug)]
pub struct UniformDelta {
    dist: Uniform<f64>,
    rng: StdRng,
    max_delta: f64,
}

impl UniformDelta {
    /// Uniform deltas seeded from the operating system.
    pub fn new(max_delta: f64) -> Result<Self> {
        Self::with_rng(max_delta, StdRng::from_os_rng())
    }

    /// Uniform deltas with a fixed seed, for reproducible runs.
    pub fn seeded(max_delta: f64, seed: u64) -> Result<Self> {
        Self::with_rng(max_delta, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_delta: f64, rng: StdRng) -> Result<Self> {
        if !max_delta.is_finite() || max_delta <= 0.0 {
            return Err(CoreError::InvalidDeltaRange(max_delta));
        }
        let dist = Uniform::new_inclusive(-max_delta, max_delta)
            .map_err(|_| CoreError::InvalidDeltaRange(max_delta))?;
        Ok(Self {
            dist,
            rng,
            max_delta,
        })
    }

    /// Upper bound on the magnitude of a single delta.
    pub fn max_delta(&self) -> f64 {
        self.max_delta
    }
}

impl DeltaSource for UniformDelta {
    fn next_delta(&mut self) -> f64 {
        self.dist.sample(&mut self.rng)
    }
}
