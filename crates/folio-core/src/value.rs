//! The shared portfolio balance.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Current simulated portfolio balance.
///
/// Stored as the bit pattern of an `f64` in an [`AtomicU64`] so readers never
/// observe a torn value. There is exactly one writer, the
/// [`ValueGenerator`](crate::ValueGenerator), so no compare-and-swap is needed.
#[derive(Debug)]
pub struct PortfolioValue {
    bits: AtomicU64,
}

impl PortfolioValue {
    /// Create a balance starting at `initial`.
    pub fn new(initial: f64) -> Result<Self> {
        if !initial.is_finite() {
            return Err(CoreError::NonFiniteInitial(initial));
        }
        Ok(Self {
            bits: AtomicU64::new(initial.to_bits()),
        })
    }

    /// Read the current balance.
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Read the current balance as a serializable payload.
    pub fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            portfolio_value: self.get(),
        }
    }

    pub(crate) fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }
}

/// Wire payload carrying the balance, shared by the query endpoint and the
/// real-time `update` event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Balance at the time the snapshot was taken.
    pub portfolio_value: f64,
}
