//! Background loop that perturbs the portfolio balance on a fixed cadence.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::delta::DeltaSource;
use crate::errors::{CoreError, Result};
use crate::value::PortfolioValue;

/// Receives every new balance the generator produces.
///
/// Implementations must not block: the generator awaits `publish` inline,
/// so a slow publisher delays the next tick.
#[async_trait]
pub trait ValuePublisher: Send + Sync {
    /// Deliver `value` to whoever is listening.
    async fn publish(&self, value: f64);
}

/// Sole writer of the [`PortfolioValue`].
///
/// Each cycle waits `interval`, adds one delta from its [`DeltaSource`] to the
/// current balance, stores the result and hands it to the publisher.
pub struct ValueGenerator {
    value: Arc<PortfolioValue>,
    deltas: Box<dyn DeltaSource>,
    publisher: Arc<dyn ValuePublisher>,
    interval: Duration,
}

impl ValueGenerator {
    /// Create a generator. Nothing runs until [`spawn`](Self::spawn) or
    /// [`tick`](Self::tick) is called.
    pub fn new(
        value: Arc<PortfolioValue>,
        deltas: impl DeltaSource + 'static,
        publisher: Arc<dyn ValuePublisher>,
        interval: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(CoreError::ZeroInterval);
        }
        Ok(Self {
            value,
            deltas: Box::new(deltas),
            publisher,
            interval,
        })
    }

    #[cfg(test)]
    fn value(&self) -> &Arc<PortfolioValue> {
        &self.value
    }

    /// Run one cycle immediately: apply a delta, store it, publish it.
    ///
    /// Returns the new balance. A non-finite result leaves the stored balance
    /// untouched and is returned as [`CoreError::NonFinite`].
    pub async fn tick(&mut self) -> Result<f64> {
        let previous = self.value.get();
        let delta = self.deltas.next_delta();
        let next = previous + delta;
        if !next.is_finite() {
            return Err(CoreError::NonFinite { previous, delta });
        }

        self.value.set(next);
        metrics::counter!("generator_ticks_total").increment(1);
        metrics::gauge!("portfolio_value").set(next);
        debug!(previous, delta, value = next, "portfolio value updated");

        self.publisher.publish(next).await;
        Ok(next)
    }

    /// Tick forever until `cancel` fires or a tick fails.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            initial = self.value.get(),
            "value generator started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!(value = self.value.get(), "value generator cancelled");
                    return;
                }
                () = tokio::time::sleep(self.interval) => {}
            }

            if let Err(e) = self.tick().await {
                error!(error = %e, "value generator stopped");
                return;
            }
        }
    }

    /// Start [`run`](Self::run) on the Tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
