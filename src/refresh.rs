// Auto-refresh scheduler
//
// Re-runs a fetch on a fixed interval until shutdown. Every tick takes a
// ticket from a FetchGeneration and spawns the fetch; completions come back
// over an mpsc channel tagged with their ticket, so a slow response that
// lands after a newer one is dropped instead of overwriting it.

use crate::config::RefreshConfig;
use crate::view::{FetchGeneration, FetchTicket};
use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Completions buffered between the fetch tasks and the loop
const CHANNEL_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshScheduler {
    enabled: bool,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self { enabled, interval }
    }

    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(config.enabled, Duration::from_millis(config.interval_ms))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn with_interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// Run `fetch` now and then on every tick, handing fresh results to
    /// `on_update` until `shutdown` resolves
    ///
    /// When disabled, fetches once and returns. Failed fetches are passed to
    /// `on_update` like any other result; the loop keeps going.
    pub async fn run<T, F, Fut, U, S>(&self, fetch: F, mut on_update: U, shutdown: S)
    where
        T: Send + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        U: FnMut(Result<T>),
        S: Future<Output = ()>,
    {
        if !self.enabled {
            on_update(fetch().await);
            return;
        }

        let (tx, mut rx) = mpsc::channel::<(FetchTicket, Result<T>)>(CHANNEL_BUFFER);
        let mut generation = FetchGeneration::new();

        // Zero-length intervals panic in tokio
        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!("Refresh loop stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let ticket = generation.begin();
                    let tx = tx.clone();
                    let pending = fetch();
                    tokio::spawn(async move {
                        let result = pending.await;
                        // Receiver gone means the loop already stopped
                        let _ = tx.send((ticket, result)).await;
                    });
                }
                Some((ticket, result)) = rx.recv() => {
                    if generation.accept(ticket) {
                        if !generation.is_current(ticket) {
                            tracing::trace!("Applying {:?} while a newer fetch is in flight", ticket);
                        }
                        on_update(result);
                    } else {
                        tracing::debug!("Discarding stale refresh (ticket {:?})", ticket);
                    }
                }
            }
        }
    }
}
