use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Source of sync ticks for [`crate::SyncLoop`]
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick. `false` means stop polling.
    async fn tick(&mut self) -> bool;
}

/// Stops a [`IntervalTicker`] from another thread or a signal handler
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // notify_one keeps a permit if nobody is waiting yet
        self.notify.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Fixed-period wall-clock ticker.
///
/// The first tick fires one period after creation. Ticks missed while a sync
/// was running are skipped rather than delivered in a burst.
pub struct IntervalTicker {
    interval: Interval,
    cancel: CancelHandle,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            cancel: CancelHandle::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        tokio::select! {
            _ = self.interval.tick() => !self.cancel.is_cancelled(),
            _ = self.cancel.notify.notified() => false,
        }
    }
}

/// Yields a fixed number of ticks immediately, then stops
#[derive(Debug, Clone, Copy)]
pub struct CountedTicker {
    remaining: usize,
}

impl CountedTicker {
    pub fn new(ticks: usize) -> Self {
        Self { remaining: ticks }
    }
}

#[async_trait]
impl Ticker for CountedTicker {
    async fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counted_ticker_stops() {
        let mut ticker = CountedTicker::new(2);
        assert!(ticker.tick().await);
        assert!(ticker.tick().await);
        assert!(!ticker.tick().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticker_waits_one_period() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(60));
        assert_eq!(ticker.period(), Duration::from_secs(60));

        let start = Instant::now();
        assert!(ticker.tick().await);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_tick_stops_immediately() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(3600));
        let handle = ticker.cancel_handle();
        handle.cancel();

        assert!(handle.is_cancelled());
        assert!(!ticker.tick().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_wakes_pending_tick() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(3600));
        let handle = ticker.cancel_handle();

        let waiter = tokio::spawn(async move { ticker.tick().await });
        tokio::task::yield_now().await;
        handle.cancel();

        assert!(!waiter.await.unwrap());
    }
}
