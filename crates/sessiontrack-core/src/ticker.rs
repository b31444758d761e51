//! Owned, cancellable periodic callbacks.
//!
//! Nothing in this crate runs its own loop. A component that needs a periodic
//! callback asks a [`Ticker`] for one and holds the returned [`TickGuard`];
//! dropping the guard cancels the callback. The host receives [`Tick`]
//! messages and calls back into the component on its own thread.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    /// ~1s live elapsed redraw of a running timer.
    Display,
    /// Break advisor threshold check.
    Advisor,
}

/// Message delivered to the host each period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub kind: TickKind,
    /// Session id for display ticks, empty for advisor ticks.
    pub key: String,
}

impl Tick {
    pub fn display(session_id: impl Into<String>) -> Self {
        Self {
            kind: TickKind::Display,
            key: session_id.into(),
        }
    }

    pub fn advisor() -> Self {
        Self {
            kind: TickKind::Advisor,
            key: String::new(),
        }
    }
}

pub trait Ticker: Send + Sync {
    /// Begin delivering `tick` every `period` until the guard is dropped.
    fn every(&self, period: Duration, tick: Tick) -> TickGuard;
}

/// Live periodic callback. Dropping it cancels the callback.
#[must_use = "dropping a TickGuard cancels its callback"]
pub struct TickGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickGuard {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Guard with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for TickGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickGuard")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Ticker for hosts that drive `tick()` themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTicker;

impl Ticker for NoopTicker {
    fn every(&self, _period: Duration, _tick: Tick) -> TickGuard {
        TickGuard::detached()
    }
}

/// Tokio-backed ticker posting into the host's channel.
///
/// Each callback is a spawned `tokio::time::interval` task, aborted when its
/// guard drops. Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTicker {
    tx: mpsc::UnboundedSender<Tick>,
}

impl TokioTicker {
    pub fn new(tx: mpsc::UnboundedSender<Tick>) -> Self {
        Self { tx }
    }

    /// Ticker plus the receiving end the host loop should poll.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Ticker for TokioTicker {
    fn every(&self, period: Duration, tick: Tick) -> TickGuard {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(tick.clone()).is_err() {
                    break;
                }
            }
        });
        TickGuard::new(move || handle.abort())
    }
}

/// Ticker that only counts guards. Used in tests to check that every exit
/// path releases its callback.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    live: Arc<AtomicUsize>,
    armed_total: Arc<AtomicUsize>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guards currently alive.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Guards ever handed out.
    pub fn armed_total(&self) -> usize {
        self.armed_total.load(Ordering::SeqCst)
    }
}

impl Ticker for ManualTicker {
    fn every(&self, _period: Duration, _tick: Tick) -> TickGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.armed_total.fetch_add(1, Ordering::SeqCst);
        let live = Arc::clone(&self.live);
        TickGuard::new(move || {
            live.fetch_sub(1, Ordering::SeqCst);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_guard_releases_it() {
        let ticker = ManualTicker::new();
        let guard = ticker.every(Duration::from_secs(1), Tick::display("s1"));
        assert_eq!(ticker.live(), 1);
        drop(guard);
        assert_eq!(ticker.live(), 0);
        assert_eq!(ticker.armed_total(), 1);
    }

    #[test]
    fn explicit_cancel_runs_once() {
        let ticker = ManualTicker::new();
        ticker.every(Duration::from_secs(1), Tick::advisor()).cancel();
        assert_eq!(ticker.live(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_delivers_until_dropped() {
        let (ticker, mut rx) = TokioTicker::channel();
        let guard = ticker.every(Duration::from_secs(1), Tick::display("s1"));

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        let mut received = 0;
        while let Ok(tick) = rx.try_recv() {
            assert_eq!(tick, Tick::display("s1"));
            received += 1;
        }
        assert_eq!(received, 3);

        drop(guard);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
