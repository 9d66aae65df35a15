//! The periodic tick source.
//!
//! A `Ticker` owns at most one spawned interval task. Starting always
//! aborts the previous task first, and dropping the ticker aborts the
//! active one, so a timer can never leave a dangling interval behind.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Spawn the tick loop. The first tick fires one period from now.
    ///
    /// `on_tick` returning `ControlFlow::Break` ends the loop from inside.
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(&mut self, mut on_tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        if self.cancel() {
            tracing::debug!("replacing an active tick source");
        }

        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if on_tick().await.is_break() {
                    break;
                }
            }
        });
        self.handle = Some(handle);
    }

    /// Abort the active tick task. Returns whether one was still running.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let was_active = !handle.is_finished();
                handle.abort();
                was_active
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::every_second()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
