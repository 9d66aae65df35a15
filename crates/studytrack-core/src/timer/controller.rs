use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use super::clock::{Clock, SystemClock};
use super::mode::TimerMode;
use super::ticker::Ticker;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::productivity::LabelProductivityMap;
use crate::session::{SessionDraft, SessionRecord, StudyTracker};

const EVENT_CAPACITY: usize = 64;

/// Async owner of one study timer.
///
/// Holds the tracker, the single tick source and the event channel.
/// Dropping the controller drops the [`Ticker`], which aborts the tick task.
pub struct TimerController<C: Clock = SystemClock> {
    tracker: Arc<Mutex<StudyTracker>>,
    ticker: Ticker,
    clock: Arc<C>,
    events: broadcast::Sender<Event>,
}

impl TimerController<SystemClock> {
    pub fn with_system_clock(tracker: StudyTracker) -> Self {
        Self::new(tracker, SystemClock)
    }
}

impl<C: Clock> TimerController<C> {
    pub fn new(tracker: StudyTracker, clock: C) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            ticker: Ticker::every_second(),
            clock: Arc::new(clock),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    pub async fn snapshot(&self) -> Event {
        self.tracker.lock().await.engine().snapshot(self.clock.now())
    }

    pub async fn is_running(&self) -> bool {
        self.tracker.lock().await.engine().is_running()
    }

    pub async fn update_labels(&self, snapshot: LabelProductivityMap) {
        self.tracker.lock().await.update_labels(snapshot);
    }

    pub async fn select_label(&self, label_text: &str) -> Result<()> {
        self.tracker.lock().await.select_label(label_text)?;
        Ok(())
    }

    pub async fn start(&mut self) -> Result<Event> {
        let event = self.tracker.lock().await.start(self.clock.now())?;
        self.spawn_ticker();
        self.emit(event.clone());
        Ok(event)
    }

    /// Stop the run and cancel the tick source.
    ///
    /// Calling this while idle (including right after a countdown completed)
    /// is an illegal transition and emits nothing.
    pub async fn stop(&mut self) -> Result<SessionDraft> {
        let (stopped, outcome) = {
            let mut tracker = self.tracker.lock().await;
            let started_at = tracker.engine().started_at();
            let stop_at = self.clock.now();
            let outcome = tracker.stop(stop_at);
            let stopped = started_at.map(|started_at| Event::TimerStopped {
                started_at,
                stop_at,
            });
            (stopped, outcome)
        };

        if let Err(CoreError::Timer(_)) = &outcome {
            return outcome;
        }

        self.ticker.cancel();
        if let Some(event) = stopped {
            self.emit(event);
        }
        match &outcome {
            Ok(draft) => self.emit(Event::SessionPending {
                label_text: draft.label_text.clone(),
                elapsed_secs: draft.elapsed_secs,
            }),
            Err(rejected) => self.emit(Event::SessionRejected {
                reason: rejected.to_string(),
            }),
        }
        outcome
    }

    pub async fn set_mode(&mut self, mode: TimerMode) -> Result<Event> {
        let event = self.tracker.lock().await.set_mode(mode)?;
        self.ticker.cancel();
        self.emit(event.clone());
        Ok(event)
    }

    pub async fn set_configured_minutes(&mut self, minutes: u64) -> Result<Event> {
        let event = self.tracker.lock().await.set_configured_minutes(minutes)?;
        self.emit(event.clone());
        Ok(event)
    }

    pub async fn record_distraction(&self) -> Result<Event> {
        let event = self.tracker.lock().await.record_distraction()?;
        self.emit(event.clone());
        Ok(event)
    }

    pub async fn submit_productivity(&self, percent: u32, user_id: &str) -> Result<SessionRecord> {
        let record = self
            .tracker
            .lock()
            .await
            .submit_productivity(percent, user_id)?;
        self.emit(Event::SessionRecorded {
            session_id: record.id.to_string(),
            label_text: record.label_text.clone(),
            elapsed_secs: record.elapsed_secs,
            efficiency_score: record.efficiency_score,
        });
        Ok(record)
    }

    /// Teardown: cancel any tick source. The in-progress run is not saved.
    pub fn shutdown(&mut self) {
        if self.ticker.cancel() {
            tracing::debug!("timer torn down while ticking");
        }
    }

    fn spawn_ticker(&mut self) {
        let tracker = Arc::clone(&self.tracker);
        let clock = Arc::clone(&self.clock);
        let events = self.events.clone();

        self.ticker.start(move || {
            let tracker = Arc::clone(&tracker);
            let clock = Arc::clone(&clock);
            let events = events.clone();
            async move { tick_once(&tracker, clock.as_ref(), &events).await }
        });
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

async fn tick_once<C: Clock>(
    tracker: &Mutex<StudyTracker>,
    clock: &C,
    events: &broadcast::Sender<Event>,
) -> ControlFlow<()> {
    let mut tracker = tracker.lock().await;
    if !tracker.engine().is_running() {
        return ControlFlow::Break(());
    }

    match tracker.tick(clock.now()) {
        Ok(completion) => {
            let engine = tracker.engine();
            let _ = events.send(Event::TimerTick {
                mode: engine.mode(),
                display_secs: engine.remaining_or_elapsed_secs(),
                display: engine.display(),
            });
            if completion.is_empty() {
                return ControlFlow::Continue(());
            }
            for event in completion {
                let _ = events.send(event);
            }
            ControlFlow::Break(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "tick rejected");
            ControlFlow::Break(())
        }
    }
}
