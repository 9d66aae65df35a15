use std::io::Write;
use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use tokio::sync::{broadcast, mpsc, Mutex};

use studytrack_core::error::CoreError;
use studytrack_core::format::format_human;
use studytrack_core::labels::LabelFeed;
use studytrack_core::productivity::validate_percent;
use studytrack_core::session::persist;
use studytrack_core::timer::{PomodoroPair, Ticker};
use studytrack_core::{
    Config, Event, SessionRow, SessionStore, StudyTracker, TimerController, TimerEngine, TimerMode,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    Stopwatch,
    Countdown,
    /// Work countdown followed by an unrecorded break countdown
    Pomodoro,
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a study timer in the foreground.
    ///
    /// Press Enter to stop, or type "d" and Enter to record a distraction.
    Run {
        #[arg(long, value_enum, default_value_t = RunMode::Stopwatch)]
        mode: RunMode,
        /// Countdown or work length in minutes (default from config)
        #[arg(long)]
        minutes: Option<u64>,
        /// Label to study under (default: first label by name)
        #[arg(long)]
        label: Option<String>,
        /// Productivity percentage to submit without prompting
        #[arg(long)]
        productivity: Option<u32>,
    },
    /// Print the idle timer for the configured countdown as JSON
    Status,
}

pub async fn run(action: TimerAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run {
            mode,
            minutes,
            label,
            productivity,
        } => run_session(mode, minutes, label, productivity, config).await,
        TimerAction::Status => {
            let mut engine = TimerEngine::new();
            engine.set_mode(TimerMode::Countdown)?;
            engine.set_configured_minutes(u64::from(config.timer.countdown_minutes))?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot(Utc::now()))?);
            Ok(())
        }
    }
}

async fn run_session(
    mode: RunMode,
    minutes: Option<u64>,
    label: Option<String>,
    productivity: Option<u32>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_database(config)?;
    let feed = LabelFeed::new(db.label_productivity_map(&config.user.id)?);

    let (engine, pomodoro) = match mode {
        RunMode::Stopwatch => (TimerEngine::new(), None),
        RunMode::Countdown => {
            let mut engine = TimerEngine::new();
            engine.set_mode(TimerMode::Countdown)?;
            engine.set_configured_minutes(
                minutes.unwrap_or_else(|| u64::from(config.timer.countdown_minutes)),
            )?;
            (engine, None)
        }
        RunMode::Pomodoro => {
            let work = minutes.unwrap_or_else(|| u64::from(config.timer.work_minutes));
            let pair = PomodoroPair::from_minutes(work, u64::from(config.timer.break_minutes))?;
            (pair.work.clone(), Some(pair))
        }
    };

    let mut tracker = StudyTracker::new(engine);
    tracker.update_labels(feed.latest());
    if let Some(label) = &label {
        tracker.select_label(label)?;
    }

    let mut controller = TimerController::with_system_clock(tracker);
    let mut events = controller.subscribe();
    let mut keyboard = Keyboard::spawn();

    controller.start().await?;
    eprintln!("Enter: stop   d + Enter: distraction");

    let mut completed = false;
    let pending = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    render(&event);
                    match event {
                        Event::TimerCompleted { .. } => completed = true,
                        Event::SessionPending { .. } => break true,
                        Event::SessionRejected { .. } => break false,
                        _ => {}
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "timer events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break false,
            },
            line = keyboard.line() => match line.as_deref().map(str::trim) {
                Some("d") => {
                    if let Err(e) = controller.record_distraction().await {
                        tracing::debug!(error = %e, "distraction ignored");
                    }
                }
                _ => match controller.stop().await {
                    // Outcome arrives on the event stream.
                    Ok(_) | Err(CoreError::Session(_)) => {}
                    Err(CoreError::Timer(e)) => tracing::debug!(error = %e, "stop ignored"),
                    Err(e) => return Err(e.into()),
                },
            },
        }
    };

    if pending {
        let percent = match productivity {
            Some(percent) => percent,
            None => prompt_percent(&mut keyboard).await?,
        };
        let record = controller
            .submit_productivity(percent, &config.user.id)
            .await?;
        if let Err(e) = persist(&db, &record) {
            eprintln!("warning: session not saved: {e}");
        }
        println!("{}", serde_json::to_string_pretty(&SessionRow::from(&record))?);
    }
    controller.shutdown();

    if let Some(rest) = break_after(pomodoro, completed) {
        run_break(rest, &mut keyboard).await?;
    }
    Ok(())
}

/// The break phase follows only a work countdown that ran to zero.
fn break_after(pomodoro: Option<PomodoroPair>, work_completed: bool) -> Option<TimerEngine> {
    pomodoro.filter(|_| work_completed).map(|pair| pair.rest)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakOutcome {
    Completed,
    Skipped,
}

/// The break half of a pomodoro. Nothing is recorded; Enter skips it.
async fn run_break(
    engine: TimerEngine,
    keyboard: &mut Keyboard,
) -> Result<BreakOutcome, Box<dyn std::error::Error>> {
    let engine = Arc::new(Mutex::new(engine));
    let started = engine.lock().await.start(Utc::now())?;
    render(&started);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ticker = Ticker::every_second();
    {
        let engine = Arc::clone(&engine);
        ticker.start(move || {
            let engine = Arc::clone(&engine);
            let tx = tx.clone();
            async move {
                let mut engine = engine.lock().await;
                match engine.tick(Utc::now()) {
                    Ok(done) => {
                        let _ = tx.send(Event::TimerTick {
                            mode: engine.mode(),
                            display_secs: engine.remaining_or_elapsed_secs(),
                            display: engine.display(),
                        });
                        match done {
                            Some(event) => {
                                let _ = tx.send(event);
                                ControlFlow::Break(())
                            }
                            None => ControlFlow::Continue(()),
                        }
                    }
                    Err(_) => ControlFlow::Break(()),
                }
            }
        });
    }

    let outcome = loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    render(&event);
                    if matches!(event, Event::TimerCompleted { .. }) {
                        eprintln!("break over");
                        break BreakOutcome::Completed;
                    }
                }
                None => break BreakOutcome::Completed,
            },
            _ = keyboard.line() => {
                ticker.cancel();
                let mut engine = engine.lock().await;
                if engine.is_running() {
                    engine.stop(Utc::now())?;
                }
                eprintln!("\nbreak skipped");
                break BreakOutcome::Skipped;
            }
        }
    };
    Ok(outcome)
}

async fn prompt_percent(keyboard: &mut Keyboard) -> Result<u32, Box<dyn std::error::Error>> {
    loop {
        if keyboard.closed {
            return Err("stdin closed before productivity was entered".into());
        }
        eprint!("productivity % (0-100): ");
        std::io::stderr().flush()?;
        let Some(line) = keyboard.line().await else {
            return Err("stdin closed before productivity was entered".into());
        };
        match line.trim().parse::<u32>() {
            Ok(percent) if validate_percent(percent).is_ok() => return Ok(percent),
            _ => eprintln!("enter a whole number between 0 and 100"),
        }
    }
}

fn render(event: &Event) {
    match event {
        Event::TimerStarted { mode, tag, .. } => match tag {
            Some(tag) => eprintln!("{tag:?} {mode:?} started"),
            None => eprintln!("{mode:?} started"),
        },
        Event::TimerTick { display, .. } => {
            eprint!("\r{display}   ");
            let _ = std::io::stderr().flush();
        }
        Event::DistractionRecorded { count } => eprintln!("\ndistractions: {count}"),
        Event::TimerStopped { .. } | Event::TimerCompleted { .. } => eprintln!(),
        Event::SessionPending {
            label_text,
            elapsed_secs,
        } => eprintln!("{label_text}: {}", format_human(*elapsed_secs)),
        Event::SessionRejected { reason } => eprintln!("session not recorded: {reason}"),
        _ => {}
    }
}

/// Lines from stdin, read on a plain thread.
struct Keyboard {
    rx: mpsc::UnboundedReceiver<String>,
    closed: bool,
}

impl Keyboard {
    fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx, closed: false }
    }

    /// Next line. End of input is reported once as `None`; after that this
    /// never resolves.
    async fn line(&mut self) -> Option<String> {
        if self.closed {
            return std::future::pending().await;
        }
        let line = self.rx.recv().await;
        if line.is_none() {
            self.closed = true;
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard() -> (mpsc::UnboundedSender<String>, Keyboard) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Keyboard { rx, closed: false })
    }

    fn pair() -> PomodoroPair {
        PomodoroPair::new(3, 2).unwrap()
    }

    #[test]
    fn break_follows_only_completed_work() {
        let rest = break_after(Some(pair()), true).unwrap();
        assert_eq!(rest.configured_duration_secs(), 2);
        assert!(break_after(Some(pair()), false).is_none());
        assert!(break_after(None, true).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn break_runs_to_zero() {
        let (_tx, mut keys) = keyboard();
        let rest = break_after(Some(pair()), true).unwrap();
        let outcome = run_break(rest, &mut keys).await.unwrap();
        assert_eq!(outcome, BreakOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_skips_break() {
        let (tx, mut keys) = keyboard();
        tx.send(String::new()).unwrap();
        let rest = PomodoroPair::from_minutes(25, 5).unwrap().rest;
        let outcome = run_break(rest, &mut keys).await.unwrap();
        assert_eq!(outcome, BreakOutcome::Skipped);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_stdin_lets_break_finish() {
        let (tx, mut keys) = keyboard();
        drop(tx);
        // End of input is consumed before the break starts.
        assert!(keys.line().await.is_none());
        let outcome = run_break(pair().rest, &mut keys).await.unwrap();
        assert_eq!(outcome, BreakOutcome::Completed);
    }
}
