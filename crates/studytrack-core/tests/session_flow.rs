//! End-to-end study session flow: timer, productivity input, persistence,
//! and the statistics read back from the store.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use studytrack_core::error::{CoreError, DatabaseError, SessionError};
use studytrack_core::labels::LabelFeed;
use studytrack_core::session::persist;
use studytrack_core::stats::{daily_timeline, timeframe_bounds, AggregationBucket, Timeframe};
use studytrack_core::timer::{Clock, ManualClock};
use studytrack_core::{
    Database, Event, LabelProductivityMap, SessionRecord, SessionStore, StudyTracker,
    TimerController, TimerEngine, TimerMode,
};

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-04T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn seeded_db(dir: &tempfile::TempDir) -> Database {
    let db = Database::open_at(dir.path().join("studytrack.db")).unwrap();
    db.save_label("user-1", "Math", true).unwrap();
    db.save_label("user-1", "History", false).unwrap();
    db
}

/// Run one stopwatch session of `secs` seconds under `label`.
fn study(
    tracker: &mut StudyTracker,
    clock: &ManualClock,
    label: &str,
    secs: i64,
    percent: u32,
) -> SessionRecord {
    tracker.select_label(label).unwrap();
    tracker.start(clock.now()).unwrap();
    for _ in 0..secs {
        clock.advance(Duration::seconds(1));
        tracker.tick(clock.now()).unwrap();
    }
    tracker.stop(clock.now()).unwrap();
    let record = tracker.submit_productivity(percent, "user-1").unwrap();
    clock.advance(Duration::minutes(30));
    record
}

#[test]
fn sessions_persist_and_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_db(&dir);
    let clock = ManualClock::new(t0());

    let mut tracker = StudyTracker::new(TimerEngine::new());
    tracker.update_labels(db.label_productivity_map("user-1").unwrap());

    for (label, secs) in [("Math", 600), ("Math", 300), ("History", 120)] {
        let record = study(&mut tracker, &clock, label, secs, 100);
        persist(&db, &record).unwrap();
    }

    let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    let (start, end) = timeframe_bounds(Timeframe::Day, day).unwrap().to_utc(&Utc);
    let rows = db.sessions_between("user-1", start, end).unwrap();
    assert_eq!(rows.len(), 3);

    let sessions: Vec<SessionRecord> = rows
        .iter()
        .cloned()
        .map(|row| SessionRecord::try_from(row).unwrap())
        .collect();
    let labels = db.label_productivity_map("user-1").unwrap();
    let bucket = AggregationBucket::compute(Timeframe::Day, day, &sessions, &labels);

    assert_eq!(bucket.per_label_total_secs.len(), 2);
    assert_eq!(bucket.per_label_total_secs["Math"], 900);
    assert_eq!(bucket.per_label_total_secs["History"], 120);
    assert_eq!(bucket.productive_total_secs, 900);
    assert_eq!(bucket.not_productive_total_secs, 120);

    let timeline = daily_timeline(&rows, &Utc);
    let times: Vec<_> = timeline.iter().map(|e| e.time.as_str()).collect();
    assert_eq!(times, vec!["09:00", "09:40", "10:15"]);
    assert_eq!(timeline[0].description, "Elapsed Time: 10min");
    assert_eq!(timeline[2].title, "History");
}

#[test]
fn week_range_excludes_neighbouring_weeks() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_db(&dir);
    let clock = ManualClock::new(t0());
    let mut tracker = StudyTracker::new(TimerEngine::new());
    tracker.update_labels(db.label_productivity_map("user-1").unwrap());

    persist(&db, &study(&mut tracker, &clock, "Math", 60, 90)).unwrap();
    // Following Monday.
    clock.set(t0() + Duration::days(5));
    persist(&db, &study(&mut tracker, &clock, "Math", 60, 90)).unwrap();

    let anchor = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
    let (start, end) = timeframe_bounds(Timeframe::Week, anchor).unwrap().to_utc(&Utc);
    assert_eq!(db.sessions_between("user-1", start, end).unwrap().len(), 1);

    let (start, end) = timeframe_bounds(Timeframe::Month, anchor).unwrap().to_utc(&Utc);
    assert_eq!(db.sessions_between("user-1", start, end).unwrap().len(), 2);
}

#[test]
fn unknown_label_counts_as_not_productive() {
    let dir = tempfile::tempdir().unwrap();
    let db = seeded_db(&dir);
    let clock = ManualClock::new(t0());

    let mut tracker = StudyTracker::new(TimerEngine::new());
    let mut labels = db.label_productivity_map("user-1").unwrap();
    labels.insert("Chess", true);
    tracker.update_labels(labels);
    persist(&db, &study(&mut tracker, &clock, "Chess", 45, 50)).unwrap();

    // Chess only ever existed client-side.
    let rows = db
        .sessions_between("user-1", t0(), t0() + Duration::days(1))
        .unwrap();
    let sessions: Vec<_> = rows
        .into_iter()
        .map(|row| SessionRecord::try_from(row).unwrap())
        .collect();
    let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
    let bucket = AggregationBucket::compute(
        Timeframe::Day,
        day,
        &sessions,
        &db.label_productivity_map("user-1").unwrap(),
    );
    assert_eq!(bucket.productive_total_secs, 0);
    assert_eq!(bucket.not_productive_total_secs, 45);
}

#[test]
fn too_short_run_produces_no_record() {
    let clock = ManualClock::new(t0());
    let mut tracker = StudyTracker::new(TimerEngine::new());
    tracker.update_labels([("Math".to_string(), true)].into_iter().collect());

    tracker.start(clock.now()).unwrap();
    clock.advance(Duration::milliseconds(999));
    assert!(matches!(
        tracker.stop(clock.now()),
        Err(CoreError::Session(SessionError::TooShort { elapsed_ms: 999 }))
    ));
    assert!(matches!(
        tracker.submit_productivity(100, "user-1"),
        Err(CoreError::Session(SessionError::NoPendingSession))
    ));
}

struct FailingStore;

impl SessionStore for FailingStore {
    fn insert_session(&self, _: &SessionRecord) -> Result<(), DatabaseError> {
        Err(DatabaseError::Locked)
    }

    fn sessions_between(
        &self,
        _: &str,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
    ) -> Result<Vec<studytrack_core::SessionRow>, DatabaseError> {
        Ok(Vec::new())
    }

    fn delete_session(&self, _: &str) -> Result<bool, DatabaseError> {
        Ok(false)
    }

    fn label_productivity_map(&self, _: &str) -> Result<LabelProductivityMap, DatabaseError> {
        Ok(LabelProductivityMap::new())
    }
}

#[test]
fn persistence_failure_leaves_timer_usable() {
    let clock = ManualClock::new(t0());
    let mut tracker = StudyTracker::new(TimerEngine::new());
    tracker.update_labels([("Math".to_string(), true)].into_iter().collect());

    let record = study(&mut tracker, &clock, "Math", 5, 100);
    assert!(matches!(
        persist(&FailingStore, &record),
        Err(CoreError::Persistence(DatabaseError::Locked))
    ));

    assert!(!tracker.engine().is_running());
    assert!(tracker.start(clock.now()).is_ok());
}

#[tokio::test(start_paused = true)]
async fn controller_stamps_from_shared_clock() {
    let clock = Arc::new(ManualClock::new(t0()));
    let feed = LabelFeed::new([("Math".to_string(), true)].into_iter().collect());

    let mut tracker = StudyTracker::new(TimerEngine::new());
    tracker.update_labels(feed.latest());
    let mut timer = TimerController::new(tracker, Arc::clone(&clock));
    let mut rx = timer.subscribe();

    timer.set_mode(TimerMode::Countdown).await.unwrap();
    timer.set_configured_minutes(1).await.unwrap();
    timer.start().await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(30_500)).await;
    clock.advance(Duration::seconds(30));

    let draft = timer.stop().await.unwrap();
    assert_eq!(draft.elapsed_secs, 30);
    assert_eq!(draft.start_time, t0());

    let mut last_display = None;
    while let Ok(event) = rx.try_recv() {
        if let Event::TimerTick { display, .. } = event {
            last_display = Some(display);
        }
    }
    assert_eq!(last_display.as_deref(), Some("00:30"));
}
