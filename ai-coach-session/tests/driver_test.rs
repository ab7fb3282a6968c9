use ai_coach_session::{
    Action, DriverExit, Exercise, ExitReason, FeedbackRecord, FeedbackSink, NoopObserver, Notice,
    Phase, Session, SessionDriver, SessionEnd, SessionHandle, SessionObserver, Snapshot, Timings,
    WorkoutPlan,
};
use std::ops::ControlFlow;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Default)]
struct CollectingSink {
    records: Mutex<Vec<FeedbackRecord>>,
}

impl FeedbackSink for CollectingSink {
    fn record(&self, feedback: &FeedbackRecord) {
        self.records.lock().unwrap().push(feedback.clone());
    }
}

/// Records everything and presses "continue" whenever the session waits for it
struct Recorder {
    handle: Option<SessionHandle>,
    snapshots: Vec<Snapshot>,
    notices: Vec<Notice>,
    /// Break once this many snapshots have been seen
    give_up_after: Option<usize>,
}

impl Recorder {
    fn new(handle: Option<SessionHandle>) -> Self {
        Self {
            handle,
            snapshots: Vec::new(),
            notices: Vec::new(),
            give_up_after: None,
        }
    }

    fn last(&self) -> &Snapshot {
        self.snapshots.last().unwrap()
    }
}

impl SessionObserver for Recorder {
    fn on_snapshot(&mut self, snapshot: &Snapshot) -> ControlFlow<()> {
        if snapshot.phase == Phase::CompletedExercisePendingNext {
            if let Some(handle) = &self.handle {
                handle.dispatch(Action::Continue);
            }
        }
        self.snapshots.push(snapshot.clone());

        match self.give_up_after {
            Some(limit) if self.snapshots.len() >= limit => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }

    fn on_notice(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

fn timed_plan() -> WorkoutPlan {
    WorkoutPlan {
        id: None,
        plan_name: "Quick Core".to_string(),
        exercises: vec![Exercise {
            name: "Plank".to_string(),
            duration_seconds: Some(5),
            ..Default::default()
        }],
    }
}

#[tokio::test(start_paused = true)]
async fn test_timed_plan_completes_on_ticks() {
    let session = Session::new(&timed_plan(), Timings::default()).unwrap();
    let (driver, handle) = SessionDriver::new(session);
    let sink = CollectingSink::default();
    let mut recorder = Recorder::new(Some(handle.clone()));

    let started = Instant::now();
    handle.dispatch(Action::Start);
    let exit = driver.run(&sink, &mut recorder).await;

    assert_eq!(exit, DriverExit::Ended(SessionEnd::Completed));
    assert!(started.elapsed() >= Duration::from_secs(8));
    assert_eq!(recorder.last().phase, Phase::WorkoutComplete);
    assert!(recorder.notices.contains(&Notice::TimeUp {
        exercise: "Plank".to_string()
    }));
    assert!(sink.records.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unmount_stops_the_loop() {
    let session = Session::new(&timed_plan(), Timings::default()).unwrap();
    let (driver, handle) = SessionDriver::new(session);
    let mut recorder = Recorder::new(None);

    handle.dispatch(Action::Start);
    handle.unmount();
    let exit = driver.run(&CollectingSink::default(), &mut recorder).await;

    assert_eq!(exit, DriverExit::Unmounted);
    // Initial render plus the start
    assert_eq!(recorder.snapshots.len(), 2);
    assert_eq!(recorder.last().phase, Phase::Preparing);
    assert!(handle.is_closed());
    assert!(!handle.dispatch(Action::Pause));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handles_unmounts() {
    let session = Session::new(&timed_plan(), Timings::default()).unwrap();
    let (driver, handle) = SessionDriver::new(session);
    drop(handle);

    let mut recorder = Recorder::new(None);
    let exit = driver.run(&CollectingSink::default(), &mut recorder).await;

    assert_eq!(exit, DriverExit::Unmounted);
    assert_eq!(recorder.snapshots.len(), 1);
    assert_eq!(recorder.last().phase, Phase::NotStarted);
}

#[tokio::test(start_paused = true)]
async fn test_feedback_reaches_sink() {
    let session = Session::new(&timed_plan(), Timings::default()).unwrap();
    let session_id = session.id();
    let (driver, handle) = SessionDriver::new(session);
    let sink = CollectingSink::default();
    let mut recorder = Recorder::new(None);

    handle.dispatch(Action::Start);
    handle.dispatch(Action::Exit);
    handle.dispatch(Action::SelectReason(ExitReason::Other));
    handle.dispatch(Action::SetCustomText("  phone rang ".to_string()));
    handle.dispatch(Action::SubmitFeedback);
    let exit = driver.run(&sink, &mut recorder).await;

    assert_eq!(
        exit,
        DriverExit::Ended(SessionEnd::Abandoned {
            feedback_submitted: true
        })
    );
    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].session_id, session_id);
    assert_eq!(records[0].reason, ExitReason::Other);
    assert_eq!(records[0].custom_text.as_deref(), Some("phone rang"));
    assert_eq!(records[0].exercise_name, "Plank");
}

#[tokio::test(start_paused = true)]
async fn test_paused_session_ignores_ticks() {
    let session = Session::new(&timed_plan(), Timings::default()).unwrap();
    let (driver, handle) = SessionDriver::new(session);
    let mut recorder = Recorder::new(None);

    handle.dispatch(Action::Start);
    handle.dispatch(Action::Pause);

    let sink = CollectingSink::default();
    let controller = async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.unmount();
    };
    let (exit, _) = tokio::join!(driver.run(&sink, &mut recorder), controller);

    assert_eq!(exit, DriverExit::Unmounted);
    let last = recorder.last();
    assert_eq!(last.phase, Phase::Paused);
    assert_eq!(last.timer_value, 3);
    assert!(!last.is_timer_active);
}

#[tokio::test(start_paused = true)]
async fn test_observer_break_stops_the_loop() {
    let session = Session::new(&timed_plan(), Timings::default()).unwrap();
    let (driver, handle) = SessionDriver::new(session);
    let mut recorder = Recorder::new(None);
    recorder.give_up_after = Some(2);

    let started = Instant::now();
    handle.dispatch(Action::Start);
    let exit = driver.run(&CollectingSink::default(), &mut recorder).await;

    assert_eq!(exit, DriverExit::Stopped);
    assert_eq!(recorder.snapshots.len(), 2);
    assert_eq!(recorder.last().phase, Phase::Preparing);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(handle.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_zero_length_plan_finishes_without_ticks() {
    let plan = WorkoutPlan {
        id: None,
        plan_name: "Instant".to_string(),
        exercises: vec![Exercise {
            name: "Hold".to_string(),
            duration_seconds: Some(0),
            ..Default::default()
        }],
    };
    let timings = Timings {
        prep_seconds: 0,
        rest_seconds: 0,
    };
    let session = Session::new(&plan, timings).unwrap();
    let (driver, handle) = SessionDriver::new(session);

    let started = Instant::now();
    handle.dispatch(Action::Start);
    handle.dispatch(Action::Continue);
    let exit = driver
        .run(&CollectingSink::default(), &mut NoopObserver)
        .await;

    assert_eq!(exit, DriverExit::Ended(SessionEnd::Completed));
    assert!(started.elapsed() < Duration::from_secs(1));
}
