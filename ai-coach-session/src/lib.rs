//! Active workout session engine for AI Coach.
//!
//! A [`Session`] guides one user through one [`WorkoutPlan`]: preparation
//! countdowns, timed or rep-based sets, rests between sets and exercises,
//! pause/resume, skipping ahead and an early-exit feedback prompt.
//!
//! ```text
//! WorkoutPlan --adapt--> SessionPlan --+
//!                                      v
//! Action --> reduce(SessionState) --> SessionState + [Effect]
//!    ^                                              |
//!    +-------- Tick / TimerExpired <-- CountdownTimer
//! ```
//!
//! [`SessionDriver`] hosts a session on tokio, feeding it one tick per second
//! and routing effects to a [`FeedbackSink`] and a [`SessionObserver`].

pub mod clock;
pub mod driver;
pub mod error;
pub mod exit;
pub mod machine;
pub mod plan;
pub mod session;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{
    DriverExit, NoopObserver, SessionDriver, SessionHandle, SessionObserver, TICK_PERIOD,
};
pub use error::PlanError;
pub use exit::{ExitFlow, ExitReason, FeedbackRecord, FeedbackSink, TracingSink};
pub use machine::{
    reduce, Action, Context, Effect, Notice, Phase, SessionEnd, SessionState, Timings, Transition,
    PREP_DURATION_SECS, REST_DURATION_SECS,
};
pub use plan::{
    Exercise, ExerciseKind, ExerciseMedia, PlanExercise, SessionPlan, SetCount, WorkoutPlan,
};
pub use session::{ExitPrompt, Session, Snapshot};
pub use timer::{CountdownTimer, Expiry};
