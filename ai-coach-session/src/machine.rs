//! Workout session state machine.
//!
//! The machine is a pure reducer: [`reduce`] takes the current
//! [`SessionState`], a read-only [`Context`] and one [`Action`], and returns
//! the next state together with the [`Effect`]s the host has to carry out.
//! Nothing here performs I/O or reads the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exit::{ExitFlow, ExitReason, FeedbackRecord};
use crate::plan::SessionPlan;
use crate::timer::{CountdownTimer, Expiry};

pub const PREP_DURATION_SECS: u32 = 3;
pub const REST_DURATION_SECS: u32 = 60;

/// Countdown lengths shared by every exercise of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default = "default_prep_seconds")]
    pub prep_seconds: u32,

    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
}

fn default_prep_seconds() -> u32 {
    PREP_DURATION_SECS
}

fn default_rest_seconds() -> u32 {
    REST_DURATION_SECS
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            prep_seconds: default_prep_seconds(),
            rest_seconds: default_rest_seconds(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    NotStarted,
    Preparing,
    ExercisingTimed,
    ExercisingReps,
    Paused,
    RestingBetweenSets,
    RestingBetweenExercises,
    CompletedExercisePendingNext,
    WorkoutComplete,
}

impl Phase {
    /// Phases in which the countdown may run
    pub fn is_counting(&self) -> bool {
        matches!(
            self,
            Phase::Preparing
                | Phase::ExercisingTimed
                | Phase::RestingBetweenSets
                | Phase::RestingBetweenExercises
        )
    }

    pub fn is_resting(&self) -> bool {
        matches!(
            self,
            Phase::RestingBetweenSets | Phase::RestingBetweenExercises
        )
    }

    /// Phases `skip` can short-circuit
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Phase::Preparing | Phase::RestingBetweenSets | Phase::RestingBetweenExercises
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::NotStarted => "NOT_STARTED",
            Phase::Preparing => "PREPARING",
            Phase::ExercisingTimed => "EXERCISING_TIMED",
            Phase::ExercisingReps => "EXERCISING_REPS",
            Phase::Paused => "PAUSED",
            Phase::RestingBetweenSets => "RESTING_BETWEEN_SETS",
            Phase::RestingBetweenExercises => "RESTING_BETWEEN_EXERCISES",
            Phase::CompletedExercisePendingNext => "COMPLETED_EXERCISE_PENDING_NEXT",
            Phase::WorkoutComplete => "WORKOUT_COMPLETE",
        };
        write!(f, "{}", s)
    }
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    FinishSet,
    Continue,
    Skip,
    Pause,
    Resume,
    PreviousExercise,
    Exit,
    SelectReason(ExitReason),
    SetCustomText(String),
    SubmitFeedback,
    SkipFeedback,
    CancelExit,
    /// One second of host time passed
    Tick,
    TimerExpired(Expiry),
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEnd {
    Completed,
    Abandoned { feedback_submitted: bool },
}

/// Messages for the user, shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    SetStarted {
        exercise: String,
        set: u32,
        total_sets: u32,
    },
    TimeUp {
        exercise: String,
    },
    RestBetweenSets {
        next_set: u32,
        seconds: u32,
    },
    RestBetweenExercises {
        next_exercise: String,
        seconds: u32,
    },
    WorkoutComplete {
        plan: String,
    },
}

/// Work the host performs after applying a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify(Notice),
    LogFeedback(FeedbackRecord),
    SessionEnded(SessionEnd),
}

/// Read-only inputs of a transition.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub plan: &'a SessionPlan,
    pub timings: Timings,
    pub now: DateTime<Utc>,
}

/// Result of reducing one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

/// Mutable session data, owned by the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    session_id: Uuid,
    phase: Phase,
    current_exercise_index: usize,
    current_set: u32,
    total_sets: u32,
    timer: CountdownTimer,
    previous_phase: Option<Phase>,
    workout_start_time: Option<DateTime<Utc>>,
    exit: Option<ExitFlow>,
    ended: Option<SessionEnd>,
}

impl SessionState {
    pub fn new(session_id: Uuid, plan: &SessionPlan) -> Self {
        Self {
            session_id,
            phase: Phase::NotStarted,
            current_exercise_index: 0,
            current_set: 1,
            total_sets: plan.exercise(0).total_sets,
            timer: CountdownTimer::new(),
            previous_phase: None,
            workout_start_time: None,
            exit: None,
            ended: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_exercise_index(&self) -> usize {
        self.current_exercise_index
    }

    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    pub fn total_sets(&self) -> u32 {
        self.total_sets
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn timer_value(&self) -> u32 {
        self.timer.remaining()
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.is_active()
    }

    pub fn previous_phase(&self) -> Option<Phase> {
        self.previous_phase
    }

    pub fn workout_start_time(&self) -> Option<DateTime<Utc>> {
        self.workout_start_time
    }

    pub fn exit_flow(&self) -> Option<&ExitFlow> {
        self.exit.as_ref()
    }

    pub fn ended(&self) -> Option<SessionEnd> {
        self.ended
    }

    pub fn is_ended(&self) -> bool {
        self.ended.is_some()
    }

    /// Seconds since `start`, 0 before the session started
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        self.workout_start_time
            .map(|start| (now - start).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }

    /// Describe the first broken state invariant, if any
    pub fn invariant_violation(&self, plan: &SessionPlan) -> Option<String> {
        if self.current_exercise_index >= plan.len() {
            return Some(format!(
                "exercise index {} out of range for {} exercises",
                self.current_exercise_index,
                plan.len()
            ));
        }
        if self.current_set < 1 || self.current_set > self.total_sets {
            return Some(format!(
                "set {} outside 1..={}",
                self.current_set, self.total_sets
            ));
        }
        if self.timer.is_active() && (!self.phase.is_counting() || self.timer.remaining() == 0) {
            return Some(format!(
                "timer active in {} with {}s left",
                self.phase,
                self.timer.remaining()
            ));
        }
        if self.previous_phase.is_some() != (self.phase == Phase::Paused) {
            return Some(format!(
                "previous phase {:?} while in {}",
                self.previous_phase, self.phase
            ));
        }
        let exercise = plan.exercise(self.current_exercise_index);
        if self.phase == Phase::ExercisingTimed && !exercise.is_timed() {
            return Some(format!("'{}' is rep-based but running timed", exercise.name));
        }
        if self.phase == Phase::ExercisingReps && exercise.is_timed() {
            return Some(format!("'{}' is timed but running reps", exercise.name));
        }
        None
    }

    fn apply(&mut self, ctx: &Context<'_>, action: Action, effects: &mut Vec<Effect>) {
        if self.ended.is_some() {
            return;
        }

        if self.exit.is_some() {
            self.apply_exit(ctx, action, effects);
            return;
        }

        match action {
            Action::Start => {
                if self.phase == Phase::NotStarted {
                    self.workout_start_time.get_or_insert(ctx.now);
                    tracing::info!(
                        session = %self.session_id,
                        "Starting workout '{}'",
                        ctx.plan.name()
                    );
                    self.enter_exercise(ctx, 0, effects);
                }
            }
            Action::Tick => {
                if let Some(expiry) = self.timer.tick() {
                    self.apply(ctx, Action::TimerExpired(expiry), effects);
                }
            }
            Action::TimerExpired(expiry) => {
                if self.timer.is_current(expiry) {
                    self.expire(ctx, effects);
                } else {
                    tracing::trace!("Dropping stale expiry of cycle {}", expiry.cycle);
                }
            }
            Action::Skip => {
                if self.phase.is_skippable() {
                    self.timer.clear();
                    self.expire(ctx, effects);
                }
            }
            Action::FinishSet => {
                if matches!(self.phase, Phase::ExercisingTimed | Phase::ExercisingReps) {
                    self.complete_set(ctx, effects);
                }
            }
            Action::Continue => {
                if self.phase == Phase::CompletedExercisePendingNext {
                    self.complete_set(ctx, effects);
                }
            }
            Action::Pause => {
                if self.phase.is_counting() && self.timer.is_active() {
                    self.previous_phase = Some(self.phase);
                    self.phase = Phase::Paused;
                    self.timer.pause();
                }
            }
            Action::Resume => {
                if self.phase == Phase::Paused {
                    if let Some(previous) = self.previous_phase.take() {
                        self.phase = previous;
                        self.timer.resume();
                    }
                }
            }
            Action::PreviousExercise => {
                if self.is_running() && self.current_exercise_index > 0 {
                    self.previous_phase = None;
                    self.enter_exercise(ctx, self.current_exercise_index - 1, effects);
                }
            }
            Action::Exit => {
                if self.is_running() {
                    let was_active = self.timer.is_active();
                    self.timer.pause();
                    self.exit = Some(ExitFlow::open(was_active));
                }
            }
            Action::SelectReason(_)
            | Action::SetCustomText(_)
            | Action::SubmitFeedback
            | Action::SkipFeedback
            | Action::CancelExit => {}
        }
    }

    fn apply_exit(&mut self, ctx: &Context<'_>, action: Action, effects: &mut Vec<Effect>) {
        let elapsed_seconds = self.elapsed_seconds(ctx.now);
        let Some(flow) = self.exit.as_mut() else {
            return;
        };

        match action {
            Action::SelectReason(reason) => flow.select_reason(reason),
            Action::SetCustomText(text) => flow.set_custom_text(text),
            Action::SubmitFeedback => {
                if !flow.can_submit() {
                    return;
                }
                let Some(reason) = flow.reason else {
                    return;
                };
                let record = FeedbackRecord {
                    session_id: self.session_id,
                    reason,
                    custom_text: flow.effective_text(),
                    exercise_name: ctx.plan.exercise(self.current_exercise_index).name.clone(),
                    set_number: self.current_set,
                    plan_name: ctx.plan.name().to_string(),
                    elapsed_seconds,
                    submitted_at: ctx.now,
                };
                effects.push(Effect::LogFeedback(record));
                self.end(
                    SessionEnd::Abandoned {
                        feedback_submitted: true,
                    },
                    effects,
                );
            }
            Action::SkipFeedback | Action::Skip => {
                self.end(
                    SessionEnd::Abandoned {
                        feedback_submitted: false,
                    },
                    effects,
                );
            }
            Action::CancelExit => {
                if flow.timer_was_active {
                    self.timer.resume();
                }
                self.exit = None;
            }
            _ => {}
        }
    }

    /// Started and not yet complete
    fn is_running(&self) -> bool {
        !matches!(self.phase, Phase::NotStarted | Phase::WorkoutComplete)
    }

    fn enter_exercise(&mut self, ctx: &Context<'_>, index: usize, effects: &mut Vec<Effect>) {
        self.current_exercise_index = index;
        self.current_set = 1;
        self.total_sets = ctx.plan.exercise(index).total_sets;
        self.begin_set(ctx, effects);
    }

    fn begin_set(&mut self, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
        let exercise = ctx.plan.exercise(self.current_exercise_index);
        effects.push(Effect::Notify(Notice::SetStarted {
            exercise: exercise.name.clone(),
            set: self.current_set,
            total_sets: self.total_sets,
        }));

        if exercise.is_timed() {
            self.phase = Phase::Preparing;
            self.arm(ctx, ctx.timings.prep_seconds, effects);
        } else {
            self.phase = Phase::ExercisingReps;
            self.timer.clear();
        }
    }

    /// Arm the countdown for the current phase. A zero-length countdown
    /// expires on the spot.
    fn arm(&mut self, ctx: &Context<'_>, seconds: u32, effects: &mut Vec<Effect>) {
        if seconds == 0 {
            self.timer.clear();
            self.expire(ctx, effects);
        } else {
            self.timer.reset(seconds);
        }
    }

    fn expire(&mut self, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
        let exercise = ctx.plan.exercise(self.current_exercise_index);

        match self.phase {
            Phase::Preparing => match exercise.duration_seconds() {
                Some(duration) => {
                    self.phase = Phase::ExercisingTimed;
                    self.arm(ctx, duration, effects);
                }
                None => {
                    self.phase = Phase::ExercisingReps;
                    self.timer.clear();
                }
            },
            Phase::ExercisingTimed => {
                self.phase = Phase::CompletedExercisePendingNext;
                self.timer.clear();
                effects.push(Effect::Notify(Notice::TimeUp {
                    exercise: exercise.name.clone(),
                }));
            }
            Phase::RestingBetweenSets => {
                self.current_set = (self.current_set + 1).min(self.total_sets);
                self.begin_set(ctx, effects);
            }
            Phase::RestingBetweenExercises => {
                if ctx.plan.has_next(self.current_exercise_index) {
                    self.enter_exercise(ctx, self.current_exercise_index + 1, effects);
                } else {
                    self.finish_workout(ctx, effects);
                }
            }
            _ => {}
        }
    }

    fn complete_set(&mut self, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
        self.timer.clear();
        let rest = ctx.timings.rest_seconds;

        if self.current_set < self.total_sets {
            self.phase = Phase::RestingBetweenSets;
            effects.push(Effect::Notify(Notice::RestBetweenSets {
                next_set: self.current_set + 1,
                seconds: rest,
            }));
            self.arm(ctx, rest, effects);
        } else if ctx.plan.has_next(self.current_exercise_index) {
            self.phase = Phase::RestingBetweenExercises;
            effects.push(Effect::Notify(Notice::RestBetweenExercises {
                next_exercise: ctx
                    .plan
                    .exercise(self.current_exercise_index + 1)
                    .name
                    .clone(),
                seconds: rest,
            }));
            self.arm(ctx, rest, effects);
        } else {
            self.finish_workout(ctx, effects);
        }
    }

    fn finish_workout(&mut self, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
        self.phase = Phase::WorkoutComplete;
        self.timer.clear();
        effects.push(Effect::Notify(Notice::WorkoutComplete {
            plan: ctx.plan.name().to_string(),
        }));
        self.end(SessionEnd::Completed, effects);
    }

    fn end(&mut self, end: SessionEnd, effects: &mut Vec<Effect>) {
        tracing::info!(session = %self.session_id, "Session ended: {:?}", end);
        self.ended = Some(end);
        effects.push(Effect::SessionEnded(end));
    }
}

/// Apply one action to a session state.
pub fn reduce(state: &SessionState, ctx: &Context<'_>, action: Action) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();
    next.apply(ctx, action, &mut effects);
    Transition {
        state: next,
        effects,
    }
}
