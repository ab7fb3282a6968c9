use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::PlanError;
use crate::exit::ExitReason;
use crate::machine::{reduce, Action, Context, Effect, Phase, SessionEnd, SessionState, Timings};
use crate::plan::{ExerciseMedia, SessionPlan, WorkoutPlan};

/// One running workout: the plan view, its state and the clock it reads.
pub struct Session<C: Clock = SystemClock> {
    plan: Arc<SessionPlan>,
    state: SessionState,
    timings: Timings,
    clock: C,
}

impl Session<SystemClock> {
    /// Validate `plan` and create a session in `NOT_STARTED`.
    ///
    /// Fails without creating any state when the plan is unusable.
    pub fn new(plan: &WorkoutPlan, timings: Timings) -> Result<Self, PlanError> {
        Self::with_clock(plan, timings, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(plan: &WorkoutPlan, timings: Timings, clock: C) -> Result<Self, PlanError> {
        let plan = match plan.adapt() {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!("Refusing to create session: {}", e);
                return Err(e);
            }
        };
        Ok(Self::from_view(Arc::new(plan), timings, clock))
    }

    /// Build a session over an already validated plan
    pub fn from_view(plan: Arc<SessionPlan>, timings: Timings, clock: C) -> Self {
        let state = SessionState::new(Uuid::new_v4(), &plan);
        tracing::debug!(session = %state.session_id(), "Created session for '{}'", plan.name());
        Self {
            plan,
            state,
            timings,
            clock,
        }
    }

    pub fn id(&self) -> Uuid {
        self.state.session_id()
    }

    pub fn plan(&self) -> &Arc<SessionPlan> {
        &self.plan
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    /// Apply one action and return the effects for the host to perform
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let ctx = Context {
            plan: &self.plan,
            timings: self.timings,
            now: self.clock.now(),
        };

        let is_tick = matches!(action, Action::Tick);
        let label = if is_tick {
            None
        } else {
            Some(format!("{:?}", action))
        };

        let transition = reduce(&self.state, &ctx, action);
        let from = self.state.phase();
        let to = transition.state.phase();

        if from != to {
            tracing::debug!(
                session = %self.id(),
                exercise = transition.state.current_exercise_index(),
                set = transition.state.current_set(),
                "Phase {} -> {}",
                from,
                to
            );
        } else if let Some(label) = label {
            if transition.state == self.state && transition.effects.is_empty() {
                tracing::trace!("Ignored {} in {}", label, from);
            }
        }

        self.state = transition.state;
        transition.effects
    }

    /// Deliver one second of host time
    pub fn tick(&mut self) -> Vec<Effect> {
        self.dispatch(Action::Tick)
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> Snapshot {
        let index = self.state.current_exercise_index();
        let exercise = self.plan.exercise(index);

        Snapshot {
            session_id: self.id(),
            plan_name: self.plan.name().to_string(),
            phase: self.state.phase(),
            paused_phase: self.state.previous_phase(),
            exercise_index: index,
            exercise_count: self.plan.len(),
            exercise_name: exercise.name.clone(),
            reps: exercise.reps.clone(),
            duration_seconds: exercise.duration_seconds(),
            media: exercise.media.clone(),
            current_set: self.state.current_set(),
            total_sets: self.state.total_sets(),
            timer_value: self.state.timer_value(),
            timer_total: self.state.timer().armed(),
            is_timer_active: self.state.is_timer_active(),
            next_exercise: self.plan.get(index + 1).map(|e| e.name.clone()),
            elapsed_seconds: self.state.elapsed_seconds(self.clock.now()),
            exit: self.state.exit_flow().map(|flow| ExitPrompt {
                reason: flow.reason,
                custom_text: flow.custom_text.clone(),
                can_submit: flow.can_submit(),
            }),
            ended: self.state.ended(),
        }
    }
}

/// Exit prompt as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitPrompt {
    pub reason: Option<ExitReason>,
    pub custom_text: String,
    pub can_submit: bool,
}

/// Everything a host needs to draw the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub session_id: Uuid,
    pub plan_name: String,
    pub phase: Phase,
    /// Phase to return to when paused
    pub paused_phase: Option<Phase>,
    pub exercise_index: usize,
    pub exercise_count: usize,
    pub exercise_name: String,
    pub reps: Option<String>,
    pub duration_seconds: Option<u32>,
    pub media: ExerciseMedia,
    pub current_set: u32,
    pub total_sets: u32,
    pub timer_value: u32,
    /// Length of the countdown `timer_value` belongs to
    pub timer_total: u32,
    pub is_timer_active: bool,
    pub next_exercise: Option<String>,
    pub elapsed_seconds: u64,
    pub exit: Option<ExitPrompt>,
    pub ended: Option<SessionEnd>,
}

impl Snapshot {
    /// Phase the user is effectively in, looking through a pause
    pub fn display_phase(&self) -> Phase {
        self.paused_phase.unwrap_or(self.phase)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::plan::Exercise;

    fn plan() -> WorkoutPlan {
        WorkoutPlan {
            id: None,
            plan_name: "Morning".to_string(),
            exercises: vec![
                Exercise {
                    name: "Jumping Jacks".to_string(),
                    duration_seconds: Some(30),
                    ..Default::default()
                },
                Exercise {
                    name: "Squats".to_string(),
                    sets: Some(3.into()),
                    reps: Some("15".to_string()),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_new_session_is_not_started() {
        let session = Session::new(&plan(), Timings::default()).unwrap();
        assert_eq!(session.phase(), Phase::NotStarted);
        assert_eq!(session.plan().len(), 2);
    }

    #[test]
    fn test_empty_plan_creates_nothing() {
        let empty = WorkoutPlan {
            id: None,
            plan_name: "Nothing".to_string(),
            exercises: vec![],
        };
        assert!(matches!(
            Session::new(&empty, Timings::default()),
            Err(PlanError::NoExercises { .. })
        ));
    }

    #[test]
    fn test_snapshot_tracks_progress() {
        let clock = ManualClock::default();
        let mut session = Session::with_clock(&plan(), Timings::default(), clock.clone()).unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::NotStarted);
        assert_eq!(snapshot.exercise_name, "Jumping Jacks");
        assert_eq!(snapshot.next_exercise.as_deref(), Some("Squats"));
        assert_eq!(snapshot.elapsed_seconds, 0);

        session.dispatch(Action::Start);
        clock.advance_secs(2);
        session.tick();
        session.tick();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Preparing);
        assert_eq!(snapshot.timer_value, 1);
        assert!(snapshot.is_timer_active);
        assert_eq!(snapshot.duration_seconds, Some(30));
        assert_eq!(snapshot.elapsed_seconds, 2);

        session.dispatch(Action::Pause);
        let snapshot = session.snapshot();
        assert!(snapshot.is_paused());
        assert_eq!(snapshot.display_phase(), Phase::Preparing);
    }

    #[test]
    fn test_snapshot_exposes_exit_prompt() {
        let mut session = Session::new(&plan(), Timings::default()).unwrap();
        session.dispatch(Action::Start);
        session.dispatch(Action::Exit);
        session.dispatch(Action::SelectReason(ExitReason::Other));

        let prompt = session.snapshot().exit.unwrap();
        assert_eq!(prompt.reason, Some(ExitReason::Other));
        assert!(!prompt.can_submit);

        session.dispatch(Action::SetCustomText("Rain".to_string()));
        assert!(session.snapshot().exit.unwrap().can_submit);
    }
}
