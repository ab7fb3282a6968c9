use ai_coach_session::{
    Action, Effect, Exercise, ExitReason, ManualClock, Notice, Phase, PlanError, Session,
    SessionEnd, Timings, WorkoutPlan,
};
use anyhow::Result;
use pretty_assertions::assert_eq;

/// Helper to build a plan from exercises
fn plan(name: &str, exercises: Vec<Exercise>) -> WorkoutPlan {
    WorkoutPlan {
        id: Some("plan-1".to_string()),
        plan_name: name.to_string(),
        exercises,
    }
}

fn rep_exercise(name: &str, sets: &str) -> Exercise {
    Exercise {
        name: name.to_string(),
        sets: Some(sets.into()),
        reps: Some("12".to_string()),
        ..Default::default()
    }
}

fn timed_exercise(name: &str, sets: u32, seconds: u32) -> Exercise {
    Exercise {
        name: name.to_string(),
        sets: Some(sets.into()),
        duration_seconds: Some(seconds),
        ..Default::default()
    }
}

fn session(plan: &WorkoutPlan) -> Result<(Session<ManualClock>, ManualClock)> {
    let clock = ManualClock::default();
    let session = Session::with_clock(plan, Timings::default(), clock.clone())?;
    Ok((session, clock))
}

fn ticks(session: &mut Session<ManualClock>, clock: &ManualClock, n: u32) -> Vec<Effect> {
    let mut effects = Vec::new();
    for _ in 0..n {
        clock.advance_secs(1);
        effects.extend(session.tick());
    }
    effects
}

#[test]
fn test_single_rep_exercise_three_sets() -> Result<()> {
    let plan = plan("Push Day", vec![rep_exercise("Push-ups", "3")]);
    let (mut session, clock) = session(&plan)?;

    session.dispatch(Action::Start);
    assert_eq!(session.phase(), Phase::ExercisingReps);
    assert_eq!(session.state().current_set(), 1);

    let effects = session.dispatch(Action::FinishSet);
    assert_eq!(session.phase(), Phase::RestingBetweenSets);
    assert_eq!(session.state().timer_value(), 60);
    assert!(effects.contains(&Effect::Notify(Notice::RestBetweenSets {
        next_set: 2,
        seconds: 60
    })));

    ticks(&mut session, &clock, 60);
    assert_eq!(session.phase(), Phase::ExercisingReps);
    assert_eq!(session.state().current_set(), 2);

    session.dispatch(Action::FinishSet);
    assert_eq!(session.phase(), Phase::RestingBetweenSets);
    session.dispatch(Action::Skip);
    assert_eq!(session.state().current_set(), 3);

    let effects = session.dispatch(Action::FinishSet);
    assert_eq!(session.phase(), Phase::WorkoutComplete);
    assert!(effects.contains(&Effect::SessionEnded(SessionEnd::Completed)));

    Ok(())
}

#[test]
fn test_single_timed_exercise() -> Result<()> {
    let plan = plan("Core", vec![timed_exercise("Plank", 1, 30)]);
    let (mut session, clock) = session(&plan)?;

    session.dispatch(Action::Start);
    assert_eq!(session.phase(), Phase::Preparing);
    assert_eq!(session.state().timer_value(), 3);

    ticks(&mut session, &clock, 3);
    assert_eq!(session.phase(), Phase::ExercisingTimed);
    assert_eq!(session.state().timer_value(), 30);

    let effects = ticks(&mut session, &clock, 30);
    assert_eq!(session.phase(), Phase::CompletedExercisePendingNext);
    assert!(!session.state().is_timer_active());
    assert!(effects.contains(&Effect::Notify(Notice::TimeUp {
        exercise: "Plank".to_string()
    })));

    let effects = session.dispatch(Action::Continue);
    assert_eq!(session.phase(), Phase::WorkoutComplete);
    assert!(effects.contains(&Effect::SessionEnded(SessionEnd::Completed)));

    Ok(())
}

#[test]
fn test_zero_duration_is_still_timed() -> Result<()> {
    let plan = plan("Holds", vec![timed_exercise("Hold", 1, 0)]);
    let (mut session, clock) = session(&plan)?;

    session.dispatch(Action::Start);
    assert_eq!(session.phase(), Phase::Preparing);
    assert_eq!(session.state().timer_value(), 3);

    // Prep runs out and the zero-length countdown finishes on the spot
    let effects = ticks(&mut session, &clock, 3);
    assert_eq!(session.phase(), Phase::CompletedExercisePendingNext);
    assert!(!session.state().is_timer_active());
    assert!(effects.contains(&Effect::Notify(Notice::TimeUp {
        exercise: "Hold".to_string()
    })));

    session.dispatch(Action::Continue);
    assert_eq!(session.phase(), Phase::WorkoutComplete);

    Ok(())
}

#[test]
fn test_rest_between_exercises_then_skip() -> Result<()> {
    let plan = plan(
        "Mixed",
        vec![rep_exercise("Squats", "1"), timed_exercise("Wall Sit", 2, 45)],
    );
    let (mut session, _clock) = session(&plan)?;

    session.dispatch(Action::Start);
    let effects = session.dispatch(Action::FinishSet);
    assert_eq!(session.phase(), Phase::RestingBetweenExercises);
    assert_eq!(session.state().timer_value(), 60);
    assert!(effects.contains(&Effect::Notify(Notice::RestBetweenExercises {
        next_exercise: "Wall Sit".to_string(),
        seconds: 60
    })));

    session.dispatch(Action::Skip);
    assert_eq!(session.phase(), Phase::Preparing);
    assert_eq!(session.state().timer_value(), 3);
    assert_eq!(session.state().current_exercise_index(), 1);
    assert_eq!(session.state().current_set(), 1);
    assert_eq!(session.state().total_sets(), 2);

    Ok(())
}

#[test]
fn test_pause_and_resume_mid_exercise() -> Result<()> {
    let plan = plan("Core", vec![timed_exercise("Plank", 1, 30)]);
    let (mut session, clock) = session(&plan)?;

    session.dispatch(Action::Start);
    ticks(&mut session, &clock, 3);
    ticks(&mut session, &clock, 10);
    assert_eq!(session.state().timer_value(), 20);

    session.dispatch(Action::Pause);
    assert_eq!(session.phase(), Phase::Paused);
    assert_eq!(session.state().timer_value(), 20);
    assert_eq!(
        session.state().previous_phase(),
        Some(Phase::ExercisingTimed)
    );

    session.dispatch(Action::Resume);
    assert_eq!(session.phase(), Phase::ExercisingTimed);
    assert_eq!(session.state().timer_value(), 20);
    assert!(session.state().is_timer_active());
    assert_eq!(session.state().previous_phase(), None);

    Ok(())
}

#[test]
fn test_exit_with_feedback_during_rest() -> Result<()> {
    let plan = plan("Push Day", vec![rep_exercise("Push-ups", "3")]);
    let (mut session, clock) = session(&plan)?;

    session.dispatch(Action::Start);
    clock.advance_secs(95);
    session.dispatch(Action::FinishSet);
    ticks(&mut session, &clock, 5);
    assert_eq!(session.phase(), Phase::RestingBetweenSets);

    session.dispatch(Action::Exit);
    session.dispatch(Action::SelectReason(ExitReason::Tired));
    let effects = session.dispatch(Action::SubmitFeedback);

    let record = effects
        .iter()
        .find_map(|e| match e {
            Effect::LogFeedback(record) => Some(record.clone()),
            _ => None,
        })
        .expect("feedback record");

    assert_eq!(record.reason, ExitReason::Tired);
    assert_eq!(record.custom_text, None);
    assert_eq!(record.exercise_name, "Push-ups");
    assert_eq!(record.set_number, 1);
    assert_eq!(record.plan_name, "Push Day");
    assert_eq!(record.elapsed_seconds, 100);
    assert_eq!(record.session_id, session.id());
    assert!(effects.contains(&Effect::SessionEnded(SessionEnd::Abandoned {
        feedback_submitted: true
    })));
    assert!(session.is_ended());

    Ok(())
}

#[test]
fn test_empty_plan_fails_to_initialize() {
    let plan = plan("Nothing", vec![]);
    let result = Session::new(&plan, Timings::default());

    match result {
        Err(PlanError::NoExercises { plan }) => assert_eq!(plan, "Nothing"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("session created for an empty plan"),
    }
}

#[test]
fn test_malformed_sets_default_to_one() -> Result<()> {
    let plan = plan(
        "Sloppy",
        vec![rep_exercise("Lunges", "a few"), rep_exercise("Dips", "0")],
    );
    let (mut session, _clock) = session(&plan)?;

    session.dispatch(Action::Start);
    assert_eq!(session.state().total_sets(), 1);

    // Single set means straight to the next exercise
    session.dispatch(Action::FinishSet);
    assert_eq!(session.phase(), Phase::RestingBetweenExercises);

    Ok(())
}

#[test]
fn test_ended_session_ignores_everything() -> Result<()> {
    let plan = plan("Push Day", vec![rep_exercise("Push-ups", "1")]);
    let (mut session, clock) = session(&plan)?;

    session.dispatch(Action::Start);
    session.dispatch(Action::Exit);
    session.dispatch(Action::SkipFeedback);
    assert_eq!(
        session.state().ended(),
        Some(SessionEnd::Abandoned {
            feedback_submitted: false
        })
    );

    let frozen = session.state().clone();
    for action in [
        Action::CancelExit,
        Action::FinishSet,
        Action::Start,
        Action::Resume,
    ] {
        assert!(session.dispatch(action).is_empty());
    }
    ticks(&mut session, &clock, 10);
    assert_eq!(session.state(), &frozen);

    Ok(())
}

#[test]
fn test_full_workout_walkthrough() -> Result<()> {
    let plan = plan(
        "Full Body",
        vec![
            timed_exercise("Jumping Jacks", 1, 20),
            rep_exercise("Squats", "2"),
            timed_exercise("Plank", 1, 15),
        ],
    );
    let (mut session, clock) = session(&plan)?;
    let mut seen = vec![session.phase()];
    let mut record = |session: &Session<ManualClock>| {
        if seen.last() != Some(&session.phase()) {
            seen.push(session.phase());
        }
    };

    session.dispatch(Action::Start);
    record(&session);
    for _ in 0..23 {
        clock.advance_secs(1);
        session.tick();
        record(&session);
    }
    session.dispatch(Action::Continue);
    record(&session);
    session.dispatch(Action::Skip);
    record(&session);
    session.dispatch(Action::FinishSet);
    record(&session);
    session.dispatch(Action::Skip);
    record(&session);
    session.dispatch(Action::FinishSet);
    record(&session);
    session.dispatch(Action::Skip);
    record(&session);
    session.dispatch(Action::Skip);
    record(&session);
    session.dispatch(Action::FinishSet);
    record(&session);

    assert_eq!(
        seen,
        vec![
            Phase::NotStarted,
            Phase::Preparing,
            Phase::ExercisingTimed,
            Phase::CompletedExercisePendingNext,
            Phase::RestingBetweenExercises,
            Phase::ExercisingReps,
            Phase::RestingBetweenSets,
            Phase::ExercisingReps,
            Phase::RestingBetweenExercises,
            Phase::Preparing,
            Phase::ExercisingTimed,
            Phase::WorkoutComplete,
        ]
    );

    Ok(())
}
