use ai_coach_session::{Action, ExitReason, Notice, Phase, SessionEnd, Snapshot};
use colored::{ColoredString, Colorize};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the session host to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Dispatch(Action),
    /// Leave without ending the session
    Unmount,
}

/// Translate a key press into an input for the session in `snapshot`.
///
/// While the exit prompt is open every key belongs to it. With "Other"
/// selected, printable characters edit the text and arrow keys move the
/// reason selection instead of the number keys.
pub fn map_key(snapshot: &Snapshot, key: KeyEvent) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Input::Unmount);
    }

    if snapshot.ended.is_some() {
        return match key.code {
            KeyCode::Char('q') | KeyCode::Enter | KeyCode::Esc => Some(Input::Unmount),
            _ => None,
        };
    }

    let action = match &snapshot.exit {
        Some(prompt) => map_exit_key(prompt.reason, &prompt.custom_text, key.code)?,
        None => map_session_key(snapshot, key.code)?,
    };
    Some(Input::Dispatch(action))
}

fn map_exit_key(reason: Option<ExitReason>, text: &str, code: KeyCode) -> Option<Action> {
    let typing = reason == Some(ExitReason::Other);

    match code {
        KeyCode::Enter => Some(Action::SubmitFeedback),
        KeyCode::Tab => Some(Action::SkipFeedback),
        KeyCode::Esc => Some(Action::CancelExit),
        KeyCode::Up => Some(Action::SelectReason(cycle_reason(reason, false))),
        KeyCode::Down => Some(Action::SelectReason(cycle_reason(reason, true))),
        KeyCode::Backspace if typing => {
            let mut text = text.to_string();
            text.pop();
            Some(Action::SetCustomText(text))
        }
        KeyCode::Char(c) if typing => Some(Action::SetCustomText(format!("{}{}", text, c))),
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            Some(Action::SelectReason(ExitReason::ALL[index]))
        }
        _ => None,
    }
}

fn cycle_reason(current: Option<ExitReason>, forward: bool) -> ExitReason {
    let len = ExitReason::ALL.len();
    let index = match current.and_then(|r| ExitReason::ALL.iter().position(|c| *c == r)) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    ExitReason::ALL[index]
}

fn map_session_key(snapshot: &Snapshot, code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char(' ') => Some(Action::Start),
        KeyCode::Enter => {
            if snapshot.phase == Phase::CompletedExercisePendingNext {
                Some(Action::Continue)
            } else {
                Some(Action::FinishSet)
            }
        }
        KeyCode::Char('n') => Some(Action::Skip),
        KeyCode::Char('p') => {
            if snapshot.is_paused() {
                Some(Action::Resume)
            } else {
                Some(Action::Pause)
            }
        }
        KeyCode::Char('b') => Some(Action::PreviousExercise),
        KeyCode::Char('x') => Some(Action::Exit),
        _ => None,
    }
}

/// One-line message for a notice
pub fn describe_notice(notice: &Notice) -> String {
    match notice {
        Notice::SetStarted {
            exercise,
            set,
            total_sets,
        } => format!("{}: set {} of {}", exercise, set, total_sets),
        Notice::TimeUp { exercise } => format!("Time's up! {} done", exercise),
        Notice::RestBetweenSets { next_set, seconds } => {
            format!("Rest {}s before set {}", seconds, next_set)
        }
        Notice::RestBetweenExercises {
            next_exercise,
            seconds,
        } => format!("Rest {}s, next up: {}", seconds, next_exercise),
        Notice::WorkoutComplete { plan } => format!("Workout complete: {}", plan),
    }
}

/// Closing line printed after the terminal is restored
pub fn describe_end(end: SessionEnd) -> &'static str {
    match end {
        SessionEnd::Completed => "Workout complete. Great job!",
        SessionEnd::Abandoned {
            feedback_submitted: true,
        } => "Workout ended early. Thanks for the feedback.",
        SessionEnd::Abandoned {
            feedback_submitted: false,
        } => "Workout ended early.",
    }
}

/// Marker printed in front of the end message
pub fn end_marker(end: SessionEnd) -> ColoredString {
    match end {
        SessionEnd::Completed => "✓".green(),
        SessionEnd::Abandoned { .. } => "■".yellow(),
    }
}

/// Key hints for the status bar
pub fn key_hints(snapshot: &Snapshot) -> &'static str {
    if snapshot.ended.is_some() {
        return "q quit";
    }
    if let Some(prompt) = &snapshot.exit {
        return if prompt.reason == Some(ExitReason::Other) {
            "type reason · ↑/↓ change · enter submit · tab skip · esc back"
        } else {
            "1-5 reason · enter submit · tab skip · esc back"
        };
    }
    match snapshot.phase {
        Phase::NotStarted => "space start · x exit · ctrl-c leave",
        Phase::Paused => "p resume · x exit",
        Phase::ExercisingReps | Phase::ExercisingTimed => {
            "enter finish set · p pause · b back · x exit"
        }
        Phase::CompletedExercisePendingNext => "enter continue · b back · x exit",
        _ => "n skip · p pause · b back · x exit",
    }
}
