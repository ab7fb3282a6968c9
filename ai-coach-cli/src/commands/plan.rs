use ai_coach_session::ExerciseKind;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::models::load_plan;

/// Print a plan the way a session will run it
pub async fn show_plan(path: &Path) -> Result<()> {
    let (_, view) = load_plan(path)?;

    println!("{}", view.name().bold());
    println!("────────────────────────────────");

    for (idx, exercise) in view.exercises().iter().enumerate() {
        let work = match exercise.kind {
            ExerciseKind::Timed { duration_seconds } => format!("{}s", duration_seconds),
            ExerciseKind::Reps => match &exercise.reps {
                Some(reps) => format!("{} reps", reps),
                None => "reps".to_string(),
            },
        };

        println!(
            "{:>2}. {:<24} {} x {}",
            idx + 1,
            exercise.name,
            exercise.total_sets,
            work
        );

        if let Some(description) = &exercise.media.description {
            println!("    {}", description.dimmed());
        }
    }

    println!();
    println!("{} exercises", view.len());

    Ok(())
}

/// Check that a plan can be run
pub async fn validate_plan(path: &Path) -> Result<()> {
    let (_, view) = load_plan(path)?;

    println!(
        "{} '{}' is valid ({} exercises)",
        "✓".green(),
        view.name(),
        view.len()
    );

    Ok(())
}
