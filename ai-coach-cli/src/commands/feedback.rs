use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::storage::Storage;
use crate::ui::format_clock;

/// List stored exit feedback, newest first
pub async fn list_feedback(config: &Config, limit: usize) -> Result<()> {
    let storage = Storage::init(config.storage.feedback_db.as_deref())?;
    let records = storage.list_feedback(limit)?;

    println!("Workout Feedback");
    println!();

    if records.is_empty() {
        println!("No feedback recorded yet.");
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {}  {}",
            record.submitted_at.format("%Y-%m-%d %H:%M"),
            record.reason.label().yellow(),
            record.plan_name.bold()
        );
        println!(
            "    stopped at {} set {} after {}",
            record.exercise_name,
            record.set_number,
            format_clock(record.elapsed_seconds)
        );
        if let Some(text) = &record.custom_text {
            println!("    \"{}\"", text);
        }
    }

    Ok(())
}
