use ai_coach_session::{DriverExit, FeedbackSink, Session, SystemClock, TracingSink};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::models::load_plan;
use crate::storage::Storage;
use crate::ui::{describe_end, end_marker, ScreenOptions, SessionScreen};

#[derive(Args)]
pub struct RunCommand {
    /// Workout plan file (.json or .toml)
    plan: PathBuf,

    /// Override the rest between sets and exercises, in seconds
    #[arg(long)]
    rest: Option<u32>,

    /// Override the preparation countdown, in seconds
    #[arg(long)]
    prep: Option<u32>,
}

impl RunCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let (plan, view) = load_plan(&self.plan)?;

        let mut timings = config.session.timings();
        if let Some(rest) = self.rest {
            timings.rest_seconds = rest;
        }
        if let Some(prep) = self.prep {
            timings.prep_seconds = prep;
        }

        let sink: Box<dyn FeedbackSink> =
            match Storage::init(config.storage.feedback_db.as_deref()) {
                Ok(storage) => Box::new(storage),
                Err(e) => {
                    tracing::warn!("Feedback will only be logged: {:#}", e);
                    Box::new(TracingSink)
                }
            };

        let session = Session::from_view(Arc::new(view), timings, SystemClock);
        tracing::info!(
            session = %session.id(),
            "Starting '{}' from {}",
            plan.plan_name,
            self.plan.display()
        );

        let options = ScreenOptions::from_config(config);
        let exit = {
            let mut screen = SessionScreen::new()?;
            screen.run(session, sink.as_ref(), &options).await?
        };

        match exit {
            DriverExit::Ended(end) => {
                println!("{} {}", end_marker(end), describe_end(end).bold());
            }
            DriverExit::Unmounted | DriverExit::Stopped => {
                println!("Left '{}' without finishing", plan.plan_name);
            }
        }

        Ok(())
    }
}
