use ai_coach_session::{SessionPlan, WorkoutPlan};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Problems with a plan file itself, before its content is looked at.
#[derive(Error, Debug)]
pub enum PlanFileError {
    #[error("Unsupported plan format for {}: expected .json or .toml", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// Document formats a plan can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Json,
    Toml,
}

impl PlanFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, PlanFileError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("json") => Ok(PlanFormat::Json),
            Some("toml") => Ok(PlanFormat::Toml),
            _ => Err(PlanFileError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn parse(&self, contents: &str) -> Result<WorkoutPlan> {
        let plan = match self {
            PlanFormat::Json => WorkoutPlan::from_json_str(contents)?,
            PlanFormat::Toml => toml::from_str(contents).context("Failed to parse TOML plan")?,
        };
        Ok(plan)
    }
}

/// Read a plan document without validating it
pub fn read_plan(path: &Path) -> Result<WorkoutPlan> {
    let format = PlanFormat::from_path(path)?;
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;

    let plan = format
        .parse(&contents)
        .with_context(|| format!("Failed to load plan {}", path.display()))?;

    tracing::debug!(
        "Loaded plan '{}' with {} exercises from {}",
        plan.plan_name,
        plan.exercises.len(),
        path.display()
    );
    Ok(plan)
}

/// Read a plan and check that a session can run it
pub fn load_plan(path: &Path) -> Result<(WorkoutPlan, SessionPlan)> {
    let plan = read_plan(path)?;
    let view = plan
        .adapt()
        .with_context(|| format!("Plan {} cannot be run", path.display()))?;
    Ok((plan, view))
}
