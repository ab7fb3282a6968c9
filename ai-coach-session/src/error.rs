use thiserror::Error;

/// Fatal configuration problems detected before a session is created.
///
/// Everything else the session encounters is recovered locally, so this is
/// the only error that crosses the public API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Workout plan '{plan}' has no exercises")]
    NoExercises { plan: String },

    #[error("Exercise #{position} in plan '{plan}' has no name")]
    UnnamedExercise { plan: String, position: usize },

    #[error("Invalid plan document: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Malformed(err.to_string())
    }
}
