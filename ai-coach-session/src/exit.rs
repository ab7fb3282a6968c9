use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why the user left a session early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    TooHard,
    Tired,
    NotEnoughTime,
    EquipmentIssue,
    Other,
}

impl ExitReason {
    pub const ALL: [ExitReason; 5] = [
        ExitReason::TooHard,
        ExitReason::Tired,
        ExitReason::NotEnoughTime,
        ExitReason::EquipmentIssue,
        ExitReason::Other,
    ];

    /// Human readable label for prompts
    pub fn label(&self) -> &'static str {
        match self {
            ExitReason::TooHard => "Too hard",
            ExitReason::Tired => "Too tired",
            ExitReason::NotEnoughTime => "Not enough time",
            ExitReason::EquipmentIssue => "Equipment issue",
            ExitReason::Other => "Other",
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::TooHard => write!(f, "TooHard"),
            ExitReason::Tired => write!(f, "Tired"),
            ExitReason::NotEnoughTime => write!(f, "NotEnoughTime"),
            ExitReason::EquipmentIssue => write!(f, "EquipmentIssue"),
            ExitReason::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for ExitReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "toohard" => Ok(ExitReason::TooHard),
            "tired" => Ok(ExitReason::Tired),
            "notenoughtime" => Ok(ExitReason::NotEnoughTime),
            "equipmentissue" => Ok(ExitReason::EquipmentIssue),
            "other" => Ok(ExitReason::Other),
            _ => Err(format!("Invalid exit reason: {}", s)),
        }
    }
}

/// Open exit prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitFlow {
    /// Whether the countdown was running when the prompt opened
    pub timer_was_active: bool,
    pub reason: Option<ExitReason>,
    pub custom_text: String,
}

impl ExitFlow {
    pub fn open(timer_was_active: bool) -> Self {
        Self {
            timer_was_active,
            reason: None,
            custom_text: String::new(),
        }
    }

    pub fn select_reason(&mut self, reason: ExitReason) {
        self.reason = Some(reason);
    }

    pub fn set_custom_text(&mut self, text: impl Into<String>) {
        self.custom_text = text.into();
    }

    /// A reason is chosen, and `Other` comes with a non-blank explanation
    pub fn can_submit(&self) -> bool {
        match self.reason {
            Some(ExitReason::Other) => !self.custom_text.trim().is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    /// The explanation carried into the record, only for `Other`
    pub fn effective_text(&self) -> Option<String> {
        match self.reason {
            Some(ExitReason::Other) => Some(self.custom_text.trim().to_string()),
            _ => None,
        }
    }
}

/// Feedback captured when a session is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub session_id: Uuid,
    pub reason: ExitReason,
    pub custom_text: Option<String>,
    pub exercise_name: String,
    pub set_number: u32,
    pub plan_name: String,
    pub elapsed_seconds: u64,
    pub submitted_at: DateTime<Utc>,
}

/// Receives feedback records. Delivery is fire-and-forget.
pub trait FeedbackSink: Send + Sync {
    fn record(&self, feedback: &FeedbackRecord);
}

/// Sink that only writes the record to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FeedbackSink for TracingSink {
    fn record(&self, feedback: &FeedbackRecord) {
        tracing::info!(
            session = %feedback.session_id,
            reason = %feedback.reason,
            exercise = %feedback.exercise_name,
            set = feedback.set_number,
            elapsed = feedback.elapsed_seconds,
            "Workout feedback"
        );
    }
}
