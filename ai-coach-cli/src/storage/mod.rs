// Local storage module using sled embedded database

use ai_coach_session::{FeedbackRecord, FeedbackSink};
use anyhow::{Context, Result};
use sled::Db;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FEEDBACK_TREE: &str = "feedback";

/// Storage manager for local embedded database
pub struct Storage {
    db: Db,
}

impl Storage {
    /// Resolve the database directory.
    ///
    /// `AI_COACH_DB_PATH` wins over the configured path, which wins over
    /// `~/.ai-coach/db`.
    pub fn db_path(configured: Option<&Path>) -> Result<PathBuf> {
        // Check for test environment variable first
        if let Ok(test_path) = std::env::var("AI_COACH_DB_PATH") {
            return Ok(PathBuf::from(test_path));
        }

        if let Some(path) = configured {
            return Ok(path.to_path_buf());
        }

        let config_dir = crate::config::Config::config_dir()?;
        Ok(config_dir.join("db"))
    }

    /// Initialize storage with sled database
    pub fn init(configured: Option<&Path>) -> Result<Self> {
        let db_path = Self::db_path(configured)?;
        Self::open(&db_path)
    }

    /// Open a database at an exact path
    pub fn open(path: &Path) -> Result<Self> {
        tracing::info!("Initializing sled database at {:?}", path);

        let db = sled::open(path).context("Failed to open sled database")?;

        Ok(Self { db })
    }

    /// Save a feedback record, keyed by its session
    pub fn save_feedback(&self, record: &FeedbackRecord) -> Result<()> {
        let tree = self
            .db
            .open_tree(FEEDBACK_TREE)
            .context("Failed to open feedback tree")?;

        let key = record.session_id.as_bytes();
        let value = bincode::serialize(record).context("Failed to serialize feedback")?;

        tree.insert(key, value)
            .context("Failed to insert feedback")?;

        self.db.flush().context("Failed to flush database")?;

        tracing::debug!("Saved feedback for session {}", record.session_id);
        Ok(())
    }

    /// Get the feedback left for a session
    pub fn get_feedback(&self, session_id: &Uuid) -> Result<Option<FeedbackRecord>> {
        let tree = self
            .db
            .open_tree(FEEDBACK_TREE)
            .context("Failed to open feedback tree")?;

        if let Some(value) = tree
            .get(session_id.as_bytes())
            .context("Failed to get feedback")?
        {
            let record: FeedbackRecord =
                bincode::deserialize(&value).context("Failed to deserialize feedback")?;
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    /// List feedback records, newest first
    pub fn list_feedback(&self, limit: usize) -> Result<Vec<FeedbackRecord>> {
        let tree = self
            .db
            .open_tree(FEEDBACK_TREE)
            .context("Failed to open feedback tree")?;

        let mut records = Vec::new();

        for item in tree.iter() {
            let (_key, value) = item.context("Failed to iterate feedback")?;
            let record: FeedbackRecord =
                bincode::deserialize(&value).context("Failed to deserialize feedback")?;
            records.push(record);
        }

        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        records.truncate(limit);

        Ok(records)
    }
}

impl FeedbackSink for Storage {
    fn record(&self, feedback: &FeedbackRecord) {
        if let Err(e) = self.save_feedback(feedback) {
            tracing::warn!(session = %feedback.session_id, "Failed to store feedback: {:#}", e);
        }
    }
}
