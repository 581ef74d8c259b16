use async_trait::async_trait;
use serde_json::Value;
use crate::types::{NewQuizRecord, QuizRecord};
use crate::{Error, Result};

/// Append-only persistence for generated quizzes.
#[async_trait]
pub trait QuizStorage: Send + Sync {
    /// Inserts a new record, assigning its id and timestamp
    async fn save(&self, record: NewQuizRecord) -> Result<QuizRecord>;

    /// All records, newest first
    async fn list_recent(&self) -> Result<Vec<QuizRecord>>;

    async fn get_record(&self, id: i64) -> Result<Option<QuizRecord>>;

    /// Returns the stored quiz payload exactly as it was saved.
    async fn get_by_id(&self, id: i64) -> Result<Value> {
        let record = self.get_record(id).await?.ok_or(Error::NotFound(id))?;
        serde_json::from_str(&record.full_quiz_data).map_err(|e| Error::CorruptRecord {
            id,
            message: e.to_string(),
        })
    }
}
