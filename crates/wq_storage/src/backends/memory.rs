use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use wq_core::{NewQuizRecord, QuizRecord, QuizStorage, Result};
use crate::StorageBackend;

#[derive(Default)]
struct MemoryStore {
    next_id: i64,
    records: Vec<QuizRecord>,
}

/// Process-local store; contents are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should always be available"
    }

    async fn connect(_database_url: &str) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl QuizStorage for InMemoryStorage {
    async fn save(&self, record: NewQuizRecord) -> Result<QuizRecord> {
        let mut store = self.store.write().await;
        store.next_id += 1;
        let saved = QuizRecord {
            id: store.next_id,
            url: record.url,
            title: record.title,
            date_generated: Utc::now(),
            scraped_content: record.scraped_content,
            full_quiz_data: record.full_quiz_data,
        };
        store.records.push(saved.clone());
        tracing::debug!("Stored quiz {} in memory", saved.id);
        Ok(saved)
    }

    async fn list_recent(&self) -> Result<Vec<QuizRecord>> {
        let store = self.store.read().await;
        let mut records = store.records.clone();
        records.sort_by(|a, b| b.date_generated.cmp(&a.date_generated).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn get_record(&self, id: i64) -> Result<Option<QuizRecord>> {
        let store = self.store.read().await;
        Ok(store.records.iter().find(|r| r.id == id).cloned())
    }
}
