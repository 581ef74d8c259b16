use async_trait::async_trait;
use std::sync::Arc;
use wq_core::{Error, QuizStorage, Result};

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: QuizStorage + Sized {
    fn get_error_message() -> &'static str;

    async fn connect(database_url: &str) -> Result<Self>;
}

async fn open<T: StorageBackend + 'static>(database_url: &str) -> Result<Arc<dyn QuizStorage>> {
    match T::connect(database_url).await {
        Ok(storage) => Ok(Arc::new(storage)),
        Err(e) => Err(Error::Storage(format!("{} ({})", e, T::get_error_message()))),
    }
}

/// Opens the quiz store named by a database connection string.
///
/// `memory` keeps quizzes in process; `sqlite:` URLs need the `sqlite`
/// feature.
pub async fn create_storage(database_url: &str) -> Result<Arc<dyn QuizStorage>> {
    let database_url = database_url.trim();
    if database_url.is_empty() {
        return Err(Error::Config("DATABASE_URL is empty".to_string()));
    }

    if database_url == "memory" || database_url.starts_with("memory://") {
        return open::<InMemoryStorage>(database_url).await;
    }

    if database_url.starts_with("sqlite:") {
        #[cfg(feature = "sqlite")]
        return open::<SQLiteStorage>(database_url).await;

        #[cfg(not(feature = "sqlite"))]
        return Err(Error::Config(
            "SQLite support is not compiled in; enable the `sqlite` feature".to_string(),
        ));
    }

    Err(Error::Config(format!("Unsupported database URL: {}", database_url)))
}
