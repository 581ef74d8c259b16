use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use wq_core::quiz::HistoryItem;
use wq_core::{ArticleContent, NewQuizRecord, QuizOutput, QuizStorage, Result};
use wq_inference::QuizGenerator;
use crate::scrapers::Scraper;

/// Drives extraction, generation and persistence for one URL at a time.
#[derive(Clone)]
pub struct QuizManager {
    scraper: Arc<dyn Scraper>,
    generator: QuizGenerator,
    storage: Arc<dyn QuizStorage>,
}

impl std::fmt::Debug for QuizManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizManager")
            .field("scraper", &self.scraper)
            .field("generator", &self.generator)
            .field("storage", &"<dyn QuizStorage>")
            .finish()
    }
}

impl QuizManager {
    pub fn new(
        scraper: Arc<dyn Scraper>,
        generator: QuizGenerator,
        storage: Arc<dyn QuizStorage>,
    ) -> Self {
        Self {
            scraper,
            generator,
            storage,
        }
    }

    pub async fn scrape(&self, url: &str) -> Result<ArticleContent> {
        if !self.scraper.can_handle(url) {
            warn!(
                "⚠️ {} is not a {} URL, extraction may fail",
                url,
                self.scraper.source()
            );
        }
        self.scraper.scrape_article(url).await
    }

    /// Scrapes, generates and stores a quiz. Nothing is persisted unless
    /// every stage succeeds.
    pub async fn generate(&self, url: &str) -> Result<QuizOutput> {
        let article = self.scrape(url).await?;
        let quiz = self.generator.generate(&article).await?;

        let title = if quiz.title.trim().is_empty() {
            article.title.clone()
        } else {
            quiz.title.clone()
        };
        let record = self
            .storage
            .save(NewQuizRecord {
                url: article.url.clone(),
                title,
                scraped_content: Some(article.clean_text),
                full_quiz_data: serde_json::to_string(&quiz)?,
            })
            .await?;
        info!("💾 Stored quiz {} for {}", record.id, record.url);

        Ok(quiz)
    }

    pub async fn history(&self) -> Result<Vec<HistoryItem>> {
        let records = self.storage.list_recent().await?;
        Ok(records.iter().map(HistoryItem::from).collect())
    }

    pub async fn get_quiz(&self, id: i64) -> Result<Value> {
        self.storage.get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::HeuristicRecognizer;
    use crate::scrapers::WikipediaScraper;
    use async_trait::async_trait;
    use axum::{http::StatusCode, response::Html, routing::get, Router};
    use wq_core::Error;
    use wq_inference::models::DummyModel;
    use wq_inference::{Config, Provider};
    use wq_storage::backends::InMemoryStorage;

    const PAGE: &str = r#"<html><body><h1 id="firstHeading">Rust (programming language)</h1>
<div id="mw-content-text">
<p>Rust is a general-purpose programming language emphasizing performance, type safety and concurrency,
and it enforces memory safety without a garbage collector by tracking ownership and borrowing.</p>
<h2><span class="mw-headline">History</span></h2>
<ul><li>Graydon Hoare started the project in 2006.</li></ul>
</div></body></html>"#;

    async fn spawn_stub() -> String {
        let router = Router::new()
            .route("/wiki/Rust", get(|| async { Html(PAGE) }))
            .route("/wiki/Gone", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn manager(storage: Arc<InMemoryStorage>) -> QuizManager {
        let config = Config {
            provider: Provider::Dummy,
            ..Config::default()
        };
        let scraper = WikipediaScraper::new(Arc::new(HeuristicRecognizer::new())).unwrap();
        let generator = QuizGenerator::new(Arc::new(DummyModel::new()), &config);
        QuizManager::new(Arc::new(scraper), generator, storage)
    }

    #[tokio::test]
    async fn test_generate_persists_quiz() {
        let base = spawn_stub().await;
        let storage = Arc::new(InMemoryStorage::new());
        let manager = manager(storage.clone());

        let url = format!("{}/wiki/Rust", base);
        let quiz = manager.generate(&url).await.unwrap();
        assert_eq!(quiz.title, "Rust (programming language)");
        assert_eq!(quiz.sections, vec!["History"]);
        assert_eq!(quiz.questions.len(), 5);

        let history = manager.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].url, url);
        assert_eq!(history[0].title, "Rust (programming language)");

        let stored = manager.get_quiz(history[0].id).await.unwrap();
        assert_eq!(stored, serde_json::to_value(&quiz).unwrap());

        let record = storage.get_record(history[0].id).await.unwrap().unwrap();
        assert!(record
            .scraped_content
            .unwrap()
            .ends_with("Graydon Hoare started the project in 2006."));
    }

    #[tokio::test]
    async fn test_failed_scrape_persists_nothing() {
        let base = spawn_stub().await;
        let storage = Arc::new(InMemoryStorage::new());
        let manager = manager(storage.clone());

        let err = manager.generate(&format!("{}/wiki/Gone", base)).await.unwrap_err();
        assert!(err.is_scrape_failure());
        let err = manager.generate("ftp://example.com/x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(storage.is_empty().await);
    }

    #[derive(Debug)]
    struct SilentModel;

    #[async_trait]
    impl wq_core::QuizModel for SilentModel {
        fn name(&self) -> &str {
            "Silent"
        }

        fn model_id(&self) -> &str {
            "silent"
        }

        async fn complete(&self, _prompt: &wq_core::Prompt) -> Result<String> {
            Ok("Sorry, no quiz today.".to_string())
        }
    }

    #[tokio::test]
    async fn test_failed_generation_persists_nothing() {
        let base = spawn_stub().await;
        let storage = Arc::new(InMemoryStorage::new());
        let scraper = WikipediaScraper::new(Arc::new(HeuristicRecognizer::new())).unwrap();
        let generator = QuizGenerator::new(Arc::new(SilentModel), &Config::default());
        let manager = QuizManager::new(Arc::new(scraper), generator, storage.clone());

        let err = manager.generate(&format!("{}/wiki/Rust", base)).await.unwrap_err();
        assert!(err.is_generation_failure());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_quiz_missing() {
        let manager = manager(Arc::new(InMemoryStorage::new()));
        assert!(matches!(manager.get_quiz(42).await, Err(Error::NotFound(42))));
    }
}
