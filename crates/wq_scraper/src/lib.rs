pub mod entities;
pub mod extract;
pub mod manager;
pub mod scrapers;

pub use entities::{create_recognizer, HeuristicRecognizer, RecognizerKind};
pub use extract::{extract_article, ExtractedArticle};
pub use manager::QuizManager;
pub use scrapers::{Scraper, WikipediaScraper};

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use super::manager::QuizManager;
    pub use wq_core::{ArticleContent, Error, Result};
}
