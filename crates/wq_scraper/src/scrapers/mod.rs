use async_trait::async_trait;
use wq_core::{ArticleContent, Result};

pub mod wikipedia;

pub use wikipedia::WikipediaScraper;

#[async_trait]
pub trait Scraper: Send + Sync + std::fmt::Debug {
    /// Returns the name of the content source
    fn source(&self) -> &str;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Fetches and extracts the article at the given URL
    async fn scrape_article(&self, url: &str) -> Result<ArticleContent>;
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use url::Url;
    use wq_core::{Error, Result};

    /// Only absolute http(s) URLs are fetched.
    pub fn validate_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| Error::InvalidInput(format!("Invalid URL {:?}: {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(Error::InvalidInput(format!(
                "Unsupported URL scheme '{}': only http and https URLs can be scraped",
                scheme
            ))),
        }
    }

}
