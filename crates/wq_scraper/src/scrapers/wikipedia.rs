use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use wq_core::{ArticleContent, EntityRecognizer, Error, Result};
use crate::extract::extract_article;
use crate::scrapers::{utils, Scraper};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct WikipediaScraper {
    client: Client,
    recognizer: Arc<dyn EntityRecognizer>,
}

impl WikipediaScraper {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client, recognizer })
    }

    pub fn recognizer(&self) -> &Arc<dyn EntityRecognizer> {
        &self.recognizer
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("GET {} returned {}", url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to read body of {}: {}", url, e)))
    }
}

#[async_trait]
impl Scraper for WikipediaScraper {
    fn source(&self) -> &str {
        "Wikipedia"
    }

    fn can_handle(&self, url: &str) -> bool {
        utils::validate_url(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.ends_with("wikipedia.org")))
            .unwrap_or(false)
    }

    async fn scrape_article(&self, url: &str) -> Result<ArticleContent> {
        let url = url.trim();
        utils::validate_url(url)?;
        let html = self.fetch(url).await?;
        debug!("Fetched {} bytes from {}", html.len(), url);

        let extracted = extract_article(&html)?;
        let entity_source = if extracted.summary.is_empty() {
            &extracted.clean_text
        } else {
            &extracted.summary
        };
        let key_entities = self.recognizer.recognize(entity_source).await;

        info!(
            "📄 Scraped '{}' ({} chars, {} sections, {} entities via {})",
            extracted.title,
            extracted.clean_text.chars().count(),
            extracted.sections.len(),
            key_entities.flatten().len(),
            self.recognizer.name()
        );

        Ok(ArticleContent {
            url: url.to_string(),
            title: extracted.title,
            summary: extracted.summary,
            sections: extracted.sections,
            key_entities,
            clean_text: extracted.clean_text,
        })
    }
}
