use std::fmt;
use std::str::FromStr;
use wq_core::Error;

pub mod entities;
pub mod generator;
pub mod models;
pub mod prompt;

pub use entities::ModelEntityRecognizer;
pub use generator::QuizGenerator;
pub use models::create_model;

pub const DEFAULT_MODEL_NAME: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_ARTICLE_CHARS: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// Any endpoint speaking the OpenAI chat-completions protocol
    #[default]
    OpenAi,
    /// Deterministic offline model
    Dummy,
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "gemini" => Ok(Provider::OpenAi),
            "dummy" => Ok(Provider::Dummy),
            other => Err(Error::Config(format!(
                "Unknown model provider '{}'. Available providers: openai (default), dummy",
                other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_article_chars: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_article_chars", &self.max_article_chars)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_article_chars: DEFAULT_MAX_ARTICLE_CHARS,
        }
    }
}

pub mod prelude {
    pub use super::{Config, Provider};
    pub use super::models::create_model;
    pub use super::generator::QuizGenerator;
    pub use wq_core::{ArticleContent, QuizOutput, Result, Error};
}
