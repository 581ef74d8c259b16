use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Content not found: {0}")]
    ContentNotFound(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("{source}{}", hint_suffix(.hint))]
    GenerationFailed {
        #[source]
        source: Box<Error>,
        hint: Option<String>,
    },

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Quiz {0} not found")]
    NotFound(i64),

    #[error("Stored quiz {id} is corrupt: {message}")]
    CorruptRecord { id: i64, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_deref()
        .map(|h| format!("\n\n{}", h))
        .unwrap_or_default()
}

impl Error {
    /// Wraps any failure of the model call or its parsing.
    pub fn generation(source: Error, hint: Option<String>) -> Self {
        Error::GenerationFailed {
            source: Box::new(source),
            hint,
        }
    }

    /// Errors raised while turning a URL into article content.
    pub fn is_scrape_failure(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::Fetch(_) | Error::ContentNotFound(_) | Error::Scraping(_)
        )
    }

    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Error::GenerationFailed { .. } | Error::InvalidModelOutput(_) | Error::Inference(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
