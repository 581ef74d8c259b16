use std::sync::Arc;
use wq_core::{QuizModel, Result};
use crate::{Config, Provider};

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

/// Builds the model named by `config.provider`.
///
/// Fails fast when the provider needs credentials that are missing.
pub fn create_model(config: &Config) -> Result<Arc<dyn QuizModel>> {
    let model: Arc<dyn QuizModel> = match config.provider {
        Provider::OpenAi => Arc::new(OpenAiModel::new(config)?),
        Provider::Dummy => Arc::new(DummyModel::new()),
    };
    tracing::debug!("Created {} model ({})", model.name(), model.model_id());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wq_core::Error;

    #[test]
    fn test_create_model_requires_api_key() {
        let config = Config::default();
        assert!(matches!(create_model(&config), Err(Error::Config(_))));

        let config = Config {
            api_key: Some("test-key".to_string()),
            ..Config::default()
        };
        assert_eq!(create_model(&config).unwrap().name(), "OpenAI-compatible");
    }

    #[test]
    fn test_create_dummy_model_without_key() {
        let config = Config {
            provider: Provider::Dummy,
            ..Config::default()
        };
        assert_eq!(create_model(&config).unwrap().name(), "Dummy");
    }
}
