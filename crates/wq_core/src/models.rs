use async_trait::async_trait;
use std::fmt;
use crate::types::EntityMap;
use crate::Result;

/// A single chat-style request sent to a generative text model.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

#[async_trait]
pub trait QuizModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Identifier of the underlying model, as configured.
    fn model_id(&self) -> &str;

    /// Sends the prompt and returns the raw text of the model's reply
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// Named-entity recognition used by the extractor.
///
/// Implementations never fail: a recognizer that cannot do its job returns
/// empty buckets so extraction still succeeds.
#[async_trait]
pub trait EntityRecognizer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn recognize(&self, text: &str) -> EntityMap;
}
