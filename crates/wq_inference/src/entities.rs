use async_trait::async_trait;
use std::sync::Arc;
use wq_core::quiz::{decode_model_text, entity_map_from_value};
use wq_core::{EntityMap, EntityRecognizer, Prompt, QuizModel, Result};
use crate::prompt::truncate_chars;

const ENTITY_PROMPT: &str = "You extract named entities from encyclopedia text. Reply with a single \
JSON object with the keys \"people\", \"organizations\" and \"locations\", each a list of names \
exactly as they appear in the text. Do not add any other text.";

/// Entity recognition delegated to the configured generative model.
#[derive(Debug, Clone)]
pub struct ModelEntityRecognizer {
    model: Arc<dyn QuizModel>,
    max_chars: usize,
}

impl ModelEntityRecognizer {
    pub fn new(model: Arc<dyn QuizModel>, max_chars: usize) -> Self {
        Self { model, max_chars }
    }

    async fn try_recognize(&self, text: &str) -> Result<EntityMap> {
        let prompt = Prompt {
            system: ENTITY_PROMPT.to_string(),
            user: truncate_chars(text, self.max_chars).to_string(),
            temperature: 0.0,
        };
        let reply = self.model.complete(&prompt).await?;
        let value = decode_model_text(&reply)?;
        Ok(entity_map_from_value(&value).normalized())
    }
}

#[async_trait]
impl EntityRecognizer for ModelEntityRecognizer {
    fn name(&self) -> &str {
        "model"
    }

    async fn recognize(&self, text: &str) -> EntityMap {
        if text.trim().is_empty() {
            return EntityMap::default();
        }
        match self.try_recognize(text).await {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!("⚠️ Entity recognition failed, continuing without entities: {}", e);
                EntityMap::default()
            }
        }
    }
}
