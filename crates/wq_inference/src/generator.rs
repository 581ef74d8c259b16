use std::sync::Arc;
use tracing::{error, info};
use wq_core::quiz::{decode_model_text, normalize_quiz_output, validate_quiz};
use wq_core::{ArticleContent, Error, Prompt, QuizModel, QuizOutput, Result};
use crate::prompt::{truncate_chars, user_prompt, SYSTEM_PROMPT};
use crate::Config;

const MODEL_ERROR_MARKERS: &[&str] = &[
    "not found",
    "404",
    "does not exist",
    "not supported",
    "unsupported",
    "invalid model",
];

/// Suggests a fix when a provider error looks like a misconfigured model id.
pub fn model_hint(model_id: &str, err: &Error) -> Option<String> {
    let Error::Inference(message) = err else {
        return None;
    };
    let message = message.to_ascii_lowercase();
    if !MODEL_ERROR_MARKERS.iter().any(|marker| message.contains(marker)) {
        return None;
    }
    Some(format!(
        "The configured model '{}' (MODEL_NAME) may be unavailable for this API key or API version. \
         List the models your account supports and set MODEL_NAME to one of them.",
        model_id
    ))
}

/// Turns extracted article content into a validated quiz.
#[derive(Debug, Clone)]
pub struct QuizGenerator {
    model: Arc<dyn QuizModel>,
    temperature: f32,
    max_article_chars: usize,
}

impl QuizGenerator {
    pub fn new(model: Arc<dyn QuizModel>, config: &Config) -> Self {
        Self {
            model,
            temperature: config.temperature,
            max_article_chars: config.max_article_chars,
        }
    }

    pub fn model(&self) -> &Arc<dyn QuizModel> {
        &self.model
    }

    pub fn build_prompt(&self, article: &ArticleContent) -> Prompt {
        let article_text = truncate_chars(&article.clean_text, self.max_article_chars);
        if article_text.len() < article.clean_text.len() {
            info!(
                "✂️ Truncated article text to {} characters for the model",
                self.max_article_chars
            );
        }
        Prompt {
            system: SYSTEM_PROMPT.to_string(),
            user: user_prompt(article, article_text),
            temperature: self.temperature,
        }
    }

    async fn try_generate(&self, article: &ArticleContent) -> Result<QuizOutput> {
        let prompt = self.build_prompt(article);
        let reply = self.model.complete(&prompt).await?;
        let raw = decode_model_text(&reply)?;
        let quiz = normalize_quiz_output(&raw, article)?;
        validate_quiz(&quiz)?;
        Ok(quiz)
    }

    /// Every failure, from the model call to validation, surfaces as
    /// `Error::GenerationFailed` carrying the original cause.
    pub async fn generate(&self, article: &ArticleContent) -> Result<QuizOutput> {
        match self.try_generate(article).await {
            Ok(quiz) => {
                info!(
                    "✨ Generated {} questions for '{}' with {}",
                    quiz.questions.len(),
                    quiz.title,
                    self.model.model_id()
                );
                Ok(quiz)
            }
            Err(e) => {
                error!("Quiz generation failed for '{}': {}", article.title, e);
                let hint = model_hint(self.model.model_id(), &e);
                Err(Error::generation(e, hint))
            }
        }
    }
}
