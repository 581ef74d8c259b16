use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use wq_core::{Error, Prompt, QuizModel, Result};
use crate::Config;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Chat-completions client for OpenAI-compatible endpoints, Gemini's
/// included.
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is required for the openai provider".to_string()))?;

        let base_url = config.base_url.trim_end_matches('/');
        Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid model base URL {:?}: {}", base_url, e)))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            endpoint: format!("{}/chat/completions", base_url),
            model: config.model_name.clone(),
        })
    }
}

fn parse_error_message(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    // Gemini wraps errors in a one-element array
    let error = value.get("error").or_else(|| value.get(0)?.get("error"))?;
    Some(error.get("message")?.as_str()?.to_string())
}

#[async_trait]
impl QuizModel for OpenAiModel {
    fn name(&self) -> &str {
        "OpenAI-compatible"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: prompt.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("POST {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| Error::Inference(format!("Failed to read model response: {}", e)))?;
        if !status.is_success() {
            let message = parse_error_message(&raw).unwrap_or(raw);
            return Err(Error::Inference(format!(
                "model '{}' returned {}: {}",
                self.model, status, message
            )));
        }

        let response: ChatResponse = serde_json::from_str(&raw)
            .map_err(|e| Error::Inference(format!("Unexpected model response: {}", e)))?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::Inference(format!("model '{}' returned no content", self.model)))?;

        tracing::debug!("Model '{}' replied with {} characters", self.model, content.len());
        Ok(content)
    }
}
