use serde_json::json;
use std::fmt;
use wq_core::{Prompt, QuizModel, Result};

/// Offline model that answers with a fixed-shape quiz built from the prompt.
#[derive(Default)]
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

fn prompt_title(prompt: &str) -> &str {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix("Article Title: "))
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or("the article")
}

#[async_trait::async_trait]
impl QuizModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    fn model_id(&self) -> &str {
        "dummy"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        if prompt.system.contains("named entities") {
            return Ok(json!({"people": [], "organizations": [], "locations": []}).to_string());
        }

        let title = prompt_title(&prompt.user);
        let questions: Vec<_> = (0..5)
            .map(|i| {
                let mut options = vec![
                    "None of these".to_string(),
                    "An unrelated subject".to_string(),
                    "Something else entirely".to_string(),
                ];
                options.insert(i % 4, title.to_string());
                json!({
                    "question": format!("Question {}: which subject does this article describe?", i + 1),
                    "options": options,
                    "correct_answer": title,
                    "explanation": format!("The article is about {}.", title),
                    "difficulty": "easy",
                })
            })
            .collect();

        Ok(json!({
            "title": title,
            "related_topics": [],
            "questions": questions,
        })
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_dummy_model() {
        let model = DummyModel::new();
        let prompt = Prompt {
            system: "quiz author".to_string(),
            user: "Article Title: Ada Lovelace\n\nSummary:\n...".to_string(),
            temperature: 0.3,
        };

        let reply: Value = serde_json::from_str(&model.complete(&prompt).await.unwrap()).unwrap();
        assert_eq!(reply["title"], "Ada Lovelace");
        let questions = reply["questions"].as_array().unwrap();
        assert_eq!(questions.len(), 5);
        for q in questions {
            let options = q["options"].as_array().unwrap();
            assert_eq!(options.len(), 4);
            assert!(options.contains(&q["correct_answer"]));
        }
    }
}
