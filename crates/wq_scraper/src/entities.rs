use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use wq_core::{EntityMap, EntityRecognizer, QuizModel};
use wq_inference::ModelEntityRecognizer;

pub const HEURISTIC_MIN_CHARS: usize = 4;
pub const HEURISTIC_MAX_CANDIDATES: usize = 10;

/// Naive recognizer: every unique capitalized word longer than three
/// characters is a "people" candidate.
#[derive(Debug, Clone, Default)]
pub struct HeuristicRecognizer;

impl HeuristicRecognizer {
    pub fn new() -> Self {
        Self
    }

    pub fn candidates(text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        text.split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| word.chars().count() >= HEURISTIC_MIN_CHARS)
            .filter(|word| word.chars().next().is_some_and(char::is_uppercase))
            .filter(|word| seen.insert(word.to_string()))
            .take(HEURISTIC_MAX_CANDIDATES)
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl EntityRecognizer for HeuristicRecognizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn recognize(&self, text: &str) -> EntityMap {
        EntityMap {
            people: Self::candidates(text),
            ..EntityMap::default()
        }
        .normalized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognizerKind {
    #[default]
    Heuristic,
    Model,
}

impl std::str::FromStr for RecognizerKind {
    type Err = wq_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "model" => Ok(Self::Model),
            other => Err(wq_core::Error::Config(format!(
                "Unknown entity recognizer '{}'. Available recognizers: heuristic (default), model",
                other
            ))),
        }
    }
}

pub fn create_recognizer(
    kind: RecognizerKind,
    model: Arc<dyn QuizModel>,
    max_chars: usize,
) -> Arc<dyn EntityRecognizer> {
    match kind {
        RecognizerKind::Heuristic => Arc::new(HeuristicRecognizer::new()),
        RecognizerKind::Model => Arc::new(ModelEntityRecognizer::new(model, max_chars)),
    }
}
