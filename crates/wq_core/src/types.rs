use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Buckets produced by an entity recognizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMap {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

impl EntityMap {
    pub const MAX_PER_CATEGORY: usize = 15;

    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.organizations.is_empty() && self.locations.is_empty()
    }

    /// Sorts and de-duplicates every bucket, keeping at most 15 entries each.
    pub fn normalized(mut self) -> Self {
        for bucket in [&mut self.people, &mut self.organizations, &mut self.locations] {
            bucket.retain(|e| !e.trim().is_empty());
            bucket.sort();
            bucket.dedup();
            bucket.truncate(Self::MAX_PER_CATEGORY);
        }
        self
    }

    /// People, then organizations, then locations, first occurrence wins.
    pub fn flatten(&self) -> Vec<String> {
        let mut flat: Vec<String> = Vec::new();
        for entity in self.people.iter().chain(&self.organizations).chain(&self.locations) {
            if !flat.contains(entity) {
                flat.push(entity.clone());
            }
        }
        flat
    }
}

/// Structured context derived from a scraped article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleContent {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub sections: Vec<String>,
    pub key_entities: EntityMap,
    pub clean_text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Unknown labels fall back to medium.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizOutput {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub key_entities: EntityMap,
    #[serde(default)]
    pub related_topics: Vec<String>,
    pub questions: Vec<QuizQuestion>,
}

/// A quiz about to be persisted; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewQuizRecord {
    pub url: String,
    pub title: String,
    pub scraped_content: Option<String>,
    pub full_quiz_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub date_generated: DateTime<Utc>,
    pub scraped_content: Option<String>,
    pub full_quiz_data: String,
}
