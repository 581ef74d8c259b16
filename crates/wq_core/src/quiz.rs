//! Normalization of loosely-shaped quiz payloads.
//!
//! Model replies and stored rows come in several historical shapes: the
//! question list under `questions` or `quiz`, related topics under three
//! different keys, key entities as a flat list or a categorized map. Every
//! shape is reconciled here, once, into the canonical [`QuizOutput`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use crate::types::{ArticleContent, Difficulty, EntityMap, QuizOutput, QuizQuestion, QuizRecord};
use crate::{Error, Result};

pub const MIN_QUESTIONS: usize = 5;
pub const MAX_QUESTIONS: usize = 20;
pub const MIN_OPTIONS: usize = 3;
pub const MAX_OPTIONS: usize = 6;
pub const MAX_RELATED_TOPICS: usize = 10;

const QUESTION_KEYS: &[&str] = &["questions", "quiz"];
const RELATED_KEYS: &[&str] = &["related_topics", "relatedTopics", "related"];
const ENTITY_KEYS: &[&str] = &["key_entities", "keyEntities"];

/// Parses the raw text of a model reply into JSON.
///
/// Accepts Markdown code fences, prose around the object, and a JSON string
/// that itself holds the encoded object.
pub fn decode_model_text(text: &str) -> Result<Value> {
    let body = strip_code_fence(text.trim());
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(err) => match (body.find('{'), body.rfind('}')) {
            (Some(start), Some(end)) if start < end => serde_json::from_str(&body[start..=end])
                .map_err(|e| Error::InvalidModelOutput(format!("reply is not valid JSON: {}", e)))?,
            _ => return Err(Error::InvalidModelOutput(format!("reply is not valid JSON: {}", err))),
        },
    };

    match value {
        Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| Error::InvalidModelOutput(format!("reply is not valid JSON: {}", e))),
        other => Ok(other),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| obj.get(*k)).find(|v| !is_falsy(v))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
        other if is_falsy(other) => Vec::new(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

/// Flattens a key-entities value into one list.
///
/// A category map yields the de-duplicated union of its values in
/// first-seen order; a list is used as-is; any other truthy scalar becomes a
/// one-element list; falsy values become an empty list.
pub fn flatten_key_entities(value: &Value) -> Vec<String> {
    match value {
        Value::Object(categories) => {
            let mut flat: Vec<String> = Vec::new();
            for entry in categories.values() {
                for entity in string_list(entry) {
                    if !entity.is_empty() && !flat.contains(&entity) {
                        flat.push(entity);
                    }
                }
            }
            flat
        }
        other => string_list(other),
    }
}

/// Migrates any key-entities shape into the categorized map.
///
/// Flat lists and unknown categories land in `people`.
pub fn entity_map_from_value(value: &Value) -> EntityMap {
    let Value::Object(categories) = value else {
        return EntityMap {
            people: flatten_key_entities(value),
            ..EntityMap::default()
        };
    };

    let mut map = EntityMap::default();
    let mut unknown = Vec::new();
    for (category, entities) in categories {
        let entities = string_list(entities);
        match category.to_ascii_lowercase().as_str() {
            "people" | "persons" | "person" => map.people.extend(entities),
            "organizations" | "organisations" | "organization" => map.organizations.extend(entities),
            "locations" | "places" | "location" => map.locations.extend(entities),
            _ => unknown.extend(entities),
        }
    }
    map.people.extend(unknown);
    for bucket in [&mut map.people, &mut map.organizations, &mut map.locations] {
        let mut seen = Vec::with_capacity(bucket.len());
        bucket.retain(|e| {
            if e.is_empty() || seen.contains(e) {
                return false;
            }
            seen.push(e.clone());
            true
        });
    }
    map
}

fn required_text(obj: &Map<String, Value>, keys: &[&str], what: &str, index: usize) -> Result<String> {
    first_present(obj, keys)
        .and_then(scalar_to_string)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidModelOutput(format!("question {} has no {}", index + 1, what)))
}

/// Normalizes one question of any accepted shape.
pub fn normalize_question(value: &Value, index: usize) -> Result<QuizQuestion> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::InvalidModelOutput(format!("question {} is not an object", index + 1)))?;

    let question = required_text(obj, &["question", "q", "prompt"], "question text", index)?;
    let options = first_present(obj, &["options", "choices", "answers"])
        .map(string_list)
        .unwrap_or_default();
    if options.is_empty() {
        return Err(Error::InvalidModelOutput(format!("question {} has no options", index + 1)));
    }
    let correct_answer = required_text(
        obj,
        &["correct_answer", "correctAnswer", "answer", "correct"],
        "correct answer",
        index,
    )?;
    let explanation = first_present(obj, &["explanation", "explain"])
        .and_then(scalar_to_string)
        .filter(|s| !s.is_empty());
    let difficulty = first_present(obj, &["difficulty"])
        .and_then(Value::as_str)
        .map(Difficulty::parse_lenient)
        .unwrap_or_default();

    Ok(QuizQuestion {
        question,
        options,
        correct_answer,
        explanation,
        difficulty,
    })
}

/// Reconciles a model reply into a [`QuizOutput`].
///
/// Missing title, summary or sections fall back to `article`. A missing
/// question list yields an empty one; [`validate_quiz`] decides whether that
/// is acceptable.
pub fn normalize_quiz_output(raw: &Value, article: &ArticleContent) -> Result<QuizOutput> {
    let obj = raw
        .as_object()
        .ok_or_else(|| Error::InvalidModelOutput("expected a JSON object at the top level".to_string()))?;

    let title = first_present(obj, &["title"])
        .and_then(scalar_to_string)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| article.title.clone());
    let summary = first_present(obj, &["summary"])
        .and_then(scalar_to_string)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| article.summary.clone());
    let sections = match first_present(obj, &["sections"]) {
        Some(value) => string_list(value),
        None => article.sections.clone(),
    };

    let questions = match first_present(obj, QUESTION_KEYS) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, q)| normalize_question(q, i))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(Error::InvalidModelOutput("question list is not an array".to_string()));
        }
        None => Vec::new(),
    };

    let mut related_topics = first_present(obj, RELATED_KEYS)
        .map(string_list)
        .unwrap_or_default();
    related_topics.retain(|t| !t.is_empty());
    related_topics.truncate(MAX_RELATED_TOPICS);

    let key_entities = first_present(obj, ENTITY_KEYS)
        .map(entity_map_from_value)
        .unwrap_or_default();

    Ok(QuizOutput {
        title,
        summary,
        sections,
        key_entities,
        related_topics,
        questions,
    })
}

/// Checks the invariants every generated quiz must satisfy.
pub fn validate_quiz(quiz: &QuizOutput) -> Result<()> {
    let count = quiz.questions.len();
    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count) {
        return Err(Error::InvalidModelOutput(format!(
            "expected between {} and {} questions, got {}",
            MIN_QUESTIONS, MAX_QUESTIONS, count
        )));
    }

    for (i, q) in quiz.questions.iter().enumerate() {
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&q.options.len()) {
            return Err(Error::InvalidModelOutput(format!(
                "question {} has {} options, expected {} to {}",
                i + 1,
                q.options.len(),
                MIN_OPTIONS,
                MAX_OPTIONS
            )));
        }
        if !q.options.contains(&q.correct_answer) {
            return Err(Error::InvalidModelOutput(format!(
                "question {}: correct answer {:?} is not one of the options",
                i + 1,
                q.correct_answer
            )));
        }
    }
    Ok(())
}

/// Display-oriented view of a stored payload. Every field is optional so an
/// unreadable payload serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuizProjection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_entities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_topics: Option<Vec<String>>,
}

impl QuizProjection {
    pub fn from_payload(payload: &str) -> Self {
        let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(payload) else {
            return Self::default();
        };

        Self {
            title: first_present(&obj, &["title"]).and_then(scalar_to_string),
            summary: first_present(&obj, &["summary"]).and_then(scalar_to_string),
            key_entities: Some(
                first_present(&obj, ENTITY_KEYS)
                    .map(flatten_key_entities)
                    .unwrap_or_default(),
            ),
            sections: Some(first_present(&obj, &["sections"]).map(string_list).unwrap_or_default()),
            questions: Some(match first_present(&obj, QUESTION_KEYS) {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            }),
            related_topics: Some(first_present(&obj, RELATED_KEYS).map(string_list).unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryItem {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub date_generated: String,
    pub date_generated_ms: i64,
    pub quiz: QuizProjection,
}

impl From<&QuizRecord> for HistoryItem {
    fn from(record: &QuizRecord) -> Self {
        let generated: DateTime<Utc> = record.date_generated;
        Self {
            id: record.id,
            url: record.url.clone(),
            title: record.title.clone(),
            date_generated: generated.to_rfc3339(),
            date_generated_ms: generated.timestamp_millis(),
            quiz: QuizProjection::from_payload(&record.full_quiz_data),
        }
    }
}
