use wq_core::{ArticleContent, EntityMap};

pub const SYSTEM_PROMPT: &str = "You are an expert quiz author who writes educational multiple-choice \
quizzes from encyclopedia articles. Given an article's title, summary, key entities, section list and \
cleaned text, write between 5 and 10 multiple-choice questions. Every question has exactly 4 options \
and exactly one correct answer, and the correct answer must match one option verbatim. Keep wording \
unambiguous, base every question on the article, and give each question a short explanation and a \
difficulty label of easy, medium or hard. Also suggest 5 to 10 related topics for further reading.";

pub const FORMAT_INSTRUCTIONS: &str = r#"The output must be a single JSON object with exactly these fields:
{
  "title": string,                      // article title
  "summary": string,                    // two or three sentence summary
  "sections": [string],                 // main section titles
  "key_entities": {                     // entities mentioned in the article
    "people": [string],
    "organizations": [string],
    "locations": [string]
  },
  "related_topics": [string],           // 5 to 10 entries
  "questions": [                        // 5 to 10 entries
    {
      "question": string,
      "options": [string, string, string, string],
      "correct_answer": string,         // copied verbatim from options
      "explanation": string,            // one sentence
      "difficulty": "easy" | "medium" | "hard"
    }
  ]
}
Do not wrap the JSON in Markdown and do not add any text before or after it."#;

/// Returns at most `max_chars` characters of `text`, cutting at a character
/// boundary regardless of words.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn entity_line(label: &str, entities: &[String]) -> String {
    if entities.is_empty() {
        format!("{}: (none)", label)
    } else {
        format!("{}: {}", label, entities.join(", "))
    }
}

fn entity_block(entities: &EntityMap) -> String {
    [
        entity_line("People", &entities.people),
        entity_line("Organizations", &entities.organizations),
        entity_line("Locations", &entities.locations),
    ]
    .join("\n")
}

/// Builds the user message for `article`, embedding `article_text` in
/// place of the full clean text.
pub fn user_prompt(article: &ArticleContent, article_text: &str) -> String {
    let sections = if article.sections.is_empty() {
        "(none)".to_string()
    } else {
        article.sections.join("; ")
    };

    format!(
        "Article Title: {title}\n\n\
         Summary:\n{summary}\n\n\
         Key Entities:\n{entities}\n\n\
         Sections: {sections}\n\n\
         Article Text (cleaned):\n{text}\n\n\
         Return ONLY valid JSON following these rules:\n{format}",
        title = article.title,
        summary = article.summary,
        entities = entity_block(&article.key_entities),
        sections = sections,
        text = article_text,
        format = FORMAT_INSTRUCTIONS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> ArticleContent {
        ArticleContent {
            url: "https://en.wikipedia.org/wiki/Alan_Turing".to_string(),
            title: "Alan Turing".to_string(),
            summary: "English mathematician.".to_string(),
            sections: vec!["Early life".to_string(), "Legacy".to_string()],
            key_entities: EntityMap {
                people: vec!["Alan Turing".to_string()],
                organizations: vec![],
                locations: vec!["Bletchley Park".to_string()],
            },
            clean_text: "Alan Turing was an English mathematician.".to_string(),
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("", 4), "");
    }

    #[test]
    fn test_user_prompt_interpolates_context() {
        let prompt = user_prompt(&article(), "TRUNCATED TEXT");
        assert!(prompt.starts_with("Article Title: Alan Turing"));
        assert!(prompt.contains("English mathematician."));
        assert!(prompt.contains("People: Alan Turing"));
        assert!(prompt.contains("Organizations: (none)"));
        assert!(prompt.contains("Locations: Bletchley Park"));
        assert!(prompt.contains("Sections: Early life; Legacy"));
        assert!(prompt.contains("TRUNCATED TEXT"));
        assert!(!prompt.contains("Alan Turing was an English mathematician."));
        assert!(prompt.ends_with(FORMAT_INSTRUCTIONS));
    }
}
