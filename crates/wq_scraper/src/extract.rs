//! HTML to article text.
//!
//! Boilerplate (tables, infoboxes, navboxes, table of contents, reference
//! lists, citation superscripts) is detached from the content subtree before
//! any text is collected, so removed fragments never reach the output.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use wq_core::{Error, Result};

pub const CONTENT_SELECTOR: &str = "#mw-content-text";
pub const DEFAULT_TITLE: &str = "Wikipedia Article";

const BOILERPLATE_SELECTORS: &[&str] = &[
    "table",
    ".infobox",
    ".navbox",
    ".vertical-navbox",
    ".toc",
    ".reflist",
    ".mw-references-wrap",
    ".mw-editsection",
    "sup",
    "style",
    "script",
];

/// Paragraphs must have more words than this to count towards the summary.
pub const SUMMARY_MIN_WORDS: usize = 20;
pub const SUMMARY_MAX_PARAGRAPHS: usize = 3;
pub const MAX_SECTIONS: usize = 10;
const EXCLUDED_SECTIONS: &[&str] = &["references", "external links", "see also"];

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedArticle {
    pub title: String,
    pub summary: String,
    pub sections: Vec<String>,
    pub paragraphs: Vec<String>,
    pub list_items: Vec<String>,
    pub clean_text: String,
}

fn citation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[\d+\]").expect("valid citation regex"))
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector {:?}: {}", css, e)))
}

/// Removes `[12]`-style citation markers and collapses whitespace.
pub fn clean_text(text: &str) -> String {
    citation_pattern()
        .replace_all(text, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_texts(root: ElementRef, selector: &Selector) -> Vec<String> {
    root.select(selector)
        .map(|el| clean_text(&element_text(el)))
        .filter(|t| !t.is_empty())
        .collect()
}

fn extract_title(document: &Html) -> Result<String> {
    for css in ["h1#firstHeading", "title"] {
        if let Some(title) = document
            .select(&selector(css)?)
            .next()
            .map(|el| clean_text(&element_text(el)))
            .filter(|t| !t.is_empty())
        {
            return Ok(title);
        }
    }
    Ok(DEFAULT_TITLE.to_string())
}

fn extract_sections(root: ElementRef) -> Result<Vec<String>> {
    let mut headings: Vec<String> = root
        .select(&selector("h2 .mw-headline, h3 .mw-headline")?)
        .map(element_text)
        .collect();
    // Newer markup has no headline spans; the heading itself carries the label
    if headings.is_empty() {
        headings = root.select(&selector("h2, h3")?).map(element_text).collect();
    }

    Ok(headings
        .iter()
        .map(|h| clean_text(h))
        .filter(|h| !h.is_empty() && !EXCLUDED_SECTIONS.contains(&h.to_lowercase().as_str()))
        .take(MAX_SECTIONS)
        .collect())
}

/// Joins the first three paragraphs longer than twenty words.
pub fn derive_summary(paragraphs: &[String]) -> String {
    paragraphs
        .iter()
        .filter(|p| p.split_whitespace().count() > SUMMARY_MIN_WORDS)
        .take(SUMMARY_MAX_PARAGRAPHS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts title, summary, sections and clean text from an article page.
pub fn extract_article(html: &str) -> Result<ExtractedArticle> {
    let mut document = Html::parse_document(html);
    let title = extract_title(&document)?;

    let content_id = document
        .select(&selector(CONTENT_SELECTOR)?)
        .next()
        .map(|el| el.id())
        .ok_or_else(|| {
            Error::ContentNotFound(format!("page has no element matching {}", CONTENT_SELECTOR))
        })?;

    let boilerplate = selector(&BOILERPLATE_SELECTORS.join(", "))?;
    let doomed: Vec<_> = document
        .tree
        .get(content_id)
        .and_then(ElementRef::wrap)
        .map(|root| root.select(&boilerplate).map(|el| el.id()).collect())
        .unwrap_or_default();
    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let root = document
        .tree
        .get(content_id)
        .and_then(ElementRef::wrap)
        .ok_or_else(|| Error::ContentNotFound("content element vanished during cleanup".to_string()))?;

    let paragraphs = collect_texts(root, &selector("p")?);
    let list_items = collect_texts(root, &selector("li")?);
    if paragraphs.is_empty() && list_items.is_empty() {
        return Err(Error::ContentNotFound(
            "content has no paragraphs or list items".to_string(),
        ));
    }

    let clean_text = paragraphs
        .iter()
        .chain(&list_items)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    Ok(ExtractedArticle {
        title,
        summary: derive_summary(&paragraphs),
        sections: extract_sections(root)?,
        paragraphs,
        list_items,
        clean_text,
    })
}
