//! Visible-text extraction and word-bounded truncation.
//!
//! Turns a fetched HTML document into the plain text handed to the
//! categorization oracle. Markup that never renders as text (scripts,
//! styles, inline SVG, templates) is dropped before whitespace is
//! normalised, then the result is cut to a word budget.

use scraper::Html;
use tracing::{debug, instrument};

use linksorter_shared::{LinkSorterError, Result};

/// Elements whose text content is never visible on the page.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Text prepared for the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Whitespace-normalised, truncated text.
    pub text: String,
    /// Word count of the full extracted text, before truncation.
    pub word_count: usize,
    /// Whether words were dropped to fit the budget.
    pub truncated: bool,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Extract visible text from `html` and cut it to `max_words`.
///
/// Fails with [`LinkSorterError::Extraction`] when the page has no visible
/// text at all, which callers treat the same as a failed fetch.
#[instrument(skip(html), fields(html_len = html.len()))]
pub fn prepare(html: &str, max_words: usize) -> Result<PageText> {
    let extracted = extract_text(html);
    let word_count = count_words(&extracted);

    if word_count == 0 {
        return Err(LinkSorterError::Extraction(
            "page contains no visible text".into(),
        ));
    }

    let text = truncate_words(&extracted, max_words);
    let truncated = word_count > max_words;

    debug!(word_count, truncated, "page text prepared");

    Ok(PageText {
        text,
        word_count,
        truncated,
    })
}

/// Collect the visible text of an HTML document, whitespace-normalised.
pub fn extract_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

/// Keep at most `max_words` whitespace-separated words, joined by single spaces.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
