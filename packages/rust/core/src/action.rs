//! Action grammar for oracle replies.
//!
//! Each reply line has the shape
//!
//! ```text
//! <Keyword> ['<category>'] ['<url>']
//! ```
//!
//! where `<Keyword>` is `AddLinkToExistingCategory` or `AddLinkToNewCategory`
//! and the two fields are separated by the literal `'] ['`. Lines whose
//! keyword is unknown are skipped. A known keyword with an unreadable
//! payload is an error, and any error aborts the whole reply.
//!
//! Replies are split into lines on every Unicode line boundary (`\n`, `\r`,
//! `\r\n`, `\x0b`, `\x0c`, `\x1c`-`\x1e`, `\u{85}`, `\u{2028}`,
//! `\u{2029}`), not only on `\n`. A final line break does not start an
//! empty line, but a blank line anywhere else is malformed.

use std::ops::Range;

use linksorter_shared::{LinkSorterError, Result};

/// Verb for filing a link under a category the oracle believes exists.
pub const EXISTING_KEYWORD: &str = "AddLinkToExistingCategory";

/// Verb for filing a link under a category the oracle proposes.
pub const NEW_KEYWORD: &str = "AddLinkToNewCategory";

/// Separator between the category and URL fields.
const FIELD_DELIMITER: &str = "'] ['";

/// A parsed instruction from the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddToExisting { category: String, url: String },
    AddToNew { category: String, url: String },
}

impl Action {
    pub fn category(&self) -> &str {
        match self {
            Action::AddToExisting { category, .. } | Action::AddToNew { category, .. } => category,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Action::AddToExisting { url, .. } | Action::AddToNew { url, .. } => url,
        }
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Existing,
    New,
}

/// A slice of the line with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
}

/// The three tokens of a recognised action line.
#[derive(Debug)]
struct ActionTokens<'a> {
    verb: Verb,
    category: Token<'a>,
    url: Token<'a>,
}

/// Split a line into verb, category, and URL tokens.
///
/// `Ok(None)` means the keyword is not one we know.
fn tokenize(line: &str, line_no: usize) -> Result<Option<ActionTokens<'_>>> {
    let malformed = |span: Range<usize>, reason: &'static str| LinkSorterError::MalformedAction {
        text: line.to_string(),
        line: line_no,
        span,
        reason,
    };

    let Some(space) = line.find(' ') else {
        return Err(malformed(0..line.len(), "missing space after action keyword"));
    };

    let verb = match &line[..space] {
        EXISTING_KEYWORD => Verb::Existing,
        NEW_KEYWORD => Verb::New,
        _ => return Ok(None),
    };

    let payload_start = space + 1;
    let payload = &line[payload_start..];

    let mut delimiters = payload.match_indices(FIELD_DELIMITER);
    let Some((split, _)) = delimiters.next() else {
        return Err(malformed(payload_start..line.len(), "missing field delimiter"));
    };
    if let Some((extra, _)) = delimiters.next() {
        let at = payload_start + extra;
        return Err(malformed(at..at + FIELD_DELIMITER.len(), "more than two fields"));
    }

    let category_raw = &payload[..split];
    let url_start = split + FIELD_DELIMITER.len();
    let url_raw = &payload[url_start..];

    Ok(Some(ActionTokens {
        verb,
        category: strip_field(category_raw, payload_start, &['[', '\'']),
        url: strip_field(url_raw, payload_start + url_start, &['\'', ']']),
    }))
}

/// Trim bracket/quote characters from both ends of a field, keeping its span.
fn strip_field<'a>(raw: &'a str, offset: usize, chars: &[char]) -> Token<'a> {
    let leading = raw.len() - raw.trim_start_matches(chars).len();
    let text = raw.trim_matches(chars);
    let start = offset + leading;
    Token {
        text,
        span: start..start + text.len(),
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse one reply line. `line_no` is 1-based and only used in errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Action>> {
    let Some(tokens) = tokenize(line, line_no)? else {
        return Ok(None);
    };

    let category = tokens.category.text.to_string();
    let url = tokens.url.text.to_string();

    Ok(Some(match tokens.verb {
        Verb::Existing => Action::AddToExisting { category, url },
        Verb::New => Action::AddToNew { category, url },
    }))
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split `reply` on line boundaries; `\r\n` counts as one break.
fn reply_lines(reply: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = reply.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&reply[start..idx]);
        let mut end = idx + c.len_utf8();
        if c == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                end = next + 1;
            }
        }
        start = end;
    }

    if start < reply.len() {
        lines.push(&reply[start..]);
    }
    lines
}

/// Parse a whole reply, one action per line.
///
/// All lines are parsed before anything is returned, so one bad line
/// yields an error and no actions at all.
pub fn parse_reply(reply: &str) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    for (idx, line) in reply_lines(reply).into_iter().enumerate() {
        if let Some(action) = parse_line(line, idx + 1)? {
            actions.push(action);
        }
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(category: &str, url: &str) -> Action {
        Action::AddToExisting {
            category: category.into(),
            url: url.into(),
        }
    }

    fn new(category: &str, url: &str) -> Action {
        Action::AddToNew {
            category: category.into(),
            url: url.into(),
        }
    }

    #[test]
    fn parses_existing_category_line() {
        let action = parse_line("AddLinkToExistingCategory ['C'] ['U']", 1).unwrap();
        assert_eq!(action, Some(existing("C", "U")));
    }

    #[test]
    fn parses_new_category_line() {
        let action = parse_line("AddLinkToNewCategory ['C'] ['U']", 1).unwrap();
        assert_eq!(action, Some(new("C", "U")));
    }

    #[test]
    fn parses_realistic_fields() {
        let line = "AddLinkToNewCategory ['News & Media'] ['https://www.bbc.com/news?a=1&b=2']";
        let action = parse_line(line, 1).unwrap().unwrap();
        assert_eq!(action.category(), "News & Media");
        assert_eq!(action.url(), "https://www.bbc.com/news?a=1&b=2");
    }

    #[test]
    fn unknown_keyword_is_skipped() {
        assert_eq!(parse_line("Sure, here is the categorization:", 1).unwrap(), None);
        assert_eq!(parse_line("1. AddLinkToNewCategory ['A'] ['u']", 1).unwrap(), None);
    }

    #[test]
    fn empty_line_is_malformed() {
        let err = parse_line("", 3).unwrap_err();
        match err {
            LinkSorterError::MalformedAction { line, span, reason, .. } => {
                assert_eq!(line, 3);
                assert_eq!(span, 0..0);
                assert_eq!(reason, "missing space after action keyword");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn line_without_space_is_malformed() {
        let err = parse_line("garbage", 1).unwrap_err();
        assert_eq!(err.to_string(), "Invalid action format: garbage");
    }

    #[test]
    fn known_keyword_without_delimiter_is_malformed() {
        let line = "AddLinkToNewCategory [Shopping] [https://x.com]";
        let err = parse_line(line, 1).unwrap_err();
        match err {
            LinkSorterError::MalformedAction { span, reason, .. } => {
                assert_eq!(reason, "missing field delimiter");
                assert_eq!(span, 21..line.len());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn three_fields_are_malformed() {
        let line = "AddLinkToExistingCategory ['A'] ['B'] ['C']";
        let err = parse_line(line, 1).unwrap_err();
        match err {
            LinkSorterError::MalformedAction { span, reason, .. } => {
                assert_eq!(reason, "more than two fields");
                assert_eq!(&line[span], "'] ['");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stray_brackets_and_quotes_are_stripped() {
        let action = parse_line("AddLinkToNewCategory [['A''] ['u']]'", 1).unwrap();
        assert_eq!(action, Some(new("A", "u")));
    }

    #[test]
    fn token_spans_point_into_line() {
        let line = "AddLinkToExistingCategory ['Shopping'] ['https://x.com']";
        let tokens = tokenize(line, 1).unwrap().unwrap();
        assert_eq!(tokens.verb, Verb::Existing);
        assert_eq!(&line[tokens.category.span.clone()], "Shopping");
        assert_eq!(&line[tokens.url.span.clone()], "https://x.com");
    }

    #[test]
    fn reply_parses_every_line_in_order() {
        let reply = "AddLinkToExistingCategory ['Shopping'] ['https://x.com']\n\
                     Some commentary here\n\
                     AddLinkToNewCategory ['Travel'] ['https://y.com']";
        let actions = parse_reply(reply).unwrap();
        assert_eq!(
            actions,
            vec![existing("Shopping", "https://x.com"), new("Travel", "https://y.com")]
        );
    }

    #[test]
    fn reply_with_bad_line_fails_whole_batch() {
        let reply = "AddLinkToNewCategory ['A'] ['u1']\ngarbage";
        let err = parse_reply(reply).unwrap_err();
        match err {
            LinkSorterError::MalformedAction { text, line, .. } => {
                assert_eq!(text, "garbage");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_blank_line_fails_batch() {
        let reply = "AddLinkToNewCategory ['A'] ['u1']\n\n";
        assert!(parse_reply(reply).is_err());
        // A single trailing newline is not a blank line
        assert_eq!(parse_reply("AddLinkToNewCategory ['A'] ['u1']\n").unwrap().len(), 1);
    }

    #[test]
    fn reply_lines_follow_unicode_line_boundaries() {
        assert!(reply_lines("").is_empty());
        assert_eq!(reply_lines("\n"), vec![""]);
        assert_eq!(reply_lines("a\n"), vec!["a"]);
        assert_eq!(reply_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(reply_lines("a\rb\x0bc\x0cd"), vec!["a", "b", "c", "d"]);
        assert_eq!(reply_lines("a\u{2028}b\u{85}c"), vec!["a", "b", "c"]);
        assert_eq!(reply_lines("a\r\rb"), vec!["a", "", "b"]);
    }

    #[test]
    fn lone_carriage_return_separates_actions() {
        let reply = "AddLinkToNewCategory ['A'] ['u1']\rAddLinkToNewCategory ['B'] ['u2']";
        let actions = parse_reply(reply).unwrap();
        assert_eq!(actions, vec![new("A", "u1"), new("B", "u2")]);
    }

    #[test]
    fn empty_reply_yields_no_actions() {
        assert!(parse_reply("").unwrap().is_empty());
    }
}
