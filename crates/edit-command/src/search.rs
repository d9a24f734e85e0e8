//! Occurrence search used by reference updates and recorded edits.
//!
//! Results are char ranges, matching every other offset in the crate.

use crate::text::TextRange;
use regex::RegexBuilder;
use thiserror::Error;

/// How a query is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Match letter case exactly.
    pub case_sensitive: bool,
    /// Reject matches glued to identifier characters on either side.
    pub whole_word: bool,
    /// Interpret the query as a regex instead of literal text.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

impl SearchOptions {
    /// Case-sensitive whole-word search for a literal identifier.
    pub fn identifier() -> Self {
        Self {
            whole_word: true,
            ..Self::default()
        }
    }
}

/// A query that could not be compiled.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The regex query is malformed.
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Returns `true` for characters that can be part of an identifier.
pub fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Char ranges of every non-empty, non-overlapping occurrence of `query` in `text`.
pub fn find_all(
    text: &str,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<TextRange>, SearchError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = if options.regex {
        query.to_owned()
    } else {
        regex::escape(query)
    };
    let matcher = RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .build()?;

    // Matches arrive in byte order, so char offsets are counted forward from the last one.
    let mut ranges = Vec::new();
    let (mut byte, mut chars) = (0, 0);
    for found in matcher.find_iter(text) {
        if found.is_empty() {
            continue;
        }
        chars += text[byte..found.start()].chars().count();
        let start = chars;
        chars += found.as_str().chars().count();
        byte = found.end();

        let glued = text[..found.start()].chars().next_back().is_some_and(is_word_char)
            || text[found.end()..].chars().next().is_some_and(is_word_char);
        if !(options.whole_word && glued) {
            ranges.push(TextRange::new(start, chars));
        }
    }
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_search_skips_longer_words() {
        let matches = find_all("foo foobar _foo foo", "foo", SearchOptions::identifier()).unwrap();
        assert_eq!(matches, vec![TextRange::new(0, 3), TextRange::new(16, 19)]);
    }

    #[test]
    fn test_offsets_count_chars_not_bytes() {
        let matches = find_all("ä foo ö foo", "foo", SearchOptions::default()).unwrap();
        assert_eq!(matches, vec![TextRange::new(2, 5), TextRange::new(8, 11)]);

        let matches = find_all("é_x éx", "x", SearchOptions::identifier()).unwrap();
        assert_eq!(matches, vec![]);
    }

    #[test]
    fn test_literal_queries_are_not_patterns() {
        let matches = find_all("a.b axb", "a.b", SearchOptions::default()).unwrap();
        assert_eq!(matches, vec![TextRange::new(0, 3)]);
    }

    #[test]
    fn test_regex_and_case_insensitive_search() {
        let options = SearchOptions {
            case_sensitive: false,
            regex: true,
            ..SearchOptions::default()
        };
        let matches = find_all("Call(1) call (2)", r"call\s*\(", options).unwrap();
        assert_eq!(matches, vec![TextRange::new(0, 5), TextRange::new(8, 14)]);
        assert!(find_all("x", "(", options).is_err());
        assert_eq!(find_all("abc", "x*", options).unwrap(), vec![]);
    }

    #[test]
    fn test_empty_query_finds_nothing() {
        assert_eq!(find_all("abc", "", SearchOptions::default()).unwrap(), vec![]);
    }
}
