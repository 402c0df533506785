//! Pattern rules for the built-in tokenizer
//!
//! Rules search the whole line with `Regex::find_at` so that word
//! boundaries and anchors see the surrounding text.

use regex::Regex;

use super::tokens::TokenType;
use crate::error::{Error, Result};

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// A single-line pattern rule
///
/// Rules are tried in priority order (highest first).
pub struct PatternRule {
    /// Name for debugging
    pub name: String,
    pub pattern: Regex,
    pub token_type: TokenType,
    /// Priority (higher = matched first)
    pub priority: i32,
}

impl PatternRule {
    pub fn new(name: &str, pattern: &str, token_type: TokenType, priority: i32) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            pattern: compile(pattern)?,
            token_type,
            priority,
        })
    }

    /// Find the first match in text at or after byte position `start`
    pub fn find_at(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        if start >= text.len() {
            return None;
        }
        self.pattern.find_at(text, start).map(|m| (m.start(), m.end()))
    }
}

/// A construct that may continue over several lines (block comments,
/// strings)
pub struct MultilineRule {
    pub name: String,
    /// Pattern that opens the construct
    pub start: Regex,
    /// Pattern that closes the construct
    pub end: Regex,
    pub token_type: TokenType,
    /// Escape character that disables a following close pattern
    pub escape_char: Option<char>,
    /// Unique ID for this multiline state (1-255, 0 = normal)
    pub state_id: u8,
}

impl MultilineRule {
    pub fn new(
        name: &str,
        start_pattern: &str,
        end_pattern: &str,
        token_type: TokenType,
        state_id: u8,
    ) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            start: compile(start_pattern)?,
            end: compile(end_pattern)?,
            token_type,
            escape_char: None,
            state_id,
        })
    }

    /// Create a multiline rule whose close pattern can be escaped
    pub fn with_escape(
        name: &str,
        start_pattern: &str,
        end_pattern: &str,
        token_type: TokenType,
        state_id: u8,
        escape_char: char,
    ) -> Result<Self> {
        let mut rule = Self::new(name, start_pattern, end_pattern, token_type, state_id)?;
        rule.escape_char = Some(escape_char);
        Ok(rule)
    }

    /// Find the opening pattern at or after `start`
    pub fn find_start(&self, text: &str, start: usize) -> Option<(usize, usize)> {
        if start >= text.len() {
            return None;
        }
        self.start.find_at(text, start).map(|m| (m.start(), m.end()))
    }

    /// Find the byte position just past the closing pattern, skipping
    /// escaped occurrences
    pub fn find_end(&self, text: &str, start: usize) -> Option<usize> {
        let mut pos = start;
        while pos <= text.len() {
            let m = self.end.find_at(text, pos)?;
            let escapes = match self.escape_char {
                Some(escape) => text[start..m.start()]
                    .chars()
                    .rev()
                    .take_while(|&c| c == escape)
                    .count(),
                None => 0,
            };
            if escapes % 2 == 0 {
                return Some(m.end());
            }
            if m.end() == pos {
                return None;
            }
            pos = m.end();
        }
        None
    }
}

/// Multi-line construct carried from one line to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineState {
    /// 0 = normal, non-zero = inside multiline rule with this ID
    pub multiline_id: u8,
}

impl LineState {
    pub fn inside(state_id: u8) -> Self {
        Self {
            multiline_id: state_id,
        }
    }

    pub fn is_inside_multiline(&self) -> bool {
        self.multiline_id != 0
    }
}

/// A classified byte range within one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
    pub token_type: TokenType,
}

/// Result of tokenizing a single line
#[derive(Debug)]
pub struct LineTokens {
    /// Classified ranges, ordered and non-overlapping; gaps are plain text
    pub spans: Vec<TokenSpan>,
    /// State at end of line (for next line)
    pub end_state: LineState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_rule() {
        let rule = PatternRule::new("number", r"\d+", TokenType::Number, 50).unwrap();
        assert_eq!(rule.find_at("abc 123 def", 0), Some((4, 7)));
        assert_eq!(rule.find_at("abc 123 def", 5), Some((5, 7)));
        assert_eq!(rule.find_at("no numbers", 0), None);
    }

    #[test]
    fn test_pattern_rule_sees_context() {
        let rule = PatternRule::new("number", r"\b\d+\b", TokenType::Number, 50).unwrap();
        // Starting inside a word must not create a fake word boundary
        assert_eq!(rule.find_at("abc123 45", 3), Some((7, 9)));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = PatternRule::new("bad", r"(?=x)", TokenType::Number, 1);
        assert!(matches!(err, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_multiline_rule() {
        let rule =
            MultilineRule::new("block_comment", r"/\*", r"\*/", TokenType::Comment, 1).unwrap();

        assert_eq!(rule.find_start("/* comment */", 0), Some((0, 2)));
        assert_eq!(rule.find_end("/* comment */", 2), Some(13));
        assert_eq!(rule.find_end("/* open", 2), None);
    }

    #[test]
    fn test_multiline_with_escape() {
        let rule =
            MultilineRule::with_escape("string", r#"""#, r#"""#, TokenType::String, 2, '\\')
                .unwrap();

        assert_eq!(rule.find_end(r#"hello""#, 0), Some(6));
        assert_eq!(rule.find_end(r#"hello\"world""#, 0), Some(13));
        assert_eq!(rule.find_end(r#"a\\"b"#, 0), Some(4));
    }

    #[test]
    fn test_line_state() {
        assert!(!LineState::default().is_inside_multiline());
        assert!(LineState::inside(1).is_inside_multiline());
    }
}
