//! Tokenizers for code blocks
//!
//! The engine only depends on the `Tokenizer` trait: given a tokenizer
//! name and a piece of code, call back once per token, left to right,
//! covering the whole input. `RuleTokenizer` is the built-in
//! implementation driven by regex rule tables.

mod builtin;
mod language;
mod rules;
mod tokens;

use std::collections::HashMap;

pub use language::LanguageDefinition;
pub use rules::{LineState, MultilineRule, PatternRule};
pub use tokens::TokenType;

/// Splits code into classified tokens
pub trait Tokenizer {
    /// Call `emit` for every token of `text` in order. The emitted slices
    /// must concatenate to exactly `text`.
    fn run(&self, tokenizer: &str, text: &str, emit: &mut dyn FnMut(&str, TokenType));
}

/// Regex rule based tokenizer with the built-in language tables
pub struct RuleTokenizer {
    languages: HashMap<String, LanguageDefinition>,
}

impl RuleTokenizer {
    /// Create a tokenizer with all built-in languages
    pub fn new() -> Self {
        let mut tokenizer = Self {
            languages: HashMap::new(),
        };
        for lang in builtin::all_languages() {
            tokenizer.add_language(lang);
        }
        tokenizer
    }

    pub fn add_language(&mut self, lang: LanguageDefinition) {
        self.languages.insert(lang.name.clone(), lang);
    }

    pub fn get_language(&self, name: &str) -> Option<&LanguageDefinition> {
        self.languages.get(name)
    }

    /// List available tokenizer names
    pub fn list_languages(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.languages.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for RuleTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for RuleTokenizer {
    fn run(&self, tokenizer: &str, text: &str, emit: &mut dyn FnMut(&str, TokenType)) {
        let lang = match self.languages.get(tokenizer) {
            Some(lang) => lang,
            None => {
                if !text.is_empty() {
                    emit(text, TokenType::Default);
                }
                return;
            }
        };

        let mut state = LineState::default();
        let mut line_start = 0;
        while line_start < text.len() {
            let rest = &text[line_start..];
            let (line_len, terminator_len) = match rest.find(['\n', '\r']) {
                Some(i) => (i, 1),
                None => (rest.len(), 0),
            };
            let line = &rest[..line_len];

            let result = lang.tokenize_line(line, state);
            let mut pos = 0;
            for span in &result.spans {
                if span.start > pos {
                    emit(&line[pos..span.start], TokenType::Default);
                }
                emit(&line[span.start..span.end], span.token_type);
                pos = span.end;
            }
            if pos < line.len() {
                emit(&line[pos..], TokenType::Default);
            }
            if terminator_len > 0 {
                emit(&rest[line_len..line_len + terminator_len], TokenType::Default);
            }

            state = result.end_state;
            line_start += line_len + terminator_len;
        }
    }
}
