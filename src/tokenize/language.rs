//! Language definitions for the built-in tokenizer
//!
//! A `LanguageDefinition` combines pattern rules and multi-line rules and
//! splits one line at a time into classified spans.

use tracing::warn;

use super::rules::{LineState, LineTokens, MultilineRule, PatternRule, TokenSpan};
use super::tokens::TokenType;
use crate::error::Result;

/// A complete language definition
pub struct LanguageDefinition {
    /// Tokenizer name, as referenced by a mode (e.g. "python")
    pub name: String,
    /// Single-line pattern rules, sorted by priority (highest first)
    pub patterns: Vec<PatternRule>,
    /// Multi-line rules, tried in insertion order
    pub multiline_rules: Vec<MultilineRule>,
}

impl LanguageDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            patterns: Vec::new(),
            multiline_rules: Vec::new(),
        }
    }

    pub fn add_pattern(&mut self, rule: PatternRule) {
        self.patterns.push(rule);
        // Keep sorted by priority (highest first)
        self.patterns.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn add_multiline(&mut self, rule: MultilineRule) {
        self.multiline_rules.push(rule);
    }

    /// Add a pattern rule, dropping it with a warning if it does not compile
    pub fn pattern(&mut self, name: &str, pattern: &str, token_type: TokenType, priority: i32) -> &mut Self {
        let rule = PatternRule::new(name, pattern, token_type, priority);
        self.keep(rule, Self::add_pattern)
    }

    /// Add a multi-line rule, dropping it with a warning if it does not compile
    pub fn multiline(&mut self, rule: Result<MultilineRule>) -> &mut Self {
        self.keep(rule, Self::add_multiline)
    }

    fn keep<R>(&mut self, rule: Result<R>, add: fn(&mut Self, R)) -> &mut Self {
        match rule {
            Ok(rule) => add(self, rule),
            Err(e) => warn!(language = %self.name, "dropping rule: {}", e),
        }
        self
    }

    fn get_multiline_rule(&self, state_id: u8) -> Option<&MultilineRule> {
        self.multiline_rules.iter().find(|r| r.state_id == state_id)
    }

    /// Earliest position after `pos` where any rule could match
    fn next_candidate(&self, text: &str, pos: usize) -> Option<usize> {
        let step = next_char_boundary(text, pos);
        let starts = self
            .multiline_rules
            .iter()
            .filter_map(|r| r.find_start(text, pos).map(|(s, _)| s));
        let matches = self
            .patterns
            .iter()
            .filter_map(|r| r.find_at(text, pos).map(|(s, _)| s));
        starts
            .chain(matches)
            .map(|s| if s > pos { s } else { step })
            .filter(|&s| s < text.len())
            .min()
    }

    /// Tokenize a single line (without its line terminator)
    ///
    /// Takes the state from the previous line and returns spans plus the
    /// state for the next line.
    pub fn tokenize_line(&self, text: &str, prev_state: LineState) -> LineTokens {
        let mut spans = Vec::new();
        let mut pos = 0;
        let mut state = prev_state;

        'line: while pos < text.len() {
            if state.is_inside_multiline() {
                match self.get_multiline_rule(state.multiline_id) {
                    Some(rule) => match rule.find_end(text, pos) {
                        Some(end) => {
                            push(&mut spans, pos, end, rule.token_type);
                            pos = end;
                            state = LineState::default();
                            continue;
                        }
                        None => {
                            push(&mut spans, pos, text.len(), rule.token_type);
                            return LineTokens {
                                spans,
                                end_state: state,
                            };
                        }
                    },
                    // Invalid state - reset
                    None => state = LineState::default(),
                }
            }

            for rule in &self.multiline_rules {
                match rule.find_start(text, pos) {
                    Some((start, open_end)) if start == pos && open_end > pos => {
                        match rule.find_end(text, open_end) {
                            Some(close) => {
                                push(&mut spans, pos, close, rule.token_type);
                                pos = close;
                                continue 'line;
                            }
                            None => {
                                push(&mut spans, pos, text.len(), rule.token_type);
                                return LineTokens {
                                    spans,
                                    end_state: LineState::inside(rule.state_id),
                                };
                            }
                        }
                    }
                    _ => {}
                }
            }

            let at_pos = self.patterns.iter().find_map(|rule| match rule.find_at(text, pos) {
                Some((start, end)) if start == pos && end > pos => Some((end, rule.token_type)),
                _ => None,
            });
            if let Some((end, token_type)) = at_pos {
                push(&mut spans, pos, end, token_type);
                pos = end;
                continue;
            }

            match self.next_candidate(text, pos) {
                Some(next) => pos = next,
                None => break,
            }
        }

        LineTokens {
            spans,
            end_state: state,
        }
    }
}

fn push(spans: &mut Vec<TokenSpan>, start: usize, end: usize, token_type: TokenType) {
    if end > start {
        spans.push(TokenSpan {
            start,
            end,
            token_type,
        });
    }
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    let mut next = pos + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}
