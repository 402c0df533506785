//! Token classifications
//!
//! Tokenizers label every piece of code with a `TokenType`. The registry
//! turns a label into a `Style` through a mode's token palette, falling
//! back to the defaults below.

use crate::style::{Rgb, Style};

/// Semantic token types for syntax coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenType {
    /// Source code comments
    Comment,
    /// String literals
    String,
    /// Numeric literals
    Number,
    /// Language keywords
    Keyword,
    /// Type names
    Type,
    /// Function names and builtins
    Function,
    /// Variables with special meaning (`$HOME`, `self`)
    Variable,
    Operator,
    /// Constants (`true`, `nil`, ...)
    Constant,
    /// Annotations and decorators
    Attribute,
    /// Plain text
    Default,
}

impl TokenType {
    /// All token types, in declaration order
    pub const ALL: [TokenType; 11] = [
        TokenType::Comment,
        TokenType::String,
        TokenType::Number,
        TokenType::Keyword,
        TokenType::Type,
        TokenType::Function,
        TokenType::Variable,
        TokenType::Operator,
        TokenType::Constant,
        TokenType::Attribute,
        TokenType::Default,
    ];

    /// Palette used when a theme does not override a token type.
    /// Colors are chosen for the light code backgrounds of the built-in theme.
    pub fn default_style(&self) -> Style {
        match self {
            TokenType::Comment => Style::fg(Rgb(0xaa, 0x55, 0x00)).with_italic(true),
            TokenType::String => Style::fg(Rgb(0xaa, 0x11, 0x11)),
            TokenType::Number => Style::fg(Rgb(0x11, 0x66, 0x44)),
            TokenType::Keyword => Style::fg(Rgb(0x77, 0x00, 0x88)).with_bold(true),
            TokenType::Type => Style::fg(Rgb(0x00, 0x88, 0x55)),
            TokenType::Function => Style::fg(Rgb(0x00, 0x00, 0xff)),
            TokenType::Variable => Style::fg(Rgb(0x00, 0x55, 0xaa)),
            TokenType::Operator => Style::fg(Rgb(0x98, 0x1a, 0x1a)),
            TokenType::Constant => Style::fg(Rgb(0x22, 0x11, 0x99)),
            TokenType::Attribute => Style::fg(Rgb(0x55, 0x55, 0x55)),
            TokenType::Default => Style::default(),
        }
    }

    /// Get a human-readable name for this token type
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::Comment => "comment",
            TokenType::String => "string",
            TokenType::Number => "number",
            TokenType::Keyword => "keyword",
            TokenType::Type => "type",
            TokenType::Function => "function",
            TokenType::Variable => "variable",
            TokenType::Operator => "operator",
            TokenType::Constant => "constant",
            TokenType::Attribute => "attribute",
            TokenType::Default => "default",
        }
    }

    /// Parse a token type from a theme key. Case-insensitive, and accepts
    /// the class names common editor tokenizers emit (`def`, `atom`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "comment" => Some(TokenType::Comment),
            "string" | "string-2" | "char" => Some(TokenType::String),
            "number" => Some(TokenType::Number),
            "keyword" => Some(TokenType::Keyword),
            "type" | "variable-3" => Some(TokenType::Type),
            "function" | "def" | "builtin" => Some(TokenType::Function),
            "variable" | "variable-2" => Some(TokenType::Variable),
            "operator" => Some(TokenType::Operator),
            "constant" | "atom" => Some(TokenType::Constant),
            "attribute" | "meta" => Some(TokenType::Attribute),
            "default" => Some(TokenType::Default),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_styles_not_empty() {
        assert!(!TokenType::Comment.default_style().is_empty());
        assert!(!TokenType::String.default_style().is_empty());
        assert!(!TokenType::Keyword.default_style().is_empty());
        assert!(TokenType::Default.default_style().is_empty());
    }

    #[test]
    fn test_from_name_accepts_every_name() {
        for token_type in TokenType::ALL {
            assert_eq!(TokenType::from_name(token_type.name()), Some(token_type));
        }
    }

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(TokenType::from_name("Keyword"), Some(TokenType::Keyword));
        assert_eq!(TokenType::from_name("def"), Some(TokenType::Function));
        assert_eq!(TokenType::from_name("atom"), Some(TokenType::Constant));
        assert_eq!(TokenType::from_name("InvalidType"), None);
        assert_eq!(TokenType::from_name(""), None);
    }
}
