//! Toit language definition

use crate::tokenize::language::LanguageDefinition;
use crate::tokenize::rules::MultilineRule;
use crate::tokenize::tokens::TokenType;

/// Create Toit language definition
pub fn toit_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("toit");

    lang.multiline(MultilineRule::new("block_comment", r"/\*", r"\*/", TokenType::Comment, 1))
        .multiline(MultilineRule::new("triple_string", r#"""""#, r#"""""#, TokenType::String, 2))
        .multiline(MultilineRule::with_escape("string", r#"""#, r#"""#, TokenType::String, 3, '\\'));

    lang.pattern("line_comment", r"//.*$", TokenType::Comment, 100)
        .pattern("char", r"'(?:[^'\\]|\\.)'", TokenType::String, 90);

    let keywords = r"\b(import|export|show|as|class|interface|monitor|abstract|static|extends|implements|constructor|operator|if|else|while|for|break|continue|return|try|finally|assert|and|or|not)\b";
    lang.pattern("keyword", keywords, TokenType::Keyword, 80)
        .pattern("constant", r"\b(true|false|null)\b", TokenType::Constant, 79)
        .pattern("self", r"\b(this|super)\b", TokenType::Variable, 77)
        .pattern("type", r"\b(int|float|string|bool|any|none|List|Map|Set|ByteArray)\b", TokenType::Type, 75)
        .pattern("definition", r"^[a-z_][\w-]*", TokenType::Function, 70)
        .pattern("hex", r"\b0[xX][0-9a-fA-F_]+\b", TokenType::Number, 65)
        .pattern("float", r"\b\d[\d_]*\.\d[\d_]*(?:[eE][+-]?\d+)?\b", TokenType::Number, 64)
        .pattern("integer", r"\b\d[\d_]*\b", TokenType::Number, 63)
        .pattern("operator", r"[+\-*/%&|^!<>=~?:]+", TokenType::Operator, 40);

    lang
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::rules::LineState;

    #[test]
    fn test_all_rules_compile() {
        let lang = toit_language();
        assert_eq!(lang.multiline_rules.len(), 3);
        assert_eq!(lang.patterns.len(), 11);
    }

    #[test]
    fn test_top_level_definition() {
        let lang = toit_language();
        let result = lang.tokenize_line("main:", LineState::default());
        assert_eq!(result.spans[0].token_type, TokenType::Function);
        assert_eq!(result.spans[0].start, 0);
    }
}
