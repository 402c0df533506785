//! Shell (sh/bash) language definition

use crate::tokenize::language::LanguageDefinition;
use crate::tokenize::rules::MultilineRule;
use crate::tokenize::tokens::TokenType;

/// Create shell language definition
pub fn shell_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("shell");

    lang.multiline(MultilineRule::with_escape("double_string", r#"""#, r#"""#, TokenType::String, 1, '\\'))
        .multiline(MultilineRule::new("single_string", r"'", r"'", TokenType::String, 2));

    // A '#' only starts a comment at the beginning of a word
    lang.pattern("comment", r"(?:^|\s)#.*$", TokenType::Comment, 100)
        .pattern("prompt", r"^\s*\$\s", TokenType::Attribute, 98)
        .pattern("variable", r"\$(?:\{[^}]*\}|[A-Za-z_][A-Za-z0-9_]*|[0-9@#?$!*-])", TokenType::Variable, 90)
        .pattern("option", r"(?:^|\s)--?[A-Za-z0-9][\w-]*", TokenType::Attribute, 85);

    let keywords = r"\b(if|then|else|elif|fi|case|esac|for|select|while|until|do|done|in|function|time|return|exit|local|export|readonly|declare)\b";
    lang.pattern("keyword", keywords, TokenType::Keyword, 80);

    let builtins = r"\b(echo|cd|pwd|printf|read|set|unset|shift|source|test|eval|exec|trap|kill|wait|alias|sudo)\b";
    lang.pattern("builtin", builtins, TokenType::Function, 75)
        .pattern("number", r"\b\d+\b", TokenType::Number, 60)
        .pattern("operator", r"[|&;<>]+|=", TokenType::Operator, 40);

    lang
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::rules::LineState;

    #[test]
    fn test_all_rules_compile() {
        let lang = shell_language();
        assert_eq!(lang.multiline_rules.len(), 2);
        assert_eq!(lang.patterns.len(), 8);
    }

    #[test]
    fn test_variables_and_comments() {
        let lang = shell_language();
        let result = lang.tokenize_line("echo $HOME # where", LineState::default());
        let kinds: Vec<_> = result.spans.iter().map(|s| (s.start, s.end, s.token_type)).collect();
        assert_eq!(
            kinds,
            vec![
                (0, 4, TokenType::Function),
                (5, 10, TokenType::Variable),
                (10, 18, TokenType::Comment),
            ]
        );
    }

    #[test]
    fn test_hash_inside_word_is_not_comment() {
        let lang = shell_language();
        let result = lang.tokenize_line("echo a#b", LineState::default());
        assert!(result.spans.iter().all(|s| s.token_type != TokenType::Comment));
    }
}
