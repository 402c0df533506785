//! Go, Java and Dart language definitions
//!
//! The three share C-style comments, strings and numbers and differ in
//! their keyword tables.

use crate::tokenize::language::LanguageDefinition;
use crate::tokenize::rules::MultilineRule;
use crate::tokenize::tokens::TokenType;

/// Comments, strings, numbers and operators common to C-like languages
fn c_like(name: &str) -> LanguageDefinition {
    let mut lang = LanguageDefinition::new(name);

    lang.multiline(MultilineRule::new("block_comment", r"/\*", r"\*/", TokenType::Comment, 1))
        .multiline(MultilineRule::with_escape("string", r#"""#, r#"""#, TokenType::String, 2, '\\'));

    lang.pattern("line_comment", r"//.*$", TokenType::Comment, 100)
        .pattern("char", r"'(?:[^'\\]|\\.)*'", TokenType::String, 90)
        .pattern("hex", r"\b0[xX][0-9a-fA-F_]+[lL]?\b", TokenType::Number, 65)
        .pattern("float", r"\b\d[\d_]*\.\d[\d_]*(?:[eE][+-]?\d+)?[fFdD]?\b", TokenType::Number, 64)
        .pattern("integer", r"\b\d[\d_]*[lL]?\b", TokenType::Number, 63)
        .pattern("type_name", r"\b[A-Z][A-Za-z0-9_]*\b", TokenType::Type, 50)
        .pattern("operator", r"[+\-*/%&|^!<>=~?:]+", TokenType::Operator, 40);

    lang
}

/// Create Go language definition
pub fn go_language() -> LanguageDefinition {
    let mut lang = c_like("go");
    lang.multiline(MultilineRule::new("raw_string", r"`", r"`", TokenType::String, 3));

    let keywords = r"\b(break|case|chan|const|continue|default|defer|else|fallthrough|for|func|go|goto|if|import|interface|map|package|range|return|select|struct|switch|type|var)\b";
    lang.pattern("keyword", keywords, TokenType::Keyword, 80)
        .pattern("constant", r"\b(true|false|nil|iota)\b", TokenType::Constant, 79)
        .pattern("type", r"\b(bool|byte|complex64|complex128|error|float32|float64|int|int8|int16|int32|int64|rune|string|uint|uint8|uint16|uint32|uint64|uintptr|any)\b", TokenType::Type, 75)
        .pattern("builtin", r"\b(append|cap|close|copy|delete|len|make|new|panic|print|println|recover)\b", TokenType::Function, 74);
    lang
}

/// Create Java language definition
pub fn java_language() -> LanguageDefinition {
    let mut lang = c_like("java");

    let keywords = r"\b(abstract|assert|break|case|catch|class|continue|default|do|else|enum|extends|final|finally|for|if|implements|import|instanceof|interface|native|new|package|private|protected|public|record|return|static|super|switch|synchronized|this|throw|throws|transient|try|var|volatile|while|yield)\b";
    lang.pattern("keyword", keywords, TokenType::Keyword, 80)
        .pattern("constant", r"\b(true|false|null)\b", TokenType::Constant, 79)
        .pattern("primitive", r"\b(boolean|byte|char|double|float|int|long|short|void)\b", TokenType::Type, 75)
        .pattern("annotation", r"@\w+", TokenType::Attribute, 95);
    lang
}

/// Create Dart language definition
pub fn dart_language() -> LanguageDefinition {
    let mut lang = c_like("dart");
    lang.multiline(MultilineRule::with_escape("single_string", r"'", r"'", TokenType::String, 3, '\\'));

    let keywords = r"\b(abstract|as|assert|async|await|break|case|catch|class|const|continue|default|do|dynamic|else|enum|export|extends|extension|factory|final|finally|for|get|if|implements|import|in|is|late|library|mixin|new|on|operator|part|required|rethrow|return|set|static|super|switch|sync|this|throw|try|typedef|var|void|while|with|yield)\b";
    lang.pattern("keyword", keywords, TokenType::Keyword, 80)
        .pattern("constant", r"\b(true|false|null)\b", TokenType::Constant, 79)
        .pattern("type", r"\b(int|double|num|bool|String|List|Map|Set|Future|Stream|Object)\b", TokenType::Type, 75)
        .pattern("annotation", r"@\w+", TokenType::Attribute, 95);
    lang
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::rules::LineState;

    fn types_of(lang: &LanguageDefinition, line: &str) -> Vec<TokenType> {
        lang.tokenize_line(line, LineState::default())
            .spans
            .iter()
            .map(|s| s.token_type)
            .collect()
    }

    #[test]
    fn test_go_func() {
        let lang = go_language();
        assert_eq!(
            types_of(&lang, "func main() { return nil } // done"),
            vec![TokenType::Keyword, TokenType::Keyword, TokenType::Constant, TokenType::Comment]
        );
    }

    #[test]
    fn test_java_annotation_and_types() {
        let lang = java_language();
        assert_eq!(
            types_of(&lang, "@Override public int size()"),
            vec![TokenType::Attribute, TokenType::Keyword, TokenType::Type]
        );
    }

    #[test]
    fn test_dart_single_quoted_string() {
        let lang = dart_language();
        let result = lang.tokenize_line("var s = 'it\\'s';", LineState::default());
        let string = result.spans.iter().find(|s| s.token_type == TokenType::String);
        assert_eq!(string.map(|s| (s.start, s.end)), Some((8, 15)));
    }
}
