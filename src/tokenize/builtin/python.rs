//! Python language definition

use crate::tokenize::language::LanguageDefinition;
use crate::tokenize::rules::MultilineRule;
use crate::tokenize::tokens::TokenType;

/// Create Python language definition
pub fn python_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("python");

    // Triple-quoted strings (docstrings) before the single-quote forms
    lang.multiline(MultilineRule::new("triple_double", r#"""""#, r#"""""#, TokenType::String, 1))
        .multiline(MultilineRule::new("triple_single", r"'''", r"'''", TokenType::String, 2))
        .multiline(MultilineRule::with_escape("double_string", r#"[fFrRbBuU]{0,2}""#, r#"""#, TokenType::String, 3, '\\'))
        .multiline(MultilineRule::with_escape("single_string", r"[fFrRbBuU]{0,2}'", r"'", TokenType::String, 4, '\\'));

    lang.pattern("comment", r"#.*$", TokenType::Comment, 100)
        .pattern("decorator", r"@[\w.]+", TokenType::Attribute, 95);

    let keywords = r"\b(and|as|assert|async|await|break|class|continue|def|del|elif|else|except|finally|for|from|global|if|import|in|is|lambda|nonlocal|not|or|pass|raise|return|try|while|with|yield)\b";
    lang.pattern("keyword", keywords, TokenType::Keyword, 80)
        .pattern("constant", r"\b(True|False|None)\b", TokenType::Constant, 79)
        .pattern("self", r"\b(self|cls)\b", TokenType::Variable, 77);

    let builtins = r"\b(abs|all|any|bool|bytes|callable|chr|dict|dir|divmod|enumerate|filter|float|format|getattr|hasattr|hash|hex|id|input|int|isinstance|issubclass|iter|len|list|map|max|min|next|object|open|ord|print|range|repr|reversed|round|set|setattr|sorted|str|sum|super|tuple|type|zip)\b";
    lang.pattern("builtin", builtins, TokenType::Function, 75)
        .pattern("definition", r"\b(def|class)\s+\w+", TokenType::Keyword, 81);

    lang.pattern("hex", r"\b0[xX][0-9a-fA-F_]+\b", TokenType::Number, 65)
        .pattern("binary", r"\b0[bB][01_]+\b", TokenType::Number, 65)
        .pattern("float", r"\b\d[\d_]*\.\d[\d_]*(?:[eE][+-]?\d+)?j?\b", TokenType::Number, 64)
        .pattern("integer", r"\b\d[\d_]*j?\b", TokenType::Number, 63)
        .pattern("operator", r"[+\-*/%&|^!<>=~]+", TokenType::Operator, 40);

    lang
}
