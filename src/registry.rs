//! Style registry
//!
//! Built once per run from a `Theme` and passed to every stage by
//! reference. It answers three questions: which style belongs to a mode,
//! which mode a background color stands for, and how an inline code span
//! should look.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::style::{Rgb, Style};
use crate::theme::{StyleSpec, Theme};
use crate::tokenize::TokenType;

/// Mode reported for background colors no mode claims
pub const UNKNOWN_MODE: &str = "<unknown>";

/// Everything needed to render code of one mode
#[derive(Debug, Clone)]
pub struct SegmentStyle {
    pub mode: String,
    /// Fill color of the code box
    pub background: Rgb,
    /// Base style of all code text: font, and explicit foreground, bold
    /// and italic so that stale formatting is reset
    pub text: Style,
    /// Name handed to the tokenizer
    pub tokenizer: String,
    tokens: HashMap<TokenType, Style>,
}

impl SegmentStyle {
    /// Fully explicit style for one token classification
    pub fn token_style(&self, token_type: TokenType) -> Style {
        match self.tokens.get(&token_type) {
            Some(style) => self.text.merged(style),
            None => self.text.clone(),
        }
    }
}

/// Classification rule for inline code spans
#[derive(Debug, Clone)]
pub struct SpanRule {
    pub pattern: Regex,
    pub style: Style,
}

/// Lookup tables derived from a theme
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    font_family: String,
    modes: BTreeMap<String, SegmentStyle>,
    colors: HashMap<Rgb, String>,
    span_rules: Vec<SpanRule>,
}

fn palette(overrides: [&BTreeMap<String, StyleSpec>; 2]) -> HashMap<TokenType, Style> {
    let mut tokens: HashMap<TokenType, Style> = TokenType::ALL
        .iter()
        .map(|&t| (t, t.default_style()))
        .collect();
    for map in overrides {
        for (name, spec) in map {
            match TokenType::from_name(name) {
                Some(token_type) => {
                    let style = tokens.entry(token_type).or_default();
                    *style = style.merged(&spec.to_style());
                }
                None => warn!("ignoring style for unknown token class {:?}", name),
            }
        }
    }
    tokens
}

impl StyleRegistry {
    pub fn new(theme: &Theme) -> Result<Self> {
        let mut modes = BTreeMap::new();
        let mut colors = HashMap::new();

        for (name, spec) in &theme.modes {
            let text = Style::font(theme.font_family.clone())
                .with_fg(spec.foreground.unwrap_or(Rgb::BLACK))
                .with_bold(spec.bold.unwrap_or(false))
                .with_italic(spec.italic.unwrap_or(false));
            let segment = SegmentStyle {
                mode: name.clone(),
                background: spec.background,
                text,
                tokenizer: spec.tokenizer.clone().unwrap_or_else(|| name.clone()),
                tokens: palette([&theme.token_styles, &spec.token_styles]),
            };
            if let Some(previous) = colors.insert(spec.background, name.clone()) {
                warn!(
                    "modes {:?} and {:?} share background {}; using {:?}",
                    previous, name, spec.background, name
                );
            }
            modes.insert(name.clone(), segment);
        }

        let span_rules = theme
            .span_rules
            .iter()
            .map(|rule| {
                let pattern = Regex::new(&rule.pattern).map_err(|source| Error::InvalidPattern {
                    pattern: rule.pattern.clone(),
                    source,
                })?;
                Ok(SpanRule {
                    pattern,
                    style: Style::font(theme.font_family.clone()).merged(&rule.style.to_style()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            font_family: theme.font_family.clone(),
            modes,
            colors,
            span_rules,
        })
    }

    /// Registry for the built-in theme
    pub fn builtin() -> Result<Self> {
        Self::new(&Theme::builtin())
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn style_for_mode(&self, mode: &str) -> Option<&SegmentStyle> {
        self.modes.get(mode)
    }

    pub fn is_valid_mode(&self, mode: &str) -> bool {
        self.modes.contains_key(mode)
    }

    /// Mode names in sorted order
    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    /// Mode whose background is `color`
    pub fn mode_for_rgb(&self, color: Rgb) -> Option<&str> {
        self.colors.get(&color).map(String::as_str)
    }

    /// Mode whose background is the hex color `color`, in any letter case;
    /// `UNKNOWN_MODE` if none
    pub fn mode_for_color(&self, color: &str) -> &str {
        Rgb::parse(color)
            .and_then(|rgb| self.mode_for_rgb(rgb))
            .unwrap_or(UNKNOWN_MODE)
    }

    /// Style for the content of an inline code span. The first matching
    /// rule wins; without any match the span only gets the code font.
    pub fn style_for_span_content(&self, content: &str) -> Style {
        self.span_rules
            .iter()
            .find(|rule| rule.pattern.is_match(content))
            .map(|rule| rule.style.clone())
            .unwrap_or_else(|| Style::font(self.font_family.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::SpanRuleSpec;

    fn registry() -> StyleRegistry {
        StyleRegistry::builtin().unwrap()
    }

    fn span_color(content: &str) -> Option<Rgb> {
        registry().style_for_span_content(content).foreground
    }

    #[test]
    fn test_style_for_mode() {
        let registry = registry();
        let python = registry.style_for_mode("python").unwrap();
        assert_eq!(python.background, Rgb(0xf7, 0xf7, 0xff));
        assert_eq!(python.tokenizer, "python");
        assert_eq!(python.text.font_family.as_deref(), Some("Roboto Mono"));
        assert_eq!(python.text.foreground, Some(Rgb::BLACK));
        assert_eq!(python.text.bold, Some(false));
        assert!(registry.style_for_mode("cobol").is_none());
        assert!(registry.is_valid_mode("none"));
    }

    #[test]
    fn test_mode_for_color_ignores_case() {
        let registry = registry();
        assert_eq!(registry.mode_for_color("#f7f7ff"), "python");
        assert_eq!(registry.mode_for_color("#F7F7FF"), "python");
        assert_eq!(registry.mode_for_color("#FfF7f2"), "shell");
        assert_eq!(registry.mode_for_color("#123456"), UNKNOWN_MODE);
        assert_eq!(registry.mode_for_color("not a color"), UNKNOWN_MODE);
    }

    #[test]
    fn test_token_styles_are_explicit() {
        let registry = registry();
        let python = registry.style_for_mode("python").unwrap();
        let keyword = python.token_style(TokenType::Keyword);
        assert_eq!(keyword.bold, Some(true));
        assert_eq!(keyword.italic, Some(false));
        let plain = python.token_style(TokenType::Default);
        assert_eq!(plain, python.text);
    }

    #[test]
    fn test_span_rules_first_match_wins() {
        assert_eq!(span_color("src/main.rs"), Some(Rgb(0x00, 0x0c, 0x8c)));
        assert_eq!(span_color("lib/core"), Some(Rgb(0x3c, 0x00, 0x3c)));
        assert_eq!(span_color("3.14"), Some(Rgb(0x00, 0x8c, 0x0c)));
        assert_eq!(span_color(".5"), Some(Rgb(0x00, 0x8c, 0x0c)));
        assert_eq!(span_color("\"hi\""), Some(Rgb(0x38, 0x00, 0x8c)));
        assert_eq!(span_color("'c'"), Some(Rgb(0x38, 0x00, 0x8c)));
        assert_eq!(span_color("nil"), Some(Rgb(0x8c, 0x00, 0x08)));
        assert_eq!(span_color("192.168.0.1"), Some(Rgb(0x8c, 0x30, 0x28)));
        assert_eq!(span_color("foo()"), Some(Rgb(0x00, 0x0c, 0x8c)));
    }

    #[test]
    fn test_span_style_without_catch_all() {
        let mut theme = Theme::builtin();
        theme.span_rules = vec![SpanRuleSpec {
            pattern: "^x$".to_string(),
            style: StyleSpec::default(),
        }];
        let registry = StyleRegistry::new(&theme).unwrap();
        assert_eq!(registry.style_for_span_content("y"), Style::font("Roboto Mono"));
    }

    #[test]
    fn test_invalid_span_pattern() {
        let mut theme = Theme::builtin();
        theme.span_rules[0].pattern = "(".to_string();
        assert!(matches!(
            StyleRegistry::new(&theme),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_mode_token_overrides() {
        let mut theme = Theme::builtin();
        let python = theme.modes.get_mut("python").unwrap();
        python.token_styles.insert(
            "keyword".to_string(),
            StyleSpec {
                bold: Some(false),
                ..Default::default()
            },
        );
        let registry = StyleRegistry::new(&theme).unwrap();
        let keyword = registry.style_for_mode("python").unwrap().token_style(TokenType::Keyword);
        assert_eq!(keyword.bold, Some(false));
        assert_eq!(keyword.foreground, Some(Rgb(0x77, 0x00, 0x88)));
    }
}
