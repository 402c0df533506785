//! Theme definitions
//!
//! A theme names the code font, the modes with their background colors,
//! the rules for coloring inline code spans, and optional token palette
//! overrides. Themes are TOML files:
//!
//! ```text
//! font-family = "Roboto Mono"
//!
//! [modes.python]
//! background = "#f7f7ff"
//!
//! [modes.java]
//! background = "#fffff7"
//! tokenizer = "java"
//!
//! [[span-rules]]
//! pattern = '^(null|true|false)$'
//! foreground = "#8c0008"
//!
//! [token-styles.keyword]
//! foreground = "#770088"
//! bold = true
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::style::{Rgb, Style};

/// Mode used for fences without a mode name
pub const NONE_MODE: &str = "none";

/// Code font of the built-in theme
pub const DEFAULT_FONT_FAMILY: &str = "Roboto Mono";

/// Explicit style attributes as written in a theme file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StyleSpec {
    pub foreground: Option<Rgb>,
    pub background: Option<Rgb>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl StyleSpec {
    pub fn to_style(&self) -> Style {
        Style {
            italic: self.italic,
            bold: self.bold,
            foreground: self.foreground,
            background: self.background,
            font_family: None,
        }
    }
}

/// One mode (language) of the theme
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModeSpec {
    /// Fill color of code boxes in this mode; also identifies the mode
    pub background: Rgb,
    pub foreground: Option<Rgb>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Tokenizer name, defaults to the mode name
    pub tokenizer: Option<String>,
    /// Per-mode token palette overrides
    #[serde(default)]
    pub token_styles: BTreeMap<String, StyleSpec>,
}

impl ModeSpec {
    /// A mode with only a background color
    pub fn with_background(background: Rgb) -> Self {
        Self {
            background,
            foreground: None,
            bold: None,
            italic: None,
            tokenizer: None,
            token_styles: BTreeMap::new(),
        }
    }
}

/// Classification rule for inline code spans
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpanRuleSpec {
    /// Regex matched against the whole span content
    pub pattern: String,
    #[serde(flatten)]
    pub style: StyleSpec,
}

/// A complete theme
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Theme {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub modes: BTreeMap<String, ModeSpec>,
    /// Tried in order, first match wins
    #[serde(default)]
    pub span_rules: Vec<SpanRuleSpec>,
    #[serde(default)]
    pub token_styles: BTreeMap<String, StyleSpec>,
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

impl Theme {
    /// The built-in theme
    pub fn builtin() -> Self {
        let modes = [
            ("none", Rgb(0xf7, 0xf7, 0xf7), None),
            ("toit", Rgb(0xf2, 0xf8, 0xff), None),
            ("dart", Rgb(0xf7, 0xff, 0xf7), None),
            ("shell", Rgb(0xff, 0xf7, 0xf2), None),
            ("go", Rgb(0xf7, 0xff, 0xff), None),
            ("python", Rgb(0xf7, 0xf7, 0xff), None),
            ("java", Rgb(0xff, 0xff, 0xf7), Some("java")),
        ]
        .into_iter()
        .map(|(name, background, tokenizer)| {
            let mut spec = ModeSpec::with_background(background);
            spec.tokenizer = tokenizer.map(str::to_string);
            (name.to_string(), spec)
        })
        .collect();

        let span_rules = [
            (r"^[a-zA-Z_0-9<>]+(/[a-zA-Z_0-9<>]+)+$", Rgb(0x3c, 0x00, 0x3c)), // path
            (r"^(([0-9]+(\.[0-9]*)?)|(\.[0-9]+))$", Rgb(0x00, 0x8c, 0x0c)),   // number
            (r#"^("([^"\\]|\\["\\])*")$"#, Rgb(0x38, 0x00, 0x8c)),             // string
            (r#"^('([^"\\]|\\['\\])*')$"#, Rgb(0x38, 0x00, 0x8c)),             // char
            (r"^(null|undefined|true|false|nil)$", Rgb(0x8c, 0x00, 0x08)),
            (r"^[12]?[0-9]?[0-9](\.[12]?[0-9]?[0-9]){3}$", Rgb(0x8c, 0x30, 0x28)), // IPv4
            (r".*", Rgb(0x00, 0x0c, 0x8c)),
        ]
        .into_iter()
        .map(|(pattern, color)| SpanRuleSpec {
            pattern: pattern.to_string(),
            style: StyleSpec {
                foreground: Some(color),
                ..Default::default()
            },
        })
        .collect();

        Self {
            font_family: default_font_family(),
            modes,
            span_rules,
            token_styles: BTreeMap::new(),
        }
    }

    /// Parse a theme from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a theme file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin()
    }
}
