//! Style types for rich-text ranges
//!
//! A `Style` only carries the attributes it wants to force. A field left
//! as `None` leaves that attribute of the target text untouched, while a
//! field set to any value (including `false`) overwrites it.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// A 24-bit RGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);

    /// Parse `#rrggbb` (or `rrggbb`), in either case
    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lower-case `#rrggbb` form
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::parse(s).ok_or_else(|| Error::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Text style attributes to force on a character range
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    pub italic: Option<bool>,
    pub bold: Option<bool>,
    /// Text color
    pub foreground: Option<Rgb>,
    /// Highlight color behind the text
    pub background: Option<Rgb>,
    pub font_family: Option<String>,
}

impl Style {
    /// Create a style with just a foreground color
    pub fn fg(color: Rgb) -> Self {
        Self {
            foreground: Some(color),
            ..Default::default()
        }
    }

    /// Create a style with just a font family
    pub fn font(family: impl Into<String>) -> Self {
        Self {
            font_family: Some(family.into()),
            ..Default::default()
        }
    }

    /// Builder: set foreground color
    pub fn with_fg(mut self, color: Rgb) -> Self {
        self.foreground = Some(color);
        self
    }

    /// Builder: set background color
    pub fn with_bg(mut self, color: Rgb) -> Self {
        self.background = Some(color);
        self
    }

    /// Builder: force bold on or off
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Builder: force italic on or off
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Builder: set font family
    pub fn with_font(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Overlay `other` on top of this style; explicit fields of `other` win
    pub fn merged(&self, other: &Style) -> Style {
        Style {
            italic: other.italic.or(self.italic),
            bold: other.bold.or(self.bold),
            foreground: other.foreground.or(self.foreground),
            background: other.background.or(self.background),
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
        }
    }

    /// Check if this style forces nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A styled character range within one text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Character offset where this span starts (inclusive)
    pub start: usize,
    /// Character offset where this span ends (exclusive)
    pub end: usize,
    /// Style to apply to this span
    pub style: Style,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, style: Style) -> Self {
        Self { start, end, style }
    }

    /// Get the length of this span in characters
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}
