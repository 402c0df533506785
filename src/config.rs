//! Configuration file support
//!
//! Loads settings from ~/.codetint.conf (or %USERPROFILE%\.codetint.conf on Windows)
//!
//! Format: simple key=value pairs, one per line
//! Lines starting with # are comments
//!
//! Example:
//! ```text
//! # codetint configuration
//! theme = ~/.config/codetint/theme.toml
//! delimiter = `
//! inline-spans = true
//! code-background = #ffecec
//! font-family = Fira Code
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::delimiter::{Delimiters, DEFAULT_MARKER};
use crate::engine::{Settings, DEFAULT_CODE_BACKGROUND};
use crate::error::Result;
use crate::style::Rgb;
use crate::theme::Theme;

/// Configuration settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Theme file, the built-in theme when unset
    pub theme: Option<PathBuf>,
    /// Marker character for fences and inline spans
    pub delimiter: char,
    /// Whether inline code spans are colored
    pub inline_spans: bool,
    /// Cell color that marks document code boxes
    pub code_background: Rgb,
    /// Overrides the theme's code font
    pub font_family: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            delimiter: DEFAULT_MARKER,
            inline_spans: true,
            code_background: DEFAULT_CODE_BACKGROUND,
            font_family: None,
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }

    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".codetint.conf"))
    }

    /// Load configuration from the default location. A missing file gives
    /// the defaults.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load configuration from a file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config = Config::default();
        config.apply(&Self::parse(&contents));
        Ok(config)
    }

    /// Parse config file contents into key-value pairs
    fn parse(contents: &str) -> HashMap<String, String> {
        let mut settings = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Parse key = value
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_lowercase();
                let value = value.trim().to_string();
                settings.insert(key, value);
            }
        }

        settings
    }

    /// Apply settings from parsed config
    fn apply(&mut self, settings: &HashMap<String, String>) {
        if let Some(value) = settings.get("theme") {
            self.theme = (!value.is_empty()).then(|| expand_home(value));
        }

        if let Some(value) = settings.get("delimiter") {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.is_whitespace() => self.delimiter = c,
                _ => warn!("delimiter must be a single character, got {:?}", value),
            }
        }

        if let Some(value) = settings.get("inline-spans") {
            self.inline_spans = parse_bool(value);
        }

        if let Some(value) = settings.get("code-background") {
            match Rgb::parse(value) {
                Some(color) => self.code_background = color,
                None => warn!("ignoring invalid code-background {:?}", value),
            }
        }

        if let Some(value) = settings.get("font-family") {
            self.font_family = (!value.is_empty()).then(|| value.clone());
        }
    }

    /// The theme to run with, with the font override applied
    pub fn theme(&self) -> Result<Theme> {
        let mut theme = match &self.theme {
            Some(path) => Theme::load(path)?,
            None => Theme::builtin(),
        };
        if let Some(font) = &self.font_family {
            theme.font_family = font.clone();
        }
        Ok(theme)
    }

    /// Engine settings
    pub fn settings(&self) -> Settings {
        Settings {
            delimiters: Delimiters::new(self.delimiter),
            inline_spans: self.inline_spans,
            code_background: self.code_background,
        }
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}

/// Parse a boolean value from string
fn parse_bool(s: &str) -> bool {
    let s = s.to_lowercase();
    matches!(s.as_str(), "true" | "yes" | "on" | "1")
}
