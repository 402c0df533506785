//! Fence and inline-span markers
//!
//! A fence is three marker characters at the start of a line, optionally
//! followed by a mode name on the opening line. An inline code span is a
//! pair of single markers on the same line.
//!
//! Offsets returned from here are character offsets.

use crate::registry::{StyleRegistry, UNKNOWN_MODE};
use crate::style::Rgb;
use crate::theme::NONE_MODE;

/// Default marker character
pub const DEFAULT_MARKER: char = '`';

/// Paragraph and soft line breaks both end a line
pub fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// How a text-bearing node was recognized as code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The node has a solid background fill. The mode comes from the
    /// color and is `UNKNOWN_MODE` when no mode claims it.
    Colored { mode: String },
    /// The node's text is wrapped in fences
    Fenced { mode: String },
}

impl Classification {
    pub fn mode(&self) -> &str {
        match self {
            Classification::Colored { mode } | Classification::Fenced { mode } => mode,
        }
    }
}

/// A `[start, end)` range covering an inline code span including both
/// markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSpan {
    pub start: usize,
    pub end: usize,
}

impl CodeSpan {
    /// Range of the span content, markers excluded
    pub fn interior(&self) -> std::ops::Range<usize> {
        self.start + 1..self.end - 1
    }
}

/// Recognizes fences and inline spans for one marker character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub marker: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
        }
    }
}

impl Delimiters {
    pub fn new(marker: char) -> Self {
        Self { marker }
    }

    /// The fence string (three markers)
    pub fn fence(&self) -> String {
        std::iter::repeat(self.marker).take(3).collect()
    }

    fn fence_at(&self, chars: &[char], pos: usize) -> bool {
        chars.len() >= pos + 3 && chars[pos..pos + 3].iter().all(|&c| c == self.marker)
    }

    pub fn starts_with_fence(&self, text: &str) -> bool {
        text.starts_with(&self.fence())
    }

    /// Mode named on the opening fence line, `"none"` when empty
    pub fn fence_mode(&self, text: &str) -> String {
        let first_line = text.split(is_line_break).next().unwrap_or("");
        let mode = first_line
            .strip_prefix(&self.fence())
            .unwrap_or(first_line)
            .trim();
        if mode.is_empty() {
            NONE_MODE.to_string()
        } else {
            mode.to_string()
        }
    }

    /// Whether the last line of a multi-line text starts with a fence
    pub fn last_line_is_fence(&self, text: &str) -> bool {
        text.split(is_line_break)
            .skip(1)
            .last()
            .is_some_and(|last| last.starts_with(&self.fence()))
    }

    /// Offset of the line break that precedes the last line starting with
    /// a fence
    pub fn closing_fence(&self, text: &str) -> Option<usize> {
        let chars: Vec<char> = text.chars().collect();
        (0..chars.len())
            .rev()
            .find(|&i| is_line_break(chars[i]) && self.fence_at(&chars, i + 1))
    }

    /// Whether `text` is a complete fenced block: it opens with a fence and
    /// its final line (ignoring one trailing line break) is exactly a fence
    pub fn is_fenced_block(&self, text: &str) -> bool {
        if !self.starts_with_fence(text) {
            return false;
        }
        let body = text.strip_suffix(is_line_break).unwrap_or(text);
        let fence = self.fence();
        match body.strip_suffix(&fence) {
            Some(rest) => rest.ends_with(is_line_break),
            None => false,
        }
    }

    /// Classify a text node from its fill and text. A fill always wins
    /// over fences.
    pub fn classify(
        &self,
        registry: &StyleRegistry,
        fill: Option<Rgb>,
        text: &str,
    ) -> Option<Classification> {
        if let Some(color) = fill {
            let mode = registry.mode_for_rgb(color).unwrap_or(UNKNOWN_MODE);
            return Some(Classification::Colored {
                mode: mode.to_string(),
            });
        }
        if self.is_fenced_block(text) {
            return Some(Classification::Fenced {
                mode: self.fence_mode(text),
            });
        }
        None
    }

    /// Find the inline code spans of `text`, in order of appearance
    ///
    /// Spans never cross a line break. A run of two or more markers where a
    /// span would open is taken as an escape and produces no span.
    pub fn find_code_spans(&self, text: &str) -> Vec<CodeSpan> {
        let chars: Vec<char> = text.chars().collect();
        let next = |from: usize, pred: &dyn Fn(char) -> bool| {
            (from..chars.len()).find(|&i| pred(chars[i]))
        };
        let is_marker = |c: char| c == self.marker;

        let mut spans = Vec::new();
        let mut pos = 0;
        while let Some(start) = next(pos, &is_marker) {
            if chars.get(start + 1) == Some(&self.marker) {
                pos = next(start, &|c: char| c != self.marker).unwrap_or(chars.len());
                continue;
            }
            // The closing marker has to come before the next line break
            let end = match next(start + 1, &|c: char| c == self.marker || is_line_break(c)) {
                Some(end) => end,
                None => break,
            };
            if is_line_break(chars[end]) {
                pos = end + 1;
                continue;
            }
            spans.push(CodeSpan {
                start,
                end: end + 1,
            });
            pos = end + 1;
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delimiters() -> Delimiters {
        Delimiters::default()
    }

    fn span_texts(text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        delimiters()
            .find_code_spans(text)
            .iter()
            .map(|s| chars[s.start..s.end].iter().collect())
            .collect()
    }

    #[test]
    fn test_fence_mode() {
        let d = delimiters();
        assert_eq!(d.fence_mode("```python\nprint(1)\n```"), "python");
        assert_eq!(d.fence_mode("```  shell  \rls"), "shell");
        assert_eq!(d.fence_mode("```\nx\n```"), "none");
        assert_eq!(d.fence_mode("```"), "none");
    }

    #[test]
    fn test_is_fenced_block() {
        let d = delimiters();
        assert!(d.is_fenced_block("```python\nprint(1)\n```"));
        assert!(d.is_fenced_block("```python\nprint(1)\n```\n"));
        assert!(d.is_fenced_block("```\n```"));
        assert!(!d.is_fenced_block("```python\nprint(1)"));
        assert!(!d.is_fenced_block("print(1)\n```"));
        assert!(!d.is_fenced_block("```"));
        assert!(!d.is_fenced_block("```\nx\n```\n\n"));
    }

    #[test]
    fn test_closing_fence() {
        let d = delimiters();
        assert_eq!(d.closing_fence("```python\nprint(1)\n```"), Some(18));
        assert_eq!(d.closing_fence("```\n```"), Some(3));
        assert_eq!(d.closing_fence("```python\nprint(1)"), None);
        assert_eq!(d.closing_fence("```é\n```"), Some(4));
    }

    #[test]
    fn test_last_line_is_fence() {
        let d = delimiters();
        assert!(d.last_line_is_fence("x = 1\r```"));
        assert!(d.last_line_is_fence("```go\rx\r```"));
        assert!(!d.last_line_is_fence("```"));
        assert!(!d.last_line_is_fence("```\rx"));
    }

    #[test]
    fn test_custom_marker() {
        let d = Delimiters::new('~');
        assert_eq!(d.fence(), "~~~");
        assert!(d.is_fenced_block("~~~go\nx\n~~~"));
        assert!(!d.is_fenced_block("```go\nx\n```"));
        assert_eq!(d.find_code_spans("a ~b~ `c`").len(), 1);
    }

    #[test]
    fn test_color_wins_over_fences() {
        let registry = StyleRegistry::builtin().unwrap();
        let text = "```python\nprint(1)\n```";
        let d = delimiters();
        assert_eq!(
            d.classify(&registry, Some(Rgb(0xff, 0xf7, 0xf2)), text),
            Some(Classification::Colored {
                mode: "shell".to_string()
            })
        );
        assert_eq!(
            d.classify(&registry, Some(Rgb(1, 2, 3)), "plain"),
            Some(Classification::Colored {
                mode: UNKNOWN_MODE.to_string()
            })
        );
        assert_eq!(
            d.classify(&registry, None, text).map(|c| c.mode().to_string()),
            Some("python".to_string())
        );
        assert_eq!(d.classify(&registry, None, "plain"), None);
    }

    #[test]
    fn test_simple_spans() {
        assert_eq!(span_texts("use `foo` and `bar`"), vec!["`foo`", "`bar`"]);
        let spans = delimiters().find_code_spans("a `b` c");
        assert_eq!(spans, vec![CodeSpan { start: 2, end: 5 }]);
        assert_eq!(spans[0].interior(), 3..4);
    }

    #[test]
    fn test_span_cannot_cross_lines() {
        assert!(span_texts("a `code\nmore` b").is_empty());
        assert_eq!(span_texts("a `x\n`y` z"), vec!["`y`"]);
    }

    #[test]
    fn test_marker_run_is_escape() {
        assert!(span_texts("a ``` b").is_empty());
        assert!(span_texts("a `` b").is_empty());
        assert_eq!(span_texts("``x `y`"), vec!["`y`"]);
    }

    #[test]
    fn test_unclosed_marker() {
        assert!(span_texts("a `b").is_empty());
        assert_eq!(span_texts("`a` `b"), vec!["`a`"]);
    }

    #[test]
    fn test_long_line_is_scanned_once() {
        let text = "`a` ".repeat(40_000);
        let spans = delimiters().find_code_spans(&text);
        assert_eq!(spans.len(), 40_000);
        assert_eq!(spans[39_999], CodeSpan { start: 159_996, end: 159_999 });
    }

    #[test]
    fn test_spans_use_char_offsets() {
        let spans = delimiters().find_code_spans("é `ü`");
        assert_eq!(spans, vec![CodeSpan { start: 2, end: 5 }]);
    }
}
