//! Style application
//!
//! Block coloring runs a tokenizer over a region's text and styles each
//! token. Inline span coloring styles the content of marker-delimited code
//! spans in ordinary text and removes the markers.

use tracing::debug;

use crate::delimiter::Delimiters;
use crate::error::{Error, Result};
use crate::host::{NodeId, TextStore};
use crate::region::RegionText;
use crate::registry::{SegmentStyle, StyleRegistry};
use crate::style::Span;
use crate::tokenize::Tokenizer;

/// Tokenize the region's text and apply a style to every token. Returns the
/// number of tokens styled.
///
/// Only style writes happen here, so offsets stay valid while walking the
/// tokens left to right. Token lengths must add up to the text length;
/// nothing is styled otherwise.
pub fn colorize_region<H, T>(
    host: &mut H,
    tokenizer: &T,
    segment: &SegmentStyle,
    nodes: &[NodeId],
) -> Result<usize>
where
    H: TextStore + ?Sized,
    T: Tokenizer + ?Sized,
{
    let region_text = RegionText::read(host, nodes)?;
    let mut spans = Vec::new();
    let mut offset = 0;
    tokenizer.run(&segment.tokenizer, &region_text.text, &mut |token, token_type| {
        let len = token.chars().count();
        spans.push(Span::new(offset, offset + len, segment.token_style(token_type)));
        offset += len;
    });

    if offset != region_text.len() {
        return Err(Error::TokenizerDesync {
            mode: segment.mode.clone(),
            expected: region_text.len(),
            covered: offset,
        });
    }

    for span in spans.iter().filter(|s| !s.is_empty()) {
        for (node, range) in region_text.node_ranges(span.start..span.end) {
            host.set_text_style(node, range, &span.style)?;
        }
    }
    debug!("colored {} {} tokens", spans.len(), segment.mode);
    Ok(spans.len())
}

/// Style the inline code spans of one node and strip their markers.
/// Returns the number of spans.
pub fn colorize_spans<H: TextStore + ?Sized>(
    host: &mut H,
    registry: &StyleRegistry,
    delimiters: &Delimiters,
    node: NodeId,
) -> Result<usize> {
    let text = host.text(node)?;
    let spans = delimiters.find_code_spans(&text);
    if spans.is_empty() {
        return Ok(0);
    }
    let chars: Vec<char> = text.chars().collect();

    // Last span first: each deletion shifts everything after it
    for span in spans.iter().rev() {
        let content: String = chars[span.interior()].iter().collect();
        let style = registry.style_for_span_content(&content);
        host.set_text_style(node, span.start..span.end, &style)?;
        host.delete_text(node, span.end - 1..span.end)?;
        host.delete_text(node, span.start..span.start + 1)?;
    }
    Ok(spans.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DocumentHost;
    use crate::memdoc::{MemDocument, StyledRun};
    use crate::style::{Rgb, Style};
    use crate::tokenize::{RuleTokenizer, TokenType};

    fn registry() -> StyleRegistry {
        StyleRegistry::builtin().unwrap()
    }

    fn paragraph(text: &str) -> (MemDocument, NodeId) {
        let mut doc = MemDocument::new();
        let body = doc.body();
        let node = doc.add_paragraph(body, text);
        (doc, node)
    }

    fn run_colors(runs: &[StyledRun]) -> Vec<(&str, Option<Rgb>)> {
        runs.iter().map(|r| (r.text.as_str(), r.style.foreground)).collect()
    }

    #[test]
    fn test_spans_are_styled_and_unwrapped() {
        let registry = registry();
        let (mut doc, node) = paragraph("set `x` to `42` or `null`");
        let before = doc.text_len(node).unwrap();

        let count = colorize_spans(&mut doc, &registry, &Delimiters::default(), node).unwrap();
        assert_eq!(count, 3);
        assert_eq!(doc.text(node).unwrap(), "set x to 42 or null");
        assert_eq!(doc.text_len(node).unwrap(), before - 2 * count);

        let runs = doc.styled_runs(node).unwrap();
        assert_eq!(
            run_colors(&runs),
            vec![
                ("set ", None),
                ("x", Some(Rgb(0x00, 0x0c, 0x8c))),
                (" to ", None),
                ("42", Some(Rgb(0x00, 0x8c, 0x0c))),
                (" or ", None),
                ("null", Some(Rgb(0x8c, 0x00, 0x08))),
            ]
        );
        assert_eq!(runs[1].style.font_family.as_deref(), Some("Roboto Mono"));
    }

    #[test]
    fn test_spans_leave_other_text_alone() {
        let registry = registry();
        let (mut doc, node) = paragraph("a ``` b `c\nd` e");
        doc.set_text_style(node, 0..1, &Style::default().with_bold(true)).unwrap();

        let count = colorize_spans(&mut doc, &registry, &Delimiters::default(), node).unwrap();
        assert_eq!(count, 0);
        assert_eq!(doc.text(node).unwrap(), "a ``` b `c\nd` e");
        assert_eq!(doc.style_at(node, 0).unwrap().bold, Some(true));
        assert!(doc.style_at(node, 2).unwrap().is_empty());
    }

    #[test]
    fn test_spans_with_wide_chars() {
        let registry = registry();
        let (mut doc, node) = paragraph("café `naïve` ok");
        colorize_spans(&mut doc, &registry, &Delimiters::default(), node).unwrap();
        assert_eq!(doc.text(node).unwrap(), "café naïve ok");
        assert_eq!(doc.style_at(node, 5).unwrap().foreground, Some(Rgb(0x00, 0x0c, 0x8c)));
        assert_eq!(doc.style_at(node, 10).unwrap().foreground, None);
    }

    #[test]
    fn test_block_coloring_across_paragraphs() {
        let registry = registry();
        let python = registry.style_for_mode("python").unwrap();
        let mut doc = MemDocument::new();
        let body = doc.body();
        let a = doc.add_paragraph(body, "def f():");
        let b = doc.add_paragraph(body, "    return 1  # one");

        let count = colorize_region(&mut doc, &RuleTokenizer::new(), python, &[a, b]).unwrap();
        assert!(count > 0);
        assert_eq!(*doc.style_at(a, 0).unwrap(), python.token_style(TokenType::Keyword));
        assert_eq!(*doc.style_at(b, 0).unwrap(), python.text);
        let comment = doc.text(b).unwrap().find('#').unwrap();
        assert_eq!(*doc.style_at(b, comment).unwrap(), python.token_style(TokenType::Comment));
    }

    #[test]
    fn test_block_coloring_is_idempotent() {
        let registry = registry();
        let go = registry.style_for_mode("go").unwrap();
        let tokenizer = RuleTokenizer::new();
        let (mut doc, node) = paragraph("func main() { x := \"hi\" }");
        doc.set_text_style(node, 0..4, &Style::default().with_italic(true).with_fg(Rgb::WHITE))
            .unwrap();

        colorize_region(&mut doc, &tokenizer, go, &[node]).unwrap();
        let once = doc.styled_runs(node).unwrap();
        colorize_region(&mut doc, &tokenizer, go, &[node]).unwrap();
        assert_eq!(doc.styled_runs(node).unwrap(), once);
        // Stale formatting is overwritten, not stacked
        assert_eq!(doc.style_at(node, 0).unwrap().italic, Some(false));
    }

    struct ShortTokenizer;

    impl Tokenizer for ShortTokenizer {
        fn run(&self, _tokenizer: &str, text: &str, emit: &mut dyn FnMut(&str, TokenType)) {
            let mut chars = text.chars();
            chars.next_back();
            emit(chars.as_str(), TokenType::Default);
        }
    }

    #[test]
    fn test_desync_is_fatal() {
        let registry = registry();
        let shell = registry.style_for_mode("shell").unwrap();
        let (mut doc, node) = paragraph("echo hi");

        let result = colorize_region(&mut doc, &ShortTokenizer, shell, &[node]);
        assert!(matches!(
            result,
            Err(Error::TokenizerDesync {
                expected: 7,
                covered: 6,
                ..
            })
        ));
        assert!(doc.style_at(node, 0).unwrap().is_empty());
    }
}
