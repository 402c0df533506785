//! Text normalizer
//!
//! Moves fenced document code into its own single-cell box, strips the
//! fence lines and applies the mode's base style. Slides have no tables,
//! so a fenced text box is boxed by giving it the mode's fill instead.

use tracing::debug;

use crate::delimiter::{is_line_break, Delimiters};
use crate::error::{Error, Result};
use crate::host::{DocumentHost, Indent, NodeId, NodeKind, SlideHost, TextStore};
use crate::region::{CodeRegion, RegionText};
use crate::registry::StyleRegistry;
use crate::style::{Rgb, Style};

/// Width the host adds around a nested table, in points
const NESTED_TABLE_SLACK: f32 = 2.0;

/// Apply `style` to the whole text of every node
pub fn apply_style<H: TextStore + ?Sized>(host: &mut H, nodes: &[NodeId], style: &Style) -> Result<()> {
    for &node in nodes {
        let len = host.text_len(node)?;
        if len > 0 {
            host.set_text_style(node, 0..len, style)?;
        }
    }
    Ok(())
}

/// Delete a range of the region's combined text. Nodes swallowed whole
/// leave `nodes` and are returned so the caller can detach them.
fn delete_combined<H: TextStore + ?Sized>(
    host: &mut H,
    nodes: &mut Vec<NodeId>,
    range: std::ops::Range<usize>,
) -> Result<Vec<NodeId>> {
    let plan = RegionText::read(host, nodes)?.plan_delete(range);
    for (node, local) in plan.ranges {
        host.delete_text(node, local)?;
    }
    nodes.retain(|node| !plan.drop.contains(node));
    Ok(plan.drop)
}

/// Remove the opening fence line and, when present, the closing fence line
/// of a region. Returns the nodes that were emptied out entirely and are no
/// longer part of the region.
pub fn strip_fences<H: TextStore + ?Sized>(
    host: &mut H,
    delimiters: &Delimiters,
    nodes: &mut Vec<NodeId>,
) -> Result<Vec<NodeId>> {
    let region_text = RegionText::read(host, nodes)?;
    let chars: Vec<char> = region_text.text.chars().collect();
    let len = chars.len();
    let first_break = chars.iter().position(|&c| is_line_break(c));
    let closing = delimiters.closing_fence(&region_text.text);

    let first_break = match first_break {
        Some(at) if closing != Some(at) => at,
        // Nothing but fence lines
        _ => return delete_combined(host, nodes, 0..len),
    };

    let mut dropped = Vec::new();
    if let Some(at) = closing {
        // The closing line, and a single line break after it if that ends
        // the text
        let line_end = (at + 1..len).find(|&i| is_line_break(chars[i])).unwrap_or(len);
        let end = if line_end + 1 == len { len } else { line_end };
        dropped.extend(delete_combined(host, nodes, at..end)?);
    }
    // Offsets before the closing fence are unaffected by its deletion
    dropped.extend(delete_combined(host, nodes, 0..first_break + 1)?);
    Ok(dropped)
}

/// Normalizes regions found by the scanner
pub struct Normalizer<'a> {
    registry: &'a StyleRegistry,
    delimiters: Delimiters,
    code_background: Rgb,
}

impl<'a> Normalizer<'a> {
    pub fn new(registry: &'a StyleRegistry, delimiters: Delimiters, code_background: Rgb) -> Self {
        Self {
            registry,
            delimiters,
            code_background,
        }
    }

    /// Base style of a region's text. Unknown modes only get the font.
    pub fn base_style(&self, mode: &str) -> Style {
        match self.registry.style_for_mode(mode) {
            Some(segment) => segment.text.clone(),
            None => Style::font(self.registry.font_family()),
        }
    }

    /// Normalize one document region. Fenced regions are boxed whether or
    /// not their mode is known. Returns the box cell.
    pub fn normalize_document_region<H: DocumentHost + ?Sized>(
        &self,
        host: &mut H,
        region: &mut CodeRegion,
    ) -> Result<NodeId> {
        if region.already_boxed {
            let cell = self.box_cell(host, region)?;
            host.set_background(cell, self.code_background)?;
            apply_style(host, &region.nodes, &Style::font(self.registry.font_family()))?;
            return Ok(cell);
        }

        let cell = self.box_document_region(host, &region.nodes)?;
        for node in strip_fences(host, &self.delimiters, &mut region.nodes)? {
            host.remove_from_parent(node)?;
        }
        host.set_background(cell, self.code_background)?;
        apply_style(host, &region.nodes, &self.base_style(&region.mode))?;
        region.already_boxed = true;
        Ok(cell)
    }

    fn box_cell<H: DocumentHost + ?Sized>(&self, host: &H, region: &CodeRegion) -> Result<NodeId> {
        let first = *region
            .nodes
            .first()
            .ok_or_else(|| Error::Message("empty code region".to_string()))?;
        let cell = host
            .parent(first)?
            .ok_or_else(|| Error::Message(format!("code paragraph {:?} has no parent", first)))?;
        let kind = host.kind(cell)?;
        if kind != NodeKind::TableCell {
            return Err(Error::UnexpectedKind {
                node: cell,
                expected: NodeKind::TableCell,
                found: kind,
            });
        }
        Ok(cell)
    }

    /// Move the paragraphs into a new single-cell table placed where the
    /// first one was. Returns the new cell.
    pub fn box_document_region<H: DocumentHost + ?Sized>(
        &self,
        host: &mut H,
        nodes: &[NodeId],
    ) -> Result<NodeId> {
        let first = *nodes
            .first()
            .ok_or_else(|| Error::Message("empty code region".to_string()))?;
        let parent = host
            .parent(first)?
            .ok_or_else(|| Error::Message(format!("code paragraph {:?} has no parent", first)))?;
        let index = host.child_index(first)?.unwrap_or(0);

        for &node in nodes {
            let kind = host.kind(node)?;
            if kind != NodeKind::Paragraph {
                return Err(Error::UnexpectedKind {
                    node,
                    expected: NodeKind::Paragraph,
                    found: kind,
                });
            }
        }

        let table = host.insert_table(parent, index)?;
        let row = host.append_row(table)?;
        let cell = host.append_cell(row)?;
        let placeholders = host.children(cell)?;

        // Any paragraph without a known indent disables the adjustment
        let indents = nodes
            .iter()
            .map(|&node| host.indent(node))
            .collect::<Result<Option<Vec<Indent>>>>()?;
        let min_start = indents
            .as_ref()
            .map(|indents| indents.iter().map(|i| i.start).fold(f32::INFINITY, f32::min));

        for (i, &node) in nodes.iter().enumerate() {
            host.remove_from_parent(node)?;
            host.append_child(cell, node)?;
            if let (Some(indents), Some(min)) = (&indents, min_start) {
                host.set_indent(
                    node,
                    Indent {
                        start: indents[i].start - min,
                        first_line: indents[i].first_line - min,
                    },
                )?;
            }
        }
        for placeholder in placeholders {
            host.remove_from_parent(placeholder)?;
        }

        if let Some(min) = min_start.filter(|&m| m > 0.0) {
            self.indent_box(host, parent, table, min)?;
        }
        debug!("boxed {} paragraphs", nodes.len());
        Ok(cell)
    }

    /// Reproduce a removed indentation in front of the box
    ///
    /// Without direct table indentation the box goes into the second cell
    /// of a borderless two-cell table whose first cell is as wide as the
    /// indentation.
    fn indent_box<H: DocumentHost + ?Sized>(
        &self,
        host: &mut H,
        parent: NodeId,
        table: NodeId,
        amount: f32,
    ) -> Result<()> {
        if host.indent_table(table, amount)? {
            return Ok(());
        }
        let index = host.child_index(table)?.unwrap_or(0);
        let spacer = host.insert_table(parent, index)?;
        host.set_border_width(spacer, 0.0)?;
        let row = host.append_row(spacer)?;
        let gap = host.append_cell(row)?;
        host.set_width(gap, amount)?;
        let holder = host.append_cell(row)?;
        host.set_padding(holder, 0.0)?;
        host.set_width(holder, host.content_width() - amount - NESTED_TABLE_SLACK)?;

        host.remove_from_parent(table)?;
        host.append_child(holder, table)?;
        // The host keeps a paragraph on both sides of a nested table;
        // shrink them to nothing
        host.append_paragraph(holder, "")?;
        for child in host.children(holder)? {
            if host.kind(child)? == NodeKind::Paragraph {
                host.set_font_size(child, 0.0)?;
            }
        }
        debug!("indented code box by {}pt with a spacer table", amount);
        Ok(())
    }

    /// Normalize one slide shape. Returns `false` when the shape's mode is
    /// unknown and it was left alone.
    pub fn normalize_shape<H: SlideHost + ?Sized>(
        &self,
        host: &mut H,
        region: &mut CodeRegion,
    ) -> Result<bool> {
        let Some(segment) = self.registry.style_for_mode(&region.mode) else {
            debug!("skipping shape with unknown mode {:?}", region.mode);
            return Ok(false);
        };

        if region.already_boxed {
            apply_style(host, &region.nodes, &Style::font(self.registry.font_family()))?;
            return Ok(true);
        }

        for &shape in &region.nodes {
            host.set_solid_fill(shape, segment.background)?;
        }
        apply_style(host, &region.nodes, &segment.text)?;
        let dropped = strip_fences(host, &self.delimiters, &mut region.nodes)?;
        if !dropped.is_empty() {
            return Err(Error::Message(format!(
                "text boxes {:?} cannot be removed from a slide",
                dropped
            )));
        }
        region.already_boxed = true;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memdoc::{MemDocument, MemPresentation};
    use crate::registry::UNKNOWN_MODE;

    const CODE_BG: Rgb = Rgb(0xff, 0xec, 0xec);

    fn registry() -> StyleRegistry {
        StyleRegistry::builtin().unwrap()
    }

    fn texts(doc: &MemDocument, nodes: &[NodeId]) -> Vec<String> {
        nodes.iter().map(|&n| doc.text(n).unwrap()).collect()
    }

    fn doc_with(lines: &[&str]) -> (MemDocument, Vec<NodeId>) {
        let mut doc = MemDocument::new();
        let body = doc.body();
        let nodes = lines.iter().map(|l| doc.add_paragraph(body, l)).collect();
        (doc, nodes)
    }

    #[test]
    fn test_strip_fences_single_node() {
        let mut pres = MemPresentation::new();
        let slide = pres.add_slide();
        let d = Delimiters::default();
        for (input, expected) in [
            ("```python\nprint(1)\n```", "print(1)"),
            ("```python\nprint(1)\n```\n", "print(1)"),
            ("```\n```", ""),
            ("```go\ra\rb\r```", "a\rb"),
            ("```shell\nls", "ls"),
        ] {
            let shape = pres.add_text_box(slide, input);
            let mut nodes = vec![shape];
            assert!(strip_fences(&mut pres, &d, &mut nodes).unwrap().is_empty());
            assert_eq!(pres.text(shape).unwrap(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_strip_fences_across_paragraphs() {
        let (mut doc, nodes) = doc_with(&["```python", "x = 1", "", "y = 2", "```"]);
        let mut region = nodes.clone();
        let dropped = strip_fences(&mut doc, &Delimiters::default(), &mut region).unwrap();
        assert_eq!(dropped, vec![nodes[4], nodes[0]]);
        assert_eq!(texts(&doc, &region), vec!["x = 1", "", "y = 2"]);
    }

    #[test]
    fn test_strip_fences_only_fences() {
        let (mut doc, nodes) = doc_with(&["```", "```"]);
        let mut region = nodes.clone();
        strip_fences(&mut doc, &Delimiters::default(), &mut region).unwrap();
        assert_eq!(region, vec![nodes[1]]);
        assert_eq!(texts(&doc, &region), vec![""]);
    }

    #[test]
    fn test_box_fenced_document_region() {
        let registry = registry();
        let normalizer = Normalizer::new(&registry, Delimiters::default(), CODE_BG);
        let (mut doc, nodes) = doc_with(&["before", "```python", "print(1)", "```", "after"]);
        let mut region = CodeRegion::new("python", false, nodes[1..4].to_vec());

        let cell = normalizer.normalize_document_region(&mut doc, &mut region).unwrap();
        assert_eq!(region.nodes, vec![nodes[2]]);
        assert!(region.already_boxed);
        assert_eq!(doc.children(cell).unwrap(), vec![nodes[2]]);
        assert_eq!(doc.background(cell).unwrap(), Some(CODE_BG));
        assert_eq!(doc.text(nodes[2]).unwrap(), "print(1)");
        let style = doc.style_at(nodes[2], 0).unwrap();
        assert_eq!(style.font_family.as_deref(), Some("Roboto Mono"));
        assert_eq!(style.foreground, Some(Rgb::BLACK));

        let body = doc.children(doc.body()).unwrap();
        assert_eq!(body.len(), 3);
        assert_eq!(body[0], nodes[0]);
        assert_eq!(doc.kind(body[1]).unwrap(), NodeKind::Table);
        assert_eq!(body[2], nodes[4]);
    }

    #[test]
    fn test_unknown_mode_is_still_boxed() {
        let registry = registry();
        let normalizer = Normalizer::new(&registry, Delimiters::default(), CODE_BG);
        let (mut doc, nodes) = doc_with(&["```cobol\rDISPLAY 'HI'.\r```"]);
        let mut region = CodeRegion::new("cobol", false, nodes.clone());

        let cell = normalizer.normalize_document_region(&mut doc, &mut region).unwrap();
        assert_eq!(doc.background(cell).unwrap(), Some(CODE_BG));
        assert_eq!(doc.text(nodes[0]).unwrap(), "DISPLAY 'HI'.");
        assert_eq!(*doc.style_at(nodes[0], 0).unwrap(), Style::font("Roboto Mono"));
    }

    #[test]
    fn test_boxed_region_only_gets_box_style() {
        let registry = registry();
        let normalizer = Normalizer::new(&registry, Delimiters::default(), CODE_BG);
        let mut doc = MemDocument::new();
        let body = doc.body();
        let (_, cells) = doc.add_table(body, 1, 1);
        let para = doc.add_paragraph(cells[0][0], "```x");
        doc.set_text_style(para, 0..4, &Style::fg(Rgb::WHITE)).unwrap();
        let mut region = CodeRegion::new(UNKNOWN_MODE, true, vec![para]);

        let cell = normalizer.normalize_document_region(&mut doc, &mut region).unwrap();
        assert_eq!(cell, cells[0][0]);
        assert_eq!(doc.background(cell).unwrap(), Some(CODE_BG));
        assert_eq!(doc.text(para).unwrap(), "```x");
        let style = doc.style_at(para, 0).unwrap();
        assert_eq!(style.foreground, Some(Rgb::WHITE));
        assert_eq!(style.font_family.as_deref(), Some("Roboto Mono"));
    }

    #[test]
    fn test_non_paragraph_aborts_region() {
        let registry = registry();
        let normalizer = Normalizer::new(&registry, Delimiters::default(), CODE_BG);
        let (mut doc, nodes) = doc_with(&["```"]);
        let body = doc.body();
        let other = doc.add_other(body);
        let mut region = CodeRegion::new("none", false, vec![nodes[0], other]);

        assert!(matches!(
            normalizer.normalize_document_region(&mut doc, &mut region),
            Err(Error::UnexpectedKind {
                expected: NodeKind::Paragraph,
                found: NodeKind::Other,
                ..
            })
        ));
        // Nothing moved
        assert_eq!(doc.children(body).unwrap(), vec![nodes[0], other]);
    }

    fn indented(lines: &[(&str, f32)]) -> (MemDocument, Vec<NodeId>) {
        let (mut doc, nodes) = doc_with(&lines.iter().map(|(t, _)| *t).collect::<Vec<_>>());
        for (&node, &(_, start)) in nodes.iter().zip(lines) {
            doc.set_paragraph_indent(node, Indent { start, first_line: start });
        }
        (doc, nodes)
    }

    #[test]
    fn test_indent_moves_into_spacer_table() {
        let registry = registry();
        let normalizer = Normalizer::new(&registry, Delimiters::default(), CODE_BG);
        let (mut doc, nodes) = indented(&[("```go", 36.0), ("x := 1", 72.0), ("```", 36.0)]);
        let mut region = CodeRegion::new("go", false, nodes.clone());
        let cell = normalizer.normalize_document_region(&mut doc, &mut region).unwrap();

        assert_eq!(doc.indent(nodes[1]).unwrap(), Some(Indent { start: 36.0, first_line: 36.0 }));

        let body = doc.children(doc.body()).unwrap();
        assert_eq!(body.len(), 1);
        let spacer = body[0];
        assert_eq!(doc.border_width(spacer), Some(0.0));
        let row = doc.children(spacer).unwrap()[0];
        let spacer_cells = doc.children(row).unwrap();
        assert_eq!(doc.width(spacer_cells[0]), Some(36.0));
        assert_eq!(doc.width(spacer_cells[1]), Some(468.0 - 36.0 - 2.0));
        assert_eq!(doc.padding(spacer_cells[1]), Some(0.0));

        let held = doc.children(spacer_cells[1]).unwrap();
        assert_eq!(held.len(), 3);
        assert_eq!(doc.font_size(held[0]), Some(0.0));
        assert_eq!(doc.kind(held[1]).unwrap(), NodeKind::Table);
        assert_eq!(doc.font_size(held[2]), Some(0.0));
        let code_row = doc.parent(cell).unwrap().unwrap();
        assert_eq!(doc.parent(code_row).unwrap(), Some(held[1]));
    }

    #[test]
    fn test_direct_table_indent_skips_spacer() {
        let registry = registry();
        let normalizer = Normalizer::new(&registry, Delimiters::default(), CODE_BG);
        let (doc, nodes) = indented(&[("```go", 18.0), ("x := 1", 18.0), ("```", 18.0)]);
        let mut doc = doc.with_direct_table_indent();
        let mut region = CodeRegion::new("go", false, nodes.clone());
        normalizer.normalize_document_region(&mut doc, &mut region).unwrap();

        let body = doc.children(doc.body()).unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(doc.table_indent(body[0]), Some(18.0));
        assert_eq!(doc.indent(nodes[1]).unwrap(), Some(Indent::default()));
    }

    #[test]
    fn test_shape_normalization() {
        let registry = registry();
        let normalizer = Normalizer::new(&registry, Delimiters::default(), CODE_BG);
        let mut pres = MemPresentation::new();
        let slide = pres.add_slide();
        let shape = pres.add_text_box(slide, "```python\nprint(1)\n```");
        let mut region = CodeRegion::new("python", false, vec![shape]);

        assert!(normalizer.normalize_shape(&mut pres, &mut region).unwrap());
        assert_eq!(pres.text(shape).unwrap(), "print(1)");
        assert_eq!(pres.solid_fill(shape).unwrap(), Some(Rgb(0xf7, 0xf7, 0xff)));
        assert_eq!(pres.style_at(shape, 0).unwrap().foreground, Some(Rgb::BLACK));
    }

    #[test]
    fn test_unknown_shape_mode_is_skipped() {
        let registry = registry();
        let normalizer = Normalizer::new(&registry, Delimiters::default(), CODE_BG);
        let mut pres = MemPresentation::new();
        let slide = pres.add_slide();
        let shape = pres.add_text_box(slide, "```cobol\nx\n```");
        let mut region = CodeRegion::new("cobol", false, vec![shape]);

        assert!(!normalizer.normalize_shape(&mut pres, &mut region).unwrap());
        assert_eq!(pres.text(shape).unwrap(), "```cobol\nx\n```");
        assert_eq!(pres.solid_fill(shape).unwrap(), None);
    }

    #[test]
    fn test_colored_shape_keeps_text() {
        let registry = registry();
        let normalizer = Normalizer::new(&registry, Delimiters::default(), CODE_BG);
        let mut pres = MemPresentation::new();
        let slide = pres.add_slide();
        let shape = pres.add_text_box(slide, "```python\nx\n```");
        let mut region = CodeRegion::new("python", true, vec![shape]);

        assert!(normalizer.normalize_shape(&mut pres, &mut region).unwrap());
        assert_eq!(pres.text(shape).unwrap(), "```python\nx\n```");
        assert_eq!(*pres.style_at(shape, 0).unwrap(), Style::font("Roboto Mono"));
    }
}
