//! In-memory host model
//!
//! `MemDocument` and `MemPresentation` implement the host traits on top
//! of a simple node arena. Every character carries its own `Style`, so
//! style writes and deletions behave the way a real rich-text host does.
//! Used by the command-line tool and throughout the tests.

use std::ops::Range;

use crate::delimiter::Delimiters;
use crate::error::{Error, Result};
use crate::host::{DocumentHost, Indent, NodeId, NodeKind, SlideHost, TextStore};
use crate::style::{Rgb, Style};

/// Page width of a US letter page, in points
pub const PAGE_WIDTH: f32 = 612.0;

/// Default left and right page margin, in points
pub const PAGE_MARGIN: f32 = 72.0;

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: Vec<char>,
    styles: Vec<Style>,
    /// Cell background or shape fill
    background: Option<Rgb>,
    indent: Option<Indent>,
    width: Option<f32>,
    padding: Option<f32>,
    border_width: Option<f32>,
    font_size: Option<f32>,
    table_indent: Option<f32>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            text: Vec::new(),
            styles: Vec::new(),
            background: None,
            indent: None,
            width: None,
            padding: None,
            border_width: None,
            font_size: None,
            table_indent: None,
        }
    }

    fn with_text(kind: NodeKind, text: &str) -> Self {
        let mut node = Self::new(kind);
        node.text = text.chars().collect();
        node.styles = vec![Style::default(); node.text.len()];
        node
    }
}

/// A run of characters sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: Style,
}

/// Node storage shared by documents and presentations
#[derive(Debug, Clone, Default)]
struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(Error::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(Error::UnknownNode(id))
    }

    fn expect_kind(&self, id: NodeId, expected: NodeKind) -> Result<&Node> {
        let node = self.node(id)?;
        if node.kind != expected {
            return Err(Error::UnexpectedKind {
                node: id,
                expected,
                found: node.kind,
            });
        }
        Ok(node)
    }

    /// Attach a detached node as the last child of `parent`
    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if let Some(old) = self.node(child)?.parent {
            return Err(Error::Message(format!(
                "node {:?} is still attached to {:?}",
                child, old
            )));
        }
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn text_range(&self, id: NodeId, range: &Range<usize>) -> Result<()> {
        let len = self.node(id)?.text.len();
        if range.start > range.end || range.end > len {
            return Err(Error::RangeOutOfBounds {
                node: id,
                range: range.clone(),
                len,
            });
        }
        Ok(())
    }

    fn text(&self, id: NodeId) -> Result<String> {
        Ok(self.node(id)?.text.iter().collect())
    }

    fn set_text_style(&mut self, id: NodeId, range: Range<usize>, style: &Style) -> Result<()> {
        self.text_range(id, &range)?;
        let node = self.node_mut(id)?;
        for current in &mut node.styles[range] {
            *current = current.merged(style);
        }
        Ok(())
    }

    fn delete_text(&mut self, id: NodeId, range: Range<usize>) -> Result<()> {
        self.text_range(id, &range)?;
        let node = self.node_mut(id)?;
        node.text.drain(range.clone());
        node.styles.drain(range);
        Ok(())
    }

    fn styled_runs(&self, id: NodeId) -> Result<Vec<StyledRun>> {
        let node = self.node(id)?;
        let mut runs: Vec<StyledRun> = Vec::new();
        for (ch, style) in node.text.iter().zip(&node.styles) {
            match runs.last_mut() {
                Some(run) if run.style == *style => run.text.push(*ch),
                _ => runs.push(StyledRun {
                    text: ch.to_string(),
                    style: style.clone(),
                }),
            }
        }
        Ok(runs)
    }

    fn style_at(&self, id: NodeId, index: usize) -> Result<&Style> {
        let node = self.node(id)?;
        node.styles.get(index).ok_or(Error::RangeOutOfBounds {
            node: id,
            range: index..index + 1,
            len: node.styles.len(),
        })
    }
}

/// An in-memory word-processing document
#[derive(Debug, Clone)]
pub struct MemDocument {
    arena: Arena,
    body: NodeId,
    /// Whether tables can be indented directly
    direct_table_indent: bool,
}

impl Default for MemDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemDocument {
    /// Create an empty document
    pub fn new() -> Self {
        let mut arena = Arena::default();
        let body = arena.add(Node::new(NodeKind::Body));
        Self {
            arena,
            body,
            direct_table_indent: false,
        }
    }

    /// Create a document with one body paragraph per line of `text`
    pub fn from_lines(text: &str) -> Self {
        let mut doc = Self::new();
        let body = doc.body;
        for line in text.lines() {
            doc.add_paragraph(body, line);
        }
        doc
    }

    /// Let `indent_table` succeed instead of requiring the spacer table
    pub fn with_direct_table_indent(mut self) -> Self {
        self.direct_table_indent = true;
        self
    }

    pub fn add_paragraph(&mut self, container: NodeId, text: &str) -> NodeId {
        let id = self.arena.add(Node::with_text(NodeKind::Paragraph, text));
        self.node_attach(container, id);
        id
    }

    /// Add a table with empty cells. Returns the table and its cells by row.
    pub fn add_table(&mut self, container: NodeId, rows: usize, cols: usize) -> (NodeId, Vec<Vec<NodeId>>) {
        let table = self.arena.add(Node::new(NodeKind::Table));
        self.node_attach(container, table);
        let mut cells = Vec::with_capacity(rows);
        for _ in 0..rows {
            let row = self.arena.add(Node::new(NodeKind::TableRow));
            self.node_attach(table, row);
            let row_cells: Vec<NodeId> = (0..cols)
                .map(|_| {
                    let cell = self.arena.add(Node::new(NodeKind::TableCell));
                    self.node_attach(row, cell);
                    cell
                })
                .collect();
            cells.push(row_cells);
        }
        (table, cells)
    }

    /// Add a node the engine does not look into
    pub fn add_other(&mut self, container: NodeId) -> NodeId {
        let id = self.arena.add(Node::new(NodeKind::Other));
        self.node_attach(container, id);
        id
    }

    fn node_attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.arena.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
        if let Some(node) = self.arena.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
    }

    pub fn set_cell_background(&mut self, cell: NodeId, color: Rgb) {
        if let Ok(node) = self.arena.node_mut(cell) {
            node.background = Some(color);
        }
    }

    pub fn set_paragraph_indent(&mut self, paragraph: NodeId, indent: Indent) {
        if let Ok(node) = self.arena.node_mut(paragraph) {
            node.indent = Some(indent);
        }
    }

    pub fn styled_runs(&self, node: NodeId) -> Result<Vec<StyledRun>> {
        self.arena.styled_runs(node)
    }

    pub fn style_at(&self, node: NodeId, index: usize) -> Result<&Style> {
        self.arena.style_at(node, index)
    }

    pub fn width(&self, cell: NodeId) -> Option<f32> {
        self.arena.node(cell).ok().and_then(|n| n.width)
    }

    pub fn padding(&self, cell: NodeId) -> Option<f32> {
        self.arena.node(cell).ok().and_then(|n| n.padding)
    }

    pub fn border_width(&self, table: NodeId) -> Option<f32> {
        self.arena.node(table).ok().and_then(|n| n.border_width)
    }

    pub fn font_size(&self, paragraph: NodeId) -> Option<f32> {
        self.arena.node(paragraph).ok().and_then(|n| n.font_size)
    }

    pub fn table_indent(&self, table: NodeId) -> Option<f32> {
        self.arena.node(table).ok().and_then(|n| n.table_indent)
    }

    /// Indented outline of the document structure, one node per line
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_node(self.body, 0, &mut out);
        out
    }

    fn outline_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Ok(node) = self.arena.node(id) else {
            return;
        };
        out.push_str(&"  ".repeat(depth));
        match node.kind {
            NodeKind::Paragraph => {
                out.push_str(&format!("paragraph {:?}", node.text.iter().collect::<String>()))
            }
            kind => out.push_str(&format!("{:?}", kind).to_lowercase()),
        }
        if let Some(bg) = node.background {
            out.push_str(&format!(" {}", bg));
        }
        out.push('\n');
        for &child in &node.children {
            self.outline_node(child, depth + 1, out);
        }
    }
}

impl TextStore for MemDocument {
    fn text(&self, node: NodeId) -> Result<String> {
        self.arena.text(node)
    }

    fn set_text_style(&mut self, node: NodeId, range: Range<usize>, style: &Style) -> Result<()> {
        self.arena.set_text_style(node, range, style)
    }

    fn delete_text(&mut self, node: NodeId, range: Range<usize>) -> Result<()> {
        self.arena.delete_text(node, range)
    }
}

impl DocumentHost for MemDocument {
    fn body(&self) -> NodeId {
        self.body
    }

    fn kind(&self, node: NodeId) -> Result<NodeKind> {
        Ok(self.arena.node(node)?.kind)
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.arena.node(node)?.children.clone())
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.arena.node(node)?.parent)
    }

    fn background(&self, node: NodeId) -> Result<Option<Rgb>> {
        Ok(self.arena.node(node)?.background)
    }

    fn indent(&self, paragraph: NodeId) -> Result<Option<Indent>> {
        Ok(self.arena.expect_kind(paragraph, NodeKind::Paragraph)?.indent)
    }

    fn content_width(&self) -> f32 {
        PAGE_WIDTH - 2.0 * PAGE_MARGIN
    }

    fn remove_from_parent(&mut self, node: NodeId) -> Result<()> {
        if let Some(parent) = self.arena.node_mut(node)?.parent.take() {
            self.arena.node_mut(parent)?.children.retain(|&c| c != node);
        }
        Ok(())
    }

    fn insert_table(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let parent_node = self.arena.node(parent)?;
        if !parent_node.kind.is_container() {
            return Err(Error::UnsupportedParent(parent_node.kind));
        }
        let index = index.min(parent_node.children.len());
        let table = self.arena.add(Node::new(NodeKind::Table));
        self.arena.node_mut(parent)?.children.insert(index, table);
        self.arena.node_mut(table)?.parent = Some(parent);
        Ok(table)
    }

    fn append_row(&mut self, table: NodeId) -> Result<NodeId> {
        self.arena.expect_kind(table, NodeKind::Table)?;
        let row = self.arena.add(Node::new(NodeKind::TableRow));
        self.arena.attach(table, row)?;
        Ok(row)
    }

    fn append_cell(&mut self, row: NodeId) -> Result<NodeId> {
        self.arena.expect_kind(row, NodeKind::TableRow)?;
        let cell = self.arena.add(Node::new(NodeKind::TableCell));
        self.arena.attach(row, cell)?;
        // Like real hosts, a new cell is never empty
        let placeholder = self.arena.add(Node::with_text(NodeKind::Paragraph, ""));
        self.arena.attach(cell, placeholder)?;
        Ok(cell)
    }

    fn append_child(&mut self, container: NodeId, node: NodeId) -> Result<()> {
        let kind = self.arena.node(container)?.kind;
        if !kind.is_container() {
            return Err(Error::UnexpectedKind {
                node: container,
                expected: NodeKind::TableCell,
                found: kind,
            });
        }
        self.arena.attach(container, node)
    }

    fn append_paragraph(&mut self, container: NodeId, text: &str) -> Result<NodeId> {
        let paragraph = self.arena.add(Node::with_text(NodeKind::Paragraph, text));
        self.append_child(container, paragraph)?;
        Ok(paragraph)
    }

    fn set_background(&mut self, cell: NodeId, color: Rgb) -> Result<()> {
        self.arena.expect_kind(cell, NodeKind::TableCell)?;
        self.arena.node_mut(cell)?.background = Some(color);
        Ok(())
    }

    fn set_indent(&mut self, paragraph: NodeId, indent: Indent) -> Result<()> {
        self.arena.expect_kind(paragraph, NodeKind::Paragraph)?;
        self.arena.node_mut(paragraph)?.indent = Some(indent);
        Ok(())
    }

    fn set_border_width(&mut self, table: NodeId, width: f32) -> Result<()> {
        self.arena.expect_kind(table, NodeKind::Table)?;
        self.arena.node_mut(table)?.border_width = Some(width);
        Ok(())
    }

    fn set_padding(&mut self, cell: NodeId, padding: f32) -> Result<()> {
        self.arena.expect_kind(cell, NodeKind::TableCell)?;
        self.arena.node_mut(cell)?.padding = Some(padding);
        Ok(())
    }

    fn set_width(&mut self, cell: NodeId, width: f32) -> Result<()> {
        self.arena.expect_kind(cell, NodeKind::TableCell)?;
        self.arena.node_mut(cell)?.width = Some(width);
        Ok(())
    }

    fn set_font_size(&mut self, paragraph: NodeId, size: f32) -> Result<()> {
        self.arena.expect_kind(paragraph, NodeKind::Paragraph)?;
        self.arena.node_mut(paragraph)?.font_size = Some(size);
        Ok(())
    }

    fn indent_table(&mut self, table: NodeId, amount: f32) -> Result<bool> {
        self.arena.expect_kind(table, NodeKind::Table)?;
        if !self.direct_table_indent {
            return Ok(false);
        }
        self.arena.node_mut(table)?.table_indent = Some(amount);
        Ok(true)
    }
}

/// An in-memory slide deck
#[derive(Debug, Clone, Default)]
pub struct MemPresentation {
    arena: Arena,
    slides: Vec<NodeId>,
}

impl MemPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a deck from plain text. Lines holding only `---` separate
    /// slides and blank lines separate text boxes, except inside a fenced
    /// block.
    pub fn from_text(text: &str, delimiters: &Delimiters) -> Self {
        let mut pres = Self::new();
        let mut slide = pres.add_slide();
        let mut block: Vec<&str> = Vec::new();
        let mut in_fence = false;

        for line in text.lines() {
            if delimiters.starts_with_fence(line) {
                in_fence = !in_fence;
            }
            if !in_fence && line.trim() == "---" {
                pres.flush_block(slide, &mut block);
                slide = pres.add_slide();
            } else if !in_fence && line.trim().is_empty() {
                pres.flush_block(slide, &mut block);
            } else {
                block.push(line);
            }
        }
        pres.flush_block(slide, &mut block);
        pres
    }

    fn flush_block(&mut self, slide: NodeId, block: &mut Vec<&str>) {
        if !block.is_empty() {
            self.add_text_box(slide, &block.join("\n"));
            block.clear();
        }
    }

    pub fn add_slide(&mut self) -> NodeId {
        let slide = self.arena.add(Node::new(NodeKind::Slide));
        self.slides.push(slide);
        slide
    }

    pub fn add_text_box(&mut self, slide: NodeId, text: &str) -> NodeId {
        self.add_shape(slide, NodeKind::TextBox, text)
    }

    pub fn add_shape(&mut self, slide: NodeId, kind: NodeKind, text: &str) -> NodeId {
        let shape = self.arena.add(Node::with_text(kind, text));
        if let Some(node) = self.arena.nodes.get_mut(slide.0) {
            node.children.push(shape);
        }
        if let Some(node) = self.arena.nodes.get_mut(shape.0) {
            node.parent = Some(slide);
        }
        shape
    }

    pub fn set_fill(&mut self, shape: NodeId, color: Rgb) {
        if let Ok(node) = self.arena.node_mut(shape) {
            node.background = Some(color);
        }
    }

    pub fn styled_runs(&self, shape: NodeId) -> Result<Vec<StyledRun>> {
        self.arena.styled_runs(shape)
    }

    pub fn style_at(&self, shape: NodeId, index: usize) -> Result<&Style> {
        self.arena.style_at(shape, index)
    }
}

impl TextStore for MemPresentation {
    fn text(&self, node: NodeId) -> Result<String> {
        self.arena.text(node)
    }

    fn set_text_style(&mut self, node: NodeId, range: Range<usize>, style: &Style) -> Result<()> {
        self.arena.set_text_style(node, range, style)
    }

    fn delete_text(&mut self, node: NodeId, range: Range<usize>) -> Result<()> {
        self.arena.delete_text(node, range)
    }
}

impl SlideHost for MemPresentation {
    fn slides(&self) -> Vec<NodeId> {
        self.slides.clone()
    }

    fn shapes(&self, slide: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.arena.expect_kind(slide, NodeKind::Slide)?.children.clone())
    }

    fn kind(&self, shape: NodeId) -> Result<NodeKind> {
        Ok(self.arena.node(shape)?.kind)
    }

    fn solid_fill(&self, shape: NodeId) -> Result<Option<Rgb>> {
        Ok(self.arena.node(shape)?.background)
    }

    fn set_solid_fill(&mut self, shape: NodeId, color: Rgb) -> Result<()> {
        self.arena.node_mut(shape)?.background = Some(color);
        Ok(())
    }
}
