//! Host document model interfaces
//!
//! The engine never owns document content. It reads and mutates a host
//! (a word-processing document or a slide deck) through these traits.
//! Every node is addressed through a `NodeId` handle that stays valid for
//! the whole run, no matter how often the node is moved around.
//!
//! All text offsets are character offsets into the node's plain text.

use std::ops::Range;

use crate::error::Result;
use crate::style::{Rgb, Style};

/// Stable handle for a host node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Node type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Top-level document body
    Body,
    Paragraph,
    Table,
    TableRow,
    TableCell,
    /// A slide page holding shapes
    Slide,
    /// A text box shape on a slide
    TextBox,
    /// Anything the engine does not look into (images, lines, ...)
    Other,
}

impl NodeKind {
    /// Whether children of this kind can hold paragraphs and tables
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Body | NodeKind::TableCell)
    }
}

/// Paragraph indentation, in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Indent {
    /// Left indentation of every line
    pub start: f32,
    /// Left indentation of the first line
    pub first_line: f32,
}

/// Character-range access shared by documents and slides
pub trait TextStore {
    /// Plain text of a text-bearing node
    fn text(&self, node: NodeId) -> Result<String>;

    /// Force the explicit fields of `style` on `range`
    fn set_text_style(&mut self, node: NodeId, range: Range<usize>, style: &Style) -> Result<()>;

    /// Remove the characters in `range`
    fn delete_text(&mut self, node: NodeId, range: Range<usize>) -> Result<()>;

    /// Character count of a node's text
    fn text_len(&self, node: NodeId) -> Result<usize> {
        Ok(self.text(node)?.chars().count())
    }
}

/// A word-processing document: a body of paragraphs and (nested) tables
pub trait DocumentHost: TextStore {
    /// The top-level container
    fn body(&self) -> NodeId;

    fn kind(&self, node: NodeId) -> Result<NodeKind>;

    /// Ordered children. Tables have rows, rows have cells.
    fn children(&self, node: NodeId) -> Result<Vec<NodeId>>;

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>>;

    /// Background color of a table cell, if any
    fn background(&self, node: NodeId) -> Result<Option<Rgb>>;

    /// Paragraph indentation, `None` when the host cannot report it
    fn indent(&self, paragraph: NodeId) -> Result<Option<Indent>>;

    /// Usable width of the page (page width minus both margins)
    fn content_width(&self) -> f32;

    fn remove_from_parent(&mut self, node: NodeId) -> Result<()>;

    /// Insert a new, row-less table at `index` among the children of `parent`
    fn insert_table(&mut self, parent: NodeId, index: usize) -> Result<NodeId>;

    fn append_row(&mut self, table: NodeId) -> Result<NodeId>;

    /// Append a cell to a row. The host may pre-populate the cell.
    fn append_cell(&mut self, row: NodeId) -> Result<NodeId>;

    /// Move a detached node to the end of `container`
    fn append_child(&mut self, container: NodeId, node: NodeId) -> Result<()>;

    fn append_paragraph(&mut self, container: NodeId, text: &str) -> Result<NodeId>;

    fn set_background(&mut self, cell: NodeId, color: Rgb) -> Result<()>;

    fn set_indent(&mut self, paragraph: NodeId, indent: Indent) -> Result<()>;

    fn set_border_width(&mut self, table: NodeId, width: f32) -> Result<()>;

    /// Set all four paddings of a cell
    fn set_padding(&mut self, cell: NodeId, padding: f32) -> Result<()>;

    fn set_width(&mut self, cell: NodeId, width: f32) -> Result<()>;

    fn set_font_size(&mut self, paragraph: NodeId, size: f32) -> Result<()>;

    /// Indent a table directly. Returns `false` when the host has no way
    /// to do that.
    fn indent_table(&mut self, _table: NodeId, _amount: f32) -> Result<bool> {
        Ok(false)
    }

    /// Position of `node` among its parent's children
    fn child_index(&self, node: NodeId) -> Result<Option<usize>> {
        match self.parent(node)? {
            Some(parent) => Ok(self.children(parent)?.iter().position(|&c| c == node)),
            None => Ok(None),
        }
    }
}

/// A presentation: slides holding flat lists of shapes
pub trait SlideHost: TextStore {
    fn slides(&self) -> Vec<NodeId>;

    fn shapes(&self, slide: NodeId) -> Result<Vec<NodeId>>;

    fn kind(&self, shape: NodeId) -> Result<NodeKind>;

    /// Solid fill color, `None` when the shape has no solid fill
    fn solid_fill(&self, shape: NodeId) -> Result<Option<Rgb>>;

    fn set_solid_fill(&mut self, shape: NodeId, color: Rgb) -> Result<()>;
}
