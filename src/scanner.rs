//! Region scanner
//!
//! Finds code regions either on a slide (each shape stands alone) or in a
//! document container, where a block may span many paragraphs and may sit
//! inside tables nested to any depth.

use tracing::debug;

use crate::delimiter::{Classification, Delimiters};
use crate::error::Result;
use crate::host::{DocumentHost, NodeId, NodeKind, SlideHost};
use crate::region::CodeRegion;
use crate::registry::{StyleRegistry, UNKNOWN_MODE};
use crate::style::Rgb;

/// Find the code shapes among a slide's shapes
///
/// Shapes with a solid fill are code regardless of their text; their mode
/// may be `UNKNOWN_MODE`, which callers skip. Fenced text boxes still need
/// their fences removed.
pub fn scan_shapes<H: SlideHost + ?Sized>(
    host: &H,
    registry: &StyleRegistry,
    delimiters: &Delimiters,
    shapes: &[NodeId],
) -> Result<Vec<CodeRegion>> {
    let mut regions = Vec::new();
    for &shape in shapes {
        if host.kind(shape)? != NodeKind::TextBox {
            continue;
        }
        let fill = host.solid_fill(shape)?;
        let text = if fill.is_some() { String::new() } else { host.text(shape)? };
        match delimiters.classify(registry, fill, &text) {
            Some(Classification::Colored { mode }) => {
                regions.push(CodeRegion::new(mode, true, vec![shape]));
            }
            Some(Classification::Fenced { mode }) => {
                regions.push(CodeRegion::new(mode, false, vec![shape]));
            }
            None => {}
        }
    }
    debug!("found {} code shapes", regions.len());
    Ok(regions)
}

/// Scanner for document containers
pub struct DocumentScanner<'a, H: DocumentHost + ?Sized> {
    host: &'a H,
    delimiters: Delimiters,
    /// Cell color that marks a table as an existing code box
    code_background: Rgb,
}

/// Paragraphs collected for the block currently open
#[derive(Default)]
struct Accumulator {
    open: bool,
    nodes: Vec<NodeId>,
}

impl Accumulator {
    fn finish(&mut self, mode: String, regions: &mut Vec<CodeRegion>) {
        regions.push(CodeRegion::new(mode, false, std::mem::take(&mut self.nodes)));
        self.open = false;
    }
}

impl<'a, H: DocumentHost + ?Sized> DocumentScanner<'a, H> {
    pub fn new(host: &'a H, delimiters: Delimiters, code_background: Rgb) -> Self {
        Self {
            host,
            delimiters,
            code_background,
        }
    }

    /// Scan the whole document body
    pub fn scan_document(&self) -> Result<Vec<CodeRegion>> {
        let regions = self.scan_container(self.host.body())?;
        debug!("found {} code regions", regions.len());
        Ok(regions)
    }

    /// Mode of a fenced block, read from its first paragraph
    fn block_mode(&self, nodes: &[NodeId]) -> Result<String> {
        match nodes.first() {
            Some(&first) => Ok(self.delimiters.fence_mode(&self.host.text(first)?)),
            None => Ok(UNKNOWN_MODE.to_string()),
        }
    }

    fn finish(&self, acc: &mut Accumulator, regions: &mut Vec<CodeRegion>) -> Result<()> {
        let mode = self.block_mode(&acc.nodes)?;
        acc.finish(mode, regions);
        Ok(())
    }

    /// Scan the children of a body or table cell
    pub fn scan_container(&self, container: NodeId) -> Result<Vec<CodeRegion>> {
        let mut regions = Vec::new();
        let mut acc = Accumulator::default();

        for child in self.host.children(container)? {
            let kind = self.host.kind(child)?;
            if acc.open && kind != NodeKind::Paragraph {
                self.finish(&mut acc, &mut regions)?;
            }
            if kind == NodeKind::Table {
                if self.is_code_table(child)? {
                    regions.push(self.region_from_code_table(child)?);
                } else {
                    regions.extend(self.scan_table(child)?);
                }
            }
            if kind != NodeKind::Paragraph {
                continue;
            }

            let text = self.host.text(child)?;
            if self.delimiters.starts_with_fence(&text) {
                if acc.open {
                    acc.nodes.push(child);
                    self.finish(&mut acc, &mut regions)?;
                    continue;
                }
                acc.open = true;
            }
            if acc.open {
                acc.nodes.push(child);
                if self.delimiters.last_line_is_fence(&text) {
                    self.finish(&mut acc, &mut regions)?;
                }
            }
        }

        // Tolerate a missing closing fence
        if !acc.nodes.is_empty() {
            self.finish(&mut acc, &mut regions)?;
        }
        Ok(regions)
    }

    /// A table is an existing code box if it has exactly one cell, colored
    /// with the code background, holding at least one paragraph and nothing
    /// else
    pub fn is_code_table(&self, table: NodeId) -> Result<bool> {
        let rows = self.host.children(table)?;
        if rows.len() != 1 {
            return Ok(false);
        }
        let cells = self.host.children(rows[0])?;
        if cells.len() != 1 {
            return Ok(false);
        }
        if self.host.background(cells[0])? != Some(self.code_background) {
            return Ok(false);
        }
        let children = self.host.children(cells[0])?;
        if children.is_empty() {
            return Ok(false);
        }
        for child in children {
            if self.host.kind(child)? != NodeKind::Paragraph {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn region_from_code_table(&self, table: NodeId) -> Result<CodeRegion> {
        let row = self.host.children(table)?[0];
        let cell = self.host.children(row)?[0];
        let paragraphs = self.host.children(cell)?;
        Ok(CodeRegion::new(UNKNOWN_MODE, true, paragraphs))
    }

    fn scan_table(&self, table: NodeId) -> Result<Vec<CodeRegion>> {
        let mut regions = Vec::new();
        for row in self.host.children(table)? {
            for cell in self.host.children(row)? {
                regions.extend(self.scan_container(cell)?);
            }
        }
        Ok(regions)
    }
}
