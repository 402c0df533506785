//! Code regions and their combined text
//!
//! A region is a run of text nodes that together hold one code block.
//! `RegionText` joins their texts with line breaks so fences and tokens
//! can be found across node boundaries, and maps combined offsets back to
//! per-node ranges.

use std::collections::HashSet;
use std::ops::Range;

use crate::error::Result;
use crate::host::{NodeId, TextStore};

/// One code block found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRegion {
    /// Resolved mode, possibly one the registry does not know
    pub mode: String,
    /// Whether the region already sits in its own code box
    pub already_boxed: bool,
    /// Text nodes of the region, in document order
    pub nodes: Vec<NodeId>,
}

impl CodeRegion {
    pub fn new(mode: impl Into<String>, already_boxed: bool, nodes: Vec<NodeId>) -> Self {
        Self {
            mode: mode.into(),
            already_boxed,
            nodes,
        }
    }
}

/// Where one node's text sits in the combined text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub node: NodeId,
    pub start: usize,
    pub len: usize,
}

impl Piece {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Texts of a region's nodes joined by `'\n'`
#[derive(Debug, Clone)]
pub struct RegionText {
    pub text: String,
    pub pieces: Vec<Piece>,
}

/// What a deletion on the combined text does to each node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeletePlan {
    /// Node-local ranges to delete
    pub ranges: Vec<(NodeId, Range<usize>)>,
    /// Nodes whose whole text and line break are deleted
    pub drop: Vec<NodeId>,
}

impl RegionText {
    pub fn read<H: TextStore + ?Sized>(host: &H, nodes: &[NodeId]) -> Result<Self> {
        let mut text = String::new();
        let mut pieces = Vec::with_capacity(nodes.len());
        let mut offset = 0;
        for (i, &node) in nodes.iter().enumerate() {
            if i > 0 {
                text.push('\n');
                offset += 1;
            }
            let node_text = host.text(node)?;
            let len = node_text.chars().count();
            text.push_str(&node_text);
            pieces.push(Piece {
                node,
                start: offset,
                len,
            });
            offset += len;
        }
        Ok(Self { text, pieces })
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.pieces.last().map_or(0, Piece::end)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node-local ranges covered by a combined range; line breaks between
    /// nodes are skipped
    pub fn node_ranges(&self, range: Range<usize>) -> Vec<(NodeId, Range<usize>)> {
        self.pieces
            .iter()
            .filter_map(|piece| {
                let lo = range.start.max(piece.start);
                let hi = range.end.min(piece.end());
                (lo < hi).then(|| (piece.node, lo - piece.start..hi - piece.start))
            })
            .collect()
    }

    /// Translate a deletion of a combined range into node operations
    ///
    /// Node texts can only lose characters, so a line break between two
    /// nodes disappears only by dropping a node. A node is dropped when the
    /// range swallows its entire text plus a line break next to it that no
    /// other dropped node already accounts for.
    pub fn plan_delete(&self, range: Range<usize>) -> DeletePlan {
        let mut plan = DeletePlan::default();
        let mut used_breaks = HashSet::new();
        let break_in_range = |at: usize| range.start <= at && at < range.end;
        let single = self.pieces.len() == 1;

        for (i, piece) in self.pieces.iter().enumerate() {
            let whole = range.start <= piece.start
                && piece.end() <= range.end
                && (piece.len > 0 || (range.start < piece.start && piece.end() < range.end));

            if whole && !single {
                let after = (i + 1 < self.pieces.len()).then(|| piece.end());
                let before = (i > 0).then(|| piece.start - 1);
                let claim = [after, before]
                    .into_iter()
                    .flatten()
                    .find(|&at| break_in_range(at) && !used_breaks.contains(&at));
                if let Some(at) = claim {
                    used_breaks.insert(at);
                    plan.drop.push(piece.node);
                    continue;
                }
            }

            let lo = range.start.max(piece.start);
            let hi = range.end.min(piece.end());
            if lo < hi {
                plan.ranges.push((piece.node, lo - piece.start..hi - piece.start));
            }
        }
        plan
    }
}
