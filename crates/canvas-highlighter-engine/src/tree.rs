//! Read-only view of the host document that highlights are anchored in.
//!
//! The engine never owns the document. Hosts implement [`DocumentTree`] for
//! navigation and [`TextGeometry`] for layout queries; [`crate::Document`] is
//! the in-memory implementation used by tests and headless hosts.

use std::fmt::Debug;

use crate::geometry::Rect;

/// Navigation over a tree of structural nodes and text leaves.
pub trait DocumentTree {
    /// Cheap handle identifying one node of the tree.
    type NodeId: Copy + Eq + Debug;

    fn parent(&self, node: Self::NodeId) -> Option<Self::NodeId>;
    fn first_child(&self, node: Self::NodeId) -> Option<Self::NodeId>;
    fn next_sibling(&self, node: Self::NodeId) -> Option<Self::NodeId>;
    fn previous_sibling(&self, node: Self::NodeId) -> Option<Self::NodeId>;

    /// Text content of a text leaf, `None` for every other node kind.
    fn text(&self, node: Self::NodeId) -> Option<&str>;

    fn is_text(&self, node: Self::NodeId) -> bool {
        self.text(node).is_some()
    }

    /// The `index`-th child of `node`, found by stepping through siblings.
    fn child_at(&self, node: Self::NodeId, index: usize) -> Option<Self::NodeId> {
        let mut child = self.first_child(node)?;
        for _ in 0..index {
            child = self.next_sibling(child)?;
        }
        Some(child)
    }

    /// True if `node` is `ancestor` or lies somewhere below it.
    fn is_inclusive_descendant(&self, node: Self::NodeId, ancestor: Self::NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }
}

/// Layout queries against a rendered [`DocumentTree`].
///
/// All rectangles are in viewport coordinates.
pub trait TextGeometry: DocumentTree {
    /// Line boxes covered by characters `start..end` of a text leaf, one rect
    /// per visual line. A collapsed span yields a single zero-width rect at
    /// the caret position.
    fn client_rects(&self, leaf: Self::NodeId, start: usize, end: usize) -> Vec<Rect>;

    /// Border box of any node.
    fn bounding_box(&self, node: Self::NodeId) -> Rect;
}

/// One end of a selection: a node and a character offset into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> Boundary<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A live selection as reported by the host: its primary range plus the
/// string the user sees selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<N> {
    pub start: Boundary<N>,
    pub end: Boundary<N>,
    pub text: String,
}

impl<N: PartialEq> Selection<N> {
    pub fn new(start: Boundary<N>, end: Boundary<N>, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// A selection whose start and end are the same point.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}
