//! In-memory document with a deterministic text layout.
//!
//! [`Document`] stores elements and text leaves in an `indextree` arena and
//! lays text out in fixed-size character cells. It implements
//! [`DocumentTree`] and [`TextGeometry`], which makes it a stand-in for a
//! real rendering engine in tests, benchmarks and headless hosts.

mod layout;

use indextree::{Arena, Node, NodeId};

use crate::geometry::{Point, Rect, char_len, slice_chars, text_leaves_between};
use crate::tree::{Boundary, DocumentTree, Selection, TextGeometry};
use layout::{FlowLayout, Layout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String, display: Display },
    Text(String),
}

/// Size of one character cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 10.0,
            line_height: 20.0,
        }
    }
}

/// Builds a [`Document`] top-down; `element` nests, `text` appends a leaf to
/// the element currently open.
pub struct DocumentBuilder {
    arena: Arena<NodeKind>,
    root: NodeId,
    open: Vec<NodeId>,
    width: f32,
    metrics: TextMetrics,
}

impl DocumentBuilder {
    pub fn new(width: f32) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeKind::Element {
            tag: "body".to_string(),
            display: Display::Block,
        });
        Self {
            arena,
            root,
            open: vec![root],
            width,
            metrics: TextMetrics::default(),
        }
    }

    pub fn metrics(mut self, metrics: TextMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn element(
        &mut self,
        tag: &str,
        display: Display,
        children: impl FnOnce(&mut Self),
    ) -> &mut Self {
        let node = self.append(NodeKind::Element {
            tag: tag.to_string(),
            display,
        });
        self.open.push(node);
        children(self);
        self.open.pop();
        self
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        self.append(NodeKind::Text(text.to_string()));
        self
    }

    fn append(&mut self, kind: NodeKind) -> NodeId {
        let node = self.arena.new_node(kind);
        let parent = self.open.last().copied().unwrap_or(self.root);
        parent.append(node, &mut self.arena);
        node
    }

    pub fn build(self) -> Document {
        let layout = FlowLayout::compute(&self.arena, self.root, self.width, self.metrics);
        Document {
            arena: self.arena,
            root: self.root,
            width: self.width,
            metrics: self.metrics,
            origin: Point::default(),
            scroll: Point::default(),
            layout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    arena: Arena<NodeKind>,
    root: NodeId,
    width: f32,
    metrics: TextMetrics,
    /// Viewport position of the document's top-left corner when unscrolled.
    origin: Point,
    scroll: Point,
    layout: Layout,
}

impl Document {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.node(node).map(Node::get)
    }

    /// Reflows the text for a new container width.
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.relayout();
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Scrolls the viewport; every viewport rect shifts by the opposite amount.
    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.scroll = Point::new(x, y);
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.arena.new_node(NodeKind::Text(text.to_string()));
        parent.append(node, &mut self.arena);
        self.relayout();
        node
    }

    pub fn remove_subtree(&mut self, node: NodeId) {
        node.remove_subtree(&mut self.arena);
        self.relayout();
    }

    /// Text leaves in document order.
    pub fn text_leaves(&self) -> Vec<NodeId> {
        self.root
            .descendants(&self.arena)
            .filter(|&node| self.is_text(node))
            .collect()
    }

    /// First text leaf whose content is exactly `text`.
    pub fn find_text(&self, text: &str) -> Option<NodeId> {
        self.root
            .descendants(&self.arena)
            .find(|&node| DocumentTree::text(self, node) == Some(text))
    }

    /// First element with the given tag, in document order.
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.root.descendants(&self.arena).find(|&node| {
            matches!(self.kind(node), Some(NodeKind::Element { tag: t, .. }) if t == tag)
        })
    }

    /// A selection between two leaves, with the display string a user would
    /// see for it.
    pub fn selection(
        &self,
        start: NodeId,
        start_offset: usize,
        end: NodeId,
        end_offset: usize,
    ) -> Selection<NodeId> {
        let leaf_text = move |node| DocumentTree::text(self, node).unwrap_or_default();
        let text = if start == end {
            slice_chars(leaf_text(start), start_offset, Some(end_offset)).to_string()
        } else {
            let mut text = slice_chars(leaf_text(start), start_offset, None).to_string();
            for leaf in text_leaves_between(self, start, end) {
                text.push_str(leaf_text(leaf));
            }
            text.push_str(slice_chars(leaf_text(end), 0, Some(end_offset)));
            text
        };
        Selection::new(
            Boundary::new(start, start_offset),
            Boundary::new(end, end_offset),
            text,
        )
    }

    fn node(&self, node: NodeId) -> Option<&Node<NodeKind>> {
        self.arena.get(node).filter(|entry| !entry.is_removed())
    }

    fn relayout(&mut self) {
        self.layout = FlowLayout::compute(&self.arena, self.root, self.width, self.metrics);
    }

    fn to_viewport(&self, rect: Rect) -> Rect {
        rect.translate(self.origin.x - self.scroll.x, self.origin.y - self.scroll.y)
    }
}

impl DocumentTree for Document {
    type NodeId = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent()
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.first_child()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.next_sibling()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.previous_sibling()
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }
}

impl TextGeometry for Document {
    fn client_rects(&self, leaf: NodeId, start: usize, end: usize) -> Vec<Rect> {
        self.layout
            .leaves
            .get(&leaf)
            .map(|boxes| {
                boxes
                    .line_rects(start, end)
                    .into_iter()
                    .map(|rect| self.to_viewport(rect))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn bounding_box(&self, node: NodeId) -> Rect {
        if node == self.root {
            return self.to_viewport(Rect::new(0.0, 0.0, self.width, self.layout.height));
        }
        let boxes: Vec<Rect> = node
            .descendants(&self.arena)
            .filter_map(|descendant| {
                let leaf = self.layout.leaves.get(&descendant)?;
                let len = char_len(DocumentTree::text(self, descendant)?);
                Rect::union_all(&leaf.line_rects(0, len))
            })
            .collect();
        let content = Rect::union_all(&boxes).unwrap_or_default();
        match self.kind(node) {
            // Block boxes fill the line horizontally.
            Some(NodeKind::Element {
                display: Display::Block,
                ..
            }) => self.to_viewport(Rect::new(0.0, content.y, self.width, content.height)),
            _ => self.to_viewport(content),
        }
    }
}
