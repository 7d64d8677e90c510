//! Rectangles, character spans and text-leaf traversal.
//!
//! Everything here is a pure function of the tree it is handed.

use serde::{Deserialize, Serialize};

use crate::tree::{DocumentTree, TextGeometry};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. Whether it is viewport or container-local depends
/// on who produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Zero width or zero height: present in layout but paints nothing.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Containment with every edge inclusive.
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Re-express this rect relative to the top-left corner of `frame`.
    pub fn relative_to(&self, frame: &Rect) -> Rect {
        self.translate(-frame.x, -frame.y)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Smallest rect covering every input, `None` for an empty input.
    pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects
            .into_iter()
            .fold(None, |acc: Option<Rect>, rect| match acc {
                Some(bounds) => Some(bounds.union(rect)),
                None => Some(*rect),
            })
    }
}

/// Length of `text` in characters, the unit every offset is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Character-indexed substring `start..end` (`end` defaults to the end of
/// the text). Out-of-range indices are clamped.
pub fn slice_chars(text: &str, start: usize, end: Option<usize>) -> &str {
    let byte_at = |char_index: usize| {
        text.char_indices()
            .nth(char_index)
            .map_or(text.len(), |(byte, _)| byte)
    };
    let start_byte = byte_at(start);
    let end_byte = end.map_or(text.len(), byte_at).max(start_byte);
    &text[start_byte..end_byte]
}

/// Viewport rects covering characters `start..end` of a text leaf; `end`
/// defaults to the leaf length. Spans that wrap produce one rect per line.
/// Returns nothing for nodes that are not text leaves.
pub fn text_rects<T: TextGeometry>(
    tree: &T,
    leaf: T::NodeId,
    start: usize,
    end: Option<usize>,
) -> Vec<Rect> {
    let Some(text) = tree.text(leaf) else {
        return Vec::new();
    };
    let len = char_len(text);
    let end = end.unwrap_or(len).min(len);
    tree.client_rects(leaf, start.min(end), end)
}

/// Bounding rect of the character at `offset`; collapsed to the caret
/// position when `offset` is at the end of the text.
pub fn char_rect<T: TextGeometry>(tree: &T, leaf: T::NodeId, offset: usize) -> Option<Rect> {
    let len = char_len(tree.text(leaf)?);
    let offset = offset.min(len);
    Rect::union_all(&tree.client_rects(leaf, offset, (offset + 1).min(len)))
}

#[derive(Debug, Clone, Copy)]
struct Visit<N> {
    node: N,
    /// Reached by climbing back out of this node's children.
    returning: bool,
}

/// Depth-first cursor over the text leaves strictly between two leaves.
///
/// Each node is descended into only on its first visit; climbing back to a
/// parent moves on to the parent's next sibling, so no leaf is produced
/// twice. The cursor runs off the end of the tree if `end` does not follow
/// `start`; [`TextLeaves::reached_end`] tells the two outcomes apart.
pub struct TextLeaves<'a, T: DocumentTree> {
    tree: &'a T,
    next: Option<Visit<T::NodeId>>,
    end: T::NodeId,
    reached_end: bool,
}

impl<'a, T: DocumentTree> TextLeaves<'a, T> {
    pub fn between(tree: &'a T, start: T::NodeId, end: T::NodeId) -> Self {
        let mut leaves = Self {
            tree,
            next: None,
            end,
            reached_end: start == end,
        };
        if !leaves.reached_end {
            leaves.next = leaves.advance(Visit {
                node: start,
                returning: false,
            });
        }
        leaves
    }

    /// Whether the traversal has arrived at the end leaf.
    pub fn reached_end(&self) -> bool {
        self.reached_end
    }

    fn advance(&self, visit: Visit<T::NodeId>) -> Option<Visit<T::NodeId>> {
        if !visit.returning
            && let Some(child) = self.tree.first_child(visit.node)
        {
            return Some(Visit {
                node: child,
                returning: false,
            });
        }
        if let Some(sibling) = self.tree.next_sibling(visit.node) {
            return Some(Visit {
                node: sibling,
                returning: false,
            });
        }
        self.tree.parent(visit.node).map(|parent| Visit {
            node: parent,
            returning: true,
        })
    }
}

impl<T: DocumentTree> Iterator for TextLeaves<'_, T> {
    type Item = T::NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let visit = self.next.take()?;
            if visit.node == self.end {
                self.reached_end = true;
                return None;
            }
            self.next = self.advance(visit);
            if !visit.returning && self.tree.is_text(visit.node) {
                return Some(visit.node);
            }
        }
    }
}

/// All text leaves strictly between `start` and `end` in document order.
/// Empty when `start == end` or when `end` is not found after `start`.
pub fn text_leaves_between<T: DocumentTree>(
    tree: &T,
    start: T::NodeId,
    end: T::NodeId,
) -> Vec<T::NodeId> {
    let mut cursor = TextLeaves::between(tree, start, end);
    let leaves: Vec<_> = cursor.by_ref().collect();
    if cursor.reached_end() {
        leaves
    } else {
        Vec::new()
    }
}
