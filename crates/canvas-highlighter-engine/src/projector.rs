//! Turns range anchors into the rectangles they cover on screen.

use crate::anchor::{AnchorResolver, RangeAnchor, ResolvedRange};
use crate::geometry::{Rect, text_leaves_between, text_rects};
use crate::tree::TextGeometry;

/// Rectangles covered by one anchor, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    /// Container-local rects.
    pub rects: Vec<Rect>,
    /// The same rects in viewport coordinates, as the tree reported them.
    pub client_rects: Vec<Rect>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }
}

/// Projects anchors that belong to one root container.
pub struct Projector<'a, T: TextGeometry> {
    tree: &'a T,
    resolver: AnchorResolver<'a, T>,
}

impl<'a, T: TextGeometry> Projector<'a, T> {
    pub fn new(tree: &'a T, root: T::NodeId) -> Self {
        Self {
            tree,
            resolver: AnchorResolver::new(tree, root),
        }
    }

    /// Rects of `anchor` relative to the container's current top-left
    /// corner. Empty when the anchor no longer resolves.
    pub fn project(&self, anchor: &RangeAnchor) -> Projection {
        let Some(range) = self.resolver.resolve_anchor(anchor) else {
            return Projection::default();
        };
        let client_rects = self.client_rects(&range);
        let container = self.tree.bounding_box(self.resolver.root());
        let rects = client_rects
            .iter()
            .map(|rect| rect.relative_to(&container))
            .collect();
        log::trace!("anchor {} projects to {} rects", anchor.id, client_rects.len());
        Projection {
            rects,
            client_rects,
        }
    }

    /// Viewport rects of a resolved range.
    ///
    /// Leaves strictly inside the range that lay out as a single zero-area
    /// box (collapsed whitespace between elements, say) are left out.
    pub fn client_rects(&self, range: &ResolvedRange<T::NodeId>) -> Vec<Rect> {
        let (start, end) = (range.start, range.end);
        if range.is_single_leaf() {
            return text_rects(self.tree, start.node, start.offset, Some(end.offset));
        }

        let mut rects = text_rects(self.tree, start.node, start.offset, None);
        for leaf in text_leaves_between(self.tree, start.node, end.node) {
            let leaf_rects = text_rects(self.tree, leaf, 0, None);
            if let [only] = leaf_rects.as_slice()
                && only.is_degenerate()
            {
                continue;
            }
            rects.extend(leaf_rects);
        }
        rects.extend(text_rects(self.tree, end.node, 0, Some(end.offset)));
        rects
    }
}
