//! Structural range anchors.
//!
//! A [`RangeAnchor`] addresses a text range by child-index paths from a fixed
//! root instead of by live node handles, so it can be stored, sent elsewhere
//! and resolved again later. A path stays valid only while the shape of the
//! tree between the root and the leaf is unchanged.

use std::cmp::Ordering;

use canvas_highlighter_config::HighlighterConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Rect, TextLeaves, char_len, char_rect, slice_chars};
use crate::id::RangeId;
use crate::tree::{Boundary, DocumentTree, Selection, TextGeometry};

/// Why a selection could not be anchored or an anchor could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    #[error("selection is collapsed")]
    Collapsed,
    #[error("selection ends before it starts")]
    Reversed,
    #[error("endpoint is not a text leaf")]
    NotTextLeaf,
    #[error("endpoint is not inside the highlight root")]
    OutsideRoot,
    #[error("offset {offset} is past the end of a {len} character leaf")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("path index {index} at depth {depth} has no matching child")]
    PathOutOfBounds { depth: usize, index: usize },
}

/// Child indices from the root's child down to a leaf. The root itself is
/// not part of the path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<usize>);

impl Path {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeEndpoint {
    pub path: Path,
    /// Character offset into the leaf text.
    pub offset: usize,
    /// Text captured when the anchor was created. Informational only.
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectStyle {
    pub fill: String,
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub stroke: String,
    pub stroke_width: f32,
    pub visible: bool,
}

/// Per-highlight render settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub rect: RectStyle,
    pub line: LineStyle,
}

impl From<&HighlighterConfig> for RangeConfig {
    fn from(config: &HighlighterConfig) -> Self {
        Self {
            rect: RectStyle {
                fill: config.rect_fill.clone(),
                visible: true,
            },
            line: LineStyle {
                stroke: config.line_stroke.clone(),
                stroke_width: config.stroke_width,
                visible: true,
            },
        }
    }
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self::from(&HighlighterConfig::default())
    }
}

/// Persistable address of a highlighted text range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeAnchor {
    pub id: RangeId,
    /// The selected text as the user saw it.
    pub text: String,
    pub start: RangeEndpoint,
    pub end: RangeEndpoint,
    pub config: RangeConfig,
}

/// An anchor resolved back to live nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange<N> {
    pub start: Boundary<N>,
    pub end: Boundary<N>,
}

impl<N: PartialEq> ResolvedRange<N> {
    pub fn is_single_leaf(&self) -> bool {
        self.start.node == self.end.node
    }
}

/// Character rects at the two ends of a selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPosition {
    pub start: Rect,
    pub end: Rect,
}

/// Converts selections to anchors and anchors back to nodes, relative to a
/// fixed root.
pub struct AnchorResolver<'a, T: DocumentTree> {
    tree: &'a T,
    root: T::NodeId,
}

impl<'a, T: DocumentTree> AnchorResolver<'a, T> {
    pub fn new(tree: &'a T, root: T::NodeId) -> Self {
        Self { tree, root }
    }

    pub fn root(&self) -> T::NodeId {
        self.root
    }

    /// Path of `node` relative to the root.
    ///
    /// Climbs towards the root, counting previous siblings at each level
    /// rather than looking the node up in its parent's child list.
    pub fn path_of(&self, node: T::NodeId) -> Result<Path, AnchorError> {
        let mut reversed = Vec::new();
        let mut index = 0;
        let mut current = node;
        let mut parent = self.tree.parent(node);

        loop {
            let Some(parent_node) = parent else {
                return Err(AnchorError::OutsideRoot);
            };
            if let Some(previous) = self.tree.previous_sibling(current) {
                current = previous;
                index += 1;
                continue;
            }
            reversed.push(index);
            if parent_node == self.root {
                break;
            }
            current = parent_node;
            parent = self.tree.parent(parent_node);
            index = 0;
        }

        reversed.reverse();
        Ok(Path(reversed))
    }

    /// Walks `path` down from the root.
    pub fn node_at(&self, path: &Path) -> Result<T::NodeId, AnchorError> {
        path.indices()
            .iter()
            .enumerate()
            .try_fold(self.root, |node, (depth, &index)| {
                self.tree
                    .child_at(node, index)
                    .ok_or(AnchorError::PathOutOfBounds { depth, index })
            })
    }

    /// Anchors `selection` under `id`, reporting why it was rejected.
    pub fn try_create(
        &self,
        selection: &Selection<T::NodeId>,
        id: RangeId,
        config: RangeConfig,
    ) -> Result<RangeAnchor, AnchorError> {
        let (start_text, end_text) = self.validate_selection(selection)?;
        let Boundary {
            node: start,
            offset: start_offset,
        } = selection.start;
        let Boundary {
            node: end,
            offset: end_offset,
        } = selection.end;

        let start_path = self.path_of(start)?;
        let (end_path, start_snapshot, end_snapshot) = if start == end {
            let snapshot = slice_chars(start_text, start_offset, Some(end_offset)).to_string();
            (start_path.clone(), snapshot.clone(), snapshot)
        } else {
            (
                self.path_of(end)?,
                slice_chars(start_text, start_offset, None).to_string(),
                slice_chars(end_text, 0, Some(end_offset)).to_string(),
            )
        };

        Ok(RangeAnchor {
            id,
            text: selection.text.clone(),
            start: RangeEndpoint {
                path: start_path,
                offset: start_offset,
                text: start_snapshot,
            },
            end: RangeEndpoint {
                path: end_path,
                offset: end_offset,
                text: end_snapshot,
            },
            config,
        })
    }

    /// Anchors `selection` under a freshly generated id, or `None` if the
    /// selection cannot be anchored.
    pub fn create_anchor(
        &self,
        selection: &Selection<T::NodeId>,
        config: RangeConfig,
    ) -> Option<RangeAnchor> {
        self.try_create(selection, RangeId::generate(), config)
            .inspect_err(|err| log::debug!("selection rejected: {err}"))
            .ok()
    }

    /// Resolves both endpoints of `anchor` to live text leaves.
    pub fn try_resolve(
        &self,
        anchor: &RangeAnchor,
    ) -> Result<ResolvedRange<T::NodeId>, AnchorError> {
        let start = self.resolve_endpoint(&anchor.start)?;
        let end = if anchor.end.path == anchor.start.path {
            Boundary::new(start.node, anchor.end.offset)
        } else {
            self.resolve_endpoint(&anchor.end)?
        };
        self.check_offset(end)?;
        self.check_span(start, end)?;
        Ok(ResolvedRange { start, end })
    }

    pub fn resolve_anchor(&self, anchor: &RangeAnchor) -> Option<ResolvedRange<T::NodeId>> {
        self.try_resolve(anchor)
            .inspect_err(|err| log::debug!("anchor {} does not resolve: {err}", anchor.id))
            .ok()
    }

    fn resolve_endpoint(
        &self,
        endpoint: &RangeEndpoint,
    ) -> Result<Boundary<T::NodeId>, AnchorError> {
        let node = self.node_at(&endpoint.path)?;
        if !self.tree.is_text(node) {
            return Err(AnchorError::NotTextLeaf);
        }
        let boundary = Boundary::new(node, endpoint.offset);
        self.check_offset(boundary)?;
        Ok(boundary)
    }

    fn check_offset(&self, boundary: Boundary<T::NodeId>) -> Result<(), AnchorError> {
        let len = self.leaf_len(boundary.node);
        if boundary.offset > len {
            return Err(AnchorError::OffsetOutOfBounds {
                offset: boundary.offset,
                len,
            });
        }
        Ok(())
    }

    /// Checks every rejection rule and hands back both endpoint texts.
    fn validate_selection(
        &self,
        selection: &Selection<T::NodeId>,
    ) -> Result<(&'a str, &'a str), AnchorError> {
        if selection.is_collapsed() {
            return Err(AnchorError::Collapsed);
        }
        let start_text = self.leaf_text(selection.start.node)?;
        let end_text = self.leaf_text(selection.end.node)?;
        self.check_offset(selection.start)?;
        self.check_offset(selection.end)?;
        self.check_span(selection.start, selection.end)?;
        Ok((start_text, end_text))
    }

    /// `end` must follow `start` in document order, with at least one
    /// character between them.
    fn check_span(
        &self,
        start: Boundary<T::NodeId>,
        end: Boundary<T::NodeId>,
    ) -> Result<(), AnchorError> {
        if start.node == end.node {
            return match start.offset.cmp(&end.offset) {
                Ordering::Greater => Err(AnchorError::Reversed),
                Ordering::Equal => Err(AnchorError::Collapsed),
                Ordering::Less => Ok(()),
            };
        }

        let mut leaves = TextLeaves::between(self.tree, start.node, end.node);
        let between: usize = leaves.by_ref().map(|leaf| self.leaf_len(leaf)).sum();
        if !leaves.reached_end() {
            return Err(AnchorError::Reversed);
        }
        let tail = self.leaf_len(start.node).saturating_sub(start.offset);
        if tail + between + end.offset == 0 {
            return Err(AnchorError::Collapsed);
        }
        Ok(())
    }

    fn leaf_len(&self, node: T::NodeId) -> usize {
        self.tree.text(node).map_or(0, char_len)
    }

    fn leaf_text(&self, node: T::NodeId) -> Result<&'a str, AnchorError> {
        let tree: &'a T = self.tree;
        let text = tree.text(node).ok_or(AnchorError::NotTextLeaf)?;
        if !tree.is_inclusive_descendant(node, self.root) {
            return Err(AnchorError::OutsideRoot);
        }
        Ok(text)
    }
}

impl<T: TextGeometry> AnchorResolver<'_, T> {
    /// Rects of the first and last selected characters, for placing
    /// toolbars next to a selection.
    pub fn selection_position(
        &self,
        selection: &Selection<T::NodeId>,
    ) -> Option<SelectionPosition> {
        if let Err(err) = self.validate_selection(selection) {
            log::debug!("no position for selection: {err}");
            return None;
        }
        Some(SelectionPosition {
            start: char_rect(self.tree, selection.start.node, selection.start.offset)?,
            end: char_rect(self.tree, selection.end.node, selection.end.offset)?,
        })
    }
}
