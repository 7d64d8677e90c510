use std::collections::HashMap;

use indextree::{Arena, NodeEdge, NodeId};

use super::{Display, NodeKind, TextMetrics};
use crate::geometry::Rect;

/// Character boxes of one text leaf in document coordinates.
#[derive(Debug, Clone, Default)]
pub(crate) struct LeafBoxes {
    pub chars: Vec<Rect>,
    /// Zero-width box where the leaf starts; used when it has no characters.
    pub caret: Rect,
}

impl LeafBoxes {
    /// Zero-width box in front of character `offset` (or after the last one).
    pub fn caret_at(&self, offset: usize) -> Rect {
        match (self.chars.get(offset), self.chars.last()) {
            (Some(rect), _) => Rect::new(rect.x, rect.y, 0.0, rect.height),
            (None, Some(last)) => Rect::new(last.right(), last.y, 0.0, last.height),
            (None, None) => self.caret,
        }
    }

    /// One rect per visual line covered by characters `start..end`.
    pub fn line_rects(&self, start: usize, end: usize) -> Vec<Rect> {
        let end = end.min(self.chars.len());
        if start >= end {
            return vec![self.caret_at(start)];
        }
        let mut lines: Vec<Rect> = Vec::new();
        for rect in &self.chars[start..end] {
            match lines.last_mut() {
                Some(line) if line.y == rect.y => *line = line.union(rect),
                _ => lines.push(*rect),
            }
        }
        lines
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    pub leaves: HashMap<NodeId, LeafBoxes>,
    pub height: f32,
}

/// Monospace inline flow: characters advance by a fixed width and wrap when
/// they would cross `width`; block elements open and close lines;
/// whitespace-only leaves collapse to zero width.
pub(crate) struct FlowLayout {
    width: f32,
    metrics: TextMetrics,
    x: f32,
    y: f32,
}

impl FlowLayout {
    pub fn compute(
        arena: &Arena<NodeKind>,
        root: NodeId,
        width: f32,
        metrics: TextMetrics,
    ) -> Layout {
        let mut flow = FlowLayout {
            width,
            metrics,
            x: 0.0,
            y: 0.0,
        };
        let mut layout = Layout::default();

        for edge in root.traverse(arena) {
            match edge {
                NodeEdge::Start(id) => match arena[id].get() {
                    NodeKind::Element {
                        display: Display::Block,
                        ..
                    } => flow.break_line(),
                    NodeKind::Element { .. } => {}
                    NodeKind::Text(text) => {
                        layout.leaves.insert(id, flow.place_text(text));
                    }
                },
                NodeEdge::End(id) => {
                    if let NodeKind::Element {
                        display: Display::Block,
                        ..
                    } = arena[id].get()
                    {
                        flow.break_line();
                    }
                }
            }
        }

        layout.height = flow.y + if flow.x > 0.0 { metrics.line_height } else { 0.0 };
        layout
    }

    fn break_line(&mut self) {
        if self.x > 0.0 {
            self.x = 0.0;
            self.y += self.metrics.line_height;
        }
    }

    fn place_text(&mut self, text: &str) -> LeafBoxes {
        let line_height = self.metrics.line_height;
        let caret = Rect::new(self.x, self.y, 0.0, line_height);

        if text.trim().is_empty() {
            let chars = text
                .chars()
                .map(|_| Rect::new(self.x, self.y, 0.0, line_height))
                .collect();
            return LeafBoxes { chars, caret };
        }

        let char_width = self.metrics.char_width;
        let chars = text
            .chars()
            .map(|_| {
                if self.x > 0.0 && self.x + char_width > self.width {
                    self.x = 0.0;
                    self.y += line_height;
                }
                let rect = Rect::new(self.x, self.y, char_width, line_height);
                self.x += char_width;
                rect
            })
            .collect();
        LeafBoxes { chars, caret }
    }
}
