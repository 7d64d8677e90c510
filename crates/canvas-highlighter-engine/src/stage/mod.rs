//! Spatial index of rendered highlights and the adapter that paints them.
//!
//! The [`Stage`] keeps one [`HighlightRecord`] per highlight in insertion
//! order and mirrors each record as a group on a [`RenderSurface`]. Pointer
//! queries walk the records in that order, so when highlights overlap the
//! one added first wins.

pub mod surface;

use indexmap::IndexMap;

use crate::anchor::RangeConfig;
use crate::geometry::{Point, Rect};
use crate::id::RangeId;
use crate::projector::Projection;
pub use surface::{
    Layer, LayerVisibility, Primitive, RecordedGroup, RecordingSurface, RenderSurface,
};

/// Builds an extra shape for one rect of a highlight from the container-local
/// rect, the highlight id, the highlight's viewport rects and the rect's
/// index among them.
pub type ShapeConstructor<S> = Box<dyn Fn(&Rect, &RangeId, &[Rect], usize) -> S>;

/// What the stage knows about one highlight currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightRecord {
    pub id: RangeId,
    /// Container-local rects.
    pub rects: Vec<Rect>,
    pub config: RangeConfig,
}

impl HighlightRecord {
    pub fn contains(&self, point: Point) -> bool {
        self.rects.iter().any(|rect| rect.contains_point(point))
    }
}

pub struct Stage<S: RenderSurface> {
    surface: S,
    records: IndexMap<RangeId, HighlightRecord>,
    shapes: Vec<ShapeConstructor<S::Shape>>,
}

impl<S: RenderSurface> Stage<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            records: IndexMap::new(),
            shapes: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn add_shape_constructor(&mut self, shape: ShapeConstructor<S::Shape>) {
        self.shapes.push(shape);
    }

    /// Replaces whatever is drawn for `id` with `projection`. A replaced id
    /// moves to the end of the hit-test order, matching its new group's
    /// place on the surface.
    pub fn upsert(&mut self, id: &RangeId, projection: &Projection, config: &RangeConfig) {
        self.records.shift_remove(id);
        if self.surface.has_group(id) {
            self.surface.destroy_group(id);
        }

        self.surface.create_group(
            id,
            LayerVisibility {
                rect: config.rect.visible,
                line: config.line.visible,
            },
        );
        for (index, rect) in projection.rects.iter().enumerate() {
            self.surface.add(
                id,
                Layer::Rect,
                Primitive::Rect {
                    rect: *rect,
                    fill: config.rect.fill.clone(),
                },
            );
            self.surface.add(
                id,
                Layer::Line,
                Primitive::Line {
                    from: Point::new(rect.x, rect.bottom()),
                    to: Point::new(rect.right(), rect.bottom()),
                    stroke: config.line.stroke.clone(),
                    width: config.line.stroke_width,
                },
            );
            for shape in &self.shapes {
                let custom = shape(rect, id, &projection.client_rects, index);
                self.surface.add(id, Layer::Custom, Primitive::Custom(custom));
            }
        }

        self.records.insert(
            id.clone(),
            HighlightRecord {
                id: id.clone(),
                rects: projection.rects.clone(),
                config: config.clone(),
            },
        );
    }

    /// Drops the record and its group; false if `id` was not present.
    pub fn remove(&mut self, id: &RangeId) -> bool {
        if self.records.shift_remove(id).is_none() {
            return false;
        }
        self.surface.destroy_group(id);
        true
    }

    pub fn clear(&mut self) {
        self.surface.clear();
        self.records.clear();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface.resize(width, height);
    }

    pub fn get(&self, id: &RangeId) -> Option<&HighlightRecord> {
        self.records.get(id)
    }

    /// Container-local rects currently indexed for `id`.
    pub fn positions(&self, id: &RangeId) -> Option<&[Rect]> {
        self.records.get(id).map(|record| record.rects.as_slice())
    }

    pub fn records(&self) -> impl Iterator<Item = &HighlightRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First highlight, in insertion order, containing the viewport point
    /// `(x, y)`. `container` is the container's current viewport box.
    pub fn hit_test(&self, x: f32, y: f32, container: &Rect) -> Option<&RangeId> {
        let point = Self::to_local(x, y, container);
        self.records
            .values()
            .find(|record| record.contains(point))
            .map(|record| &record.id)
    }

    /// Every highlight containing the viewport point, in insertion order.
    pub fn hit_test_all(&self, x: f32, y: f32, container: &Rect) -> Vec<&RangeId> {
        let point = Self::to_local(x, y, container);
        self.records
            .values()
            .filter(|record| record.contains(point))
            .map(|record| &record.id)
            .collect()
    }

    fn to_local(x: f32, y: f32, container: &Rect) -> Point {
        Point::new(x - container.x, y - container.y)
    }
}
