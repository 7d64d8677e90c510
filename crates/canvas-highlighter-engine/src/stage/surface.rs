//! Drawing backend abstraction.

use canvas_highlighter_config::ContainerPosition;
use indexmap::IndexMap;

use crate::geometry::{Point, Rect};
use crate::id::RangeId;

/// Sub-layer of a highlight group. Rect and line layers can be hidden
/// independently; custom shapes are always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Rect,
    Line,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub rect: bool,
    pub line: bool,
}

impl LayerVisibility {
    pub fn is_visible(&self, layer: Layer) -> bool {
        match layer {
            Layer::Rect => self.rect,
            Layer::Line => self.line,
            Layer::Custom => true,
        }
    }
}

/// One drawable item added to a group.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive<S> {
    Rect { rect: Rect, fill: String },
    Line { from: Point, to: Point, stroke: String, width: f32 },
    Custom(S),
}

/// A drawing surface stacked over the highlight container. Shapes are
/// organised in groups named after the highlight they belong to.
pub trait RenderSurface {
    /// Whatever custom shape constructors produce for this backend.
    type Shape;

    /// Attaches the surface to the container.
    fn mount(
        &mut self,
        position: ContainerPosition,
        width: f32,
        height: f32,
        pixel_ratio: Option<f32>,
    );

    fn resize(&mut self, width: f32, height: f32);

    fn create_group(&mut self, id: &RangeId, visibility: LayerVisibility);

    /// Removes a group and everything in it. Returns false if there was none.
    fn destroy_group(&mut self, id: &RangeId) -> bool;

    fn has_group(&self, id: &RangeId) -> bool;

    fn add(&mut self, id: &RangeId, layer: Layer, primitive: Primitive<Self::Shape>);

    /// Destroys every group.
    fn clear(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedGroup<S> {
    pub visibility: LayerVisibility,
    pub primitives: Vec<(Layer, Primitive<S>)>,
}

impl<S> RecordedGroup<S> {
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Primitive<S>> {
        self.primitives
            .iter()
            .filter(move |(candidate, _)| *candidate == layer)
            .map(|(_, primitive)| primitive)
    }

    /// Primitives that would actually be painted.
    pub fn visible(&self) -> impl Iterator<Item = &Primitive<S>> {
        self.primitives
            .iter()
            .filter(|(layer, _)| self.visibility.is_visible(*layer))
            .map(|(_, primitive)| primitive)
    }
}

/// Surface that keeps the scene in memory instead of painting it.
#[derive(Debug, Clone)]
pub struct RecordingSurface<S = ()> {
    pub position: Option<ContainerPosition>,
    pub size: (f32, f32),
    pub pixel_ratio: Option<f32>,
    groups: IndexMap<RangeId, RecordedGroup<S>>,
}

impl<S> Default for RecordingSurface<S> {
    fn default() -> Self {
        Self {
            position: None,
            size: (0.0, 0.0),
            pixel_ratio: None,
            groups: IndexMap::new(),
        }
    }
}

impl<S> RecordingSurface<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, id: &RangeId) -> Option<&RecordedGroup<S>> {
        self.groups.get(id)
    }

    /// Group ids in paint order.
    pub fn group_ids(&self) -> impl Iterator<Item = &RangeId> {
        self.groups.keys()
    }
}

impl<S> RenderSurface for RecordingSurface<S> {
    type Shape = S;

    fn mount(
        &mut self,
        position: ContainerPosition,
        width: f32,
        height: f32,
        pixel_ratio: Option<f32>,
    ) {
        self.position = Some(position);
        self.size = (width, height);
        self.pixel_ratio = pixel_ratio;
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.size = (width, height);
    }

    fn create_group(&mut self, id: &RangeId, visibility: LayerVisibility) {
        self.groups.insert(
            id.clone(),
            RecordedGroup {
                visibility,
                primitives: Vec::new(),
            },
        );
    }

    fn destroy_group(&mut self, id: &RangeId) -> bool {
        self.groups.shift_remove(id).is_some()
    }

    fn has_group(&self, id: &RangeId) -> bool {
        self.groups.contains_key(id)
    }

    fn add(&mut self, id: &RangeId, layer: Layer, primitive: Primitive<S>) {
        match self.groups.get_mut(id) {
            Some(group) => group.primitives.push((layer, primitive)),
            None => log::warn!("dropping primitive for missing group {id}"),
        }
    }

    fn clear(&mut self) {
        self.groups.clear();
    }
}
