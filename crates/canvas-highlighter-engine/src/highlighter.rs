use std::time::Instant;

use canvas_highlighter_config::HighlighterConfig;

use crate::anchor::{AnchorResolver, RangeAnchor, RangeConfig, SelectionPosition};
use crate::debounce::Debouncer;
use crate::geometry::Rect;
use crate::id::RangeId;
use crate::projector::Projector;
use crate::stage::{RenderSurface, ShapeConstructor, Stage};
use crate::tree::{Selection, TextGeometry};

/// Public entry point: keeps the list of highlights for one container and
/// keeps the drawing surface in step with it.
///
/// All mutation goes through `&mut self`, so a `render_ranges` replace is
/// never observable half-done; hosts that share a highlighter between
/// threads put it behind a lock.
pub struct Highlighter<T: TextGeometry, S: RenderSurface> {
    tree: T,
    root: T::NodeId,
    config: HighlighterConfig,
    stage: Stage<S>,
    ranges: Vec<RangeAnchor>,
    resize: Debouncer,
    scroll: Debouncer,
}

impl<T: TextGeometry, S: RenderSurface> Highlighter<T, S> {
    /// Creates a highlighter for the container `root` and mounts `surface`
    /// over it.
    pub fn new(tree: T, root: T::NodeId, mut surface: S, config: HighlighterConfig) -> Self {
        let container = tree.bounding_box(root);
        surface.mount(
            config.position,
            container.width,
            container.height,
            config.pixel_ratio,
        );
        Self {
            resize: Debouncer::new(config.delay()),
            scroll: Debouncer::new(config.delay()),
            tree,
            root,
            config,
            stage: Stage::new(surface),
            ranges: Vec::new(),
        }
    }

    /// Registers a constructor for extra shapes drawn with every highlight
    /// rect added from now on.
    pub fn with_shape_constructor(mut self, shape: ShapeConstructor<S::Shape>) -> Self {
        self.stage.add_shape_constructor(shape);
        self
    }

    pub fn config(&self) -> &HighlighterConfig {
        &self.config
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable access for hosts that reflow or scroll the document; follow
    /// with [`Highlighter::refresh_geometry`] or a debounced notification.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn root(&self) -> T::NodeId {
        self.root
    }

    pub fn stage(&self) -> &Stage<S> {
        &self.stage
    }

    pub fn surface(&self) -> &S {
        self.stage.surface()
    }

    /// Anchors `selection` with the default render settings and an id not
    /// used by any current highlight. The anchor is not added.
    pub fn selection_range(&self, selection: &Selection<T::NodeId>) -> Option<RangeAnchor> {
        let id = RangeId::generate_unique(|candidate| self.get_range(candidate).is_some());
        self.resolver()
            .try_create(selection, id, RangeConfig::from(&self.config))
            .inspect_err(|err| log::debug!("selection rejected: {err}"))
            .ok()
    }

    pub fn selection_position(
        &self,
        selection: &Selection<T::NodeId>,
    ) -> Option<SelectionPosition> {
        self.resolver().selection_position(selection)
    }

    /// Draws `anchor` and adds it to the list. Returns false, leaving
    /// everything untouched, when the anchor covers no rects or its id is
    /// already in use.
    pub fn add_range(&mut self, anchor: RangeAnchor) -> bool {
        if self.get_range(&anchor.id).is_some() {
            log::debug!("range {} is already highlighted", anchor.id);
            return false;
        }
        let projection = Projector::new(&self.tree, self.root).project(&anchor);
        if projection.is_empty() {
            log::debug!("range {} covers nothing, not added", anchor.id);
            return false;
        }
        self.stage.upsert(&anchor.id, &projection, &anchor.config);
        self.ranges.push(anchor);
        true
    }

    pub fn get_range(&self, id: &RangeId) -> Option<&RangeAnchor> {
        self.ranges.iter().find(|range| &range.id == id)
    }

    pub fn delete_range(&mut self, id: &RangeId) -> bool {
        let Some(index) = self.ranges.iter().position(|range| &range.id == id) else {
            return false;
        };
        self.ranges.remove(index);
        self.stage.remove(id);
        true
    }

    /// Deletes the range with `anchor.id` and adds `anchor` in its place.
    ///
    /// Not atomic: if the new anchor covers nothing the old highlight is
    /// still gone and this returns false.
    pub fn update_range(&mut self, anchor: RangeAnchor) -> bool {
        self.delete_range(&anchor.id);
        self.add_range(anchor)
    }

    pub fn get_all_ranges(&self) -> Vec<RangeAnchor> {
        self.ranges.clone()
    }

    /// Replaces every highlight with `anchors`. Returns how many were drawn;
    /// anchors that cover nothing are skipped.
    pub fn render_ranges(&mut self, anchors: Vec<RangeAnchor>) -> usize {
        self.clear();
        let mut drawn = 0;
        for anchor in anchors {
            if self.add_range(anchor) {
                drawn += 1;
            }
        }
        drawn
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
        self.stage.clear();
    }

    /// Container-local rects currently drawn for `id`.
    pub fn range_positions(&self, id: &RangeId) -> Option<Vec<Rect>> {
        self.stage.positions(id).map(<[Rect]>::to_vec)
    }

    /// The highlight under viewport point `(x, y)`; the earliest added wins
    /// when several overlap.
    pub fn range_id_at_point(&self, x: f32, y: f32) -> Option<RangeId> {
        self.stage.hit_test(x, y, &self.container()).cloned()
    }

    /// Every highlight under viewport point `(x, y)`, in the order they were
    /// added.
    pub fn range_ids_at_point(&self, x: f32, y: f32) -> Vec<RangeId> {
        self.stage
            .hit_test_all(x, y, &self.container())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Resizes the surface to the container and re-projects every stored
    /// anchor. Anchors that no longer cover anything are dropped.
    pub fn refresh_geometry(&mut self) {
        let container = self.container();
        self.stage.resize(container.width, container.height);

        let anchors = std::mem::take(&mut self.ranges);
        let total = anchors.len();
        let ids: Vec<RangeId> = anchors.iter().map(|anchor| anchor.id.clone()).collect();
        let drawn = self.render_ranges(anchors);
        if drawn < total {
            for id in ids.iter().filter(|id| self.get_range(id).is_none()) {
                log::warn!("range {id} no longer resolves and was dropped");
            }
        }
        log::info!(
            "geometry refreshed for {}x{} container: {drawn}/{total} ranges drawn",
            container.width,
            container.height
        );
    }

    /// Reports a container resize; the refresh happens on a later
    /// [`Highlighter::poll`] once resizing has settled.
    pub fn notify_resize(&mut self, now: Instant) {
        self.resize.trigger(now);
    }

    /// Reports a container scroll, debounced like resizes.
    pub fn notify_scroll(&mut self, now: Instant) {
        self.scroll.trigger(now);
    }

    /// Runs any debounced refresh that is due. A resize and a scroll that
    /// settle together cause a single refresh. Returns whether one ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        let resized = self.resize.fire_if_due(now);
        let scrolled = self.scroll.fire_if_due(now);
        if resized || scrolled {
            self.refresh_geometry();
        }
        resized || scrolled
    }

    /// Earliest instant at which [`Highlighter::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.resize.deadline(), self.scroll.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn container(&self) -> Rect {
        self.tree.bounding_box(self.root)
    }

    fn resolver(&self) -> AnchorResolver<'_, T> {
        AnchorResolver::new(&self.tree, self.root)
    }
}
