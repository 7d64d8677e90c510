/*!
 * # Canvas highlighter engine
 *
 * Persistent text highlights drawn over a rendered document.
 *
 * ## Pipeline
 *
 * 1. **Anchor** (`anchor`): a live [`Selection`] becomes a [`RangeAnchor`],
 *    plain data that addresses both ends by child-index paths from the
 *    highlight root. Anchors can be stored anywhere and resolved later as
 *    long as the tree keeps its shape.
 * 2. **Project** (`projector`): an anchor is resolved and turned into the
 *    container-local rects it covers, one per line box per leaf, skipping
 *    leaves that collapse to nothing.
 * 3. **Stage** (`stage`): rects are indexed per highlight in insertion order
 *    and painted on a [`RenderSurface`] as a rect layer, an underline layer
 *    and any custom shapes.
 * 4. **Query**: pointer coordinates are hit-tested against the index.
 *
 * [`Highlighter`] wires the steps together for one container and re-runs
 * projection when the container is resized or scrolled.
 *
 * ```rust
 * use canvas_highlighter_config::HighlighterConfig;
 * use canvas_highlighter_engine::{Display, DocumentBuilder, Highlighter, RecordingSurface};
 *
 * let mut builder = DocumentBuilder::new(400.0);
 * builder.element("p", Display::Block, |p| {
 *     p.text("Hello World");
 * });
 * let doc = builder.build();
 * let leaf = doc.find_text("Hello World").unwrap();
 * let selection = doc.selection(leaf, 2, leaf, 6);
 * let root = doc.root();
 *
 * let mut highlighter = Highlighter::new(
 *     doc,
 *     root,
 *     RecordingSurface::<()>::new(),
 *     HighlighterConfig::default(),
 * );
 * let anchor = highlighter.selection_range(&selection).unwrap();
 * let id = anchor.id.clone();
 * assert!(highlighter.add_range(anchor));
 * assert_eq!(highlighter.range_id_at_point(35.0, 10.0), Some(id));
 * ```
 */

pub mod anchor;
pub mod debounce;
pub mod document;
pub mod geometry;
pub mod highlighter;
pub mod id;
pub mod projector;
pub mod stage;
pub mod tree;

pub use anchor::{
    AnchorError, AnchorResolver, LineStyle, Path, RangeAnchor, RangeConfig, RangeEndpoint,
    RectStyle, ResolvedRange, SelectionPosition,
};
pub use debounce::Debouncer;
pub use document::{Display, Document, DocumentBuilder, NodeKind, TextMetrics};
pub use geometry::{Point, Rect, TextLeaves};
pub use highlighter::Highlighter;
pub use id::RangeId;
pub use projector::{Projection, Projector};
pub use stage::{
    HighlightRecord, Layer, LayerVisibility, Primitive, RecordedGroup, RecordingSurface,
    RenderSurface, ShapeConstructor, Stage,
};
pub use tree::{Boundary, DocumentTree, Selection, TextGeometry};
