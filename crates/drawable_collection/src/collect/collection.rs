//! Per-frame drawable store
//!
//! Drawables are bucketed by render pass while the traversal runs. After
//! [`DrawableCollection::sort`] (or [`DrawableCollection::concat`]) the
//! buckets are merged into one flat list in pass order, which is what the
//! render loop indexes into.

use std::sync::Arc;

use thiserror::Error;

use super::{Drawable, FrameSetup, RenderContext, SortModes};
use crate::foundation::math::Mat4;
use crate::scene::{GraphState, Shape, SortType};

/// Misuse of the collection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Indexed access before the buckets were merged
    #[error("Collection has not been flattened; call sort() or concat() first")]
    NotFlattened,

    /// Index past the end of the flattened list
    #[error("Drawable index {index} out of range (length {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of drawables
        len: usize,
    },
}

/// Drawables collected for one frame
pub struct DrawableCollection<'a> {
    pub(super) frame: FrameSetup,
    context: Option<&'a mut dyn RenderContext>,
    pub(super) buckets: [Vec<Drawable>; SortType::COUNT],
    draw_list: Vec<Drawable>,
    flattened: bool,
    pub(super) sort_modes: SortModes,
    pub(super) number_of_nodes: usize,
    length: usize,
    setup_failures: usize,
}

impl<'a> DrawableCollection<'a> {
    /// Create an empty collection with no rendering context
    pub fn new(frame: FrameSetup) -> Self {
        Self {
            frame,
            context: None,
            buckets: std::array::from_fn(|_| Vec::new()),
            draw_list: Vec::new(),
            flattened: false,
            sort_modes: SortModes::empty(),
            number_of_nodes: 0,
            length: 0,
            setup_failures: 0,
        }
    }

    /// Create an empty collection that sets up each drawable on `context`
    pub fn with_context(frame: FrameSetup, context: &'a mut dyn RenderContext) -> Self {
        let mut collection = Self::new(frame);
        collection.context = Some(context);
        collection
    }

    /// Build a drawable for `shape` and add it to its pass bucket
    ///
    /// Call after [`cull`](Self::cull) accepted the node so the state holds
    /// this node's bounds and coverage. If a rendering context is attached
    /// the drawable's GPU resources are set up immediately; failures are
    /// logged and counted, the drawable is still kept.
    pub fn add_drawable(&mut self, shape: Arc<dyn Shape>, transform: &Mat4, graph_state: &mut GraphState) {
        if self.flattened {
            log::warn!("add_drawable after flattening; the collection must be sorted again");
            self.unflatten();
        }

        let drawable = Drawable::capture(shape, transform, graph_state, &self.frame.view_matrix);

        if drawable.sort_key() != 0 {
            self.sort_modes.insert(SortModes::SORT_KEY);
        }
        if drawable.priority() != 0.0 {
            self.sort_modes.insert(SortModes::PRIORITY);
        }

        if let Some(context) = self.context.as_deref_mut() {
            if let Err(e) = context.setup_shape(&drawable, &self.frame) {
                log::error!("Failed to set up GPU resources for drawable: {}", e);
                self.setup_failures += 1;
            }
        }

        self.buckets[drawable.sort_type().index()].push(drawable);
        self.length += 1;
    }

    /// Merge the pass buckets into the flat draw list, opaque first
    ///
    /// Does nothing if the collection is already flattened.
    pub fn concat(&mut self) {
        if self.flattened {
            return;
        }

        self.draw_list.reserve(self.length);
        for bucket in &mut self.buckets {
            self.draw_list.append(bucket);
        }
        self.flattened = true;

        log::debug!(
            "Flattened {} drawables ({} nodes survived culling)",
            self.draw_list.len(),
            self.number_of_nodes
        );
    }

    /// Move the flat draw list back into the pass buckets
    ///
    /// Bucket order is preserved since the list holds each pass contiguously.
    pub(super) fn unflatten(&mut self) {
        if !self.flattened {
            return;
        }

        for drawable in self.draw_list.drain(..) {
            self.buckets[drawable.sort_type().index()].push(drawable);
        }
        self.flattened = false;
    }

    /// Drawable at `index` in draw order
    pub fn get(&self, index: usize) -> Result<&Drawable, CollectionError> {
        if !self.flattened {
            return Err(CollectionError::NotFlattened);
        }
        self.draw_list.get(index).ok_or(CollectionError::IndexOutOfRange {
            index,
            len: self.draw_list.len(),
        })
    }

    /// All drawables in draw order
    pub fn iter(&self) -> Result<std::slice::Iter<'_, Drawable>, CollectionError> {
        if !self.flattened {
            return Err(CollectionError::NotFlattened);
        }
        Ok(self.draw_list.iter())
    }

    /// Consume the collection and return the draw list
    pub fn into_draw_list(self) -> Result<Vec<Drawable>, CollectionError> {
        if !self.flattened {
            return Err(CollectionError::NotFlattened);
        }
        Ok(self.draw_list)
    }

    /// Drawables collected so far for one pass; empty once flattened
    pub fn bucket(&self, sort_type: SortType) -> &[Drawable] {
        &self.buckets[sort_type.index()]
    }

    /// Total number of drawables across all passes
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether no drawable was added
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of nodes that survived culling
    pub fn number_of_nodes(&self) -> usize {
        self.number_of_nodes
    }

    /// Number of drawables whose GPU setup failed
    pub fn setup_failures(&self) -> usize {
        self.setup_failures
    }

    /// Whether buckets have been merged into the draw list
    pub fn is_flattened(&self) -> bool {
        self.flattened
    }

    /// Ordering modes discovered from the drawables added so far
    pub fn sort_modes(&self) -> SortModes {
        self.sort_modes
    }

    /// Frame inputs
    pub fn frame(&self) -> &FrameSetup {
        &self.frame
    }
}

impl std::fmt::Debug for DrawableCollection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawableCollection")
            .field("length", &self.length)
            .field("number_of_nodes", &self.number_of_nodes)
            .field("flattened", &self.flattened)
            .field("sort_modes", &self.sort_modes)
            .field("has_context", &self.context.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::ContextError;
    use crate::foundation::math::{Point3, Vec3};
    use crate::scene::{Appearance, PerspectiveViewpoint, ShapeNode};

    fn frame() -> FrameSetup {
        let viewpoint = PerspectiveViewpoint::default();
        let view = Mat4::look_at_rh(&Point3::new(0.0, 0.0, 10.0), &Point3::origin(), &Vec3::y());
        FrameSetup::new(view, viewpoint.projection(1.0), 600.0, &viewpoint)
    }

    fn add(collection: &mut DrawableCollection<'_>, appearance: Option<Appearance>) {
        let mut node = ShapeNode::cuboid("s", Vec3::zeros(), Vec3::repeat(1.0));
        if let Some(appearance) = appearance {
            node = node.with_appearance(appearance);
        }
        let shape = Arc::new(node);
        let mut state = GraphState::new(shape.clone());
        collection.add_drawable(shape, &Mat4::identity(), &mut state);
    }

    #[derive(Default)]
    struct RecordingContext {
        setups: Vec<SortType>,
        fail_transparent: bool,
    }

    impl RenderContext for RecordingContext {
        fn setup_shape(&mut self, drawable: &Drawable, _frame: &FrameSetup) -> Result<(), ContextError> {
            self.setups.push(drawable.sort_type());
            if self.fail_transparent && drawable.sort_type() == SortType::Transparent {
                return Err(ContextError::SetupFailed("no blend state".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_buckets_partition_by_sort_type() {
        let mut collection = DrawableCollection::new(frame());
        add(&mut collection, None);
        add(&mut collection, Some(Appearance::transparent()));
        add(&mut collection, Some(Appearance::new("Opaque")));
        add(&mut collection, Some(Appearance::new("transparent")));
        add(&mut collection, Some(Appearance::transparent()));

        let opaque = collection.bucket(SortType::Opaque).len();
        let transparent = collection.bucket(SortType::Transparent).len();
        assert_eq!(opaque, 2);
        assert_eq!(transparent, 3);
        assert_eq!(collection.len(), opaque + transparent);
        assert!(collection.bucket(SortType::Transparent).iter().all(|d| d.sort_type() == SortType::Transparent));
    }

    #[test]
    fn test_get_before_flatten_is_an_error() {
        let mut collection = DrawableCollection::new(frame());
        add(&mut collection, None);

        assert_eq!(collection.get(0).unwrap_err(), CollectionError::NotFlattened);
        assert!(collection.iter().is_err());

        collection.concat();
        assert!(collection.get(0).is_ok());
        assert_eq!(
            collection.get(1).unwrap_err(),
            CollectionError::IndexOutOfRange { index: 1, len: 1 }
        );
    }

    #[test]
    fn test_concat_places_opaque_first_and_is_idempotent() {
        let mut collection = DrawableCollection::new(frame());
        add(&mut collection, Some(Appearance::transparent()));
        add(&mut collection, None);
        add(&mut collection, Some(Appearance::transparent()));
        add(&mut collection, None);

        collection.concat();
        collection.concat();

        let order: Vec<SortType> = collection.iter().unwrap().map(Drawable::sort_type).collect();
        assert_eq!(
            order,
            vec![SortType::Opaque, SortType::Opaque, SortType::Transparent, SortType::Transparent]
        );
        assert!(collection.bucket(SortType::Opaque).is_empty());
    }

    #[test]
    fn test_concat_with_missing_buckets() {
        let mut collection = DrawableCollection::new(frame());
        collection.concat();
        assert!(collection.is_empty());
        assert_eq!(collection.iter().unwrap().count(), 0);

        let mut collection = DrawableCollection::new(frame());
        add(&mut collection, Some(Appearance::transparent()));
        collection.concat();
        assert_eq!(collection.get(0).unwrap().sort_type(), SortType::Transparent);
    }

    #[test]
    fn test_add_after_flatten_rebuckets() {
        let mut collection = DrawableCollection::new(frame());
        add(&mut collection, Some(Appearance::transparent()));
        collection.concat();

        add(&mut collection, None);
        assert!(!collection.is_flattened());
        assert_eq!(collection.bucket(SortType::Transparent).len(), 1);
        assert_eq!(collection.bucket(SortType::Opaque).len(), 1);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_sort_key_flag_is_discovered() {
        let mut collection = DrawableCollection::new(frame());
        add(&mut collection, None);
        assert!(!collection.sort_modes().contains(SortModes::SORT_KEY));

        add(&mut collection, Some(Appearance::new("opaque").with_sort_key(-3)));
        assert!(collection.sort_modes().contains(SortModes::SORT_KEY));

        add(&mut collection, None);
        assert!(collection.sort_modes().contains(SortModes::SORT_KEY));
    }

    #[test]
    fn test_context_sets_up_every_drawable() {
        let mut context = RecordingContext::default();
        {
            let mut collection = DrawableCollection::with_context(frame(), &mut context);
            add(&mut collection, None);
            add(&mut collection, Some(Appearance::transparent()));
            assert_eq!(collection.setup_failures(), 0);
        }
        assert_eq!(context.setups, vec![SortType::Opaque, SortType::Transparent]);
    }

    #[test]
    fn test_setup_failure_keeps_drawable() {
        let mut context = RecordingContext {
            fail_transparent: true,
            ..Default::default()
        };
        let mut collection = DrawableCollection::with_context(frame(), &mut context);
        add(&mut collection, Some(Appearance::transparent()));
        add(&mut collection, None);

        assert_eq!(collection.setup_failures(), 1);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_without_context_is_a_no_op() {
        let mut collection = DrawableCollection::new(frame());
        add(&mut collection, None);
        assert_eq!(collection.setup_failures(), 0);
        assert_eq!(collection.len(), 1);
    }
}
