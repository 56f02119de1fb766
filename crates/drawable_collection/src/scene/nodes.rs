//! Scene node interfaces consumed by the collection
//!
//! The traversal hands the collection nodes that own a bounding volume
//! ([`BoundedNode`]) and, for leaves, renderable shapes ([`Shape`]). Shapes
//! are shared: the same node can back several drawables in one frame when
//! it is instanced under different transforms.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use crate::foundation::math::{Point3, Vec3};
use crate::scene::BoxVolume;

/// A scene node that owns a local bounding volume
pub trait BoundedNode: Send + Sync {
    /// Local-space bounds; computed on first access and cached by the node
    fn volume(&self) -> Arc<BoxVolume>;
}

/// A renderable leaf node
pub trait Shape: BoundedNode + fmt::Debug {
    /// Geometric center in local space
    fn center(&self) -> Point3;

    /// Appearance configuration, if one is attached
    fn appearance(&self) -> Option<&Appearance>;
}

/// Render pass a drawable is collected into
///
/// Variants are listed in merge order: every `Opaque` drawable is drawn
/// before every `Transparent` one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SortType {
    /// Depth-tested geometry without blending
    #[default]
    Opaque,
    /// Blended geometry, drawn back to front
    Transparent,
}

impl SortType {
    /// All passes in merge order
    pub const ALL: [SortType; 2] = [SortType::Opaque, SortType::Transparent];

    /// Number of passes
    pub const COUNT: usize = Self::ALL.len();

    /// Lowercase pass name as used in appearance configuration
    pub fn as_str(self) -> &'static str {
        match self {
            SortType::Opaque => "opaque",
            SortType::Transparent => "transparent",
        }
    }

    /// Position of this pass in merge order
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised render pass name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort type: {0}")]
pub struct UnknownSortType(pub String);

impl FromStr for SortType {
    type Err = UnknownSortType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownSortType(s.to_string()))
    }
}

/// Render-ordering part of a shape's appearance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appearance {
    /// Pass name, matched case-insensitively ("opaque", "Transparent", ...)
    pub sort_type: String,
    /// Explicit ordering hint; lower keys draw first
    pub sort_key: i32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            sort_type: SortType::Opaque.as_str().to_string(),
            sort_key: 0,
        }
    }
}

impl Appearance {
    /// Create an appearance for a pass with the default sort key
    pub fn new(sort_type: impl Into<String>) -> Self {
        Self {
            sort_type: sort_type.into(),
            sort_key: 0,
        }
    }

    /// Shorthand for a transparent appearance
    pub fn transparent() -> Self {
        Self::new(SortType::Transparent.as_str())
    }

    /// Set the sort key
    pub fn with_sort_key(mut self, sort_key: i32) -> Self {
        self.sort_key = sort_key;
        self
    }

    /// Resolve the pass name
    ///
    /// Unknown names fall back to [`SortType::Opaque`]; they have no slot in
    /// the merge order and would otherwise never be drawn.
    pub fn resolve_sort_type(&self) -> SortType {
        self.sort_type.parse().unwrap_or_else(|e: UnknownSortType| {
            log::warn!("{e}, drawing as opaque");
            SortType::Opaque
        })
    }
}

/// Basic shape node backed by a vertex position list
#[derive(Debug)]
pub struct ShapeNode {
    name: String,
    positions: Vec<Vec3>,
    appearance: Option<Appearance>,
    volume: OnceLock<Arc<BoxVolume>>,
}

impl ShapeNode {
    /// Create a shape from its local-space vertex positions
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            positions,
            appearance: None,
            volume: OnceLock::new(),
        }
    }

    /// Axis-aligned box shape centered on `center`
    pub fn cuboid(name: impl Into<String>, center: Vec3, extents: Vec3) -> Self {
        let positions = [-1.0_f32, 1.0]
            .iter()
            .flat_map(|&x| [-1.0_f32, 1.0].map(|y| (x, y)))
            .flat_map(|(x, y)| [-1.0_f32, 1.0].map(|z| Vec3::new(x, y, z)))
            .map(|corner| center + corner.component_mul(&extents))
            .collect();
        Self::new(name, positions)
    }

    /// Attach an appearance
    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = Some(appearance);
        self
    }

    /// Node name, for diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the bounding volume has been computed yet
    pub fn has_cached_volume(&self) -> bool {
        self.volume.get().is_some()
    }
}

impl BoundedNode for ShapeNode {
    fn volume(&self) -> Arc<BoxVolume> {
        self.volume
            .get_or_init(|| Arc::new(BoxVolume::from_points(self.positions.iter())))
            .clone()
    }
}

impl Shape for ShapeNode {
    fn center(&self) -> Point3 {
        Point3::from(self.volume().center())
    }

    fn appearance(&self) -> Option<&Appearance> {
        self.appearance.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_type_parse_is_case_insensitive() {
        assert_eq!("opaque".parse::<SortType>().unwrap(), SortType::Opaque);
        assert_eq!("Transparent".parse::<SortType>().unwrap(), SortType::Transparent);
        assert_eq!(" TRANSPARENT ".parse::<SortType>().unwrap(), SortType::Transparent);
        assert!("additive".parse::<SortType>().is_err());
    }

    #[test]
    fn test_merge_order_matches_indices() {
        assert!(SortType::Opaque < SortType::Transparent);
        for (i, t) in SortType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn test_unknown_pass_falls_back_to_opaque() {
        let appearance = Appearance::new("sorted_additive").with_sort_key(3);
        assert_eq!(appearance.resolve_sort_type(), SortType::Opaque);
    }

    #[test]
    fn test_volume_is_lazy_and_shared() {
        let shape = ShapeNode::cuboid("box", Vec3::new(1.0, 2.0, 3.0), Vec3::repeat(0.5));
        assert!(!shape.has_cached_volume());

        let first = shape.volume();
        assert!(shape.has_cached_volume());
        let second = shape.volume();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(first.max, Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(shape.center(), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_shape_without_appearance() {
        let shape = ShapeNode::new("empty", Vec::new());
        assert!(shape.appearance().is_none());
        assert!(!shape.volume().is_valid());
    }
}
