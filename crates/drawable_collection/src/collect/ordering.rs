//! Draw ordering
//!
//! Each pass bucket is stable-sorted with its own comparator, then the
//! buckets are merged in pass order. Which keys take part is decided from
//! the data: the collection records a monotonic [`SortModes`] set while
//! drawables are added, and `sort()` freezes it into a [`SortPolicy`] before
//! the first comparison.

use std::cmp::Ordering;

use bitflags::bitflags;

use super::{Drawable, DrawableCollection};
use crate::config::CullingSettings;
use crate::scene::SortType;

bitflags! {
    /// Ordering keys discovered during collection
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SortModes: u8 {
        /// Some drawable carries a non-zero sort key
        const SORT_KEY = 1 << 0;
        /// Some drawable carries a non-zero priority
        const PRIORITY = 1 << 1;
    }
}

/// Frame-wide comparator policy, fixed for the duration of a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortPolicy {
    /// Order by sort key first
    pub by_sort_key: bool,
    /// Order transparent drawables by priority before depth
    pub by_priority: bool,
}

impl SortPolicy {
    /// Resolve the policy from the discovered modes
    pub fn from_modes(modes: SortModes) -> Self {
        Self {
            by_sort_key: modes.contains(SortModes::SORT_KEY),
            by_priority: modes.contains(SortModes::PRIORITY),
        }
    }

    /// Compare two drawables of the same pass
    pub fn compare(&self, sort_type: SortType, a: &Drawable, b: &Drawable) -> Ordering {
        match sort_type {
            SortType::Opaque => self.compare_opaque(a, b),
            SortType::Transparent => self.compare_transparent(a, b),
        }
    }

    /// Sort key (if enabled and different), else priority
    pub fn compare_opaque(&self, a: &Drawable, b: &Drawable) -> Ordering {
        if self.by_sort_key && a.sort_key() != b.sort_key() {
            return a.sort_key().cmp(&b.sort_key());
        }
        compare_f32(a.priority(), b.priority())
    }

    /// Sort key, then priority (each if enabled and different), then depth
    ///
    /// Ascending eye-space z: in a right-handed eye space the camera looks
    /// down -Z, so the farthest drawable comes first.
    pub fn compare_transparent(&self, a: &Drawable, b: &Drawable) -> Ordering {
        if self.by_sort_key && a.sort_key() != b.sort_key() {
            return a.sort_key().cmp(&b.sort_key());
        }
        if self.by_priority && a.priority() != b.priority() {
            return compare_f32(a.priority(), b.priority());
        }
        compare_f32(a.z_pos().unwrap_or_default(), b.z_pos().unwrap_or_default())
    }
}

/// Float ordering that treats -0 and 0 as equal and still orders NaN
fn compare_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

fn pass_sorting_enabled(settings: &CullingSettings, sort_type: SortType) -> bool {
    match sort_type {
        SortType::Opaque => settings.sort_opaque,
        SortType::Transparent => settings.sort_transparent,
    }
}

impl DrawableCollection<'_> {
    /// Sort every enabled pass and merge the passes into the draw list
    ///
    /// Leaves the collection flattened; no separate [`concat`](Self::concat)
    /// is needed. Drawables equal on every active key keep their insertion
    /// order, and sorting an already sorted collection changes nothing.
    pub fn sort(&mut self) {
        self.unflatten();

        let policy = SortPolicy::from_modes(self.sort_modes);

        for sort_type in SortType::ALL {
            if !pass_sorting_enabled(&self.frame.settings, sort_type) {
                continue;
            }
            self.buckets[sort_type.index()].sort_by(|a, b| policy.compare(sort_type, a, b));
        }

        log::debug!(
            "Sorted {} opaque / {} transparent drawables with {:?}",
            self.buckets[SortType::Opaque.index()].len(),
            self.buckets[SortType::Transparent.index()].len(),
            policy
        );

        self.concat();
    }
}
