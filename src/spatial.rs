//! Bulk-loadable 2D point index (C1), wrapping `rstar`'s R-tree.
//!
//! `rstar::RTree::bulk_load` gives the same asymptotic behavior as the
//! original's `bgi::rtree<Point2D, bgi::quadratic<16>>` bulk constructor;
//! `rstar` doesn't expose an internal-statistics API, so the byte footprint
//! is an analytic estimate rather than a measured one (documented in
//! DESIGN.md).

use crate::types::{BBox, Point};
use rstar::{RTree, AABB};

/// Estimated per-internal-node bookkeeping overhead (child pointers plus
/// the node's own bounding envelope), at the same branching factor the
/// original pinned for its `quadratic<16>` R-tree.
const NODE_OVERHEAD_BYTES: usize = 64;
const BRANCHING_FACTOR: usize = 16;

pub struct SpatialIndex {
    tree: RTree<[f32; 2]>,
    len: usize,
}

impl SpatialIndex {
    /// Bulk-construct an index from a finite set of points. Order is not
    /// preserved and does not matter — the probe is existence-only.
    pub fn build(points: Vec<Point>) -> Self {
        let len = points.len();
        let raw: Vec<[f32; 2]> = points.into_iter().map(|p| [p.x, p.y]).collect();
        SpatialIndex {
            tree: RTree::bulk_load(raw),
            len,
        }
    }

    /// True iff any stored point lies in the closed box `q`.
    pub fn has_intersection(&self, q: &BBox) -> bool {
        let envelope = AABB::from_corners([q.lo.x, q.lo.y], [q.hi.x, q.hi.y]);
        self.tree.locate_in_envelope(&envelope).next().is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Estimated serialized byte footprint, for the report's index-size field.
    pub fn byte_footprint(&self) -> usize {
        let leaf_bytes = self.len * std::mem::size_of::<[f32; 2]>();
        let internal_nodes = self.len.div_ceil(BRANCHING_FACTOR).max(if self.len > 0 { 1 } else { 0 });
        leaf_bytes + internal_nodes * NODE_OVERHEAD_BYTES
    }
}
