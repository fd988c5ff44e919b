//! R-tree candidate lookup for hit testing and culling.
//!
//! Point queries drop from O(n) to O(log n). The index only answers "which
//! shapes contain this point"; ranking between overlapping candidates is the
//! hit tester's job.

use crate::geometry::{Point, Rect};
use crate::shapes::ShapeId;
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// A shape's world bounds as stored in the tree.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub shape_id: ShapeId,
    pub bounds: Rect,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        corners(self.bounds)
    }
}

// Removal looks entries up by id, so equality ignores the bounds
impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.shape_id == other.shape_id
    }
}

fn corners(rect: Rect) -> AABB<[f32; 2]> {
    AABB::from_corners([rect.x, rect.y], [rect.max_x(), rect.max_y()])
}

/// Shape bounds keyed by id, mirrored into an R-tree.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
    by_id: HashMap<ShapeId, SpatialEntry>,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("len", &self.by_id.len())
            .finish()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shapes<I>(shapes: I) -> Self
    where
        I: Iterator<Item = (ShapeId, Rect)>,
    {
        let mut index = Self::new();
        index.rebuild(shapes);
        index
    }

    /// Insert a shape, or move it if already present.
    pub fn upsert(&mut self, shape_id: ShapeId, bounds: Rect) {
        let entry = SpatialEntry { shape_id, bounds };
        if let Some(previous) = self.by_id.insert(shape_id, entry) {
            self.tree.remove(&previous);
        }
        self.tree.insert(entry);
    }

    /// Shapes whose bounds contain `p` (edges inclusive), in no particular order.
    pub fn query_point(&self, p: Point) -> Vec<ShapeId> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([p.x, p.y]))
            .filter(|entry| entry.bounds.contains(p))
            .map(|entry| entry.shape_id)
            .collect()
    }

    /// Shapes intersecting `rect`.
    pub fn query_rect(&self, rect: Rect) -> Vec<ShapeId> {
        self.tree
            .locate_in_envelope_intersecting(&corners(rect))
            .map(|entry| entry.shape_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Replace the whole index in one bulk load.
    pub fn rebuild<I>(&mut self, shapes: I)
    where
        I: Iterator<Item = (ShapeId, Rect)>,
    {
        let entries: Vec<SpatialEntry> = shapes
            .map(|(shape_id, bounds)| SpatialEntry { shape_id, bounds })
            .collect();
        self.by_id = entries.iter().map(|e| (e.shape_id, *e)).collect();
        self.tree = RTree::bulk_load(entries);
    }
}
