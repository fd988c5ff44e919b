//! Shape bounds for nodes and groups, and the store the engine hit-tests against.
//!
//! Bounds are owned by an external layout provider and loaded into a
//! [`BoundsStore`]: insertion-ordered maps keyed by integer id. The engine only
//! ever mutates position fields in place; it never creates or destroys entries.
//! Groups reference their members by id, so a moved member is never stale in a
//! group view.

use crate::geometry::{Point, Rect, point};
use crate::spatial_index::SpatialIndex;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type ShapeId = u64;
pub type NodeId = ShapeId;
pub type GroupId = ShapeId;

/// Presentation record behind a shape's bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeMeta {
    pub title: String,
    /// Declared stacking order; higher draws (and hits) on top
    pub order: i32,
    /// Collapsed/minimized shapes lose hit priority
    pub collapsed: bool,
    /// Optional hex fill override
    pub color: Option<String>,
}

/// World-space bounds of a node or group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeBounds {
    pub id: ShapeId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub meta: ShapeMeta,
}

impl ShapeBounds {
    pub fn new(id: ShapeId, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            meta: ShapeMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: ShapeMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = title.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.meta.order = order;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.meta.collapsed = collapsed;
        self
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[inline]
    pub fn position(&self) -> Point {
        point(self.x, self.y)
    }
}

/// A directed connection between two nodes, drawn by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
}

/// A node or a group, by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Selection {
    Node(NodeId),
    Group(GroupId),
}

impl Selection {
    pub fn id(&self) -> ShapeId {
        match self {
            Selection::Node(id) | Selection::Group(id) => *id,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Selection::Group(_))
    }
}

/// Read-only inspection view of a selection. A group view carries member ids
/// only; member bounds are looked up in the store when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectView {
    Node(NodeId),
    GroupView { group: GroupId, members: Vec<NodeId> },
}

/// Source of initial bounds, group membership and connections.
pub trait LayoutProvider {
    fn node_bounds(&self) -> Vec<ShapeBounds>;
    fn group_bounds(&self) -> Vec<ShapeBounds>;
    fn group_members(&self, group: GroupId) -> Vec<NodeId>;
    fn links(&self) -> Vec<Link> {
        Vec::new()
    }
}

/// Layout provider over fixed data, for hosts that already hold computed bounds.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    pub nodes: Vec<ShapeBounds>,
    pub groups: Vec<ShapeBounds>,
    pub members: HashMap<GroupId, Vec<NodeId>>,
    pub links: Vec<Link>,
}

impl LayoutProvider for StaticLayout {
    fn node_bounds(&self) -> Vec<ShapeBounds> {
        self.nodes.clone()
    }

    fn group_bounds(&self) -> Vec<ShapeBounds> {
        self.groups.clone()
    }

    fn group_members(&self, group: GroupId) -> Vec<NodeId> {
        self.members.get(&group).cloned().unwrap_or_default()
    }

    fn links(&self) -> Vec<Link> {
        self.links.clone()
    }
}

/// Arena of shape bounds keyed by id, with spatial indexes kept in sync.
#[derive(Debug, Default)]
pub struct BoundsStore {
    nodes: IndexMap<NodeId, ShapeBounds>,
    groups: IndexMap<GroupId, ShapeBounds>,
    members: HashMap<GroupId, Vec<NodeId>>,
    links: Vec<Link>,
    node_index: SpatialIndex,
    group_index: SpatialIndex,
    revision: u64,
}

impl BoundsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_provider(provider: &dyn LayoutProvider) -> Self {
        let mut store = Self::new();
        store.reload(provider);
        store
    }

    /// Replace everything with the provider's current layout.
    pub fn reload(&mut self, provider: &dyn LayoutProvider) {
        self.nodes = provider
            .node_bounds()
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        self.groups = provider
            .group_bounds()
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        self.members = self
            .groups
            .keys()
            .map(|&group| (group, provider.group_members(group)))
            .collect();
        self.links = provider.links();
        self.node_index
            .rebuild(self.nodes.values().map(|b| (b.id, b.rect())));
        self.group_index
            .rebuild(self.groups.values().map(|b| (b.id, b.rect())));
        self.revision += 1;
    }

    /// Bumped on every mutation; the renderer redraws when it changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node(&self, id: NodeId) -> Option<&ShapeBounds> {
        self.nodes.get(&id)
    }

    pub fn group(&self, id: GroupId) -> Option<&ShapeBounds> {
        self.groups.get(&id)
    }

    pub fn shape(&self, selection: Selection) -> Option<&ShapeBounds> {
        match selection {
            Selection::Node(id) => self.node(id),
            Selection::Group(id) => self.group(id),
        }
    }

    /// Nodes in layout order.
    pub fn nodes(&self) -> impl Iterator<Item = &ShapeBounds> {
        self.nodes.values()
    }

    /// Groups in layout order.
    pub fn groups(&self) -> impl Iterator<Item = &ShapeBounds> {
        self.groups.values()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Position of a node in layout order, used for hit-test tie-breaks.
    pub fn node_order_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    pub fn group_order_index(&self, id: GroupId) -> Option<usize> {
        self.groups.get_index_of(&id)
    }

    /// Members of a group; empty for unknown groups.
    pub fn members_of(&self, group: GroupId) -> &[NodeId] {
        self.members.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_candidates_at(&self, p: Point) -> Vec<NodeId> {
        self.node_index.query_point(p)
    }

    pub fn group_candidates_at(&self, p: Point) -> Vec<GroupId> {
        self.group_index.query_point(p)
    }

    pub fn nodes_in(&self, rect: Rect) -> Vec<NodeId> {
        self.node_index.query_rect(rect)
    }

    pub fn groups_in(&self, rect: Rect) -> Vec<GroupId> {
        self.group_index.query_rect(rect)
    }

    pub fn position(&self, selection: Selection) -> Option<Point> {
        self.shape(selection).map(ShapeBounds::position)
    }

    /// Move a node or group. Unknown ids are ignored and return false.
    pub fn set_position(&mut self, selection: Selection, p: Point) -> bool {
        let (map, index) = match selection {
            Selection::Node(_) => (&mut self.nodes, &mut self.node_index),
            Selection::Group(_) => (&mut self.groups, &mut self.group_index),
        };
        let Some(bounds) = map.get_mut(&selection.id()) else {
            return false;
        };
        bounds.x = p.x;
        bounds.y = p.y;
        index.upsert(bounds.id, bounds.rect());
        self.revision += 1;
        true
    }

    /// Bounding box of every node and group, for zoom-to-fit.
    pub fn content_bounds(&self) -> Option<Rect> {
        Rect::union_all(
            self.nodes
                .values()
                .chain(self.groups.values())
                .map(ShapeBounds::rect),
        )
    }

    /// Synthesize an inspection view; `None` for unknown ids.
    pub fn inspect(&self, selection: Selection) -> Option<InspectView> {
        match selection {
            Selection::Node(id) => self.nodes.contains_key(&id).then_some(InspectView::Node(id)),
            Selection::Group(id) => self.groups.contains_key(&id).then(|| InspectView::GroupView {
                group: id,
                members: self.members_of(id).to_vec(),
            }),
        }
    }
}
