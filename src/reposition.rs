//! Reposition mode: grid-assisted dragging of nodes and groups.
//!
//! A session snapshots the position of everything it touches the first time it
//! is touched. `cancel()` writes those snapshots back; `commit()` hands the
//! accumulated [`ChangeLog`] to the caller and forgets them. Positions live in
//! the shared [`BoundsStore`], which is written in place during the drag so the
//! renderer shows the shape moving.

use crate::constants::{CHANGE_EPSILON, WRITE_EPSILON};
use crate::geometry::{Point, Vector, point};
use crate::settings::GridSettings;
use crate::shapes::{BoundsStore, GroupId, NodeId, Selection, ShapeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// One moved shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionChange {
    pub id: ShapeId,
    pub original_position: Point,
    pub new_position: Point,
}

/// Pending position changes of a reposition session, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    pub node_changes: Vec<PositionChange>,
    pub group_changes: Vec<PositionChange>,
}

impl ChangeLog {
    fn list_mut(&mut self, selection: Selection) -> &mut Vec<PositionChange> {
        match selection {
            Selection::Node(_) => &mut self.node_changes,
            Selection::Group(_) => &mut self.group_changes,
        }
    }

    /// Replace the entry for this id, or append a new one.
    fn upsert(&mut self, selection: Selection, original: Point, new: Point) {
        let list = self.list_mut(selection);
        let change = PositionChange {
            id: selection.id(),
            original_position: original,
            new_position: new,
        };
        match list.iter_mut().find(|c| c.id == change.id) {
            Some(existing) => *existing = change,
            None => list.push(change),
        }
    }

    fn remove(&mut self, selection: Selection) {
        self.list_mut(selection).retain(|c| c.id != selection.id());
    }

    pub fn is_empty(&self) -> bool {
        self.node_changes.is_empty() && self.group_changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.node_changes.len() + self.group_changes.len()
    }

    pub fn clear(&mut self) {
        self.node_changes.clear();
        self.group_changes.clear();
    }
}

/// The shape currently being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositionSession {
    pub selection: Selection,
    /// Position when this selection was made; drags are relative to it
    pub original_position: Point,
    pub current_position: Point,
    /// Group members and their positions when the group was selected
    pub member_positions: Vec<(NodeId, Point)>,
}

#[derive(Debug, Clone)]
pub struct RepositionController {
    active: bool,
    grid_snap: bool,
    grid: GridSettings,
    session: Option<RepositionSession>,
    /// First-touch snapshot of every shape moved since `enter()`
    snapshots: IndexMap<Selection, Point>,
    changes: ChangeLog,
}

impl Default for RepositionController {
    fn default() -> Self {
        Self::new(&GridSettings::default())
    }
}

impl RepositionController {
    pub fn new(grid: &GridSettings) -> Self {
        Self {
            active: false,
            grid_snap: grid.snap_by_default,
            grid: grid.clone(),
            session: None,
            snapshots: IndexMap::new(),
            changes: ChangeLog::default(),
        }
    }

    pub fn apply_settings(&mut self, grid: &GridSettings) {
        self.grid = grid.clone();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn grid_snap_enabled(&self) -> bool {
        self.grid_snap
    }

    pub fn grid(&self) -> &GridSettings {
        &self.grid
    }

    pub fn session(&self) -> Option<&RepositionSession> {
        self.session.as_ref()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.session.as_ref().map(|s| s.selection)
    }

    pub fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    /// Start reposition mode, discarding any previous session state.
    pub fn enter(&mut self) {
        self.active = true;
        self.grid_snap = self.grid.snap_by_default;
        self.session = None;
        self.snapshots.clear();
        self.changes.clear();
        debug!("Entered reposition mode");
    }

    pub fn select_node(&mut self, id: NodeId, store: &BoundsStore) -> bool {
        self.select(Selection::Node(id), store)
    }

    pub fn select_group(&mut self, id: GroupId, store: &BoundsStore) -> bool {
        self.select(Selection::Group(id), store)
    }

    /// Snapshot the selection (and group members) and make it the drag target.
    pub fn select(&mut self, selection: Selection, store: &BoundsStore) -> bool {
        if !self.active {
            return false;
        }
        let Some(position) = store.position(selection) else {
            return false;
        };
        self.snapshots.entry(selection).or_insert(position);

        let member_positions: Vec<(NodeId, Point)> = match selection {
            Selection::Group(group) => store
                .members_of(group)
                .iter()
                .filter_map(|&m| store.node(m).map(|b| (m, b.position())))
                .collect(),
            Selection::Node(_) => Vec::new(),
        };
        for &(member, p) in &member_positions {
            self.snapshots.entry(Selection::Node(member)).or_insert(p);
        }

        debug!(?selection, members = member_positions.len(), "Reposition selection");
        self.session = Some(RepositionSession {
            selection,
            original_position: position,
            current_position: position,
            member_positions,
        });
        true
    }

    /// Magnetic snap of one axis to the nearest grid line.
    pub fn snap_axis(&self, value: f32) -> f32 {
        let size = self.grid.size;
        if size <= 0.0 {
            return value;
        }
        let nearest = (value / size).round() * size;
        if (value - nearest).abs() <= self.grid.capture_radius {
            nearest
        } else {
            value
        }
    }

    pub fn snap_point(&self, p: Point) -> Point {
        point(self.snap_axis(p.x), self.snap_axis(p.y))
    }

    /// Move the selection by a screen-space delta measured from the press point.
    ///
    /// Returns true if anything was written to the store.
    pub fn drag_to(
        &mut self,
        screen_delta: Vector,
        viewport_scale: f32,
        store: &mut BoundsStore,
    ) -> bool {
        if !viewport_scale.is_finite() || viewport_scale <= 0.0 {
            return false;
        }
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let selection = session.selection;
        let origin = session.original_position;
        let members = session.member_positions.clone();

        let candidate = origin + screen_delta / viewport_scale;
        let target = if self.grid_snap {
            self.snap_point(candidate)
        } else {
            candidate
        };
        // Members follow the frame's snapped delta so the group moves rigidly
        let effective = target - origin;

        let mut changed = self.write(selection, target, store);
        for (member, member_origin) in members {
            changed |= self.write(Selection::Node(member), member_origin + effective, store);
        }

        if let Some(session) = self.session.as_mut() {
            session.current_position = target;
        }
        trace!(?selection, x = target.x, y = target.y, changed, "drag_to");
        changed
    }

    fn write(&mut self, selection: Selection, new: Point, store: &mut BoundsStore) -> bool {
        let Some(current) = store.position(selection) else {
            return false;
        };
        if (new.x - current.x).abs() <= WRITE_EPSILON
            && (new.y - current.y).abs() <= WRITE_EPSILON
        {
            return false;
        }
        store.set_position(selection, new);

        let original = self.snapshots.get(&selection).copied().unwrap_or(current);
        if (new.x - original.x).abs() > CHANGE_EPSILON
            || (new.y - original.y).abs() > CHANGE_EPSILON
        {
            self.changes.upsert(selection, original, new);
        } else {
            self.changes.remove(selection);
        }
        true
    }

    /// Restore every touched shape and leave reposition mode.
    pub fn cancel(&mut self, store: &mut BoundsStore) {
        for (&selection, &original) in &self.snapshots {
            store.set_position(selection, original);
        }
        debug!(restored = self.snapshots.len(), "Reposition cancelled");
        self.reset();
    }

    /// Hand back the change log and leave reposition mode.
    pub fn commit(&mut self) -> ChangeLog {
        let changes = std::mem::take(&mut self.changes);
        if self.active {
            debug!(
                nodes = changes.node_changes.len(),
                groups = changes.group_changes.len(),
                "Reposition committed"
            );
        }
        self.reset();
        changes
    }

    pub fn toggle_grid_snap(&mut self) -> bool {
        self.grid_snap = !self.grid_snap;
        self.grid_snap
    }

    fn reset(&mut self) {
        self.active = false;
        self.session = None;
        self.snapshots.clear();
        self.changes.clear();
    }
}
