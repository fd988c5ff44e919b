//! Execution overlay: remote progress notifications folded into render state.
//!
//! Events come from a streaming source that runs independently of user input.
//! They are applied through [`OverlaySync`], which seeds itself from a snapshot
//! on every subscription so a late join never misses in-progress work. Events
//! for ids that have no shape are stored like any other; the renderer simply
//! finds nothing to decorate.

use crate::error::EngineResult;
use crate::shapes::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRunStatus {
    Pending,
    Running,
    Finished,
    Error,
}

/// Per-node entry of an aggregate state update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRunState {
    pub state: NodeRunStatus,
    #[serde(default)]
    pub value: f32,
    #[serde(default)]
    pub max: f32,
}

/// Progress of the node currently reporting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMark {
    pub id: NodeId,
    /// 0..=100
    pub percent: u8,
}

impl ProgressMark {
    pub fn from_ratio(id: NodeId, value: f32, max: f32) -> Self {
        let percent = if max > 0.0 && value.is_finite() {
            (value / max * 100.0).round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        Self { id, percent }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ExecutionEvent {
    NodeStart { node: NodeId },
    NodeProgress { node: NodeId, value: f32, max: f32 },
    NodeComplete { node: NodeId },
    AggregateState { nodes: IndexMap<NodeId, NodeRunState> },
    Success,
    Error {
        node: Option<NodeId>,
        #[serde(default)]
        message: Option<String>,
    },
    Interrupted,
    /// `None` signals the run finished
    Executing { node: Option<NodeId> },
    /// Nodes whose outputs were reused from cache
    Cached { nodes: Vec<NodeId> },
}

impl ExecutionEvent {
    pub fn from_json(text: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error { .. } | Self::Interrupted)
    }
}

/// Render-visible execution state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOverlay {
    pub executing_id: Option<NodeId>,
    pub errored_id: Option<NodeId>,
    pub progress: Option<ProgressMark>,
    /// Last aggregate state per node
    pub node_states: IndexMap<NodeId, NodeRunState>,
}

/// Current state reported by an execution source, used to seed the overlay.
pub type ExecutionSnapshot = ExecutionOverlay;

impl ExecutionOverlay {
    pub fn is_executing(&self, id: NodeId) -> bool {
        self.executing_id == Some(id)
    }

    pub fn is_errored(&self, id: NodeId) -> bool {
        self.errored_id == Some(id)
    }

    /// Progress percentage for a node, if it is the one reporting progress.
    pub fn progress_for(&self, id: NodeId) -> Option<u8> {
        self.progress.filter(|p| p.id == id).map(|p| p.percent)
    }

    pub fn is_empty(&self) -> bool {
        self.executing_id.is_none()
            && self.errored_id.is_none()
            && self.progress.is_none()
            && self.node_states.is_empty()
    }

    /// Apply one event. Returns true if anything visible to the renderer changed.
    pub fn apply(&mut self, event: &ExecutionEvent) -> bool {
        let before = self.clone();
        match event {
            ExecutionEvent::NodeStart { node } => {
                self.executing_id = Some(*node);
                if self.progress.is_some_and(|p| p.id != *node) {
                    self.progress = None;
                }
            }
            ExecutionEvent::NodeProgress { node, value, max } => {
                self.progress = Some(ProgressMark::from_ratio(*node, *value, *max));
            }
            ExecutionEvent::NodeComplete { node } => {
                if self.executing_id == Some(*node) {
                    self.executing_id = None;
                }
                if self.progress.is_some_and(|p| p.id == *node) {
                    self.progress = None;
                }
            }
            ExecutionEvent::AggregateState { nodes } => self.apply_aggregate(nodes),
            ExecutionEvent::Executing { node: Some(node) } => {
                self.executing_id = Some(*node);
            }
            ExecutionEvent::Executing { node: None } => {
                self.executing_id = None;
                self.progress = None;
            }
            ExecutionEvent::Cached { nodes } => {
                debug!(count = nodes.len(), "Cached nodes reported");
            }
            ExecutionEvent::Error { node, message } => {
                warn!(?node, message = message.as_deref().unwrap_or(""), "Execution error");
                self.clear_run();
            }
            ExecutionEvent::Success | ExecutionEvent::Interrupted => {
                debug!(?event, "Execution finished");
                self.clear_run();
            }
        }
        *self != before
    }

    fn apply_aggregate(&mut self, nodes: &IndexMap<NodeId, NodeRunState>) {
        for (&id, &state) in nodes {
            self.node_states.insert(id, state);
        }
        let running = nodes
            .iter()
            .find(|(_, s)| s.state == NodeRunStatus::Running);
        if let Some((&id, state)) = running {
            self.executing_id = Some(id);
            if state.max > 0.0 {
                self.progress = Some(ProgressMark::from_ratio(id, state.value, state.max));
            }
        }
        if let Some((&id, _)) = nodes.iter().find(|(_, s)| s.state == NodeRunStatus::Error) {
            self.errored_id = Some(id);
        }
    }

    /// Terminal events wipe the run unconditionally.
    pub fn clear_run(&mut self) {
        self.executing_id = None;
        self.errored_id = None;
        self.progress = None;
        self.node_states.clear();
    }
}

/// Streaming source of execution events.
pub trait ExecutionSource {
    /// Current state, queried synchronously on subscription.
    fn snapshot(&self) -> ExecutionSnapshot;
}

/// Source with a fixed snapshot, for hosts without a live backend.
#[derive(Debug, Clone, Default)]
pub struct StaticExecutionSource(pub ExecutionSnapshot);

impl ExecutionSource for StaticExecutionSource {
    fn snapshot(&self) -> ExecutionSnapshot {
        self.0.clone()
    }
}

/// Folds events into the overlay once a subscription is active.
///
/// Events that arrive before [`OverlaySync::subscribe`] are skipped: the
/// source snapshot taken on subscribe already reflects them, and replaying a
/// stale terminal event on top of it would wipe work that is still running.
#[derive(Debug, Clone, Default)]
pub struct OverlaySync {
    overlay: ExecutionOverlay,
    subscribed: bool,
    skipped: u64,
    revision: u64,
}

impl OverlaySync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlay(&self) -> &ExecutionOverlay {
        &self.overlay
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Bumped whenever the overlay visibly changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Events ignored since the last subscription because none was active.
    pub fn skipped_events(&self) -> u64 {
        self.skipped
    }

    /// Seed from the source's snapshot. Only later events are applied on top.
    ///
    /// Also used to re-seed after navigation or reconnect.
    pub fn subscribe(&mut self, source: &dyn ExecutionSource) {
        self.overlay = source.snapshot();
        self.subscribed = true;
        self.revision += 1;
        debug!(skipped = self.skipped, "Execution overlay subscribed");
        self.skipped = 0;
    }

    pub fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    /// Returns true if the overlay changed.
    pub fn handle(&mut self, event: ExecutionEvent) -> bool {
        if !self.subscribed {
            trace!(?event, "Execution event before subscribe, skipped");
            self.skipped += 1;
            return false;
        }
        let changed = self.overlay.apply(&event);
        if changed {
            self.revision += 1;
        }
        changed
    }
}

/// Producer handle for pushing execution events from another thread.
#[derive(Debug, Clone)]
pub struct ExecutionFeed {
    tx: Sender<ExecutionEvent>,
}

impl ExecutionFeed {
    /// Returns false once the receiving engine is gone.
    pub fn send(&self, event: ExecutionEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Parse a JSON message (`{"type": ..., "data": ...}`) and send it.
    pub fn send_json(&self, text: &str) -> EngineResult<bool> {
        Ok(self.send(ExecutionEvent::from_json(text)?))
    }
}

pub fn execution_channel() -> (ExecutionFeed, Receiver<ExecutionEvent>) {
    let (tx, rx) = mpsc::channel();
    (ExecutionFeed { tx }, rx)
}
