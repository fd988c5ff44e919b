//! The engine: one event queue, one reducer, one render state.
//!
//! Pointer input and execution notifications arrive from independent sources.
//! Both become [`EngineEvent`]s in a single FIFO queue and are applied one at
//! a time by [`Engine::process_pending`], so a render pass always sees fully
//! applied state. Multi-threaded hosts share the engine through
//! [`SharedEngine`].

use crate::geometry::{Point, Size};
use crate::hit_test::ConnectionAuthoring;
use crate::input::{GestureOutcome, InputContext, InteractionController, PointerEvent};
use crate::overlay::{
    ExecutionEvent, ExecutionFeed, ExecutionOverlay, ExecutionSource, OverlaySync,
    execution_channel,
};
use crate::perf::FrameMonitor;
use crate::render::{DrawSurface, ModeFlags, RenderStats, RenderView, Renderer};
use crate::reposition::{ChangeLog, PositionChange, RepositionController};
use crate::settings::EngineSettings;
use crate::settings_watcher::{SettingsEvent, SettingsWatcher};
use crate::shapes::{BoundsStore, InspectView, LayoutProvider, NodeId, Selection};
use crate::viewport::{Viewport, ViewportTransform};
use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Everything that can change engine state.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Pointer(PointerEvent),
    /// Scroll-wheel zoom around a screen point
    Wheel { position: Point, delta_y: f32 },
    /// Advance timers and animations
    Tick(Instant),
    Resize(Size),
    Execution(ExecutionEvent),
    EnterReposition,
    CommitReposition,
    CancelReposition,
    ToggleGridSnap,
    /// Enter (`Some`) or leave (`None`) connection-authoring mode
    SetAuthoring(Option<ConnectionAuthoring>),
}

/// Callbacks the engine invokes. Every method defaults to a no-op.
///
/// Calls are delivered after the events that produced them have been reduced.
/// Under [`SharedEngine`] that happens with the engine lock released, so a
/// callback may push events back into the same engine. Calling
/// [`SharedEngine::process_pending`] from inside a callback deadlocks.
pub trait HostCallbacks {
    fn on_node_long_press(&mut self, _id: NodeId) {}
    fn on_canvas_long_press(&mut self, _x: f32, _y: f32) {}
    fn on_double_tap_insert(&mut self, _x: f32, _y: f32) {}
    fn on_tap_select(&mut self, _selection: Option<Selection>) {}
    fn on_reposition_commit(
        &mut self,
        _node_changes: &[PositionChange],
        _group_changes: &[PositionChange],
    ) {
    }
}

/// A host notification waiting to be delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    NodeLongPress(NodeId),
    CanvasLongPress(Point),
    DoubleTapInsert(Point),
    TapSelect(Option<Selection>),
    RepositionCommit(ChangeLog),
}

impl HostCall {
    pub fn deliver<C: HostCallbacks + ?Sized>(&self, callbacks: &mut C) {
        match self {
            HostCall::NodeLongPress(id) => callbacks.on_node_long_press(*id),
            HostCall::CanvasLongPress(p) => callbacks.on_canvas_long_press(p.x, p.y),
            HostCall::DoubleTapInsert(p) => callbacks.on_double_tap_insert(p.x, p.y),
            HostCall::TapSelect(selection) => callbacks.on_tap_select(*selection),
            HostCall::RepositionCommit(log) => {
                callbacks.on_reposition_commit(&log.node_changes, &log.group_changes)
            }
        }
    }
}

/// Callbacks that ignore everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallbacks;

impl HostCallbacks for NoopCallbacks {}

pub struct Engine {
    settings: EngineSettings,
    viewport: Viewport,
    store: BoundsStore,
    input: InteractionController,
    reposition: RepositionController,
    overlay: OverlaySync,
    authoring: Option<ConnectionAuthoring>,
    renderer: Renderer,
    frames: FrameMonitor,
    queue: VecDeque<EngineEvent>,
    feed: Option<Receiver<ExecutionEvent>>,
    /// `None` while a [`SharedEngine`] delivers calls instead
    callbacks: Option<Box<dyn HostCallbacks + Send>>,
    outbox: Vec<HostCall>,
    canvas_size: Size,
    dirty: bool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("transform", &self.viewport.transform())
            .field("nodes", &self.store.node_count())
            .field("groups", &self.store.group_count())
            .field("reposition", &self.reposition.is_active())
            .field("queued", &self.queue.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Engine {
    pub fn new(settings: EngineSettings, layout: &dyn LayoutProvider) -> Self {
        let store = BoundsStore::from_provider(layout);
        info!(
            nodes = store.node_count(),
            groups = store.group_count(),
            "Engine created"
        );
        Self {
            viewport: Viewport::new(&settings.viewport),
            input: InteractionController::new(&settings.gesture),
            reposition: RepositionController::new(&settings.grid),
            renderer: Renderer::new(&settings),
            settings,
            store,
            overlay: OverlaySync::new(),
            authoring: None,
            frames: FrameMonitor::new(),
            queue: VecDeque::new(),
            feed: None,
            callbacks: Some(Box::new(NoopCallbacks)),
            outbox: Vec::new(),
            canvas_size: Size::default(),
            dirty: true,
        }
    }

    pub fn with_callbacks(mut self, callbacks: impl HostCallbacks + Send + 'static) -> Self {
        self.set_callbacks(callbacks);
        self
    }

    pub fn set_callbacks(&mut self, callbacks: impl HostCallbacks + Send + 'static) {
        self.callbacks = Some(Box::new(callbacks));
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn transform(&self) -> ViewportTransform {
        self.viewport.transform()
    }

    pub fn store(&self) -> &BoundsStore {
        &self.store
    }

    pub fn input(&self) -> &InteractionController {
        &self.input
    }

    pub fn reposition(&self) -> &RepositionController {
        &self.reposition
    }

    pub fn overlay(&self) -> &ExecutionOverlay {
        self.overlay.overlay()
    }

    pub fn overlay_sync(&self) -> &OverlaySync {
        &self.overlay
    }

    pub fn authoring(&self) -> Option<&ConnectionAuthoring> {
        self.authoring.as_ref()
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn frame_monitor(&self) -> &FrameMonitor {
        &self.frames
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn inspect(&self, selection: Selection) -> Option<InspectView> {
        self.store.inspect(selection)
    }

    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    pub fn push(&mut self, event: EngineEvent) {
        self.queue.push_back(event);
    }

    /// Queue an event and process everything pending.
    pub fn handle(&mut self, event: EngineEvent) -> usize {
        self.push(event);
        self.process_pending()
    }

    /// Producer handle for a network thread. Replaces any previous feed.
    pub fn execution_feed(&mut self) -> ExecutionFeed {
        let (feed, rx) = execution_channel();
        self.feed = Some(rx);
        feed
    }

    /// Apply every queued event in order, including events waiting on the
    /// execution feed, then deliver host calls. Returns how many were applied.
    pub fn process_pending(&mut self) -> usize {
        let applied = self.reduce_pending();
        self.flush_host_calls();
        applied
    }

    fn reduce_pending(&mut self) -> usize {
        self.drain_feed();
        let mut applied = 0;
        while let Some(event) = self.queue.pop_front() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    fn flush_host_calls(&mut self) {
        let Some(callbacks) = self.callbacks.as_mut() else {
            return;
        };
        for call in self.outbox.drain(..) {
            call.deliver(&mut **callbacks);
        }
    }

    /// Host calls produced but not yet delivered.
    pub fn take_host_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.outbox)
    }

    fn drain_feed(&mut self) {
        let Some(rx) = self.feed.as_ref() else {
            return;
        };
        self.queue
            .extend(rx.try_iter().map(EngineEvent::Execution));
    }

    fn apply(&mut self, event: EngineEvent) {
        trace!(?event, "apply");
        match event {
            EngineEvent::Pointer(pointer) => {
                let mut cx = InputContext {
                    viewport: &mut self.viewport,
                    store: &mut self.store,
                    reposition: &mut self.reposition,
                    authoring: self.authoring.as_ref(),
                };
                let outcomes = self.input.process(&pointer, &mut cx);
                self.dispatch(outcomes);
                self.dirty = true;
            }
            EngineEvent::Wheel { position, delta_y } => {
                if self.viewport.zoom_by_wheel(position, delta_y) {
                    self.dirty = true;
                }
            }
            EngineEvent::Tick(now) => self.tick(now),
            EngineEvent::Resize(size) => {
                self.canvas_size = size;
                self.dirty = true;
            }
            EngineEvent::Execution(event) => {
                if self.overlay.handle(event) {
                    self.dirty = true;
                }
            }
            EngineEvent::EnterReposition => self.enter_reposition(),
            EngineEvent::CommitReposition => self.commit_reposition(),
            EngineEvent::CancelReposition => self.cancel_reposition(),
            EngineEvent::ToggleGridSnap => {
                let on = self.reposition.toggle_grid_snap();
                debug!(grid_snap = on, "Grid snap toggled");
                self.dirty = true;
            }
            EngineEvent::SetAuthoring(authoring) => {
                if authoring.is_some() {
                    self.input.cancel_gesture();
                }
                self.authoring = authoring;
                self.dirty = true;
            }
        }
    }

    fn tick(&mut self, now: Instant) {
        let was_visible = self.input.long_press().is_visible();
        if let Some(outcome) = self.input.tick(now) {
            self.dispatch(vec![outcome]);
        }
        if was_visible || self.input.long_press().is_visible() {
            self.dirty = true;
        }
        if self.viewport.sample(now) {
            self.dirty = true;
        }
    }

    fn dispatch(&mut self, outcomes: Vec<GestureOutcome>) {
        for outcome in outcomes {
            debug!(?outcome, "Gesture outcome");
            let call = match outcome {
                GestureOutcome::TapSelect { selection } => HostCall::TapSelect(selection),
                GestureOutcome::RepositionSelect { selection } => {
                    HostCall::TapSelect(Some(selection))
                }
                GestureOutcome::DoubleTapInsert { position } => HostCall::DoubleTapInsert(position),
                GestureOutcome::NodeLongPress { node } => HostCall::NodeLongPress(node),
                GestureOutcome::CanvasLongPress { position } => HostCall::CanvasLongPress(position),
            };
            self.outbox.push(call);
        }
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    fn enter_reposition(&mut self) {
        // Long press and reposition never overlap
        self.input.cancel_gesture();
        if self.reposition.is_active() {
            self.reposition.cancel(&mut self.store);
        }
        self.reposition.enter();
        self.dirty = true;
    }

    /// Commit the reposition session and report it to the host. Silent when no
    /// session is active.
    fn commit_reposition(&mut self) {
        if !self.reposition.is_active() {
            return;
        }
        self.input.cancel_gesture();
        let changes = self.reposition.commit();
        debug!(
            nodes = changes.node_changes.len(),
            groups = changes.group_changes.len(),
            "Reposition committed"
        );
        self.outbox.push(HostCall::RepositionCommit(changes));
        self.dirty = true;
    }

    fn cancel_reposition(&mut self) {
        if !self.reposition.is_active() {
            return;
        }
        self.input.cancel_gesture();
        self.reposition.cancel(&mut self.store);
        self.dirty = true;
    }

    // ------------------------------------------------------------------
    // Camera
    // ------------------------------------------------------------------

    /// Frame all content. Animated when `now` is given.
    pub fn fit_to_content(&mut self, now: Option<Instant>) {
        let Some(content) = self.store.content_bounds() else {
            return;
        };
        let target =
            self.viewport
                .fit_transform(content, self.canvas_size, self.settings.viewport.fit_margin);
        match now {
            Some(now) => self.animate_to(target, now),
            None => {
                self.viewport.set_transform(target);
            }
        }
        self.dirty = true;
    }

    pub fn animate_to(&mut self, target: ViewportTransform, now: Instant) {
        self.viewport
            .animate_to(target, self.settings.viewport.animation_duration(), now);
        self.dirty = true;
    }

    pub fn set_transform(&mut self, transform: ViewportTransform) {
        if self.viewport.set_transform(transform) {
            self.dirty = true;
        }
    }

    // ------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------

    /// Seed the overlay from `source`; events seen before this are skipped. Call again
    /// after navigation or reconnect.
    pub fn subscribe_execution(&mut self, source: &dyn ExecutionSource) {
        self.process_pending();
        self.overlay.subscribe(source);
        self.dirty = true;
    }

    /// Replace bounds with the provider's layout. Any reposition session is
    /// rolled back first.
    pub fn reload_layout(&mut self, layout: &dyn LayoutProvider) {
        self.input.cancel_gesture();
        if self.reposition.is_active() {
            self.reposition.cancel(&mut self.store);
        }
        self.store.reload(layout);
        self.dirty = true;
    }

    pub fn apply_settings(&mut self, settings: EngineSettings) {
        self.viewport.apply_settings(&settings.viewport);
        self.input.apply_settings(&settings.gesture);
        self.reposition.apply_settings(&settings.grid);
        self.renderer.apply_settings(&settings);
        self.settings = settings;
        self.dirty = true;
        debug!("Engine settings applied");
    }

    /// Reload settings when the watched file changed. Returns true if applied.
    pub fn poll_settings(&mut self, watcher: &mut SettingsWatcher) -> bool {
        match watcher.poll() {
            Some(SettingsEvent::Changed) => {
                self.apply_settings(EngineSettings::load_or_default(watcher.path()));
                true
            }
            Some(SettingsEvent::Removed) => {
                self.apply_settings(EngineSettings::default());
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Whether the host should schedule a render pass.
    pub fn needs_redraw(&self) -> bool {
        self.dirty || self.viewport.is_animating() || self.input.long_press().is_visible()
    }

    /// Earliest timer deadline, for hosts that sleep between ticks.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.input.next_deadline()
    }

    /// Run one render pass at `now`.
    pub fn render(&mut self, surface: &mut dyn DrawSurface, now: Instant) -> RenderStats {
        self.viewport.sample(now);
        let view = RenderView {
            transform: self.viewport.transform(),
            store: &self.store,
            overlay: self.overlay.overlay(),
            mode: ModeFlags {
                reposition: self.reposition.is_active(),
                grid_snap: self.reposition.grid_snap_enabled(),
                selection: self.reposition.selection(),
            },
            authoring: self.authoring.as_ref(),
            long_press: self.input.long_press().indicator(now),
        };
        let renderer = &self.renderer;
        let stats = self.frames.measure(|| renderer.draw(&view, surface));
        self.dirty = false;
        stats
    }

    /// Render only when something changed.
    pub fn render_if_needed(
        &mut self,
        surface: &mut dyn DrawSurface,
        now: Instant,
    ) -> Option<RenderStats> {
        self.needs_redraw().then(|| self.render(surface, now))
    }

    /// Cancel timers and sessions and stop consuming execution events.
    pub fn teardown(&mut self) {
        self.input.teardown();
        self.overlay.unsubscribe();
        self.queue.clear();
        self.feed = None;
        debug!("Engine torn down");
    }
}

/// The engine behind a mutex, for hosts that feed it from several threads.
///
/// Host callbacks live outside the engine lock and run after it is released.
#[derive(Clone)]
pub struct SharedEngine {
    engine: Arc<Mutex<Engine>>,
    callbacks: Arc<Mutex<Box<dyn HostCallbacks + Send>>>,
}

impl std::fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedEngine").field(&self.engine).finish()
    }
}

impl SharedEngine {
    pub fn new(mut engine: Engine) -> Self {
        let callbacks = engine
            .callbacks
            .take()
            .unwrap_or_else(|| Box::new(NoopCallbacks));
        Self {
            engine: Arc::new(Mutex::new(engine)),
            callbacks: Arc::new(Mutex::new(callbacks)),
        }
    }

    pub fn set_callbacks(&self, callbacks: impl HostCallbacks + Send + 'static) {
        *self.callbacks.lock() = Box::new(callbacks);
    }

    pub fn push(&self, event: EngineEvent) {
        self.engine.lock().push(event);
    }

    pub fn process_pending(&self) -> usize {
        let (applied, calls) = {
            let mut engine = self.engine.lock();
            (engine.reduce_pending(), engine.take_host_calls())
        };
        self.deliver(calls);
        applied
    }

    /// Direct access to the engine. Host calls produced while the guard is
    /// held are delivered by the next [`SharedEngine::process_pending`].
    pub fn lock(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        let (result, calls) = {
            let mut engine = self.engine.lock();
            let result = f(&mut engine);
            (result, engine.take_host_calls())
        };
        self.deliver(calls);
        result
    }

    fn deliver(&self, calls: Vec<HostCall>) {
        if calls.is_empty() {
            return;
        }
        let mut callbacks = self.callbacks.lock();
        for call in &calls {
            call.deliver(&mut **callbacks);
        }
    }
}
