//! Canvas rendering - background grid, groups, connections, nodes and the
//! long-press ring.
//!
//! ## Performance Notes
//!
//! This is a hot path - a pass runs on every redraw. Key optimizations:
//! - Early culling of off-screen shapes (viewport culling)
//! - Grid lines skipped when they would be denser than a few pixels
//! - Colours parsed once per settings change into a [`Palette`]
//!
//! Enable profiling with `cargo build --features profiling` to see timing.

use super::surface::{Color, DrawSurface, Layer, Palette, Stroke};
use crate::constants::{
    LINK_WIDTH, LONG_PRESS_RING_RADIUS, MIN_GRID_SCREEN_SPACING, NODE_CORNER_RADIUS,
    PROGRESS_BAR_HEIGHT, TITLE_FONT_SIZE, TITLE_MIN_SCALE, TITLE_PADDING,
};
use crate::geometry::{Point, Rect, point};
use crate::hit_test::{ConnectionAuthoring, priority};
use crate::input::LongPressIndicator;
use crate::overlay::ExecutionOverlay;
use crate::profile_scope;
use crate::settings::{EngineSettings, GridSettings};
use crate::shapes::{BoundsStore, Selection, ShapeBounds};
use crate::viewport::ViewportTransform;
use std::cmp::Reverse;
use std::f32::consts::{FRAC_PI_2, TAU};

/// Mode flags that change decoration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModeFlags {
    pub reposition: bool,
    pub grid_snap: bool,
    /// Current reposition selection
    pub selection: Option<Selection>,
}

/// Everything a render pass reads. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    pub transform: ViewportTransform,
    pub store: &'a BoundsStore,
    pub overlay: &'a ExecutionOverlay,
    pub mode: ModeFlags,
    pub authoring: Option<&'a ConnectionAuthoring>,
    pub long_press: Option<LongPressIndicator>,
}

/// Counts from one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub groups: usize,
    pub links: usize,
    pub nodes: usize,
    pub culled: usize,
    pub grid_lines: usize,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    palette: Palette,
    grid: GridSettings,
    culling_margin: f32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

impl Renderer {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            palette: Palette::from_theme(&settings.theme),
            grid: settings.grid.clone(),
            culling_margin: settings.viewport.culling_margin,
        }
    }

    pub fn apply_settings(&mut self, settings: &EngineSettings) {
        *self = Self::new(settings);
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// World-space grid spacing for the current mode.
    pub fn grid_spacing(&self, mode: &ModeFlags) -> f32 {
        if mode.reposition && mode.grid_snap {
            self.grid.size
        } else {
            self.grid.size * self.grid.coarse_multiple.max(1) as f32
        }
    }

    /// Render one full pass.
    pub fn draw(&self, view: &RenderView<'_>, surface: &mut dyn DrawSurface) -> RenderStats {
        profile_scope!("render_pass");

        let mut stats = RenderStats::default();
        let size = surface.size();
        let visible = Rect::new(0.0, 0.0, size.width, size.height).inflate(self.culling_margin);
        let world_visible = view
            .transform
            .visible_world_rect(size)
            .inflate(self.culling_margin / view.transform.scale);

        surface.begin_layer(Layer::Background);
        surface.clear(self.palette.background);

        surface.begin_layer(Layer::Grid);
        stats.grid_lines = self.draw_grid(view, surface);

        surface.begin_layer(Layer::Groups);
        let mut groups: Vec<(usize, &ShapeBounds)> = view
            .store
            .groups_in(world_visible)
            .into_iter()
            .filter_map(|id| Some((view.store.group_order_index(id)?, view.store.group(id)?)))
            .collect();
        stats.culled += view.store.group_count() - groups.len();
        // The first group in layout order wins a hit test, so it is painted last
        groups.sort_by_key(|(order, _)| Reverse(*order));
        for (_, group) in groups {
            let rect = view.transform.rect_to_screen(group.rect());
            self.draw_group(view, group, rect, surface);
            stats.groups += 1;
        }

        surface.begin_layer(Layer::Connections);
        stats.links = self.draw_connections(view, visible, surface);

        surface.begin_layer(Layer::Nodes);
        let mut nodes: Vec<(i64, Reverse<usize>, &ShapeBounds)> = view
            .store
            .nodes_in(world_visible)
            .into_iter()
            .filter_map(|id| {
                let node = view.store.node(id)?;
                let order = view.store.node_order_index(id)?;
                Some((priority(node, view.authoring), Reverse(order), node))
            })
            .collect();
        stats.culled += view.store.node_count() - nodes.len();
        // Ascending hit-test rank so the node a tap selects is drawn on top
        nodes.sort_by_key(|(rank, order, _)| (*rank, *order));
        for (_, _, node) in nodes {
            let rect = view.transform.rect_to_screen(node.rect());
            self.draw_node(view, node, rect, surface);
            stats.nodes += 1;
        }

        surface.begin_layer(Layer::LongPress);
        if let Some(indicator) = view.long_press {
            self.draw_long_press(indicator, surface);
        }

        stats
    }

    fn draw_grid(&self, view: &RenderView<'_>, surface: &mut dyn DrawSurface) -> usize {
        profile_scope!("render_grid");

        let scale = view.transform.scale;
        let spacing = self.grid_spacing(&view.mode);
        let screen_spacing = spacing * scale;
        if screen_spacing.is_nan() || screen_spacing < MIN_GRID_SCREEN_SPACING {
            return 0;
        }

        let size = surface.size();
        let color = if view.mode.reposition && view.mode.grid_snap {
            self.palette.snap_grid
        } else {
            self.palette.grid
        };
        let stroke = Stroke::new(color, 1.0);
        let mut count = 0;

        // Offset of the first line at or after the screen origin
        let first_x = view.transform.x.rem_euclid(screen_spacing);
        let mut x = first_x;
        while x <= size.width {
            surface.line(point(x, 0.0), point(x, size.height), stroke);
            x += screen_spacing;
            count += 1;
        }
        let first_y = view.transform.y.rem_euclid(screen_spacing);
        let mut y = first_y;
        while y <= size.height {
            surface.line(point(0.0, y), point(size.width, y), stroke);
            y += screen_spacing;
            count += 1;
        }
        count
    }

    fn draw_group(
        &self,
        view: &RenderView<'_>,
        group: &ShapeBounds,
        rect: Rect,
        surface: &mut dyn DrawSurface,
    ) {
        let scale = view.transform.scale;
        let fill = group
            .meta
            .color
            .as_deref()
            .and_then(Color::from_hex)
            .unwrap_or(self.palette.group_fill);
        surface.fill_rect(rect, NODE_CORNER_RADIUS * scale, fill);

        let selected =
            view.mode.reposition && view.mode.selection == Some(Selection::Group(group.id));
        let border = if selected {
            Stroke::new(self.palette.selection, 2.0)
        } else {
            Stroke::new(self.palette.group_border, 1.0)
        };
        surface.stroke_rect(rect, NODE_CORNER_RADIUS * scale, border);
        self.draw_title(&group.meta.title, rect, scale, surface);
    }

    /// Links run from the source's right edge to the target's left edge.
    fn draw_connections(
        &self,
        view: &RenderView<'_>,
        visible: Rect,
        surface: &mut dyn DrawSurface,
    ) -> usize {
        profile_scope!("render_connections");

        let stroke = Stroke::new(self.palette.link, LINK_WIDTH * view.transform.scale);
        let mut count = 0;
        for link in view.store.links() {
            let (Some(from), Some(to)) = (view.store.node(link.from), view.store.node(link.to))
            else {
                continue;
            };
            let from_rect = view.transform.rect_to_screen(from.rect());
            let to_rect = view.transform.rect_to_screen(to.rect());
            let start = point(from_rect.max_x(), from_rect.center().y);
            let end = point(to_rect.x, to_rect.center().y);

            let span = Rect::new(
                start.x.min(end.x),
                start.y.min(end.y),
                (start.x - end.x).abs(),
                (start.y - end.y).abs(),
            );
            if !span.intersects(&visible) {
                continue;
            }
            // Use midpoint as control point for a gentle curve
            surface.quad_curve(start, start.midpoint(end), end, stroke);
            count += 1;
        }
        count
    }

    fn draw_node(
        &self,
        view: &RenderView<'_>,
        node: &ShapeBounds,
        rect: Rect,
        surface: &mut dyn DrawSurface,
    ) {
        let scale = view.transform.scale;
        let radius = NODE_CORNER_RADIUS * scale;
        let id = node.id;

        let fill = if node.meta.collapsed {
            self.palette.collapsed_fill
        } else {
            node.meta
                .color
                .as_deref()
                .and_then(Color::from_hex)
                .unwrap_or(self.palette.node_fill)
        };
        surface.fill_rect(rect, radius, fill);

        let border = if view.overlay.is_errored(id) {
            Stroke::new(self.palette.error, 3.0)
        } else if view.overlay.is_executing(id) {
            Stroke::new(self.palette.executing, 3.0)
        } else if view.mode.reposition && view.mode.selection == Some(Selection::Node(id)) {
            Stroke::new(self.palette.selection, 2.0)
        } else if view.authoring.is_some_and(|a| a.is_active_endpoint(id)) {
            Stroke::new(self.palette.authoring_active, 2.0)
        } else if view.authoring.is_some_and(|a| a.is_compatible(id)) {
            Stroke::new(self.palette.authoring_compatible, 2.0)
        } else {
            Stroke::new(self.palette.node_border, 1.0)
        };
        surface.stroke_rect(rect, radius, border);

        if let Some(percent) = view.overlay.progress_for(id) {
            let height = PROGRESS_BAR_HEIGHT * scale;
            let bar = Rect::new(
                rect.x,
                rect.max_y() - height,
                rect.width * f32::from(percent) / 100.0,
                height,
            );
            surface.fill_rect(bar, 0.0, self.palette.progress);
        }

        self.draw_title(&node.meta.title, rect, scale, surface);
    }

    fn draw_title(&self, title: &str, rect: Rect, scale: f32, surface: &mut dyn DrawSurface) {
        if title.is_empty() || scale < TITLE_MIN_SCALE {
            return;
        }
        let inset = TITLE_PADDING * scale;
        let font = TITLE_FONT_SIZE * scale;
        surface.text(
            point(rect.x + inset, rect.y + inset + font),
            title,
            font,
            self.palette.text,
        );
    }

    fn draw_long_press(&self, indicator: LongPressIndicator, surface: &mut dyn DrawSurface) {
        let center: Point = indicator.center;
        surface.arc(
            center,
            LONG_PRESS_RING_RADIUS,
            0.0,
            TAU,
            Stroke::new(self.palette.long_press.with_alpha(0.25), 3.0),
        );
        if indicator.progress > 0.0 {
            surface.arc(
                center,
                LONG_PRESS_RING_RADIUS,
                -FRAC_PI_2,
                TAU * indicator.progress,
                Stroke::new(self.palette.long_press, 3.0),
            );
        }
    }
}
