//! Interactive KD-partition morph viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the animation driver and the
//! receiving end of the generator channel, and implements [`eframe::App`]
//! to rebuild and draw the partition tree every frame.

use std::sync::Arc;

use eframe::App;
use glam::Vec2;
use morph_core::animation::{AnimationDriver, Phase};
use morph_core::channel::BoundedChannel;
use morph_core::config::Config;
use morph_core::error::MorphResult;
use morph_core::sampler::{self, PointSource};
use morph_core::tree::{self, Axis, Bounds};
use morph_core::types::PointSet;
use morph_core::worker::{self, DistinctSecondGate};
use tracing::{error, info};

use crate::density::NoiseDensity;

/// Main application state for the morph viewer.
///
/// The per-frame update is:
/// 1. Advance the [`AnimationDriver`] (which polls the channel while
///    settled) with the egui frame time.
/// 2. Rebuild the partition tree at the resulting `t`.
/// 3. Draw every split line inside its clipped bounding box.
///
/// ### Fields
/// - `cfg` - Pipeline configuration fixed at startup.
/// - `channel` - Receiving side of the worker channel; the worker holds
///   the other `Arc`.
/// - `driver` - Owns the origin/target sets and the transition clock.
/// - `world_size` - Side length of the square world region.
/// - `zoom` / `pan` - World-to-screen mapping state.
/// - `show_nodes` - Whether to draw split points on top of the lines.
/// - `node_count` - Node count of the last built tree (status display).
pub struct Viewer {
    cfg: Config,
    channel: Arc<BoundedChannel<PointSet>>,
    driver: AnimationDriver,

    world_size: f32,
    zoom: f32,
    pan: egui::Vec2,
    show_nodes: bool,

    node_count: usize,
}

impl Viewer {
    /// Creates a viewer with the default configuration.
    pub fn new() -> MorphResult<Self> {
        Self::with_config(Config::default())
    }

    /// Creates a viewer, generates the first target set synchronously so
    /// the opening frame already animates, and spawns the background
    /// generator keyed to wall-clock seconds.
    ///
    /// If the initial generation fails the viewer starts by morphing the
    /// seed grid onto itself instead of refusing to open.
    pub fn with_config(cfg: Config) -> MorphResult<Self> {
        let channel = Arc::new(BoundedChannel::new(cfg.channel_capacity)?);
        let world_size = cfg.density_size as f32 * cfg.point_scale;

        let origin = sampler::uniform_grid(world_size as u32, world_size as u32, cfg.grid_layers);
        let mut source = NoiseDensity::new(&cfg);
        let target = match source.generate("00") {
            Ok(set) => set,
            Err(e) => {
                error!(error = %e, "initial point generation failed, showing the seed grid");
                origin.clone()
            }
        };

        let driver = AnimationDriver::new(origin, target, cfg.settle_threshold, 0.0)?;

        worker::spawn_worker(
            Arc::clone(&channel),
            Box::new(source),
            Box::new(DistinctSecondGate::new()),
            cfg.worker_poll,
        );
        info!(
            points = driver.point_count(),
            capacity = cfg.channel_capacity,
            "viewer ready"
        );

        Ok(Self {
            cfg,
            channel,
            driver,
            world_size,
            zoom: 0.9,
            pan: egui::vec2(0.0, 0.0),
            show_nodes: false,
            node_count: 0,
        })
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are raster-like (y grows downward, matching the
    /// density image and the screen), scaled by `zoom`, offset by `pan`,
    /// and centered inside the given `rect`.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let half = self.world_size * 0.5;
        egui::pos2(
            center.x + (p.x - half) * self.zoom + self.pan.x,
            center.y + (p.y - half) * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`] up to floating point rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let half = self.world_size * 0.5;
        Vec2::new(
            (p.x - center.x - self.pan.x) / self.zoom + half,
            (p.y - center.y - self.pan.y) / self.zoom + half,
        )
    }

    /// Builds the top panel UI (view controls).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));

                if ui.button("Reset view").clicked() {
                    self.zoom = 0.9;
                    self.pan = egui::vec2(0.0, 0.0);
                }

                ui.separator();
                ui.checkbox(&mut self.show_nodes, "Show split points");
            });
        });
    }

    /// Builds the bottom status bar (fps, morph state, counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let dt = ctx.input(|i| i.unstable_dt).max(1e-6);
                ui.label(format!("fps = {:.0}", 1.0 / dt));
                ui.separator();
                match self.driver.phase() {
                    Phase::Transitioning => ui.label(format!("t = {:.2}", self.driver.t())),
                    Phase::Settled => ui.label("settled"),
                };
                ui.separator();
                ui.label(format!("points = {}", self.driver.point_count()));
                ui.label(format!("nodes = {}", self.node_count));
                ui.label(format!("queued = {}", self.channel.len()));
            });
        });
    }

    /// Builds the central panel: input handling, the per-frame rebuild,
    /// and the partition drawing.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Advance the morph and rebuild the whole tree for this frame.
            let now = ctx.input(|i| i.time);
            self.driver.advance(&self.channel, now);
            let root = self.driver.build_tree();
            self.node_count = tree::node_count(root.as_deref());

            if let Some(root) = &root {
                let world = Bounds::new(Vec2::ZERO, Vec2::splat(self.world_size));
                let line = egui::Stroke::new(1.0, egui::Color32::RED);

                tree::visit_partitions(root, world, &mut |axis, pos, bounds| {
                    let (a, b) = match axis {
                        Axis::X => (
                            Vec2::new(pos.x, bounds.min.y),
                            Vec2::new(pos.x, bounds.max.y),
                        ),
                        Axis::Y => (
                            Vec2::new(bounds.min.x, pos.y),
                            Vec2::new(bounds.max.x, pos.y),
                        ),
                    };
                    painter.line_segment(
                        [self.world_to_screen(a, rect), self.world_to_screen(b, rect)],
                        line,
                    );
                    if self.show_nodes {
                        painter.circle_filled(
                            self.world_to_screen(pos, rect),
                            1.5,
                            egui::Color32::LIGHT_BLUE,
                        );
                    }
                });
            }

            // The morph is continuous; keep frames coming.
            ctx.request_repaint();
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}
