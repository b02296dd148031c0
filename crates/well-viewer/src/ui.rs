//! egui overlay: settings panel, timeline bar, shoe labels, HUD and status
//! line. Widgets never mutate viewer state directly; they emit
//! [`ConfigEvent`]s for the app to apply.

use crate::config::{ViewerConfig, RADIUS_SCALING_RANGE, SPEEDUP_RANGE};
use crate::events::ConfigEvent;
use egui::{Color32, Pos2, Rect};
use wellpath::{Catalog, Colormap, SimulationKind, Technique, Timeline};

const PAUSED_FILL: Color32 = Color32::from_rgb(128, 0, 0);
const PLAYING_FILL: Color32 = Color32::from_rgb(17, 17, 17);
const FPS_WINDOW_S: f64 = 0.5;

/// Timestamp shown on the play/pause button, e.g. `12.5 s (3x)`.
pub fn timestamp(timeline: &Timeline) -> String {
    format!("{:.1} s ({:.0}x)", timeline.current(), timeline.speedup())
}

/// Frames per second averaged over short windows.
#[derive(Debug, Default)]
pub struct FrameStats {
    frames: u32,
    elapsed: f64,
    fps: f64,
}

impl FrameStats {
    pub fn record(&mut self, dt: f64) {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed >= FPS_WINDOW_S {
            self.fps = self.frames as f64 / self.elapsed;
            self.frames = 0;
            self.elapsed = 0.0;
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Screen-space text anchored to a projected shoe position (egui points).
#[derive(Debug, Clone, PartialEq)]
pub struct ShoeLabel {
    pub pos: Pos2,
    pub text: String,
}

pub fn draw_labels(ctx: &egui::Context, labels: &[ShoeLabel]) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("shoe_labels"),
    ));
    for label in labels {
        painter.text(
            label.pos + egui::vec2(8.0, 0.0),
            egui::Align2::LEFT_CENTER,
            &label.text,
            egui::FontId::proportional(13.0),
            Color32::WHITE,
        );
    }
}

pub fn draw_hud(ctx: &egui::Context, fps: f64) {
    egui::Area::new(egui::Id::new("hud"))
        .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.colored_label(Color32::LIGHT_GREEN, format!("{fps:.0} FPS"));
        });
}

pub fn draw_status(ctx: &egui::Context, message: &str) {
    egui::TopBottomPanel::top("status").show(ctx, |ui| {
        ui.colored_label(Color32::LIGHT_RED, message);
    });
}

pub fn draw_timeline(
    ctx: &egui::Context,
    timeline: &Timeline,
    preview: Option<&egui::TextureHandle>,
    events: &mut Vec<ConfigEvent>,
) {
    egui::TopBottomPanel::bottom("timeline").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let fill = if timeline.is_paused() {
                PAUSED_FILL
            } else {
                PLAYING_FILL
            };
            let button = egui::Button::new(timestamp(timeline))
                .fill(fill)
                .min_size(egui::vec2(96.0, 24.0));
            if ui.add(button).clicked() {
                events.push(ConfigEvent::TogglePause);
            }

            let bounds = timeline.bounds();
            let (rect, _) = ui.allocate_exact_size(
                egui::vec2(ui.available_width(), 24.0),
                egui::Sense::hover(),
            );
            if let Some(tex) = preview {
                ui.painter().image(
                    tex.id(),
                    rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::from_white_alpha(180),
                );
            }

            let mut time = timeline.current();
            ui.spacing_mut().slider_width = rect.width();
            let slider = egui::Slider::new(&mut time, bounds.min..=bounds.max)
                .step_by(bounds.step)
                .show_value(false);
            if ui.put(rect, slider).changed() {
                events.push(ConfigEvent::ScrubTo(time));
            }
        });
    });
}

pub fn draw_config_panel(
    ctx: &egui::Context,
    cfg: &ViewerConfig,
    catalog: &Catalog,
    colormap_preview: Option<&egui::TextureHandle>,
    events: &mut Vec<ConfigEvent>,
) {
    egui::Window::new("Settings")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            egui::CollapsingHeader::new("Geometry")
                .default_open(true)
                .show(ui, |ui| geometry_section(ui, cfg, catalog, events));
            egui::CollapsingHeader::new("Image")
                .default_open(true)
                .show(ui, |ui| image_section(ui, cfg, colormap_preview, events));
            egui::CollapsingHeader::new("Presentation")
                .default_open(true)
                .show(ui, |ui| presentation_section(ui, cfg, events));
        });
}

fn geometry_section(
    ui: &mut egui::Ui,
    cfg: &ViewerConfig,
    catalog: &Catalog,
    events: &mut Vec<ConfigEvent>,
) {
    egui::ComboBox::from_label("Well")
        .selected_text(cfg.well.as_str())
        .show_ui(ui, |ui| {
            for well in catalog.wells() {
                if ui.selectable_label(well == cfg.well, well).clicked() {
                    events.push(ConfigEvent::SelectWell(well.to_owned()));
                }
            }
        });
    egui::ComboBox::from_label("Connection")
        .selected_text(cfg.connection.as_str())
        .show_ui(ui, |ui| {
            for connection in catalog.connections(&cfg.well) {
                if ui
                    .selectable_label(*connection == cfg.connection, connection.as_str())
                    .clicked()
                {
                    events.push(ConfigEvent::SelectConnection(connection.clone()));
                }
            }
        });

    // Rebuilding the mesh is not free: only emit once the drag ends.
    let id = ui.make_persistent_id("radius_scaling");
    let mut radius = ui
        .data(|d| d.get_temp::<f64>(id))
        .unwrap_or(cfg.radius_scaling);
    let response = ui.add(
        egui::Slider::new(&mut radius, RADIUS_SCALING_RANGE)
            .logarithmic(true)
            .text("Radius scaling"),
    );
    if response.dragged() {
        ui.data_mut(|d| d.insert_temp(id, radius));
    } else {
        ui.data_mut(|d| d.remove::<f64>(id));
        if response.changed() || response.drag_stopped() {
            events.push(ConfigEvent::RadiusScaling(radius));
        }
    }
}

fn image_section(
    ui: &mut egui::Ui,
    cfg: &ViewerConfig,
    colormap_preview: Option<&egui::TextureHandle>,
    events: &mut Vec<ConfigEvent>,
) {
    egui::ComboBox::from_label("Simulation")
        .selected_text(cfg.simulation.name())
        .show_ui(ui, |ui| {
            for kind in SimulationKind::ALL {
                if ui.selectable_label(kind == cfg.simulation, kind.name()).clicked() {
                    events.push(ConfigEvent::Simulation(kind));
                }
            }
        });
    egui::ComboBox::from_label("Colormap")
        .selected_text(cfg.colormap.name())
        .show_ui(ui, |ui| {
            for colormap in Colormap::ALL {
                if ui
                    .selectable_label(colormap == cfg.colormap, colormap.name())
                    .clicked()
                {
                    events.push(ConfigEvent::Colormap(colormap));
                }
            }
        });
    if let Some(tex) = colormap_preview {
        ui.image((tex.id(), egui::vec2(180.0, 10.0)));
    }

    let mut custom = cfg.custom_thresholds;
    if ui.checkbox(&mut custom, "Custom thresholds").changed() {
        events.push(ConfigEvent::CustomThresholds(custom));
    }
    if cfg.custom_thresholds {
        ui.horizontal(|ui| {
            let mut vmin = cfg.vmin;
            let mut vmax = cfg.vmax;
            ui.label("vmin");
            if ui.add(egui::DragValue::new(&mut vmin).speed(0.1)).changed() {
                events.push(ConfigEvent::Vmin(vmin));
            }
            ui.label("vmax");
            if ui.add(egui::DragValue::new(&mut vmax).speed(0.1)).changed() {
                events.push(ConfigEvent::Vmax(vmax));
            }
        });
    }
}

fn presentation_section(ui: &mut egui::Ui, cfg: &ViewerConfig, events: &mut Vec<ConfigEvent>) {
    let mut reflective = cfg.technique == Technique::Standard;
    if ui.checkbox(&mut reflective, "Reflective surface").changed() {
        events.push(ConfigEvent::Technique(if reflective {
            Technique::Standard
        } else {
            Technique::Basic
        }));
    }

    let mut markers = cfg.show_markers;
    if ui.checkbox(&mut markers, "Show casing shoes").changed() {
        events.push(ConfigEvent::ShowMarkers(markers));
    }

    let mut fps = cfg.show_fps;
    if ui.checkbox(&mut fps, "Show FPS").changed() {
        events.push(ConfigEvent::ShowFps(fps));
    }

    let mut speedup = cfg.speedup;
    if ui
        .add(egui::Slider::new(&mut speedup, SPEEDUP_RANGE).text("Timeline speedup"))
        .changed()
    {
        events.push(ConfigEvent::Speedup(speedup));
    }
}
