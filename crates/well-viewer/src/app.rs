use crate::{
    camera::{Camera, CameraController},
    config::{Args, ViewerConfig},
    data::{
        upload::{upload_scene, upload_texture},
        TextureGpu,
    },
    events::{ConfigEvent, Reload},
    loader::Loader,
    reload::{SceneAssembler, Update},
    renderer::Renderer,
    ui::{self, FrameStats, ShoeLabel},
};
use anyhow::Result;
use std::{fmt::Display, sync::Arc, time::Instant};
use wellpath::{
    AnimatedMaterial, Catalog, Colormap, DataTexture, LoadedGeometry, ShoeMarker, TimeBounds,
    TimeToColumn, Timeline,
};
use winit::{event::WindowEvent, window::Window};

/// Camera distance from the well centre after a load, in scaled units.
const ORBIT_DISTANCE: f64 = 30.0;
const COLORMAP_PREVIEW_WIDTH: u32 = 256;

/// Composition root: owns every piece of viewer state and threads it
/// through event handling and the frame loop.
pub struct App {
    pub renderer: Renderer,
    pub camera: Camera,
    pub camera_controller: CameraController,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,

    catalog: Catalog,
    config: ViewerConfig,
    loader: Loader,
    reload: SceneAssembler,
    timeline: Timeline,
    material: AnimatedMaterial<Arc<TextureGpu>>,
    /// Time axis of the loaded well; `None` until the first geometry load.
    time_to_column: Option<TimeToColumn>,
    shoes: Vec<ShoeMarker>,

    timeline_preview: Option<egui::TextureHandle>,
    colormap_preview: Option<(Colormap, egui::TextureHandle)>,
    status: Option<String>,
    stats: FrameStats,
    last_frame: Instant,
}

impl App {
    pub async fn new(window: Arc<Window>, args: &Args) -> Result<Self> {
        let renderer = Renderer::new(window.clone()).await?;
        let size = renderer.gfx.size;

        let mut camera = Camera::new(1.0);
        camera.set_viewport(size.width, size.height);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        let (catalog, status) = match Catalog::scan(&args.data_dir) {
            Ok(catalog) if catalog.is_empty() => {
                let msg = format!("No wells found under {}", args.data_dir.display());
                log::warn!("{}", msg);
                (catalog, Some(msg))
            }
            Ok(catalog) => (catalog, None),
            Err(e) => {
                log::error!("Failed to read data directory: {}", e);
                (Catalog::default(), Some(e.to_string()))
            }
        };
        let config = ViewerConfig::from_args(args, &catalog);
        log::info!(
            "Opening {}/{} ({}, {})",
            config.well,
            config.connection,
            config.simulation,
            config.colormap
        );

        let mut app = Self {
            renderer,
            camera,
            camera_controller: CameraController::new(),
            egui_ctx,
            egui_state,
            timeline: Timeline::new(TimeBounds::default(), config.speedup),
            material: AnimatedMaterial::new(config.technique),
            catalog,
            config,
            loader: Loader::new(),
            reload: SceneAssembler::new(),
            time_to_column: None,
            shoes: Vec::new(),
            timeline_preview: None,
            colormap_preview: None,
            status: None,
            stats: FrameStats::default(),
            last_frame: Instant::now(),
        };
        if status.is_some() {
            app.status = status;
        } else {
            app.request(Reload::ALL);
        }
        Ok(app)
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.camera.set_viewport(new_size.width, new_size.height);
        }
    }

    /// Returns true when egui consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        self.camera_controller.handle_event(event, &mut self.camera);

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        false
    }

    fn report(&mut self, what: &str, err: impl Display) {
        log::error!("{}: {}", what, err);
        self.status = Some(format!("{}: {}", what, err));
    }

    fn request(&mut self, reload: Reload) {
        if !reload.any() {
            return;
        }
        self.status = None;
        let dir = match self
            .catalog
            .connection(&self.config.well, &self.config.connection)
        {
            Ok(dir) => dir,
            Err(e) => return self.report("Cannot open connection", e),
        };
        // After an abandoned reload the shown scene belongs to another
        // selection, so an image alone cannot be applied to it.
        if reload.geometry || self.reload.needs_scene() {
            let batch = self.loader.request_scene(
                dir,
                self.config.mesh_options(),
                self.config.image_request(),
            );
            self.reload.begin(batch);
        } else {
            self.loader.request_image(dir, self.config.image_request());
        }
    }

    /// Routes one GUI event to the config, the timeline, the material or
    /// the loader.
    pub fn apply_event(&mut self, event: ConfigEvent) {
        let reload = self.config.apply(&event, &self.catalog);
        match event {
            ConfigEvent::Technique(technique) => {
                self.material = self.material.with_technique(technique);
                log::info!("Switched to {} shading", technique);
            }
            ConfigEvent::Speedup(_) => self.timeline.set_speedup(self.config.speedup),
            ConfigEvent::TogglePause => {
                let state = self.timeline.toggle_pause();
                log::debug!("Timeline {:?}", state);
            }
            ConfigEvent::ScrubTo(time) => {
                self.timeline.scrub_to(time);
            }
            _ => {}
        }
        self.request(reload);
    }

    /// Applies every finished, still-current load.
    pub fn poll_loads(&mut self) {
        for finished in self.loader.poll() {
            match self.reload.accept(finished) {
                Some(Update::Scene { geometry, image }) => self.swap_scene(geometry, &image),
                Some(Update::Image(image)) => {
                    if let Err(e) = self.swap_image(&image) {
                        self.report("Cannot upload data texture", e);
                    }
                }
                Some(Update::Failed { kind, error }) => {
                    self.report(&format!("{:?} load failed", kind), error)
                }
                None => {}
            }
        }
    }

    /// Mesh, time bounds, time mapping and texture change together. The
    /// texture goes up first since it is the only step that can fail.
    fn swap_scene(&mut self, geometry: LoadedGeometry, image: &DataTexture) {
        if let Err(e) = self.swap_image(image) {
            self.reload.abandon();
            return self.report("Cannot upload data texture", e);
        }

        let LoadedGeometry {
            model,
            time_bounds,
            time_to_column,
        } = geometry;

        self.renderer.scene = upload_scene(&self.renderer.gfx.device, &model);
        self.timeline.set_bounds(time_bounds);
        self.time_to_column = Some(time_to_column);
        self.camera.set_target_and_radius(model.centre, ORBIT_DISTANCE);
        self.shoes = model.shoes;
    }

    fn swap_image(&mut self, texture: &DataTexture) -> Result<()> {
        let gpu = upload_texture(&self.renderer.gfx.device, &self.renderer.gfx.queue, texture)?;
        self.material.set_texture(Arc::new(gpu));
        self.renderer
            .pipe
            .bind_material(&self.renderer.gfx.device, &self.material);

        let key = format!(
            "{}/{}/{}.png?cmap={}",
            self.config.well, self.config.connection, self.config.simulation, self.config.colormap
        );
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [texture.width() as usize, texture.height() as usize],
            texture.pixels(),
        );
        self.timeline_preview =
            Some(self.egui_ctx.load_texture(&key, image, egui::TextureOptions::NEAREST));
        self.timeline.set_background_image(Some(key));
        Ok(())
    }

    fn ensure_colormap_preview(&mut self) {
        let colormap = self.config.colormap;
        if matches!(&self.colormap_preview, Some((c, _)) if *c == colormap) {
            return;
        }
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [COLORMAP_PREVIEW_WIDTH as usize, 1],
            &colormap.strip(COLORMAP_PREVIEW_WIDTH),
        );
        let handle = self.egui_ctx.load_texture(
            format!("colormap/{}", colormap),
            image,
            egui::TextureOptions::LINEAR,
        );
        self.colormap_preview = Some((colormap, handle));
    }

    fn shoe_labels(&self) -> Vec<ShoeLabel> {
        if !self.config.show_markers {
            return Vec::new();
        }
        let ppp = self.egui_ctx.pixels_per_point();
        let size = self.renderer.gfx.size;
        let viewport = [size.width as f32, size.height as f32];
        self.shoes
            .iter()
            .filter_map(|shoe| {
                let [x, y] = self.camera.project(shoe.position, viewport)?;
                Some(ShoeLabel {
                    pos: egui::pos2(x / ppp, y / ppp),
                    text: shoe.label(),
                })
            })
            .collect()
    }

    /// One frame: apply loads, advance time, draw the scene, then the
    /// overlay on top of it.
    pub fn frame(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        self.poll_loads();

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.stats.record(dt);

        self.timeline.tick(dt);
        let column = match &self.time_to_column {
            Some(map) => map.map(self.timeline.current()),
            None => self.timeline.normalized_time(),
        };
        self.material.set_time(column as f32);

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render_scene(
            &swap_view,
            &self.camera,
            &self.material,
            self.config.show_markers,
        );
        let events = self.render_overlay(window, &swap_view);
        frame.present();

        for event in events {
            self.apply_event(event);
        }
        Ok(())
    }

    fn render_overlay(
        &mut self,
        window: &Window,
        swap_view: &wgpu::TextureView,
    ) -> Vec<ConfigEvent> {
        self.ensure_colormap_preview();
        let labels = self.shoe_labels();

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        let mut events = Vec::new();
        ui::draw_labels(&self.egui_ctx, &labels);
        ui::draw_config_panel(
            &self.egui_ctx,
            &self.config,
            &self.catalog,
            self.colormap_preview.as_ref().map(|(_, handle)| handle),
            &mut events,
        );
        ui::draw_timeline(
            &self.egui_ctx,
            &self.timeline,
            self.timeline_preview.as_ref(),
            &mut events,
        );
        if self.config.show_fps {
            ui::draw_hud(&self.egui_ctx, self.stats.fps());
        }
        if let Some(message) = &self.status {
            ui::draw_status(&self.egui_ctx, message);
        }

        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            // Load, not clear: the overlay sits on the finished scene.
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));

        events
    }
}
