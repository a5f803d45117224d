//! Application shell and eframe integration.
//!
//! Owns the controller, camera, chat session and renderer, and runs the
//! per-frame loop: poll background work, tick the clocks, move the camera,
//! paint the planet and draw the overlays.

use std::sync::{mpsc, Arc};

use eframe::{egui, egui_glow, glow};
use egui::mutex::Mutex;
use tracing::{error, info, warn};

use crate::camera::OrbitCamera;
use crate::chat::ChatSession;
use crate::controller::EarthController;
use crate::gemini::GeminiBackend;
use crate::options::AppOptions;
use crate::renderer::SphereRenderer;
use crate::scene::frame_params;
use crate::texture::{spawn_texture_loads, TextureResult};

pub(crate) struct OrbitalApp {
    pub(crate) controller: EarthController,
    pub(crate) camera: OrbitCamera,
    pub(crate) chat: ChatSession,
    pub(crate) settings_open: bool,
    renderer: Option<Arc<Mutex<SphereRenderer>>>,
    texture_rx: Option<mpsc::Receiver<TextureResult>>,
}

impl OrbitalApp {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>, options: &AppOptions) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = egui::Color32::BLACK;
        visuals.window_fill = egui::Color32::from_black_alpha(210);
        visuals.extreme_bg_color = egui::Color32::from_gray(12);
        cc.egui_ctx.set_visuals(visuals);

        let renderer = match cc.gl.as_ref() {
            Some(gl) => match SphereRenderer::new(gl) {
                Ok(r) => Some(Arc::new(Mutex::new(r))),
                Err(e) => {
                    error!(error = %e, "sphere renderer unavailable");
                    None
                }
            },
            None => {
                error!("glow backend required; the planet will not be drawn");
                None
            }
        };

        let texture_rx = spawn_texture_loads(options.assets.dir.clone(), options.assets.download_missing);
        info!(dir = %options.assets.dir.display(), download = options.assets.download_missing, "loading textures");

        let backend = Arc::new(GeminiBackend::new(options.chat.clone()));

        Self {
            controller: EarthController::new(),
            camera: OrbitCamera::default(),
            chat: ChatSession::new(backend),
            settings_open: false,
            renderer,
            texture_rx: Some(texture_rx),
        }
    }

    fn poll_textures(&mut self, frame: &eframe::Frame) {
        let Some(rx) = &self.texture_rx else { return };
        let mut finished = false;
        loop {
            match rx.try_recv() {
                Ok((kind, Ok(tex))) => {
                    info!(?kind, width = tex.width, height = tex.height, "texture ready");
                    if let (Some(gl), Some(renderer)) = (frame.gl(), &self.renderer) {
                        if let Err(e) = renderer.lock().upload(gl, kind, &tex) {
                            warn!(?kind, error = %e, "texture upload failed");
                        }
                    }
                }
                Ok((kind, Err(e))) => {
                    warn!(?kind, error = %e, "texture unavailable, keeping placeholder");
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    finished = true;
                    break;
                }
            }
        }
        if finished {
            self.texture_rx = None;
        }
    }

    fn show_planet(&mut self, ui: &mut egui::Ui, elapsed: f64) {
        let rect = ui.max_rect();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

        if response.dragged() {
            let delta = response.drag_delta();
            self.camera.drag(delta.x as f64, delta.y as f64, rect.height() as f64);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            self.camera.zoom(scroll as f64);
        }

        let rotation = self.controller.advance_frame(elapsed).unwrap_or_else(|e| {
            warn!(error = %e, "clock read failed, holding last rotation");
            self.controller.last_rotation()
        });

        let Some(renderer) = self.renderer.clone() else { return };
        let aspect = rect.width() / rect.height().max(1.0);
        let params = frame_params(self.controller.config(), rotation, self.camera.basis(), aspect);

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |_info, painter| {
                renderer.lock().paint(painter.gl(), &params);
            })),
        };
        ui.painter().add(callback);
    }
}

impl eframe::App for OrbitalApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.poll_textures(frame);
        self.chat.poll();

        if let Err(e) = self.controller.tick() {
            warn!(error = %e, "sun sync tick skipped");
        }

        let (elapsed, dt) = ctx.input(|i| (i.time, i.stable_dt as f64));
        let config = self.controller.config();
        let (auto_rotate, speed) = (!config.real_time_spin(), config.rotation_speed);
        self.camera.update(dt, auto_rotate, speed);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| self.show_planet(ui, elapsed));

        self.show_interface(ctx);

        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            if let Some(ref renderer) = self.renderer {
                renderer.lock().destroy(gl);
            }
        }
    }
}
