//! Settings window: sun, rotation, lighting and layer controls.

use std::f64::consts::TAU;

use eframe::egui;
use tracing::warn;

use crate::app::OrbitalApp;
use crate::config::{MAX_ATMOSPHERE_GLOW, MAX_ROTATION_SPEED};
use crate::interface::{utc_clock_label, ACCENT, LIVE};

/// Small pill button; green while `active`.
fn mode_button(ui: &mut egui::Ui, active: bool, label: &str) -> egui::Response {
    let text = egui::RichText::new(label.to_uppercase()).small().strong();
    let text = if active { text.color(LIVE) } else { text.weak() };
    ui.add(egui::Button::new(text).selected(active))
}

pub(crate) fn speed_label(speed: f64) -> String {
    format!("{:.0}%", speed * 100.0)
}

impl OrbitalApp {
    pub(crate) fn show_settings(&mut self, ui: &mut egui::Ui) {
        let config = self.controller.config().clone();
        let clock = utc_clock_label(chrono::Utc::now());

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("System Config").strong().color(ACCENT));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⟳ Default").clicked() {
                    self.controller.reset();
                }
            });
        });
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("☀ Sun Position");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if config.is_real_time() { "UTC Sync" } else { "Manual" };
                if mode_button(ui, config.is_real_time(), label).clicked() {
                    if let Err(e) = self.controller.toggle_sun_sync() {
                        warn!(error = %e, "sun sync could not read the clock");
                    }
                }
            });
        });
        let mut sun = config.sun_position;
        let slider = egui::Slider::new(&mut sun, 0.0..=TAU).step_by(0.01).show_value(false);
        if ui.add_enabled(!config.is_real_time(), slider).changed() {
            self.controller.set_manual_sun(sun);
        }
        if config.is_real_time() {
            ui.label(egui::RichText::new(&clock).monospace().small().color(LIVE));
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label("⟳ Earth Rotation");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if config.real_time_spin() { "Real-time" } else { "Auto-Cam" };
                if mode_button(ui, config.real_time_spin(), label).clicked() {
                    self.controller.toggle_spin();
                }
            });
        });
        if config.real_time_spin() {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("SPIN: 1 REV / 24 HRS").monospace().small().color(LIVE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(&clock).monospace().small().weak());
                });
            });
        } else {
            ui.horizontal(|ui| {
                let mut speed = config.rotation_speed;
                let slider = egui::Slider::new(&mut speed, 0.0..=MAX_ROTATION_SPEED)
                    .step_by(0.1)
                    .show_value(false);
                if ui.add(slider).changed() {
                    self.controller.set_rotation_speed(speed);
                }
                ui.label(egui::RichText::new(speed_label(config.rotation_speed)).monospace().small());
            });
        }

        ui.add_space(6.0);
        ui.columns(2, |cols| {
            let (icon, label) = if config.high_contrast { ("☾", "Realistic") } else { ("☀", "Globe Mode") };
            if cols[0].add(egui::Button::new(format!("{icon} {label}")).selected(!config.high_contrast)).clicked() {
                self.controller.set_high_contrast(!config.high_contrast);
            }
            let eye = if config.show_clouds { "👁" } else { "○" };
            if cols[1].add(egui::Button::new(format!("{eye} Clouds")).selected(config.show_clouds)).clicked() {
                self.controller.set_show_clouds(!config.show_clouds);
            }
        });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label("Cloud opacity");
            let mut opacity = config.clouds_opacity;
            let slider = egui::Slider::new(&mut opacity, 0.0..=1.0).step_by(0.05);
            if ui.add_enabled(config.show_clouds, slider).changed() {
                self.controller.set_clouds_opacity(opacity);
            }
        });

        let mut show_atmosphere = config.show_atmosphere;
        if ui.checkbox(&mut show_atmosphere, "Atmosphere").changed() {
            self.controller.set_show_atmosphere(show_atmosphere);
        }
        ui.horizontal(|ui| {
            ui.label("Glow");
            let mut glow = config.atmosphere_glow;
            let slider = egui::Slider::new(&mut glow, 0.0..=MAX_ATMOSPHERE_GLOW).step_by(0.1);
            if ui.add_enabled(config.show_atmosphere, slider).changed() {
                self.controller.set_atmosphere_glow(glow);
            }
        });
    }
}
