//! Overlay panels drawn on top of the planet: header, status readout,
//! settings window and the chat window.

use chrono::{DateTime, Utc};
use eframe::egui;

use crate::app::OrbitalApp;
use crate::chat::ChatRole;
use crate::config::EarthConfig;
use crate::lighting::lighting_preset;

pub(crate) const ACCENT: egui::Color32 = egui::Color32::from_rgb(34, 211, 238);
pub(crate) const LIVE: egui::Color32 = egui::Color32::from_rgb(74, 222, 128);
const MARGIN: f32 = 16.0;

pub(crate) fn utc_clock_label(now: DateTime<Utc>) -> String {
    now.format("%H:%M:%S UTC").to_string()
}

pub(crate) fn version_label() -> String {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        format!("v{}", env!("CARGO_PKG_VERSION"))
    } else {
        format!("v{} ({hash})", env!("CARGO_PKG_VERSION"))
    }
}

/// Label/value pairs for the status readout, and whether each is live.
pub(crate) fn status_lines(config: &EarthConfig) -> [(&'static str, &'static str, bool); 3] {
    [
        ("LIGHT_MODE:", lighting_preset(config.high_contrast).label(), config.high_contrast),
        (
            "SUN SYNC:",
            if config.is_real_time() { "UTC LIVE" } else { "MANUAL" },
            config.is_real_time(),
        ),
        (
            "EARTH SPIN:",
            if config.real_time_spin() { "UTC LIVE" } else { "SIMULATED" },
            config.real_time_spin(),
        ),
    ]
}

fn overlay_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(egui::Color32::from_black_alpha(160))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_white_alpha(25)))
        .corner_radius(12)
        .inner_margin(egui::Margin::same(12))
}

impl OrbitalApp {
    pub(crate) fn show_interface(&mut self, ctx: &egui::Context) {
        self.show_header(ctx);
        self.show_status(ctx);
        self.show_chat(ctx);

        let mut open = self.settings_open;
        egui::Window::new("settings")
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-MARGIN, 72.0))
            .default_width(300.0)
            .frame(overlay_frame())
            .open(&mut open)
            .show(ctx, |ui| self.show_settings(ui));
        self.settings_open = open;
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("header"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(MARGIN, MARGIN))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                overlay_frame().show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new("🌐").size(22.0).color(ACCENT));
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new("Orbital View").heading().strong());
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new("● LIVE FEED").monospace().small().color(LIVE));
                                ui.label(egui::RichText::new(version_label()).monospace().small().weak());
                            });
                        });
                    });
                });
            });

        egui::Area::new(egui::Id::new("settings_btn"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-MARGIN, MARGIN + 8.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let gear = egui::RichText::new("⚙").size(22.0);
                let gear = if self.settings_open { gear.color(ACCENT) } else { gear };
                if ui.add(egui::Button::new(gear).selected(self.settings_open)).clicked() {
                    self.settings_open = !self.settings_open;
                }
            });
    }

    fn show_status(&self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("status"))
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(MARGIN, -MARGIN))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                overlay_frame().show(ui, |ui| {
                    ui.label(egui::RichText::new("ℹ Status").small().strong().color(ACCENT));
                    egui::Grid::new("status_grid").num_columns(2).spacing([16.0, 2.0]).show(ui, |ui| {
                        for (label, value, live) in status_lines(self.controller.config()) {
                            ui.label(egui::RichText::new(label).monospace().small().weak());
                            let value = egui::RichText::new(value).monospace().small();
                            ui.label(if live { value.color(LIVE) } else { value });
                            ui.end_row();
                        }
                    });
                });
            });
    }

    fn show_chat(&mut self, ctx: &egui::Context) {
        if !self.chat.open {
            egui::Area::new(egui::Id::new("chat_btn"))
                .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-MARGIN, -MARGIN))
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    let label = egui::RichText::new("✨ Ask Orbital").strong().color(ACCENT);
                    if ui.add(egui::Button::new(label).min_size(egui::vec2(140.0, 40.0))).clicked() {
                        self.chat.open = true;
                    }
                });
            return;
        }

        let mut open = true;
        egui::Window::new("Orbital Guide")
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-MARGIN, -MARGIN))
            .default_size([400.0, 560.0])
            .collapsible(false)
            .frame(overlay_frame())
            .open(&mut open)
            .show(ctx, |ui| self.show_chat_body(ui));
        if !open {
            self.chat.open = false;
        }
    }

    fn show_chat_body(&mut self, ui: &mut egui::Ui) {
        let input_height = 36.0;
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .max_height(ui.available_height() - input_height)
            .show(ui, |ui| {
                for msg in self.chat.messages() {
                    let user = msg.role == ChatRole::User;
                    let layout = if user {
                        egui::Layout::top_down(egui::Align::Max)
                    } else {
                        egui::Layout::top_down(egui::Align::Min)
                    };
                    ui.with_layout(layout, |ui| {
                        let fill = if user {
                            egui::Color32::from_rgba_unmultiplied(34, 211, 238, 40)
                        } else {
                            egui::Color32::from_white_alpha(12)
                        };
                        egui::Frame::new()
                            .fill(fill)
                            .corner_radius(10)
                            .inner_margin(egui::Margin::same(10))
                            .show(ui, |ui| {
                                ui.set_max_width(ui.available_width() * 0.85);
                                ui.label(&msg.text);
                            });
                        ui.label(egui::RichText::new(msg.role.label()).monospace().small().weak());
                    });
                    ui.add_space(6.0);
                }
                if self.chat.is_pending() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(egui::RichText::new("PROCESSING...").monospace().small().color(ACCENT));
                    });
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            let pending = self.chat.is_pending();
            let can_send = !pending && !self.chat.input.trim().is_empty();
            let send_width = 36.0;
            let edit = egui::TextEdit::singleline(&mut self.chat.input)
                .hint_text("Ask about Earth...")
                .desired_width(ui.available_width() - send_width);
            let response = ui.add(edit);
            let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui.add_enabled(can_send, egui::Button::new("➤")).clicked();
            if (entered || clicked) && self.chat.submit() {
                response.request_focus();
            }
        });
    }
}
