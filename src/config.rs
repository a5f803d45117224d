//! Visualization parameters for the Earth view.
//!
//! `EarthConfig` is the single record read by the renderer and the panels.
//! It is owned by [`crate::controller::EarthController`], which is the only
//! place that changes it.

use std::f64::consts::TAU;

pub const MAX_ROTATION_SPEED: f64 = 2.0;
pub const MAX_ATMOSPHERE_GLOW: f64 = 3.0;

/// Which real-time source, if any, drives the scene.
///
/// Sun sync and spin sync are mutually exclusive, so they share one field
/// instead of two booleans that could both be set.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SyncMode {
    /// Sun angle from the slider, rotation from the artistic drift.
    #[default]
    Manual,
    /// Sun angle follows UTC; rotation keeps drifting.
    SunSync,
    /// Planet rotation follows UTC; sun held at the reference azimuth.
    SpinSync,
}

impl SyncMode {
    pub fn label(&self) -> &'static str {
        match self {
            SyncMode::Manual => "Manual",
            SyncMode::SunSync => "Sun sync",
            SyncMode::SpinSync => "Spin sync",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EarthConfig {
    pub rotation_speed: f64,
    pub clouds_opacity: f64,
    pub atmosphere_glow: f64,
    pub show_clouds: bool,
    pub show_atmosphere: bool,
    /// Sun azimuth in `[0, 2π)`.
    pub sun_position: f64,
    /// Realistic lighting when set, flat globe lighting otherwise.
    pub high_contrast: bool,
    pub sync_mode: SyncMode,
}

impl Default for EarthConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 0.1,
            clouds_opacity: 1.0,
            atmosphere_glow: 1.0,
            show_clouds: true,
            show_atmosphere: true,
            sun_position: 4.5,
            high_contrast: true,
            sync_mode: SyncMode::Manual,
        }
    }
}

impl EarthConfig {
    /// Sun angle is computed from UTC rather than taken from the slider.
    pub fn is_real_time(&self) -> bool {
        self.sync_mode == SyncMode::SunSync
    }

    /// Planet rotation is computed from UTC rather than drifting.
    pub fn real_time_spin(&self) -> bool {
        self.sync_mode == SyncMode::SpinSync
    }
}

pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}
