//! Orbit camera around the planet.
//!
//! Drag to orbit, scroll to zoom between fixed distance limits, damped
//! motion, and optional auto-rotation about the vertical axis.

use std::f64::consts::{PI, TAU};
use nalgebra::Vector3;

use crate::math::spherical_to_cartesian;

pub const START_DISTANCE: f64 = 6.5;
pub const MIN_DISTANCE: f64 = 3.5;
pub const MAX_DISTANCE: f64 = 20.0;
pub const FOV_DEG: f64 = 35.0;
pub const ZOOM_SPEED: f64 = 0.5;
pub const ROTATE_SPEED: f64 = 0.4;
pub const DAMPING: f64 = 0.05;
const POLAR_EPS: f64 = 1e-6;

/// Camera position and orthonormal view basis handed to the shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub position: Vector3<f64>,
    pub forward: Vector3<f64>,
    pub right: Vector3<f64>,
    pub up: Vector3<f64>,
    pub tan_half_fov: f64,
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    azimuth: f64,
    polar: f64,
    distance: f64,
    delta_azimuth: f64,
    delta_polar: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            polar: PI / 2.0,
            distance: START_DISTANCE,
            delta_azimuth: 0.0,
            delta_polar: 0.0,
        }
    }
}

impl OrbitCamera {
    #[cfg(test)]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[cfg(test)]
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn position(&self) -> Vector3<f64> {
        spherical_to_cartesian(self.distance, self.polar, self.azimuth)
    }

    /// Pointer drag in screen points over a viewport of the given height.
    pub fn drag(&mut self, dx: f64, dy: f64, viewport_height: f64) {
        if viewport_height <= 0.0 {
            return;
        }
        self.delta_azimuth -= TAU * dx / viewport_height * ROTATE_SPEED;
        self.delta_polar -= TAU * dy / viewport_height * ROTATE_SPEED;
    }

    /// Scroll input; positive values move the camera closer.
    pub fn zoom(&mut self, scroll: f64) {
        if scroll == 0.0 {
            return;
        }
        let scale = 0.95_f64.powf(ZOOM_SPEED);
        self.distance = if scroll > 0.0 {
            self.distance * scale
        } else {
            self.distance / scale
        }
        .clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Advances damping and auto-rotation by `dt` seconds.
    ///
    /// Auto-rotation completes one orbit every `60 / speed` seconds.
    pub fn update(&mut self, dt: f64, auto_rotate: bool, auto_rotate_speed: f64) {
        if auto_rotate {
            self.delta_azimuth -= TAU / 60.0 * auto_rotate_speed * dt;
        }
        self.azimuth = (self.azimuth + self.delta_azimuth * DAMPING).rem_euclid(TAU);
        self.polar = (self.polar + self.delta_polar * DAMPING).clamp(POLAR_EPS, PI - POLAR_EPS);
        self.delta_azimuth *= 1.0 - DAMPING;
        self.delta_polar *= 1.0 - DAMPING;
    }

    pub fn basis(&self) -> CameraBasis {
        let position = self.position();
        let forward = (-position).normalize();
        let right = forward.cross(&Vector3::y()).normalize();
        let up = right.cross(&forward);
        CameraBasis {
            position,
            forward,
            right,
            up,
            tan_half_fov: (FOV_DEG.to_radians() / 2.0).tan(),
        }
    }
}
