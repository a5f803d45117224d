//! Per-frame parameters handed from the configuration to the renderer.

use nalgebra::Matrix3;

use crate::camera::CameraBasis;
use crate::config::EarthConfig;
use crate::lighting::{lighting_preset, sun_light_position, LightingPreset};
use crate::math::layer_orientation;
use crate::time::LayerRotation;

#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub camera: CameraBasis,
    pub aspect: f32,
    /// Unit vector pointing from the planet towards the sun.
    pub sun_dir: [f32; 3],
    pub lighting: LightingPreset,
    /// World-to-local transforms of the two spinning layers.
    pub body_inv_rotation: Matrix3<f64>,
    pub cloud_inv_rotation: Matrix3<f64>,
    pub show_clouds: bool,
    pub clouds_opacity: f32,
    pub show_atmosphere: bool,
    pub atmosphere_glow: f32,
}

pub fn frame_params(
    config: &EarthConfig,
    rotation: LayerRotation,
    camera: CameraBasis,
    aspect: f32,
) -> FrameParams {
    let sun = sun_light_position(config.sun_position).normalize();
    FrameParams {
        camera,
        aspect,
        sun_dir: [sun.x as f32, sun.y as f32, sun.z as f32],
        lighting: lighting_preset(config.high_contrast),
        body_inv_rotation: layer_orientation(rotation.body).transpose(),
        cloud_inv_rotation: layer_orientation(rotation.clouds).transpose(),
        show_clouds: config.show_clouds,
        clouds_opacity: config.clouds_opacity as f32,
        show_atmosphere: config.show_atmosphere,
        atmosphere_glow: config.atmosphere_glow as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use crate::controller::EarthController;
    use crate::error::ClockError;
    use crate::time::Clock;
    use chrono::{DateTime, TimeZone, Utc};

    struct Noon;

    impl Clock for Noon {
        fn now(&self) -> Result<DateTime<Utc>, ClockError> {
            Ok(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap())
        }
    }

    #[test]
    fn test_sun_sync_at_noon_lights_from_negative_z() {
        let mut controller = EarthController::with_clock(Noon);
        controller.toggle_sun_sync().unwrap();
        let rotation = controller.advance_frame(0.0).unwrap();
        let params = frame_params(controller.config(), rotation, OrbitCamera::default().basis(), 1.0);
        let [x, y, z] = params.sun_dir;
        assert!(x.abs() < 1e-6);
        assert_eq!(y, 0.0);
        assert!((z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_spin_sync_locks_cloud_layer_to_body() {
        let mut controller = EarthController::with_clock(Noon);
        controller.toggle_spin();
        let rotation = controller.advance_frame(42.0).unwrap();
        let params = frame_params(controller.config(), rotation, OrbitCamera::default().basis(), 1.0);
        assert_eq!(params.body_inv_rotation, params.cloud_inv_rotation);
    }

    #[test]
    fn test_drift_separates_cloud_layer() {
        let config = EarthConfig::default();
        let rotation = LayerRotation::artistic(100.0, 1.0);
        let params = frame_params(&config, rotation, OrbitCamera::default().basis(), 1.0);
        assert_ne!(params.body_inv_rotation, params.cloud_inv_rotation);
    }

    #[test]
    fn test_lighting_follows_contrast_flag() {
        let mut config = EarthConfig::default();
        config.high_contrast = false;
        let params = frame_params(&config, LayerRotation::default(), OrbitCamera::default().basis(), 1.0);
        assert_eq!(params.lighting, LightingPreset::GLOBE);
    }
}
