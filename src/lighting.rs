//! Lighting presets and sun light placement.

use nalgebra::Vector3;

/// Distance of the sun light from the origin, in scene units.
pub const SUN_DISTANCE: f64 = 15.0;
pub const SUN_COLOR: [f32; 3] = [1.0, 1.0, 240.0 / 255.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RimLight {
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
}

const BLUE_RIM: RimLight = RimLight {
    position: [-10.0, 5.0, -10.0],
    intensity: 0.8,
    color: [77.0 / 255.0, 136.0 / 255.0, 1.0],
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingPreset {
    pub ambient: f32,
    pub directional: f32,
    pub rim: Option<RimLight>,
}

impl LightingPreset {
    /// Deep shadows, bright sun, blue back light.
    pub const REALISTIC: LightingPreset = LightingPreset {
        ambient: 0.02,
        directional: 2.5,
        rim: Some(BLUE_RIM),
    };

    /// Evenly lit globe.
    pub const GLOBE: LightingPreset = LightingPreset {
        ambient: 2.5,
        directional: 0.5,
        rim: None,
    };

    pub fn label(&self) -> &'static str {
        if self.rim.is_some() { "ORBITAL" } else { "FLAT" }
    }
}

pub fn lighting_preset(high_contrast: bool) -> LightingPreset {
    if high_contrast {
        LightingPreset::REALISTIC
    } else {
        LightingPreset::GLOBE
    }
}

/// Position of the sun light on the horizontal circle of radius
/// [`SUN_DISTANCE`] for the given azimuth.
pub fn sun_light_position(sun_position: f64) -> Vector3<f64> {
    Vector3::new(
        sun_position.sin() * SUN_DISTANCE,
        0.0,
        sun_position.cos() * SUN_DISTANCE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_preset_selection() {
        let realistic = lighting_preset(true);
        assert_eq!(realistic.ambient, 0.02);
        assert_eq!(realistic.directional, 2.5);
        assert!(realistic.rim.is_some());

        let globe = lighting_preset(false);
        assert_eq!(globe.ambient, 2.5);
        assert_eq!(globe.directional, 0.5);
        assert!(globe.rim.is_none());
    }

    #[test]
    fn test_sun_at_noon_sits_behind_the_planet() {
        let p = sun_light_position(PI);
        assert!(p.x.abs() < 1e-9);
        assert_eq!(p.y, 0.0);
        assert!((p.z + 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_sun_stays_on_circle() {
        for i in 0..16 {
            let p = sun_light_position(i as f64 * 0.4);
            assert!((p.norm() - SUN_DISTANCE).abs() < 1e-9);
        }
    }
}
