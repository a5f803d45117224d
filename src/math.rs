//! Rotation matrices and spherical coordinates.

use nalgebra::{Matrix3, Vector3};

/// Axial tilt applied to the whole planet group, in radians (about 23°).
pub const AXIAL_TILT: f64 = 0.401;

pub fn rotation_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, 0.0, s,
        0.0, 1.0, 0.0,
        -s, 0.0, c,
    )
}

pub fn rotation_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, -s, 0.0,
        s, c, 0.0,
        0.0, 0.0, 1.0,
    )
}

/// Local-to-world orientation of a layer spun by `spin` inside the tilted
/// planet group.
pub fn layer_orientation(spin: f64) -> Matrix3<f64> {
    rotation_z(AXIAL_TILT) * rotation_y(spin)
}

/// Cartesian position for a radius, polar angle from +Y and azimuth about +Y
/// measured from +Z.
pub fn spherical_to_cartesian(radius: f64, polar: f64, azimuth: f64) -> Vector3<f64> {
    let sin_polar = polar.sin();
    Vector3::new(
        radius * sin_polar * azimuth.sin(),
        radius * polar.cos(),
        radius * sin_polar * azimuth.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_rotation_y_quarter_turn_maps_z_to_x() {
        let v = rotation_y(FRAC_PI_2) * Vector3::new(0.0, 0.0, 1.0);
        assert!((v - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_layer_orientation_is_orthonormal() {
        let m = layer_orientation(1.234);
        assert!((m * m.transpose() - Matrix3::identity()).norm() < 1e-12);
        assert!((m.determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spherical_front_and_pole() {
        let front = spherical_to_cartesian(6.5, FRAC_PI_2, 0.0);
        assert!((front - Vector3::new(0.0, 0.0, 6.5)).norm() < 1e-12);
        let pole = spherical_to_cartesian(2.0, 0.0, PI);
        assert!((pole - Vector3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
    }
}
