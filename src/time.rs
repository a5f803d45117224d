//! Time-of-day to angle conversions.
//!
//! Derives the sun azimuth and the planet spin angle from a UTC instant,
//! and the artistic auto-rotation used when the spin is not synced.

use std::f64::consts::PI;
use chrono::{DateTime, Timelike, Utc};
use crate::error::ClockError;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const HOURS_PER_DAY: f64 = 24.0;

/// Offset added to the raw sun angle so that the light lines up with the
/// texture orientation of the planet mesh. Empirical.
pub const SUN_CALIBRATION_OFFSET: f64 = PI;
/// Offset applied to the spin angle so the reference meridian faces the
/// viewing axis at 12:00 UTC.
pub const SPIN_CALIBRATION_OFFSET: f64 = -PI;
/// Sun azimuth used as the baseline whenever spin sync is switched on.
pub const SPIN_SYNC_SUN_POSITION: f64 = PI;

/// Artistic drift multiplier for the planet body.
pub const BODY_DRIFT: f64 = 0.2;
/// Artistic drift multiplier for the cloud layer. Slightly faster than the
/// body so the clouds slide over the surface.
pub const CLOUD_DRIFT: f64 = 0.22;

/// Source of the current UTC time.
pub trait Clock {
    fn now(&self) -> Result<DateTime<Utc>, ClockError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<DateTime<Utc>, ClockError> {
        Ok(Utc::now())
    }
}

/// Sun azimuth in radians for the given instant, at minute granularity.
///
/// 12:00 UTC maps to the calibration offset and the angle advances by one
/// full turn per 24 hours. The result lies in `[0, 2π)`.
pub fn sun_angle(timestamp: DateTime<Utc>) -> f64 {
    let decimal_hours = timestamp.hour() as f64 + timestamp.minute() as f64 / 60.0;
    let raw = ((decimal_hours - 12.0) / HOURS_PER_DAY) * 2.0 * PI;
    raw + SUN_CALIBRATION_OFFSET
}

/// Planet rotation about the vertical axis for the given instant, with
/// millisecond precision. The result lies in `[-π, π)`.
pub fn spin_angle(timestamp: DateTime<Utc>) -> f64 {
    let millis = (timestamp.nanosecond() / 1_000_000).min(999);
    let seconds_in_day = timestamp.hour() as f64 * 3600.0
        + timestamp.minute() as f64 * 60.0
        + timestamp.second() as f64
        + millis as f64 / 1000.0;
    let day_fraction = seconds_in_day / SECONDS_PER_DAY;
    day_fraction * 2.0 * PI + SPIN_CALIBRATION_OFFSET
}

/// Rotation of the body and cloud layers for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerRotation {
    pub body: f64,
    pub clouds: f64,
}

impl LayerRotation {
    /// Both layers locked to the real-time spin angle.
    pub fn synced(angle: f64) -> Self {
        Self { body: angle, clouds: angle }
    }

    /// Free-running rotation driven by elapsed render time.
    pub fn artistic(elapsed_secs: f64, rotation_speed: f64) -> Self {
        Self {
            body: elapsed_secs * rotation_speed * BODY_DRIFT,
            clouds: elapsed_secs * rotation_speed * CLOUD_DRIFT,
        }
    }
}
