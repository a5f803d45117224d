//! Owner of the Earth configuration and the real-time sync lifecycle.
//!
//! All changes to [`EarthConfig`] go through the operations here. Sun sync
//! runs on a polled one-minute [`IntervalTimer`] that exists only while the
//! mode is active; spin sync is recomputed every frame.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use crate::config::{normalize_angle, EarthConfig, SyncMode, MAX_ATMOSPHERE_GLOW, MAX_ROTATION_SPEED};
use crate::error::ClockError;
use crate::time::{spin_angle, sun_angle, Clock, LayerRotation, SystemClock, SPIN_SYNC_SUN_POSITION};

pub const SUN_SYNC_PERIOD_SECS: i64 = 60;

/// Fixed-cadence trigger. Fires on the first poll, then once per period.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: TimeDelta,
    next_due: Option<DateTime<Utc>>,
}

impl IntervalTimer {
    pub fn new(period: TimeDelta) -> Self {
        Self { period, next_due: None }
    }

    /// Returns true when the timer is due at `now` and schedules the next run.
    ///
    /// A due time more than one period ahead means the wall clock stepped
    /// backwards; the timer fires and reschedules from `now`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_due {
            Some(due) if now < due && due - now <= self.period => false,
            _ => {
                self.next_due = Some(now + self.period);
                true
            }
        }
    }

    #[cfg(test)]
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }
}

pub struct EarthController<C: Clock = SystemClock> {
    config: EarthConfig,
    sun_timer: Option<IntervalTimer>,
    last_rotation: LayerRotation,
    clock: C,
}

impl EarthController<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for EarthController<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> EarthController<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            config: EarthConfig::default(),
            sun_timer: None,
            last_rotation: LayerRotation::default(),
            clock,
        }
    }

    pub fn config(&self) -> &EarthConfig {
        &self.config
    }

    pub fn last_rotation(&self) -> LayerRotation {
        self.last_rotation
    }

    #[cfg(test)]
    pub fn sun_timer_active(&self) -> bool {
        self.sun_timer.is_some()
    }

    /// Sets the sun azimuth from the slider. Ignored while sun sync owns it.
    pub fn set_manual_sun(&mut self, angle: f64) -> bool {
        if self.config.is_real_time() {
            debug!("manual sun angle ignored while sun sync is active");
            return false;
        }
        self.config.sun_position = normalize_angle(angle);
        true
    }

    pub fn set_rotation_speed(&mut self, speed: f64) {
        self.config.rotation_speed = speed.clamp(0.0, MAX_ROTATION_SPEED);
    }

    pub fn set_clouds_opacity(&mut self, opacity: f64) {
        self.config.clouds_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_atmosphere_glow(&mut self, glow: f64) {
        self.config.atmosphere_glow = glow.clamp(0.0, MAX_ATMOSPHERE_GLOW);
    }

    pub fn set_show_clouds(&mut self, show: bool) {
        self.config.show_clouds = show;
    }

    pub fn set_show_atmosphere(&mut self, show: bool) {
        self.config.show_atmosphere = show;
    }

    pub fn set_high_contrast(&mut self, high_contrast: bool) {
        self.config.high_contrast = high_contrast;
    }

    /// Flips sun sync. Turning it on switches spin sync off and reconciles
    /// the sun angle immediately; turning it off cancels the timer.
    pub fn toggle_sun_sync(&mut self) -> Result<(), ClockError> {
        if self.config.is_real_time() {
            self.config.sync_mode = SyncMode::Manual;
            self.sun_timer = None;
            info!(mode = self.config.sync_mode.label(), "sun sync off");
            return Ok(());
        }
        self.config.sync_mode = SyncMode::SunSync;
        self.sun_timer = Some(IntervalTimer::new(TimeDelta::seconds(SUN_SYNC_PERIOD_SECS)));
        info!(mode = self.config.sync_mode.label(), "sun sync on");
        self.tick().map(|_| ())
    }

    /// Flips spin sync. Turning it on switches sun sync off and parks the
    /// sun at the reference azimuth.
    pub fn toggle_spin(&mut self) {
        if self.config.real_time_spin() {
            self.config.sync_mode = SyncMode::Manual;
            info!(mode = self.config.sync_mode.label(), "spin sync off");
            return;
        }
        self.config.sync_mode = SyncMode::SpinSync;
        self.config.sun_position = SPIN_SYNC_SUN_POSITION;
        self.sun_timer = None;
        info!(mode = self.config.sync_mode.label(), "spin sync on");
    }

    /// Restores the default configuration and drops any running timer.
    pub fn reset(&mut self) {
        self.config = EarthConfig::default();
        self.sun_timer = None;
        info!("configuration reset to defaults");
    }

    /// Runs the sun reconciliation if its timer is due. Returns whether the
    /// sun angle was updated. On a clock fault the angle is left unchanged.
    pub fn tick(&mut self) -> Result<bool, ClockError> {
        let Some(timer) = self.sun_timer.as_mut() else {
            return Ok(false);
        };
        let now = self.clock.now()?;
        if !timer.poll(now) {
            return Ok(false);
        }
        self.config.sun_position = sun_angle(now);
        debug!(sun_position = self.config.sun_position, "sun reconciled");
        Ok(true)
    }

    /// Computes this frame's rotation for the body and cloud layers.
    ///
    /// On a clock fault during spin sync the previous rotation is kept.
    pub fn advance_frame(&mut self, elapsed_secs: f64) -> Result<LayerRotation, ClockError> {
        let rotation = if self.config.real_time_spin() {
            LayerRotation::synced(spin_angle(self.clock.now()?))
        } else {
            LayerRotation::artistic(elapsed_secs, self.config.rotation_speed)
        };
        self.last_rotation = rotation;
        Ok(rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;
    use std::f64::consts::PI;
    use std::rc::Rc;

    #[derive(Clone)]
    struct TestClock(Rc<Cell<Option<DateTime<Utc>>>>);

    impl TestClock {
        fn at(t: DateTime<Utc>) -> Self {
            Self(Rc::new(Cell::new(Some(t))))
        }
        fn set(&self, t: Option<DateTime<Utc>>) {
            self.0.set(t);
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Result<DateTime<Utc>, ClockError> {
            self.0.get().ok_or_else(|| ClockError::Unavailable("stopped".into()))
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_interval_timer_fires_immediately_then_every_period() {
        let mut timer = IntervalTimer::new(TimeDelta::seconds(60));
        let t0 = noon();
        assert!(timer.poll(t0));
        assert!(!timer.poll(t0 + TimeDelta::seconds(59)));
        assert!(timer.poll(t0 + TimeDelta::seconds(60)));
        assert_eq!(timer.next_due(), Some(t0 + TimeDelta::seconds(120)));
    }

    #[test]
    fn test_interval_timer_recovers_from_backward_clock_step() {
        let mut timer = IntervalTimer::new(TimeDelta::seconds(60));
        let t0 = noon();
        assert!(timer.poll(t0));

        let stepped = t0 - TimeDelta::hours(1);
        let fired = (0..10)
            .filter(|m| timer.poll(stepped + TimeDelta::minutes(*m)))
            .count();
        assert_eq!(fired, 10);
        assert_eq!(timer.next_due(), Some(stepped + TimeDelta::minutes(10)));
    }

    #[test]
    fn test_sun_sync_keeps_cadence_after_backward_clock_step() {
        let clock = TestClock::at(noon());
        let mut c = EarthController::with_clock(clock.clone());
        c.toggle_sun_sync().unwrap();

        let stepped = noon() - TimeDelta::hours(2);
        clock.set(Some(stepped));
        assert!(c.tick().unwrap());
        assert_eq!(c.config().sun_position, sun_angle(stepped));

        clock.set(Some(stepped + TimeDelta::seconds(30)));
        assert!(!c.tick().unwrap());
    }

    #[test]
    fn test_sun_sync_sets_angle_on_activation() {
        let mut c = EarthController::with_clock(TestClock::at(noon()));
        c.toggle_sun_sync().unwrap();
        assert!(c.config().is_real_time());
        assert!((c.config().sun_position - PI).abs() < 1e-12);
        assert!(c.sun_timer_active());
    }

    #[test]
    fn test_sun_sync_updates_once_per_minute() {
        let clock = TestClock::at(noon());
        let mut c = EarthController::with_clock(clock.clone());
        c.toggle_sun_sync().unwrap();

        clock.set(Some(noon() + TimeDelta::seconds(30)));
        assert!(!c.tick().unwrap());

        clock.set(Some(noon() + TimeDelta::minutes(6)));
        assert!(c.tick().unwrap());
        let expected = sun_angle(noon() + TimeDelta::minutes(6));
        assert_eq!(c.config().sun_position, expected);
    }

    #[test]
    fn test_turning_sun_sync_off_cancels_timer() {
        let clock = TestClock::at(noon());
        let mut c = EarthController::with_clock(clock.clone());
        c.toggle_sun_sync().unwrap();
        c.toggle_sun_sync().unwrap();
        assert!(!c.sun_timer_active());

        let before = c.config().sun_position;
        clock.set(Some(noon() + TimeDelta::hours(3)));
        assert!(!c.tick().unwrap());
        assert_eq!(c.config().sun_position, before);
    }

    #[test]
    fn test_mode_exclusivity() {
        let mut c = EarthController::with_clock(TestClock::at(noon()));
        c.toggle_sun_sync().unwrap();
        c.toggle_spin();
        assert!(!c.config().is_real_time());
        assert!(c.config().real_time_spin());
        assert!(!c.sun_timer_active());

        c.toggle_sun_sync().unwrap();
        assert!(c.config().is_real_time());
        assert!(!c.config().real_time_spin());
    }

    #[test]
    fn test_spin_activation_parks_sun_at_reference() {
        let mut c = EarthController::with_clock(TestClock::at(noon()));
        c.set_manual_sun(1.0);
        c.toggle_spin();
        assert_eq!(c.config().sun_position, SPIN_SYNC_SUN_POSITION);

        c.toggle_spin();
        assert_eq!(c.config().sync_mode, SyncMode::Manual);
        assert_eq!(c.config().sun_position, SPIN_SYNC_SUN_POSITION);
    }

    #[test]
    fn test_manual_sun_ignored_during_sun_sync() {
        let mut c = EarthController::with_clock(TestClock::at(noon()));
        assert!(c.set_manual_sun(2.0));
        c.toggle_sun_sync().unwrap();
        assert!(!c.set_manual_sun(0.5));
        assert!((c.config().sun_position - PI).abs() < 1e-12);
    }

    #[test]
    fn test_manual_sun_is_normalized() {
        let mut c = EarthController::with_clock(TestClock::at(noon()));
        c.set_manual_sun(-PI / 2.0);
        assert!((c.config().sun_position - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut c = EarthController::with_clock(TestClock::at(noon()));
        c.set_rotation_speed(1.7);
        c.set_clouds_opacity(0.3);
        c.set_atmosphere_glow(2.0);
        c.set_show_clouds(false);
        c.set_show_atmosphere(false);
        c.set_high_contrast(false);
        c.toggle_spin();
        c.toggle_sun_sync().unwrap();

        c.reset();
        assert_eq!(c.config(), &EarthConfig::default());
        assert!(!c.sun_timer_active());
    }

    #[test]
    fn test_setters_clamp() {
        let mut c = EarthController::with_clock(TestClock::at(noon()));
        c.set_rotation_speed(5.0);
        c.set_clouds_opacity(-1.0);
        c.set_atmosphere_glow(-3.0);
        assert_eq!(c.config().rotation_speed, MAX_ROTATION_SPEED);
        assert_eq!(c.config().clouds_opacity, 0.0);
        assert_eq!(c.config().atmosphere_glow, 0.0);
    }

    #[test]
    fn test_clock_fault_leaves_sun_angle_unchanged() {
        let clock = TestClock::at(noon());
        let mut c = EarthController::with_clock(clock.clone());
        c.set_manual_sun(2.0);
        clock.set(None);
        assert!(matches!(c.toggle_sun_sync(), Err(ClockError::Unavailable(_))));
        assert!(c.config().is_real_time());
        assert_eq!(c.config().sun_position, 2.0);

        clock.set(Some(noon()));
        assert!(c.tick().unwrap());
        assert!((c.config().sun_position - PI).abs() < 1e-12);
    }

    #[test]
    fn test_advance_frame_modes() {
        let clock = TestClock::at(noon());
        let mut c = EarthController::with_clock(clock.clone());
        let drift = c.advance_frame(10.0).unwrap();
        assert!((drift.body - 10.0 * 0.1 * 0.2).abs() < 1e-12);
        assert!((drift.clouds - 10.0 * 0.1 * 0.22).abs() < 1e-12);

        c.toggle_spin();
        let synced = c.advance_frame(10.0).unwrap();
        assert_eq!(synced, LayerRotation::synced(0.0));

        clock.set(None);
        assert!(c.advance_frame(11.0).is_err());
        assert_eq!(c.last_rotation(), synced);
    }
}
