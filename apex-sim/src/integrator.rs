use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::controls::ControlState;
use crate::profile::PerformanceProfile;

/// Speed lost per second while coasting, shared by every car.
pub const FRICTION: f32 = 2.0;
/// Reverse/back-pedal authority relative to forward acceleration.
pub const REVERSE_ACCEL_FRACTION: f32 = 0.7;
/// Reverse top speed relative to forward top speed.
pub const REVERSE_SPEED_FRACTION: f32 = 0.35;
/// Speed at which steering reaches full authority.
pub const FULL_STEER_SPEED: f32 = 30.0;
/// Internal speed units to km/h for the HUD.
pub const DISPLAY_SPEED_SCALE: f32 = 7.5;
/// Fixed height of the car above the ground plane.
pub const RIDE_HEIGHT: f32 = 0.3;

/// Steering authority in `[0, 1]`, ramping in linearly up to
/// [`FULL_STEER_SPEED`] regardless of the car's own top speed.
pub fn steer_scale(speed: f32) -> f32 {
    (speed.abs() / FULL_STEER_SPEED).min(1.0)
}

pub fn display_speed(speed: f32) -> f32 {
    speed.abs().max(0.0) * DISPLAY_SPEED_SCALE
}

/// Per-frame value published for the HUD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// km/h-scaled speed, always non-negative.
    pub display_speed: f32,
}

impl Telemetry {
    pub fn from_speed(speed: f32) -> Self {
        Self {
            display_speed: display_speed(speed),
        }
    }

    /// The readout as the HUD shows it.
    pub fn rounded(&self) -> i32 {
        self.display_speed.round() as i32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Signed, forward-positive.
    pub speed: f32,
    /// Yaw in radians; `(sin, cos)` is the forward direction on the ground.
    pub heading: f32,
    /// Ground position as `(x, z)`.
    pub position: Vec2,
}

impl VehicleState {
    pub fn forward(&self) -> Vec2 {
        Vec2::new(self.heading.sin(), self.heading.cos())
    }

    /// World position at ride height.
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.position.x, RIDE_HEIGHT, self.position.y)
    }

    pub fn steer_scale(&self) -> f32 {
        steer_scale(self.speed)
    }

    /// Advance one frame with explicit Euler, one step, no sub-stepping.
    ///
    /// `dt` is taken as given; any clamping policy belongs to the caller.
    pub fn integrate(
        &mut self,
        controls: &ControlState,
        profile: &PerformanceProfile,
        input_enabled: bool,
        dt: f32,
    ) -> Telemetry {
        let held = controls.gated(input_enabled);

        if held.forward {
            self.speed += profile.acceleration() * dt;
        }
        if held.back {
            self.speed -= profile.acceleration() * REVERSE_ACCEL_FRACTION * dt;
        }
        if held.brake {
            self.speed -= profile.brake_force() * dt;
        }

        let top_speed = profile.top_speed();
        self.speed = self
            .speed
            .clamp(-top_speed * REVERSE_SPEED_FRACTION, top_speed);

        // Brake does not count as a pedal here, so a braked car still coasts.
        if !held.forward && !held.back {
            let magnitude = (self.speed.abs() - FRICTION * dt).max(0.0);
            self.speed = magnitude.copysign(self.speed);
        }

        // Left and right held together cancel exactly.
        let turn = match (held.left, held.right) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        if turn != 0.0 {
            self.heading += turn * profile.steering_rate() * steer_scale(self.speed) * dt;
        }

        self.position += self.forward() * self.speed * dt;

        Telemetry::from_speed(self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn held(forward: bool, back: bool, left: bool, right: bool, brake: bool) -> ControlState {
        ControlState {
            forward,
            back,
            left,
            right,
            brake,
        }
    }

    #[test]
    fn coasting_decays_to_exactly_zero_without_sign_flip() {
        let profile = PerformanceProfile::default();
        for start in [45.0_f32, -17.0, 0.5] {
            let mut car = VehicleState {
                speed: start,
                ..Default::default()
            };
            let mut prev = car.speed.abs();
            for _ in 0..2000 {
                car.integrate(&ControlState::default(), &profile, true, DT);
                assert!(car.speed.abs() <= prev);
                assert!(car.speed == 0.0 || car.speed.signum() == start.signum());
                prev = car.speed.abs();
            }
            assert_eq!(car.speed, 0.0);
        }
    }

    #[test]
    fn speed_stays_within_bounds_for_any_held_combination() {
        let profile = PerformanceProfile::default();
        let mut car = VehicleState::default();
        for frame in 0..3000u32 {
            let bits = frame / 97;
            let controls = held(
                bits & 1 != 0,
                bits & 2 != 0,
                bits & 4 != 0,
                bits & 8 != 0,
                bits & 16 != 0,
            );
            let dt = if frame % 13 == 0 { 0.5 } else { DT };
            car.integrate(&controls, &profile, true, dt);
            assert!(car.speed <= 60.0);
            assert!(car.speed >= -21.0);
        }
    }

    #[test]
    fn steer_scale_ramps_and_saturates() {
        assert_eq!(steer_scale(0.0), 0.0);
        assert_eq!(steer_scale(15.0), 0.5);
        assert_eq!(steer_scale(-15.0), 0.5);
        assert_eq!(steer_scale(30.0), 1.0);
        assert_eq!(steer_scale(250.0), 1.0);
        for i in -100..=100 {
            let s = steer_scale(i as f32);
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn opposing_steer_cancels() {
        let profile = PerformanceProfile::default();
        let mut car = VehicleState {
            speed: 40.0,
            heading: 0.25,
            ..Default::default()
        };
        car.integrate(&held(true, false, true, true, false), &profile, true, DT);
        assert_eq!(car.heading, 0.25);
    }

    #[test]
    fn disabled_input_coasts_and_holds_heading() {
        let profile = PerformanceProfile::default();
        let mut car = VehicleState {
            speed: 40.0,
            heading: 1.0,
            ..Default::default()
        };
        let telemetry = car.integrate(&held(true, false, true, false, true), &profile, false, 0.5);
        assert_eq!(car.heading, 1.0);
        assert_eq!(car.speed, 39.0);
        assert_eq!(telemetry.display_speed, 39.0 * DISPLAY_SPEED_SCALE);
    }

    #[test]
    fn back_from_rest_moves_against_heading() {
        let profile = PerformanceProfile::default();
        let mut car = VehicleState {
            heading: 0.6,
            ..Default::default()
        };
        for _ in 0..30 {
            car.integrate(&held(false, true, false, false, false), &profile, true, DT);
        }
        assert!(car.speed < 0.0);
        let forward = car.forward();
        let travelled = car.position.dot(forward);
        assert!(travelled < 0.0);
        // Motion stays on the heading line.
        assert!(car.position.perp_dot(forward).abs() < 1e-4);
    }

    #[test]
    fn braking_past_zero_reaches_reverse() {
        let profile = PerformanceProfile::default();
        let mut car = VehicleState {
            speed: 1.0,
            ..Default::default()
        };
        car.integrate(&held(false, false, false, false, true), &profile, true, 0.25);
        // 1 - 18*0.25 = -3.5, then friction removes 0.5.
        assert!((car.speed - -3.0).abs() < 1e-5);
    }

    #[test]
    fn brake_still_allows_friction() {
        let profile = PerformanceProfile::default();
        let mut car = VehicleState {
            speed: 30.0,
            ..Default::default()
        };
        car.integrate(&held(false, false, false, false, true), &profile, true, 0.5);
        assert!((car.speed - (30.0 - 9.0 - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn position_follows_heading_vector() {
        let profile = PerformanceProfile::default();
        let mut car = VehicleState {
            speed: 10.0,
            heading: std::f32::consts::FRAC_PI_2,
            ..Default::default()
        };
        car.integrate(&held(true, false, false, false, false), &profile, true, 0.1);
        // speed after accel: 11.4
        assert!((car.position.x - 1.14).abs() < 1e-4);
        assert!(car.position.y.abs() < 1e-4);
        assert_eq!(car.world_position().y, RIDE_HEIGHT);
    }

    #[test]
    fn hud_readout_rounds() {
        assert_eq!(Telemetry::from_speed(-3.0).display_speed, 22.5);
        assert_eq!(Telemetry::from_speed(-3.0).rounded(), 23);
        assert_eq!(Telemetry::from_speed(0.0).rounded(), 0);
    }
}
