use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::integrator::VehicleState;

/// Horizontal distance of the camera behind the car.
pub const CHASE_DISTANCE: f32 = 6.0;
/// Camera height above the look target.
pub const CHASE_HEIGHT: f32 = 3.0;
/// Height of the point the camera aims at.
pub const LOOK_HEIGHT: f32 = 0.6;
/// Fraction of the remaining distance left after one second of smoothing.
pub const SMOOTHING_BASE: f32 = 0.001;
/// Where the camera starts before the first frame.
pub const INITIAL_POSITION: Vec3 = Vec3::new(0.0, 6.0, 10.0);

/// Lerp factor for one frame. Frame-rate independent: two steps of `dt/2`
/// cover the same share of the gap as one step of `dt`.
pub fn smoothing_factor(dt: f32) -> f32 {
    1.0 - SMOOTHING_BASE.powf(dt)
}

pub fn look_target(vehicle: &VehicleState) -> Vec3 {
    Vec3::new(vehicle.position.x, LOOK_HEIGHT, vehicle.position.y)
}

/// The offset rotates with the heading so the camera always sits behind.
pub fn chase_offset(heading: f32) -> Vec3 {
    Vec3::new(
        heading.sin() * -CHASE_DISTANCE,
        CHASE_HEIGHT,
        heading.cos() * -CHASE_DISTANCE,
    )
}

pub fn chase_target(vehicle: &VehicleState) -> Vec3 {
    look_target(vehicle) + chase_offset(vehicle.heading)
}

/// Third-person camera pose. Only the position lags; the aim point is exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: Vec3,
    pub look_target: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: INITIAL_POSITION,
            look_target: look_target(&VehicleState::default()),
        }
    }
}

impl CameraState {
    pub fn follow(&mut self, vehicle: &VehicleState, dt: f32) {
        let target = chase_target(vehicle);
        self.position = self.position.lerp(target, smoothing_factor(dt));
        self.look_target = look_target(vehicle);
    }

    /// Unit vector from the camera towards its aim point, or `None` when the
    /// two coincide.
    pub fn view_direction(&self) -> Option<Vec3> {
        (self.look_target - self.position).try_normalize()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn parked_at(x: f32, z: f32, heading: f32) -> VehicleState {
        VehicleState {
            speed: 0.0,
            heading,
            position: Vec2::new(x, z),
        }
    }

    #[test]
    fn chase_target_sits_behind_and_above() {
        let target = chase_target(&parked_at(0.0, 0.0, 0.0));
        assert!((target - Vec3::new(0.0, 3.6, -6.0)).length() < 1e-5);

        let target = chase_target(&parked_at(10.0, 5.0, std::f32::consts::FRAC_PI_2));
        assert!((target - Vec3::new(4.0, 3.6, 5.0)).length() < 1e-4);
    }

    #[test]
    fn converges_to_fixed_target() {
        let vehicle = parked_at(20.0, -40.0, 2.0);
        let mut camera = CameraState::default();
        for _ in 0..600 {
            camera.follow(&vehicle, 1.0 / 60.0);
        }
        assert!((camera.position - chase_target(&vehicle)).length() < 1e-3);
        assert_eq!(camera.look_target, Vec3::new(20.0, LOOK_HEIGHT, -40.0));
    }

    #[test]
    fn tiny_dt_barely_moves() {
        let vehicle = parked_at(100.0, 100.0, 0.0);
        let mut camera = CameraState::default();
        let before = camera.position;
        camera.follow(&vehicle, 1e-6);
        let gap = (chase_target(&vehicle) - before).length();
        assert!((camera.position - before).length() < gap * 1e-4);
    }

    #[test]
    fn smoothing_is_frame_rate_independent() {
        let one = smoothing_factor(0.1);
        let half = smoothing_factor(0.05);
        let remaining_after_two_halves = (1.0 - half) * (1.0 - half);
        assert!(((1.0 - one) - remaining_after_two_halves).abs() < 1e-6);
        assert!((smoothing_factor(1.0) - 0.999).abs() < 1e-6);
        assert_eq!(smoothing_factor(0.0), 0.0);
    }

    #[test]
    fn view_direction_points_at_car() {
        let camera = CameraState::default();
        let dir = camera.view_direction().unwrap();
        assert!(dir.z < 0.0 && dir.y < 0.0);
        let degenerate = CameraState {
            position: Vec3::ONE,
            look_target: Vec3::ONE,
        };
        assert!(degenerate.view_direction().is_none());
    }
}
