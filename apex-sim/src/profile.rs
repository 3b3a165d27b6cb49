use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("top_speed must be greater than zero, got {0}")]
    ZeroTopSpeed(f32),
}

/// Per-vehicle driving constants.
///
/// Only constructible through [`PerformanceProfile::new`] (or deserialization,
/// which goes through the same checks), so the integrator never sees negative
/// or non-finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile", into = "RawProfile")]
pub struct PerformanceProfile {
    acceleration: f32,
    top_speed: f32,
    brake_force: f32,
    steering_rate: f32,
}

impl PerformanceProfile {
    pub fn new(
        acceleration: f32,
        top_speed: f32,
        brake_force: f32,
        steering_rate: f32,
    ) -> Result<Self, ProfileError> {
        let acceleration = non_negative("acceleration", acceleration)?;
        let top_speed = non_negative("top_speed", top_speed)?;
        let brake_force = non_negative("brake_force", brake_force)?;
        let steering_rate = non_negative("steering_rate", steering_rate)?;
        if top_speed == 0.0 {
            return Err(ProfileError::ZeroTopSpeed(top_speed));
        }
        Ok(Self {
            acceleration,
            top_speed,
            brake_force,
            steering_rate,
        })
    }

    /// Forward acceleration, units per second squared.
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    pub fn top_speed(&self) -> f32 {
        self.top_speed
    }

    pub fn brake_force(&self) -> f32 {
        self.brake_force
    }

    /// Heading change at full steering authority, radians per second.
    pub fn steering_rate(&self) -> f32 {
        self.steering_rate
    }
}

impl Default for PerformanceProfile {
    /// The demo car's tuning.
    fn default() -> Self {
        Self {
            acceleration: 14.0,
            top_speed: 60.0,
            brake_force: 18.0,
            steering_rate: 1.8,
        }
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<f32, ProfileError> {
    if !value.is_finite() {
        return Err(ProfileError::NotFinite { field, value });
    }
    if value < 0.0 {
        return Err(ProfileError::Negative { field, value });
    }
    Ok(value)
}

#[derive(Serialize, Deserialize)]
struct RawProfile {
    acceleration: f32,
    top_speed: f32,
    brake_force: f32,
    steering_rate: f32,
}

impl TryFrom<RawProfile> for PerformanceProfile {
    type Error = ProfileError;

    fn try_from(raw: RawProfile) -> Result<Self, Self::Error> {
        PerformanceProfile::new(
            raw.acceleration,
            raw.top_speed,
            raw.brake_force,
            raw.steering_rate,
        )
    }
}

impl From<PerformanceProfile> for RawProfile {
    fn from(profile: PerformanceProfile) -> Self {
        Self {
            acceleration: profile.acceleration,
            top_speed: profile.top_speed,
            brake_force: profile.brake_force,
            steering_rate: profile.steering_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_demo_tuning() {
        let profile = PerformanceProfile::default();
        assert_eq!(
            profile,
            PerformanceProfile::new(14.0, 60.0, 18.0, 1.8).unwrap()
        );
    }

    #[test]
    fn rejects_negative_and_non_finite_values() {
        assert_eq!(
            PerformanceProfile::new(-1.0, 60.0, 18.0, 1.8),
            Err(ProfileError::Negative {
                field: "acceleration",
                value: -1.0
            })
        );
        assert!(matches!(
            PerformanceProfile::new(14.0, 60.0, f32::NAN, 1.8),
            Err(ProfileError::NotFinite {
                field: "brake_force",
                ..
            })
        ));
        assert!(matches!(
            PerformanceProfile::new(14.0, f32::INFINITY, 18.0, 1.8),
            Err(ProfileError::NotFinite {
                field: "top_speed",
                ..
            })
        ));
        assert_eq!(
            PerformanceProfile::new(14.0, 0.0, 18.0, 1.8),
            Err(ProfileError::ZeroTopSpeed(0.0))
        );
    }

    #[test]
    fn zero_rates_are_allowed() {
        let profile = PerformanceProfile::new(0.0, 10.0, 0.0, 0.0).unwrap();
        assert_eq!(profile.steering_rate(), 0.0);
    }

    #[test]
    fn deserialization_runs_validation() {
        let ok: PerformanceProfile = toml::from_str(
            "acceleration = 14.0\ntop_speed = 60.0\nbrake_force = 18.0\nsteering_rate = 1.8\n",
        )
        .unwrap();
        assert_eq!(ok.top_speed(), 60.0);

        let err = toml::from_str::<PerformanceProfile>(
            "acceleration = 14.0\ntop_speed = -60.0\nbrake_force = 18.0\nsteering_rate = 1.8\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("top_speed must not be negative"));
    }
}
