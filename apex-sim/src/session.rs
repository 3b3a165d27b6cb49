use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::CameraState;
use crate::catalog::{Catalog, CatalogEntry};
use crate::config::SessionConfig;
use crate::controls::{ControlState, InputQueue, KeyAction, KeyEvent, KeyId};
use crate::integrator::{Telemetry, VehicleState};

/// Key that opens and closes the garage overlay.
pub const GARAGE_KEY: KeyId = KeyId::KeyG;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("car index {index} is out of range, catalog has {len} cars")]
    CarOutOfRange { index: usize, len: usize },
    #[error("max_frame_dt must be a positive number, got {0}")]
    InvalidMaxFrameDt(f32),
}

/// Everything one frame produced, handed to the renderer and the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: u64,
    /// The `dt` actually integrated, after the clamp policy.
    pub dt: f32,
    pub car: usize,
    pub input_enabled: bool,
    pub steer_scale: f32,
    pub vehicle: VehicleState,
    pub camera: CameraState,
    pub telemetry: Telemetry,
}

/// Owns the frame loop state: held keys, the car, the camera and the garage
/// selection.
///
/// Key events are queued with [`DriveSession::push_key`] and only take effect
/// at the start of the next [`DriveSession::frame`].
#[derive(Debug)]
pub struct DriveSession {
    catalog: Catalog,
    active: usize,
    config: SessionConfig,
    controls: ControlState,
    queue: InputQueue,
    vehicle: VehicleState,
    camera: CameraState,
    garage_open: bool,
    frame: u64,
}

impl DriveSession {
    pub fn new(catalog: Catalog, config: SessionConfig) -> Result<Self, SessionError> {
        if catalog.get(config.initial_car).is_none() {
            return Err(SessionError::CarOutOfRange {
                index: config.initial_car,
                len: catalog.len(),
            });
        }
        if let Some(max) = config.max_frame_dt {
            if !(max.is_finite() && max > 0.0) {
                return Err(SessionError::InvalidMaxFrameDt(max));
            }
        }
        Ok(Self {
            catalog,
            active: config.initial_car,
            garage_open: config.start_in_garage,
            config,
            controls: ControlState::default(),
            queue: InputQueue::default(),
            vehicle: VehicleState::default(),
            camera: CameraState::default(),
            frame: 0,
        })
    }

    pub fn push_key(&mut self, event: KeyEvent) {
        self.queue.push(event);
    }

    /// Swap the active profile. The car keeps its speed, heading and position.
    pub fn select_car(&mut self, index: usize) -> Result<(), SessionError> {
        let Some(entry) = self.catalog.get(index) else {
            return Err(SessionError::CarOutOfRange {
                index,
                len: self.catalog.len(),
            });
        };
        if index != self.active {
            tracing::info!(car = %entry.name, index, "selected car");
        }
        self.active = index;
        Ok(())
    }

    pub fn set_garage_open(&mut self, open: bool) {
        if open != self.garage_open {
            tracing::debug!(open, "garage toggled");
        }
        self.garage_open = open;
    }

    pub fn garage_open(&self) -> bool {
        self.garage_open
    }

    pub fn input_enabled(&self) -> bool {
        !self.garage_open
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_entry(&self) -> &CatalogEntry {
        // `active` is only ever set to an index the catalog accepted.
        &self.catalog.entries()[self.active]
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Run one frame: drain input, integrate the car, move the camera.
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        let events: Vec<KeyEvent> = self.queue.drain().collect();
        for event in &events {
            self.handle_key(event);
        }

        let dt = self.effective_dt(dt);
        let telemetry = if dt > 0.0 {
            let profile = self.active_entry().profile;
            let enabled = self.input_enabled();
            let telemetry = self
                .vehicle
                .integrate(&self.controls, &profile, enabled, dt);
            self.camera.follow(&self.vehicle, dt);
            telemetry
        } else {
            Telemetry::from_speed(self.vehicle.speed)
        };

        self.frame += 1;
        FrameReport {
            frame: self.frame,
            dt,
            car: self.active,
            input_enabled: self.input_enabled(),
            steer_scale: self.vehicle.steer_scale(),
            vehicle: self.vehicle,
            camera: self.camera,
            telemetry,
        }
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        // Flags are recorded even while the garage is open so held keys are
        // still correct when driving resumes.
        self.controls.apply(event);

        if event.action != KeyAction::Press {
            return;
        }
        match event.key {
            GARAGE_KEY => self.set_garage_open(!self.garage_open),
            KeyId::Digit(n) if self.garage_open => {
                // Shortcuts are one-based; `Digit(0)` has no slot.
                let Some(index) = usize::from(n).checked_sub(1) else {
                    return;
                };
                if let Err(err) = self.select_car(index) {
                    tracing::debug!(%err, "ignoring garage shortcut");
                }
            }
            _ => {}
        }
    }

    fn effective_dt(&self, dt: f32) -> f32 {
        if !(dt.is_finite() && dt > 0.0) {
            tracing::trace!(dt, "skipping frame with unusable dt");
            return 0.0;
        }
        match self.config.max_frame_dt {
            Some(max) if dt > max => {
                tracing::debug!(dt, max, "clamping frame dt");
                max
            }
            _ => dt,
        }
    }
}
