//! Kinematic car model and chase camera for the Apex Drive demo.
//!
//! Everything here is engine-agnostic: the Bevy shell and the headless replay
//! tool both drive a [`DriveSession`] one frame at a time.

pub mod camera;
pub mod catalog;
pub mod config;
pub mod controls;
pub mod integrator;
pub mod profile;
pub mod script;
pub mod session;

pub use camera::CameraState;
pub use catalog::{CarColor, Catalog, CatalogEntry, CatalogError};
pub use config::{ConfigError, DriveConfig, SessionConfig};
pub use controls::{Control, ControlState, InputQueue, KeyAction, KeyEvent, KeyId};
pub use integrator::{Telemetry, VehicleState};
pub use profile::{PerformanceProfile, ProfileError};
pub use script::{InputScript, ScriptError};
pub use session::{DriveSession, FrameReport, GARAGE_KEY, SessionError};
