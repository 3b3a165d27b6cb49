use bevy::prelude::*;

pub mod drive;
pub mod garage;
pub mod hud;
pub mod scene;

pub use drive::{ActiveSession, CarSelected, SpeedTelemetry};

/// Systems that run the drive demo each frame, strictly ordered.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DriveSystems {
    Input,
    Step,
    Present,
}

/// Registers the demo's scene, HUD, garage and frame loop. Expects an
/// [`ActiveSession`] resource to be inserted by the caller.
pub struct ApexDrivePlugin;

impl Plugin for ApexDrivePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .init_resource::<SpeedTelemetry>()
            .add_message::<CarSelected>()
            .add_systems(
                Startup,
                (scene::setup_scene, hud::setup_hud, garage::setup_garage),
            )
            .configure_sets(
                Update,
                (DriveSystems::Input, DriveSystems::Step, DriveSystems::Present).chain(),
            )
            .add_systems(
                Update,
                (drive::collect_keyboard_input, garage::handle_garage_buttons)
                    .chain()
                    .in_set(DriveSystems::Input),
            )
            .add_systems(Update, drive::step_session.in_set(DriveSystems::Step))
            .add_systems(
                Update,
                (
                    drive::sync_car_transform,
                    drive::sync_camera_transform,
                    scene::repaint_car,
                    hud::update_speed_readout,
                    hud::update_car_label,
                    garage::sync_garage_overlay,
                )
                    .in_set(DriveSystems::Present),
            );
    }
}
