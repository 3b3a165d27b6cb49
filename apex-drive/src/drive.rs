use apex_sim::{DriveSession, KeyEvent, KeyId, Telemetry};
use bevy::{
    input::{ButtonState, keyboard::KeyboardInput},
    prelude::*,
};

/// The single driving session for this run of the demo.
#[derive(Resource)]
pub struct ActiveSession(pub DriveSession);

/// Latest value published for the HUD. Last write wins.
#[derive(Resource, Default)]
pub struct SpeedTelemetry {
    pub latest: Telemetry,
}

/// Sent when the active catalog entry changes, including the first frame.
#[derive(Message)]
pub struct CarSelected {
    pub index: usize,
}

#[derive(Component)]
pub struct PlayerCar;

#[derive(Component)]
pub struct ChaseCamera;

pub fn key_id(code: KeyCode) -> KeyId {
    match code {
        KeyCode::KeyW => KeyId::KeyW,
        KeyCode::KeyA => KeyId::KeyA,
        KeyCode::KeyS => KeyId::KeyS,
        KeyCode::KeyD => KeyId::KeyD,
        KeyCode::KeyG => KeyId::KeyG,
        KeyCode::ArrowUp => KeyId::ArrowUp,
        KeyCode::ArrowDown => KeyId::ArrowDown,
        KeyCode::ArrowLeft => KeyId::ArrowLeft,
        KeyCode::ArrowRight => KeyId::ArrowRight,
        KeyCode::Space => KeyId::Space,
        KeyCode::Digit1 => KeyId::Digit(1),
        KeyCode::Digit2 => KeyId::Digit(2),
        KeyCode::Digit3 => KeyId::Digit(3),
        KeyCode::Digit4 => KeyId::Digit(4),
        KeyCode::Digit5 => KeyId::Digit(5),
        KeyCode::Digit6 => KeyId::Digit(6),
        KeyCode::Digit7 => KeyId::Digit(7),
        KeyCode::Digit8 => KeyId::Digit(8),
        KeyCode::Digit9 => KeyId::Digit(9),
        _ => KeyId::Other,
    }
}

/// Forward raw key transitions into the session queue. OS auto-repeat is
/// dropped; the session only cares about edges.
pub fn collect_keyboard_input(
    mut keyboard_events: MessageReader<KeyboardInput>,
    mut session: ResMut<ActiveSession>,
) {
    for event in keyboard_events.read() {
        if event.repeat {
            continue;
        }
        let key = key_id(event.key_code);
        if key == KeyId::Other {
            continue;
        }
        session.0.push_key(match event.state {
            ButtonState::Pressed => KeyEvent::press(key),
            ButtonState::Released => KeyEvent::release(key),
        });
    }
}

pub fn step_session(
    time: Res<Time>,
    mut session: ResMut<ActiveSession>,
    mut telemetry: ResMut<SpeedTelemetry>,
    mut selected: MessageWriter<CarSelected>,
    mut last_car: Local<Option<usize>>,
) {
    let report = session.0.frame(time.delta_secs());
    telemetry.latest = report.telemetry;

    if *last_car != Some(report.car) {
        *last_car = Some(report.car);
        selected.write(CarSelected { index: report.car });
    }
}

pub fn sync_car_transform(
    session: Res<ActiveSession>,
    mut car_query: Query<&mut Transform, With<PlayerCar>>,
) {
    let vehicle = session.0.vehicle();
    for mut transform in &mut car_query {
        transform.translation = Vec3::from_array(vehicle.world_position().to_array());
        transform.rotation = Quat::from_rotation_y(vehicle.heading);
    }
}

pub fn sync_camera_transform(
    session: Res<ActiveSession>,
    mut camera_query: Query<&mut Transform, (With<ChaseCamera>, Without<PlayerCar>)>,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };
    // The core links its own glam, so values cross as arrays.
    let camera = session.0.camera();
    transform.translation = Vec3::from_array(camera.position.to_array());
    if camera.view_direction().is_some() {
        transform.look_at(Vec3::from_array(camera.look_target.to_array()), Vec3::Y);
    }
}
