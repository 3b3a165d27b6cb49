use std::path::PathBuf;

use apex_drive::{ActiveSession, ApexDrivePlugin};
use apex_sim::{Catalog, DriveConfig, DriveSession, SessionConfig};
use bevy::prelude::*;

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("APEX_DRIVE_CONFIG").ok())
        .map(PathBuf::from);

    let mut app = App::new();
    app.add_plugins((
        DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Apex Drive".to_string(),
                ..default()
            }),
            ..default()
        }),
        ApexDrivePlugin,
    ));

    // Logging is live once DefaultPlugins is built.
    let session = load_session(config_path);
    info!(car = %session.active_entry().name, "starting drive session");

    app.insert_resource(ActiveSession(session)).run();
}

fn load_session(config_path: Option<PathBuf>) -> DriveSession {
    let mut config = match config_path {
        Some(path) => DriveConfig::load(&path).unwrap_or_else(|err| {
            warn!("Ignoring config: {err}");
            DriveConfig::default()
        }),
        None => DriveConfig::default(),
    };
    if let Ok(catalog) = std::env::var("APEX_DRIVE_CATALOG") {
        config.catalog = Some(catalog.into());
    }

    let catalog = config.load_catalog().unwrap_or_else(|err| {
        warn!("Falling back to the built-in garage: {err}");
        Catalog::builtin()
    });

    match DriveSession::new(catalog.clone(), config.session) {
        Ok(session) => session,
        Err(err) => {
            warn!("Invalid session settings, using defaults: {err}");
            DriveSession::new(catalog, SessionConfig::default())
                .unwrap_or_else(|err| panic!("Default session rejected: {err}"))
        }
    }
}
