use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controls::{KeyAction, KeyEvent, KeyId};
use crate::session::{DriveSession, FrameReport, SessionError};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse script: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("dt must be a positive number, got {0}")]
    InvalidDt(f32),
    #[error("event {index} uses unknown key `{key}`")]
    UnknownKey { index: usize, key: String },
    #[error("event {index} is scheduled at frame {frame} but the script has {frames} frames")]
    EventOutOfRange { index: usize, frame: u64, frames: u64 },
}

/// One scheduled key transition.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScriptedEvent {
    /// Zero-based frame before which the event is delivered.
    pub frame: u64,
    /// DOM key code, e.g. `KeyW` or `ArrowLeft`.
    pub key: String,
    pub action: KeyAction,
}

/// A deterministic input recording, replayed frame by frame.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InputScript {
    #[serde(default = "default_dt")]
    pub dt: f32,
    pub frames: u64,
    /// Catalog index to select before the first frame.
    #[serde(default)]
    pub car: Option<usize>,
    #[serde(default)]
    pub events: Vec<ScriptedEvent>,
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

impl InputScript {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ScriptError> {
        let script: InputScript = toml::from_str(text)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ScriptError::InvalidDt(self.dt));
        }
        for (index, event) in self.events.iter().enumerate() {
            if event.frame >= self.frames {
                return Err(ScriptError::EventOutOfRange {
                    index,
                    frame: event.frame,
                    frames: self.frames,
                });
            }
            if event.key.parse::<KeyId>() == Ok(KeyId::Other) {
                return Err(ScriptError::UnknownKey {
                    index,
                    key: event.key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Key events due before `frame`, in file order.
    fn events_at(&self, frame: u64) -> impl Iterator<Item = KeyEvent> + '_ {
        self.events
            .iter()
            .filter(move |e| e.frame == frame)
            .filter_map(|e| {
                let key = e.key.parse::<KeyId>().ok()?;
                Some(match e.action {
                    KeyAction::Press => KeyEvent::press(key),
                    KeyAction::Release => KeyEvent::release(key),
                })
            })
    }

    /// Select the script's car, if it names one, then step `session` through
    /// every frame of the script.
    pub fn run<'a>(
        &'a self,
        session: &'a mut DriveSession,
    ) -> Result<impl Iterator<Item = FrameReport> + 'a, SessionError> {
        if let Some(index) = self.car {
            session.select_car(index)?;
        }
        Ok((0..self.frames).map(move |frame| {
            for event in self.events_at(frame) {
                session.push_key(event);
            }
            session.frame(self.dt)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::SessionConfig;

    const SCRIPT: &str = r#"
dt = 0.5
frames = 4

[[events]]
frame = 0
key = "KeyW"
action = "press"

[[events]]
frame = 2
key = "ArrowUp"
action = "release"
"#;

    #[test]
    fn events_fire_on_their_frame() {
        let script = InputScript::from_toml_str(SCRIPT).unwrap();
        let mut session = DriveSession::new(Catalog::builtin(), SessionConfig::default()).unwrap();
        let speeds: Vec<f32> = script
            .run(&mut session)
            .unwrap()
            .map(|r| r.vehicle.speed)
            .collect();
        assert_eq!(speeds, vec![7.0, 14.0, 13.0, 12.0]);
    }

    #[test]
    fn defaults_to_sixty_hz() {
        let script = InputScript::from_toml_str("frames = 10").unwrap();
        assert_eq!(script.dt, 1.0 / 60.0);
        assert!(script.events.is_empty());
        assert_eq!(script.car, None);
    }

    #[test]
    fn rejects_unknown_keys_and_late_events() {
        let bad_key = SCRIPT.replace("ArrowUp", "KeyQ");
        assert!(matches!(
            InputScript::from_toml_str(&bad_key),
            Err(ScriptError::UnknownKey { index: 1, .. })
        ));

        let late = SCRIPT.replace("frame = 2", "frame = 4");
        assert!(matches!(
            InputScript::from_toml_str(&late),
            Err(ScriptError::EventOutOfRange { frame: 4, .. })
        ));

        assert!(matches!(
            InputScript::from_toml_str("dt = -1.0\nframes = 1"),
            Err(ScriptError::InvalidDt(_))
        ));
    }

    #[test]
    fn run_selects_the_scripted_car() {
        let script = InputScript::from_toml_str(&format!("car = 7\n{SCRIPT}")).unwrap();
        let mut session = DriveSession::new(Catalog::builtin(), SessionConfig::default()).unwrap();
        let reports: Vec<_> = script.run(&mut session).unwrap().collect();
        assert!(reports.iter().all(|r| r.car == 7));
        // Rimac Nevera pulls 17 m/s² against the default car's 14.
        assert_eq!(reports[0].vehicle.speed, 8.5);
    }

    #[test]
    fn run_rejects_a_car_outside_the_catalog() {
        let script = InputScript::from_toml_str("frames = 3\ncar = 8").unwrap();
        let mut session = DriveSession::new(Catalog::builtin(), SessionConfig::default()).unwrap();
        assert_eq!(
            script.run(&mut session).err(),
            Some(SessionError::CarOutOfRange { index: 8, len: 8 })
        );
        assert_eq!(session.frame_count(), 0);
    }
}
