use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Physical key identifiers the demo reacts to.
///
/// Names follow the DOM `KeyboardEvent.code` spelling so scripted input files
/// can be written the same way a browser would report keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyId {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyG,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    /// Number row key, `1..=9`.
    Digit(u8),
    Other,
}

impl KeyId {
    pub fn code(&self) -> String {
        match self {
            KeyId::KeyW => "KeyW".to_string(),
            KeyId::KeyA => "KeyA".to_string(),
            KeyId::KeyS => "KeyS".to_string(),
            KeyId::KeyD => "KeyD".to_string(),
            KeyId::KeyG => "KeyG".to_string(),
            KeyId::ArrowUp => "ArrowUp".to_string(),
            KeyId::ArrowDown => "ArrowDown".to_string(),
            KeyId::ArrowLeft => "ArrowLeft".to_string(),
            KeyId::ArrowRight => "ArrowRight".to_string(),
            KeyId::Space => "Space".to_string(),
            KeyId::Digit(n) => format!("Digit{n}"),
            KeyId::Other => "Other".to_string(),
        }
    }
}

impl FromStr for KeyId {
    type Err = std::convert::Infallible;

    /// Unknown codes parse to [`KeyId::Other`] so they flow through the
    /// sampler and get ignored there.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let key = match code {
            "KeyW" => KeyId::KeyW,
            "KeyA" => KeyId::KeyA,
            "KeyS" => KeyId::KeyS,
            "KeyD" => KeyId::KeyD,
            "KeyG" => KeyId::KeyG,
            "ArrowUp" => KeyId::ArrowUp,
            "ArrowDown" => KeyId::ArrowDown,
            "ArrowLeft" => KeyId::ArrowLeft,
            "ArrowRight" => KeyId::ArrowRight,
            "Space" => KeyId::Space,
            other => match other.strip_prefix("Digit").and_then(|d| d.parse::<u8>().ok()) {
                Some(n @ 1..=9) => KeyId::Digit(n),
                _ => KeyId::Other,
            },
        };
        Ok(key)
    }
}

/// The five held-key flags the integrator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Back,
    Left,
    Right,
    Brake,
}

impl Control {
    /// Map a physical key to the control it drives, if any.
    pub fn from_key(key: KeyId) -> Option<Self> {
        match key {
            KeyId::KeyW | KeyId::ArrowUp => Some(Control::Forward),
            KeyId::KeyS | KeyId::ArrowDown => Some(Control::Back),
            KeyId::KeyA | KeyId::ArrowLeft => Some(Control::Left),
            KeyId::KeyD | KeyId::ArrowRight => Some(Control::Right),
            KeyId::Space => Some(Control::Brake),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyId,
    pub action: KeyAction,
}

impl KeyEvent {
    pub fn press(key: KeyId) -> Self {
        Self {
            key,
            action: KeyAction::Press,
        }
    }

    pub fn release(key: KeyId) -> Self {
        Self {
            key,
            action: KeyAction::Release,
        }
    }
}

/// Currently held control flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub brake: bool,
}

impl ControlState {
    /// Apply one key event. Unmapped keys are ignored and repeated presses are
    /// no-ops.
    pub fn apply(&mut self, event: &KeyEvent) {
        let Some(control) = Control::from_key(event.key) else {
            return;
        };
        self.set(control, event.action == KeyAction::Press);
    }

    pub fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Forward => self.forward = held,
            Control::Back => self.back = held,
            Control::Left => self.left = held,
            Control::Right => self.right = held,
            Control::Brake => self.brake = held,
        }
    }

    pub fn is_held(&self, control: Control) -> bool {
        match control {
            Control::Forward => self.forward,
            Control::Back => self.back,
            Control::Left => self.left,
            Control::Right => self.right,
            Control::Brake => self.brake,
        }
    }

    /// The flags as the integrator should see them. Disabled input reads as
    /// nothing held while the stored flags stay intact for re-enable.
    pub fn gated(&self, enabled: bool) -> ControlState {
        if enabled { *self } else { ControlState::default() }
    }
}

/// Key events collected between frames, drained once per frame boundary.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<KeyEvent>,
}

impl InputQueue {
    pub fn push(&mut self, event: KeyEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every queued event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = KeyEvent> + '_ {
        self.events.drain(..)
    }
}
