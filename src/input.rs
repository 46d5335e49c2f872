//! Input snapshot and end-of-run restart gating
//!
//! The listener layer (keyboard, gamepad, test harness) feeds timestamped
//! `KeyEvent`s. The simulation reads the held-key `InputSnapshot` once per
//! tick and routes raw events through the `RestartGate` while a run is over.

use serde::{Deserialize, Serialize};

/// Logical game keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Fire,
}

/// A key transition stamped with the simulation clock (ms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
    pub at_ms: f64,
}

impl KeyEvent {
    pub fn press(key: Key, at_ms: f64) -> Self {
        Self {
            key,
            pressed: true,
            at_ms,
        }
    }

    pub fn release(key: Key, at_ms: f64) -> Self {
        Self {
            key,
            pressed: false,
            at_ms,
        }
    }
}

/// Held state of every game key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl InputSnapshot {
    pub fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Left => self.left = held,
            Key::Right => self.right = held,
            Key::Up => self.up = held,
            Key::Down => self.down = held,
            Key::Fire => self.fire = held,
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Up => self.up,
            Key::Down => self.down,
            Key::Fire => self.fire,
        }
    }

    pub fn apply(&mut self, event: &KeyEvent) {
        self.set(event.key, event.pressed);
    }

    pub fn any_held(&self) -> bool {
        self.left || self.right || self.up || self.down || self.fire
    }

    /// Release everything (avoids stuck keys across mode transitions)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Gate deciding when a key press may (re)start a run.
///
/// After GameOver/Victory the press that ended the run must not also restart
/// it: a key release has to be seen first, then the cooldown has to expire,
/// and only a press after that is honored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum RestartGate {
    /// A run is in progress, key events are gameplay input
    Active,
    /// A key was held when the run ended; waiting for any release
    AwaitingRelease { ready_at: f64 },
    /// Released, but still inside the cooldown window
    AwaitingCooldownExpiry { ready_at: f64 },
    /// The next press starts a run
    #[default]
    ReadyToRestart,
}

impl RestartGate {
    /// Gate state for a run that just ended at `now`
    pub fn arm(now: f64, cooldown_ms: f64, key_held: bool) -> Self {
        let ready_at = now + cooldown_ms;
        if key_held {
            RestartGate::AwaitingRelease { ready_at }
        } else {
            RestartGate::AwaitingCooldownExpiry { ready_at }
        }
    }

    /// Advance the cooldown without an input event
    pub fn poll(&mut self, now: f64) {
        if let RestartGate::AwaitingCooldownExpiry { ready_at } = *self {
            if now >= ready_at {
                *self = RestartGate::ReadyToRestart;
            }
        }
    }

    /// Feed one key event; returns true when it should start a run.
    ///
    /// An honored press moves the gate back to `Active`.
    pub fn observe(&mut self, event: &KeyEvent) -> bool {
        match *self {
            RestartGate::Active => false,
            RestartGate::AwaitingRelease { ready_at } => {
                if !event.pressed {
                    *self = RestartGate::AwaitingCooldownExpiry { ready_at };
                    self.poll(event.at_ms);
                }
                false
            }
            RestartGate::AwaitingCooldownExpiry { ready_at } => {
                if event.at_ms < ready_at {
                    return false;
                }
                *self = RestartGate::ReadyToRestart;
                self.observe(event)
            }
            RestartGate::ReadyToRestart => {
                if event.pressed {
                    *self = RestartGate::Active;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, RestartGate::ReadyToRestart)
    }
}
