//! Platform-agnostic input handling
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Keys the viewer understands. Names serialize as written ("W", "Digit1",
/// "Escape") so scene files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[rustfmt::skip]
pub enum Key {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,
    Space,
    Escape,
}

impl Key {
    /// Short label for on-screen help.
    pub fn label(self) -> String {
        match self {
            Key::Space => "Space".to_string(),
            Key::Escape => "Esc".to_string(),
            other => {
                let name = format!("{other:?}");
                name.strip_prefix("Digit").map(str::to_string).unwrap_or(name)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    CursorMoved { x: f64, y: f64 },
    MouseButton { button: MouseButton, pressed: bool },
    Scroll { delta_y: f32 },
    FocusLost,
}

/// Keys held right now plus pointer events queued since the last frame.
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<Key>,
    pending: Vec<InputEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(key);
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(&key);
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
            pointer => self.pending.push(pointer),
        }
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    /// Pointer events in arrival order; the queue is left empty.
    pub fn drain_pointer_events(&mut self) -> std::vec::Drain<'_, InputEvent> {
        self.pending.drain(..)
    }
}

/// Per-key edge detector.
///
/// | from     | key down | key up   |
/// |----------|----------|----------|
/// | Released | Pressed, **fires** | Released |
/// | Pressed  | Pressed  | Released |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyLatch {
    #[default]
    Released,
    Pressed,
}

impl KeyLatch {
    /// Feed this frame's level; returns true on a rising edge.
    pub fn update(&mut self, down: bool) -> bool {
        let fired = matches!((*self, down), (KeyLatch::Released, true));
        *self = if down { KeyLatch::Pressed } else { KeyLatch::Released };
        fired
    }
}

/// What a rising edge on an action key does to its target objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleEffect {
    /// Flip between the open and closed endpoints.
    OpenClose,
    /// Start a self-terminating run; pressing again while running is a no-op.
    OneShot,
    /// Start or stop a free spin.
    FreeSpin,
}

impl ToggleEffect {
    pub fn apply(self, engaged: &mut bool) {
        match self {
            ToggleEffect::OpenClose | ToggleEffect::FreeSpin => *engaged = !*engaged,
            ToggleEffect::OneShot => *engaged = true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBinding {
    pub key: Key,
    pub effect: ToggleEffect,
    /// Object names flipped together by this key.
    pub targets: Vec<String>,
}

/// Key mapping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub forward: Key,
    pub backward: Key,
    pub left: Key,
    pub right: Key,
    pub up: Key,
    pub down: Key,
    pub quit: Key,
    #[serde(default)]
    pub actions: Vec<ActionBinding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            backward: Key::S,
            left: Key::A,
            right: Key::D,
            up: Key::E,
            down: Key::Q,
            quit: Key::Escape,
            actions: Vec::new(),
        }
    }
}

impl KeyBindings {
    pub fn movement_keys(&self) -> [Key; 6] {
        [self.forward, self.backward, self.left, self.right, self.up, self.down]
    }

    /// Every bound key in declaration order, duplicates included.
    pub fn all_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.movement_keys()
            .into_iter()
            .chain(std::iter::once(self.quit))
            .chain(self.actions.iter().map(|a| a.key))
    }
}
