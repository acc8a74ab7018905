//! Keyboard state and the logical actions gameplay reads from it.
//!
//! Gameplay never looks at physical keys. It asks an [`InputSource`] whether a
//! logical [`Action`] is held this frame. [`InputState`] is the keyboard-backed
//! source: several keys are bound to each action, and any one of them being
//! down holds the action.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every frame the key is
//!   physically down. All four gameplay actions are level-triggered.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   frame the transition happened, cleared by `end_frame()`. Used for the
//!   session-level toggles (menu, debug, restart) handled by the host loop.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Space,
    Shift,
    Control,
    Escape,
    F1,
    W,
    A,
    D,
    X,
    R,
}

/// Logical gameplay action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Attack,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Attack,
    ];

    /// Physical keys that hold this action.
    pub fn bound_keys(self) -> &'static [Key] {
        match self {
            Self::MoveLeft => &[Key::Left, Key::A],
            Self::MoveRight => &[Key::Right, Key::D],
            Self::Jump => &[Key::Space, Key::W, Key::Up],
            Self::Attack => &[Key::Shift, Key::Control, Key::X],
        }
    }
}

/// Anything that can answer "is this action held right now".
pub trait InputSource {
    fn is_action_held(&self, action: Action) -> bool;
}

/// A captured set of held actions. Replays and tests drive the simulation
/// with these instead of a keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub attack: bool,
}

impl ActionSet {
    pub fn none() -> Self {
        Self::default()
    }

    /// Builder-style: returns a copy with `action` held.
    pub fn with(mut self, action: Action) -> Self {
        match action {
            Action::MoveLeft => self.move_left = true,
            Action::MoveRight => self.move_right = true,
            Action::Jump => self.jump = true,
            Action::Attack => self.attack = true,
        }
        self
    }

    pub fn capture(source: &dyn InputSource) -> Self {
        Action::ALL
            .iter()
            .filter(|action| source.is_action_held(**action))
            .fold(Self::none(), |set, action| set.with(*action))
    }
}

impl InputSource for ActionSet {
    fn is_action_held(&self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left,
            Action::MoveRight => self.move_right,
            Action::Jump => self.jump,
            Action::Attack => self.attack,
        }
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for InputState {
    fn is_action_held(&self, action: Action) -> bool {
        action.bound_keys().iter().any(|key| self.is_held(*key))
    }
}
