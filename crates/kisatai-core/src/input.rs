use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Abstract input vocabulary shared by keyboards, gamepads and AI sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerInput {
    Up,
    Down,
    Left,
    Right,
    Light,
    Special,
    Meter,
    Neutral,
}

impl PlayerInput {
    pub const ALL: [PlayerInput; 8] = [
        PlayerInput::Up,
        PlayerInput::Down,
        PlayerInput::Left,
        PlayerInput::Right,
        PlayerInput::Light,
        PlayerInput::Special,
        PlayerInput::Meter,
        PlayerInput::Neutral,
    ];

    pub fn is_direction(self) -> bool {
        matches!(
            self,
            PlayerInput::Up | PlayerInput::Down | PlayerInput::Left | PlayerInput::Right
        )
    }

    /// The horizontally opposite direction, if any.
    pub fn opposite(self) -> Option<PlayerInput> {
        match self {
            PlayerInput::Left => Some(PlayerInput::Right),
            PlayerInput::Right => Some(PlayerInput::Left),
            PlayerInput::Up => Some(PlayerInput::Down),
            PlayerInput::Down => Some(PlayerInput::Up),
            _ => None,
        }
    }
}

/// One player's input for a single tick.
///
/// `pressed` and `released` are edge events in the order they arrived;
/// `held` is the level state after this tick's edges were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    pub pressed: Vec<PlayerInput>,
    pub released: Vec<PlayerInput>,
    pub held: BTreeSet<PlayerInput>,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame where each input is freshly pressed and held.
    pub fn pressing(inputs: &[PlayerInput]) -> Self {
        Self {
            pressed: inputs.to_vec(),
            released: Vec::new(),
            held: inputs.iter().copied().collect(),
        }
    }

    /// Builder: add an input that was already held before this tick.
    pub fn with_held(mut self, input: PlayerInput) -> Self {
        self.held.insert(input);
        self
    }

    /// Builder: add a release edge.
    pub fn with_released(mut self, input: PlayerInput) -> Self {
        self.held.remove(&input);
        self.released.push(input);
        self
    }

    pub fn is_held(&self, input: PlayerInput) -> bool {
        self.held.contains(&input)
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty() && self.released.is_empty() && self.held.is_empty()
    }
}

/// Maps raw key codes onto the abstract vocabulary for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub keys: HashMap<String, PlayerInput>,
}

impl KeyBindings {
    pub fn new(pairs: &[(&str, PlayerInput)]) -> Self {
        Self {
            keys: pairs
                .iter()
                .map(|(code, input)| ((*code).to_string(), *input))
                .collect(),
        }
    }

    /// Default bindings for the given player slot (0: WASD + c/v/b, 1: arrows + ,/./-).
    pub fn for_slot(slot: usize) -> Self {
        match slot {
            0 => Self::new(&[
                ("w", PlayerInput::Up),
                ("a", PlayerInput::Left),
                ("s", PlayerInput::Down),
                ("d", PlayerInput::Right),
                ("c", PlayerInput::Light),
                ("v", PlayerInput::Special),
                ("b", PlayerInput::Meter),
            ]),
            1 => Self::new(&[
                ("ArrowUp", PlayerInput::Up),
                ("ArrowLeft", PlayerInput::Left),
                ("ArrowDown", PlayerInput::Down),
                ("ArrowRight", PlayerInput::Right),
                (",", PlayerInput::Light),
                (".", PlayerInput::Special),
                ("-", PlayerInput::Meter),
            ]),
            _ => Self {
                keys: HashMap::new(),
            },
        }
    }

    pub fn lookup(&self, code: &str) -> Option<PlayerInput> {
        self.keys.get(code).copied()
    }
}

/// Raw keyboard state, updated from device events between ticks.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    /// Keys currently held down.
    pub keys_down: BTreeSet<String>,
    /// Keys pressed since the last tick, in arrival order.
    pub keys_just_pressed: Vec<String>,
    /// Keys released since the last tick, in arrival order.
    pub keys_just_released: Vec<String>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key down event. Auto-repeat of a held key is not a new press.
    pub fn on_key_down(&mut self, code: impl Into<String>) {
        let code = code.into();
        if self.keys_down.insert(code.clone()) {
            self.keys_just_pressed.push(code);
        }
    }

    pub fn on_key_up(&mut self, code: impl Into<String>) {
        let code = code.into();
        if self.keys_down.remove(&code) {
            self.keys_just_released.push(code);
        }
    }

    pub fn is_key_down(&self, code: &str) -> bool {
        self.keys_down.contains(code)
    }

    /// Translate the raw key state into one player's frame through their bindings.
    pub fn frame_for(&self, bindings: &KeyBindings) -> InputFrame {
        InputFrame {
            pressed: self
                .keys_just_pressed
                .iter()
                .filter_map(|code| bindings.lookup(code))
                .collect(),
            released: self
                .keys_just_released
                .iter()
                .filter_map(|code| bindings.lookup(code))
                .collect(),
            held: self
                .keys_down
                .iter()
                .filter_map(|code| bindings.lookup(code))
                .collect(),
        }
    }

    /// Clear edge events. Call once after every tick has sampled the state.
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.keys_just_released.clear();
    }
}
