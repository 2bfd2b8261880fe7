use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kisatai_combat::Screen;
use kisatai_core::game_trait::PlayerSlot;
use kisatai_core::input::{InputFrame, PlayerInput};
use kisatai_core::input_source::{Idle, InputSource, Keyboard};
use kisatai_core::player::{Contestant, Controller};

/// Chance per tick that a held input is let go.
const RELEASE_CHANCE: f64 = 0.125;

/// Seeded random button masher for headless soak runs. Presses, holds and
/// releases like a device would, so both edge and level paths get exercised.
#[derive(Debug, Clone)]
pub struct RandomInputs {
    rng: StdRng,
    press_chance: f64,
    held: BTreeSet<PlayerInput>,
}

impl RandomInputs {
    pub fn new(seed: u64, press_chance: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            press_chance: press_chance.clamp(0.0, 1.0),
            held: BTreeSet::new(),
        }
    }
}

impl InputSource<Screen> for RandomInputs {
    fn provide_inputs(&mut self, state: &Screen, _slot: PlayerSlot) -> InputFrame {
        if state.in_game().is_none() {
            self.held.clear();
            return InputFrame::default();
        }

        let mut frame = InputFrame {
            held: self.held.clone(),
            ..InputFrame::default()
        };

        let held: Vec<PlayerInput> = self.held.iter().copied().collect();
        for input in held {
            if self.rng.random_bool(RELEASE_CHANCE) {
                self.held.remove(&input);
                frame = frame.with_released(input);
            }
        }

        if self.rng.random_bool(self.press_chance) {
            let input = PlayerInput::ALL[self.rng.random_range(0..PlayerInput::ALL.len())];
            if self.held.insert(input) {
                frame.pressed.push(input);
                frame.held.insert(input);
            }
        }
        frame
    }
}

/// Where one slot's input comes from.
pub enum SlotInput {
    /// Fed by key events arriving on the command channel.
    Keyboard(Keyboard),
    Source(Box<dyn InputSource<Screen>>),
}

impl SlotInput {
    /// Keyboard contestants read forwarded key events; CPU contestants mash
    /// with a per-slot seed; scripted contestants without a script stay idle.
    pub fn for_contestant(contestant: &Contestant, seed: u64, press_chance: f64) -> Self {
        match contestant.controller {
            Controller::Keyboard => Self::Keyboard(Keyboard::for_slot(contestant.slot)),
            Controller::Cpu => Self::Source(Box::new(RandomInputs::new(
                seed.wrapping_add(contestant.slot as u64),
                press_chance,
            ))),
            Controller::Scripted => Self::Source(Box::new(Idle)),
        }
    }

    pub fn sample(&mut self, screen: &Screen, slot: PlayerSlot) -> InputFrame {
        match self {
            Self::Keyboard(keyboard) => keyboard.provide_inputs(screen, slot),
            Self::Source(source) => source.provide_inputs(screen, slot),
        }
    }

    pub fn key_down(&mut self, code: &str) {
        if let Self::Keyboard(keyboard) = self {
            keyboard.state.on_key_down(code);
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Self::Keyboard(keyboard) = self {
            keyboard.state.on_key_up(code);
        }
    }
}
