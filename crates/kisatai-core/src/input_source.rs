use crate::game_trait::PlayerSlot;
use crate::input::{InputFrame, KeyBindings, KeyboardState};

/// A per-tick producer of abstract input for one player.
///
/// Keyboards, gamepads and AI opponents all implement this; the simulation
/// cannot tell them apart. `S` is the read-only snapshot type the source may
/// inspect (the previous tick's state).
pub trait InputSource<S>: Send {
    fn provide_inputs(&mut self, state: &S, slot: PlayerSlot) -> InputFrame;
}

/// Source that never presses anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl<S> InputSource<S> for Idle {
    fn provide_inputs(&mut self, _state: &S, _slot: PlayerSlot) -> InputFrame {
        InputFrame::default()
    }
}

/// Replays a fixed list of frames, then goes idle.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    frames: std::collections::VecDeque<InputFrame>,
}

impl Scripted {
    pub fn new(frames: impl IntoIterator<Item = InputFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl<S> InputSource<S> for Scripted {
    fn provide_inputs(&mut self, _state: &S, _slot: PlayerSlot) -> InputFrame {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Keyboard device: a shared key state read through one player's bindings.
#[derive(Debug, Clone)]
pub struct Keyboard {
    pub bindings: KeyBindings,
    pub state: KeyboardState,
}

impl Keyboard {
    pub fn for_slot(slot: PlayerSlot) -> Self {
        Self {
            bindings: KeyBindings::for_slot(slot),
            state: KeyboardState::new(),
        }
    }
}

impl<S> InputSource<S> for Keyboard {
    fn provide_inputs(&mut self, _state: &S, _slot: PlayerSlot) -> InputFrame {
        let frame = self.state.frame_for(&self.bindings);
        self.state.end_frame();
        frame
    }
}
