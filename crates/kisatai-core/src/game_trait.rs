use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::input::InputFrame;

/// Stable index of a combatant within a match (0-based).
pub type PlayerSlot = usize;

/// Core trait implemented by every tickable match.
///
/// The driver owns the clock and input devices; the simulation only
/// advances one fixed step per `tick` call and never blocks.
pub trait Simulation: Send {
    /// Static description of the simulation.
    fn metadata(&self) -> SimulationMetadata;

    /// Advance exactly one tick. Returns events produced during the tick.
    fn tick(&mut self, inputs: &TickInputs) -> Vec<SimEvent>;

    /// Serialize the full externally visible state.
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the state with previously serialized bytes. Malformed data is ignored.
    fn apply_state(&mut self, state: &[u8]);

    /// Whether the simulation reached a terminal screen.
    fn is_finished(&self) -> bool;

    /// Result of the match once decided.
    fn outcome(&self) -> Option<MatchOutcome>;

    /// Tick rate in Hz.
    fn tick_rate(&self) -> u32 {
        crate::time::FRAMES_PER_SECOND
    }
}

/// Static simulation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub name: String,
    pub description: String,
    pub min_players: u8,
    pub max_players: u8,
}

/// Collected inputs from all players for a single tick, indexed by slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInputs {
    pub frames: Vec<InputFrame>,
}

impl TickInputs {
    pub fn empty(players: usize) -> Self {
        Self {
            frames: vec![InputFrame::default(); players],
        }
    }

    /// Input for `slot`, or an empty frame if the driver supplied none.
    pub fn frame(&self, slot: PlayerSlot) -> &InputFrame {
        static EMPTY: InputFrame = InputFrame {
            pressed: Vec::new(),
            released: Vec::new(),
            held: BTreeSet::new(),
        };
        self.frames.get(slot).unwrap_or(&EMPTY)
    }
}

/// Events emitted during a tick (hits, knockouts, screen changes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    AttackStarted {
        slot: PlayerSlot,
        attack: String,
    },
    Hit {
        attacker: PlayerSlot,
        target: PlayerSlot,
        damage: f32,
    },
    GameOver {
        winner: Option<PlayerSlot>,
    },
    ReturnToTitle,
}

/// Final result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: Option<PlayerSlot>,
    pub frames_played: u64,
}

/// Generates `serialize_state`, `apply_state` and `is_finished` for a `Simulation`.
///
/// Requires the implementing struct to have a `state: $StateType` field, and
/// `$StateType` to provide `fn is_finished(&self) -> bool`.
#[macro_export]
macro_rules! simulation_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("simulation state serialization must succeed")
        }

        fn apply_state(&mut self, state: &[u8]) {
            match rmp_serde::from_slice::<$StateType>(state) {
                Ok(s) => self.state = s,
                Err(e) => tracing::debug!(error = %e, "Dropped malformed simulation state"),
            }
        }

        fn is_finished(&self) -> bool {
            self.state.is_finished()
        }
    };
}
