pub mod game_trait;
pub mod input;
pub mod input_source;
pub mod player;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{PlayerSlot, SimEvent, Simulation, TickInputs};
    use crate::input::{InputFrame, PlayerInput};
    use crate::player::{Contestant, Controller};

    /// Create `n` scripted contestants playing `character`, slots 0..n.
    pub fn make_contestants(n: usize, character: &str) -> Vec<Contestant> {
        (0..n)
            .map(|slot| Contestant::new(slot, character).with_controller(Controller::Scripted))
            .collect()
    }

    /// Inputs where only `slot` presses `pressed` (and holds `held`).
    pub fn inputs_for(
        players: usize,
        slot: PlayerSlot,
        pressed: &[PlayerInput],
        held: &[PlayerInput],
    ) -> TickInputs {
        let mut inputs = TickInputs::empty(players);
        let mut frame = InputFrame::pressing(pressed);
        for &h in held {
            frame = frame.with_held(h);
        }
        inputs.frames[slot] = frame;
        inputs
    }

    /// Run N ticks with empty inputs, returning all accumulated events.
    pub fn run_ticks(sim: &mut dyn Simulation, players: usize, n: usize) -> Vec<SimEvent> {
        let empty = TickInputs::empty(players);
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.tick(&empty));
        }
        all_events
    }

    // ================================================================
    // Simulation Trait Contract Tests
    // ================================================================
    // Every Simulation implementation calls these from its own
    // #[cfg(test)] module with a freshly started instance.

    /// A started simulation must serialize to non-empty bytes.
    pub fn contract_started_state_serializes(sim: &dyn Simulation) {
        assert!(
            !sim.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes after start"
        );
    }

    /// Ticking must change the serialized state (the frame counter at least).
    pub fn contract_tick_advances_state(sim: &mut dyn Simulation, players: usize) {
        let before = sim.serialize_state();
        sim.tick(&TickInputs::empty(players));
        let after = sim.serialize_state();
        assert_ne!(before, after, "tick() must advance simulation state");
    }

    /// serialize -> apply -> serialize must be stable.
    pub fn contract_state_roundtrip_preserves(sim: &mut dyn Simulation) {
        let state_a = sim.serialize_state();
        sim.apply_state(&state_a);
        let state_b = sim.serialize_state();
        assert_eq!(state_a, state_b, "State must survive a serialize/apply roundtrip");
    }

    /// Garbage bytes must be ignored rather than corrupting state.
    pub fn contract_malformed_state_ignored(sim: &mut dyn Simulation) {
        let before = sim.serialize_state();
        sim.apply_state(&[0xc1, 0xff, 0x00]);
        assert_eq!(before, sim.serialize_state(), "Malformed state must be dropped");
    }

    /// Two identical simulations fed identical inputs must stay byte-identical.
    pub fn contract_deterministic(
        a: &mut dyn Simulation,
        b: &mut dyn Simulation,
        script: &[TickInputs],
    ) {
        for (i, inputs) in script.iter().enumerate() {
            let ea = a.tick(inputs);
            let eb = b.tick(inputs);
            assert_eq!(ea, eb, "Events diverged at tick {i}");
            assert_eq!(
                a.serialize_state(),
                b.serialize_state(),
                "State diverged at tick {i}"
            );
        }
    }
}
