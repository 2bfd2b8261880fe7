use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use kisatai_combat::KisataiMatch;
use kisatai_core::game_trait::{MatchOutcome, SimEvent, Simulation, TickInputs};
use kisatai_core::time::tick_interval;

use crate::sources::SlotInput;

/// Commands sent from the host (device thread, shutdown handler) to the loop.
#[derive(Debug)]
pub enum MatchCommand {
    /// Raw key event, forwarded to every keyboard-driven slot.
    KeyDown(String),
    KeyUp(String),
    Stop,
}

/// Everything the loop publishes, in tick order.
#[derive(Debug, Clone)]
pub enum MatchBroadcast {
    /// MessagePack-encoded `Screen` after tick `tick`.
    /// Uses `Bytes` so renderers can share it without copying.
    Snapshot { tick: u64, data: Bytes },
    Event(SimEvent),
    /// The loop has exited. Carries the outcome if the match was decided.
    Finished(Option<MatchOutcome>),
}

/// Settings for one spawned session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub tick_rate: u32,
    pub max_ticks: Option<u64>,
}

/// Spawn the fixed-tick loop as a tokio task.
/// Returns the command sender, the broadcast receiver, and the task handle
/// which resolves to the outcome.
pub fn spawn_match(
    sim: KisataiMatch,
    inputs: Vec<SlotInput>,
    config: SessionConfig,
) -> (
    mpsc::UnboundedSender<MatchCommand>,
    mpsc::UnboundedReceiver<MatchBroadcast>,
    JoinHandle<Option<MatchOutcome>>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(run_match_loop(sim, inputs, config, cmd_rx, broadcast_tx));

    (cmd_tx, broadcast_rx, handle)
}

/// Drive `sim` one step per interval tick. A late tick is skipped rather
/// than run twice, so the simulation never double-advances.
async fn run_match_loop(
    mut sim: KisataiMatch,
    mut inputs: Vec<SlotInput>,
    config: SessionConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<MatchCommand>,
    broadcast_tx: mpsc::UnboundedSender<MatchBroadcast>,
) -> Option<MatchOutcome> {
    let mut interval = tokio::time::interval(tick_interval(config.tick_rate));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let frames = inputs
                    .iter_mut()
                    .enumerate()
                    .map(|(slot, input)| input.sample(sim.screen(), slot))
                    .collect();
                let events = sim.tick(&TickInputs { frames });
                tick += 1;

                let data = Bytes::from(sim.serialize_state());
                let _ = broadcast_tx.send(MatchBroadcast::Snapshot { tick, data });

                for event in events {
                    match &event {
                        SimEvent::Hit { attacker, target, damage } => {
                            tracing::debug!(tick, attacker, target, damage, "Hit");
                        },
                        SimEvent::GameOver { winner } => {
                            tracing::info!(tick, ?winner, "Game over");
                        },
                        SimEvent::ReturnToTitle => tracing::info!(tick, "Returned to title"),
                        SimEvent::AttackStarted { .. } => {},
                    }
                    let _ = broadcast_tx.send(MatchBroadcast::Event(event));
                }

                if sim.is_finished() {
                    break;
                }
                if config.max_ticks.is_some_and(|limit| tick >= limit) {
                    tracing::info!(tick, "Tick limit reached, stopping match");
                    break;
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(MatchCommand::KeyDown(code)) => {
                        inputs.iter_mut().for_each(|input| input.key_down(&code));
                    },
                    Some(MatchCommand::KeyUp(code)) => {
                        inputs.iter_mut().for_each(|input| input.key_up(&code));
                    },
                    Some(MatchCommand::Stop) => {
                        tracing::info!(tick, "Match stopped by host");
                        break;
                    },
                    None => {
                        tracing::debug!(tick, "Command channel closed, stopping match");
                        break;
                    },
                }
            }
        }
    }

    let outcome = sim.outcome();
    let _ = broadcast_tx.send(MatchBroadcast::Finished(outcome));
    outcome
}
