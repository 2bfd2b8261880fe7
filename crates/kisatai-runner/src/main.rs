use tracing_subscriber::EnvFilter;

use kisatai_combat::characters::Roster;
use kisatai_combat::physics::CombatConfig;
use kisatai_core::game_trait::SimEvent;
use kisatai_core::time::frames_to_secs;
use kisatai_runner::config::RunnerConfig;
use kisatai_runner::game_loop::{MatchBroadcast, MatchCommand, spawn_match};
use kisatai_runner::prepare_match;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Kisatai runner starting");

    let config = RunnerConfig::load();
    let prepared = match prepare_match(&config, CombatConfig::load(), Roster::standard()) {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start match");
            std::process::exit(1);
        },
    };

    let (cmd_tx, mut broadcast_rx, handle) =
        spawn_match(prepared.sim, prepared.inputs, prepared.session);

    let shutdown_tx = cmd_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(MatchCommand::Stop);
        }
    });

    let mut hits = 0u64;
    while let Some(msg) = broadcast_rx.recv().await {
        match msg {
            MatchBroadcast::Snapshot { .. } => {},
            MatchBroadcast::Event(event) => {
                if matches!(event, SimEvent::Hit { .. }) {
                    hits += 1;
                }
            },
            MatchBroadcast::Finished(_) => break,
        }
    }

    match handle.await {
        Ok(Some(outcome)) => tracing::info!(
            winner = ?outcome.winner,
            frames = outcome.frames_played,
            seconds = frames_to_secs(outcome.frames_played),
            hits,
            "Match finished"
        ),
        Ok(None) => tracing::info!(hits, "Match ended undecided"),
        Err(e) => {
            tracing::error!(error = %e, "Match task failed");
            std::process::exit(1);
        },
    }
    drop(cmd_tx);
}
