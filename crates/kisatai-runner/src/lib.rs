pub mod config;
pub mod error;
pub mod game_loop;
pub mod sources;

use kisatai_combat::KisataiMatch;
use kisatai_combat::characters::Roster;
use kisatai_combat::physics::CombatConfig;

use config::RunnerConfig;
use error::RunnerError;
use game_loop::SessionConfig;
use sources::SlotInput;

/// Everything needed to spawn a session.
pub struct PreparedMatch {
    pub sim: KisataiMatch,
    pub inputs: Vec<SlotInput>,
    pub session: SessionConfig,
}

/// Validate the runner config, start the match, and wire one input per slot.
pub fn prepare_match(
    config: &RunnerConfig,
    combat: CombatConfig,
    roster: Roster,
) -> Result<PreparedMatch, RunnerError> {
    config.validate(&roster)?;

    let contestants = config.contestants();
    let inputs = contestants
        .iter()
        .map(|c| SlotInput::for_contestant(c, config.seed, config.cpu_press_chance))
        .collect();
    let sim = KisataiMatch::start(roster, combat, &contestants)?;

    Ok(PreparedMatch {
        sim,
        inputs,
        session: SessionConfig {
            tick_rate: config.tick_rate,
            max_ticks: config.max_ticks,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kisatai_core::player::Controller;

    #[test]
    fn prepares_default_match() {
        let prepared =
            prepare_match(&RunnerConfig::default(), CombatConfig::default(), Roster::standard())
                .unwrap();
        assert_eq!(prepared.inputs.len(), 2);
        assert_eq!(prepared.session.tick_rate, 60);
        assert!(prepared.sim.screen().in_game().is_some());
    }

    #[test]
    fn invalid_config_is_rejected_before_start() {
        let mut config = RunnerConfig::default();
        config.contestants[0].character = "ghost".to_string();
        config.contestants[0].controller = Controller::Keyboard;
        let err =
            prepare_match(&config, CombatConfig::default(), Roster::standard()).err().unwrap();
        assert!(matches!(err, RunnerError::Config(_)));
    }

    #[test]
    fn empty_roster_fails() {
        let err = prepare_match(&RunnerConfig::default(), CombatConfig::default(), Roster::new())
            .err()
            .unwrap();
        assert!(matches!(err, RunnerError::Config(_)));
    }
}
