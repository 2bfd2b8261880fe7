pub mod catalog;
pub mod characters;
pub mod error;
pub mod hooks;
pub mod physics;
pub mod player;
pub mod resolution;
pub mod translator;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use kisatai_core::game_trait::{
    MatchOutcome, PlayerSlot, SimEvent, Simulation, SimulationMetadata, TickInputs,
};
use kisatai_core::player::Contestant;
use kisatai_core::simulation_boilerplate;

use catalog::Character;
use characters::Roster;
use error::{Result, RosterError};
use physics::CombatConfig;
use player::{Facing, Player};
use resolution::ActiveAttack;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Everything a renderer or AI needs to see after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InGameState {
    pub frame: u64,
    /// Indexed by slot.
    pub players: Vec<Player>,
    /// In creation order.
    pub active_attacks: Vec<ActiveAttack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverState {
    pub winner: Option<PlayerSlot>,
    pub frames_until_title: u32,
    pub frames_played: u64,
}

/// Which screen the session is on. `Title` is terminal here; title and
/// character-select flows belong to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Screen {
    InGame(InGameState),
    GameOver(GameOverState),
    Title { outcome: MatchOutcome },
}

impl Screen {
    pub fn is_finished(&self) -> bool {
        matches!(self, Screen::Title { .. })
    }

    pub fn in_game(&self) -> Option<&InGameState> {
        match self {
            Screen::InGame(game) => Some(game),
            _ => None,
        }
    }
}

/// One match: owns the roster, the tuning, and the current screen.
pub struct KisataiMatch {
    roster: Roster,
    config: CombatConfig,
    state: Screen,
}

impl KisataiMatch {
    /// Spawn every contestant on its stage spawn point, facing the middle.
    pub fn start(roster: Roster, config: CombatConfig, contestants: &[Contestant]) -> Result<Self> {
        if contestants.len() < MIN_PLAYERS {
            return Err(RosterError::NotEnoughContestants {
                required: MIN_PLAYERS,
                got: contestants.len(),
            });
        }
        if contestants.len() > MAX_PLAYERS {
            return Err(RosterError::TooManyContestants {
                max: MAX_PLAYERS,
                got: contestants.len(),
            });
        }

        let mut players = Vec::with_capacity(contestants.len());
        for (position, contestant) in contestants.iter().enumerate() {
            if contestant.slot != position {
                return Err(RosterError::SlotMismatch {
                    position,
                    slot: contestant.slot,
                });
            }
            let character = roster.get(&contestant.character)?;
            let x = config.stage.spawn_x(position);
            let facing = if x > 0.0 { Facing::Left } else { Facing::Right };
            let meter = config.starting_meter.unwrap_or(character.starting_meter);
            players.push(Player::new(
                position,
                &character,
                x,
                config.physics.ground_y,
                facing,
                meter,
            ));
        }

        tracing::info!(
            players = players.len(),
            characters = ?contestants.iter().map(|c| c.character.as_str()).collect::<Vec<_>>(),
            "Match started"
        );

        Ok(Self {
            roster,
            config,
            state: Screen::InGame(InGameState {
                frame: 0,
                players,
                active_attacks: Vec::new(),
            }),
        })
    }

    pub fn screen(&self) -> &Screen {
        &self.state
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
}

fn resolve_characters(roster: &Roster, players: &[Player]) -> Option<Vec<Arc<Character>>> {
    players
        .iter()
        .map(|p| {
            let found = roster.find(&p.character).cloned();
            if found.is_none() {
                tracing::warn!(
                    slot = p.slot,
                    character = %p.character,
                    "Player uses unknown character"
                );
            }
            found
        })
        .collect()
}

/// One in-game frame: passive hooks, input, attacks, physics, timers.
pub fn step_in_game(
    game: &mut InGameState,
    characters: &[Arc<Character>],
    inputs: &TickInputs,
    config: &CombatConfig,
    events: &mut Vec<SimEvent>,
) {
    hooks::run_each_frame(&mut game.players, characters);
    translator::handle_player_inputs(
        &mut game.players,
        &mut game.active_attacks,
        characters,
        inputs,
        config,
        events,
    );
    resolution::update_attacks(
        &mut game.players,
        &mut game.active_attacks,
        characters,
        config,
        events,
    );
    physics::step(
        &mut game.players,
        &mut game.active_attacks,
        characters,
        config,
    );
    for player in &mut game.players {
        player.advance_timers();
    }
    game.frame += 1;
}

impl Simulation for KisataiMatch {
    fn metadata(&self) -> SimulationMetadata {
        SimulationMetadata {
            name: "Kisatai".to_string(),
            description: "Frame-precise melee: land hits, build meter, knock them out."
                .to_string(),
            min_players: MIN_PLAYERS as u8,
            max_players: MAX_PLAYERS as u8,
        }
    }

    fn tick(&mut self, inputs: &TickInputs) -> Vec<SimEvent> {
        let mut events = Vec::new();

        let next = match &mut self.state {
            Screen::InGame(game) => {
                let Some(characters) = resolve_characters(&self.roster, &game.players) else {
                    return events;
                };
                step_in_game(game, &characters, inputs, &self.config, &mut events);

                if game.players.iter().any(|p| !p.is_alive()) {
                    let winner = game.players.iter().find(|p| p.is_alive()).map(|p| p.slot);
                    tracing::info!(?winner, frame = game.frame, "Match over");
                    events.push(SimEvent::GameOver { winner });
                    Some(Screen::GameOver(GameOverState {
                        winner,
                        frames_until_title: self.config.game_over_frames,
                        frames_played: game.frame,
                    }))
                } else {
                    None
                }
            },
            Screen::GameOver(over) => {
                if over.frames_until_title == 0 {
                    events.push(SimEvent::ReturnToTitle);
                    Some(Screen::Title {
                        outcome: MatchOutcome {
                            winner: over.winner,
                            frames_played: over.frames_played,
                        },
                    })
                } else {
                    over.frames_until_title -= 1;
                    None
                }
            },
            Screen::Title { .. } => None,
        };

        if let Some(next) = next {
            self.state = next;
        }
        events
    }

    simulation_boilerplate!(state_type: Screen);

    fn outcome(&self) -> Option<MatchOutcome> {
        match &self.state {
            Screen::InGame(_) => None,
            Screen::GameOver(over) => Some(MatchOutcome {
                winner: over.winner,
                frames_played: over.frames_played,
            }),
            Screen::Title { outcome } => Some(*outcome),
        }
    }
}
