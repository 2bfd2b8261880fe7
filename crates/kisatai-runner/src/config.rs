use serde::Deserialize;

use kisatai_combat::MAX_PLAYERS;
use kisatai_combat::characters::Roster;
use kisatai_core::player::{Contestant, Controller};
use kisatai_core::time::FRAMES_PER_SECOND;

/// Runner configuration, loaded from TOML with env var overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub contestants: Vec<ContestantConfig>,
    /// Base seed for CPU input sources. Each slot offsets it by its index.
    pub seed: u64,
    pub tick_rate: u32,
    /// Stop after this many ticks even if the match is undecided.
    pub max_ticks: Option<u64>,
    /// Per-tick probability that a CPU source presses something new.
    pub cpu_press_chance: f64,
}

/// One entry of `[[contestants]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContestantConfig {
    pub character: String,
    #[serde(default)]
    pub controller: Controller,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("a match needs at least 2 contestants, got {0}")]
    TooFewContestants(usize),
    #[error("at most 4 contestants are supported, got {0}")]
    TooManyContestants(usize),
    #[error("tick_rate must be > 0")]
    ZeroTickRate,
    #[error("max_ticks must be > 0 when set")]
    ZeroMaxTicks,
    #[error("cpu_press_chance must be within 0..=1, got {0}")]
    InvalidPressChance(f64),
    #[error("contestant {slot} uses unknown character {character:?}")]
    UnknownCharacter { slot: usize, character: String },
}

impl ContestantConfig {
    fn new(character: &str, controller: Controller) -> Self {
        Self {
            character: character.to_string(),
            controller,
            display_name: None,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            contestants: vec![
                ContestantConfig::new("katshuma", Controller::Cpu),
                ContestantConfig::new("katshuma", Controller::Cpu),
            ],
            seed: 0,
            tick_rate: FRAMES_PER_SECOND,
            max_ticks: Some(u64::from(FRAMES_PER_SECOND) * 300),
            cpu_press_chance: 0.15,
        }
    }
}

impl RunnerConfig {
    /// Load config from a TOML file, then apply env var overrides.
    /// A missing file yields defaults; an unparseable one logs a warning and
    /// yields defaults.
    pub fn load() -> Self {
        let path =
            std::env::var("KISATAI_RUNNER_CONFIG").unwrap_or_else(|_| "kisatai.toml".to_string());
        let mut config = match Self::from_file(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {path}");
                config
            },
            Err(ConfigError::Io { .. }) => {
                tracing::info!("No config file at {path}, using defaults");
                Self::default()
            },
            Err(e) => {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                Self::default()
            },
        };
        config.apply_env_overrides();
        config
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(seed) = std::env::var("KISATAI_SEED") {
            match seed.parse() {
                Ok(seed) => self.seed = seed,
                Err(_) => tracing::warn!(value = %seed, "Ignoring non-numeric KISATAI_SEED"),
            }
        }
        if let Ok(limit) = std::env::var("KISATAI_MAX_TICKS") {
            match limit.parse() {
                Ok(limit) => self.max_ticks = Some(limit),
                Err(_) => tracing::warn!(value = %limit, "Ignoring non-numeric KISATAI_MAX_TICKS"),
            }
        }
    }

    /// Check the config against the roster the match will be built from.
    pub fn validate(&self, roster: &Roster) -> Result<(), ConfigError> {
        let count = self.contestants.len();
        if count < kisatai_combat::MIN_PLAYERS {
            return Err(ConfigError::TooFewContestants(count));
        }
        if count > MAX_PLAYERS {
            return Err(ConfigError::TooManyContestants(count));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.max_ticks == Some(0) {
            return Err(ConfigError::ZeroMaxTicks);
        }
        if !(0.0..=1.0).contains(&self.cpu_press_chance) {
            return Err(ConfigError::InvalidPressChance(self.cpu_press_chance));
        }
        if let Some((slot, c)) = self
            .contestants
            .iter()
            .enumerate()
            .find(|(_, c)| roster.find(&c.character).is_none())
        {
            return Err(ConfigError::UnknownCharacter {
                slot,
                character: c.character.clone(),
            });
        }

        if self.max_ticks.is_none()
            && self
                .contestants
                .iter()
                .all(|c| c.controller == Controller::Scripted)
        {
            tracing::warn!("No tick limit and no live input sources: the match may never end");
        }
        Ok(())
    }

    /// Contestants in slot order, ready for `KisataiMatch::start`.
    pub fn contestants(&self) -> Vec<Contestant> {
        self.contestants
            .iter()
            .enumerate()
            .map(|(slot, entry)| {
                let mut contestant = Contestant::new(slot, entry.character.as_str())
                    .with_controller(entry.controller);
                if let Some(name) = &entry.display_name {
                    contestant.display_name = name.clone();
                }
                contestant
            })
            .collect()
    }
}
