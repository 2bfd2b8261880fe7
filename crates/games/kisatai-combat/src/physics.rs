use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Character;
use crate::player::{ActionLock, Player};
use crate::resolution::ActiveAttack;

/// Downward acceleration per tick while airborne.
pub const GRAVITY: f32 = 0.8;
/// Terminal falling speed (units/tick).
pub const MAX_FALL_SPEED: f32 = 18.0;
/// Downward speed forced by a fast fall.
pub const FAST_FALL_SPEED: f32 = 14.0;
/// Jump impulse before the character's jump strength is applied.
pub const JUMP_VELOCITY: f32 = 15.0;
/// Fraction of horizontal knockback kept each stunned tick.
pub const KNOCKBACK_DECAY: f32 = 0.9;
/// Height of the ground plane.
pub const GROUND_Y: f32 = 0.0;

/// Per-tick motion constants, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub fast_fall_speed: f32,
    pub jump_velocity: f32,
    pub knockback_decay: f32,
    pub ground_y: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            fast_fall_speed: FAST_FALL_SPEED,
            jump_velocity: JUMP_VELOCITY,
            knockback_decay: KNOCKBACK_DECAY,
            ground_y: GROUND_Y,
        }
    }
}

/// Stage bounds and spawn positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Players cannot move left of this x, if set.
    pub left_wall: Option<f32>,
    /// Players cannot move right of this x, if set.
    pub right_wall: Option<f32>,
    /// Spawn x per slot. Slots past the end are spaced out from the last entry.
    pub spawn_points: Vec<f32>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            left_wall: None,
            right_wall: None,
            spawn_points: vec![-150.0, 150.0],
        }
    }
}

impl StageConfig {
    pub fn spawn_x(&self, slot: usize) -> f32 {
        match self.spawn_points.get(slot) {
            Some(&x) => x,
            None => {
                let last = self.spawn_points.last().copied().unwrap_or(0.0);
                let extra = slot + 1 - self.spawn_points.len().max(1);
                last + 100.0 * extra as f32
            },
        }
    }

    fn clamp_x(&self, x: f32) -> f32 {
        let x = self.left_wall.map_or(x, |wall| x.max(wall));
        self.right_wall.map_or(x, |wall| x.min(wall))
    }
}

/// Top-level combat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub physics: PhysicsConfig,
    pub stage: StageConfig,
    /// Divides cumulative damage taken into the knockback/hitstun growth factor.
    pub knockback_scaling_divisor: f32,
    /// Frames the game-over screen is shown before returning to the title.
    pub game_over_frames: u32,
    /// Overrides every character's starting meter when set.
    pub starting_meter: Option<f32>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            stage: StageConfig::default(),
            knockback_scaling_divisor: 10.0,
            game_over_frames: 210,
            starting_meter: None,
        }
    }
}

impl CombatConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("KISATAI_COMBAT_CONFIG")
            .unwrap_or_else(|_| "config/combat.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Damage-scaling factor for a target that has taken `damage_taken` so far.
    pub fn growth_factor(&self, damage_taken: f32) -> f32 {
        if self.knockback_scaling_divisor > 0.0 {
            damage_taken / self.knockback_scaling_divisor
        } else {
            0.0
        }
    }
}

/// Integrate one player for one tick.
pub fn integrate_player(player: &mut Player, character: &Character, config: &CombatConfig) {
    if player.is_frozen() {
        return;
    }
    let physics = &config.physics;

    if player.is_airborne() {
        player.y_velocity = (player.y_velocity - physics.gravity).max(-physics.max_fall_speed);
    }
    if player.action == ActionLock::Stunned {
        player.x_velocity *= physics.knockback_decay;
    }

    player.x = config.stage.clamp_x(player.x + player.x_velocity);
    player.y += player.y_velocity;

    if player.y <= physics.ground_y {
        if player.is_airborne() {
            player.land(physics.ground_y, character);
        } else {
            player.y = physics.ground_y;
            player.y_velocity = 0.0;
        }
    }
}

/// Move an attack with its own travel speed. Attacks that follow their owner
/// are positioned by resolution instead.
pub fn integrate_attack(attack: &mut ActiveAttack, owner_frozen: bool) {
    if attack.moves_with_player || (owner_frozen && !attack.projectile) {
        return;
    }
    attack.x += attack.x_speed;
}

/// Physics pass: every player, then every in-flight attack.
pub fn step(
    players: &mut [Player],
    attacks: &mut [ActiveAttack],
    characters: &[Arc<Character>],
    config: &CombatConfig,
) {
    for (player, character) in players.iter_mut().zip(characters) {
        integrate_player(player, character, config);
    }
    for attack in attacks.iter_mut() {
        let owner_frozen = players
            .get(attack.player_slot)
            .is_some_and(Player::is_frozen);
        integrate_attack(attack, owner_frozen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters::katshuma;
    use crate::player::{Facing, Locomotion};

    fn airborne_player(y: f32, y_velocity: f32) -> (Player, Character) {
        let k = katshuma();
        let mut p = Player::new(0, &k, 0.0, y, Facing::Right, 0.0);
        p.locomotion = Locomotion::Airborne;
        p.y_velocity = y_velocity;
        (p, k)
    }

    #[test]
    fn gravity_pulls_down() {
        let (mut p, k) = airborne_player(100.0, 0.0);
        integrate_player(&mut p, &k, &CombatConfig::default());
        assert!(p.y < 100.0);
        assert_eq!(p.y_velocity, -GRAVITY);
    }

    #[test]
    fn fall_speed_is_capped() {
        let (mut p, k) = airborne_player(1000.0, -MAX_FALL_SPEED);
        integrate_player(&mut p, &k, &CombatConfig::default());
        assert_eq!(p.y_velocity, -MAX_FALL_SPEED);
    }

    #[test]
    fn landing_resets_jumps() {
        let (mut p, k) = airborne_player(5.0, -10.0);
        p.jumps_remaining = 0;
        integrate_player(&mut p, &k, &CombatConfig::default());
        assert_eq!(p.y, GROUND_Y);
        assert_eq!(p.y_velocity, 0.0);
        assert_eq!(p.locomotion, Locomotion::Grounded);
        assert_eq!(p.jumps_remaining, 2);
    }

    #[test]
    fn grounded_player_stays_on_ground() {
        let k = katshuma();
        let mut p = Player::new(0, &k, 0.0, 0.0, Facing::Right, 0.0);
        p.y_velocity = -5.0;
        p.x_velocity = 3.0;
        integrate_player(&mut p, &k, &CombatConfig::default());
        assert_eq!(p.y, 0.0);
        assert_eq!(p.x, 3.0);
    }

    #[test]
    fn frozen_player_does_not_move() {
        let (mut p, k) = airborne_player(50.0, 4.0);
        p.x_velocity = 7.0;
        p.hitlag_frames = 2;
        integrate_player(&mut p, &k, &CombatConfig::default());
        assert_eq!((p.x, p.y), (0.0, 50.0));
    }

    #[test]
    fn stunned_knockback_decays() {
        let (mut p, k) = airborne_player(50.0, 0.0);
        p.action = ActionLock::Stunned;
        p.x_velocity = 10.0;
        integrate_player(&mut p, &k, &CombatConfig::default());
        assert!((p.x_velocity - 9.0).abs() < 1e-5);
        assert!((p.x - 9.0).abs() < 1e-5);
    }

    #[test]
    fn walls_clamp_players() {
        let k = katshuma();
        let mut config = CombatConfig::default();
        config.stage.right_wall = Some(10.0);
        let mut p = Player::new(0, &k, 8.0, 0.0, Facing::Right, 0.0);
        p.x_velocity = 8.5;
        integrate_player(&mut p, &k, &config);
        assert_eq!(p.x, 10.0);
    }

    #[test]
    fn horizontal_position_unbounded_by_default() {
        let k = katshuma();
        let mut p = Player::new(0, &k, 1.0e5, 0.0, Facing::Right, 0.0);
        p.x_velocity = 8.5;
        integrate_player(&mut p, &k, &CombatConfig::default());
        assert_eq!(p.x, 1.0e5 + 8.5);
    }

    #[test]
    fn spawn_points_extend_past_list() {
        let stage = StageConfig::default();
        assert_eq!(stage.spawn_x(0), -150.0);
        assert_eq!(stage.spawn_x(1), 150.0);
        assert_eq!(stage.spawn_x(2), 250.0);
        let empty = StageConfig {
            spawn_points: Vec::new(),
            ..StageConfig::default()
        };
        assert_eq!(empty.spawn_x(0), 0.0);
        assert_eq!(empty.spawn_x(2), 200.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = CombatConfig::from_toml(
            "knockback_scaling_divisor = 20.0\n[physics]\ngravity = 1.5\n",
        )
        .unwrap();
        assert_eq!(config.knockback_scaling_divisor, 20.0);
        assert_eq!(config.physics.gravity, 1.5);
        assert_eq!(config.physics.jump_velocity, JUMP_VELOCITY);
        assert_eq!(config.game_over_frames, 210);
    }

    #[test]
    fn growth_factor_scales_with_damage() {
        let config = CombatConfig::default();
        assert_eq!(config.growth_factor(0.0), 0.0);
        assert_eq!(config.growth_factor(25.0), 2.5);
        let degenerate = CombatConfig {
            knockback_scaling_divisor: 0.0,
            ..CombatConfig::default()
        };
        assert_eq!(degenerate.growth_factor(50.0), 0.0);
    }
}
