use kisatai_core::game_trait::PlayerSlot;
use serde::{Deserialize, Serialize};

use crate::catalog::Character;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1 when facing left, +1 when facing right.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locomotion {
    Grounded,
    Airborne,
}

/// What the player is locked into, independent of locomotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionLock {
    Free,
    Attacking,
    Stunned,
}

/// Combined view of locomotion and action for renderers and AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Grounded,
    Airborne,
    Attacking,
    Stunned,
}

/// Resolved effect of one confirmed hit on its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitImpact {
    pub damage: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub hitstun: u32,
    pub hit_lag: u32,
}

/// Mutable per-match state of one combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub slot: PlayerSlot,
    /// Character id in the match roster.
    pub character: String,
    pub x: f32,
    pub y: f32,
    pub x_velocity: f32,
    pub y_velocity: f32,
    pub facing: Facing,
    pub locomotion: Locomotion,
    pub action: ActionLock,
    pub health: f32,
    pub meter: f32,
    pub frames_until_neutral: u32,
    /// Remaining hit-lag freeze frames.
    pub hitlag_frames: u32,
    pub jumps_remaining: u8,
    /// Total damage received this match, feeds knockback and hitstun scaling.
    pub damage_taken: f32,
    /// Summed horizontal distance to opponents as of the previous tick.
    pub previous_spacing: Option<f32>,
    /// Set on landing and on returning to `Free`. Horizontal velocity is
    /// re-derived from the held directions on the next tick the player can act.
    #[serde(default)]
    pub walk_stale: bool,
}

impl Player {
    pub fn new(
        slot: PlayerSlot,
        character: &Character,
        x: f32,
        y: f32,
        facing: Facing,
        starting_meter: f32,
    ) -> Self {
        Self {
            slot,
            character: character.id.clone(),
            x,
            y,
            x_velocity: 0.0,
            y_velocity: 0.0,
            facing,
            locomotion: Locomotion::Grounded,
            action: ActionLock::Free,
            health: character.max_health,
            meter: starting_meter.clamp(0.0, character.max_meter),
            frames_until_neutral: 0,
            hitlag_frames: 0,
            jumps_remaining: character.max_jumps,
            damage_taken: 0.0,
            previous_spacing: None,
            walk_stale: false,
        }
    }

    pub fn state(&self) -> PlayerState {
        match (self.action, self.locomotion) {
            (ActionLock::Stunned, _) => PlayerState::Stunned,
            (ActionLock::Attacking, _) => PlayerState::Attacking,
            (ActionLock::Free, Locomotion::Grounded) => PlayerState::Grounded,
            (ActionLock::Free, Locomotion::Airborne) => PlayerState::Airborne,
        }
    }

    pub fn is_airborne(&self) -> bool {
        self.locomotion == Locomotion::Airborne
    }

    pub fn is_frozen(&self) -> bool {
        self.hitlag_frames > 0
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Free to start an attack or change walking direction.
    pub fn can_act(&self) -> bool {
        self.frames_until_neutral == 0 && self.action != ActionLock::Stunned && !self.is_frozen()
    }

    pub fn gain_meter(&mut self, amount: f32, character: &Character) {
        self.meter = (self.meter + amount).clamp(0.0, character.max_meter);
    }

    pub fn heal(&mut self, amount: f32, character: &Character) {
        self.health = (self.health + amount).clamp(0.0, character.max_health);
    }

    /// Clamp-subtract damage. Returns the health actually removed.
    pub fn take_damage(&mut self, amount: f32, character: &Character) -> f32 {
        let before = self.health;
        self.health = (self.health - amount).clamp(0.0, character.max_health);
        before - self.health
    }

    /// Pay for and commit to an attack. Returns false (unchanged) if the player
    /// cannot act or cannot afford it.
    pub fn start_attack(&mut self, meter_cost: f32, duration: u32) -> bool {
        if !self.can_act() || self.meter < meter_cost {
            return false;
        }
        self.meter -= meter_cost;
        self.action = ActionLock::Attacking;
        self.frames_until_neutral = duration;
        if self.locomotion == Locomotion::Grounded {
            self.x_velocity = 0.0;
        }
        true
    }

    /// Walk (or drift) toward `direction` and face it.
    pub fn handle_move(&mut self, direction: Facing, character: &Character) -> bool {
        if !self.can_act() {
            return false;
        }
        let speed = match self.locomotion {
            Locomotion::Grounded => character.walk_speed,
            Locomotion::Airborne => character.air_speed,
        };
        self.x_velocity = direction.sign() * speed;
        self.facing = direction;
        true
    }

    pub fn handle_stop(&mut self) -> bool {
        if !self.can_act() {
            return false;
        }
        self.x_velocity = 0.0;
        true
    }

    pub fn handle_jump(&mut self, jump_velocity: f32, character: &Character) -> bool {
        if self.jumps_remaining == 0 || self.action == ActionLock::Stunned || self.is_frozen() {
            return false;
        }
        self.jumps_remaining -= 1;
        self.y_velocity = jump_velocity * character.jump_strength;
        self.locomotion = Locomotion::Airborne;
        true
    }

    pub fn handle_fast_fall(&mut self, fast_fall_speed: f32) -> bool {
        if !self.is_airborne() || self.is_frozen() {
            return false;
        }
        self.y_velocity = self.y_velocity.min(-fast_fall_speed);
        true
    }

    /// Apply a confirmed hit: damage, knockback, hitstun and hit-lag.
    pub fn receive_hit(&mut self, impact: &HitImpact, character: &Character) -> f32 {
        let dealt = self.take_damage(impact.damage, character);
        self.damage_taken += dealt;
        self.x_velocity = impact.knockback_x;
        self.y_velocity = impact.knockback_y;
        if impact.knockback_y > 0.0 {
            self.locomotion = Locomotion::Airborne;
        }
        self.action = ActionLock::Stunned;
        self.frames_until_neutral = impact.hitstun;
        self.hitlag_frames = self.hitlag_frames.max(impact.hit_lag);
        dealt
    }

    pub fn freeze(&mut self, frames: u32) {
        self.hitlag_frames = self.hitlag_frames.max(frames);
    }

    /// Per-tick countdown. A frozen player only thaws; otherwise recovery
    /// ticks down and returns the player to `Free` at zero.
    pub fn advance_timers(&mut self) {
        if self.hitlag_frames > 0 {
            self.hitlag_frames -= 1;
            return;
        }
        if self.frames_until_neutral > 0 {
            self.frames_until_neutral -= 1;
        }
        if self.frames_until_neutral == 0 && self.action != ActionLock::Free {
            if self.action == ActionLock::Stunned {
                self.x_velocity = 0.0;
            }
            self.action = ActionLock::Free;
            self.walk_stale = true;
        }
    }

    /// Touch down on the ground plane.
    pub fn land(&mut self, ground_y: f32, character: &Character) {
        self.y = ground_y;
        self.y_velocity = 0.0;
        self.locomotion = Locomotion::Grounded;
        self.jumps_remaining = character.max_jumps;
        self.walk_stale = true;
    }
}
