use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which attack button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackStrength {
    Light,
    Special,
    Meter,
}

/// Direction of an attack relative to the attacker's facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackDirection {
    Neutral,
    Forward,
    Back,
    Up,
    Down,
}

/// Structured catalog key: strength + direction + whether the attacker is airborne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttackKey {
    pub strength: AttackStrength,
    pub direction: AttackDirection,
    pub airborne: bool,
}

impl AttackKey {
    pub const fn ground(strength: AttackStrength, direction: AttackDirection) -> Self {
        Self {
            strength,
            direction,
            airborne: false,
        }
    }

    pub const fn air(strength: AttackStrength, direction: AttackDirection) -> Self {
        Self {
            strength,
            direction,
            airborne: true,
        }
    }
}

impl fmt::Display for AttackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.airborne {
            write!(f, "air{:?}{:?}", self.strength, self.direction)
        } else {
            write!(f, "{:?}{:?}", self.strength, self.direction)
        }
    }
}

/// Effect run when a hitbox activates, connects, or its attack ends.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum HitboxHook {
    #[default]
    None,
    /// Add meter to the attack's owner (negative drains).
    GainOwnerMeter(f32),
    /// Zero the owner's velocity.
    StopOwner,
    /// End the whole attack at the end of this tick.
    EndAttack,
}

/// Passive effect run for every player once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum EachFrameHook {
    #[default]
    None,
    /// Gain meter when the summed horizontal distance to opponents grows.
    MeterFromSpacing { multiplier: f32 },
    /// Flat meter gain per tick.
    MeterRegen(f32),
}

/// Effect run on a player after moving, jumping, landing a hit, or being hit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PlayerHook {
    #[default]
    None,
    GainMeter(f32),
    Heal(f32),
}

/// A circular damage region belonging to an attack.
///
/// Offsets are relative to the attack origin with +x pointing the way the
/// attacker faces and +y pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub damage: f32,
    pub radius: f32,
    pub knockback_base: f32,
    pub knockback_growth: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub hitstun_base: f32,
    pub hitstun_growth: f32,
    pub hit_lag: u32,
    pub ignore_owner_hitlag: bool,
    pub x: f32,
    pub y: f32,
    pub frames_until_activation: u32,
    pub duration: u32,
    pub on_activation: HitboxHook,
    pub on_hit: HitboxHook,
    pub on_end: HitboxHook,
}

impl Default for Hitbox {
    fn default() -> Self {
        Self {
            damage: 0.0,
            radius: 20.0,
            knockback_base: 5.0,
            knockback_growth: 1.0,
            knockback_x: 1.0,
            knockback_y: 1.0,
            hitstun_base: 15.0,
            hitstun_growth: 1.0,
            hit_lag: 8,
            ignore_owner_hitlag: false,
            x: 20.0,
            y: 0.0,
            frames_until_activation: 0,
            duration: 1,
            on_activation: HitboxHook::None,
            on_hit: HitboxHook::None,
            on_end: HitboxHook::None,
        }
    }
}

impl Hitbox {
    /// Hitbox active on frames `start..end` dealing `damage`, other fields default.
    pub fn new(start: u32, end: u32, damage: f32) -> Self {
        Self {
            damage,
            frames_until_activation: start,
            duration: end.saturating_sub(start),
            ..Self::default()
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_knockback(mut self, base: f32, growth: f32, x: f32, y: f32) -> Self {
        self.knockback_base = base;
        self.knockback_growth = growth;
        self.knockback_x = x;
        self.knockback_y = y;
        self
    }

    pub fn with_hitstun(mut self, base: f32, growth: f32) -> Self {
        self.hitstun_base = base;
        self.hitstun_growth = growth;
        self
    }

    pub fn with_hit_lag(mut self, frames: u32, ignore_owner: bool) -> Self {
        self.hit_lag = frames;
        self.ignore_owner_hitlag = ignore_owner;
        self
    }

    pub fn on_hit(mut self, hook: HitboxHook) -> Self {
        self.on_hit = hook;
        self
    }

    /// First frame after the active window.
    pub fn end_frame(&self) -> u32 {
        self.frames_until_activation + self.duration
    }

    /// Active iff `frames_until_activation <= frame < frames_until_activation + duration`.
    pub fn is_active_at(&self, frame: u32) -> bool {
        frame >= self.frames_until_activation && frame < self.end_frame()
    }
}

/// Immutable attack template owned by a character.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attack {
    pub hitboxes: Vec<Hitbox>,
    pub meter_cost: f32,
    pub end_when_hitbox_connects: bool,
    pub moves_with_player: bool,
    pub create_using_world_coordinates: bool,
    pub projectile: bool,
    pub x: f32,
    pub y: f32,
    pub x_speed: f32,
}

impl Attack {
    pub fn new(hitboxes: Vec<Hitbox>) -> Self {
        Self {
            hitboxes,
            ..Self::default()
        }
    }

    pub fn with_meter_cost(mut self, cost: f32) -> Self {
        self.meter_cost = cost;
        self
    }

    pub fn ending_on_connect(mut self) -> Self {
        self.end_when_hitbox_connects = true;
        self
    }

    pub fn moving_with_player(mut self) -> Self {
        self.moves_with_player = true;
        self
    }

    /// Projectile travelling `x_speed` units per tick in the facing direction.
    pub fn as_projectile(mut self, x_speed: f32) -> Self {
        self.projectile = true;
        self.x_speed = x_speed;
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Total lifetime in frames: the latest hitbox end frame, 0 without hitboxes.
    pub fn duration(&self) -> u32 {
        self.hitboxes
            .iter()
            .map(Hitbox::end_frame)
            .max()
            .unwrap_or(0)
    }
}

/// Character-specific hooks, dispatched by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CharacterHooks {
    pub on_each_frame: EachFrameHook,
    pub on_move: PlayerHook,
    pub on_jump: PlayerHook,
    pub on_attack_hit: PlayerHook,
    pub on_get_hit: PlayerHook,
}

/// Immutable character definition, shared by every player using it.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub max_health: f32,
    pub max_meter: f32,
    pub starting_meter: f32,
    pub meter_thresholds: Vec<f32>,
    pub walk_speed: f32,
    pub air_speed: f32,
    /// Carried for character data completeness; the knockback formula does not scale by it.
    pub weight: f32,
    pub max_jumps: u8,
    pub jump_strength: f32,
    pub hurtbox_radius: f32,
    pub attacks: BTreeMap<AttackKey, Attack>,
    pub hooks: CharacterHooks,
}

impl Character {
    pub fn attack(&self, key: &AttackKey) -> Option<&Attack> {
        self.attacks.get(key)
    }

    /// Number of meter thresholds reached (how many meter "bars" are full).
    pub fn meter_level(&self, meter: f32) -> usize {
        self.meter_thresholds.iter().filter(|&&t| meter >= t).count()
    }
}
