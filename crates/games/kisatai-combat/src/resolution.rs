use std::sync::Arc;

use kisatai_core::game_trait::{PlayerSlot, SimEvent};
use serde::{Deserialize, Serialize};

use crate::catalog::{AttackKey, Character, Hitbox};
use crate::hooks::{self, HookOutcome};
use crate::physics::CombatConfig;
use crate::player::{HitImpact, Player};

/// A hitbox copied into an in-flight attack, already mirrored for facing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveHitbox {
    pub hitbox: Hitbox,
    /// Set on the first tick the hitbox is observed active.
    pub activated: bool,
    /// Targets this hitbox has already connected with.
    pub connected: Vec<PlayerSlot>,
}

impl ActiveHitbox {
    pub fn new(hitbox: Hitbox) -> Self {
        Self {
            hitbox,
            activated: false,
            connected: Vec::new(),
        }
    }
}

/// An attack instance in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveAttack {
    pub key: AttackKey,
    pub player_slot: PlayerSlot,
    pub hitboxes: Vec<ActiveHitbox>,
    /// World origin, or the owner-relative offset when `moves_with_player`.
    pub x: f32,
    pub y: f32,
    pub x_speed: f32,
    /// -1 when created facing left, +1 otherwise.
    pub x_direction: f32,
    pub current_frame: u32,
    pub lifetime: u32,
    pub end_when_hitbox_connects: bool,
    pub moves_with_player: bool,
    pub projectile: bool,
}

impl ActiveAttack {
    /// World-space origin this tick.
    pub fn origin(&self, owner: &Player) -> (f32, f32) {
        if self.moves_with_player {
            (owner.x + self.x * self.x_direction, owner.y + self.y)
        } else {
            (self.x, self.y)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.current_frame > self.lifetime
    }
}

/// Knockback, hitstun and damage for `hitbox` landing on a target that has
/// already taken `damage_taken`.
pub fn compute_impact(hitbox: &Hitbox, damage_taken: f32, config: &CombatConfig) -> HitImpact {
    let f = config.growth_factor(damage_taken);
    let magnitude = hitbox.knockback_base + hitbox.knockback_growth * f;
    HitImpact {
        damage: hitbox.damage,
        knockback_x: hitbox.knockback_x * magnitude,
        knockback_y: hitbox.knockback_y * magnitude,
        hitstun: (hitbox.hitstun_base + hitbox.hitstun_growth * f).round().max(0.0) as u32,
        hit_lag: hitbox.hit_lag,
    }
}

/// Circle-circle overlap, strict.
pub fn circles_overlap(a: (f32, f32), ra: f32, b: (f32, f32), rb: f32) -> bool {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt() < ra + rb
}

/// Advance every in-flight attack one frame, resolve its hits, and drop the
/// ones that finished. Attacks are processed in insertion order, so several
/// hits on one target in one tick stack damage and the last knockback wins.
pub fn update_attacks(
    players: &mut [Player],
    attacks: &mut Vec<ActiveAttack>,
    characters: &[Arc<Character>],
    config: &CombatConfig,
    events: &mut Vec<SimEvent>,
) {
    let mut survivors = Vec::with_capacity(attacks.len());

    for mut attack in attacks.drain(..) {
        let owner = attack.player_slot;
        let Some(owner_character) = characters.get(owner) else {
            tracing::debug!(owner, "Dropped attack with no live owner");
            continue;
        };
        if players[owner].is_frozen() && !attack.projectile {
            survivors.push(attack);
            continue;
        }

        attack.current_frame += 1;
        let frame = attack.current_frame;
        let origin = attack.origin(&players[owner]);
        let mut connected_this_tick = false;
        let mut outcome = HookOutcome::default();

        for active in &mut attack.hitboxes {
            let hitbox = active.hitbox;
            if !hitbox.is_active_at(frame) {
                continue;
            }
            if !active.activated {
                active.activated = true;
                let hook = hooks::apply_hitbox_hook(
                    hitbox.on_activation,
                    &mut players[owner],
                    owner_character,
                );
                merge(&mut outcome, hook);
            }

            let center = (origin.0 + hitbox.x, origin.1 + hitbox.y);
            for target in 0..players.len() {
                if target == owner || active.connected.contains(&target) {
                    continue;
                }
                let Some(target_character) = characters.get(target) else {
                    continue;
                };
                let victim = &players[target];
                if !circles_overlap(
                    center,
                    hitbox.radius,
                    (victim.x, victim.y),
                    target_character.hurtbox_radius,
                ) {
                    continue;
                }

                active.connected.push(target);
                connected_this_tick = true;

                let impact = compute_impact(&hitbox, victim.damage_taken, config);
                let dealt = players[target].receive_hit(&impact, target_character);
                if !hitbox.ignore_owner_hitlag {
                    players[owner].freeze(hitbox.hit_lag);
                }

                merge(
                    &mut outcome,
                    hooks::apply_hitbox_hook(hitbox.on_hit, &mut players[owner], owner_character),
                );
                hooks::apply_player_hook(
                    target_character.hooks.on_get_hit,
                    &mut players[target],
                    target_character,
                );
                hooks::apply_player_hook(
                    owner_character.hooks.on_attack_hit,
                    &mut players[owner],
                    owner_character,
                );

                tracing::debug!(
                    attacker = owner,
                    target,
                    attack = %attack.key,
                    damage = dealt,
                    hitstun = impact.hitstun,
                    "Hit confirmed"
                );
                events.push(SimEvent::Hit {
                    attacker: owner,
                    target,
                    damage: dealt,
                });
            }
        }

        let ended = outcome.end_attack
            || (attack.end_when_hitbox_connects && connected_this_tick)
            || attack.is_expired();
        if ended {
            for active in &attack.hitboxes {
                hooks::apply_hitbox_hook(
                    active.hitbox.on_end,
                    &mut players[owner],
                    owner_character,
                );
            }
        } else {
            survivors.push(attack);
        }
    }

    *attacks = survivors;
}

fn merge(into: &mut HookOutcome, from: HookOutcome) {
    into.end_attack |= from.end_attack;
}
