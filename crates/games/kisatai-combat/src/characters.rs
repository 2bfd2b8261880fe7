use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{
    Attack, AttackDirection, AttackKey, AttackStrength, Character, CharacterHooks, EachFrameHook,
    Hitbox,
};
use crate::error::{Result, RosterError};

use AttackDirection::{Back, Down, Forward, Neutral, Up};
use AttackStrength::{Light, Meter, Special};

/// Meter gained per unit of increased spacing, per opponent.
pub const KATSHUMA_METER_GAIN_MULTIPLIER: f32 = 0.055;

fn heavy_blow() -> Attack {
    Attack::new(vec![
        Hitbox::new(0, 40, 20.0)
            .with_radius(100.0)
            .with_knockback(13.0, 1.3, 1.0, 1.0)
            .with_hitstun(50.0, 1.0)
            .with_hit_lag(12, false)
            .at(35.0, 5.0),
    ])
    .with_meter_cost(25.0)
}

/// Single-hitbox melee attack active from frame 0 for `duration` frames.
fn jab(
    damage: f32,
    radius: f32,
    knockback: (f32, f32, f32, f32),
    hitstun: (f32, f32),
    offset: (f32, f32),
    duration: u32,
) -> Attack {
    let (base, growth, kx, ky) = knockback;
    Attack::new(vec![
        Hitbox::new(0, duration, damage)
            .with_radius(radius)
            .with_knockback(base, growth, kx, ky)
            .with_hitstun(hitstun.0, hitstun.1)
            .with_hit_lag(12, false)
            .at(offset.0, offset.1),
    ])
}

/// The boxer: fast on the ground, builds meter by creating space.
pub fn katshuma() -> Character {
    let mut attacks = BTreeMap::new();

    attacks.insert(
        AttackKey::ground(Light, Neutral),
        Attack::new(vec![
            Hitbox::new(4, 12, 5.0).with_radius(30.0),
            Hitbox::new(12, 20, 10.0).with_hit_lag(20, false),
        ]),
    );
    attacks.insert(
        AttackKey::ground(Light, Forward),
        jab(4.0, 25.0, (6.0, 1.2, 0.5, 1.0), (20.0, 1.0), (5.0, -5.0), 40),
    );
    attacks.insert(
        AttackKey::ground(Light, Down),
        jab(6.0, 20.0, (15.0, 1.5, 1.0, -1.0), (30.0, 1.0), (30.0, -30.0), 40),
    );
    attacks.insert(
        AttackKey::air(Light, Neutral),
        jab(9.0, 20.0, (1.0, 1.1, 1.0, 1.0), (20.0, 1.0), (0.0, 5.0), 40),
    );
    attacks.insert(
        AttackKey::air(Light, Up),
        jab(6.0, 45.0, (13.0, 1.2, 0.1, 1.2), (15.0, 1.1), (10.0, 20.0), 120),
    );
    attacks.insert(
        AttackKey::air(Light, Down),
        jab(10.0, 30.0, (30.0, 1.3, 0.0, -1.0), (10.0, 1.0), (0.0, -50.0), 40),
    );
    attacks.insert(
        AttackKey::air(Light, Forward),
        jab(5.0, 35.0, (18.0, 1.2, 1.0, 0.2), (10.0, 1.0), (15.0, 5.0), 60),
    );
    attacks.insert(
        AttackKey::air(Light, Back),
        jab(8.0, 20.0, (28.0, 1.1, 1.0, 0.8), (25.0, 1.0), (30.0, 0.0), 50),
    );

    // Specials are reserved slots with no hitboxes yet.
    for key in [
        AttackKey::ground(Special, Neutral),
        AttackKey::ground(Special, Down),
        AttackKey::air(Special, Neutral),
        AttackKey::air(Special, Up),
        AttackKey::air(Special, Down),
        AttackKey::air(Special, Forward),
        AttackKey::air(Special, Back),
    ] {
        attacks.insert(key, Attack::default());
    }

    for key in [
        AttackKey::ground(Meter, Neutral),
        AttackKey::ground(Meter, Forward),
        AttackKey::ground(Meter, Down),
        AttackKey::air(Meter, Neutral),
        AttackKey::air(Meter, Up),
        AttackKey::air(Meter, Down),
        AttackKey::air(Meter, Forward),
        AttackKey::air(Meter, Back),
    ] {
        attacks.insert(key, heavy_blow());
    }

    Character {
        id: "katshuma".to_string(),
        name: "ボクサー".to_string(),
        max_health: 100.0,
        max_meter: 100.0,
        starting_meter: 0.0,
        meter_thresholds: vec![25.0, 50.0, 75.0, 100.0],
        walk_speed: 8.5,
        air_speed: 10.0,
        weight: 1.0,
        max_jumps: 2,
        jump_strength: 1.0,
        hurtbox_radius: 20.0,
        attacks,
        hooks: CharacterHooks {
            on_each_frame: EachFrameHook::MeterFromSpacing {
                multiplier: KATSHUMA_METER_GAIN_MULTIPLIER,
            },
            ..CharacterHooks::default()
        },
    }
}

/// Slow zoner whose light neutral is a travelling projectile.
pub fn mmkalll() -> Character {
    let mut attacks = BTreeMap::new();
    attacks.insert(
        AttackKey::ground(Light, Neutral),
        Attack::new(vec![
            Hitbox::new(4, 12, 5.0).with_radius(123.0),
            Hitbox::new(12, 20, 10.0),
            Hitbox::new(19, 40, 50.0),
        ])
        .as_projectile(6.0),
    );

    Character {
        id: "mmkalll".to_string(),
        name: "True mmKALLL".to_string(),
        max_health: 100.0,
        max_meter: 100.0,
        starting_meter: 0.0,
        meter_thresholds: vec![50.0, 100.0],
        walk_speed: 5.0,
        air_speed: 8.0,
        weight: 1.0,
        max_jumps: 2,
        jump_strength: 1.0,
        hurtbox_radius: 20.0,
        attacks,
        hooks: CharacterHooks::default(),
    }
}

/// Immutable character table, built once before a match.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    characters: BTreeMap<String, Arc<Character>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in character.
    pub fn standard() -> Self {
        let mut roster = Self::new();
        roster.insert(katshuma());
        roster.insert(mmkalll());
        roster
    }

    /// Add or replace a character under its id.
    pub fn insert(&mut self, character: Character) {
        self.characters
            .insert(character.id.clone(), Arc::new(character));
    }

    pub fn find(&self, id: &str) -> Option<&Arc<Character>> {
        self.characters.get(id)
    }

    pub fn get(&self, id: &str) -> Result<Arc<Character>> {
        self.find(id)
            .cloned()
            .ok_or_else(|| RosterError::UnknownCharacter(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.characters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
