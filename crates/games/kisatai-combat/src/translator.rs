use std::sync::Arc;

use kisatai_core::game_trait::{SimEvent, TickInputs};
use kisatai_core::input::{InputFrame, PlayerInput};

use crate::catalog::{Attack, AttackDirection, AttackKey, AttackStrength, Character};
use crate::hooks;
use crate::physics::CombatConfig;
use crate::player::{Facing, Locomotion, Player};
use crate::resolution::{ActiveAttack, ActiveHitbox};

/// The single direction an attack reads from the held set.
pub fn held_direction(frame: &InputFrame) -> PlayerInput {
    [
        PlayerInput::Left,
        PlayerInput::Right,
        PlayerInput::Down,
        PlayerInput::Up,
    ]
    .into_iter()
    .find(|&input| frame.is_held(input))
    .unwrap_or(PlayerInput::Neutral)
}

pub fn attack_direction(
    input: PlayerInput,
    facing: Facing,
    locomotion: Locomotion,
) -> AttackDirection {
    let airborne = locomotion == Locomotion::Airborne;
    match input {
        PlayerInput::Left | PlayerInput::Right if !airborne => AttackDirection::Forward,
        PlayerInput::Left => {
            if facing == Facing::Left {
                AttackDirection::Forward
            } else {
                AttackDirection::Back
            }
        },
        PlayerInput::Right => {
            if facing == Facing::Right {
                AttackDirection::Forward
            } else {
                AttackDirection::Back
            }
        },
        PlayerInput::Down => AttackDirection::Down,
        PlayerInput::Up if airborne => AttackDirection::Up,
        _ => AttackDirection::Neutral,
    }
}

pub fn attack_key(strength: AttackStrength, player: &Player, frame: &InputFrame) -> AttackKey {
    AttackKey {
        strength,
        direction: attack_direction(held_direction(frame), player.facing, player.locomotion),
        airborne: player.is_airborne(),
    }
}

pub fn strength_for(input: PlayerInput) -> Option<AttackStrength> {
    match input {
        PlayerInput::Light => Some(AttackStrength::Light),
        PlayerInput::Special => Some(AttackStrength::Special),
        PlayerInput::Meter => Some(AttackStrength::Meter),
        _ => None,
    }
}

/// Instantiate `template` for `player`, mirrored for facing and back attacks.
pub fn create_active_attack(template: &Attack, key: AttackKey, player: &Player) -> ActiveAttack {
    let x_direction = player.facing.sign();
    let on_hit_multiplier = if key.direction == AttackDirection::Back {
        -1.0
    } else {
        1.0
    };

    let (x, y) = if template.create_using_world_coordinates || template.moves_with_player {
        (template.x, template.y)
    } else {
        (player.x + template.x * x_direction, player.y + template.y)
    };

    let hitboxes = template
        .hitboxes
        .iter()
        .map(|hb| {
            let mut hb = *hb;
            hb.x *= x_direction;
            hb.knockback_x *= x_direction * on_hit_multiplier;
            ActiveHitbox::new(hb)
        })
        .collect();

    ActiveAttack {
        key,
        player_slot: player.slot,
        hitboxes,
        x,
        y,
        x_speed: x_direction * template.x_speed,
        x_direction,
        current_frame: 0,
        lifetime: template.duration(),
        end_when_hitbox_connects: template.end_when_hitbox_connects,
        moves_with_player: template.moves_with_player,
        projectile: template.projectile,
    }
}

/// Try to start an attack. Rejections are silent apart from a debug log.
pub fn handle_attack(
    strength: AttackStrength,
    player: &mut Player,
    character: &Character,
    frame: &InputFrame,
    attacks: &mut Vec<ActiveAttack>,
    events: &mut Vec<SimEvent>,
) -> bool {
    let slot = player.slot;
    if !player.can_act() {
        tracing::debug!(slot, ?strength, "Attack rejected: player locked");
        return false;
    }
    let key = attack_key(strength, player, frame);
    let Some(template) = character.attack(&key) else {
        tracing::debug!(slot, attack = %key, "No catalog entry");
        return false;
    };
    if !player.start_attack(template.meter_cost, template.duration()) {
        tracing::debug!(
            slot,
            attack = %key,
            meter = player.meter,
            cost = template.meter_cost,
            "Attack rejected: not enough meter"
        );
        return false;
    }

    attacks.push(create_active_attack(template, key, player));
    events.push(SimEvent::AttackStarted {
        slot,
        attack: key.to_string(),
    });
    true
}

fn walk(player: &mut Player, direction: Facing, character: &Character) {
    if player.handle_move(direction, character) {
        hooks::apply_player_hook(character.hooks.on_move, player, character);
    }
}

fn facing_for(input: PlayerInput) -> Option<Facing> {
    match input {
        PlayerInput::Left => Some(Facing::Left),
        PlayerInput::Right => Some(Facing::Right),
        _ => None,
    }
}

/// Re-derive horizontal velocity from the held directions after landing or
/// recovering, so edges missed while locked do not leave the player sliding.
fn resync_walk(player: &mut Player, character: &Character, frame: &InputFrame) {
    let direction = match (frame.is_held(PlayerInput::Left), frame.is_held(PlayerInput::Right)) {
        (true, true) => Some(player.facing),
        (true, false) => Some(Facing::Left),
        (false, true) => Some(Facing::Right),
        (false, false) => None,
    };
    match direction {
        Some(direction) => player.handle_move(direction, character),
        None => player.handle_stop(),
    };
    player.walk_stale = false;
}

/// Apply one tick of input for every player, in slot order. A stale walk is
/// resynced first, then presses are handled in arrival order, then releases.
pub fn handle_player_inputs(
    players: &mut [Player],
    attacks: &mut Vec<ActiveAttack>,
    characters: &[Arc<Character>],
    inputs: &TickInputs,
    config: &CombatConfig,
    events: &mut Vec<SimEvent>,
) {
    for (player, character) in players.iter_mut().zip(characters) {
        let frame = inputs.frame(player.slot);

        if player.walk_stale && player.can_act() {
            resync_walk(player, character, frame);
        }

        for &input in &frame.pressed {
            match input {
                PlayerInput::Up => {
                    if player.handle_jump(config.physics.jump_velocity, character) {
                        hooks::apply_player_hook(character.hooks.on_jump, player, character);
                    }
                },
                PlayerInput::Down => {
                    player.handle_fast_fall(config.physics.fast_fall_speed);
                },
                PlayerInput::Left | PlayerInput::Right => {
                    let blocked = input.opposite().is_some_and(|other| frame.is_held(other));
                    if !blocked && let Some(direction) = facing_for(input) {
                        walk(player, direction, character);
                    }
                },
                PlayerInput::Light | PlayerInput::Special | PlayerInput::Meter => {
                    if let Some(strength) = strength_for(input) {
                        handle_attack(strength, player, character, frame, attacks, events);
                    }
                },
                PlayerInput::Neutral => {},
            }
        }

        for &input in &frame.released {
            if facing_for(input).is_none() {
                continue;
            }
            let still_held = input
                .opposite()
                .filter(|&other| frame.is_held(other))
                .and_then(facing_for);
            match still_held {
                Some(direction) => walk(player, direction, character),
                None => {
                    player.handle_stop();
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Hitbox;
    use crate::characters::katshuma;
    use crate::player::ActionLock;

    fn katshuma_at(x: f32, facing: Facing) -> (Player, Arc<Character>) {
        let k = Arc::new(katshuma());
        let p = Player::new(0, &k, x, 0.0, facing, 30.0);
        (p, k)
    }

    fn held(inputs: &[PlayerInput]) -> InputFrame {
        inputs
            .iter()
            .fold(InputFrame::new(), |frame, &input| frame.with_held(input))
    }

    #[test]
    fn held_direction_priority() {
        assert_eq!(held_direction(&InputFrame::new()), PlayerInput::Neutral);
        assert_eq!(
            held_direction(&held(&[PlayerInput::Up, PlayerInput::Down])),
            PlayerInput::Down
        );
        assert_eq!(
            held_direction(&held(&[PlayerInput::Right, PlayerInput::Left])),
            PlayerInput::Left
        );
        assert_eq!(
            held_direction(&held(&[PlayerInput::Up, PlayerInput::Right])),
            PlayerInput::Right
        );
    }

    #[test]
    fn direction_table() {
        use AttackDirection::*;
        use Facing::{Left as FL, Right as FR};
        use Locomotion::{Airborne as Air, Grounded as Gnd};

        assert_eq!(attack_direction(PlayerInput::Left, FR, Gnd), Forward);
        assert_eq!(attack_direction(PlayerInput::Right, FL, Gnd), Forward);
        assert_eq!(attack_direction(PlayerInput::Left, FL, Air), Forward);
        assert_eq!(attack_direction(PlayerInput::Left, FR, Air), Back);
        assert_eq!(attack_direction(PlayerInput::Right, FL, Air), Back);
        assert_eq!(attack_direction(PlayerInput::Down, FR, Gnd), Down);
        assert_eq!(attack_direction(PlayerInput::Up, FR, Gnd), Neutral);
        assert_eq!(attack_direction(PlayerInput::Up, FR, Air), Up);
        assert_eq!(attack_direction(PlayerInput::Neutral, FL, Air), Neutral);
    }

    #[test]
    fn forward_meter_attack_pays_and_locks() {
        let (mut p, k) = katshuma_at(0.0, Facing::Right);
        let frame = InputFrame::pressing(&[PlayerInput::Meter]).with_held(PlayerInput::Right);
        let mut attacks = Vec::new();
        let mut events = Vec::new();

        assert!(handle_attack(
            AttackStrength::Meter,
            &mut p,
            &k,
            &frame,
            &mut attacks,
            &mut events
        ));
        let expected = k
            .attack(&AttackKey::ground(AttackStrength::Meter, AttackDirection::Forward))
            .unwrap()
            .duration();
        assert_eq!(p.meter, 5.0);
        assert_eq!(p.action, ActionLock::Attacking);
        assert_eq!(p.frames_until_neutral, expected);
        assert_eq!(attacks.len(), 1);
        assert_eq!(
            events,
            vec![SimEvent::AttackStarted {
                slot: 0,
                attack: "MeterForward".to_string()
            }]
        );
    }

    #[test]
    fn unaffordable_attack_is_silent() {
        let (mut p, k) = katshuma_at(0.0, Facing::Right);
        p.meter = 24.0;
        let before = p.clone();
        let mut attacks = Vec::new();
        let mut events = Vec::new();
        let frame = InputFrame::pressing(&[PlayerInput::Meter]);
        assert!(!handle_attack(
            AttackStrength::Meter,
            &mut p,
            &k,
            &frame,
            &mut attacks,
            &mut events
        ));
        assert_eq!(p, before);
        assert!(attacks.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn missing_catalog_entry_is_silent() {
        let (mut p, k) = katshuma_at(0.0, Facing::Right);
        let frame = InputFrame::pressing(&[PlayerInput::Special]).with_held(PlayerInput::Right);
        let mut attacks = Vec::new();
        assert!(!handle_attack(
            AttackStrength::Special,
            &mut p,
            &k,
            &frame,
            &mut attacks,
            &mut Vec::new()
        ));
        assert!(attacks.is_empty());
    }

    #[test]
    fn mirroring_negates_x_only() {
        let k = katshuma();
        let key = AttackKey::ground(AttackStrength::Light, AttackDirection::Forward);
        let template = k.attack(&key).unwrap();
        let right = Player::new(0, &k, 100.0, 0.0, Facing::Right, 0.0);
        let left = Player::new(0, &k, 100.0, 0.0, Facing::Left, 0.0);

        let a = create_active_attack(template, key, &right);
        let b = create_active_attack(template, key, &left);
        for (ha, hb) in a.hitboxes.iter().zip(&b.hitboxes) {
            assert_eq!(ha.hitbox.x, -hb.hitbox.x);
            assert_eq!(ha.hitbox.knockback_x, -hb.hitbox.knockback_x);
            assert_eq!(ha.hitbox.y, hb.hitbox.y);
            assert_eq!(ha.hitbox.knockback_y, hb.hitbox.knockback_y);
        }
        assert_eq!(a.x, 100.0 + template.x);
        assert_eq!(b.x, 100.0 - template.x);
    }

    #[test]
    fn back_attack_knocks_backwards() {
        let k = katshuma();
        let key = AttackKey::air(AttackStrength::Light, AttackDirection::Back);
        let template = k.attack(&key).unwrap();
        let p = Player::new(0, &k, 0.0, 50.0, Facing::Right, 0.0);
        let attack = create_active_attack(template, key, &p);
        assert_eq!(attack.hitboxes[0].hitbox.x, template.hitboxes[0].x);
        assert_eq!(
            attack.hitboxes[0].hitbox.knockback_x,
            -template.hitboxes[0].knockback_x
        );
    }

    #[test]
    fn world_coordinate_attack_keeps_raw_origin() {
        let k = katshuma();
        let key = AttackKey::ground(AttackStrength::Light, AttackDirection::Neutral);
        let mut template = Attack::new(vec![
            Hitbox::new(0, 10, 1.0).at(20.0, 0.0),
            Hitbox::new(5, 10, 1.0).at(-15.0, 5.0),
        ])
        .at(40.0, 10.0);
        template.create_using_world_coordinates = true;
        let p = Player::new(0, &k, 100.0, 0.0, Facing::Left, 0.0);

        let attack = create_active_attack(&template, key, &p);
        assert_eq!((attack.x, attack.y), (40.0, 10.0));
        assert_eq!(attack.hitboxes[0].hitbox.x, -20.0);
        assert_eq!(attack.hitboxes[1].hitbox.x, 15.0);
        assert_eq!(attack.hitboxes[1].hitbox.y, 5.0);
    }

    #[test]
    fn attack_moving_with_player_keeps_raw_offset() {
        let k = katshuma();
        let key = AttackKey::ground(AttackStrength::Light, AttackDirection::Neutral);
        let template = Attack::new(vec![Hitbox::new(0, 10, 1.0).at(20.0, 0.0)])
            .moving_with_player()
            .at(40.0, 10.0);
        let p = Player::new(0, &k, 100.0, 0.0, Facing::Left, 0.0);

        let attack = create_active_attack(&template, key, &p);
        assert!(attack.moves_with_player);
        assert_eq!((attack.x, attack.y), (40.0, 10.0));
        assert_eq!(attack.hitboxes[0].hitbox.x, -20.0);
        assert_eq!(attack.x_direction, -1.0);
    }

    #[test]
    fn projectile_speed_follows_facing() {
        let m = crate::characters::mmkalll();
        let key = AttackKey::ground(AttackStrength::Light, AttackDirection::Neutral);
        let template = m.attack(&key).unwrap();
        let p = Player::new(1, &m, 0.0, 0.0, Facing::Left, 0.0);
        let attack = create_active_attack(template, key, &p);
        assert_eq!(attack.x_speed, -6.0);
        assert!(attack.projectile);
        assert_eq!(attack.player_slot, 1);
    }

    #[test]
    fn opposite_held_blocks_walk() {
        let (p, k) = katshuma_at(0.0, Facing::Right);
        let mut players = vec![p];
        let mut inputs = TickInputs::empty(1);
        inputs.frames[0] = InputFrame::pressing(&[PlayerInput::Left]).with_held(PlayerInput::Right);
        handle_player_inputs(
            &mut players,
            &mut Vec::new(),
            &[k],
            &inputs,
            &CombatConfig::default(),
            &mut Vec::new(),
        );
        assert_eq!(players[0].x_velocity, 0.0);
        assert_eq!(players[0].facing, Facing::Right);
    }

    #[test]
    fn release_walks_other_way_or_stops() {
        let (mut p, k) = katshuma_at(0.0, Facing::Right);
        p.x_velocity = 8.5;
        let mut players = vec![p];
        let chars = [k];
        let config = CombatConfig::default();

        let mut inputs = TickInputs::empty(1);
        inputs.frames[0] = InputFrame::new()
            .with_held(PlayerInput::Left)
            .with_released(PlayerInput::Right);
        handle_player_inputs(
            &mut players,
            &mut Vec::new(),
            &chars,
            &inputs,
            &config,
            &mut Vec::new(),
        );
        assert_eq!(players[0].x_velocity, -8.5);
        assert_eq!(players[0].facing, Facing::Left);

        inputs.frames[0] = InputFrame::new().with_released(PlayerInput::Left);
        handle_player_inputs(
            &mut players,
            &mut Vec::new(),
            &chars,
            &inputs,
            &config,
            &mut Vec::new(),
        );
        assert_eq!(players[0].x_velocity, 0.0);
    }

    #[test]
    fn stale_walk_stops_when_nothing_is_held() {
        let (mut p, k) = katshuma_at(0.0, Facing::Right);
        p.x_velocity = 10.0;
        p.walk_stale = true;
        let mut players = vec![p];
        handle_player_inputs(
            &mut players,
            &mut Vec::new(),
            &[k],
            &TickInputs::empty(1),
            &CombatConfig::default(),
            &mut Vec::new(),
        );
        assert_eq!(players[0].x_velocity, 0.0);
        assert!(!players[0].walk_stale);
    }

    #[test]
    fn stale_walk_uses_ground_speed_for_held_direction() {
        let (mut p, k) = katshuma_at(0.0, Facing::Right);
        p.x_velocity = 10.0;
        p.walk_stale = true;
        let mut players = vec![p];
        let mut inputs = TickInputs::empty(1);
        inputs.frames[0] = InputFrame::new().with_held(PlayerInput::Left);
        handle_player_inputs(
            &mut players,
            &mut Vec::new(),
            &[k],
            &inputs,
            &CombatConfig::default(),
            &mut Vec::new(),
        );
        assert_eq!(players[0].x_velocity, -8.5);
        assert_eq!(players[0].facing, Facing::Left);
    }

    #[test]
    fn stale_walk_waits_for_lock_to_end() {
        let (mut p, k) = katshuma_at(0.0, Facing::Right);
        p.x_velocity = 10.0;
        p.walk_stale = true;
        p.action = ActionLock::Attacking;
        p.frames_until_neutral = 3;
        let mut players = vec![p];
        handle_player_inputs(
            &mut players,
            &mut Vec::new(),
            &[k],
            &TickInputs::empty(1),
            &CombatConfig::default(),
            &mut Vec::new(),
        );
        assert_eq!(players[0].x_velocity, 10.0);
        assert!(players[0].walk_stale);
    }

    #[test]
    fn up_jumps_and_down_fast_falls() {
        let (p, k) = katshuma_at(0.0, Facing::Right);
        let mut players = vec![p];
        let chars = [k];
        let config = CombatConfig::default();

        let mut inputs = TickInputs::empty(1);
        inputs.frames[0] = InputFrame::pressing(&[PlayerInput::Up]);
        handle_player_inputs(
            &mut players,
            &mut Vec::new(),
            &chars,
            &inputs,
            &config,
            &mut Vec::new(),
        );
        assert!(players[0].is_airborne());
        assert_eq!(players[0].y_velocity, config.physics.jump_velocity);

        inputs.frames[0] = InputFrame::pressing(&[PlayerInput::Down]);
        handle_player_inputs(
            &mut players,
            &mut Vec::new(),
            &chars,
            &inputs,
            &config,
            &mut Vec::new(),
        );
        assert_eq!(players[0].y_velocity, -config.physics.fast_fall_speed);
    }

    #[test]
    fn airborne_up_light_uses_air_catalog() {
        let (mut p, k) = katshuma_at(0.0, Facing::Right);
        p.locomotion = Locomotion::Airborne;
        let frame = InputFrame::pressing(&[PlayerInput::Light]).with_held(PlayerInput::Up);
        let mut events = Vec::new();
        handle_attack(AttackStrength::Light, &mut p, &k, &frame, &mut Vec::new(), &mut events);
        assert_eq!(
            events,
            vec![SimEvent::AttackStarted {
                slot: 0,
                attack: "airLightUp".to_string()
            }]
        );
    }
}
