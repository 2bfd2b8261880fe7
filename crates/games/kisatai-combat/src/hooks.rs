//! Dispatch of character and hitbox hooks. Hooks are plain data in the
//! catalog; their effects live here.

use std::sync::Arc;

use crate::catalog::{Character, EachFrameHook, HitboxHook, PlayerHook};
use crate::player::Player;

/// What a hitbox hook asked of the attack that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookOutcome {
    pub end_attack: bool,
}

pub fn apply_player_hook(hook: PlayerHook, player: &mut Player, character: &Character) {
    match hook {
        PlayerHook::None => {},
        PlayerHook::GainMeter(amount) => player.gain_meter(amount, character),
        PlayerHook::Heal(amount) => player.heal(amount, character),
    }
}

/// Run a hitbox hook against the attack's owner.
pub fn apply_hitbox_hook(
    hook: HitboxHook,
    owner: &mut Player,
    character: &Character,
) -> HookOutcome {
    match hook {
        HitboxHook::None => HookOutcome::default(),
        HitboxHook::GainOwnerMeter(amount) => {
            owner.gain_meter(amount, character);
            HookOutcome::default()
        },
        HitboxHook::StopOwner => {
            owner.x_velocity = 0.0;
            owner.y_velocity = 0.0;
            HookOutcome::default()
        },
        HitboxHook::EndAttack => HookOutcome { end_attack: true },
    }
}

/// Summed horizontal distance from `slot` to every other player.
fn spacing(players: &[Player], slot: usize) -> (f32, usize) {
    let me = &players[slot];
    players
        .iter()
        .filter(|other| other.slot != me.slot)
        .fold((0.0, 0), |(sum, n), other| (sum + (other.x - me.x).abs(), n + 1))
}

/// Run every player's `on_each_frame` hook.
///
/// All inputs are measured before any player is updated, so every hook sees
/// the same previous-tick snapshot. Only meter, health and the explicit
/// history fields are touched.
pub fn run_each_frame(players: &mut [Player], characters: &[Arc<Character>]) {
    let measured: Vec<(f32, usize)> = (0..players.len()).map(|i| spacing(players, i)).collect();

    for ((player, character), (new_spacing, opponents)) in
        players.iter_mut().zip(characters).zip(measured)
    {
        match character.hooks.on_each_frame {
            EachFrameHook::None => {},
            EachFrameHook::MeterFromSpacing { multiplier } => {
                if let Some(previous) = player.previous_spacing
                    && opponents > 0
                {
                    let gain = ((new_spacing - previous) / opponents as f32).max(0.0) * multiplier;
                    player.gain_meter(gain, character);
                }
                player.previous_spacing = Some(new_spacing);
            },
            EachFrameHook::MeterRegen(amount) => player.gain_meter(amount, character),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CharacterHooks;
    use crate::characters::{KATSHUMA_METER_GAIN_MULTIPLIER, katshuma, mmkalll};
    use crate::player::Facing;

    fn pair() -> (Vec<Player>, Vec<Arc<Character>>) {
        let k = Arc::new(katshuma());
        let m = Arc::new(mmkalll());
        let players = vec![
            Player::new(0, &k, 0.0, 0.0, Facing::Right, 0.0),
            Player::new(1, &m, 100.0, 0.0, Facing::Left, 0.0),
        ];
        (players, vec![k, m])
    }

    #[test]
    fn spacing_meter_skips_first_tick() {
        let (mut players, chars) = pair();
        run_each_frame(&mut players, &chars);
        assert_eq!(players[0].meter, 0.0);
        assert_eq!(players[0].previous_spacing, Some(100.0));
    }

    #[test]
    fn spacing_meter_rewards_backing_off() {
        let (mut players, chars) = pair();
        run_each_frame(&mut players, &chars);
        players[0].x = -100.0;
        run_each_frame(&mut players, &chars);
        let expected = 100.0 * KATSHUMA_METER_GAIN_MULTIPLIER;
        assert!((players[0].meter - expected).abs() < 1e-4);
    }

    #[test]
    fn closing_distance_gains_nothing() {
        let (mut players, chars) = pair();
        run_each_frame(&mut players, &chars);
        players[0].x = 50.0;
        run_each_frame(&mut players, &chars);
        assert_eq!(players[0].meter, 0.0);
        assert_eq!(players[0].previous_spacing, Some(50.0));
    }

    #[test]
    fn characters_without_hook_are_untouched() {
        let (mut players, chars) = pair();
        run_each_frame(&mut players, &chars);
        players[0].x = -500.0;
        run_each_frame(&mut players, &chars);
        assert_eq!(players[1].meter, 0.0);
        assert_eq!(players[1].previous_spacing, None);
    }

    #[test]
    fn regen_is_clamped() {
        let mut c = mmkalll();
        c.hooks = CharacterHooks {
            on_each_frame: EachFrameHook::MeterRegen(60.0),
            ..CharacterHooks::default()
        };
        let c = Arc::new(c);
        let mut players = vec![Player::new(0, &c, 0.0, 0.0, Facing::Right, 0.0)];
        run_each_frame(&mut players, std::slice::from_ref(&c));
        run_each_frame(&mut players, std::slice::from_ref(&c));
        assert_eq!(players[0].meter, c.max_meter);
    }

    #[test]
    fn hitbox_hooks() {
        let (mut players, chars) = pair();
        players[0].x_velocity = 5.0;
        let out = apply_hitbox_hook(HitboxHook::StopOwner, &mut players[0], &chars[0]);
        assert!(!out.end_attack);
        assert_eq!(players[0].x_velocity, 0.0);

        apply_hitbox_hook(HitboxHook::GainOwnerMeter(-10.0), &mut players[0], &chars[0]);
        assert_eq!(players[0].meter, 0.0, "meter never goes negative");

        let out = apply_hitbox_hook(HitboxHook::EndAttack, &mut players[0], &chars[0]);
        assert!(out.end_attack);
    }

    #[test]
    fn player_hooks_clamp() {
        let (mut players, chars) = pair();
        players[0].health = 95.0;
        apply_player_hook(PlayerHook::Heal(20.0), &mut players[0], &chars[0]);
        assert_eq!(players[0].health, 100.0);
        apply_player_hook(PlayerHook::GainMeter(7.0), &mut players[0], &chars[0]);
        assert_eq!(players[0].meter, 7.0);
    }
}
