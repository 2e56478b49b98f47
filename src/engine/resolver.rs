//! Resolution of a single player action against the opponent.
//!
//! Health changes are applied here; narration is returned to the caller
//! instead of being written onto the combatants, so the resolver has no
//! notion of time and can be replayed from a seed.

use crate::engine::catalog::{action, weapon};
use crate::engine::combatant::{OpponentShip, PlayerShip};
use crate::engine::dialogue::{Cue, ATTACK_FAIL_LINE, DODGE_FAIL_LINE};
use crate::engine::dice::Dice;
use crate::engine::error::BattleError;
use crate::engine::models::{ActionKind, Outcome, WeaponKind};
use crate::engine::tuning::BattleTuning;

/// What one player action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: ActionKind,
    pub weapon: Option<WeaponKind>,
    pub outcome: Outcome,
    pub damage: u32,
    /// Line for the player's action box.
    pub action_text: String,
    /// Opponent's reply for its speech bubble.
    pub opponent_speech: String,
}

pub fn resolve(
    player: &mut PlayerShip,
    opponent: &mut OpponentShip,
    action_kind: ActionKind,
    weapon_kind: Option<WeaponKind>,
    tuning: &BattleTuning,
    dice: &mut dyn Dice,
) -> Result<Resolution, BattleError> {
    let (outcome, damage, opponent_speech) = match action_kind {
        ActionKind::Dodge => {
            let dodge_chance = action(ActionKind::Dodge).success_probability.unwrap_or(0.0);
            if dice.chance() < dodge_chance {
                (Outcome::DodgeSuccess, 0, opponent.dialogue.line(Cue::Dodged, dice))
            } else {
                let damage = dice.roll(tuning.dodge_fail_damage.range());
                player.ship.apply_damage(damage);
                (Outcome::DodgeFail, damage, DODGE_FAIL_LINE.to_string())
            }
        }
        ActionKind::Attack => {
            let kind = weapon_kind.ok_or_else(|| {
                BattleError::InvalidArgument("attack requires a weapon selection".into())
            })?;
            let stats = weapon(kind);
            if dice.chance() < stats.success_probability {
                opponent.ship.apply_damage(stats.damage_per_hit);
                (
                    Outcome::AttackSuccess,
                    stats.damage_per_hit,
                    opponent.dialogue.line(Cue::Struck, dice),
                )
            } else {
                (Outcome::AttackFail, 0, ATTACK_FAIL_LINE.to_string())
            }
        }
        ActionKind::Ignore => {
            let damage = dice.roll(tuning.ignore_damage.range());
            player.ship.apply_damage(damage);
            (Outcome::Ignore, damage, opponent.dialogue.line(Cue::Ignored, dice))
        }
    };

    Ok(Resolution {
        action: action_kind,
        weapon: if action_kind == ActionKind::Attack { weapon_kind } else { None },
        outcome,
        damage,
        action_text: outcome.action_text(damage),
        opponent_speech,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::dice::{ScriptedDice, SeededDice};
    use crate::engine::strategy::WeightedStrategy;

    fn ships() -> (PlayerShip, OpponentShip) {
        (
            PlayerShip::new("ACE"),
            OpponentShip::new("CORVETTE", 120, Arc::new(WeightedStrategy::fast())),
        )
    }

    #[test]
    fn test_dodge_success_leaves_health_untouched() {
        let (mut p, mut o) = ships();
        let mut dice = ScriptedDice::new().with_chances([0.69]);
        let r = resolve(&mut p, &mut o, ActionKind::Dodge, None, &BattleTuning::default(), &mut dice).unwrap();
        assert_eq!(r.outcome, Outcome::DodgeSuccess);
        assert_eq!(r.damage, 0);
        assert_eq!(p.ship.health(), 150);
        assert_eq!(o.ship.health(), 120);
        assert!(o.dialogue.pool(Cue::Dodged).contains(&r.opponent_speech));
    }

    #[test]
    fn test_dodge_fail_hurts_the_dodger() {
        let (mut p, mut o) = ships();
        let mut dice = ScriptedDice::new().with_chances([0.7]).with_rolls([17]);
        let r = resolve(&mut p, &mut o, ActionKind::Dodge, None, &BattleTuning::default(), &mut dice).unwrap();
        assert_eq!(r.outcome, Outcome::DodgeFail);
        assert_eq!(r.damage, 17);
        assert_eq!(p.ship.health(), 133);
        assert_eq!(o.ship.health(), 120);
        assert_eq!(r.opponent_speech, DODGE_FAIL_LINE);
        assert_eq!(r.action_text, "DODGE FAILED! -17 HP");
    }

    #[test]
    fn test_attack_success_uses_weapon_damage() {
        let (mut p, mut o) = ships();
        let mut dice = ScriptedDice::new().with_chances([0.5]);
        let r = resolve(
            &mut p,
            &mut o,
            ActionKind::Attack,
            Some(WeaponKind::Laser),
            &BattleTuning::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(r.outcome, Outcome::AttackSuccess);
        assert_eq!(r.damage, 35);
        assert_eq!(o.ship.health(), 85);
        assert_eq!(p.ship.health(), 150);
    }

    #[test]
    fn test_attack_fail_deals_nothing() {
        let (mut p, mut o) = ships();
        let mut dice = ScriptedDice::new().with_chances([0.75]);
        let r = resolve(
            &mut p,
            &mut o,
            ActionKind::Attack,
            Some(WeaponKind::Shield),
            &BattleTuning::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(r.outcome, Outcome::AttackFail);
        assert_eq!(r.damage, 0);
        assert_eq!(o.ship.health(), 120);
        assert_eq!(r.opponent_speech, ATTACK_FAIL_LINE);
    }

    #[test]
    fn test_attack_without_weapon_is_invalid() {
        let (mut p, mut o) = ships();
        let mut dice = ScriptedDice::new();
        let err = resolve(&mut p, &mut o, ActionKind::Attack, None, &BattleTuning::default(), &mut dice)
            .unwrap_err();
        assert!(matches!(err, BattleError::InvalidArgument(_)));
        assert_eq!(o.ship.health(), 120);
        assert_eq!(p.ship.health(), 150);
    }

    #[test]
    fn test_ignore_always_costs_health() {
        let (mut p, mut o) = ships();
        let tuning = BattleTuning::default();
        let mut dice = SeededDice::new(3);
        for _ in 0..5 {
            let before = p.ship.health();
            let r = resolve(&mut p, &mut o, ActionKind::Ignore, None, &tuning, &mut dice).unwrap();
            assert_eq!(r.outcome, Outcome::Ignore);
            assert!((20..=30).contains(&r.damage));
            assert_eq!(p.ship.health(), before - r.damage);
        }
    }

    #[test]
    fn test_weapon_is_dropped_for_non_attacks() {
        let (mut p, mut o) = ships();
        let mut dice = ScriptedDice::new();
        let r = resolve(
            &mut p,
            &mut o,
            ActionKind::Ignore,
            Some(WeaponKind::Ion),
            &BattleTuning::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(r.weapon, None);
    }

    #[test]
    fn test_same_seed_same_resolution() {
        let tuning = BattleTuning::default();
        for (action, weapon) in [
            (ActionKind::Dodge, None),
            (ActionKind::Attack, Some(WeaponKind::Ion)),
            (ActionKind::Ignore, None),
        ] {
            let run = |seed| {
                let (mut p, mut o) = ships();
                let mut dice = SeededDice::new(seed);
                let r = resolve(&mut p, &mut o, action, weapon, &tuning, &mut dice).unwrap();
                (r, p.ship.health(), o.ship.health())
            };
            for seed in 0..20 {
                assert_eq!(run(seed), run(seed));
            }
        }
    }
}
