//! Timed phase machine for the opponent's turn.
//!
//! ```text
//!   Deciding ──(elapsed >= decide)──> Resolving ──(elapsed >= resolve)──> Done
//! ```
//!
//! Each phase runs its entry work exactly once, on the first tick that lands
//! in it: Deciding draws the attack, Resolving rolls and applies damage, Done
//! hands the turn back to the player. Phase transitions are gated on elapsed
//! wall-clock time, never on tick counts, and at most one transition happens
//! per tick. A late tick therefore walks the phases in order over successive
//! ticks instead of skipping the attack.

use std::time::Instant;

use crate::engine::catalog::attack_name;
use crate::engine::combatant::{OpponentShip, PlayerShip};
use crate::engine::dialogue::Cue;
use crate::engine::dice::Dice;
use crate::engine::models::AttackKind;
use crate::engine::tuning::BattleTuning;

/// Phase of an opponent turn with the values it has latched so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Deciding { attack: Option<AttackKind> },
    Resolving { attack: AttackKind, damage: u32 },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnProgress {
    InProgress,
    Complete,
}

/// Something that happened during a tick, for logging and replays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    AttackChosen { attack: AttackKind },
    DamageDealt { attack: AttackKind, damage: u32 },
    TurnHandedBack,
}

#[derive(Debug, Clone)]
pub struct OpponentTurn {
    started_at: Instant,
    phase: TurnPhase,
}

impl OpponentTurn {
    /// A fresh turn starting at `now`, with nothing latched.
    pub fn begin(now: Instant) -> Self {
        Self {
            started_at: now,
            phase: TurnPhase::Deciding { attack: None },
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Advance the turn. Call once per frame while the opponent holds the turn.
    pub fn tick(
        &mut self,
        now: Instant,
        opponent: &mut OpponentShip,
        player: &mut PlayerShip,
        tuning: &BattleTuning,
        dice: &mut dyn Dice,
    ) -> (TurnProgress, Option<TurnEvent>) {
        let elapsed = now.saturating_duration_since(self.started_at);

        match self.phase {
            TurnPhase::Deciding { attack: None } => {
                let attack = opponent.strategy.choose_attack(dice);
                let speech = opponent.dialogue.line(Cue::Announce(attack), dice);
                let line = format!("{} USES {}!", opponent.name(), attack_name(attack));
                opponent.ship.announce(line, now);
                opponent.ship.say(speech, now);
                self.phase = TurnPhase::Deciding { attack: Some(attack) };
                tracing::debug!(opponent = %opponent.name(), attack = attack.id(), "attack chosen");
                (TurnProgress::InProgress, Some(TurnEvent::AttackChosen { attack }))
            }
            TurnPhase::Deciding { attack: Some(attack) } => {
                if elapsed < tuning.decide_window() {
                    return (TurnProgress::InProgress, None);
                }
                let damage = dice.roll(tuning.opponent_damage.range());
                player.ship.apply_damage(damage);
                opponent
                    .ship
                    .announce(format!("{} DEALT {} DAMAGE!", attack_name(attack), damage), now);
                self.phase = TurnPhase::Resolving { attack, damage };
                tracing::debug!(attack = attack.id(), damage, player_health = player.ship.health(), "damage dealt");
                (TurnProgress::InProgress, Some(TurnEvent::DamageDealt { attack, damage }))
            }
            TurnPhase::Resolving { .. } => {
                if elapsed < tuning.resolve_window() {
                    return (TurnProgress::InProgress, None);
                }
                opponent.ship.has_turn = false;
                player.ship.has_turn = true;
                self.phase = TurnPhase::Done;
                (TurnProgress::Complete, Some(TurnEvent::TurnHandedBack))
            }
            TurnPhase::Done => (TurnProgress::Complete, None),
        }
    }
}
