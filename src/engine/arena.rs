//! Autopilot arena: plays many battles headlessly on a simulated clock to
//! measure how a piloting policy fares against an opponent.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::engine::battle::Battle;
use crate::engine::catalog::{best_weapon, DEFAULT_PLAYER_NAME};
use crate::engine::combatant::{OpponentShip, PlayerShip};
use crate::engine::dice::{Dice, SeededDice};
use crate::engine::models::{ActionKind, BattleResult, WeaponKind};
use crate::engine::tuning::BattleTuning;

/// Simulated frame length.
pub const FRAME: Duration = Duration::from_micros(16_667);
/// Player turns before a battle is declared unfinished.
pub const MAX_ROUNDS: u32 = 500;

/// Chooses the player's action from the current battle state.
pub trait PilotPolicy: Send + Sync {
    fn name(&self) -> &str;

    fn choose_action(&self, battle: &Battle, dice: &mut dyn Dice) -> (ActionKind, Option<WeaponKind>);
}

/// Always the same action.
pub struct FixedPilot {
    pub action: ActionKind,
    pub weapon: Option<WeaponKind>,
}

impl PilotPolicy for FixedPilot {
    fn name(&self) -> &str {
        self.action.id()
    }

    fn choose_action(&self, _battle: &Battle, _dice: &mut dyn Dice) -> (ActionKind, Option<WeaponKind>) {
        (self.action, self.weapon)
    }
}

/// Uniformly random action, and a random weapon when attacking.
pub struct RandomPilot;

impl PilotPolicy for RandomPilot {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_action(&self, _battle: &Battle, dice: &mut dyn Dice) -> (ActionKind, Option<WeaponKind>) {
        let action = ActionKind::ALL[dice.pick(ActionKind::ALL.len())];
        let weapon = (action == ActionKind::Attack).then(|| WeaponKind::ALL[dice.pick(WeaponKind::ALL.len())]);
        (action, weapon)
    }
}

/// Dodges when health falls below a fraction, otherwise attacks with the
/// best expected-damage weapon.
pub struct CautiousPilot {
    pub dodge_below: f64,
}

impl Default for CautiousPilot {
    fn default() -> Self {
        Self { dodge_below: 0.3 }
    }
}

impl PilotPolicy for CautiousPilot {
    fn name(&self) -> &str {
        "cautious"
    }

    fn choose_action(&self, battle: &Battle, _dice: &mut dyn Dice) -> (ActionKind, Option<WeaponKind>) {
        if battle.player().ship.health_ratio() < self.dodge_below {
            (ActionKind::Dodge, None)
        } else {
            (ActionKind::Attack, Some(best_weapon()))
        }
    }
}

/// Aggregated results from an arena run.
#[derive(Debug, Clone, Default)]
pub struct ArenaResult {
    pub pilot: String,
    pub opponent: String,
    pub num_battles: usize,
    pub player_wins: usize,
    pub opponent_wins: usize,
    pub unfinished: usize,
    pub rounds: Vec<u32>,
    /// Winner's remaining health per finished battle.
    pub remaining_health: Vec<u32>,
}

impl ArenaResult {
    pub fn win_rate(&self) -> f64 {
        self.player_wins as f64 / self.num_battles.max(1) as f64
    }

    pub fn avg_rounds(&self) -> f64 {
        mean(&self.rounds)
    }

    pub fn avg_remaining_health(&self) -> f64 {
        mean(&self.remaining_health)
    }

    /// Wilson score interval for the player's win rate.
    pub fn confidence_interval_95(&self) -> (f64, f64) {
        let n = self.num_battles;
        if n == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate();
        let z = 1.96_f64;
        let denom = 1.0 + z * z / n as f64;
        let center = (p + z * z / (2.0 * n as f64)) / denom;
        let margin = z * ((p * (1.0 - p) + z * z / (4.0 * n as f64)) / n as f64).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    pub fn summary(&self) -> String {
        let (ci_lo, ci_hi) = self.confidence_interval_95();
        let mut lines = vec![format!(
            "Arena Results: {} vs {} ({} battles)",
            self.pilot, self.opponent, self.num_battles
        )];
        lines.push("=".repeat(60));
        lines.push(format!(
            "  {:>12}: {:4} wins ({:5.1}%)  [95% CI: {:.1}%-{:.1}%]",
            self.pilot,
            self.player_wins,
            self.win_rate() * 100.0,
            ci_lo * 100.0,
            ci_hi * 100.0,
        ));
        lines.push(format!("  {:>12}: {:4} wins", self.opponent, self.opponent_wins));
        lines.push(format!("  {:>12}: {}", "Unfinished", self.unfinished));
        lines.push(format!(
            "  Avg rounds: {:.1}  |  Avg winner health left: {:.1}",
            self.avg_rounds(),
            self.avg_remaining_health()
        ));
        lines.join("\n")
    }
}

fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

/// Outcome of one autopiloted battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleRecord {
    pub result: BattleResult,
    pub rounds: u32,
    pub remaining_health: u32,
}

/// Play one battle to completion on a simulated clock.
///
/// The battle and the pilot draw from separate seeded streams so a policy
/// change does not perturb the opponent's rolls.
pub fn play_one_battle(
    opponent: &OpponentShip,
    pilot: &dyn PilotPolicy,
    tuning: &BattleTuning,
    seed: u64,
) -> BattleRecord {
    let mut battle = Battle::start(
        PlayerShip::new(DEFAULT_PLAYER_NAME),
        opponent.clone(),
        tuning.clone(),
        Box::new(SeededDice::new(seed)),
    );
    let mut pilot_dice = SeededDice::new(seed ^ 0x9E37_79B9_7F4A_7C15);
    let mut now = Instant::now();

    while !battle.result().is_over() && battle.rounds() < MAX_ROUNDS {
        if battle.player().ship.has_turn {
            let (action, weapon) = pilot.choose_action(&battle, &mut pilot_dice);
            if let Err(e) = battle.submit_player_action(action, weapon, now) {
                tracing::warn!(error = %e, "pilot action rejected");
                break;
            }
        }
        now += FRAME;
        battle.tick(now);
    }

    let remaining_health = match battle.result() {
        BattleResult::PlayerWon => battle.player().ship.health(),
        BattleResult::OpponentWon => battle.opponent().ship.health(),
        BattleResult::InProgress => 0,
    };
    BattleRecord {
        result: battle.result(),
        rounds: battle.rounds(),
        remaining_health,
    }
}

/// Run `num_battles` in parallel; battle `i` is seeded with `base_seed + i`.
pub fn run_arena(
    opponent: &OpponentShip,
    pilot: &dyn PilotPolicy,
    tuning: &BattleTuning,
    num_battles: usize,
    base_seed: u64,
) -> ArenaResult {
    let records: Vec<BattleRecord> = (0..num_battles)
        .into_par_iter()
        .map(|i| play_one_battle(opponent, pilot, tuning, base_seed.wrapping_add(i as u64)))
        .collect();

    let mut result = ArenaResult {
        pilot: pilot.name().to_string(),
        opponent: opponent.name().to_string(),
        num_battles,
        ..Default::default()
    };
    for record in records {
        match record.result {
            BattleResult::PlayerWon => result.player_wins += 1,
            BattleResult::OpponentWon => result.opponent_wins += 1,
            BattleResult::InProgress => {
                result.unfinished += 1;
                continue;
            }
        }
        result.rounds.push(record.rounds);
        result.remaining_health.push(record.remaining_health);
    }

    tracing::debug!(
        pilot = %result.pilot,
        opponent = %result.opponent,
        battles = num_battles,
        win_rate = result.win_rate(),
        "arena finished"
    );
    result
}
