//! Opponent attack strategies.
//!
//! A strategy is a stateless, named probability distribution over the
//! opponent's attack kinds. Two ship with the game: "fast" favours the
//! tentacle, "heavy" spreads weight towards laser and missile.

use crate::engine::dice::{choose_weighted, Dice};
use crate::engine::error::BattleError;
use crate::engine::models::AttackKind;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Chooses the opponent's attack for one turn.
pub trait AttackStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn choose_attack(&self, dice: &mut dyn Dice) -> AttackKind;

    /// Probability of each attack kind, for display and testing.
    fn weights(&self) -> Vec<(AttackKind, f64)>;
}

/// Fixed weights over the attack catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedStrategy {
    name: String,
    weights: Vec<(AttackKind, f64)>,
}

impl WeightedStrategy {
    /// Build a strategy, rejecting weights that are negative, miss an attack
    /// kind, repeat one, or do not sum to 1.0.
    pub fn new(name: impl Into<String>, weights: Vec<(AttackKind, f64)>) -> Result<Self, BattleError> {
        let name = name.into();
        if weights.iter().any(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(BattleError::InvalidArgument(format!(
                "strategy {name:?}: weights must be finite and non-negative"
            )));
        }
        for kind in AttackKind::ALL {
            let count = weights.iter().filter(|(k, _)| *k == kind).count();
            if count != 1 {
                return Err(BattleError::InvalidArgument(format!(
                    "strategy {name:?}: attack {} must appear exactly once",
                    kind.id()
                )));
            }
        }
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(BattleError::InvalidArgument(format!(
                "strategy {name:?}: weights sum to {total}, expected 1.0"
            )));
        }
        Ok(Self { name, weights })
    }

    pub fn fast() -> Self {
        Self {
            name: "fast".into(),
            weights: vec![
                (AttackKind::Tentacle, 0.5),
                (AttackKind::Laser, 0.3),
                (AttackKind::Missile, 0.2),
            ],
        }
    }

    pub fn heavy() -> Self {
        Self {
            name: "heavy".into(),
            weights: vec![
                (AttackKind::Tentacle, 0.3),
                (AttackKind::Laser, 0.4),
                (AttackKind::Missile, 0.3),
            ],
        }
    }

    /// Look up one of the shipped strategies by name.
    pub fn named(name: &str) -> Result<Box<dyn AttackStrategy>, BattleError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Box::new(Self::fast())),
            "heavy" => Ok(Box::new(Self::heavy())),
            "uniform" => Ok(Box::new(UniformStrategy)),
            other => Err(BattleError::InvalidArgument(format!("unknown strategy: {other:?}"))),
        }
    }
}

impl AttackStrategy for WeightedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_attack(&self, dice: &mut dyn Dice) -> AttackKind {
        let weights: Vec<f64> = self.weights.iter().map(|(_, w)| *w).collect();
        choose_weighted(dice, &weights)
            .map(|i| self.weights[i].0)
            .unwrap_or(AttackKind::Tentacle)
    }

    fn weights(&self) -> Vec<(AttackKind, f64)> {
        self.weights.clone()
    }
}

/// Every attack kind equally likely.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformStrategy;

impl AttackStrategy for UniformStrategy {
    fn name(&self) -> &str {
        "uniform"
    }

    fn choose_attack(&self, dice: &mut dyn Dice) -> AttackKind {
        AttackKind::ALL[dice.pick(AttackKind::ALL.len())]
    }

    fn weights(&self) -> Vec<(AttackKind, f64)> {
        let p = 1.0 / AttackKind::ALL.len() as f64;
        AttackKind::ALL.iter().map(|k| (*k, p)).collect()
    }
}
