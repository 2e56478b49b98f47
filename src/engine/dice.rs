//! Random source for every draw the battle engine makes.
//!
//! The engine never touches a global RNG: each battle owns a boxed [`Dice`]
//! so a seed fully determines a battle, and tests can script exact draws.

#[cfg(test)]
use std::collections::VecDeque;
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait Dice: Send {
    /// Uniform draw in `[0, 1)`.
    fn chance(&mut self) -> f64;

    /// Uniform integer in the inclusive range.
    fn roll(&mut self, range: RangeInclusive<u32>) -> u32;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// `StdRng`-backed dice.
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl Dice for SeededDice {
    fn chance(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn roll(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays queued values in order.
///
/// Once a queue runs dry the dice fall back to `0.0`, the start of the
/// requested range and index `0`. Rolled values are clamped into the
/// requested range so a script can never produce out-of-contract damage.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct ScriptedDice {
    chances: VecDeque<f64>,
    rolls: VecDeque<u32>,
    picks: VecDeque<usize>,
}

#[cfg(test)]
impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chances(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.chances.extend(values);
        self
    }

    pub fn with_rolls(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.rolls.extend(values);
        self
    }

    pub fn with_picks(mut self, values: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(values);
        self
    }
}

#[cfg(test)]
impl Dice for ScriptedDice {
    fn chance(&mut self) -> f64 {
        self.chances.pop_front().unwrap_or(0.0)
    }

    fn roll(&mut self, range: RangeInclusive<u32>) -> u32 {
        let (lo, hi) = (*range.start(), *range.end());
        self.rolls.pop_front().map_or(lo, |v| v.clamp(lo, hi))
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().map_or(0, |i| i.min(len.saturating_sub(1)))
    }
}

/// Choose an index with probability proportional to `weights`.
///
/// Returns `None` when the weights are empty or sum to zero.
pub fn choose_weighted(dice: &mut dyn Dice, weights: &[f64]) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() || total <= 0.0 {
        return None;
    }

    let mut threshold = dice.chance() * total;
    for (i, &w) in weights.iter().enumerate() {
        if threshold < w {
            return Some(i);
        }
        threshold -= w;
    }

    // Floating point edge case: fall back to the last non-zero weight
    weights.iter().rposition(|&w| w > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_are_deterministic() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        for _ in 0..100 {
            assert_eq!(a.roll(10..=20), b.roll(10..=20));
            assert_eq!(a.chance(), b.chance());
            assert_eq!(a.pick(7), b.pick(7));
        }
    }

    #[test]
    fn test_seeded_roll_stays_in_range() {
        let mut dice = SeededDice::new(7);
        for _ in 0..1000 {
            let v = dice.roll(15..=25);
            assert!((15..=25).contains(&v));
            let c = dice.chance();
            assert!((0.0..1.0).contains(&c));
        }
    }

    #[test]
    fn test_scripted_dice_replays_then_falls_back() {
        let mut dice = ScriptedDice::new()
            .with_chances([0.5, 0.9])
            .with_rolls([12, 99])
            .with_picks([1]);

        assert_eq!(dice.chance(), 0.5);
        assert_eq!(dice.chance(), 0.9);
        assert_eq!(dice.chance(), 0.0);

        assert_eq!(dice.roll(10..=20), 12);
        // clamped into range
        assert_eq!(dice.roll(10..=20), 20);
        assert_eq!(dice.roll(10..=20), 10);

        assert_eq!(dice.pick(2), 1);
        assert_eq!(dice.pick(2), 0);
    }

    #[test]
    fn test_choose_weighted_boundaries() {
        let weights = [0.5, 0.3, 0.2];
        let mut dice = ScriptedDice::new().with_chances([0.0, 0.49, 0.5, 0.79, 0.8, 0.999]);
        let picks: Vec<_> = (0..6).map(|_| choose_weighted(&mut dice, &weights)).collect();
        assert_eq!(picks, vec![Some(0), Some(0), Some(1), Some(1), Some(2), Some(2)]);
    }

    #[test]
    fn test_choose_weighted_skips_zero_weights() {
        let mut dice = ScriptedDice::new().with_chances([0.0, 0.7]);
        assert_eq!(choose_weighted(&mut dice, &[0.0, 1.0, 0.0]), Some(1));
        assert_eq!(choose_weighted(&mut dice, &[0.0, 1.0, 0.0]), Some(1));
        assert_eq!(choose_weighted(&mut dice, &[]), None);
        assert_eq!(choose_weighted(&mut dice, &[0.0, 0.0]), None);
    }
}
