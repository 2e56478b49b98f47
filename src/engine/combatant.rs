//! Battle participants.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::engine::catalog::{DEFAULT_WEAPON, PLAYER_MAX_HEALTH};
use crate::engine::dialogue::{DialogueBook, DEFAULT_DIALOGUE};
use crate::engine::models::{CombatantView, Narration, WeaponKind};
use crate::engine::strategy::AttackStrategy;

/// State shared by both sides of a battle.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub name: String,
    max_health: u32,
    current_health: u32,
    pub has_turn: bool,
    pub action_line: Option<Narration>,
    pub speech: Option<Narration>,
}

impl Combatant {
    /// `max_health` of zero is bumped to one.
    pub fn new(name: impl Into<String>, max_health: u32) -> Self {
        let max_health = max_health.max(1);
        Self {
            name: name.into(),
            max_health,
            current_health: max_health,
            has_turn: false,
            action_line: None,
            speech: None,
        }
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn health(&self) -> u32 {
        self.current_health
    }

    /// Subtract `amount`, clamping at zero. Returns whether health is now zero.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        self.current_health = self.current_health.saturating_sub(amount);
        self.current_health == 0
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    pub fn health_ratio(&self) -> f64 {
        self.current_health as f64 / self.max_health as f64
    }

    pub fn reset_for_new_battle(&mut self) {
        self.current_health = self.max_health;
        self.has_turn = false;
        self.action_line = None;
        self.speech = None;
    }

    pub fn say(&mut self, text: impl Into<String>, now: Instant) {
        self.speech = Some(Narration::new(text, now));
    }

    pub fn announce(&mut self, text: impl Into<String>, now: Instant) {
        self.action_line = Some(Narration::new(text, now));
    }

    pub fn view(&self) -> CombatantView {
        CombatantView {
            name: self.name.clone(),
            health: self.current_health,
            max_health: self.max_health,
            health_ratio: self.health_ratio(),
            has_turn: self.has_turn,
            action_line: self.action_line.clone(),
            speech: self.speech.clone(),
        }
    }
}

/// The human-controlled ship. Its win count outlives individual battles.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerShip {
    pub ship: Combatant,
    pub wins: u32,
    pub selected_weapon: WeaponKind,
}

impl PlayerShip {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            ship: Combatant::new(nickname, PLAYER_MAX_HEALTH),
            wins: 0,
            selected_weapon: DEFAULT_WEAPON,
        }
    }

    pub fn name(&self) -> &str {
        &self.ship.name
    }

    /// Restores health and clears per-battle state. Keeps `wins`.
    pub fn reset_for_new_battle(&mut self) {
        self.ship.reset_for_new_battle();
        self.selected_weapon = DEFAULT_WEAPON;
    }
}

/// A computer-controlled ship with its attack strategy and narration pools.
#[derive(Clone)]
pub struct OpponentShip {
    pub ship: Combatant,
    pub strategy: Arc<dyn AttackStrategy>,
    pub dialogue: Arc<DialogueBook>,
}

impl OpponentShip {
    pub fn new(name: impl Into<String>, max_health: u32, strategy: Arc<dyn AttackStrategy>) -> Self {
        Self {
            ship: Combatant::new(name, max_health),
            strategy,
            dialogue: Arc::clone(&DEFAULT_DIALOGUE),
        }
    }

    pub fn with_dialogue(mut self, dialogue: Arc<DialogueBook>) -> Self {
        self.dialogue = dialogue;
        self
    }

    pub fn name(&self) -> &str {
        &self.ship.name
    }

    pub fn reset_for_new_battle(&mut self) {
        self.ship.reset_for_new_battle();
    }
}

impl fmt::Debug for OpponentShip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpponentShip")
            .field("ship", &self.ship)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::WeightedStrategy;

    #[test]
    fn test_apply_damage_clamps_at_zero() {
        let mut c = Combatant::new("x", 50);
        assert!(!c.apply_damage(20));
        assert_eq!(c.health(), 30);
        assert!(c.apply_damage(100));
        assert_eq!(c.health(), 0);
        assert!(!c.is_alive());
        assert!(c.apply_damage(0));
        assert_eq!(c.health(), 0);
    }

    #[test]
    fn test_health_never_leaves_bounds() {
        let mut c = Combatant::new("x", 120);
        for amount in [0, 1, 7, 35, 200, u32::MAX] {
            c.apply_damage(amount);
            assert!(c.health() <= c.max_health());
        }
        assert_eq!(c.health(), 0);
    }

    #[test]
    fn test_zero_max_health_is_bumped() {
        let c = Combatant::new("x", 0);
        assert_eq!(c.max_health(), 1);
        assert!(c.is_alive());
    }

    #[test]
    fn test_reset_restores_health_and_clears_narration() {
        let now = Instant::now();
        let mut c = Combatant::new("x", 80);
        c.apply_damage(50);
        c.has_turn = true;
        c.say("hello", now);
        c.announce("boom", now);

        c.reset_for_new_battle();
        assert_eq!(c.health(), 80);
        assert!(!c.has_turn);
        assert!(c.speech.is_none());
        assert!(c.action_line.is_none());
    }

    #[test]
    fn test_player_reset_keeps_wins() {
        let mut p = PlayerShip::new("ACE");
        p.wins = 3;
        p.selected_weapon = WeaponKind::Shield;
        p.ship.apply_damage(100);
        p.reset_for_new_battle();
        assert_eq!(p.wins, 3);
        assert_eq!(p.ship.health(), PLAYER_MAX_HEALTH);
        assert_eq!(p.selected_weapon, WeaponKind::Laser);
    }

    #[test]
    fn test_opponent_debug_names_strategy() {
        let o = OpponentShip::new("TITAN", 200, Arc::new(WeightedStrategy::heavy()));
        assert!(format!("{o:?}").contains("heavy"));
    }
}
