//! Fixed weapon, action and attack catalogs.

use crate::engine::models::{ActionKind, AttackKind, WeaponKind};

pub const PLAYER_MAX_HEALTH: u32 = 150;
pub const DEFAULT_PLAYER_NAME: &str = "PLAYER";
pub const DEFAULT_WEAPON: WeaponKind = WeaponKind::Laser;
pub const MAX_NICKNAME_CHARS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub damage_per_hit: u32,
    pub success_probability: f64,
    pub label: &'static str,
}

pub fn weapon(kind: WeaponKind) -> Weapon {
    match kind {
        WeaponKind::Laser => Weapon { damage_per_hit: 35, success_probability: 0.85, label: "LASER" },
        WeaponKind::Ion => Weapon { damage_per_hit: 25, success_probability: 0.90, label: "ION" },
        WeaponKind::Shield => Weapon { damage_per_hit: 15, success_probability: 0.75, label: "SHIELD" },
    }
}

impl Weapon {
    pub fn expected_damage(&self) -> f64 {
        self.damage_per_hit as f64 * self.success_probability
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionChoice {
    pub label: &'static str,
    /// `None` for actions that always resolve the same way.
    pub success_probability: Option<f64>,
}

pub fn action(kind: ActionKind) -> ActionChoice {
    match kind {
        ActionKind::Dodge => ActionChoice { label: "DODGE", success_probability: Some(0.7) },
        // Display only: an attack rolls against the selected weapon.
        ActionKind::Attack => ActionChoice { label: "DIRECT STRIKE", success_probability: Some(0.85) },
        ActionKind::Ignore => ActionChoice { label: "IGNORE", success_probability: None },
    }
}

pub fn attack_name(kind: AttackKind) -> &'static str {
    match kind {
        AttackKind::Tentacle => "TENTACLE",
        AttackKind::Laser => "LASER",
        AttackKind::Missile => "MISSILE",
    }
}

/// Weapon with the highest expected damage per attack.
pub fn best_weapon() -> WeaponKind {
    WeaponKind::ALL
        .into_iter()
        .max_by(|a, b| weapon(*a).expected_damage().total_cmp(&weapon(*b).expected_damage()))
        .unwrap_or(DEFAULT_WEAPON)
}
