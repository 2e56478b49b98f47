//! Core battle data types shared by the resolver, the turn controllers and
//! the presentation layer.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::engine::error::BattleError;

/// Which participant a piece of state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    InProgress,
    PlayerWon,
    OpponentWon,
}

impl BattleResult {
    pub fn is_over(self) -> bool {
        self != BattleResult::InProgress
    }
}

/// A player's per-turn choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Dodge,
    Attack,
    Ignore,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Dodge, ActionKind::Attack, ActionKind::Ignore];

    pub fn id(self) -> &'static str {
        match self {
            ActionKind::Dodge => "dodge",
            ActionKind::Attack => "attack",
            ActionKind::Ignore => "ignore",
        }
    }
}

impl FromStr for ActionKind {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dodge" => Ok(ActionKind::Dodge),
            "attack" => Ok(ActionKind::Attack),
            "ignore" => Ok(ActionKind::Ignore),
            other => Err(BattleError::InvalidArgument(format!("unknown action: {other:?}"))),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Laser,
    Ion,
    Shield,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Laser, WeaponKind::Ion, WeaponKind::Shield];

    pub fn id(self) -> &'static str {
        match self {
            WeaponKind::Laser => "laser",
            WeaponKind::Ion => "ion",
            WeaponKind::Shield => "shield",
        }
    }
}

impl FromStr for WeaponKind {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "laser" => Ok(WeaponKind::Laser),
            "ion" => Ok(WeaponKind::Ion),
            "shield" => Ok(WeaponKind::Shield),
            other => Err(BattleError::InvalidArgument(format!("unknown weapon: {other:?}"))),
        }
    }
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One of the opponent's offensive options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Tentacle,
    Laser,
    Missile,
}

impl AttackKind {
    pub const ALL: [AttackKind; 3] = [AttackKind::Tentacle, AttackKind::Laser, AttackKind::Missile];

    pub fn id(self) -> &'static str {
        match self {
            AttackKind::Tentacle => "tentacle",
            AttackKind::Laser => "laser",
            AttackKind::Missile => "missile",
        }
    }
}

impl FromStr for AttackKind {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tentacle" => Ok(AttackKind::Tentacle),
            "laser" => Ok(AttackKind::Laser),
            "missile" => Ok(AttackKind::Missile),
            other => Err(BattleError::InvalidArgument(format!("unknown attack kind: {other:?}"))),
        }
    }
}

/// Result of resolving one player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    DodgeSuccess,
    DodgeFail,
    AttackSuccess,
    AttackFail,
    Ignore,
}

impl Outcome {
    /// Line shown in the player's action box.
    pub fn action_text(self, damage: u32) -> String {
        match self {
            Outcome::DodgeSuccess => "DODGE SUCCESSFUL!".to_string(),
            Outcome::DodgeFail => format!("DODGE FAILED! -{damage} HP"),
            Outcome::AttackSuccess => format!("DIRECT HIT! -{damage} HP"),
            Outcome::AttackFail => "ATTACK MISSED, THE ENEMY EVADED!".to_string(),
            Outcome::Ignore => format!("THE ENEMY STRIKES! -{damage} HP"),
        }
    }
}

/// Transient display text. Never read by combat logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub text: String,
    pub issued_at: Instant,
}

impl Narration {
    pub fn new(text: impl Into<String>, issued_at: Instant) -> Self {
        Self { text: text.into(), issued_at }
    }

    /// Whether the line is still inside its display window at `now`.
    pub fn is_live(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.issued_at) < window
    }
}

/// Health snapshot of one combatant for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatantView {
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    pub health_ratio: f64,
    pub has_turn: bool,
    /// Latest action line with its issue time, regardless of display window.
    #[serde(skip)]
    pub action_line: Option<Narration>,
    #[serde(skip)]
    pub speech: Option<Narration>,
}

/// Everything the presentation layer needs to draw one battle frame.
///
/// `action_line` and `speech` are the merged, window-filtered lines; the
/// per-side narration with timestamps is on each [`CombatantView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleView {
    pub turn_owner: Option<Side>,
    pub result: BattleResult,
    pub player: CombatantView,
    pub opponent: CombatantView,
    pub selected_weapon: WeaponKind,
    /// Most recent live action line, player's first.
    pub action_line: Option<String>,
    /// Opponent's speech bubble, if still live.
    pub speech: Option<String>,
    pub rounds: u32,
}
