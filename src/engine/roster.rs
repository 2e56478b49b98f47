//! Opponent roster and battle tuning, loaded from TOML at startup.
//!
//! ```toml
//! [tuning]
//! decide_secs = 1.5
//!
//! [[opponents]]
//! name = "CORVETTE 'LIGHTNING'"
//! max_health = 120
//! strategy = "fast"
//!
//! [[opponents]]
//! name = "FRIGATE 'WASP'"
//! max_health = 90
//! weights = { tentacle = 0.2, laser = 0.2, missile = 0.6 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::engine::combatant::OpponentShip;
use crate::engine::error::BattleError;
use crate::engine::models::AttackKind;
use crate::engine::strategy::{AttackStrategy, WeightedStrategy};
use crate::engine::tuning::BattleTuning;

/// One opponent entry.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OpponentProfile {
    pub name: String,
    pub max_health: u32,
    /// Named strategy: "fast", "heavy" or "uniform".
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Custom weights by attack id (overrides `strategy` when present).
    pub weights: Option<BTreeMap<String, f64>>,
}

fn default_strategy() -> String {
    "fast".into()
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RosterFile {
    #[serde(default)]
    pub tuning: BattleTuning,
    #[serde(default = "default_opponents")]
    pub opponents: Vec<OpponentProfile>,
}

impl Default for RosterFile {
    fn default() -> Self {
        Self {
            tuning: BattleTuning::default(),
            opponents: default_opponents(),
        }
    }
}

fn default_opponents() -> Vec<OpponentProfile> {
    vec![
        OpponentProfile {
            name: "CORVETTE 'LIGHTNING'".into(),
            max_health: 120,
            strategy: "fast".into(),
            weights: None,
        },
        OpponentProfile {
            name: "BATTLESHIP 'TITAN'".into(),
            max_health: 200,
            strategy: "heavy".into(),
            weights: None,
        },
    ]
}

impl OpponentProfile {
    pub fn build_strategy(&self) -> Result<Arc<dyn AttackStrategy>, BattleError> {
        match &self.weights {
            Some(weights) => {
                let parsed = weights
                    .iter()
                    .map(|(id, w)| -> Result<(AttackKind, f64), BattleError> { Ok((id.parse()?, *w)) })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Arc::new(WeightedStrategy::new(format!("{}-custom", self.name), parsed)?))
            }
            None => Ok(Arc::from(WeightedStrategy::named(&self.strategy)?)),
        }
    }

    pub fn build(&self) -> Result<OpponentShip, BattleError> {
        if self.max_health == 0 {
            return Err(BattleError::InvalidArgument(format!(
                "opponent {:?}: max_health must be positive",
                self.name
            )));
        }
        Ok(OpponentShip::new(self.name.clone(), self.max_health, self.build_strategy()?))
    }
}

impl RosterFile {
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Build every opponent, failing on the first invalid entry.
    pub fn build_opponents(&self) -> Result<Vec<OpponentShip>, BattleError> {
        if self.opponents.is_empty() {
            return Err(BattleError::InvalidArgument("roster has no opponents".into()));
        }
        self.opponents.iter().map(OpponentProfile::build).collect()
    }
}

/// Load a roster from a TOML file at the given path.
pub fn load_roster(path: &Path) -> Result<RosterFile, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    RosterFile::from_toml(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try well-known paths, falling back to the built-in roster.
pub fn load_default_roster() -> RosterFile {
    let candidates = ["roster.toml", "../roster.toml", "/etc/spacewar/roster.toml"];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_roster(p) {
                Ok(roster) => {
                    tracing::info!(path = %p.display(), count = roster.opponents.len(), "loaded roster");
                    return roster;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load roster");
                }
            }
        }
    }
    tracing::info!("no roster.toml found, using built-in opponents");
    RosterFile::default()
}
