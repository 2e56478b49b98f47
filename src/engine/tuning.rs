//! Timing windows and damage ranges for a battle.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::Deserialize;

/// Inclusive damage range as written in the roster file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DamageRange {
    pub min: u32,
    pub max: u32,
}

impl DamageRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn range(&self) -> RangeInclusive<u32> {
        self.min..=self.max.max(self.min)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BattleTuning {
    /// End of the opponent's Deciding phase, seconds after its turn starts.
    pub decide_secs: f64,
    /// End of the Resolving phase; the turn hands back from here on.
    pub resolve_secs: f64,
    pub dodge_fail_damage: DamageRange,
    pub ignore_damage: DamageRange,
    pub opponent_damage: DamageRange,
    pub action_line_secs: f64,
    pub speech_secs: f64,
}

impl Default for BattleTuning {
    fn default() -> Self {
        Self {
            decide_secs: 1.5,
            resolve_secs: 2.5,
            dodge_fail_damage: DamageRange::new(10, 20),
            ignore_damage: DamageRange::new(20, 30),
            opponent_damage: DamageRange::new(15, 25),
            action_line_secs: 2.0,
            speech_secs: 3.0,
        }
    }
}

impl BattleTuning {
    pub fn decide_window(&self) -> Duration {
        secs(self.decide_secs)
    }

    pub fn resolve_window(&self) -> Duration {
        secs(self.resolve_secs.max(self.decide_secs))
    }

    pub fn action_line_window(&self) -> Duration {
        secs(self.action_line_secs)
    }

    pub fn speech_window(&self) -> Duration {
        secs(self.speech_secs)
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}
