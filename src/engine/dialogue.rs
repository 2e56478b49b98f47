//! Opponent narration pools.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::engine::dice::Dice;
use crate::engine::models::AttackKind;

/// What prompted an opponent line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Player dodged successfully.
    Dodged,
    /// Player landed an attack.
    Struck,
    /// Player chose to ignore the opponent.
    Ignored,
    /// Opponent announces its own attack.
    Announce(AttackKind),
}

pub const DODGE_FAIL_LINE: &str = "HIT! BRACE FOR IMPACT!";
pub const ATTACK_FAIL_LINE: &str = "MISSED! TRY AGAIN!";

#[derive(Debug, Clone, Default)]
pub struct DialogueBook {
    lines: HashMap<Cue, Vec<String>>,
}

impl DialogueBook {
    pub fn new(lines: HashMap<Cue, Vec<String>>) -> Self {
        Self { lines }
    }

    /// Random line for the cue, or an empty string if the pool is empty.
    pub fn line(&self, cue: Cue, dice: &mut dyn Dice) -> String {
        match self.lines.get(&cue) {
            Some(pool) if !pool.is_empty() => pool[dice.pick(pool.len())].clone(),
            _ => String::new(),
        }
    }

    pub fn pool(&self, cue: Cue) -> &[String] {
        self.lines.get(&cue).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn pool(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

pub static DEFAULT_DIALOGUE: Lazy<Arc<DialogueBook>> = Lazy::new(|| {
    let mut lines = HashMap::new();
    lines.insert(Cue::Dodged, pool(&["ARE YOU FIGHTING OR PLAYING GAMES?", "RUNNING IS YOUR ONLY HOPE!"]));
    lines.insert(Cue::Struck, pool(&["TAKE THIS!", "THIS IS GOING TO HURT!"]));
    lines.insert(Cue::Ignored, pool(&["YOU ARE FAR TOO CONFIDENT!", "LET'S SEE YOU WRIGGLE OUT OF THIS!"]));
    lines.insert(
        Cue::Announce(AttackKind::Tentacle),
        pool(&["TENTACLES WRAP AROUND YOUR HULL!", "TRY DODGING THIS!"]),
    );
    lines.insert(
        Cue::Announce(AttackKind::Laser),
        pool(&["LASER CHARGE AWAY!", "THAT STINGS, DOESN'T IT?"]),
    );
    lines.insert(
        Cue::Announce(AttackKind::Missile),
        pool(&["MISSILES INBOUND!", "A LITTLE GIFT FOR YOU!"]),
    );
    Arc::new(DialogueBook::new(lines))
});
