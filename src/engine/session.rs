//! One play session: the pilot's nickname, the opponent roster, the battle
//! currently being fought and the leaderboard it reports victories to.

use std::path::PathBuf;
use std::time::Instant;

use crate::engine::battle::Battle;
use crate::engine::catalog::{DEFAULT_PLAYER_NAME, MAX_NICKNAME_CHARS};
use crate::engine::combatant::{OpponentShip, PlayerShip};
use crate::engine::dice::{Dice, SeededDice};
use crate::engine::error::BattleError;
use crate::engine::leaderboard::Leaderboard;
use crate::engine::models::{ActionKind, BattleResult, WeaponKind};
use crate::engine::resolver::Resolution;
use crate::engine::tuning::BattleTuning;

pub struct Session {
    player: Option<PlayerShip>,
    battle: Option<Battle>,
    roster: Vec<OpponentShip>,
    tuning: BattleTuning,
    leaderboard: Leaderboard,
    leaderboard_path: Option<PathBuf>,
    seed: Option<u64>,
    battles_started: u64,
    victory_reported: bool,
}

impl Session {
    pub fn new(roster: Vec<OpponentShip>, tuning: BattleTuning, leaderboard: Leaderboard) -> Self {
        Self {
            player: None,
            battle: None,
            roster,
            tuning,
            leaderboard,
            leaderboard_path: None,
            seed: None,
            battles_started: 0,
            victory_reported: false,
        }
    }

    /// Persist the leaderboard to `path` after every recorded victory.
    pub fn with_leaderboard_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.leaderboard_path = Some(path.into());
        self
    }

    /// Seed battle `n` with `seed + n` instead of OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn roster(&self) -> &[OpponentShip] {
        &self.roster
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    pub fn nickname(&self) -> Option<&str> {
        self.player().map(|p| p.name())
    }

    /// The pilot, wherever it currently lives.
    pub fn player(&self) -> Option<&PlayerShip> {
        self.battle.as_ref().map(Battle::player).or(self.player.as_ref())
    }

    pub fn wins(&self) -> u32 {
        self.player().map_or(0, |p| p.wins)
    }

    /// Register the pilot. Trimmed, 1 to 15 characters, no control characters.
    pub fn enter_nickname(&mut self, text: &str) -> Result<(), BattleError> {
        let nickname = text.trim();
        if nickname.is_empty() {
            return Err(BattleError::InvalidArgument("nickname is empty".into()));
        }
        if nickname.chars().count() > MAX_NICKNAME_CHARS {
            return Err(BattleError::InvalidArgument(format!(
                "nickname is longer than {MAX_NICKNAME_CHARS} characters"
            )));
        }
        if nickname.chars().any(char::is_control) {
            return Err(BattleError::InvalidArgument("nickname contains control characters".into()));
        }
        if self.battle.is_some() {
            return Err(BattleError::InvalidArgument("cannot rename during a battle".into()));
        }
        self.player = Some(PlayerShip::new(nickname));
        tracing::info!(nickname, "pilot registered");
        Ok(())
    }

    /// Start a battle against roster entry `index`, abandoning any battle in progress.
    pub fn select_opponent(&mut self, index: usize) -> Result<&Battle, BattleError> {
        let opponent = self
            .roster
            .get(index)
            .cloned()
            .ok_or_else(|| BattleError::InvalidArgument(format!("no opponent at index {index}")))?;

        self.return_to_menu();
        let player = self
            .player
            .take()
            .unwrap_or_else(|| PlayerShip::new(DEFAULT_PLAYER_NAME));

        let dice: Box<dyn Dice> = match self.seed {
            Some(seed) => Box::new(SeededDice::new(seed.wrapping_add(self.battles_started))),
            None => Box::new(SeededDice::from_entropy()),
        };
        self.battles_started += 1;
        self.victory_reported = false;

        let battle = self.battle.insert(Battle::start(player, opponent, self.tuning.clone(), dice));
        Ok(&*battle)
    }

    pub fn select_weapon(&mut self, weapon: WeaponKind) -> Result<(), BattleError> {
        let battle = self.battle.as_mut().ok_or(BattleError::NoActiveBattle)?;
        battle.select_weapon(weapon);
        Ok(())
    }

    pub fn submit(
        &mut self,
        action: ActionKind,
        weapon: Option<WeaponKind>,
        now: Instant,
    ) -> Result<Resolution, BattleError> {
        let battle = self.battle.as_mut().ok_or(BattleError::NoActiveBattle)?;
        let resolution = battle.submit_player_action(action, weapon, now)?;
        self.report_victory();
        Ok(resolution)
    }

    /// Per-frame update. Returns the battle result, if a battle exists.
    pub fn tick(&mut self, now: Instant) -> Option<BattleResult> {
        let result = self.battle.as_mut()?.tick(now);
        self.report_victory();
        Some(result)
    }

    /// Discard the current battle, keeping the pilot and its wins.
    pub fn return_to_menu(&mut self) {
        if let Some(battle) = self.battle.take() {
            if !battle.result().is_over() {
                tracing::info!(opponent = %battle.opponent().name(), "battle abandoned");
            }
            self.player = Some(battle.into_player());
        }
    }

    fn report_victory(&mut self) {
        let Some(battle) = self.battle.as_ref() else {
            return;
        };
        if battle.result() != BattleResult::PlayerWon || self.victory_reported {
            return;
        }
        self.victory_reported = true;

        let player = battle.player();
        match &self.leaderboard_path {
            Some(path) => {
                if let Err(e) = self.leaderboard.record_and_save(player.name(), player.wins, path) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to save leaderboard");
                }
            }
            None => self.leaderboard.record(player.name(), player.wins),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::roster::RosterFile;
    use crate::engine::strategy::WeightedStrategy;

    fn session() -> Session {
        let roster = RosterFile::default().build_opponents().unwrap();
        Session::new(roster, BattleTuning::default(), Leaderboard::new()).with_seed(1)
    }

    #[test]
    fn test_nickname_validation() {
        let mut s = session();
        assert!(s.enter_nickname("   ").is_err());
        assert!(s.enter_nickname("ABCDEFGHIJKLMNOP").is_err());
        assert!(s.enter_nickname("bad\u{7}name").is_err());
        s.enter_nickname("  MAVERICK ").unwrap();
        assert_eq!(s.nickname(), Some("MAVERICK"));
    }

    #[test]
    fn test_default_pilot_when_no_nickname() {
        let mut s = session();
        s.select_opponent(0).unwrap();
        assert_eq!(s.nickname(), Some(DEFAULT_PLAYER_NAME));
    }

    #[test]
    fn test_unknown_opponent_index() {
        let mut s = session();
        assert!(matches!(s.select_opponent(5), Err(BattleError::InvalidArgument(_))));
        assert!(s.battle().is_none());
    }

    #[test]
    fn test_actions_need_a_battle() {
        let mut s = session();
        let now = Instant::now();
        assert_eq!(s.submit(ActionKind::Dodge, None, now), Err(BattleError::NoActiveBattle));
        assert_eq!(s.select_weapon(WeaponKind::Ion), Err(BattleError::NoActiveBattle));
        assert_eq!(s.tick(now), None);
    }

    #[test]
    fn test_victory_is_recorded_once_and_wins_persist() {
        let weak = OpponentShip::new("DRONE", 1, Arc::new(WeightedStrategy::fast()));
        let mut s = Session::new(vec![weak], BattleTuning::default(), Leaderboard::new()).with_seed(3);
        s.enter_nickname("ACE").unwrap();
        let mut t = Instant::now();

        // Any landed hit kills a 1 HP drone; keep attacking until one lands.
        for round in 0..2 {
            s.select_opponent(0).unwrap();
            while s.battle().unwrap().result() == BattleResult::InProgress {
                s.submit(ActionKind::Attack, Some(WeaponKind::Ion), t).unwrap();
                for _ in 0..4 {
                    t += std::time::Duration::from_secs(1);
                    s.tick(t);
                }
            }
            assert_eq!(s.battle().unwrap().result(), BattleResult::PlayerWon);
            assert_eq!(s.wins(), round + 1);
            s.return_to_menu();
        }

        assert_eq!(s.leaderboard().best_for("ACE"), Some(2));
        assert_eq!(s.leaderboard().len(), 1);
    }

    #[test]
    fn test_failed_save_is_not_surfaced() {
        // A directory cannot be written as a file.
        let dir = tempfile::tempdir().unwrap();
        let weak = OpponentShip::new("DRONE", 1, Arc::new(WeightedStrategy::fast()));
        let mut s = Session::new(vec![weak], BattleTuning::default(), Leaderboard::new())
            .with_leaderboard_path(dir.path())
            .with_seed(3);
        s.enter_nickname("ACE").unwrap();
        s.select_opponent(0).unwrap();

        let mut t = Instant::now();
        while s.battle().unwrap().result() == BattleResult::InProgress {
            assert!(s.submit(ActionKind::Attack, Some(WeaponKind::Ion), t).is_ok());
            for _ in 0..4 {
                t += std::time::Duration::from_secs(1);
                s.tick(t);
            }
        }

        assert_eq!(s.battle().unwrap().result(), BattleResult::PlayerWon);
        assert_eq!(s.leaderboard().best_for("ACE"), Some(1));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_return_to_menu_discards_battle() {
        let mut s = session();
        s.enter_nickname("ACE").unwrap();
        s.select_opponent(1).unwrap();
        s.submit(ActionKind::Ignore, None, Instant::now()).unwrap();
        s.return_to_menu();
        assert!(s.battle().is_none());
        assert_eq!(s.wins(), 0);

        let battle = s.select_opponent(1).unwrap();
        assert_eq!(battle.player().ship.health(), 150);
        assert_eq!(battle.opponent().ship.health(), 200);
    }
}
