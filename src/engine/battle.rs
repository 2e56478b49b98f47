//! Battle controller: turn alternation and end-of-battle detection for one
//! player-versus-opponent fight.
//!
//! The presentation loop calls [`Battle::tick`] every frame and
//! [`Battle::submit_player_action`] on player input. Exactly one side holds
//! the turn while the battle is in progress; neither does once it is over.

use std::time::Instant;

use crate::engine::combatant::{OpponentShip, PlayerShip};
use crate::engine::dice::Dice;
use crate::engine::error::BattleError;
use crate::engine::models::{ActionKind, BattleResult, BattleView, Narration, Side, WeaponKind};
use crate::engine::opponent_turn::{OpponentTurn, TurnProgress};
use crate::engine::resolver::{resolve, Resolution};
use crate::engine::tuning::BattleTuning;

const ENEMY_TURN_PLACEHOLDER: &str = "ENEMY TURN...";

pub struct Battle {
    player: PlayerShip,
    opponent: OpponentShip,
    turn: Option<OpponentTurn>,
    result: BattleResult,
    tuning: BattleTuning,
    dice: Box<dyn Dice>,
    rounds: u32,
}

impl Battle {
    /// Reset both ships and give the player the first turn.
    pub fn start(
        mut player: PlayerShip,
        mut opponent: OpponentShip,
        tuning: BattleTuning,
        dice: Box<dyn Dice>,
    ) -> Self {
        player.reset_for_new_battle();
        opponent.reset_for_new_battle();
        player.ship.has_turn = true;

        tracing::info!(
            player = %player.name(),
            opponent = %opponent.name(),
            strategy = %opponent.strategy.name(),
            "battle started"
        );

        Self {
            player,
            opponent,
            turn: None,
            result: BattleResult::InProgress,
            tuning,
            dice,
            rounds: 0,
        }
    }

    pub fn player(&self) -> &PlayerShip {
        &self.player
    }

    pub fn opponent(&self) -> &OpponentShip {
        &self.opponent
    }

    pub fn result(&self) -> BattleResult {
        self.result
    }

    pub fn tuning(&self) -> &BattleTuning {
        &self.tuning
    }

    /// Number of player actions resolved so far.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn turn_owner(&self) -> Option<Side> {
        match (self.player.ship.has_turn, self.opponent.ship.has_turn) {
            (true, false) => Some(Side::Player),
            (false, true) => Some(Side::Opponent),
            _ => None,
        }
    }

    /// Change the weapon used by a bare `attack`. Allowed at any time.
    pub fn select_weapon(&mut self, weapon: WeaponKind) {
        self.player.selected_weapon = weapon;
    }

    /// Resolve the player's action and pass the turn to the opponent.
    ///
    /// `weapon` falls back to the selected weapon for attacks.
    pub fn submit_player_action(
        &mut self,
        action: ActionKind,
        weapon: Option<WeaponKind>,
        now: Instant,
    ) -> Result<Resolution, BattleError> {
        if self.result.is_over() {
            return Err(BattleError::BattleOver);
        }
        if !self.player.ship.has_turn {
            return Err(BattleError::NotPlayersTurn);
        }

        let weapon = match action {
            ActionKind::Attack => Some(weapon.unwrap_or(self.player.selected_weapon)),
            _ => weapon,
        };
        if let (ActionKind::Attack, Some(w)) = (action, weapon) {
            self.player.selected_weapon = w;
        }

        let resolution = resolve(
            &mut self.player,
            &mut self.opponent,
            action,
            weapon,
            &self.tuning,
            &mut *self.dice,
        )?;
        self.rounds += 1;

        self.player.ship.announce(resolution.action_text.clone(), now);
        self.opponent.ship.say(resolution.opponent_speech.clone(), now);

        tracing::debug!(
            action = action.id(),
            outcome = ?resolution.outcome,
            damage = resolution.damage,
            player_health = self.player.ship.health(),
            opponent_health = self.opponent.ship.health(),
            "player action resolved"
        );

        self.player.ship.has_turn = false;
        self.opponent.ship.has_turn = true;
        self.turn = Some(OpponentTurn::begin(now));

        self.evaluate_terminal(now);
        Ok(resolution)
    }

    /// Advance the opponent's turn if it holds one. Safe to call every frame.
    pub fn tick(&mut self, now: Instant) -> BattleResult {
        if self.result.is_over() || !self.opponent.ship.has_turn {
            return self.result;
        }

        let turn = self.turn.get_or_insert_with(|| OpponentTurn::begin(now));
        let (progress, event) = turn.tick(
            now,
            &mut self.opponent,
            &mut self.player,
            &self.tuning,
            &mut *self.dice,
        );
        if let Some(event) = &event {
            tracing::trace!(?event, opponent = %self.opponent.name(), "opponent turn event");
        }

        if progress == TurnProgress::Complete {
            self.turn = None;
            self.evaluate_terminal(now);
        }
        self.result
    }

    /// Player defeat is checked first and wins ties.
    fn evaluate_terminal(&mut self, now: Instant) {
        if self.result.is_over() {
            return;
        }

        let winner = if !self.player.ship.is_alive() {
            self.result = BattleResult::OpponentWon;
            self.opponent.name().to_string()
        } else if !self.opponent.ship.is_alive() {
            self.result = BattleResult::PlayerWon;
            self.player.wins += 1;
            self.player.name().to_string()
        } else {
            return;
        };

        self.player.ship.has_turn = false;
        self.opponent.ship.has_turn = false;
        self.turn = None;
        self.opponent.ship.say(format!("VICTORY FOR {winner}!"), now);

        tracing::info!(
            result = ?self.result,
            winner = %winner,
            rounds = self.rounds,
            wins = self.player.wins,
            "battle over"
        );
    }

    /// Snapshot for drawing, with narration filtered to its display window.
    pub fn view(&self, now: Instant) -> BattleView {
        let action_window = self.tuning.action_line_window();
        let live_action = |line: &Option<Narration>| {
            line.as_ref()
                .filter(|n| n.is_live(now, action_window))
                .map(|n| n.text.clone())
        };

        let action_line = live_action(&self.player.ship.action_line)
            .or_else(|| live_action(&self.opponent.ship.action_line))
            .or_else(|| {
                (self.turn_owner() == Some(Side::Opponent)).then(|| ENEMY_TURN_PLACEHOLDER.to_string())
            });

        // The closing line stays up for the whole game-over screen.
        let speech = self
            .opponent
            .ship
            .speech
            .as_ref()
            .filter(|n| self.result.is_over() || n.is_live(now, self.tuning.speech_window()))
            .map(|n| n.text.clone());

        BattleView {
            turn_owner: self.turn_owner(),
            result: self.result,
            player: self.player.ship.view(),
            opponent: self.opponent.ship.view(),
            selected_weapon: self.player.selected_weapon,
            action_line,
            speech,
            rounds: self.rounds,
        }
    }

    /// End the battle and hand the player back, keeping its win count.
    pub fn into_player(self) -> PlayerShip {
        self.player
    }
}
