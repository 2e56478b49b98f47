//! Line-oriented terminal front end.
//!
//! Frames are plain text; input is one command per line. The async loop in
//! [`Frontend::run`] ticks the session at a fixed rate and reads stdin in
//! between, printing a frame only when its text changes.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::engine::catalog::{action, weapon, MAX_NICKNAME_CHARS};
use crate::engine::models::{ActionKind, BattleResult, BattleView, CombatantView, Side, WeaponKind};
use crate::engine::session::Session;

const BAR_WIDTH: usize = 20;
const RULE_WIDTH: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Nickname,
    Menu,
    Battle,
    GameOver,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct Frontend {
    session: Session,
    screen: Screen,
    last_opponent: Option<usize>,
    notice: Option<String>,
    last_frame: Option<String>,
}

impl Frontend {
    pub fn new(session: Session) -> Self {
        let screen = if session.nickname().is_some() { Screen::Menu } else { Screen::Nickname };
        Self {
            session,
            screen,
            last_opponent: None,
            notice: None,
            last_frame: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply one line of user input.
    pub fn handle_line(&mut self, line: &str, now: Instant) -> Control {
        let line = line.trim();
        self.notice = None;
        if matches!(line.to_ascii_lowercase().as_str(), "quit" | "exit") {
            return Control::Quit;
        }

        match self.screen {
            Screen::Nickname => match self.session.enter_nickname(line) {
                Ok(()) => self.screen = Screen::Menu,
                Err(e) => self.notice = Some(e.to_string()),
            },
            Screen::Menu => self.handle_menu(line),
            Screen::Stats => {
                if is_back(line) || line.is_empty() {
                    self.screen = Screen::Menu;
                } else {
                    self.notice = Some("type 'back' to return".into());
                }
            }
            Screen::Battle => self.handle_battle(line, now),
            Screen::GameOver => {
                if line.eq_ignore_ascii_case("again") {
                    if let Some(index) = self.last_opponent {
                        self.start_battle(index);
                    }
                } else if is_back(line) || line.is_empty() {
                    self.session.return_to_menu();
                    self.screen = Screen::Menu;
                } else {
                    self.notice = Some("type 'again' or 'menu'".into());
                }
            }
        }
        Control::Continue
    }

    fn handle_menu(&mut self, line: &str) {
        if line.eq_ignore_ascii_case("stats") {
            self.screen = Screen::Stats;
            return;
        }
        let index = match line.parse::<usize>() {
            Ok(n) if n >= 1 => Some(n - 1),
            _ => self
                .session
                .roster()
                .iter()
                .position(|o| o.name().eq_ignore_ascii_case(line)),
        };
        match index {
            Some(index) => self.start_battle(index),
            None => self.notice = Some(format!("unknown choice: {line:?}")),
        }
    }

    fn start_battle(&mut self, index: usize) {
        match self.session.select_opponent(index) {
            Ok(_) => {
                self.last_opponent = Some(index);
                self.screen = Screen::Battle;
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn handle_battle(&mut self, line: &str, now: Instant) {
        if line.is_empty() {
            return;
        }
        if is_back(line) {
            self.session.return_to_menu();
            self.screen = Screen::Menu;
            return;
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let argument = words.next();

        let outcome = match command.as_str() {
            "weapon" => match argument {
                Some(name) => name
                    .parse::<WeaponKind>()
                    .and_then(|w| self.session.select_weapon(w)),
                None => {
                    self.notice = Some("usage: weapon <laser|ion|shield>".into());
                    return;
                }
            },
            _ => command.parse::<ActionKind>().and_then(|action| {
                let weapon = argument.map(str::parse::<WeaponKind>).transpose()?;
                self.session.submit(action, weapon, now).map(|_| ())
            }),
        };
        if let Err(e) = outcome {
            self.notice = Some(e.to_string());
        }
        self.sync_screen();
    }

    /// Per-frame update.
    pub fn tick(&mut self, now: Instant) {
        self.session.tick(now);
        self.sync_screen();
    }

    fn sync_screen(&mut self) {
        let over = self.session.battle().is_some_and(|b| b.result().is_over());
        if self.screen == Screen::Battle && over {
            self.screen = Screen::GameOver;
        }
    }

    /// The current frame, or `None` if it is identical to the last one returned.
    pub fn frame(&mut self, now: Instant) -> Option<String> {
        let frame = self.render(now);
        if self.last_frame.as_deref() == Some(frame.as_str()) {
            return None;
        }
        self.last_frame = Some(frame.clone());
        Some(frame)
    }

    pub fn render(&self, now: Instant) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        match self.screen {
            Screen::Nickname => {
                let _ = writeln!(out, "SPACE WAR");
                let _ = writeln!(out, "ENTER YOUR NICKNAME (max {MAX_NICKNAME_CHARS} characters):");
            }
            Screen::Menu => self.render_menu(&mut out),
            Screen::Stats => self.render_stats(&mut out),
            Screen::Battle | Screen::GameOver => {
                if let Some(battle) = self.session.battle() {
                    render_battle(&mut out, &battle.view(now), self.screen == Screen::GameOver);
                }
            }
        }
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "! {notice}");
        }
        out
    }

    fn render_menu(&self, out: &mut String) {
        let _ = writeln!(
            out,
            "PILOT: {}   WINS: {}",
            self.session.nickname().unwrap_or_default(),
            self.session.wins()
        );
        let _ = writeln!(out, "CHOOSE YOUR OPPONENT:");
        for (i, opponent) in self.session.roster().iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({} HP, {})",
                i + 1,
                opponent.name(),
                opponent.ship.max_health(),
                opponent.strategy.name()
            );
        }
        let _ = writeln!(out, "commands: <number> | <name> | stats | quit");
    }

    fn render_stats(&self, out: &mut String) {
        let _ = writeln!(out, "LEADERBOARD");
        let entries = self.session.leaderboard().entries();
        if entries.is_empty() {
            let _ = writeln!(out, "  NO VICTORIES YET");
        }
        for (rank, entry) in entries.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {:<15} {:>4}", rank + 1, entry.nickname, entry.wins);
        }
        let _ = writeln!(out, "commands: back | quit");
    }

    /// Drive the session until `quit` or end of input.
    pub async fn run(mut self, fps: u32) -> std::io::Result<()> {
        let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(Instant::now()),
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if self.handle_line(&line, Instant::now()) == Control::Quit {
                            break;
                        }
                    }
                    None => break,
                },
            }

            if let Some(frame) = self.frame(Instant::now()) {
                stdout.write_all(frame.as_bytes()).await?;
                stdout.flush().await?;
            }
        }

        tracing::info!(wins = self.session.wins(), "session ended");
        Ok(())
    }
}

fn is_back(line: &str) -> bool {
    line.eq_ignore_ascii_case("back") || line.eq_ignore_ascii_case("menu")
}

fn health_bar(view: &CombatantView) -> String {
    let filled = ((view.health_ratio * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn render_battle(out: &mut String, view: &BattleView, game_over: bool) {
    for (marker, ship) in [(Side::Player, &view.player), (Side::Opponent, &view.opponent)] {
        let turn = if view.turn_owner == Some(marker) { ">" } else { " " };
        let _ = writeln!(
            out,
            "{turn} {:<22} {} {:>3}/{}",
            ship.name,
            health_bar(ship),
            ship.health,
            ship.max_health
        );
    }
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    if let Some(line) = &view.action_line {
        let _ = writeln!(out, "{line}");
    }
    if let Some(speech) = &view.speech {
        let _ = writeln!(out, "{}: \"{speech}\"", view.opponent.name);
    }

    if game_over {
        let banner = match view.result {
            BattleResult::PlayerWon => "VICTORY!",
            _ => "DEFEAT",
        };
        let _ = writeln!(out, "{banner}  (rounds: {})", view.rounds);
        let _ = writeln!(out, "commands: again | menu | quit");
        return;
    }

    let stats = weapon(view.selected_weapon);
    let _ = writeln!(
        out,
        "WEAPON: {} ({} dmg, {:.0}%)",
        stats.label,
        stats.damage_per_hit,
        stats.success_probability * 100.0
    );
    if view.turn_owner == Some(Side::Player) {
        let choices: Vec<String> = ActionKind::ALL
            .into_iter()
            .map(|kind| {
                let choice = action(kind);
                match choice.success_probability {
                    Some(p) => format!("{} {:.0}%", choice.label, p * 100.0),
                    None => choice.label.to_string(),
                }
            })
            .collect();
        let _ = writeln!(out, "ACTIONS: {}", choices.join(" | "));
        let _ = writeln!(out, "commands: dodge | attack [weapon] | ignore | weapon <name> | menu");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::combatant::OpponentShip;
    use crate::engine::leaderboard::Leaderboard;
    use crate::engine::roster::RosterFile;
    use crate::engine::strategy::WeightedStrategy;
    use crate::engine::tuning::BattleTuning;

    fn frontend() -> Frontend {
        let roster = RosterFile::default().build_opponents().unwrap();
        Frontend::new(Session::new(roster, BattleTuning::default(), Leaderboard::new()).with_seed(11))
    }

    #[test]
    fn test_nickname_then_menu() {
        let mut ui = frontend();
        let now = Instant::now();
        assert_eq!(ui.screen(), Screen::Nickname);

        ui.handle_line("   ", now);
        assert_eq!(ui.screen(), Screen::Nickname);
        assert!(ui.render(now).contains("nickname is empty"));

        ui.handle_line("MAVERICK", now);
        assert_eq!(ui.screen(), Screen::Menu);
        let frame = ui.render(now);
        assert!(frame.contains("PILOT: MAVERICK"));
        assert!(frame.contains("1. CORVETTE 'LIGHTNING' (120 HP, fast)"));
    }

    #[test]
    fn test_stats_and_back() {
        let mut ui = frontend();
        let now = Instant::now();
        ui.handle_line("ACE", now);
        ui.handle_line("stats", now);
        assert_eq!(ui.screen(), Screen::Stats);
        assert!(ui.render(now).contains("NO VICTORIES YET"));
        ui.handle_line("back", now);
        assert_eq!(ui.screen(), Screen::Menu);
    }

    #[test]
    fn test_select_by_number_and_name() {
        let mut ui = frontend();
        let now = Instant::now();
        ui.handle_line("ACE", now);
        ui.handle_line("7", now);
        assert_eq!(ui.screen(), Screen::Menu);

        ui.handle_line("battleship 'titan'", now);
        assert_eq!(ui.screen(), Screen::Battle);
        assert_eq!(ui.session().battle().unwrap().opponent().name(), "BATTLESHIP 'TITAN'");

        ui.handle_line("menu", now);
        ui.handle_line("1", now);
        assert_eq!(ui.session().battle().unwrap().opponent().name(), "CORVETTE 'LIGHTNING'");
    }

    #[test]
    fn test_battle_commands() {
        let mut ui = frontend();
        let now = Instant::now();
        ui.handle_line("ACE", now);
        ui.handle_line("1", now);

        assert!(ui.render(now).contains("ACTIONS: DODGE 70% | DIRECT STRIKE 85% | IGNORE"));

        ui.handle_line("weapon ion", now);
        assert!(ui.render(now).contains("WEAPON: ION"));
        ui.handle_line("weapon railgun", now);
        assert!(ui.render(now).contains("unknown weapon"));
        ui.handle_line("fly", now);
        assert!(ui.render(now).contains("unknown action"));

        ui.handle_line("dodge", now);
        assert!(ui.render(now).contains("DODGE"));
        ui.handle_line("attack", now);
        assert!(ui.render(now).contains("not the player's turn"));
    }

    #[test]
    fn test_frame_only_when_changed() {
        let mut ui = frontend();
        let now = Instant::now();
        assert!(ui.frame(now).is_some());
        assert!(ui.frame(now).is_none());
        ui.handle_line("ACE", now);
        assert!(ui.frame(now).is_some());
    }

    #[test]
    fn test_quit_from_any_screen() {
        let mut ui = frontend();
        let now = Instant::now();
        assert_eq!(ui.handle_line("quit", now), Control::Quit);
        ui.handle_line("ACE", now);
        ui.handle_line("1", now);
        assert_eq!(ui.handle_line("QUIT", now), Control::Quit);
    }

    #[test]
    fn test_victory_reaches_game_over_and_again() {
        let drone = OpponentShip::new("DRONE", 1, Arc::new(WeightedStrategy::fast()));
        let session = Session::new(vec![drone], BattleTuning::default(), Leaderboard::new()).with_seed(5);
        let mut ui = Frontend::new(session);
        let mut t = Instant::now();
        ui.handle_line("ACE", t);
        ui.handle_line("1", t);

        while ui.screen() == Screen::Battle {
            ui.handle_line("attack ion", t);
            for _ in 0..4 {
                t += Duration::from_secs(1);
                ui.tick(t);
            }
        }
        assert_eq!(ui.screen(), Screen::GameOver);
        let frame = ui.render(t);
        assert!(frame.contains("VICTORY!"));
        assert!(frame.contains("VICTORY FOR ACE!"));
        assert_eq!(ui.session().leaderboard().best_for("ACE"), Some(1));

        ui.handle_line("again", t);
        assert_eq!(ui.screen(), Screen::Battle);
        assert_eq!(ui.session().wins(), 1);
    }
}
