pub mod models;
pub mod error;
pub mod dice;
pub mod catalog;
pub mod tuning;
pub mod dialogue;
pub mod strategy;
pub mod combatant;
pub mod resolver;
pub mod opponent_turn;
pub mod battle;
pub mod leaderboard;
pub mod roster;
pub mod session;
pub mod arena;
