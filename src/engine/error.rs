use thiserror::Error;

/// Errors surfaced by battle and session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("it is not the player's turn")]
    NotPlayersTurn,

    #[error("the battle is already over")]
    BattleOver,

    #[error("no battle in progress")]
    NoActiveBattle,
}

/// Errors from writing the leaderboard store. Reads never fail.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
