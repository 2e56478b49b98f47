use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spacewar_engine::engine::leaderboard::Leaderboard;
use spacewar_engine::engine::roster::{load_default_roster, load_roster};
use spacewar_engine::engine::session::Session;
use spacewar_engine::frontend::Frontend;

#[derive(Parser)]
#[command(name = "spacewar", about = "Turn-based space battles in the terminal")]
struct Cli {
    /// Frames per second for the battle clock
    #[arg(long, default_value = "60", env = "SPACEWAR_FPS")]
    fps: u32,

    /// Path to the leaderboard JSON file
    #[arg(long, default_value = "leaderboard.json", env = "SPACEWAR_LEADERBOARD")]
    leaderboard: PathBuf,

    /// Path to roster.toml (default: auto-discover)
    #[arg(long, env = "SPACEWAR_ROSTER")]
    roster: Option<PathBuf>,

    /// Seed for reproducible battles
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the nickname screen
    #[arg(long)]
    nickname: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let roster = match &cli.roster {
        Some(path) => load_roster(path).map_err(|e| format!("Failed to load roster: {}", e))?,
        None => load_default_roster(),
    };
    let opponents = roster.build_opponents()?;
    tracing::info!(
        opponents = ?opponents.iter().map(|o| o.name()).collect::<Vec<_>>(),
        "roster ready"
    );

    let leaderboard = Leaderboard::load(&cli.leaderboard);
    let mut session = Session::new(opponents, roster.tuning, leaderboard).with_leaderboard_path(&cli.leaderboard);
    if let Some(seed) = cli.seed {
        session = session.with_seed(seed);
    }
    if let Some(nickname) = &cli.nickname {
        session.enter_nickname(nickname)?;
    }

    Frontend::new(session).run(cli.fps).await?;
    Ok(())
}
