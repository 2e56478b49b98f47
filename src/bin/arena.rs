//! Arena CLI: run autopiloted battles against a roster opponent.
//!
//! Usage:
//!   cargo run --release --bin arena -- --battles 1000 --pilot cautious --opponent 2
//!   cargo run --release --bin arena -- --pilot attack --weapon ion --roster roster.toml

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use spacewar_engine::engine::arena::{run_arena, CautiousPilot, FixedPilot, PilotPolicy, RandomPilot};
use spacewar_engine::engine::models::{ActionKind, WeaponKind};
use spacewar_engine::engine::roster::{load_default_roster, load_roster};

#[derive(Parser)]
#[command(name = "arena", about = "Run headless autopilot battles for balance experiments")]
struct Cli {
    /// Number of battles to play
    #[arg(long, default_value = "1000")]
    battles: usize,

    /// Base random seed; battle i uses seed + i
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Path to roster.toml (default: auto-discover)
    #[arg(long, env = "SPACEWAR_ROSTER")]
    roster: Option<PathBuf>,

    /// Opponent number (1-based) or name; all opponents when omitted
    #[arg(long)]
    opponent: Option<String>,

    /// Pilot policy: "cautious", "random", "dodge", "attack" or "ignore"
    #[arg(long, default_value = "cautious")]
    pilot: String,

    /// Weapon for the "attack" pilot
    #[arg(long, default_value = "laser")]
    weapon: WeaponKind,

    /// Health fraction below which the cautious pilot dodges
    #[arg(long, default_value = "0.3")]
    dodge_below: f64,
}

fn build_pilot(cli: &Cli) -> Result<Box<dyn PilotPolicy>, String> {
    match cli.pilot.as_str() {
        "cautious" => Ok(Box::new(CautiousPilot { dodge_below: cli.dodge_below })),
        "random" => Ok(Box::new(RandomPilot)),
        other => {
            let action: ActionKind = other
                .parse()
                .map_err(|_| format!("unknown pilot '{}'", other))?;
            let weapon = (action == ActionKind::Attack).then_some(cli.weapon);
            Ok(Box::new(FixedPilot { action, weapon }))
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let roster = match &cli.roster {
        Some(path) => load_roster(path)?,
        None => load_default_roster(),
    };
    let opponents = roster.build_opponents()?;
    let pilot = build_pilot(&cli)?;

    let selected: Vec<_> = match &cli.opponent {
        None => opponents.iter().collect(),
        Some(choice) => {
            let found = match choice.parse::<usize>() {
                Ok(n) => n.checked_sub(1).and_then(|i| opponents.get(i)),
                Err(_) => opponents.iter().find(|o| o.name().eq_ignore_ascii_case(choice)),
            };
            vec![found.ok_or_else(|| format!("no opponent matching '{}'", choice))?]
        }
    };

    eprintln!(
        "Arena: {} battles per opponent, seed={}, pilot={}",
        cli.battles,
        cli.seed,
        pilot.name()
    );

    for opponent in selected {
        let started = Instant::now();
        let result = run_arena(opponent, pilot.as_ref(), &roster.tuning, cli.battles, cli.seed);
        println!("{}", result.summary());
        eprintln!("  ({:.2}s)\n", started.elapsed().as_secs_f64());
    }
    Ok(())
}
