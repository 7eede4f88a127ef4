//! Battle Sim - headless battles between two AI participants
//!
//! This binary shows:
//! - Loading the roster (embedded or from a directory of TOML files)
//! - Building two random teams
//! - Driving both participants through a SessionRegistry with the battle AI
//! - Running the session sweeper alongside the battle

use anyhow::{bail, Context, Result};
use battle_core::ai;
use battle_core::battle::BattleOutcome;
use battle_core::config::{default_roster, load_battle_constants, RosterProvider, StaticRoster};
use battle_core::session::{spawn_sweeper, BattleSnapshot, PlayerAction, SessionRegistry, SideSnapshot, SystemClock};
use battle_core::{BattleConstants, CharacterInstance, SessionConfig};
use clap::Parser;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const PLAYER_A: &str = "player_a";
const PLAYER_B: &str = "player_b";

#[derive(Parser, Debug)]
#[command(name = "battle_sim", about = "Run an AI vs AI battle")]
struct Args {
    /// Seed for team selection and battle rolls
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Stop after this many turns
    #[arg(long, default_value_t = 100)]
    turn_limit: u32,

    /// Characters per team
    #[arg(long, default_value_t = 3)]
    team_size: usize,

    /// Directory holding roster.toml and techniques.toml
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Battle constants TOML file
    #[arg(long)]
    constants: Option<PathBuf>,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let roster = match &args.roster {
        Some(dir) => StaticRoster::load(dir).with_context(|| format!("loading roster from {}", dir.display()))?,
        None => default_roster(),
    };
    let constants = match &args.constants {
        Some(path) => load_battle_constants(path).with_context(|| format!("loading constants from {}", path.display()))?,
        None => BattleConstants::default(),
    };

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let (team_a, team_b) = pick_teams(&roster, args.team_size.min(constants.limits.max_party_size), &mut rng)?;
    println!("{}: {}", PLAYER_A, names(&team_a));
    println!("{}: {}", PLAYER_B, names(&team_b));

    let config = SessionConfig::default();
    let sweep_interval = config.sweep_interval();
    let mut registry = SessionRegistry::new(constants, config, Arc::new(SystemClock::new()));
    registry.create_seeded_battle(PLAYER_A, team_a, PLAYER_B, team_b, rng.gen())?;
    let registry = Arc::new(Mutex::new(registry));

    let cancel_token = CancellationToken::new();
    let sweeper = spawn_sweeper(registry.clone(), sweep_interval, cancel_token.clone());

    let result = run_battle(&registry, args.turn_limit).await;

    cancel_token.cancel();
    sweeper.await.context("sweeper task panicked")?;

    let snapshot = result?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    match &snapshot.winner {
        Some(winner) => println!("\n{} wins after {} turns", winner, snapshot.turn),
        None if snapshot.is_complete() => println!("\nDraw after {} turns", snapshot.turn),
        None => println!("\nNo result after {} turns", snapshot.turn),
    }
    Ok(())
}

/// Play turns until the battle ends or the limit is hit; returns the last snapshot
async fn run_battle(registry: &Mutex<SessionRegistry>, turn_limit: u32) -> Result<BattleSnapshot> {
    let mut printed = 0;
    let mut last = match registry.lock().await.get_snapshot(PLAYER_A) {
        Some(snapshot) => snapshot,
        None => bail!("battle was not created"),
    };

    while !last.is_complete() && last.turn <= turn_limit {
        for participant in [PLAYER_A, PLAYER_B] {
            let mut reg = registry.lock().await;
            let Some(session) = reg.get_session(participant) else {
                break;
            };
            let Some(side) = session.side_of(participant) else {
                bail!("{} is not seated in its own session", participant);
            };
            if session.is_complete() || session.has_acted(side) {
                continue;
            }

            let action = ai::choose_action(session.engine(), side);
            let passed = match action {
                Some(action) => take_turn(&mut reg, participant, action)?,
                None => true,
            };
            if passed {
                let outcome = reg.handle_timeout(participant)?;
                println!("  {}", outcome.message);
                if outcome.forfeited {
                    last.outcome = Some(BattleOutcome::Victory(side.opponent()));
                    last.winner = outcome.winner;
                    return Ok(last);
                }
            }
        }

        let reg = registry.lock().await;
        if let Some(session) = reg.get_session(PLAYER_A) {
            let entries = session.engine().log().entries();
            for entry in entries.iter().skip(printed) {
                println!("  [turn {}] {}", entry.turn, entry.message);
            }
            printed = entries.len();
        }
        if let Some(snapshot) = reg.get_snapshot(PLAYER_A) {
            print_status(&snapshot);
            last = snapshot;
        }
    }

    if !last.is_complete() {
        tracing::info!(turn = last.turn, "turn limit reached");
        registry.lock().await.end_session(PLAYER_A);
    }
    Ok(last)
}

/// Submit `action`; returns true when the participant should pass instead
fn take_turn(registry: &mut SessionRegistry, participant: &str, action: PlayerAction) -> Result<bool> {
    let outcome = registry.submit_action(participant, action)?;
    println!("  {} > {}", participant, outcome.message);
    let still_owed = registry
        .get_session(participant)
        .and_then(|s| s.side_of(participant).map(|side| !s.has_acted(side) && !s.is_complete()))
        .unwrap_or(false);
    Ok(!outcome.success && still_owed)
}

fn pick_teams(
    roster: &StaticRoster,
    team_size: usize,
    rng: &mut ChaCha8Rng,
) -> Result<(Vec<CharacterInstance>, Vec<CharacterInstance>)> {
    let mut names = roster.character_names();
    if team_size == 0 || names.len() < team_size * 2 {
        bail!("roster has {} characters, need {} for two teams", names.len(), team_size * 2);
    }
    names.shuffle(rng);

    let build = |owner: &str, picks: &[String]| -> Result<Vec<CharacterInstance>> {
        picks
            .iter()
            .map(|name| roster.instantiate(name, owner).map_err(anyhow::Error::from))
            .collect()
    };
    Ok((
        build(PLAYER_A, &names[..team_size])?,
        build(PLAYER_B, &names[team_size..team_size * 2])?,
    ))
}

fn names(team: &[CharacterInstance]) -> String {
    team.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
}

fn print_status(snapshot: &BattleSnapshot) {
    println!("--- Turn {} ---", snapshot.turn);
    for side in [&snapshot.side_a, &snapshot.side_b] {
        print_side(side);
    }
}

fn print_side(side: &SideSnapshot) {
    let Some(active) = side.active() else {
        return;
    };
    let bench = side
        .members
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != side.active_index)
        .map(|(_, m)| if m.defeated { format!("{} (down)", m.name) } else { m.name.clone() })
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "  {:<9} {} HP {}/{} MP {}/{} {:?} | bench: {}",
        side.participant,
        active.name,
        active.current_hp,
        active.max_hp,
        active.current_mana,
        active.max_mana,
        active.condition,
        if bench.is_empty() { "-" } else { bench.as_str() },
    );
}
