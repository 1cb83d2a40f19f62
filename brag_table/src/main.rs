use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use brag_core::{play_hand_with, seat_agents, PlayerKind, SessionState, Table, TableConfig};

mod console;
mod render;

use console::Console;
use render::EventPrinter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Three-card brag against the computer", long_about = None)]
struct Args {
    /// JSON table config; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the deck and every agent, for replayable sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Number of computer opponents (1-5)
    #[arg(long)]
    agents: Option<usize>,

    /// Ante paid by every player each hand
    #[arg(long)]
    ante: Option<u32>,

    /// Call amount at the start of each hand
    #[arg(long)]
    min_bet: Option<u32>,

    /// Betting rounds per hand (1-5)
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Chips each player sits down with
    #[arg(long)]
    starting_chips: Option<u32>,

    /// Let an agent play your seat too
    #[arg(long)]
    auto: bool,

    /// Stop after this many hands
    #[arg(long)]
    hands: Option<u32>,

    /// Append every hand's event log to this file, one JSON array per line
    #[arg(long)]
    history: Option<PathBuf>,

    #[arg(long, default_value = "You")]
    name: String,
}

fn load_config(path: &Path) -> anyhow::Result<TableConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => TableConfig::default(),
    };
    // Flags override the file
    if let Some(agents) = args.agents {
        config.agents = agents;
    }
    if let Some(ante) = args.ante {
        config.ante = ante;
    }
    if let Some(min_bet) = args.min_bet {
        config.min_bet = min_bet;
    }
    if let Some(max_rounds) = args.max_rounds {
        config.max_rounds = max_rounds;
    }
    if let Some(starting_chips) = args.starting_chips {
        config.starting_chips = starting_chips;
    }

    let mut table = Table::with_human(config, args.name.as_str())?;
    if args.auto {
        table.players[0].kind = PlayerKind::Agent;
    }

    let printer = Rc::new(RefCell::new(EventPrinter::default()));
    let mut resolvers = seat_agents(&table, args.seed);
    if !args.auto {
        resolvers.insert(table.players[0].id, Box::new(Console::new(printer.clone())));
    }
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut history = match &args.history {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => None,
    };

    println!("=== Three-Card Brag ===");
    loop {
        match table.session_state() {
            SessionState::Running => {}
            SessionState::Winner(id) => {
                let name = table.player(&id).map_or("Someone", |p| p.name.as_str());
                println!("\nGame over! {} takes all the chips.", name);
                break;
            }
            SessionState::Bust => {
                println!("\nGame over! Everyone is broke (?!).");
                break;
            }
        }
        if args.hands.is_some_and(|limit| table.hands_played >= limit) {
            break;
        }

        play_hand_with(&mut table, &mut resolvers, &mut rng, |table, round| {
            printer.borrow_mut().flush(table);
            if !args.auto {
                let _ = console::prompt(&format!("\n[Press Enter] to start round {}", round));
            }
        })?;
        printer.borrow_mut().flush(&table);
        render::print_balances(&table);

        if let Some(out) = history.as_mut() {
            serde_json::to_writer(&mut *out, &table.events)?;
            writeln!(out)?;
        }

        if !args.auto && !console::confirm("\nPlay another hand? (Y/n): ") {
            println!("Thanks for playing. Play responsibly!");
            break;
        }
    }

    if let Some(mut out) = history {
        out.flush()?;
    }
    info!("session ended after {} hands", table.hands_played);
    Ok(())
}
