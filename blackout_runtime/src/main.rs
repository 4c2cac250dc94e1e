use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blackout_kernel::domain::Phase;
use blackout_kernel::view;
use blackout_runtime::config::RuntimeConfig;
use blackout_runtime::console::{self, Command};
use blackout_runtime::session::Session;
use blackout_runtime::{drift, replay, snapshot};

#[derive(Parser)]
#[command(name = "blackout", version, about = "Blackout card game kernel console")]
struct Cli {
    /// Directory holding one subdirectory per session
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Write a snapshot every N events (0 disables)
    #[arg(long, global = true)]
    snapshot_interval: Option<u64>,

    /// Seed for shuffles and automatic moves
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console over a session
    Play {
        #[arg(long, default_value = "table")]
        session: String,
        /// Players at the table when starting a new game
        #[arg(long, default_value_t = 4)]
        players: usize,
        #[arg(long)]
        max_tricks: Option<u8>,
        /// First dealer (random when omitted)
        #[arg(long)]
        dealer: Option<usize>,
    },
    /// Play a whole game with random legal moves
    Simulate {
        #[arg(long)]
        session: Option<String>,
        #[arg(long, default_value_t = 4)]
        players: usize,
        #[arg(long)]
        max_tricks: Option<u8>,
    },
    /// Rebuild a stored session from its event log
    Replay {
        #[arg(long)]
        session: String,
    },
    /// Check replay determinism and snapshot agreement
    Verify {
        #[arg(long)]
        session: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RuntimeConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(interval) = cli.snapshot_interval {
        config.snapshot_interval = interval;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Play {
            session,
            players,
            max_tricks,
            dealer,
        } => {
            let mut session = open_session(&config, &session)?;
            if session.state().phase == Phase::Setup {
                session
                    .start_game(players, max_tricks.unwrap_or(config.max_tricks), dealer)
                    .context("failed to start game")?;
            }
            run_console(&mut session)
        }
        Commands::Simulate {
            session,
            players,
            max_tricks,
        } => {
            let seed = config.seed.unwrap_or_else(rand::random);
            config.seed = Some(seed);
            let id = session.unwrap_or_else(|| format!("sim-{}", seed));
            let mut session = open_session(&config, &id)?;
            if session.state().phase == Phase::Setup {
                session.start_game(players, max_tricks.unwrap_or(config.max_tricks), None)?;
            }
            let steps = session.auto_play(usize::MAX)?;
            println!("session {} (seed {}): {} actions", id, seed, steps);
            for (place, (seat, score)) in view::standings(session.state()).iter().enumerate() {
                println!("{}. seat {} - {}", place + 1, seat, score);
            }
            println!("hash {}", session.current_hash());
            Ok(())
        }
        Commands::Replay { session } => {
            let mut session = open_existing(&config, &session)?;
            let (state, hash) = session.replay_full()?;
            println!("{}", console::dump_state(&state));
            println!();
            println!("sequence {} hash {}", session.current_sequence(), hash);
            Ok(())
        }
        Commands::Verify { session } => verify(&config, &session),
    }
}

fn open_session(config: &RuntimeConfig, id: &str) -> Result<Session> {
    Session::new(&config.data_dir, id, config.snapshot_interval, config.seed)
        .with_context(|| format!("failed to open session '{}'", id))
}

fn open_existing(config: &RuntimeConfig, id: &str) -> Result<Session> {
    if !session_log(&config.data_dir, id).exists() {
        bail!("no session '{}' under {}", id, config.data_dir.display());
    }
    open_session(config, id)
}

fn session_log(data_dir: &Path, id: &str) -> PathBuf {
    data_dir.join(id).join("events.log")
}

fn verify(config: &RuntimeConfig, id: &str) -> Result<()> {
    let session = open_existing(config, id)?;
    let events = session.events()?;

    let hash = drift::verify_determinism(&events)?;
    println!("determinism ok: {} events, hash {}", events.len(), hash);

    let Some(snap) = session.latest_snapshot()? else {
        println!("no snapshots to check");
        return Ok(());
    };
    if !snapshot::verify_snapshot_hash(&snap) {
        bail!("snapshot {} is corrupt: stored hash does not match its content", snap.sequence);
    }

    let prefix = events
        .iter()
        .take_while(|e| e.sequence <= snap.sequence)
        .cloned()
        .collect::<Vec<_>>();
    let (at_snapshot, prefix_hash) = replay::rebuild_state(&prefix)?;
    if prefix_hash != snap.hash {
        bail!(
            "snapshot {} disagrees with replay: snapshot {}, replay {}",
            snap.sequence,
            snap.hash,
            prefix_hash
        );
    }
    println!("snapshot {} matches replay", snap.sequence);

    let report = drift::compare_states(&at_snapshot, session.state());
    if !report.is_empty() {
        println!("since snapshot: {:?}", report);
    }
    Ok(())
}

fn run_console(session: &mut Session) -> Result<()> {
    let mut rl = DefaultEditor::new().context("failed to start line editor")?;
    println!(
        "session {} at sequence {} (type 'help')",
        session.session_id(),
        session.current_sequence()
    );

    loop {
        match rl.readline("blackout> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                match line
                    .parse::<Command>()
                    .and_then(|cmd| console::execute(session, cmd))
                {
                    Ok(outcome) => {
                        println!("{}", outcome.output);
                        if outcome.quit {
                            break;
                        }
                    }
                    Err(err) => println!("error: {}", err),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("failed to read input"),
        }
    }
    Ok(())
}
