use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crash_sim::csv::write_rounds;
use crash_sim::draw::{CrashPointSource, RandomDraw};
use crash_sim::sim::{AutoCashOut, autoplay, simulate};
use crash_sim::store::{JsonFileStore, KeyValueStore, MemoryStore};
use crash_sim::{Amount, GameConfig, GameSession, RoundReport};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Play rounds of the crash game with an auto-cash-out strategy and print a
/// csv report of every round.
#[derive(Debug, Parser)]
#[command(name = "crash-sim", version)]
struct Args {
    /// Number of rounds to play
    #[arg(long, default_value_t = 10)]
    rounds: usize,

    /// Stake per round; clamped to the minimum bet
    #[arg(long, default_value = "10")]
    bet: String,

    /// Cash out at the first multiplier at or above this value
    #[arg(long, default_value_t = 2.0)]
    target: f64,

    /// Seed for reproducible crash points
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file keeping balance and history between runs
    #[arg(long)]
    state: Option<PathBuf>,

    /// JSON game config overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Play on real timers instead of simulated time
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match GameConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), "{e}");
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    if !(args.target.is_finite() && args.target >= 1.0) {
        warn!(cash_out_at = args.target, "target below 1.00 cashes out immediately");
    }
    let strategy = AutoCashOut {
        bet: Amount::sanitize_bet(&args.bet, config.min_bet),
        target: args.target,
    };

    let draw = match args.seed {
        Some(seed) => RandomDraw::seeded(seed, &config),
        None => RandomDraw::from_os_rng(&config),
    };

    let reports = match &args.state {
        Some(path) => match JsonFileStore::open(path) {
            Ok(store) => play(GameSession::new(config, store, draw), strategy, &args).await,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => play(GameSession::new(config, MemoryStore::new(), draw), strategy, &args).await,
    };

    if let Err(e) = write_rounds(std::io::stdout().lock(), &reports) {
        error!("failed to write report: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn play<S: KeyValueStore, D: CrashPointSource>(
    mut session: GameSession<S, D>,
    strategy: AutoCashOut,
    args: &Args,
) -> Vec<RoundReport> {
    if !args.realtime {
        return simulate(&mut session, strategy, args.rounds);
    }

    let (action_sender, action_receiver) = tokio::sync::mpsc::channel(16);
    let player = tokio::spawn(autoplay(
        session.subscribe(),
        action_sender,
        strategy,
        args.rounds,
    ));
    session.run(ReceiverStream::new(action_receiver)).await;
    player.await.unwrap_or_else(|e| {
        warn!("autoplay task failed: {e}");
        Vec::new()
    })
}
