use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bot::Bot;
use crate::config::Config;
use crate::display::{hand_replay, print_error, print_section, print_success, stats_table, strategy_table};
use crate::equity::MonteCarloOracle;
use crate::error::CfrResult;
use crate::history::History;
use crate::tables::StrategyStore;
use crate::trainer::{play_hand, stdin_interrupt, Trainer};

#[derive(Parser)]
#[command(
    name = "pineapple",
    version = "1.0.0",
    about = "Heads-up Pineapple hold'em: MCCFR training, strategy lookup and a live bot."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run MCCFR tree walks, checkpointing tables to disk
    Train {
        /// Directory holding the regret and strategy tables
        #[arg(short, long, default_value = "tables")]
        dir: PathBuf,
        /// Stop after this many walks (default: run until 'q' is entered)
        #[arg(short, long)]
        walks: Option<u64>,
        /// Seed for dealing, sampling and the equity oracle
        #[arg(short, long)]
        seed: Option<u64>,
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the average strategy stored for an information set
    Query {
        /// Information-set key, e.g. "H2.CL."
        key: String,
        #[arg(short, long, default_value = "tables")]
        dir: PathBuf,
    },
    /// Summarise the stored tables
    Stats {
        #[arg(short, long, default_value = "tables")]
        dir: PathBuf,
    },
    /// Play hands against itself and print every information set visited
    Simulate {
        /// Number of hands to play
        #[arg(short = 'n', long, default_value = "1")]
        hands: usize,
        #[arg(short, long)]
        seed: Option<u64>,
        /// Play from stored tables instead of uniformly at random
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Answer engine packets from stdin on stdout
    Bot {
        #[arg(short, long, default_value = "tables")]
        dir: PathBuf,
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run() {
    let cli = Cli::parse();
    dispatch(cli);
}

pub fn run_with_args(args: Vec<String>) {
    let cli = Cli::parse_from(args);
    dispatch(cli);
}

fn dispatch(cli: Cli) {
    let result = match cli.command {
        Commands::Train {
            dir,
            walks,
            seed,
            config,
        } => cmd_train(dir, walks, seed, config),
        Commands::Query { key, dir } => cmd_query(key, dir),
        Commands::Stats { dir } => cmd_stats(dir),
        Commands::Simulate {
            hands,
            seed,
            dir,
            config,
        } => cmd_simulate(hands, seed, dir, config),
        Commands::Bot { dir, seed, config } => cmd_bot(dir, seed, config),
    };
    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Config file (or defaults) with the command-line seed taking precedence.
fn load_config(path: Option<PathBuf>, seed: Option<u64>) -> CfrResult<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if seed.is_some() {
        config.trainer.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn oracle_for(config: &Config) -> MonteCarloOracle {
    match config.trainer.seed {
        Some(seed) => MonteCarloOracle::new(seed),
        None => MonteCarloOracle::default(),
    }
}

fn cmd_train(
    dir: PathBuf,
    walks: Option<u64>,
    seed: Option<u64>,
    config: Option<PathBuf>,
) -> CfrResult<()> {
    let config = load_config(config, seed)?;
    let store = StrategyStore::load(&dir)?;
    let oracle = oracle_for(&config);
    let stop = stdin_interrupt();

    println!();
    println!(
        "  Training from {} ({} infosets), epsilon {}, beta {}",
        dir.display().to_string().bold(),
        store.num_infosets(),
        config.trainer.epsilon,
        config.trainer.beta
    );

    let mut trainer = Trainer::new(store, oracle, config).with_checkpoints(&dir);
    let report = trainer.train(walks, stop)?;

    print_success(&format!(
        "  {} walks in {:.1}s, {} infosets saved",
        report.walks,
        report.seconds,
        trainer.store().num_infosets()
    ));
    Ok(())
}

fn cmd_query(key: String, dir: PathBuf) -> CfrResult<()> {
    let store = StrategyStore::load(&dir)?;
    match store.query_strategy(&key) {
        Some(distribution) => {
            println!();
            println!("  {}  {}", "Infoset".bold(), key.cyan());
            println!("{}", strategy_table(&distribution));
        }
        None => {
            println!();
            println!(
                "  {} not found in {}; play would be uniform over the legal actions.",
                key.cyan(),
                dir.display()
            );
        }
    }
    Ok(())
}

fn cmd_stats(dir: PathBuf) -> CfrResult<()> {
    let store = StrategyStore::load(&dir)?;
    print_section("Tables", &dir.display().to_string());
    println!("{}", stats_table(&store));
    Ok(())
}

fn cmd_simulate(
    hands: usize,
    seed: Option<u64>,
    dir: Option<PathBuf>,
    config: Option<PathBuf>,
) -> CfrResult<()> {
    let config = load_config(config, seed)?;
    let store = match &dir {
        Some(dir) => StrategyStore::load(dir)?,
        None => StrategyStore::new(),
    };
    let oracle = oracle_for(&config);
    let mut rng = match config.trainer.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for n in 0..hands {
        let root = History::root(n % 2, config.game, &mut rng);
        let (terminal, keys) = play_hand(root, &store, &oracle, &config.discard, &mut rng)?;
        let utilities = terminal.terminal_utilities(&oracle)?;

        print_section(&format!("Hand {} (button P{})", n + 1, n % 2), &terminal.describe());
        println!("{}", hand_replay(&terminal, utilities));
        for key in keys {
            println!("    {}", key.dimmed());
        }
    }
    Ok(())
}

fn cmd_bot(dir: PathBuf, seed: Option<u64>, config: Option<PathBuf>) -> CfrResult<()> {
    let config = load_config(config, seed)?;
    let store = StrategyStore::load(&dir)?;
    let oracle = oracle_for(&config);
    let mut bot = Bot::new(store, oracle, config);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    bot.run(stdin.lock(), stdout.lock())
}
