use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use avl_trace::{
    build_tree, record_deletion, record_insertion, AvlTree, PlaybackConfig, PlaybackController,
    Step, StepTrace,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "avl-trace", about = "Step-by-step AVL tree insertion and deletion")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Seed {
    /// Values inserted in order to build the starting tree.
    #[arg(
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        default_value = "50,30,70,20,40,60,80,10,25,35,45"
    )]
    values: Vec<i64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the tree built from the seed values.
    Show {
        #[command(flatten)]
        seed: Seed,
    },
    /// Record the insertion of a value and print every step.
    Insert {
        #[command(flatten)]
        seed: Seed,
        /// Value to insert.
        #[arg(allow_negative_numbers = true)]
        value: i64,
        /// Print the tree snapshot under every step.
        #[arg(long)]
        tree: bool,
    },
    /// Record the deletion of a value and print every step.
    Delete {
        #[command(flatten)]
        seed: Seed,
        /// Value to delete.
        #[arg(allow_negative_numbers = true)]
        value: i64,
        /// Print the tree snapshot under every step.
        #[arg(long)]
        tree: bool,
    },
    /// Record a deletion and play it back in real time.
    Replay {
        #[command(flatten)]
        seed: Seed,
        /// Value to delete.
        #[arg(allow_negative_numbers = true)]
        value: i64,
        /// Milliseconds between steps.
        #[arg(long, default_value_t = avl_trace::playback::DEFAULT_SPEED_MS)]
        speed_ms: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Show { seed } => {
            let tree = build_tree(seed.values);
            print!("{tree}");
            println!("height={} len={}", tree.height(), tree.len());
        }
        Commands::Insert { seed, value, tree } => {
            let (_, trace) = record_insertion(&build_tree(seed.values), value);
            print_trace(&trace, tree);
        }
        Commands::Delete { seed, value, tree } => {
            let (_, trace) = record_deletion(&build_tree(seed.values), value);
            print_trace(&trace, tree);
        }
        Commands::Replay {
            seed,
            value,
            speed_ms,
        } => {
            let (_, trace) = record_deletion(&build_tree(seed.values), value);
            replay(trace, speed_ms)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_trace(trace: &StepTrace<i64>, with_tree: bool) {
    for (idx, step) in trace.iter().enumerate() {
        print_step(idx, step);
        if with_tree {
            print_tree(&step.tree);
        }
    }
}

fn print_step(idx: usize, step: &Step<i64>) {
    let rotation = step
        .rotation_type
        .map(|rotation| format!(" [{rotation}]"))
        .unwrap_or_default();
    println!("{:>3}  {:<20}{}{}", idx, step.kind.as_str(), step.description, rotation);
}

fn print_tree(tree: &AvlTree<i64>) {
    for line in tree.to_string().lines() {
        println!("       {line}");
    }
}

fn replay(trace: StepTrace<i64>, speed_ms: u64) -> Result<()> {
    let config = PlaybackConfig::default().with_speed_ms(speed_ms);
    let mut playback =
        PlaybackController::with_config(trace, config).context("failed to start playback")?;

    print_step(playback.cursor(), playback.current_step());
    print_tree(&playback.current_step().tree);

    playback.play(Instant::now());
    while let Some(deadline) = playback.next_deadline() {
        thread::sleep(deadline.saturating_duration_since(Instant::now()));
        if playback.poll(Instant::now()) > 0 {
            print_step(playback.cursor(), playback.current_step());
            print_tree(&playback.current_step().tree);
        }
    }

    Ok(())
}
