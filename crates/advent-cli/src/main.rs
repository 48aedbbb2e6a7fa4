//! CLI frontend for the advent text-adventure engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "advent",
    about = "advent: play and inspect JSON text adventures",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine activity to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario interactively
    Play {
        /// Scenario JSON file
        world: PathBuf,

        /// RNG seed for vending-machine remarks
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Urgency added after every turn
        #[arg(long, default_value = "2")]
        urgency_step: u32,
    },

    /// Validate a scenario and summarize its contents
    Check {
        /// Scenario JSON file
        world: PathBuf,
    },

    /// Show how a line of input is parsed against a scenario
    Parse {
        /// Scenario JSON file
        world: PathBuf,

        /// The command to parse, e.g. "open the drawer"
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Play {
            world,
            seed,
            urgency_step,
        } => commands::play::run(&world, seed, urgency_step),
        Commands::Check { world } => commands::check::run(&world),
        Commands::Parse { world, input } => commands::parse::run(&world, &input),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, prelude::*};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
