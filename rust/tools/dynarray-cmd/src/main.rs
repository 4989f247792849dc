use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logger;

#[derive(Parser)]
#[command(name = "dynarray-cmd")]
#[command(about = "Command-line utility for exercising dynarray copy semantics")]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run randomized copy scenarios and verify the copy postconditions
    Check {
        /// JSON file with check settings; explicit flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of scenarios to run
        #[arg(long)]
        iterations: Option<usize>,

        /// Seed of the scenario generator
        #[arg(long)]
        seed: Option<u64>,

        /// Largest item size in bytes
        #[arg(long)]
        max_item_size: Option<usize>,

        /// Largest number of items per list
        #[arg(long)]
        max_items: Option<usize>,

        /// Probability that an allocation made by the copy is refused
        #[arg(long)]
        failure_rate: Option<f64>,

        /// Cap on the bytes held by the lists of one scenario
        #[arg(long)]
        budget: Option<usize>,
    },

    /// Copy a generated list into a destination of the given shape and show the result
    Copy {
        /// Size of one item in bytes
        #[arg(long)]
        item_size: usize,

        /// Number of items in the source list
        #[arg(long)]
        source_len: usize,

        /// Destination capacity in items
        #[arg(long)]
        dest_capacity: usize,

        /// Number of items already in the destination
        #[arg(long, default_value_t = 0)]
        dest_len: usize,

        /// Use caller-owned fixed storage for the destination
        #[arg(long)]
        fixed: bool,

        /// Cap on bytes the destination allocator hands out
        #[arg(long)]
        budget: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Commands::Check {
            config,
            iterations,
            seed,
            max_item_size,
            max_items,
            failure_rate,
            budget,
        } => commands::check::run(
            config,
            commands::check::Overrides {
                iterations,
                seed,
                max_item_size,
                max_items,
                failure_rate,
                budget,
            },
        ),
        Commands::Copy {
            item_size,
            source_len,
            dest_capacity,
            dest_len,
            fixed,
            budget,
        } => commands::copy::run(commands::copy::Scenario {
            item_size,
            source_len,
            dest_capacity,
            dest_len,
            fixed,
            budget,
        }),
    }
}
