//! CLI frontend for the Nightrule condition engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "nr",
    about = "Nightrule: win and death conditions for interactive fiction",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a directory with template conditions.json and state.json
    Init {
        /// Name of the directory to create
        name: String,
    },

    /// Validate every expression in a condition set
    Check {
        /// Condition set (JSON array)
        conditions: PathBuf,
    },

    /// Validate a single expression
    Validate {
        /// The expression to check
        expression: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a condition set against a game state
    Eval {
        /// Condition set (JSON array)
        conditions: PathBuf,

        /// Game state snapshot (JSON object)
        state: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Log engine events to stderr
        #[arg(long)]
        debug: bool,
    },

    /// Print the standard condition set as JSON
    Standard,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { name } => commands::init::run(&name),
        Commands::Check { conditions } => commands::check::run(&conditions),
        Commands::Validate { expression, json } => commands::validate::run(&expression, json),
        Commands::Eval {
            conditions,
            state,
            json,
            debug,
        } => commands::eval::run(&conditions, &state, json, debug),
        Commands::Standard => commands::standard::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
