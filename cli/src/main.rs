//! Subtok CLI - Command-line interface for the BPE tokenizer.
//!
//! This is the main entry point for the `subtok` command-line tool.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use commands::{EncodeCommand, InteractiveCommand, RunCommand, TrainCommand};

#[derive(Parser)]
#[command(name = "subtok")]
#[command(about = "Learn BPE merge rules and segment text with them", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn merge rules from text files
    Train(TrainCommand),
    /// Tokenize text with saved merge rules
    Encode(EncodeCommand),
    /// Tokenize lines read from stdin until `q`
    Interactive(InteractiveCommand),
    /// Load or train rules, then start the interactive loop
    Run(RunCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(cmd) => commands::train::run(cmd)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Interactive(cmd) => commands::interactive::run(cmd)?,
        Commands::Run(cmd) => commands::run::run(cmd)?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = match (quiet, verbose) {
        (0, 0) => LevelFilter::Info,
        (0, 1) => LevelFilter::Debug,
        (0, _) => LevelFilter::Trace,
        (1, _) => LevelFilter::Warn,
        _ => LevelFilter::Error,
    };

    // RUST_LOG, when set, wins over the flags
    let mut builder = env_logger::Builder::new();
    builder.format_timestamp_millis();
    builder.filter_level(level);
    builder.parse_default_env();
    let _ = builder.try_init();
}
