//! `sqlset`: validate and inspect a directory of query files.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use sqlset::{Directory, Loader, SqlSet};
use sqlset_config::Settings;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::error::{ErrorKind, Result};

#[derive(Debug, Parser)]
#[command(name = "sqlset", version, about = "Validate and inspect SQL query files")]
struct Cli {
    /// Configuration file, merged over the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory of query files, overriding the configured one.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
    /// Log what is being loaded.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load every query file and report problems.
    Check,
    /// List query sets and their metadata.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print the SQL of one query.
    Get { set: String, query: String },
}

fn install_subscriber(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Only fails if a subscriber is already installed.
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init().ok();
}

fn load(cli: &Cli) -> Result<SqlSet> {
    let mut settings = Settings::load(cli.config.as_deref()).map_err(|err| err.raise(ErrorKind::Config))?;
    if let Some(dir) = &cli.dir {
        settings.directory = dir.clone();
    }
    tracing::debug!(directory = %settings.directory.display(), "Loading query sets");
    Loader::new(settings.load_options())
        .load(&Directory::new(&settings.directory))
        .map_err(|err| err.raise(ErrorKind::Load))
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let sqlset = load(cli)?;
    match &cli.command {
        Command::Check => commands::check(&sqlset, out),
        Command::List { json } => commands::list(&sqlset, *json, out),
        Command::Get { set, query } => commands::get(&sqlset, set, query, out),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_subscriber(cli.verbose);
    match run(&cli, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        },
    }
}
