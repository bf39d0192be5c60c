//! Command-line interface for transitdb feed stores.
//!
//! Every subcommand takes its store locator from `--db`, a configuration
//! file or the `TRANSITDB_CMDS_<SUBCOMMAND>_DB` environment variable, with
//! the command line taking precedence.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use log::debug;
use transitdb_core::{Dao, DaoOptions};

mod error;
mod frequencies;
mod store;

pub use error::CliError;

use frequencies::{FrequenciesArgs, run_frequencies};
use store::{DeleteFeedArgs, FeedsArgs, run_delete_feed, run_feeds};

pub(crate) const ARG_DB: &str = "db";
pub(crate) const ARG_FEED_ID: &str = "feed-id";
pub(crate) const ENV_FEEDS_DB: &str = "TRANSITDB_CMDS_FEEDS_DB";
pub(crate) const ENV_DELETE_FEED_DB: &str = "TRANSITDB_CMDS_DELETE_FEED_DB";
pub(crate) const ENV_DELETE_FEED_ID: &str = "TRANSITDB_CMDS_DELETE_FEED_FEED_ID";
pub(crate) const ENV_FREQUENCIES_DB: &str = "TRANSITDB_CMDS_FREQUENCIES_DB";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration loading, the
/// store or writing to standard output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    let mut stdout = std::io::stdout().lock();
    dispatch(cli, &mut stdout)
}

/// Run the CLI with explicit arguments, writing results to `out`.
///
/// # Errors
///
/// Fails for the same reasons as [`run`].
pub fn run_from<I, T>(argv: I, out: &mut dyn Write) -> Result<(), CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(argv).map_err(CliError::ArgumentParsing)?;
    dispatch(cli, out)
}

fn dispatch(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let sql_logging = cli.verbose >= 2;
    match cli.command {
        Command::Feeds(args) => run_feeds(args, sql_logging, out),
        Command::DeleteFeed(args) => run_delete_feed(args, sql_logging, out),
        Command::Frequencies(args) => run_frequencies(args, sql_logging, out),
    }
}

/// `-v` enables info, `-vv` debug including every SQL statement, `-vvv`
/// trace. `RUST_LOG` overrides the default.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    if let Err(err) = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init()
    {
        debug!("logger already installed: {err}");
    }
}

pub(crate) fn open_store(db: &str, sql_logging: bool) -> Result<Dao, CliError> {
    Dao::open_with(&DaoOptions::new(db).with_sql_logging(sql_logging))
        .map_err(CliError::store("open the store", db))
}

pub(crate) fn write_line(out: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writeln!(out, "{line}").map_err(CliError::WriteOutput)
}

#[derive(Debug, Parser)]
#[command(
    name = "transitdb",
    about = "Inspect and maintain transit feed stores",
    version
)]
struct Cli {
    /// Increase log verbosity; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the feeds held by a store.
    Feeds(FeedsArgs),
    /// Delete every row of one feed and commit.
    DeleteFeed(DeleteFeedArgs),
    /// Report departure frequencies per stop or station.
    Frequencies(FrequenciesArgs),
}

#[cfg(test)]
mod tests;
