//! `feeds` and `delete-feed` subcommands.

use std::io::Write;

use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use transitdb_core::Table;

use crate::{
    ARG_DB, ARG_FEED_ID, CliError, ENV_DELETE_FEED_DB, ENV_DELETE_FEED_ID, ENV_FEEDS_DB,
    open_store, write_line,
};

/// CLI arguments for the `feeds` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "feeds", about = "List the feeds held by a store")]
#[ortho_config(prefix = "TRANSITDB")]
pub(crate) struct FeedsArgs {
    /// Store locator: a file path, `sqlite:///path` or `file://` URI.
    #[arg(long = ARG_DB, value_name = "locator")]
    #[serde(default)]
    pub(crate) db: Option<String>,
}

/// CLI arguments for the `delete-feed` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "delete-feed",
    about = "Delete every row of one feed",
    long_about = "Delete the feed's stop times, trips, calendars, routes, \
                  stops, agencies and metadata, then commit."
)]
#[ortho_config(prefix = "TRANSITDB")]
pub(crate) struct DeleteFeedArgs {
    /// Store locator: a file path, `sqlite:///path` or `file://` URI.
    #[arg(long = ARG_DB, value_name = "locator")]
    #[serde(default)]
    pub(crate) db: Option<String>,
    /// Identifier of the feed to delete.
    #[arg(value_name = "feed-id")]
    #[serde(default)]
    pub(crate) feed_id: Option<String>,
}

/// Resolved `delete-feed` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeleteFeedConfig {
    pub(crate) db: String,
    pub(crate) feed_id: String,
}

impl FeedsArgs {
    pub(crate) fn into_db(self) -> Result<String, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        merged.db.ok_or(CliError::MissingArgument {
            field: ARG_DB,
            env: ENV_FEEDS_DB,
        })
    }
}

impl DeleteFeedArgs {
    pub(crate) fn into_config(self) -> Result<DeleteFeedConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DeleteFeedConfig::try_from(merged)
    }
}

impl TryFrom<DeleteFeedArgs> for DeleteFeedConfig {
    type Error = CliError;

    fn try_from(args: DeleteFeedArgs) -> Result<Self, Self::Error> {
        let db = args.db.ok_or(CliError::MissingArgument {
            field: ARG_DB,
            env: ENV_DELETE_FEED_DB,
        })?;
        let feed_id = args.feed_id.ok_or(CliError::MissingArgument {
            field: ARG_FEED_ID,
            env: ENV_DELETE_FEED_ID,
        })?;
        Ok(Self { db, feed_id })
    }
}

pub(crate) fn run_feeds(
    args: FeedsArgs,
    sql_logging: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let db = args.into_db()?;
    let dao = open_store(&db, sql_logging)?;
    let feeds = dao.feeds().map_err(CliError::store("list feeds", &db))?;
    for feed in feeds {
        let line = match (&feed.feed_publisher_name, &feed.feed_version) {
            (Some(publisher), Some(version)) => {
                format!("{}\t{publisher}\t{version}", feed.feed_id)
            }
            (Some(publisher), None) => format!("{}\t{publisher}", feed.feed_id),
            (None, _) => feed.feed_id,
        };
        write_line(out, &line)?;
    }
    Ok(())
}

pub(crate) fn run_delete_feed(
    args: DeleteFeedArgs,
    sql_logging: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut dao = open_store(&config.db, sql_logging)?;
    let deleted = dao
        .delete_feed(&config.feed_id)
        .map_err(CliError::store("delete the feed", &config.db))?;
    dao.commit()
        .map_err(CliError::store("commit the deletion", &config.db))?;
    info!("deleted feed {} from {}", config.feed_id, config.db);

    write_line(
        out,
        &format!("deleted feed {}: {} rows", config.feed_id, deleted.total()),
    )?;
    for table in Table::ALL {
        let count = deleted.count(table);
        if count > 0 {
            write_line(out, &format!("  {}: {count}", table.sql_name()))?;
        }
    }
    Ok(())
}
