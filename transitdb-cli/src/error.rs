//! Error types emitted by the transitdb CLI.

use std::sync::Arc;

use thiserror::Error;
use transitdb_analysis::FrequencyError;
use transitdb_core::{DaoError, FilterError};

/// Errors emitted by the transitdb CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long option name without dashes.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A `--where` condition is not of the form `Table.column=value`.
    #[error("malformed condition {condition:?}; expected Table.column=value")]
    MalformedCondition {
        /// Condition as given on the command line.
        condition: String,
    },
    /// A `--where` condition names an unknown table or column.
    #[error("invalid condition {condition:?}: {source}")]
    InvalidCondition {
        /// Condition as given on the command line.
        condition: String,
        /// Why the column path was rejected.
        #[source]
        source: FilterError,
    },
    /// Opening or using the store failed.
    #[error("failed to {action} in {db:?}: {source}")]
    Store {
        /// What the command was doing.
        action: &'static str,
        /// Store locator in use.
        db: String,
        /// Underlying store error.
        #[source]
        source: DaoError,
    },
    /// Computing frequencies failed.
    #[error(transparent)]
    Frequencies(#[from] FrequencyError),
    /// Writing to standard output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    pub(crate) fn store(action: &'static str, db: &str) -> impl FnOnce(DaoError) -> Self {
        let db = db.to_owned();
        move |source| Self::Store { action, db, source }
    }
}
