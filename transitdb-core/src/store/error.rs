//! Error type for the SQLite-backed session.

use std::error::Error as StdError;

use rusqlite::{Error as SqliteError, ErrorCode};
use thiserror::Error;

use crate::{FilterError, Table};

/// Errors raised by [`Dao`](super::Dao) operations.
#[derive(Debug, Error)]
pub enum DaoError {
    /// The store could not be opened.
    #[error("failed to open store {locator:?}")]
    Connection {
        /// Locator as supplied by the caller.
        locator: String,
        /// Driver error raised while connecting.
        #[source]
        source: SqliteError,
    },
    /// The locator names a scheme the store does not understand.
    #[error("store locator {locator:?} uses unsupported scheme {scheme:?}")]
    UnsupportedScheme {
        /// Locator as supplied by the caller.
        locator: String,
        /// Scheme prefix that was not recognised.
        scheme: String,
    },
    /// The locator has a known scheme but cannot be interpreted.
    #[error("malformed store locator {locator:?}: {reason}")]
    MalformedLocator {
        /// Locator as supplied by the caller.
        locator: String,
        /// What is wrong with the locator.
        reason: &'static str,
    },
    /// Creating or checking the schema failed.
    #[error("failed to execute schema step '{step}'")]
    Schema {
        /// Schema step that failed.
        step: &'static str,
        /// Driver error raised by the step.
        #[source]
        source: SqliteError,
    },
    /// The store was created by an incompatible version.
    #[error("expected store schema version {expected} but found {found}")]
    SchemaVersion {
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the store.
        found: i64,
    },
    /// A filter was rejected while composing a query.
    #[error(transparent)]
    Filter(#[from] FilterError),
    /// Staged data violates a key, reference or hierarchy constraint.
    ///
    /// `table` is unknown when the violation surfaces at commit, where
    /// deferred reference checks run.
    #[error("constraint violated during {operation}")]
    Constraint {
        /// Operation that hit the violation.
        operation: &'static str,
        /// Table being written, when known.
        table: Option<Table>,
        /// Driver error reporting the violation.
        #[source]
        source: SqliteError,
    },
    /// Beginning, writing or ending the unit of work failed.
    #[error("transaction failure during {operation}")]
    Transaction {
        /// Operation that failed.
        operation: &'static str,
        /// Driver error raised by the operation.
        #[source]
        source: SqliteError,
    },
    /// A read statement failed.
    #[error("failed to {operation} from {table}")]
    Query {
        /// Read that failed.
        operation: &'static str,
        /// Table being read.
        table: Table,
        /// Driver error raised by the read.
        #[source]
        source: SqliteError,
    },
    /// A previous flush or commit failed; call `rollback` before reusing the session.
    #[error("session is unusable after a failed write; roll it back first")]
    SessionFailed,
    /// A paged result was iterated again after reporting its end.
    #[error("paged result already exhausted")]
    CursorExhausted,
    /// The offset of the requested page does not fit in memory.
    #[error("page {page} of size {page_size} overflows the result offset")]
    PageOverflow {
        /// Zero-based page index requested.
        page: usize,
        /// Rows per page.
        page_size: usize,
    },
    /// A feed source failed while producing entities.
    #[error("feed source failed while loading {feed_id:?}")]
    Source {
        /// Feed being loaded.
        feed_id: String,
        /// Error reported by the source.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl DaoError {
    /// Classify a failed write: constraint failures are reported as such,
    /// everything else as a transaction failure.
    pub(crate) fn write(operation: &'static str, table: Table, source: SqliteError) -> Self {
        if is_constraint_violation(&source) {
            Self::Constraint {
                operation,
                table: Some(table),
                source,
            }
        } else {
            Self::Transaction { operation, source }
        }
    }

    /// Classify a failed `COMMIT`, where deferred reference checks surface.
    pub(crate) fn commit(source: SqliteError) -> Self {
        if is_constraint_violation(&source) {
            Self::Constraint {
                operation: "commit",
                table: None,
                source,
            }
        } else {
            Self::Transaction {
                operation: "commit",
                source,
            }
        }
    }

    /// Whether the error reports an integrity violation.
    pub const fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint { .. })
    }
}

fn is_constraint_violation(error: &SqliteError) -> bool {
    matches!(
        error,
        SqliteError::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}
