//! SQLite-backed session over a feed store.
//!
//! A [`Dao`] owns one connection and one unit of work. Writes are staged with
//! [`Dao::add`] and [`Dao::delete`], sent by [`Dao::flush`] inside a
//! transaction and made durable by [`Dao::commit`]. Reads see flushed rows of
//! the open transaction but never trigger a flush themselves.
//!
//! A failed flush or commit poisons the session: every later store operation
//! returns [`DaoError::SessionFailed`] until [`Dao::rollback`] discards the
//! transaction together with the staged work.

use std::{cell::Cell, fmt};

use log::{debug, info};
use rusqlite::{Connection, Params, params_from_iter};

use crate::{Entity, FeedSource};

mod cascade;
mod compose;
mod eager;
mod error;
mod locator;
mod mapping;
mod navigate;
mod paging;
mod read;
mod schema;
mod session;

#[cfg(test)]
mod tests;

pub use cascade::DeletedRows;
pub use error::DaoError;
pub use locator::StoreLocator;
pub use paging::{PagedRows, Rows, RowsIter};
pub use schema::SCHEMA_VERSION;

use compose::{Select, Window};
use mapping::Record;
use session::UnitOfWork;

/// Target receiving every SQL statement when statement logging is enabled.
pub const SQL_LOG_TARGET: &str = "transitdb::sql";

/// Options for [`Dao::open_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaoOptions {
    /// Store locator; see [`StoreLocator`] for the accepted forms.
    pub locator: String,
    /// Log every SQL statement at debug level under [`SQL_LOG_TARGET`].
    pub sql_logging: bool,
}

impl DaoOptions {
    /// Options for `locator` with SQL logging off.
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            sql_logging: false,
        }
    }

    /// Enable or disable per-statement SQL logging.
    #[must_use]
    pub const fn with_sql_logging(mut self, enabled: bool) -> Self {
        self.sql_logging = enabled;
        self
    }
}

fn log_statement(sql: &str) {
    debug!(target: SQL_LOG_TARGET, "{sql}");
}

/// Session over one feed store.
///
/// # Examples
/// ```
/// use transitdb_core::{Dao, FeedInfo, TripQuery};
///
/// # fn main() -> Result<(), transitdb_core::DaoError> {
/// let mut dao = Dao::open("")?;
/// dao.add(FeedInfo::new("paris"));
/// dao.commit()?;
///
/// assert_eq!(dao.feeds()?.len(), 1);
/// assert!(dao.trips(&TripQuery::new())?.into_vec()?.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct Dao {
    connection: Connection,
    locator: StoreLocator,
    unit: UnitOfWork,
    statements: Cell<u64>,
}

impl fmt::Debug for Dao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dao")
            .field("locator", &self.locator)
            .field("staged", &self.unit.staged())
            .field("failed", &self.unit.is_failed())
            .field("statements", &self.statements.get())
            .finish_non_exhaustive()
    }
}

impl Dao {
    /// Open the store at `locator`, creating the schema when missing.
    ///
    /// # Errors
    ///
    /// Fails when the locator is malformed or names an unsupported scheme,
    /// when the database cannot be opened, or when its schema version does not
    /// match [`SCHEMA_VERSION`].
    pub fn open(locator: &str) -> Result<Self, DaoError> {
        Self::open_with(&DaoOptions::new(locator))
    }

    /// Open a store with explicit options.
    ///
    /// # Errors
    ///
    /// As for [`Dao::open`].
    pub fn open_with(options: &DaoOptions) -> Result<Self, DaoError> {
        let locator = StoreLocator::parse(&options.locator)?;
        let mut connection = locator
            .connect()
            .map_err(|source| DaoError::Connection {
                locator: options.locator.clone(),
                source,
            })?;
        if options.sql_logging {
            connection.trace(Some(log_statement as fn(&str)));
        }
        schema::initialise_schema(&mut connection)?;
        info!("opened feed store {locator}");

        Ok(Self {
            connection,
            locator,
            unit: UnitOfWork::default(),
            statements: Cell::new(0),
        })
    }

    /// Where the store lives.
    pub const fn locator(&self) -> &StoreLocator {
        &self.locator
    }

    /// Stage one entity for insertion.
    pub fn add(&mut self, entity: impl Into<Entity>) {
        self.unit.stage_insert(entity.into());
    }

    /// Stage many entities for insertion.
    pub fn add_all<I>(&mut self, entities: I)
    where
        I: IntoIterator,
        I::Item: Into<Entity>,
    {
        for entity in entities {
            self.add(entity);
        }
    }

    /// Stage the deletion of the row keyed like `entity`.
    pub fn delete(&mut self, entity: impl Into<Entity>) {
        self.unit.stage_delete(entity.into());
    }

    /// Number of operations waiting for the next flush.
    pub fn staged(&self) -> usize {
        self.unit.staged()
    }

    /// Whether a failed write left the session waiting for [`Dao::rollback`].
    pub const fn is_failed(&self) -> bool {
        self.unit.is_failed()
    }

    /// Statements sent to the store since the session was opened.
    pub fn statement_count(&self) -> u64 {
        self.statements.get()
    }

    /// Send staged work to the store without ending the transaction.
    ///
    /// Inserts run parents first and deletes children first. Key violations
    /// surface here; reference violations surface at [`Dao::commit`].
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::SessionFailed`] after an earlier failure, and
    /// [`DaoError::Constraint`] or [`DaoError::Transaction`] when a statement
    /// is rejected. Either failure marks the session failed.
    pub fn flush(&mut self) -> Result<(), DaoError> {
        self.ensure_usable()?;
        if self.unit.is_empty() {
            return Ok(());
        }
        let inserts = self.unit.take_inserts();
        let deletes = self.unit.take_deletes();
        let outcome = self
            .begin("begin unit of work")
            .and_then(|()| self.write_staged(&inserts, &deletes));
        if outcome.is_err() {
            self.unit.mark_failed();
        }
        outcome
    }

    /// Flush and make the unit of work durable.
    ///
    /// # Errors
    ///
    /// As for [`Dao::flush`], plus [`DaoError::Constraint`] with no table when
    /// a deferred reference check fails at commit.
    pub fn commit(&mut self) -> Result<(), DaoError> {
        self.flush()?;
        if self.connection.is_autocommit() {
            return Ok(());
        }
        let outcome = self.connection.execute_batch("COMMIT");
        self.record_statement();
        outcome.map_err(|source| {
            self.unit.mark_failed();
            DaoError::commit(source)
        })
    }

    /// Discard the open transaction and every staged operation.
    ///
    /// This is the only way out of a failed session.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Transaction`] when SQLite refuses the rollback.
    /// The staged work is discarded regardless.
    pub fn rollback(&mut self) -> Result<(), DaoError> {
        self.unit.reset();
        if self.connection.is_autocommit() {
            return Ok(());
        }
        self.record_statement();
        self.connection
            .execute_batch("ROLLBACK")
            .map_err(|source| DaoError::Transaction {
                operation: "rollback",
                source,
            })
    }

    /// Stage every entity `source` produces for `feed_id` and commit them.
    ///
    /// Nothing is staged when the source fails. Returns the entity count.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Source`] when the source fails, leaving nothing
    /// staged, or any error of [`Dao::commit`].
    pub fn load_feed<S: FeedSource>(&mut self, source: &S, feed_id: &str) -> Result<usize, DaoError> {
        let entities = source
            .entities(feed_id)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| DaoError::Source {
                feed_id: feed_id.to_owned(),
                source: Box::new(source),
            })?;
        let count = entities.len();
        self.add_all(entities);
        self.commit()?;
        info!("loaded {count} entities into feed {feed_id}");
        Ok(count)
    }

    pub(crate) fn ensure_usable(&self) -> Result<(), DaoError> {
        if self.unit.is_failed() {
            Err(DaoError::SessionFailed)
        } else {
            Ok(())
        }
    }

    fn record_statement(&self) {
        self.statements.set(self.statements.get() + 1);
    }

    fn begin(&self, operation: &'static str) -> Result<(), DaoError> {
        if self.connection.is_autocommit() {
            self.record_statement();
            self.connection
                .execute_batch("BEGIN")
                .map_err(|source| DaoError::Transaction { operation, source })?;
        }
        Ok(())
    }

    fn write_staged(&self, inserts: &[Entity], deletes: &[Entity]) -> Result<(), DaoError> {
        for entity in inserts {
            self.record_statement();
            mapping::insert_entity(&self.connection, entity)
                .map_err(|source| DaoError::write("insert", entity.table(), source))?;
        }
        for entity in deletes {
            self.record_statement();
            mapping::delete_entity(&self.connection, entity)
                .map_err(|source| DaoError::write("delete", entity.table(), source))?;
        }
        debug!(
            "flushed {} inserts and {} deletes",
            inserts.len(),
            deletes.len()
        );
        Ok(())
    }

    /// Run `sql` and decode every row as `R`.
    fn query_records<R: Record, P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> Result<Vec<R>, DaoError> {
        self.ensure_usable()?;
        let query_error = |source: rusqlite::Error| DaoError::Query {
            operation,
            table: R::TABLE,
            source,
        };
        let mut statement = self.connection.prepare_cached(sql).map_err(query_error)?;
        self.record_statement();
        let rows = statement
            .query_map(params, R::from_row)
            .map_err(query_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    fn select_rows<R: Record>(
        &self,
        select: &Select,
        window: Option<Window>,
    ) -> Result<Vec<R>, DaoError> {
        self.query_records(
            "list rows",
            &select.sql(window),
            params_from_iter(select.params()),
        )
    }

    /// Materialise or page a composed select, running `load` on every window.
    fn list<'dao, R, L, F>(
        &'dao self,
        select: Select,
        page_size: usize,
        load: F,
    ) -> Result<Rows<'dao, L>, DaoError>
    where
        R: Record + 'dao,
        L: 'dao,
        F: Fn(&'dao Self, Vec<R>) -> Result<Vec<L>, DaoError> + 'dao,
    {
        self.ensure_usable()?;
        if page_size == 0 {
            let rows = self.select_rows::<R>(&select, None)?;
            return load(self, rows).map(Rows::Materialized);
        }
        debug!("paging {} in windows of {page_size}", select.root());
        let fetch = move |window: Window| {
            let rows = self.select_rows::<R>(&select, Some(window))?;
            load(self, rows)
        };
        Ok(Rows::Paged(PagedRows::new(page_size, Box::new(fetch))))
    }
}
