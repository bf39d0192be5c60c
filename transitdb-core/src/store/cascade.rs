//! Whole-feed deletion.

use log::{debug, info};

use crate::Table;

use super::{Dao, DaoError};

/// Leaf tables first, so no reference dangles between statements.
const CASCADE_ORDER: [Table; 8] = [
    Table::StopTime,
    Table::Trip,
    Table::CalendarDate,
    Table::Calendar,
    Table::Route,
    Table::Stop,
    Table::Agency,
    Table::FeedInfo,
];

/// Rows removed from each table by [`Dao::delete_feed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletedRows {
    /// Rows removed from `stop_times`.
    pub stop_times: usize,
    /// Rows removed from `trips`.
    pub trips: usize,
    /// Rows removed from `calendar_dates`.
    pub calendar_dates: usize,
    /// Rows removed from `calendar`.
    pub calendars: usize,
    /// Rows removed from `routes`.
    pub routes: usize,
    /// Rows removed from `stops`.
    pub stops: usize,
    /// Rows removed from `agency`.
    pub agencies: usize,
    /// Rows removed from `feed_info`; one when the feed existed.
    pub feed_info: usize,
}

impl DeletedRows {
    /// Rows removed from `table`.
    pub const fn count(&self, table: Table) -> usize {
        match table {
            Table::StopTime => self.stop_times,
            Table::Trip => self.trips,
            Table::CalendarDate => self.calendar_dates,
            Table::Calendar => self.calendars,
            Table::Route => self.routes,
            Table::Stop => self.stops,
            Table::Agency => self.agencies,
            Table::FeedInfo => self.feed_info,
        }
    }

    /// Rows removed across every table.
    pub fn total(&self) -> usize {
        CASCADE_ORDER.iter().map(|table| self.count(*table)).sum()
    }

    fn record(&mut self, table: Table, rows: usize) {
        let slot = match table {
            Table::StopTime => &mut self.stop_times,
            Table::Trip => &mut self.trips,
            Table::CalendarDate => &mut self.calendar_dates,
            Table::Calendar => &mut self.calendars,
            Table::Route => &mut self.routes,
            Table::Stop => &mut self.stops,
            Table::Agency => &mut self.agencies,
            Table::FeedInfo => &mut self.feed_info,
        };
        *slot = rows;
    }
}

impl Dao {
    /// Delete every row of `feed_id` with one bulk statement per table.
    ///
    /// Staged work is flushed first. The deletes run inside the unit of work
    /// and are not committed; call [`Dao::commit`] to keep them or
    /// [`Dao::rollback`] to restore the feed. Entity values obtained earlier
    /// remain readable but describe rows that no longer exist.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::SessionFailed`] after an earlier failure, any
    /// error raised while flushing staged work, and [`DaoError::Constraint`]
    /// or [`DaoError::Transaction`] when a delete is rejected. A failed
    /// delete marks the session failed.
    ///
    /// # Examples
    /// ```
    /// use transitdb_core::{Dao, FeedInfo, Stop};
    ///
    /// # fn main() -> Result<(), transitdb_core::DaoError> {
    /// let mut dao = Dao::open("")?;
    /// for feed_id in ["old", "new"] {
    ///     dao.add(FeedInfo::new(feed_id));
    ///     dao.add(Stop::new(feed_id, "S", "Central", 45.0, 2.0));
    /// }
    /// dao.commit()?;
    ///
    /// let deleted = dao.delete_feed("old")?;
    /// dao.commit()?;
    ///
    /// assert_eq!((deleted.feed_info, deleted.stops), (1, 1));
    /// assert!(dao.feed("old")?.is_none());
    /// assert!(dao.feed("new")?.is_some());
    /// # Ok(())
    /// # }
    /// ```
    pub fn delete_feed(&mut self, feed_id: &str) -> Result<DeletedRows, DaoError> {
        self.flush()?;
        if let Err(error) = self.begin("begin cascade delete") {
            self.unit.mark_failed();
            return Err(error);
        }

        let mut deleted = DeletedRows::default();
        for table in CASCADE_ORDER {
            let sql = format!("DELETE FROM {} WHERE feed_id = ?1", table.sql_name());
            self.record_statement();
            let rows = self
                .connection
                .prepare_cached(&sql)
                .and_then(|mut statement| statement.execute([feed_id]));
            match rows {
                Ok(rows) => {
                    debug!("deleted {rows} rows from {table} of feed {feed_id}");
                    deleted.record(table, rows);
                }
                Err(source) => {
                    self.unit.mark_failed();
                    return Err(DaoError::write("cascade delete", table, source));
                }
            }
        }
        info!("deleted feed {feed_id}: {} rows", deleted.total());
        Ok(deleted)
    }
}
