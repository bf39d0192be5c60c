//! Materialised and windowed query results.
//!
//! A paged result fetches `LIMIT n OFFSET k*n` windows strictly in order,
//! one at a time, and stops after the first window holding fewer than `n`
//! rows. Only the current window and the rows prefetched for it are held in
//! memory. Dropping the result early fetches nothing further.

use std::{fmt, mem, vec};

use log::debug;

use super::{DaoError, compose::Window};

/// Fetches one window and runs the prefetches for its rows.
pub(crate) type FetchWindow<'dao, T> = Box<dyn FnMut(Window) -> Result<Vec<T>, DaoError> + 'dao>;

/// Result of a list operation.
///
/// A page size of zero yields [`Rows::Materialized`]; anything larger yields
/// a single-pass [`Rows::Paged`] cursor borrowing the session.
pub enum Rows<'dao, T> {
    /// Every row, fetched up front. Restartable by cloning.
    Materialized(Vec<T>),
    /// Rows fetched window by window.
    Paged(PagedRows<'dao, T>),
}

impl<'dao, T> Rows<'dao, T> {
    /// Collect every row, fetching the remaining windows of a paged result.
    ///
    /// # Errors
    ///
    /// Returns the first [`DaoError`] raised while fetching a window.
    pub fn into_vec(self) -> Result<Vec<T>, DaoError> {
        match self {
            Self::Materialized(rows) => Ok(rows),
            Self::Paged(pages) => pages.collect(),
        }
    }

    /// Whether rows are fetched lazily.
    pub const fn is_paged(&self) -> bool {
        matches!(self, Self::Paged(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for Rows<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Materialized(rows) => f.debug_tuple("Materialized").field(rows).finish(),
            Self::Paged(pages) => f.debug_tuple("Paged").field(pages).finish(),
        }
    }
}

impl<'dao, T> IntoIterator for Rows<'dao, T> {
    type Item = Result<T, DaoError>;
    type IntoIter = RowsIter<'dao, T>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Self::Materialized(rows) => RowsIter::Materialized(rows.into_iter()),
            Self::Paged(pages) => RowsIter::Paged(pages),
        }
    }
}

/// Iterator over [`Rows`].
pub enum RowsIter<'dao, T> {
    /// Draining a materialised result.
    Materialized(vec::IntoIter<T>),
    /// Walking a paged cursor.
    Paged(PagedRows<'dao, T>),
}

impl<T> Iterator for RowsIter<'_, T> {
    type Item = Result<T, DaoError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Materialized(rows) => rows.next().map(Ok),
            Self::Paged(pages) => pages.next(),
        }
    }
}

enum Cursor<T> {
    /// The next window to request.
    Fetching { page: usize },
    /// Rows of the current window; `next_page` is `None` after a short window.
    Draining {
        rows: vec::IntoIter<T>,
        next_page: Option<usize>,
    },
    /// The end has been reached but not yet reported.
    Finished,
    /// The end has been reported.
    Exhausted,
}

/// Lazily fetched, single-pass sequence of rows.
///
/// After yielding `None` once, every further call to `next` yields
/// `Some(Err(DaoError::CursorExhausted))`. A failed window ends the sequence.
pub struct PagedRows<'dao, T> {
    page_size: usize,
    fetch: FetchWindow<'dao, T>,
    cursor: Cursor<T>,
}

impl<'dao, T> PagedRows<'dao, T> {
    pub(crate) fn new(page_size: usize, fetch: FetchWindow<'dao, T>) -> Self {
        Self {
            page_size,
            fetch,
            cursor: Cursor::Fetching { page: 0 },
        }
    }

    /// Rows requested per window.
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether the end of the sequence has been reported.
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.cursor, Cursor::Exhausted)
    }

    fn fetch_page(&mut self, page: usize) -> Result<Cursor<T>, DaoError> {
        let offset = page
            .checked_mul(self.page_size)
            .ok_or(DaoError::PageOverflow {
                page,
                page_size: self.page_size,
            })?;
        let rows = (self.fetch)(Window {
            limit: self.page_size,
            offset,
        })?;
        debug!("fetched page {page} with {} rows", rows.len());
        let next_page = (rows.len() >= self.page_size).then_some(page + 1);
        Ok(Cursor::Draining {
            rows: rows.into_iter(),
            next_page,
        })
    }
}

impl<T> Iterator for PagedRows<'_, T> {
    type Item = Result<T, DaoError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match mem::replace(&mut self.cursor, Cursor::Exhausted) {
                Cursor::Fetching { page } => match self.fetch_page(page) {
                    Ok(cursor) => self.cursor = cursor,
                    Err(error) => {
                        self.cursor = Cursor::Finished;
                        return Some(Err(error));
                    }
                },
                Cursor::Draining {
                    mut rows,
                    next_page,
                } => {
                    if let Some(row) = rows.next() {
                        self.cursor = Cursor::Draining { rows, next_page };
                        return Some(Ok(row));
                    }
                    self.cursor = next_page.map_or(Cursor::Finished, |page| Cursor::Fetching {
                        page,
                    });
                }
                Cursor::Finished => return None,
                Cursor::Exhausted => return Some(Err(DaoError::CursorExhausted)),
            }
        }
    }
}

impl<T> fmt::Debug for PagedRows<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.cursor {
            Cursor::Fetching { page } => format!("fetching page {page}"),
            Cursor::Draining { rows, .. } => format!("{} rows buffered", rows.len()),
            Cursor::Finished => "finished".to_owned(),
            Cursor::Exhausted => "exhausted".to_owned(),
        };
        f.debug_struct("PagedRows")
            .field("page_size", &self.page_size)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}
