//! Key lookups and list operations.

use chrono::NaiveDate;
use rusqlite::{OptionalExtension, ToSql, named_params, params_from_iter};

use crate::{
    Agency, AgencyQuery, Calendar, CalendarDate, CalendarPrefetch, CalendarQuery, FeedInfo,
    Filter, LoadedAgency, LoadedCalendar, LoadedRoute, LoadedStop, LoadedStopTime, LoadedTrip,
    Route, RouteQuery, Stop, StopQuery, StopTimeQuery, Table, Trip, TripQuery,
};

use super::{
    Dao, DaoError, Rows,
    compose::Select,
    mapping::{Record, select_by_key_sql},
};

/// The direct filter of a list operation may reach any table.
const ANY_TABLE: &[Table] = &Table::ALL;
const TRIP_SCOPE: &[Table] = &[Table::Trip];
const ROUTE_SCOPE: &[Table] = &[Table::Route];
const STOP_TIME_SCOPE: &[Table] = &[Table::StopTime];
const CALENDAR_SCOPE: &[Table] = &[Table::Calendar, Table::CalendarDate];
const ZONE_SCOPE: &[Table] = &[Table::Stop];

impl Dao {
    fn get<R: Record>(&self, key: &[(&str, &dyn ToSql)]) -> Result<Option<R>, DaoError> {
        self.ensure_usable()?;
        let query_error = |source: rusqlite::Error| DaoError::Query {
            operation: "look up row",
            table: R::TABLE,
            source,
        };
        let mut statement = self
            .connection
            .prepare_cached(&select_by_key_sql(R::TABLE))
            .map_err(query_error)?;
        self.record_statement();
        statement
            .query_row(key, R::from_row)
            .optional()
            .map_err(query_error)
    }

    /// Metadata of one feed.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn feed(&self, feed_id: &str) -> Result<Option<FeedInfo>, DaoError> {
        self.get(named_params! { ":feed_id": feed_id })
    }

    /// Every stored feed, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn feeds(&self) -> Result<Vec<FeedInfo>, DaoError> {
        self.select_rows(&Select::new(Table::FeedInfo), None)
    }

    /// Look up one agency by key.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn agency(&self, feed_id: &str, agency_id: &str) -> Result<Option<Agency>, DaoError> {
        self.get(named_params! { ":feed_id": feed_id, ":agency_id": agency_id })
    }

    /// Agencies matching the query, in key order.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Filter`] when a filter names an unknown column or
    /// reaches a table its parameter cannot join to, and [`DaoError::Query`]
    /// when the read fails.
    pub fn agencies(&self, query: &AgencyQuery) -> Result<Vec<LoadedAgency>, DaoError> {
        let mut select = Select::new(Table::Agency);
        select.filter("filter", query.filter.as_ref(), ANY_TABLE)?;
        let prefetch = query.prefetch;
        self.list(select, 0, move |dao, rows| dao.load_agencies(rows, prefetch))?
            .into_vec()
    }

    /// Look up one stop by key.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn stop(&self, feed_id: &str, stop_id: &str) -> Result<Option<Stop>, DaoError> {
        self.get(named_params! { ":feed_id": feed_id, ":stop_id": stop_id })
    }

    /// Stops matching the query.
    ///
    /// `trip_filter` and `calendar_filter` restrict to stops called at by a
    /// matching trip; `zone` restricts to an inclusive coordinate rectangle.
    /// Paged when `page_size` is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Filter`] when a filter names an unknown column or
    /// reaches a table its parameter cannot join to, and [`DaoError::Query`]
    /// when the read fails.
    ///
    /// # Examples
    /// ```
    /// use transitdb_core::{Dao, FeedInfo, Stop, StopQuery, Zone};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut dao = Dao::open("")?;
    /// dao.add(FeedInfo::new("demo"));
    /// dao.add(Stop::new("demo", "S", "Central", 45.0, 2.0));
    /// dao.add(Stop::new("demo", "T", "Terminus", 46.5, 4.0));
    /// dao.add(Stop::new("demo", "U", "Upstream", 44.5, 1.5));
    /// dao.commit()?;
    ///
    /// let query = StopQuery::new().zone(Zone::new(44.0, 46.0, 1.0, 3.0)?);
    /// let ids: Vec<String> = dao
    ///     .stops(&query)?
    ///     .into_vec()?
    ///     .into_iter()
    ///     .map(|loaded| loaded.stop.stop_id)
    ///     .collect();
    /// assert_eq!(ids, ["S", "U"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn stops(&self, query: &StopQuery) -> Result<Rows<'_, LoadedStop>, DaoError> {
        let zone = query.zone.as_ref().map(crate::Zone::to_filter);
        let mut select = Select::new(Table::Stop);
        select
            .filter("filter", query.filter.as_ref(), ANY_TABLE)?
            .filter("trip_filter", query.trip_filter.as_ref(), TRIP_SCOPE)?
            .filter("calendar_filter", query.calendar_filter.as_ref(), CALENDAR_SCOPE)?
            .filter("zone", zone.as_ref(), ZONE_SCOPE)?;
        let prefetch = query.prefetch;
        self.list(select, query.page_size, move |dao, rows| {
            dao.load_stops(rows, prefetch)
        })
    }

    /// Look up one route by key.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn route(&self, feed_id: &str, route_id: &str) -> Result<Option<Route>, DaoError> {
        self.get(named_params! { ":feed_id": feed_id, ":route_id": route_id })
    }

    /// Routes matching the query, in key order.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Filter`] when a filter names an unknown column or
    /// reaches a table its parameter cannot join to, and [`DaoError::Query`]
    /// when the read fails.
    pub fn routes(&self, query: &RouteQuery) -> Result<Vec<LoadedRoute>, DaoError> {
        let mut select = Select::new(Table::Route);
        select
            .filter("filter", query.filter.as_ref(), ANY_TABLE)?
            .filter("trip_filter", query.trip_filter.as_ref(), TRIP_SCOPE)?
            .filter("stoptime_filter", query.stoptime_filter.as_ref(), STOP_TIME_SCOPE)?
            .filter("calendar_filter", query.calendar_filter.as_ref(), CALENDAR_SCOPE)?;
        let prefetch = query.prefetch;
        self.list(select, 0, move |dao, rows| dao.load_routes(rows, prefetch))?
            .into_vec()
    }

    /// Look up one calendar by key.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn calendar(&self, feed_id: &str, service_id: &str) -> Result<Option<Calendar>, DaoError> {
        self.get(named_params! { ":feed_id": feed_id, ":service_id": service_id })
    }

    /// Calendars matching the query, in key order.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Filter`] when a filter names an unknown column or
    /// reaches a table its parameter cannot join to, and [`DaoError::Query`]
    /// when the read fails.
    pub fn calendars(&self, query: &CalendarQuery) -> Result<Vec<LoadedCalendar>, DaoError> {
        let mut select = Select::new(Table::Calendar);
        select.filter("filter", query.filter.as_ref(), ANY_TABLE)?;
        let prefetch: CalendarPrefetch = query.prefetch;
        self.list(select, 0, move |dao, rows| dao.load_calendars(rows, prefetch))?
            .into_vec()
    }

    /// Calendar dates matching `filter`, in key order.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Filter`] when a filter names an unknown column or
    /// reaches a table its parameter cannot join to, and [`DaoError::Query`]
    /// when the read fails.
    pub fn calendar_dates(&self, filter: Option<&Filter>) -> Result<Vec<CalendarDate>, DaoError> {
        let mut select = Select::new(Table::CalendarDate);
        select.filter("filter", filter, ANY_TABLE)?;
        self.select_rows(&select, None)
    }

    /// Distinct service dates matching `filter`, earliest first.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Filter`] when a filter names an unknown column or
    /// reaches a table its parameter cannot join to, and [`DaoError::Query`]
    /// when the read fails.
    pub fn service_dates(&self, filter: Option<&Filter>) -> Result<Vec<NaiveDate>, DaoError> {
        self.ensure_usable()?;
        let mut select = Select::new(Table::CalendarDate);
        select.filter("filter", filter, ANY_TABLE)?;
        let sql = select.distinct().sql_with(
            "calendar_dates.date AS date",
            "calendar_dates.date",
            None,
        );
        let query_error = |source: rusqlite::Error| DaoError::Query {
            operation: "list service dates",
            table: Table::CalendarDate,
            source,
        };
        let mut statement = self.connection.prepare_cached(&sql).map_err(query_error)?;
        self.record_statement();
        let dates = statement
            .query_map(params_from_iter(select.params()), |row| row.get("date"))
            .map_err(query_error)?;
        dates.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    /// Look up one trip by key.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn trip(&self, feed_id: &str, trip_id: &str) -> Result<Option<Trip>, DaoError> {
        self.get(named_params! { ":feed_id": feed_id, ":trip_id": trip_id })
    }

    /// Trips matching the query. Paged when `page_size` is non-zero.
    ///
    /// The direct filter and each axis filter combine conjunctively.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Filter`] when a filter names an unknown column or
    /// reaches a table its parameter cannot join to, and [`DaoError::Query`]
    /// when the read fails.
    pub fn trips(&self, query: &TripQuery) -> Result<Rows<'_, LoadedTrip>, DaoError> {
        let mut select = Select::new(Table::Trip);
        select
            .filter("filter", query.filter.as_ref(), ANY_TABLE)?
            .filter("calendar_filter", query.calendar_filter.as_ref(), CALENDAR_SCOPE)?
            .filter("stoptime_filter", query.stoptime_filter.as_ref(), STOP_TIME_SCOPE)?
            .filter("route_filter", query.route_filter.as_ref(), ROUTE_SCOPE)?;
        let prefetch = query.prefetch;
        self.list(select, query.page_size, move |dao, rows| {
            dao.load_trips(rows, prefetch)
        })
    }

    /// Stop times matching the query, ordered by trip then sequence.
    /// Paged when `page_size` is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Filter`] when a filter names an unknown column or
    /// reaches a table its parameter cannot join to, and [`DaoError::Query`]
    /// when the read fails.
    pub fn stoptimes(&self, query: &StopTimeQuery) -> Result<Rows<'_, LoadedStopTime>, DaoError> {
        let mut select = Select::new(Table::StopTime);
        select
            .filter("filter", query.filter.as_ref(), ANY_TABLE)?
            .filter("trip_filter", query.trip_filter.as_ref(), TRIP_SCOPE)?
            .filter("route_filter", query.route_filter.as_ref(), ROUTE_SCOPE)?
            .filter("calendar_filter", query.calendar_filter.as_ref(), CALENDAR_SCOPE)?;
        let prefetch = query.prefetch;
        self.list(select, query.page_size, move |dao, rows| {
            dao.load_stop_times(rows, prefetch)
        })
    }
}
