//! Facade crate for transitdb, a store of public transit feeds.
//!
//! This crate re-exports the feed model and the SQLite-backed session from
//! `transitdb-core`, and the frequency analysis behind the `analysis`
//! feature.

#![forbid(unsafe_code)]

pub use transitdb_core::{
    Agency, AgencyPrefetch, AgencyQuery, Calendar, CalendarDate, CalendarPrefetch, CalendarQuery,
    Column, Comparison, Entity, FeedInfo, FeedSource, Filter, FilterError, LoadedAgency,
    LoadedCalendar, LoadedRoute, LoadedStop, LoadedStopTime, LoadedTrip, LocationType, Related,
    Route, RoutePrefetch, RouteQuery, RouteType, StaticFeed, Stop, StopPrefetch, StopQuery,
    StopTime, StopTimePrefetch, StopTimeQuery, Table, Trip, TripPrefetch, TripQuery, UnknownTable,
    Value, Zone, ZoneError,
};

#[cfg(feature = "store-sqlite")]
pub use transitdb_core::{
    Dao, DaoError, DaoOptions, DeletedRows, PagedRows, Rows, RowsIter, SCHEMA_VERSION,
    SQL_LOG_TARGET, StoreLocator,
};

#[cfg(feature = "analysis")]
pub use transitdb_analysis::{
    DateFrequency, FrequencyError, FrequencyOptions, GroupFrequencies, PerStop, StationGrouping,
    StopGrouping, frequencies, frequencies_with,
};
