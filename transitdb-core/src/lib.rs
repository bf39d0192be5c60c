//! Core types and storage for transit feeds.
//!
//! Responsibilities:
//! - Model the seven feed entities keyed by `(feed_id, local_id)`.
//! - Express filters, zones and eager-loading specifications as plain values.
//! - Persist and query feeds through the SQLite-backed [`store::Dao`].
//!
//! Boundaries:
//! - Parsing feed archives lives with converters implementing [`FeedSource`].
//! - Analyses consume the store; they do not extend it.
//!
//! Invariants:
//! - No cross-feed references: every child row shares its parent's `feed_id`.
//! - One `Dao` is used by one caller at a time; nothing here locks.
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod agency;
mod calendar;
mod entity;
mod feed;
pub mod filter;
mod prefetch;
mod query;
mod route;
mod source;
mod stop;
mod stop_time;
mod trip;
mod zone;

#[cfg(feature = "store-sqlite")]
pub mod store;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(all(docsrs, not(test)), doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use agency::Agency;
pub use calendar::{Calendar, CalendarDate};
pub use entity::{Entity, Table, UnknownTable};
pub use feed::FeedInfo;
pub use filter::{Column, Comparison, Filter, FilterError, Value};
pub use prefetch::{
    AgencyPrefetch, CalendarPrefetch, LoadedAgency, LoadedCalendar, LoadedRoute, LoadedStop,
    LoadedStopTime, LoadedTrip, Related, RoutePrefetch, StopPrefetch, StopTimePrefetch, TripPrefetch,
};
pub use query::{AgencyQuery, CalendarQuery, RouteQuery, StopQuery, StopTimeQuery, TripQuery};
pub use route::{Route, RouteType};
pub use source::{FeedSource, StaticFeed};
pub use stop::{LocationType, Stop};
pub use stop_time::StopTime;
pub use trip::Trip;
pub use zone::{Zone, ZoneError};

#[cfg(feature = "store-sqlite")]
pub use store::{
    Dao, DaoError, DaoOptions, DeletedRows, PagedRows, Rows, RowsIter, SCHEMA_VERSION,
    SQL_LOG_TARGET, StoreLocator,
};
