//! Parameter sets for the list operations of the store.
//!
//! Each query bundles a direct filter, the join-inducing filters that reach a
//! related entity, a prefetch specification and, for the entities that can be
//! large, a page size. A page size of zero materialises the whole result.

use crate::{
    AgencyPrefetch, CalendarPrefetch, Filter, RoutePrefetch, StopPrefetch, StopTimePrefetch,
    TripPrefetch, Zone,
};

macro_rules! builder {
    ($($(#[$doc:meta])* $name:ident: $ty:ty),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(mut self, $name: $ty) -> Self {
                self.$name = $name.into();
                self
            }
        )+
    };
}

/// Parameters for listing agencies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgencyQuery {
    /// Predicate over agencies or any entity reachable from them.
    pub filter: Option<Filter>,
    /// Relations loaded with each agency.
    pub prefetch: AgencyPrefetch,
}

impl AgencyQuery {
    /// Every agency, routes not prefetched.
    pub fn new() -> Self {
        Self::default()
    }

    builder!(
        /// Predicate over agencies or any entity reachable from them.
        filter: Filter,
        /// Relations to prefetch.
        prefetch: AgencyPrefetch,
    );
}

/// Parameters for listing stops.
///
/// # Examples
/// ```
/// use transitdb_core::{Filter, StopQuery, Table, Zone};
///
/// # fn main() -> Result<(), transitdb_core::ZoneError> {
/// let query = StopQuery::new()
///     .zone(Zone::new(44.0, 46.0, 1.0, 3.0)?)
///     .trip_filter(Filter::eq(Table::Trip.col("route_id"), "R1"))
///     .page_size(500);
/// assert_eq!(query.page_size, 500);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopQuery {
    /// Predicate over stops or any entity reachable from them.
    pub filter: Option<Filter>,
    /// Predicate on Trip; keeps stops called at by a matching trip.
    pub trip_filter: Option<Filter>,
    /// Predicate on Calendar or CalendarDate of the calling trips.
    pub calendar_filter: Option<Filter>,
    /// Inclusive coordinate rectangle.
    pub zone: Option<Zone>,
    /// Relations loaded with each stop.
    pub prefetch: StopPrefetch,
    /// Rows per window; zero materialises the result.
    pub page_size: usize,
}

impl StopQuery {
    /// Every stop, parents and sub-stops prefetched, fully materialised.
    pub fn new() -> Self {
        Self::default()
    }

    builder!(
        /// Predicate over stops or any entity reachable from them.
        filter: Filter,
        /// Predicate over the trips calling at the stop.
        trip_filter: Filter,
        /// Predicate over the calendars of trips calling at the stop.
        calendar_filter: Filter,
        /// Restrict to stops inside a rectangle.
        zone: Zone,
        /// Relations to prefetch.
        prefetch: StopPrefetch,
        /// Window size; zero materialises every row.
        page_size: usize,
    );
}

/// Parameters for listing routes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteQuery {
    /// Predicate over routes or any entity reachable from them.
    pub filter: Option<Filter>,
    /// Predicate on Trip.
    pub trip_filter: Option<Filter>,
    /// Predicate on StopTime.
    pub stoptime_filter: Option<Filter>,
    /// Predicate on Calendar or CalendarDate.
    pub calendar_filter: Option<Filter>,
    /// Relations loaded with each route.
    pub prefetch: RoutePrefetch,
}

impl RouteQuery {
    /// Every route, trips not prefetched.
    pub fn new() -> Self {
        Self::default()
    }

    builder!(
        /// Predicate over routes or any entity reachable from them.
        filter: Filter,
        /// Predicate over the route's trips.
        trip_filter: Filter,
        /// Predicate over the stop times of the route's trips.
        stoptime_filter: Filter,
        /// Predicate over the calendars of the route's trips.
        calendar_filter: Filter,
        /// Relations to prefetch.
        prefetch: RoutePrefetch,
    );
}

/// Parameters for listing calendars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarQuery {
    /// Predicate over calendars and their dates.
    pub filter: Option<Filter>,
    /// Relations loaded with each calendar.
    pub prefetch: CalendarPrefetch,
}

impl CalendarQuery {
    /// Every calendar, dates prefetched.
    pub fn new() -> Self {
        Self::default()
    }

    builder!(
        /// Predicate over calendars and their dates.
        filter: Filter,
        /// Relations to prefetch.
        prefetch: CalendarPrefetch,
    );
}

/// Parameters for listing trips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripQuery {
    /// Predicate over trips or any entity reachable from them.
    pub filter: Option<Filter>,
    /// Predicate on Calendar or CalendarDate.
    pub calendar_filter: Option<Filter>,
    /// Predicate on StopTime; keeps trips with a matching call.
    pub stoptime_filter: Option<Filter>,
    /// Predicate on Route.
    pub route_filter: Option<Filter>,
    /// Relations loaded with each trip.
    pub prefetch: TripPrefetch,
    /// Rows per window; zero materialises the result.
    pub page_size: usize,
}

impl TripQuery {
    /// Every trip, stop times prefetched, fully materialised.
    pub fn new() -> Self {
        Self::default()
    }

    builder!(
        /// Predicate over trips or any entity reachable from them.
        filter: Filter,
        /// Predicate over the trip's calendar and its dates.
        calendar_filter: Filter,
        /// Predicate over the trip's stop times.
        stoptime_filter: Filter,
        /// Predicate over the trip's route.
        route_filter: Filter,
        /// Relations to prefetch.
        prefetch: TripPrefetch,
        /// Window size; zero materialises every row.
        page_size: usize,
    );
}

/// Parameters for listing stop times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopTimeQuery {
    /// Predicate over stop times or any entity reachable from them.
    pub filter: Option<Filter>,
    /// Predicate on Trip.
    pub trip_filter: Option<Filter>,
    /// Predicate on Route.
    pub route_filter: Option<Filter>,
    /// Predicate on Calendar or CalendarDate.
    pub calendar_filter: Option<Filter>,
    /// Relations loaded with each stop time.
    pub prefetch: StopTimePrefetch,
    /// Rows per window; zero materialises the result.
    pub page_size: usize,
}

impl StopTimeQuery {
    /// Every stop time, trips prefetched, fully materialised.
    pub fn new() -> Self {
        Self::default()
    }

    builder!(
        /// Predicate over stop times or any entity reachable from them.
        filter: Filter,
        /// Predicate over the trip making the call.
        trip_filter: Filter,
        /// Predicate over the route of that trip.
        route_filter: Filter,
        /// Predicate over the calendar of that trip.
        calendar_filter: Filter,
        /// Relations to prefetch.
        prefetch: StopTimePrefetch,
        /// Window size; zero materialises every row.
        page_size: usize,
    );
}
