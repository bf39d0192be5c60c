//! Eager-loading specifications and the values they produce.
//!
//! Each entity has a closed set of relations that may be fetched alongside a
//! query. Requesting a nested relation implies its prerequisite: asking for
//! the stops of a trip's stop times also loads the stop times. Prefetching
//! changes only how many queries reach the store; the loaded values are the
//! same ones the lazy navigation methods return.

use crate::{Agency, Calendar, CalendarDate, Route, Stop, StopTime, Trip};

/// A relation slot that is either populated by a prefetch or left unloaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Related<T> {
    /// The query did not prefetch this relation.
    #[default]
    NotLoaded,
    /// Prefetched value.
    Loaded(T),
}

impl<T> Related<T> {
    /// Borrow the prefetched value.
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::NotLoaded => None,
            Self::Loaded(value) => Some(value),
        }
    }

    /// Take the prefetched value.
    pub fn into_loaded(self) -> Option<T> {
        match self {
            Self::NotLoaded => None,
            Self::Loaded(value) => Some(value),
        }
    }

    /// Whether the relation was prefetched.
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Relations prefetched with agencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgencyPrefetch {
    /// Routes operated by each agency.
    pub routes: bool,
}

/// Relations prefetched with stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPrefetch {
    /// The parent station.
    pub parent: bool,
    /// Sub-stops of a station.
    pub sub_stops: bool,
}

impl StopPrefetch {
    /// Load nothing beyond the stops themselves.
    pub const NONE: Self = Self {
        parent: false,
        sub_stops: false,
    };
}

impl Default for StopPrefetch {
    fn default() -> Self {
        Self {
            parent: true,
            sub_stops: true,
        }
    }
}

/// Relations prefetched with routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoutePrefetch {
    /// Trips along each route.
    pub trips: bool,
}

/// Relations prefetched with calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarPrefetch {
    /// Service dates.
    pub dates: bool,
    /// Trips running on the calendar.
    pub trips: bool,
    /// Stop times of those trips; implies `trips`.
    pub stop_times: bool,
}

impl CalendarPrefetch {
    /// Load nothing beyond the calendars themselves.
    pub const NONE: Self = Self {
        dates: false,
        trips: false,
        stop_times: false,
    };

    /// Whether trips are loaded, directly or as a prerequisite.
    pub const fn loads_trips(&self) -> bool {
        self.trips || self.stop_times
    }
}

impl Default for CalendarPrefetch {
    fn default() -> Self {
        Self {
            dates: true,
            trips: false,
            stop_times: false,
        }
    }
}

/// Relations prefetched with trips.
///
/// # Examples
/// ```
/// use transitdb_core::TripPrefetch;
///
/// let prefetch = TripPrefetch { stops: true, ..TripPrefetch::NONE };
/// assert!(prefetch.loads_stop_times());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripPrefetch {
    /// Calls of each trip, ordered by stop sequence.
    pub stop_times: bool,
    /// The stop of each call; implies `stop_times`.
    pub stops: bool,
    /// The trip's route.
    pub route: bool,
    /// The trip's calendar together with its dates.
    pub calendar: bool,
}

impl TripPrefetch {
    /// Load nothing beyond the trips themselves.
    pub const NONE: Self = Self {
        stop_times: false,
        stops: false,
        route: false,
        calendar: false,
    };

    /// Whether stop times are loaded, directly or as a prerequisite.
    pub const fn loads_stop_times(&self) -> bool {
        self.stop_times || self.stops
    }
}

impl Default for TripPrefetch {
    fn default() -> Self {
        Self {
            stop_times: true,
            ..Self::NONE
        }
    }
}

/// Relations prefetched with stop times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTimePrefetch {
    /// The trip making each call.
    pub trip: bool,
    /// Every call of that trip; implies `trip`.
    pub trip_stop_times: bool,
}

impl StopTimePrefetch {
    /// Load nothing beyond the stop times themselves.
    pub const NONE: Self = Self {
        trip: false,
        trip_stop_times: false,
    };

    /// Whether trips are loaded, directly or as a prerequisite.
    pub const fn loads_trip(&self) -> bool {
        self.trip || self.trip_stop_times
    }
}

impl Default for StopTimePrefetch {
    fn default() -> Self {
        Self {
            trip: true,
            trip_stop_times: false,
        }
    }
}

/// An agency and its prefetched relations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAgency {
    /// The agency row.
    pub agency: Agency,
    /// Routes operated by the agency.
    pub routes: Related<Vec<Route>>,
}

/// A stop and its prefetched relations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedStop {
    /// The stop row.
    pub stop: Stop,
    /// `Loaded(None)` means the parent was fetched and the stop has none.
    pub parent: Related<Option<Stop>>,
    /// Stops whose parent station is this stop.
    pub sub_stops: Related<Vec<Stop>>,
}

/// A route and its prefetched relations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRoute {
    /// The route row.
    pub route: Route,
    /// Trips along the route.
    pub trips: Related<Vec<Trip>>,
}

/// A calendar and its prefetched relations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCalendar {
    /// The calendar row.
    pub calendar: Calendar,
    /// Service dates, earliest first.
    pub dates: Related<Vec<CalendarDate>>,
    /// Trips running on the calendar, with their stop times when requested.
    pub trips: Related<Vec<LoadedTrip>>,
}

/// A trip and its prefetched relations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTrip {
    /// The trip row.
    pub trip: Trip,
    /// Calls in stop sequence order, with their stops when requested.
    pub stop_times: Related<Vec<LoadedStopTime>>,
    /// The route the trip runs along.
    pub route: Related<Route>,
    /// The trip's calendar with its dates.
    pub calendar: Related<LoadedCalendar>,
}

/// A stop time and its prefetched relations.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedStopTime {
    /// The stop time row.
    pub stop_time: StopTime,
    /// The stop served.
    pub stop: Related<Stop>,
    /// The trip making the call, with all its calls when requested.
    pub trip: Related<Box<LoadedTrip>>,
}

macro_rules! loaded_from {
    ($loaded:ident { $field:ident: $entity:ident $(, $rel:ident)* }) => {
        impl From<$entity> for $loaded {
            fn from($field: $entity) -> Self {
                Self {
                    $field,
                    $($rel: Related::NotLoaded,)*
                }
            }
        }
    };
}

loaded_from!(LoadedAgency { agency: Agency, routes });
loaded_from!(LoadedStop { stop: Stop, parent, sub_stops });
loaded_from!(LoadedRoute { route: Route, trips });
loaded_from!(LoadedCalendar { calendar: Calendar, dates, trips });
loaded_from!(LoadedTrip { trip: Trip, stop_times, route, calendar });
loaded_from!(LoadedStopTime { stop_time: StopTime, stop, trip });

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn nested_directives_imply_prerequisites() {
        assert!(TripPrefetch { stops: true, ..TripPrefetch::NONE }.loads_stop_times());
        assert!(CalendarPrefetch { stop_times: true, ..CalendarPrefetch::NONE }.loads_trips());
        assert!(StopTimePrefetch { trip_stop_times: true, ..StopTimePrefetch::NONE }.loads_trip());
        assert!(!TripPrefetch::NONE.loads_stop_times());
    }

    #[rstest]
    fn defaults_follow_common_navigation() {
        assert!(TripPrefetch::default().stop_times);
        assert!(StopPrefetch::default().parent);
        assert!(CalendarPrefetch::default().dates);
        assert!(StopTimePrefetch::default().trip);
        assert!(!AgencyPrefetch::default().routes);
    }

    #[rstest]
    fn related_accessors() {
        let loaded = Related::Loaded(3);
        assert_eq!(loaded.loaded(), Some(&3));
        assert!(Related::<u8>::NotLoaded.loaded().is_none());
        assert_eq!(loaded.into_loaded(), Some(3));
    }
}
