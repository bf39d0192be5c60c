//! Batched loading of related rows.
//!
//! Every relation is fetched with `feed_id = ? AND link IN (…)` statements
//! keyed by the parent rows at hand, one statement per feed and per chunk of
//! keys. Results come back in key order, which is also the order the lazy
//! navigation methods return.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rusqlite::params_from_iter;

use crate::{
    Agency, AgencyPrefetch, Calendar, CalendarDate, CalendarPrefetch, LoadedAgency,
    LoadedCalendar, LoadedRoute, LoadedStop, LoadedStopTime, LoadedTrip, Related, Route,
    RoutePrefetch, Stop, StopPrefetch, StopTime, StopTimePrefetch, Trip, TripPrefetch,
};

use super::{
    Dao, DaoError,
    mapping::{Record, key_order, projection},
};

/// SQLite limits bound parameters per statement to 999 by default.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

/// Keys per statement, leaving one parameter for the feed.
const MAX_KEYS_PER_STATEMENT: usize = SQLITE_MAX_VARIABLE_NUMBER - 1;

type Groups<T> = HashMap<(String, String), Vec<T>>;

fn group_by<T>(rows: Vec<T>, key: impl Fn(&T) -> (&str, &str)) -> Groups<T> {
    let mut groups: Groups<T> = HashMap::new();
    for row in rows {
        let (feed_id, id) = key(&row);
        let key = (feed_id.to_owned(), id.to_owned());
        groups.entry(key).or_default().push(row);
    }
    groups
}

fn children<T: Clone>(groups: &Groups<T>, feed_id: &str, id: &str) -> Vec<T> {
    groups
        .get(&(feed_id.to_owned(), id.to_owned()))
        .cloned()
        .unwrap_or_default()
}

fn single<T: Clone>(groups: &Groups<T>, feed_id: &str, id: &str) -> Option<T> {
    groups
        .get(&(feed_id.to_owned(), id.to_owned()))
        .and_then(|rows| rows.first().cloned())
}

fn related<T>(value: Option<T>) -> Related<T> {
    value.map_or(Related::NotLoaded, Related::Loaded)
}

impl Dao {
    /// Rows of `R` whose `link` column matches one of `keys` in the same feed.
    pub(crate) fn fetch_linked<'k, R: Record>(
        &self,
        link: &'static str,
        keys: impl IntoIterator<Item = (&'k str, &'k str)>,
    ) -> Result<Vec<R>, DaoError> {
        let mut by_feed: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (feed_id, id) in keys {
            by_feed.entry(feed_id).or_default().insert(id);
        }

        let mut rows = Vec::new();
        for (feed_id, ids) in by_feed {
            let ids: Vec<&str> = ids.into_iter().collect();
            for chunk in ids.chunks(MAX_KEYS_PER_STATEMENT) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let sql = format!(
                    "SELECT {} FROM {} WHERE feed_id = ? AND {link} IN ({placeholders}) ORDER BY {}",
                    projection(R::TABLE),
                    R::TABLE.sql_name(),
                    key_order(R::TABLE),
                );
                let params = params_from_iter(std::iter::once(feed_id).chain(chunk.iter().copied()));
                rows.extend(self.query_records::<R, _>("prefetch rows", &sql, params)?);
            }
        }
        Ok(rows)
    }

    pub(crate) fn load_agencies(
        &self,
        agencies: Vec<Agency>,
        prefetch: AgencyPrefetch,
    ) -> Result<Vec<LoadedAgency>, DaoError> {
        let mut loaded: Vec<LoadedAgency> = agencies.into_iter().map(LoadedAgency::from).collect();
        if prefetch.routes {
            let routes = self.fetch_linked::<Route>(
                "agency_id",
                loaded
                    .iter()
                    .map(|item| (item.agency.feed_id.as_str(), item.agency.agency_id.as_str())),
            )?;
            let routes = group_by(routes, |route| (route.feed_id.as_str(), route.agency_id.as_str()));
            for item in &mut loaded {
                item.routes =
                    Related::Loaded(children(&routes, &item.agency.feed_id, &item.agency.agency_id));
            }
        }
        Ok(loaded)
    }

    pub(crate) fn load_stops(
        &self,
        stops: Vec<Stop>,
        prefetch: StopPrefetch,
    ) -> Result<Vec<LoadedStop>, DaoError> {
        let mut loaded: Vec<LoadedStop> = stops.into_iter().map(LoadedStop::from).collect();
        if prefetch.parent {
            let parents = self.fetch_linked::<Stop>(
                "stop_id",
                loaded.iter().filter_map(|item| {
                    item.stop
                        .parent_station_id
                        .as_deref()
                        .map(|parent| (item.stop.feed_id.as_str(), parent))
                }),
            )?;
            let parents = group_by(parents, |stop| (stop.feed_id.as_str(), stop.stop_id.as_str()));
            for item in &mut loaded {
                let parent = item
                    .stop
                    .parent_station_id
                    .as_deref()
                    .and_then(|parent| single(&parents, &item.stop.feed_id, parent));
                item.parent = Related::Loaded(parent);
            }
        }
        if prefetch.sub_stops {
            let sub_stops = self.fetch_linked::<Stop>(
                "parent_station_id",
                loaded
                    .iter()
                    .map(|item| (item.stop.feed_id.as_str(), item.stop.stop_id.as_str())),
            )?;
            let sub_stops = group_by(sub_stops, |stop| {
                (stop.feed_id.as_str(), stop.parent_station_id.as_deref().unwrap_or_default())
            });
            for item in &mut loaded {
                item.sub_stops =
                    Related::Loaded(children(&sub_stops, &item.stop.feed_id, &item.stop.stop_id));
            }
        }
        Ok(loaded)
    }

    pub(crate) fn load_routes(
        &self,
        routes: Vec<Route>,
        prefetch: RoutePrefetch,
    ) -> Result<Vec<LoadedRoute>, DaoError> {
        let mut loaded: Vec<LoadedRoute> = routes.into_iter().map(LoadedRoute::from).collect();
        if prefetch.trips {
            let trips = self.fetch_linked::<Trip>(
                "route_id",
                loaded
                    .iter()
                    .map(|item| (item.route.feed_id.as_str(), item.route.route_id.as_str())),
            )?;
            let trips = group_by(trips, |trip| (trip.feed_id.as_str(), trip.route_id.as_str()));
            for item in &mut loaded {
                item.trips =
                    Related::Loaded(children(&trips, &item.route.feed_id, &item.route.route_id));
            }
        }
        Ok(loaded)
    }

    pub(crate) fn load_calendars(
        &self,
        calendars: Vec<Calendar>,
        prefetch: CalendarPrefetch,
    ) -> Result<Vec<LoadedCalendar>, DaoError> {
        let mut loaded: Vec<LoadedCalendar> =
            calendars.into_iter().map(LoadedCalendar::from).collect();
        let service_keys: Vec<(String, String)> = loaded
            .iter()
            .map(|item| (item.calendar.feed_id.clone(), item.calendar.service_id.clone()))
            .collect();
        let key_refs = || service_keys.iter().map(|(feed, id)| (feed.as_str(), id.as_str()));

        if prefetch.dates {
            let dates = self.fetch_linked::<CalendarDate>("service_id", key_refs())?;
            let dates = group_by(dates, |date| (date.feed_id.as_str(), date.service_id.as_str()));
            for item in &mut loaded {
                item.dates = Related::Loaded(children(
                    &dates,
                    &item.calendar.feed_id,
                    &item.calendar.service_id,
                ));
            }
        }
        if prefetch.loads_trips() {
            let trips = self.fetch_linked::<Trip>("service_id", key_refs())?;
            let trips = self.load_trips(
                trips,
                TripPrefetch {
                    stop_times: prefetch.stop_times,
                    ..TripPrefetch::NONE
                },
            )?;
            let trips = group_by(trips, |item| (item.trip.feed_id.as_str(), item.trip.service_id.as_str()));
            for item in &mut loaded {
                item.trips = Related::Loaded(children(
                    &trips,
                    &item.calendar.feed_id,
                    &item.calendar.service_id,
                ));
            }
        }
        Ok(loaded)
    }

    pub(crate) fn load_trips(
        &self,
        trips: Vec<Trip>,
        prefetch: TripPrefetch,
    ) -> Result<Vec<LoadedTrip>, DaoError> {
        let mut loaded: Vec<LoadedTrip> = trips.into_iter().map(LoadedTrip::from).collect();

        if prefetch.loads_stop_times() {
            let stop_times = self.fetch_linked::<StopTime>(
                "trip_id",
                loaded
                    .iter()
                    .map(|item| (item.trip.feed_id.as_str(), item.trip.trip_id.as_str())),
            )?;
            let stop_times = self.attach_stops(stop_times, prefetch.stops)?;
            let stop_times = group_by(stop_times, |item| {
                (item.stop_time.feed_id.as_str(), item.stop_time.trip_id.as_str())
            });
            for item in &mut loaded {
                item.stop_times = Related::Loaded(children(
                    &stop_times,
                    &item.trip.feed_id,
                    &item.trip.trip_id,
                ));
            }
        }
        if prefetch.route {
            let routes = self.fetch_linked::<Route>(
                "route_id",
                loaded
                    .iter()
                    .map(|item| (item.trip.feed_id.as_str(), item.trip.route_id.as_str())),
            )?;
            let routes = group_by(routes, |route| (route.feed_id.as_str(), route.route_id.as_str()));
            for item in &mut loaded {
                item.route = related(single(&routes, &item.trip.feed_id, &item.trip.route_id));
            }
        }
        if prefetch.calendar {
            let calendars = self.fetch_linked::<Calendar>(
                "service_id",
                loaded
                    .iter()
                    .map(|item| (item.trip.feed_id.as_str(), item.trip.service_id.as_str())),
            )?;
            let calendars = self.load_calendars(
                calendars,
                CalendarPrefetch {
                    dates: true,
                    ..CalendarPrefetch::NONE
                },
            )?;
            let calendars = group_by(calendars, |item| {
                (item.calendar.feed_id.as_str(), item.calendar.service_id.as_str())
            });
            for item in &mut loaded {
                item.calendar =
                    related(single(&calendars, &item.trip.feed_id, &item.trip.service_id));
            }
        }
        Ok(loaded)
    }

    pub(crate) fn load_stop_times(
        &self,
        stop_times: Vec<StopTime>,
        prefetch: StopTimePrefetch,
    ) -> Result<Vec<LoadedStopTime>, DaoError> {
        let mut loaded: Vec<LoadedStopTime> =
            stop_times.into_iter().map(LoadedStopTime::from).collect();
        if prefetch.loads_trip() {
            let trips = self.fetch_linked::<Trip>(
                "trip_id",
                loaded.iter().map(|item| {
                    (item.stop_time.feed_id.as_str(), item.stop_time.trip_id.as_str())
                }),
            )?;
            let trips = self.load_trips(
                trips,
                TripPrefetch {
                    stop_times: prefetch.trip_stop_times,
                    ..TripPrefetch::NONE
                },
            )?;
            let trips = group_by(trips, |item| (item.trip.feed_id.as_str(), item.trip.trip_id.as_str()));
            for item in &mut loaded {
                item.trip = related(
                    single(&trips, &item.stop_time.feed_id, &item.stop_time.trip_id).map(Box::new),
                );
            }
        }
        Ok(loaded)
    }

    /// Wrap stop times, loading the stop of each call when `with_stops` is set.
    fn attach_stops(
        &self,
        stop_times: Vec<StopTime>,
        with_stops: bool,
    ) -> Result<Vec<LoadedStopTime>, DaoError> {
        let mut loaded: Vec<LoadedStopTime> =
            stop_times.into_iter().map(LoadedStopTime::from).collect();
        if with_stops {
            let stops = self.fetch_linked::<Stop>(
                "stop_id",
                loaded.iter().map(|item| {
                    (item.stop_time.feed_id.as_str(), item.stop_time.stop_id.as_str())
                }),
            )?;
            let stops = group_by(stops, |stop| (stop.feed_id.as_str(), stop.stop_id.as_str()));
            for item in &mut loaded {
                item.stop = related(single(&stops, &item.stop_time.feed_id, &item.stop_time.stop_id));
            }
        }
        Ok(loaded)
    }
}
