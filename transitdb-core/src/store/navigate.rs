//! One-query navigation between related entities.
//!
//! These return exactly what the matching prefetch would have loaded, which
//! makes them the reference the eager loaders are tested against.

use crate::{Agency, Calendar, CalendarDate, Route, Stop, StopTime, Trip};

use super::{Dao, DaoError};

impl Dao {
    /// Routes operated by `agency`.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn agency_routes(&self, agency: &Agency) -> Result<Vec<Route>, DaoError> {
        self.fetch_linked("agency_id", [(agency.feed_id.as_str(), agency.agency_id.as_str())])
    }

    /// Parent station of `stop`. No query runs when the stop has no parent.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn stop_parent(&self, stop: &Stop) -> Result<Option<Stop>, DaoError> {
        match stop.parent_station_id.as_deref() {
            Some(parent) => self.stop(&stop.feed_id, parent),
            None => Ok(None),
        }
    }

    /// Stops whose parent station is `stop`.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn stop_sub_stops(&self, stop: &Stop) -> Result<Vec<Stop>, DaoError> {
        self.fetch_linked(
            "parent_station_id",
            [(stop.feed_id.as_str(), stop.stop_id.as_str())],
        )
    }

    /// Trips along `route`.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn route_trips(&self, route: &Route) -> Result<Vec<Trip>, DaoError> {
        self.fetch_linked("route_id", [(route.feed_id.as_str(), route.route_id.as_str())])
    }

    /// Dates on which `calendar` runs, earliest first.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn calendar_dates_of(&self, calendar: &Calendar) -> Result<Vec<CalendarDate>, DaoError> {
        self.fetch_linked(
            "service_id",
            [(calendar.feed_id.as_str(), calendar.service_id.as_str())],
        )
    }

    /// Trips running on `calendar`.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn calendar_trips(&self, calendar: &Calendar) -> Result<Vec<Trip>, DaoError> {
        self.fetch_linked(
            "service_id",
            [(calendar.feed_id.as_str(), calendar.service_id.as_str())],
        )
    }

    /// Calls of `trip`, ordered by stop sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn trip_stop_times(&self, trip: &Trip) -> Result<Vec<StopTime>, DaoError> {
        self.fetch_linked("trip_id", [(trip.feed_id.as_str(), trip.trip_id.as_str())])
    }

    /// Route the trip runs along.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn trip_route(&self, trip: &Trip) -> Result<Option<Route>, DaoError> {
        self.route(&trip.feed_id, &trip.route_id)
    }

    /// Calendar the trip runs on.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn trip_calendar(&self, trip: &Trip) -> Result<Option<Calendar>, DaoError> {
        self.calendar(&trip.feed_id, &trip.service_id)
    }

    /// Stop served by the call.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn stop_time_stop(&self, stop_time: &StopTime) -> Result<Option<Stop>, DaoError> {
        self.stop(&stop_time.feed_id, &stop_time.stop_id)
    }

    /// Trip the call belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`DaoError::Query`] when the read fails.
    pub fn stop_time_trip(&self, stop_time: &StopTime) -> Result<Option<Trip>, DaoError> {
        self.trip(&stop_time.feed_id, &stop_time.trip_id)
    }
}
