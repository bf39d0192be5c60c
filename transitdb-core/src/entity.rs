//! Table catalogue and the tagged entity union accepted by the session.
//!
//! The catalogue is the single source of truth for table and column names.
//! Filters are validated against it and the SQLite store derives its
//! projections from it, so a column listed here is always selectable.

use std::{fmt, str::FromStr};

use crate::{Agency, Calendar, CalendarDate, FeedInfo, Route, Stop, StopTime, Trip};

/// One of the eight tables that make up a stored feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Table {
    /// Feed metadata, one row per feed.
    FeedInfo,
    /// Operating agencies.
    Agency,
    /// Routes operated by an agency.
    Route,
    /// Stops and stations.
    Stop,
    /// Service calendars.
    Calendar,
    /// Dates on which a calendar runs.
    CalendarDate,
    /// Trips along a route.
    Trip,
    /// Scheduled calls of a trip at a stop.
    StopTime,
}

const FEED_INFO_COLUMNS: &[&str] = &[
    "feed_id",
    "feed_publisher_name",
    "feed_publisher_url",
    "feed_contact_email",
    "feed_contact_url",
    "feed_lang",
    "feed_start_date",
    "feed_end_date",
    "feed_version",
];

const AGENCY_COLUMNS: &[&str] = &[
    "feed_id",
    "agency_id",
    "agency_name",
    "agency_url",
    "agency_timezone",
    "agency_lang",
    "agency_phone",
    "agency_fare_url",
    "agency_email",
];

const ROUTE_COLUMNS: &[&str] = &[
    "feed_id",
    "route_id",
    "agency_id",
    "route_short_name",
    "route_long_name",
    "route_desc",
    "route_type",
    "route_url",
    "route_color",
    "route_text_color",
];

const STOP_COLUMNS: &[&str] = &[
    "feed_id",
    "stop_id",
    "parent_station_id",
    "location_type",
    "stop_name",
    "stop_lat",
    "stop_lon",
    "wheelchair_boarding",
    "stop_code",
    "stop_desc",
    "zone_id",
    "stop_url",
    "stop_timezone",
];

const CALENDAR_COLUMNS: &[&str] = &["feed_id", "service_id"];

const CALENDAR_DATE_COLUMNS: &[&str] = &["feed_id", "service_id", "date"];

const TRIP_COLUMNS: &[&str] = &[
    "feed_id",
    "trip_id",
    "route_id",
    "service_id",
    "trip_headsign",
    "trip_short_name",
    "direction_id",
    "block_id",
    "wheelchair_accessible",
    "bikes_allowed",
];

const STOP_TIME_COLUMNS: &[&str] = &[
    "feed_id",
    "trip_id",
    "stop_sequence",
    "stop_id",
    "arrival_time",
    "departure_time",
    "stop_headsign",
    "pickup_type",
    "drop_off_type",
    "timepoint",
    "shape_dist_traveled",
];

impl Table {
    /// Every table, ordered from the feed root down to the leaves.
    pub const ALL: [Self; 8] = [
        Self::FeedInfo,
        Self::Agency,
        Self::Stop,
        Self::Route,
        Self::Calendar,
        Self::CalendarDate,
        Self::Trip,
        Self::StopTime,
    ];

    /// Entity name used in column paths such as `Trip.trip_id`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::FeedInfo => "FeedInfo",
            Self::Agency => "Agency",
            Self::Route => "Route",
            Self::Stop => "Stop",
            Self::Calendar => "Calendar",
            Self::CalendarDate => "CalendarDate",
            Self::Trip => "Trip",
            Self::StopTime => "StopTime",
        }
    }

    /// Name of the backing SQL table.
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::FeedInfo => "feed_info",
            Self::Agency => "agencies",
            Self::Route => "routes",
            Self::Stop => "stops",
            Self::Calendar => "calendars",
            Self::CalendarDate => "calendar_dates",
            Self::Trip => "trips",
            Self::StopTime => "stop_times",
        }
    }

    /// Stored columns in projection order.
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::FeedInfo => FEED_INFO_COLUMNS,
            Self::Agency => AGENCY_COLUMNS,
            Self::Route => ROUTE_COLUMNS,
            Self::Stop => STOP_COLUMNS,
            Self::Calendar => CALENDAR_COLUMNS,
            Self::CalendarDate => CALENDAR_DATE_COLUMNS,
            Self::Trip => TRIP_COLUMNS,
            Self::StopTime => STOP_TIME_COLUMNS,
        }
    }

    /// Primary key columns. The leading column is always the feed partition.
    pub const fn key_columns(self) -> &'static [&'static str] {
        match self {
            Self::FeedInfo => &["feed_id"],
            Self::Agency => &["feed_id", "agency_id"],
            Self::Route => &["feed_id", "route_id"],
            Self::Stop => &["feed_id", "stop_id"],
            Self::Calendar => &["feed_id", "service_id"],
            Self::CalendarDate => &["feed_id", "service_id", "date"],
            Self::Trip => &["feed_id", "trip_id"],
            Self::StopTime => &["feed_id", "trip_id", "stop_sequence"],
        }
    }

    /// Whether `column` is stored in this table.
    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    /// Build a column reference on this table.
    ///
    /// The name is validated lazily, when a filter using it is composed into
    /// a query.
    ///
    /// # Examples
    /// ```
    /// use transitdb_core::Table;
    ///
    /// let column = Table::Trip.col("trip_id");
    /// assert_eq!(column.to_string(), "Trip.trip_id");
    /// ```
    pub fn col(self, name: &str) -> crate::Column {
        crate::Column::new(self, name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a table name is not part of the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown table {0:?}")]
pub struct UnknownTable(pub String);

impl FromStr for Table {
    type Err = UnknownTable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.label() == s || table.sql_name() == s)
            .ok_or_else(|| UnknownTable(s.to_owned()))
    }
}

/// Any stored entity, as staged for insertion or deletion.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// Feed metadata.
    FeedInfo(FeedInfo),
    /// An agency.
    Agency(Agency),
    /// A route.
    Route(Route),
    /// A stop or station.
    Stop(Stop),
    /// A service calendar.
    Calendar(Calendar),
    /// A service date.
    CalendarDate(CalendarDate),
    /// A trip.
    Trip(Trip),
    /// A stop time.
    StopTime(StopTime),
}

impl Entity {
    /// Table the entity is stored in.
    pub const fn table(&self) -> Table {
        match self {
            Self::FeedInfo(_) => Table::FeedInfo,
            Self::Agency(_) => Table::Agency,
            Self::Route(_) => Table::Route,
            Self::Stop(_) => Table::Stop,
            Self::Calendar(_) => Table::Calendar,
            Self::CalendarDate(_) => Table::CalendarDate,
            Self::Trip(_) => Table::Trip,
            Self::StopTime(_) => Table::StopTime,
        }
    }

    /// Feed partition the entity belongs to.
    pub fn feed_id(&self) -> &str {
        match self {
            Self::FeedInfo(feed) => &feed.feed_id,
            Self::Agency(agency) => &agency.feed_id,
            Self::Route(route) => &route.feed_id,
            Self::Stop(stop) => &stop.feed_id,
            Self::Calendar(calendar) => &calendar.feed_id,
            Self::CalendarDate(date) => &date.feed_id,
            Self::Trip(trip) => &trip.feed_id,
            Self::StopTime(stop_time) => &stop_time.feed_id,
        }
    }

    /// Move the entity into another feed partition.
    #[must_use]
    pub fn with_feed_id(mut self, feed_id: &str) -> Self {
        let slot = match &mut self {
            Self::FeedInfo(feed) => &mut feed.feed_id,
            Self::Agency(agency) => &mut agency.feed_id,
            Self::Route(route) => &mut route.feed_id,
            Self::Stop(stop) => &mut stop.feed_id,
            Self::Calendar(calendar) => &mut calendar.feed_id,
            Self::CalendarDate(date) => &mut date.feed_id,
            Self::Trip(trip) => &mut trip.feed_id,
            Self::StopTime(stop_time) => &mut stop_time.feed_id,
        };
        feed_id.clone_into(slot);
        self
    }

    /// Position in the insertion order that keeps parents ahead of children.
    ///
    /// Stations rank ahead of the stops that reference them.
    pub fn dependency_rank(&self) -> u8 {
        match self {
            Self::FeedInfo(_) => 0,
            Self::Agency(_) => 1,
            Self::Stop(stop) if stop.parent_station_id.is_none() => 2,
            Self::Stop(_) => 3,
            Self::Route(_) => 4,
            Self::Calendar(_) => 5,
            Self::CalendarDate(_) => 6,
            Self::Trip(_) => 7,
            Self::StopTime(_) => 8,
        }
    }
}

macro_rules! entity_from {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Entity {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

entity_from!(
    FeedInfo,
    Agency,
    Route,
    Stop,
    Calendar,
    CalendarDate,
    Trip,
    StopTime,
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Trip", Table::Trip)]
    #[case("trips", Table::Trip)]
    #[case("CalendarDate", Table::CalendarDate)]
    #[case("stop_times", Table::StopTime)]
    fn parses_labels_and_sql_names(#[case] input: &str, #[case] expected: Table) {
        assert_eq!(input.parse::<Table>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_table() {
        assert_eq!(
            "Shape".parse::<Table>(),
            Err(UnknownTable("Shape".to_owned()))
        );
    }

    #[rstest]
    fn key_columns_are_stored_columns() {
        for table in Table::ALL {
            for key in table.key_columns() {
                assert!(table.has_column(key), "{table} is missing key {key}");
            }
            assert_eq!(table.key_columns().first(), Some(&"feed_id"));
        }
    }
}
