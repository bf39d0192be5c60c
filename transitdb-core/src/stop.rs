/// Role of a stop within the station hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocationType {
    /// A boarding location; may belong to a station.
    #[default]
    Stop,
    /// A station grouping sub-stops. Stations never have a parent.
    Station,
}

impl LocationType {
    /// Decode the stored code. Unknown codes are rejected.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Stop),
            1 => Some(Self::Station),
            _ => None,
        }
    }

    /// Numeric code persisted for this location type.
    pub const fn code(self) -> i64 {
        match self {
            Self::Stop => 0,
            Self::Station => 1,
        }
    }
}

/// A stop or station.
///
/// Coordinates are WGS84 degrees. A stop may reference a parent station in
/// the same feed, forming a hierarchy at most two levels deep.
///
/// # Examples
/// ```
/// use transitdb_core::{LocationType, Stop};
///
/// let station = Stop::new("paris", "gare", "Gare", 48.88, 2.35)
///     .with_location_type(LocationType::Station);
/// let platform = Stop::new("paris", "gare-1", "Gare quai 1", 48.88, 2.35)
///     .with_parent_station("gare");
///
/// assert_eq!(platform.parent_station_id.as_deref(), Some("gare"));
/// assert_eq!(station.location_type, LocationType::Station);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// Feed partition key.
    pub feed_id: String,
    /// Identifier local to the feed.
    pub stop_id: String,
    /// Parent station in the same feed, if any.
    pub parent_station_id: Option<String>,
    /// Stop or station.
    pub location_type: LocationType,
    /// Name shown to riders.
    pub stop_name: String,
    /// Latitude in degrees.
    pub stop_lat: f64,
    /// Longitude in degrees.
    pub stop_lon: f64,
    /// GTFS accessibility code.
    pub wheelchair_boarding: Option<u8>,
    /// Short code printed on signs.
    pub stop_code: Option<String>,
    /// Free-form description.
    pub stop_desc: Option<String>,
    /// Fare zone.
    pub zone_id: Option<String>,
    /// Page about the stop.
    pub stop_url: Option<String>,
    /// IANA time zone, when it differs from the agency's.
    pub stop_timezone: Option<String>,
}

impl Stop {
    /// Construct a plain stop at the given position.
    pub fn new(
        feed_id: impl Into<String>,
        stop_id: impl Into<String>,
        stop_name: impl Into<String>,
        stop_lat: f64,
        stop_lon: f64,
    ) -> Self {
        Self {
            feed_id: feed_id.into(),
            stop_id: stop_id.into(),
            parent_station_id: None,
            location_type: LocationType::Stop,
            stop_name: stop_name.into(),
            stop_lat,
            stop_lon,
            wheelchair_boarding: None,
            stop_code: None,
            stop_desc: None,
            zone_id: None,
            stop_url: None,
            stop_timezone: None,
        }
    }

    /// Attach the stop to a parent station.
    #[must_use]
    pub fn with_parent_station(mut self, station_id: impl Into<String>) -> Self {
        self.parent_station_id = Some(station_id.into());
        self
    }

    /// Set the location type.
    #[must_use]
    pub const fn with_location_type(mut self, location_type: LocationType) -> Self {
        self.location_type = location_type;
        self
    }

    /// Whether the stop is a station grouping sub-stops.
    pub fn is_station(&self) -> bool {
        self.location_type == LocationType::Station
    }
}
