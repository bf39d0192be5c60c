/// A single journey of a vehicle along a route on the days of one calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    /// Feed partition key.
    pub feed_id: String,
    /// Identifier local to the feed.
    pub trip_id: String,
    /// Route in the same feed.
    pub route_id: String,
    /// Calendar in the same feed.
    pub service_id: String,
    /// Destination text shown to riders.
    pub trip_headsign: Option<String>,
    /// Public trip number, if any.
    pub trip_short_name: Option<String>,
    /// Travel direction, `0` or `1`.
    pub direction_id: Option<u8>,
    /// Vehicle block shared by consecutive trips.
    pub block_id: Option<String>,
    /// GTFS accessibility code.
    pub wheelchair_accessible: Option<u8>,
    /// GTFS bicycle code.
    pub bikes_allowed: Option<u8>,
}

impl Trip {
    /// Construct a trip referencing its route and calendar.
    pub fn new(
        feed_id: impl Into<String>,
        trip_id: impl Into<String>,
        route_id: impl Into<String>,
        service_id: impl Into<String>,
    ) -> Self {
        Self {
            feed_id: feed_id.into(),
            trip_id: trip_id.into(),
            route_id: route_id.into(),
            service_id: service_id.into(),
            trip_headsign: None,
            trip_short_name: None,
            direction_id: None,
            block_id: None,
            wheelchair_accessible: None,
            bikes_allowed: None,
        }
    }

    /// Set the headsign shown to passengers.
    #[must_use]
    pub fn with_headsign(mut self, headsign: impl Into<String>) -> Self {
        self.trip_headsign = Some(headsign.into());
        self
    }
}
