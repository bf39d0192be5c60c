/// A scheduled call of a trip at a stop.
///
/// Times are seconds after midnight of the service day and may exceed
/// 24 hours for trips running past midnight. Within a trip, calls are
/// uniquely ordered by `stop_sequence`.
///
/// # Examples
/// ```
/// use transitdb_core::StopTime;
///
/// let call = StopTime::new("paris", "t1", 1, "gare").with_times(8 * 3600, 8 * 3600 + 30);
/// assert_eq!(call.departure_time, Some(28_830));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopTime {
    /// Feed partition key.
    pub feed_id: String,
    /// Trip making the call.
    pub trip_id: String,
    /// Position of the call within the trip.
    pub stop_sequence: u32,
    /// Stop served, in the same feed.
    pub stop_id: String,
    /// Arrival, seconds after midnight. `None` for untimed calls.
    pub arrival_time: Option<u32>,
    /// Departure, seconds after midnight. `None` for untimed calls.
    pub departure_time: Option<u32>,
    /// Destination text overriding the trip's from this call on.
    pub stop_headsign: Option<String>,
    /// GTFS boarding code.
    pub pickup_type: Option<u8>,
    /// GTFS alighting code.
    pub drop_off_type: Option<u8>,
    /// Whether the times are exact rather than interpolated.
    pub timepoint: Option<bool>,
    /// Distance along the trip's shape.
    pub shape_dist_traveled: Option<f64>,
}

impl StopTime {
    /// Construct an untimed call.
    pub fn new(
        feed_id: impl Into<String>,
        trip_id: impl Into<String>,
        stop_sequence: u32,
        stop_id: impl Into<String>,
    ) -> Self {
        Self {
            feed_id: feed_id.into(),
            trip_id: trip_id.into(),
            stop_sequence,
            stop_id: stop_id.into(),
            arrival_time: None,
            departure_time: None,
            stop_headsign: None,
            pickup_type: None,
            drop_off_type: None,
            timepoint: None,
            shape_dist_traveled: None,
        }
    }

    /// Set arrival and departure times in seconds after midnight.
    #[must_use]
    pub const fn with_times(mut self, arrival: u32, departure: u32) -> Self {
        self.arrival_time = Some(arrival);
        self.departure_time = Some(departure);
        self
    }
}
