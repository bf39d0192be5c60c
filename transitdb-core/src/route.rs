/// Transport mode of a route, using the GTFS numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RouteType {
    /// Code 0: tram, streetcar or light rail.
    Tram,
    /// Code 1: subway or metro.
    Subway,
    /// Code 2: intercity or long-distance rail.
    Rail,
    /// Code 3: bus.
    Bus,
    /// Code 4: ferry.
    Ferry,
    /// Code 5: street-level cable car.
    CableTram,
    /// Code 6: gondola or aerial tramway.
    AerialLift,
    /// Code 7: funicular.
    Funicular,
    /// Code 11: trolleybus.
    Trolleybus,
    /// Code 12: monorail.
    Monorail,
    /// Any code outside the basic set, such as extended route types.
    Other(i64),
}

impl RouteType {
    /// Decode a stored route type code.
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Tram,
            1 => Self::Subway,
            2 => Self::Rail,
            3 => Self::Bus,
            4 => Self::Ferry,
            5 => Self::CableTram,
            6 => Self::AerialLift,
            7 => Self::Funicular,
            11 => Self::Trolleybus,
            12 => Self::Monorail,
            other => Self::Other(other),
        }
    }

    /// Numeric code persisted for this route type.
    pub const fn code(self) -> i64 {
        match self {
            Self::Tram => 0,
            Self::Subway => 1,
            Self::Rail => 2,
            Self::Bus => 3,
            Self::Ferry => 4,
            Self::CableTram => 5,
            Self::AerialLift => 6,
            Self::Funicular => 7,
            Self::Trolleybus => 11,
            Self::Monorail => 12,
            Self::Other(code) => code,
        }
    }
}

/// A route operated by an agency.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Feed partition key.
    pub feed_id: String,
    /// Identifier local to the feed.
    pub route_id: String,
    /// Operating agency in the same feed.
    pub agency_id: String,
    /// Short public name, e.g. a line number.
    pub route_short_name: Option<String>,
    /// Full public name, often the terminals.
    pub route_long_name: Option<String>,
    /// Free-form description.
    pub route_desc: Option<String>,
    /// Transport mode.
    pub route_type: RouteType,
    /// Page about the route.
    pub route_url: Option<String>,
    /// Line colour as six hex digits.
    pub route_color: Option<String>,
    /// Legible text colour over `route_color`.
    pub route_text_color: Option<String>,
}

impl Route {
    /// Construct a route with its mandatory attributes.
    pub fn new(
        feed_id: impl Into<String>,
        route_id: impl Into<String>,
        agency_id: impl Into<String>,
        route_type: RouteType,
    ) -> Self {
        Self {
            feed_id: feed_id.into(),
            route_id: route_id.into(),
            agency_id: agency_id.into(),
            route_short_name: None,
            route_long_name: None,
            route_desc: None,
            route_type,
            route_url: None,
            route_color: None,
            route_text_color: None,
        }
    }

    /// Set the public short name, e.g. `"R1"`.
    #[must_use]
    pub fn with_short_name(mut self, name: impl Into<String>) -> Self {
        self.route_short_name = Some(name.into());
        self
    }
}
