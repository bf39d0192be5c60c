/// A transit operator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agency {
    /// Feed partition key.
    pub feed_id: String,
    /// Identifier local to the feed.
    pub agency_id: String,
    /// Public name.
    pub agency_name: String,
    /// Public website.
    pub agency_url: String,
    /// IANA time zone the agency's schedules are expressed in.
    pub agency_timezone: String,
    /// Primary language, as an IETF tag.
    pub agency_lang: Option<String>,
    /// Voice contact number.
    pub agency_phone: Option<String>,
    /// Page for buying tickets.
    pub agency_fare_url: Option<String>,
    /// Customer service address.
    pub agency_email: Option<String>,
}

impl Agency {
    /// Construct an agency with its mandatory attributes.
    pub fn new(
        feed_id: impl Into<String>,
        agency_id: impl Into<String>,
        agency_name: impl Into<String>,
        agency_url: impl Into<String>,
        agency_timezone: impl Into<String>,
    ) -> Self {
        Self {
            feed_id: feed_id.into(),
            agency_id: agency_id.into(),
            agency_name: agency_name.into(),
            agency_url: agency_url.into(),
            agency_timezone: agency_timezone.into(),
            agency_lang: None,
            agency_phone: None,
            agency_fare_url: None,
            agency_email: None,
        }
    }
}
