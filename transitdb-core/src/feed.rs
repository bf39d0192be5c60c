use chrono::NaiveDate;

/// Metadata describing one stored feed.
///
/// Every other entity belongs to exactly one feed through its `feed_id`
/// partition key.
///
/// # Examples
/// ```
/// use transitdb_core::FeedInfo;
///
/// let feed = FeedInfo::new("paris");
/// assert_eq!(feed.feed_id, "paris");
/// assert!(feed.feed_publisher_name.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedInfo {
    /// Feed partition key.
    pub feed_id: String,
    /// Organisation publishing the feed.
    pub feed_publisher_name: Option<String>,
    /// Publisher website.
    pub feed_publisher_url: Option<String>,
    /// Technical contact address.
    pub feed_contact_email: Option<String>,
    /// Technical contact page.
    pub feed_contact_url: Option<String>,
    /// Default language, as an IETF tag.
    pub feed_lang: Option<String>,
    /// First day covered by the feed.
    pub feed_start_date: Option<NaiveDate>,
    /// Last day covered by the feed.
    pub feed_end_date: Option<NaiveDate>,
    /// Publisher's version label.
    pub feed_version: Option<String>,
}

impl FeedInfo {
    /// Construct feed metadata with only the partition key set.
    pub fn new(feed_id: impl Into<String>) -> Self {
        Self {
            feed_id: feed_id.into(),
            feed_publisher_name: None,
            feed_publisher_url: None,
            feed_contact_email: None,
            feed_contact_url: None,
            feed_lang: None,
            feed_start_date: None,
            feed_end_date: None,
            feed_version: None,
        }
    }
}
