use chrono::NaiveDate;

/// A service calendar: the set of dates a group of trips runs on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calendar {
    /// Feed partition key.
    pub feed_id: String,
    /// Identifier local to the feed.
    pub service_id: String,
}

impl Calendar {
    /// Construct a calendar.
    pub fn new(feed_id: impl Into<String>, service_id: impl Into<String>) -> Self {
        Self {
            feed_id: feed_id.into(),
            service_id: service_id.into(),
        }
    }
}

/// One date on which a calendar's service runs.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use transitdb_core::CalendarDate;
///
/// let date = NaiveDate::from_ymd_opt(2016, 1, 22).expect("valid date");
/// let service_date = CalendarDate::new("paris", "weekdays", date);
/// assert_eq!(service_date.date.to_string(), "2016-01-22");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalendarDate {
    /// Feed partition key.
    pub feed_id: String,
    /// Calendar this date belongs to.
    pub service_id: String,
    /// Day on which the service runs.
    pub date: NaiveDate,
}

impl CalendarDate {
    /// Construct a service date.
    pub fn new(feed_id: impl Into<String>, service_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            feed_id: feed_id.into(),
            service_id: service_id.into(),
            date,
        }
    }
}
