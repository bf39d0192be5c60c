//! Departure frequencies per group of stops.
//!
//! The same filter selects the stops, the service dates and the trips, so a
//! filter on `CalendarDate.date` restricts the report to that date while a
//! filter on `Stop.stop_name` reports every date the stop is served.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use log::{debug, info, warn};
use transitdb_core::{
    Dao, Filter, LoadedTrip, Stop, StopPrefetch, StopQuery, TripPrefetch, TripQuery,
};

use crate::{FrequencyError, PerStop, StopGrouping};

/// Rows fetched per window when scanning stops and trips.
pub const DEFAULT_PAGE_SIZE: usize = 1_000;

const PROGRESS_INTERVAL: usize = 1_000;
const SECONDS_PER_HOUR: u32 = 3_600;

/// What to analyse and how to report it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyOptions {
    /// Restricts stops, service dates and trips alike.
    pub filter: Option<Filter>,
    /// Report every service date instead of only the busiest one.
    pub all_dates: bool,
    /// Window size used while scanning; zero loads everything at once.
    pub page_size: usize,
}

impl Default for FrequencyOptions {
    fn default() -> Self {
        Self {
            filter: None,
            all_dates: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FrequencyOptions {
    /// Restrict the analysis to entities matching `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Report every service date instead of only the busiest one.
    #[must_use]
    pub const fn with_all_dates(mut self, all_dates: bool) -> Self {
        self.all_dates = all_dates;
        self
    }

    /// Scan trips in windows of `page_size`; zero loads everything at once.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Departures of one group on one service date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFrequency {
    /// Service date.
    pub date: NaiveDate,
    /// Trips leaving a stop of the group on that date.
    pub departures: usize,
    /// Earliest departure, seconds after midnight.
    pub first: u32,
    /// Latest departure, seconds after midnight.
    pub last: u32,
}

impl DateFrequency {
    const fn starting(date: NaiveDate, departure: u32) -> Self {
        Self {
            date,
            departures: 1,
            first: departure,
            last: departure,
        }
    }

    fn record(&mut self, departure: u32) {
        self.departures += 1;
        self.first = self.first.min(departure);
        self.last = self.last.max(departure);
    }

    /// Average departures per hour between the first and last departure.
    ///
    /// `None` when every departure happens at the same time.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "rates are reported as fractional departures per hour"
    )]
    pub fn per_hour(&self) -> Option<f64> {
        let span = self.last.checked_sub(self.first).filter(|span| *span > 0)?;
        let departures = u32::try_from(self.departures).ok()?;
        Some(f64::from(departures) * f64::from(SECONDS_PER_HOUR) / f64::from(span))
    }
}

/// Frequencies of one group of stops.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupFrequencies {
    /// Feed the group belongs to.
    pub feed_id: String,
    /// Key assigned by the [`StopGrouping`].
    pub key: String,
    /// Selected stops of the group, in key order.
    pub stops: Vec<Stop>,
    /// Reported dates, earliest first; a single entry unless every date was
    /// requested.
    pub dates: Vec<DateFrequency>,
}

type GroupId = (String, String);
type Tallies = HashMap<GroupId, BTreeMap<NaiveDate, DateFrequency>>;

#[derive(Debug, Default)]
struct Selection {
    groups: BTreeMap<GroupId, Vec<Stop>>,
    /// feed → stop → group key
    members: HashMap<String, HashMap<String, String>>,
}

impl Selection {
    fn group_of(&self, feed_id: &str, stop_id: &str) -> Option<&String> {
        self.members.get(feed_id)?.get(stop_id)
    }
}

/// Frequencies with every stop reported on its own.
///
/// # Errors
///
/// Returns [`FrequencyError::Store`] when a read fails or the filter is
/// rejected.
pub fn frequencies(
    dao: &Dao,
    options: &FrequencyOptions,
) -> Result<Vec<GroupFrequencies>, FrequencyError> {
    frequencies_with(dao, options, &PerStop)
}

/// Frequencies with stops grouped by `grouping`.
///
/// Groups without any departure on a selected date are left out. When only
/// the busiest date is requested, ties go to the later date.
///
/// # Errors
///
/// Returns [`FrequencyError::Store`] when a read fails or the filter is
/// rejected.
pub fn frequencies_with(
    dao: &Dao,
    options: &FrequencyOptions,
    grouping: &impl StopGrouping,
) -> Result<Vec<GroupFrequencies>, FrequencyError> {
    let selection = select_stops(dao, options, grouping)?;
    let dates: BTreeSet<NaiveDate> = dao
        .service_dates(options.filter.as_ref())
        .map_err(FrequencyError::store("service dates"))?
        .into_iter()
        .collect();
    info!("analysing {} service dates", dates.len());

    let tallies = count_departures(dao, options, &selection, &dates)?;
    Ok(report(selection, tallies, options.all_dates))
}

fn select_stops(
    dao: &Dao,
    options: &FrequencyOptions,
    grouping: &impl StopGrouping,
) -> Result<Selection, FrequencyError> {
    let mut query = StopQuery::new()
        .prefetch(StopPrefetch::NONE)
        .page_size(options.page_size);
    if let Some(filter) = &options.filter {
        query = query.filter(filter.clone());
    }

    let mut selection = Selection::default();
    let mut count = 0_usize;
    for row in dao.stops(&query).map_err(FrequencyError::store("stops"))? {
        let stop = row.map_err(FrequencyError::store("stops"))?.stop;
        let key = grouping.group_key(&stop).to_owned();
        selection
            .members
            .entry(stop.feed_id.clone())
            .or_default()
            .insert(stop.stop_id.clone(), key.clone());
        selection
            .groups
            .entry((stop.feed_id.clone(), key))
            .or_default()
            .push(stop);
        count += 1;
    }
    info!("selected {count} stops in {} groups", selection.groups.len());
    Ok(selection)
}

fn count_departures(
    dao: &Dao,
    options: &FrequencyOptions,
    selection: &Selection,
    dates: &BTreeSet<NaiveDate>,
) -> Result<Tallies, FrequencyError> {
    let mut query = TripQuery::new()
        .prefetch(TripPrefetch {
            stop_times: true,
            calendar: true,
            ..TripPrefetch::NONE
        })
        .page_size(options.page_size);
    if let Some(filter) = &options.filter {
        query = query.filter(filter.clone());
    }

    let mut tallies = Tallies::new();
    let mut untimed = 0_usize;
    let mut scanned = 0_usize;
    for row in dao.trips(&query).map_err(FrequencyError::store("trips"))? {
        let loaded = row.map_err(FrequencyError::store("trips"))?;
        untimed += tally_trip(&loaded, selection, dates, &mut tallies);
        scanned += 1;
        if scanned.is_multiple_of(PROGRESS_INTERVAL) {
            debug!("{scanned} trips scanned");
        }
    }
    if untimed > 0 {
        warn!("skipped {untimed} calls without a departure time");
    }
    info!("scanned {scanned} trips");
    Ok(tallies)
}

/// Add the departures of one trip; returns the number of untimed calls.
fn tally_trip(
    loaded: &LoadedTrip,
    selection: &Selection,
    dates: &BTreeSet<NaiveDate>,
    tallies: &mut Tallies,
) -> usize {
    let Some(calendar) = loaded.calendar.loaded() else {
        warn!(
            "trip {} of feed {} has no calendar; skipped",
            loaded.trip.trip_id, loaded.trip.feed_id
        );
        return 0;
    };
    let service: Vec<NaiveDate> = calendar
        .dates
        .loaded()
        .into_iter()
        .flatten()
        .map(|date| date.date)
        .filter(|date| dates.contains(date))
        .collect();

    let mut untimed = 0;
    for call in loaded.stop_times.loaded().into_iter().flatten() {
        let stop_time = &call.stop_time;
        let Some(departure) = stop_time.departure_time else {
            untimed += 1;
            continue;
        };
        let Some(key) = selection.group_of(&stop_time.feed_id, &stop_time.stop_id) else {
            continue;
        };
        let by_date = tallies
            .entry((stop_time.feed_id.clone(), key.clone()))
            .or_default();
        for date in &service {
            by_date
                .entry(*date)
                .and_modify(|tally| tally.record(departure))
                .or_insert_with(|| DateFrequency::starting(*date, departure));
        }
    }
    untimed
}

fn report(selection: Selection, mut tallies: Tallies, all_dates: bool) -> Vec<GroupFrequencies> {
    selection
        .groups
        .into_iter()
        .filter_map(|((feed_id, key), stops)| {
            let by_date = tallies.remove(&(feed_id.clone(), key.clone()))?;
            let dates: Vec<DateFrequency> = if all_dates {
                by_date.into_values().collect()
            } else {
                busiest(by_date).into_iter().collect()
            };
            (!dates.is_empty()).then_some(GroupFrequencies {
                feed_id,
                key,
                stops,
                dates,
            })
        })
        .collect()
}

/// The date with most departures; dates are visited in order, so the later
/// date wins a tie.
fn busiest(by_date: BTreeMap<NaiveDate, DateFrequency>) -> Option<DateFrequency> {
    by_date.into_values().reduce(|best, candidate| {
        if candidate.departures >= best.departures {
            candidate
        } else {
            best
        }
    })
}

/// Render seconds after midnight as `HH:MM:SS`; hours may exceed 23.
#[must_use]
pub fn format_time(seconds: u32) -> String {
    let hours = seconds.div_euclid(SECONDS_PER_HOUR);
    let minutes = seconds.rem_euclid(SECONDS_PER_HOUR).div_euclid(60);
    let rest = seconds.rem_euclid(60);
    format!("{hours:02}:{minutes:02}:{rest:02}")
}
