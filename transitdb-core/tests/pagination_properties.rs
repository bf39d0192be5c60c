//! Property-based tests for paged listings.
//!
//! For any store size and window size, a paged listing yields exactly the
//! rows of the materialised listing, in the same order, using one statement
//! per full window plus the closing short one.

use std::collections::BTreeSet;

use proptest::prelude::*;
use transitdb_core::test_support::{numbered_feed, sample_monday};
use transitdb_core::{
    Agency, Calendar, CalendarDate, Dao, FeedInfo, Filter, Route, RouteType, Stop, StopPrefetch,
    StopQuery, StopTime, StopTimePrefetch, StopTimeQuery, Table, Trip, TripPrefetch, TripQuery,
};

fn store_with(trips: u32) -> Dao {
    let mut dao = Dao::open("").expect("open store");
    dao.add_all(numbered_feed("p", trips));
    dao.commit().expect("commit");
    dao
}

fn trip_ids(dao: &Dao, page_size: usize) -> Vec<String> {
    let query = TripQuery::new()
        .prefetch(TripPrefetch::NONE)
        .page_size(page_size);
    dao.trips(&query)
        .expect("trips")
        .into_vec()
        .expect("collect trips")
        .into_iter()
        .map(|loaded| loaded.trip.trip_id)
        .collect()
}

/// A feed of `stops` stops where trip `i` calls at the stops in `calls[i].1`
/// and runs every weekday when `calls[i].0` holds, else only on Sunday.
///
/// Each stop is reached by many trips and each weekday trip by five dates,
/// so a calendar-filtered stop listing joins far more rows than it returns.
fn joined_store(stops: u32, calls: &[(bool, BTreeSet<u32>)]) -> Dao {
    let mut dao = Dao::open("").expect("open store");
    let monday = sample_monday();
    dao.add(FeedInfo::new("j"));
    dao.add(Agency::new("j", "A", "Agency", "https://agency.example", "UTC"));
    dao.add(Route::new("j", "R", "A", RouteType::Bus));
    dao.add(Calendar::new("j", "WEEK"));
    dao.add(Calendar::new("j", "SUN"));
    dao.add_all(
        monday
            .iter_days()
            .take(5)
            .map(|date| CalendarDate::new("j", "WEEK", date)),
    );
    dao.add(CalendarDate::new(
        "j",
        "SUN",
        monday.iter_days().nth(6).expect("sunday"),
    ));
    dao.add_all((0..stops).map(|index| {
        Stop::new("j", stop_id(index), "Stop", 0.0, f64::from(index))
    }));
    for (index, (weekday, called)) in calls.iter().enumerate() {
        let trip_id = format!("trip-{index:03}");
        let service = if *weekday { "WEEK" } else { "SUN" };
        dao.add(Trip::new("j", trip_id.as_str(), "R", service));
        for (sequence, stop) in (1_u32..).zip(called.iter().filter(|stop| **stop < stops)) {
            dao.add(StopTime::new("j", trip_id.as_str(), sequence, stop_id(*stop)));
        }
    }
    dao.commit().expect("commit");
    dao
}

fn stop_id(index: u32) -> String {
    format!("stop-{index:03}")
}

fn weekday_stop_ids(dao: &Dao, page_size: usize) -> Vec<String> {
    let monday = sample_monday();
    let midweek = monday.iter_days().nth(2).expect("wednesday");
    let query = StopQuery::new()
        .calendar_filter(Filter::between(Table::CalendarDate.col("date"), monday, midweek))
        .prefetch(StopPrefetch::NONE)
        .page_size(page_size);
    dao.stops(&query)
        .expect("stops")
        .into_vec()
        .expect("collect stops")
        .into_iter()
        .map(|loaded| loaded.stop.stop_id)
        .collect()
}

fn trip_calls() -> impl Strategy<Value = Vec<(bool, BTreeSet<u32>)>> {
    prop::collection::vec(
        (any::<bool>(), prop::collection::btree_set(0_u32..24, 0..8)),
        0..12,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: paging a joined, de-duplicated listing yields each matching
    /// stop exactly once, in key order, whatever the window size.
    #[test]
    fn paged_joined_stops_match_materialised(
        stops in 1_u32..24,
        calls in trip_calls(),
        page_size in 1_usize..9,
    ) {
        let dao = joined_store(stops, &calls);
        let expected: Vec<String> = calls
            .iter()
            .filter(|(weekday, _)| *weekday)
            .flat_map(|(_, called)| called.iter().copied())
            .filter(|stop| *stop < stops)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(stop_id)
            .collect();

        let materialised = weekday_stop_ids(&dao, 0);
        prop_assert_eq!(&materialised, &expected);
        prop_assert_eq!(weekday_stop_ids(&dao, page_size), materialised);
    }

    /// Property: paging never changes the listed rows or their order.
    #[test]
    fn paged_trips_match_materialised(trips in 0_u32..40, page_size in 1_usize..12) {
        let dao = store_with(trips);
        let materialised = trip_ids(&dao, 0);
        prop_assert_eq!(materialised.len(), trips as usize);
        prop_assert_eq!(trip_ids(&dao, page_size), materialised);
    }

    /// Property: a listing of `n` rows in windows of `k` costs `n / k + 1` statements.
    #[test]
    fn paging_terminates_after_short_window(trips in 0_u32..40, page_size in 1_usize..12) {
        let dao = store_with(trips);
        let before = dao.statement_count();
        let listed = trip_ids(&dao, page_size);
        let statements = dao.statement_count() - before;
        let full_windows = listed.len() / page_size;
        prop_assert_eq!(statements, full_windows as u64 + 1);
    }

    /// Property: prefetching per window yields the same calls as one batch.
    #[test]
    fn paged_prefetch_matches_materialised(trips in 1_u32..20, page_size in 1_usize..7) {
        let dao = store_with(trips);
        let query = StopTimeQuery::new().prefetch(StopTimePrefetch {
            trip_stop_times: true,
            ..StopTimePrefetch::NONE
        });
        let materialised = dao
            .stoptimes(&query)
            .expect("stop times")
            .into_vec()
            .expect("collect");
        let paged = dao
            .stoptimes(&query.clone().page_size(page_size))
            .expect("stop times")
            .into_vec()
            .expect("collect");
        prop_assert_eq!(paged, materialised);
    }
}
