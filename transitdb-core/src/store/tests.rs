//! Session-level tests against in-memory and file-backed stores.

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::{
    CalendarPrefetch, CalendarQuery, Filter, LocationType, Related, Route, RouteQuery, RouteType,
    StaticFeed, Stop, StopPrefetch, StopQuery, StopTime, StopTimePrefetch, StopTimeQuery, Table,
    Trip, TripPrefetch, TripQuery, Zone,
    test_support::{numbered_feed, sample_feed, sample_monday, sample_store, sample_sunday},
};

#[fixture]
fn dao() -> Dao {
    sample_store(&["f"]).expect("sample store")
}

fn trip_ids(dao: &Dao, query: &TripQuery) -> Vec<String> {
    dao.trips(query)
        .expect("trips")
        .into_vec()
        .expect("collect trips")
        .into_iter()
        .map(|loaded| loaded.trip.trip_id)
        .collect()
}

fn stop_ids(dao: &Dao, query: &StopQuery) -> Vec<String> {
    dao.stops(query)
        .expect("stops")
        .into_vec()
        .expect("collect stops")
        .into_iter()
        .map(|loaded| loaded.stop.stop_id)
        .collect()
}

#[rstest]
fn committed_entities_read_back_equal(dao: Dao) {
    assert_eq!(
        dao.trip("f", "T1").expect("lookup"),
        Some(Trip::new("f", "T1", "R1", "WEEK"))
    );
    assert_eq!(
        dao.route("f", "R2").expect("lookup"),
        Some(Route::new("f", "R2", "A1", RouteType::Tram).with_short_name("R2"))
    );
    let station = dao.stop("f", "S").expect("lookup").expect("station stored");
    assert_eq!(station.location_type, LocationType::Station);
    assert!(dao.trip("f", "missing").expect("lookup").is_none());
    assert!(dao.trip("other", "T1").expect("lookup").is_none());
}

#[rstest]
fn duplicate_key_fails_flush_until_rollback(mut dao: Dao) {
    dao.add(Trip::new("f", "T1", "R1", "WEEK"));
    let err = dao.flush().expect_err("duplicate key");
    assert!(matches!(
        err,
        DaoError::Constraint {
            table: Some(Table::Trip),
            ..
        }
    ));
    assert!(dao.is_failed());
    assert!(matches!(dao.feeds(), Err(DaoError::SessionFailed)));
    assert!(matches!(dao.flush(), Err(DaoError::SessionFailed)));

    dao.rollback().expect("rollback");
    assert!(!dao.is_failed());
    assert_eq!(dao.feeds().expect("feeds").len(), 1);
}

#[rstest]
fn dangling_reference_fails_at_commit() {
    let mut dao = Dao::open("").expect("open store");
    dao.add(crate::FeedInfo::new("f"));
    dao.add(Trip::new("f", "orphan", "no-route", "no-calendar"));
    dao.flush().expect("references are checked at commit");

    let err = dao.commit().expect_err("dangling reference");
    assert!(matches!(
        err,
        DaoError::Constraint {
            operation: "commit",
            table: None,
            ..
        }
    ));
    assert!(dao.is_failed());
    dao.rollback().expect("rollback");
    assert!(dao.feeds().expect("feeds").is_empty());
}

#[rstest]
fn third_hierarchy_level_is_rejected(mut dao: Dao) {
    dao.add(Stop::new("f", "S1a", "Nested", 45.0, 2.0).with_parent_station("S1"));
    let err = dao.flush().expect_err("depth limit");
    assert!(matches!(
        err,
        DaoError::Constraint {
            table: Some(Table::Stop),
            ..
        }
    ));
}

#[rstest]
fn reads_do_not_flush_staged_work() {
    let mut dao = Dao::open("").expect("open store");
    dao.add(crate::FeedInfo::new("f"));
    assert_eq!(dao.staged(), 1);
    assert!(dao.feed("f").expect("lookup").is_none());

    dao.flush().expect("flush");
    assert_eq!(dao.staged(), 0);
    assert!(dao.feed("f").expect("lookup").is_some());

    dao.rollback().expect("rollback");
    assert!(dao.feed("f").expect("lookup").is_none());
}

#[rstest]
fn staged_deletes_remove_rows(mut dao: Dao) {
    let calls = dao
        .trip_stop_times(&Trip::new("f", "T1", "R1", "WEEK"))
        .expect("stop times");
    dao.delete(Trip::new("f", "T1", "R1", "WEEK"));
    for call in calls {
        dao.delete(call);
    }
    dao.commit().expect("commit");

    assert!(dao.trip("f", "T1").expect("lookup").is_none());
    assert_eq!(trip_ids(&dao, &TripQuery::new()), ["T2", "T3", "T4"]);
}

#[rstest]
#[case(
    TripQuery::new().route_filter(Filter::eq(Table::Route.col("route_short_name"), "R2")),
    &["T3", "T4"]
)]
#[case(
    TripQuery::new()
        .route_filter(Filter::eq(Table::Route.col("route_short_name"), "R2"))
        .calendar_filter(Filter::eq(Table::CalendarDate.col("date"), sample_sunday())),
    &["T3"]
)]
#[case(
    TripQuery::new().stoptime_filter(Filter::eq(Table::StopTime.col("stop_id"), "S1")),
    &["T1", "T2"]
)]
#[case(
    TripQuery::new().filter(Filter::eq(Table::Stop.col("stop_name"), "Upstream")),
    &["T3", "T4"]
)]
#[case(
    TripQuery::new().calendar_filter(Filter::one_of(Table::CalendarDate.col("date"), Vec::<chrono::NaiveDate>::new())),
    &[]
)]
fn axis_filters_combine_conjunctively(
    dao: Dao,
    #[case] query: TripQuery,
    #[case] expected: &[&str],
) {
    assert_eq!(trip_ids(&dao, &query), expected);
}

#[rstest]
fn joined_stop_listing_has_no_duplicates(dao: Dao) {
    let query = StopQuery::new().trip_filter(Filter::eq(Table::Trip.col("route_id"), "R1"));
    assert_eq!(stop_ids(&dao, &query), ["S1", "T"]);
}

#[rstest]
#[case(3.0, &["S", "S1", "S2", "U"])]
#[case(1.5, &["U"])]
fn zone_restricts_stops(dao: Dao, #[case] max_lon: f64, #[case] expected: &[&str]) {
    let zone = Zone::new(44.0, 46.0, 1.0, max_lon).expect("valid zone");
    assert_eq!(stop_ids(&dao, &StopQuery::new().zone(zone)), expected);
}

#[rstest]
fn out_of_scope_axis_filter_is_rejected(dao: Dao) {
    let query = TripQuery::new().route_filter(Filter::eq(Table::Stop.col("stop_id"), "S"));
    let err = dao.trips(&query).expect_err("stop is not reachable from route_filter");
    assert!(matches!(
        err,
        DaoError::Filter(crate::FilterError::OutOfScope {
            axis: "route_filter",
            table: Table::Stop
        })
    ));
}

#[rstest]
fn prefetched_trips_match_lazy_navigation(dao: Dao) {
    let prefetch = TripPrefetch {
        stops: true,
        route: true,
        calendar: true,
        ..TripPrefetch::NONE
    };
    let trips = dao
        .trips(&TripQuery::new().prefetch(prefetch))
        .expect("trips")
        .into_vec()
        .expect("collect");
    assert_eq!(trips.len(), 4);

    for loaded in trips {
        let calls = loaded.stop_times.loaded().expect("stop times prefetched");
        let lazy = dao.trip_stop_times(&loaded.trip).expect("lazy stop times");
        let eager: Vec<&StopTime> = calls.iter().map(|call| &call.stop_time).collect();
        assert_eq!(eager, lazy.iter().collect::<Vec<_>>());
        for call in calls {
            let stop = dao.stop_time_stop(&call.stop_time).expect("lazy stop");
            assert_eq!(call.stop.loaded(), stop.as_ref());
        }
        let route = dao.trip_route(&loaded.trip).expect("lazy route");
        assert_eq!(loaded.route.loaded(), route.as_ref());
        let calendar = loaded.calendar.loaded().expect("calendar prefetched");
        let dates = dao.calendar_dates_of(&calendar.calendar).expect("lazy dates");
        assert_eq!(calendar.dates.loaded(), Some(&dates));
    }
}

#[rstest]
#[case(TripPrefetch::NONE, 1)]
#[case(TripPrefetch::default(), 2)]
#[case(TripPrefetch { stops: true, ..TripPrefetch::NONE }, 3)]
#[case(TripPrefetch { route: true, calendar: true, ..TripPrefetch::NONE }, 4)]
fn prefetch_issues_one_statement_per_relation(
    dao: Dao,
    #[case] prefetch: TripPrefetch,
    #[case] statements: u64,
) {
    let before = dao.statement_count();
    let trips = dao
        .trips(&TripQuery::new().prefetch(prefetch))
        .expect("trips")
        .into_vec()
        .expect("collect");
    assert_eq!(trips.len(), 4);
    assert_eq!(dao.statement_count() - before, statements);
}

#[rstest]
fn stop_prefetch_loads_hierarchy(dao: Dao) {
    let stops = dao
        .stops(&StopQuery::new())
        .expect("stops")
        .into_vec()
        .expect("collect");
    let station = stops
        .iter()
        .find(|loaded| loaded.stop.stop_id == "S")
        .expect("station listed");
    assert_eq!(station.parent, Related::Loaded(None));
    let sub_stops: Vec<&str> = station
        .sub_stops
        .loaded()
        .expect("sub-stops prefetched")
        .iter()
        .map(|stop| stop.stop_id.as_str())
        .collect();
    assert_eq!(sub_stops, ["S1", "S2"]);

    let platform = stops
        .iter()
        .find(|loaded| loaded.stop.stop_id == "S1")
        .expect("platform listed");
    assert_eq!(
        platform.parent.loaded().and_then(Option::as_ref),
        Some(&station.stop)
    );

    let bare = dao
        .stops(&StopQuery::new().prefetch(StopPrefetch::NONE))
        .expect("stops")
        .into_vec()
        .expect("collect");
    assert!(bare.iter().all(|loaded| !loaded.parent.is_loaded()));
}

#[rstest]
fn stop_parent_without_parent_runs_no_query(dao: Dao) {
    let station = dao.stop("f", "S").expect("lookup").expect("station");
    let before = dao.statement_count();
    assert!(dao.stop_parent(&station).expect("parent").is_none());
    assert_eq!(dao.statement_count(), before);

    let sub_stops = dao.stop_sub_stops(&station).expect("sub-stops");
    let parent = dao.stop_parent(&sub_stops[0]).expect("parent");
    assert_eq!(parent, Some(station));
}

#[rstest]
fn calendar_prefetch_reaches_stop_times(dao: Dao) {
    let prefetch = CalendarPrefetch {
        stop_times: true,
        ..CalendarPrefetch::NONE
    };
    let calendars = dao
        .calendars(&CalendarQuery::new().prefetch(prefetch))
        .expect("calendars");
    let sunday = calendars
        .iter()
        .find(|loaded| loaded.calendar.service_id == "SUN")
        .expect("sunday calendar");
    assert!(!sunday.dates.is_loaded());
    let trips = sunday.trips.loaded().expect("trips implied");
    assert_eq!(trips.len(), 1);
    let calls = trips[0].stop_times.loaded().expect("stop times");
    assert_eq!(calls.len(), 3);
}

#[rstest]
fn stop_time_prefetch_loads_whole_trip(dao: Dao) {
    let query = StopTimeQuery::new()
        .filter(Filter::eq(Table::StopTime.col("stop_id"), "U"))
        .prefetch(StopTimePrefetch {
            trip_stop_times: true,
            ..StopTimePrefetch::NONE
        });
    let calls = dao
        .stoptimes(&query)
        .expect("stop times")
        .into_vec()
        .expect("collect");
    assert_eq!(calls.len(), 2);
    for call in calls {
        let trip = call.trip.loaded().expect("trip implied");
        assert_eq!(trip.trip.trip_id, call.stop_time.trip_id);
        assert!(trip.stop_times.loaded().is_some_and(|all| all.len() >= 2));
    }
}

#[rstest]
fn routes_and_agencies_prefetch_children(dao: Dao) {
    let routes = dao
        .routes(&RouteQuery::new().prefetch(crate::RoutePrefetch { trips: true }))
        .expect("routes");
    let counts: Vec<usize> = routes
        .iter()
        .map(|loaded| loaded.trips.loaded().map_or(0, Vec::len))
        .collect();
    assert_eq!(counts, [2, 2]);

    let agencies = dao
        .agencies(&crate::AgencyQuery::new().prefetch(crate::AgencyPrefetch { routes: true }))
        .expect("agencies");
    assert_eq!(agencies.len(), 1);
    let lazy = dao.agency_routes(&agencies[0].agency).expect("lazy routes");
    assert_eq!(agencies[0].routes.loaded(), Some(&lazy));
}

#[rstest]
#[case(7, 3, 3)]
#[case(6, 3, 3)]
#[case(2, 5, 1)]
fn paging_stops_after_short_window(
    #[case] trips: u32,
    #[case] page_size: usize,
    #[case] windows: u64,
) {
    let mut dao = Dao::open("").expect("open store");
    dao.add_all(numbered_feed("n", trips));
    dao.commit().expect("commit");

    let query = TripQuery::new()
        .prefetch(TripPrefetch::NONE)
        .page_size(page_size);
    let before = dao.statement_count();
    let paged = trip_ids(&dao, &query);
    assert_eq!(dao.statement_count() - before, windows);

    let materialized = trip_ids(&dao, &query.clone().page_size(0));
    assert_eq!(paged, materialized);
    assert_eq!(paged.len(), trips as usize);
}

#[rstest]
fn empty_paged_result_costs_one_statement(dao: Dao) {
    let query = TripQuery::new()
        .filter(Filter::eq(Table::Trip.col("trip_id"), "none"))
        .page_size(10);
    let before = dao.statement_count();
    assert!(trip_ids(&dao, &query).is_empty());
    assert_eq!(dao.statement_count() - before, 1);
}

#[rstest]
fn drained_cursor_reports_exhaustion(dao: Dao) {
    let query = TripQuery::new().prefetch(TripPrefetch::NONE).page_size(3);
    let mut rows = dao.trips(&query).expect("trips").into_iter();
    let mut seen = 0;
    for row in rows.by_ref() {
        row.expect("window");
        seen += 1;
    }
    assert_eq!(seen, 4);
    assert!(matches!(rows.next(), Some(Err(DaoError::CursorExhausted))));
}

#[rstest]
fn delete_feed_cascades_within_one_feed() {
    let mut dao = sample_store(&["a", "b"]).expect("sample store");
    let deleted = dao.delete_feed("a").expect("cascade");
    assert_eq!(
        deleted,
        DeletedRows {
            stop_times: 9,
            trips: 4,
            calendar_dates: 6,
            calendars: 2,
            routes: 2,
            stops: 5,
            agencies: 1,
            feed_info: 1,
        }
    );
    assert_eq!(deleted.total(), sample_feed("a").len());
    dao.commit().expect("commit");

    for table in Table::ALL {
        let filter = Filter::eq(table.col("feed_id"), "a");
        let select = {
            let mut select = compose::Select::new(table);
            select.filter("filter", Some(&filter), &Table::ALL).expect("filter");
            select
        };
        let sql = select.sql_with("COUNT(*)", "1", None);
        let remaining: i64 = dao
            .connection
            .query_row(&sql, params_from_iter(select.params()), |row| row.get(0))
            .expect("count");
        assert_eq!(remaining, 0, "{table} still holds rows of feed a");
    }
    assert_eq!(trip_ids(&dao, &TripQuery::new()).len(), 4);
    assert!(dao.feed("b").expect("lookup").is_some());
}

#[rstest]
fn rolled_back_cascade_restores_feed(mut dao: Dao) {
    dao.delete_feed("f").expect("cascade");
    assert!(dao.feed("f").expect("lookup").is_none());
    dao.rollback().expect("rollback");
    assert!(dao.feed("f").expect("lookup").is_some());
    assert_eq!(trip_ids(&dao, &TripQuery::new()).len(), 4);
}

#[rstest]
fn deleting_unknown_feed_removes_nothing(mut dao: Dao) {
    let deleted = dao.delete_feed("nope").expect("cascade");
    assert_eq!(deleted.total(), 0);
}

#[rstest]
fn service_dates_follow_filters(dao: Dao) {
    let all = dao.service_dates(None).expect("dates");
    assert_eq!(all.len(), 6);
    assert_eq!(all.first(), Some(&sample_monday()));
    assert_eq!(all.last(), Some(&sample_sunday()));

    let r1 = dao
        .service_dates(Some(&Filter::eq(Table::Trip.col("route_id"), "R1")))
        .expect("dates");
    assert_eq!(r1.len(), 5);
    assert!(!r1.contains(&sample_sunday()));
}

#[rstest]
fn calendar_dates_list_in_key_order(dao: Dao) {
    let dates = dao
        .calendar_dates(Some(&Filter::eq(
            Table::CalendarDate.col("service_id"),
            "WEEK",
        )))
        .expect("dates");
    assert_eq!(dates.len(), 5);
    assert!(dates.windows(2).all(|pair| pair[0].date < pair[1].date));
}

#[rstest]
fn load_feed_retags_static_source() {
    let mut dao = Dao::open("").expect("open store");
    let source: StaticFeed = sample_feed("template").into_iter().collect();
    let count = dao.load_feed(&source, "copy").expect("load");
    assert_eq!(count, source.len());
    assert!(dao.feed("copy").expect("lookup").is_some());
    assert!(dao.feed("template").expect("lookup").is_none());
    assert_eq!(dao.staged(), 0);
}

#[rstest]
#[case("postgresql://localhost/feeds")]
#[case("sqlite:///")]
#[case("sqlite://host/feeds.db")]
fn rejects_unusable_locators(#[case] locator: &str) {
    let err = Dao::open(locator).expect_err("locator rejected");
    assert!(matches!(
        err,
        DaoError::UnsupportedScheme { .. } | DaoError::MalformedLocator { .. }
    ));
}

#[rstest]
fn file_store_persists_across_sessions() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("feeds.db");
    let locator = path.to_str().expect("utf-8 path");
    {
        let mut dao = Dao::open(locator).expect("create store");
        dao.add_all(sample_feed("f"));
        dao.commit().expect("commit");
    }
    let url = format!("sqlite:///{locator}");
    let dao = Dao::open_with(&DaoOptions::new(url).with_sql_logging(true)).expect("reopen");
    assert_eq!(dao.feeds().expect("feeds").len(), 1);
    assert_eq!(trip_ids(&dao, &TripQuery::new()).len(), 4);
}
