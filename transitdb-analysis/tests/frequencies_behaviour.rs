//! Behavioural tests for departure frequencies.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use transitdb_analysis::{
    FrequencyOptions, GroupFrequencies, PerStop, StationGrouping, StopGrouping, frequencies_with,
};
use transitdb_core::{
    Dao, Filter, Table,
    test_support::{sample_store, sample_sunday},
};

#[derive(Debug, Default)]
struct FrequencyWorld {
    dao: RefCell<Option<Dao>>,
    report: RefCell<Vec<GroupFrequencies>>,
}

impl FrequencyWorld {
    fn compute(&self, options: &FrequencyOptions, grouping: &impl StopGrouping) {
        let report = {
            let borrowed = self.dao.borrow();
            let dao = borrowed.as_ref().expect("store should be open");
            frequencies_with(dao, options, grouping).expect("frequencies")
        };
        self.report.replace(report);
    }

    fn busiest(&self, key: &str) -> (usize, Option<f64>) {
        let report = self.report.borrow();
        let group = report
            .iter()
            .find(|group| group.key == key)
            .expect("group reported");
        let date = group.dates.first().expect("busiest date");
        (date.departures, date.per_hour())
    }
}

#[fixture]
fn world() -> FrequencyWorld {
    FrequencyWorld::default()
}

#[given("the sample feed \"{feed}\"")]
fn given_sample_feed(world: &FrequencyWorld, feed: String) {
    world
        .dao
        .replace(Some(sample_store(&[feed.as_str()]).expect("sample store")));
}

#[when("frequencies are computed per station")]
fn when_per_station(world: &FrequencyWorld) {
    world.compute(&FrequencyOptions::default(), &StationGrouping);
}

#[when("frequencies are computed per stop on Sunday only")]
fn when_sunday(world: &FrequencyWorld) {
    let options = FrequencyOptions::default()
        .with_filter(Filter::eq(Table::CalendarDate.col("date"), sample_sunday()));
    world.compute(&options, &PerStop);
}

#[then("station \"{key}\" has {count} departures on its busiest date")]
fn then_station_departures(world: &FrequencyWorld, key: String, count: usize) {
    assert_eq!(world.busiest(&key).0, count);
}

#[then("stop \"{key}\" has {count} departures on its busiest date")]
fn then_stop_departures(world: &FrequencyWorld, key: String, count: usize) {
    assert_eq!(world.busiest(&key).0, count);
}

#[then("the rate at station \"{key}\" is {rate} departures per hour")]
fn then_rate(world: &FrequencyWorld, key: String, rate: f64) {
    let actual = world.busiest(&key).1.expect("rate defined");
    assert!((actual - rate).abs() < 1e-9);
}

#[then("stop \"{key}\" has no departure rate")]
fn then_no_rate(world: &FrequencyWorld, key: String) {
    assert!(world.busiest(&key).1.is_none());
}

#[scenario(path = "tests/features/frequencies.feature", index = 0)]
fn busiest_weekday_at_station(world: FrequencyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/frequencies.feature", index = 1)]
fn single_sunday_departure(world: FrequencyWorld) {
    let _ = world;
}
