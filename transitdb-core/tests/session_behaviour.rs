//! Behavioural tests for the unit of work using rstest-bdd.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use transitdb_core::{
    Dao, DaoError, FeedInfo, Table, Trip,
    test_support::{sample_feed, sample_store},
};

/// Shared state for session scenarios.
#[derive(Debug, Default)]
struct SessionWorld {
    dao: RefCell<Option<Dao>>,
    error: RefCell<Option<DaoError>>,
}

impl SessionWorld {
    fn with_dao<R>(&self, action: impl FnOnce(&mut Dao) -> R) -> R {
        let mut borrowed = self.dao.borrow_mut();
        let dao = borrowed.as_mut().expect("store should be open");
        action(dao)
    }
}

#[fixture]
fn world() -> SessionWorld {
    SessionWorld::default()
}

#[given("an empty in-memory store")]
fn given_empty_store(world: &SessionWorld) {
    world.dao.replace(Some(Dao::open("").expect("open store")));
}

#[given("a store holding the sample feed \"{feed}\"")]
fn given_sample_store(world: &SessionWorld, feed: String) {
    world
        .dao
        .replace(Some(sample_store(&[feed.as_str()]).expect("sample store")));
}

#[when("the sample feed \"{feed}\" is staged and committed")]
fn when_sample_committed(world: &SessionWorld, feed: String) {
    world.with_dao(|dao| {
        dao.add_all(sample_feed(&feed));
        dao.commit().expect("commit");
    });
}

#[when("trip \"{trip}\" of feed \"{feed}\" is staged again and flushed")]
fn when_duplicate_flushed(world: &SessionWorld, trip: String, feed: String) {
    let outcome = world.with_dao(|dao| {
        dao.add(Trip::new(feed.as_str(), trip.as_str(), "R1", "WEEK"));
        dao.flush()
    });
    world.error.replace(outcome.err());
}

#[when("the session is rolled back")]
fn when_rolled_back(world: &SessionWorld) {
    world.with_dao(|dao| dao.rollback().expect("rollback"));
}

#[when("feed \"{feed}\" is staged without flushing")]
fn when_staged_only(world: &SessionWorld, feed: String) {
    world.with_dao(|dao| dao.add(FeedInfo::new(feed)));
}

#[then("trip \"{trip}\" of feed \"{feed}\" runs on route \"{route}\" with calendar \"{calendar}\"")]
fn then_trip_reads_back(
    world: &SessionWorld,
    trip: String,
    feed: String,
    route: String,
    calendar: String,
) {
    let stored = world.with_dao(|dao| dao.trip(&feed, &trip).expect("lookup"));
    assert_eq!(stored, Some(Trip::new(feed, trip, route, calendar)));
}

#[then("the store lists {count} feed")]
fn then_feed_count(world: &SessionWorld, count: usize) {
    let feeds = world.with_dao(|dao| dao.feeds().expect("feeds"));
    assert_eq!(feeds.len(), count);
}

#[then("the flush fails with a constraint violation on Trip")]
fn then_constraint_on_trip(world: &SessionWorld) {
    let error = world.error.borrow();
    assert!(matches!(
        error.as_ref(),
        Some(DaoError::Constraint {
            table: Some(Table::Trip),
            ..
        })
    ));
}

#[then("listing feeds fails because the session has failed")]
fn then_session_failed(world: &SessionWorld) {
    let outcome = world.with_dao(|dao| dao.feeds());
    assert!(matches!(outcome, Err(DaoError::SessionFailed)));
}

#[then("feed \"{feed}\" is not visible")]
fn then_feed_invisible(world: &SessionWorld, feed: String) {
    let stored = world.with_dao(|dao| dao.feed(&feed).expect("lookup"));
    assert!(stored.is_none());
}

#[then("{count} operation is waiting to be flushed")]
fn then_staged(world: &SessionWorld, count: usize) {
    assert_eq!(world.with_dao(|dao| dao.staged()), count);
}

#[scenario(path = "tests/features/session.feature", index = 0)]
fn committed_feed_reads_back(world: SessionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/session.feature", index = 1)]
fn duplicate_key_poisons_session(world: SessionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/session.feature", index = 2)]
fn rollback_recovers(world: SessionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/session.feature", index = 3)]
fn queries_do_not_flush(world: SessionWorld) {
    let _ = world;
}
