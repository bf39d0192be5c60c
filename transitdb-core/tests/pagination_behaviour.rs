//! Behavioural tests for paged listings.

use std::cell::{Cell, RefCell};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use transitdb_core::{
    Dao, DaoError, Filter, Table, TripPrefetch, TripQuery, test_support::numbered_feed,
};

#[derive(Debug, Default)]
struct PagingWorld {
    dao: RefCell<Option<Dao>>,
    trip_ids: RefCell<Vec<String>>,
    statements: Cell<u64>,
    after_end: RefCell<Option<Result<(), DaoError>>>,
}

impl PagingWorld {
    fn with_dao<R>(&self, action: impl FnOnce(&Dao) -> R) -> R {
        let borrowed = self.dao.borrow();
        let dao = borrowed.as_ref().expect("store should be open");
        action(dao)
    }

    fn list(&self, query: &TripQuery) {
        let (ids, statements) = self.with_dao(|dao| {
            let before = dao.statement_count();
            let ids: Vec<String> = dao
                .trips(query)
                .expect("trips")
                .into_vec()
                .expect("collect trips")
                .into_iter()
                .map(|loaded| loaded.trip.trip_id)
                .collect();
            (ids, dao.statement_count() - before)
        });
        self.trip_ids.replace(ids);
        self.statements.set(statements);
    }
}

#[fixture]
fn world() -> PagingWorld {
    PagingWorld::default()
}

fn windowed(page_size: usize) -> TripQuery {
    TripQuery::new()
        .prefetch(TripPrefetch::NONE)
        .page_size(page_size)
}

#[given("a store holding {count} numbered trips")]
fn given_numbered_trips(world: &PagingWorld, count: u32) {
    let mut dao = Dao::open("").expect("open store");
    dao.add_all(numbered_feed("n", count));
    dao.commit().expect("commit");
    world.dao.replace(Some(dao));
}

#[when("trips are listed in windows of {size}")]
fn when_listed(world: &PagingWorld, size: usize) {
    world.list(&windowed(size));
}

#[when("trips named \"{name}\" are listed in windows of {size}")]
fn when_listed_by_name(world: &PagingWorld, name: String, size: usize) {
    world.list(&windowed(size).filter(Filter::eq(Table::Trip.col("trip_id"), name)));
}

#[when("trips are drained in windows of {size}")]
fn when_drained(world: &PagingWorld, size: usize) {
    let after_end = world.with_dao(|dao| {
        let mut rows = dao.trips(&windowed(size)).expect("trips").into_iter();
        for row in rows.by_ref() {
            row.expect("window");
        }
        rows.next().map(|row| row.map(|_| ()))
    });
    world.after_end.replace(after_end);
}

#[then("{count} trips are returned in key order")]
fn then_returned(world: &PagingWorld, count: usize) {
    let ids = world.trip_ids.borrow();
    assert_eq!(ids.len(), count);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[then("{count} windows were fetched")]
fn then_windows(world: &PagingWorld, count: u64) {
    assert_eq!(world.statements.get(), count);
}

#[then("{count} window was fetched")]
fn then_single_window(world: &PagingWorld, count: u64) {
    assert_eq!(world.statements.get(), count);
}

#[then("asking for another trip reports an exhausted cursor")]
fn then_exhausted(world: &PagingWorld) {
    let after_end = world.after_end.borrow();
    assert!(matches!(
        after_end.as_ref(),
        Some(Err(DaoError::CursorExhausted))
    ));
}

#[scenario(path = "tests/features/pagination.feature", index = 0)]
fn paging_over_boundary(world: PagingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/pagination.feature", index = 1)]
fn paging_empty_result(world: PagingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/pagination.feature", index = 2)]
fn draining_twice(world: PagingWorld) {
    let _ = world;
}
