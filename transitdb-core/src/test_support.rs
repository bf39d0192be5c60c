//! Small, deterministic feeds for unit tests, behaviour tests and benches.
//!
//! Gated behind the `test-support` feature (and `cfg(test)`).

use chrono::NaiveDate;

use crate::{
    Agency, Calendar, CalendarDate, Entity, FeedInfo, LocationType, Route, RouteType, Stop,
    StopTime, Trip,
};

/// First date of the sample week (a Monday).
pub fn sample_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 18).unwrap_or_default()
}

/// Sunday following [`sample_monday`].
pub fn sample_sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 24).unwrap_or_default()
}

const fn hms(hours: u32, minutes: u32) -> u32 {
    hours * 3600 + minutes * 60
}

/// A two-route feed with a station hierarchy and two calendars.
///
/// - Stops: station `S` with platforms `S1` and `S2` at (45.0, 2.0),
///   `T` at (46.5, 4.0) and `U` at (44.5, 1.5).
/// - Routes: `R1` (bus) and `R2` (tram), both run by agency `A1`.
/// - Calendars: `WEEK` runs Monday 18 to Friday 22 January 2016, `SUN` runs
///   Sunday 24 January 2016.
/// - Trips: `T1` and `T2` on `R1`/`WEEK` (`S1` then `T`), `T3` on `R2`/`SUN`
///   (`U`, `S2`, `T`), `T4` on `R2`/`WEEK` (`U` then `S2`).
pub fn sample_feed(feed_id: &str) -> Vec<Entity> {
    let mut entities: Vec<Entity> = vec![
        FeedInfo::new(feed_id).into(),
        Agency::new(feed_id, "A1", "Transit", "https://transit.example", "Europe/Paris").into(),
        Stop::new(feed_id, "S", "Central", 45.0, 2.0)
            .with_location_type(LocationType::Station)
            .into(),
        Stop::new(feed_id, "S1", "Central 1", 45.0, 2.0)
            .with_parent_station("S")
            .into(),
        Stop::new(feed_id, "S2", "Central 2", 45.0, 2.0)
            .with_parent_station("S")
            .into(),
        Stop::new(feed_id, "T", "Terminus", 46.5, 4.0).into(),
        Stop::new(feed_id, "U", "Upstream", 44.5, 1.5).into(),
        Route::new(feed_id, "R1", "A1", RouteType::Bus)
            .with_short_name("R1")
            .into(),
        Route::new(feed_id, "R2", "A1", RouteType::Tram)
            .with_short_name("R2")
            .into(),
        Calendar::new(feed_id, "WEEK").into(),
        Calendar::new(feed_id, "SUN").into(),
    ];
    entities.extend(
        sample_monday()
            .iter_days()
            .take(5)
            .map(|date| CalendarDate::new(feed_id, "WEEK", date).into()),
    );
    entities.push(CalendarDate::new(feed_id, "SUN", sample_sunday()).into());

    let trips: [(&str, &str, &str, &[(&str, u32)]); 4] = [
        ("T1", "R1", "WEEK", &[("S1", hms(8, 0)), ("T", hms(8, 30))]),
        ("T2", "R1", "WEEK", &[("S1", hms(9, 0)), ("T", hms(9, 30))]),
        (
            "T3",
            "R2",
            "SUN",
            &[("U", hms(10, 0)), ("S2", hms(10, 20)), ("T", hms(10, 45))],
        ),
        ("T4", "R2", "WEEK", &[("U", hms(7, 0)), ("S2", hms(7, 20))]),
    ];
    for (trip_id, route_id, service_id, calls) in trips {
        entities.push(Trip::new(feed_id, trip_id, route_id, service_id).into());
        for (sequence, (stop_id, time)) in (1_u32..).zip(calls.iter()) {
            entities.push(
                StopTime::new(feed_id, trip_id, sequence, *stop_id)
                    .with_times(*time, *time)
                    .into(),
            );
        }
    }
    entities
}

/// A feed with `trips` trips named `trip-0000`, `trip-0001`, … on one route,
/// each calling at two stops.
pub fn numbered_feed(feed_id: &str, trips: u32) -> Vec<Entity> {
    let mut entities: Vec<Entity> = vec![
        FeedInfo::new(feed_id).into(),
        Agency::new(feed_id, "A", "Agency", "https://agency.example", "UTC").into(),
        Stop::new(feed_id, "first", "First", 0.0, 0.0).into(),
        Stop::new(feed_id, "last", "Last", 1.0, 1.0).into(),
        Route::new(feed_id, "R", "A", RouteType::Bus).into(),
        Calendar::new(feed_id, "ALL").into(),
        CalendarDate::new(feed_id, "ALL", sample_monday()).into(),
    ];
    for index in 0..trips {
        let trip_id = format!("trip-{index:04}");
        let departure = hms(6, 0) + index * 60;
        entities.push(Trip::new(feed_id, trip_id.as_str(), "R", "ALL").into());
        entities.push(
            StopTime::new(feed_id, trip_id.as_str(), 1, "first")
                .with_times(departure, departure)
                .into(),
        );
        entities.push(
            StopTime::new(feed_id, trip_id.as_str(), 2, "last")
                .with_times(departure + 600, departure + 600)
                .into(),
        );
    }
    entities
}

/// Open an in-memory store holding [`sample_feed`] for each of `feed_ids`.
///
/// # Errors
///
/// Returns [`DaoError`](crate::DaoError) when opening or committing fails.
#[cfg(feature = "store-sqlite")]
pub fn sample_store(feed_ids: &[&str]) -> Result<crate::Dao, crate::DaoError> {
    let mut dao = crate::Dao::open("")?;
    for feed_id in feed_ids {
        dao.add_all(sample_feed(feed_id));
    }
    dao.commit()?;
    Ok(dao)
}
