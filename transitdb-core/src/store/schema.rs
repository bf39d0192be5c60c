//! Relational schema of a feed store.
//!
//! Tables are keyed by `(feed_id, local_id)`. Every reference carries the
//! `feed_id` so a row can only point inside its own feed. References are
//! checked when the unit of work commits, which lets staged rows arrive in any
//! order within one flush.

use rusqlite::{Connection, OptionalExtension, Transaction};

use super::DaoError;

/// Version recorded in `transitdb_schema_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the feed tables if missing and check the recorded version.
pub(crate) fn initialise_schema(connection: &mut Connection) -> Result<(), DaoError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| DaoError::Schema {
            step: "enable foreign keys",
            source,
        })?;

    let transaction = connection.transaction().map_err(|source| DaoError::Schema {
        step: "begin schema transaction",
        source,
    })?;

    create_tables(&transaction)?;
    create_indexes(&transaction)?;
    create_triggers(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction.commit().map_err(|source| DaoError::Schema {
        step: "commit schema transaction",
        source,
    })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), DaoError> {
    run_step(
        transaction,
        "create feed_info",
        "CREATE TABLE IF NOT EXISTS feed_info (
            feed_id TEXT NOT NULL PRIMARY KEY,
            feed_publisher_name TEXT,
            feed_publisher_url TEXT,
            feed_contact_email TEXT,
            feed_contact_url TEXT,
            feed_lang TEXT,
            feed_start_date TEXT,
            feed_end_date TEXT,
            feed_version TEXT
        ) WITHOUT ROWID",
    )?;
    run_step(
        transaction,
        "create agencies",
        "CREATE TABLE IF NOT EXISTS agencies (
            feed_id TEXT NOT NULL,
            agency_id TEXT NOT NULL,
            agency_name TEXT NOT NULL,
            agency_url TEXT NOT NULL,
            agency_timezone TEXT NOT NULL,
            agency_lang TEXT,
            agency_phone TEXT,
            agency_fare_url TEXT,
            agency_email TEXT,
            PRIMARY KEY (feed_id, agency_id),
            FOREIGN KEY (feed_id) REFERENCES feed_info(feed_id)
                DEFERRABLE INITIALLY DEFERRED
        ) WITHOUT ROWID",
    )?;
    run_step(
        transaction,
        "create stops",
        "CREATE TABLE IF NOT EXISTS stops (
            feed_id TEXT NOT NULL,
            stop_id TEXT NOT NULL,
            parent_station_id TEXT,
            location_type INTEGER NOT NULL DEFAULT 0 CHECK (location_type IN (0, 1)),
            stop_name TEXT NOT NULL,
            stop_lat REAL NOT NULL,
            stop_lon REAL NOT NULL,
            wheelchair_boarding INTEGER,
            stop_code TEXT,
            stop_desc TEXT,
            zone_id TEXT,
            stop_url TEXT,
            stop_timezone TEXT,
            PRIMARY KEY (feed_id, stop_id),
            CHECK (parent_station_id IS NULL OR parent_station_id <> stop_id),
            FOREIGN KEY (feed_id) REFERENCES feed_info(feed_id)
                DEFERRABLE INITIALLY DEFERRED,
            FOREIGN KEY (feed_id, parent_station_id) REFERENCES stops(feed_id, stop_id)
                DEFERRABLE INITIALLY DEFERRED
        ) WITHOUT ROWID",
    )?;
    run_step(
        transaction,
        "create routes",
        "CREATE TABLE IF NOT EXISTS routes (
            feed_id TEXT NOT NULL,
            route_id TEXT NOT NULL,
            agency_id TEXT NOT NULL,
            route_short_name TEXT,
            route_long_name TEXT,
            route_desc TEXT,
            route_type INTEGER NOT NULL,
            route_url TEXT,
            route_color TEXT,
            route_text_color TEXT,
            PRIMARY KEY (feed_id, route_id),
            FOREIGN KEY (feed_id, agency_id) REFERENCES agencies(feed_id, agency_id)
                DEFERRABLE INITIALLY DEFERRED
        ) WITHOUT ROWID",
    )?;
    run_step(
        transaction,
        "create calendars",
        "CREATE TABLE IF NOT EXISTS calendars (
            feed_id TEXT NOT NULL,
            service_id TEXT NOT NULL,
            PRIMARY KEY (feed_id, service_id),
            FOREIGN KEY (feed_id) REFERENCES feed_info(feed_id)
                DEFERRABLE INITIALLY DEFERRED
        ) WITHOUT ROWID",
    )?;
    run_step(
        transaction,
        "create calendar_dates",
        "CREATE TABLE IF NOT EXISTS calendar_dates (
            feed_id TEXT NOT NULL,
            service_id TEXT NOT NULL,
            date TEXT NOT NULL,
            PRIMARY KEY (feed_id, service_id, date),
            FOREIGN KEY (feed_id, service_id) REFERENCES calendars(feed_id, service_id)
                DEFERRABLE INITIALLY DEFERRED
        ) WITHOUT ROWID",
    )?;
    run_step(
        transaction,
        "create trips",
        "CREATE TABLE IF NOT EXISTS trips (
            feed_id TEXT NOT NULL,
            trip_id TEXT NOT NULL,
            route_id TEXT NOT NULL,
            service_id TEXT NOT NULL,
            trip_headsign TEXT,
            trip_short_name TEXT,
            direction_id INTEGER,
            block_id TEXT,
            wheelchair_accessible INTEGER,
            bikes_allowed INTEGER,
            PRIMARY KEY (feed_id, trip_id),
            FOREIGN KEY (feed_id, route_id) REFERENCES routes(feed_id, route_id)
                DEFERRABLE INITIALLY DEFERRED,
            FOREIGN KEY (feed_id, service_id) REFERENCES calendars(feed_id, service_id)
                DEFERRABLE INITIALLY DEFERRED
        ) WITHOUT ROWID",
    )?;
    run_step(
        transaction,
        "create stop_times",
        "CREATE TABLE IF NOT EXISTS stop_times (
            feed_id TEXT NOT NULL,
            trip_id TEXT NOT NULL,
            stop_sequence INTEGER NOT NULL CHECK (stop_sequence >= 0),
            stop_id TEXT NOT NULL,
            arrival_time INTEGER,
            departure_time INTEGER,
            stop_headsign TEXT,
            pickup_type INTEGER,
            drop_off_type INTEGER,
            timepoint INTEGER,
            shape_dist_traveled REAL,
            PRIMARY KEY (feed_id, trip_id, stop_sequence),
            FOREIGN KEY (feed_id, trip_id) REFERENCES trips(feed_id, trip_id)
                DEFERRABLE INITIALLY DEFERRED,
            FOREIGN KEY (feed_id, stop_id) REFERENCES stops(feed_id, stop_id)
                DEFERRABLE INITIALLY DEFERRED
        ) WITHOUT ROWID",
    )
}

fn create_indexes(transaction: &Transaction<'_>) -> Result<(), DaoError> {
    run_step(
        transaction,
        "index routes by agency",
        "CREATE INDEX IF NOT EXISTS idx_routes_agency ON routes(feed_id, agency_id)",
    )?;
    run_step(
        transaction,
        "index stops by parent",
        "CREATE INDEX IF NOT EXISTS idx_stops_parent ON stops(feed_id, parent_station_id)",
    )?;
    run_step(
        transaction,
        "index trips by route",
        "CREATE INDEX IF NOT EXISTS idx_trips_route ON trips(feed_id, route_id)",
    )?;
    run_step(
        transaction,
        "index trips by service",
        "CREATE INDEX IF NOT EXISTS idx_trips_service ON trips(feed_id, service_id)",
    )?;
    run_step(
        transaction,
        "index stop_times by stop",
        "CREATE INDEX IF NOT EXISTS idx_stop_times_stop ON stop_times(feed_id, stop_id)",
    )?;
    run_step(
        transaction,
        "index calendar_dates by date",
        "CREATE INDEX IF NOT EXISTS idx_calendar_dates_date ON calendar_dates(date)",
    )
}

/// Keep the station hierarchy two levels deep: a stop may only hang off a
/// stop that has no parent itself, and a stop with children cannot gain one.
fn create_triggers(transaction: &Transaction<'_>) -> Result<(), DaoError> {
    run_step(
        transaction,
        "create stop parent trigger",
        "CREATE TRIGGER IF NOT EXISTS stops_parent_depth
            BEFORE INSERT ON stops
            WHEN NEW.parent_station_id IS NOT NULL AND (
                EXISTS (
                    SELECT 1 FROM stops AS parent
                    WHERE parent.feed_id = NEW.feed_id
                        AND parent.stop_id = NEW.parent_station_id
                        AND parent.parent_station_id IS NOT NULL
                )
                OR EXISTS (
                    SELECT 1 FROM stops AS child
                    WHERE child.feed_id = NEW.feed_id
                        AND child.parent_station_id = NEW.stop_id
                )
            )
            BEGIN
                SELECT RAISE(ABORT, 'stop hierarchy deeper than station and sub-stop');
            END",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), DaoError> {
    run_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS transitdb_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row(
            "SELECT version FROM transitdb_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| DaoError::Schema {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(DaoError::SchemaVersion {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO transitdb_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| DaoError::Schema {
                step: "record schema version",
                source,
            }),
    }
}

fn run_step(transaction: &Transaction<'_>, step: &'static str, sql: &str) -> Result<(), DaoError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| DaoError::Schema { step, source })
}
