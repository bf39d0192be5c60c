//! Hand-written mapping between entity values and stored rows.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::{
    Agency, Calendar, CalendarDate, Entity, FeedInfo, LocationType, Route, RouteType, Stop,
    StopTime, Table, Trip, Value,
};

/// An entity stored as one row of [`Record::TABLE`].
pub(crate) trait Record: Sized {
    const TABLE: Table;

    /// Decode a row selected through [`projection`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Every stored column, named as in the catalogue.
    fn named_params(&self) -> Vec<(&'static str, &dyn ToSql)>;
}

macro_rules! record {
    ($entity:ident => $table:ident { $($field:ident),+ $(,)? }) => {
        impl Record for $entity {
            const TABLE: Table = Table::$table;

            fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
                Ok(Self {
                    $($field: row.get(stringify!($field))?,)+
                })
            }

            fn named_params(&self) -> Vec<(&'static str, &dyn ToSql)> {
                vec![$((concat!(":", stringify!($field)), &self.$field as &dyn ToSql),)+]
            }
        }
    };
}

record!(FeedInfo => FeedInfo {
    feed_id,
    feed_publisher_name,
    feed_publisher_url,
    feed_contact_email,
    feed_contact_url,
    feed_lang,
    feed_start_date,
    feed_end_date,
    feed_version,
});

record!(Agency => Agency {
    feed_id,
    agency_id,
    agency_name,
    agency_url,
    agency_timezone,
    agency_lang,
    agency_phone,
    agency_fare_url,
    agency_email,
});

record!(Route => Route {
    feed_id,
    route_id,
    agency_id,
    route_short_name,
    route_long_name,
    route_desc,
    route_type,
    route_url,
    route_color,
    route_text_color,
});

record!(Stop => Stop {
    feed_id,
    stop_id,
    parent_station_id,
    location_type,
    stop_name,
    stop_lat,
    stop_lon,
    wheelchair_boarding,
    stop_code,
    stop_desc,
    zone_id,
    stop_url,
    stop_timezone,
});

record!(Calendar => Calendar { feed_id, service_id });

record!(CalendarDate => CalendarDate { feed_id, service_id, date });

record!(Trip => Trip {
    feed_id,
    trip_id,
    route_id,
    service_id,
    trip_headsign,
    trip_short_name,
    direction_id,
    block_id,
    wheelchair_accessible,
    bikes_allowed,
});

record!(StopTime => StopTime {
    feed_id,
    trip_id,
    stop_sequence,
    stop_id,
    arrival_time,
    departure_time,
    stop_headsign,
    pickup_type,
    drop_off_type,
    timepoint,
    shape_dist_traveled,
});

impl ToSql for LocationType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for LocationType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;
        Self::from_code(code).ok_or(FromSqlError::OutOfRange(code))
    }
}

impl ToSql for RouteType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for RouteType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self::from_code)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Null => Ok(ToSqlOutput::from(rusqlite::types::Null)),
            Self::Integer(value) => Ok(ToSqlOutput::from(*value)),
            Self::Real(value) => Ok(ToSqlOutput::from(*value)),
            Self::Text(value) => Ok(ToSqlOutput::from(value.as_str())),
            Self::Date(date) => date.to_sql(),
        }
    }
}

/// `table.column AS column, …` over every stored column of `table`.
pub(crate) fn projection(table: Table) -> String {
    let alias = table.sql_name();
    table
        .columns()
        .iter()
        .map(|column| format!("{alias}.{column} AS {column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `table.k1, table.k2, …` over the key columns of `table`.
pub(crate) fn key_order(table: Table) -> String {
    let alias = table.sql_name();
    table
        .key_columns()
        .iter()
        .map(|column| format!("{alias}.{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_sql(table: Table) -> String {
    let columns = table.columns();
    let placeholders: Vec<String> = columns.iter().map(|column| format!(":{column}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.sql_name(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn key_predicate(table: Table) -> String {
    table
        .key_columns()
        .iter()
        .map(|column| format!("{column} = :{column}"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// `SELECT … FROM table WHERE <key matches>`.
pub(crate) fn select_by_key_sql(table: Table) -> String {
    format!(
        "SELECT {} FROM {} WHERE {}",
        projection(table),
        table.sql_name(),
        key_predicate(table)
    )
}

fn delete_sql(table: Table) -> String {
    format!("DELETE FROM {} WHERE {}", table.sql_name(), key_predicate(table))
}

fn insert_record<R: Record>(connection: &Connection, record: &R) -> rusqlite::Result<usize> {
    let mut statement = connection.prepare_cached(&insert_sql(R::TABLE))?;
    statement.execute(record.named_params().as_slice())
}

fn delete_record<R: Record>(connection: &Connection, record: &R) -> rusqlite::Result<usize> {
    let keys = R::TABLE.key_columns();
    let params: Vec<(&str, &dyn ToSql)> = record
        .named_params()
        .into_iter()
        .filter(|(name, _)| keys.contains(&name.trim_start_matches(':')))
        .collect();
    let mut statement = connection.prepare_cached(&delete_sql(R::TABLE))?;
    statement.execute(params.as_slice())
}

/// Write one staged entity.
pub(crate) fn insert_entity(connection: &Connection, entity: &Entity) -> rusqlite::Result<usize> {
    match entity {
        Entity::FeedInfo(record) => insert_record(connection, record),
        Entity::Agency(record) => insert_record(connection, record),
        Entity::Route(record) => insert_record(connection, record),
        Entity::Stop(record) => insert_record(connection, record),
        Entity::Calendar(record) => insert_record(connection, record),
        Entity::CalendarDate(record) => insert_record(connection, record),
        Entity::Trip(record) => insert_record(connection, record),
        Entity::StopTime(record) => insert_record(connection, record),
    }
}

/// Delete the row matching the entity's key.
pub(crate) fn delete_entity(connection: &Connection, entity: &Entity) -> rusqlite::Result<usize> {
    match entity {
        Entity::FeedInfo(record) => delete_record(connection, record),
        Entity::Agency(record) => delete_record(connection, record),
        Entity::Route(record) => delete_record(connection, record),
        Entity::Stop(record) => delete_record(connection, record),
        Entity::Calendar(record) => delete_record(connection, record),
        Entity::CalendarDate(record) => delete_record(connection, record),
        Entity::Trip(record) => delete_record(connection, record),
        Entity::StopTime(record) => delete_record(connection, record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_feed;
    use rstest::rstest;

    fn param_names(entity: &Entity) -> Vec<&'static str> {
        fn names<R: Record>(record: &R) -> Vec<&'static str> {
            record
                .named_params()
                .into_iter()
                .map(|(name, _)| name.trim_start_matches(':'))
                .collect()
        }
        match entity {
            Entity::FeedInfo(record) => names(record),
            Entity::Agency(record) => names(record),
            Entity::Route(record) => names(record),
            Entity::Stop(record) => names(record),
            Entity::Calendar(record) => names(record),
            Entity::CalendarDate(record) => names(record),
            Entity::Trip(record) => names(record),
            Entity::StopTime(record) => names(record),
        }
    }

    #[rstest]
    fn records_bind_every_catalogued_column() {
        for entity in sample_feed("f") {
            assert_eq!(
                param_names(&entity),
                entity.table().columns(),
                "{} mapping drifted from the catalogue",
                entity.table()
            );
        }
    }

    #[rstest]
    fn projection_aliases_columns() {
        assert_eq!(
            projection(Table::Calendar),
            "calendars.feed_id AS feed_id, calendars.service_id AS service_id"
        );
        assert_eq!(
            key_order(Table::StopTime),
            "stop_times.feed_id, stop_times.trip_id, stop_times.stop_sequence"
        );
    }

    #[rstest]
    fn delete_matches_on_key_only() {
        assert_eq!(
            delete_sql(Table::CalendarDate),
            "DELETE FROM calendar_dates WHERE feed_id = :feed_id AND service_id = :service_id AND date = :date"
        );
    }
}
