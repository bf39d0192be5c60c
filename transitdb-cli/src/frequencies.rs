//! `frequencies` subcommand.

use std::{io::Write, ops::Not};

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use transitdb_analysis::{
    DEFAULT_PAGE_SIZE, FrequencyOptions, GroupFrequencies, PerStop, StationGrouping, format_time,
    frequencies_with,
};
use transitdb_core::{Column, Filter};

use crate::{ARG_DB, CliError, ENV_FREQUENCIES_DB, open_store, write_line};

/// CLI arguments for the `frequencies` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "frequencies",
    about = "Report departure frequencies per stop or station",
    long_about = "Count departures per stop for every service date and \
                  report the busiest one. Conditions of the form \
                  Table.column=value restrict stops, dates and trips alike."
)]
#[ortho_config(prefix = "TRANSITDB")]
pub(crate) struct FrequenciesArgs {
    /// Store locator: a file path, `sqlite:///path` or `file://` URI.
    #[arg(long = ARG_DB, value_name = "locator")]
    #[serde(default)]
    pub(crate) db: Option<String>,
    /// Restrict the analysis, e.g. `Route.route_short_name=12`.
    #[arg(long = "where", value_name = "Table.column=value")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) conditions: Vec<String>,
    /// Report every service date instead of the busiest one.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Not::not")]
    pub(crate) all_dates: bool,
    /// Report stations instead of their individual stops.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Not::not")]
    pub(crate) group_stations: bool,
    /// Rows fetched per window while scanning; zero disables paging.
    #[arg(long, value_name = "rows")]
    #[serde(default)]
    pub(crate) page_size: Option<usize>,
}

/// Resolved `frequencies` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FrequenciesConfig {
    pub(crate) db: String,
    pub(crate) filter: Option<Filter>,
    pub(crate) all_dates: bool,
    pub(crate) group_stations: bool,
    pub(crate) page_size: usize,
}

impl FrequenciesArgs {
    pub(crate) fn into_config(self) -> Result<FrequenciesConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FrequenciesConfig::try_from(merged)
    }
}

impl TryFrom<FrequenciesArgs> for FrequenciesConfig {
    type Error = CliError;

    fn try_from(args: FrequenciesArgs) -> Result<Self, Self::Error> {
        let db = args.db.ok_or(CliError::MissingArgument {
            field: ARG_DB,
            env: ENV_FREQUENCIES_DB,
        })?;
        let filter = match args.conditions.as_slice() {
            [] => None,
            [single] => Some(parse_condition(single)?),
            many => Some(Filter::all(
                many.iter()
                    .map(|condition| parse_condition(condition))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        };
        Ok(Self {
            db,
            filter,
            all_dates: args.all_dates,
            group_stations: args.group_stations,
            page_size: args.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

impl FrequenciesConfig {
    fn options(&self) -> FrequencyOptions {
        FrequencyOptions {
            filter: self.filter.clone(),
            all_dates: self.all_dates,
            page_size: self.page_size,
        }
    }
}

/// Parse `Table.column=value` into an equality filter.
///
/// The value is compared as text and SQLite column affinity converts it for
/// numeric columns.
pub(crate) fn parse_condition(condition: &str) -> Result<Filter, CliError> {
    let (path, value) = condition
        .split_once('=')
        .ok_or_else(|| CliError::MalformedCondition {
            condition: condition.to_owned(),
        })?;
    let column: Column = path.parse().map_err(|source| CliError::InvalidCondition {
        condition: condition.to_owned(),
        source,
    })?;
    Ok(Filter::eq(column, value))
}

pub(crate) fn run_frequencies(
    args: FrequenciesArgs,
    sql_logging: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let dao = open_store(&config.db, sql_logging)?;
    let options = config.options();
    let report = if config.group_stations {
        frequencies_with(&dao, &options, &StationGrouping)?
    } else {
        frequencies_with(&dao, &options, &PerStop)?
    };
    for group in &report {
        write_group(out, group)?;
    }
    Ok(())
}

fn write_group(out: &mut dyn Write, group: &GroupFrequencies) -> Result<(), CliError> {
    write_line(out, &format!("{} / {}", group.feed_id, group.key))?;
    for stop in &group.stops {
        write_line(out, &format!("    * {} / {}", stop.stop_id, stop.stop_name))?;
    }
    for date in &group.dates {
        let rate = date
            .per_hour()
            .map_or_else(|| "-".to_owned(), |rate| format!("{rate:.1} dep/h"));
        write_line(
            out,
            &format!(
                "    {} : {:>3} departures ({} - {}), {rate}",
                date.date,
                date.departures,
                format_time(date.first),
                format_time(date.last),
            ),
        )?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FrequenciesConfig, CliError> {
    let merged = FrequenciesArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FrequenciesConfig::try_from(merged)
}
