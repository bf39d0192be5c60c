//! Analyses over a transit feed store.
//!
//! Currently provides departure frequencies per stop or per station: for
//! every group of stops selected by a filter, how many departures happen on
//! each service date, between which times, and at what average rate.
//!
//! # Examples
//!
//! ```
//! use transitdb_analysis::{FrequencyOptions, StationGrouping, frequencies_with};
//! use transitdb_core::test_support::sample_store;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dao = sample_store(&["demo"])?;
//! let report = frequencies_with(&dao, &FrequencyOptions::default(), &StationGrouping)?;
//! let central = report.iter().find(|group| group.key == "S").ok_or("no station")?;
//! assert_eq!(central.dates[0].departures, 3);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod error;
mod frequencies;
mod grouping;

pub use error::FrequencyError;
pub use frequencies::{
    DEFAULT_PAGE_SIZE, DateFrequency, FrequencyOptions, GroupFrequencies, format_time,
    frequencies, frequencies_with,
};
pub use grouping::{PerStop, StationGrouping, StopGrouping};
