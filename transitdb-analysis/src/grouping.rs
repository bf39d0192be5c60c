//! Strategies deciding which stops are counted together.

use transitdb_core::Stop;

/// Assigns each stop to a group within its feed.
///
/// Stops of the same feed returning the same key are reported together.
pub trait StopGrouping {
    /// Group key of `stop`.
    fn group_key<'stop>(&self, stop: &'stop Stop) -> &'stop str;
}

/// Every stop forms its own group.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerStop;

impl StopGrouping for PerStop {
    fn group_key<'stop>(&self, stop: &'stop Stop) -> &'stop str {
        &stop.stop_id
    }
}

/// Sub-stops are grouped under their parent station; a station groups with
/// its own sub-stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct StationGrouping;

impl StopGrouping for StationGrouping {
    fn group_key<'stop>(&self, stop: &'stop Stop) -> &'stop str {
        stop.parent_station_id.as_deref().unwrap_or(&stop.stop_id)
    }
}
