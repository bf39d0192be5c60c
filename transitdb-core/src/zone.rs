//! Rectangular latitude/longitude bounds used to select stops.

use geo::{Coord, Intersects, Rect};
use thiserror::Error;

use crate::{Filter, Table};

/// Inclusive latitude/longitude rectangle.
///
/// Coordinates follow the `geo` convention of `x = longitude` and
/// `y = latitude`. A stop lying exactly on an edge is inside the zone.
///
/// # Examples
/// ```
/// use transitdb_core::Zone;
///
/// # fn main() -> Result<(), transitdb_core::ZoneError> {
/// let zone = Zone::new(44.0, 46.0, 1.0, 3.0)?;
/// assert!(zone.contains(45.0, 2.0));
/// assert!(!zone.contains(45.0, 3.5));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    bounds: Rect<f64>,
}

/// Errors returned by [`Zone::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ZoneError {
    /// A bound was NaN or infinite.
    #[error("zone bounds must be finite")]
    NonFinite,
    /// A minimum exceeded its maximum.
    #[error("zone {axis} minimum {min} exceeds maximum {max}")]
    Inverted {
        /// `"latitude"` or `"longitude"`.
        axis: &'static str,
        /// Supplied minimum.
        min: f64,
        /// Supplied maximum.
        max: f64,
    },
}

impl Zone {
    /// Build a zone from inclusive latitude and longitude ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::NonFinite`] for NaN or infinite bounds and
    /// [`ZoneError::Inverted`] when a minimum exceeds its maximum.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Result<Self, ZoneError> {
        if ![min_lat, max_lat, min_lon, max_lon]
            .iter()
            .all(|bound| bound.is_finite())
        {
            return Err(ZoneError::NonFinite);
        }
        if min_lat > max_lat {
            return Err(ZoneError::Inverted {
                axis: "latitude",
                min: min_lat,
                max: max_lat,
            });
        }
        if min_lon > max_lon {
            return Err(ZoneError::Inverted {
                axis: "longitude",
                min: min_lon,
                max: max_lon,
            });
        }
        Ok(Self {
            bounds: Rect::new(
                Coord {
                    x: min_lon,
                    y: min_lat,
                },
                Coord {
                    x: max_lon,
                    y: max_lat,
                },
            ),
        })
    }

    /// The zone as a `geo` rectangle.
    pub const fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Southern edge, in degrees.
    pub fn min_lat(&self) -> f64 {
        self.bounds.min().y
    }

    /// Northern edge, in degrees.
    pub fn max_lat(&self) -> f64 {
        self.bounds.max().y
    }

    /// Western edge, in degrees.
    pub fn min_lon(&self) -> f64 {
        self.bounds.min().x
    }

    /// Eastern edge, in degrees.
    pub fn max_lon(&self) -> f64 {
        self.bounds.max().x
    }

    /// Whether a position lies inside the zone, edges included.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.bounds.intersects(&Coord { x: lon, y: lat })
    }

    /// Equivalent predicate over `Stop.stop_lat` and `Stop.stop_lon`.
    pub fn to_filter(&self) -> Filter {
        Filter::between(Table::Stop.col("stop_lat"), self.min_lat(), self.max_lat())
            & Filter::between(Table::Stop.col("stop_lon"), self.min_lon(), self.max_lon())
    }
}
