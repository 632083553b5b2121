//! Coordinate type definitions

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Highest zoom level for which `2^zoom` tile indices fit in a `u32`.
pub const MAX_ZOOM: u8 = 31;

/// Tile coordinates in the slippy map system.
///
/// `x` grows west to east and `y` grows north to south, both in
/// `[0, 2^zoom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Zoom level
    pub zoom: u8,
    /// Column (east-west), 0 at the antimeridian
    pub x: u32,
    /// Row (north-south), 0 at the north edge
    pub y: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Returns the canonical store key `"{zoom},{x},{y}"`.
    #[inline]
    pub fn to_key(&self) -> String {
        format!("{},{},{}", self.zoom, self.x, self.y)
    }

    /// Number of tiles along one axis at this zoom level.
    #[inline]
    pub fn axis_len(zoom: u8) -> u64 {
        1u64.checked_shl(u32::from(zoom)).unwrap_or(u64::MAX)
    }

    /// Checks that `x` and `y` lie inside `[0, 2^zoom)`.
    pub fn is_valid(&self) -> bool {
        self.zoom <= MAX_ZOOM
            && u64::from(self.x) < Self::axis_len(self.zoom)
            && u64::from(self.y) < Self::axis_len(self.zoom)
    }

    /// Mirrors the row for TMS-addressed tile servers (y = 0 at the south edge).
    pub fn flip_y(&self) -> Self {
        let max_y = Self::axis_len(self.zoom).saturating_sub(1);
        Self {
            zoom: self.zoom,
            x: self.x,
            y: (max_y - u64::from(self.y).min(max_y)) as u32,
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.zoom, self.x, self.y)
    }
}

impl FromStr for TileCoord {
    type Err = CoordError;

    /// Parses a store key back into a coordinate.
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordError::InvalidKey(key.to_string());

        let mut parts = key.split(',');
        let zoom: u8 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let x: u32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let y: u32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        let coord = TileCoord { zoom, x, y };
        if !coord.is_valid() {
            return Err(CoordError::OutOfRange { zoom, x, y });
        }
        Ok(coord)
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Geographic rectangle whose tiles are eligible for prefetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    /// North-west corner
    pub top_left: GeoPoint,
    /// South-east corner
    pub bottom_right: GeoPoint,
}

impl BoundingRegion {
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Checks both corners against the Web Mercator domain.
    ///
    /// The tile formulas themselves never fail; this is for callers that
    /// want to reject poles and out-of-range input up front.
    pub fn validate(&self) -> Result<(), CoordError> {
        for point in [self.top_left, self.bottom_right] {
            if !(MIN_LAT..=MAX_LAT).contains(&point.lat) || !point.lat.is_finite() {
                return Err(CoordError::Projection(format!(
                    "latitude {} outside Web Mercator range",
                    point.lat
                )));
            }
            if !(MIN_LON..=MAX_LON).contains(&point.lon) || !point.lon.is_finite() {
                return Err(CoordError::Projection(format!(
                    "longitude {} outside [-180, 180]",
                    point.lon
                )));
            }
        }
        Ok(())
    }
}

/// Lazy iterator over every tile of a region at one zoom level.
///
/// Outer loop is `x` ascending, inner loop is `y` ascending. Cloning the
/// iterator restarts from the clone's current position.
#[derive(Debug, Clone)]
pub struct RegionTiles {
    zoom: u8,
    x_min: u32,
    y_min: u32,
    width: u64,
    height: u64,
    current: u64,
}

impl RegionTiles {
    pub(crate) fn new(zoom: u8, x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Self {
        let (width, height) = if x_max < x_min || y_max < y_min {
            (0, 0)
        } else {
            (
                u64::from(x_max - x_min) + 1,
                u64::from(y_max - y_min) + 1,
            )
        };

        Self {
            zoom,
            x_min,
            y_min,
            width,
            height,
            current: 0,
        }
    }

    /// Total number of tiles, independent of iteration progress.
    pub fn total(&self) -> u64 {
        self.width * self.height
    }
}

impl Iterator for RegionTiles {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.total() {
            return None;
        }

        let dx = self.current / self.height;
        let dy = self.current % self.height;
        self.current += 1;

        Some(TileCoord {
            zoom: self.zoom,
            x: self.x_min + dx as u32,
            y: self.y_min + dy as u32,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total() - self.current) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RegionTiles {}

/// Errors that can occur when handling coordinates and keys.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Key is not of the form `"{zoom},{x},{y}"`
    #[error("Invalid tile key: '{0}'")]
    InvalidKey(String),

    /// Key parsed but lies outside `[0, 2^zoom)`
    #[error("Tile {zoom},{x},{y} outside valid range for zoom {zoom}")]
    OutOfRange { zoom: u8, x: u32, y: u32 },

    /// Geographic input that cannot be projected
    #[error("Projection error: {0}")]
    Projection(String),
}
