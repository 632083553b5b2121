//! Coordinate conversion module
//!
//! Provides the canonical tile key format and conversions between
//! geographic coordinates (latitude/longitude) and Web Mercator slippy map
//! tile indices.

mod types;

pub use types::{
    BoundingRegion, CoordError, GeoPoint, RegionTiles, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM,
    MIN_LAT, MIN_LON,
};

use std::f64::consts::PI;

/// Converts a longitude to a tile column.
///
/// `floor((lon + 180) / 360 * 2^zoom)`
#[inline]
pub fn long_to_tile_x(lon: f64, zoom: u8) -> u32 {
    let n = 2.0_f64.powi(zoom as i32);
    ((lon + 180.0) / 360.0 * n).floor() as u32
}

/// Converts a latitude to a tile row.
///
/// `floor((1 - ln(tan(lat) + sec(lat)) / π) / 2 * 2^zoom)` with `lat` in
/// radians. The expression is kept in this exact form so the integer result
/// matches the reference OSM formula. Poles (`±90°`) are not handled.
#[inline]
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> u32 {
    let n = 2.0_f64.powi(zoom as i32);
    let lat_rad = lat * PI / 180.0;
    ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor() as u32
}

/// Converts geographic coordinates to the tile containing them.
#[inline]
pub fn to_tile_coords(point: GeoPoint, zoom: u8) -> TileCoord {
    TileCoord {
        zoom,
        x: long_to_tile_x(point.lon, zoom),
        y: lat_to_tile_y(point.lat, zoom),
    }
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    // Inverse Web Mercator
    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Enumerates every tile of `region` at `zoom`.
///
/// Produces the inclusive rectangle `[top_left_x, bottom_right_x] ×
/// [top_left_y, bottom_right_y]`, outer loop `x` ascending, inner loop `y`
/// ascending. Indices are clipped to `[0, 2^zoom)`.
pub fn enumerate_region(region: &BoundingRegion, zoom: u8) -> RegionTiles {
    let max_index = (TileCoord::axis_len(zoom) - 1).min(u32::MAX as u64) as u32;

    let top_left_x = long_to_tile_x(region.top_left.lon, zoom).min(max_index);
    let top_left_y = lat_to_tile_y(region.top_left.lat, zoom).min(max_index);
    let bottom_right_x = long_to_tile_x(region.bottom_right.lon, zoom).min(max_index);
    let bottom_right_y = lat_to_tile_y(region.bottom_right.lat, zoom).min(max_index);

    RegionTiles::new(zoom, top_left_x, bottom_right_x, top_left_y, bottom_right_y)
}

/// Enumerates the whole pyramid for zoom levels `0..=max_zoom`.
///
/// Ascending zoom, then the per-level order of [`enumerate_region`].
pub fn enumerate_pyramid(
    region: &BoundingRegion,
    max_zoom: u8,
) -> impl Iterator<Item = TileCoord> + Clone + '_ {
    (0..=max_zoom).flat_map(move |zoom| enumerate_region(region, zoom))
}
