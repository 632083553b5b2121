//! Ordered tile queue for one prefetch run.

use crate::coord::{enumerate_pyramid, TileCoord};

use super::config::PrefetchRequest;

/// The tiles of a prefetch run and a cursor into them.
///
/// Tiles are ordered by zoom ascending, then column, then row.
#[derive(Debug, Clone)]
pub struct PrefetchJob {
    tiles: Vec<TileCoord>,
    cursor: usize,
}

impl PrefetchJob {
    /// Enumerates every tile of the request's pyramid.
    pub fn from_request(request: &PrefetchRequest) -> Self {
        Self::from_tiles(enumerate_pyramid(&request.region, request.max_zoom).collect())
    }

    pub fn from_tiles(tiles: Vec<TileCoord>) -> Self {
        Self { tiles, cursor: 0 }
    }

    /// Takes the tile under the cursor and advances it.
    pub fn next_tile(&mut self) -> Option<TileCoord> {
        let tile = self.tiles.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(tile)
    }

    pub fn total(&self) -> usize {
        self.tiles.len()
    }

    /// Number of tiles handed out so far.
    pub fn dispatched(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.tiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{BoundingRegion, GeoPoint};

    fn phoenix() -> BoundingRegion {
        BoundingRegion::new(
            GeoPoint::new(33.712167, -112.271690),
            GeoPoint::new(33.217292, -111.633453),
        )
    }

    #[test]
    fn test_job_orders_zoom_levels() {
        let job = PrefetchJob::from_request(&PrefetchRequest::new(phoenix(), 3));
        assert_eq!(job.total(), 4);
        let zooms: Vec<u8> = job.tiles.iter().map(|t| t.zoom).collect();
        assert_eq!(zooms, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cursor_advances_to_end() {
        let mut job = PrefetchJob::from_tiles(vec![TileCoord::new(0, 0, 0), TileCoord::new(1, 0, 0)]);

        assert!(!job.is_finished());
        assert_eq!(job.next_tile(), Some(TileCoord::new(0, 0, 0)));
        assert_eq!(job.next_tile(), Some(TileCoord::new(1, 0, 0)));
        assert!(job.is_finished());
        assert_eq!(job.next_tile(), None);
        assert_eq!(job.dispatched(), 2);
    }

    #[test]
    fn test_default_region_total() {
        let job = PrefetchJob::from_request(&PrefetchRequest::new(phoenix(), 14));
        assert_eq!(job.total(), 1139);
    }

    #[test]
    fn test_empty_job_is_finished() {
        let job = PrefetchJob::from_tiles(Vec::new());
        assert!(job.is_finished());
        assert_eq!(job.total(), 0);
    }
}
