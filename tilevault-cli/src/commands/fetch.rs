//! Fetch command: resolve one tile through the cache and save it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tilevault::coord::{tile_to_lat_lon, to_tile_coords, GeoPoint, TileCoord, MAX_ZOOM};
use tilevault::resolver::{CachingTileSource, TileOrigin, TileSource};
use tokio::sync::mpsc;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Tile key in z,x,y form (e.g. 13,1541,3280)
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub tile: Option<String>,

    /// Latitude in decimal degrees
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Zoom level used with --lat/--lon (default: view.zoom)
    #[arg(long)]
    pub zoom: Option<u8>,

    /// Output file path
    #[arg(long, short)]
    pub output: PathBuf,
}

/// Work out which tile the arguments name.
pub fn select_tile(args: &FetchArgs, default_zoom: u8) -> Result<TileCoord, CliError> {
    if let Some(key) = &args.tile {
        return Ok(key.parse()?);
    }

    let (Some(lat), Some(lon)) = (args.lat, args.lon) else {
        return Err(CliError::Config(
            "either --tile or --lat and --lon are required".to_string(),
        ));
    };
    let zoom = args.zoom.unwrap_or(default_zoom);
    if zoom > MAX_ZOOM {
        return Err(CliError::Config(format!(
            "zoom {} exceeds the maximum zoom level {}",
            zoom, MAX_ZOOM
        )));
    }
    Ok(to_tile_coords(GeoPoint::new(lat, lon), zoom))
}

/// Run the fetch command.
pub fn run(runner: &CliRunner, args: FetchArgs) -> Result<(), CliError> {
    runner.log_startup("fetch");
    let tile = select_tile(&args, runner.config().view.zoom)?;
    let app = runner.start_app()?;

    let (lat, lon) = tile_to_lat_lon(&tile);
    println!("Tile {} (north-west corner {:.6}, {:.6})", tile, lat, lon);

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let resolver = app.resolver().as_ref().clone().with_write_observer(events_tx);
    let source = CachingTileSource::new(Arc::new(resolver));

    let image = runner.block_on(source.create_tile(tile))?;
    runner.save_file(&args.output, &image.data)?;

    match image.origin {
        TileOrigin::Cache => println!("  Served from cache"),
        TileOrigin::Network => {
            println!("  Downloaded from {}", app.config().urls.url_for(&tile));
            // Let the background write land before the runtime shuts down
            drop(source);
            match runner.block_on(events_rx.recv()) {
                Some(event) => match event.result {
                    Ok(outcome) => println!("  Cached ({:?})", outcome),
                    Err(e) => println!("  Not cached: {}", e),
                },
                None => println!("  Not cached"),
            }
        }
    }
    println!(
        "  Saved {} bytes ({}) to {}",
        image.data.len(),
        image.content_type,
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> FetchArgs {
        FetchArgs {
            tile: None,
            lat: None,
            lon: None,
            zoom: None,
            output: PathBuf::from("tile.png"),
        }
    }

    #[test]
    fn test_select_tile_from_key() {
        let args = FetchArgs {
            tile: Some("13,1541,3280".to_string()),
            ..args()
        };
        assert_eq!(select_tile(&args, 13).unwrap(), TileCoord::new(13, 1541, 3280));
    }

    #[test]
    fn test_select_tile_from_position() {
        let args = FetchArgs {
            lat: Some(40.7128),
            lon: Some(-74.0060),
            zoom: Some(16),
            ..args()
        };
        assert_eq!(select_tile(&args, 13).unwrap(), TileCoord::new(16, 19295, 24640));
    }

    #[test]
    fn test_select_tile_uses_default_zoom() {
        let args = FetchArgs {
            lat: Some(33.5),
            lon: Some(-112.0),
            ..args()
        };
        assert_eq!(select_tile(&args, 10).unwrap().zoom, 10);
    }

    #[test]
    fn test_select_tile_rejects_bad_key() {
        let args = FetchArgs {
            tile: Some("13,x,1".to_string()),
            ..args()
        };
        assert!(matches!(select_tile(&args, 13), Err(CliError::Coord(_))));
    }

    #[test]
    fn test_select_tile_requires_position() {
        assert!(matches!(select_tile(&args(), 13), Err(CliError::Config(_))));
    }
}
