//! Populate command: download the configured region into the cache.

use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tilevault::coord::{BoundingRegion, GeoPoint, MAX_ZOOM};
use tilevault::prefetch::{PrefetchProgress, PrefetchReport};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the populate command.
#[derive(Debug, Args)]
pub struct PopulateArgs {
    /// Deepest zoom level to download (default: prefetch.layers_to_load)
    #[arg(long)]
    pub max_zoom: Option<u8>,

    /// Milliseconds between tile downloads (default: prefetch.ms_throttle)
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Region as TOP_LAT,LEFT_LON,BOTTOM_LAT,RIGHT_LON (default: [region] section)
    #[arg(long, value_parser = parse_region, allow_hyphen_values = true)]
    pub region: Option<BoundingRegion>,
}

/// Parse a `top,left,bottom,right` region argument.
pub fn parse_region(value: &str) -> Result<BoundingRegion, String> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in region: {}", e))?;

    let [top, left, bottom, right] = parts[..] else {
        return Err("expected TOP_LAT,LEFT_LON,BOTTOM_LAT,RIGHT_LON".to_string());
    };

    let region = BoundingRegion::new(GeoPoint::new(top, left), GeoPoint::new(bottom, right));
    region.validate().map_err(|e| e.to_string())?;
    Ok(region)
}

/// Run the populate command.
pub fn run(runner: &CliRunner, args: PopulateArgs) -> Result<(), CliError> {
    runner.log_startup("populate");

    if let Some(zoom) = args.max_zoom.filter(|z| *z > MAX_ZOOM) {
        return Err(CliError::Config(format!(
            "--max-zoom {} exceeds the maximum zoom level {}",
            zoom, MAX_ZOOM
        )));
    }

    let app = runner.start_app()?;
    let mut request = app.config().populate_request();
    if let Some(zoom) = args.max_zoom {
        request.max_zoom = zoom;
    }
    if let Some(ms) = args.throttle_ms {
        request.throttle = Duration::from_millis(ms);
    }
    if let Some(region) = args.region {
        request.region = region;
    }

    println!(
        "Populating zoom 0-{} ({} ms between tiles)",
        request.max_zoom,
        request.throttle.as_millis()
    );
    println!("Press Ctrl+C to stop");
    println!();

    let report = runner.block_on(async {
        let mut handle = app.populate(request);

        let token = handle.cancellation_token();
        ctrlc::set_handler(move || token.cancel())
            .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

        if let Some(mut progress) = handle.take_progress() {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tiles ({eta}) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            while let Some(event) = progress.recv().await {
                match event {
                    PrefetchProgress::Starting { total } => bar.set_length(total as u64),
                    PrefetchProgress::Progress {
                        dispatched, failed, ..
                    } => {
                        bar.set_position(dispatched as u64);
                        if failed > 0 {
                            bar.set_message(format!("{} failed", failed));
                        }
                    }
                    PrefetchProgress::Complete(_) => bar.finish_with_message("done"),
                    PrefetchProgress::Cancelled(_) => bar.abandon_with_message("cancelled"),
                }
            }
        }

        handle.wait().await.map_err(CliError::from)
    })?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &PrefetchReport) {
    println!();
    let status = if report.cancelled {
        style("Cancelled").yellow()
    } else {
        style("Complete").green()
    };
    println!("{}: {}", status, report);
    if report.cancelled {
        println!("  {} tiles were not downloaded", report.skipped());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region() {
        let region = parse_region("33.7,-112.27,33.2,-111.63").unwrap();
        assert_eq!(region.top_left, GeoPoint::new(33.7, -112.27));
        assert_eq!(region.bottom_right, GeoPoint::new(33.2, -111.63));
    }

    #[test]
    fn test_parse_region_wrong_arity() {
        assert!(parse_region("1,2,3").is_err());
    }

    #[test]
    fn test_parse_region_invalid_number() {
        assert!(parse_region("a,2,3,4").unwrap_err().contains("invalid number"));
    }

    #[test]
    fn test_parse_region_out_of_range() {
        assert!(parse_region("89.9,0,1,1").is_err());
    }
}
