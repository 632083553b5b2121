//! Prefetch request, state and progress types.

use std::fmt;
use std::time::Duration;

use crate::coord::BoundingRegion;

/// Default deepest zoom level to prefetch (inclusive).
pub const DEFAULT_LAYERS_TO_LOAD: u8 = 14;

/// Default pause between two tile dispatches in milliseconds.
pub const DEFAULT_THROTTLE_MS: u64 = 100;

/// Shortest throttle the scheduler will run with.
///
/// A zero period is raised to this value.
pub const MIN_THROTTLE: Duration = Duration::from_millis(1);

/// A bulk prefetch of a region's tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrefetchRequest {
    /// Area to cover at every zoom level.
    pub region: BoundingRegion,

    /// Deepest zoom level, inclusive. Zoom 0 is always included.
    pub max_zoom: u8,

    /// Interval between tile dispatches.
    ///
    /// Default: 100ms.
    pub throttle: Duration,
}

impl PrefetchRequest {
    /// Creates a request with the default throttle.
    pub fn new(region: BoundingRegion, max_zoom: u8) -> Self {
        Self {
            region,
            max_zoom,
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Throttle actually used by the scheduler.
    pub fn effective_throttle(&self) -> Duration {
        self.throttle.max(MIN_THROTTLE)
    }
}

/// Lifecycle of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefetchState {
    /// No job is running.
    #[default]
    Idle,
    /// Building the tile list for a new job.
    Enumerating,
    /// Dispatching one tile per throttle tick.
    Downloading,
}

impl PrefetchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefetchState::Idle => "Idle",
            PrefetchState::Enumerating => "Enumerating",
            PrefetchState::Downloading => "Downloading",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, PrefetchState::Idle)
    }
}

impl fmt::Display for PrefetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final accounting of a prefetch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrefetchReport {
    /// Tiles enumerated for the job.
    pub total: usize,
    /// Tiles whose fetch was started.
    pub dispatched: usize,
    /// Tiles fetched and written (revision conflicts included).
    pub stored: usize,
    /// Tiles whose fetch or write failed.
    pub failed: usize,
    /// Whether the job was stopped before dispatching every tile.
    pub cancelled: bool,
}

impl PrefetchReport {
    /// Tiles never dispatched because the job stopped early.
    pub fn skipped(&self) -> usize {
        self.total.saturating_sub(self.dispatched)
    }
}

impl fmt::Display for PrefetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} dispatched, {} stored, {} failed{}",
            self.dispatched,
            self.total,
            self.stored,
            self.failed,
            if self.cancelled { " (cancelled)" } else { "" }
        )
    }
}

/// Progress updates sent while a job runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefetchProgress {
    /// Enumeration finished; downloading begins.
    Starting { total: usize },

    /// A tile was dispatched.
    Progress {
        dispatched: usize,
        total: usize,
        stored: usize,
        failed: usize,
    },

    /// Every tile was dispatched and in-flight work has settled.
    Complete(PrefetchReport),

    /// The job was cancelled or replaced.
    Cancelled(PrefetchReport),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GeoPoint;

    fn region() -> BoundingRegion {
        BoundingRegion::new(GeoPoint::new(1.0, -1.0), GeoPoint::new(-1.0, 1.0))
    }

    #[test]
    fn test_request_defaults() {
        let request = PrefetchRequest::new(region(), DEFAULT_LAYERS_TO_LOAD);
        assert_eq!(request.max_zoom, 14);
        assert_eq!(request.throttle, Duration::from_millis(100));
    }

    #[test]
    fn test_zero_throttle_is_raised() {
        let request = PrefetchRequest::new(region(), 3).with_throttle(Duration::ZERO);
        assert_eq!(request.effective_throttle(), MIN_THROTTLE);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PrefetchState::default(), PrefetchState::Idle);
        assert_eq!(PrefetchState::Downloading.to_string(), "Downloading");
        assert!(PrefetchState::Enumerating.is_active());
        assert!(!PrefetchState::Idle.is_active());
    }

    #[test]
    fn test_report_display() {
        let report = PrefetchReport {
            total: 10,
            dispatched: 4,
            stored: 3,
            failed: 1,
            cancelled: true,
        };
        assert_eq!(report.skipped(), 6);
        assert_eq!(
            report.to_string(),
            "4/10 dispatched, 3 stored, 1 failed (cancelled)"
        );
    }
}
