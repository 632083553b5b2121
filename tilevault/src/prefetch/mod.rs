//! Bulk region prefetch.
//!
//! Downloads every tile of a region's pyramid, zoom `0..=max_zoom`, into
//! the tile store so it can be displayed offline later.
//!
//! # Architecture
//!
//! ```text
//! PrefetchScheduler (one active job, cancel-and-replace)
//!     │
//!     ├─► job.rs: PrefetchJob
//!     │     └─ enumerated tile queue with a cursor
//!     │
//!     ├─► scheduler.rs: throttle loop
//!     │     └─ one spawned fetch + put per tick
//!     │
//!     └─► config.rs: request, state and progress types
//!           └─ PrefetchRequest, PrefetchState, PrefetchProgress, PrefetchReport
//! ```
//!
//! # Example
//!
//! ```ignore
//! let scheduler = PrefetchScheduler::new(cache, fetcher, urls);
//! let mut handle = scheduler.start(PrefetchRequest::new(region, 14));
//! let mut progress = handle.take_progress().unwrap();
//! while let Some(event) = progress.recv().await {
//!     // update UI
//! }
//! let report = handle.wait().await?;
//! ```

mod config;
mod job;
mod scheduler;

pub use config::{
    PrefetchProgress, PrefetchReport, PrefetchRequest, PrefetchState, DEFAULT_LAYERS_TO_LOAD,
    DEFAULT_THROTTLE_MS, MIN_THROTTLE,
};
pub use job::PrefetchJob;
pub use scheduler::{PrefetchError, PrefetchHandle, PrefetchScheduler};
