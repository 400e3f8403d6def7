//! Bounded concurrent copying of planned jobs.

mod job;
mod stream;
mod summary;

pub use self::job::{Copied, CopyOutcome, Failed};
pub use self::stream::{CopyEvent, copy, execute};
pub use self::summary::Summary;

/// Upper bound for the default number of copies in flight.
pub const MAX_COPY_CONCURRENCY: usize = 32;

/// Default number of copies in flight: four more than the available
/// parallelism, capped at [`MAX_COPY_CONCURRENCY`]. Copying is I/O bound, so
/// a few extra tasks keep the disks busy.
pub fn default_concurrency() -> usize {
    let cpus = std::thread::available_parallelism().map(usize::from).unwrap_or(1);
    (cpus + 4).min(MAX_COPY_CONCURRENCY)
}
