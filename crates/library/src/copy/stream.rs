use super::job::{CopyOutcome, Failed, copy_job};
use super::{Copied, Summary};
use crate::plan::CopyJob;
use async_stream::stream;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use restem_storage::BackendHandle;
use restem_storage::error::ErrorKind as StorageErrorKind;
use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use tracing::Instrument;
use tracing::instrument::WithSubscriber;

/// Progress events emitted by [`copy`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) exactly once, with the number of jobs.
/// 2. [`Copied`](Self::Copied) or [`Failed`](Self::Failed) once per job, in
///    completion order.
/// 3. [`Complete`](Self::Complete) exactly once.
#[derive(Debug)]
pub enum CopyEvent {
    Started { total: u64 },
    Copied(Copied),
    Failed(Failed),
    Complete,
}
impl From<CopyOutcome> for CopyEvent {
    fn from(outcome: CopyOutcome) -> Self {
        match outcome {
            Ok(copied) => Self::Copied(copied),
            Err(failed) => Self::Failed(failed),
        }
    }
}

/// Streams [`CopyEvent`]s while copying every job through `backend`.
///
/// Each job runs on its own task, at most `concurrency` (at least one) at a
/// time; further jobs are started as running ones finish. A failing job is
/// reported as [`CopyEvent::Failed`] and never stops its siblings.
///
/// Jobs are spawned as the stream is polled, so it must be driven to the end
/// for every job to run.
pub fn copy(backend: BackendHandle, jobs: Vec<CopyJob>, concurrency: usize) -> impl Stream<Item = CopyEvent> {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield CopyEvent::Started { total: u64::try_from(jobs.len()).unwrap_or(0) };

        let mut queue: VecDeque<CopyJob> = jobs.into();
        let mut processing = FuturesUnordered::new();
        let first = concurrency.max(1).min(queue.len());
        processing.extend(queue.drain(..first).map(|job| spawn(backend.clone(), job)));
        while let Some(outcome) = processing.next().await {
            // Pop-n-push, but FIFO instead of LIFO.
            if let Some(job) = queue.pop_front() {
                processing.push(spawn(backend.clone(), job));
            }
            yield CopyEvent::from(outcome);
        }

        yield CopyEvent::Complete;
    })
}

fn spawn(backend: BackendHandle, job: CopyJob) -> impl Future<Output = CopyOutcome> {
    let key = job.key.clone();
    let source = job.source.clone();
    let handle = tokio::spawn(copy_job(backend, job).in_current_span().with_current_subscriber());
    async move {
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Copy task did not finish");
                Err(aborted(key, &source, e))
            },
        }
    }
}

fn aborted(key: String, source: &Path, e: tokio::task::JoinError) -> Failed {
    let error = exn::Exn::from(StorageErrorKind::BackendError(format!("copy task did not finish: {e}")));
    Failed { key, source: source.to_path_buf(), error }
}

/// Drives [`copy`] to completion, handing every event to `on_event`, then
/// logs and returns the [`Summary`].
pub async fn execute(
    backend: BackendHandle,
    jobs: Vec<CopyJob>,
    concurrency: usize,
    mut on_event: impl FnMut(&CopyEvent),
) -> Summary {
    let mut summary = Summary::new(&jobs);
    let events = copy(backend, jobs, concurrency);
    futures::pin_mut!(events);
    while let Some(event) = events.next().await {
        summary.record(&event);
        on_event(&event);
    }
    summary.log();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use restem_storage::backend::MockBackend;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    fn job(n: usize) -> CopyJob {
        CopyJob {
            key: format!("f{n:02}"),
            source: PathBuf::from(format!("/in/f{n:02}.txt")),
            destination: PathBuf::from(format!("/out/g{n:02}.txt")),
            stem: format!("g{n:02}"),
        }
    }

    fn backend(count: usize) -> MockBackend {
        MockBackend::with_files((0..count).map(|n| (format!("/in/f{n:02}.txt"), format!("data {n}")))).with_dirs(["/out"])
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let mock = Arc::new(backend(20).with_delay(Duration::from_millis(20)));
        let jobs: Vec<_> = (0..20).map(job).collect();
        let summary = execute(mock.clone(), jobs, 3, |_| {}).await;
        assert_eq!(summary.succeeded(), 20);
        assert!(mock.peak_concurrency() <= 3, "peak was {}", mock.peak_concurrency());
        assert!(mock.peak_concurrency() >= 2);
        for n in 0..20 {
            assert_eq!(mock.contents(format!("/out/g{n:02}.txt")).await.unwrap(), format!("data {n}").into_bytes());
        }
    }

    #[tokio::test]
    async fn test_event_order() {
        let mock = Arc::new(backend(3).with_failing(["/in/f01.txt"]));
        let mut events = vec![];
        execute(mock, (0..3).map(job).collect(), 2, |event| {
            events.push(match event {
                CopyEvent::Started { total } => format!("started {total}"),
                CopyEvent::Copied(c) => format!("copied {}", c.key),
                CopyEvent::Failed(f) => format!("failed {}", f.key),
                CopyEvent::Complete => "complete".to_string(),
            })
        })
        .await;
        assert_eq!(events.first().unwrap(), "started 3");
        assert_eq!(events.last().unwrap(), "complete");
        let mut middle = events[1..4].to_vec();
        middle.sort();
        assert_eq!(middle, vec!["copied f00", "copied f02", "failed f01"]);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_siblings() {
        let mock = Arc::new(backend(5).with_failing(["/in/f00.txt", "/in/f03.txt"]));
        let summary = execute(mock.clone(), (0..5).map(job).collect(), 1, |_| {}).await;
        assert_eq!(summary.attempted(), 5);
        assert_eq!(summary.succeeded(), 3);
        assert_eq!(summary.failed(), vec!["f00", "f03"]);
        assert!(mock.contents("/out/g04.txt").await.is_some());
    }

    #[tokio::test]
    async fn test_no_jobs() {
        let mock = Arc::new(MockBackend::default());
        let events: Vec<_> = copy(mock, vec![], 4).collect().await;
        assert!(matches!(events.as_slice(), [CopyEvent::Started { total: 0 }, CopyEvent::Complete]));
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_copies() {
        let mock = Arc::new(backend(2));
        let summary = execute(mock, (0..2).map(job).collect(), 0, |_| {}).await;
        assert_eq!(summary.succeeded(), 2);
    }
}
