use super::CopyEvent;
use crate::plan::CopyJob;
use std::collections::BTreeSet;

/// Tally of a copy run.
///
/// The failed set is computed as *submitted keys minus succeeded keys*, so a
/// job whose task never reported back still counts as failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    submitted: BTreeSet<String>,
    succeeded: BTreeSet<String>,
    attempted: usize,
    copied: usize,
    failures: usize,
    bytes: u64,
}
impl Summary {
    pub fn new<'a>(jobs: impl IntoIterator<Item = &'a CopyJob>) -> Self {
        let mut summary = Self::default();
        for job in jobs {
            summary.attempted += 1;
            summary.submitted.insert(job.key.clone());
        }
        summary
    }

    pub fn record(&mut self, event: &CopyEvent) {
        match event {
            CopyEvent::Copied(copied) => {
                self.copied += 1;
                self.bytes += copied.bytes;
                self.succeeded.insert(copied.key.clone());
            },
            CopyEvent::Failed(_) => self.failures += 1,
            CopyEvent::Started { .. } | CopyEvent::Complete => {},
        }
    }

    /// Number of jobs submitted.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Number of jobs that reported success.
    pub fn succeeded(&self) -> usize {
        self.copied
    }

    /// Number of jobs that reported failure.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Total bytes copied.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Keys of submitted jobs that did not succeed, sorted.
    pub fn failed(&self) -> Vec<&str> {
        self.submitted.difference(&self.succeeded).map(String::as_str).collect()
    }

    pub fn is_success(&self) -> bool {
        self.submitted.is_subset(&self.succeeded)
    }

    pub fn log(&self) {
        tracing::info!(bytes = self.bytes, "Files copied: {} of {}", self.copied, self.attempted);
        if !self.is_success() {
            tracing::warn!(failed = ?self.failed(), "Some files were not copied");
        }
    }
}
