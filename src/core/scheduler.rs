//! Bounded concurrent execution across the target matrix
//!
//! Each target's work runs on the blocking pool, gated by a semaphore with
//! `jobs` permits. A failing or panicking worker only affects its own
//! target. [`Scheduler::run`] returns after every worker has finished.

use std::sync::Arc;

use indicatif::ProgressBar;
use tokio::sync::Semaphore;

use crate::core::target::Target;
use crate::error::TargetFailure;

/// Per-target outcomes, in catalog order
#[derive(Debug)]
pub struct TargetOutcomes<T> {
    entries: Vec<(Target, Result<T, TargetFailure>)>,
}

impl<T> TargetOutcomes<T> {
    /// Wrap outcomes that were produced without the scheduler
    pub fn from_entries(entries: Vec<(Target, Result<T, TargetFailure>)>) -> Self {
        Self { entries }
    }

    /// All outcomes in catalog order
    pub fn entries(&self) -> &[(Target, Result<T, TargetFailure>)] {
        &self.entries
    }

    /// Outcome for one target
    pub fn get(&self, target: &Target) -> Option<&Result<T, TargetFailure>> {
        self.entries
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, outcome)| outcome)
    }

    /// Successful values
    pub fn successes(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|(_, o)| o.as_ref().ok())
    }

    /// Number of failed targets
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_err()).count()
    }

    /// Number of recorded outcomes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no outcomes were recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bounded worker pool over targets
#[derive(Debug, Clone)]
pub struct Scheduler {
    jobs: usize,
    progress: Option<ProgressBar>,
}

impl Scheduler {
    /// Create a scheduler with `jobs` concurrent workers (at least one)
    pub fn new(jobs: usize) -> Self {
        Self {
            jobs: jobs.max(1),
            progress: None,
        }
    }

    /// Report finished targets on a progress bar
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Number of concurrent workers
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Run `task` for every target and wait for all of them
    pub async fn run<T, F>(&self, targets: &[Target], task: F) -> TargetOutcomes<T>
    where
        T: Send + 'static,
        F: Fn(&Target) -> Result<T, TargetFailure> + Send + Sync + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let task = Arc::new(task);

        tracing::info!(
            "Running {} targets with {} workers",
            targets.len(),
            self.jobs
        );

        let handles: Vec<_> = targets
            .iter()
            .cloned()
            .map(|target| {
                let sem = Arc::clone(&semaphore);
                let task = Arc::clone(&task);
                let progress = self.progress.clone();

                tokio::spawn(async move {
                    let _permit = match sem.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => return Err(TargetFailure::Aborted(e.to_string())),
                    };

                    let worker_target = target.clone();
                    let outcome = match tokio::task::spawn_blocking(move || (*task)(&worker_target))
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(e) => Err(TargetFailure::Aborted(e.to_string())),
                    };

                    if let Some(pb) = progress {
                        pb.set_message(target.to_string());
                        pb.inc(1);
                    }
                    outcome
                })
            })
            .collect();

        let joined = futures::future::join_all(handles).await;

        let entries = targets
            .iter()
            .cloned()
            .zip(joined)
            .map(|(target, joined)| {
                let outcome = joined.unwrap_or_else(|e| Err(TargetFailure::Aborted(e.to_string())));
                if let Err(e) = &outcome {
                    tracing::warn!("{target} failed: {e}");
                }
                (target, outcome)
            })
            .collect();

        TargetOutcomes { entries }
    }
}
