use crate::core::job::{PatchJob, PatchOutcome};
use crate::core::patcher::Patcher;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::time::{Duration, Instant};

/// What to do with the remaining jobs when one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the run on the first failure (remaining jobs untouched).
    #[default]
    Stop,
    /// Record the failure and keep going; the summary carries every failure.
    Continue,
}

#[derive(Debug, Clone)]
pub struct JobFailure {
    pub job: String,
    pub message: String,
    pub suggestion: String,
}

/// Result of a whole run: what was applied, skipped, and (under the
/// `Continue` policy) what failed.
#[derive(Debug)]
pub struct PatchSummary {
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<PatchOutcome>,
    pub failures: Vec<JobFailure>,
    pub skipped: Vec<String>,
    pub total_duration: Duration,
}

impl PatchSummary {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "started_at": self.started_at.to_rfc3339(),
            "total_jobs": self.outcomes.len() + self.failures.len() + self.skipped.len(),
            "applied": self.outcomes.len(),
            "failed": self.failures.len(),
            "skipped": self.skipped,
            "total_duration_ms": self.total_duration.as_millis() as u64,
            "jobs": self.outcomes.iter().map(|outcome| json!({
                "name": outcome.job,
                "mode": outcome.mode,
                "input": outcome.input.display().to_string(),
                "output": outcome.output.display().to_string(),
                "bytes_read": outcome.bytes_read,
                "bytes_written": outcome.bytes_written,
                "edit_offset": outcome.edit_offset,
                "removed_len": outcome.removed_len,
                "replacement_len": outcome.replacement_len,
                "backup": outcome.backup.as_ref().map(|p| p.display().to_string()),
                "dry_run": outcome.dry_run,
                "duration_ms": outcome.duration.as_millis() as u64,
            })).collect::<Vec<_>>(),
            "failures": self.failures.iter().map(|failure| json!({
                "job": failure.job,
                "error": failure.message,
                "suggestion": failure.suggestion,
            })).collect::<Vec<_>>(),
        })
    }
}

/// Runs patch jobs in order through a single [`Patcher`].
pub struct PatchEngine {
    patcher: Patcher,
    jobs: Vec<PatchJob>,
    on_failure: FailurePolicy,
}

impl PatchEngine {
    pub fn new(patcher: Patcher, jobs: Vec<PatchJob>) -> Self {
        Self::new_with_policy(patcher, jobs, FailurePolicy::Stop)
    }

    pub fn new_with_policy(
        patcher: Patcher,
        jobs: Vec<PatchJob>,
        on_failure: FailurePolicy,
    ) -> Self {
        Self {
            patcher,
            jobs,
            on_failure,
        }
    }

    pub fn run(&self) -> Result<PatchSummary> {
        let started_at = Utc::now();
        let timer = Instant::now();

        // Validate every job before touching any file, so a broken plan
        // cannot apply half its jobs first.
        for job in &self.jobs {
            job.validate()?;
        }

        let total = self.jobs.len();
        if total == 0 {
            tracing::warn!("⚠️ No patch jobs to run");
        }
        if self.patcher.is_dry_run() {
            tracing::info!("🔍 DRY RUN MODE - no files will be written");
        }

        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        let mut skipped = Vec::new();

        for (index, job) in self.jobs.iter().enumerate() {
            if !job.enabled {
                tracing::info!(
                    "⏭️ [{}/{}] Skipping disabled job '{}'",
                    index + 1,
                    total,
                    job.name
                );
                skipped.push(job.name.clone());
                continue;
            }

            tracing::info!(
                "🔧 [{}/{}] Applying '{}' ({}): {} -> {}",
                index + 1,
                total,
                job.name,
                job.edit.mode_name(),
                job.input.display(),
                job.output.display()
            );

            match self.patcher.apply(job) {
                Ok(outcome) => {
                    tracing::info!(
                        "✅ Job '{}' done in {:?}: {} bytes in, {} bytes out",
                        job.name,
                        outcome.duration,
                        outcome.bytes_read,
                        outcome.bytes_written
                    );
                    outcomes.push(outcome);
                }
                Err(error) => {
                    tracing::error!(
                        "❌ Job '{}' failed: {} (Category: {:?}, Severity: {:?})",
                        job.name,
                        error,
                        error.category(),
                        error.severity()
                    );
                    match self.on_failure {
                        FailurePolicy::Stop => return Err(error),
                        FailurePolicy::Continue => failures.push(JobFailure {
                            job: job.name.clone(),
                            message: error.user_friendly_message(),
                            suggestion: error.recovery_suggestion(),
                        }),
                    }
                }
            }
        }

        Ok(PatchSummary {
            started_at,
            outcomes,
            failures,
            skipped,
            total_duration: timer.elapsed(),
        })
    }
}
