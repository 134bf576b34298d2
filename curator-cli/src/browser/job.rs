//! Background transfer job tracking.
//!
//! At most one job is tracked at a time. Status transitions are derived by
//! comparing the previous snapshot with the incoming one, so completion and
//! failure side effects fire exactly once even when polls keep arriving. The
//! generation counter ties polls and display-expiry timers to the job they
//! were started for.

use crate::api::{JobStatus, TransferJob};

/// Edge-triggered status change between two poll snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTransition {
    Started,
    Completed,
    Failed,
}

#[derive(Debug, Default)]
pub struct JobTracker {
    current: Option<TransferJob>,
    generation: u64,
}

impl JobTracker {
    /// Begin tracking a freshly submitted job. The placeholder snapshot shows
    /// zero progress against `estimated_total` until the first poll lands.
    pub fn begin(&mut self, job_id: String, estimated_total: u64) -> u64 {
        self.generation += 1;
        self.current = Some(TransferJob {
            job_id,
            status: JobStatus::Processing,
            progress: 0,
            total: estimated_total,
            eta_seconds: None,
            error_message: None,
        });
        self.generation
    }

    /// Fold in a poll result, returning the transition it caused, if any.
    /// Repeated terminal snapshots produce no transition.
    pub fn apply(&mut self, job: TransferJob) -> Option<JobTransition> {
        let prev = self.current.as_ref().map(|j| j.status);
        let transition = match (prev, job.status) {
            (prev, JobStatus::Completed) if prev != Some(JobStatus::Completed) => {
                Some(JobTransition::Completed)
            }
            (prev, JobStatus::Failed) if prev != Some(JobStatus::Failed) => {
                Some(JobTransition::Failed)
            }
            (Some(JobStatus::Pending), JobStatus::Processing) => Some(JobTransition::Started),
            _ => None,
        };
        self.current = Some(job);
        transition
    }

    pub fn current(&self) -> Option<&TransferJob> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Stop tracking and invalidate every outstanding poll and timer.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: JobStatus, progress: u64) -> TransferJob {
        TransferJob {
            job_id: "job-1".into(),
            status,
            progress,
            total: 200,
            eta_seconds: None,
            error_message: None,
        }
    }

    #[test]
    fn test_completion_fires_once() {
        let mut tracker = JobTracker::default();
        tracker.begin("job-1".into(), 200);

        assert_eq!(tracker.apply(snapshot(JobStatus::Processing, 50)), None);
        assert_eq!(
            tracker.apply(snapshot(JobStatus::Completed, 200)),
            Some(JobTransition::Completed)
        );
        assert_eq!(tracker.apply(snapshot(JobStatus::Completed, 200)), None);
    }

    #[test]
    fn test_failure_fires_once() {
        let mut tracker = JobTracker::default();
        tracker.begin("job-1".into(), 200);

        assert_eq!(
            tracker.apply(snapshot(JobStatus::Failed, 10)),
            Some(JobTransition::Failed)
        );
        assert_eq!(tracker.apply(snapshot(JobStatus::Failed, 10)), None);
    }

    #[test]
    fn test_pending_to_processing_is_started() {
        let mut tracker = JobTracker::default();
        tracker.begin("job-1".into(), 200);
        tracker.apply(snapshot(JobStatus::Pending, 0));
        assert_eq!(
            tracker.apply(snapshot(JobStatus::Processing, 5)),
            Some(JobTransition::Started)
        );
    }

    #[test]
    fn test_begin_supersedes_previous_job() {
        let mut tracker = JobTracker::default();
        let first = tracker.begin("job-1".into(), 200);
        let second = tracker.begin("job-2".into(), 50);
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
        assert_eq!(tracker.current().unwrap().job_id, "job-2");
    }

    #[test]
    fn test_clear_invalidates_generation() {
        let mut tracker = JobTracker::default();
        let generation = tracker.begin("job-1".into(), 200);
        tracker.clear();
        assert!(!tracker.is_current(generation));
        assert!(tracker.current().is_none());
    }
}
