use super::{AssignmentError, AssignmentOutcome, AssignmentRequest, AssignmentScheduler};
use crate::alert;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Running attempts by job, tagged with a sequence number so a finished task only removes its own entry.
type AttemptMap = HashMap<Uuid, (u64, CancellationToken)>;

/// Runs each assignment as its own background task and keeps their cancellation handles.
#[derive(Clone)]
pub struct AssignmentDispatcher {
    scheduler: Arc<AssignmentScheduler>,
    shutdown: CancellationToken,
    attempts: Arc<Mutex<AttemptMap>>,
    sequence: Arc<AtomicU64>,
}

fn lock(attempts: &Mutex<AttemptMap>) -> MutexGuard<'_, AttemptMap> {
    attempts.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AssignmentDispatcher {
    #[must_use]
    pub fn new(scheduler: Arc<AssignmentScheduler>, shutdown: CancellationToken) -> Self {
        Self {
            scheduler,
            shutdown,
            attempts: Arc::new(Mutex::new(HashMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts an assignment attempt in the background and returns immediately.
    ///
    /// Returns `None` without spawning when the job already has a running attempt, which keeps
    /// that attempt cancellable.
    pub fn dispatch(&self, request: AssignmentRequest) -> Option<JoinHandle<()>> {
        let job_id = request.job_id;
        let token = self.shutdown.child_token();
        let attempt = self.sequence.fetch_add(1, Ordering::Relaxed);
        match lock(&self.attempts).entry(job_id) {
            Entry::Occupied(_) => {
                warn!("Job {job_id} already has a running assignment attempt.");
                return None;
            }
            Entry::Vacant(entry) => {
                entry.insert((attempt, token.clone()));
            }
        }

        let scheduler = Arc::clone(&self.scheduler);
        let attempts = Arc::clone(&self.attempts);
        let span = info_span!("auto_assign", %job_id);

        Some(tokio::spawn(
            async move {
                let result = scheduler.assign(&request, &token).await;
                report(job_id, &result);

                let mut attempts = lock(&attempts);
                if attempts.get(&job_id).is_some_and(|(current, _)| *current == attempt) {
                    attempts.remove(&job_id);
                }
            }
            .instrument(span),
        ))
    }

    /// Cancels the running attempt for `job_id`, if any.
    pub fn cancel(&self, job_id: Uuid) -> bool {
        match lock(&self.attempts).remove(&job_id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_running(&self, job_id: Uuid) -> bool {
        lock(&self.attempts).contains_key(&job_id)
    }

    /// Cancels every running attempt.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        lock(&self.attempts).clear();
    }
}

fn report(job_id: Uuid, result: &Result<AssignmentOutcome, AssignmentError>) {
    match result {
        Ok(AssignmentOutcome::Assigned {
            crew_id, rounds, ..
        }) => info!(%crew_id, "Job {job_id} assigned after {rounds} round(s)."),
        Ok(AssignmentOutcome::Exhausted { rounds }) => {
            alert!("No crew could be assigned to job {job_id} after {rounds} round(s).");
        }
        Ok(AssignmentOutcome::Cancelled { .. }) => info!("Assignment of job {job_id} cancelled."),
        Ok(AssignmentOutcome::JobClosed { .. }) => {
            info!("Job {job_id} closed before a crew was assigned.");
        }
        Err(AssignmentError::AlreadyInProgress(_)) => {
            warn!("Duplicate assignment attempt for job {job_id} ignored.");
        }
        Err(error @ AssignmentError::Storage { .. }) => {
            alert!("Assignment of job {job_id} failed: {error}");
        }
    }
}
