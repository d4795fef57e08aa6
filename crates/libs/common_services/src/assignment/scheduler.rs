use super::ranking::{RankedCandidate, rank_candidates};
use super::{AssignmentError, CrewDirectory, JobAssignmentStore, StorageError};
use crate::geo::GeoPoint;
use crate::notify::{AssignmentNotice, Notifier};
use app_state::AssignmentSettings;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// A job that is ready to be matched with a crew.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRequest {
    pub job_id: Uuid,
    pub location: GeoPoint,
    pub property_address: String,
    pub scheduled_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentOutcome {
    Assigned {
        crew_id: Uuid,
        distance_km: f64,
        rounds: u32,
    },
    /// Every round came up empty.
    Exhausted { rounds: u32 },
    /// Stopped through the cancellation token.
    Cancelled { rounds: u32 },
    /// The job stopped waiting for a crew (cancelled or assigned elsewhere). Any claim was released.
    JobClosed { rounds: u32 },
}

impl AssignmentOutcome {
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned { .. })
    }

    #[must_use]
    pub const fn rounds(&self) -> u32 {
        match self {
            Self::Assigned { rounds, .. }
            | Self::Exhausted { rounds }
            | Self::Cancelled { rounds }
            | Self::JobClosed { rounds } => *rounds,
        }
    }
}

enum RoundResult {
    Assigned(RankedCandidate),
    NoCandidates,
    AllClaimsLost,
    JobClosed,
}

/// Polls the crew directory, ranks by distance and claims the nearest crew that is still free.
pub struct AssignmentScheduler {
    directory: Arc<dyn CrewDirectory>,
    jobs: Arc<dyn JobAssignmentStore>,
    notifier: Arc<dyn Notifier>,
    settings: AssignmentSettings,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

/// Removes the job from the in-flight set when the attempt ends, however it ends.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
    job_id: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.job_id);
    }
}

fn lock(set: &Mutex<HashSet<Uuid>>) -> MutexGuard<'_, HashSet<Uuid>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AssignmentScheduler {
    pub fn new(
        directory: Arc<dyn CrewDirectory>,
        jobs: Arc<dyn JobAssignmentStore>,
        notifier: Arc<dyn Notifier>,
        settings: AssignmentSettings,
    ) -> Self {
        Self {
            directory,
            jobs,
            notifier,
            settings,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &AssignmentSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_in_flight(&self, job_id: Uuid) -> bool {
        lock(&self.in_flight).contains(&job_id)
    }

    fn begin(&self, job_id: Uuid) -> Result<InFlightGuard, AssignmentError> {
        if !lock(&self.in_flight).insert(job_id) {
            return Err(AssignmentError::AlreadyInProgress(job_id));
        }
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            job_id,
        })
    }

    /// Runs up to `max_attempts` rounds with a fixed backoff in between.
    ///
    /// Storage failures are retried like empty rounds. They are only returned when the last
    /// round also failed on storage.
    #[instrument(skip(self, request, cancel), fields(job_id = %request.job_id))]
    pub async fn assign(
        &self,
        request: &AssignmentRequest,
        cancel: &CancellationToken,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        let _guard = self.begin(request.job_id)?;
        let rounds = self.settings.rounds();
        let mut last_failure = None;

        for round in 1..=rounds {
            if cancel.is_cancelled() {
                info!("Assignment cancelled before round {round}.");
                return Ok(AssignmentOutcome::Cancelled { rounds: round - 1 });
            }

            match self.run_round(request).await {
                Ok(RoundResult::Assigned(ranked)) => {
                    info!(
                        crew_id = %ranked.candidate.id,
                        "Assigned {} ({:.2} km away) in round {round}.",
                        ranked.candidate.full_name,
                        ranked.distance_km
                    );
                    return Ok(AssignmentOutcome::Assigned {
                        crew_id: ranked.candidate.id,
                        distance_km: ranked.distance_km,
                        rounds: round,
                    });
                }
                Ok(RoundResult::JobClosed) => {
                    info!("Job no longer awaits a crew, stopping.");
                    return Ok(AssignmentOutcome::JobClosed { rounds: round });
                }
                Ok(RoundResult::NoCandidates) => {
                    debug!("Round {round}/{rounds}: no available crew.");
                    last_failure = None;
                }
                Ok(RoundResult::AllClaimsLost) => {
                    debug!("Round {round}/{rounds}: every claim was lost.");
                    last_failure = None;
                }
                Err(error) => {
                    warn!("Round {round}/{rounds} failed on storage: {error}");
                    last_failure = Some(error);
                }
            }

            if round < rounds {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("Assignment cancelled during backoff.");
                        return Ok(AssignmentOutcome::Cancelled { rounds: round });
                    }
                    () = tokio::time::sleep(self.settings.backoff) => {}
                }
            }
        }

        match last_failure {
            Some(source) => Err(AssignmentError::Storage {
                job_id: request.job_id,
                rounds,
                source,
            }),
            None => Ok(AssignmentOutcome::Exhausted { rounds }),
        }
    }

    async fn run_round(&self, request: &AssignmentRequest) -> Result<RoundResult, StorageError> {
        let candidates = self.directory.list_candidates().await?;
        let ranked = rank_candidates(request.location, candidates, self.settings.max_distance_km);
        if ranked.is_empty() {
            return Ok(RoundResult::NoCandidates);
        }

        for candidate in ranked {
            let crew_id = candidate.candidate.id;
            if !self.directory.try_claim(crew_id).await? {
                debug!(%crew_id, "Claim lost, trying next candidate.");
                continue;
            }

            return match self.jobs.mark_dispatched(request.job_id, crew_id).await {
                Ok(true) => {
                    self.notify(request, &candidate).await;
                    Ok(RoundResult::Assigned(candidate))
                }
                Ok(false) => {
                    self.release_claim(crew_id).await;
                    Ok(RoundResult::JobClosed)
                }
                Err(error) => {
                    self.release_claim(crew_id).await;
                    Err(error)
                }
            };
        }

        Ok(RoundResult::AllClaimsLost)
    }

    async fn release_claim(&self, crew_id: Uuid) {
        match self.directory.release(crew_id).await {
            Ok(true) => debug!(%crew_id, "Released claim."),
            Ok(false) => warn!(%crew_id, "Claim was already released."),
            Err(error) => warn!(%crew_id, "Failed to release claim: {error}"),
        }
    }

    async fn notify(&self, request: &AssignmentRequest, ranked: &RankedCandidate) {
        let notice = AssignmentNotice {
            job_id: request.job_id,
            crew_id: ranked.candidate.id,
            crew_name: ranked.candidate.full_name.clone(),
            crew_email: ranked.candidate.email.clone(),
            crew_phone: ranked.candidate.phone_number.clone(),
            property_address: request.property_address.clone(),
            scheduled_date: request.scheduled_date.clone(),
        };
        if let Err(error) = self.notifier.notify_assignment(&notice).await {
            warn!(crew_id = %notice.crew_id, "Crew notification failed: {error}");
        }
    }
}
