use super::{CrewDirectory, JobAssignmentStore, StorageError};
use crate::database::crew::{Crew, CrewCandidate, CrewStatus};
use crate::database::job::JobStatus;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct DirectoryState {
    crew: Vec<Crew>,
    polls: u32,
    failing_polls: u32,
}

/// In-process crew directory. Every operation runs under one lock, so claims are atomic.
#[derive(Debug, Default)]
pub struct MemoryCrewDirectory {
    state: Mutex<DirectoryState>,
}

impl MemoryCrewDirectory {
    #[must_use]
    pub fn new(crew: impl IntoIterator<Item = Crew>) -> Self {
        Self {
            state: Mutex::new(DirectoryState {
                crew: crew.into_iter().collect(),
                ..DirectoryState::default()
            }),
        }
    }

    pub async fn insert(&self, crew: Crew) {
        self.state.lock().await.crew.push(crew);
    }

    pub async fn status(&self, crew_id: Uuid) -> Option<CrewStatus> {
        let state = self.state.lock().await;
        state.crew.iter().find(|c| c.id == crew_id).map(|c| c.status)
    }

    /// Number of `list_candidates` calls so far, failed ones included.
    pub async fn polls(&self) -> u32 {
        self.state.lock().await.polls
    }

    /// Makes the next `count` polls fail with a storage error.
    pub async fn fail_next_polls(&self, count: u32) {
        self.state.lock().await.failing_polls = count;
    }

    async fn swap_status(&self, crew_id: Uuid, from: CrewStatus, to: CrewStatus) -> bool {
        let mut state = self.state.lock().await;
        let Some(crew) = state
            .crew
            .iter_mut()
            .find(|c| c.id == crew_id && c.status == from && c.is_approved)
        else {
            return false;
        };
        crew.status = to;
        true
    }
}

#[async_trait]
impl CrewDirectory for MemoryCrewDirectory {
    async fn list_candidates(&self) -> Result<Vec<CrewCandidate>, StorageError> {
        let mut state = self.state.lock().await;
        state.polls += 1;
        if state.failing_polls > 0 {
            state.failing_polls -= 1;
            return Err(StorageError::Unavailable("crew directory offline".to_owned()));
        }

        Ok(state
            .crew
            .iter()
            .filter(|c| c.is_assignable())
            .filter_map(Crew::as_candidate)
            .collect())
    }

    async fn try_claim(&self, crew_id: Uuid) -> Result<bool, StorageError> {
        Ok(self
            .swap_status(crew_id, CrewStatus::Available, CrewStatus::Assigned)
            .await)
    }

    async fn release(&self, crew_id: Uuid) -> Result<bool, StorageError> {
        Ok(self
            .swap_status(crew_id, CrewStatus::Assigned, CrewStatus::Available)
            .await)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryJob {
    pub status: JobStatus,
    pub assigned_crew_id: Option<Uuid>,
}

#[derive(Debug, Default)]
struct JobState {
    jobs: HashMap<Uuid, MemoryJob>,
    failing_updates: u32,
}

/// In-process job store with the same conditional dispatch rule as the database.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    state: Mutex<JobState>,
}

impl MemoryJobStore {
    /// Registers a freshly created job.
    pub async fn insert_job(&self, job_id: Uuid) {
        self.state.lock().await.jobs.insert(
            job_id,
            MemoryJob {
                status: JobStatus::JobCreated,
                assigned_crew_id: None,
            },
        );
    }

    pub async fn set_status(&self, job_id: Uuid, status: JobStatus) {
        if let Some(job) = self.state.lock().await.jobs.get_mut(&job_id) {
            job.status = status;
        }
    }

    pub async fn get(&self, job_id: Uuid) -> Option<MemoryJob> {
        self.state.lock().await.jobs.get(&job_id).copied()
    }

    /// Makes the next `count` dispatch updates fail with a storage error.
    pub async fn fail_next_updates(&self, count: u32) {
        self.state.lock().await.failing_updates = count;
    }
}

#[async_trait]
impl JobAssignmentStore for MemoryJobStore {
    async fn mark_dispatched(&self, job_id: Uuid, crew_id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.state.lock().await;
        if state.failing_updates > 0 {
            state.failing_updates -= 1;
            return Err(StorageError::Unavailable("job store offline".to_owned()));
        }

        match state.jobs.get_mut(&job_id) {
            Some(job) if job.status == JobStatus::JobCreated && job.assigned_crew_id.is_none() => {
                job.status = JobStatus::CrewDispatched;
                job.assigned_crew_id = Some(crew_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
