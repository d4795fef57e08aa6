use super::StorageError;
use crate::database::crew::CrewCandidate;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait CrewDirectory: Send + Sync {
    /// Snapshot of available, approved crew with known coordinates. Unordered.
    async fn list_candidates(&self) -> Result<Vec<CrewCandidate>, StorageError>;

    /// Atomically moves the crew member from available to assigned.
    /// `Ok(false)` means someone else got there first.
    async fn try_claim(&self, crew_id: Uuid) -> Result<bool, StorageError>;

    /// Atomically moves the crew member from assigned back to available.
    async fn release(&self, crew_id: Uuid) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait JobAssignmentStore: Send + Sync {
    /// Sets the assigned crew and moves the job to `crew_dispatched`.
    /// `Ok(false)` when the job is no longer waiting for a crew.
    async fn mark_dispatched(&self, job_id: Uuid, crew_id: Uuid) -> Result<bool, StorageError>;
}
