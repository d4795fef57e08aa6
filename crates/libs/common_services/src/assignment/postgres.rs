use super::{CrewDirectory, JobAssignmentStore, StorageError};
use crate::database::crew::CrewCandidate;
use crate::database::crew_store::CrewStore;
use crate::database::job_store::JobStore;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Crew directory backed by the `crew` table.
#[derive(Debug, Clone)]
pub struct PgCrewDirectory {
    pool: PgPool,
}

impl PgCrewDirectory {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrewDirectory for PgCrewDirectory {
    async fn list_candidates(&self) -> Result<Vec<CrewCandidate>, StorageError> {
        Ok(CrewStore::list_candidates(&self.pool).await?)
    }

    async fn try_claim(&self, crew_id: Uuid) -> Result<bool, StorageError> {
        Ok(CrewStore::try_claim(&self.pool, crew_id).await?)
    }

    async fn release(&self, crew_id: Uuid) -> Result<bool, StorageError> {
        Ok(CrewStore::release(&self.pool, crew_id).await?)
    }
}

#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobAssignmentStore for PgJobStore {
    async fn mark_dispatched(&self, job_id: Uuid, crew_id: Uuid) -> Result<bool, StorageError> {
        Ok(JobStore::mark_dispatched(&self.pool, job_id, crew_id).await?)
    }
}
