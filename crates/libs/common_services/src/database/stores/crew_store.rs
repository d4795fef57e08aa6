use crate::database::DbError;
use crate::database::crew::{Crew, CrewCandidate};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

/// Completed work history of a crew member.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CrewJobStats {
    pub jobs_completed: i64,
    pub average_rating: Option<f64>,
}

pub struct CrewStore;

impl CrewStore {
    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        crew_id: Uuid,
    ) -> Result<Option<Crew>, DbError> {
        Ok(sqlx::query_as::<_, Crew>(
            r"
            SELECT id, full_name, email, phone_number, status, is_approved,
                   latitude, longitude, created_at, updated_at
            FROM crew
            WHERE id = $1
            ",
        )
        .bind(crew_id)
        .fetch_optional(executor)
        .await?)
    }

    /// Crew that are available, approved and have a valid location.
    pub async fn list_candidates(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<Vec<CrewCandidate>, DbError> {
        let mut candidates = sqlx::query_as::<_, CrewCandidate>(
            r"
            SELECT id, full_name, email, phone_number, latitude, longitude
            FROM crew
            WHERE status = 'available'
              AND is_approved
              AND latitude IS NOT NULL
              AND latitude BETWEEN -90 AND 90
              AND longitude BETWEEN -180 AND 180
            ",
        )
        .fetch_all(executor)
        .await?;
        candidates.retain(CrewCandidate::has_valid_location);
        Ok(candidates)
    }

    /// Moves a crew member from `available` to `assigned` in a single conditional update.
    ///
    /// Returns `false` when the row was not available anymore, i.e. another assignment won.
    pub async fn try_claim(
        executor: impl Executor<'_, Database = Postgres>,
        crew_id: Uuid,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"
            UPDATE crew
            SET status = 'assigned', updated_at = now()
            WHERE id = $1 AND status = 'available' AND is_approved
            ",
        )
        .bind(crew_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Moves a crew member from `assigned` back to `available`.
    pub async fn release(
        executor: impl Executor<'_, Database = Postgres>,
        crew_id: Uuid,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"
            UPDATE crew
            SET status = 'available', updated_at = now()
            WHERE id = $1 AND status = 'assigned'
            ",
        )
        .bind(crew_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn job_stats(
        executor: impl Executor<'_, Database = Postgres>,
        crew_id: Uuid,
    ) -> Result<CrewJobStats, DbError> {
        Ok(sqlx::query_as::<_, CrewJobStats>(
            r"
            SELECT COUNT(*) AS jobs_completed,
                   AVG(rating) AS average_rating
            FROM jobs
            WHERE assigned_crew_id = $1 AND status = 'job_completed'
            ",
        )
        .bind(crew_id)
        .fetch_one(executor)
        .await?)
    }
}
