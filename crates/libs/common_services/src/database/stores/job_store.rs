use crate::database::DbError;
use crate::database::job::{Job, JobStatus, JobSummary, NewJob};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

const JOB_COLUMNS: &str = r"
    id, client_id, assigned_crew_id, service_type, service_level_id,
    property_size, van_loads, waste_types, furniture_items,
    property_address, scheduled_date, scheduled_time, price, additional_notes,
    status, latitude, longitude, rating, review, created_at, updated_at
";

const SUMMARY_SELECT: &str = r"
    SELECT j.id AS job_id, j.service_type, sl.name AS service_level_name,
           j.property_address, j.scheduled_date, j.scheduled_time, j.status, j.price,
           c.full_name AS assigned_crew_name, j.rating,
           j.created_at AS booked_at,
           CASE WHEN j.status = 'job_completed' THEN j.updated_at END AS completed_at
    FROM jobs j
    LEFT JOIN service_levels sl ON sl.id = j.service_level_id
    LEFT JOIN crew c ON c.id = j.assigned_crew_id
";

pub struct JobStore;

impl JobStore {
    //================================================================================
    // Create / Find
    //================================================================================

    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        new_job: &NewJob,
    ) -> Result<Job, DbError> {
        let query = format!(
            r"
            INSERT INTO jobs (
                client_id, service_type, service_level_id, property_size, van_loads,
                waste_types, furniture_items, property_address, scheduled_date,
                scheduled_time, price, additional_notes, status, latitude, longitude
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'job_created', $13, $14)
            RETURNING {JOB_COLUMNS}
            "
        );

        Ok(sqlx::query_as::<_, Job>(&query)
            .bind(new_job.client_id)
            .bind(&new_job.service_type)
            .bind(new_job.service_level_id)
            .bind(&new_job.property_size)
            .bind(new_job.van_loads)
            .bind(&new_job.waste_types)
            .bind(new_job.furniture_items)
            .bind(&new_job.property_address)
            .bind(&new_job.scheduled_date)
            .bind(&new_job.scheduled_time)
            .bind(new_job.price)
            .bind(&new_job.additional_notes)
            .bind(new_job.location.map(|p| p.latitude))
            .bind(new_job.location.map(|p| p.longitude))
            .fetch_one(executor)
            .await?)
    }

    /// Finds a job, but only if it belongs to `client_id`.
    pub async fn find_for_client(
        executor: impl Executor<'_, Database = Postgres>,
        client_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Job>, DbError> {
        let query = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND client_id = $2");
        Ok(sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(client_id)
            .fetch_optional(executor)
            .await?)
    }

    pub async fn list_for_client(
        executor: impl Executor<'_, Database = Postgres>,
        client_id: Uuid,
    ) -> Result<Vec<Job>, DbError> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE client_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Job>(&query)
            .bind(client_id)
            .fetch_all(executor)
            .await?)
    }

    pub async fn find_summary_for_client(
        executor: impl Executor<'_, Database = Postgres>,
        client_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<JobSummary>, DbError> {
        let query = format!("{SUMMARY_SELECT} WHERE j.id = $1 AND j.client_id = $2");
        Ok(sqlx::query_as::<_, JobSummary>(&query)
            .bind(job_id)
            .bind(client_id)
            .fetch_optional(executor)
            .await?)
    }

    /// Completed jobs of the client, most recently finished first.
    pub async fn list_completed_summaries(
        executor: impl Executor<'_, Database = Postgres>,
        client_id: Uuid,
    ) -> Result<Vec<JobSummary>, DbError> {
        let query = format!(
            r"
            {SUMMARY_SELECT}
            WHERE j.client_id = $1 AND j.status = 'job_completed'
            ORDER BY j.updated_at DESC
            "
        );
        Ok(sqlx::query_as::<_, JobSummary>(&query)
            .bind(client_id)
            .fetch_all(executor)
            .await?)
    }

    /// Most recent job of the client that has a crew and is still in progress.
    pub async fn latest_active_assigned(
        executor: impl Executor<'_, Database = Postgres>,
        client_id: Uuid,
    ) -> Result<Option<Job>, DbError> {
        let query = format!(
            r"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE client_id = $1
              AND assigned_crew_id IS NOT NULL
              AND status NOT IN ('job_completed', 'cancelled')
            ORDER BY created_at DESC
            LIMIT 1
            "
        );
        Ok(sqlx::query_as::<_, Job>(&query)
            .bind(client_id)
            .fetch_optional(executor)
            .await?)
    }

    //================================================================================
    // Status transitions
    //================================================================================

    /// Records a crew assignment. Only succeeds once, while the job is still freshly created.
    pub async fn mark_dispatched(
        executor: impl Executor<'_, Database = Postgres>,
        job_id: Uuid,
        crew_id: Uuid,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"
            UPDATE jobs
            SET assigned_crew_id = $2, status = 'crew_dispatched', updated_at = now()
            WHERE id = $1 AND assigned_crew_id IS NULL AND status = 'job_created'
            ",
        )
        .bind(job_id)
        .bind(crew_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Cancels the job if its status still allows it. Returns the updated row.
    pub async fn cancel(
        executor: impl Executor<'_, Database = Postgres>,
        job_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<Job>, DbError> {
        let cancellable = JobStatus::CANCELLABLE
            .iter()
            .map(|status| format!("'{status}'"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            r"
            UPDATE jobs
            SET status = 'cancelled', updated_at = now()
            WHERE id = $1 AND client_id = $2 AND status IN ({cancellable})
            RETURNING {JOB_COLUMNS}
            "
        );
        Ok(sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(client_id)
            .fetch_optional(executor)
            .await?)
    }

    /// Stores a rating for a completed job that has not been rated yet.
    ///
    /// Leaves `updated_at` alone, it doubles as the completion time.
    pub async fn set_rating(
        executor: impl Executor<'_, Database = Postgres>,
        job_id: Uuid,
        rating: f64,
        review: Option<&str>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"
            UPDATE jobs
            SET rating = $2, review = $3
            WHERE id = $1 AND status = 'job_completed' AND rating IS NULL
            ",
        )
        .bind(job_id)
        .bind(rating)
        .bind(review)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
