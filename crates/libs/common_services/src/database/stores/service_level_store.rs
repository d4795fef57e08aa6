use crate::database::DbError;
use crate::database::service_level::ServiceLevel;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

pub struct ServiceLevelStore;

impl ServiceLevelStore {
    pub async fn find_active(
        executor: impl Executor<'_, Database = Postgres>,
        service_level_id: Uuid,
    ) -> Result<Option<ServiceLevel>, DbError> {
        Ok(sqlx::query_as::<_, ServiceLevel>(
            r"
            SELECT id, name, sla_hours, price_gbp, is_active, created_at, updated_at
            FROM service_levels
            WHERE id = $1 AND is_active
            ",
        )
        .bind(service_level_id)
        .fetch_optional(executor)
        .await?)
    }

    pub async fn list_active(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<Vec<ServiceLevel>, DbError> {
        Ok(sqlx::query_as::<_, ServiceLevel>(
            r"
            SELECT id, name, sla_hours, price_gbp, is_active, created_at, updated_at
            FROM service_levels
            WHERE is_active
            ORDER BY sla_hours
            ",
        )
        .fetch_all(executor)
        .await?)
    }
}
