use crate::database::DbError;
use crate::database::client::Client;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

pub struct ClientStore;

impl ClientStore {
    pub async fn find_by_id(
        executor: impl Executor<'_, Database = Postgres>,
        client_id: Uuid,
    ) -> Result<Option<Client>, DbError> {
        Ok(sqlx::query_as::<_, Client>(
            r"
            SELECT id, email, full_name, phone_number, client_type,
                   business_address, is_verified, created_at
            FROM clients
            WHERE id = $1
            ",
        )
        .bind(client_id)
        .fetch_optional(executor)
        .await?)
    }
}
