use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::State;
use common_services::api::jobs::error::JobError;
use common_services::api::jobs::service::list_service_levels;
use common_services::database::service_level::ServiceLevel;

/// List the active service levels, fastest SLA first.
#[utoipa::path(
    get,
    path = "/service-levels",
    tag = "Service levels",
    responses(
        (status = 200, description = "Active service levels.", body = Vec<ServiceLevel>),
        (status = 500, description = "A database or internal error occurred."),
    )
)]
pub async fn list_service_levels_handler(
    State(context): State<ApiContext>,
) -> Result<Json<Vec<ServiceLevel>>, JobError> {
    Ok(Json(list_service_levels(&context.pool).await?))
}
