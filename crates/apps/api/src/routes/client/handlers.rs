use crate::api_state::ApiContext;
use axum::extract::State;
use axum::{Extension, Json};
use common_services::api::jobs::error::JobError;
use common_services::api::jobs::interfaces::AssignedCrewResponse;
use common_services::api::jobs::service::assigned_crew;
use common_services::database::client::Client;

/// The authenticated client's account.
#[utoipa::path(
    get,
    path = "/client/profile",
    tag = "Client",
    responses(
        (status = 200, description = "The client profile.", body = Client),
        (status = 401, description = "Missing or invalid token."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn client_profile_handler(Extension(client): Extension<Client>) -> Json<Client> {
    Json(client)
}

/// The crew on the client's most recent active job.
#[utoipa::path(
    get,
    path = "/client/assigned-crew",
    tag = "Client",
    responses(
        (status = 200, description = "Assigned crew with their track record, or a null crew.", body = AssignedCrewResponse),
        (status = 500, description = "A database or internal error occurred."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn assigned_crew_handler(
    State(context): State<ApiContext>,
    Extension(client): Extension<Client>,
) -> Result<Json<AssignedCrewResponse>, JobError> {
    Ok(Json(assigned_crew(&context.pool, client.id).await?))
}
