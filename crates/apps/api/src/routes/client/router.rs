use crate::api_state::ApiContext;
use crate::client::handlers::{assigned_crew_handler, client_profile_handler};
use axum::{Router, routing::get};

pub fn client_protected_router() -> Router<ApiContext> {
    Router::new()
        .route("/client/profile", get(client_profile_handler))
        .route("/client/assigned-crew", get(assigned_crew_handler))
}
