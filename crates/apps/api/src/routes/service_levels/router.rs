use crate::api_state::ApiContext;
use crate::service_levels::handlers::list_service_levels_handler;
use axum::{Router, routing::get};

pub fn service_levels_public_router() -> Router<ApiContext> {
    Router::new().route("/service-levels", get(list_service_levels_handler))
}
