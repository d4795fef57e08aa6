mod api_doc;
pub mod auth;
pub mod client;
pub mod jobs;
pub mod root;
pub mod service_levels;

use crate::api_state::ApiContext;
use crate::auth::middlewares::client::ApiClient;
use crate::client::router::client_protected_router;
use crate::jobs::router::jobs_protected_router;
use crate::root::router::root_public_router;
use crate::routes::api_doc::ApiDoc;
use crate::service_levels::router::service_levels_public_router;
use axum::middleware::from_extractor_with_state;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Router {
    Router::new()
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(public_routes())
        .merge(protected_routes(api_state.clone()))
        .with_state(api_state)
}

fn public_routes() -> Router<ApiContext> {
    Router::new()
        .merge(root_public_router())
        .merge(service_levels_public_router())
}

fn protected_routes(api_state: ApiContext) -> Router<ApiContext> {
    Router::new()
        .merge(jobs_protected_router())
        .merge(client_protected_router())
        .route_layer(from_extractor_with_state::<ApiClient, ApiContext>(api_state))
}
