use app_state::AppSettings;
use axum::extract::FromRef;
use common_services::assignment::AssignmentDispatcher;
use common_services::geocode::Geocoder;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiContext {
    pub pool: PgPool,
    pub settings: AppSettings,
    pub geocoder: Arc<dyn Geocoder>,
    pub dispatcher: AssignmentDispatcher,
}

// Lets extractors and middleware pull out only the part of the state they need.
impl FromRef<ApiContext> for PgPool {
    fn from_ref(state: &ApiContext) -> Self {
        state.pool.clone()
    }
}

impl FromRef<ApiContext> for AppSettings {
    fn from_ref(state: &ApiContext) -> Self {
        state.settings.clone()
    }
}

impl FromRef<ApiContext> for AssignmentDispatcher {
    fn from_ref(state: &ApiContext) -> Self {
        state.dispatcher.clone()
    }
}
