use crate::api_state::ApiContext;
use crate::routes::jobs::handlers::{
    cancel_job_handler, create_job_handler, get_job_details_handler, get_job_handler,
    get_job_rating_handler, list_completed_jobs_handler, list_jobs_handler, rate_job_handler,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn jobs_protected_router() -> Router<ApiContext> {
    Router::new()
        .route("/jobs", post(create_job_handler).get(list_jobs_handler))
        .route("/jobs/completed/all", get(list_completed_jobs_handler))
        .route("/jobs/{job_id}", get(get_job_handler))
        .route("/jobs/{job_id}/details", get(get_job_details_handler))
        .route("/jobs/{job_id}/cancel", delete(cancel_job_handler))
        .route(
            "/jobs/{job_id}/rating",
            post(rate_job_handler).get(get_job_rating_handler),
        )
}
