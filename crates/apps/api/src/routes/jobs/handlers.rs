use crate::api_state::ApiContext;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use common_services::api::jobs::error::JobError;
use common_services::api::jobs::interfaces::{
    CompletedJobsResponse, CreateJobRequest, JobRatingResponse, RateJobRequest,
};
use common_services::api::jobs::service::{
    cancel_job, create_job, get_job, get_job_details, get_job_rating, list_completed_jobs,
    list_jobs, rate_job,
};
use common_services::database::client::Client;
use common_services::database::job::{Job, JobSummary};
use tracing::info;
use uuid::Uuid;

/// Book a new clearance job.
///
/// The job is stored right away; crew assignment continues in the background.
#[utoipa::path(
    post,
    path = "/jobs",
    tag = "Jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created.", body = Job),
        (status = 400, description = "Missing fields or unknown service level."),
        (status = 500, description = "A database or internal error occurred."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_job_handler(
    State(context): State<ApiContext>,
    Extension(client): Extension<Client>,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), JobError> {
    let job = create_job(
        &context.pool,
        context.geocoder.as_ref(),
        &context.dispatcher,
        client.id,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// List the client's jobs, newest first.
#[utoipa::path(
    get,
    path = "/jobs",
    tag = "Jobs",
    responses(
        (status = 200, description = "The client's jobs.", body = Vec<Job>),
        (status = 500, description = "A database or internal error occurred."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_jobs_handler(
    State(context): State<ApiContext>,
    Extension(client): Extension<Client>,
) -> Result<Json<Vec<Job>>, JobError> {
    Ok(Json(list_jobs(&context.pool, client.id).await?))
}

#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    tag = "Jobs",
    params(
        ("job_id" = Uuid, Path, description = "The id of the job.")
    ),
    responses(
        (status = 200, description = "The job.", body = Job),
        (status = 404, description = "No such job for this client."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_job_handler(
    State(context): State<ApiContext>,
    Extension(client): Extension<Client>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Job>, JobError> {
    Ok(Json(get_job(&context.pool, client.id, job_id).await?))
}

/// A job with its service level and crew names resolved.
#[utoipa::path(
    get,
    path = "/jobs/{job_id}/details",
    tag = "Jobs",
    params(
        ("job_id" = Uuid, Path, description = "The id of the job.")
    ),
    responses(
        (status = 200, description = "The job summary.", body = JobSummary),
        (status = 404, description = "No such job for this client."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_job_details_handler(
    State(context): State<ApiContext>,
    Extension(client): Extension<Client>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobSummary>, JobError> {
    Ok(Json(get_job_details(&context.pool, client.id, job_id).await?))
}

/// The client's completed jobs, most recently finished first.
#[utoipa::path(
    get,
    path = "/jobs/completed/all",
    tag = "Jobs",
    responses(
        (status = 200, description = "Completed jobs and their count.", body = CompletedJobsResponse),
        (status = 500, description = "A database or internal error occurred."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_completed_jobs_handler(
    State(context): State<ApiContext>,
    Extension(client): Extension<Client>,
) -> Result<Json<CompletedJobsResponse>, JobError> {
    Ok(Json(list_completed_jobs(&context.pool, client.id).await?))
}

/// Cancel a job that has not started on site yet.
///
/// Frees the assigned crew and stops a running crew search.
#[utoipa::path(
    delete,
    path = "/jobs/{job_id}/cancel",
    tag = "Jobs",
    params(
        ("job_id" = Uuid, Path, description = "The id of the job.")
    ),
    responses(
        (status = 200, description = "Job cancelled.", body = Job),
        (status = 400, description = "The job can no longer be cancelled."),
        (status = 404, description = "No such job for this client."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_job_handler(
    State(context): State<ApiContext>,
    Extension(client): Extension<Client>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Job>, JobError> {
    let job = cancel_job(&context.pool, &context.dispatcher, client.id, job_id).await?;
    info!("Job {job_id} cancelled by client {}", client.id);
    Ok(Json(job))
}

/// Rate a completed job, once.
#[utoipa::path(
    post,
    path = "/jobs/{job_id}/rating",
    tag = "Jobs",
    params(
        ("job_id" = Uuid, Path, description = "The id of the job.")
    ),
    request_body = RateJobRequest,
    responses(
        (status = 200, description = "Rating stored.", body = JobRatingResponse),
        (status = 400, description = "Out of range, not completed, or already rated."),
        (status = 404, description = "No such job for this client."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rate_job_handler(
    State(context): State<ApiContext>,
    Extension(client): Extension<Client>,
    Path(job_id): Path<Uuid>,
    Json(payload): Json<RateJobRequest>,
) -> Result<Json<JobRatingResponse>, JobError> {
    let response = rate_job(
        &context.pool,
        &context.settings.constants.jobs,
        client.id,
        job_id,
        payload,
    )
    .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/jobs/{job_id}/rating",
    tag = "Jobs",
    params(
        ("job_id" = Uuid, Path, description = "The id of the job.")
    ),
    responses(
        (status = 200, description = "The rating, null when not rated yet.", body = JobRatingResponse),
        (status = 404, description = "No such job for this client."),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_job_rating_handler(
    State(context): State<ApiContext>,
    Extension(client): Extension<Client>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRatingResponse>, JobError> {
    Ok(Json(get_job_rating(&context.pool, client.id, job_id).await?))
}
