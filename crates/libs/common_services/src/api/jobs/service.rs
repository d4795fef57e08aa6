use super::error::JobError;
use super::interfaces::{
    AssignedCrew, AssignedCrewResponse, CompletedJobsResponse, CreateJobRequest,
    JobRatingResponse, RateJobRequest,
};
use crate::alert;
use crate::assignment::{AssignmentDispatcher, AssignmentRequest};
use crate::database::crew_store::CrewStore;
use crate::database::job::{Job, JobStatus, JobSummary, NewJob};
use crate::database::job_store::JobStore;
use crate::database::service_level::ServiceLevel;
use crate::database::service_level_store::ServiceLevelStore;
use crate::geocode::Geocoder;
use app_state::JobConstants;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Rejects blank required fields and negative counts.
pub fn validate_create_request(request: &CreateJobRequest) -> Result<(), JobError> {
    let required = [
        ("serviceType", &request.service_type),
        ("propertyAddress", &request.property_address),
        ("scheduledDate", &request.scheduled_date),
        ("scheduledTime", &request.scheduled_time),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(JobError::BadRequest(format!("{field} is required")));
    }

    let counts = [
        ("vanLoads", request.van_loads),
        ("furnitureItems", request.furniture_items),
    ];
    if let Some((field, _)) = counts.iter().find(|(_, value)| value.is_some_and(|v| v < 0)) {
        return Err(JobError::BadRequest(format!("{field} cannot be negative")));
    }
    Ok(())
}

pub fn validate_rating(rating: f64, constants: &JobConstants) -> Result<f64, JobError> {
    if rating.is_finite() && (constants.min_rating..=constants.max_rating).contains(&rating) {
        Ok(rating)
    } else {
        Err(JobError::BadRequest(format!(
            "Rating must be between {} and {}",
            constants.min_rating, constants.max_rating
        )))
    }
}

/// Trims a review, blank text counts as no review.
#[must_use]
pub fn normalize_review(review: Option<String>) -> Option<String> {
    review
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Builds the scheduler input for a job. Jobs without coordinates, or that already left
/// `job_created`, are never auto-assigned.
#[must_use]
pub fn assignment_request(job: &Job) -> Option<AssignmentRequest> {
    if job.status != JobStatus::JobCreated || job.assigned_crew_id.is_some() {
        return None;
    }
    Some(AssignmentRequest {
        job_id: job.id,
        location: job.location()?,
        property_address: job.property_address.clone(),
        scheduled_date: job.scheduled_date.clone(),
    })
}

/// Stores a new job and starts auto-assignment in the background.
///
/// Returns as soon as the job is stored, whatever the assignment outcome will be.
#[instrument(skip(pool, geocoder, dispatcher, request))]
pub async fn create_job(
    pool: &PgPool,
    geocoder: &dyn Geocoder,
    dispatcher: &AssignmentDispatcher,
    client_id: Uuid,
    request: CreateJobRequest,
) -> Result<Job, JobError> {
    validate_create_request(&request)?;

    let service_level = ServiceLevelStore::find_active(pool, request.service_level)
        .await?
        .ok_or_else(|| {
            JobError::BadRequest(format!("Unknown service level {}", request.service_level))
        })?;

    let location = match geocoder.geocode(&request.property_address).await {
        Ok(Some(location)) => Some(location),
        Ok(None) => {
            warn!("No coordinates found for address, job will not be auto-assigned.");
            None
        }
        Err(error) => {
            warn!("Geocoding failed, job will not be auto-assigned: {error}");
            None
        }
    };

    let new_job = NewJob::builder()
        .client_id(client_id)
        .service_type(request.service_type.trim())
        .service_level_id(service_level.id)
        .maybe_property_size(request.property_size)
        .maybe_van_loads(request.van_loads)
        .maybe_waste_types(request.waste_types)
        .maybe_furniture_items(request.furniture_items)
        .property_address(request.property_address.trim())
        .scheduled_date(request.scheduled_date.trim())
        .scheduled_time(request.scheduled_time.trim())
        .price(f64::from(service_level.price_gbp))
        .maybe_additional_notes(request.additional_notes)
        .maybe_location(location)
        .build();

    let job = JobStore::create(pool, &new_job).await?;
    info!(job_id = %job.id, "Job created.");

    match assignment_request(&job) {
        Some(assignment) => {
            dispatcher.dispatch(assignment);
        }
        None => {
            alert!("Job {} has no coordinates and needs manual assignment.", job.id);
        }
    }

    Ok(job)
}

#[instrument(skip(pool))]
pub async fn get_job(pool: &PgPool, client_id: Uuid, job_id: Uuid) -> Result<Job, JobError> {
    JobStore::find_for_client(pool, client_id, job_id)
        .await?
        .ok_or_else(|| JobError::NotFound(format!("Job {job_id}")))
}

#[instrument(skip(pool))]
pub async fn list_jobs(pool: &PgPool, client_id: Uuid) -> Result<Vec<Job>, JobError> {
    Ok(JobStore::list_for_client(pool, client_id).await?)
}

/// A job with its service level and crew names resolved.
#[instrument(skip(pool))]
pub async fn get_job_details(
    pool: &PgPool,
    client_id: Uuid,
    job_id: Uuid,
) -> Result<JobSummary, JobError> {
    JobStore::find_summary_for_client(pool, client_id, job_id)
        .await?
        .ok_or_else(|| JobError::NotFound(format!("Job {job_id}")))
}

#[instrument(skip(pool))]
pub async fn list_completed_jobs(
    pool: &PgPool,
    client_id: Uuid,
) -> Result<CompletedJobsResponse, JobError> {
    Ok(JobStore::list_completed_summaries(pool, client_id).await?.into())
}

/// Cancels a job, frees its crew and stops a running assignment attempt.
#[instrument(skip(pool, dispatcher))]
pub async fn cancel_job(
    pool: &PgPool,
    dispatcher: &AssignmentDispatcher,
    client_id: Uuid,
    job_id: Uuid,
) -> Result<Job, JobError> {
    let mut tx = pool.begin().await?;

    let job = JobStore::find_for_client(&mut *tx, client_id, job_id)
        .await?
        .ok_or_else(|| JobError::NotFound(format!("Job {job_id}")))?;
    if !job.status.is_cancellable() {
        return Err(JobError::BadRequest(format!(
            "Job cannot be cancelled in status {}",
            job.status
        )));
    }

    let cancelled = JobStore::cancel(&mut *tx, job_id, client_id)
        .await?
        .ok_or_else(|| JobError::BadRequest("Job status changed, try again".to_owned()))?;

    if let Some(crew_id) = cancelled.assigned_crew_id
        && !CrewStore::release(&mut *tx, crew_id).await?
    {
        warn!(%crew_id, "Assigned crew was not in the assigned state.");
    }

    tx.commit().await?;

    if dispatcher.cancel(job_id) {
        info!("Stopped running assignment attempt.");
    }
    Ok(cancelled)
}

#[instrument(skip(pool, constants, request))]
pub async fn rate_job(
    pool: &PgPool,
    constants: &JobConstants,
    client_id: Uuid,
    job_id: Uuid,
    request: RateJobRequest,
) -> Result<JobRatingResponse, JobError> {
    let rating = validate_rating(request.rating, constants)?;
    let review = normalize_review(request.review);
    let job = get_job(pool, client_id, job_id).await?;

    if job.status != JobStatus::JobCompleted {
        return Err(JobError::BadRequest(
            "Only completed jobs can be rated".to_owned(),
        ));
    }
    if job.rating.is_some()
        || !JobStore::set_rating(pool, job_id, rating, review.as_deref()).await?
    {
        return Err(JobError::BadRequest("Job has already been rated".to_owned()));
    }

    Ok(JobRatingResponse::new(job_id, Some(rating), review))
}

#[instrument(skip(pool))]
pub async fn get_job_rating(
    pool: &PgPool,
    client_id: Uuid,
    job_id: Uuid,
) -> Result<JobRatingResponse, JobError> {
    let job = get_job(pool, client_id, job_id).await?;
    Ok(JobRatingResponse::new(job_id, job.rating, job.review))
}

/// The crew on the client's most recent active job, `crew` is null when no job has one.
#[instrument(skip(pool))]
pub async fn assigned_crew(pool: &PgPool, client_id: Uuid) -> Result<AssignedCrewResponse, JobError> {
    let Some((job_id, crew_id)) = JobStore::latest_active_assigned(pool, client_id)
        .await?
        .and_then(|job| Some((job.id, job.assigned_crew_id?)))
    else {
        return Ok(AssignedCrewResponse { crew: None });
    };

    let (crew, stats) = tokio::try_join!(
        CrewStore::find_by_id(pool, crew_id),
        CrewStore::job_stats(pool, crew_id),
    )?;
    let Some(crew) = crew else {
        warn!(%crew_id, "Assigned crew no longer exists.");
        return Ok(AssignedCrewResponse { crew: None });
    };

    let crew = AssignedCrew {
        job_id,
        crew_id,
        full_name: crew.full_name,
        email: crew.email,
        phone_number: crew.phone_number,
        jobs_completed: stats.jobs_completed,
        average_rating: stats.average_rating,
    };
    Ok(AssignedCrewResponse { crew: Some(crew) })
}

#[instrument(skip(pool))]
pub async fn list_service_levels(pool: &PgPool) -> Result<Vec<ServiceLevel>, JobError> {
    Ok(ServiceLevelStore::list_active(pool).await?)
}
