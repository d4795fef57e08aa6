use crate::database::job::JobSummary;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Booking request for a new clearance job.
#[derive(Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub service_type: String,
    /// Id of an active service level, which also sets the price.
    pub service_level: Uuid,
    pub property_address: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub property_size: Option<String>,
    pub van_loads: Option<i32>,
    pub waste_types: Option<String>,
    pub furniture_items: Option<i32>,
    pub additional_notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateJobRequest {
    pub rating: f64,
    /// Free text, blank reviews are stored as null.
    pub review: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobRatingResponse {
    pub job_id: Uuid,
    pub rating: Option<f64>,
    pub has_rating: bool,
    pub review: Option<String>,
}

impl JobRatingResponse {
    #[must_use]
    pub fn new(job_id: Uuid, rating: Option<f64>, review: Option<String>) -> Self {
        Self {
            job_id,
            rating,
            has_rating: rating.is_some(),
            review,
        }
    }
}

/// A crew member with their track record.
#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedCrew {
    pub job_id: Uuid,
    pub crew_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub jobs_completed: i64,
    /// Null until the crew has a rated job.
    pub average_rating: Option<f64>,
}

/// The crew working the client's most recent active job, null when there is none.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct AssignedCrewResponse {
    pub crew: Option<AssignedCrew>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct CompletedJobsResponse {
    pub jobs: Vec<JobSummary>,
    pub total: usize,
}

impl From<Vec<JobSummary>> for CompletedJobsResponse {
    fn from(jobs: Vec<JobSummary>) -> Self {
        Self {
            total: jobs.len(),
            jobs,
        }
    }
}
