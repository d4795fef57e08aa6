use crate::routes::{client, jobs, root, service_levels};
use common_services::api::jobs::interfaces::{
    AssignedCrew, AssignedCrewResponse, CompletedJobsResponse, CreateJobRequest,
    JobRatingResponse, RateJobRequest,
};
use common_services::database::client::Client;
use common_services::database::job::{Job, JobStatus, JobSummary};
use common_services::database::service_level::ServiceLevel;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        service_levels::handlers::list_service_levels_handler,
        // Job handlers
        jobs::handlers::create_job_handler,
        jobs::handlers::list_jobs_handler,
        jobs::handlers::get_job_handler,
        jobs::handlers::get_job_details_handler,
        jobs::handlers::list_completed_jobs_handler,
        jobs::handlers::cancel_job_handler,
        jobs::handlers::rate_job_handler,
        jobs::handlers::get_job_rating_handler,
        // Client handlers
        client::handlers::client_profile_handler,
        client::handlers::assigned_crew_handler,
    ),
    components(
        schemas(
            Job,
            JobStatus,
            ServiceLevel,
            CreateJobRequest,
            RateJobRequest,
            JobRatingResponse,
            AssignedCrew,
            AssignedCrewResponse,
            JobSummary,
            CompletedJobsResponse,
            Client,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Jobs", description = "Booking, tracking, cancelling and rating clearance jobs"),
        (name = "Client", description = "The client's profile and assigned crew"),
        (name = "Service levels", description = "Available service tiers and prices"),
        (name = "System", description = "Health check"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
