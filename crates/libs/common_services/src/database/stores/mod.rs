pub mod client_store;
pub mod crew_store;
pub mod job_store;
pub mod service_level_store;
