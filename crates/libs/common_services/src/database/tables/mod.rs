pub mod client;
pub mod crew;
pub mod job;
pub mod service_level;
