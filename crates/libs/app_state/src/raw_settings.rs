use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
    pub geocoding: GeocodingSettings,
    pub notifications: NotificationSettings,
    pub constants: RawConstants,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u32,
    pub allowed_origins: Vec<String>,
    pub public_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSettings {
    pub jwt: String,
    pub database_url: String,
}

/// Address lookup against a Nominatim compatible search endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingSettings {
    pub base_url: String,
    /// Nominatim rejects requests without an identifying user agent.
    pub user_agent: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    /// Endpoint that receives crew assignment notices as JSON.
    /// Empty means notices are only written to the log.
    #[serde(default)]
    pub webhook_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawConstants {
    pub database: DatabaseConstants,
    pub assignment: RawAssignmentConstants,
    pub jobs: JobConstants,
}

/// Database connection and related configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConstants {
    pub max_connections: u32,
    pub min_connection: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawAssignmentConstants {
    /// Number of poll-rank-claim rounds before giving up on a job.
    pub max_attempts: u32,
    /// Fixed wait between rounds, in seconds.
    pub backoff_seconds: f64,
    /// Candidates farther away than this are ignored. `None` assigns regardless of distance.
    #[serde(default)]
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JobConstants {
    pub min_rating: f64,
    pub max_rating: f64,
}
