use crate::{DatabaseConstants, JobConstants, RawAssignmentConstants, RawConstants};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConstants {
    pub database: DatabaseConstants,
    pub assignment: AssignmentSettings,
    pub jobs: JobConstants,
}

impl From<RawConstants> for AppConstants {
    fn from(raw: RawConstants) -> Self {
        Self {
            database: raw.database,
            assignment: raw.assignment.into(),
            jobs: raw.jobs,
        }
    }
}

/// Retry budget and selection policy for crew auto-assignment.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct AssignmentSettings {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub max_distance_km: Option<f64>,
}

impl AssignmentSettings {
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
            max_distance_km: None,
        }
    }

    #[must_use]
    pub fn with_max_distance_km(mut self, max_distance_km: Option<f64>) -> Self {
        self.max_distance_km = max_distance_km;
        self
    }

    /// Rounds to run, a budget of zero still polls once.
    #[must_use]
    pub fn rounds(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(30))
    }
}

impl From<RawAssignmentConstants> for AssignmentSettings {
    fn from(raw: RawAssignmentConstants) -> Self {
        let backoff = Duration::try_from_secs_f64(raw.backoff_seconds).unwrap_or_else(|_| {
            warn!(
                "Invalid assignment backoff_seconds {}, falling back to 0.",
                raw.backoff_seconds
            );
            Duration::ZERO
        });
        let max_distance_km = raw.max_distance_km.filter(|km| {
            let valid = km.is_finite() && *km > 0.0;
            if !valid {
                warn!("Invalid assignment max_distance_km {km}, distance cutoff disabled.");
            }
            valid
        });

        Self {
            max_attempts: raw.max_attempts,
            backoff,
            max_distance_km,
        }
    }
}
