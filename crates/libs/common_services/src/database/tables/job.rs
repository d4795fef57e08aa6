use crate::geo::GeoPoint;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// A clearance job booked by a client.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub client_id: Uuid,
    pub assigned_crew_id: Option<Uuid>,
    pub service_type: String,
    pub service_level_id: Uuid,
    pub property_size: Option<String>,
    pub van_loads: Option<i32>,
    pub waste_types: Option<String>,
    pub furniture_items: Option<i32>,
    pub property_address: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub price: f64,
    pub additional_notes: Option<String>,
    pub status: JobStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Coordinates of the property, only present when geocoding succeeded.
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => GeoPoint::new(latitude, longitude),
            _ => None,
        }
    }
}

/// A job joined with its service level and crew names, as shown in the job history.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job_id: Uuid,
    pub service_type: String,
    /// Null when the service level was removed.
    pub service_level_name: Option<String>,
    pub property_address: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub status: JobStatus,
    pub price: f64,
    /// Null until a crew is assigned.
    pub assigned_crew_name: Option<String>,
    pub rating: Option<f64>,
    pub booked_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Values for a new `jobs` row, everything else is defaulted by the database.
#[derive(Debug, Clone, Builder)]
pub struct NewJob {
    pub client_id: Uuid,
    #[builder(into)]
    pub service_type: String,
    pub service_level_id: Uuid,
    pub property_size: Option<String>,
    pub van_loads: Option<i32>,
    pub waste_types: Option<String>,
    pub furniture_items: Option<i32>,
    #[builder(into)]
    pub property_address: String,
    #[builder(into)]
    pub scheduled_date: String,
    #[builder(into)]
    pub scheduled_time: String,
    pub price: f64,
    pub additional_notes: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Maps to the `job_status` Postgres enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    JobCreated,
    CrewAssigned,
    CrewDispatched,
    CrewArrived,
    BeforePhoto,
    InProgress,
    AfterPhoto,
    QuoteAccepted,
    DepositPaid,
    PaymentPending,
    JobCompleted,
    Cancelled,
}

impl JobStatus {
    /// Statuses a client may still cancel from, later stages need the crew on site.
    pub const CANCELLABLE: [Self; 5] = [
        Self::JobCreated,
        Self::CrewAssigned,
        Self::CrewDispatched,
        Self::CrewArrived,
        Self::BeforePhoto,
    ];

    #[must_use]
    pub fn is_cancellable(self) -> bool {
        Self::CANCELLABLE.contains(&self)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::JobCompleted | Self::Cancelled)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JobCreated => "job_created",
            Self::CrewAssigned => "crew_assigned",
            Self::CrewDispatched => "crew_dispatched",
            Self::CrewArrived => "crew_arrived",
            Self::BeforePhoto => "before_photo",
            Self::InProgress => "in_progress",
            Self::AfterPhoto => "after_photo",
            Self::QuoteAccepted => "quote_accepted",
            Self::DepositPaid => "deposit_paid",
            Self::PaymentPending => "payment_pending",
            Self::JobCompleted => "job_completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_early_statuses_are_cancellable() {
        assert!(JobStatus::JobCreated.is_cancellable());
        assert!(JobStatus::CrewDispatched.is_cancellable());
        assert!(JobStatus::BeforePhoto.is_cancellable());
        assert!(!JobStatus::InProgress.is_cancellable());
        assert!(!JobStatus::JobCompleted.is_cancellable());
        assert!(!JobStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn status_text_matches_database_labels() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_string(&JobStatus::CrewDispatched)?,
            "\"crew_dispatched\""
        );
        assert_eq!(JobStatus::JobCompleted.to_string(), "job_completed");
        Ok(())
    }
}
