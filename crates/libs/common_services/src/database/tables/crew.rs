use crate::geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A crew member as seen by the dispatch side. Crew onboarding lives elsewhere.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Crew {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub status: CrewStatus,
    pub is_approved: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Crew {
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => GeoPoint::new(latitude, longitude),
            _ => None,
        }
    }

    /// Available, approved and located: eligible for auto-assignment.
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        self.status == CrewStatus::Available && self.is_approved && self.location().is_some()
    }

    #[must_use]
    pub fn as_candidate(&self) -> Option<CrewCandidate> {
        let location = self.location()?;
        Some(CrewCandidate {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
        })
    }
}

/// Snapshot of an assignable crew member taken at poll time.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CrewCandidate {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CrewCandidate {
    /// Same rule as [`GeoPoint::new`]: finite and within range.
    #[must_use]
    pub fn has_valid_location(&self) -> bool {
        GeoPoint::new(self.latitude, self.longitude).is_some()
    }

    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Maps to the `crew_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "crew_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CrewStatus {
    Available,
    Assigned,
    Offline,
}
