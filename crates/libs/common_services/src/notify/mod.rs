mod error;
mod webhook;

pub use error::NotifyError;
pub use webhook::WebhookNotifier;

use app_state::NotificationSettings;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// What a crew member needs to know about a job they were dispatched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentNotice {
    pub job_id: Uuid,
    pub crew_id: Uuid,
    pub crew_name: String,
    pub crew_email: String,
    pub crew_phone: Option<String>,
    pub property_address: String,
    pub scheduled_date: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_assignment(&self, notice: &AssignmentNotice) -> Result<(), NotifyError>;
}

/// Writes notices to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_assignment(&self, notice: &AssignmentNotice) -> Result<(), NotifyError> {
        info!(
            job_id = %notice.job_id,
            crew_id = %notice.crew_id,
            "Crew {} <{}> dispatched to {} on {}",
            notice.crew_name,
            notice.crew_email,
            notice.property_address,
            notice.scheduled_date,
        );
        Ok(())
    }
}

/// Webhook notifier when a url is configured, log notifier otherwise.
pub fn notifier_from_settings(
    settings: &NotificationSettings,
) -> Result<Arc<dyn Notifier>, NotifyError> {
    if settings.has_webhook() {
        Ok(Arc::new(WebhookNotifier::new(
            &settings.webhook_url,
            settings.timeout(),
        )?))
    } else {
        Ok(Arc::new(LogNotifier))
    }
}
