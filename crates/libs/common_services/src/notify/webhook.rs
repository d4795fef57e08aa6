use super::{AssignmentNotice, Notifier, NotifyError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Posts assignment notices as JSON to a configured endpoint.
#[derive(Clone, Debug)]
pub struct WebhookNotifier {
    http_client: Client,
    url: Url,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let url: Url = url.parse()?;
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client, url })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, notice), fields(job_id = %notice.job_id, crew_id = %notice.crew_id))]
    async fn notify_assignment(&self, notice: &AssignmentNotice) -> Result<(), NotifyError> {
        let response = self
            .http_client
            .post(self.url.clone())
            .json(notice)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!(
                "{} returned {status}: {error_text}",
                self.url
            )));
        }

        debug!("Assignment webhook delivered.");
        Ok(())
    }
}
