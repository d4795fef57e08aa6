use crate::{
    ApiSettings, AppConstants, GeocodingSettings, LoggingSettings, NotificationSettings,
    RawSettings, SecretSettings,
};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
    pub geocoding: GeocodingSettings,
    pub notifications: NotificationSettings,
    pub constants: AppConstants,
}

impl From<RawSettings> for AppSettings {
    fn from(raw: RawSettings) -> Self {
        let notifications = NotificationSettings {
            webhook_url: raw.notifications.webhook_url.trim().to_owned(),
            timeout_seconds: raw.notifications.timeout_seconds,
        };

        Self {
            logging: raw.logging,
            api: raw.api,
            secrets: raw.secrets,
            geocoding: raw.geocoding,
            notifications,
            constants: raw.constants.into(),
        }
    }
}

impl NotificationSettings {
    #[must_use]
    pub fn has_webhook(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl GeocodingSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
