use super::{GeocodeError, Geocoder};
use crate::geo::GeoPoint;
use app_state::GeocodingSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

/// Single hit of a Nominatim `/search` response. Coordinates come back as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

impl SearchHit {
    fn to_point(&self) -> Option<GeoPoint> {
        let latitude = self.lat.trim().parse::<f64>().ok()?;
        let longitude = self.lon.trim().parse::<f64>().ok()?;
        GeoPoint::new(latitude, longitude)
    }
}

#[derive(Clone, Debug)]
pub struct NominatimGeocoder {
    http_client: Client,
    search_url: Url,
}

impl NominatimGeocoder {
    pub fn new(settings: &GeocodingSettings) -> Result<Self, GeocodeError> {
        let mut search_url: Url = settings.base_url.parse()?;
        search_url.set_path(&format!("{}/search", search_url.path().trim_end_matches('/')));

        let http_client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            http_client,
            search_url,
        })
    }

    #[must_use]
    pub const fn search_url(&self) -> &Url {
        &self.search_url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let response = self
            .http_client
            .get(self.search_url.clone())
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeocodeError::RemoteServerError(format!(
                "{status}: {error_text}"
            )));
        }

        let hits: Vec<SearchHit> = response.json().await?;
        let Some(hit) = hits.first() else {
            debug!("No geocoding result.");
            return Ok(None);
        };

        let point = hit.to_point();
        if point.is_none() {
            warn!("Geocoder returned unusable coordinates: {}, {}", hit.lat, hit.lon);
        }
        Ok(point)
    }
}
