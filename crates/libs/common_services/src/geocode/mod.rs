mod error;
mod nominatim;

pub use error::GeocodeError;
pub use nominatim::NominatimGeocoder;

use crate::geo::GeoPoint;
use async_trait::async_trait;

/// Resolves a free-text address to coordinates.
///
/// `Ok(None)` means the lookup worked but found nothing usable.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError>;
}
