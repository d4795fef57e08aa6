use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Invalid geocoder url: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned an error: {0}")]
    RemoteServerError(String),
}
