//! Geocoding client module
//!
//! Port + HTTP implementation for the geocoding collaborator used by the
//! destination resolver's fourth layer. Without an API key the client is
//! never constructed and the layer is skipped.

mod http;

pub use http::HttpGeocoder;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the geocoding collaborator
///
/// All of these stay inside the resolver; a failed geocode means "layer
/// produced no candidate", never a propagated error.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned status '{0}'")]
    BadStatus(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A geocoded place
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub city: Option<String>,
    pub country: Option<String>,
    pub formatted_address: String,
    pub lat: f64,
    pub lng: f64,
}

/// Geocoding port
///
/// `bias_country` carries a context hint (e.g. the departure country) that
/// implementations may use to disambiguate, or ignore.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve free text to a place, or None when the provider finds nothing
    async fn geocode(&self, query: &str, bias_country: Option<&str>) -> Result<Option<GeocodedPlace>, GeoError>;
}
