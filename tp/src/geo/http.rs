//! HTTP geocoding client
//!
//! Speaks the Google-style geocode wire shape:
//! `{status, results: [{geometry: {location: {lat, lng}}, address_components, formatted_address}]}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{GeoError, GeocodedPlace, Geocoder};
use crate::config::GeocodingConfig;

/// Geocoding client over the JSON geocode endpoint
pub struct HttpGeocoder {
    base_url: String,
    api_key: String,
    http: Client,
}

impl HttpGeocoder {
    /// Create a client from configuration, or None when no API key is set
    ///
    /// An absent key disables the geocoding layer entirely rather than
    /// producing a client that fails every call.
    pub fn from_config(config: &GeocodingConfig) -> Option<Self> {
        let api_key = config.api_key()?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;

        Some(Self {
            base_url: config.base_url.clone(),
            api_key,
            http,
        })
    }

    fn parse_place(result: GeocodeResult) -> GeocodedPlace {
        let mut city = None;
        let mut country = None;

        for component in &result.address_components {
            if component.types.iter().any(|t| t == "locality") {
                city = Some(component.long_name.clone());
            }
            if component.types.iter().any(|t| t == "country") {
                country = Some(component.long_name.clone());
            }
        }

        GeocodedPlace {
            city,
            country,
            formatted_address: result.formatted_address,
            lat: result.geometry.location.lat,
            lng: result.geometry.location.lng,
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, query: &str, bias_country: Option<&str>) -> Result<Option<GeocodedPlace>, GeoError> {
        debug!(query, ?bias_country, "geocode: called");

        let address = match bias_country {
            Some(country) => format!("{}, {}", query, country),
            None => query.to_string(),
        };

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("address", address.as_str()), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeoError::Malformed(e.to_string()))?;

        match body.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => {
                debug!(query, "geocode: zero results");
                return Ok(None);
            }
            other => return Err(GeoError::BadStatus(other.to_string())),
        }

        Ok(body.results.into_iter().next().map(Self::parse_place))
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    #[serde(default)]
    formatted_address: String,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place_extracts_city_and_country() {
        let result: GeocodeResult = serde_json::from_value(serde_json::json!({
            "geometry": { "location": { "lat": 43.7102, "lng": 7.262 } },
            "formatted_address": "Nice, France",
            "address_components": [
                { "long_name": "Nice", "types": ["locality", "political"] },
                { "long_name": "France", "types": ["country", "political"] }
            ]
        }))
        .unwrap();

        let place = HttpGeocoder::parse_place(result);
        assert_eq!(place.city.as_deref(), Some("Nice"));
        assert_eq!(place.country.as_deref(), Some("France"));
        assert!((place.lat - 43.7102).abs() < 1e-6);
    }

    #[test]
    fn test_parse_place_missing_components() {
        let result: GeocodeResult = serde_json::from_value(serde_json::json!({
            "geometry": { "location": { "lat": 0.0, "lng": 0.0 } }
        }))
        .unwrap();

        let place = HttpGeocoder::parse_place(result);
        assert!(place.city.is_none());
        assert!(place.country.is_none());
    }

    #[test]
    fn test_zero_results_deserializes() {
        let body: GeocodeResponse = serde_json::from_str(r#"{"status": "ZERO_RESULTS"}"#).unwrap();
        assert_eq!(body.status, "ZERO_RESULTS");
        assert!(body.results.is_empty());
    }
}
