//! Distance estimation through the Google Directions API.
//!
//! The estimate only pre-fills the trip form; the user can always type the
//! mileage by hand.

use std::time::Duration;

use log::{debug, info};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{MileageError, Result};

/// Default directions API host.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

const DIRECTIONS_PATH: &str = "/maps/api/directions/json";
const METERS_TO_MILES: f64 = 0.000621371;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Message shown when either location is blank.
pub const LOCATIONS_REQUIRED: &str = "Please enter both start and end locations.";

/// Convert meters to miles, rounded to one decimal place.
pub fn meters_to_miles(meters: f64) -> f64 {
    (meters * METERS_TO_MILES * 10.0).round() / 10.0
}

/// Connection settings for the directions provider.
#[derive(Debug)]
pub struct DirectionsConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub timeout: Duration,
}

impl DirectionsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), DIRECTIONS_PATH)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: LegDistance,
}

#[derive(Debug, Deserialize)]
struct LegDistance {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_message: Option<String>,
}

/// Converts an origin/destination pair into miles.
pub struct DistanceEstimator {
    client: Client,
    config: DirectionsConfig,
}

impl DistanceEstimator {
    /// Build an estimator.
    ///
    /// # Errors
    ///
    /// Returns `MileageError::Configuration` if the API key is blank or the
    /// HTTP client cannot be constructed.
    pub fn new(config: DirectionsConfig) -> Result<Self> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(MileageError::Configuration(
                "Google Maps API key is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MileageError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Estimate driving distance in miles.
    ///
    /// # Errors
    ///
    /// - `Validation` if either location is blank (no request is made)
    /// - `Network` if the provider could not be reached
    /// - `NoRoute` if the provider found no route
    /// - `Provider` for any other provider failure
    pub async fn estimate(&self, origin: &str, destination: &str) -> Result<f64> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return Err(MileageError::Validation(LOCATIONS_REQUIRED.to_string()));
        }

        debug!("Requesting directions: {} -> {}", origin, destination);

        let response = self
            .client
            .get(self.config.endpoint())
            .query(&[
                ("origin", origin),
                ("destination", destination),
                ("units", "imperial"),
                ("key", self.config.api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| MileageError::Network(describe_transport_error(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| MileageError::Network(describe_transport_error(&e)))?;

        let miles = interpret_response(status, &body)?;
        info!("Directions lookup returned {} miles", miles);
        Ok(miles)
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "could not connect to the directions service".to_string()
    } else {
        err.to_string()
    };
    format!(
        "{}. Check your network connection and the API key's application restrictions.",
        reason
    )
}

/// Classify a directions response into miles or an error.
pub fn interpret_response(status: u16, body: &str) -> Result<f64> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error_message)
            .unwrap_or_else(|| {
                format!(
                    "API returned status {}. Check API Key, enabled APIs, and billing.",
                    status
                )
            });
        return Err(MileageError::Provider(message));
    }

    let parsed: DirectionsResponse = serde_json::from_str(body).map_err(|e| {
        MileageError::Provider(format!("Unexpected response from directions API: {}", e))
    })?;

    match parsed.status.as_str() {
        "OK" | "ZERO_RESULTS" | "NOT_FOUND" => {}
        other => {
            let message = parsed
                .error_message
                .unwrap_or_else(|| format!("Directions API returned status {}", other));
            return Err(MileageError::Provider(message));
        }
    }

    let meters = parsed
        .routes
        .first()
        .and_then(|route| route.legs.first())
        .map(|leg| leg.distance.value);

    match meters {
        Some(meters) if parsed.status == "OK" => Ok(meters_to_miles(meters)),
        _ => {
            let message = parsed
                .error_message
                .or_else(|| (!parsed.status.is_empty()).then(|| parsed.status.clone()))
                .unwrap_or_else(|| "No route found. Please check addresses.".to_string());
            Err(MileageError::NoRoute(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_to_miles_rounds_to_one_decimal() {
        assert_eq!(meters_to_miles(24945.0), 15.5);
        assert_eq!(meters_to_miles(1609.344), 1.0);
        assert_eq!(meters_to_miles(0.0), 0.0);
    }

    #[test]
    fn test_ok_response() {
        let body = r#"{"status":"OK","routes":[{"legs":[{"distance":{"value":24945,"text":"15.5 mi"}}]}]}"#;
        assert_eq!(interpret_response(200, body).unwrap(), 15.5);
    }

    #[test]
    fn test_zero_results_is_no_route() {
        let body = r#"{"status":"ZERO_RESULTS","routes":[]}"#;
        match interpret_response(200, body) {
            Err(MileageError::NoRoute(message)) => assert_eq!(message, "ZERO_RESULTS"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_ok_without_legs_is_no_route() {
        let body = r#"{"status":"OK","routes":[{"legs":[]}]}"#;
        assert!(matches!(
            interpret_response(200, body),
            Err(MileageError::NoRoute(_))
        ));
    }

    #[test]
    fn test_missing_status_falls_back_to_default_message() {
        match interpret_response(200, "{}") {
            Err(MileageError::NoRoute(message)) => {
                assert_eq!(message, "No route found. Please check addresses.")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_http_error_uses_error_message() {
        let body = r#"{"error_message":"The provided API key is invalid."}"#;
        match interpret_response(403, body) {
            Err(MileageError::Provider(message)) => {
                assert_eq!(message, "The provided API key is invalid.")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_http_error_without_body() {
        match interpret_response(500, "oops") {
            Err(MileageError::Provider(message)) => assert_eq!(
                message,
                "API returned status 500. Check API Key, enabled APIs, and billing."
            ),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_request_denied_is_provider_error() {
        let body = r#"{"status":"REQUEST_DENIED","error_message":"API not enabled","routes":[]}"#;
        match interpret_response(200, body) {
            Err(MileageError::Provider(message)) => assert_eq!(message, "API not enabled"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_body_is_provider_error() {
        assert!(matches!(
            interpret_response(200, "<html>"),
            Err(MileageError::Provider(_))
        ));
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(
            DistanceEstimator::new(DirectionsConfig::new("  ")),
            Err(MileageError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_location_rejected_without_request() {
        let config = DirectionsConfig::new("key").with_base_url("http://127.0.0.1:1");
        let estimator = DistanceEstimator::new(config).unwrap();
        match estimator.estimate("Springfield", "   ").await {
            Err(MileageError::Validation(message)) => assert_eq!(message, LOCATIONS_REQUIRED),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
