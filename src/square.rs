//! Square Locations API client.
//!
//! Only `GET /v2/locations` is used: the store page lets an admin pick which
//! Square location a store sells from. The access token belongs to the store,
//! so it is passed per call rather than held by the client.

use crate::config::settings::{SquareConfig, SquareEnvironment};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const PRODUCTION_URL: &str = "https://connect.squareup.com";
const SANDBOX_URL: &str = "https://connect.squareupsandbox.com";
const SQUARE_VERSION: &str = "2020-11-18";

/// A Square business location. Fields other than `id` and `name` are kept as
/// received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Square location id
    pub id: String,
    /// Location name
    #[serde(default)]
    pub name: Option<String>,
    /// Every other field Square returned
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An error entry from a Square error response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SquareError {
    /// Error category, e.g. `AUTHENTICATION_ERROR`
    #[serde(default)]
    pub category: String,
    /// Error code, e.g. `UNAUTHORIZED`
    #[serde(default)]
    pub code: String,
    /// Human readable detail
    #[serde(default)]
    pub detail: Option<String>,
}

/// Outcome of a call that reached Square
#[derive(Debug, Clone, PartialEq)]
pub enum ListLocations {
    Success(Vec<Location>),
    /// Square answered with a non-success status
    Failure(Vec<SquareError>),
}

#[derive(Debug, Deserialize)]
struct ListLocationsResponse {
    #[serde(default)]
    locations: Vec<Location>,
    #[serde(default)]
    errors: Vec<SquareError>,
}

/// Access to the Square Locations API
#[async_trait]
pub trait LocationsApi: Send + Sync {
    /// Lists the locations visible to `access_token`.
    ///
    /// # Errors
    /// Returns `Error::Square` when the request cannot be sent or the
    /// response cannot be read.
    async fn list_locations(&self, access_token: &str) -> Result<ListLocations>;
}

/// HTTP client for Square
#[derive(Debug, Clone)]
pub struct SquareClient {
    http: reqwest::Client,
    base_url: String,
}

impl SquareClient {
    /// Default API host for `environment`.
    #[must_use]
    pub const fn base_url_for(environment: SquareEnvironment) -> &'static str {
        match environment {
            SquareEnvironment::Production => PRODUCTION_URL,
            SquareEnvironment::Sandbox => SANDBOX_URL,
        }
    }

    /// Builds a client from `[square]`.
    ///
    /// # Errors
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn new(config: &SquareConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to build Square HTTP client: {e}"),
            })?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| Self::base_url_for(config.environment).to_string());
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Host the client sends requests to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn square_error(e: &reqwest::Error) -> Error {
    Error::Square {
        message: e.to_string(),
    }
}

#[async_trait]
impl LocationsApi for SquareClient {
    async fn list_locations(&self, access_token: &str) -> Result<ListLocations> {
        let url = format!("{}/v2/locations", self.base_url);
        debug!("Calling Square {}", url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header("Square-Version", SQUARE_VERSION)
            .send()
            .await
            .map_err(|e| square_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| square_error(&e))?;

        if status.is_success() {
            let parsed: ListLocationsResponse =
                serde_json::from_str(&body).map_err(|e| Error::Square {
                    message: format!("Unreadable locations response: {e}"),
                })?;
            Ok(ListLocations::Success(parsed.locations))
        } else {
            let errors = serde_json::from_str::<ListLocationsResponse>(&body)
                .map(|r| r.errors)
                .unwrap_or_default();
            warn!("Square returned {} for ListLocations: {:?}", status, errors);
            Ok(ListLocations::Failure(errors))
        }
    }
}
