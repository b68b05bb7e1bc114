use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::CrimeStats;

/// Source of regional crime statistics.
///
/// `Ok(None)` means the provider answered but had no data; `Err` is a provider failure.
/// Callers decide how failures are handled (see `pipeline::Stage::Lookup`).
#[async_trait]
pub trait CrimeDataProvider: Send + Sync {
    async fn lookup(&self, city: &str, state: &str) -> Result<Option<CrimeStats>, AppError>;
}

/// Summarized state crime response from the FBI Crime Data Explorer.
#[derive(Debug, Deserialize)]
struct SummarizedCrimeResponse {
    #[serde(default)]
    results: Vec<YearlyCrimeRecord>,
}

#[derive(Debug, Deserialize)]
struct YearlyCrimeRecord {
    data_year: Option<i64>,
    property_crime_rate: Option<f64>,
    violent_crime_rate: Option<f64>,
    burglary: Option<f64>,
    larceny: Option<f64>,
    motor_vehicle_theft: Option<f64>,
    aggravated_assault: Option<f64>,
    robbery: Option<f64>,
}

impl From<YearlyCrimeRecord> for CrimeStats {
    fn from(record: YearlyCrimeRecord) -> Self {
        Self {
            year: record.data_year,
            property_crime_rate: record.property_crime_rate.unwrap_or(0.0),
            violent_crime_rate: record.violent_crime_rate.unwrap_or(0.0),
            burglary_rate: record.burglary.unwrap_or(0.0),
            larceny_rate: record.larceny.unwrap_or(0.0),
            motor_vehicle_theft_rate: record.motor_vehicle_theft.unwrap_or(0.0),
            aggravated_assault_rate: record.aggravated_assault.unwrap_or(0.0),
            robbery_rate: record.robbery.unwrap_or(0.0),
        }
    }
}

/// Client for the FBI Crime Data Explorer API.
#[derive(Clone)]
pub struct FbiCrimeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FbiCrimeClient {
    /// Creates a new `FbiCrimeClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the crime data API (no trailing slash).
    /// * `api_key` - API key sent as the `API_KEY` query parameter.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::InternalError(format!("Failed to create crime data client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.fbi_api_base.clone(),
            config.fbi_api_key.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }
}

#[async_trait]
impl CrimeDataProvider for FbiCrimeClient {
    /// Fetches summarized state crime data and keeps the last yearly entry.
    ///
    /// The provider lists years in ascending order, so the last element is taken as the
    /// most recent without comparing `data_year`. The lookup is state-level; `city` is
    /// only used for logging.
    async fn lookup(&self, city: &str, state: &str) -> Result<Option<CrimeStats>, AppError> {
        let state_code = state.trim().to_uppercase();
        if state_code.is_empty() {
            return Err(AppError::ProviderUnavailable(
                "No state provided for crime lookup".to_string(),
            ));
        }

        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/summarized/state/{}/crime", self.base_url, state_code),
            &[("API_KEY", self.api_key.as_str())],
        )
        .map_err(|e| AppError::ProviderUnavailable(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Fetching crime data for {}, {}", city, state_code);
        // Redact key from logs
        tracing::debug!(
            "Crime API URL: {}/summarized/state/{}/crime?API_KEY=[REDACTED]",
            self.base_url,
            state_code
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::ProviderUnavailable(format!("Crime API request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ProviderUnavailable(format!(
                "Crime API returned status {}",
                status
            )));
        }

        let body: SummarizedCrimeResponse = response.json().await.map_err(|e| {
            AppError::ProviderUnavailable(format!("Failed to parse crime API response: {}", e))
        })?;

        let Some(latest) = body.results.into_iter().last() else {
            tracing::info!("Crime API returned no results for {}", state_code);
            return Ok(None);
        };

        let stats = CrimeStats::from(latest);
        tracing::info!(
            "✓ Crime data for {} (year {:?}) retrieved",
            state_code,
            stats.year
        );
        Ok(Some(stats))
    }
}
