use std::time::Duration;

use anyhow::Result;
use axum::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::GeocoderConfig;

use super::{Coordinates, Geocoder};

const OPENCAGE_API: &str = "https://api.opencagedata.com/geocode/v1/json";

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    total_results: u32,
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

fn best_match(payload: &OpenCageResponse) -> Option<Coordinates> {
    if payload.total_results == 0 {
        return None;
    }
    payload.results.first().map(|r| Coordinates {
        latitude: r.geometry.lat,
        longitude: r.geometry.lng,
    })
}

/// OpenCage forward-geocoding client. One bounded-timeout request per
/// lookup, biased to the deployment's country so ambiguous place names
/// resolve locally. No retries.
pub struct OpenCageClient {
    client: Client,
    api_key: String,
    country_code: String,
}

impl OpenCageClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            country_code: config.country_code.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for OpenCageClient {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(OPENCAGE_API)
            .query(&[
                ("q", address),
                ("key", self.api_key.as_str()),
                ("countrycode", self.country_code.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenCage API error: {status} - {body}");
        }

        let payload: OpenCageResponse = response.json().await?;
        Ok(best_match(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_hit_into_coordinates() {
        let payload: OpenCageResponse = serde_json::from_str(
            r#"{
                "total_results": 1,
                "results": [
                    {"geometry": {"lat": 28.6315, "lng": 77.2167}}
                ]
            }"#,
        )
        .unwrap();
        let coords = best_match(&payload).unwrap();
        assert_eq!(coords.latitude, 28.6315);
        assert_eq!(coords.longitude, 77.2167);
    }

    #[test]
    fn no_results_is_a_miss_not_an_error() {
        let payload: OpenCageResponse =
            serde_json::from_str(r#"{"total_results": 0, "results": []}"#).unwrap();
        assert!(best_match(&payload).is_none());
    }

    #[test]
    fn first_result_wins_when_several_come_back() {
        let payload: OpenCageResponse = serde_json::from_str(
            r#"{
                "total_results": 2,
                "results": [
                    {"geometry": {"lat": 12.97, "lng": 77.59}},
                    {"geometry": {"lat": 13.08, "lng": 80.27}}
                ]
            }"#,
        )
        .unwrap();
        let coords = best_match(&payload).unwrap();
        assert_eq!(coords.latitude, 12.97);
    }
}
