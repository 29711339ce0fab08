use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;

use super::SeriesProvider;
use crate::error::DashboardError;
use crate::models::{RawPoint, RawValue, ResolvedWindow};

pub const DEFAULT_FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Series observations from the St. Louis Fed (FRED) API.
pub struct FredProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl FredProvider {
    pub fn new(api_key: String, base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("IndicatorDashboard/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn parse_observations(json: &Value) -> Result<Vec<RawPoint>> {
        let observations = json["observations"]
            .as_array()
            .ok_or_else(|| anyhow!("No observations found in FRED response"))?;

        // "date": "2023-01-01", "value": "123.45" (or "." when not yet published)
        let points = observations
            .iter()
            .map(|obs| RawPoint {
                date: obs["date"].as_str().map(str::to_string),
                value: match &obs["value"] {
                    Value::String(s) => Some(RawValue::Text(s.clone())),
                    Value::Number(n) => n.as_f64().map(RawValue::Number),
                    _ => None,
                },
            })
            .collect();

        Ok(points)
    }
}

#[async_trait]
impl SeriesProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    async fn fetch_series(&self, series_id: &str, window: &ResolvedWindow) -> Result<Vec<RawPoint>> {
        let sanitized_key = self.api_key.trim().to_lowercase();
        if sanitized_key.is_empty() {
            return Err(anyhow!("FRED API key is empty or missing"));
        }
        if sanitized_key.len() != 32 {
            // Never log the key itself
            tracing::warn!(key_len = sanitized_key.len(), "FRED API key is not 32 characters; request will likely fail");
        }

        // The key travels in the query string, so reqwest errors are stripped of
        // their URL before they can reach a log line
        let url = format!("{}/series/observations", self.base_url);
        let start = window.start.format("%Y-%m-%d").to_string();
        let end = window.end.format("%Y-%m-%d").to_string();

        tracing::debug!(series_id, %start, %end, "requesting FRED observations");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", sanitized_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(DashboardError::Upstream(format!("FRED API Error: {} - Body: {}", status, error_text)).into());
        }

        let json: Value = resp.json().await.map_err(|e| e.without_url())?;
        Self::parse_observations(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validator::validate_series;
    use serde_json::json;

    #[test]
    fn test_parse_valid_response() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "123.45" },
                { "date": "2023-01-02", "value": "124.56" }
            ]
        });

        let points = FredProvider::parse_observations(&json_data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], RawPoint::text("2023-01-01", "123.45"));

        let valid = validate_series(&points);
        assert_eq!(valid[0].value, 123.45);
        assert_eq!(valid[1].value, 124.56);
    }

    #[test]
    fn test_parse_missing_value() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "." },
                { "date": "2023-01-02", "value": "100.0" },
                { "date": "2023-01-03" }
            ]
        });

        let points = FredProvider::parse_observations(&json_data).unwrap();
        // Placeholders are passed through; the validator drops them
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].value, None);

        let valid = validate_series(&points);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].value, 100.0);
    }

    #[test]
    fn test_parse_invalid_format() {
        let json_data = json!({ "error": "bad request" });
        let result = FredProvider::parse_observations(&json_data);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_key_is_rejected_before_request() {
        let provider = FredProvider::new("  ".to_string(), "http://127.0.0.1:9", Duration::from_secs(1));
        let window = ResolvedWindow {
            start: chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        };
        let err = provider.fetch_series("UNRATE", &window).await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_key() {
        let key = "abcdef0123456789abcdef0123456789";
        let provider = FredProvider::new(key.to_string(), "http://127.0.0.1:9", Duration::from_secs(2));
        let window = ResolvedWindow {
            start: chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        };

        let err = provider.fetch_series("UNRATE", &window).await.unwrap_err();
        let text = format!("{:#} {:?}", err, err);
        assert!(!text.contains(key), "{}", text);
    }
}
