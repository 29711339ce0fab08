use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DashboardError, DashboardResult};
use crate::fetcher::fred::DEFAULT_FRED_BASE_URL;
use crate::logging::LogFormat;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fred_api_key: Option<String>,
    pub fred_base_url: String,
    pub fetch_timeout: Duration,
    /// Window used for the moving-average view.
    pub ma_window: usize,
    /// JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            fred_base_url: DEFAULT_FRED_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(15),
            ma_window: 3,
            catalog_path: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> DashboardResult<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> DashboardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let ma_window = match get("DASHBOARD_MA_WINDOW") {
            Some(raw) => parse_number::<usize>("DASHBOARD_MA_WINDOW", &raw)?,
            None => defaults.ma_window,
        };
        if ma_window == 0 {
            return Err(DashboardError::Config("DASHBOARD_MA_WINDOW must be at least 1".to_string()));
        }

        let fetch_timeout = match get("DASHBOARD_FETCH_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number::<u64>("DASHBOARD_FETCH_TIMEOUT_SECS", &raw)?),
            None => defaults.fetch_timeout,
        };

        let log_format = match get("DASHBOARD_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(DashboardError::Config)?,
            None => defaults.log_format,
        };

        Ok(Self {
            fred_api_key: get("FRED_API_KEY"),
            fred_base_url: get("FRED_BASE_URL").unwrap_or(defaults.fred_base_url),
            fetch_timeout,
            ma_window,
            catalog_path: get("DASHBOARD_CATALOG_PATH").map(PathBuf::from),
            log_level: get("DASHBOARD_LOG").unwrap_or(defaults.log_level),
            log_format,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> DashboardResult<T> {
    raw.parse::<T>()
        .map_err(|_| DashboardError::Config(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.fred_api_key, None);
        assert_eq!(config.fred_base_url, DEFAULT_FRED_BASE_URL);
        assert_eq!(config.ma_window, 3);
        assert_eq!(config.fetch_timeout, Duration::from_secs(15));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("FRED_API_KEY", " abc "),
            ("DASHBOARD_MA_WINDOW", "12"),
            ("DASHBOARD_FETCH_TIMEOUT_SECS", "5"),
            ("DASHBOARD_LOG_FORMAT", "json"),
            ("DASHBOARD_CATALOG_PATH", "catalog.json"),
            ("DASHBOARD_LOG", "indicator_dashboard_lib=debug"),
        ]))
        .unwrap();

        assert_eq!(config.fred_api_key.as_deref(), Some("abc"));
        assert_eq!(config.ma_window, 12);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.json")));
        assert_eq!(config.log_level, "indicator_dashboard_lib=debug");
    }

    #[test]
    fn test_invalid_values() {
        assert!(AppConfig::from_lookup(lookup(&[("DASHBOARD_MA_WINDOW", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("DASHBOARD_MA_WINDOW", "-3")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("DASHBOARD_FETCH_TIMEOUT_SECS", "soon")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("DASHBOARD_LOG_FORMAT", "xml")])).is_err());
    }
}
