use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Value as delivered by an upstream feed: a number, a numeric string
/// ("123.45"), or a placeholder string such as FRED's "." for "no data yet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

/// Candidate point straight from an upstream provider. Either field may be
/// missing or malformed; the validator decides what survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub date: Option<String>,
    pub value: Option<RawValue>,
}

impl RawPoint {
    pub fn number(date: &str, value: f64) -> Self {
        Self {
            date: Some(date.to_string()),
            value: Some(RawValue::Number(value)),
        }
    }

    pub fn text(date: &str, value: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            value: Some(RawValue::Text(value.to_string())),
        }
    }

    pub fn missing(date: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            value: None,
        }
    }
}

/// A validated observation: calendar date plus a finite value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Descriptive statistics over the series handed to the presentation layer.
/// Every numeric field is rounded to 2 decimals and absent when the series is
/// too short to define it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStatistics {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: usize,
    /// Z-score of the most recent value against the whole series.
    pub latest_z_score: Option<f64>,
    /// Share of values strictly below the most recent value (0-100).
    pub latest_percentile: Option<f64>,
}

/// Requested date range. Missing bounds are filled in by [`DateWindow::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Absent end defaults to `today`, absent start to one year before the end.
    pub fn resolve(&self, today: NaiveDate) -> ResolvedWindow {
        let end = self.end.unwrap_or(today);
        let start = self
            .start
            .unwrap_or_else(|| end.checked_sub_months(Months::new(12)).unwrap_or(NaiveDate::MIN));
        ResolvedWindow { start, end }
    }
}

/// A date range with both bounds known. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ResolvedWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// Where the points of a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrigin {
    /// The upstream provider answered with usable data.
    Fetched,
    /// The upstream failed or was empty; points are synthetic demo data.
    FellBackToMock,
    /// Neither the upstream nor the mock generator produced anything.
    Empty,
}

/// Final per-indicator result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorPayload {
    pub indicator_id: String,
    pub points: Vec<TimeSeriesPoint>,
    pub statistics: SeriesStatistics,
    pub origin: SeriesOrigin,
    /// False when the catalog asked for a calculation that could not be
    /// produced and the validated raw series was returned instead.
    pub calculation_applied: bool,
}

impl IndicatorPayload {
    pub fn latest(&self) -> Option<&TimeSeriesPoint> {
        self.points.last()
    }

    pub fn is_mock(&self) -> bool {
        self.origin == SeriesOrigin::FellBackToMock
    }
}
