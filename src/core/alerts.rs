use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::IndicatorPayload;

// Alert Types
// 1. Level: latest value above / below a threshold
// 2. Crossing: latest value crossed the threshold since the previous point

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertCondition {
    Above,
    Below,
    CrossesAbove,
    CrossesBelow,
}

impl AlertCondition {
    /// Crossing alerts need the advanced alert feature.
    pub fn is_advanced(&self) -> bool {
        matches!(self, AlertCondition::CrossesAbove | AlertCondition::CrossesBelow)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    pub indicator_id: String,
    pub condition: AlertCondition,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredAlert {
    pub rule: AlertRule,
    pub date: NaiveDate,
    pub value: f64,
    pub message: String,
}

/// Checks the rules that target `payload`'s indicator against its most recent
/// point. Rules for other indicators are ignored; an empty series triggers
/// nothing.
pub fn evaluate_alerts(rules: &[AlertRule], payload: &IndicatorPayload) -> Vec<TriggeredAlert> {
    let Some(latest) = payload.points.last() else {
        return Vec::new();
    };
    let previous = payload
        .points
        .len()
        .checked_sub(2)
        .map(|i| payload.points[i].value);

    rules
        .iter()
        .filter(|rule| rule.indicator_id == payload.indicator_id)
        .filter(|rule| is_triggered(rule, latest.value, previous))
        .map(|rule| TriggeredAlert {
            rule: rule.clone(),
            date: latest.date,
            value: latest.value,
            message: describe(rule, latest.value),
        })
        .collect()
}

fn is_triggered(rule: &AlertRule, latest: f64, previous: Option<f64>) -> bool {
    let t = rule.threshold;
    match rule.condition {
        AlertCondition::Above => latest > t,
        AlertCondition::Below => latest < t,
        AlertCondition::CrossesAbove => previous.is_some_and(|p| p <= t) && latest > t,
        AlertCondition::CrossesBelow => previous.is_some_and(|p| p >= t) && latest < t,
    }
}

fn describe(rule: &AlertRule, value: f64) -> String {
    let verb = match rule.condition {
        AlertCondition::Above => "is above",
        AlertCondition::Below => "is below",
        AlertCondition::CrossesAbove => "crossed above",
        AlertCondition::CrossesBelow => "crossed below",
    };
    format!("{} {} {} (latest: {})", rule.indicator_id, verb, rule.threshold, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SeriesOrigin, SeriesStatistics, TimeSeriesPoint};

    fn payload(id: &str, values: &[f64]) -> IndicatorPayload {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        IndicatorPayload {
            indicator_id: id.to_string(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| TimeSeriesPoint::new(start + chrono::Duration::days(i as i64), *v))
                .collect(),
            statistics: SeriesStatistics::default(),
            origin: SeriesOrigin::Fetched,
            calculation_applied: true,
        }
    }

    fn rule(id: &str, condition: AlertCondition, threshold: f64) -> AlertRule {
        AlertRule {
            indicator_id: id.to_string(),
            condition,
            threshold,
        }
    }

    #[test]
    fn test_level_alerts() {
        let p = payload("UNRATE", &[3.9, 4.2]);
        let rules = vec![
            rule("UNRATE", AlertCondition::Above, 4.0),
            rule("UNRATE", AlertCondition::Below, 4.0),
            rule("CPIAUCSL", AlertCondition::Above, 0.0),
        ];

        let triggered = evaluate_alerts(&rules, &p);
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].rule.condition, AlertCondition::Above);
        assert_eq!(triggered[0].value, 4.2);
        assert_eq!(triggered[0].message, "UNRATE is above 4 (latest: 4.2)");
    }

    #[test]
    fn test_crossing_alerts() {
        let rules = vec![
            rule("VIXCLS", AlertCondition::CrossesAbove, 30.0),
            rule("VIXCLS", AlertCondition::CrossesBelow, 30.0),
        ];

        let crossed = evaluate_alerts(&rules, &payload("VIXCLS", &[25.0, 31.0]));
        assert_eq!(crossed.len(), 1);
        assert_eq!(crossed[0].rule.condition, AlertCondition::CrossesAbove);

        // Already above: no crossing
        assert!(evaluate_alerts(&rules, &payload("VIXCLS", &[32.0, 35.0])).is_empty());
        // A single point cannot cross
        assert!(evaluate_alerts(&rules, &payload("VIXCLS", &[35.0])).is_empty());
    }

    #[test]
    fn test_empty_series() {
        let rules = vec![rule("UNRATE", AlertCondition::Above, 0.0)];
        assert!(evaluate_alerts(&rules, &payload("UNRATE", &[])).is_empty());
    }
}
