//! Tier-gated consumers of indicator payloads. Each function consults
//! [`can_access`] before handing anything out.

use serde::Serialize;

use super::{can_access, FeatureKey, SubscriptionTier};
use crate::analysis::statistics::calculate_pearson_correlation;
use crate::analysis::transforms::moving_average;
use crate::core::alerts::{evaluate_alerts, AlertRule, TriggeredAlert};
use crate::core::timeseries::{align_series, AlignedPoint};
use crate::error::{DashboardError, DashboardResult};
use crate::indicators::registry::{Catalog, IndicatorDescriptor};
use crate::models::{IndicatorPayload, TimeSeriesPoint};

/// What a tier gets to see for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorView {
    pub payload: IndicatorPayload,
    /// Present only for tiers with `MOVING_AVERAGES`.
    pub moving_average: Option<Vec<TimeSeriesPoint>>,
    pub export_allowed: bool,
    pub comparison_allowed: bool,
}

pub fn build_indicator_view(
    tier: Option<&SubscriptionTier>,
    payload: IndicatorPayload,
    ma_window: usize,
) -> IndicatorView {
    let moving_average = can_access(tier, &FeatureKey::MovingAverages)
        .then(|| moving_average(&payload.points, ma_window));

    IndicatorView {
        moving_average,
        export_allowed: can_access(tier, &FeatureKey::DataExport),
        comparison_allowed: can_access(tier, &FeatureKey::IndicatorComparison),
        payload,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
    pub left_id: String,
    pub right_id: String,
    pub points: Vec<AlignedPoint>,
    /// Absent when fewer than two dates line up.
    pub correlation: Option<f64>,
}

/// Aligns two payloads for the comparison tool. The left side sets the dates
/// and the right side is forward-filled onto them.
pub fn compare_indicators(
    tier: Option<&SubscriptionTier>,
    left: &IndicatorPayload,
    right: &IndicatorPayload,
) -> DashboardResult<ComparisonView> {
    require(tier, FeatureKey::IndicatorComparison)?;

    let points = align_series(&left.points, &right.points);
    let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p.left, p.right)).collect();

    Ok(ComparisonView {
        left_id: left.indicator_id.clone(),
        right_id: right.indicator_id.clone(),
        correlation: calculate_pearson_correlation(&pairs),
        points,
    })
}

/// `date,value` CSV of the payload's points.
pub fn export_csv(tier: Option<&SubscriptionTier>, payload: &IndicatorPayload) -> DashboardResult<String> {
    require(tier, FeatureKey::DataExport)?;

    let mut csv = String::from("date,value\n");
    for point in &payload.points {
        csv.push_str(&format!("{},{}\n", point.date.format("%Y-%m-%d"), point.value));
    }
    Ok(csv)
}

/// Resolves favorite ids against the catalog, dropping ids it does not know.
pub fn favorites_view<'a>(
    tier: Option<&SubscriptionTier>,
    favorite_ids: &[&str],
    catalog: &'a Catalog,
) -> DashboardResult<Vec<&'a IndicatorDescriptor>> {
    require(tier, FeatureKey::Favorites)?;
    Ok(favorite_ids.iter().filter_map(|id| catalog.get(id)).collect())
}

/// Evaluates alert rules. Crossing rules additionally need `ALERTS_ADVANCED`.
pub fn evaluate_alerts_for(
    tier: Option<&SubscriptionTier>,
    rules: &[AlertRule],
    payload: &IndicatorPayload,
) -> DashboardResult<Vec<TriggeredAlert>> {
    require(tier, FeatureKey::AlertsBasicSetup)?;
    if rules.iter().any(|r| r.condition.is_advanced()) {
        require(tier, FeatureKey::AlertsAdvanced)?;
    }
    Ok(evaluate_alerts(rules, payload))
}

fn require(tier: Option<&SubscriptionTier>, feature: FeatureKey) -> DashboardResult<()> {
    if can_access(tier, &feature) {
        Ok(())
    } else {
        Err(DashboardError::AccessDenied { feature })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::AlertCondition;
    use crate::models::{SeriesOrigin, SeriesStatistics};
    use chrono::NaiveDate;

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

    fn is_denied(err: DashboardError, expected: FeatureKey) -> bool {
        matches!(err, DashboardError::AccessDenied { feature } if feature == expected)
    }

    #[test]
    fn test_view_moving_average_gated() {
        let p = payload("SP500", &[1.0, 2.0, 3.0, 4.0, 5.0]);

        let free = build_indicator_view(None, p.clone(), 3);
        assert!(free.moving_average.is_none());
        assert!(!free.export_allowed);

        let basic = build_indicator_view(Some(&SubscriptionTier::Basic), p.clone(), 3);
        let ma: Vec<f64> = basic.moving_average.unwrap().iter().map(|p| p.value).collect();
        assert_eq!(ma, vec![2.0, 3.0, 4.0]);
        assert!(!basic.comparison_allowed);

        let pro = build_indicator_view(Some(&SubscriptionTier::Pro), p, 3);
        assert!(pro.export_allowed);
        assert!(pro.comparison_allowed);
    }

    #[test]
    fn test_export_csv() {
        let p = payload("UNRATE", &[3.7, 3.85]);
        let err = export_csv(Some(&SubscriptionTier::Basic), &p).unwrap_err();
        assert!(is_denied(err, FeatureKey::DataExport));

        let csv = export_csv(Some(&SubscriptionTier::Pro), &p).unwrap();
        assert_eq!(csv, "date,value\n2024-01-01,3.7\n2024-01-02,3.85\n");
    }

    #[test]
    fn test_compare_indicators() {
        let a = payload("A", &[1.0, 2.0, 3.0]);
        let b = payload("B", &[10.0, 20.0, 30.0]);

        assert!(compare_indicators(Some(&SubscriptionTier::Basic), &a, &b).is_err());

        let view = compare_indicators(Some(&SubscriptionTier::Pro), &a, &b).unwrap();
        assert_eq!(view.points.len(), 3);
        assert_eq!(view.correlation, Some(1.0));
        assert_eq!(view.left_id, "A");
    }

    #[test]
    fn test_favorites_view() {
        let catalog = Catalog::builtin();
        let ids = ["UNRATE", "NOT_A_SERIES", "GDP"];

        let err = favorites_view(None, &ids, &catalog).unwrap_err();
        assert!(is_denied(err, FeatureKey::Favorites));

        let favorites = favorites_view(Some(&SubscriptionTier::Basic), &ids, &catalog).unwrap();
        let found: Vec<&str> = favorites.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(found, vec!["UNRATE", "GDP"]);
    }

    #[test]
    fn test_alerts_gating() {
        let p = payload("VIXCLS", &[25.0, 31.0]);
        let level = vec![AlertRule {
            indicator_id: "VIXCLS".to_string(),
            condition: AlertCondition::Above,
            threshold: 30.0,
        }];
        let crossing = vec![AlertRule {
            indicator_id: "VIXCLS".to_string(),
            condition: AlertCondition::CrossesAbove,
            threshold: 30.0,
        }];

        assert!(evaluate_alerts_for(Some(&SubscriptionTier::Free), &level, &p).is_err());
        assert_eq!(evaluate_alerts_for(Some(&SubscriptionTier::Basic), &level, &p).unwrap().len(), 1);

        let err = evaluate_alerts_for(Some(&SubscriptionTier::Basic), &crossing, &p).unwrap_err();
        assert!(is_denied(err, FeatureKey::AlertsAdvanced));
        assert_eq!(evaluate_alerts_for(Some(&SubscriptionTier::Pro), &crossing, &p).unwrap().len(), 1);
    }
}
