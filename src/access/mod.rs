//! Subscription tiers and the feature-access gate.
//!
//! [`can_access`] is the only place tier rules live. Anything that hands out
//! a gated view (favorites, alerts, moving averages, comparison, export) asks
//! it first; see [`views`].

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod views;

/// Resolved subscription plan of the current user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionTier {
    Free,
    Basic,
    Pro,
    /// A paid plan this build does not know about. Matches no gate.
    Custom(String),
}

impl SubscriptionTier {
    /// Parses a tier name; a missing or blank tier is `Free`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => SubscriptionTier::Free,
            Some(name) => SubscriptionTier::from(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Basic => "basic",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Custom(name) => name,
        }
    }
}

impl Default for SubscriptionTier {
    fn default() -> Self {
        SubscriptionTier::Free
    }
}

impl From<String> for SubscriptionTier {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "free" => SubscriptionTier::Free,
            "basic" => SubscriptionTier::Basic,
            "pro" => SubscriptionTier::Pro,
            _ => SubscriptionTier::Custom(raw),
        }
    }
}

impl From<SubscriptionTier> for String {
    fn from(tier: SubscriptionTier) -> Self {
        tier.as_str().to_string()
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gated capabilities. Keys are the upper snake case names used by the route
/// layer, e.g. `MOVING_AVERAGES`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeatureKey {
    BasicCharts,
    Favorites,
    AlertsBasicSetup,
    AlertsAdvanced,
    MovingAverages,
    IndicatorComparison,
    DataExport,
    /// A key missing from the access table. Always denied.
    Unknown(String),
}

impl FeatureKey {
    pub fn parse(raw: &str) -> Self {
        FeatureKey::from(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            FeatureKey::BasicCharts => "BASIC_CHARTS",
            FeatureKey::Favorites => "FAVORITES",
            FeatureKey::AlertsBasicSetup => "ALERTS_BASIC_SETUP",
            FeatureKey::AlertsAdvanced => "ALERTS_ADVANCED",
            FeatureKey::MovingAverages => "MOVING_AVERAGES",
            FeatureKey::IndicatorComparison => "INDICATOR_COMPARISON",
            FeatureKey::DataExport => "DATA_EXPORT",
            FeatureKey::Unknown(raw) => raw,
        }
    }
}

impl From<String> for FeatureKey {
    fn from(raw: String) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "BASIC_CHARTS" => FeatureKey::BasicCharts,
            "FAVORITES" => FeatureKey::Favorites,
            "ALERTS_BASIC_SETUP" => FeatureKey::AlertsBasicSetup,
            "ALERTS_ADVANCED" => FeatureKey::AlertsAdvanced,
            "MOVING_AVERAGES" => FeatureKey::MovingAverages,
            "INDICATOR_COMPARISON" => FeatureKey::IndicatorComparison,
            "DATA_EXPORT" => FeatureKey::DataExport,
            _ => FeatureKey::Unknown(raw),
        }
    }
}

impl From<FeatureKey> for String {
    fn from(key: FeatureKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanLevel {
    Free,
    Basic,
    Pro,
}

const ALL_PLANS: &[PlanLevel] = &[PlanLevel::Free, PlanLevel::Basic, PlanLevel::Pro];
const PAID_PLANS: &[PlanLevel] = &[PlanLevel::Basic, PlanLevel::Pro];
const PRO_ONLY: &[PlanLevel] = &[PlanLevel::Pro];

/// Access table. Adding a feature without a row here is a compile error.
fn permitted_plans(feature: &FeatureKey) -> Option<&'static [PlanLevel]> {
    let plans = match feature {
        FeatureKey::BasicCharts => ALL_PLANS,
        FeatureKey::Favorites => PAID_PLANS,
        FeatureKey::AlertsBasicSetup => PAID_PLANS,
        FeatureKey::MovingAverages => PAID_PLANS,
        FeatureKey::IndicatorComparison => PRO_ONLY,
        FeatureKey::DataExport => PRO_ONLY,
        FeatureKey::AlertsAdvanced => PRO_ONLY,
        FeatureKey::Unknown(_) => return None,
    };
    Some(plans)
}

/// Decides whether `tier` may use `feature`. A missing tier counts as free.
/// Fails closed: unknown features and unknown custom tiers are denied.
pub fn can_access(tier: Option<&SubscriptionTier>, feature: &FeatureKey) -> bool {
    let Some(plans) = permitted_plans(feature) else {
        tracing::warn!(feature = %feature, "feature key missing from access table; denying");
        return false;
    };

    let level = match tier.unwrap_or(&SubscriptionTier::Free) {
        SubscriptionTier::Free => PlanLevel::Free,
        SubscriptionTier::Basic => PlanLevel::Basic,
        SubscriptionTier::Pro => PlanLevel::Pro,
        SubscriptionTier::Custom(name) => {
            tracing::warn!(tier = %name, feature = %feature, "unrecognized subscription tier; denying");
            return false;
        }
    };

    plans.contains(&level)
}

/// String form for callers that hold raw session values.
pub fn can_access_str(tier: Option<&str>, feature: &str) -> bool {
    let tier = SubscriptionTier::parse(tier);
    can_access(Some(&tier), &FeatureKey::parse(feature))
}

/// Features available to a tier, in table order.
pub fn features_for(tier: Option<&SubscriptionTier>) -> Vec<FeatureKey> {
    [
        FeatureKey::BasicCharts,
        FeatureKey::Favorites,
        FeatureKey::AlertsBasicSetup,
        FeatureKey::AlertsAdvanced,
        FeatureKey::MovingAverages,
        FeatureKey::IndicatorComparison,
        FeatureKey::DataExport,
    ]
    .into_iter()
    .filter(|f| can_access(tier, f))
    .collect()
}
