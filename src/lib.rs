pub mod access;
pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod logging;
pub mod models;

pub use access::{can_access, can_access_str, FeatureKey, SubscriptionTier};
pub use analysis::statistics::calculate_statistics;
pub use crate::core::orchestrator::Orchestrator;
pub use crate::core::validator::validate_series;
pub use error::{DashboardError, DashboardResult};
pub use indicators::registry::{Calculation, Catalog, Frequency, IndicatorDescriptor};
pub use models::{
    DateWindow, IndicatorPayload, RawPoint, RawValue, SeriesOrigin, SeriesStatistics, TimeSeriesPoint,
};
