use thiserror::Error;

use crate::access::FeatureKey;

/// Errors surfaced by the dashboard library.
///
/// Data-availability problems are never reported here: an empty upstream or a
/// short series produces a smaller result instead.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The caller's tier may not use the feature.
    #[error("access denied: feature {feature} is not available on this plan")]
    AccessDenied { feature: FeatureKey },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
