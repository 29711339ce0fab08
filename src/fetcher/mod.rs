use anyhow::Result;
use async_trait::async_trait;

use crate::models::{RawPoint, ResolvedWindow};

pub mod fred;
pub mod mock;

/// Upstream collaborator that supplies raw observations for a series.
///
/// Implementations return whatever the provider sent, malformed points
/// included; validation happens downstream. Errors are absorbed by the
/// orchestrator, so providers should not retry.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_series(&self, series_id: &str, window: &ResolvedWindow) -> Result<Vec<RawPoint>>;
}
