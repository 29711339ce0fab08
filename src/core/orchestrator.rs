use std::sync::Arc;

use chrono::{Duration, Months, NaiveDate};
use futures::future::join_all;

use crate::analysis::statistics::calculate_statistics;
use crate::analysis::transforms;
use crate::core::validator::validate_series;
use crate::fetcher::mock::MockSeriesGenerator;
use crate::fetcher::SeriesProvider;
use crate::indicators::registry::{Calculation, Catalog, Frequency, IndicatorDescriptor};
use crate::models::{
    DateWindow, IndicatorPayload, RawPoint, ResolvedWindow, SeriesOrigin, TimeSeriesPoint,
};

/// Extra history fetched ahead of a daily YoY window so the calendar lookback
/// can find a base even when the year-ago day was not a trading day.
const DAILY_LOOKBACK_SLACK_DAYS: i64 = 7;

/// Fetches raw series, applies the catalog's calculation and assembles the
/// per-indicator payload.
///
/// Never fails for data reasons: an upstream error or empty answer falls back
/// to deterministic mock data, and a calculation that yields nothing falls
/// back to the validated raw series.
pub struct Orchestrator {
    provider: Arc<dyn SeriesProvider>,
    mock: MockSeriesGenerator,
    today: Option<NaiveDate>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn SeriesProvider>) -> Self {
        Self {
            provider,
            mock: MockSeriesGenerator::new(),
            today: None,
        }
    }

    /// Pins "today" for window defaults instead of reading the clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    pub async fn fetch_indicator(
        &self,
        descriptor: &IndicatorDescriptor,
        window: &DateWindow,
    ) -> IndicatorPayload {
        let requested = window.resolve(self.today());
        let fetch_window = expand_for_calculation(&requested, descriptor);

        tracing::info!(
            indicator = %descriptor.id,
            calculation = %descriptor.calculation,
            start = %fetch_window.start,
            end = %fetch_window.end,
            "Orchestrator: processing indicator"
        );

        let (validated, origin) = self.load_validated(descriptor, &fetch_window).await;
        let (transformed, calculation_applied) = apply_calculation(descriptor, &validated);

        let points: Vec<TimeSeriesPoint> = transformed
            .into_iter()
            .filter(|p| requested.contains(p.date))
            .collect();
        let statistics = calculate_statistics(&points);

        IndicatorPayload {
            indicator_id: descriptor.id.clone(),
            points,
            statistics,
            origin,
            calculation_applied,
        }
    }

    /// Computes payloads for many indicators concurrently. Ids missing from
    /// the catalog are skipped; results keep the order of `ids`.
    pub async fn fetch_many(
        &self,
        catalog: &Catalog,
        ids: &[&str],
        window: &DateWindow,
    ) -> Vec<IndicatorPayload> {
        let descriptors: Vec<&IndicatorDescriptor> = ids
            .iter()
            .filter_map(|id| {
                let found = catalog.get(id);
                if found.is_none() {
                    tracing::warn!(indicator = %id, "unknown indicator id; skipping");
                }
                found
            })
            .collect();

        join_all(descriptors.into_iter().map(|d| self.fetch_indicator(d, window))).await
    }

    /// Upstream first, then mock data. The upstream counts as failed when it
    /// errors or when nothing it sent survives validation.
    async fn load_validated(
        &self,
        descriptor: &IndicatorDescriptor,
        window: &ResolvedWindow,
    ) -> (Vec<TimeSeriesPoint>, SeriesOrigin) {
        let symbol = descriptor.upstream_symbol();

        match self.provider.fetch_series(symbol, window).await {
            Ok(raw) => {
                let validated = validate_series(&raw);
                if !validated.is_empty() {
                    return (validated, SeriesOrigin::Fetched);
                }
                tracing::warn!(
                    indicator = %descriptor.id,
                    provider = self.provider.name(),
                    received = raw.len(),
                    "upstream returned no usable points; falling back to mock data"
                );
            }
            Err(e) => {
                tracing::warn!(
                    indicator = %descriptor.id,
                    provider = self.provider.name(),
                    error = %e,
                    "upstream fetch failed; falling back to mock data"
                );
            }
        }

        let mock: Vec<RawPoint> = self.mock.generate(descriptor, window);
        let validated = validate_series(&mock);
        if validated.is_empty() {
            (validated, SeriesOrigin::Empty)
        } else {
            (validated, SeriesOrigin::FellBackToMock)
        }
    }
}

/// Widens the start of the window by one year of history for YoY
/// calculations so the first requested point has a base to diff against.
pub fn expand_for_calculation(
    requested: &ResolvedWindow,
    descriptor: &IndicatorDescriptor,
) -> ResolvedWindow {
    if descriptor.calculation != Calculation::YoyPercent {
        return *requested;
    }

    let year_back = requested
        .start
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN);
    let start = match descriptor.frequency {
        Frequency::Daily => year_back
            .checked_sub_signed(Duration::days(DAILY_LOOKBACK_SLACK_DAYS + 1))
            .unwrap_or(year_back),
        // 52 weeks is 364 days, so a year back always covers it
        Frequency::Weekly | Frequency::Monthly | Frequency::Quarterly => year_back,
    };

    ResolvedWindow {
        start,
        end: requested.end,
    }
}

/// Runs the descriptor's calculation. Returns the series to display and
/// whether the calculation was honoured.
fn apply_calculation(
    descriptor: &IndicatorDescriptor,
    validated: &[TimeSeriesPoint],
) -> (Vec<TimeSeriesPoint>, bool) {
    let transformed = match &descriptor.calculation {
        Calculation::None => return (validated.to_vec(), true),
        Calculation::YoyPercent => transforms::yoy_for_frequency(validated, descriptor.frequency),
        Calculation::MomPercent => transforms::mom_percent(validated),
        Calculation::QoqPercent => transforms::qoq_percent(validated),
        Calculation::MomChange => transforms::mom_change(validated),
        Calculation::Unrecognized(raw) => {
            tracing::warn!(
                indicator = %descriptor.id,
                calculation = %raw,
                "unrecognized calculation in catalog; returning raw series"
            );
            return (validated.to_vec(), false);
        }
    };

    if transformed.is_empty() && !validated.is_empty() {
        tracing::warn!(
            indicator = %descriptor.id,
            calculation = %descriptor.calculation,
            points = validated.len(),
            "not enough history for calculation; returning raw series"
        );
        return (validated.to_vec(), false);
    }

    (transformed, true)
}
