//! Derived series: period-over-period changes and moving averages.
//!
//! Every operation takes a validated series sorted ascending by date and
//! returns a new series dated at the later point of each pair (or the last
//! point of each window). Short input never fails, it yields an empty series.
//! Values are re-checked for finiteness at every pairing, and results that
//! overflow are dropped, so no `NaN` or infinity reaches the output.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::round2;
use crate::indicators::registry::Frequency;
use crate::models::TimeSeriesPoint;

/// Days between a daily observation and its year-ago base.
const CALENDAR_YEAR_DAYS: i64 = 365;
/// How far before the year-ago target a daily base may sit (weekends, holidays).
const CALENDAR_TOLERANCE_DAYS: i64 = 7;

/// A percent-change series together with the dates that were skipped because
/// the base value was exactly zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSeries {
    pub points: Vec<TimeSeriesPoint>,
    pub zero_base_gaps: Vec<NaiveDate>,
}

/// Year-over-year percent change using a fixed period count
/// (12 for monthly, 4 for quarterly, 52 for weekly data).
pub fn yoy_percent(series: &[TimeSeriesPoint], lookback_periods: usize) -> Vec<TimeSeriesPoint> {
    yoy_percent_with_gaps(series, lookback_periods).points
}

pub fn yoy_percent_with_gaps(series: &[TimeSeriesPoint], lookback_periods: usize) -> ChangeSeries {
    percent_change_by_periods(series, lookback_periods)
}

/// Year-over-year percent change against the latest observation dated at
/// least 365 days earlier (and no more than a week before that). Used for
/// daily series where a period count does not map to a calendar year.
pub fn yoy_percent_calendar(series: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    yoy_percent_calendar_with_gaps(series).points
}

pub fn yoy_percent_calendar_with_gaps(series: &[TimeSeriesPoint]) -> ChangeSeries {
    let mut result = ChangeSeries::default();

    for current in series {
        let target = current.date - Duration::days(CALENDAR_YEAR_DAYS);
        let earliest = target - Duration::days(CALENDAR_TOLERANCE_DAYS);

        // Last index dated on or before the target
        let idx = series.partition_point(|p| p.date <= target);
        if idx == 0 {
            continue;
        }
        let base = &series[idx - 1];
        if base.date < earliest {
            continue;
        }

        push_percent_change(&mut result, base, current);
    }

    result
}

/// Year-over-year change picking the lookback rule from the series frequency.
pub fn yoy_for_frequency(series: &[TimeSeriesPoint], frequency: Frequency) -> Vec<TimeSeriesPoint> {
    match frequency.periods_per_year() {
        Some(periods) => yoy_percent(series, periods),
        None => yoy_percent_calendar(series),
    }
}

/// Month-over-month percent change.
pub fn mom_percent(series: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    percent_change_by_periods(series, 1).points
}

/// Quarter-over-quarter percent change. The caller supplies quarterly data;
/// no quarter boundaries are detected here.
pub fn qoq_percent(series: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    percent_change_by_periods(series, 1).points
}

/// Absolute change from the previous observation. No zero guard, no rounding
/// beyond what the inputs carry.
pub fn mom_change(series: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    if series.len() < 2 {
        return Vec::new();
    }

    series
        .windows(2)
        .filter(|pair| pair[0].value.is_finite() && pair[1].value.is_finite())
        .map(|pair| TimeSeriesPoint {
            date: pair[1].date,
            value: pair[1].value - pair[0].value,
        })
        .filter(|p| p.value.is_finite())
        .collect()
}

/// Trailing simple moving average over `window_size` consecutive points,
/// dated at the last point of each window.
pub fn moving_average(series: &[TimeSeriesPoint], window_size: usize) -> Vec<TimeSeriesPoint> {
    if window_size == 0 || series.len() < window_size {
        return Vec::new();
    }

    series
        .windows(window_size)
        .filter(|window| window.iter().all(|p| p.value.is_finite()))
        .map(|window| {
            let sum: f64 = window.iter().map(|p| p.value).sum();
            TimeSeriesPoint {
                date: window[window_size - 1].date,
                value: round2(sum / window_size as f64),
            }
        })
        .filter(|p| p.value.is_finite())
        .collect()
}

fn percent_change_by_periods(series: &[TimeSeriesPoint], lookback: usize) -> ChangeSeries {
    let mut result = ChangeSeries::default();
    if lookback == 0 || series.len() < lookback + 1 {
        return result;
    }

    for i in lookback..series.len() {
        push_percent_change(&mut result, &series[i - lookback], &series[i]);
    }

    result
}

fn push_percent_change(result: &mut ChangeSeries, base: &TimeSeriesPoint, current: &TimeSeriesPoint) {
    if !base.value.is_finite() || !current.value.is_finite() {
        return;
    }
    if base.value == 0.0 {
        result.zero_base_gaps.push(current.date);
        return;
    }

    let change = (current.value - base.value) / base.value.abs() * 100.0;
    if !change.is_finite() {
        return;
    }
    result.points.push(TimeSeriesPoint {
        date: current.date,
        value: round2(change),
    });
}
