use super::round2;
use crate::models::{SeriesStatistics, TimeSeriesPoint};

/// Descriptive statistics over a validated series.
///
/// Statistics are computed at full precision and rounded only at the end.
/// `std_dev` (sample) needs at least two points; everything is absent for an
/// empty series. A statistic whose arithmetic overflows is absent as well.
pub fn calculate_statistics(series: &[TimeSeriesPoint]) -> SeriesStatistics {
    let values: Vec<f64> = series
        .iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite())
        .collect();

    let count = values.len();
    if count == 0 {
        return SeriesStatistics::default();
    }

    let mean = finite(values.iter().sum::<f64>() / count as f64);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let median = finite(calculate_median(&values));
    let std_dev = mean.and_then(|m| sample_std_dev(&values, m)).and_then(finite);

    // `values` keeps series order, so the last entry is the latest observation
    let latest = values[count - 1];
    let latest_z_score = mean.zip(std_dev).and_then(|(m, sd)| {
        if sd == 0.0 {
            Some(0.0)
        } else {
            finite((latest - m) / sd)
        }
    });
    let latest_percentile = (count >= 2).then(|| {
        let below = values.iter().filter(|&&v| v < latest).count();
        below as f64 / count as f64 * 100.0
    });

    SeriesStatistics {
        mean: mean.map(round2),
        median: median.map(round2),
        std_dev: std_dev.map(round2),
        min: Some(round2(min)),
        max: Some(round2(max)),
        count,
        latest_z_score: latest_z_score.map(round2),
        latest_percentile: latest_percentile.map(round2),
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn calculate_median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn sample_std_dev(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let variance: f64 = values
        .iter()
        .map(|value| {
            let diff = mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

/// Pearson correlation over already aligned `(x, y)` pairs.
/// Returns `None` below two pairs or on overflow, and `0.0` when either side
/// is flat.
pub fn calculate_pearson_correlation(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let mut numer = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;

    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numer += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    if denom_x == 0.0 || denom_y == 0.0 {
        return Some(0.0);
    }

    let correlation = finite(numer / (denom_x.sqrt() * denom_y.sqrt()))?;
    // Clamp to [-1, 1] to absorb floating point error
    Some(round2(correlation.clamp(-1.0, 1.0)))
}
