use chrono::{Datelike, Duration, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::indicators::registry::{Frequency, IndicatorDescriptor};
use crate::models::{RawPoint, ResolvedWindow};

/// Synthetic series used when the upstream is unavailable.
///
/// Output is a pure function of the indicator id and each observation date,
/// so the same indicator has the same shape on every request and overlapping
/// windows agree point for point.
#[derive(Debug, Clone, Default)]
pub struct MockSeriesGenerator;

impl MockSeriesGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, descriptor: &IndicatorDescriptor, window: &ResolvedWindow) -> Vec<RawPoint> {
        if window.is_inverted() {
            return Vec::new();
        }

        let seed = stable_seed(&descriptor.id);
        let mut rng = StdRng::seed_from_u64(seed);
        let base = rng.gen_range(20.0..200.0);
        let amplitude = base * rng.gen_range(0.02..0.15);
        let cycle_days = rng.gen_range(180.0..1460.0);
        let phase = rng.gen_range(0.0..std::f64::consts::TAU);
        let trend_per_year = base * rng.gen_range(-0.03..0.05);

        observation_dates(descriptor.frequency, window)
            .into_iter()
            .map(|date| {
                let day = date.num_days_from_ce() as f64;
                let cycle = (day / cycle_days * std::f64::consts::TAU + phase).sin();
                let trend = trend_per_year * (day - EPOCH_DAY) / 365.0;

                // Per-date noise keeps values independent of the window bounds
                let mut noise_rng = StdRng::seed_from_u64(seed ^ (date.num_days_from_ce() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
                let noise = noise_rng.gen_range(-0.5..0.5) * amplitude * 0.2;

                let value = (base + amplitude * cycle + trend + noise).max(0.01);
                RawPoint::number(&date.format("%Y-%m-%d").to_string(), (value * 100.0).round() / 100.0)
            })
            .collect()
    }
}

/// 2000-01-01 as days from CE; trend is measured from here.
const EPOCH_DAY: f64 = 730_120.0;

/// FNV-1a over the id. `DefaultHasher` is not stable across releases.
fn stable_seed(id: &str) -> u64 {
    id.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

fn observation_dates(frequency: Frequency, window: &ResolvedWindow) -> Vec<NaiveDate> {
    let mut dates = Vec::new();

    match frequency {
        Frequency::Daily => {
            let mut date = window.start;
            while date <= window.end {
                dates.push(date);
                match date.succ_opt() {
                    Some(next) => date = next,
                    None => break,
                }
            }
        }
        Frequency::Weekly => {
            // Anchor on Saturdays like most weekly releases
            let offset = (6 - window.start.weekday().num_days_from_sunday() as i64).rem_euclid(7);
            let mut date = window.start + Duration::days(offset);
            while date <= window.end {
                dates.push(date);
                match date.checked_add_signed(Duration::weeks(1)) {
                    Some(next) => date = next,
                    None => break,
                }
            }
        }
        Frequency::Monthly | Frequency::Quarterly => {
            let step = if frequency == Frequency::Monthly { 1 } else { 3 };
            let mut date = first_period_start(window.start, step);
            while date <= window.end {
                dates.push(date);
                match date.checked_add_months(Months::new(step)) {
                    Some(next) => date = next,
                    None => break,
                }
            }
        }
    }

    dates
}

/// First month (or quarter) start on or after `from`.
fn first_period_start(from: NaiveDate, step_months: u32) -> NaiveDate {
    let month0 = from.month0();
    let aligned_month0 = month0 - month0 % step_months;
    let mut date = NaiveDate::from_ymd_opt(from.year(), aligned_month0 + 1, 1).unwrap_or(from);
    while date < from {
        match date.checked_add_months(Months::new(step_months)) {
            Some(next) => date = next,
            None => break,
        }
    }
    date
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validator::validate_series;
    use crate::indicators::registry::Catalog;

    fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> ResolvedWindow {
        ResolvedWindow {
            start: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    #[test]
    fn test_deterministic_per_indicator() {
        let catalog = Catalog::builtin();
        let unrate = catalog.get("UNRATE").unwrap();
        let cpi = catalog.get("CPIAUCSL").unwrap();
        let w = window((2022, 1, 1), (2023, 12, 31));

        let generator = MockSeriesGenerator::new();
        let first = generator.generate(unrate, &w);
        let second = generator.generate(unrate, &w);
        assert_eq!(first, second);
        assert_eq!(first.len(), 24);
        assert_ne!(first, generator.generate(cpi, &w));

        // Every generated point survives validation
        assert_eq!(validate_series(&first).len(), 24);
    }

    #[test]
    fn test_overlapping_windows_agree() {
        let catalog = Catalog::builtin();
        let unrate = catalog.get("UNRATE").unwrap();
        let generator = MockSeriesGenerator::new();

        let long = generator.generate(unrate, &window((2020, 1, 1), (2023, 12, 31)));
        let short = generator.generate(unrate, &window((2023, 1, 1), (2023, 12, 31)));
        assert_eq!(&long[long.len() - 12..], &short[..]);
    }

    #[test]
    fn test_frequency_spacing() {
        let catalog = Catalog::builtin();
        let generator = MockSeriesGenerator::new();
        let w = window((2023, 2, 15), (2023, 12, 31));

        let quarterly = validate_series(&generator.generate(catalog.get("GDP").unwrap(), &w));
        let dates: Vec<String> = quarterly.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2023-04-01", "2023-07-01", "2023-10-01"]);

        let weekly = validate_series(&generator.generate(catalog.get("ICSA").unwrap(), &w));
        assert!(weekly.windows(2).all(|p| (p[1].date - p[0].date).num_days() == 7));
        assert_eq!(weekly[0].date.weekday(), chrono::Weekday::Sat);

        let daily = generator.generate(catalog.get("DGS10").unwrap(), &window((2023, 1, 1), (2023, 1, 10)));
        assert_eq!(daily.len(), 10);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let catalog = Catalog::builtin();
        let generator = MockSeriesGenerator::new();
        let w = window((2023, 12, 31), (2023, 1, 1));
        assert!(generator.generate(catalog.get("UNRATE").unwrap(), &w).is_empty());
    }
}
