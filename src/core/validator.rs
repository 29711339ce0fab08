use crate::models::{RawPoint, RawValue, TimeSeriesPoint};
use chrono::NaiveDate;

/// Keeps only points with a parseable `YYYY-MM-DD` date and a finite value.
///
/// Malformed points are dropped silently: upstream feeds routinely carry
/// placeholders for the latest period. Order and duplicates are preserved.
pub fn validate_series(raw: &[RawPoint]) -> Vec<TimeSeriesPoint> {
    let valid: Vec<TimeSeriesPoint> = raw.iter().filter_map(validate_point).collect();

    let dropped = raw.len() - valid.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = valid.len(), "dropped malformed points");
    }

    valid
}

fn validate_point(point: &RawPoint) -> Option<TimeSeriesPoint> {
    let date = parse_date(point.date.as_deref()?)?;
    let value = parse_value(point.value.as_ref()?)?;
    Some(TimeSeriesPoint { date, value })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_value(raw: &RawValue) -> Option<f64> {
    let value = match raw {
        RawValue::Number(n) => *n,
        // "." is FRED's marker for a missing observation; it fails to parse like any other text
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_raw(series: &[TimeSeriesPoint]) -> Vec<RawPoint> {
        series
            .iter()
            .map(|p| RawPoint::number(&p.date.format("%Y-%m-%d").to_string(), p.value))
            .collect()
    }

    #[test]
    fn test_drops_malformed_points() {
        let raw = vec![
            RawPoint::number("2023-01-01", 1.0),
            RawPoint::text("2023-02-01", "."),
            RawPoint::missing("2023-03-01"),
            RawPoint::number("2023-13-01", 4.0),
            RawPoint { date: None, value: Some(RawValue::Number(5.0)) },
            RawPoint::number("2023-06-01", f64::NAN),
            RawPoint::text("2023-07-01", "NaN"),
            RawPoint::text("2023-08-01", " 8.5 "),
            RawPoint::number("2023-09-01", f64::INFINITY),
        ];

        let valid = validate_series(&raw);
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].value, 1.0);
        assert_eq!(valid[1].value, 8.5);
        assert_eq!(valid[1].date, NaiveDate::from_ymd_opt(2023, 8, 1).unwrap());
    }

    #[test]
    fn test_empty_and_all_malformed() {
        assert!(validate_series(&[]).is_empty());

        let raw = vec![RawPoint::text("2023-01-01", "n/a"), RawPoint::text("yesterday", "1")];
        assert!(validate_series(&raw).is_empty());
    }

    #[test]
    fn test_keeps_duplicates_and_order() {
        let raw = vec![
            RawPoint::number("2023-01-01", 1.0),
            RawPoint::number("2023-01-01", 2.0),
            RawPoint::number("2023-01-02", 3.0),
        ];
        let valid = validate_series(&raw);
        let values: Vec<f64> = valid.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_idempotent() {
        let raw = vec![
            RawPoint::number("2023-01-01", 1.5),
            RawPoint::text("2023-02-01", "."),
            RawPoint::text("2023-03-01", "-2.25"),
        ];
        let once = validate_series(&raw);
        let twice = validate_series(&to_raw(&once));
        assert_eq!(once, twice);
    }
}
