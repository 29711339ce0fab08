use crate::models::TimeSeriesPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One date with a value from each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPoint {
    pub date: NaiveDate,
    pub left: f64,
    pub right: f64,
}

/// Aligns two validated series on the dates of `left`, pairing each with the
/// latest known value of `right`. Suits comparing a fast series against a slow
/// one (daily prices vs. quarterly GDP). Left dates before the first right
/// value are dropped.
///
/// Duplicate dates collapse to the last value seen for that date.
pub fn align_series(left: &[TimeSeriesPoint], right: &[TimeSeriesPoint]) -> Vec<AlignedPoint> {
    let map_left: BTreeMap<NaiveDate, f64> = left.iter().map(|p| (p.date, p.value)).collect();
    let map_right: BTreeMap<NaiveDate, f64> = right.iter().map(|p| (p.date, p.value)).collect();

    let mut result = Vec::new();
    let mut last_right: Option<f64> = None;
    let mut right_iter = map_right.iter().peekable();

    for (date, l) in &map_left {
        // Advance the right side up to and including this date
        while let Some((date_r, r)) = right_iter.peek() {
            if *date_r <= date {
                last_right = Some(**r);
                right_iter.next();
            } else {
                break;
            }
        }

        // Warm-up: nothing to pair with until the right side starts
        if let Some(r) = last_right {
            result.push(AlignedPoint {
                date: *date,
                left: *l,
                right: r,
            });
        }
    }

    result
}
