pub mod statistics;
pub mod transforms;

/// Rounds to 2 decimal places for display stability. Values too large to
/// scale are returned as is.
pub(crate) fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}
