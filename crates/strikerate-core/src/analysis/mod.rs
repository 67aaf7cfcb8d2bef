// Comparison engine: innings filters, per-player metrics, normalized scoring.

pub mod filter;
pub mod metrics;
pub mod scoring;

/// Round to `places` decimal places (half away from zero).
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Round to two decimal places, the precision every reported statistic uses.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}
