use crate::config::TrendConfig;
use crate::models::{ScoreSeries, TrendVerdict};

/// Least-squares slope of score against position `0..n-1`.
///
/// Returns `None` for fewer than two scores. Scores are scaled into
/// `[-1, 1]` before fitting so sums stay finite for any finite input.
pub fn regression_slope(scores: &[f64]) -> Option<f64> {
    let n = scores.len();
    if n < 2 {
        return None;
    }

    let scale = scores.iter().fold(0.0_f64, |max, score| max.max(score.abs()));
    if scale == 0.0 {
        return Some(0.0);
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let mut y_mean = 0.0;
    for (position, score) in scores.iter().enumerate() {
        y_mean += (score / scale - y_mean) / (position + 1) as f64;
    }

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (position, score) in scores.iter().enumerate() {
        let dx = position as f64 - x_mean;
        covariance += dx * (score / scale - y_mean);
        variance += dx * dx;
    }

    Some(covariance / variance * scale)
}

/// A non-finite slope carries no usable direction and is reported as
/// `InsufficientData`.
pub fn classify_slope(slope: f64, config: &TrendConfig) -> TrendVerdict {
    if !slope.is_finite() {
        TrendVerdict::InsufficientData
    } else if slope.abs() <= config.epsilon {
        TrendVerdict::Stable
    } else if slope < 0.0 {
        TrendVerdict::Declining
    } else {
        TrendVerdict::Improving
    }
}

pub fn classify_trend(series: &ScoreSeries, config: &TrendConfig) -> TrendVerdict {
    analyze_trend(series, config).1
}

pub fn analyze_trend(
    series: &ScoreSeries,
    config: &TrendConfig,
) -> (Option<f64>, TrendVerdict) {
    match regression_slope(series.scores()) {
        Some(slope) => (Some(slope), classify_slope(slope, config)),
        None => (None, TrendVerdict::InsufficientData),
    }
}
