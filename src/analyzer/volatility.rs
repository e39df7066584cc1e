use crate::model::PricePoint;

/// Population standard deviation; 0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    variance.sqrt()
}

pub struct VolatilityEstimator;

impl VolatilityEstimator {
    /// Period-over-period simple returns of a chronologically ordered series.
    pub fn returns(points: &[PricePoint]) -> Vec<f64> {
        points
            .windows(2)
            .map(|w| (w[1].price - w[0].price) / w[0].price)
            .collect()
    }

    /// Population standard deviation of the simple returns. Series with fewer
    /// than 2 points have no returns and a volatility of 0. A zero price
    /// followed by another point divides by zero and yields a non-finite value.
    pub fn estimate(points: &[PricePoint]) -> f64 {
        if points.len() < 2 {
            return 0.0;
        }
        population_std_dev(&Self::returns(points))
    }
}
