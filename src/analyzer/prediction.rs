use crate::analyzer::trend::{Curve, MOVING_WINDOW};
use crate::analyzer::volatility::VolatilityEstimator;
use crate::model::{BandPolicy, Prediction, PricePoint, TrendType};

/// Number of future years forecast past the last observed year.
pub const HORIZON: i32 = 3;

/// Multipliers of the fixed ±10% confidence band.
pub const FIXED_LOWER: f64 = 0.9;
pub const FIXED_UPPER: f64 = 1.1;

/// z-score used by the volatility-scaled band (95%).
pub const BAND_Z: f64 = 1.96;

pub struct Predictor;

impl Predictor {
    /// The years immediately following the last observed year.
    pub fn future_years(points: &[PricePoint]) -> Option<Vec<i32>> {
        let last_year = points.iter().map(|p| p.year).max()?;
        Some((1..=HORIZON).map(|h| last_year + h).collect())
    }

    /// Point forecasts for the next `HORIZON` years, using the same curve fit
    /// as the trend line. The moving average forecasts the flat mean of the
    /// last `MOVING_WINDOW` observations.
    pub fn forecast(points: &[PricePoint], trend: TrendType) -> Option<Vec<(i32, f64)>> {
        if points.len() < 2 {
            return None;
        }
        let years = Self::future_years(points)?;

        match trend {
            TrendType::None => None,
            TrendType::Moving => {
                let tail = &points[points.len().saturating_sub(MOVING_WINDOW)..];
                let avg = tail.iter().map(|p| p.price).sum::<f64>() / tail.len() as f64;
                Some(years.into_iter().map(|y| (y, avg)).collect())
            }
            _ => {
                let curve = Curve::fit(points, trend)?;
                Some(years.into_iter().map(|y| (y, curve.evaluate(y))).collect())
            }
        }
    }

    /// Forecasts with confidence bounds. Returns `None` for `TrendType::None`
    /// or fewer than 2 points.
    pub fn predict(points: &[PricePoint], trend: TrendType, band: BandPolicy) -> Option<Vec<Prediction>> {
        let forecast = Self::forecast(points, trend)?;

        let predictions = match band {
            BandPolicy::Fixed => forecast
                .into_iter()
                .map(|(year, value)| Prediction {
                    year,
                    value,
                    lower: value * FIXED_LOWER,
                    upper: value * FIXED_UPPER,
                })
                .collect(),
            BandPolicy::Volatility => {
                let sigma = VolatilityEstimator::estimate(points);
                forecast
                    .into_iter()
                    .enumerate()
                    .map(|(i, (year, value))| {
                        let horizon = (i + 1) as f64;
                        let half = value.abs() * BAND_Z * sigma * horizon.sqrt();
                        Prediction {
                            year,
                            value,
                            lower: value - half,
                            upper: value + half,
                        }
                    })
                    .collect()
            }
        };
        Some(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn series(data: &[(i32, f64)]) -> Vec<PricePoint> {
        data.iter()
            .map(|&(year, price)| PricePoint { year, price })
            .collect()
    }

    #[test]
    fn test_absent_for_none_or_short_series() {
        let s = series(&[(2020, 100.0), (2021, 110.0)]);
        assert!(Predictor::predict(&s, TrendType::None, BandPolicy::Fixed).is_none());
        assert!(Predictor::predict(&s[..1], TrendType::Linear, BandPolicy::Fixed).is_none());
        assert!(Predictor::predict(&[], TrendType::Moving, BandPolicy::Fixed).is_none());
    }

    #[test]
    fn test_linear_extrapolation() {
        let s = series(&[(2020, 100.0), (2021, 110.0), (2022, 121.0)]);
        let p = Predictor::predict(&s, TrendType::Linear, BandPolicy::Fixed).unwrap();
        assert_eq!(p.iter().map(|p| p.year).collect::<Vec<_>>(), vec![2023, 2024, 2025]);
        assert!((p[0].value - 131.333_333).abs() < 1e-4);
        assert!((p[2].value - 152.333_333).abs() < 1e-4);
    }

    #[test]
    fn test_exponential_extrapolation() {
        let s = series(&[(2020, 100.0), (2021, 200.0), (2022, 400.0)]);
        let p = Predictor::predict(&s, TrendType::Exponential, BandPolicy::Fixed).unwrap();
        assert!((p[0].value - 800.0).abs() < 1e-6);
        assert!((p[1].value - 1600.0).abs() < 1e-6);
    }

    #[test]
    fn test_polynomial_extrapolation() {
        let s = series(&[(2019, 1.0), (2020, 4.0), (2021, 9.0), (2022, 16.0)]);
        let p = Predictor::predict(&s, TrendType::Polynomial, BandPolicy::Fixed).unwrap();
        assert!((p[0].value - 25.0).abs() < 1e-6);
        assert!((p[2].value - 49.0).abs() < 1e-6);
    }

    #[test]
    fn test_moving_is_flat_mean_of_last_three() {
        let s = series(&[(2018, 1.0), (2019, 10.0), (2020, 20.0), (2022, 30.0)]);
        let p = Predictor::predict(&s, TrendType::Moving, BandPolicy::Fixed).unwrap();
        assert_eq!(p.iter().map(|p| p.year).collect::<Vec<_>>(), vec![2023, 2024, 2025]);
        assert!(p.iter().all(|p| p.value == 20.0));

        let two = series(&[(2020, 10.0), (2021, 30.0)]);
        let p = Predictor::predict(&two, TrendType::Moving, BandPolicy::Fixed).unwrap();
        assert!(p.iter().all(|p| p.value == 20.0));
    }

    #[test]
    fn test_fixed_band_identity_on_random_series() {
        let mut rng = rand::rng();
        let trends = [TrendType::Linear, TrendType::Exponential, TrendType::Polynomial, TrendType::Moving];
        for _ in 0..100 {
            let len = rng.random_range(2..15);
            let start = rng.random_range(1990..2015);
            let s: Vec<PricePoint> = (0..len)
                .map(|i| PricePoint {
                    year: start + i,
                    price: rng.random_range(5.0..1000.0),
                })
                .collect();
            let trend = trends[rng.random_range(0..trends.len())];
            let p = Predictor::predict(&s, trend, BandPolicy::Fixed).unwrap();
            assert_eq!(p.len(), 3);
            let last = start + len - 1;
            assert_eq!(p.iter().map(|p| p.year).collect::<Vec<_>>(), vec![last + 1, last + 2, last + 3]);
            for pred in &p {
                if pred.value.is_finite() {
                    assert_eq!(pred.lower, 0.9 * pred.value);
                    assert_eq!(pred.upper, 1.1 * pred.value);
                }
            }
        }
    }

    #[test]
    fn test_volatility_band_widens_with_horizon() {
        let s = series(&[(2019, 100.0), (2020, 120.0), (2021, 110.0), (2022, 130.0)]);
        let p = Predictor::predict(&s, TrendType::Linear, BandPolicy::Volatility).unwrap();
        let widths: Vec<f64> = p.iter().map(|p| (p.upper - p.lower) / p.value).collect();
        assert!(widths[0] > 0.0);
        assert!(widths[1] > widths[0]);
        assert!(widths[2] > widths[1]);
        for pred in &p {
            assert!((pred.value - pred.lower - (pred.upper - pred.value)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_volatility_band_collapses_on_steady_growth() {
        let s = series(&[(2020, 100.0), (2021, 110.0), (2022, 121.0)]);
        let p = Predictor::predict(&s, TrendType::Linear, BandPolicy::Volatility).unwrap();
        for pred in &p {
            assert!((pred.upper - pred.lower).abs() < 1e-9);
        }
    }
}
