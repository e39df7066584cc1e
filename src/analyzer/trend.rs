use crate::model::{FittedPoint, PricePoint, TrendType};

/// Window of the centered moving average.
pub const MOVING_WINDOW: usize = 3;

/// Ordinary least squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fits the OLS line. All-equal `xs` make the denominator zero and the
    /// coefficients non-finite; this is not intercepted.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Self {
        let n = xs.len() as f64;
        let sum_x: f64 = xs.iter().sum();
        let sum_y: f64 = ys.iter().sum();
        let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
        let sum_x2: f64 = xs.iter().map(|x| x * x).sum();

        let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
        let intercept = (sum_y - slope * sum_x) / n;
        Self { slope, intercept }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Quadratic `y = a * u^2 + b * u + c` with `u = x - origin`.
///
/// Moments are taken about the mean year so that x^4 sums stay well inside
/// f64 precision. The fitted curve is the same as the uncentered one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub origin: f64,
}

impl QuadraticFit {
    /// Closed-form solution of the 3x3 normal equations. Fewer than three
    /// distinct x values make the determinant zero and the result non-finite.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Self {
        let n = xs.len() as f64;
        let origin = xs.iter().sum::<f64>() / n;
        let us: Vec<f64> = xs.iter().map(|x| x - origin).collect();

        let sum_x: f64 = us.iter().sum();
        let sum_x2: f64 = us.iter().map(|u| u.powi(2)).sum();
        let sum_x3: f64 = us.iter().map(|u| u.powi(3)).sum();
        let sum_x4: f64 = us.iter().map(|u| u.powi(4)).sum();
        let sum_y: f64 = ys.iter().sum();
        let sum_xy: f64 = us.iter().zip(ys).map(|(u, y)| u * y).sum();
        let sum_x2y: f64 = us.iter().zip(ys).map(|(u, y)| u * u * y).sum();

        // Cramer's rule on
        //   [n    Sx   Sx2] [c]   [Sy  ]
        //   [Sx   Sx2  Sx3] [b] = [Sxy ]
        //   [Sx2  Sx3  Sx4] [a]   [Sx2y]
        let d = n * sum_x2 * sum_x4 + 2.0 * sum_x * sum_x2 * sum_x3
            - sum_x2 * sum_x2 * sum_x2
            - sum_x * sum_x * sum_x4
            - n * sum_x3 * sum_x3;
        let a = (n * sum_x2 * sum_x2y + sum_x * sum_x3 * sum_y + sum_x * sum_x2 * sum_xy
            - sum_x2 * sum_x2 * sum_y
            - n * sum_x3 * sum_xy
            - sum_x * sum_x * sum_x2y)
            / d;
        let b = (n * sum_x4 * sum_xy + sum_x2 * sum_x3 * sum_y + sum_x * sum_x2 * sum_x2y
            - sum_x2 * sum_x2 * sum_xy
            - n * sum_x3 * sum_x2y
            - sum_x * sum_x4 * sum_y)
            / d;
        let c = (sum_x2 * sum_x4 * sum_y + sum_x * sum_x3 * sum_x2y + sum_x2 * sum_x3 * sum_xy
            - sum_x3 * sum_x3 * sum_y
            - sum_x * sum_x4 * sum_xy
            - sum_x2 * sum_x2 * sum_x2y)
            / d;

        Self { a, b, c, origin }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let u = x - self.origin;
        self.a * u * u + self.b * u + self.c
    }
}

/// A parametric trend curve that can be evaluated at any year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear(LinearFit),
    /// Linear fit of ln(price); evaluation exponentiates back to price space.
    Exponential(LinearFit),
    Quadratic(QuadraticFit),
}

impl Curve {
    /// Fits the curve family for `trend`. Returns `None` for `none`, for the
    /// moving average (which has no closed form) and for fewer than 2 points.
    pub fn fit(points: &[PricePoint], trend: TrendType) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let xs: Vec<f64> = points.iter().map(|p| p.year as f64).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.price).collect();

        match trend {
            TrendType::Linear => Some(Curve::Linear(LinearFit::fit(&xs, &ys))),
            TrendType::Exponential => {
                // Non-positive prices give NaN/-inf here and propagate.
                let ln_ys: Vec<f64> = ys.iter().map(|y| y.ln()).collect();
                Some(Curve::Exponential(LinearFit::fit(&xs, &ln_ys)))
            }
            TrendType::Polynomial => Some(Curve::Quadratic(QuadraticFit::fit(&xs, &ys))),
            TrendType::Moving | TrendType::None => None,
        }
    }

    pub fn evaluate(&self, year: i32) -> f64 {
        let x = year as f64;
        match self {
            Curve::Linear(fit) => fit.evaluate(x),
            Curve::Exponential(fit) => fit.evaluate(x).exp(),
            Curve::Quadratic(fit) => fit.evaluate(x),
        }
    }
}

pub struct TrendFitter;

impl TrendFitter {
    /// Fits `trend` to an ascending series and returns one fitted point per
    /// input year. Fewer than 2 points, or `TrendType::None`, yield an empty vector.
    pub fn fit(points: &[PricePoint], trend: TrendType) -> Vec<FittedPoint> {
        if points.len() < 2 {
            return Vec::new();
        }
        match trend {
            TrendType::None => Vec::new(),
            TrendType::Moving => Self::moving_average(points, MOVING_WINDOW),
            _ => match Curve::fit(points, trend) {
                Some(curve) => points
                    .iter()
                    .map(|p| FittedPoint {
                        x: p.year,
                        y: curve.evaluate(p.year),
                    })
                    .collect(),
                None => Vec::new(),
            },
        }
    }

    /// Centered moving average. The window is truncated at the series edges
    /// rather than padded, so the output has the same length as the input.
    pub fn moving_average(points: &[PricePoint], window: usize) -> Vec<FittedPoint> {
        let half = window / 2;
        (0..points.len())
            .map(|i| {
                let start = i.saturating_sub(half);
                let end = (i + half + 1).min(points.len());
                let slice = &points[start..end];
                let avg = slice.iter().map(|p| p.price).sum::<f64>() / slice.len() as f64;
                FittedPoint {
                    x: points[i].year,
                    y: avg,
                }
            })
            .collect()
    }
}
