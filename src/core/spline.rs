use crate::types::{GapFillError, GapFillResult, PixelSeries};
use serde::{Deserialize, Serialize};

/// Behavior when a target month falls outside a pixel's observed time span.
///
/// Extending the end segment's cubic is deliberately not offered: unbounded
/// curvature past the last knot produces physically implausible storage
/// anomalies at stack edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtrapolationPolicy {
    /// Hold the nearest boundary knot's value constant outside the span
    ClampToBoundary,
}

impl Default for ExtrapolationPolicy {
    fn default() -> Self {
        ExtrapolationPolicy::ClampToBoundary
    }
}

/// Fitted piecewise curve for one pixel's time series.
///
/// Knot ordinals are strictly increasing month scalars; the curve passes
/// exactly through every knot.
#[derive(Debug, Clone)]
pub enum PixelCurve {
    /// Natural cubic spline, second derivative zero at both boundary knots
    NaturalCubic(CubicSegments),
    /// Piecewise-linear fallback for series too short for a cubic fit
    Linear(LinearKnots),
}

impl PixelCurve {
    fn first_knot(&self) -> (f64, f64) {
        match self {
            PixelCurve::NaturalCubic(cubic) => (cubic.knots[0], cubic.a[0]),
            PixelCurve::Linear(linear) => (linear.knots[0], linear.values[0]),
        }
    }

    fn last_knot(&self) -> (f64, f64) {
        match self {
            PixelCurve::NaturalCubic(cubic) => {
                let n = cubic.knots.len() - 1;
                (cubic.knots[n], cubic.a[n])
            }
            PixelCurve::Linear(linear) => {
                let n = linear.knots.len() - 1;
                (linear.knots[n], linear.values[n])
            }
        }
    }
}

/// Piecewise cubic coefficients: segment i covers [knots[i], knots[i+1]] and
/// evaluates as a[i] + b[i]*dx + c[i]*dx^2 + d[i]*dx^3 with dx = t - knots[i]
#[derive(Debug, Clone)]
pub struct CubicSegments {
    knots: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

/// Knot list for the piecewise-linear fallback
#[derive(Debug, Clone)]
pub struct LinearKnots {
    knots: Vec<f64>,
    values: Vec<f64>,
}

/// Fits a smooth 1D curve through one pixel's valid samples and evaluates it
/// at missing months. Stateless across pixels, so fits can fan out over the
/// raster with no synchronization.
#[derive(Debug, Clone)]
pub struct SplineInterpolator {
    min_samples: usize,
    policy: ExtrapolationPolicy,
}

impl Default for SplineInterpolator {
    fn default() -> Self {
        Self {
            min_samples: 4,
            policy: ExtrapolationPolicy::default(),
        }
    }
}

impl SplineInterpolator {
    /// Create an interpolator requiring at least `min_samples` valid points
    /// per pixel. Four points engage the full cubic fit; two or three fall
    /// back to piecewise-linear; below two no curve exists.
    pub fn new(min_samples: usize, policy: ExtrapolationPolicy) -> GapFillResult<Self> {
        if min_samples < 2 {
            return Err(GapFillError::Config(format!(
                "min_samples must be at least 2, got {}",
                min_samples
            )));
        }
        Ok(Self {
            min_samples,
            policy,
        })
    }

    /// Interpolator with standard parameters (cubic fit, clamped edges)
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Fit a curve through the series' samples.
    ///
    /// Series with at least four points get a natural cubic spline; shorter
    /// series (down to the floor of two) get a piecewise-linear fit.
    pub fn fit(&self, series: &PixelSeries) -> GapFillResult<PixelCurve> {
        let n = series.len();
        if n < self.min_samples {
            return Err(GapFillError::InsufficientSamples {
                row: series.row(),
                col: series.col(),
                available: n,
                required: self.min_samples,
            });
        }

        if n >= 4 {
            Ok(PixelCurve::NaturalCubic(fit_natural_cubic(
                series.times(),
                series.values(),
            )))
        } else {
            Ok(PixelCurve::Linear(LinearKnots {
                knots: series.times().to_vec(),
                values: series.values().to_vec(),
            }))
        }
    }

    /// Evaluate the fitted curve at one month ordinal
    pub fn evaluate(&self, curve: &PixelCurve, target: f64) -> f64 {
        let (first_knot, first_value) = curve.first_knot();
        let (last_knot, last_value) = curve.last_knot();

        match self.policy {
            ExtrapolationPolicy::ClampToBoundary => {
                if target <= first_knot {
                    return first_value;
                }
                if target >= last_knot {
                    return last_value;
                }
            }
        }

        match curve {
            PixelCurve::NaturalCubic(cubic) => {
                let i = segment_index(&cubic.knots, target);
                let dx = target - cubic.knots[i];
                cubic.a[i] + dx * (cubic.b[i] + dx * (cubic.c[i] + dx * cubic.d[i]))
            }
            PixelCurve::Linear(linear) => {
                let i = segment_index(&linear.knots, target);
                let span = linear.knots[i + 1] - linear.knots[i];
                let fraction = (target - linear.knots[i]) / span;
                linear.values[i] + fraction * (linear.values[i + 1] - linear.values[i])
            }
        }
    }

    /// Evaluate the fitted curve at several month ordinals
    pub fn evaluate_many(&self, curve: &PixelCurve, targets: &[f64]) -> Vec<f64> {
        targets
            .iter()
            .map(|&target| self.evaluate(curve, target))
            .collect()
    }
}

/// Index of the segment whose [knots[i], knots[i+1]] interval encloses
/// `target`, found by binary search. Caller guarantees the target lies
/// strictly inside the knot span.
fn segment_index(knots: &[f64], target: f64) -> usize {
    let upper = knots.partition_point(|&knot| knot <= target);
    upper.saturating_sub(1).min(knots.len() - 2)
}

/// Natural cubic spline coefficients via the tridiagonal (Thomas) solve.
///
/// Second derivatives at the two boundary knots are pinned to zero, which
/// keeps the curve from oscillating the way a single global polynomial
/// through the same points would.
fn fit_natural_cubic(times: &[f64], values: &[f64]) -> CubicSegments {
    let n = times.len();
    let a = values.to_vec();
    let mut b = vec![0.0; n - 1];
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n - 1];

    // Interval widths between consecutive knots
    let step: Vec<f64> = times.windows(2).map(|pair| pair[1] - pair[0]).collect();

    // Right-hand side of the second-derivative system
    let mut rhs = vec![0.0; n];
    for i in 1..n - 1 {
        rhs[i] =
            3.0 * (a[i + 1] - a[i]) / step[i] - 3.0 * (a[i] - a[i - 1]) / step[i - 1];
    }

    // Forward elimination; boundary rows encode c[0] = c[n-1] = 0
    let mut diag = vec![0.0; n];
    let mut upper = vec![0.0; n];
    let mut partial = vec![0.0; n];
    diag[0] = 1.0;

    for i in 1..n - 1 {
        diag[i] = 2.0 * (times[i + 1] - times[i - 1]) - step[i - 1] * upper[i - 1];
        upper[i] = step[i] / diag[i];
        partial[i] = (rhs[i] - step[i - 1] * partial[i - 1]) / diag[i];
    }

    // Back substitution
    for i in (0..n - 1).rev() {
        c[i] = partial[i] - upper[i] * c[i + 1];
        b[i] = (a[i + 1] - a[i]) / step[i] - step[i] * (c[i + 1] + 2.0 * c[i]) / 3.0;
        d[i] = (c[i + 1] - c[i]) / (3.0 * step[i]);
    }

    CubicSegments {
        knots: times.to_vec(),
        a,
        b,
        c,
        d,
    }
}
