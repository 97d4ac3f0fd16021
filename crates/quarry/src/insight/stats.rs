//! Numeric building blocks shared by the detectors.
//!
//! Every function returns `None` instead of a NaN when its inputs are
//! degenerate, so callers decide how a failed fit is reported.

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Exponent of the power-law baseline `α·x^-β`.
pub const POWER_BETA: f64 = 0.7;

/// Least-squares `α` for `y ≈ α·x^-β` with `β` fixed.
///
/// The model is linear in `α`, so the fit is closed form.
pub fn power_fit(x: &[f64], y: &[f64]) -> Option<f64> {
    let (num, den) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(num, den), (xi, yi)| {
            let f = xi.powf(-POWER_BETA);
            (num + f * yi, den + f * f)
        });
    let alpha = num / den;
    (den > 0.0 && alpha.is_finite()).then_some(alpha)
}

/// Power-law baseline at `x`.
pub fn power_curve(alpha: f64, x: f64) -> f64 {
    alpha * x.powf(-POWER_BETA)
}

/// Maximum-likelihood normal fit: mean and population standard deviation.
pub fn normal_fit(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, var.sqrt()))
}

fn normal(mean: f64, std: f64) -> Option<Normal> {
    if !(std > 0.0 && std.is_finite() && mean.is_finite()) {
        return None;
    }
    Normal::new(mean, std).ok()
}

/// `P(X > x)` for `X ~ N(mean, std)`.
pub fn normal_sf(x: f64, mean: f64, std: f64) -> Option<f64> {
    normal(mean, std).map(|d| d.sf(x)).filter(|p| p.is_finite())
}

/// `P(X ≤ x)` for `X ~ N(mean, std)`.
pub fn normal_cdf(x: f64, mean: f64, std: f64) -> Option<f64> {
    normal(mean, std).map(|d| d.cdf(x)).filter(|p| p.is_finite())
}

/// `P(T > x)` for a standard Student-t with `df` degrees of freedom.
pub fn student_t_sf(x: f64, df: f64) -> Option<f64> {
    if x == f64::INFINITY {
        return Some(0.0);
    }
    StudentsT::new(0.0, 1.0, df)
        .ok()
        .map(|d| d.sf(x))
        .filter(|p| p.is_finite())
}

/// Survival function of the logistic distribution.
pub fn logistic_sf(x: f64, loc: f64, scale: f64) -> f64 {
    1.0 / (1.0 + ((x - loc) / scale).exp())
}

/// Ordinary least squares of `y` on `0..n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation of the fit; zero when `y` is constant.
    pub r: f64,
}

pub fn linregress(y: &[f64]) -> Option<LinearFit> {
    let n = y.len();
    if n < 2 {
        return None;
    }
    let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let x_mean = x.iter().sum::<f64>() / n as f64;
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let r = if syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    };

    (slope.is_finite() && intercept.is_finite()).then_some(LinearFit { slope, intercept, r })
}

/// Pearson correlation with its two-sided p-value.
///
/// `None` when either input is constant or fewer than three pairs exist.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len().min(y.len());
    if n < 3 {
        return None;
    }
    let x = &x[..n];
    let y = &y[..n];
    let x_mean = x.iter().sum::<f64>() / n as f64;
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let df = (n - 2) as f64;
    let p = if r.abs() == 1.0 {
        0.0
    } else {
        let t = r.abs() * (df / (1.0 - r * r)).sqrt();
        (2.0 * student_t_sf(t, df)?).min(1.0)
    };
    Some((r, p))
}

/// Indices of local maxima.
///
/// A flat peak reports the middle of its plateau (rounding down); the end
/// points are never peaks.
pub fn find_peaks(y: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if y.len() < 3 {
        return peaks;
    }
    let last = y.len() - 1;
    let mut i = 1;
    while i < last {
        if y[i - 1] < y[i] {
            let mut ahead = i + 1;
            while ahead < last && y[ahead] == y[i] {
                ahead += 1;
            }
            if y[ahead] < y[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

/// Shannon entropy of the shares of `y`, normalized by `ln(n)`.
pub fn normalized_entropy(y: &[f64]) -> Option<f64> {
    let n = y.len();
    let total: f64 = y.iter().sum();
    if n < 2 || total == 0.0 {
        return None;
    }
    let h: f64 = y
        .iter()
        .map(|v| v / total)
        .filter(|p| *p != 0.0)
        .map(|p| -p * p.ln())
        .sum();
    let h = h / (n as f64).ln();
    h.is_finite().then_some(h)
}
