//! Pearson correlation and its significance

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::types::NotComputableReason;

/// Sample Pearson correlation of two equally long slices
///
/// Uses the n-1 convention for both covariance and standard deviation.
/// A side whose spread is within rounding error of its mean reports
/// `ZeroVariance` instead of producing NaN or a correlation of noise.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, NotComputableReason> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Err(NotComputableReason::InsufficientData {
            pairs: n,
            required: 2,
        });
    }
    let (x, y) = (&x[..n], &y[..n]);

    let denom = (n - 1) as f64;
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if is_negligible(sxx, mean_x, n) || is_negligible(syy, mean_y, n) {
        return Err(NotComputableReason::ZeroVariance { pairs: n });
    }

    let covariance = sxy / denom;
    let std_x = (sxx / denom).sqrt();
    let std_y = (syy / denom).sqrt();

    let corr = covariance / (std_x * std_y);
    if !corr.is_finite() {
        return Err(NotComputableReason::ZeroVariance { pairs: n });
    }

    Ok(corr.clamp(-1.0, 1.0))
}

/// Two-sided p-value for `H0: rho = 0` given `r` over `n` pairs
///
/// `t = r * sqrt((n - 2) / (1 - r^2))` against Student's t with `n - 2`
/// degrees of freedom. Undefined below three pairs.
pub fn p_value(r: f64, n: usize) -> Option<f64> {
    if n < 3 || !r.is_finite() {
        return None;
    }

    let r2 = r * r;
    if r2 >= 1.0 {
        return Some(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r2)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p = 2.0 * (1.0 - dist.cdf(t.abs()));

    Some(p.clamp(0.0, 1.0))
}

/// Sum of squared deviations no larger than rounding error on the mean
fn is_negligible(sum_sq: f64, mean: f64, n: usize) -> bool {
    sum_sq <= n as f64 * f64::EPSILON * (mean * mean).max(f64::MIN_POSITIVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_self_correlation_is_one() {
        let x = [0.01, -0.02, 0.03, 0.01, -0.01, 0.004];
        assert!((pearson(&x, &x).unwrap() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_symmetric() {
        let x = [0.3, -1.2, 0.8, 2.1, -0.4];
        let y = [1.1, 0.2, -0.7, 0.9, 0.05];
        assert_eq!(pearson(&x, &y).unwrap(), pearson(&y, &x).unwrap());
    }

    #[test]
    fn test_perfect_negative() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y).unwrap() + 1.0).abs() < TOL);
    }

    #[test]
    fn test_known_value() {
        let x = [0.01, -0.02, 0.03, 0.01];
        let y = [-0.02, 0.03, 0.01, -0.01];
        let r = pearson(&x, &y).unwrap();
        assert!((r - (-0.492_212_535_860_906_5)).abs() < TOL);
    }

    #[test]
    fn test_bounded() {
        let x = [1e-12, 2e-12, 3.000001e-12, 4e-12];
        let y = [2e-12, 4e-12, 6e-12, 8.0000001e-12];
        let r = pearson(&x, &y).unwrap();
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn test_insufficient_pairs() {
        assert_eq!(
            pearson(&[1.0], &[2.0]),
            Err(NotComputableReason::InsufficientData {
                pairs: 1,
                required: 2
            })
        );
        assert!(pearson(&[], &[]).is_err());
    }

    #[test]
    fn test_rounding_noise_is_zero_variance() {
        // Same value reached through different arithmetic
        let x: Vec<f64> = (1..=20).map(|k| (k as f64 * 0.1) / (k as f64) * 0.1).collect();
        let y: Vec<f64> = (0..20).map(|k| k as f64).collect();
        assert!(matches!(
            pearson(&x, &y),
            Err(NotComputableReason::ZeroVariance { pairs: 20 })
        ));
    }

    #[test]
    fn test_zero_variance() {
        let x = [0.1, 0.1, 0.1];
        let y = [0.2, -0.3, 0.4];
        assert_eq!(
            pearson(&x, &y),
            Err(NotComputableReason::ZeroVariance { pairs: 3 })
        );
        assert_eq!(
            pearson(&y, &x),
            Err(NotComputableReason::ZeroVariance { pairs: 3 })
        );
    }

    #[test]
    fn test_p_value_four_pairs() {
        // With two degrees of freedom the two-sided p-value equals 1 - |r|
        let r = -0.492_212_535_860_906_5;
        let p = p_value(r, 4).unwrap();
        assert!((p - (1.0 - r.abs())).abs() < 1e-6);
    }

    #[test]
    fn test_p_value_undefined() {
        assert!(p_value(0.5, 2).is_none());
        assert!(p_value(f64::NAN, 10).is_none());
    }

    #[test]
    fn test_p_value_perfect_correlation() {
        assert_eq!(p_value(1.0, 10), Some(0.0));
    }

    #[test]
    fn test_p_value_zero_correlation() {
        let p = p_value(0.0, 50).unwrap();
        assert!((p - 1.0).abs() < 1e-9);
    }
}
