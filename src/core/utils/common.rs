//! Numeric helpers shared by split search and pruning.

use crate::core::constants::EQUALITY_EPSILON;

/// Tolerance-based equality for attribute and label values.
#[inline]
pub fn is_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EQUALITY_EPSILON
}

/// Inverse of the standard normal cumulative distribution function.
///
/// Rational approximation by P. J. Acklam, relative error below 1.2e-9 over
/// the open interval (0, 1). Returns infinities at the bounds and NaN outside.
pub fn normal_inverse(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_is_equal_tolerance() {
        assert!(is_equal(1.0, 1.0 + 1e-12));
        assert!(!is_equal(1.0, 1.0 + 1e-6));
    }

    #[test]
    fn test_normal_inverse_known_quantiles() {
        assert_abs_diff_eq!(normal_inverse(0.5), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normal_inverse(0.75), 0.674_489_75, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_inverse(0.975), 1.959_963_98, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_inverse(0.01), -2.326_347_87, epsilon = 1e-6);
    }

    #[test]
    fn test_normal_inverse_bounds() {
        assert_eq!(normal_inverse(0.0), f64::NEG_INFINITY);
        assert_eq!(normal_inverse(1.0), f64::INFINITY);
        assert!(normal_inverse(1.5).is_nan());
    }
}
