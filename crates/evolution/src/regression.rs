//! Least-squares helpers over an evenly spaced series.

/// OLS slope of `values` against their index.
///
/// `None` when the index has no variance (fewer than two points).
pub fn ols_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;

    let (numerator, denominator) = values.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, y)| {
        let dx = i as f64 - x_mean;
        (num + dx * (y - y_mean), den + dx * dx)
    });

    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Mean squared residual against the line through the first value with
/// the given slope.
pub fn residual_variance(values: &[f64], slope: f64) -> f64 {
    let Some(first) = values.first() else {
        return 0.0;
    };
    let sum: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| {
            let r = y - (first + i as f64 * slope);
            r * r
        })
        .sum();
    sum / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_of_line() {
        let slope = ols_slope(&[0.70, 0.75, 0.80, 0.85]).unwrap();
        assert!((slope - 0.05).abs() < 1e-9);

        let slope = ols_slope(&[0.85, 0.80, 0.75, 0.70]).unwrap();
        assert!((slope + 0.05).abs() < 1e-9);

        assert_eq!(ols_slope(&[0.8, 0.8, 0.8]), Some(0.0));
    }

    #[test]
    fn test_slope_needs_two_points() {
        assert_eq!(ols_slope(&[]), None);
        assert_eq!(ols_slope(&[0.5]), None);
    }

    #[test]
    fn test_residual_variance() {
        assert!(residual_variance(&[0.70, 0.75, 0.80], 0.05) < 1e-12);
        // residuals 0, 0.2, 0 -> 0.04 / 3
        let v = residual_variance(&[0.5, 0.7, 0.5], 0.0);
        assert!((v - 0.04 / 3.0).abs() < 1e-12);
        assert_eq!(residual_variance(&[], 0.1), 0.0);
    }
}
