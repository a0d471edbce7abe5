use nalgebra::{DMatrix, DVector};
use opest_core::{ErrorInfo, OpestError};

/// Mean of every row (one variable per row, one observation per column).
pub fn row_means(samples: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_fn(samples.nrows(), |row, _| samples.row(row).mean())
}

/// Sample covariance between rows, normalised by `observations - 1`.
pub fn sample_covariance(samples: &DMatrix<f64>) -> Result<DMatrix<f64>, OpestError> {
    let observations = samples.ncols();
    if observations < 2 {
        return Err(OpestError::Estimate(
            ErrorInfo::new("insufficient-shots", "covariance needs at least two shots")
                .with_context("shots", observations.to_string()),
        ));
    }
    let means = row_means(samples);
    let centered = DMatrix::from_fn(samples.nrows(), observations, |row, col| {
        samples[(row, col)] - means[row]
    });
    Ok(&centered * centered.transpose() / (observations - 1) as f64)
}

/// Variance of the mean of the summed series: `sum(cov) / (shots - 1)`.
pub fn estimator_variance(covariance: &DMatrix<f64>, shots: usize) -> f64 {
    if shots < 2 {
        return f64::INFINITY;
    }
    covariance.sum() / (shots - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covariance_matches_hand_computation() {
        let samples = DMatrix::from_row_slice(2, 4, &[1.0, -1.0, 1.0, 1.0, 1.0, 1.0, -1.0, 1.0]);
        let cov = sample_covariance(&samples).unwrap();
        // means 0.5 / 0.5, deviations (0.5,-1.5,0.5,0.5) and (0.5,0.5,-1.5,0.5)
        assert!((cov[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((cov[(1, 1)] - 1.0).abs() < 1e-12);
        assert!((cov[(0, 1)] + 1.0 / 3.0).abs() < 1e-12);
        assert!((estimator_variance(&cov, 4) - (2.0 - 2.0 / 3.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_shot_has_no_covariance() {
        let samples = DMatrix::from_element(3, 1, 1.0);
        assert!(sample_covariance(&samples).is_err());
        assert!(estimator_variance(&DMatrix::zeros(3, 3), 1).is_infinite());
    }
}
