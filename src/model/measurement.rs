use anyhow::{bail, Result};
use ndarray::Array1;
use serde::Serialize;
use std::fmt;

/// Error measures of one prediction against the actual series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl PerformanceMetrics {
    pub fn compute(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<Self> {
        if actual.len() != predicted.len() {
            bail!(
                "{} actual values but {} predictions",
                actual.len(),
                predicted.len()
            );
        }
        if actual.is_empty() {
            bail!("cannot measure performance on an empty series");
        }

        let n = actual.len() as f64;
        let residuals = actual - predicted;
        let ss_res = residuals.mapv(|r| r * r).sum();
        let mse = ss_res / n;
        let mae = residuals.mapv(f64::abs).sum() / n;

        let mean = actual.sum() / n;
        let ss_tot = actual.mapv(|a| (a - mean).powi(2)).sum();
        // Constant actual series: only an exact fit scores
        let r2 = if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        };

        let metrics = Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
        };
        tracing::info!("Calculated metrics are: [{}]", metrics);
        Ok(metrics)
    }

    /// `item,value` rows in the order they are saved
    pub fn items(&self) -> [(&'static str, f64); 4] {
        [
            ("MSE", self.mse),
            ("RMSE", self.rmse),
            ("MAE", self.mae),
            ("R2", self.r2),
        ]
    }
}

impl fmt::Display for PerformanceMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MSE={:.6} RMSE={:.6} MAE={:.6} R2={:.6}",
            self.mse, self.rmse, self.mae, self.r2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_metrics_on_known_values() {
        let metrics = PerformanceMetrics::compute(&array![1.0, 2.0, 3.0, 4.0], &array![1.0, 2.0, 4.0, 2.0]).unwrap();

        assert!(close(metrics.mse, 1.25));
        assert!(close(metrics.rmse, 1.25f64.sqrt()));
        assert!(close(metrics.mae, 0.75));
        // ss_tot = 5, ss_res = 5
        assert!(close(metrics.r2, 0.0));
    }

    #[test]
    fn test_perfect_fit() {
        let metrics = PerformanceMetrics::compute(&array![0.5, 1.5], &array![0.5, 1.5]).unwrap();
        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.r2, 1.0);
    }

    #[test]
    fn test_constant_actual_series() {
        let exact = PerformanceMetrics::compute(&array![2.0, 2.0], &array![2.0, 2.0]).unwrap();
        assert_eq!(exact.r2, 1.0);

        let off = PerformanceMetrics::compute(&array![2.0, 2.0], &array![1.0, 3.0]).unwrap();
        assert_eq!(off.r2, 0.0);
    }

    #[test]
    fn test_invalid_input() {
        assert!(PerformanceMetrics::compute(&Array1::zeros(0), &Array1::zeros(0)).is_err());
        assert!(PerformanceMetrics::compute(&array![1.0], &array![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_items_order() {
        let metrics = PerformanceMetrics::compute(&array![1.0, 2.0], &array![1.0, 2.0]).unwrap();
        let names: Vec<&str> = metrics.items().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["MSE", "RMSE", "MAE", "R2"]);
    }
}
