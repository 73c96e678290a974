use ndarray::{Array2, ArrayView2};

/// Trait defining the interface for loss functions
pub trait Loss {
    /// Compute the loss for a batch of predictions and targets
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32;

    /// Compute the gradient of the loss with respect to the predictions
    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32>;
}

/// Mean squared error averaged over every element of the batch.
pub struct MSE;

impl Loss for MSE {
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
        let diff = &predictions - &targets;
        (&diff * &diff).sum() / predictions.len().max(1) as f32
    }

    fn gradient_batch(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
    ) -> Array2<f32> {
        (&predictions - &targets) * (2.0 / predictions.len().max(1) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mse_mean_over_all_elements() {
        let predictions = array![[1.0, 2.0], [3.0, 4.0]];
        let targets = array![[1.0, 0.0], [3.0, 4.0]];
        assert!((MSE.compute_batch(predictions.view(), targets.view()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mse_gradient_zero_where_target_matches() {
        let predictions = array![[1.0, 2.0], [3.0, 4.0]];
        let targets = array![[1.0, 0.0], [3.0, 5.0]];
        let grad = MSE.gradient_batch(predictions.view(), targets.view());
        assert_eq!(grad, array![[0.0, 1.0], [0.0, -0.5]]);
    }
}
