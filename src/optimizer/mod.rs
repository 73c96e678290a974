pub mod gradient_clipper;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::{RMSPROP_ALPHA, RMSPROP_EPSILON};
use crate::layers::DenseLayer;

pub use gradient_clipper::GradientClipper;

/// Parameter update rule. `layer` indexes per-layer optimizer state.
pub trait Optimizer {
    fn update_weights(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        gradients: &Array2<f32>,
        learning_rate: f32,
    );

    fn update_biases(
        &mut self,
        layer: usize,
        biases: &mut Array1<f32>,
        gradients: &Array1<f32>,
        learning_rate: f32,
    );
}

/// RMSProp optimizer (uncentered, no momentum)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RMSProp {
    pub alpha: f32,
    pub epsilon: f32,
    v_weights: Vec<Array2<f32>>,
    v_biases: Vec<Array1<f32>>,
}

impl RMSProp {
    pub fn new(layers: &[DenseLayer], alpha: f32, epsilon: f32) -> Self {
        let v_weights = layers
            .iter()
            .map(|layer| Array2::<f32>::zeros(layer.weights.dim()))
            .collect();
        let v_biases = layers
            .iter()
            .map(|layer| Array1::<f32>::zeros(layer.biases.dim()))
            .collect();

        RMSProp {
            alpha,
            epsilon,
            v_weights,
            v_biases,
        }
    }

    pub fn default(layers: &[DenseLayer]) -> Self {
        Self::new(layers, RMSPROP_ALPHA, RMSPROP_EPSILON)
    }

    /// Running averages of squared weight gradients, one per layer
    pub fn square_averages(&self) -> &[Array2<f32>] {
        &self.v_weights
    }

    /// Running averages of squared bias gradients, one per layer
    pub fn bias_square_averages(&self) -> &[Array1<f32>] {
        &self.v_biases
    }
}

impl Optimizer for RMSProp {
    fn update_weights(
        &mut self,
        layer: usize,
        weights: &mut Array2<f32>,
        gradients: &Array2<f32>,
        learning_rate: f32,
    ) {
        let alpha = self.alpha;
        let v = &mut self.v_weights[layer];

        // Update moving average of squared gradients
        v.zip_mut_with(gradients, |v, &g| *v = alpha * *v + (1.0 - alpha) * g * g);

        let eps = self.epsilon;
        ndarray::Zip::from(weights)
            .and(gradients)
            .and(&*v)
            .for_each(|w, &g, &v| *w -= learning_rate * g / (v.sqrt() + eps));
    }

    fn update_biases(
        &mut self,
        layer: usize,
        biases: &mut Array1<f32>,
        gradients: &Array1<f32>,
        learning_rate: f32,
    ) {
        let alpha = self.alpha;
        let v = &mut self.v_biases[layer];

        v.zip_mut_with(gradients, |v, &g| *v = alpha * *v + (1.0 - alpha) * g * g);

        let eps = self.epsilon;
        ndarray::Zip::from(biases)
            .and(gradients)
            .and(&*v)
            .for_each(|b, &g, &v| *b -= learning_rate * g / (v.sqrt() + eps));
    }
}
