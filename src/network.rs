use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{PressLightError, Result};
use crate::layers::{DenseLayer, LayerCache, LayerGradients, WeightInit};
use crate::optimizer::Optimizer;

/// Action-value network: `relu(dense_1) -> relu(dense_2) -> dense_3`.
///
/// The network exposes two evaluation modes. [`QNetwork::predict`] only
/// computes values and can be called through a shared reference, which is
/// how the target network is always evaluated. [`QNetwork::forward`]
/// additionally returns a [`ForwardTrace`] that [`QNetwork::backward`]
/// consumes; only the trainer uses it, and only on the online network.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QNetwork {
    pub layers: Vec<DenseLayer>,
}

/// Per-layer caches from a differentiable forward pass.
#[derive(Clone, Debug)]
pub struct ForwardTrace {
    caches: Vec<LayerCache>,
}

/// Gradients for every layer, ordered input to output.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkGradients {
    pub layers: Vec<LayerGradients>,
}

/// Serializable parameter dictionary of a network.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NetworkParameters {
    pub layers: Vec<LayerParameters>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LayerParameters {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl QNetwork {
    /// Build a freshly initialized network.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        hidden_size: usize,
        num_actions: usize,
        rng: &mut R,
    ) -> Result<Self> {
        Self::with_init(input_size, hidden_size, num_actions, WeightInit::default(), rng)
    }

    pub fn with_init<R: Rng + ?Sized>(
        input_size: usize,
        hidden_size: usize,
        num_actions: usize,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        for (name, size) in [
            ("input_size", input_size),
            ("d_dense", hidden_size),
            ("num_actions", num_actions),
        ] {
            if size == 0 {
                return Err(PressLightError::configuration(name, "must be greater than 0"));
            }
        }

        let layers = vec![
            DenseLayer::new(input_size, hidden_size, Activation::Relu, init, rng),
            DenseLayer::new(hidden_size, hidden_size, Activation::Relu, init, rng),
            DenseLayer::new(hidden_size, num_actions, Activation::Linear, init, rng),
        ];
        Ok(QNetwork { layers })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn num_actions(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    /// Value-only forward pass over a `(batch, features)` matrix.
    pub fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(inputs)?;
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.predict_batch(current.view());
        }
        Ok(current)
    }

    /// Differentiable forward pass. Outputs are identical to `predict`.
    pub fn forward(&self, inputs: ArrayView2<f32>) -> Result<(Array2<f32>, ForwardTrace)> {
        self.check_input(inputs)?;
        let mut caches = Vec::with_capacity(self.layers.len());
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            let (output, cache) = layer.forward_batch(current.view());
            caches.push(cache);
            current = output;
        }
        Ok((current, ForwardTrace { caches }))
    }

    /// Backpropagate `output_errors` (dLoss/dOutput) through the trace.
    pub fn backward(
        &self,
        trace: &ForwardTrace,
        output_errors: ArrayView2<f32>,
    ) -> Result<NetworkGradients> {
        if trace.caches.len() != self.layers.len() {
            return Err(PressLightError::dimension_mismatch(
                format!("{} cached layers", self.layers.len()),
                format!("{}", trace.caches.len()),
            ));
        }
        let expected = (trace.caches[0].inputs.nrows(), self.num_actions());
        if output_errors.dim() != expected {
            return Err(PressLightError::dimension_mismatch(
                format!("{:?}", expected),
                format!("{:?}", output_errors.dim()),
            ));
        }

        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();
        for (i, (layer, cache)) in self.layers.iter().zip(&trace.caches).enumerate().rev() {
            let (adjusted_error, layer_gradients) =
                layer.backward_batch(cache, current_error.view());
            gradients.push(layer_gradients);
            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }
        gradients.reverse();
        Ok(NetworkGradients { layers: gradients })
    }

    /// Apply one optimizer step with the given gradients.
    pub fn apply_gradients<O: Optimizer>(
        &mut self,
        gradients: &NetworkGradients,
        optimizer: &mut O,
        learning_rate: f32,
    ) {
        for (index, (layer, grads)) in self.layers.iter_mut().zip(&gradients.layers).enumerate() {
            optimizer.update_weights(index, &mut layer.weights, &grads.weights, learning_rate);
            optimizer.update_biases(index, &mut layer.biases, &grads.biases, learning_rate);
        }
    }

    /// Overwrite every parameter with those of `source`.
    pub fn copy_from(&mut self, source: &QNetwork) {
        self.layers.clone_from(&source.layers);
    }

    pub fn state_dict(&self) -> NetworkParameters {
        NetworkParameters {
            layers: self
                .layers
                .iter()
                .map(|layer| LayerParameters {
                    weights: layer.weights.clone(),
                    biases: layer.biases.clone(),
                })
                .collect(),
        }
    }

    /// Load parameters after checking they fit this architecture. On
    /// error the network is left untouched.
    pub fn load_state_dict(&mut self, parameters: &NetworkParameters) -> Result<()> {
        if parameters.layers.len() != self.layers.len() {
            return Err(PressLightError::dimension_mismatch(
                format!("{} layers", self.layers.len()),
                format!("{} layers", parameters.layers.len()),
            ));
        }
        for (layer, params) in self.layers.iter().zip(&parameters.layers) {
            if layer.weights.dim() != params.weights.dim()
                || layer.biases.dim() != params.biases.dim()
            {
                return Err(PressLightError::dimension_mismatch(
                    format!("weights {:?}, biases {}", layer.weights.dim(), layer.biases.len()),
                    format!("weights {:?}, biases {}", params.weights.dim(), params.biases.len()),
                ));
            }
        }
        for (layer, params) in self.layers.iter_mut().zip(&parameters.layers) {
            layer.weights.assign(&params.weights);
            layer.biases.assign(&params.biases);
        }
        Ok(())
    }

    fn check_input(&self, inputs: ArrayView2<f32>) -> Result<()> {
        if inputs.ncols() != self.input_size() {
            return Err(PressLightError::dimension_mismatch(
                format!("{} input features", self.input_size()),
                format!("{}", inputs.ncols()),
            ));
        }
        Ok(())
    }
}

/// Row-wise argmax; ties resolve to the lowest index.
pub fn argmax_rows(values: ArrayView2<f32>) -> Vec<usize> {
    values
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            for (idx, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = idx;
                }
            }
            best
        })
        .collect()
}

/// Row-wise maximum.
pub fn max_rows(values: ArrayView2<f32>) -> Array1<f32> {
    values
        .rows()
        .into_iter()
        .map(|row| row.iter().fold(f32::NEG_INFINITY, |max, &v| max.max(v)))
        .collect()
}
