use crate::network::NetworkGradients;

/// Small constant added to the norm before computing the clip coefficient.
const NORM_EPSILON: f32 = 1e-6;

/// Gradient clipping by global norm (across all parameters)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientClipper {
    pub max_norm: f32,
}

impl GradientClipper {
    pub fn new(max_norm: f32) -> Self {
        GradientClipper { max_norm }
    }

    /// Compute global norm of all gradients
    pub fn global_norm(gradients: &NetworkGradients) -> f32 {
        gradients
            .layers
            .iter()
            .map(|g| {
                g.weights.iter().map(|&x| x * x).sum::<f32>()
                    + g.biases.iter().map(|&x| x * x).sum::<f32>()
            })
            .sum::<f32>()
            .sqrt()
    }

    /// Rescale all gradients in place so their global norm does not exceed
    /// `max_norm`. Returns the norm before clipping.
    pub fn clip(&self, gradients: &mut NetworkGradients) -> f32 {
        let global_norm = Self::global_norm(gradients);

        let scale = self.max_norm / (global_norm + NORM_EPSILON);
        if scale < 1.0 {
            for grad in gradients.layers.iter_mut() {
                grad.weights.mapv_inplace(|g| g * scale);
                grad.biases.mapv_inplace(|g| g * scale);
            }
        }
        global_norm
    }
}
