use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WeightInit {
    /// Uniform in `±1/sqrt(fan_in)` for weights and biases alike
    #[default]
    FanInUniform,

    /// Uniform distribution with custom range (biases start at zero)
    Uniform { min: f32, max: f32 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize an `(fan_in, fan_out)` weight matrix
    pub fn initialize_weights<R: Rng + ?Sized>(
        &self,
        shape: (usize, usize),
        rng: &mut R,
    ) -> Array2<f32> {
        let (fan_in, _) = shape;

        match self {
            WeightInit::FanInUniform => {
                let bound = fan_in_bound(fan_in);
                Array2::random_using(shape, Uniform::new_inclusive(-bound, bound), rng)
            }

            WeightInit::Uniform { min, max } => {
                Array2::random_using(shape, Uniform::new(*min, *max), rng)
            }

            WeightInit::Zeros => Array2::zeros(shape),
        }
    }

    /// Initialize the bias vector of a layer with `fan_in` inputs
    pub fn initialize_biases<R: Rng + ?Sized>(
        &self,
        fan_in: usize,
        size: usize,
        rng: &mut R,
    ) -> Array1<f32> {
        match self {
            WeightInit::FanInUniform => {
                let bound = fan_in_bound(fan_in);
                Array1::random_using(size, Uniform::new_inclusive(-bound, bound), rng)
            }

            WeightInit::Uniform { .. } | WeightInit::Zeros => Array1::zeros(size),
        }
    }
}

fn fan_in_bound(fan_in: usize) -> f32 {
    if fan_in == 0 {
        0.0
    } else {
        1.0 / (fan_in as f32).sqrt()
    }
}
