use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::activations::Activation;
use crate::layers::{DenseLayer, LayerGradients, WeightInit};
use crate::network::NetworkGradients;
use crate::optimizer::{GradientClipper, Optimizer, RMSProp};

fn layers() -> Vec<DenseLayer> {
    let mut rng = StdRng::seed_from_u64(0);
    vec![
        DenseLayer::new(2, 2, Activation::Relu, WeightInit::Zeros, &mut rng),
        DenseLayer::new(2, 1, Activation::Linear, WeightInit::Zeros, &mut rng),
    ]
}

#[test]
fn test_rmsprop_defaults() {
    let rmsprop = RMSProp::default(&layers());
    assert_eq!(rmsprop.alpha, 0.9);
    assert_eq!(rmsprop.epsilon, 1e-7);
    assert!(rmsprop.square_averages().iter().all(|v| v.iter().all(|&x| x == 0.0)));
}

#[test]
fn test_rmsprop_first_step() {
    let mut rmsprop = RMSProp::default(&layers());
    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1, -0.2], [0.3, 0.0]];
    rmsprop.update_weights(0, &mut weights, &gradients, 0.01);

    // v = 0.1 g^2, so the first step moves by lr * sign(g) / sqrt(0.1)
    let step = 0.01 / 0.1_f32.sqrt();
    let expected = array![[1.0 - step, 1.0 + step], [1.0 - step, 1.0]];
    for (w, e) in weights.iter().zip(expected.iter()) {
        assert!((w - e).abs() < 1e-4, "{} vs {}", w, e);
    }
}

#[test]
fn test_rmsprop_state_is_per_layer() {
    let mut rmsprop = RMSProp::default(&layers());
    let mut weights = array![[1.0], [1.0]];
    rmsprop.update_weights(1, &mut weights, &array![[0.5], [0.5]], 0.01);

    assert!(rmsprop.square_averages()[0].iter().all(|&x| x == 0.0));
    assert!(rmsprop.square_averages()[1].iter().all(|&x| (x - 0.025).abs() < 1e-6));
}

#[test]
fn test_rmsprop_update_biases() {
    let mut rmsprop = RMSProp::default(&layers());
    let mut biases = array![0.0];
    rmsprop.update_biases(1, &mut biases, &array![2.0], 0.1);
    assert!((biases[0] + 0.1 / 0.1_f32.sqrt()).abs() < 1e-4);
}

fn gradients(weights: ndarray::Array2<f32>, biases: ndarray::Array1<f32>) -> NetworkGradients {
    NetworkGradients {
        layers: vec![LayerGradients { weights, biases }],
    }
}

#[test]
fn test_clip_by_global_norm() {
    let mut grads = gradients(array![[3.0]], array![4.0]);
    let clipper = GradientClipper::new(1.0);
    let norm = clipper.clip(&mut grads);

    assert!((norm - 5.0).abs() < 1e-6);
    assert!((GradientClipper::global_norm(&grads) - 1.0).abs() < 1e-4);
    assert!((grads.layers[0].weights[[0, 0]] - 0.6).abs() < 1e-4);
    assert!((grads.layers[0].biases[0] - 0.8).abs() < 1e-4);
}

#[test]
fn test_clip_leaves_small_gradients() {
    let mut grads = gradients(array![[0.3]], array![0.4]);
    let norm = GradientClipper::new(1.0).clip(&mut grads);
    assert!((norm - 0.5).abs() < 1e-6);
    assert_eq!(grads.layers[0].weights[[0, 0]], 0.3);
    assert_eq!(grads.layers[0].biases[0], 0.4);
}
