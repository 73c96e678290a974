use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::PressLightError;
use crate::layers::WeightInit;
use crate::loss::{Loss, MSE};
use crate::network::{argmax_rows, max_rows, QNetwork};

fn network(seed: u64) -> QNetwork {
    let mut rng = StdRng::seed_from_u64(seed);
    QNetwork::new(3, 6, 2, &mut rng).unwrap()
}

#[test]
fn test_network_layer_shapes() {
    let net = network(0);
    assert_eq!(net.layers.len(), 3);
    assert_eq!(net.layers[0].weights.shape(), [3, 6]);
    assert_eq!(net.layers[1].weights.shape(), [6, 6]);
    assert_eq!(net.layers[2].weights.shape(), [6, 2]);
    assert_eq!(net.input_size(), 3);
    assert_eq!(net.num_actions(), 2);
}

#[test]
fn test_zero_input_output_shape() {
    let mut rng = StdRng::seed_from_u64(1);
    let net = QNetwork::new(4, 8, 2, &mut rng).unwrap();
    let output = net.predict(Array2::zeros((1, 4)).view()).unwrap();
    assert_eq!(output.dim(), (1, 2));
    assert!(output.iter().all(|v| v.is_finite()));
}

#[test]
fn test_zero_width_is_configuration_error() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        QNetwork::new(4, 0, 2, &mut rng),
        Err(PressLightError::Configuration { .. })
    ));
}

#[test]
fn test_fan_in_initialization_bounds() {
    let net = network(2);
    let bound = 1.0 / (3.0_f32).sqrt();
    assert!(net.layers[0].weights.iter().all(|w| w.abs() <= bound));
    assert!(net.layers[0].biases.iter().all(|b| b.abs() <= bound));
}

#[test]
fn test_custom_uniform_initialization() {
    let mut rng = StdRng::seed_from_u64(3);
    let init = WeightInit::Uniform { min: -0.05, max: 0.05 };
    let net = QNetwork::with_init(3, 6, 2, init, &mut rng).unwrap();
    for layer in &net.layers {
        assert!(layer.weights.iter().all(|&w| (-0.05..0.05).contains(&w)));
        assert!(layer.biases.iter().all(|&b| b == 0.0));
    }
}

#[test]
fn test_predict_rejects_wrong_width() {
    let net = network(0);
    assert!(matches!(
        net.predict(Array2::zeros((2, 5)).view()),
        Err(PressLightError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_forward_matches_predict() {
    let net = network(4);
    let inputs = array![[1.0, -2.0, 0.5], [0.0, 3.0, 1.0]];
    let predicted = net.predict(inputs.view()).unwrap();
    let (forward, _) = net.forward(inputs.view()).unwrap();
    assert_eq!(predicted, forward);
}

#[test]
fn test_copy_from_gives_identical_outputs() {
    let source = network(5);
    let mut copy = network(6);
    let inputs = array![[1.0, 2.0, 3.0]];
    assert_ne!(
        source.predict(inputs.view()).unwrap(),
        copy.predict(inputs.view()).unwrap()
    );

    copy.copy_from(&source);
    assert_eq!(
        source.predict(inputs.view()).unwrap(),
        copy.predict(inputs.view()).unwrap()
    );
}

#[test]
fn test_output_layer_gradients_match_finite_differences() {
    let net = network(7);
    let inputs = array![[0.5, 1.0, -0.5], [1.5, -1.0, 0.25]];
    let targets = array![[1.0, -1.0], [0.5, 2.0]];

    let (predictions, trace) = net.forward(inputs.view()).unwrap();
    let errors = MSE.gradient_batch(predictions.view(), targets.view());
    let gradients = net.backward(&trace, errors.view()).unwrap();

    assert_eq!(gradients.layers.len(), 3);
    for (layer, grads) in net.layers.iter().zip(&gradients.layers) {
        assert_eq!(layer.weights.dim(), grads.weights.dim());
        assert_eq!(layer.biases.dim(), grads.biases.dim());
    }

    // The output layer is linear, so perturbing it never crosses a ReLU kink.
    let loss_at = |net: &QNetwork| {
        let p = net.predict(inputs.view()).unwrap();
        MSE.compute_batch(p.view(), targets.view())
    };
    let h = 1e-3;
    for (row, col) in [(0, 0), (3, 1), (5, 0)] {
        let mut plus = net.clone();
        plus.layers[2].weights[[row, col]] += h;
        let mut minus = net.clone();
        minus.layers[2].weights[[row, col]] -= h;
        let numeric = (loss_at(&plus) - loss_at(&minus)) / (2.0 * h);
        let analytic = gradients.layers[2].weights[[row, col]];
        assert!(
            (numeric - analytic).abs() < 1e-2,
            "weight ({}, {}): numeric {} vs analytic {}",
            row,
            col,
            numeric,
            analytic
        );
    }

    let mut plus = net.clone();
    plus.layers[2].biases[1] += h;
    let mut minus = net.clone();
    minus.layers[2].biases[1] -= h;
    let numeric = (loss_at(&plus) - loss_at(&minus)) / (2.0 * h);
    assert!((numeric - gradients.layers[2].biases[1]).abs() < 1e-2);
}

#[test]
fn test_state_dict_round_trip() {
    let source = network(8);
    let mut other = network(9);
    other.load_state_dict(&source.state_dict()).unwrap();
    assert_eq!(source, other);
}

#[test]
fn test_load_state_dict_shape_mismatch_leaves_network_untouched() {
    let mut rng = StdRng::seed_from_u64(10);
    let wider = QNetwork::new(3, 12, 2, &mut rng).unwrap();
    let mut net = network(11);
    let before = net.clone();

    assert!(matches!(
        net.load_state_dict(&wider.state_dict()),
        Err(PressLightError::DimensionMismatch { .. })
    ));
    assert_eq!(net, before);
}

#[test]
fn test_zero_init_outputs_zero() {
    let mut rng = StdRng::seed_from_u64(0);
    let net = QNetwork::with_init(2, 4, 3, WeightInit::Zeros, &mut rng).unwrap();
    let output = net.predict(array![[1.0, 2.0]].view()).unwrap();
    assert_eq!(output, array![[0.0, 0.0, 0.0]]);
}

#[test]
fn test_argmax_ties_pick_lowest_index() {
    let values = array![[1.0, 3.0, 3.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -0.5]];
    assert_eq!(argmax_rows(values.view()), vec![1, 0, 2]);
    assert_eq!(max_rows(values.view()), array![3.0, 0.0, -0.5]);
}
