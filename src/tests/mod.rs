pub mod test_network;
pub mod test_optimizer;

use ndarray::Array1;

use crate::config::AgentConfig;
use crate::replay_buffer::Transition;

/// Small configuration shared by the unit tests.
pub(crate) fn test_config() -> AgentConfig {
    AgentConfig {
        gamma: 0.95,
        grad_clip: 5.0,
        epsilon: 0.1,
        epsilon_decay: 0.995,
        epsilon_min: 0.01,
        learning_rate: 0.001,
        batch_size: 4,
        buffer_size: 32,
        d_dense: 8,
        phase: true,
        one_hot: true,
    }
}

pub(crate) fn transition(
    key: &str,
    observation_len: usize,
    action: usize,
    reward: f32,
) -> Transition {
    let base = key.bytes().map(f32::from).sum::<f32>() % 7.0;
    Transition {
        key: key.to_string(),
        last_observation: Array1::from_shape_fn(observation_len, |i| base + i as f32),
        last_phase: vec![action],
        action,
        reward,
        observation: Array1::from_shape_fn(observation_len, |i| (base + 2.0 * i as f32) % 5.0),
        phase: vec![0],
    }
}
