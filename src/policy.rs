use ndarray::ArrayView2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::AgentConfig;
use crate::error::Result;
use crate::network::{argmax_rows, QNetwork};

/// Epsilon-greedy action selection with multiplicative decay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    epsilon: f32,
    decay: f32,
    min: f32,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f32, decay: f32, min: f32) -> Self {
        EpsilonGreedy { epsilon, decay, min }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.epsilon, config.epsilon_decay, config.epsilon_min)
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn epsilon_min(&self) -> f32 {
        self.min
    }

    /// `ε ← max(ε_min, ε · decay)`, only while `ε > ε_min`.
    /// Returns true on the step that lands on the floor.
    pub fn decay(&mut self) -> bool {
        if self.epsilon > self.min {
            self.epsilon = (self.epsilon * self.decay).max(self.min);
            return self.epsilon == self.min;
        }
        false
    }

    /// One draw per call decides whether the whole batch explores.
    pub fn should_explore<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f32>() < self.epsilon
    }

    /// Pick one action per feature row. With `explore` set, the batch is
    /// random with probability ε; otherwise it is the online network's
    /// argmax evaluated without a trace.
    pub fn select<R: Rng + ?Sized>(
        &self,
        network: &QNetwork,
        features: ArrayView2<f32>,
        explore: bool,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        if explore && self.should_explore(rng) {
            return Ok(random_actions(network.num_actions(), features.nrows(), rng));
        }
        let q_values = network.predict(features)?;
        Ok(argmax_rows(q_values.view()))
    }
}

/// `count` uniform draws from `[0, num_actions)`.
pub fn random_actions<R: Rng + ?Sized>(
    num_actions: usize,
    count: usize,
    rng: &mut R,
) -> Vec<usize> {
    (0..count).map(|_| rng.gen_range(0..num_actions)).collect()
}
