use serde::{Deserialize, Serialize};

/// Running diagnostics of an agent's learning loop.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Completed training steps.
    pub train_steps: usize,
    /// Loss of the most recent successful step.
    pub last_loss: Option<f32>,
    /// Pre-clip gradient norm of the most recent successful step.
    pub last_grad_norm: Option<f32>,
    /// Exploration rate after the most recent successful step.
    pub epsilon: Option<f32>,
    /// Number of online-to-target synchronizations.
    pub target_syncs: usize,
}

impl TrainingStats {
    pub fn record_step(&mut self, loss: f32, grad_norm: f32, epsilon: f32) {
        self.train_steps += 1;
        self.epsilon = Some(epsilon);
        self.last_loss = Some(loss);
        self.last_grad_norm = Some(grad_norm);
    }

    pub fn record_sync(&mut self) {
        self.target_syncs += 1;
    }
}
