//! One-step temporal-difference training for the online network.
//!
//! A step regresses the online network onto a target matrix that equals
//! the network's own detached prediction everywhere except the taken
//! action, where it holds `r + γ · max_a Q_target(s', a)`. Transitions are
//! never treated as terminal. Gradients are clipped by global norm and
//! applied with RMSProp.

use log::debug;
use ndarray::{Array1, Array2};

use crate::config::AgentConfig;
use crate::encoder::FeatureEncoder;
use crate::error::{PressLightError, Result};
use crate::loss::{Loss, MSE};
use crate::network::{max_rows, QNetwork};
use crate::optimizer::{GradientClipper, RMSProp};
use crate::replay_buffer::Transition;

/// Sampled transitions stacked into matrices, rows in sample order.
#[derive(Clone, Debug)]
pub struct TrainingBatch {
    pub states: Array2<f32>,
    pub next_states: Array2<f32>,
    pub actions: Vec<usize>,
    pub rewards: Array1<f32>,
}

impl TrainingBatch {
    pub fn from_transitions(encoder: &FeatureEncoder, transitions: &[&Transition]) -> Result<Self> {
        for t in transitions {
            if t.action >= encoder.num_actions() {
                return Err(PressLightError::InvalidAction {
                    action: t.action,
                    num_actions: encoder.num_actions(),
                });
            }
        }
        let states = encoder.encode_batch(
            transitions
                .iter()
                .map(|t| (t.last_observation.view(), t.last_phase.as_slice())),
        )?;
        let next_states = encoder.encode_batch(
            transitions
                .iter()
                .map(|t| (t.observation.view(), t.phase.as_slice())),
        )?;
        Ok(TrainingBatch {
            states,
            next_states,
            actions: transitions.iter().map(|t| t.action).collect(),
            rewards: transitions.iter().map(|t| t.reward).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Outcome of a successful training step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub loss: f32,
    /// Global gradient norm before clipping.
    pub grad_norm: f32,
}

pub struct Trainer {
    gamma: f32,
    learning_rate: f32,
    clipper: GradientClipper,
    optimizer: RMSProp,
}

impl Trainer {
    pub fn new(config: &AgentConfig, online: &QNetwork) -> Self {
        Trainer {
            gamma: config.gamma,
            learning_rate: config.learning_rate,
            clipper: GradientClipper::new(config.grad_clip),
            optimizer: RMSProp::default(&online.layers),
        }
    }

    /// Drop accumulated optimizer state, e.g. after loading new parameters.
    pub fn reset_optimizer(&mut self, online: &QNetwork) {
        self.optimizer = RMSProp::default(&online.layers);
    }

    pub fn optimizer(&self) -> &RMSProp {
        &self.optimizer
    }

    /// `reward + γ · max_a target(next_state)[a]` for every row.
    pub fn td_targets(&self, target: &QNetwork, batch: &TrainingBatch) -> Result<Array1<f32>> {
        let q_next = target.predict(batch.next_states.view())?;
        Ok(&batch.rewards + &(max_rows(q_next.view()) * self.gamma))
    }

    /// Target matrix: the online network's detached prediction with the
    /// taken-action column replaced by the TD target.
    pub fn regression_targets(
        &self,
        online: &QNetwork,
        target: &QNetwork,
        batch: &TrainingBatch,
    ) -> Result<Array2<f32>> {
        let td_targets = self.td_targets(target, batch)?;
        let mut targets = online.predict(batch.states.view())?;
        for (i, &action) in batch.actions.iter().enumerate() {
            targets[[i, action]] = td_targets[i];
        }
        Ok(targets)
    }

    /// Run one optimization step. On error nothing has been mutated.
    pub fn step(
        &mut self,
        online: &mut QNetwork,
        target: &QNetwork,
        batch: &TrainingBatch,
    ) -> Result<StepReport> {
        if batch.is_empty() {
            return Err(PressLightError::InsufficientData {
                requested: 1,
                available: 0,
            });
        }

        let targets = self.regression_targets(online, target, batch)?;
        let (predictions, trace) = online.forward(batch.states.view())?;

        let loss = MSE.compute_batch(predictions.view(), targets.view());
        if !loss.is_finite() {
            return Err(PressLightError::NumericalInstability(format!(
                "training loss is {}",
                loss
            )));
        }

        let output_errors = MSE.gradient_batch(predictions.view(), targets.view());
        let mut gradients = online.backward(&trace, output_errors.view())?;
        let grad_norm = self.clipper.clip(&mut gradients);
        if !grad_norm.is_finite() {
            return Err(PressLightError::NumericalInstability(format!(
                "gradient norm is {}",
                grad_norm
            )));
        }

        online.apply_gradients(&gradients, &mut self.optimizer, self.learning_rate);
        debug!("train step: loss={:.6} grad_norm={:.6}", loss, grad_norm);

        Ok(StepReport { loss, grad_norm })
    }
}
